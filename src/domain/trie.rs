//! Prefix tree over decomposed codepoint sequences.
//!
//! The [`DecompositionTrie`] is the inverse of the
//! [`EncodingMap`](crate::EncodingMap): walking it one codepoint at a time
//! tells a decoder whether the codepoints consumed so far form a complete
//! decomposition (and of which composed character), and whether a longer
//! decomposition sharing the same prefix is still possible.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CodePoint, Decomposition, DecompositionRule};

/// A node in the decomposition trie.
///
/// The path from the root to a node spells a codepoint sequence. `current` is
/// the composed character that sequence decomposes from, if the sequence is
/// a complete decomposition. `children` holds the continuations towards
/// longer sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrieNode {
    current: Option<CodePoint>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<CodePoint, TrieNode>,
}

impl TrieNode {
    /// The composed character for the path to this node, if complete.
    #[must_use]
    pub const fn current(&self) -> Option<CodePoint> {
        self.current
    }

    /// The child reached by `codepoint`.
    #[must_use]
    pub fn child(&self, codepoint: CodePoint) -> Option<&Self> {
        self.children.get(&codepoint)
    }

    /// Iterates over children in ascending codepoint order.
    pub fn children(&self) -> impl Iterator<Item = (CodePoint, &Self)> {
        self.children.iter().map(|(codepoint, node)| (*codepoint, node))
    }

    /// Whether a longer sequence can extend the path to this node.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Follows `path` from this node.
    pub fn walk(&self, path: impl IntoIterator<Item = CodePoint>) -> Option<&Self> {
        path.into_iter()
            .try_fold(self, |node, codepoint| node.child(codepoint))
    }

    fn count(&self) -> usize {
        self.children.values().map(|child| 1 + child.count()).sum()
    }

    fn depth(&self) -> usize {
        self.children
            .values()
            .map(|child| 1 + child.depth())
            .max()
            .unwrap_or(0)
    }

    /// Clears `composed` at the end of `path` and drops nodes left with
    /// neither a composed character nor children.
    fn remove(&mut self, path: &[CodePoint], composed: CodePoint) -> bool {
        let Some((first, rest)) = path.split_first() else {
            if self.current == Some(composed) {
                self.current = None;
                return true;
            }
            return false;
        };
        let Some(child) = self.children.get_mut(first) else {
            return false;
        };
        let removed = child.remove(rest, composed);
        if removed && child.current.is_none() && child.children.is_empty() {
            self.children.remove(first);
        }
        removed
    }

    fn collect_rules(&self, path: &mut Vec<CodePoint>, rules: &mut Vec<DecompositionRule>) {
        if let Some(composed) = self.current {
            if let Ok(decomposed) = Decomposition::new(path.clone()) {
                rules.push(DecompositionRule::new(composed, decomposed));
            }
        }
        for (codepoint, child) in &self.children {
            path.push(*codepoint);
            child.collect_rules(path, rules);
            path.pop();
        }
    }

    fn validate(&self, path: &mut Vec<CodePoint>) -> Result<(), InvariantError> {
        match (path.len(), self.current) {
            (0, Some(composed)) => return Err(InvariantError::RootComposed(composed)),
            (1, Some(composed)) => {
                return Err(InvariantError::SingleCodepoint {
                    codepoint: path[0],
                    composed,
                });
            }
            (depth, None) if depth > 0 && self.children.is_empty() => {
                return Err(InvariantError::DeadEnd(path.clone()));
            }
            _ => {}
        }
        for (codepoint, child) in &self.children {
            path.push(*codepoint);
            child.validate(path)?;
            path.pop();
        }
        Ok(())
    }
}

/// Errors raised when a deserialized trie could not have been built from
/// decomposition rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantError {
    /// The synthetic root carries a composed character.
    #[error("the trie root cannot carry a composed character (found {0})")]
    RootComposed(CodePoint),

    /// A one-codepoint path carries a composed character.
    #[error("{composed} cannot decompose to the single codepoint {codepoint}")]
    SingleCodepoint {
        /// The codepoint of the depth-1 node.
        codepoint: CodePoint,
        /// The composed character found on it.
        composed: CodePoint,
    },

    /// A leaf without a composed character.
    #[error("trie path {} leads nowhere", format_path(.0))]
    DeadEnd(Vec<CodePoint>),
}

fn format_path(path: &[CodePoint]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Multi-level prefix tree keyed by codepoint, rooted at a synthetic node
/// whose `current` is always absent.
///
/// ```
/// use hfs_tables::{CodePoint, Decomposition, DecompositionRule, DecompositionTrie};
///
/// let rule = DecompositionRule::new(
///     CodePoint::new('\u{00E9}'),
///     Decomposition::from_chars("e\u{0301}").unwrap(),
/// );
/// let trie = DecompositionTrie::from_rules([&rule]);
///
/// let e = trie.root().child(CodePoint::new('e')).unwrap();
/// assert_eq!(e.current(), None);
/// assert_eq!(
///     e.child(CodePoint::new('\u{0301}')).unwrap().current(),
///     Some(CodePoint::new('\u{00E9}'))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TrieNode", into = "TrieNode")]
pub struct DecompositionTrie {
    root: TrieNode,
}

impl DecompositionTrie {
    /// Creates a trie holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a trie from rules in order. Later rules win.
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a DecompositionRule>) -> Self {
        let mut trie = Self::new();
        for rule in rules {
            trie.insert(rule);
        }
        trie
    }

    /// Inserts the path spelled by the rule's decomposition and marks its
    /// last node with the composed character.
    ///
    /// Returns the composed character previously stored at that exact path.
    pub fn insert(&mut self, rule: &DecompositionRule) -> Option<CodePoint> {
        let mut node = &mut self.root;
        for codepoint in rule.decomposed.iter() {
            node = node.children.entry(codepoint).or_default();
        }
        node.current.replace(rule.composed)
    }

    /// Removes the rule's path if it still ends in the rule's composed
    /// character, pruning prefixes that no other rule needs.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, rule: &DecompositionRule) -> bool {
        self.root.remove(&rule.decomposed.to_vec(), rule.composed)
    }

    /// The synthetic root node.
    #[must_use]
    pub const fn root(&self) -> &TrieNode {
        &self.root
    }

    /// Follows `path` from the root.
    pub fn walk(&self, path: impl IntoIterator<Item = CodePoint>) -> Option<&TrieNode> {
        self.root.walk(path)
    }

    /// The composed character whose decomposition is exactly `decomposed`.
    #[must_use]
    pub fn lookup(&self, decomposed: &Decomposition) -> Option<CodePoint> {
        self.walk(decomposed.iter()).and_then(TrieNode::current)
    }

    /// Number of nodes below the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Length of the longest path from the root.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.root.depth()
    }

    /// Whether the trie holds nothing but the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.root.has_children()
    }

    /// Reconstructs one rule per complete path, in ascending path order.
    #[must_use]
    pub fn rules(&self) -> Vec<DecompositionRule> {
        let mut rules = Vec::new();
        self.root.collect_rules(&mut Vec::new(), &mut rules);
        rules
    }

    /// Starts an incremental walk at the root.
    #[must_use]
    pub const fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.root)
    }

    /// Greedy longest complete match anchored at the start of `input`.
    ///
    /// Returns the composed character and the number of codepoints it
    /// covers.
    #[must_use]
    pub fn longest_match(&self, input: &[CodePoint]) -> Option<(CodePoint, usize)> {
        let mut cursor = self.cursor();
        for &codepoint in input {
            match cursor.advance(codepoint) {
                Step::Prefix | Step::Ambiguous(_) => {}
                Step::Complete(_) | Step::Mismatch => break,
            }
        }
        cursor.longest()
    }
}

impl TryFrom<TrieNode> for DecompositionTrie {
    type Error = InvariantError;

    fn try_from(root: TrieNode) -> Result<Self, Self::Error> {
        root.validate(&mut Vec::new())?;
        Ok(Self { root })
    }
}

impl From<DecompositionTrie> for TrieNode {
    fn from(trie: DecompositionTrie) -> Self {
        trie.root
    }
}

/// Outcome of feeding one codepoint to a [`Cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The path so far is only the prefix of longer decompositions.
    Prefix,
    /// The path is a complete decomposition and nothing can extend it.
    Complete(CodePoint),
    /// The path is a complete decomposition, but a longer one may follow.
    Ambiguous(CodePoint),
    /// The codepoint does not continue the path; the cursor did not move.
    Mismatch,
}

/// Read-only walker for codepoint-by-codepoint decoding.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    root: &'a TrieNode,
    node: &'a TrieNode,
    depth: usize,
    longest: Option<(CodePoint, usize)>,
}

impl<'a> Cursor<'a> {
    const fn new(root: &'a TrieNode) -> Self {
        Self {
            root,
            node: root,
            depth: 0,
            longest: None,
        }
    }

    /// Moves to the child reached by `codepoint`.
    pub fn advance(&mut self, codepoint: CodePoint) -> Step {
        let Some(next) = self.node.child(codepoint) else {
            return Step::Mismatch;
        };
        self.node = next;
        self.depth += 1;

        match next.current {
            None => Step::Prefix,
            Some(composed) => {
                self.longest = Some((composed, self.depth));
                if next.has_children() {
                    Step::Ambiguous(composed)
                } else {
                    Step::Complete(composed)
                }
            }
        }
    }

    /// The longest complete match passed so far and its length.
    #[must_use]
    pub const fn longest(&self) -> Option<(CodePoint, usize)> {
        self.longest
    }

    /// Number of codepoints consumed since the last reset.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The node the cursor stands on.
    #[must_use]
    pub const fn node(&self) -> &'a TrieNode {
        self.node
    }

    /// Returns to the root and forgets any match.
    pub fn reset(&mut self) {
        self.node = self.root;
        self.depth = 0;
        self.longest = None;
    }
}
