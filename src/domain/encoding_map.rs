use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CodePoint, Decomposition, DecompositionRule};

/// Flat lookup from a composed character to its HFS+ decomposition.
///
/// Keys are unique; inserting a rule for a composed character that is already
/// present replaces the earlier decomposition. Iteration is in ascending
/// codepoint order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodingMap(BTreeMap<CodePoint, Decomposition>);

impl EncodingMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builds a map from rules in order. Later rules win.
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a DecompositionRule>) -> Self {
        let mut map = Self::new();
        for rule in rules {
            map.insert(rule);
        }
        map
    }

    /// Records a rule, returning the decomposition it replaced, if any.
    pub fn insert(&mut self, rule: &DecompositionRule) -> Option<Decomposition> {
        self.0.insert(rule.composed, rule.decomposed.clone())
    }

    /// Looks up the decomposition of a composed character.
    #[must_use]
    pub fn get(&self, composed: CodePoint) -> Option<&Decomposition> {
        self.0.get(&composed)
    }

    /// Iterates over entries in ascending codepoint order.
    pub fn iter(&self) -> impl Iterator<Item = (CodePoint, &Decomposition)> {
        self.0.iter().map(|(composed, decomposed)| (*composed, decomposed))
    }

    /// Number of composed characters in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(composed: char, decomposed: &str) -> DecompositionRule {
        DecompositionRule::new(
            CodePoint::new(composed),
            Decomposition::from_chars(decomposed).unwrap(),
        )
    }

    #[test]
    fn empty_rules_give_empty_map() {
        let map = EncodingMap::from_rules(std::iter::empty());
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn every_rule_is_retrievable() {
        let rules = [
            rule('\u{00E9}', "e\u{0301}"),
            rule('\u{1E39}', "l\u{0323}\u{0304}"),
            rule('\u{00C5}', "A\u{030A}"),
        ];
        let map = EncodingMap::from_rules(&rules);

        assert_eq!(map.len(), rules.len());
        for rule in &rules {
            assert_eq!(map.get(rule.composed), Some(&rule.decomposed));
        }
    }

    #[test]
    fn later_rule_overwrites_earlier() {
        let first = rule('\u{00E9}', "e\u{0301}");
        let second = rule('\u{00E9}', "e\u{0300}");

        let mut map = EncodingMap::new();
        assert_eq!(map.insert(&first), None);
        assert_eq!(map.insert(&second), Some(first.decomposed));
        assert_eq!(map.get(CodePoint::new('\u{00E9}')), Some(&second.decomposed));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn repeating_a_rule_is_idempotent() {
        let rules = [rule('\u{00E9}', "e\u{0301}"), rule('\u{00E9}', "e\u{0301}")];
        let map = EncodingMap::from_rules(&rules);
        assert_eq!(map, EncodingMap::from_rules(&rules[..1]));
    }

    #[test]
    fn iterates_in_codepoint_order() {
        let rules = [
            rule('\u{00E9}', "e\u{0301}"),
            rule('\u{00C0}', "A\u{0300}"),
            rule('\u{00D1}', "N\u{0303}"),
        ];
        let map = EncodingMap::from_rules(&rules);
        let keys: Vec<char> = map.iter().map(|(c, _)| c.as_char()).collect();
        assert_eq!(keys, vec!['\u{00C0}', '\u{00D1}', '\u{00E9}']);
    }
}
