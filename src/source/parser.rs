//! Pairing composed characters with their decompositions.
//!
//! The source table alternates between a cell holding one codepoint (the
//! composed character) and a cell holding its decomposition. [`RuleParser`]
//! follows that alternation with an explicit two-state machine:
//!
//! | state                      | token            | next state                 | event            |
//! |----------------------------|------------------|----------------------------|------------------|
//! | `Idle`                     | single `c`       | `AwaitingDecomposition(c)` | `Pending`        |
//! | `AwaitingDecomposition(a)` | single `b`       | `AwaitingDecomposition(b)` | `Superseded`     |
//! | `AwaitingDecomposition(c)` | sequence `s`     | `Idle`                     | `Rule(c → s)`    |
//! | `Idle`                     | sequence `s`     | `Idle`                     | depends on [`OrphanPolicy`] |

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    domain::{CodePoint, Decomposition, DecompositionRule},
    source::{Token, TokenError},
};

/// What to do with a decomposition that arrives while no composed character
/// is pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Fail with [`MalformedInputError`].
    #[default]
    Reject,
    /// Drop the decomposition and log a warning.
    Skip,
}

/// The parser's single slot of carried state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParserState {
    /// No composed character is waiting for its decomposition.
    #[default]
    Idle,
    /// A composed character was read and its decomposition is expected next.
    AwaitingDecomposition(CodePoint),
}

/// The transition taken for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The cell was not codepoint data; the state is unchanged.
    Ignored,
    /// A composed character is now pending.
    Pending(CodePoint),
    /// A pending composed character was replaced before its decomposition
    /// arrived.
    Superseded {
        /// The character that was dropped.
        discarded: CodePoint,
        /// The character now pending.
        pending: CodePoint,
    },
    /// A complete rule.
    Rule(DecompositionRule),
    /// A decomposition without a pending composed character was dropped.
    OrphanSkipped(Decomposition),
}

/// Errors raised for input the parser refuses to pair.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MalformedInputError {
    /// A decomposition arrived with no composed character pending.
    #[error("cell {position}: decomposition [{decomposition}] has no composed character")]
    Orphan {
        /// Zero-based index of the offending cell.
        position: usize,
        /// The unpaired decomposition.
        decomposition: Decomposition,
    },
}

/// Turns a stream of cells into decomposition rules.
#[derive(Debug, Default)]
pub struct RuleParser {
    state: ParserState,
    policy: OrphanPolicy,
    position: usize,
}

impl RuleParser {
    /// Creates an idle parser.
    #[must_use]
    pub fn new(policy: OrphanPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> ParserState {
        self.state
    }

    /// Classifies a raw cell and feeds it.
    ///
    /// Cells that are not codepoint data are ignored.
    ///
    /// # Errors
    ///
    /// See [`RuleParser::feed`].
    pub fn feed_cell(&mut self, cell: &str) -> Result<Event, MalformedInputError> {
        match cell.parse::<Token>() {
            Ok(token) => self.feed(token),
            Err(e) => {
                match e {
                    TokenError::NotCodepoints(_) => {
                        tracing::trace!("Skipping cell {}: {e}", self.position);
                    }
                    TokenError::CodePoint(_) => {
                        tracing::debug!("Skipping cell {}: {e}", self.position);
                    }
                }
                self.position += 1;
                Ok(Event::Ignored)
            }
        }
    }

    /// Performs one transition.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInputError::Orphan`] when a decomposition arrives
    /// while idle and the policy is [`OrphanPolicy::Reject`]. The parser
    /// stays idle.
    pub fn feed(&mut self, token: Token) -> Result<Event, MalformedInputError> {
        let position = self.position;
        self.position += 1;

        match (self.state, token) {
            (ParserState::Idle, Token::Composed(pending)) => {
                self.state = ParserState::AwaitingDecomposition(pending);
                Ok(Event::Pending(pending))
            }
            (ParserState::AwaitingDecomposition(discarded), Token::Composed(pending)) => {
                tracing::warn!(
                    "Cell {position}: {discarded} has no decomposition, superseded by {pending}"
                );
                self.state = ParserState::AwaitingDecomposition(pending);
                Ok(Event::Superseded { discarded, pending })
            }
            (ParserState::AwaitingDecomposition(composed), Token::Decomposed(decomposed)) => {
                self.state = ParserState::Idle;
                Ok(Event::Rule(DecompositionRule::new(composed, decomposed)))
            }
            (ParserState::Idle, Token::Decomposed(decomposition)) => match self.policy {
                OrphanPolicy::Reject => Err(MalformedInputError::Orphan {
                    position,
                    decomposition,
                }),
                OrphanPolicy::Skip => {
                    tracing::warn!(
                        "Cell {position}: dropping decomposition [{decomposition}] with no composed character"
                    );
                    Ok(Event::OrphanSkipped(decomposition))
                }
            },
        }
    }

    /// Ends the stream, returning a composed character still waiting for its
    /// decomposition, if any.
    #[must_use]
    pub fn finish(self) -> Option<CodePoint> {
        match self.state {
            ParserState::Idle => None,
            ParserState::AwaitingDecomposition(pending) => Some(pending),
        }
    }
}

/// Parses a whole cell stream into rules, in input order.
///
/// # Errors
///
/// Returns [`MalformedInputError`] for an orphan decomposition under
/// [`OrphanPolicy::Reject`].
#[instrument(level = "debug", skip(cells))]
pub fn parse_cells<I, S>(
    cells: I,
    policy: OrphanPolicy,
) -> Result<Vec<DecompositionRule>, MalformedInputError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = RuleParser::new(policy);
    let mut rules = Vec::new();

    for cell in cells {
        if let Event::Rule(rule) = parser.feed_cell(cell.as_ref())? {
            tracing::trace!("Parsed rule {rule}");
            rules.push(rule);
        }
    }

    if let Some(pending) = parser.finish() {
        tracing::warn!("Input ended while {pending} was waiting for its decomposition");
    }

    tracing::debug!("Parsed {} rules", rules.len());
    Ok(rules)
}
