//! Typed edges between states.

use serde::{Deserialize, Serialize};

use super::{RuleId, StateId};
use crate::interval::IntervalSet;

/// Directed edge to `target`, labeled by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub target: StateId,
    pub kind: TransitionKind,
}

impl Transition {
    pub fn new(target: StateId, kind: TransitionKind) -> Self {
        Self { target, kind }
    }

    pub fn epsilon(target: StateId) -> Self {
        Self::new(target, TransitionKind::Epsilon)
    }

    /// True when following this edge consumes an input symbol.
    pub fn consumes_symbol(&self) -> bool {
        self.kind.consumes_symbol()
    }

    /// Whether this edge matches `symbol` in an alphabet of
    /// `0..=max_symbol`. Non-consuming edges match nothing.
    pub fn matches(&self, symbol: u32, max_symbol: u32) -> bool {
        if symbol > max_symbol {
            return false;
        }
        match &self.kind {
            TransitionKind::Atom { symbol: expected } => symbol == *expected,
            TransitionKind::Range { lo, hi } => *lo <= symbol && symbol <= *hi,
            TransitionKind::Set { set, complement } => set.contains(symbol) != *complement,
            TransitionKind::Wildcard => true,
            TransitionKind::Epsilon
            | TransitionKind::Rule { .. }
            | TransitionKind::Predicate { .. }
            | TransitionKind::Action { .. } => false,
        }
    }
}

/// Edge label taxonomy.
///
/// A `Rule` edge targets the callee's start state and records where the
/// caller resumes; the callee's stop state carries no return edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Free move, no input consumed.
    Epsilon,
    /// Exactly one symbol.
    Atom { symbol: u32 },
    /// Any symbol in the inclusive range.
    Range { lo: u32, hi: u32 },
    /// Any symbol of the set. With `complement`, any alphabet symbol
    /// outside the set; the alphabet bound lives on the ATN, so the
    /// complement is resolved at match time, not at build time.
    Set { set: IntervalSet, complement: bool },
    /// Invocation of `rule`. The edge target is the callee's start
    /// state; `follow` is where the caller continues after return.
    Rule { rule: RuleId, follow: StateId },
    /// Semantic guard. `index` points into the ATN's predicate table.
    Predicate { index: u16 },
    /// Embedded action. `index` points into the ATN's action table;
    /// prediction treats these as free moves.
    Action { index: u16 },
    /// Any symbol of the alphabet.
    Wildcard,
}

impl TransitionKind {
    pub fn consumes_symbol(&self) -> bool {
        matches!(
            self,
            TransitionKind::Atom { .. }
                | TransitionKind::Range { .. }
                | TransitionKind::Set { .. }
                | TransitionKind::Wildcard
        )
    }
}
