//! States of the automaton graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Transition;

/// Index of a state in its ATN's arena.
///
/// Identifiers are dense and allocated in creation order. They are only
/// meaningful within the ATN that minted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub u32);

impl StateId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Index into the ATN's ordered decision list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecisionId(pub u16);

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Index of a rule in its grammar's declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub u16);

impl RuleId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Role a state plays in the automaton.
///
/// The kind is fixed at creation. Consumers dispatch on it instead of
/// downcasting, and the graph accessors on [`super::Atn`] assert kinds
/// when resolving loop back-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateKind {
    /// Plain wiring state with no structural meaning.
    Basic,
    /// Entry of a rule's sub-automaton.
    RuleStart { rule: RuleId },
    /// Exit of a rule's sub-automaton. Stays open; rule calls return
    /// through the call stack, not through stored edges.
    RuleStop { rule: RuleId },
    /// Fan-out of a plain or optional alternation block.
    BlockStart,
    /// Fan-out of a block wrapped by `*`.
    StarBlockStart,
    /// Fan-out of a block wrapped by `+`.
    PlusBlockStart,
    /// Join point closing an alternation block.
    BlockEnd,
    /// Decision between entering a `*` loop body and leaving the loop.
    StarLoopEntry,
    /// Back edge of a `*` loop. Its sole transition returns to the entry.
    StarLoopBack,
    /// Decision between repeating a `+` loop body and leaving the loop.
    PlusLoopBack,
    /// Marker on the exit path of a loop.
    LoopEnd,
    /// Dispatch state of one lexer mode.
    TokenStart { mode: u16 },
}

impl StateKind {
    /// Kinds allowed to carry a decision number.
    pub fn is_decision_capable(&self) -> bool {
        matches!(
            self,
            StateKind::BlockStart
                | StateKind::StarBlockStart
                | StateKind::PlusBlockStart
                | StateKind::StarLoopEntry
                | StateKind::PlusLoopBack
        )
    }

    /// Rule owning this state, for rule boundary kinds.
    pub fn rule(&self) -> Option<RuleId> {
        match self {
            StateKind::RuleStart { rule } | StateKind::RuleStop { rule } => Some(*rule),
            _ => None,
        }
    }

    /// Short tag used by dumps and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            StateKind::Basic => "basic",
            StateKind::RuleStart { .. } => "ruleStart",
            StateKind::RuleStop { .. } => "ruleStop",
            StateKind::BlockStart => "blockStart",
            StateKind::StarBlockStart => "starBlockStart",
            StateKind::PlusBlockStart => "plusBlockStart",
            StateKind::BlockEnd => "blockEnd",
            StateKind::StarLoopEntry => "starLoopEntry",
            StateKind::StarLoopBack => "starLoopBack",
            StateKind::PlusLoopBack => "plusLoopBack",
            StateKind::LoopEnd => "loopEnd",
            StateKind::TokenStart { .. } => "tokenStart",
        }
    }
}

/// One node of the ATN graph.
///
/// Transition order is load-bearing: for decision states the position of
/// an outgoing transition is the alternative number the prediction layer
/// reports, and loop exits sit last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    id: StateId,
    kind: StateKind,
    transitions: Vec<Transition>,
    decision: Option<DecisionId>,
    non_greedy: bool,
}

impl State {
    pub(super) fn new(id: StateId, kind: StateKind) -> Self {
        Self { id, kind, transitions: Vec::new(), decision: None, non_greedy: false }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    /// Outgoing transitions in priority order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition(&self, index: usize) -> Option<&Transition> {
        self.transitions.get(index)
    }

    /// Decision number, when this state was registered as a decision point.
    pub fn decision(&self) -> Option<DecisionId> {
        self.decision
    }

    /// True for decision states where exiting is preferred over matching.
    pub fn is_non_greedy(&self) -> bool {
        self.non_greedy
    }

    /// A state is open while it has no outgoing transitions. Fragment
    /// exits stay open until a later operation wires them onward.
    pub fn is_open(&self) -> bool {
        self.transitions.is_empty()
    }

    pub(super) fn push_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub(super) fn set_decision(&mut self, decision: DecisionId) {
        self.decision = Some(decision);
    }

    pub(super) fn set_non_greedy(&mut self) {
        self.non_greedy = true;
    }
}
