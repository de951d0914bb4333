//! The ATN container: a state arena plus the indices built over it.
//!
//! # Architecture
//!
//! ```text
//! grammar AST → construction engine → Atn (mutable) → freeze → FrozenAtn
//! ```
//!
//! The [`Atn`] owns every state and hands out dense [`StateId`]s. All
//! cross-references in the graph are ids into the arena; loop
//! back-references are resolved by traversal through kind-asserting
//! accessors, never by stored pointers. [`Atn::freeze`] verifies the
//! structural invariants and returns the read-only [`FrozenAtn`] view
//! that downstream consumers work with.

mod dump;
mod state;
mod transition;
mod verify;

#[cfg(test)]
mod atn_tests;
#[cfg(test)]
mod transition_tests;

pub use dump::AtnPrinter;
pub use state::{DecisionId, RuleId, State, StateId, StateKind};
pub use transition::{Transition, TransitionKind};

use std::fmt;
use std::ops::Deref;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which half of a grammar the automaton serves. The machine kind fixes
/// the alphabet: token types for a parser, code points for a lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineKind {
    Parser,
    Lexer,
}

impl MachineKind {
    pub fn name(&self) -> &'static str {
        match self {
            MachineKind::Parser => "parser",
            MachineKind::Lexer => "lexer",
        }
    }
}

/// Start and stop boundary of one rule's sub-automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStates {
    pub start: StateId,
    pub stop: StateId,
}

/// Executable lexer command attached to a token rule alternative.
///
/// Commands do not alter the graph. They are recorded per `(rule, alt)`
/// and interpreted by the lexer runtime after a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LexerCommand {
    /// Discard the matched token.
    Skip,
    /// Keep matching; emit one token for the combined text.
    More,
    /// Return to the previous mode.
    PopMode,
    /// Switch to the mode with this index.
    Mode(u16),
    /// Push the current mode and switch to this one.
    PushMode(u16),
    /// Override the emitted token type.
    Type(u32),
    /// Route the token to this channel.
    Channel(u16),
}

impl fmt::Display for LexerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerCommand::Skip => write!(f, "skip"),
            LexerCommand::More => write!(f, "more"),
            LexerCommand::PopMode => write!(f, "popMode"),
            LexerCommand::Mode(m) => write!(f, "mode({m})"),
            LexerCommand::PushMode(m) => write!(f, "pushMode({m})"),
            LexerCommand::Type(t) => write!(f, "type({t})"),
            LexerCommand::Channel(c) => write!(f, "channel({c})"),
        }
    }
}

/// Semantic predicate registered by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateDecl {
    pub rule: RuleId,
    pub body: String,
}

/// Embedded action registered by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDecl {
    pub rule: RuleId,
    pub body: String,
}

/// Commands attached to one alternative of a lexer rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    pub rule: RuleId,
    /// 1-based outer alternative number.
    pub alt: u16,
    pub commands: Vec<LexerCommand>,
}

/// Flavor of a label binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelKind {
    /// `x=element`, rebinding on each use.
    Label,
    /// `x+=element`, appending on each use.
    ListLabel,
}

/// Name attached to the entry state of a labeled fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelBinding {
    pub rule: RuleId,
    pub name: String,
    pub kind: LabelKind,
    pub state: StateId,
}

/// Structural failures raised by the container and its freeze check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AtnError {
    #[error("state {state} is {found}, expected {expected}")]
    KindMismatch { state: StateId, expected: &'static str, found: &'static str },
    #[error("state {state} has no outgoing transitions")]
    MissingTransition { state: StateId },
    #[error("boundary state {state} already has outgoing transitions")]
    BoundaryNotOpen { state: StateId },
    #[error("rule `{name}` defined twice")]
    DuplicateRule { name: String },
    #[error("rule `{name}` was never sealed")]
    UnsealedRule { name: String },
    #[error("state {state} dangles with no outgoing transitions")]
    DanglingState { state: StateId },
    #[error("decision state {state} has {count} outgoing transitions")]
    MalformedDecision { state: StateId, count: usize },
    #[error("transition from {state} targets unknown state {target}")]
    InvalidTarget { state: StateId, target: StateId },
    #[error("state {state} of kind {found} cannot be a decision point")]
    NotDecision { state: StateId, found: &'static str },
}

/// Mutable ATN under construction.
///
/// States are append-only. Transitions are appended to their source
/// state in priority order and never reordered or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atn {
    machine: MachineKind,
    /// Largest valid symbol of the alphabet.
    max_symbol: u32,
    states: Vec<State>,
    /// Rule table in declaration order; index position is the `RuleId`.
    rules: IndexMap<String, RuleStates>,
    /// Decision states in registration order; index position is the
    /// `DecisionId`.
    decisions: Vec<StateId>,
    /// Lexer modes in declaration order, each mapping to its dispatch
    /// state. Empty for parser machines.
    modes: IndexMap<String, StateId>,
    predicates: Vec<PredicateDecl>,
    actions: Vec<ActionDecl>,
    commands: Vec<CommandSet>,
    labels: Vec<LabelBinding>,
}

impl Atn {
    pub fn new(machine: MachineKind, max_symbol: u32) -> Self {
        Self {
            machine,
            max_symbol,
            states: Vec::new(),
            rules: IndexMap::new(),
            decisions: Vec::new(),
            modes: IndexMap::new(),
            predicates: Vec::new(),
            actions: Vec::new(),
            commands: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn machine(&self) -> MachineKind {
        self.machine
    }

    pub fn max_symbol(&self) -> u32 {
        self.max_symbol
    }

    /// Append a fresh state of `kind` and return its id.
    pub fn add_state(&mut self, kind: StateKind) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(State::new(id, kind));
        id
    }

    /// Borrow a state. Panics if `id` was not minted by this ATN.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// All states in id order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    /// Append `transition` to `from`'s outgoing list. Position in the
    /// list is the transition's priority.
    pub fn add_transition(&mut self, from: StateId, transition: Transition) {
        self.states[from.index()].push_transition(transition);
    }

    /// Register a rule and create its start/stop pair. Rule ids follow
    /// registration order.
    pub fn define_rule(&mut self, name: &str) -> Result<(RuleId, RuleStates), AtnError> {
        if self.rules.contains_key(name) {
            return Err(AtnError::DuplicateRule { name: name.to_string() });
        }
        let rule = RuleId(self.rules.len() as u16);
        let start = self.add_state(StateKind::RuleStart { rule });
        let stop = self.add_state(StateKind::RuleStop { rule });
        let bounds = RuleStates { start, stop };
        self.rules.insert(name.to_string(), bounds);
        Ok((rule, bounds))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_states(&self, rule: RuleId) -> Option<RuleStates> {
        self.rules.get_index(rule.index()).map(|(_, bounds)| *bounds)
    }

    pub fn rule_name(&self, rule: RuleId) -> Option<&str> {
        self.rules.get_index(rule.index()).map(|(name, _)| name.as_str())
    }

    pub fn rule_by_name(&self, name: &str) -> Option<(RuleId, RuleStates)> {
        self.rules
            .get_full(name)
            .map(|(index, _, bounds)| (RuleId(index as u16), *bounds))
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &str, RuleStates)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(index, (name, bounds))| (RuleId(index as u16), name.as_str(), *bounds))
    }

    /// Register `state` as a decision point. The first registration
    /// assigns the next sequential number; repeats return the existing
    /// one.
    pub fn define_decision(&mut self, state: StateId) -> Result<DecisionId, AtnError> {
        let s = &self.states[state.index()];
        if !s.kind().is_decision_capable() {
            return Err(AtnError::NotDecision { state, found: s.kind().name() });
        }
        if let Some(existing) = s.decision() {
            return Ok(existing);
        }
        let decision = DecisionId(self.decisions.len() as u16);
        self.decisions.push(state);
        self.states[state.index()].set_decision(decision);
        Ok(decision)
    }

    /// Decision states in registration order.
    pub fn decisions(&self) -> &[StateId] {
        &self.decisions
    }

    /// Mark a decision state as preferring exit over another iteration.
    pub fn mark_non_greedy(&mut self, state: StateId) -> Result<(), AtnError> {
        let s = &self.states[state.index()];
        if !s.kind().is_decision_capable() {
            return Err(AtnError::NotDecision { state, found: s.kind().name() });
        }
        self.states[state.index()].set_non_greedy();
        Ok(())
    }

    /// Register a lexer mode and its dispatch state.
    pub fn define_mode(&mut self, name: &str, token_start: StateId) {
        self.modes.insert(name.to_string(), token_start);
    }

    /// Modes in declaration order.
    pub fn modes(&self) -> impl Iterator<Item = (&str, StateId)> {
        self.modes.iter().map(|(name, state)| (name.as_str(), *state))
    }

    pub fn mode_name(&self, mode: u16) -> Option<&str> {
        self.modes.get_index(mode as usize).map(|(name, _)| name.as_str())
    }

    /// Record a predicate body and return its table index.
    pub fn add_predicate(&mut self, rule: RuleId, body: String) -> u16 {
        let index = self.predicates.len() as u16;
        self.predicates.push(PredicateDecl { rule, body });
        index
    }

    pub fn predicates(&self) -> &[PredicateDecl] {
        &self.predicates
    }

    /// Record an action body and return its table index.
    pub fn add_action(&mut self, rule: RuleId, body: String) -> u16 {
        let index = self.actions.len() as u16;
        self.actions.push(ActionDecl { rule, body });
        index
    }

    pub fn actions(&self) -> &[ActionDecl] {
        &self.actions
    }

    /// Attach lexer commands to one `(rule, alt)`.
    pub fn set_commands(&mut self, rule: RuleId, alt: u16, commands: Vec<LexerCommand>) {
        self.commands.push(CommandSet { rule, alt, commands });
    }

    pub fn commands(&self) -> &[CommandSet] {
        &self.commands
    }

    pub fn commands_for(&self, rule: RuleId, alt: u16) -> Option<&[LexerCommand]> {
        self.commands
            .iter()
            .find(|c| c.rule == rule && c.alt == alt)
            .map(|c| c.commands.as_slice())
    }

    /// Record a label binding.
    pub fn bind_label(&mut self, rule: RuleId, name: &str, kind: LabelKind, state: StateId) {
        self.labels.push(LabelBinding { rule, name: name.to_string(), kind, state });
    }

    pub fn labels(&self) -> &[LabelBinding] {
        &self.labels
    }

    /// Resolve a star loop's entry from its loop-back state. Asserts
    /// both kinds along the way.
    pub fn loop_entry_of(&self, loop_back: StateId) -> Result<StateId, AtnError> {
        let s = self.state(loop_back);
        if !matches!(s.kind(), StateKind::StarLoopBack) {
            return Err(AtnError::KindMismatch {
                state: loop_back,
                expected: "starLoopBack",
                found: s.kind().name(),
            });
        }
        let Some(back) = s.transition(0) else {
            return Err(AtnError::MissingTransition { state: loop_back });
        };
        let entry = self.state(back.target);
        match entry.kind() {
            StateKind::StarLoopEntry => Ok(back.target),
            other => Err(AtnError::KindMismatch {
                state: back.target,
                expected: "starLoopEntry",
                found: other.name(),
            }),
        }
    }

    /// Resolve a plus loop's block start from its loop-back state. The
    /// continue edge sits first; the exit edge sits last.
    pub fn plus_block_start_of(&self, loop_back: StateId) -> Result<StateId, AtnError> {
        let s = self.state(loop_back);
        if !matches!(s.kind(), StateKind::PlusLoopBack) {
            return Err(AtnError::KindMismatch {
                state: loop_back,
                expected: "plusLoopBack",
                found: s.kind().name(),
            });
        }
        let Some(back) = s.transition(0) else {
            return Err(AtnError::MissingTransition { state: loop_back });
        };
        let start = self.state(back.target);
        match start.kind() {
            StateKind::PlusBlockStart => Ok(back.target),
            other => Err(AtnError::KindMismatch {
                state: back.target,
                expected: "plusBlockStart",
                found: other.name(),
            }),
        }
    }

    /// States reachable from rule starts and mode dispatch states.
    ///
    /// Collapsing optimizations can strand fragment states in the
    /// arena; those stay allocated but unreachable, and verification
    /// and dumps work on the reachable portion.
    pub(crate) fn reachable(&self) -> Vec<bool> {
        let mut seen = vec![false; self.states.len()];
        let mut stack: Vec<StateId> = Vec::new();
        for bounds in self.rules.values() {
            stack.push(bounds.start);
            stack.push(bounds.stop);
        }
        for &token_start in self.modes.values() {
            stack.push(token_start);
        }
        while let Some(id) = stack.pop() {
            if seen[id.index()] {
                continue;
            }
            seen[id.index()] = true;
            for t in self.states[id.index()].transitions() {
                if t.target.index() < self.states.len() && !seen[t.target.index()] {
                    stack.push(t.target);
                }
                if let TransitionKind::Rule { follow, .. } = t.kind
                    && follow.index() < self.states.len()
                    && !seen[follow.index()]
                {
                    stack.push(follow);
                }
            }
        }
        seen
    }

    /// Verify structural invariants and seal the automaton.
    pub fn freeze(self) -> Result<FrozenAtn, AtnError> {
        verify::check(&self)?;
        Ok(FrozenAtn { atn: self })
    }
}

/// Immutable, verified ATN.
///
/// Dereferences to [`Atn`] for all read access. No mutating method is
/// reachable through it, so a frozen automaton can never drift out of
/// the verified shape.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct FrozenAtn {
    atn: Atn,
}

impl Deref for FrozenAtn {
    type Target = Atn;

    fn deref(&self) -> &Atn {
        &self.atn
    }
}
