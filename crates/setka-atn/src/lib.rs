//! Augmented transition network model for the Setka grammar toolkit.
//!
//! This crate holds the machine half of the pipeline:
//! - Typed states and transitions (the automaton graph)
//! - The [`Atn`] container with its rule, decision, and mode tables
//! - [`FrozenAtn`], the verified read-only view handed downstream
//! - [`IntervalSet`], the symbol sets behind set and range edges
//! - Dump printers for inspection and snapshot tests
//!
//! Construction lives in `setka-compiler`; this crate only defines the
//! shapes and enforces their invariants at freeze time.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod atn;
pub mod interval;


pub use atn::{
    ActionDecl, Atn, AtnError, AtnPrinter, CommandSet, DecisionId, FrozenAtn, LabelBinding,
    LabelKind, LexerCommand, MachineKind, PredicateDecl, RuleId, RuleStates, State, StateId,
    StateKind, Transition, TransitionKind,
};
pub use interval::{Interval, IntervalSet};
