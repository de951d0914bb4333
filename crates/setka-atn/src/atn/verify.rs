//! Freeze-time verification of structural invariants.
//!
//! Runs over the reachable portion of the graph: collapsing
//! optimizations may strand fragment states, and those carry no
//! obligations.

use super::{Atn, AtnError, StateId, StateKind, TransitionKind};

pub(super) fn check(atn: &Atn) -> Result<(), AtnError> {
    let reachable = atn.reachable();
    check_rules(atn)?;
    check_states(atn, &reachable)?;
    check_loops(atn, &reachable)?;
    Ok(())
}

/// Every registered rule must have been sealed: its start state carries
/// the epsilon into the rule body, and its stop state stays open.
fn check_rules(atn: &Atn) -> Result<(), AtnError> {
    for (_, name, bounds) in atn.rules() {
        if atn.state(bounds.start).is_open() {
            return Err(AtnError::UnsealedRule { name: name.to_string() });
        }
        if !atn.state(bounds.stop).is_open() {
            return Err(AtnError::BoundaryNotOpen { state: bounds.stop });
        }
    }
    Ok(())
}

fn check_states(atn: &Atn, reachable: &[bool]) -> Result<(), AtnError> {
    for state in atn.states() {
        if !reachable[state.id().index()] {
            continue;
        }
        for t in state.transitions() {
            if t.target.index() >= atn.state_count() {
                return Err(AtnError::InvalidTarget { state: state.id(), target: t.target });
            }
            if let TransitionKind::Rule { follow, .. } = t.kind {
                if follow.index() >= atn.state_count() {
                    return Err(AtnError::InvalidTarget { state: state.id(), target: follow });
                }
                let callee = atn.state(t.target);
                if !matches!(callee.kind(), StateKind::RuleStart { .. }) {
                    return Err(AtnError::KindMismatch {
                        state: t.target,
                        expected: "ruleStart",
                        found: callee.kind().name(),
                    });
                }
            }
        }
        if state.is_open() && !matches!(state.kind(), StateKind::RuleStop { .. }) {
            return Err(AtnError::DanglingState { state: state.id() });
        }
        if state.decision().is_some() && state.transitions().len() < 2 {
            return Err(AtnError::MalformedDecision {
                state: state.id(),
                count: state.transitions().len(),
            });
        }
    }
    Ok(())
}

/// Loop back-references must resolve, and loop decisions must keep
/// their exit edge last.
fn check_loops(atn: &Atn, reachable: &[bool]) -> Result<(), AtnError> {
    for state in atn.states() {
        if !reachable[state.id().index()] {
            continue;
        }
        match state.kind() {
            StateKind::StarLoopBack => {
                let entry = atn.loop_entry_of(state.id())?;
                check_exit_last(atn, entry)?;
            }
            StateKind::PlusLoopBack => {
                atn.plus_block_start_of(state.id())?;
                check_exit_last(atn, state.id())?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_exit_last(atn: &Atn, decision: StateId) -> Result<(), AtnError> {
    let s = atn.state(decision);
    let Some(last) = s.transitions().last() else {
        return Err(AtnError::MissingTransition { state: decision });
    };
    let target = atn.state(last.target);
    if !matches!(target.kind(), StateKind::LoopEnd) {
        return Err(AtnError::KindMismatch {
            state: last.target,
            expected: "loopEnd",
            found: target.kind().name(),
        });
    }
    Ok(())
}
