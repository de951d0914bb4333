//! Star and plus loops.
//!
//! Both loops take a block built in the matching quantified context,
//! so their boundary states already carry the loop-specific kinds.
//! Exit edges always sit last in a loop decision's transition list;
//! the freeze check enforces this.

use setka_atn::{AtnError, StateId, StateKind};

use super::error::ConstructionError;
use super::factory::{FactoryCore, Handle};
use crate::ast::Span;

type Result<T, E = ConstructionError> = std::result::Result<T, E>;

impl FactoryCore<'_> {
    fn check_boundary(&self, span: Span, state: StateId, expected: StateKind) -> Result<()> {
        let found = self.atn.state(state).kind();
        if found == expected {
            return Ok(());
        }
        Err(self.internal(
            span,
            AtnError::KindMismatch { state, expected: expected.name(), found: found.name() },
        ))
    }

    /// `blk*`. The loop entry decides between the block and the exit.
    /// A wrapper block around the whole loop adds the entry-or-bypass
    /// decision, so zero iterations never touch the loop at all.
    pub(super) fn star(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle> {
        self.check_boundary(span, blk.left, StateKind::StarBlockStart)?;
        self.check_boundary(span, blk.right, StateKind::BlockEnd)?;
        self.assert_open(span, blk)?;

        let entry = self.atn.add_state(StateKind::StarLoopEntry);
        self.link(entry, blk.left);
        let loop_end = self.atn.add_state(StateKind::LoopEnd);
        self.link(entry, loop_end);
        let loop_back = self.atn.add_state(StateKind::StarLoopBack);
        self.link(blk.right, loop_back);
        self.link(loop_back, entry);
        self.decision(span, entry)?;
        self.mark_greediness(span, entry, greedy)?;

        let begin = self.atn.add_state(StateKind::BlockStart);
        let end = self.atn.add_state(StateKind::BlockEnd);
        self.link(begin, entry);
        self.link(begin, end);
        self.link(loop_end, end);
        self.decision(span, begin)?;
        Ok(Handle { left: begin, right: end })
    }

    /// `blk+`. The loop-back decides between another pass and the
    /// exit. No wrapper block: the first pass is mandatory, so the
    /// construct cannot be bypassed.
    pub(super) fn plus(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle> {
        self.check_boundary(span, blk.left, StateKind::PlusBlockStart)?;
        self.check_boundary(span, blk.right, StateKind::BlockEnd)?;
        self.assert_open(span, blk)?;

        let loop_back = self.atn.add_state(StateKind::PlusLoopBack);
        let loop_end = self.atn.add_state(StateKind::LoopEnd);
        self.link(blk.right, loop_back);
        self.link(loop_back, blk.left);
        self.link(loop_back, loop_end);
        self.decision(span, loop_back)?;
        self.mark_greediness(span, loop_back, greedy)?;
        Ok(Handle { left: blk.left, right: loop_end })
    }
}
