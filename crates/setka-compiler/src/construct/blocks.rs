//! Sequencing, alternation, and the optional wrapper.

use setka_atn::{IntervalSet, StateKind, TransitionKind};

use super::error::{ConstructionError, ConstructionErrorKind};
use super::factory::{BlockContext, FactoryCore, Handle};
use crate::ast::Span;

type Result<T, E = ConstructionError> = std::result::Result<T, E>;

impl FactoryCore<'_> {
    /// Sequence `parts` left to right with epsilon edges. An empty
    /// sequence becomes a lone epsilon fragment.
    pub(super) fn alt(&mut self, span: Span, parts: Vec<Handle>) -> Result<Handle> {
        if parts.is_empty() {
            return Ok(self.leaf(TransitionKind::Epsilon));
        }
        for pair in parts.windows(2) {
            self.assert_open(span, pair[0])?;
            self.link(pair[0].right, pair[1].left);
        }
        Ok(Handle { left: parts[0].left, right: parts[parts.len() - 1].right })
    }

    /// Alternation block over `alts` in priority order.
    ///
    /// Plain context allows two shortcuts: a single alternative passes
    /// through untouched, and alternatives that are all single-symbol
    /// fragments collapse into one set edge. Quantified contexts always
    /// build the full fan-out so the loop operations find typed
    /// boundary states to attach to.
    pub(super) fn block(
        &mut self,
        span: Span,
        ctx: BlockContext,
        alts: Vec<Handle>,
    ) -> Result<Handle> {
        if alts.is_empty() {
            return Err(self.err(span, ConstructionErrorKind::EmptyBlock));
        }
        if ctx == BlockContext::Plain {
            if alts.len() == 1 {
                return Ok(alts[0]);
            }
            if let Some(collapsed) = self.try_collapse(&alts) {
                return Ok(collapsed);
            }
        }
        let begin = self.atn.add_state(ctx.begin_kind());
        let end = self.atn.add_state(StateKind::BlockEnd);
        for alt in &alts {
            self.assert_open(span, *alt)?;
            self.link(begin, alt.left);
            self.link(alt.right, end);
        }
        if alts.len() > 1 {
            self.decision(span, begin)?;
        }
        Ok(Handle { left: begin, right: end })
    }

    /// Merge all-symbol alternatives into one set edge. The original
    /// fragments stay in the arena, unreachable; states are never
    /// deleted. Complemented sets stay out: their union cannot be
    /// taken symbolically.
    fn try_collapse(&mut self, alts: &[Handle]) -> Option<Handle> {
        let mut set = IntervalSet::new();
        for alt in alts {
            let left = self.atn.state(alt.left);
            if !matches!(left.kind(), StateKind::Basic) || left.transitions().len() != 1 {
                return None;
            }
            let edge = left.transitions().first()?;
            if edge.target != alt.right || !self.atn.state(alt.right).is_open() {
                return None;
            }
            match &edge.kind {
                TransitionKind::Atom { symbol } => set.add_symbol(*symbol),
                TransitionKind::Range { lo, hi } => set.add(*lo, *hi),
                TransitionKind::Set { set: other, complement: false } => set.union(other),
                _ => return None,
            }
        }
        Some(self.leaf(TransitionKind::Set { set, complement: false }))
    }

    /// `blk?`. For an alternation block the bypass becomes one more
    /// epsilon alternative appended after the real ones, so skipping
    /// always carries the lowest priority. Any other operand gets a
    /// fresh two-state wrapper with the same priority rule.
    pub(super) fn optional(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle> {
        let left_kind = self.atn.state(blk.left).kind();
        let right_kind = self.atn.state(blk.right).kind();
        if left_kind == StateKind::BlockStart && right_kind == StateKind::BlockEnd {
            self.link(blk.left, blk.right);
            self.decision(span, blk.left)?;
            self.mark_greediness(span, blk.left, greedy)?;
            return Ok(blk);
        }
        let begin = self.atn.add_state(StateKind::BlockStart);
        let end = self.atn.add_state(StateKind::BlockEnd);
        self.assert_open(span, blk)?;
        self.link(begin, blk.left);
        self.link(begin, end);
        self.link(blk.right, end);
        self.decision(span, begin)?;
        self.mark_greediness(span, begin, greedy)?;
        Ok(Handle { left: begin, right: end })
    }
}
