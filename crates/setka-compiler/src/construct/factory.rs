//! Factory traits and their parser and lexer implementations.
//!
//! Every operation hands back a [`Handle`], the two-state boundary of
//! the fragment it built. Handles compose: sequencing, alternation,
//! and the EBNF operations all consume child handles and wire new
//! epsilon edges around them, never reaching into a fragment's
//! interior.

use indexmap::IndexMap;
use setka_atn::{
    Atn, AtnError, FrozenAtn, IntervalSet, LabelKind, LexerCommand, MachineKind, RuleId, StateId,
    StateKind, Transition, TransitionKind,
};

use super::error::{ConstructionError, ConstructionErrorKind};
use crate::ast::{Grammar, Span, TokenType};

type Result<T, E = ConstructionError> = std::result::Result<T, E>;

/// Boundary pair of one constructed fragment.
///
/// `left` is the entry. `right` is the exit and is open when the handle
/// is returned; whichever operation consumes the handle wires it
/// onward. Once consumed, a handle is dead: operations take them by
/// value and return the composed fragment's new boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle {
    pub left: StateId,
    pub right: StateId,
}

/// EBNF context of a block, selecting the kind of its fan-out state.
///
/// A plain block may collapse; a quantified block always builds the
/// full fan-out so the loop operations find typed boundaries to attach
/// to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockContext {
    Plain,
    Optional,
    Star,
    Plus,
}

impl BlockContext {
    pub(super) fn begin_kind(self) -> StateKind {
        match self {
            BlockContext::Plain | BlockContext::Optional => StateKind::BlockStart,
            BlockContext::Star => StateKind::StarBlockStart,
            BlockContext::Plus => StateKind::PlusBlockStart,
        }
    }
}

/// Construction operations shared by parser and lexer machines.
pub trait AtnFactory {
    /// Fresh basic state with no transitions.
    fn new_state(&mut self) -> StateId;

    /// Select the rule subsequent operations belong to.
    fn set_current_rule(&mut self, rule: RuleId) -> Result<()>;

    fn set_current_outer_alt(&mut self, alt: u16);

    /// Two fresh states joined by an epsilon edge.
    fn epsilon(&mut self) -> Handle;

    /// Single-token match.
    fn token_ref(&mut self, token: TokenType) -> Handle;

    /// Any-symbol match.
    fn wildcard(&mut self) -> Handle;

    /// Inclusive symbol range match.
    fn range(&mut self, span: Span, lo: u32, hi: u32) -> Result<Handle>;

    /// Symbol set match. With `invert`, matches the alphabet minus the
    /// set; the complement stays symbolic until match time.
    fn set(&mut self, span: Span, items: &[(u32, u32)], invert: bool) -> Result<Handle>;

    /// Call to another rule. Builds a rule-call edge into the callee's
    /// pre-created start state; the callee is never inlined.
    fn rule_ref(&mut self, span: Span, rule: RuleId) -> Result<Handle>;

    /// Semantic predicate edge.
    fn sempred(&mut self, span: Span, body: &str) -> Result<Handle>;

    /// Embedded action edge.
    fn action(&mut self, span: Span, body: &str) -> Result<Handle>;

    /// Sequence fragments left to right.
    fn alt(&mut self, span: Span, parts: Vec<Handle>) -> Result<Handle>;

    /// Alternation block over `alts`, in priority order.
    fn block(&mut self, span: Span, ctx: BlockContext, alts: Vec<Handle>) -> Result<Handle>;

    /// `blk?`. The bypass edge is appended after the existing
    /// alternatives, so skipping always has the lowest priority.
    fn optional(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle>;

    /// `blk*`. Expects the boundary kinds a star-context block builds.
    fn star(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle>;

    /// `blk+`. Expects the boundary kinds a plus-context block builds.
    fn plus(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle>;

    /// Bind `name` to a fragment's entry state.
    fn label(&mut self, span: Span, name: &str, fragment: Handle) -> Result<Handle>;

    /// Bind `name` as an accumulating list label.
    fn list_label(&mut self, span: Span, name: &str, fragment: Handle) -> Result<Handle>;

    /// Seal a rule: wire its pre-created start and stop around `body`.
    fn rule(&mut self, span: Span, rule: RuleId, body: Handle) -> Result<Handle>;

    /// Finish construction, verify, and freeze the automaton.
    fn finish(self) -> crate::Result<FrozenAtn>
    where
        Self: Sized;

    /// Read access to the automaton under construction.
    fn atn(&self) -> &Atn;
}

/// Lexer-only construction operations.
pub trait LexerFactoryExt: AtnFactory {
    /// Chain of single-character edges, one per character of `value`.
    fn string_literal(&mut self, span: Span, value: &str) -> Result<Handle>;

    /// Set edge from a character-class literal.
    fn charset_literal(&mut self, span: Span, items: &[(u32, u32)], inverted: bool)
    -> Result<Handle>;

    /// Resolve a bare lexer command name.
    fn lexer_command(&mut self, span: Span, name: &str) -> Result<LexerCommand>;

    /// Resolve a lexer command that takes an argument.
    fn lexer_call_command(&mut self, span: Span, name: &str, arg: &str) -> Result<LexerCommand>;

    /// Attach resolved commands to the current rule and outer
    /// alternative. The alternative's fragment passes through
    /// unchanged.
    fn lexer_alt_commands(
        &mut self,
        span: Span,
        alt: Handle,
        commands: Vec<LexerCommand>,
    ) -> Result<Handle>;
}

/// State shared by both factory implementations.
///
/// The per-concern files extend this with `impl` blocks: sequencing
/// and alternation in `blocks`, loops in `loops`, lexer specifics in
/// `lexer`, the AST walk in `driver`.
#[derive(Debug)]
pub(super) struct FactoryCore<'g> {
    pub(super) atn: Atn,
    pub(super) grammar: &'g Grammar,
    pub(super) current_rule: Option<RuleId>,
    /// 1-based outer alternative number, for command attachment.
    pub(super) current_alt: u16,
    /// Label kinds seen in the current rule, for conflict detection.
    pub(super) labels_seen: IndexMap<String, LabelKind>,
}

impl<'g> FactoryCore<'g> {
    /// Create the core and pre-create every rule's start/stop pair, so
    /// rule references resolve even when they point forward or at the
    /// rule under construction.
    pub(super) fn new(grammar: &'g Grammar) -> Result<Self> {
        let mut atn = Atn::new(grammar.kind, grammar.max_symbol());
        for decl in &grammar.rules {
            if let Err(e) = atn.define_rule(&decl.name) {
                return Err(ConstructionError {
                    rule: decl.name.clone(),
                    span: decl.span,
                    kind: ConstructionErrorKind::Internal(e),
                });
            }
        }
        Ok(Self {
            atn,
            grammar,
            current_rule: None,
            current_alt: 1,
            labels_seen: IndexMap::new(),
        })
    }

    fn rule_name(&self) -> String {
        self.current_rule
            .and_then(|rule| self.atn.rule_name(rule))
            .unwrap_or("<grammar>")
            .to_string()
    }

    pub(super) fn err(&self, span: Span, kind: ConstructionErrorKind) -> ConstructionError {
        ConstructionError { rule: self.rule_name(), span, kind }
    }

    pub(super) fn internal(&self, span: Span, e: AtnError) -> ConstructionError {
        self.err(span, ConstructionErrorKind::Internal(e))
    }

    pub(super) fn require_rule(&self, span: Span) -> Result<RuleId> {
        self.current_rule
            .ok_or_else(|| self.err(span, ConstructionErrorKind::NoCurrentRule))
    }

    /// A handle's exit must still be open when an operation consumes
    /// it. A wired exit means the handle was used twice.
    pub(super) fn assert_open(&self, span: Span, handle: Handle) -> Result<()> {
        if self.atn.state(handle.right).is_open() {
            Ok(())
        } else {
            Err(self.internal(span, AtnError::BoundaryNotOpen { state: handle.right }))
        }
    }

    pub(super) fn add_basic(&mut self) -> StateId {
        self.atn.add_state(StateKind::Basic)
    }

    pub(super) fn link(&mut self, from: StateId, to: StateId) {
        self.atn.add_transition(from, Transition::epsilon(to));
    }

    /// Two fresh basic states joined by one edge of `kind`.
    pub(super) fn leaf(&mut self, kind: TransitionKind) -> Handle {
        let left = self.add_basic();
        let right = self.add_basic();
        self.atn.add_transition(left, Transition::new(right, kind));
        Handle { left, right }
    }

    pub(super) fn decision(&mut self, span: Span, state: StateId) -> Result<()> {
        self.atn
            .define_decision(state)
            .map(|_| ())
            .map_err(|e| self.internal(span, e))
    }

    pub(super) fn mark_greediness(&mut self, span: Span, state: StateId, greedy: bool) -> Result<()> {
        if greedy {
            return Ok(());
        }
        self.atn
            .mark_non_greedy(state)
            .map_err(|e| self.internal(span, e))
    }

    pub(super) fn set_current_rule(&mut self, rule: RuleId) -> Result<()> {
        if self.atn.rule_states(rule).is_none() {
            return Err(ConstructionError {
                rule: self.rule_name(),
                span: Span::default(),
                kind: ConstructionErrorKind::UnknownRule(rule),
            });
        }
        self.current_rule = Some(rule);
        self.current_alt = 1;
        self.labels_seen.clear();
        Ok(())
    }

    pub(super) fn range(&mut self, span: Span, lo: u32, hi: u32) -> Result<Handle> {
        if lo > hi {
            return Err(self.err(span, ConstructionErrorKind::InvertedRange { lo, hi }));
        }
        Ok(self.leaf(TransitionKind::Range { lo, hi }))
    }

    pub(super) fn set(&mut self, span: Span, items: &[(u32, u32)], invert: bool) -> Result<Handle> {
        if items.is_empty() {
            return Err(self.err(span, ConstructionErrorKind::EmptySet));
        }
        let mut set = IntervalSet::new();
        for &(lo, hi) in items {
            if lo > hi {
                return Err(self.err(span, ConstructionErrorKind::InvertedRange { lo, hi }));
            }
            set.add(lo, hi);
        }
        Ok(self.leaf(TransitionKind::Set { set, complement: invert }))
    }

    pub(super) fn rule_ref(&mut self, span: Span, rule: RuleId) -> Result<Handle> {
        let Some(bounds) = self.atn.rule_states(rule) else {
            return Err(self.err(span, ConstructionErrorKind::UnknownRule(rule)));
        };
        let left = self.add_basic();
        let right = self.add_basic();
        self.atn.add_transition(
            left,
            Transition::new(bounds.start, TransitionKind::Rule { rule, follow: right }),
        );
        Ok(Handle { left, right })
    }

    pub(super) fn sempred(&mut self, span: Span, body: &str) -> Result<Handle> {
        let rule = self.require_rule(span)?;
        let index = self.atn.add_predicate(rule, body.to_string());
        Ok(self.leaf(TransitionKind::Predicate { index }))
    }

    pub(super) fn action(&mut self, span: Span, body: &str) -> Result<Handle> {
        let rule = self.require_rule(span)?;
        let index = self.atn.add_action(rule, body.to_string());
        Ok(self.leaf(TransitionKind::Action { index }))
    }

    pub(super) fn bind_label(
        &mut self,
        span: Span,
        name: &str,
        kind: LabelKind,
        fragment: Handle,
    ) -> Result<Handle> {
        let rule = self.require_rule(span)?;
        if let Some(previous) = self.labels_seen.get(name)
            && *previous != kind
        {
            return Err(self.err(span, ConstructionErrorKind::ConflictingLabel(name.to_string())));
        }
        self.labels_seen.insert(name.to_string(), kind);
        self.atn.bind_label(rule, name, kind, fragment.left);
        Ok(fragment)
    }

    /// Wire a rule's pre-created boundary around its finished body.
    pub(super) fn seal_rule(&mut self, span: Span, rule: RuleId, body: Handle) -> Result<Handle> {
        let Some(bounds) = self.atn.rule_states(rule) else {
            return Err(self.err(span, ConstructionErrorKind::UnknownRule(rule)));
        };
        if !self.atn.state(bounds.start).is_open() {
            return Err(self.internal(span, AtnError::BoundaryNotOpen { state: bounds.start }));
        }
        self.assert_open(span, body)?;
        self.link(bounds.start, body.left);
        self.link(body.right, bounds.stop);
        Ok(Handle { left: bounds.start, right: bounds.stop })
    }
}

/// Factory for parser grammars. Symbols are token types.
#[derive(Debug)]
pub struct ParserFactory<'g> {
    pub(super) core: FactoryCore<'g>,
}

impl<'g> ParserFactory<'g> {
    pub fn new(grammar: &'g Grammar) -> Result<Self> {
        if grammar.kind != MachineKind::Parser {
            return Err(ConstructionError {
                rule: "<grammar>".to_string(),
                span: Span::default(),
                kind: ConstructionErrorKind::NotParserGrammar(grammar.name.clone()),
            });
        }
        Ok(Self { core: FactoryCore::new(grammar)? })
    }
}

impl AtnFactory for ParserFactory<'_> {
    fn new_state(&mut self) -> StateId {
        self.core.add_basic()
    }

    fn set_current_rule(&mut self, rule: RuleId) -> Result<()> {
        self.core.set_current_rule(rule)
    }

    fn set_current_outer_alt(&mut self, alt: u16) {
        self.core.current_alt = alt;
    }

    fn epsilon(&mut self) -> Handle {
        self.core.leaf(TransitionKind::Epsilon)
    }

    fn token_ref(&mut self, token: TokenType) -> Handle {
        self.core.leaf(TransitionKind::Atom { symbol: token.0 })
    }

    fn wildcard(&mut self) -> Handle {
        self.core.leaf(TransitionKind::Wildcard)
    }

    fn range(&mut self, span: Span, lo: u32, hi: u32) -> Result<Handle> {
        self.core.range(span, lo, hi)
    }

    fn set(&mut self, span: Span, items: &[(u32, u32)], invert: bool) -> Result<Handle> {
        self.core.set(span, items, invert)
    }

    fn rule_ref(&mut self, span: Span, rule: RuleId) -> Result<Handle> {
        self.core.rule_ref(span, rule)
    }

    fn sempred(&mut self, span: Span, body: &str) -> Result<Handle> {
        self.core.sempred(span, body)
    }

    fn action(&mut self, span: Span, body: &str) -> Result<Handle> {
        self.core.action(span, body)
    }

    fn alt(&mut self, span: Span, parts: Vec<Handle>) -> Result<Handle> {
        self.core.alt(span, parts)
    }

    fn block(&mut self, span: Span, ctx: BlockContext, alts: Vec<Handle>) -> Result<Handle> {
        self.core.block(span, ctx, alts)
    }

    fn optional(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle> {
        self.core.optional(span, greedy, blk)
    }

    fn star(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle> {
        self.core.star(span, greedy, blk)
    }

    fn plus(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle> {
        self.core.plus(span, greedy, blk)
    }

    fn label(&mut self, span: Span, name: &str, fragment: Handle) -> Result<Handle> {
        self.core.bind_label(span, name, LabelKind::Label, fragment)
    }

    fn list_label(&mut self, span: Span, name: &str, fragment: Handle) -> Result<Handle> {
        self.core.bind_label(span, name, LabelKind::ListLabel, fragment)
    }

    fn rule(&mut self, span: Span, rule: RuleId, body: Handle) -> Result<Handle> {
        self.core.seal_rule(span, rule, body)
    }

    fn finish(self) -> crate::Result<FrozenAtn> {
        Ok(self.core.atn.freeze()?)
    }

    fn atn(&self) -> &Atn {
        &self.core.atn
    }
}

/// Factory for lexer grammars. Symbols are Unicode code points.
#[derive(Debug)]
pub struct LexerFactory<'g> {
    pub(super) core: FactoryCore<'g>,
}

impl<'g> LexerFactory<'g> {
    pub fn new(grammar: &'g Grammar) -> Result<Self> {
        if grammar.kind != MachineKind::Lexer {
            return Err(ConstructionError {
                rule: "<grammar>".to_string(),
                span: Span::default(),
                kind: ConstructionErrorKind::NotLexerGrammar(grammar.name.clone()),
            });
        }
        Ok(Self { core: FactoryCore::new(grammar)? })
    }
}

impl AtnFactory for LexerFactory<'_> {
    fn new_state(&mut self) -> StateId {
        self.core.add_basic()
    }

    fn set_current_rule(&mut self, rule: RuleId) -> Result<()> {
        self.core.set_current_rule(rule)
    }

    fn set_current_outer_alt(&mut self, alt: u16) {
        self.core.current_alt = alt;
    }

    fn epsilon(&mut self) -> Handle {
        self.core.leaf(TransitionKind::Epsilon)
    }

    fn token_ref(&mut self, token: TokenType) -> Handle {
        self.core.leaf(TransitionKind::Atom { symbol: token.0 })
    }

    fn wildcard(&mut self) -> Handle {
        self.core.leaf(TransitionKind::Wildcard)
    }

    fn range(&mut self, span: Span, lo: u32, hi: u32) -> Result<Handle> {
        self.core.range(span, lo, hi)
    }

    fn set(&mut self, span: Span, items: &[(u32, u32)], invert: bool) -> Result<Handle> {
        self.core.set(span, items, invert)
    }

    fn rule_ref(&mut self, span: Span, rule: RuleId) -> Result<Handle> {
        self.core.rule_ref(span, rule)
    }

    fn sempred(&mut self, span: Span, body: &str) -> Result<Handle> {
        self.core.sempred(span, body)
    }

    fn action(&mut self, span: Span, body: &str) -> Result<Handle> {
        self.core.action(span, body)
    }

    fn alt(&mut self, span: Span, parts: Vec<Handle>) -> Result<Handle> {
        self.core.alt(span, parts)
    }

    fn block(&mut self, span: Span, ctx: BlockContext, alts: Vec<Handle>) -> Result<Handle> {
        self.core.block(span, ctx, alts)
    }

    fn optional(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle> {
        self.core.optional(span, greedy, blk)
    }

    fn star(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle> {
        self.core.star(span, greedy, blk)
    }

    fn plus(&mut self, span: Span, greedy: bool, blk: Handle) -> Result<Handle> {
        self.core.plus(span, greedy, blk)
    }

    fn label(&mut self, span: Span, name: &str, fragment: Handle) -> Result<Handle> {
        self.core.bind_label(span, name, LabelKind::Label, fragment)
    }

    fn list_label(&mut self, span: Span, name: &str, fragment: Handle) -> Result<Handle> {
        self.core.bind_label(span, name, LabelKind::ListLabel, fragment)
    }

    fn rule(&mut self, span: Span, rule: RuleId, body: Handle) -> Result<Handle> {
        self.core.seal_rule(span, rule, body)
    }

    fn finish(mut self) -> crate::Result<FrozenAtn> {
        self.core.build_modes()?;
        Ok(self.core.atn.freeze()?)
    }

    fn atn(&self) -> &Atn {
        &self.core.atn
    }
}

impl LexerFactoryExt for LexerFactory<'_> {
    fn string_literal(&mut self, span: Span, value: &str) -> Result<Handle> {
        self.core.literal_chain(span, value)
    }

    fn charset_literal(
        &mut self,
        span: Span,
        items: &[(u32, u32)],
        inverted: bool,
    ) -> Result<Handle> {
        self.core.set(span, items, inverted)
    }

    fn lexer_command(&mut self, span: Span, name: &str) -> Result<LexerCommand> {
        self.core.resolve_bare_command(span, name)
    }

    fn lexer_call_command(&mut self, span: Span, name: &str, arg: &str) -> Result<LexerCommand> {
        self.core.resolve_call_command(span, name, arg)
    }

    fn lexer_alt_commands(
        &mut self,
        span: Span,
        alt: Handle,
        commands: Vec<LexerCommand>,
    ) -> Result<Handle> {
        self.core.attach_commands(span, alt, commands)
    }
}
