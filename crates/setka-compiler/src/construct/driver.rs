//! Grammar walk: builds every rule through the factory operations.
//!
//! Rules build in declaration order, alternatives in priority order,
//! elements left to right. The walk is the only allocation order in
//! play, so the same grammar always produces the same automaton.

use setka_atn::{FrozenAtn, MachineKind, RuleId, TransitionKind};

use super::error::{ConstructionError, ConstructionErrorKind};
use super::factory::{AtnFactory, BlockContext, FactoryCore, Handle, LexerFactory, ParserFactory};
use crate::ast::{Alternative, Element, Grammar, Quantifier, RuleDecl, Span};
use crate::{Error, Result};

/// Build the automaton for `grammar`, dispatching on its machine kind.
pub fn build_atn(grammar: &Grammar) -> Result<FrozenAtn> {
    match grammar.kind {
        MachineKind::Parser => build_parser_atn(grammar),
        MachineKind::Lexer => build_lexer_atn(grammar),
    }
}

/// Build a parser automaton.
///
/// A rule that fails to build aborts at its first error; the remaining
/// rules still build, so the caller sees every broken rule at once.
pub fn build_parser_atn(grammar: &Grammar) -> Result<FrozenAtn> {
    let mut factory = ParserFactory::new(grammar)?;
    build_rules(&mut factory.core)?;
    factory.finish()
}

/// Build a lexer automaton, including its mode dispatch states.
pub fn build_lexer_atn(grammar: &Grammar) -> Result<FrozenAtn> {
    let mut factory = LexerFactory::new(grammar)?;
    build_rules(&mut factory.core)?;
    factory.finish()
}

fn build_rules(core: &mut FactoryCore<'_>) -> Result<()> {
    let grammar = core.grammar;
    let mut errors = Vec::new();
    for (index, decl) in grammar.rules.iter().enumerate() {
        if let Err(e) = build_rule(core, RuleId(index as u16), decl) {
            errors.push(e);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Construction(errors))
    }
}

fn build_rule(
    core: &mut FactoryCore<'_>,
    rule: RuleId,
    decl: &RuleDecl,
) -> std::result::Result<(), ConstructionError> {
    core.set_current_rule(rule)?;
    let lexer = core.atn.machine() == MachineKind::Lexer;

    let mut alts = Vec::with_capacity(decl.alts.len());
    for (index, alt) in decl.alts.iter().enumerate() {
        core.current_alt = (index + 1) as u16;
        let handle = core.alternative(alt)?;
        if !alt.commands.is_empty() {
            if !lexer {
                return Err(core.err(alt.span, ConstructionErrorKind::CommandInParser));
            }
            let mut commands = Vec::with_capacity(alt.commands.len());
            for command in &alt.commands {
                commands.push(core.resolve_command(command)?);
            }
            core.attach_commands(alt.span, handle, commands)?;
        }
        alts.push(handle);
    }

    let body = core.block(decl.span, BlockContext::Plain, alts)?;
    core.seal_rule(decl.span, rule, body)?;
    Ok(())
}

impl FactoryCore<'_> {
    pub(super) fn alternative(
        &mut self,
        alt: &Alternative,
    ) -> std::result::Result<Handle, ConstructionError> {
        let mut parts = Vec::with_capacity(alt.elements.len());
        for element in &alt.elements {
            parts.push(self.element(element)?);
        }
        self.alt(alt.span, parts)
    }

    fn element(&mut self, element: &Element) -> std::result::Result<Handle, ConstructionError> {
        match element {
            Element::TokenRef { token, .. } => {
                Ok(self.leaf(TransitionKind::Atom { symbol: token.0 }))
            }
            Element::StringLiteral { value, span } => match self.atn.machine() {
                MachineKind::Lexer => self.literal_chain(*span, value),
                MachineKind::Parser => {
                    Err(self.err(*span, ConstructionErrorKind::LiteralInParser))
                }
            },
            Element::Set { items, inverted, span } => self.set(*span, items, *inverted),
            Element::Range { lo, hi, span } => self.range(*span, *lo, *hi),
            Element::RuleRef { rule, span } => self.rule_ref(*span, *rule),
            Element::Wildcard { .. } => Ok(self.leaf(TransitionKind::Wildcard)),
            Element::Sempred { body, span } => self.sempred(*span, body),
            Element::Action { body, span } => self.action(*span, body),
            Element::Labeled { name, kind, inner, span } => {
                let fragment = self.element(inner)?;
                self.bind_label(*span, name, *kind, fragment)
            }
            Element::Block { alts, span } => self.nested_block(*span, alts, BlockContext::Plain),
            Element::Quantified { quantifier, inner, span } => {
                self.quantified(*span, *quantifier, inner)
            }
        }
    }

    fn nested_block(
        &mut self,
        span: Span,
        alts: &[Alternative],
        ctx: BlockContext,
    ) -> std::result::Result<Handle, ConstructionError> {
        let mut handles = Vec::with_capacity(alts.len());
        for alt in alts {
            handles.push(self.alternative(alt)?);
        }
        self.block(span, ctx, handles)
    }

    /// A quantifier wraps its operand in a block of the matching
    /// context first, so the loop operations always receive typed
    /// boundaries, then applies the loop or bypass.
    fn quantified(
        &mut self,
        span: Span,
        quantifier: Quantifier,
        inner: &Element,
    ) -> std::result::Result<Handle, ConstructionError> {
        let ctx = match quantifier {
            Quantifier::Optional | Quantifier::OptionalNonGreedy => BlockContext::Optional,
            Quantifier::Star | Quantifier::StarNonGreedy => BlockContext::Star,
            Quantifier::Plus | Quantifier::PlusNonGreedy => BlockContext::Plus,
        };
        let blk = match inner {
            Element::Block { alts, .. } => self.nested_block(span, alts, ctx)?,
            other => {
                let single = self.element(other)?;
                self.block(span, ctx, vec![single])?
            }
        };
        let greedy = quantifier.is_greedy();
        match quantifier {
            Quantifier::Optional | Quantifier::OptionalNonGreedy => {
                self.optional(span, greedy, blk)
            }
            Quantifier::Star | Quantifier::StarNonGreedy => self.star(span, greedy, blk),
            Quantifier::Plus | Quantifier::PlusNonGreedy => self.plus(span, greedy, blk),
        }
    }
}
