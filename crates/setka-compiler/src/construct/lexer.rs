//! Lexer-only construction: literal chains, command resolution, and
//! mode dispatch.

use setka_atn::{LexerCommand, RuleId, StateKind, Transition, TransitionKind};

use super::error::{ConstructionError, ConstructionErrorKind};
use super::factory::{FactoryCore, Handle};
use crate::ast::{CommandAst, Span};

type Result<T, E = ConstructionError> = std::result::Result<T, E>;

impl FactoryCore<'_> {
    /// Chain for a string literal: `n + 1` states joined by one atom
    /// edge per character.
    pub(super) fn literal_chain(&mut self, span: Span, value: &str) -> Result<Handle> {
        if value.is_empty() {
            return Err(self.err(span, ConstructionErrorKind::EmptyLiteral));
        }
        let left = self.add_basic();
        let mut current = left;
        for ch in value.chars() {
            let next = self.add_basic();
            self.atn.add_transition(
                current,
                Transition::new(next, TransitionKind::Atom { symbol: ch as u32 }),
            );
            current = next;
        }
        Ok(Handle { left, right: current })
    }

    pub(super) fn resolve_command(&self, command: &CommandAst) -> Result<LexerCommand> {
        match &command.arg {
            Some(arg) => self.resolve_call_command(command.span, &command.name, arg),
            None => self.resolve_bare_command(command.span, &command.name),
        }
    }

    pub(super) fn resolve_bare_command(&self, span: Span, name: &str) -> Result<LexerCommand> {
        match name {
            "skip" => Ok(LexerCommand::Skip),
            "more" => Ok(LexerCommand::More),
            "popMode" => Ok(LexerCommand::PopMode),
            "mode" | "pushMode" | "type" | "channel" => {
                Err(self.err(span, ConstructionErrorKind::MissingCommandArg(name.to_string())))
            }
            _ => Err(self.err(span, ConstructionErrorKind::UnknownCommand(name.to_string()))),
        }
    }

    /// Command arguments resolve by name against the grammar's tables,
    /// falling back to a bare integer.
    pub(super) fn resolve_call_command(
        &self,
        span: Span,
        name: &str,
        arg: &str,
    ) -> Result<LexerCommand> {
        match name {
            "mode" => self.mode_arg(span, name, arg).map(LexerCommand::Mode),
            "pushMode" => self.mode_arg(span, name, arg).map(LexerCommand::PushMode),
            "type" => self.type_arg(span, name, arg).map(LexerCommand::Type),
            "channel" => self.channel_arg(span, name, arg).map(LexerCommand::Channel),
            "skip" | "more" | "popMode" => {
                Err(self.err(span, ConstructionErrorKind::UnexpectedCommandArg(name.to_string())))
            }
            _ => Err(self.err(span, ConstructionErrorKind::UnknownCommand(name.to_string()))),
        }
    }

    fn unresolved(&self, span: Span, name: &str, arg: &str) -> ConstructionError {
        self.err(
            span,
            ConstructionErrorKind::UnresolvedCommandArg {
                name: name.to_string(),
                arg: arg.to_string(),
            },
        )
    }

    fn mode_arg(&self, span: Span, name: &str, arg: &str) -> Result<u16> {
        if let Some(index) = self.grammar.mode_index(arg) {
            return Ok(index);
        }
        arg.parse().map_err(|_| self.unresolved(span, name, arg))
    }

    fn type_arg(&self, span: Span, name: &str, arg: &str) -> Result<u32> {
        if let Some(token) = self.grammar.token_type(arg) {
            return Ok(token.0);
        }
        arg.parse().map_err(|_| self.unresolved(span, name, arg))
    }

    fn channel_arg(&self, span: Span, name: &str, arg: &str) -> Result<u16> {
        if let Some(channel) = self.grammar.channel(arg) {
            return Ok(channel);
        }
        arg.parse().map_err(|_| self.unresolved(span, name, arg))
    }

    /// Record `commands` for the current rule and outer alternative.
    /// The alternative's fragment passes through unchanged.
    pub(super) fn attach_commands(
        &mut self,
        span: Span,
        alt: Handle,
        commands: Vec<LexerCommand>,
    ) -> Result<Handle> {
        let rule = self.require_rule(span)?;
        self.atn.set_commands(rule, self.current_alt, commands);
        Ok(alt)
    }

    /// Build the dispatch state of every mode: one token-start state
    /// with an epsilon to each non-fragment member rule. A grammar
    /// without a modes table gets the default mode over all rules.
    pub(super) fn build_modes(&mut self) -> Result<()> {
        let grammar = self.grammar;
        let modes: Vec<(&str, Vec<RuleId>)> = if grammar.modes.is_empty() {
            let members = (0..grammar.rules.len()).map(|i| RuleId(i as u16)).collect();
            vec![("DEFAULT_MODE", members)]
        } else {
            grammar
                .modes
                .iter()
                .map(|(name, members)| (name.as_str(), members.clone()))
                .collect()
        };

        for (index, (name, members)) in modes.iter().enumerate() {
            let token_start = self.atn.add_state(StateKind::TokenStart { mode: index as u16 });
            self.atn.define_mode(name, token_start);
            for &rule in members {
                let Some(decl) = grammar.rule(rule) else {
                    return Err(self.err(Span::default(), ConstructionErrorKind::UnknownRule(rule)));
                };
                if decl.fragment {
                    continue;
                }
                let Some(bounds) = self.atn.rule_states(rule) else {
                    return Err(self.err(Span::default(), ConstructionErrorKind::UnknownRule(rule)));
                };
                self.link(token_start, bounds.start);
            }
        }
        Ok(())
    }
}
