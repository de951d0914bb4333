//! Construction error taxonomy.

use setka_atn::{AtnError, RuleId};

use crate::ast::Span;

/// Failure while building one rule's automaton.
///
/// Construction of the offending rule stops at the first error; the
/// driver records it and moves on to the remaining rules, so one bad
/// rule does not hide problems elsewhere in the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} in rule `{rule}` at {span}")]
pub struct ConstructionError {
    /// Name of the rule under construction.
    pub rule: String,
    /// Source location of the offending node.
    pub span: Span,
    pub kind: ConstructionErrorKind,
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionErrorKind {
    #[error("reference to unknown rule {0}")]
    UnknownRule(RuleId),
    #[error("block has no alternatives")]
    EmptyBlock,
    #[error("set is empty")]
    EmptySet,
    #[error("range bounds are inverted ({lo} > {hi})")]
    InvertedRange { lo: u32, hi: u32 },
    #[error("string literal is empty")]
    EmptyLiteral,
    #[error("string literal in a parser rule")]
    LiteralInParser,
    #[error("lexer command in a parser rule")]
    CommandInParser,
    #[error("unknown lexer command `{0}`")]
    UnknownCommand(String),
    #[error("lexer command `{0}` requires an argument")]
    MissingCommandArg(String),
    #[error("lexer command `{0}` takes no argument")]
    UnexpectedCommandArg(String),
    #[error("cannot resolve `{arg}` for lexer command `{name}`")]
    UnresolvedCommandArg { name: String, arg: String },
    #[error("label `{0}` already bound with a different kind")]
    ConflictingLabel(String),
    #[error("operation requires a current rule")]
    NoCurrentRule,
    #[error("grammar `{0}` is not a parser grammar")]
    NotParserGrammar(String),
    #[error("grammar `{0}` is not a lexer grammar")]
    NotLexerGrammar(String),
    /// The engine broke one of the automaton's structural contracts.
    /// Always a bug in the caller or the engine, never in the grammar.
    #[error(transparent)]
    Internal(#[from] AtnError),
}
