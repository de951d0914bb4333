//! Typed grammar AST consumed by the construction engine.
//!
//! The AST arrives from the frontend already resolved: rule references
//! carry [`RuleId`]s, token references carry [`TokenType`]s, and the
//! structure is known to be well formed. Every node keeps its source
//! span so construction errors can point back at the grammar text.

#[cfg(test)]
mod ast_tests;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use setka_atn::{LabelKind, MachineKind, RuleId};

/// Byte range of a node in the grammar source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Token type in the grammar's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenType(pub u32);

/// Complete grammar for one machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grammar {
    /// Grammar name, used in diagnostics only.
    pub name: String,
    /// Which machine this grammar describes.
    pub kind: MachineKind,
    /// Token vocabulary, indexed by `TokenType`.
    #[serde(default)]
    pub token_names: Vec<String>,
    /// Custom channel names; numbering starts after the builtin two.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Lexer modes in declaration order, each listing its member rules.
    /// The default mode, when declared, comes first.
    #[serde(default)]
    pub modes: IndexMap<String, Vec<RuleId>>,
    /// Rules in declaration order; index position is the `RuleId`.
    pub rules: Vec<RuleDecl>,
}

impl Grammar {
    pub fn rule(&self, id: RuleId) -> Option<&RuleDecl> {
        self.rules.get(id.0 as usize)
    }

    /// Largest valid symbol of the machine's alphabet: the top token
    /// type for a parser, the top code point for a lexer.
    pub fn max_symbol(&self) -> u32 {
        match self.kind {
            MachineKind::Parser => (self.token_names.len() as u32).saturating_sub(1),
            MachineKind::Lexer => char::MAX as u32,
        }
    }

    pub fn token_type(&self, name: &str) -> Option<TokenType> {
        self.token_names
            .iter()
            .position(|n| n == name)
            .map(|i| TokenType(i as u32))
    }

    /// Channel number for `name`. The two builtin channels take 0 and
    /// 1; custom channels follow in declaration order.
    pub fn channel(&self, name: &str) -> Option<u16> {
        match name {
            "DEFAULT_TOKEN_CHANNEL" => Some(0),
            "HIDDEN" => Some(1),
            _ => self
                .channels
                .iter()
                .position(|c| c == name)
                .map(|i| (i + 2) as u16),
        }
    }

    /// Mode number for `name`. A grammar without a modes table still
    /// resolves `DEFAULT_MODE` to 0.
    pub fn mode_index(&self, name: &str) -> Option<u16> {
        if let Some(index) = self.modes.get_index_of(name) {
            return Some(index as u16);
        }
        (name == "DEFAULT_MODE" && self.modes.is_empty()).then_some(0)
    }
}

/// One grammar rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDecl {
    pub name: String,
    pub span: Span,
    /// Lexer helper rule: callable from other rules but excluded from
    /// mode dispatch.
    #[serde(default)]
    pub fragment: bool,
    /// Alternatives in priority order.
    pub alts: Vec<Alternative>,
}

/// One alternative of a rule or block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    pub span: Span,
    pub elements: Vec<Element>,
    /// Lexer commands written after `->`. Only meaningful on the outer
    /// alternatives of a lexer rule.
    #[serde(default)]
    pub commands: Vec<CommandAst>,
}

/// Unresolved lexer command as written in the grammar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandAst {
    pub name: String,
    #[serde(default)]
    pub arg: Option<String>,
    pub span: Span,
}

/// Grammar expression element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Element {
    /// Reference to a token of the vocabulary.
    TokenRef { token: TokenType, span: Span },
    /// Literal string; lexer rules match it character by character.
    StringLiteral { value: String, span: Span },
    /// Symbol set with optional negation.
    Set { items: Vec<(u32, u32)>, inverted: bool, span: Span },
    /// Inclusive symbol range.
    Range { lo: u32, hi: u32, span: Span },
    /// Call to another rule.
    RuleRef { rule: RuleId, span: Span },
    /// Any symbol of the alphabet.
    Wildcard { span: Span },
    /// Nested alternation block.
    Block { alts: Vec<Alternative>, span: Span },
    /// Element wrapped by `?`, `*`, or `+`.
    Quantified { quantifier: Quantifier, inner: Box<Element>, span: Span },
    /// Semantic predicate guard.
    Sempred { body: String, span: Span },
    /// Embedded action.
    Action { body: String, span: Span },
    /// Label binding on an element.
    Labeled { name: String, kind: LabelKind, inner: Box<Element>, span: Span },
}

impl Element {
    pub fn span(&self) -> Span {
        match self {
            Element::TokenRef { span, .. }
            | Element::StringLiteral { span, .. }
            | Element::Set { span, .. }
            | Element::Range { span, .. }
            | Element::RuleRef { span, .. }
            | Element::Wildcard { span }
            | Element::Block { span, .. }
            | Element::Quantified { span, .. }
            | Element::Sempred { span, .. }
            | Element::Action { span, .. }
            | Element::Labeled { span, .. } => *span,
        }
    }
}

/// EBNF quantifier. The non-greedy variants prefer leaving the
/// construct over matching more input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantifier {
    Optional,
    OptionalNonGreedy,
    Star,
    StarNonGreedy,
    Plus,
    PlusNonGreedy,
}

impl Quantifier {
    pub fn is_greedy(&self) -> bool {
        !matches!(
            self,
            Quantifier::OptionalNonGreedy | Quantifier::StarNonGreedy | Quantifier::PlusNonGreedy
        )
    }
}
