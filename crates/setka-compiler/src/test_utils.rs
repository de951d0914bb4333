//! Test utilities: grammar builders and snapshot macros.

use indexmap::IndexMap;
use setka_atn::{FrozenAtn, LabelKind, MachineKind, RuleId};

use crate::ast::{Alternative, CommandAst, Element, Grammar, Quantifier, RuleDecl, Span, TokenType};

pub fn sp() -> Span {
    Span::default()
}

pub fn tok(token: u32) -> Element {
    Element::TokenRef { token: TokenType(token), span: sp() }
}

pub fn lit(value: &str) -> Element {
    Element::StringLiteral { value: value.to_string(), span: sp() }
}

pub fn chars(items: &[(char, char)]) -> Element {
    char_set(items, false)
}

pub fn not_chars(items: &[(char, char)]) -> Element {
    char_set(items, true)
}

fn char_set(items: &[(char, char)], inverted: bool) -> Element {
    let items = items.iter().map(|&(lo, hi)| (lo as u32, hi as u32)).collect();
    Element::Set { items, inverted, span: sp() }
}

pub fn tok_set(types: &[u32]) -> Element {
    let items = types.iter().map(|&t| (t, t)).collect();
    Element::Set { items, inverted: false, span: sp() }
}

pub fn range(lo: char, hi: char) -> Element {
    Element::Range { lo: lo as u32, hi: hi as u32, span: sp() }
}

pub fn rule_ref(rule: u16) -> Element {
    Element::RuleRef { rule: RuleId(rule), span: sp() }
}

pub fn wildcard() -> Element {
    Element::Wildcard { span: sp() }
}

pub fn pred(body: &str) -> Element {
    Element::Sempred { body: body.to_string(), span: sp() }
}

pub fn act(body: &str) -> Element {
    Element::Action { body: body.to_string(), span: sp() }
}

pub fn labeled(name: &str, inner: Element) -> Element {
    Element::Labeled {
        name: name.to_string(),
        kind: LabelKind::Label,
        inner: Box::new(inner),
        span: sp(),
    }
}

pub fn list_labeled(name: &str, inner: Element) -> Element {
    Element::Labeled {
        name: name.to_string(),
        kind: LabelKind::ListLabel,
        inner: Box::new(inner),
        span: sp(),
    }
}

pub fn block(alts: Vec<Vec<Element>>) -> Element {
    Element::Block { alts: alts.into_iter().map(alt).collect(), span: sp() }
}

pub fn quantified(quantifier: Quantifier, inner: Element) -> Element {
    Element::Quantified { quantifier, inner: Box::new(inner), span: sp() }
}

pub fn opt(inner: Element) -> Element {
    quantified(Quantifier::Optional, inner)
}

pub fn star(inner: Element) -> Element {
    quantified(Quantifier::Star, inner)
}

pub fn plus(inner: Element) -> Element {
    quantified(Quantifier::Plus, inner)
}

pub fn alt(elements: Vec<Element>) -> Alternative {
    Alternative { span: sp(), elements, commands: Vec::new() }
}

pub fn rule(name: &str, alts: Vec<Vec<Element>>) -> RuleDecl {
    RuleDecl {
        name: name.to_string(),
        span: sp(),
        fragment: false,
        alts: alts.into_iter().map(alt).collect(),
    }
}

pub fn fragment_rule(name: &str, alts: Vec<Vec<Element>>) -> RuleDecl {
    RuleDecl { fragment: true, ..rule(name, alts) }
}

pub fn command(name: &str, arg: Option<&str>) -> CommandAst {
    CommandAst { name: name.to_string(), arg: arg.map(str::to_string), span: sp() }
}

pub fn rule_with_commands(
    name: &str,
    elements: Vec<Element>,
    commands: Vec<CommandAst>,
) -> RuleDecl {
    RuleDecl {
        name: name.to_string(),
        span: sp(),
        fragment: false,
        alts: vec![Alternative { span: sp(), elements, commands }],
    }
}

pub fn parser_grammar(tokens: &[&str], rules: Vec<RuleDecl>) -> Grammar {
    Grammar {
        name: "Test".to_string(),
        kind: MachineKind::Parser,
        token_names: tokens.iter().map(|t| t.to_string()).collect(),
        channels: Vec::new(),
        modes: IndexMap::new(),
        rules,
    }
}

pub fn lexer_grammar(rules: Vec<RuleDecl>) -> Grammar {
    Grammar {
        name: "TestLexer".to_string(),
        kind: MachineKind::Lexer,
        token_names: Vec::new(),
        channels: Vec::new(),
        modes: IndexMap::new(),
        rules,
    }
}

pub fn build_parser(tokens: &[&str], rules: Vec<RuleDecl>) -> FrozenAtn {
    crate::build_parser_atn(&parser_grammar(tokens, rules)).expect("grammar should build")
}

pub fn build_lexer(rules: Vec<RuleDecl>) -> FrozenAtn {
    crate::build_lexer_atn(&lexer_grammar(rules)).expect("grammar should build")
}

/// Snapshot test for the automaton a grammar builds.
#[macro_export]
macro_rules! shot_atn {
    ($grammar:expr, @$snapshot:literal) => {{
        let grammar = $grammar;
        let atn = $crate::build_atn(&grammar).expect("grammar should build");
        insta::with_settings!({ omit_expression => true }, {
            insta::assert_snapshot!(atn.dump(), @$snapshot);
        });
    }};
}
