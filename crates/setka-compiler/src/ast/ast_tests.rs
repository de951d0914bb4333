use indexmap::IndexMap;
use indoc::indoc;
use setka_atn::{MachineKind, RuleId};

use crate::ast::{Element, Grammar, Quantifier, Span};

#[test]
fn grammar_deserializes_from_frontend_json() {
    let json = indoc! {r#"
        {
          "name": "Expr",
          "kind": "Parser",
          "token_names": ["PLUS", "INT"],
          "rules": [
            {
              "name": "sum",
              "span": {"start": 0, "end": 20},
              "alts": [
                {
                  "span": {"start": 6, "end": 19},
                  "elements": [
                    {"TokenRef": {"token": 1, "span": {"start": 6, "end": 9}}},
                    {"Quantified": {
                      "quantifier": "Star",
                      "inner": {"TokenRef": {"token": 0, "span": {"start": 11, "end": 15}}},
                      "span": {"start": 10, "end": 17}
                    }}
                  ]
                }
              ]
            }
          ]
        }
    "#};

    let grammar: Grammar = serde_json::from_str(json).unwrap();
    assert_eq!(grammar.name, "Expr");
    assert_eq!(grammar.kind, MachineKind::Parser);
    assert_eq!(grammar.rules.len(), 1);

    let rule = &grammar.rules[0];
    assert!(!rule.fragment);
    assert!(rule.alts[0].commands.is_empty());
    assert!(matches!(rule.alts[0].elements[0], Element::TokenRef { .. }));
    assert!(matches!(
        rule.alts[0].elements[1],
        Element::Quantified { quantifier: Quantifier::Star, .. }
    ));
}

#[test]
fn grammar_serializes_back_to_the_same_json() {
    let grammar = Grammar {
        name: "L".to_string(),
        kind: MachineKind::Lexer,
        token_names: vec!["WS".to_string()],
        channels: vec!["COMMENTS".to_string()],
        modes: IndexMap::from([("DEFAULT_MODE".to_string(), vec![RuleId(0)])]),
        rules: vec![crate::ast::RuleDecl {
            name: "WS".to_string(),
            span: Span::new(0, 5),
            fragment: false,
            alts: vec![crate::ast::Alternative {
                span: Span::new(0, 5),
                elements: vec![Element::StringLiteral { value: " ".to_string(), span: Span::new(0, 3) }],
                commands: vec![crate::ast::CommandAst {
                    name: "skip".to_string(),
                    arg: None,
                    span: Span::new(4, 8),
                }],
            }],
        }],
    };

    let value = serde_json::to_value(&grammar).unwrap();
    let back: Grammar = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(serde_json::to_value(&back).unwrap(), value);
}

#[test]
fn max_symbol_depends_on_the_machine() {
    let parser = Grammar {
        name: "P".to_string(),
        kind: MachineKind::Parser,
        token_names: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        channels: vec![],
        modes: IndexMap::new(),
        rules: vec![],
    };
    assert_eq!(parser.max_symbol(), 2);

    let lexer = Grammar { kind: MachineKind::Lexer, ..parser };
    assert_eq!(lexer.max_symbol(), 0x10FFFF);
}

#[test]
fn channels_number_after_the_builtins() {
    let grammar = Grammar {
        name: "L".to_string(),
        kind: MachineKind::Lexer,
        token_names: vec![],
        channels: vec!["COMMENTS".to_string(), "DIRECTIVES".to_string()],
        modes: IndexMap::new(),
        rules: vec![],
    };
    assert_eq!(grammar.channel("DEFAULT_TOKEN_CHANNEL"), Some(0));
    assert_eq!(grammar.channel("HIDDEN"), Some(1));
    assert_eq!(grammar.channel("COMMENTS"), Some(2));
    assert_eq!(grammar.channel("DIRECTIVES"), Some(3));
    assert_eq!(grammar.channel("NOPE"), None);
}

#[test]
fn default_mode_resolves_even_without_a_modes_table() {
    let mut grammar = Grammar {
        name: "L".to_string(),
        kind: MachineKind::Lexer,
        token_names: vec![],
        channels: vec![],
        modes: IndexMap::new(),
        rules: vec![],
    };
    assert_eq!(grammar.mode_index("DEFAULT_MODE"), Some(0));
    assert_eq!(grammar.mode_index("ISLAND"), None);

    grammar.modes.insert("DEFAULT_MODE".to_string(), vec![]);
    grammar.modes.insert("ISLAND".to_string(), vec![]);
    assert_eq!(grammar.mode_index("DEFAULT_MODE"), Some(0));
    assert_eq!(grammar.mode_index("ISLAND"), Some(1));
}

#[test]
fn token_types_come_from_vocabulary_position() {
    let grammar = Grammar {
        name: "P".to_string(),
        kind: MachineKind::Parser,
        token_names: vec!["PLUS".to_string(), "INT".to_string()],
        channels: vec![],
        modes: IndexMap::new(),
        rules: vec![],
    };
    assert_eq!(grammar.token_type("INT"), Some(crate::ast::TokenType(1)));
    assert_eq!(grammar.token_type("MINUS"), None);
}

#[test]
fn non_greedy_quantifiers_are_flagged() {
    assert!(Quantifier::Star.is_greedy());
    assert!(Quantifier::Plus.is_greedy());
    assert!(Quantifier::Optional.is_greedy());
    assert!(!Quantifier::StarNonGreedy.is_greedy());
    assert!(!Quantifier::PlusNonGreedy.is_greedy());
    assert!(!Quantifier::OptionalNonGreedy.is_greedy());
}

#[test]
fn spans_format_as_byte_ranges() {
    assert_eq!(Span::new(3, 17).to_string(), "3..17");
    let el = Element::Wildcard { span: Span::new(5, 6) };
    assert_eq!(el.span(), Span::new(5, 6));
}
