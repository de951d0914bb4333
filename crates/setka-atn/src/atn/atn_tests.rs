use crate::atn::{
    Atn, AtnError, LabelKind, MachineKind, RuleId, StateId, StateKind, Transition, TransitionKind,
};

/// One rule `r` matching token 0: N0 ruleStart, N1 ruleStop, N2 -t0-> N3.
fn tiny_parser_atn() -> Atn {
    let mut atn = Atn::new(MachineKind::Parser, 3);
    let (_, bounds) = atn.define_rule("r").unwrap();
    let left = atn.add_state(StateKind::Basic);
    let right = atn.add_state(StateKind::Basic);
    atn.add_transition(left, Transition::new(right, TransitionKind::Atom { symbol: 0 }));
    atn.add_transition(bounds.start, Transition::epsilon(left));
    atn.add_transition(right, Transition::epsilon(bounds.stop));
    atn
}

#[test]
fn state_ids_are_dense_and_sequential() {
    let mut atn = Atn::new(MachineKind::Parser, 0);
    let a = atn.add_state(StateKind::Basic);
    let b = atn.add_state(StateKind::BlockEnd);
    assert_eq!(a, StateId(0));
    assert_eq!(b, StateId(1));
    assert_eq!(atn.state_count(), 2);
    assert_eq!(atn.state(b).kind(), StateKind::BlockEnd);
}

#[test]
fn define_rule_creates_boundary_pairs_in_order() {
    let mut atn = Atn::new(MachineKind::Parser, 0);
    let (first, first_bounds) = atn.define_rule("expr").unwrap();
    let (second, second_bounds) = atn.define_rule("term").unwrap();

    assert_eq!(first, RuleId(0));
    assert_eq!(second, RuleId(1));
    assert_eq!((first_bounds.start, first_bounds.stop), (StateId(0), StateId(1)));
    assert_eq!((second_bounds.start, second_bounds.stop), (StateId(2), StateId(3)));
    assert_eq!(atn.state(first_bounds.start).kind(), StateKind::RuleStart { rule: first });
    assert_eq!(atn.state(second_bounds.stop).kind(), StateKind::RuleStop { rule: second });
    assert_eq!(atn.rule_name(second), Some("term"));
    assert_eq!(atn.rule_by_name("expr"), Some((first, first_bounds)));
}

#[test]
fn duplicate_rule_names_are_rejected() {
    let mut atn = Atn::new(MachineKind::Parser, 0);
    atn.define_rule("expr").unwrap();
    let err = atn.define_rule("expr").unwrap_err();
    assert_eq!(err, AtnError::DuplicateRule { name: "expr".to_string() });
}

#[test]
fn decisions_number_sequentially_in_registration_order() {
    let mut atn = Atn::new(MachineKind::Parser, 0);
    let a = atn.add_state(StateKind::BlockStart);
    let b = atn.add_state(StateKind::StarLoopEntry);
    let first = atn.define_decision(a).unwrap();
    let second = atn.define_decision(b).unwrap();
    assert_eq!(first.0, 0);
    assert_eq!(second.0, 1);
    assert_eq!(atn.decisions(), &[a, b]);
    assert_eq!(atn.state(a).decision(), Some(first));
}

#[test]
fn redefining_a_decision_keeps_its_number() {
    let mut atn = Atn::new(MachineKind::Parser, 0);
    let a = atn.add_state(StateKind::BlockStart);
    let b = atn.add_state(StateKind::PlusLoopBack);
    let first = atn.define_decision(a).unwrap();
    atn.define_decision(b).unwrap();
    let again = atn.define_decision(a).unwrap();
    assert_eq!(first, again);
    assert_eq!(atn.decisions().len(), 2);
}

#[test]
fn only_decision_capable_kinds_take_decisions() {
    let mut atn = Atn::new(MachineKind::Parser, 0);
    let basic = atn.add_state(StateKind::Basic);
    let err = atn.define_decision(basic).unwrap_err();
    assert_eq!(err, AtnError::NotDecision { state: basic, found: "basic" });

    let end = atn.add_state(StateKind::BlockEnd);
    assert!(atn.define_decision(end).is_err());
    assert!(atn.mark_non_greedy(end).is_err());
}

#[test]
fn non_greedy_marking_sticks() {
    let mut atn = Atn::new(MachineKind::Parser, 0);
    let entry = atn.add_state(StateKind::StarLoopEntry);
    atn.mark_non_greedy(entry).unwrap();
    assert!(atn.state(entry).is_non_greedy());
}

#[test]
fn loop_entry_resolves_through_the_back_edge() {
    let mut atn = Atn::new(MachineKind::Parser, 0);
    let entry = atn.add_state(StateKind::StarLoopEntry);
    let back = atn.add_state(StateKind::StarLoopBack);
    atn.add_transition(back, Transition::epsilon(entry));
    assert_eq!(atn.loop_entry_of(back).unwrap(), entry);
}

#[test]
fn loop_entry_asserts_both_kinds() {
    let mut atn = Atn::new(MachineKind::Parser, 0);
    let entry = atn.add_state(StateKind::StarLoopEntry);
    let back = atn.add_state(StateKind::StarLoopBack);
    let basic = atn.add_state(StateKind::Basic);

    // wrong source kind
    let err = atn.loop_entry_of(entry).unwrap_err();
    assert_eq!(
        err,
        AtnError::KindMismatch { state: entry, expected: "starLoopBack", found: "starLoopEntry" }
    );

    // no back edge yet
    assert_eq!(atn.loop_entry_of(back).unwrap_err(), AtnError::MissingTransition { state: back });

    // back edge pointing at the wrong kind
    atn.add_transition(back, Transition::epsilon(basic));
    assert_eq!(
        atn.loop_entry_of(back).unwrap_err(),
        AtnError::KindMismatch { state: basic, expected: "starLoopEntry", found: "basic" }
    );
}

#[test]
fn plus_block_start_resolves_through_the_back_edge() {
    let mut atn = Atn::new(MachineKind::Parser, 0);
    let start = atn.add_state(StateKind::PlusBlockStart);
    let back = atn.add_state(StateKind::PlusLoopBack);
    atn.add_transition(back, Transition::epsilon(start));
    assert_eq!(atn.plus_block_start_of(back).unwrap(), start);

    let err = atn.plus_block_start_of(start).unwrap_err();
    assert_eq!(
        err,
        AtnError::KindMismatch { state: start, expected: "plusLoopBack", found: "plusBlockStart" }
    );
}

#[test]
fn side_tables_hand_out_sequential_indices() {
    let mut atn = Atn::new(MachineKind::Lexer, 0x10FFFF);
    let rule = RuleId(0);
    assert_eq!(atn.add_predicate(rule, "a".to_string()), 0);
    assert_eq!(atn.add_predicate(rule, "b".to_string()), 1);
    assert_eq!(atn.add_action(rule, "c".to_string()), 0);
    assert_eq!(atn.predicates().len(), 2);
    assert_eq!(atn.actions().len(), 1);
}

#[test]
fn commands_are_looked_up_per_rule_and_alt() {
    use crate::atn::LexerCommand;

    let mut atn = Atn::new(MachineKind::Lexer, 0x10FFFF);
    atn.set_commands(RuleId(0), 1, vec![LexerCommand::Skip]);
    atn.set_commands(RuleId(0), 2, vec![LexerCommand::More, LexerCommand::PopMode]);

    assert_eq!(atn.commands_for(RuleId(0), 1), Some(&[LexerCommand::Skip][..]));
    assert_eq!(
        atn.commands_for(RuleId(0), 2),
        Some(&[LexerCommand::More, LexerCommand::PopMode][..])
    );
    assert_eq!(atn.commands_for(RuleId(0), 3), None);
    assert_eq!(atn.commands_for(RuleId(1), 1), None);
}

#[test]
fn freeze_hands_back_a_read_only_view() {
    let frozen = tiny_parser_atn().freeze().unwrap();
    assert_eq!(frozen.state_count(), 4);
    assert_eq!(frozen.machine(), MachineKind::Parser);
    assert_eq!(frozen.rule_count(), 1);
}

#[test]
fn frozen_atn_serializes_like_its_inner_atn() {
    let frozen = tiny_parser_atn().freeze().unwrap();
    let json = serde_json::to_string(&frozen).unwrap();
    let restored: Atn = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.dump(), frozen.dump());
}

#[test]
fn dump_of_a_tiny_machine() {
    insta::assert_snapshot!(tiny_parser_atn().dump(), @r"
    parser atn

    rules:
      r0 r: N0 → N1

    states:
      N0 ruleStart(r)
        ε → N2
      N1 ruleStop(r) → ∅
      N2 basic
        t0 → N3
      N3 basic
        ε → N1
    ");
}

#[test]
fn dump_renders_vocabulary_names() {
    let atn = tiny_parser_atn();
    let names = vec!["ID".to_string()];
    let dump = atn.printer().with_vocabulary(&names).dump();
    assert!(dump.contains("ID → N3"));
    assert!(!dump.contains("t0"));
}

#[test]
fn dump_shows_side_tables_when_present() {
    let mut atn = tiny_parser_atn();
    atn.bind_label(RuleId(0), "x", LabelKind::Label, StateId(2));
    atn.bind_label(RuleId(0), "ys", LabelKind::ListLabel, StateId(2));
    atn.add_predicate(RuleId(0), "in_bounds()".to_string());

    insta::assert_snapshot!(atn.dump(), @r"
    parser atn

    rules:
      r0 r: N0 → N1

    states:
      N0 ruleStart(r)
        ε → N2
      N1 ruleStop(r) → ∅
      N2 basic
        t0 → N3
      N3 basic
        ε → N1

    labels:
      r0 x → N2
      r0 ys[] → N2

    predicates:
      p0 r0 {in_bounds()}
    ");
}

#[test]
fn dump_hides_unreachable_states_by_default() {
    let mut atn = tiny_parser_atn();
    let orphan_left = atn.add_state(StateKind::Basic);
    let orphan_right = atn.add_state(StateKind::Basic);
    atn.add_transition(
        orphan_left,
        Transition::new(orphan_right, TransitionKind::Atom { symbol: 1 }),
    );

    let dump = atn.dump();
    assert!(!dump.contains("N4"));
    assert!(!dump.contains("N5"));

    let full = atn.printer().show_unreachable(true).dump();
    assert!(full.contains("N4 basic ✗"));
    assert!(full.contains("N5 basic ✗ → ∅"));
}
