use crate::atn::{RuleId, StateId, Transition, TransitionKind};
use crate::interval::IntervalSet;

fn target() -> StateId {
    StateId(0)
}

#[test]
fn atom_matches_only_its_symbol() {
    let t = Transition::new(target(), TransitionKind::Atom { symbol: 7 });
    assert!(t.matches(7, 100));
    assert!(!t.matches(8, 100));
}

#[test]
fn range_matches_inclusive_bounds() {
    let t = Transition::new(target(), TransitionKind::Range { lo: 10, hi: 20 });
    assert!(t.matches(10, 100));
    assert!(t.matches(15, 100));
    assert!(t.matches(20, 100));
    assert!(!t.matches(9, 100));
    assert!(!t.matches(21, 100));
}

#[test]
fn set_matches_membership() {
    let set = IntervalSet::from_pairs(&[(1, 3), (9, 9)]);
    let t = Transition::new(target(), TransitionKind::Set { set, complement: false });
    assert!(t.matches(2, 100));
    assert!(t.matches(9, 100));
    assert!(!t.matches(5, 100));
}

#[test]
fn complemented_set_matches_the_rest_of_the_alphabet() {
    let set = IntervalSet::from_pairs(&[(1, 3)]);
    let t = Transition::new(target(), TransitionKind::Set { set, complement: true });
    assert!(t.matches(0, 10));
    assert!(t.matches(4, 10));
    assert!(t.matches(10, 10));
    assert!(!t.matches(2, 10));
    // beyond the alphabet nothing matches, complemented or not
    assert!(!t.matches(11, 10));
}

#[test]
fn wildcard_is_bounded_by_the_alphabet() {
    let t = Transition::new(target(), TransitionKind::Wildcard);
    assert!(t.matches(0, 5));
    assert!(t.matches(5, 5));
    assert!(!t.matches(6, 5));
}

#[test]
fn non_consuming_kinds_match_nothing() {
    let kinds = [
        TransitionKind::Epsilon,
        TransitionKind::Rule { rule: RuleId(0), follow: StateId(1) },
        TransitionKind::Predicate { index: 0 },
        TransitionKind::Action { index: 0 },
    ];
    for kind in kinds {
        let t = Transition::new(target(), kind);
        assert!(!t.consumes_symbol());
        assert!(!t.matches(0, 100));
    }
}

#[test]
fn consuming_kinds_are_flagged() {
    assert!(TransitionKind::Atom { symbol: 0 }.consumes_symbol());
    assert!(TransitionKind::Range { lo: 0, hi: 1 }.consumes_symbol());
    assert!(TransitionKind::Wildcard.consumes_symbol());
    assert!(
        TransitionKind::Set { set: IntervalSet::point(1), complement: false }.consumes_symbol()
    );
    assert!(!TransitionKind::Epsilon.consumes_symbol());
}
