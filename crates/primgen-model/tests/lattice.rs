//! Algebraic laws of the load-state lattice.

use primgen_model::LoadState;
use proptest::prelude::*;

fn any_state() -> impl Strategy<Value = LoadState> {
    prop_oneof![
        Just(LoadState::Optional),
        Just(LoadState::Required),
        Just(LoadState::Rejected),
    ]
}

proptest! {
    #[test]
    fn merge_is_commutative(a in any_state(), b in any_state()) {
        prop_assert_eq!(a.merge(b), b.merge(a));
    }

    #[test]
    fn merge_is_associative(a in any_state(), b in any_state(), c in any_state()) {
        prop_assert_eq!(a.merge(b).merge(c), a.merge(b.merge(c)));
    }

    #[test]
    fn merge_is_idempotent(a in any_state()) {
        prop_assert_eq!(a.merge(a), a);
    }

    #[test]
    fn rejected_absorbs_everything(a in any_state()) {
        prop_assert_eq!(LoadState::Rejected.merge(a), LoadState::Rejected);
        prop_assert_eq!(a.merge(LoadState::Rejected), LoadState::Rejected);
    }

    #[test]
    fn optional_is_merge_identity(a in any_state()) {
        prop_assert_eq!(LoadState::Optional.merge(a), a);
    }

    #[test]
    fn resolve_never_yields_optional_with_decided_fallback(
        a in any_state(),
        fallback in prop_oneof![Just(LoadState::Required), Just(LoadState::Rejected)],
    ) {
        prop_assert_ne!(a.resolve_if_undefined(fallback), LoadState::Optional);
    }
}

#[test]
fn of_maps_booleans() {
    assert_eq!(LoadState::of(true), LoadState::Required);
    assert_eq!(LoadState::of(false), LoadState::Rejected);
    assert_eq!(LoadState::from(false), LoadState::Rejected);
}

#[test]
fn serializes_lowercase() {
    let json = serde_json::to_string(&LoadState::Rejected).expect("serialize state");
    assert_eq!(json, "\"rejected\"");
    let round: LoadState = serde_json::from_str("\"required\"").expect("deserialize state");
    assert_eq!(round, LoadState::Required);
}
