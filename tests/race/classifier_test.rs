/*!
 * Outcome Classifier Properties
 */

use aio_race::{classify, DeleteStatus, ErrorSlot, RaceErrorPair, Verdict};
use proptest::prelude::*;

fn any_status() -> impl Strategy<Value = DeleteStatus> {
    any::<i32>().prop_map(DeleteStatus::from_code)
}

proptest! {
    #[test]
    fn prop_equal_slots_always_succeed(code in any::<i32>()) {
        let pair = RaceErrorPair::from_slots([ErrorSlot(code), ErrorSlot(code)]);
        prop_assert_eq!(classify(&pair), Verdict::Success);
    }

    #[test]
    fn prop_different_slots_always_retry(a in any::<i32>(), b in any::<i32>()) {
        prop_assume!(a != b);
        let pair = RaceErrorPair::from_slots([ErrorSlot(a), ErrorSlot(b)]);
        prop_assert_eq!(classify(&pair), Verdict::Retry);
    }

    #[test]
    fn prop_classify_is_pure(racer in any_status(), main in any_status()) {
        let pair = RaceErrorPair::new(racer, main);
        let first = classify(&pair);
        prop_assert_eq!(first, classify(&pair));
        prop_assert_eq!(first, classify(&RaceErrorPair::new(main, racer)));
    }
}

#[test]
fn test_both_zero_is_success() {
    let pair = RaceErrorPair::from_slots([ErrorSlot::EMPTY, ErrorSlot::EMPTY]);
    assert_eq!(classify(&pair), Verdict::Success);
    assert!(pair.both_accepted());
}
