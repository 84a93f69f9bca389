use plotkit::core::StackManager;
use proptest::prelude::*;

proptest! {
    #[test]
    fn intervals_are_contiguous_and_sum_to_the_total(
        values in proptest::collection::vec(0.0f64..1_000.0, 1..16)
    ) {
        let mut stacks = StackManager::new();
        let group = stacks.group_mut(0);

        let mut previous_end = 0.0;
        for value in &values {
            let interval = group.stack(7, *value);
            prop_assert_eq!(interval.start, previous_end);
            prop_assert!((interval.end - interval.start - value).abs() <= 1e-9);
            previous_end = interval.end;
        }

        let total: f64 = values.iter().sum();
        prop_assert!((previous_end - total).abs() <= total.abs() * 1e-12 + 1e-9);
    }

    #[test]
    fn mixed_signs_keep_both_sides_consistent(
        values in proptest::collection::vec(-1_000.0f64..1_000.0, 1..16)
    ) {
        let mut stacks = StackManager::new();
        let group = stacks.group_mut(0);

        let mut positive_total = 0.0;
        let mut negative_total = 0.0;
        for value in &values {
            let interval = group.stack(0, *value);
            if *value >= 0.0 {
                prop_assert_eq!(interval.start, positive_total);
                positive_total = interval.end;
            } else {
                prop_assert_eq!(interval.start, negative_total);
                negative_total = interval.end;
            }
        }

        let expected_positive: f64 = values.iter().filter(|v| **v >= 0.0).sum();
        let expected_negative: f64 = values.iter().filter(|v| **v < 0.0).sum();
        prop_assert!((positive_total - expected_positive).abs() <= 1e-6);
        prop_assert!((negative_total - expected_negative).abs() <= 1e-6);
    }

    #[test]
    fn entity_slots_never_interfere(
        per_slot in proptest::collection::vec((0usize..8, 0.0f64..100.0), 1..32)
    ) {
        let mut stacks = StackManager::new();
        let group = stacks.group_mut(0);

        let mut expected = [0.0f64; 8];
        for (slot, value) in &per_slot {
            let interval = group.stack(*slot, *value);
            expected[*slot] += value;
            prop_assert!((interval.end - expected[*slot]).abs() <= 1e-9);
        }
    }
}
