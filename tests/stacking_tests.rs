use plotkit::core::StackManager;

#[test]
fn two_series_stack_into_contiguous_intervals() {
    let mut stacks = StackManager::new();
    let group = stacks.group_mut(0);

    let first = group.stack(0, 3.0);
    let second = group.stack(0, 5.0);

    assert_eq!((first.start, first.end), (0.0, 3.0));
    assert_eq!((second.start, second.end), (3.0, 8.0));
}

#[test]
fn entity_indices_accumulate_independently() {
    let mut stacks = StackManager::new();
    let group = stacks.group_mut(0);

    group.stack(0, 10.0);
    let other_slot = group.stack(1, 4.0);

    assert_eq!((other_slot.start, other_slot.end), (0.0, 4.0));
    let position = group.position(0).expect("position");
    assert_eq!(position.end, 10.0);
}

#[test]
fn negative_values_stack_below_the_baseline() {
    let mut stacks = StackManager::new();
    let group = stacks.group_mut(0);

    group.stack(0, 6.0);
    let below = group.stack(0, -2.0);
    let below_again = group.stack(0, -3.0);

    assert_eq!((below.start, below.end), (0.0, -2.0));
    assert_eq!((below_again.start, below_again.end), (-2.0, -5.0));

    // The positive side is untouched by negative contributions.
    let above = group.stack(0, 1.0);
    assert_eq!((above.start, above.end), (6.0, 7.0));
}

#[test]
fn stack_groups_are_isolated() {
    let mut stacks = StackManager::new();
    stacks.group_mut(0).stack(0, 100.0);

    let fresh = stacks.group_mut(1).stack(0, 2.0);
    assert_eq!((fresh.start, fresh.end), (0.0, 2.0));
    assert!(stacks.group(2).is_none());
}

#[test]
fn zero_values_produce_empty_intervals() {
    let mut stacks = StackManager::new();
    let group = stacks.group_mut(0);

    group.stack(0, 5.0);
    let empty = group.stack(0, 0.0);
    assert_eq!(empty.start, empty.end);
    assert_eq!(empty.end, 5.0);
}
