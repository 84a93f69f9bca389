use plotkit::core::PointLifecycleTracker;

#[test]
fn first_pass_creates_every_point() {
    let mut tracker = PointLifecycleTracker::new();

    tracker.begin_pass();
    assert!(tracker.mark_seen(0));
    assert!(tracker.mark_seen(1));
    assert!(tracker.finish_pass().is_empty());
    assert_eq!(tracker.live_count(), 2);
}

#[test]
fn repeated_points_are_not_recreated() {
    let mut tracker = PointLifecycleTracker::new();

    tracker.begin_pass();
    tracker.mark_seen(0);
    tracker.finish_pass();

    tracker.begin_pass();
    assert!(!tracker.mark_seen(0));
    tracker.finish_pass();
}

#[test]
fn shrinking_the_sequence_reports_exactly_the_vanished_indices() {
    let mut tracker = PointLifecycleTracker::new();

    tracker.begin_pass();
    for index in 0..5 {
        tracker.mark_seen(index);
    }
    tracker.finish_pass();

    tracker.begin_pass();
    tracker.mark_seen(0);
    tracker.mark_seen(2);
    tracker.mark_seen(4);
    let vanished = tracker.finish_pass();

    assert_eq!(vanished, vec![1, 3]);
    assert_eq!(tracker.live_count(), 3);
    assert!(tracker.is_live(4));
    assert!(!tracker.is_live(3));
}

#[test]
fn a_vanished_point_can_reappear_as_new() {
    let mut tracker = PointLifecycleTracker::new();

    tracker.begin_pass();
    tracker.mark_seen(0);
    tracker.mark_seen(1);
    tracker.finish_pass();

    tracker.begin_pass();
    tracker.mark_seen(0);
    tracker.finish_pass();

    tracker.begin_pass();
    // Index 1 was evicted, so it counts as a creation again.
    assert!(tracker.mark_seen(1));
}

#[test]
fn clear_behaves_like_a_rebind() {
    let mut tracker = PointLifecycleTracker::new();

    tracker.begin_pass();
    tracker.mark_seen(0);
    tracker.finish_pass();

    tracker.clear();
    assert_eq!(tracker.live_count(), 0);

    tracker.begin_pass();
    assert!(tracker.mark_seen(0));
}
