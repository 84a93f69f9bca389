use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use plotkit::core::UpdateThrottler;

fn counting_throttler(window: Duration) -> (UpdateThrottler, Arc<AtomicUsize>) {
    let executed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&executed);
    let throttler = UpdateThrottler::new(window, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (throttler, executed)
}

#[test]
fn burst_of_calls_coalesces_into_one_execution() {
    let (throttler, executed) = counting_throttler(Duration::from_millis(30));

    for _ in 0..25 {
        throttler.call();
    }
    assert_eq!(executed.load(Ordering::SeqCst), 0);

    thread::sleep(Duration::from_millis(200));
    assert_eq!(executed.load(Ordering::SeqCst), 1);
    assert!(!throttler.is_pending());
}

#[test]
fn separate_windows_execute_separately() {
    let (throttler, executed) = counting_throttler(Duration::from_millis(10));

    throttler.call();
    thread::sleep(Duration::from_millis(100));
    throttler.call();
    thread::sleep(Duration::from_millis(100));

    assert_eq!(executed.load(Ordering::SeqCst), 2);
}

#[test]
fn force_call_runs_immediately_on_the_calling_thread() {
    let (throttler, executed) = counting_throttler(Duration::from_secs(3600));

    throttler.force_call();
    assert_eq!(executed.load(Ordering::SeqCst), 1);
}

#[test]
fn force_call_supersedes_a_pending_window() {
    let (throttler, executed) = counting_throttler(Duration::from_millis(50));

    throttler.call();
    throttler.force_call();
    assert_eq!(executed.load(Ordering::SeqCst), 1);

    // The superseded timer must not fire a second execution.
    thread::sleep(Duration::from_millis(200));
    assert_eq!(executed.load(Ordering::SeqCst), 1);
}

#[test]
fn trigger_during_execution_runs_once_more_not_concurrently() {
    let executed = Arc::new(AtomicUsize::new(0));
    let in_flight = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&executed);
    let gauge = Arc::clone(&in_flight);
    let throttler = Arc::new(UpdateThrottler::new(Duration::from_millis(1), move || {
        let concurrent = gauge.fetch_add(1, Ordering::SeqCst);
        assert_eq!(concurrent, 0, "action overlapped itself");
        thread::sleep(Duration::from_millis(50));
        gauge.fetch_sub(1, Ordering::SeqCst);
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let background = Arc::clone(&throttler);
    let handle = thread::spawn(move || background.force_call());
    // Let the in-flight execution start, then trigger again.
    thread::sleep(Duration::from_millis(20));
    throttler.call();

    handle.join().expect("join");
    thread::sleep(Duration::from_millis(200));
    assert_eq!(executed.load(Ordering::SeqCst), 2);
}
