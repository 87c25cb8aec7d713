// tests/debounce.rs
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use colvis::engine::{Debounce, Debouncer};

#[test]
fn burst_collapses_into_one_run() {
    let runs = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&runs);
    let d = Debouncer::new(Duration::from_millis(40), move || {
        r.fetch_add(1, Ordering::SeqCst);
    });
    for _ in 0..10 {
        d.notify();
        thread::sleep(Duration::from_millis(5));
    }
    thread::sleep(Duration::from_millis(200));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // a later, separate burst runs again
    d.notify();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[test]
fn flush_runs_pending_action_immediately() {
    let runs = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&runs);
    let d = Debouncer::new(Duration::from_secs(60), move || {
        r.fetch_add(1, Ordering::SeqCst);
    });
    d.notify();
    d.flush();
    d.flush(); // nothing pending any more
    drop(d); // joins the worker, so the count is final
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn dropping_discards_pending_action() {
    let runs = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&runs);
    let d = Debouncer::new(Duration::from_secs(60), move || {
        r.fetch_add(1, Ordering::SeqCst);
    });
    d.notify();
    drop(d);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn host_loop_with_state_machine() {
    // The GUI's pattern: note edits as they happen, poll once per frame.
    let ms = Duration::from_millis;
    let t0 = Instant::now();
    let mut d = Debounce::new(ms(50));
    let mut recomputes = 0;
    for frame in 0..40u64 {
        let now = t0 + ms(frame * 10);
        if frame < 12 && frame % 2 == 0 {
            d.notify(now); // typing every 20 ms
        }
        if d.poll(now) {
            recomputes += 1;
        }
    }
    assert_eq!(recomputes, 1);
}
