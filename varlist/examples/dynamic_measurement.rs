// Example: batches completing after later scroll events, and stale tickets.
use varlist::{BatchOutcome, Virtualizer, VirtualizerOptions};

fn main() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(40.0).with_look_ahead_count(8));
    v.attach(500, 1);
    let first = v.on_container_resize(400.0, 200.0).expect("initial batch");

    // While the first batch is in flight, scroll look-aheads are dropped.
    assert!(v.on_scroll(600.0).is_none());

    // The sandbox answers late; the results still apply because nothing invalidated them.
    let outcome = v.complete_batch(&first, first.indices().iter().map(|&i| (i, Ok(55.0))));
    println!("first batch: {outcome:?}, total={}", v.total_height());

    // The next scroll starts a new batch past the rendered range.
    let second = v.on_scroll(650.0).expect("look-ahead");
    println!("second batch: {:?}", second.indices());

    // A width change invalidates every height and abandons the in-flight batch.
    let rerun = v.on_container_resize(300.0, 200.0).expect("re-measure");
    let late = v.complete_batch(&second, second.indices().iter().map(|&i| (i, Ok(99.0))));
    assert_eq!(late, BatchOutcome::Stale);
    println!("after width change: rerun={:?} total={}", rerun.indices(), v.total_height());

    // Real rows can report their heights directly.
    v.on_measured(0, 120.0);
    println!("after on_measured(0): plan={:?}", v.plan());
}
