use crate::*;

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::vec::Vec;

use varlist::{
    BatchOutcome, MeasureError, MeasurementBatch, MeasurementSandbox, SetOutcome,
    VirtualizerOptions,
};

/// Records every batch it is handed and answers with a fixed height.
#[derive(Debug, Default)]
struct Recorder {
    batches: Vec<Vec<usize>>,
    height: f64,
}

impl MeasurementSandbox for Recorder {
    fn measure_batch(
        &mut self,
        batch: &MeasurementBatch,
        report: &mut dyn FnMut(usize, Result<f64, MeasureError>),
    ) {
        self.batches.push(batch.indices().to_vec());
        for &i in batch.indices() {
            report(i, Ok(self.height));
        }
    }
}

fn recorder(height: f64) -> Recorder {
    Recorder {
        batches: Vec::new(),
        height,
    }
}

#[test]
fn initial_measurement_waits_for_a_width() {
    let mut c = Controller::new(VirtualizerOptions::new(50.0), recorder(20.0));
    assert_eq!(c.attach(100, 1), None);
    assert_eq!(c.batches_run(), 0);

    let outcome = c.on_container_resize(300.0, 100.0);
    assert!(matches!(outcome, Some(BatchOutcome::Applied(r)) if r.measured == 7));
    // ceil(100 / 50) rows plus buffer_after 5.
    assert_eq!(c.sandbox().batches, [(0..7).collect::<Vec<_>>()]);
    assert_eq!(c.virtualizer().total_height(), 7.0 * 20.0 + 93.0 * 50.0);
}

#[test]
fn each_signal_runs_at_most_one_batch() {
    let mut c = Controller::new(VirtualizerOptions::new(50.0), recorder(50.0));
    c.attach(1_000, 1);
    c.on_container_resize(300.0, 100.0);
    for step in 1..=20 {
        c.on_scroll(step as f64 * 37.0);
    }
    let batches = &c.sandbox().batches;
    assert_eq!(c.batches_run(), batches.len() as u64);

    let mut seen = std::collections::HashSet::new();
    for batch in batches {
        assert!(batch.len() <= 7);
        for &i in batch {
            assert!(seen.insert(i), "item {i} measured twice");
        }
    }
}

#[test]
fn measure_visible_fills_a_plan_wider_than_the_estimate() {
    let mut c = Controller::new(VirtualizerOptions::new(50.0).with_buffers(0, 0), recorder(10.0));
    c.attach(100, 1);
    c.on_container_resize(300.0, 100.0);
    // Initial batch: ceil(100/50) + 0 = 2 rows, each only 10 tall.
    assert_eq!(c.sandbox().batches.len(), 1);
    let plan = c.plan();
    assert!(plan.len() > 2);

    let outcome = c.measure_visible();
    assert!(matches!(outcome, Some(BatchOutcome::Applied(r)) if r.measured == 2));
    assert_eq!(c.sandbox().batches[1], [2, 3]);
    assert!((0..4).all(|i| c.virtualizer().is_measured(i)));
    // Four 10px rows leave room for more estimated rows below them.
    assert!(c.plan().len() > 4);
}

#[test]
fn failures_leave_items_unmeasured() {
    let sandbox = sandbox_fn(|i, _w| {
        if i % 2 == 0 {
            Ok(30.0)
        } else {
            Err(MeasureError::MissingContent)
        }
    });
    let mut c = Controller::new(VirtualizerOptions::new(50.0).with_buffers(0, 0), sandbox);
    c.attach(10, 1);
    let outcome = c.on_container_resize(200.0, 100.0);
    let Some(BatchOutcome::Applied(report)) = outcome else {
        panic!("expected an applied batch, got {outcome:?}");
    };
    assert_eq!(report.measured, 1);
    assert_eq!(report.failed, 1);
    assert!(c.virtualizer().is_measured(0));
    assert!(!c.virtualizer().is_measured(1));
}

#[test]
fn sandbox_sees_the_container_width() {
    let widths = Rc::new(Cell::new(0.0));
    let seen = Rc::clone(&widths);
    let sandbox = sandbox_fn(move |_i, w| {
        seen.set(w);
        Ok(24.0)
    });
    let mut c = Controller::new(VirtualizerOptions::default(), sandbox);
    c.attach(5, 1);
    c.on_container_resize(640.0, 480.0);
    assert_eq!(widths.get(), 640.0);

    c.on_container_resize(320.0, 480.0);
    assert_eq!(widths.get(), 320.0);
    assert_eq!(c.batches_run(), 2);
}

#[test]
fn on_measured_bypasses_the_sandbox() {
    let mut c = Controller::new(VirtualizerOptions::new(50.0), recorder(20.0));
    c.attach(3, 1);
    assert_eq!(c.on_measured(1, 0.0), SetOutcome::Inserted { delta: -50.0 });
    assert_eq!(c.batches_run(), 0);
    assert_eq!(c.virtualizer().total_height(), 100.0);
}

#[test]
fn detach_releases_the_resize_subscription_once() {
    let released = Arc::new(AtomicUsize::new(0));
    let hook = Arc::clone(&released);

    let mut c = Controller::new(VirtualizerOptions::default(), recorder(20.0));
    c.attach(10, 1);
    c.set_resize_subscription(ResizeSubscription::new(move || {
        hook.fetch_add(1, Ordering::SeqCst);
    }));
    assert!(c.has_resize_subscription());

    c.detach();
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert!(!c.has_resize_subscription());
    assert_eq!(c.plan(), varlist::RenderPlan::default());

    c.detach();
    drop(c);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn dropping_the_controller_releases_the_subscription() {
    let released = Arc::new(AtomicUsize::new(0));
    let hook = Arc::clone(&released);
    {
        let mut c = Controller::new(VirtualizerOptions::default(), recorder(20.0));
        c.set_resize_subscription(ResizeSubscription::new(move || {
            hook.fetch_add(1, Ordering::SeqCst);
        }));
    }
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn replacing_a_subscription_releases_the_previous_one() {
    let released = Arc::new(AtomicUsize::new(0));
    let first = Arc::clone(&released);

    let mut c = Controller::new(VirtualizerOptions::default(), recorder(20.0));
    c.set_resize_subscription(ResizeSubscription::new(move || {
        first.fetch_add(1, Ordering::SeqCst);
    }));
    c.set_resize_subscription(ResizeSubscription::default());
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert!(!c.has_resize_subscription());
}

#[test]
fn sync_sequence_measures_appended_items() {
    let mut c = Controller::new(VirtualizerOptions::new(50.0).with_buffers(0, 2), recorder(50.0));
    c.attach(4, 7);
    c.on_container_resize(200.0, 100.0);
    assert_eq!(c.virtualizer().cache().measured_count(), 4);

    let outcome = c.sync_sequence(8, 7);
    assert!(matches!(outcome, Some(BatchOutcome::Applied(_))));
    assert!(c.virtualizer().is_measured(0));
    assert!(c.virtualizer().is_measured(4));
}
