use varlist::{MeasureError, Virtualizer, VirtualizerOptions};

fn main() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(50.0).with_buffers(2, 5));

    // No width yet: nothing can be measured.
    assert!(v.attach(1_000, 1).is_none());

    // First layout: the initial look-ahead covers the estimated first screenful.
    let batch = v.on_container_resize(320.0, 300.0).expect("initial batch");
    println!("initial batch: {:?}", batch.indices());

    // Pretend every odd row wraps onto a second line.
    let results = batch.indices().iter().map(|&i| {
        let h: Result<f64, MeasureError> = Ok(if i % 2 == 1 { 72.0 } else { 36.0 });
        (i, h)
    });
    v.complete_batch(&batch, results);
    println!("plan: {:?}", v.plan());

    if let Some(batch) = v.on_scroll(2_000.0) {
        println!("look-ahead after scroll: {:?}", batch.indices());
    }
    let plan = v.plan();
    println!(
        "render {}..{} from y={} in a {}px tall region",
        plan.start_index, plan.end_index, plan.start_offset, plan.total_height
    );
}
