use varlist::VirtualizerOptions;
use varlist_adapter::{Controller, ResizeSubscription, sandbox_fn};

fn main() {
    // Example: a terminal log viewer. Each line wraps at the terminal width, so its height in
    // rows is only known once the width is.
    let lines: Vec<String> = (0..2_000)
        .map(|i| "lorem ipsum ".repeat(1 + i % 17))
        .collect();

    let text = lines.clone();
    let sandbox = sandbox_fn(move |i, width| {
        let cols = width.max(1.0) as usize;
        let chars = text[i].chars().count().max(1);
        Ok(chars.div_ceil(cols) as f64)
    });

    let mut c = Controller::new(VirtualizerOptions::new(1.0).with_buffers(1, 3), sandbox);
    c.set_resize_subscription(ResizeSubscription::new(|| println!("resize listener removed")));

    c.attach(lines.len(), 1);
    c.on_container_resize(80.0, 24.0);
    c.measure_visible();
    println!("80 cols: plan={:?}", c.plan());

    for offset in [30.0, 200.0, 1_500.0] {
        c.on_scroll(offset);
        c.measure_visible();
        let plan = c.plan();
        println!(
            "scroll={offset}: rows {}..{} start_offset={} total={}",
            plan.start_index, plan.end_index, plan.start_offset, plan.total_height
        );
    }

    // Narrowing the terminal re-wraps everything.
    c.on_container_resize(40.0, 24.0);
    c.measure_visible();
    println!("40 cols: plan={:?} batches={}", c.plan(), c.batches_run());

    c.detach();
}
