// Example: export and import measured heights.
use varlist::{Virtualizer, VirtualizerOptions};

fn main() {
    // Heights are only valid for the width and sequence they were measured at, so the
    // snapshot carries both and import checks them.
    let mut v1 = Virtualizer::new(VirtualizerOptions::new(30.0));
    v1.attach(10, 7);
    v1.on_container_resize(480.0, 240.0);
    v1.on_measured(2, 64.0);
    v1.on_measured(5, 18.0);

    let snapshot = v1.export_measurements();
    println!("exported {} entries at width {}", snapshot.len(), snapshot.width);

    let mut v2 = Virtualizer::new(VirtualizerOptions::new(30.0));
    v2.attach(10, 7);
    v2.on_container_resize(480.0, 240.0);
    println!("before import: total={}", v2.total_height());
    match v2.import_measurements(&snapshot) {
        Ok(changed) => println!("imported {changed}, total={}", v2.total_height()),
        Err(err) => println!("import refused: {err}"),
    }

    v2.on_container_resize(320.0, 240.0);
    if let Err(err) = v2.import_measurements(&snapshot) {
        println!("after resize: {err}");
    }
}
