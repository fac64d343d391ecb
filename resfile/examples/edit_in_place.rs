//! Lazy loading, transactions and an in-place save, end to end
//!
//! Writes a small synthetic restart container into a temp directory, edits
//! one keyword through a writable view bounded to two resident keywords, and
//! verifies the save by reopening the container.

use reskw::Endianness;
use resfile::{FileView, ViewOptions};
use test_utils::{container_fixture, restart_keywords};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let fixture = container_fixture("DEMO.UNRST", &restart_keywords(), Endianness::Big);
    println!("wrote demo container {:?}", fixture.path);

    let view = FileView::open(
        &fixture.path,
        ViewOptions {
            writable: true,
            cache_limit: Some(2),
            ..ViewOptions::default()
        },
    )?;
    println!("indexed {} keywords, {} resident", view.len(), view.resident());

    // A transaction pins everything it touches, so three keywords stay
    // resident even though the budget is two.
    let mut txn = view.begin();
    let pressure = txn.touch("PRESSURE", 0)?;
    txn.touch("SWAT", 0)?;
    txn.touch("INTEHEAD", 0)?;
    println!("{} resident past the budget of 2", view.resident());

    pressure
        .write()
        .data_mut()
        .reals_mut()
        .ok_or("PRESSURE is not a Real array")?[0] = 1000.0;
    view.save("PRESSURE", 0)?;
    println!("saved PRESSURE in place");

    txn.end();
    println!("{} resident after the transaction ended", view.resident());
    drop(view);

    let reopened = FileView::open(&fixture.path, ViewOptions::default())?;
    let pressure = reopened.get("PRESSURE", 0)?;
    let guard = pressure.read();
    let reals = guard.data().reals().ok_or("PRESSURE is not a Real array")?;
    println!("reopened: PRESSURE[0] = {}, PRESSURE[1] = {}", reals[0], reals[1]);
    Ok(())
}
