//! List every keyword in a container without loading its data
//!
//! Usage: cargo run --example list_keywords -- <container>
//!
//! Opens the container read-only with a side-car index, so a second run on a
//! large unchanged file skips the scan entirely. No array payload is read.

use resfile::{FileView, ViewOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: list_keywords <container>");
        std::process::exit(2);
    };

    let view = FileView::open(
        &path,
        ViewOptions {
            sidecar_index: true,
            ..ViewOptions::default()
        },
    )?;

    println!("{path}: {} keywords", view.len());
    for entry in view.entries() {
        println!(
            "  {:<8} #{} {} x {:<8} header at byte {}",
            entry.name.as_str(),
            entry.occurrence,
            entry.element_type,
            entry.count,
            entry.header_offset,
        );
    }
    Ok(())
}
