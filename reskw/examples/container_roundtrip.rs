//! Encode a few keywords into an in-memory container and read them back
//!
//! Demonstrates the codec on its own, without the file-view layer: write a
//! header-plus-data record group per keyword, then iterate until the
//! end-of-container signal.

use std::io::Cursor;

use reskw::{Endianness, Keyword, Scalar, TypedArray};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let endian = Endianness::Big;

    let mut container = Vec::new();
    Keyword::new("INTEHEAD", TypedArray::Int((0..95).collect()))?.write(&mut container, endian)?;
    // 2500 elements split into three physical records of 1000/1000/500.
    Keyword::new("PRESSURE", TypedArray::Real(vec![250.0; 2500]))?
        .write(&mut container, endian)?;
    Keyword::new(
        "ZWEL",
        TypedArray::Char(vec!["PROD-1".into(), "INJ-2".into()]),
    )?
    .write(&mut container, endian)?;

    println!("container holds {} bytes", container.len());

    let mut cursor = Cursor::new(&container[..]);
    while let Some(mut kw) = Keyword::read(&mut cursor, endian)? {
        println!("read {:<8} {} x {}", kw.name(), kw.element_type(), kw.len());
        if *kw.name() == "PRESSURE" {
            kw.scale(&Scalar::Real(2.0))?;
            let reals = kw.data().reals().ok_or("PRESSURE is not a Real array")?;
            println!("  doubled: PRESSURE[0] = {}", reals[0]);
        }
    }

    println!("reached the end of the container");
    Ok(())
}
