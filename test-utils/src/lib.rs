//! Test utilities for resfile-rs
//!
//! Builds small synthetic containers on disk so integration tests can
//! exercise indexing, lazy loading and in-place saves against real files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use reskw::{Endianness, Keyword, TypedArray};

/// Write `keywords` to `path` as one container.
pub fn write_container(path: &Path, keywords: &[Keyword], endian: Endianness) -> reskw::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for kw in keywords {
        kw.write(&mut writer, endian)?;
    }
    writer.flush()?;
    Ok(())
}

/// A temp dir holding one freshly written container.
pub struct ContainerFixture {
    /// Keeps the directory alive for the test's duration
    pub dir: TempDir,
    /// Path of the container inside `dir`
    pub path: PathBuf,
}

/// Write `keywords` to a fresh temp file named `name` and return the fixture.
pub fn container_fixture(
    name: &str,
    keywords: &[Keyword],
    endian: Endianness,
) -> ContainerFixture {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join(name);
    write_container(&path, keywords, endian).expect("write container fixture");
    ContainerFixture { dir, path }
}

/// An Int keyword fixture.
pub fn int_keyword(name: &str, values: Vec<i32>) -> Keyword {
    Keyword::new(name, TypedArray::Int(values)).expect("valid fixture name")
}

/// A Real keyword fixture.
pub fn real_keyword(name: &str, values: Vec<f32>) -> Keyword {
    Keyword::new(name, TypedArray::Real(values)).expect("valid fixture name")
}

/// A Char keyword fixture.
pub fn char_keyword(name: &str, values: &[&str]) -> Keyword {
    Keyword::new(
        name,
        TypedArray::Char(values.iter().map(|v| (*v).to_string()).collect()),
    )
    .expect("valid fixture name")
}

/// A small restart-shaped container: header array, well names and solution
/// arrays, with the solution arrays repeated for a second report step.
pub fn restart_keywords() -> Vec<Keyword> {
    vec![
        int_keyword("INTEHEAD", (0..95).collect()),
        char_keyword("ZWEL", &["PROD-1", "INJ-1"]),
        real_keyword("PRESSURE", (0..1000).map(|v| 200.0 + v as f32).collect()),
        real_keyword("SWAT", (0..1000).map(|v| v as f32 / 1000.0).collect()),
        real_keyword("PRESSURE", (0..1000).map(|v| 210.0 + v as f32).collect()),
        real_keyword("SWAT", (0..1000).map(|v| v as f32 / 2000.0).collect()),
    ]
}
