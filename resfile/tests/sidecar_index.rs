//! Side-car index persistence and staleness

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use reskw::Endianness;
use resfile::{FileView, ViewOptions};
use test_utils::{container_fixture, restart_keywords};

fn with_sidecar() -> ViewOptions {
    ViewOptions {
        sidecar_index: true,
        ..ViewOptions::default()
    }
}

fn sidecar_path(container: &Path) -> PathBuf {
    let mut os = container.as_os_str().to_os_string();
    os.push(".kwidx");
    PathBuf::from(os)
}

#[test]
fn opening_writes_a_sidecar_next_to_the_container() {
    let fixture = container_fixture("CASE.UNRST", &restart_keywords(), Endianness::Big);
    let view = FileView::open(&fixture.path, with_sidecar()).unwrap();
    assert_eq!(view.len(), 6);

    let sidecar = sidecar_path(&fixture.path);
    assert!(sidecar.is_file());
    let json = std::fs::read_to_string(&sidecar).unwrap();
    assert!(json.contains("\"PRESSURE\""));
    assert!(json.contains("\"REAL\""));
}

#[test]
fn a_matching_sidecar_is_reused_instead_of_rescanning() {
    let fixture = container_fixture("CASE.UNRST", &restart_keywords(), Endianness::Big);
    drop(FileView::open(&fixture.path, with_sidecar()).unwrap());

    // Doctor the side-car: rename ZWEL. If the next open trusts the
    // side-car, the doctored name is what it sees.
    let sidecar = sidecar_path(&fixture.path);
    let json = std::fs::read_to_string(&sidecar).unwrap();
    std::fs::write(&sidecar, json.replace("\"ZWEL\"", "\"ZWELX\"")).unwrap();

    let view = FileView::open(&fixture.path, with_sidecar()).unwrap();
    assert!(view.has("ZWELX"));
    assert!(!view.has("ZWEL"));

    // The entries still point at real offsets, so loads work.
    let names = view.get("ZWELX", 0).unwrap();
    assert_eq!(names.read().data().text().unwrap()[0], "PROD-1");
}

#[test]
fn a_stale_sidecar_forces_a_rescan_and_rewrite() {
    let fixture = container_fixture("CASE.UNRST", &restart_keywords(), Endianness::Big);
    drop(FileView::open(&fixture.path, with_sidecar()).unwrap());

    let sidecar = sidecar_path(&fixture.path);
    let json = std::fs::read_to_string(&sidecar).unwrap();
    std::fs::write(&sidecar, json.replace("\"ZWEL\"", "\"ZWELX\"")).unwrap();

    // Growing the container invalidates the persisted size and mtime.
    let extra = test_utils::int_keyword("SEQNUM", vec![1]);
    let mut file = OpenOptions::new().append(true).open(&fixture.path).unwrap();
    extra.write(&mut file, Endianness::Big).unwrap();
    file.flush().unwrap();
    drop(file);

    let view = FileView::open(&fixture.path, with_sidecar()).unwrap();
    assert!(view.has("ZWEL"), "stale side-car must not be trusted");
    assert!(!view.has("ZWELX"));
    assert_eq!(view.len(), 7);

    // The rescan also refreshed the side-car.
    let json = std::fs::read_to_string(&sidecar).unwrap();
    assert!(json.contains("\"ZWEL\""));
    assert!(!json.contains("\"ZWELX\""));
}

#[test]
fn a_missing_sidecar_is_not_an_error() {
    let fixture = container_fixture("CASE.UNRST", &restart_keywords(), Endianness::Big);
    let view = FileView::open(&fixture.path, with_sidecar()).unwrap();
    assert_eq!(view.len(), 6);
}

#[test]
fn an_unparsable_sidecar_falls_back_to_a_scan() {
    let fixture = container_fixture("CASE.UNRST", &restart_keywords(), Endianness::Big);
    let sidecar = sidecar_path(&fixture.path);
    std::fs::write(&sidecar, b"not json at all").unwrap();

    let view = FileView::open(&fixture.path, with_sidecar()).unwrap();
    assert_eq!(view.len(), 6);
    assert!(view.has("ZWEL"));
}

#[test]
fn views_without_the_option_leave_no_sidecar() {
    let fixture = container_fixture("CASE.UNRST", &restart_keywords(), Endianness::Big);
    drop(FileView::open(&fixture.path, ViewOptions::default()).unwrap());
    assert!(!sidecar_path(&fixture.path).exists());
}
