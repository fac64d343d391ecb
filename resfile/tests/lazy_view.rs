//! Lazy loading behavior of container views

use std::io::Cursor;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use reskw::{Endianness, Keyword};
use resfile::{Error, FileView, ViewOptions};
use test_utils::{container_fixture, real_keyword, restart_keywords};

fn solution_keywords() -> Vec<Keyword> {
    vec![
        real_keyword("PRESSURE", (0..1000).map(|v| 200.0 + v as f32).collect()),
        real_keyword("SWAT", (0..1000).map(|v| v as f32 / 1000.0).collect()),
    ]
}

#[test]
fn open_builds_the_index_without_loading_data() {
    let fixture = container_fixture("CASE.UNRST", &solution_keywords(), Endianness::Big);
    let view = FileView::open(&fixture.path, ViewOptions::default()).unwrap();

    assert_eq!(view.len(), 2);
    assert_eq!(view.resident(), 0);
    assert!(view.has("PRESSURE"));
    assert!(view.has("SWAT"));
    assert!(!view.has("SGAS"));
    assert_eq!(view.count_named("PRESSURE"), 1);
}

#[test]
fn get_loads_only_the_requested_keyword() {
    let fixture = container_fixture("CASE.UNRST", &solution_keywords(), Endianness::Big);
    let view = FileView::open(&fixture.path, ViewOptions::default()).unwrap();

    let pressure = view.get("PRESSURE", 0).unwrap();
    assert_eq!(view.resident(), 1);
    assert_eq!(pressure.read().data().reals().unwrap()[0], 200.0);

    let swat = view.get("SWAT", 0).unwrap();
    assert_eq!(view.resident(), 2);
    assert_eq!(swat.read().data().reals().unwrap()[999], 0.999);

    // A second get returns the cached keyword.
    let again = view.get("PRESSURE", 0).unwrap();
    assert!(Arc::ptr_eq(&pressure, &again));
    assert_eq!(view.resident(), 2);
}

#[test]
fn lazy_loads_match_a_direct_codec_decode() {
    let keywords = restart_keywords();
    let fixture = container_fixture("CASE.UNRST", &keywords, Endianness::Big);
    let view = FileView::open(&fixture.path, ViewOptions::default()).unwrap();

    // Decode the container directly, without the view.
    let bytes = std::fs::read(&fixture.path).unwrap();
    let mut cur = Cursor::new(&bytes);
    let mut direct = Vec::new();
    while let Some(kw) = Keyword::read(&mut cur, Endianness::Big).unwrap() {
        direct.push(kw);
    }
    assert_eq!(direct.len(), view.len());

    for (position, expected) in direct.iter().enumerate() {
        let loaded = view.get_at(position).unwrap();
        assert_eq!(&*loaded.read(), expected, "position {position}");
    }
}

#[test]
fn occurrences_number_in_file_order() {
    let fixture = container_fixture("CASE.UNRST", &restart_keywords(), Endianness::Big);
    let view = FileView::open(&fixture.path, ViewOptions::default()).unwrap();

    assert_eq!(view.count_named("PRESSURE"), 2);
    assert_eq!(view.count_named("SWAT"), 2);
    assert_eq!(view.count_named("INTEHEAD"), 1);

    let step0 = view.get("PRESSURE", 0).unwrap();
    let step1 = view.get("PRESSURE", 1).unwrap();
    assert_eq!(step0.read().data().reals().unwrap()[0], 200.0);
    assert_eq!(step1.read().data().reals().unwrap()[0], 210.0);

    let err = view.get("PRESSURE", 2).unwrap_err();
    assert!(matches!(err, Error::KeywordNotFound { .. }));

    let err = view.get_at(99).unwrap_err();
    assert!(matches!(err, Error::PositionOutOfRange { len: 6, .. }));
}

#[test]
fn close_stream_views_reopen_per_load() {
    let fixture = container_fixture("CASE.UNRST", &solution_keywords(), Endianness::Big);
    let view = FileView::open(
        &fixture.path,
        ViewOptions {
            close_stream: true,
            ..ViewOptions::default()
        },
    )
    .unwrap();

    let pressure = view.get("PRESSURE", 0).unwrap();
    assert_eq!(pressure.read().len(), 1000);
    let swat = view.get("SWAT", 0).unwrap();
    assert_eq!(swat.read().len(), 1000);
}

#[test]
fn writable_excludes_close_stream() {
    let fixture = container_fixture("CASE.UNRST", &solution_keywords(), Endianness::Big);
    let err = FileView::open(
        &fixture.path,
        ViewOptions {
            writable: true,
            close_stream: true,
            ..ViewOptions::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidOptions(_)));
}

#[test]
fn little_endian_containers_are_supported() {
    let fixture = container_fixture("CASE.LUNRST", &solution_keywords(), Endianness::Little);
    let view = FileView::open(
        &fixture.path,
        ViewOptions {
            endian: Endianness::Little,
            ..ViewOptions::default()
        },
    )
    .unwrap();
    let pressure = view.get("PRESSURE", 0).unwrap();
    assert_eq!(pressure.read().data().reals().unwrap()[10], 210.0);
}

#[test]
fn a_vanished_backing_store_fails_new_loads_only() {
    let fixture = container_fixture("CASE.UNRST", &solution_keywords(), Endianness::Big);
    let view = FileView::open(
        &fixture.path,
        ViewOptions {
            close_stream: true,
            ..ViewOptions::default()
        },
    )
    .unwrap();

    let pressure = view.get("PRESSURE", 0).unwrap();
    std::fs::remove_file(&fixture.path).unwrap();

    // The cached keyword stays readable; a new lazy load cannot.
    assert_eq!(pressure.read().data().reals().unwrap()[0], 200.0);
    let err = view.get("SWAT", 0).unwrap_err();
    assert!(matches!(err, Error::BackingStoreGone(_)));
}

#[test]
fn a_shrunken_backing_store_fails_new_loads_only() {
    let fixture = container_fixture("CASE.UNRST", &solution_keywords(), Endianness::Big);
    let view = FileView::open(&fixture.path, ViewOptions::default()).unwrap();

    let pressure = view.get("PRESSURE", 0).unwrap();

    // Truncate the container under the open view, through a second handle.
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(&fixture.path)
        .unwrap();
    file.set_len(100).unwrap();

    assert_eq!(pressure.read().data().reals().unwrap()[0], 200.0);
    let err = view.get("SWAT", 0).unwrap_err();
    assert!(matches!(err, Error::BackingStoreGone(_)));
}

#[test]
fn read_only_views_can_share_an_index() {
    let fixture = container_fixture("CASE.UNRST", &solution_keywords(), Endianness::Big);
    let first = FileView::open(&fixture.path, ViewOptions::default()).unwrap();
    let second =
        FileView::open_shared(&fixture.path, ViewOptions::default(), first.index()).unwrap();

    assert_eq!(second.len(), first.len());
    let swat = second.get("SWAT", 0).unwrap();
    assert_eq!(swat.read().data().reals().unwrap()[500], 0.5);

    let err = FileView::open_shared(
        &fixture.path,
        ViewOptions {
            writable: true,
            ..ViewOptions::default()
        },
        first.index(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidOptions(_)));
}
