//! In-place keyword saves on writable views

use pretty_assertions::assert_eq;
use reskw::{Endianness, TypedArray};
use resfile::{Error, FileView, ViewOptions};
use test_utils::{container_fixture, real_keyword, ContainerFixture};

fn writable() -> ViewOptions {
    ViewOptions {
        writable: true,
        ..ViewOptions::default()
    }
}

fn pressure_swat_fixture() -> ContainerFixture {
    container_fixture(
        "CASE.UNRST",
        &[
            real_keyword("PRESSURE", (0..1000).map(|v| 200.0 + v as f32).collect()),
            real_keyword("SWAT", (0..1000).map(|v| v as f32 / 1000.0).collect()),
        ],
        Endianness::Big,
    )
}

#[test]
fn save_rewrites_only_the_keyword_region() {
    let fixture = pressure_swat_fixture();
    let before = std::fs::read(&fixture.path).unwrap();

    let view = FileView::open(&fixture.path, writable()).unwrap();
    let pressure = view.get("PRESSURE", 0).unwrap();
    pressure.write().data_mut().reals_mut().unwrap()[0] = 1000.0;
    view.save("PRESSURE", 0).unwrap();
    drop(view);

    let after = std::fs::read(&fixture.path).unwrap();
    assert_eq!(before.len(), after.len());

    // The only bytes that changed sit inside PRESSURE's data region.
    let pressure_data = 24..24 + 1000 * 4;
    let changed: Vec<usize> = before
        .iter()
        .zip(&after)
        .enumerate()
        .filter(|(_, (b, a))| b != a)
        .map(|(i, _)| i)
        .collect();
    assert!(!changed.is_empty());
    assert!(changed.iter().all(|i| pressure_data.contains(i)));

    // A fresh view observes the saved value and an untouched neighbor.
    let reopened = FileView::open(&fixture.path, ViewOptions::default()).unwrap();
    let pressure = reopened.get("PRESSURE", 0).unwrap();
    assert_eq!(pressure.read().data().reals().unwrap()[0], 1000.0);
    assert_eq!(pressure.read().data().reals().unwrap()[1], 201.0);
    let swat = reopened.get("SWAT", 0).unwrap();
    assert_eq!(swat.read().data().reals().unwrap()[999], 0.999);
}

#[test]
fn saved_values_stay_authoritative_in_the_cache() {
    let fixture = pressure_swat_fixture();
    let view = FileView::open(&fixture.path, writable()).unwrap();

    let pressure = view.get("PRESSURE", 0).unwrap();
    pressure.write().data_mut().reals_mut().unwrap()[42] = -1.0;
    view.save("PRESSURE", 0).unwrap();

    // No re-read happens: the handle already holds the saved data.
    let again = view.get("PRESSURE", 0).unwrap();
    assert_eq!(again.read().data().reals().unwrap()[42], -1.0);
}

#[test]
fn a_resized_keyword_refuses_to_save() {
    let fixture = pressure_swat_fixture();
    let before = std::fs::read(&fixture.path).unwrap();

    let view = FileView::open(&fixture.path, writable()).unwrap();
    let pressure = view.get("PRESSURE", 0).unwrap();
    pressure
        .write()
        .set_data(TypedArray::Real(vec![0.0; 999]));

    let err = view.save("PRESSURE", 0).unwrap_err();
    assert!(matches!(err, Error::SizeChanged { .. }), "actual: {err:?}");

    // A changed element type is refused the same way.
    pressure.write().set_data(TypedArray::Int(vec![0; 1000]));
    let err = view.save("PRESSURE", 0).unwrap_err();
    assert!(matches!(err, Error::SizeChanged { .. }));
    drop(view);

    // The refused saves left the container byte-for-byte unchanged.
    let after = std::fs::read(&fixture.path).unwrap();
    assert_eq!(before, after);
}

#[test]
fn save_requires_a_writable_view() {
    let fixture = pressure_swat_fixture();
    let view = FileView::open(&fixture.path, ViewOptions::default()).unwrap();
    view.get("PRESSURE", 0).unwrap();

    let err = view.save("PRESSURE", 0).unwrap_err();
    assert!(matches!(err, Error::ReadOnly));
}

#[test]
fn save_requires_a_resident_keyword() {
    let fixture = pressure_swat_fixture();
    let view = FileView::open(&fixture.path, writable()).unwrap();

    let err = view.save("PRESSURE", 0).unwrap_err();
    assert!(matches!(err, Error::NotResident { .. }));

    let err = view.save("SGAS", 0).unwrap_err();
    assert!(matches!(err, Error::KeywordNotFound { .. }));
}

#[test]
fn save_round_trips_multi_record_keywords() {
    let fixture = container_fixture(
        "CASE.INIT",
        &[real_keyword("PORV", (0..2500).map(|v| v as f32).collect())],
        Endianness::Big,
    );

    let view = FileView::open(&fixture.path, writable()).unwrap();
    let porv = view.get("PORV", 0).unwrap();
    {
        let mut guard = porv.write();
        let values = guard.data_mut().reals_mut().unwrap();
        // Touch elements in all three physical records.
        values[0] = 1.5;
        values[1500] = 2.5;
        values[2499] = 3.5;
    }
    view.save("PORV", 0).unwrap();
    drop(view);

    let reopened = FileView::open(&fixture.path, ViewOptions::default()).unwrap();
    let porv = reopened.get("PORV", 0).unwrap();
    let guard = porv.read();
    let values = guard.data().reals().unwrap();
    assert_eq!(values[0], 1.5);
    assert_eq!(values[1500], 2.5);
    assert_eq!(values[2499], 3.5);
    assert_eq!(values[2], 2.0);
}
