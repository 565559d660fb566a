//! Vehicle loading driven through a settlement.

use marsbase_core::catalog::fixed;
use marsbase_core::event::{Event, EventKind};
use marsbase_core::loading::{LoadState, MAX_SETTLEMENT_ATTEMPTS};
use marsbase_core::manifest::SuppliesManifest;
use marsbase_core::settlement::Settlement;
use marsbase_core::test_utils::*;
use marsbase_core::vehicle::Vehicle;

fn bare_settlement() -> Settlement {
    let mut s = settlement();
    *s.store_mut() = Default::default();
    s
}

#[test]
fn oxygen_and_methanol_load_within_a_hundred_calls() {
    let mut s = bare_settlement();
    let _ = s.store_mut().store_amount(fixed::OXYGEN, 20.0);
    let _ = s.store_mut().store_amount(fixed::METHANOL, 10.0);
    let rover = s.add_vehicle(
        Vehicle::new("Rover")
            .with_capacity(fixed::OXYGEN, 20.0 * 1.01)
            .with_capacity(fixed::METHANOL, 10.0 * 1.01),
    );
    let mut m = SuppliesManifest::new();
    m.add_amount(fixed::OXYGEN, 20.0, true);
    m.add_amount(fixed::METHANOL, 10.0, true);
    s.set_vehicle_loading(rover, Some(m)).unwrap();

    let mut calls = 0;
    while !s.load_vehicle(rover, None, 0.1).unwrap() {
        calls += 1;
        assert!(calls < 100, "loading did not finish in 100 calls");
    }

    let v = s.vehicle(rover).unwrap();
    let c = v.loading().unwrap();
    assert!(c.is_completed());
    assert!(!c.is_failure());
    assert!(v.store().amount_stored(fixed::OXYGEN) >= 20.0 - 1e-6);
    assert!(v.store().amount_stored(fixed::METHANOL) >= 10.0 - 1e-6);
    assert!(!v.is_loading());
}

#[test]
fn strong_settler_needs_fewer_steps() {
    let steps = |strength: Option<f64>| {
        let mut s = bare_settlement();
        let _ = s.store_mut().store_amount(fixed::WATER, 500.0);
        let rover = s.add_vehicle(Vehicle::new("Rover"));
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::WATER, 200.0, true);
        s.set_vehicle_loading(rover, Some(m)).unwrap();
        let lifter = strength.map(|st| worker("Bo").with_strength(st));
        let mut n = 0;
        while !s.load_vehicle(rover, lifter.as_ref(), 1.0).unwrap() {
            n += 1;
        }
        n
    };
    let background = steps(None);
    let strong = steps(Some(100.0));
    assert!(strong < background, "strong {strong}, background {background}");
}

#[test]
fn missing_mandatory_fails_and_is_reported() {
    let mut s = bare_settlement();
    let _ = s.store_mut().store_amount(fixed::OXYGEN, 100.0);
    let rover = s.add_vehicle(Vehicle::new("Rover"));
    let mut m = SuppliesManifest::new();
    m.add_amount(fixed::OXYGEN, 10.0, true);
    m.add_amount(fixed::METHANE, 10.0, true);
    s.set_vehicle_loading(rover, Some(m)).unwrap();

    for _ in 0..MAX_SETTLEMENT_ATTEMPTS * 2 {
        assert!(!s.load_vehicle(rover, None, 1.0).unwrap());
    }
    let c = s.vehicle(rover).unwrap().loading().unwrap();
    assert_eq!(c.state(), LoadState::Failed);
    assert_eq!(c.settlement_attempts(), MAX_SETTLEMENT_ATTEMPTS);

    let failures: Vec<_> = s.events().events(EventKind::LoadingFailed).collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0],
        Event::LoadingFailed { vehicle, attempts, .. } if *vehicle == rover && *attempts == MAX_SETTLEMENT_ATTEMPTS
    ));
}

#[test]
fn optional_supplies_ride_along_when_available() {
    let mut s = settlement();
    let _ = s.store_mut().store_amount(fixed::OXYGEN, 50.0);
    s.store_mut().store_equipment(eva_suit(), 2);
    let rover = s.add_vehicle(Vehicle::new("Rover"));

    let mut m = SuppliesManifest::new();
    m.add_amount(fixed::OXYGEN, 30.0, true);
    m.add_equipment(eva_suit(), 2, true);
    m.add_amount(soybean(), 5.0, false);
    m.add_amount(fixed::METHANE, 5.0, false);
    s.set_vehicle_loading(rover, Some(m)).unwrap();

    let mut calls = 0;
    while !s.load_vehicle(rover, None, 1.0).unwrap() {
        calls += 1;
        assert!(calls < 20);
    }

    let v = s.vehicle(rover).unwrap();
    assert!((v.store().amount_stored(soybean()) - 5.0).abs() < 1e-9);
    assert_eq!(v.store().amount_stored(fixed::METHANE), 0.0);
    assert_eq!(v.store().equipment_count(eva_suit()), 2);
    assert_eq!(
        v.loading().unwrap().skipped_optional().collect::<Vec<_>>(),
        vec![fixed::METHANE]
    );
    assert_eq!(s.events().count(EventKind::LoadingCompleted), 1);
}

#[test]
fn reloading_after_completion_moves_nothing() {
    let mut s = bare_settlement();
    let _ = s.store_mut().store_amount(fixed::FOOD, 40.0);
    let rover = s.add_vehicle(Vehicle::new("Rover"));
    let mut m = SuppliesManifest::new();
    m.add_amount(fixed::FOOD, 10.0, true);
    s.set_vehicle_loading(rover, Some(m)).unwrap();
    assert!(s.load_vehicle(rover, None, 1.0).unwrap());

    let before = s.store().clone();
    for _ in 0..5 {
        assert!(s.load_vehicle(rover, None, 1.0).unwrap());
    }
    assert_eq!(s.store(), &before);
    assert_eq!(s.events().count(EventKind::LoadingCompleted), 1);
}

#[test]
fn new_manifest_after_completion_starts_a_new_session() {
    let mut s = bare_settlement();
    let _ = s.store_mut().store_amount(fixed::WATER, 40.0);
    let rover = s.add_vehicle(Vehicle::new("Rover"));

    let mut first = SuppliesManifest::new();
    first.add_amount(fixed::WATER, 5.0, true);
    s.set_vehicle_loading(rover, Some(first)).unwrap();
    assert!(s.load_vehicle(rover, None, 1.0).unwrap());

    let mut second = SuppliesManifest::new();
    second.add_amount(fixed::WATER, 15.0, true);
    s.set_vehicle_loading(rover, Some(second)).unwrap();
    assert!(s.vehicle(rover).unwrap().is_loading());
    assert!(s.load_vehicle(rover, None, 1.0).unwrap());
    assert!((s.vehicle(rover).unwrap().store().amount_stored(fixed::WATER) - 15.0).abs() < 1e-9);
}
