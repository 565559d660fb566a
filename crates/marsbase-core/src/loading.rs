//! Incremental vehicle loading.
//!
//! A [`LoadingController`] moves resources from a settlement store into a
//! vehicle store a little at a time. Each call to [`LoadingController::load`]
//! spends a mass budget proportional to the effort applied: mandatory
//! amounts first, then items, then equipment, and optional targets only
//! once every mandatory target is met.
//!
//! A step in which some mandatory entry cannot progress because the
//! settlement has run out (or the vehicle has no room) counts as one failed
//! settlement attempt. After [`MAX_SETTLEMENT_ATTEMPTS`] such steps the
//! controller gives up and stays in [`LoadState::Failed`].

use crate::catalog::ResourceCatalog;
use crate::id::{ResourceId, VehicleId};
use crate::manifest::SuppliesManifest;
use crate::store::ResourceStore;
use crate::worker::Worker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Starved steps tolerated before loading fails.
pub const MAX_SETTLEMENT_ATTEMPTS: u32 = 5;

/// Kilograms moved per unit of effort at average strength.
pub const LOAD_RATE: f64 = 20.0;

const TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    Loading,
    Completed,
    Failed,
}

/// Outcome of moving one manifest entry during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Satisfied,
    /// Short, but the settlement can still supply more.
    Pending,
    /// Short, and the settlement is out of it or the vehicle is full.
    Starved,
}

#[derive(Debug, Clone, Copy)]
enum UnitKind {
    Item,
    Equipment,
}

impl UnitKind {
    fn stored(self, store: &ResourceStore, id: ResourceId) -> u32 {
        match self {
            UnitKind::Item => store.item_stored(id),
            UnitKind::Equipment => store.equipment_count(id),
        }
    }

    fn take(self, store: &mut ResourceStore, id: ResourceId, count: u32) -> u32 {
        match self {
            UnitKind::Item => store.retrieve_item(id, count),
            UnitKind::Equipment => store.retrieve_equipment(id, count),
        }
    }

    fn put(self, store: &mut ResourceStore, id: ResourceId, count: u32) {
        match self {
            UnitKind::Item => store.store_item(id, count),
            UnitKind::Equipment => store.store_equipment(id, count),
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives one vehicle's loading toward its manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadingController {
    vehicle: VehicleId,
    manifest: SuppliesManifest,
    state: LoadState,
    settlement_attempts: u32,
    /// Optional resources the settlement could not (fully) supply.
    skipped: BTreeSet<ResourceId>,
}

impl LoadingController {
    pub fn new(vehicle: VehicleId, manifest: SuppliesManifest) -> Self {
        Self {
            vehicle,
            manifest,
            state: LoadState::Loading,
            settlement_attempts: 0,
            skipped: BTreeSet::new(),
        }
    }

    pub fn vehicle(&self) -> VehicleId {
        self.vehicle
    }

    pub fn manifest(&self) -> &SuppliesManifest {
        &self.manifest
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == LoadState::Completed
    }

    pub fn is_failure(&self) -> bool {
        self.state == LoadState::Failed
    }

    pub fn settlement_attempts(&self) -> u32 {
        self.settlement_attempts
    }

    pub fn skipped_optional(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.skipped.iter().copied()
    }

    /// Perform one loading step. `worker` is the settler doing the lifting,
    /// or `None` for background loading at the base rate.
    ///
    /// Returns true once loading has completed, including on calls after
    /// completion. Returns false while loading is still in progress and
    /// after failure.
    pub fn load(
        &mut self,
        settlement: &mut ResourceStore,
        cargo: &mut ResourceStore,
        catalog: &ResourceCatalog,
        worker: Option<&Worker>,
        effort: f64,
    ) -> bool {
        match self.state {
            LoadState::Completed => return true,
            LoadState::Failed => return false,
            LoadState::Loading => {}
        }

        let modifier = worker.map(Worker::strength_modifier).unwrap_or(1.0);
        let mut budget = LOAD_RATE * effort.max(0.0) * modifier;

        let (mandatory_met, starved) = self.load_mandatory(settlement, cargo, catalog, &mut budget);

        if starved {
            self.settlement_attempts += 1;
            debug!(
                vehicle = ?self.vehicle,
                attempts = self.settlement_attempts,
                "settlement short of mandatory supplies"
            );
            if self.settlement_attempts >= MAX_SETTLEMENT_ATTEMPTS {
                self.state = LoadState::Failed;
                warn!(
                    vehicle = ?self.vehicle,
                    attempts = self.settlement_attempts,
                    "loading failed: settlement cannot supply mandatory resources"
                );
                return false;
            }
        }
        if !mandatory_met {
            return false;
        }

        if self.load_optional(settlement, cargo, catalog, &mut budget) {
            self.state = LoadState::Completed;
            info!(
                vehicle = ?self.vehicle,
                skipped = self.skipped.len(),
                "loading completed"
            );
            return true;
        }
        false
    }

    /// Returns (all mandatory targets met, some mandatory entry starved).
    fn load_mandatory(
        &self,
        settlement: &mut ResourceStore,
        cargo: &mut ResourceStore,
        catalog: &ResourceCatalog,
        budget: &mut f64,
    ) -> (bool, bool) {
        let mut progress = Vec::new();
        for (&id, &target) in self.manifest.amounts(true) {
            progress.push(move_amount(settlement, cargo, id, target, budget));
        }
        for (&id, &target) in self.manifest.items(true) {
            let mass = catalog.unit_mass(id);
            progress.push(move_units(UnitKind::Item, settlement, cargo, id, target, mass, budget));
        }
        for (&id, &target) in self.manifest.equipment(true) {
            let mass = catalog.unit_mass(id);
            progress.push(move_units(UnitKind::Equipment, settlement, cargo, id, target, mass, budget));
        }
        let met = progress.iter().all(|p| *p == Progress::Satisfied);
        let starved = progress.contains(&Progress::Starved);
        (met, starved)
    }

    /// Returns true when every optional target is met or skipped.
    fn load_optional(
        &mut self,
        settlement: &mut ResourceStore,
        cargo: &mut ResourceStore,
        catalog: &ResourceCatalog,
        budget: &mut f64,
    ) -> bool {
        let mut met = true;
        let mandatory = self.manifest.bucket(true);
        let optional = self.manifest.bucket(false);
        let mut newly_skipped = Vec::new();

        for (&id, &extra) in &optional.amounts {
            if self.skipped.contains(&id) {
                continue;
            }
            let target = mandatory.amounts.get(&id).copied().unwrap_or(0.0) + extra;
            match move_amount(settlement, cargo, id, target, budget) {
                Progress::Satisfied => {}
                Progress::Pending => met = false,
                Progress::Starved => newly_skipped.push(id),
            }
        }
        for (kind, targets, base) in [
            (UnitKind::Item, &optional.items, &mandatory.items),
            (UnitKind::Equipment, &optional.equipment, &mandatory.equipment),
        ] {
            for (&id, &extra) in targets {
                if self.skipped.contains(&id) {
                    continue;
                }
                let target = base.get(&id).copied().unwrap_or(0) + extra;
                let mass = catalog.unit_mass(id);
                match move_units(kind, settlement, cargo, id, target, mass, budget) {
                    Progress::Satisfied => {}
                    Progress::Pending => met = false,
                    Progress::Starved => newly_skipped.push(id),
                }
            }
        }

        for id in newly_skipped {
            info!(
                vehicle = ?self.vehicle,
                resource = catalog.name(id).unwrap_or("unknown"),
                "optional supply unavailable, skipping"
            );
            self.skipped.insert(id);
        }
        met
    }
}

// ---------------------------------------------------------------------------
// Transfer helpers
// ---------------------------------------------------------------------------

fn move_amount(
    from: &mut ResourceStore,
    to: &mut ResourceStore,
    id: ResourceId,
    target: f64,
    budget: &mut f64,
) -> Progress {
    let shortfall = target - to.amount_stored(id);
    if shortfall <= TOLERANCE {
        return Progress::Satisfied;
    }
    if from.amount_stored(id) <= TOLERANCE || to.remaining_capacity(id) <= TOLERANCE {
        return Progress::Starved;
    }

    let amount = shortfall
        .min(from.amount_stored(id))
        .min(to.remaining_capacity(id))
        .min(*budget);
    if amount > 0.0 {
        let moved = amount - from.retrieve_amount(id, amount);
        let excess = to.store_amount(id, moved);
        if excess > 0.0 {
            let _ = from.store_amount(id, excess);
        }
        *budget = (*budget - (moved - excess)).max(0.0);
    }

    if target - to.amount_stored(id) <= TOLERANCE {
        Progress::Satisfied
    } else if from.amount_stored(id) <= TOLERANCE || to.remaining_capacity(id) <= TOLERANCE {
        Progress::Starved
    } else {
        Progress::Pending
    }
}

fn move_units(
    kind: UnitKind,
    from: &mut ResourceStore,
    to: &mut ResourceStore,
    id: ResourceId,
    target: u32,
    unit_mass: f64,
    budget: &mut f64,
) -> Progress {
    let have = kind.stored(to, id);
    if have >= target {
        return Progress::Satisfied;
    }
    if kind.stored(from, id) == 0 {
        return Progress::Starved;
    }

    let shortfall = target - have;
    // At least one unit per step so heavy units never stall.
    let affordable = if unit_mass <= 0.0 {
        shortfall
    } else if *budget <= 0.0 {
        0
    } else {
        ((*budget / unit_mass).floor() as u32).max(1)
    };
    let count = shortfall.min(kind.stored(from, id)).min(affordable);
    if count > 0 {
        let moved = kind.take(from, id, count);
        kind.put(to, id, moved);
        *budget = (*budget - moved as f64 * unit_mass.max(0.0)).max(0.0);
    }

    if kind.stored(to, id) >= target {
        Progress::Satisfied
    } else if kind.stored(from, id) == 0 {
        Progress::Starved
    } else {
        Progress::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixed;
    use crate::test_utils::*;

    fn controller(manifest: SuppliesManifest) -> LoadingController {
        LoadingController::new(vehicle_id(), manifest)
    }

    #[test]
    fn satisfied_manifest_completes_on_first_call() {
        let cat = catalog();
        let mut settlement = ResourceStore::new();
        let mut cargo = ResourceStore::new();
        let _ = cargo.store_amount(fixed::OXYGEN, 5.0);
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::OXYGEN, 5.0, true);

        let mut c = controller(m);
        assert!(c.load(&mut settlement, &mut cargo, &cat, None, 1.0));
        assert!(c.is_completed());
        assert_eq!(c.settlement_attempts(), 0);
    }

    #[test]
    fn non_positive_target_is_already_met() {
        let cat = catalog();
        let mut settlement = stocked_store(100.0);
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::METHANOL, -2.0, true);
        m.add_amount(fixed::WATER, 4.0, true);
        m.add_amount(fixed::WATER, -4.0, true);

        let mut c = controller(m);
        let before = settlement.clone();
        assert!(c.load(&mut settlement, &mut cargo, &cat, None, 1.0));
        assert_eq!(c.settlement_attempts(), 0);
        assert_eq!(settlement, before);
        assert_eq!(cargo.amount_stored(fixed::WATER), 0.0);
    }

    #[test]
    fn budget_limits_each_step() {
        let cat = catalog();
        let mut settlement = stocked_store(100.0);
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::OXYGEN, 30.0, true);

        let mut c = controller(m);
        // 20 kg/effort * 0.5 effort = 10 kg per step
        assert!(!c.load(&mut settlement, &mut cargo, &cat, None, 0.5));
        assert!((cargo.amount_stored(fixed::OXYGEN) - 10.0).abs() < 1e-9);
        assert!(!c.load(&mut settlement, &mut cargo, &cat, None, 0.5));
        assert!(c.load(&mut settlement, &mut cargo, &cat, None, 0.5));
        assert!((settlement.amount_stored(fixed::OXYGEN) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn strong_worker_loads_faster() {
        let cat = catalog();
        let mut settlement = stocked_store(100.0);
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::WATER, 50.0, true);

        let strong = worker("Bo").with_strength(100.0);
        let mut c = controller(m);
        c.load(&mut settlement, &mut cargo, &cat, Some(&strong), 0.5);
        assert!((cargo.amount_stored(fixed::WATER) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn starvation_fails_after_max_attempts() {
        let cat = catalog();
        let mut settlement = ResourceStore::new();
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::METHANOL, 10.0, true);

        let mut c = controller(m);
        for i in 1..MAX_SETTLEMENT_ATTEMPTS {
            assert!(!c.load(&mut settlement, &mut cargo, &cat, None, 1.0));
            assert_eq!(c.settlement_attempts(), i);
            assert!(!c.is_failure());
        }
        assert!(!c.load(&mut settlement, &mut cargo, &cat, None, 1.0));
        assert!(c.is_failure());
        // Further calls are inert.
        assert!(!c.load(&mut settlement, &mut cargo, &cat, None, 1.0));
        assert_eq!(c.settlement_attempts(), MAX_SETTLEMENT_ATTEMPTS);
    }

    #[test]
    fn partial_stock_is_loaded_before_starving() {
        let cat = catalog();
        let mut settlement = ResourceStore::new();
        let _ = settlement.store_amount(fixed::OXYGEN, 15.0);
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::OXYGEN, 20.0, true);

        let mut c = controller(m);
        c.load(&mut settlement, &mut cargo, &cat, None, 0.5);
        assert_eq!(c.settlement_attempts(), 0);
        c.load(&mut settlement, &mut cargo, &cat, None, 0.5);
        assert_eq!(c.settlement_attempts(), 1);
        assert!((cargo.amount_stored(fixed::OXYGEN) - 15.0).abs() < 1e-9);
        assert_eq!(settlement.amount_stored(fixed::OXYGEN), 0.0);
    }

    #[test]
    fn full_vehicle_counts_as_starved() {
        let cat = catalog();
        let mut settlement = stocked_store(100.0);
        let mut cargo = ResourceStore::new();
        cargo.set_amount_capacity(fixed::OXYGEN, 5.0);
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::OXYGEN, 10.0, true);

        let mut c = controller(m);
        c.load(&mut settlement, &mut cargo, &cat, None, 1.0);
        assert_eq!(c.settlement_attempts(), 1);
        assert!((cargo.amount_stored(fixed::OXYGEN) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn missing_optional_is_skipped() {
        let cat = catalog();
        let mut settlement = stocked_store(100.0);
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::OXYGEN, 5.0, true);
        m.add_amount(soybean(), 3.0, false);

        let mut c = controller(m);
        assert!(c.load(&mut settlement, &mut cargo, &cat, None, 1.0));
        assert_eq!(c.skipped_optional().collect::<Vec<_>>(), vec![soybean()]);
        assert_eq!(c.settlement_attempts(), 0);
    }

    #[test]
    fn optional_waits_for_mandatory() {
        let cat = catalog();
        let mut settlement = stocked_store(100.0);
        let _ = settlement.store_amount(rice(), 10.0);
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::OXYGEN, 30.0, true);
        m.add_amount(rice(), 5.0, false);

        let mut c = controller(m);
        c.load(&mut settlement, &mut cargo, &cat, None, 1.0);
        assert_eq!(cargo.amount_stored(rice()), 0.0);
        assert!(c.load(&mut settlement, &mut cargo, &cat, None, 1.0));
        assert!((cargo.amount_stored(rice()) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn optional_adds_on_top_of_mandatory() {
        let cat = catalog();
        let mut settlement = stocked_store(100.0);
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::WATER, 10.0, true);
        m.add_amount(fixed::WATER, 4.0, false);

        let mut c = controller(m);
        assert!(c.load(&mut settlement, &mut cargo, &cat, None, 1.0));
        assert!((cargo.amount_stored(fixed::WATER) - 14.0).abs() < 1e-9);
    }

    #[test]
    fn heavy_unit_moves_one_per_step() {
        let cat = catalog();
        let mut settlement = ResourceStore::new();
        settlement.store_item(wheel(), 4);
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_item(wheel(), 2, true);

        let mut c = controller(m);
        // 2 kg budget, 30 kg wheel
        assert!(!c.load(&mut settlement, &mut cargo, &cat, None, 0.1));
        assert_eq!(cargo.item_stored(wheel()), 1);
        assert!(c.load(&mut settlement, &mut cargo, &cat, None, 0.1));
        assert_eq!(settlement.item_stored(wheel()), 2);
    }

    #[test]
    fn equipment_and_items_load_after_amounts() {
        let cat = catalog();
        let mut settlement = stocked_store(100.0);
        settlement.store_equipment(eva_suit(), 3);
        settlement.store_item(spark_plug(), 10);
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::FOOD, 5.0, true);
        m.add_item(spark_plug(), 4, true);
        m.add_equipment(eva_suit(), 2, true);

        let mut c = controller(m);
        assert!(c.load(&mut settlement, &mut cargo, &cat, None, 10.0));
        assert_eq!(cargo.item_stored(spark_plug()), 4);
        assert_eq!(cargo.equipment_count(eva_suit()), 2);
        assert_eq!(settlement.equipment_count(eva_suit()), 1);
    }

    #[test]
    fn zero_effort_makes_no_progress_but_detects_starvation() {
        let cat = catalog();
        let mut settlement = stocked_store(100.0);
        let mut cargo = ResourceStore::new();
        let mut m = SuppliesManifest::new();
        m.add_amount(fixed::OXYGEN, 5.0, true);
        m.add_amount(fixed::METHANOL, 5.0, true);

        let mut c = controller(m);
        assert!(!c.load(&mut settlement, &mut cargo, &cat, None, 0.0));
        assert_eq!(cargo.amount_stored(fixed::OXYGEN), 0.0);
        assert_eq!(c.settlement_attempts(), 1);
    }
}
