//! The settlement: one shared resource store plus the vehicles, kitchens
//! and dessert stations that draw on it.
//!
//! Every operation that touches the store goes through `&mut Settlement`,
//! so a vehicle load and a kitchen's ingredient retrieval can never spend
//! the same stock twice.

use crate::catalog::ResourceCatalog;
use crate::clock::{ClockPulse, MarsTime};
use crate::cooking::{
    CookOutcome, Cooking, KitchenContext, MealConfig, PreparedDish, PreparingDessert,
    ReplenishmentRates,
};
use crate::event::{Event, EventLog};
use crate::id::{DessertStationId, KitchenId, VehicleId};
use crate::loading::LoadState;
use crate::manifest::SuppliesManifest;
use crate::rng::SimRng;
use crate::schedule::MealSchedule;
use crate::store::ResourceStore;
use crate::vehicle::Vehicle;
use crate::worker::Worker;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::sync::Arc;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Startup parameters of a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    pub name: String,
    pub population: u32,
    pub meals_replenishment_rate: f64,
    pub desserts_replenishment_rate: f64,
    /// 1 is normal; higher levels cut cooking water proportionally.
    pub water_ration_level: u32,
    /// Degrees east. Shifts the meal schedule onto the global clock.
    pub longitude: f64,
    pub seed: u64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        let rates = ReplenishmentRates::default();
        Self {
            name: "Settlement".to_string(),
            population: 6,
            meals_replenishment_rate: rates.meals,
            desserts_replenishment_rate: rates.desserts,
            water_ration_level: 1,
            longitude: 0.0,
            seed: 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("unknown vehicle: {0:?}")]
    UnknownVehicle(VehicleId),
    #[error("vehicle {0:?} has no loading session")]
    NotLoading(VehicleId),
    #[error("unknown kitchen: {0:?}")]
    UnknownKitchen(KitchenId),
    #[error("unknown dessert station: {0:?}")]
    UnknownDessertStation(DessertStationId),
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

pub struct Settlement {
    name: String,
    catalog: Arc<ResourceCatalog>,
    meal_config: Arc<MealConfig>,
    store: ResourceStore,
    population: u32,
    rates: ReplenishmentRates,
    water_ration_level: u32,
    schedule: MealSchedule,
    vehicles: SlotMap<VehicleId, Vehicle>,
    kitchens: SlotMap<KitchenId, Cooking>,
    dessert_stations: SlotMap<DessertStationId, PreparingDessert>,
    rng: SimRng,
    events: EventLog,
    now: MarsTime,
}

impl std::fmt::Debug for Settlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settlement")
            .field("name", &self.name)
            .field("population", &self.population)
            .field("rates", &self.rates)
            .field("vehicles", &self.vehicles.len())
            .field("kitchens", &self.kitchens.len())
            .field("dessert_stations", &self.dessert_stations.len())
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl Settlement {
    pub fn new(
        config: SettlementConfig,
        catalog: Arc<ResourceCatalog>,
        meal_config: Arc<MealConfig>,
    ) -> Self {
        Self {
            name: config.name,
            catalog,
            meal_config,
            store: ResourceStore::new(),
            population: config.population,
            rates: ReplenishmentRates {
                meals: config.meals_replenishment_rate.clamp(0.0, 1.0),
                desserts: config.desserts_replenishment_rate.clamp(0.0, 1.0),
            },
            water_ration_level: config.water_ration_level.max(1),
            schedule: MealSchedule::for_longitude(config.longitude),
            vehicles: SlotMap::with_key(),
            kitchens: SlotMap::with_key(),
            dessert_stations: SlotMap::with_key(),
            rng: SimRng::new(config.seed),
            events: EventLog::default(),
            now: MarsTime::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn meal_config(&self) -> &MealConfig {
        &self.meal_config
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResourceStore {
        &mut self.store
    }

    pub fn population(&self) -> u32 {
        self.population
    }

    pub fn set_population(&mut self, population: u32) {
        self.population = population;
    }

    pub fn rates(&self) -> ReplenishmentRates {
        self.rates
    }

    pub fn water_ration_level(&self) -> u32 {
        self.water_ration_level
    }

    pub fn set_water_ration_level(&mut self, level: u32) {
        self.water_ration_level = level.max(1);
    }

    pub fn schedule(&self) -> &MealSchedule {
        &self.schedule
    }

    /// Time of the last clock pulse.
    pub fn now(&self) -> MarsTime {
        self.now
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// For registering listeners and suppressing event kinds.
    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// Buffered events at or after `since`, in time order.
    pub fn events_since(&self, since: MarsTime) -> Vec<&Event> {
        self.events.events_since(since)
    }

    // -----------------------------------------------------------------------
    // Vehicles
    // -----------------------------------------------------------------------

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> VehicleId {
        self.vehicles.insert(vehicle)
    }

    #[must_use]
    pub fn remove_vehicle(&mut self, id: VehicleId) -> Option<Vehicle> {
        self.vehicles.remove(id)
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(id)
    }

    pub fn set_vehicle_loading(
        &mut self,
        id: VehicleId,
        manifest: Option<SuppliesManifest>,
    ) -> Result<(), SettlementError> {
        let vehicle = self
            .vehicles
            .get_mut(id)
            .ok_or(SettlementError::UnknownVehicle(id))?;
        vehicle.set_loading(id, manifest);
        Ok(())
    }

    /// Drive one loading step of `id` from the settlement store. Returns
    /// true once the session has completed.
    pub fn load_vehicle(
        &mut self,
        id: VehicleId,
        worker: Option<&Worker>,
        effort: f64,
    ) -> Result<bool, SettlementError> {
        let Settlement {
            catalog,
            store,
            vehicles,
            events,
            now,
            ..
        } = self;
        let Vehicle {
            store: cargo,
            loading,
            ..
        } = vehicles
            .get_mut(id)
            .ok_or(SettlementError::UnknownVehicle(id))?;
        let controller = loading.as_mut().ok_or(SettlementError::NotLoading(id))?;

        let before = controller.state();
        let done = controller.load(store, cargo, catalog, worker, effort);
        if before == LoadState::Loading {
            match controller.state() {
                LoadState::Completed => events.emit(Event::LoadingCompleted {
                    vehicle: id,
                    time: *now,
                }),
                LoadState::Failed => events.emit(Event::LoadingFailed {
                    vehicle: id,
                    attempts: controller.settlement_attempts(),
                    time: *now,
                }),
                LoadState::Loading => {}
            }
        }
        Ok(done)
    }

    // -----------------------------------------------------------------------
    // Kitchens and dessert stations
    // -----------------------------------------------------------------------

    pub fn add_kitchen(&mut self, kitchen: Cooking) -> KitchenId {
        self.kitchens.insert(kitchen)
    }

    /// Close a kitchen. Ingredients it had pulled into its cache go back to
    /// the settlement store; prepared meals leave with it.
    #[must_use]
    pub fn remove_kitchen(&mut self, id: KitchenId) -> Option<Cooking> {
        let mut kitchen = self.kitchens.remove(id)?;
        kitchen.return_ingredients(&mut self.store);
        Some(kitchen)
    }

    pub fn kitchen(&self, id: KitchenId) -> Option<&Cooking> {
        self.kitchens.get(id)
    }

    pub fn kitchens(&self) -> impl Iterator<Item = (KitchenId, &Cooking)> {
        self.kitchens.iter()
    }

    pub fn add_dessert_station(&mut self, station: PreparingDessert) -> DessertStationId {
        self.dessert_stations.insert(station)
    }

    pub fn dessert_station(&self, id: DessertStationId) -> Option<&PreparingDessert> {
        self.dessert_stations.get(id)
    }

    pub fn dessert_stations(&self) -> impl Iterator<Item = (DessertStationId, &PreparingDessert)> {
        self.dessert_stations.iter()
    }

    /// Meals ready to eat across all kitchens.
    pub fn total_available_meals(&self) -> u32 {
        self.kitchens.values().map(Cooking::available_meals).sum()
    }

    pub fn total_available_desserts(&self) -> u32 {
        self.dessert_stations
            .values()
            .map(PreparingDessert::available_desserts)
            .sum()
    }

    /// Best quality any kitchen has produced.
    pub fn best_meal_quality_cache(&self) -> f64 {
        self.kitchens
            .values()
            .map(Cooking::best_meal_quality_cache)
            .fold(0.0, f64::max)
    }

    pub fn add_cooking_work(
        &mut self,
        id: KitchenId,
        work: f64,
        worker: &Worker,
    ) -> Result<CookOutcome, SettlementError> {
        let available = self.total_available_meals();
        let Settlement {
            meal_config,
            store,
            population,
            rates,
            water_ration_level,
            kitchens,
            rng,
            events,
            now,
            ..
        } = self;
        let kitchen = kitchens
            .get_mut(id)
            .ok_or(SettlementError::UnknownKitchen(id))?;
        let mut ctx = KitchenContext {
            store,
            rng,
            events,
            rates,
            now: *now,
            population: *population,
            water_ration_level: *water_ration_level,
        };
        Ok(kitchen.add_work(id, work, worker, available, meal_config, &mut ctx))
    }

    pub fn add_dessert_work(
        &mut self,
        id: DessertStationId,
        work: f64,
        worker: &Worker,
    ) -> Result<CookOutcome, SettlementError> {
        let available = self.total_available_desserts();
        let Settlement {
            meal_config,
            store,
            population,
            rates,
            water_ration_level,
            dessert_stations,
            rng,
            events,
            now,
            ..
        } = self;
        let station = dessert_stations
            .get_mut(id)
            .ok_or(SettlementError::UnknownDessertStation(id))?;
        let mut ctx = KitchenContext {
            store,
            rng,
            events,
            rates,
            now: *now,
            population: *population,
            water_ration_level: *water_ration_level,
        };
        Ok(station.add_work(id, work, worker, available, meal_config, &mut ctx))
    }

    pub fn choose_a_meal(
        &mut self,
        id: KitchenId,
        worker: &Worker,
    ) -> Result<Option<PreparedDish>, SettlementError> {
        let kitchen = self
            .kitchens
            .get_mut(id)
            .ok_or(SettlementError::UnknownKitchen(id))?;
        let meal = kitchen.choose_a_meal(worker);
        if let Some(meal) = &meal {
            debug!(settler = %worker.name, dish = %meal.name, quality = meal.quality, "meal taken");
        }
        Ok(meal)
    }

    pub fn choose_a_dessert(
        &mut self,
        id: DessertStationId,
        worker: &Worker,
    ) -> Result<Option<PreparedDish>, SettlementError> {
        let station = self
            .dessert_stations
            .get_mut(id)
            .ok_or(SettlementError::UnknownDessertStation(id))?;
        let dessert = station.choose_a_dessert(worker);
        if let Some(dessert) = &dessert {
            debug!(settler = %worker.name, dessert = %dessert.name, quality = dessert.quality, "dessert taken");
        }
        Ok(dessert)
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance every facility by one clock pulse, then hand the events it
    /// produced to listeners.
    pub fn time_passing(&mut self, pulse: &ClockPulse) {
        self.now = pulse.time;
        if pulse.new_sol {
            info!(settlement = %self.name, sol = pulse.time.sol(), "new sol");
        }

        let Settlement {
            meal_config,
            store,
            population,
            rates,
            water_ration_level,
            schedule,
            kitchens,
            dessert_stations,
            rng,
            events,
            now,
            ..
        } = self;
        let mut ctx = KitchenContext {
            store,
            rng,
            events: &mut *events,
            rates,
            now: *now,
            population: *population,
            water_ration_level: *water_ration_level,
        };
        for (id, kitchen) in kitchens.iter_mut() {
            kitchen.time_passing(id, pulse, schedule, meal_config, &mut ctx);
        }
        for (id, station) in dessert_stations.iter_mut() {
            station.time_passing(id, pulse, schedule, meal_config, &mut ctx);
        }
        events.deliver();
    }
}
