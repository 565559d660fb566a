use crate::catalog::fixed;
use crate::clock::ClockPulse;
use crate::cooking::dish::{PreparedDish, SpoilageOutcome};
use crate::cooking::kitchen::{KitchenState, roll_spoilage, take_expired};
use crate::cooking::meal::best_index;
use crate::cooking::recipe::{DessertSpec, DishCategory, MealConfig, is_drink};
use crate::cooking::{CookOutcome, KitchenContext};
use crate::event::{Event, Facility};
use crate::id::DessertStationId;
use crate::schedule::MealSchedule;
use crate::store::ResourceStore;
use crate::worker::Worker;
use tracing::{debug, info};

/// Work-time needed to prepare one dessert.
pub const PREPARE_DESSERT_WORK_REQUIRED: f64 = 3.0;
/// Masses below this are treated as zero.
const MIN_MASS: f64 = 1e-5;

/// A station that prepares desserts and drinks.
#[derive(Debug, Clone)]
pub struct PreparingDessert {
    name: String,
    kitchen: KitchenState,
    desserts: Vec<PreparedDish>,
}

impl PreparingDessert {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kitchen: KitchenState::new(),
            desserts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kitchen(&self) -> &KitchenState {
        &self.kitchen
    }

    pub fn desserts(&self) -> &[PreparedDish] {
        &self.desserts
    }

    pub fn available_desserts(&self) -> u32 {
        self.desserts.len() as u32
    }

    pub fn best_dessert_quality(&self) -> f64 {
        self.desserts.iter().map(|d| d.quality).fold(0.0, f64::max)
    }

    /// Desserts on the menu that current stock can make, counting the
    /// water needed to top each serving up.
    pub fn desserts_available<'c>(&self, config: &'c MealConfig, store: &ResourceStore) -> Vec<&'c DessertSpec> {
        let serving = config.dessert_mass_per_serving();
        config
            .desserts()
            .iter()
            .filter(|d| {
                let water = serving - d.dry_mass;
                let has_dry = d.dry_mass <= MIN_MASS || store.amount_stored(d.resource) >= d.dry_mass;
                let has_water = water <= MIN_MASS || store.amount_stored(fixed::WATER) >= water;
                has_dry && has_water
            })
            .collect()
    }

    /// Add preparation work-time and make a dessert once enough has
    /// accumulated. `available` counts desserts on hand settlement-wide.
    pub fn add_work(
        &mut self,
        id: DessertStationId,
        work: f64,
        worker: &Worker,
        available: u32,
        config: &MealConfig,
        ctx: &mut KitchenContext<'_>,
    ) -> CookOutcome {
        self.kitchen.add_work(work);
        if self.kitchen.is_suppressed() {
            return CookOutcome::Suppressed;
        }
        if self.kitchen.work_time() < PREPARE_DESSERT_WORK_REQUIRED {
            return CookOutcome::NotReady;
        }

        let cap = ctx.population as f64 * ctx.rates.desserts;
        if available as f64 >= cap {
            self.kitchen.suppress();
            debug!(station = %self.name, available, cap, "enough desserts on hand, preparation suppressed");
            ctx.events.emit(Event::CookingSuppressed {
                facility: Facility::DessertStation(id),
                available,
                cap,
                time: ctx.now,
            });
            return CookOutcome::Suppressed;
        }

        let menu = self.desserts_available(config, ctx.store);
        let Some(pick) = ctx.rng.index(menu.len()) else {
            return CookOutcome::NothingAvailable;
        };
        let spec = menu[pick];
        let dish = self.make_dessert(id, spec, worker, config, ctx);
        self.kitchen.consume_work(PREPARE_DESSERT_WORK_REQUIRED);
        CookOutcome::Cooked {
            dish: dish.name,
            quality: dish.quality,
        }
    }

    fn make_dessert(
        &mut self,
        id: DessertStationId,
        spec: &DessertSpec,
        worker: &Worker,
        config: &MealConfig,
        ctx: &mut KitchenContext<'_>,
    ) -> PreparedDish {
        let water = config.dessert_mass_per_serving() - spec.dry_mass;
        if spec.dry_mass > MIN_MASS {
            let _ = ctx.store.retrieve_amount(spec.resource, spec.dry_mass);
        }
        if water > MIN_MASS {
            let _ = ctx.store.retrieve_amount(fixed::WATER, water);
        }

        let quality = ((0.25 * worker.performance + self.kitchen.cleanliness()) * 10.0).round() / 10.0;
        let dish = PreparedDish {
            name: spec.name.clone(),
            category: DishCategory::Dessert,
            quality,
            dry_mass: spec.dry_mass,
            created: ctx.now,
            expires: ctx.now.plus(config.dessert_shelf_life),
            producer: worker.name.clone(),
            resource: Some(spec.resource),
        };
        self.kitchen.record_dish(quality);
        self.desserts.push(dish.clone());

        debug!(station = %self.name, dessert = %dish.name, quality, "dessert prepared");
        ctx.events.emit(Event::DessertPrepared {
            station: id,
            dessert: dish.name.clone(),
            quality,
            time: ctx.now,
        });
        dish
    }

    /// Take a dessert for `worker`. A thirsty settler only considers drinks.
    /// The favourite dessert wins if on hand, otherwise the best one.
    pub fn choose_a_dessert(&mut self, worker: &Worker) -> Option<PreparedDish> {
        let thirsty = worker.is_thirsty();
        let eligible = |d: &PreparedDish| !thirsty || is_drink(&d.name);
        let favorite = worker.favorite_dessert.as_deref();

        let index = best_index(&self.desserts, |d| eligible(d) && Some(d.name.as_str()) == favorite)
            .or_else(|| best_index(&self.desserts, eligible))?;
        Some(self.desserts.remove(index))
    }

    pub fn time_passing(
        &mut self,
        id: DessertStationId,
        pulse: &ClockPulse,
        schedule: &MealSchedule,
        config: &MealConfig,
        ctx: &mut KitchenContext<'_>,
    ) {
        if pulse.new_int_millisol {
            for dessert in take_expired(&mut self.desserts, pulse.time) {
                let outcome = roll_spoilage(ctx.rng, &dessert);
                if dessert.dry_mass > MIN_MASS {
                    let target = match (outcome, dessert.resource) {
                        (SpoilageOutcome::Preserved, Some(resource)) => resource,
                        _ => fixed::FOOD_WASTE,
                    };
                    let _ = ctx.store.store_amount(target, dessert.dry_mass);
                }
                ctx.rates.lower_desserts();
                info!(station = %self.name, dessert = %dessert.name, ?outcome, "dessert expired");
                ctx.events.emit(Event::DessertExpired {
                    station: id,
                    dessert: dessert.name,
                    outcome,
                    mass: dessert.dry_mass,
                    time: pulse.time,
                });
            }
        }

        if !schedule.is_meal_time(pulse.time) {
            self.kitchen.reset_for_meal_period();
        }

        if pulse.new_sol {
            ctx.rates.raise_desserts();
            let cleanliness = self.kitchen.end_of_day(ctx.store, config.cleaning_agent_per_sol);
            info!(station = %self.name, cleanliness, "dessert station cleaned");
            ctx.events.emit(Event::KitchenCleaned {
                facility: Facility::DessertStation(id),
                cleanliness,
                time: pulse.time,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{MarsTime, MasterClock};
    use crate::cooking::ReplenishmentRates;
    use crate::event::{EventKind, EventLog};
    use crate::rng::SimRng;
    use crate::test_utils::*;

    struct Rig {
        store: ResourceStore,
        rng: SimRng,
        events: EventLog,
        rates: ReplenishmentRates,
    }

    impl Rig {
        fn new(store: ResourceStore) -> Self {
            Self {
                store,
                rng: SimRng::new(5),
                events: EventLog::new(64),
                rates: ReplenishmentRates::default(),
            }
        }

        fn ctx(&mut self, now: MarsTime) -> KitchenContext<'_> {
            KitchenContext {
                store: &mut self.store,
                rng: &mut self.rng,
                events: &mut self.events,
                rates: &mut self.rates,
                now,
                population: 10,
                water_ration_level: 1,
            }
        }
    }

    fn dessert(name: &str, quality: f64) -> PreparedDish {
        PreparedDish {
            name: name.into(),
            category: DishCategory::Dessert,
            quality,
            dry_mass: 0.05,
            created: MarsTime::default(),
            expires: MarsTime::new(1, 100.0),
            producer: "Ana".into(),
            resource: Some(soymilk()),
        }
    }

    fn lunch() -> MarsTime {
        MarsTime::new(1, 510.0)
    }

    #[test]
    fn prepares_after_three_units_of_work() {
        let config = meal_config();
        let mut rig = Rig::new(pantry());
        let mut s = PreparingDessert::new("Bar");
        assert_eq!(
            s.add_work(dessert_station_id(), 2.0, &worker("Ana"), 0, &config, &mut rig.ctx(lunch())),
            CookOutcome::NotReady
        );
        let out = s.add_work(dessert_station_id(), 1.0, &worker("Ana"), 0, &config, &mut rig.ctx(lunch()));
        assert!(matches!(out, CookOutcome::Cooked { .. }), "got {out:?}");
        assert_eq!(s.available_desserts(), 1);
        assert_eq!(rig.events.count(EventKind::DessertPrepared), 1);
    }

    #[test]
    fn quality_from_performance_and_cleanliness() {
        let config = meal_config();
        let mut rig = Rig::new(pantry());
        let mut s = PreparingDessert::new("Bar");
        s.add_work(dessert_station_id(), 3.0, &worker("Ana"), 0, &config, &mut rig.ctx(lunch()));
        // 0.25 * 1.0 + 0.0 rounds to 0.3
        assert_eq!(s.desserts()[0].quality, 0.3);
        assert!((s.kitchen().cleanliness() + 0.0075).abs() < 1e-12);
    }

    #[test]
    fn dessert_consumes_dry_mass_and_water() {
        let config = meal_config();
        let mut store = ResourceStore::new();
        let _ = store.store_amount(soymilk(), 1.0);
        let _ = store.store_amount(fixed::WATER, 1.0);
        let mut rig = Rig::new(store);
        let mut s = PreparingDessert::new("Bar");
        let out = s.add_work(dessert_station_id(), 3.0, &worker("Ana"), 0, &config, &mut rig.ctx(lunch()));
        assert!(matches!(out, CookOutcome::Cooked { ref dish, .. } if dish == "soymilk"));
        assert!((rig.store.amount_stored(soymilk()) - 0.95).abs() < 1e-9);
        // serving 0.25 kg, 0.05 dry, 0.2 water
        assert!((rig.store.amount_stored(fixed::WATER) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn menu_requires_topping_water() {
        let config = meal_config();
        let mut store = ResourceStore::new();
        let _ = store.store_amount(soymilk(), 1.0);
        let s = PreparingDessert::new("Bar");
        assert!(s.desserts_available(&config, &store).is_empty());
    }

    #[test]
    fn cap_suppresses_until_meal_period_ends() {
        let config = meal_config();
        let mut rig = Rig::new(pantry());
        let mut s = PreparingDessert::new("Bar");
        // 10 * 0.4 = 4 desserts
        let out = s.add_work(dessert_station_id(), 3.0, &worker("Ana"), 4, &config, &mut rig.ctx(lunch()));
        assert_eq!(out, CookOutcome::Suppressed);

        let mut clock = MasterClock::new(MarsTime::new(1, 650.0));
        let pulse = clock.advance(1.0);
        s.time_passing(dessert_station_id(), &pulse, &MealSchedule::default(), &config, &mut rig.ctx(pulse.time));
        assert!(!s.kitchen().is_suppressed());
    }

    #[test]
    fn thirsty_settler_only_drinks() {
        let mut s = PreparingDessert::new("Bar");
        s.desserts.push(dessert("granola bar", 2.0));
        s.desserts.push(dessert("sugarcane juice", 0.1));
        let parched = worker("Ana").with_thirst(150.0);
        assert_eq!(s.choose_a_dessert(&parched).unwrap().name, "sugarcane juice");
        assert!(s.choose_a_dessert(&parched).is_none());
        assert_eq!(s.available_desserts(), 1);
    }

    #[test]
    fn favourite_dessert_first() {
        let mut s = PreparingDessert::new("Bar");
        s.desserts.push(dessert("granola bar", 2.0));
        s.desserts.push(dessert("soymilk", 0.1));
        let fan = worker("Ana").with_favorites(None, None, Some("soymilk"));
        assert_eq!(s.choose_a_dessert(&fan).unwrap().name, "soymilk");
        assert_eq!(s.choose_a_dessert(&fan).unwrap().name, "granola bar");
    }

    #[test]
    fn expired_dessert_returns_its_dry_mass() {
        let config = meal_config();
        let mut rig = Rig::new(ResourceStore::new());
        let mut s = PreparingDessert::new("Bar");
        s.desserts.push(dessert("soymilk", 1.0));

        let mut clock = MasterClock::new(MarsTime::new(1, 120.0));
        let pulse = clock.advance(1.0);
        s.time_passing(dessert_station_id(), &pulse, &MealSchedule::default(), &config, &mut rig.ctx(pulse.time));

        assert_eq!(s.available_desserts(), 0);
        let returned = rig.store.amount_stored(soymilk()) + rig.store.amount_stored(fixed::FOOD_WASTE);
        assert!((returned - 0.05).abs() < 1e-9);
        assert!((rig.rates.desserts - (0.4 - 0.007)).abs() < 1e-12);
        assert_eq!(rig.events.count(EventKind::DessertExpired), 1);
    }

    #[test]
    fn new_sol_raises_rate_and_cleans() {
        let config = meal_config();
        let mut rig = Rig::new(ResourceStore::new());
        let mut s = PreparingDessert::new("Bar");
        let mut clock = MasterClock::new(MarsTime::new(2, 999.9));
        let pulse = clock.advance(0.2);
        s.time_passing(dessert_station_id(), &pulse, &MealSchedule::default(), &config, &mut rig.ctx(pulse.time));
        assert!((rig.rates.desserts - 0.41).abs() < 1e-12);
        // No agent, no water.
        assert!((s.kitchen().cleanliness() + 0.15).abs() < 1e-12);
    }
}
