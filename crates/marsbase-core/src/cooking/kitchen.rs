use crate::catalog::fixed;
use crate::clock::MarsTime;
use crate::cooking::dish::{PreparedDish, SpoilageOutcome};
use crate::rng::SimRng;
use crate::store::ResourceStore;
use serde::{Deserialize, Serialize};

/// Cleanliness lost for each dish served.
pub const CLEANLINESS_PER_DISH: f64 = 0.0075;
/// Cleanliness change for having (or lacking) cleaning agent.
pub const AGENT_CLEANLINESS_DELTA: f64 = 0.1;
/// Cleanliness change for having (or lacking) rinse water.
pub const WATER_CLEANLINESS_DELTA: f64 = 0.05;
/// Kilograms of rinse water per kilogram of cleaning agent.
pub const CLEANING_WATER_RATIO: f64 = 10.0;

/// Bookkeeping shared by meal kitchens and dessert stations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KitchenState {
    work_time: f64,
    /// In [-1, 1].
    cleanliness: f64,
    suppressed: bool,
    served_today: u32,
    best_quality: f64,
}

impl KitchenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_work(&mut self, work: f64) {
        self.work_time += work.max(0.0);
    }

    pub fn work_time(&self) -> f64 {
        self.work_time
    }

    /// Spend `threshold` of accumulated work. Returns false if there is
    /// not enough.
    pub fn consume_work(&mut self, threshold: f64) -> bool {
        if self.work_time < threshold {
            return false;
        }
        self.work_time -= threshold;
        true
    }

    pub fn cleanliness(&self) -> f64 {
        self.cleanliness
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn suppress(&mut self) {
        self.suppressed = true;
    }

    pub fn served_today(&self) -> u32 {
        self.served_today
    }

    /// Highest quality ever produced here.
    pub fn best_quality(&self) -> f64 {
        self.best_quality
    }

    /// Account for a freshly produced dish.
    pub fn record_dish(&mut self, quality: f64) {
        self.served_today += 1;
        self.cleanliness = (self.cleanliness - CLEANLINESS_PER_DISH).clamp(-1.0, 1.0);
        self.best_quality = self.best_quality.max(quality);
    }

    /// Outside meal time: drop accumulated work and lift suppression.
    pub fn reset_for_meal_period(&mut self) {
        self.work_time = 0.0;
        self.suppressed = false;
    }

    /// End-of-sol upkeep: reset the daily counter and clean.
    pub fn end_of_day(&mut self, store: &mut ResourceStore, agent_per_sol: f64) -> f64 {
        self.served_today = 0;
        self.clean(store, agent_per_sol)
    }

    /// Consume cleaning agent and rinse water. Each one on hand raises
    /// cleanliness, each one missing lowers it. Returns the new cleanliness.
    pub fn clean(&mut self, store: &mut ResourceStore, agent_per_sol: f64) -> f64 {
        let agent = agent_per_sol.max(0.0);
        let agent_short = store.retrieve_amount(fixed::SODIUM_HYPOCHLORITE, agent) > 0.0;
        let water_short =
            store.retrieve_amount(fixed::WATER, agent * CLEANING_WATER_RATIO) > 0.0;

        self.cleanliness += if agent_short {
            -AGENT_CLEANLINESS_DELTA
        } else {
            AGENT_CLEANLINESS_DELTA
        };
        self.cleanliness += if water_short {
            -WATER_CLEANLINESS_DELTA
        } else {
            WATER_CLEANLINESS_DELTA
        };
        self.cleanliness = self.cleanliness.clamp(-1.0, 1.0);
        self.cleanliness
    }
}

/// Roll whether an expired dish is thrown out or preserved. Better dishes
/// are more likely to be kept.
pub fn roll_spoilage(rng: &mut SimRng, dish: &PreparedDish) -> SpoilageOutcome {
    let roll = rng.next_f64() * 8.0 * (dish.quality / 2.0 + 1.0);
    if roll < 1.0 {
        SpoilageOutcome::Discarded
    } else {
        SpoilageOutcome::Preserved
    }
}

/// Split `dishes` into the still-fresh and the expired at `now`.
pub(crate) fn take_expired(dishes: &mut Vec<PreparedDish>, now: MarsTime) -> Vec<PreparedDish> {
    let (expired, fresh): (Vec<_>, Vec<_>) =
        std::mem::take(dishes).into_iter().partition(|d| d.is_expired(now));
    *dishes = fresh;
    expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooking::recipe::DishCategory;

    fn dish(quality: f64, expires: f64) -> PreparedDish {
        PreparedDish {
            name: "Bean Bowl".into(),
            category: DishCategory::Main,
            quality,
            dry_mass: 0.155,
            created: MarsTime::from_millisols(0.0),
            expires: MarsTime::from_millisols(expires),
            producer: "Ana".into(),
            resource: None,
        }
    }

    fn supplied_store() -> ResourceStore {
        let mut s = ResourceStore::new();
        let _ = s.store_amount(fixed::SODIUM_HYPOCHLORITE, 1.0);
        let _ = s.store_amount(fixed::WATER, 10.0);
        s
    }

    #[test]
    fn work_accumulates_and_is_consumed() {
        let mut k = KitchenState::new();
        k.add_work(5.0);
        assert!(!k.consume_work(8.0));
        k.add_work(4.0);
        assert!(k.consume_work(8.0));
        assert!((k.work_time() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn negative_work_is_ignored() {
        let mut k = KitchenState::new();
        k.add_work(-3.0);
        assert_eq!(k.work_time(), 0.0);
    }

    #[test]
    fn dishes_dirty_the_kitchen() {
        let mut k = KitchenState::new();
        k.record_dish(1.5);
        k.record_dish(0.5);
        assert!((k.cleanliness() + 2.0 * CLEANLINESS_PER_DISH).abs() < 1e-12);
        assert_eq!(k.served_today(), 2);
        assert_eq!(k.best_quality(), 1.5);
    }

    #[test]
    fn cleaning_with_supplies_improves() {
        let mut k = KitchenState::new();
        let mut store = supplied_store();
        let c = k.clean(&mut store, 0.1);
        assert!((c - 0.15).abs() < 1e-12);
        assert!((store.amount_stored(fixed::SODIUM_HYPOCHLORITE) - 0.9).abs() < 1e-12);
        assert!((store.amount_stored(fixed::WATER) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn cleaning_without_supplies_worsens() {
        let mut k = KitchenState::new();
        let mut store = ResourceStore::new();
        let c = k.clean(&mut store, 0.1);
        assert!((c + 0.15).abs() < 1e-12);
    }

    #[test]
    fn cleanliness_is_clamped() {
        let mut k = KitchenState::new();
        let mut store = ResourceStore::new();
        for _ in 0..20 {
            k.clean(&mut store, 0.1);
        }
        assert_eq!(k.cleanliness(), -1.0);
    }

    #[test]
    fn end_of_day_resets_counter() {
        let mut k = KitchenState::new();
        k.record_dish(1.0);
        let mut store = supplied_store();
        k.end_of_day(&mut store, 0.1);
        assert_eq!(k.served_today(), 0);
    }

    #[test]
    fn meal_period_reset_lifts_suppression() {
        let mut k = KitchenState::new();
        k.add_work(3.0);
        k.suppress();
        k.reset_for_meal_period();
        assert!(!k.is_suppressed());
        assert_eq!(k.work_time(), 0.0);
    }

    #[test]
    fn terrible_dishes_are_always_discarded() {
        let mut rng = SimRng::new(3);
        let awful = dish(-3.0, 0.0);
        for _ in 0..100 {
            assert_eq!(roll_spoilage(&mut rng, &awful), SpoilageOutcome::Discarded);
        }
    }

    #[test]
    fn good_dishes_are_mostly_preserved() {
        let mut rng = SimRng::new(3);
        let good = dish(2.0, 0.0);
        let kept = (0..1000)
            .filter(|_| roll_spoilage(&mut rng, &good) == SpoilageOutcome::Preserved)
            .count();
        // P(discard) = 1/16
        assert!(kept > 900, "expected ~937 preserved, got {kept}");
    }

    #[test]
    fn take_expired_partitions() {
        let mut dishes = vec![dish(1.0, 10.0), dish(1.0, 50.0), dish(1.0, 5.0)];
        let expired = take_expired(&mut dishes, MarsTime::from_millisols(20.0));
        assert_eq!(expired.len(), 2);
        assert_eq!(dishes.len(), 1);
    }
}
