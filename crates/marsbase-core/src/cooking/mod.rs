//! Kitchens and dessert stations.
//!
//! A [`Cooking`] facility turns settlement stock into hot meals and a
//! [`PreparingDessert`] station turns it into desserts. Both accumulate
//! work-time from settlers, refuse to overproduce once the settlement has
//! enough servings on hand, spoil what is not eaten in time, and clean up
//! at the end of each sol. They borrow the settlement's mutable state for
//! the duration of a call through a [`KitchenContext`].

pub mod cache;
pub mod dessert;
pub mod dish;
pub mod kitchen;
pub mod meal;
pub mod recipe;

pub use dessert::PreparingDessert;
pub use dish::{PreparedDish, QualityGrade, SpoilageOutcome};
pub use meal::Cooking;
pub use recipe::{DishCategory, DishRecipe, MealConfig, MealConfigBuilder, MealConfigError};

use crate::clock::MarsTime;
use crate::event::EventLog;
use crate::rng::SimRng;
use crate::store::ResourceStore;
use serde::{Deserialize, Serialize};

/// Daily increase of a replenishment rate.
pub const REPLENISHMENT_UP: f64 = 0.01;
/// Decrease of a replenishment rate per spoiled serving.
pub const REPLENISHMENT_DOWN: f64 = 0.007;
pub const MAX_REPLENISHMENT_RATE: f64 = 1.0;

/// Servings per settler a settlement aims to keep on hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentRates {
    pub meals: f64,
    pub desserts: f64,
}

impl Default for ReplenishmentRates {
    fn default() -> Self {
        Self {
            meals: 0.3,
            desserts: 0.4,
        }
    }
}

impl ReplenishmentRates {
    pub fn raise_meals(&mut self) {
        self.meals = raise(self.meals);
    }

    pub fn lower_meals(&mut self) {
        self.meals = lower(self.meals);
    }

    pub fn raise_desserts(&mut self) {
        self.desserts = raise(self.desserts);
    }

    pub fn lower_desserts(&mut self) {
        self.desserts = lower(self.desserts);
    }
}

fn raise(rate: f64) -> f64 {
    (rate + REPLENISHMENT_UP).min(MAX_REPLENISHMENT_RATE)
}

fn lower(rate: f64) -> f64 {
    if rate > 0.0 {
        (rate - REPLENISHMENT_DOWN).max(0.0)
    } else {
        rate
    }
}

/// Settlement state a kitchen needs while it works.
pub struct KitchenContext<'a> {
    pub store: &'a mut ResourceStore,
    pub rng: &'a mut SimRng,
    pub events: &'a mut EventLog,
    pub rates: &'a mut ReplenishmentRates,
    pub now: MarsTime,
    pub population: u32,
    pub water_ration_level: u32,
}

/// Result of adding work to a kitchen or dessert station.
#[derive(Debug, Clone, PartialEq)]
pub enum CookOutcome {
    /// Not enough work-time accumulated yet.
    NotReady,
    /// The settlement already has enough servings; nothing more is made
    /// until the next meal period.
    Suppressed,
    /// Work is ready but no recipe can be made from current stock.
    NothingAvailable,
    Cooked { dish: String, quality: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_rise_to_cap() {
        let mut r = ReplenishmentRates {
            meals: 0.995,
            desserts: 0.4,
        };
        r.raise_meals();
        assert_eq!(r.meals, MAX_REPLENISHMENT_RATE);
        r.raise_desserts();
        assert!((r.desserts - 0.41).abs() < 1e-12);
    }

    #[test]
    fn rates_fall_to_zero() {
        let mut r = ReplenishmentRates {
            meals: 0.005,
            desserts: 0.0,
        };
        r.lower_meals();
        assert_eq!(r.meals, 0.0);
        r.lower_desserts();
        assert_eq!(r.desserts, 0.0);
    }

    #[test]
    fn default_rates() {
        let r = ReplenishmentRates::default();
        assert_eq!(r.meals, 0.3);
        assert_eq!(r.desserts, 0.4);
    }
}
