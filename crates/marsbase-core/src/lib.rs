//! Marsbase Core -- settlement logistics for a Mars colony simulation.
//!
//! The crate covers two loops that share one settlement resource store:
//! vehicles loading supplies against a manifest, and kitchens turning crops
//! into meals and desserts that spoil if nobody eats them.
//!
//! # Loading
//!
//! A [`manifest::SuppliesManifest`] lists mandatory and optional amounts,
//! items and equipment. A [`loading::LoadingController`] moves stock from
//! the settlement into the vehicle a budget at a time. Mandatory entries
//! load first; a settlement that keeps failing to supply one ends the
//! session as failed after a bounded number of attempts.
//!
//! # Cooking
//!
//! Each [`clock::ClockPulse`] passed to [`settlement::Settlement::time_passing`]
//! runs, for every kitchen and dessert station:
//!
//! 1. **Expiry** -- dishes past their shelf life are wasted or preserved.
//! 2. **Meal period** -- outside a meal window, accumulated work resets.
//! 3. **End of sol** -- replenishment rates rise and the kitchen is cleaned.
//!
//! Buffered [`event::Event`]s are delivered to listeners after the pass.
//!
//! # Key Types
//!
//! - [`catalog::ResourceCatalog`] -- Frozen registry of resource descriptors.
//! - [`store::ResourceStore`] -- Amounts, items and equipment on hand.
//! - [`settlement::Settlement`] -- Owns the store and every facility.
//! - [`cooking::Cooking`] / [`cooking::PreparingDessert`] -- Kitchens.
//! - [`schedule::MealSchedule`] -- Meal windows shifted by longitude.

pub mod catalog;
pub mod clock;
pub mod cooking;
pub mod event;
pub mod id;
pub mod loading;
pub mod manifest;
pub mod rng;
pub mod schedule;
pub mod settlement;
pub mod store;
pub mod vehicle;
pub mod worker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
