//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so other crates
//! in the workspace can use the same synthetic catalog and pantry.

use crate::catalog::{AmountSpec, CatalogBuilder, Phase, ResourceCatalog, fixed};
use crate::cooking::{DishCategory, DishRecipe, MealConfig, MealConfigBuilder};
use crate::id::{DessertStationId, KitchenId, ResourceId, VehicleId};
use crate::settlement::{Settlement, SettlementConfig};
use crate::store::ResourceStore;
use crate::worker::Worker;
use slotmap::SlotMap;
use std::sync::Arc;

// ===========================================================================
// Resources
// ===========================================================================

/// Dynamic amount resources in registration order, with water content.
const CROPS: [(&str, Phase, f64); 14] = [
    ("soybean", Phase::Solid, 0.1),
    ("rice", Phase::Solid, 0.12),
    ("potato", Phase::Solid, 0.79),
    ("tomato", Phase::Solid, 0.94),
    ("garlic", Phase::Solid, 0.59),
    ("carrot", Phase::Solid, 0.88),
    ("onion", Phase::Solid, 0.89),
    ("peanut", Phase::Solid, 0.06),
    ("soybean oil", Phase::Liquid, 0.0),
    ("peanut oil", Phase::Liquid, 0.0),
    ("soymilk", Phase::Liquid, 0.9),
    ("sugarcane juice", Phase::Liquid, 0.85),
    ("granola bar", Phase::Solid, 0.05),
    ("strawberry", Phase::Solid, 0.91),
];

pub fn soybean() -> ResourceId {
    ResourceId(100)
}
pub fn rice() -> ResourceId {
    ResourceId(101)
}
pub fn potato() -> ResourceId {
    ResourceId(102)
}
pub fn tomato() -> ResourceId {
    ResourceId(103)
}
pub fn garlic() -> ResourceId {
    ResourceId(104)
}
pub fn carrot() -> ResourceId {
    ResourceId(105)
}
pub fn onion() -> ResourceId {
    ResourceId(106)
}
pub fn peanut() -> ResourceId {
    ResourceId(107)
}
pub fn soybean_oil() -> ResourceId {
    ResourceId(108)
}
pub fn peanut_oil() -> ResourceId {
    ResourceId(109)
}
pub fn soymilk() -> ResourceId {
    ResourceId(110)
}
pub fn sugarcane_juice() -> ResourceId {
    ResourceId(111)
}
pub fn granola_bar() -> ResourceId {
    ResourceId(112)
}
pub fn strawberry() -> ResourceId {
    ResourceId(113)
}

// Items and equipment
pub fn spark_plug() -> ResourceId {
    ResourceId(1000)
}
pub fn wheel() -> ResourceId {
    ResourceId(1001)
}
pub fn eva_suit() -> ResourceId {
    ResourceId(2000)
}
pub fn specimen_box() -> ResourceId {
    ResourceId(2001)
}

/// Fixed resources plus the crops, oils and dessert stock above.
pub fn catalog() -> ResourceCatalog {
    let mut b = CatalogBuilder::with_fixed_resources();
    for (name, phase, water) in CROPS {
        b.register_amount(name, AmountSpec::new(phase).with_edible(water))
            .unwrap();
    }
    b.register_item("spark plug", 0.1).unwrap();
    b.register_item("wheel", 30.0).unwrap();
    b.register_equipment("eva suit", 45.0).unwrap();
    b.register_equipment("specimen box", 10.0).unwrap();
    b.build().unwrap()
}

// ===========================================================================
// Handles
// ===========================================================================

pub fn vehicle_id() -> VehicleId {
    SlotMap::<VehicleId, ()>::with_key().insert(())
}

pub fn kitchen_id() -> KitchenId {
    SlotMap::<KitchenId, ()>::with_key().insert(())
}

pub fn dessert_station_id() -> DessertStationId {
    SlotMap::<DessertStationId, ()>::with_key().insert(())
}

// ===========================================================================
// Settlers and stock
// ===========================================================================

pub fn worker(name: &str) -> Worker {
    Worker::new(name)
}

/// Oxygen, water and food, `kg` of each.
pub fn stocked_store(kg: f64) -> ResourceStore {
    let mut s = ResourceStore::new();
    for id in [fixed::OXYGEN, fixed::WATER, fixed::FOOD] {
        let _ = s.store_amount(id, kg);
    }
    s
}

/// Everything the test recipes and desserts need, plus food and cleaning
/// supplies. Holds no oxygen or methane.
pub fn pantry() -> ResourceStore {
    let mut s = ResourceStore::new();
    for (id, kg) in [
        (soybean(), 100.0),
        (rice(), 100.0),
        (potato(), 100.0),
        (tomato(), 100.0),
        (garlic(), 100.0),
        (carrot(), 100.0),
        (onion(), 100.0),
        (peanut(), 100.0),
        (soybean_oil(), 10.0),
        (peanut_oil(), 10.0),
        (soymilk(), 20.0),
        (sugarcane_juice(), 20.0),
        (granola_bar(), 20.0),
        (strawberry(), 20.0),
        (fixed::TABLE_SALT, 10.0),
        (fixed::WATER, 1000.0),
        (fixed::SODIUM_HYPOCHLORITE, 10.0),
        (fixed::FOOD, 100.0),
    ] {
        let _ = s.store_amount(id, kg);
    }
    s
}

// ===========================================================================
// Meals
// ===========================================================================

pub fn meal_config() -> MealConfig {
    let mut b = MealConfigBuilder::new();
    b.add_recipe(
        DishRecipe::new("Bean Rice Bowl", DishCategory::Main)
            .with_ingredient(soybean(), 0.4)
            .with_ingredient(rice(), 0.4)
            .with_ingredient(garlic(), 0.1)
            .with_ingredient(tomato(), 0.2)
            .with_ingredient(onion(), 0.1),
    )
    .add_recipe(
        DishRecipe::new("Potato Salad", DishCategory::Side)
            .with_ingredient(potato(), 0.6)
            .with_ingredient(carrot(), 0.2)
            .with_ingredient(onion(), 0.2)
            .with_oil(0.02),
    )
    .add_recipe(
        DishRecipe::new("Peanut Stew", DishCategory::Main)
            .with_ingredient(peanut(), 0.3)
            .with_ingredient(rice(), 0.4)
            .with_ingredient(carrot(), 0.2)
            .with_ingredient(tomato(), 0.3),
    )
    .add_oil(soybean_oil())
    .add_oil(peanut_oil())
    .add_dessert("soymilk", soymilk(), 0.05)
    .add_dessert("sugarcane juice", sugarcane_juice(), 0.05)
    .add_dessert("granola bar", granola_bar(), 0.25)
    .add_dessert("strawberry", strawberry(), 0.1);
    b.build(&catalog()).unwrap()
}

/// Ten settlers over a full pantry.
pub fn settlement() -> Settlement {
    let config = SettlementConfig {
        name: "Schiaparelli Point".to_string(),
        population: 10,
        seed: 7,
        ..SettlementConfig::default()
    };
    let mut s = Settlement::new(config, Arc::new(catalog()), Arc::new(meal_config()));
    *s.store_mut() = pantry();
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_ids_match_catalog() {
        let cat = catalog();
        for (name, id) in [
            ("soybean", soybean()),
            ("tomato", tomato()),
            ("strawberry", strawberry()),
            ("spark plug", spark_plug()),
            ("wheel", wheel()),
            ("eva suit", eva_suit()),
            ("specimen box", specimen_box()),
        ] {
            assert_eq!(cat.id(name), Some(id), "{name}");
        }
    }

    #[test]
    fn meal_config_builds() {
        let config = meal_config();
        assert_eq!(config.recipes().len(), 3);
        assert_eq!(config.desserts().len(), 4);
        assert_eq!(config.oils().len(), 2);
    }
}
