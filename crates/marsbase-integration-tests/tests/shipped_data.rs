//! The data files shipped in `data/` load and drive a settlement.

use std::path::Path;

use marsbase_core::catalog::fixed;
use marsbase_core::clock::{MarsTime, MasterClock};
use marsbase_core::cooking::{CookOutcome, Cooking, PreparingDessert};
use marsbase_core::id::ResourceCategory;
use marsbase_core::settlement::{Settlement, SettlementConfig};
use marsbase_core::test_utils::worker;
use marsbase_data::{GameData, load_game_data};

fn shipped() -> GameData {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    load_game_data(&dir).unwrap()
}

#[test]
fn fixed_resources_keep_their_ids() {
    let data = shipped();
    let cat = &data.catalog;
    assert_eq!(cat.id("oxygen"), Some(fixed::OXYGEN));
    assert_eq!(cat.id("water"), Some(fixed::WATER));
    assert_eq!(cat.id("food"), Some(fixed::FOOD));
    assert_eq!(cat.id("methanol"), Some(fixed::METHANOL));
    assert_eq!(cat.id("food waste"), Some(fixed::FOOD_WASTE));
    assert_eq!(cat.id("table salt"), Some(fixed::TABLE_SALT));
}

#[test]
fn every_category_is_represented() {
    let data = shipped();
    for category in [
        ResourceCategory::Amount,
        ResourceCategory::Item,
        ResourceCategory::Equipment,
        ResourceCategory::Robot,
        ResourceCategory::Bin,
    ] {
        assert!(
            data.catalog.iter_category(category).next().is_some(),
            "no {category:?} resources"
        );
    }
}

#[test]
fn meal_book_is_complete() {
    let data = shipped();
    let meals = &data.meal_config;
    assert_eq!(meals.recipes().len(), 5);
    assert_eq!(meals.desserts().len(), 5);
    assert_eq!(meals.oils().len(), 3);
    assert!(meals.recipe("Baked Potato").is_some());
    assert!(meals.dry_mass_per_serving() > 0.0);
    for recipe in meals.recipes() {
        assert!(recipe.dry_mass() > 0.0, "{} has no dry mass", recipe.name);
    }
}

#[test]
fn stocked_settlement_cooks_from_shipped_recipes() {
    let data = shipped();
    let mut s = Settlement::new(
        SettlementConfig {
            name: "Gale Crater".into(),
            seed: 11,
            ..SettlementConfig::default()
        },
        data.catalog.clone(),
        data.meal_config.clone(),
    );

    let mut stock = Vec::new();
    for recipe in data.meal_config.recipes() {
        stock.extend(recipe.ingredients.iter().map(|i| i.resource));
    }
    stock.extend(data.meal_config.oils().iter().copied());
    stock.extend(data.meal_config.desserts().iter().map(|d| d.resource));
    stock.extend([fixed::TABLE_SALT, fixed::SODIUM_HYPOCHLORITE]);
    for id in stock {
        let _ = s.store_mut().store_amount(id, 10.0);
    }
    let _ = s.store_mut().store_amount(fixed::WATER, 500.0);

    let kitchen = s.add_kitchen(Cooking::new("Galley"));
    let station = s.add_dessert_station(PreparingDessert::new("Bar"));
    let mut clock = MasterClock::new(MarsTime::new(1, 499.0));
    let pulse = clock.advance(1.0);
    s.time_passing(&pulse);
    assert!(s.schedule().is_meal_time(pulse.time));

    let cook = worker("Ana").with_cooking_skill(3);
    let meal = s.add_cooking_work(kitchen, 10.0, &cook).unwrap();
    assert!(matches!(meal, CookOutcome::Cooked { .. }), "got {meal:?}");
    let dessert = s.add_dessert_work(station, 5.0, &cook).unwrap();
    assert!(matches!(dessert, CookOutcome::Cooked { .. }), "got {dessert:?}");

    assert_eq!(s.total_available_meals(), 1);
    assert!(s.choose_a_meal(kitchen, &worker("Bo")).unwrap().is_some());
    assert_eq!(s.total_available_meals(), 0);
}
