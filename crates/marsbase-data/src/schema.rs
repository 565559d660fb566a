//! Serde structs for the on-disk resource catalog and meal book.
//!
//! Everything here refers to resources by name. The loader resolves names
//! against the catalog and builds the core types.

use marsbase_core::catalog::Phase;
use marsbase_core::cooking::DishCategory;
use serde::Deserialize;

// ===========================================================================
// Resources
// ===========================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryData {
    #[default]
    Amount,
    Item,
    Equipment,
    Robot,
    Bin,
}

/// One resource definition. Fields that do not apply to the category are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceData {
    pub name: String,
    #[serde(default)]
    pub category: CategoryData,
    /// Amount resources only.
    #[serde(default = "default_phase")]
    pub phase: Phase,
    #[serde(default)]
    pub life_support: bool,
    #[serde(default)]
    pub edible: bool,
    /// Fraction of fresh mass that is water. Edible resources only.
    #[serde(default)]
    pub water_content: f64,
    /// Unit mass for items and robots, empty mass for equipment and bins.
    #[serde(default)]
    pub mass: f64,
}

fn default_phase() -> Phase {
    Phase::Solid
}

// ===========================================================================
// Meals
// ===========================================================================

/// An ingredient line: either `("soybean", 0.4)` or the full form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IngredientData {
    Short(String, f64),
    Full { resource: String, proportion: f64 },
}

impl IngredientData {
    pub fn resource(&self) -> &str {
        match self {
            IngredientData::Short(name, _) | IngredientData::Full { resource: name, .. } => name,
        }
    }

    pub fn proportion(&self) -> f64 {
        match self {
            IngredientData::Short(_, p) | IngredientData::Full { proportion: p, .. } => *p,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub name: String,
    pub category: DishCategory,
    pub ingredients: Vec<IngredientData>,
    /// Kilograms of oil per serving. Omitted means the standard amount.
    #[serde(default)]
    pub oil: Option<f64>,
    #[serde(default)]
    pub salt: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DessertData {
    pub name: String,
    /// Resource consumed; defaults to the resource named like the dessert.
    #[serde(default)]
    pub resource: Option<String>,
    pub dry_mass: f64,
}

/// Tunables. Anything omitted keeps the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MealSettingsData {
    pub food_consumption_per_sol: Option<f64>,
    pub dessert_consumption_per_sol: Option<f64>,
    pub cleaning_agent_per_sol: Option<f64>,
    pub meal_shelf_life: Option<f64>,
    pub dessert_shelf_life: Option<f64>,
}

/// Contents of the `meals` data file.
#[derive(Debug, Clone, Deserialize)]
pub struct MealsData {
    #[serde(default)]
    pub settings: MealSettingsData,
    #[serde(default)]
    pub oils: Vec<String>,
    pub recipes: Vec<RecipeData>,
    #[serde(default)]
    pub desserts: Vec<DessertData>,
}
