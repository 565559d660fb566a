use crate::catalog::ResourceCatalog;
use crate::id::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The first this-many ingredients of a recipe must all be present to cook it.
pub const MANDATORY_INGREDIENTS: usize = 3;

pub const NUMBER_OF_MEALS_PER_SOL: f64 = 4.0;
pub const NUMBER_OF_DESSERTS_PER_SOL: f64 = 4.0;

/// Fraction of a dessert serving that counts toward the per-sol dessert
/// consumption; the rest is water.
pub const DESSERT_SERVING_FRACTION: f64 = 0.5;

pub const AMOUNT_OF_SALT_PER_MEAL: f64 = 0.005;
pub const AMOUNT_OF_OIL_PER_MEAL: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DishCategory {
    Main,
    Side,
    Dessert,
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    /// Position in the recipe. Indices below [`MANDATORY_INGREDIENTS`] are
    /// mandatory.
    pub index: usize,
    pub resource: ResourceId,
    pub proportion: f64,
    /// Kilograms consumed per serving. Filled in by [`MealConfigBuilder::build`].
    pub dry_mass: f64,
}

impl Ingredient {
    pub fn is_mandatory(&self) -> bool {
        self.index < MANDATORY_INGREDIENTS
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DishRecipe {
    pub name: String,
    pub category: DishCategory,
    /// Kilograms of oil per serving.
    pub oil: f64,
    /// Kilograms of table salt per serving.
    pub salt: f64,
    pub ingredients: Vec<Ingredient>,
}

impl DishRecipe {
    pub fn new(name: impl Into<String>, category: DishCategory) -> Self {
        Self {
            name: name.into(),
            category,
            oil: AMOUNT_OF_OIL_PER_MEAL,
            salt: AMOUNT_OF_SALT_PER_MEAL,
            ingredients: Vec::new(),
        }
    }

    pub fn with_ingredient(mut self, resource: ResourceId, proportion: f64) -> Self {
        let index = self.ingredients.len();
        self.ingredients.push(Ingredient {
            index,
            resource,
            proportion,
            dry_mass: 0.0,
        });
        self
    }

    pub fn with_oil(mut self, kg: f64) -> Self {
        self.oil = kg.max(0.0);
        self
    }

    pub fn with_salt(mut self, kg: f64) -> Self {
        self.salt = kg.max(0.0);
        self
    }

    pub fn mandatory(&self) -> &[Ingredient] {
        let n = self.ingredients.len().min(MANDATORY_INGREDIENTS);
        &self.ingredients[..n]
    }

    pub fn optional(&self) -> &[Ingredient] {
        let n = self.ingredients.len().min(MANDATORY_INGREDIENTS);
        &self.ingredients[n..]
    }

    /// Total dry mass of one serving.
    pub fn dry_mass(&self) -> f64 {
        self.ingredients.iter().map(|i| i.dry_mass).sum()
    }
}

/// A dessert on the menu.
#[derive(Debug, Clone, PartialEq)]
pub struct DessertSpec {
    pub name: String,
    pub resource: ResourceId,
    /// Kilograms of the dessert resource per serving. Water tops up the rest.
    pub dry_mass: f64,
}

impl DessertSpec {
    /// Drinks are the only choice for a thirsty settler.
    pub fn is_drink(&self) -> bool {
        is_drink(&self.name)
    }
}

/// Juices and milks count as drinks.
pub fn is_drink(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("juice") || name.contains("milk")
}

// ---------------------------------------------------------------------------
// Meal configuration
// ---------------------------------------------------------------------------

/// Immutable meal configuration. Built once and shared by every kitchen.
#[derive(Debug, Clone)]
pub struct MealConfig {
    recipes: Vec<DishRecipe>,
    desserts: Vec<DessertSpec>,
    oils: Vec<ResourceId>,
    pub food_consumption_per_sol: f64,
    pub dessert_consumption_per_sol: f64,
    pub cleaning_agent_per_sol: f64,
    /// Millisols a cooked meal stays fresh.
    pub meal_shelf_life: f64,
    /// Millisols a prepared dessert stays fresh.
    pub dessert_shelf_life: f64,
}

impl MealConfig {
    pub fn recipes(&self) -> &[DishRecipe] {
        &self.recipes
    }

    pub fn recipe(&self, name: &str) -> Option<&DishRecipe> {
        self.recipes.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn desserts(&self) -> &[DessertSpec] {
        &self.desserts
    }

    pub fn oils(&self) -> &[ResourceId] {
        &self.oils
    }

    /// Dry mass of one cooked meal.
    pub fn dry_mass_per_serving(&self) -> f64 {
        self.food_consumption_per_sol / NUMBER_OF_MEALS_PER_SOL
    }

    /// Total mass of one dessert serving, dry part plus water.
    pub fn dessert_mass_per_serving(&self) -> f64 {
        self.dessert_consumption_per_sol / NUMBER_OF_DESSERTS_PER_SOL / DESSERT_SERVING_FRACTION
    }
}

/// Builder for [`MealConfig`]. Ingredient dry masses are derived at build
/// time from the catalog's water content.
#[derive(Debug, Clone)]
pub struct MealConfigBuilder {
    recipes: Vec<DishRecipe>,
    desserts: Vec<DessertSpec>,
    oils: Vec<ResourceId>,
    pub food_consumption_per_sol: f64,
    pub dessert_consumption_per_sol: f64,
    pub cleaning_agent_per_sol: f64,
    pub meal_shelf_life: f64,
    pub dessert_shelf_life: f64,
}

impl Default for MealConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MealConfigBuilder {
    pub fn new() -> Self {
        Self {
            recipes: Vec::new(),
            desserts: Vec::new(),
            oils: Vec::new(),
            food_consumption_per_sol: 0.62,
            dessert_consumption_per_sol: 0.5,
            cleaning_agent_per_sol: 0.1,
            meal_shelf_life: 150.0,
            dessert_shelf_life: 150.0,
        }
    }

    pub fn add_recipe(&mut self, recipe: DishRecipe) -> &mut Self {
        self.recipes.push(recipe);
        self
    }

    pub fn add_dessert(&mut self, name: &str, resource: ResourceId, dry_mass: f64) -> &mut Self {
        self.desserts.push(DessertSpec {
            name: name.to_string(),
            resource,
            dry_mass,
        });
        self
    }

    pub fn add_oil(&mut self, resource: ResourceId) -> &mut Self {
        if !self.oils.contains(&resource) {
            self.oils.push(resource);
        }
        self
    }

    /// Validate recipes and derive each ingredient's dry mass per serving.
    pub fn build(self, catalog: &ResourceCatalog) -> Result<MealConfig, MealConfigError> {
        let per_serving = self.food_consumption_per_sol / NUMBER_OF_MEALS_PER_SOL;
        let mut seen = HashSet::new();
        let mut recipes = self.recipes;

        for recipe in &mut recipes {
            if !seen.insert(recipe.name.to_lowercase()) {
                return Err(MealConfigError::DuplicateRecipe(recipe.name.clone()));
            }
            if recipe.category == DishCategory::Dessert {
                return Err(MealConfigError::DessertRecipe(recipe.name.clone()));
            }
            if recipe.ingredients.len() < MANDATORY_INGREDIENTS {
                return Err(MealConfigError::TooFewIngredients {
                    recipe: recipe.name.clone(),
                    found: recipe.ingredients.len(),
                });
            }
            for ingredient in &recipe.ingredients {
                if catalog.get(ingredient.resource).is_none() {
                    return Err(MealConfigError::UnknownResource {
                        recipe: recipe.name.clone(),
                        resource: ingredient.resource,
                    });
                }
                if ingredient.proportion.is_nan() || ingredient.proportion <= 0.0 {
                    return Err(MealConfigError::NonPositiveProportion {
                        recipe: recipe.name.clone(),
                        index: ingredient.index,
                    });
                }
            }
            assign_dry_mass(recipe, catalog, per_serving);
        }

        for dessert in &self.desserts {
            if catalog.get(dessert.resource).is_none() {
                return Err(MealConfigError::UnknownResource {
                    recipe: dessert.name.clone(),
                    resource: dessert.resource,
                });
            }
        }

        Ok(MealConfig {
            recipes,
            desserts: self.desserts,
            oils: self.oils,
            food_consumption_per_sol: self.food_consumption_per_sol,
            dessert_consumption_per_sol: self.dessert_consumption_per_sol,
            cleaning_agent_per_sol: self.cleaning_agent_per_sol,
            meal_shelf_life: self.meal_shelf_life,
            dessert_shelf_life: self.dessert_shelf_life,
        })
    }
}

/// Split the per-serving dry mass across ingredients by proportion weighted
/// by each ingredient's dry fraction.
fn assign_dry_mass(recipe: &mut DishRecipe, catalog: &ResourceCatalog, per_serving: f64) {
    let weights: Vec<f64> = recipe
        .ingredients
        .iter()
        .map(|i| i.proportion * (1.0 - catalog.water_content(i.resource)))
        .collect();
    let total: f64 = weights.iter().sum();
    let count = weights.len().max(1) as f64;
    for (ingredient, w) in recipe.ingredients.iter_mut().zip(weights) {
        let share = if total > 0.0 { w / total } else { 1.0 / count };
        ingredient.dry_mass = (per_serving * share * 1e6).round() / 1e6;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MealConfigError {
    #[error("duplicate recipe: {0}")]
    DuplicateRecipe(String),
    #[error("recipe '{0}' is a dessert; desserts belong on the dessert menu")]
    DessertRecipe(String),
    #[error("recipe '{recipe}' has {found} ingredients, needs at least 3")]
    TooFewIngredients { recipe: String, found: usize },
    #[error("recipe '{recipe}' ingredient {index} has a non-positive proportion")]
    NonPositiveProportion { recipe: String, index: usize },
    #[error("'{recipe}' references unknown resource {resource:?}")]
    UnknownResource { recipe: String, resource: ResourceId },
}
