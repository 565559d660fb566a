//! Reads the resource and meal data files, resolves names and builds the
//! core catalog and meal configuration.
//!
//! A data directory holds `resources.{ron,toml,json}` and
//! `meals.{ron,toml,json}`. Exactly one format per file is allowed.

use crate::schema::{CategoryData, MealsData, ResourceData};
use marsbase_core::catalog::{
    AmountSpec, CatalogBuilder, CatalogError, ResourceCatalog, ResourceKind, fixed_resources,
};
use marsbase_core::cooking::{DishRecipe, MealConfig, MealConfigBuilder, MealConfigError};
use marsbase_core::id::ResourceId;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const RESOURCES_FILE: &str = "resources";
pub const MEALS_FILE: &str = "meals";

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The same data file exists in more than one format.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name did not match any catalog entry.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("invalid catalog in {file}: {source}")]
    Catalog {
        file: PathBuf,
        #[source]
        source: CatalogError,
    },

    #[error("invalid meal configuration in {file}: {source}")]
    Meals {
        file: PathBuf,
        #[source]
        source: MealConfigError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection and discovery
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    Format::ALL
        .into_iter()
        .find(|f| Some(f.extension()) == ext)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

/// The single `{base_name}.{ron,toml,json}` in `dir`, if any.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for format in Format::ALL {
        let candidate = dir.join(format!("{base_name}.{}", format.extension()));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Deserialize a whole file, picking the parser from its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list. TOML has no top-level arrays, so there the list is
/// read from `toml_key` of the top-level table.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }
    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Look up a resource by name (case-insensitive).
pub fn resolve_resource(
    catalog: &ResourceCatalog,
    name: &str,
    file: &Path,
) -> Result<ResourceId, DataLoadError> {
    catalog.id(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind: "resource",
    })
}

fn resource_kind(data: &ResourceData) -> ResourceKind {
    match data.category {
        CategoryData::Amount => {
            let mut spec = AmountSpec::new(data.phase);
            if data.life_support {
                spec = spec.with_life_support();
            }
            if data.edible {
                spec = spec.with_edible(data.water_content);
            }
            ResourceKind::Amount(spec)
        }
        CategoryData::Item => ResourceKind::Item {
            unit_mass: data.mass,
        },
        CategoryData::Equipment => ResourceKind::Equipment {
            empty_mass: data.mass,
        },
        CategoryData::Robot => ResourceKind::Robot {
            unit_mass: data.mass,
        },
        CategoryData::Bin => ResourceKind::Bin {
            empty_mass: data.mass,
        },
    }
}

/// Build a catalog from parsed resource entries. Fixed resources absent
/// from the file are added with their default descriptors.
pub fn build_catalog(entries: &[ResourceData], file: &Path) -> Result<ResourceCatalog, DataLoadError> {
    let catalog_error = |source| DataLoadError::Catalog {
        file: file.to_path_buf(),
        source,
    };

    let mut builder = CatalogBuilder::new();
    for entry in entries {
        builder
            .register(&entry.name, resource_kind(entry))
            .map_err(catalog_error)?;
    }
    for (_, name, spec) in fixed_resources() {
        if builder.id(name).is_none() {
            debug!(resource = name, "fixed resource not in data file, using default");
            builder.register_amount(name, spec).map_err(catalog_error)?;
        }
    }
    builder.build().map_err(catalog_error)
}

/// Build the meal configuration, resolving every resource name.
pub fn build_meal_config(
    data: MealsData,
    catalog: &ResourceCatalog,
    file: &Path,
) -> Result<MealConfig, DataLoadError> {
    let mut builder = MealConfigBuilder::new();
    let s = &data.settings;
    if let Some(v) = s.food_consumption_per_sol {
        builder.food_consumption_per_sol = v;
    }
    if let Some(v) = s.dessert_consumption_per_sol {
        builder.dessert_consumption_per_sol = v;
    }
    if let Some(v) = s.cleaning_agent_per_sol {
        builder.cleaning_agent_per_sol = v;
    }
    if let Some(v) = s.meal_shelf_life {
        builder.meal_shelf_life = v;
    }
    if let Some(v) = s.dessert_shelf_life {
        builder.dessert_shelf_life = v;
    }

    for oil in &data.oils {
        builder.add_oil(resolve_resource(catalog, oil, file)?);
    }

    for recipe in &data.recipes {
        let mut dish = DishRecipe::new(&recipe.name, recipe.category);
        for ingredient in &recipe.ingredients {
            let id = resolve_resource(catalog, ingredient.resource(), file)?;
            dish = dish.with_ingredient(id, ingredient.proportion());
        }
        if let Some(oil) = recipe.oil {
            dish = dish.with_oil(oil);
        }
        if let Some(salt) = recipe.salt {
            dish = dish.with_salt(salt);
        }
        builder.add_recipe(dish);
    }

    for dessert in &data.desserts {
        let resource = dessert.resource.as_deref().unwrap_or(&dessert.name);
        let id = resolve_resource(catalog, resource, file)?;
        builder.add_dessert(&dessert.name, id, dessert.dry_mass);
    }

    builder.build(catalog).map_err(|source| DataLoadError::Meals {
        file: file.to_path_buf(),
        source,
    })
}

// ===========================================================================
// Pipeline
// ===========================================================================

/// Immutable configuration shared by every settlement.
#[derive(Debug, Clone)]
pub struct GameData {
    pub catalog: Arc<ResourceCatalog>,
    pub meal_config: Arc<MealConfig>,
}

/// Load the catalog and meal configuration from `dir`.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let resources_path = require_data_file(dir, RESOURCES_FILE)?;
    let entries: Vec<ResourceData> = deserialize_list(&resources_path, RESOURCES_FILE)?;
    let catalog = build_catalog(&entries, &resources_path)?;

    let meals_path = require_data_file(dir, MEALS_FILE)?;
    let meals: MealsData = deserialize_file(&meals_path)?;
    let meal_config = build_meal_config(meals, &catalog, &meals_path)?;

    info!(
        dir = %dir.display(),
        resources = catalog.len(),
        recipes = meal_config.recipes().len(),
        desserts = meal_config.desserts().len(),
        "game data loaded"
    );
    Ok(GameData {
        catalog: Arc::new(catalog),
        meal_config: Arc::new(meal_config),
    })
}

// ===========================================================================
// Tests
// ===========================================================================
