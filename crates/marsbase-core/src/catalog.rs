use crate::id::{FIRST_DYNAMIC_AMOUNT_ID, ResourceCategory, ResourceId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Well-known amount resources. Their ids are stable across every catalog
/// and other modules refer to them directly.
pub mod fixed {
    use crate::id::ResourceId;

    pub const OXYGEN: ResourceId = ResourceId(1);
    pub const WATER: ResourceId = ResourceId(2);
    pub const FOOD: ResourceId = ResourceId(3);
    pub const METHANE: ResourceId = ResourceId(4);
    pub const METHANOL: ResourceId = ResourceId(5);
    pub const CARBON_DIOXIDE: ResourceId = ResourceId(6);
    pub const FOOD_WASTE: ResourceId = ResourceId(7);
    pub const GREY_WATER: ResourceId = ResourceId(8);
    pub const SODIUM_HYPOCHLORITE: ResourceId = ResourceId(9);
    pub const TABLE_SALT: ResourceId = ResourceId(10);
}

/// Physical phase of an amount resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Gas,
    Liquid,
    Solid,
}

/// Descriptor fields specific to continuous (kilogram) resources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountSpec {
    pub phase: Phase,
    pub life_support: bool,
    pub edible: bool,
    /// Fraction of the fresh mass that is water, used to derive recipe dry mass.
    pub water_content: f64,
}

impl AmountSpec {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            life_support: false,
            edible: false,
            water_content: 0.0,
        }
    }

    pub fn with_life_support(mut self) -> Self {
        self.life_support = true;
        self
    }

    pub fn with_edible(mut self, water_content: f64) -> Self {
        self.edible = true;
        self.water_content = water_content.clamp(0.0, 1.0);
        self
    }
}

/// Kind-specific part of a resource descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResourceKind {
    Amount(AmountSpec),
    Item { unit_mass: f64 },
    Equipment { empty_mass: f64 },
    Robot { unit_mass: f64 },
    Bin { empty_mass: f64 },
}

impl ResourceKind {
    pub fn category(&self) -> ResourceCategory {
        match self {
            ResourceKind::Amount(_) => ResourceCategory::Amount,
            ResourceKind::Item { .. } => ResourceCategory::Item,
            ResourceKind::Equipment { .. } => ResourceCategory::Equipment,
            ResourceKind::Robot { .. } => ResourceCategory::Robot,
            ResourceKind::Bin { .. } => ResourceCategory::Bin,
        }
    }
}

/// A resource definition in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDef {
    pub id: ResourceId,
    pub name: String,
    pub kind: ResourceKind,
}

impl ResourceDef {
    /// Mass of one unit in kilograms. Amount resources are measured in
    /// kilograms already, so their unit mass is 1.
    pub fn unit_mass(&self) -> f64 {
        match self.kind {
            ResourceKind::Amount(_) => 1.0,
            ResourceKind::Item { unit_mass } | ResourceKind::Robot { unit_mass } => unit_mass,
            ResourceKind::Equipment { empty_mass } | ResourceKind::Bin { empty_mass } => empty_mass,
        }
    }

    pub fn amount_spec(&self) -> Option<&AmountSpec> {
        match &self.kind {
            ResourceKind::Amount(spec) => Some(spec),
            _ => None,
        }
    }
}

/// Name and default descriptor of every fixed resource, in id order.
pub fn fixed_resources() -> [(ResourceId, &'static str, AmountSpec); 10] {
    [
        (fixed::OXYGEN, "oxygen", AmountSpec::new(Phase::Gas).with_life_support()),
        (fixed::WATER, "water", AmountSpec::new(Phase::Liquid).with_life_support()),
        (
            fixed::FOOD,
            "food",
            AmountSpec::new(Phase::Solid).with_life_support().with_edible(0.0),
        ),
        (fixed::METHANE, "methane", AmountSpec::new(Phase::Gas)),
        (fixed::METHANOL, "methanol", AmountSpec::new(Phase::Liquid)),
        (fixed::CARBON_DIOXIDE, "carbon dioxide", AmountSpec::new(Phase::Gas)),
        (fixed::FOOD_WASTE, "food waste", AmountSpec::new(Phase::Solid)),
        (fixed::GREY_WATER, "grey water", AmountSpec::new(Phase::Liquid)),
        (
            fixed::SODIUM_HYPOCHLORITE,
            "sodium hypochlorite",
            AmountSpec::new(Phase::Solid),
        ),
        (
            fixed::TABLE_SALT,
            "table salt",
            AmountSpec::new(Phase::Solid).with_edible(0.0),
        ),
    ]
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn fixed_id_for(name: &str) -> Option<ResourceId> {
    fixed_resources()
        .into_iter()
        .find(|(_, n, _)| *n == name)
        .map(|(id, _, _)| id)
}

/// Builder for constructing an immutable [`ResourceCatalog`].
///
/// Names are matched case-insensitively. Fixed resource names always land
/// on their reserved ids; everything else gets the next free id in its
/// category block.
#[derive(Debug)]
pub struct CatalogBuilder {
    defs: BTreeMap<ResourceId, ResourceDef>,
    name_to_id: HashMap<String, ResourceId>,
    next_free: BTreeMap<ResourceCategory, u32>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    pub fn new() -> Self {
        let next_free = ResourceCategory::ALL
            .into_iter()
            .map(|c| {
                let start = match c {
                    ResourceCategory::Amount => FIRST_DYNAMIC_AMOUNT_ID,
                    other => other.range().start,
                };
                (c, start)
            })
            .collect();
        Self {
            defs: BTreeMap::new(),
            name_to_id: HashMap::new(),
            next_free,
        }
    }

    /// A builder with every fixed resource already registered using its
    /// default descriptor.
    pub fn with_fixed_resources() -> Self {
        let mut builder = Self::new();
        for (id, name, spec) in fixed_resources() {
            builder.insert(id, name, ResourceKind::Amount(spec));
        }
        builder
    }

    /// Register a resource. Returns its id.
    pub fn register(&mut self, name: &str, kind: ResourceKind) -> Result<ResourceId, CatalogError> {
        let key = normalize(name);
        if key.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if self.name_to_id.contains_key(&key) {
            return Err(CatalogError::DuplicateName(key));
        }

        let category = kind.category();
        let id = match fixed_id_for(&key) {
            Some(id) if category == ResourceCategory::Amount => id,
            Some(id) => {
                return Err(CatalogError::FixedResourceMismatch {
                    name: key,
                    id,
                    found: category,
                });
            }
            None => {
                let next = self.next_free.entry(category).or_insert(category.range().start);
                if *next >= category.range().end {
                    return Err(CatalogError::RangeExhausted(category));
                }
                let id = ResourceId(*next);
                *next += 1;
                id
            }
        };

        self.insert(id, &key, kind);
        Ok(id)
    }

    pub fn register_amount(&mut self, name: &str, spec: AmountSpec) -> Result<ResourceId, CatalogError> {
        self.register(name, ResourceKind::Amount(spec))
    }

    pub fn register_item(&mut self, name: &str, unit_mass: f64) -> Result<ResourceId, CatalogError> {
        self.register(name, ResourceKind::Item { unit_mass })
    }

    pub fn register_equipment(&mut self, name: &str, empty_mass: f64) -> Result<ResourceId, CatalogError> {
        self.register(name, ResourceKind::Equipment { empty_mass })
    }

    /// Lookup resource id by name.
    pub fn id(&self, name: &str) -> Option<ResourceId> {
        self.name_to_id.get(&normalize(name)).copied()
    }

    fn insert(&mut self, id: ResourceId, name: &str, kind: ResourceKind) {
        let name = normalize(name);
        self.name_to_id.insert(name.clone(), id);
        self.defs.insert(id, ResourceDef { id, name, kind });
    }

    /// Finalize and build the immutable catalog. Fails if any fixed
    /// resource is missing.
    pub fn build(self) -> Result<ResourceCatalog, CatalogError> {
        for (id, name, _) in fixed_resources() {
            if !self.defs.contains_key(&id) {
                return Err(CatalogError::MissingFixedResource(name.to_string()));
            }
        }
        Ok(ResourceCatalog {
            defs: self.defs,
            name_to_id: self.name_to_id,
        })
    }
}

/// Immutable resource catalog. Frozen after build(). Thread-safe to share.
#[derive(Debug)]
pub struct ResourceCatalog {
    defs: BTreeMap<ResourceId, ResourceDef>,
    name_to_id: HashMap<String, ResourceId>,
}

impl ResourceCatalog {
    pub fn get(&self, id: ResourceId) -> Option<&ResourceDef> {
        self.defs.get(&id)
    }

    pub fn id(&self, name: &str) -> Option<ResourceId> {
        self.name_to_id.get(&normalize(name)).copied()
    }

    /// Like [`id`](Self::id) but reports unknown names as an error.
    pub fn require(&self, name: &str) -> Result<ResourceId, CatalogError> {
        self.id(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    pub fn name(&self, id: ResourceId) -> Option<&str> {
        self.defs.get(&id).map(|d| d.name.as_str())
    }

    /// Unit mass for discrete resources, 1.0 for amounts, 0.0 if unknown.
    pub fn unit_mass(&self, id: ResourceId) -> f64 {
        self.defs.get(&id).map(ResourceDef::unit_mass).unwrap_or(0.0)
    }

    /// Water content of an amount resource, 0.0 if unknown or discrete.
    pub fn water_content(&self, id: ResourceId) -> f64 {
        self.defs
            .get(&id)
            .and_then(ResourceDef::amount_spec)
            .map(|s| s.water_content)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions of one category, in id order.
    pub fn iter_category(&self, category: ResourceCategory) -> impl Iterator<Item = &ResourceDef> {
        self.defs
            .range(ResourceId(category.range().start)..ResourceId(category.range().end))
            .map(|(_, def)| def)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("resource name must not be empty")]
    EmptyName,
    #[error("duplicate resource name: {0}")]
    DuplicateName(String),
    #[error("fixed resource '{name}' ({id:?}) must be an amount resource, found {found}")]
    FixedResourceMismatch {
        name: String,
        id: ResourceId,
        found: ResourceCategory,
    },
    #[error("missing fixed resource: {0}")]
    MissingFixedResource(String),
    #[error("no free ids left in the {0} range")]
    RangeExhausted(ResourceCategory),
}
