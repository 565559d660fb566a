use crate::id::ResourceId;
use crate::store::{MASS_EPSILON, ResourceStore};
use std::collections::HashMap;

/// How many servings' worth a kitchen pulls from stock when it runs dry.
pub const BUY_AHEAD_FACTOR: f64 = 5.0;

/// Ingredients a kitchen has already pulled out of the settlement store.
///
/// When the cache runs short it tries to take five servings' worth from
/// the store, keeping the rest in the cache; if the store cannot cover that
/// it takes only what the cache is missing. The cache only changes when something is
/// actually retrieved.
#[derive(Debug, Clone, Default)]
pub struct IngredientCache {
    stock: HashMap<ResourceId, f64>,
}

impl IngredientCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, id: ResourceId) -> f64 {
        self.stock.get(&id).copied().unwrap_or(0.0)
    }

    /// Kilograms held across every ingredient.
    pub fn total_mass(&self) -> f64 {
        self.stock.values().sum()
    }

    /// True if `kg` could be retrieved right now from the cache and the
    /// store together.
    pub fn is_available(&self, store: &ResourceStore, id: ResourceId, kg: f64) -> bool {
        self.cached(id) + store.amount_stored(id) >= kg
    }

    /// Retrieve `kg` for cooking, cache first. Returns false and changes
    /// nothing if the cache and the store together cannot supply it.
    pub fn retrieve(&mut self, store: &mut ResourceStore, id: ResourceId, kg: f64) -> bool {
        if kg <= 0.0 {
            return true;
        }
        let cached = self.cached(id);
        if cached >= kg {
            self.set(id, cached - kg);
            return true;
        }

        let bulk = kg * BUY_AHEAD_FACTOR;
        let missing = kg - cached;
        if store.amount_stored(id) >= bulk {
            let _ = store.retrieve_amount(id, bulk);
            self.set(id, cached + bulk - kg);
            true
        } else if store.amount_stored(id) >= missing {
            let _ = store.retrieve_amount(id, missing);
            self.set(id, 0.0);
            true
        } else {
            false
        }
    }

    fn set(&mut self, id: ResourceId, kg: f64) {
        if kg <= MASS_EPSILON {
            self.stock.remove(&id);
        } else {
            self.stock.insert(id, kg);
        }
    }

    /// Put everything back into the store.
    pub fn return_all(&mut self, store: &mut ResourceStore) {
        for (id, kg) in self.stock.drain() {
            let _ = store.store_amount(id, kg);
        }
    }
}
