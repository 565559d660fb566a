use crate::id::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Amounts below this many kilograms are treated as empty.
pub const MASS_EPSILON: f64 = 1e-9;

/// Inventory of a settlement or vehicle.
///
/// Amount resources are tracked in kilograms with an optional per-resource
/// capacity; items and equipment are whole unit counts. Stock never goes
/// negative: retrievals hand out what is there and report the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceStore {
    amounts: BTreeMap<ResourceId, f64>,
    /// Per-resource capacity in kg. Missing entry means unlimited.
    capacities: BTreeMap<ResourceId, f64>,
    items: BTreeMap<ResourceId, u32>,
    equipment: BTreeMap<ResourceId, u32>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Amount resources
    // -----------------------------------------------------------------------

    /// Cap the stock of an amount resource. Existing stock above the new
    /// capacity is kept.
    pub fn set_amount_capacity(&mut self, id: ResourceId, kg: f64) {
        self.capacities.insert(id, kg.max(0.0));
    }

    pub fn amount_capacity(&self, id: ResourceId) -> Option<f64> {
        self.capacities.get(&id).copied()
    }

    /// Free room for an amount resource in kg. Unlimited stores report
    /// `f64::INFINITY`.
    pub fn remaining_capacity(&self, id: ResourceId) -> f64 {
        match self.capacities.get(&id) {
            Some(cap) => (cap - self.amount_stored(id)).max(0.0),
            None => f64::INFINITY,
        }
    }

    pub fn amount_stored(&self, id: ResourceId) -> f64 {
        self.amounts.get(&id).copied().unwrap_or(0.0)
    }

    /// Store kilograms of an amount resource. Returns the excess that did
    /// not fit.
    #[must_use = "excess indicates mass that did not fit"]
    pub fn store_amount(&mut self, id: ResourceId, kg: f64) -> f64 {
        if kg.is_nan() || kg <= 0.0 {
            return 0.0;
        }
        let room = self.remaining_capacity(id);
        let to_store = kg.min(room);
        if to_store > 0.0 {
            *self.amounts.entry(id).or_insert(0.0) += to_store;
        }
        kg - to_store
    }

    /// Retrieve kilograms of an amount resource. Takes whatever is on hand
    /// and returns the shortfall that could not be satisfied.
    #[must_use = "shortfall indicates mass that was not available"]
    pub fn retrieve_amount(&mut self, id: ResourceId, kg: f64) -> f64 {
        if kg.is_nan() || kg <= 0.0 {
            return 0.0;
        }
        let Some(stock) = self.amounts.get_mut(&id) else {
            return kg;
        };
        let taken = kg.min(*stock);
        *stock -= taken;
        if *stock <= MASS_EPSILON {
            self.amounts.remove(&id);
        }
        let shortfall = kg - taken;
        if shortfall <= MASS_EPSILON { 0.0 } else { shortfall }
    }

    /// Iterate over every amount resource with non-zero stock.
    pub fn amounts(&self) -> impl Iterator<Item = (ResourceId, f64)> + '_ {
        self.amounts.iter().map(|(&id, &kg)| (id, kg))
    }

    pub fn total_amount_mass(&self) -> f64 {
        self.amounts.values().sum()
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    pub fn store_item(&mut self, id: ResourceId, count: u32) {
        if count > 0 {
            *self.items.entry(id).or_insert(0) += count;
        }
    }

    /// Remove items. Returns the number actually removed.
    #[must_use = "returns the count actually removed, which may be less than requested"]
    pub fn retrieve_item(&mut self, id: ResourceId, count: u32) -> u32 {
        take_units(&mut self.items, id, count)
    }

    pub fn item_stored(&self, id: ResourceId) -> u32 {
        self.items.get(&id).copied().unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Equipment
    // -----------------------------------------------------------------------

    pub fn store_equipment(&mut self, id: ResourceId, count: u32) {
        if count > 0 {
            *self.equipment.entry(id).or_insert(0) += count;
        }
    }

    /// Remove equipment. Returns the number actually removed.
    #[must_use = "returns the count actually removed, which may be less than requested"]
    pub fn retrieve_equipment(&mut self, id: ResourceId, count: u32) -> u32 {
        take_units(&mut self.equipment, id, count)
    }

    pub fn equipment_count(&self, id: ResourceId) -> u32 {
        self.equipment.get(&id).copied().unwrap_or(0)
    }
}

fn take_units(stock: &mut BTreeMap<ResourceId, u32>, id: ResourceId, count: u32) -> u32 {
    let Some(have) = stock.get_mut(&id) else {
        return 0;
    };
    let taken = count.min(*have);
    *have -= taken;
    if *have == 0 {
        stock.remove(&id);
    }
    taken
}
