use crate::id::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Targets for one priority class of a manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestBucket {
    /// Kilograms of each amount resource.
    pub amounts: BTreeMap<ResourceId, f64>,
    /// Unit counts of each item resource.
    pub items: BTreeMap<ResourceId, u32>,
    /// Target stock level of each equipment type.
    pub equipment: BTreeMap<ResourceId, u32>,
}

impl ManifestBucket {
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty() && self.items.is_empty() && self.equipment.is_empty()
    }
}

/// What a vehicle should carry, split into mandatory and optional targets.
///
/// Optional quantities are loaded on top of the mandatory ones for the same
/// resource once every mandatory target is met.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuppliesManifest {
    mandatory: ManifestBucket,
    optional: ManifestBucket,
}

impl SuppliesManifest {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket_mut(&mut self, mandatory: bool) -> &mut ManifestBucket {
        if mandatory { &mut self.mandatory } else { &mut self.optional }
    }

    pub fn bucket(&self, mandatory: bool) -> &ManifestBucket {
        if mandatory { &self.mandatory } else { &self.optional }
    }

    /// Add kilograms to an amount target. Negative amounts are summed like
    /// any other; a target that ends up at or below zero is already met.
    pub fn add_amount(&mut self, id: ResourceId, kg: f64, mandatory: bool) {
        *self.bucket_mut(mandatory).amounts.entry(id).or_insert(0.0) += kg;
    }

    /// Add units to an item target.
    pub fn add_item(&mut self, id: ResourceId, count: u32, mandatory: bool) {
        if count > 0 {
            *self.bucket_mut(mandatory).items.entry(id).or_insert(0) += count;
        }
    }

    /// Raise an equipment target to at least `count`. Equipment targets are
    /// stock levels, so repeated calls keep the larger value.
    pub fn add_equipment(&mut self, id: ResourceId, count: u32, mandatory: bool) {
        if count > 0 {
            let target = self.bucket_mut(mandatory).equipment.entry(id).or_insert(0);
            *target = (*target).max(count);
        }
    }

    pub fn amounts(&self, mandatory: bool) -> &BTreeMap<ResourceId, f64> {
        &self.bucket(mandatory).amounts
    }

    pub fn items(&self, mandatory: bool) -> &BTreeMap<ResourceId, u32> {
        &self.bucket(mandatory).items
    }

    pub fn equipment(&self, mandatory: bool) -> &BTreeMap<ResourceId, u32> {
        &self.bucket(mandatory).equipment
    }

    pub fn is_empty(&self) -> bool {
        self.mandatory.is_empty() && self.optional.is_empty()
    }

    /// Total kilograms of amount resources across both classes.
    pub fn total_amount_mass(&self) -> f64 {
        self.mandatory
            .amounts
            .values()
            .chain(self.optional.amounts.values())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const O2: ResourceId = ResourceId(1);
    const PLUG: ResourceId = ResourceId(1000);
    const SUIT: ResourceId = ResourceId(2000);

    #[test]
    fn add_accumulates_per_class() {
        let mut m = SuppliesManifest::new();
        m.add_amount(O2, 10.0, true);
        m.add_amount(O2, 5.0, true);
        m.add_amount(O2, 2.0, false);
        assert_eq!(m.amounts(true)[&O2], 15.0);
        assert_eq!(m.amounts(false)[&O2], 2.0);
        assert!((m.total_amount_mass() - 17.0).abs() < 1e-12);
    }

    #[test]
    fn negative_amounts_are_summed() {
        let mut m = SuppliesManifest::new();
        m.add_amount(O2, -1.0, true);
        m.add_amount(O2, 3.0, true);
        assert_eq!(m.amounts(true)[&O2], 2.0);

        m.add_amount(O2, -3.0, false);
        assert_eq!(m.amounts(false)[&O2], -3.0);
        m.add_item(PLUG, 0, true);
        assert!(m.items(true).is_empty());
    }

    #[test]
    fn equipment_keeps_the_larger_target() {
        let mut m = SuppliesManifest::new();
        m.add_equipment(SUIT, 3, true);
        m.add_equipment(SUIT, 2, true);
        assert_eq!(m.equipment(true)[&SUIT], 3);
        m.add_equipment(SUIT, 5, true);
        assert_eq!(m.equipment(true)[&SUIT], 5);
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let mut a = SuppliesManifest::new();
        a.add_item(PLUG, 4, true);
        let mut b = a.clone();
        b.add_item(PLUG, 1, true);
        assert_eq!(a.items(true)[&PLUG], 4);
        assert_eq!(b.items(true)[&PLUG], 5);
    }
}
