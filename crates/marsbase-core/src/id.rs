use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;
use std::ops::Range;

new_key_type! {
    /// Identifies a vehicle parked at a settlement.
    pub struct VehicleId;

    /// Identifies a cooking facility inside a settlement.
    pub struct KitchenId;

    /// Identifies a dessert preparation facility inside a settlement.
    pub struct DessertStationId;
}

/// Identifies a resource in the catalog. Cheap to copy and compare.
///
/// The numeric value encodes the category: each category owns a disjoint
/// block of the id space (see [`ResourceCategory::range`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

/// Ids reserved for the well-known amount resources.
pub const FIXED_AMOUNT_RANGE: Range<u32> = 0..100;

/// First id handed out to amount resources discovered at load time.
pub const FIRST_DYNAMIC_AMOUNT_ID: u32 = FIXED_AMOUNT_RANGE.end;

/// Broad kind of a resource. Determines which id block it lives in and
/// how a store accounts for it (continuous kilograms or whole units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Amount,
    Item,
    Equipment,
    Robot,
    Bin,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 5] = [
        ResourceCategory::Amount,
        ResourceCategory::Item,
        ResourceCategory::Equipment,
        ResourceCategory::Robot,
        ResourceCategory::Bin,
    ];

    /// Half-open id block owned by this category.
    pub fn range(self) -> Range<u32> {
        match self {
            ResourceCategory::Amount => 0..1000,
            ResourceCategory::Item => 1000..2000,
            ResourceCategory::Equipment => 2000..3000,
            ResourceCategory::Robot => 3000..4000,
            ResourceCategory::Bin => 4000..5000,
        }
    }

    /// True for categories counted in whole units rather than kilograms.
    pub fn is_discrete(self) -> bool {
        !matches!(self, ResourceCategory::Amount)
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceCategory::Amount => "amount",
            ResourceCategory::Item => "item",
            ResourceCategory::Equipment => "equipment",
            ResourceCategory::Robot => "robot",
            ResourceCategory::Bin => "bin",
        };
        f.write_str(s)
    }
}

impl ResourceId {
    /// Category implied by the id block, or `None` outside every block.
    pub fn category(self) -> Option<ResourceCategory> {
        ResourceCategory::ALL
            .into_iter()
            .find(|c| c.range().contains(&self.0))
    }

    /// True for the reserved well-known amount resources.
    pub fn is_fixed(self) -> bool {
        FIXED_AMOUNT_RANGE.contains(&self.0)
    }
}
