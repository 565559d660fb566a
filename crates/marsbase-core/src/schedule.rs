use crate::clock::{MILLISOLS_PER_SOL, MarsTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealKind {
    Breakfast,
    Lunch,
    Dinner,
    MidnightSnack,
}

impl MealKind {
    pub const ALL: [MealKind; 4] = [
        MealKind::Breakfast,
        MealKind::Lunch,
        MealKind::Dinner,
        MealKind::MidnightSnack,
    ];

    /// Local start time in millisols.
    pub fn local_start(self) -> f64 {
        match self {
            MealKind::Breakfast => 250.0,
            MealKind::Lunch => 500.0,
            MealKind::Dinner => 750.0,
            MealKind::MidnightSnack => 0.0,
        }
    }

    pub fn duration(self) -> f64 {
        match self {
            MealKind::MidnightSnack => 50.0,
            _ => 100.0,
        }
    }
}

/// A meal window in settlement-clock millisols. May wrap past 1000.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MealWindow {
    pub kind: MealKind,
    pub start: f64,
    pub duration: f64,
}

impl MealWindow {
    pub fn contains(&self, millisol: f64) -> bool {
        let t = millisol.rem_euclid(MILLISOLS_PER_SOL);
        let end = self.start + self.duration;
        if end <= MILLISOLS_PER_SOL {
            t >= self.start && t < end
        } else {
            t >= self.start || t < end - MILLISOLS_PER_SOL
        }
    }
}

/// When a settlement eats. Local meal times are shifted onto the global
/// clock by the settlement's longitude.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MealSchedule {
    offset: f64,
}

impl MealSchedule {
    /// A schedule whose windows start `offset` millisols after the local times.
    pub fn new(offset: f64) -> Self {
        Self {
            offset: offset.rem_euclid(MILLISOLS_PER_SOL),
        }
    }

    /// Settlements east of the prime meridian reach local meal times earlier
    /// on the global clock.
    pub fn for_longitude(longitude_deg: f64) -> Self {
        let offset = -(longitude_deg / 360.0 * MILLISOLS_PER_SOL).round();
        Self::new(offset)
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn windows(&self) -> [MealWindow; 4] {
        MealKind::ALL.map(|kind| MealWindow {
            kind,
            start: (kind.local_start() + self.offset).rem_euclid(MILLISOLS_PER_SOL),
            duration: kind.duration(),
        })
    }

    pub fn active_meal(&self, time: MarsTime) -> Option<MealKind> {
        let t = time.millisol();
        self.windows()
            .into_iter()
            .find(|w| w.contains(t))
            .map(|w| w.kind)
    }

    pub fn is_meal_time(&self, time: MarsTime) -> bool {
        self.active_meal(time).is_some()
    }
}
