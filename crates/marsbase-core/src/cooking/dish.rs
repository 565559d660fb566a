use crate::clock::MarsTime;
use crate::cooking::recipe::DishCategory;
use crate::id::ResourceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to a dish that went past its shelf life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpoilageOutcome {
    /// Thrown out as food waste.
    Discarded,
    /// Salted or refrigerated and returned to stock.
    Preserved,
}

/// Letter grade for a dish quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QualityGrade {
    F,
    D,
    C,
    B,
    BPlus,
    A,
    APlus,
}

impl QualityGrade {
    pub fn from_quality(quality: f64) -> Self {
        match quality {
            q if q >= 3.0 => QualityGrade::APlus,
            q if q >= 2.0 => QualityGrade::A,
            q if q >= 1.5 => QualityGrade::BPlus,
            q if q >= 1.0 => QualityGrade::B,
            q if q >= 0.0 => QualityGrade::C,
            q if q >= -2.0 => QualityGrade::D,
            _ => QualityGrade::F,
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityGrade::APlus => "A+",
            QualityGrade::A => "A",
            QualityGrade::BPlus => "B+",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
            QualityGrade::D => "D",
            QualityGrade::F => "F",
        };
        f.write_str(s)
    }
}

/// A cooked meal or prepared dessert waiting to be eaten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedDish {
    pub name: String,
    pub category: DishCategory,
    pub quality: f64,
    /// Kilograms returned to stock (or waste) if the dish spoils.
    pub dry_mass: f64,
    pub created: MarsTime,
    pub expires: MarsTime,
    pub producer: String,
    /// Resource a preserved dessert goes back into. `None` for meals.
    pub resource: Option<ResourceId>,
}

impl PreparedDish {
    pub fn is_expired(&self, now: MarsTime) -> bool {
        now.time_diff(self.expires) > 0.0
    }

    pub fn grade(&self) -> QualityGrade {
        QualityGrade::from_quality(self.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish(quality: f64) -> PreparedDish {
        PreparedDish {
            name: "Bean Bowl".into(),
            category: DishCategory::Main,
            quality,
            dry_mass: 0.155,
            created: MarsTime::new(1, 250.0),
            expires: MarsTime::new(1, 400.0),
            producer: "Ana".into(),
            resource: None,
        }
    }

    #[test]
    fn expiry_is_strictly_after_deadline() {
        let d = dish(1.0);
        assert!(!d.is_expired(MarsTime::new(1, 400.0)));
        assert!(d.is_expired(MarsTime::new(1, 400.5)));
    }

    #[test]
    fn grades_cover_the_scale() {
        assert_eq!(dish(3.2).grade(), QualityGrade::APlus);
        assert_eq!(dish(2.0).grade(), QualityGrade::A);
        assert_eq!(dish(1.7).grade(), QualityGrade::BPlus);
        assert_eq!(dish(1.0).grade(), QualityGrade::B);
        assert_eq!(dish(0.3).grade(), QualityGrade::C);
        assert_eq!(dish(-1.5).grade(), QualityGrade::D);
        assert_eq!(dish(-4.0).grade(), QualityGrade::F);
    }

    #[test]
    fn grade_display() {
        assert_eq!(QualityGrade::APlus.to_string(), "A+");
        assert_eq!(QualityGrade::BPlus.to_string(), "B+");
        assert!(QualityGrade::A > QualityGrade::B);
    }
}
