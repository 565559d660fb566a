use serde::{Deserialize, Serialize};

/// Strength of an average settler. Loading effort scales relative to it.
pub const AVERAGE_STRENGTH: f64 = 50.0;

/// Thirst above which a settler only picks drinks from the dessert menu.
pub const THIRST_THRESHOLD: f64 = 100.0;

/// The attributes of a settler that loading and cooking read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub name: String,
    /// Physical strength, 0..=100.
    pub strength: f64,
    /// Current performance ratio, 0..=1.
    pub performance: f64,
    /// Cooking skill level.
    pub cooking_skill: u32,
    pub thirst: f64,
    pub favorite_main_dish: Option<String>,
    pub favorite_side_dish: Option<String>,
    pub favorite_dessert: Option<String>,
}

impl Worker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strength: AVERAGE_STRENGTH,
            performance: 1.0,
            cooking_skill: 0,
            thirst: 0.0,
            favorite_main_dish: None,
            favorite_side_dish: None,
            favorite_dessert: None,
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength.clamp(0.0, 100.0);
        self
    }

    pub fn with_performance(mut self, performance: f64) -> Self {
        self.performance = performance.clamp(0.0, 1.0);
        self
    }

    pub fn with_cooking_skill(mut self, skill: u32) -> Self {
        self.cooking_skill = skill;
        self
    }

    pub fn with_thirst(mut self, thirst: f64) -> Self {
        self.thirst = thirst.max(0.0);
        self
    }

    pub fn with_favorites(
        mut self,
        main: Option<&str>,
        side: Option<&str>,
        dessert: Option<&str>,
    ) -> Self {
        self.favorite_main_dish = main.map(str::to_string);
        self.favorite_side_dish = side.map(str::to_string);
        self.favorite_dessert = dessert.map(str::to_string);
        self
    }

    /// Loading speed multiplier: strength relative to an average settler,
    /// floored so a weak settler still makes some progress.
    pub fn strength_modifier(&self) -> f64 {
        (self.strength / AVERAGE_STRENGTH).max(0.1)
    }

    pub fn is_thirsty(&self) -> bool {
        self.thirst > THIRST_THRESHOLD
    }

    /// True if `dish` is this settler's favourite main or side dish.
    pub fn likes_dish(&self, dish: &str) -> bool {
        self.favorite_main_dish.as_deref() == Some(dish)
            || self.favorite_side_dish.as_deref() == Some(dish)
    }
}
