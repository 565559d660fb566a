use crate::catalog::fixed;
use crate::clock::ClockPulse;
use crate::cooking::cache::IngredientCache;
use crate::cooking::dish::{PreparedDish, SpoilageOutcome};
use crate::cooking::kitchen::{KitchenState, roll_spoilage, take_expired};
use crate::cooking::recipe::{AMOUNT_OF_SALT_PER_MEAL, DishRecipe, MealConfig};
use crate::cooking::{CookOutcome, KitchenContext};
use crate::event::{Event, Facility};
use crate::id::{KitchenId, ResourceId};
use crate::schedule::MealSchedule;
use crate::store::ResourceStore;
use crate::worker::Worker;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Work-time needed to cook one meal.
pub const COOKED_MEAL_WORK_REQUIRED: f64 = 8.0;
pub const WATER_USAGE_PER_MEAL: f64 = 1.0;
/// Share of cooking water that comes back as grey water.
pub const GREY_WATER_FRACTION: f64 = 0.95;

pub const INGREDIENT_BONUS: f64 = 0.5;
/// Penalty base for a missing optional ingredient; later ingredients cost less.
pub const MISSING_OPTIONAL_PENALTY: f64 = 3.0;
pub const OIL_BONUS: f64 = 0.2;
pub const SKILL_WEIGHT: f64 = 0.25;
pub const QUALITY_DIVISOR: f64 = 2.0;
/// A favourite dish below this quality is passed over.
pub const MIN_FAVORITE_QUALITY: f64 = -1.0;

/// A kitchen that cooks hot meals.
#[derive(Debug, Clone)]
pub struct Cooking {
    name: String,
    kitchen: KitchenState,
    cache: IngredientCache,
    dishes: Vec<PreparedDish>,
}

impl Cooking {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kitchen: KitchenState::new(),
            cache: IngredientCache::new(),
            dishes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kitchen(&self) -> &KitchenState {
        &self.kitchen
    }

    pub fn ingredient_cache(&self) -> &IngredientCache {
        &self.cache
    }

    /// Hand every cached ingredient back to the settlement store.
    pub fn return_ingredients(&mut self, store: &mut ResourceStore) {
        self.cache.return_all(store);
    }

    /// Meals ready to eat, oldest first.
    pub fn dishes(&self) -> &[PreparedDish] {
        &self.dishes
    }

    pub fn available_meals(&self) -> u32 {
        self.dishes.len() as u32
    }

    /// Best quality among meals on hand, never below zero.
    pub fn best_meal_quality(&self) -> f64 {
        self.dishes.iter().map(|d| d.quality).fold(0.0, f64::max)
    }

    /// Best quality this kitchen has ever produced.
    pub fn best_meal_quality_cache(&self) -> f64 {
        self.kitchen.best_quality()
    }

    /// Add cooking work-time and cook a meal once enough has accumulated.
    ///
    /// `available` is the number of meals already on hand across the
    /// whole settlement.
    pub fn add_work(
        &mut self,
        id: KitchenId,
        work: f64,
        worker: &Worker,
        available: u32,
        config: &MealConfig,
        ctx: &mut KitchenContext<'_>,
    ) -> CookOutcome {
        self.kitchen.add_work(work);
        if self.kitchen.is_suppressed() {
            return CookOutcome::Suppressed;
        }
        if self.kitchen.work_time() < COOKED_MEAL_WORK_REQUIRED {
            return CookOutcome::NotReady;
        }

        let cap = ctx.population as f64 * ctx.rates.meals;
        if available as f64 >= cap {
            self.kitchen.suppress();
            debug!(kitchen = %self.name, available, cap, "enough meals on hand, cooking suppressed");
            ctx.events.emit(Event::CookingSuppressed {
                facility: Facility::Kitchen(id),
                available,
                cap,
                time: ctx.now,
            });
            return CookOutcome::Suppressed;
        }

        let candidates = self.cookable_recipes(config, ctx);
        let Some(pick) = ctx.rng.index(candidates.len()) else {
            return CookOutcome::NothingAvailable;
        };
        let recipe = &config.recipes()[candidates[pick]];
        match self.cook_a_hot_meal(id, recipe, worker, config, ctx) {
            Some(dish) => {
                self.kitchen.consume_work(COOKED_MEAL_WORK_REQUIRED);
                CookOutcome::Cooked {
                    dish: dish.name,
                    quality: dish.quality,
                }
            }
            None => CookOutcome::NothingAvailable,
        }
    }

    /// Indices of recipes whose mandatory ingredients are all on hand.
    fn cookable_recipes(&self, config: &MealConfig, ctx: &KitchenContext<'_>) -> Vec<usize> {
        config
            .recipes()
            .iter()
            .enumerate()
            .filter(|(_, r)| self.has_mandatory(r, ctx))
            .map(|(i, _)| i)
            .collect()
    }

    /// A resource listed more than once among the mandatory ingredients must
    /// cover all of its lines.
    fn has_mandatory(&self, recipe: &DishRecipe, ctx: &KitchenContext<'_>) -> bool {
        let mut needed: BTreeMap<ResourceId, f64> = BTreeMap::new();
        for i in recipe.mandatory() {
            *needed.entry(i.resource).or_insert(0.0) += i.dry_mass;
        }
        needed
            .into_iter()
            .all(|(id, kg)| self.cache.is_available(&*ctx.store, id, kg))
    }

    /// Cook one serving of `recipe`. Returns `None` without touching any
    /// stock if a mandatory ingredient is missing.
    pub fn cook_a_hot_meal(
        &mut self,
        id: KitchenId,
        recipe: &DishRecipe,
        worker: &Worker,
        config: &MealConfig,
        ctx: &mut KitchenContext<'_>,
    ) -> Option<PreparedDish> {
        if !self.has_mandatory(recipe, ctx) {
            return None;
        }

        let mut score = 0.0;
        for ingredient in &recipe.ingredients {
            if self.cache.retrieve(ctx.store, ingredient.resource, ingredient.dry_mass) {
                score += INGREDIENT_BONUS;
            } else if ingredient.is_mandatory() {
                return None;
            } else {
                score -= MISSING_OPTIONAL_PENALTY / (ingredient.index - 2) as f64;
            }
        }

        if self.use_oil(recipe.oil, config, ctx) {
            score += OIL_BONUS;
        }
        self.cache.retrieve(ctx.store, fixed::TABLE_SALT, recipe.salt);
        self.use_water(ctx);

        score += SKILL_WEIGHT * worker.performance * worker.cooking_skill as f64;
        score += self.kitchen.cleanliness();
        let quality = (score / QUALITY_DIVISOR * 10.0).round() / 10.0;

        let dish = PreparedDish {
            name: recipe.name.clone(),
            category: recipe.category,
            quality,
            dry_mass: config.dry_mass_per_serving(),
            created: ctx.now,
            expires: ctx.now.plus(config.meal_shelf_life),
            producer: worker.name.clone(),
            resource: None,
        };
        self.kitchen.record_dish(quality);
        self.dishes.push(dish.clone());

        debug!(kitchen = %self.name, dish = %dish.name, quality, grade = %dish.grade(), "meal cooked");
        ctx.events.emit(Event::MealCooked {
            kitchen: id,
            dish: dish.name.clone(),
            quality,
            time: ctx.now,
        });
        Some(dish)
    }

    fn use_oil(&mut self, kg: f64, config: &MealConfig, ctx: &mut KitchenContext<'_>) -> bool {
        if kg <= 0.0 {
            return false;
        }
        let oils: Vec<_> = config
            .oils()
            .iter()
            .copied()
            .filter(|&oil| self.cache.is_available(&*ctx.store, oil, kg))
            .collect();
        match ctx.rng.index(oils.len()) {
            Some(i) => self.cache.retrieve(ctx.store, oils[i], kg),
            None => false,
        }
    }

    fn use_water(&mut self, ctx: &mut KitchenContext<'_>) {
        let usage = WATER_USAGE_PER_MEAL * ctx.rng.range_f64(0.8, 1.2)
            / ctx.water_ration_level.max(1) as f64;
        if self.cache.retrieve(ctx.store, fixed::WATER, usage) {
            let _ = ctx.store.store_amount(fixed::GREY_WATER, usage * GREY_WATER_FRACTION);
        }
    }

    /// Take a meal for `worker`: a favourite main or side dish if one of
    /// decent quality is on hand, otherwise the best available.
    pub fn choose_a_meal(&mut self, worker: &Worker) -> Option<PreparedDish> {
        let index = best_index(&self.dishes, |d| {
            worker.likes_dish(&d.name) && d.quality > MIN_FAVORITE_QUALITY
        })
        .or_else(|| best_index(&self.dishes, |_| true))?;
        Some(self.dishes.remove(index))
    }

    /// Advance the kitchen by one clock pulse: spoil expired meals, reset
    /// between meal periods and clean up at the start of a new sol.
    pub fn time_passing(
        &mut self,
        id: KitchenId,
        pulse: &ClockPulse,
        schedule: &MealSchedule,
        config: &MealConfig,
        ctx: &mut KitchenContext<'_>,
    ) {
        if pulse.new_int_millisol {
            for dish in take_expired(&mut self.dishes, pulse.time) {
                let outcome = roll_spoilage(ctx.rng, &dish);
                match outcome {
                    SpoilageOutcome::Discarded => {
                        let _ = ctx.store.store_amount(fixed::FOOD_WASTE, dish.dry_mass);
                    }
                    SpoilageOutcome::Preserved => {
                        self.cache
                            .retrieve(ctx.store, fixed::TABLE_SALT, AMOUNT_OF_SALT_PER_MEAL);
                        let _ = ctx.store.store_amount(fixed::FOOD, dish.dry_mass);
                    }
                }
                ctx.rates.lower_meals();
                info!(kitchen = %self.name, dish = %dish.name, ?outcome, "meal expired");
                ctx.events.emit(Event::MealExpired {
                    kitchen: id,
                    dish: dish.name,
                    outcome,
                    mass: dish.dry_mass,
                    time: pulse.time,
                });
            }
        }

        if !schedule.is_meal_time(pulse.time) {
            self.kitchen.reset_for_meal_period();
        }

        if pulse.new_sol {
            ctx.rates.raise_meals();
            let cleanliness = self.kitchen.end_of_day(ctx.store, config.cleaning_agent_per_sol);
            info!(kitchen = %self.name, cleanliness, "kitchen cleaned");
            ctx.events.emit(Event::KitchenCleaned {
                facility: Facility::Kitchen(id),
                cleanliness,
                time: pulse.time,
            });
        }
    }
}

/// Index of the highest-quality dish matching `pred`. Ties keep the
/// earliest dish.
pub(crate) fn best_index(dishes: &[PreparedDish], pred: impl Fn(&PreparedDish) -> bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, d) in dishes.iter().enumerate() {
        if !pred(d) {
            continue;
        }
        if best.is_none_or(|(_, q)| d.quality > q) {
            best = Some((i, d.quality));
        }
    }
    best.map(|(i, _)| i)
}
