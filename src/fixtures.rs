//! Seeded demo fixtures: personal ingredient stock, menus, and plannings.
//!
//! Fixtures are not derived from the corpus content, only from the sizes of
//! the resolved tables, so they are generated here rather than in the core
//! engine. All randomness comes from the caller's RNG.

use rand::seq::index::sample;
use rand::Rng;

use recipe_import_core::emit::{FridgeItem, Fixtures, Menu, Planning};
use recipe_import_core::models::NormalizedCorpus;
use recipe_import_core::tables::ResolutionContext;

use crate::config::FixturesConfig;

const FRIDGE_UNIT: &str = "g";

/// Random count in `1..=max`, or 0 when `max` is 0.
fn at_least_one<R: Rng>(rng: &mut R, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        rng.gen_range(1..=max)
    }
}

pub fn generate_fixtures<R: Rng>(
    ctx: &ResolutionContext,
    corpus: &NormalizedCorpus,
    config: &FixturesConfig,
    rng: &mut R,
) -> Fixtures {
    let mut fixtures = Fixtures::default();
    let authors = ctx.authors.rows();
    let ingredient_count = ctx.ingredients.len();
    let recipe_count = corpus.recipes.len();

    for (author, _) in ctx.authors.iter() {
        let wanted = if config.max_fridge_items == 0 {
            0
        } else {
            rng.gen_range(0..config.max_fridge_items)
        };
        for ingredient in sample(rng, ingredient_count, wanted.min(ingredient_count)) {
            fixtures.fridge_items.push(FridgeItem {
                author,
                ingredient,
                quantity: f64::from(rng.gen_range(0..10_000u32)) / 10.0,
                unit: FRIDGE_UNIT.to_string(),
            });
        }
    }

    if authors.is_empty() {
        return fixtures;
    }

    let half_spread = config.expiry_spread_days / 2;
    for _ in 0..authors.len() * config.plannings_per_author {
        let author = rng.gen_range(0..authors.len());
        let owner = &authors[author].name;
        let expiry_days = rng.gen_range(-half_spread..=half_spread);

        let mut menus = Vec::new();
        if recipe_count > 0 {
            for i in 0..at_least_one(rng, config.max_menus_per_planning) {
                let size = at_least_one(rng, config.max_recipes_per_menu).min(recipe_count);
                let recipes = sample(rng, recipe_count, size).into_vec();
                menus.push(fixtures.menus.len());
                fixtures.menus.push(Menu {
                    name: format!("{owner} menu {i}"),
                    recipes,
                });
            }
        }

        fixtures.plannings.push(Planning {
            name: format!("{owner}'s random planning"),
            author,
            expiry_days,
            menus,
        });
    }

    tracing::info!(
        fridge_items = fixtures.fridge_items.len(),
        menus = fixtures.menus.len(),
        plannings = fixtures.plannings.len(),
        "fixtures generated"
    );
    fixtures
}
