//! Recipe and author assembly.
//!
//! Assembly runs in two phases around the construction of the
//! [`ResolutionContext`]:
//!
//! 1. **Drafting** ([`draft_recipes`], [`draft_authors`]): every raw record
//!    is parsed into strings and verified media paths. Recipes lacking a
//!    name or an author are discarded here, so nothing they mention reaches
//!    the reference tables.
//! 2. **Resolution** ([`resolve_recipes`]): names are turned into ids against
//!    the finished context, and steps and timers are allocated handles in
//!    the corpus-wide arenas. Unresolvable references are dropped.

use rand::Rng;
use std::collections::HashSet;

use crate::diet::DietMask;
use crate::media::{resolve_media, MediaStore};
use crate::models::{
    Author, EntityRecord, IngredientLine, ListEntry, NormalizedCorpus, Recipe, Step, StepId,
    Timer, TimerId,
};
use crate::parse::{
    parse_ingredient_lines, parse_instructions, parse_quantity, parse_timer_phrase, ParsedStep,
};
use crate::tables::{CategoryRoot, ResolutionContext};

/// Settings that shape assembled records.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Domain of the derived author email (`<id>@<domain>`).
    pub email_domain: String,
    /// Extension appended to media names that have none.
    pub default_extension: String,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            email_domain: "gnome.org".to_string(),
            default_extension: "jpg".to_string(),
        }
    }
}

/// Upper bound (exclusive) of the calorie placeholder, in steps of 30.
const CALORIE_STEPS: u32 = 30;
const CALORIE_STEP: u32 = 30;

/// A recipe whose fields are parsed but whose references are still names.
#[derive(Debug, Clone, Default)]
pub struct RecipeDraft {
    pub source_id: String,
    pub name: String,
    pub author: String,
    pub description: Option<String>,
    pub categories: Vec<(CategoryRoot, String)>,
    pub ingredients: Vec<IngredientLine>,
    pub steps: Vec<ParsedStep>,
    pub serves: Option<u32>,
    /// One entry per `Images` item; `None` when the file is missing, kept so
    /// step `[image:N]` indices stay aligned.
    pub media: Vec<Option<String>>,
    pub timers: Vec<Timer>,
    pub diets: DietMask,
    pub calories: u32,
}

/// Build authors from chef records. Chefs without a `Name` are skipped.
pub fn draft_authors(
    chefs: &[EntityRecord],
    store: &dyn MediaStore,
    opts: &AssembleOptions,
) -> Vec<Author> {
    chefs
        .iter()
        .filter(|c| c.get("Name").is_some())
        .enumerate()
        .map(|(index, chef)| {
            let image = chef.get("Image").unwrap_or("").replacen("images/", "", 1);
            Author {
                name: chef.id.clone(),
                full_name: chef.get("Fullname").map(str::to_string),
                description: chef.get("Description").map(str::to_string),
                email: format!("{}@{}", chef.id, opts.email_domain),
                picture: resolve_media(store, &chef.id, &image, &opts.default_extension),
                fridge_id: index,
            }
        })
        .collect()
}

/// Parse one recipe record. Returns `None` when the name or author is empty.
pub fn draft_recipe<R: Rng>(
    record: &EntityRecord,
    store: &dyn MediaStore,
    opts: &AssembleOptions,
    rng: &mut R,
) -> Option<RecipeDraft> {
    let (Some(name), Some(author)) = (record.get("Name"), record.get("Author")) else {
        tracing::debug!(recipe = %record.id, "recipe without name or author dropped");
        return None;
    };

    let categories = CategoryRoot::ALL
        .into_iter()
        .filter_map(|root| record.get(root.name()).map(|v| (root, v.to_string())))
        .collect();

    let media = record
        .get("Images")
        .unwrap_or("")
        .split(';')
        .filter(|i| !i.is_empty())
        .map(|i| resolve_media(store, &record.id, i, &opts.default_extension))
        .collect();

    let timers = [("PrepTime", "Preparation"), ("CookTime", "Cook")]
        .into_iter()
        .filter_map(|(field, kind)| {
            let phrase = record.get(field)?;
            let timer = parse_timer_phrase(phrase, kind);
            if timer.is_none() {
                tracing::debug!(recipe = %record.id, phrase, "unknown duration phrase");
            }
            timer
        })
        .collect();

    Some(RecipeDraft {
        source_id: record.id.clone(),
        name: name.to_string(),
        author: author.to_string(),
        description: record.get("Description").map(str::to_string),
        categories,
        ingredients: parse_ingredient_lines(record.get("Ingredients").unwrap_or("")),
        steps: parse_instructions(record.get("Instructions").unwrap_or("")),
        serves: record.get("Serves").and_then(|s| s.trim().parse().ok()),
        media,
        timers,
        diets: DietMask::parse(record.get("Diets")),
        calories: rng.gen_range(0..CALORIE_STEPS) * CALORIE_STEP,
    })
}

/// Draft every recipe record, in source order, discarding incomplete ones.
pub fn draft_recipes<R: Rng>(
    records: &[EntityRecord],
    store: &dyn MediaStore,
    opts: &AssembleOptions,
    rng: &mut R,
) -> Vec<RecipeDraft> {
    let drafts: Vec<RecipeDraft> = records
        .iter()
        .filter_map(|r| draft_recipe(r, store, opts, rng))
        .collect();
    tracing::info!(
        kept = drafts.len(),
        dropped = records.len() - drafts.len(),
        "recipes drafted"
    );
    drafts
}

/// Resolve drafts against the context, allocating step and timer handles.
///
/// Recipe ids follow draft order. Within a recipe, step timers are allocated
/// before the preparation and cook timers.
pub fn resolve_recipes(ctx: &ResolutionContext, drafts: &[RecipeDraft]) -> NormalizedCorpus {
    let mut corpus = NormalizedCorpus::default();
    for (id, draft) in drafts.iter().enumerate() {
        let recipe = resolve_recipe(ctx, id, draft, &mut corpus);
        corpus.recipes.push(recipe);
    }
    tracing::info!(
        recipes = corpus.recipes.len(),
        steps = corpus.steps.len(),
        timers = corpus.timers.len(),
        "recipes resolved"
    );
    corpus
}

fn allocate_timer(corpus: &mut NormalizedCorpus, timer: &Timer) -> Option<TimerId> {
    if timer.is_empty() {
        return None;
    }
    corpus.timers.push(timer.clone());
    Some(TimerId(corpus.timers.len() - 1))
}

fn resolve_recipe(
    ctx: &ResolutionContext,
    id: usize,
    draft: &RecipeDraft,
    corpus: &mut NormalizedCorpus,
) -> Recipe {
    let author = ctx.resolve_author(&draft.author);
    if author.is_none() {
        tracing::debug!(recipe = %draft.source_id, author = %draft.author, "author not found");
    }

    let categories = draft
        .categories
        .iter()
        .filter_map(|(root, name)| ctx.resolve_category(*root, name))
        .collect();

    let mut seen = HashSet::new();
    let ingredients = draft
        .ingredients
        .iter()
        .filter_map(|line| {
            let ingredient = ctx.resolve_ingredient(&line.name)?;
            seen.insert(ingredient).then(|| ListEntry {
                ingredient,
                quantity: parse_quantity(line.quantity.as_deref(), draft.serves),
                unit: line.unit.clone(),
                source: line.clone(),
            })
        })
        .collect();

    let mut seen = HashSet::new();
    let media = draft
        .media
        .iter()
        .flatten()
        .filter_map(|path| ctx.resolve_media(path))
        .filter(|m| seen.insert(*m))
        .collect();

    let mut steps = Vec::with_capacity(draft.steps.len());
    for (position, parsed) in draft.steps.iter().enumerate() {
        let timer = parsed
            .timer
            .as_ref()
            .and_then(|t| allocate_timer(corpus, t));
        let media = parsed
            .image
            .and_then(|i| draft.media.get(i))
            .and_then(Option::as_deref)
            .and_then(|path| ctx.resolve_media(path));
        let step_id = StepId(corpus.steps.len());
        corpus.steps.push(Step {
            id: step_id,
            recipe: id,
            position,
            text: parsed.text.clone(),
            media,
            timer,
            attributes: parsed.attributes.clone(),
        });
        steps.push(step_id);
    }

    let timers = draft
        .timers
        .iter()
        .filter_map(|t| allocate_timer(corpus, t))
        .collect();

    Recipe {
        id,
        source_id: draft.source_id.clone(),
        name: draft.name.clone(),
        author,
        author_name: draft.author.clone(),
        description: draft.description.clone(),
        serves: draft.serves,
        calories: draft.calories,
        categories,
        ingredients,
        steps,
        timers,
        media,
        diets: draft.diets,
    }
}
