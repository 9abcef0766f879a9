//! Conversion pipeline orchestration.
//!
//! Coordinates the full run: input check → corpus load → media index →
//! drafting → reference tables → resolution → diet inference → fixtures →
//! emission → integrity check → SQL rendering. Nothing is written until the
//! whole script has been rendered and verified.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

use recipe_import_core::assemble::{
    draft_authors, draft_recipes, resolve_recipes, AssembleOptions,
};
use recipe_import_core::diet::{infer_intolerances, Intolerances, RecipeDiets};
use recipe_import_core::emit::{EmitInput, Emitter, Fixtures, Statement};
use recipe_import_core::integrity::verify_statements;
use recipe_import_core::models::NormalizedCorpus;
use recipe_import_core::tables::{ContextInputs, ResolutionContext};

use crate::config::Config;
use crate::fixtures::generate_fixtures;
use crate::load::{check_inputs, load_corpus};
use crate::media::DiskMedia;
use crate::password::BcryptHasher;
use crate::sql::render_script;

/// Result of normalizing a corpus, before any fixtures or emission.
pub struct Normalized {
    pub ctx: ResolutionContext,
    pub corpus: NormalizedCorpus,
    pub intolerances: Intolerances,
    /// Recipe records read, kept or not.
    pub source_recipes: usize,
}

/// Load and normalize the corpus under `db_dir`, resolving media against
/// `media_root`. `rng` feeds the calorie placeholders.
pub fn normalize(
    config: &Config,
    db_dir: &Path,
    media_root: &Path,
    rng: &mut ChaCha8Rng,
) -> Result<Normalized> {
    check_inputs(db_dir, media_root)?;
    let raw = load_corpus(db_dir)?;
    let media = DiskMedia::open(media_root, &config.media)?;

    let opts = AssembleOptions {
        email_domain: config.profiles.email_domain.clone(),
        default_extension: config.media.default_extension.clone(),
    };
    let authors = draft_authors(&raw.chefs, &media, &opts);
    let drafts = draft_recipes(&raw.recipes, &media, &opts, rng);

    let ctx = ResolutionContext::build(
        ContextInputs {
            recipe_records: &raw.recipes,
            supplemental_ingredients: &raw.ingredients,
            authors,
            drafts: &drafts,
        },
        &media,
    );
    let corpus = resolve_recipes(&ctx, &drafts);

    let lists: Vec<Vec<usize>> = corpus
        .recipes
        .iter()
        .map(|r| r.ingredients.iter().map(|e| e.ingredient).collect())
        .collect();
    let evidence: Vec<RecipeDiets<'_>> = corpus
        .recipes
        .iter()
        .zip(&lists)
        .map(|(recipe, ingredients)| RecipeDiets {
            mask: recipe.diets,
            ingredients,
        })
        .collect();
    let intolerances = infer_intolerances(ctx.ingredients.len(), &evidence);
    tracing::info!(pairs = intolerances.len(), "intolerances inferred");

    Ok(Normalized {
        ctx,
        corpus,
        intolerances,
        source_recipes: raw.recipes.len(),
    })
}

/// Options of a `convert` run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub db_dir: PathBuf,
    pub media_root: PathBuf,
    /// Write to this file instead of stdout.
    pub output: Option<PathBuf>,
    pub fixtures: bool,
    /// Overrides `generation.seed`.
    pub seed: Option<u64>,
}

/// Counts reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub statements: usize,
    pub inserts: usize,
    pub references: usize,
    pub recipes: usize,
    pub dropped_recipes: usize,
}

/// Produce the verified statement stream and the rendered script.
pub fn build_script(
    config: &Config,
    opts: &ConvertOptions,
) -> Result<(Vec<Statement>, String, ConvertSummary)> {
    let seed = opts.seed.unwrap_or(config.generation.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let normalized = normalize(config, &opts.db_dir, &opts.media_root, &mut rng)?;
    let fixtures = if opts.fixtures && config.fixtures.enabled {
        generate_fixtures(&normalized.ctx, &normalized.corpus, &config.fixtures, &mut rng)
    } else {
        Fixtures::default()
    };

    let hasher = BcryptHasher::new(config.profiles.password_cost, seed);
    let statements = Emitter::new(
        EmitInput {
            ctx: &normalized.ctx,
            corpus: &normalized.corpus,
            intolerances: &normalized.intolerances,
            fixtures: &fixtures,
            search_path: &config.output.search_path,
        },
        &hasher,
    )
    .emit()?;

    let report = verify_statements(&statements)
        .context("Emitted statements failed the integrity check")?;
    let script = render_script(&statements);

    let summary = ConvertSummary {
        statements: statements.len(),
        inserts: report.inserts,
        references: report.references,
        recipes: normalized.corpus.recipes.len(),
        dropped_recipes: normalized.source_recipes - normalized.corpus.recipes.len(),
    };
    Ok((statements, script, summary))
}

pub fn run_convert(config: &Config, opts: &ConvertOptions) -> Result<ConvertSummary> {
    let (_, script, summary) = build_script(config, opts)?;

    match &opts.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &script)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
        }
        None => print!("{}", script),
    }

    eprintln!("Conversion complete");
    eprintln!("  recipes:     {}", summary.recipes);
    eprintln!("  dropped:     {}", summary.dropped_recipes);
    eprintln!("  statements:  {}", summary.statements);
    eprintln!("  inserts:     {}", summary.inserts);
    eprintln!("  references:  {} (verified)", summary.references);
    if let Some(path) = &opts.output {
        eprintln!("  output:      {}", path.display());
    }
    Ok(summary)
}
