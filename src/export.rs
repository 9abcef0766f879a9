//! Export the normalized corpus as JSON.
//!
//! Produces a snapshot of every reference table, the resolved recipes with
//! their steps and timers, and the inferred intolerance pairs. Useful for
//! inspecting normalization decisions without reading SQL.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::Path;

use recipe_import_core::diet::Diet;
use recipe_import_core::models::NormalizedCorpus;
use recipe_import_core::tables::ResolutionContext;

use crate::config::Config;
use crate::convert::{normalize, Normalized};

#[derive(Serialize)]
struct ExportData<'a> {
    tables: &'a ResolutionContext,
    corpus: &'a NormalizedCorpus,
    intolerances: Vec<ExportIntolerance>,
}

#[derive(Serialize)]
struct ExportIntolerance {
    ingredient: usize,
    diet: Diet,
}

/// Serialize a normalized corpus.
pub fn export_json(normalized: &Normalized) -> Result<String> {
    let data = ExportData {
        tables: &normalized.ctx,
        corpus: &normalized.corpus,
        intolerances: normalized
            .intolerances
            .pairs()
            .map(|(ingredient, diet)| ExportIntolerance { ingredient, diet })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&data)?)
}

/// Export the corpus under `db_dir` as JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub fn run_export(
    config: &Config,
    db_dir: &Path,
    media_root: &Path,
    output: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.unwrap_or(config.generation.seed));
    let normalized = normalize(config, db_dir, media_root, &mut rng)?;
    let json = export_json(&normalized)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            eprintln!(
                "Exported {} recipes, {} ingredients to {}",
                normalized.corpus.recipes.len(),
                normalized.ctx.ingredients.len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
