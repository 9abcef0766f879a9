//! # Recipe Import CLI (`recipe-import`)
//!
//! The `recipe-import` binary converts a legacy recipe corpus into a
//! PostgreSQL load script.
//!
//! ## Usage
//!
//! ```bash
//! recipe-import [--config ./recipe-import.toml] <command> <DB_DIR> <MEDIA_ROOT>
//! ```
//!
//! `DB_DIR` holds `recipes.db`, `chefs.db` and `ingredients.list`;
//! `MEDIA_ROOT` holds media files addressed as `<record id>/<file>`.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `recipe-import convert` | Write the SQL load script to a file or stdout |
//! | `recipe-import stats` | Print rows per table without writing SQL |
//! | `recipe-import export` | Write the normalized corpus as JSON |
//! | `recipe-import sources` | List required inputs and whether they exist |
//!
//! ## Examples
//!
//! ```bash
//! # Convert to a file, with a fixed seed
//! recipe-import convert ./data ./media --output load.sql --seed 7
//!
//! # Pipe straight into psql, without demo fixtures
//! recipe-import convert ./data ./media --no-fixtures | psql recipes
//!
//! # See what is being dropped
//! RUST_LOG=recipe_import_core=debug recipe-import stats ./data ./media
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipe_import::config;
use recipe_import::convert::{run_convert, ConvertOptions};
use recipe_import::export::run_export;
use recipe_import::sources::list_sources;
use recipe_import::stats::run_stats;

/// Recipe Import CLI: convert a flat-file recipe corpus into a normalized
/// relational dataset.
///
/// All commands accept an optional `--config` flag pointing to a TOML
/// configuration file; built-in defaults apply without one.
#[derive(Parser)]
#[command(
    name = "recipe-import",
    about = "Convert a legacy flat-file recipe corpus into a normalized relational dataset",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress at info level (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Corpus location shared by every command.
#[derive(Args)]
struct Inputs {
    /// Directory holding `recipes.db`, `chefs.db` and `ingredients.list`.
    db_dir: PathBuf,

    /// Root of the media tree.
    media_root: PathBuf,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Convert the corpus into a SQL load script.
    ///
    /// The script is rendered and checked for referential integrity in
    /// memory; nothing is written if any step fails.
    Convert {
        #[command(flatten)]
        inputs: Inputs,

        /// Write the script to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Skip generated fridges, menus and plannings.
        #[arg(long)]
        no_fixtures: bool,

        /// Override `generation.seed`.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print per-table row counts without writing SQL.
    Stats {
        #[command(flatten)]
        inputs: Inputs,

        /// Skip generated fridges, menus and plannings.
        #[arg(long)]
        no_fixtures: bool,

        /// Override `generation.seed`.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Export the normalized corpus as JSON.
    Export {
        #[command(flatten)]
        inputs: Inputs,

        /// Write JSON to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Override `generation.seed`.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List the required inputs and whether each is present.
    Sources {
        #[command(flatten)]
        inputs: Inputs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "recipe_import=info,recipe_import_core=info"
    } else {
        "recipe_import=warn,recipe_import_core=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Commands that don't require config
    if let Commands::Sources { inputs } = &cli.command {
        return list_sources(&inputs.db_dir, &inputs.media_root);
    }

    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            no_fixtures,
            seed,
        } => {
            run_convert(
                &cfg,
                &ConvertOptions {
                    db_dir: inputs.db_dir,
                    media_root: inputs.media_root,
                    output,
                    fixtures: !no_fixtures,
                    seed,
                },
            )?;
        }
        Commands::Stats {
            inputs,
            no_fixtures,
            seed,
        } => {
            run_stats(
                &cfg,
                &ConvertOptions {
                    db_dir: inputs.db_dir,
                    media_root: inputs.media_root,
                    output: None,
                    fixtures: !no_fixtures,
                    seed,
                },
            )?;
        }
        Commands::Export {
            inputs,
            output,
            seed,
        } => {
            run_export(
                &cfg,
                &inputs.db_dir,
                &inputs.media_root,
                output.as_deref(),
                seed,
            )?;
        }
        Commands::Sources { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
