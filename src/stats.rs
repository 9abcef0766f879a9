//! Per-table statistics of a conversion.
//!
//! Runs the full pipeline without writing anything and summarizes what the
//! script would contain: rows per table, dropped recipes, and script size.
//! Used by `recipe-import stats` to sanity-check a corpus before loading it.

use anyhow::Result;
use std::collections::BTreeMap;

use recipe_import_core::emit::Statement;
use recipe_import_core::schema::Table;

use crate::config::Config;
use crate::convert::{build_script, ConvertOptions};

/// Number of inserted rows per table, in dependency order. Tables without
/// rows are listed with 0.
pub fn table_counts(statements: &[Statement]) -> Vec<(Table, usize)> {
    let mut counts: BTreeMap<Table, usize> = Table::DEPENDENCY_ORDER
        .iter()
        .map(|t| (*t, 0))
        .collect();
    for statement in statements {
        if let Statement::Insert(insert) = statement {
            *counts.entry(insert.table).or_default() += 1;
        }
    }
    Table::DEPENDENCY_ORDER
        .iter()
        .map(|t| (*t, counts.get(t).copied().unwrap_or(0)))
        .collect()
}

/// Run the stats command: build the script in memory and print a summary.
pub fn run_stats(config: &Config, opts: &ConvertOptions) -> Result<()> {
    let (statements, script, summary) = build_script(config, opts)?;

    println!("Recipe Import — Conversion Stats");
    println!("================================");
    println!();
    println!("  Corpus:      {}", opts.db_dir.display());
    println!("  Media root:  {}", opts.media_root.display());
    println!();
    println!("  Recipes:     {}", summary.recipes);
    println!("  Dropped:     {}", summary.dropped_recipes);
    println!("  Statements:  {}", summary.statements);
    println!("  Script size: {}", format_bytes(script.len() as u64));
    println!();
    println!("  By table:");
    println!("  {:<28} {:>8}", "TABLE", "ROWS");
    println!("  {}", "-".repeat(37));
    for (table, rows) in table_counts(&statements) {
        println!("  {:<28} {:>8}", table.name(), rows);
    }
    println!();

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
