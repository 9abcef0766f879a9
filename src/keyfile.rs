//! Keyfile reader for the legacy `.db` files.
//!
//! The format is INI-like:
//!
//! ```text
//! # comment
//! [record-id]
//! Key=Value
//! Other = "quoted value"
//! ```
//!
//! Every section becomes one [`EntityRecord`] whose id is the section name.
//! Keys and values are trimmed, a value wrapped in double quotes is
//! unquoted, and `;` is ordinary text. Lines outside any section or without
//! `=` are ignored. A section that appears twice is merged into its first
//! occurrence, later keys overriding earlier ones.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use recipe_import_core::models::EntityRecord;

/// Parse keyfile text into records, in order of first appearance.
pub fn parse_keyfile(content: &str) -> Vec<EntityRecord> {
    let mut records: Vec<EntityRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut current: Option<usize> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim();
            let pos = *positions.entry(name.to_string()).or_insert_with(|| {
                records.push(EntityRecord::new(name));
                records.len() - 1
            });
            current = Some(pos);
            continue;
        }

        let (Some(pos), Some((key, value))) = (current, line.split_once('=')) else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        records[pos]
            .fields
            .insert(key.to_string(), unquote(value.trim()).to_string());
    }

    records
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Read and parse a keyfile from disk.
pub fn load_keyfile(path: &Path) -> Result<Vec<EntityRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read keyfile: {}", path.display()))?;
    let records = parse_keyfile(&content);
    tracing::info!(path = %path.display(), records = records.len(), "keyfile loaded");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_and_fields() {
        let records = parse_keyfile(
            "# chefs\n[alice]\nName = Alice\nImage=images/alice\n\n[bob]\nName=Bob\n",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "alice");
        assert_eq!(records[0].get("Name"), Some("Alice"));
        assert_eq!(records[0].get("Image"), Some("images/alice"));
        assert_eq!(records[1].get("Name"), Some("Bob"));
    }

    #[test]
    fn test_semicolon_is_literal() {
        let records = parse_keyfile("[soup]\nImages=a;b.png;c\nName=Soup; hot\n");
        assert_eq!(records[0].get("Images"), Some("a;b.png;c"));
        assert_eq!(records[0].get("Name"), Some("Soup; hot"));
    }

    #[test]
    fn test_value_keeps_equals_and_escapes() {
        let records = parse_keyfile("[r]\nInstructions=Mix a=b.\\nBake.[timer:00:10:00]\n");
        assert_eq!(
            records[0].get("Instructions"),
            Some("Mix a=b.\\nBake.[timer:00:10:00]")
        );
    }

    #[test]
    fn test_quoted_values_unquoted() {
        let records = parse_keyfile("[r]\nName=\"Quoted\"\nOther=\"half\n");
        assert_eq!(records[0].get("Name"), Some("Quoted"));
        assert_eq!(records[0].get("Other"), Some("\"half"));
    }

    #[test]
    fn test_repeated_section_merges() {
        let records = parse_keyfile("[r]\nName=One\nServes=2\n[s]\nName=S\n[r]\nName=Two\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Name"), Some("Two"));
        assert_eq!(records[0].get("Serves"), Some("2"));
    }

    #[test]
    fn test_stray_lines_ignored() {
        let records = parse_keyfile("Orphan=1\n[r]\nno equals here\n=empty key\nName=R\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields.len(), 1);
    }
}
