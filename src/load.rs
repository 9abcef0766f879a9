//! Corpus loading: the two keyfile databases and the supplemental
//! ingredient list.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use recipe_import_core::models::EntityRecord;

use crate::keyfile::load_keyfile;

pub const RECIPES_FILE: &str = "recipes.db";
pub const CHEFS_FILE: &str = "chefs.db";
pub const INGREDIENTS_FILE: &str = "ingredients.list";

/// Raw records read from the database directory.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub recipes: Vec<EntityRecord>,
    pub chefs: Vec<EntityRecord>,
    pub ingredients: Vec<String>,
}

/// An input the importer needs, with the path it is expected at.
#[derive(Debug, Clone)]
pub struct RequiredInput {
    pub name: &'static str,
    pub path: PathBuf,
    pub is_dir: bool,
}

impl RequiredInput {
    pub fn is_present(&self) -> bool {
        if self.is_dir {
            self.path.is_dir()
        } else {
            self.path.is_file()
        }
    }
}

pub fn required_inputs(db_dir: &Path, media_root: &Path) -> Vec<RequiredInput> {
    let file = |name: &'static str| RequiredInput {
        name,
        path: db_dir.join(name),
        is_dir: false,
    };
    vec![
        file(RECIPES_FILE),
        file(CHEFS_FILE),
        file(INGREDIENTS_FILE),
        RequiredInput {
            name: "media root",
            path: media_root.to_path_buf(),
            is_dir: true,
        },
    ]
}

/// Fail when any required input is missing.
pub fn check_inputs(db_dir: &Path, media_root: &Path) -> Result<()> {
    let missing: Vec<String> = required_inputs(db_dir, media_root)
        .into_iter()
        .filter(|i| !i.is_present())
        .map(|i| format!("{} ({})", i.name, i.path.display()))
        .collect();
    if !missing.is_empty() {
        bail!("Missing required input: {}", missing.join(", "));
    }
    Ok(())
}

/// Supplemental list: one name per line, blank lines skipped.
pub fn parse_ingredient_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load_corpus(db_dir: &Path) -> Result<Corpus> {
    let recipes = load_keyfile(&db_dir.join(RECIPES_FILE))?;
    let chefs = load_keyfile(&db_dir.join(CHEFS_FILE))?;

    let list_path = db_dir.join(INGREDIENTS_FILE);
    let content = std::fs::read_to_string(&list_path)
        .with_context(|| format!("Failed to read ingredient list: {}", list_path.display()))?;
    let ingredients = parse_ingredient_list(&content);

    tracing::info!(
        recipes = recipes.len(),
        chefs = chefs.len(),
        ingredients = ingredients.len(),
        "corpus loaded"
    );
    Ok(Corpus {
        recipes,
        chefs,
        ingredients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_ingredient_list_lines() {
        assert_eq!(
            parse_ingredient_list("Salt\n\n  Pepper \r\nTofu"),
            vec!["Salt", "Pepper", "Tofu"]
        );
    }

    #[test]
    fn test_missing_inputs_reported() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(RECIPES_FILE), "").unwrap();
        let err = check_inputs(tmp.path(), &tmp.path().join("media")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(CHEFS_FILE));
        assert!(msg.contains(INGREDIENTS_FILE));
        assert!(msg.contains("media root"));
        assert!(!msg.contains(RECIPES_FILE));
    }

    #[test]
    fn test_load_corpus() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(RECIPES_FILE), "[r]\nName=R\n").unwrap();
        fs::write(tmp.path().join(CHEFS_FILE), "[c]\nName=C\n").unwrap();
        fs::write(tmp.path().join(INGREDIENTS_FILE), "Salt\n").unwrap();
        let corpus = load_corpus(tmp.path()).unwrap();
        assert_eq!(corpus.recipes.len(), 1);
        assert_eq!(corpus.chefs[0].id, "c");
        assert_eq!(corpus.ingredients, vec!["Salt"]);
    }
}
