//! Deduplicated reference tables and the resolution context.
//!
//! A [`RefTable`] is an ordered collection with a case-insensitive key
//! index. A row's id is its position, assigned on first insertion and never
//! changed afterwards; inserting a row whose key already exists returns the
//! existing id and drops the newcomer.
//!
//! The [`ResolutionContext`] bundles every table built from the full corpus.
//! It is constructed once, before any recipe is resolved, and is read-only
//! from then on.

use serde::{Serialize, Serializer};
use std::collections::HashMap;

use crate::assemble::RecipeDraft;
use crate::models::{Author, Category, EntityRecord, Ingredient, Media};
use crate::media::MediaStore;

/// Normalize a lookup key: surrounding whitespace and letter case are ignored.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// A row that can be looked up by name.
pub trait Keyed {
    fn key(&self) -> String;
}

impl Keyed for Ingredient {
    fn key(&self) -> String {
        self.name.clone()
    }
}

impl Keyed for Author {
    fn key(&self) -> String {
        self.name.clone()
    }
}

impl Keyed for Media {
    fn key(&self) -> String {
        self.path.clone()
    }
}

impl Keyed for Category {
    fn key(&self) -> String {
        category_key(self.parent, &self.name)
    }
}

/// Categories are unique per parent, so the parent id is part of the key.
fn category_key(parent: Option<usize>, name: &str) -> String {
    match parent {
        Some(p) => format!("{p}\u{1f}{}", name.trim()),
        None => name.trim().to_string(),
    }
}

/// Ordered, deduplicated table with positional ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTable<T> {
    rows: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for RefTable<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> RefTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row unless its key is already present. Returns the row id.
    pub fn insert(&mut self, row: T) -> usize {
        let key = normalize_key(&row.key());
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.rows.len();
        self.rows.push(row);
        self.index.insert(key, id);
        id
    }

    /// Look up a row id by name.
    pub fn resolve(&self, key: &str) -> Option<usize> {
        self.index.get(&normalize_key(key)).copied()
    }
}

impl<T> RefTable<T> {
    pub fn get(&self, id: usize) -> Option<&T> {
        self.rows.get(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Rows with their ids, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.rows.iter().enumerate()
    }
}

impl<T: Keyed> FromIterator<T> for RefTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = RefTable::new();
        for row in iter {
            table.insert(row);
        }
        table
    }
}

impl<T: Serialize> Serialize for RefTable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.rows)
    }
}

/// The three category roots, seeded as rows 0, 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryRoot {
    Cuisine = 0,
    Season = 1,
    Category = 2,
}

impl CategoryRoot {
    pub const ALL: [CategoryRoot; 3] = [
        CategoryRoot::Cuisine,
        CategoryRoot::Season,
        CategoryRoot::Category,
    ];

    /// Row id of the root category.
    pub fn id(self) -> usize {
        self as usize
    }

    /// Root display name, which is also the recipe field feeding it.
    pub fn name(self) -> &'static str {
        match self {
            CategoryRoot::Cuisine => "Cuisine",
            CategoryRoot::Season => "Season",
            CategoryRoot::Category => "Category",
        }
    }
}

/// Raw inputs the reference tables are built from.
pub struct ContextInputs<'a> {
    /// Every recipe record, kept or not; categories come from all of them.
    pub recipe_records: &'a [EntityRecord],
    /// Names from the supplemental ingredient list.
    pub supplemental_ingredients: &'a [String],
    pub authors: Vec<Author>,
    /// Recipes that survived the name/author filter.
    pub drafts: &'a [RecipeDraft],
}

/// Immutable snapshot of every reference table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionContext {
    pub media: RefTable<Media>,
    pub authors: RefTable<Author>,
    pub categories: RefTable<Category>,
    pub ingredients: RefTable<Ingredient>,
}

impl ResolutionContext {
    pub fn build(inputs: ContextInputs<'_>, store: &dyn MediaStore) -> Self {
        let authors = build_authors(inputs.authors);
        let ctx = Self {
            media: build_media(&authors, inputs.drafts, store),
            categories: build_categories(inputs.recipe_records),
            ingredients: build_ingredients(inputs.supplemental_ingredients, inputs.drafts),
            authors,
        };
        tracing::info!(
            media = ctx.media.len(),
            authors = ctx.authors.len(),
            categories = ctx.categories.len(),
            ingredients = ctx.ingredients.len(),
            "reference tables built"
        );
        ctx
    }

    pub fn resolve_ingredient(&self, name: &str) -> Option<usize> {
        self.ingredients.resolve(name)
    }

    pub fn resolve_author(&self, name: &str) -> Option<usize> {
        self.authors.resolve(name)
    }

    pub fn resolve_media(&self, path: &str) -> Option<usize> {
        self.media.resolve(path)
    }

    /// Resolve a leaf category under `root`.
    pub fn resolve_category(&self, root: CategoryRoot, name: &str) -> Option<usize> {
        self.categories
            .resolve(&category_key(Some(root.id()), name))
    }
}

/// Authors keep their source order; the personal ingredient list id is the
/// author's row id.
fn build_authors(authors: Vec<Author>) -> RefTable<Author> {
    let mut table = RefTable::new();
    for mut author in authors {
        if table.resolve(&author.name).is_some() {
            tracing::debug!(author = %author.name, "duplicate author ignored");
            continue;
        }
        author.fridge_id = table.len();
        table.insert(author);
    }
    table
}

/// Roots first, then each root's distinct field values in sorted order.
fn build_categories(records: &[EntityRecord]) -> RefTable<Category> {
    let mut table: RefTable<Category> = CategoryRoot::ALL
        .into_iter()
        .map(|root| Category {
            parent: None,
            name: root.name().to_string(),
        })
        .collect();

    for root in CategoryRoot::ALL {
        let mut names: Vec<&str> = records
            .iter()
            .filter_map(|r| r.get(root.name()))
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();
        names.sort_unstable();
        names.dedup();
        for name in names {
            table.insert(Category {
                parent: Some(root.id()),
                name: name.to_string(),
            });
        }
    }
    table
}

/// Supplemental names and recipe ingredient names, trimmed, stably sorted by
/// case-insensitive order; the first spelling of each name wins.
fn build_ingredients(supplemental: &[String], drafts: &[RecipeDraft]) -> RefTable<Ingredient> {
    let mut names: Vec<&str> = supplemental
        .iter()
        .map(String::as_str)
        .chain(
            drafts
                .iter()
                .flat_map(|d| d.ingredients.iter().map(|l| l.name.as_str())),
        )
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    names.sort_by_cached_key(|n| n.to_lowercase());

    names
        .into_iter()
        .map(|name| Ingredient {
            name: name.to_string(),
        })
        .collect()
}

/// Author pictures, then recipe images, deduplicated by path. Files whose
/// fingerprint cannot be computed are left out.
fn build_media(
    authors: &RefTable<Author>,
    drafts: &[RecipeDraft],
    store: &dyn MediaStore,
) -> RefTable<Media> {
    let paths = authors
        .rows()
        .iter()
        .filter_map(|a| a.picture.as_deref())
        .chain(drafts.iter().flat_map(|d| d.media.iter().flatten().map(String::as_str)));

    let mut table = RefTable::new();
    for path in paths {
        if table.resolve(path).is_some() {
            continue;
        }
        match store.fingerprint(path) {
            Ok(hash) => {
                table.insert(Media {
                    path: path.to_string(),
                    hash,
                    mime: store.mime_type(path),
                });
            }
            Err(e) => tracing::warn!(path = %path, error = %e, "could not fingerprint media"),
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::InMemoryMedia;
    use crate::models::IngredientLine;

    fn draft_with(ingredients: &[&str], media: &[Option<&str>]) -> RecipeDraft {
        RecipeDraft {
            ingredients: ingredients
                .iter()
                .map(|n| IngredientLine {
                    quantity: None,
                    unit: None,
                    name: n.to_string(),
                })
                .collect(),
            media: media.iter().map(|m| m.map(str::to_string)).collect(),
            ..RecipeDraft::default()
        }
    }

    fn author(name: &str, picture: Option<&str>) -> Author {
        Author {
            name: name.to_string(),
            full_name: None,
            description: None,
            email: format!("{name}@example.org"),
            picture: picture.map(str::to_string),
            fridge_id: 0,
        }
    }

    #[test]
    fn test_ref_table_first_seen_wins() {
        let mut table = RefTable::new();
        assert_eq!(table.insert(Ingredient { name: "Salt".into() }), 0);
        assert_eq!(table.insert(Ingredient { name: "Pepper".into() }), 1);
        assert_eq!(table.insert(Ingredient { name: " salt ".into() }), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().name, "Salt");
    }

    #[test]
    fn test_resolution_ignores_case_and_whitespace() {
        let table: RefTable<Ingredient> = ["Olive Oil"]
            .iter()
            .map(|n| Ingredient { name: n.to_string() })
            .collect();
        for probe in ["olive oil", "OLIVE OIL", "  Olive Oil\t", "oLiVe oIl "] {
            assert_eq!(table.resolve(probe), Some(0), "probe {probe:?}");
        }
        assert_eq!(table.resolve("olive"), None);
    }

    #[test]
    fn test_ingredients_sorted_and_merged() {
        let supplemental = vec!["butter".to_string(), "".to_string(), "Apple ".to_string()];
        let drafts = [draft_with(&["Butter", "carrot", "apple"], &[])];
        let table = build_ingredients(&supplemental, &drafts);
        let names: Vec<&str> = table.rows().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "butter", "carrot"]);
        assert_eq!(table.resolve("BUTTER"), Some(1));
    }

    #[test]
    fn test_categories_seeded_with_roots() {
        let records = [
            EntityRecord::new("a").with("Cuisine", "Italian").with("Season", "Winter"),
            EntityRecord::new("b").with("Cuisine", "French").with("Category", "Soup"),
            EntityRecord::new("c").with("Cuisine", "italian"),
        ];
        let table = build_categories(&records);
        let names: Vec<&str> = table.rows().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Cuisine", "Season", "Category", "French", "Italian", "Winter", "Soup"]
        );
        assert_eq!(table.get(3).unwrap().parent, Some(0));
        assert_eq!(table.get(5).unwrap().parent, Some(1));
        assert_eq!(table.get(6).unwrap().parent, Some(2));
    }

    #[test]
    fn test_category_resolution_scoped_to_root() {
        let records = [EntityRecord::new("a")
            .with("Cuisine", "Winter")
            .with("Season", "Winter")];
        let ctx = ResolutionContext {
            categories: build_categories(&records),
            ..ResolutionContext::default()
        };
        assert_eq!(ctx.resolve_category(CategoryRoot::Cuisine, "winter"), Some(3));
        assert_eq!(ctx.resolve_category(CategoryRoot::Season, "WINTER"), Some(4));
        assert_eq!(ctx.resolve_category(CategoryRoot::Category, "Winter"), None);
    }

    #[test]
    fn test_media_deduplicated_and_verified() {
        let store = InMemoryMedia::new()
            .with_file("alice/me.jpg", b"a")
            .with_file("r1/a.jpg", b"b");
        let authors = build_authors(vec![author("alice", Some("alice/me.jpg"))]);
        let drafts = [
            draft_with(&[], &[Some("r1/a.jpg"), None, Some("R1/A.JPG")]),
            draft_with(&[], &[Some("r1/gone.jpg")]),
        ];
        let media = build_media(&authors, &drafts, &store);
        assert_eq!(media.len(), 2);
        assert_eq!(media.get(0).unwrap().path, "alice/me.jpg");
        assert_eq!(media.get(1).unwrap().mime.as_deref(), Some("image/jpeg"));
        assert_eq!(media.resolve("r1/gone.jpg"), None);
    }

    #[test]
    fn test_author_fridge_ids_follow_rows() {
        let authors = build_authors(vec![
            author("alice", None),
            author("Alice", None),
            author("bob", None),
        ]);
        assert_eq!(authors.len(), 2);
        assert_eq!(authors.get(1).unwrap().name, "bob");
        assert_eq!(authors.get(1).unwrap().fridge_id, 1);
    }
}
