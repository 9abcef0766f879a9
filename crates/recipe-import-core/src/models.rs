//! Core data models used throughout the importer.
//!
//! These types represent the raw records read from the flat-file corpus and
//! the normalized entities that flow from the assembler into the emitter.

use serde::Serialize;
use std::collections::BTreeMap;

/// Raw key/value record as read from a keyfile section.
///
/// The section name is the record id (a recipe id or a chef's user name).
/// Records are never mutated once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRecord {
    pub id: String,
    pub fields: BTreeMap<String, String>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion, mostly for tests and fixtures.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), value.to_string());
        self
    }

    /// Returns the field value, treating an empty string as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Handle of a timer in the corpus-wide timer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimerId(pub usize);

/// Handle of a step in the corpus-wide step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StepId(pub usize);

/// A duration range attached to a recipe or a step.
///
/// Phrase timers are expressed in minutes, literal `HH:MM:SS` timers in
/// seconds. Either bound may be open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timer {
    pub from: Option<u32>,
    pub to: Option<u32>,
    pub kind: Option<String>,
}

impl Timer {
    /// A timer with no non-zero bound carries no information and is never stored.
    pub fn is_empty(&self) -> bool {
        self.from.unwrap_or(0) == 0 && self.to.unwrap_or(0) == 0
    }
}

/// One `quantity \t unit \t name` line of a recipe's ingredient field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientLine {
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub name: String,
}

/// Canonical ingredient row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub name: String,
}

/// Category row. Roots have no parent; leaves point at their root's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub parent: Option<usize>,
    pub name: String,
}

/// A media file confirmed to exist under the media root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Media {
    /// Path relative to the media root (`<owner id>/<file>`).
    pub path: String,
    /// Hex content fingerprint.
    pub hash: String,
    pub mime: Option<String>,
}

/// Recipe author (a user profile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    /// Source record id, used as the user name.
    pub name: String,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub email: String,
    /// Verified media path of the profile picture.
    pub picture: Option<String>,
    /// Id of the author's personal ingredient list.
    pub fridge_id: usize,
}

/// A resolved entry of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub ingredient: usize,
    /// Per-serving quantity; `None` when the source quantity did not parse.
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    /// The source line, kept for annotating the output.
    pub source: IngredientLine,
}

/// A normalized instruction step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub id: StepId,
    pub recipe: usize,
    pub position: usize,
    pub text: String,
    pub media: Option<usize>,
    pub timer: Option<TimerId>,
    /// Bracket annotations other than `temperature`, `timer` and `image`.
    pub attributes: BTreeMap<String, String>,
}

/// A fully resolved recipe. Every id refers into the resolution context or
/// the corpus arenas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: usize,
    pub source_id: String,
    pub name: String,
    pub author: Option<usize>,
    pub author_name: String,
    pub description: Option<String>,
    pub serves: Option<u32>,
    pub calories: u32,
    pub categories: Vec<usize>,
    pub ingredients: Vec<ListEntry>,
    pub steps: Vec<StepId>,
    /// Preparation and cook timers; step timers hang off their step.
    pub timers: Vec<TimerId>,
    pub media: Vec<usize>,
    pub diets: crate::diet::DietMask,
}

/// Output of the assembler: kept recipes plus the flat step and timer arenas
/// their handles point into.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedCorpus {
    pub recipes: Vec<Recipe>,
    pub steps: Vec<Step>,
    pub timers: Vec<Timer>,
}

impl NormalizedCorpus {
    pub fn step(&self, id: StepId) -> &Step {
        &self.steps[id.0]
    }

    pub fn timer(&self, id: TimerId) -> &Timer {
        &self.timers[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_get_treats_empty_as_absent() {
        let rec = EntityRecord::new("r1").with("Name", "Soup").with("Author", "");
        assert_eq!(rec.get("Name"), Some("Soup"));
        assert_eq!(rec.get("Author"), None);
        assert_eq!(rec.get("Missing"), None);
    }

    #[test]
    fn test_timer_is_empty() {
        let zero = Timer {
            from: Some(0),
            to: None,
            kind: None,
        };
        assert!(zero.is_empty());
        let open = Timer {
            from: None,
            to: Some(15),
            kind: None,
        };
        assert!(!open.is_empty());
    }
}
