//! Diets, compatibility bitmasks, and ingredient intolerance inference.
//!
//! A recipe's `Diets` field is a bitmask of the diets it is compatible with.
//! Ingredients carry no diet information of their own; their intolerances
//! are inferred from corpus-wide co-occurrence.
//!
//! # Algorithm
//!
//! For every ingredient `i`:
//!
//! 1. **Candidates**: union of the *disallowed* diets of every recipe
//!    containing `i`.
//! 2. **Exoneration**: remove every diet that some recipe containing `i`
//!    is compatible with. That recipe proves `i` is not the reason.
//!
//! What remains is the minimal set of diets `i` must be excluded from. The
//! result is a pure function of its input, so re-running it is a fixed point.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// The fixed, ordered diet enumeration. The discriminant is the bit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Diet {
    GlutenFree = 0,
    NutFree = 1,
    Vegan = 2,
    Vegetarian = 3,
    MilkFree = 4,
}

impl Diet {
    pub const ALL: [Diet; 5] = [
        Diet::GlutenFree,
        Diet::NutFree,
        Diet::Vegan,
        Diet::Vegetarian,
        Diet::MilkFree,
    ];

    /// Row id in the DIET table.
    pub fn id(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Diet::GlutenFree => "Gluten free",
            Diet::NutFree => "Nut free",
            Diet::Vegan => "Vegan",
            Diet::Vegetarian => "Vegetarian",
            Diet::MilkFree => "Milk free",
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn resolve(name: &str) -> Option<Diet> {
        let name = name.trim();
        Diet::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of diets a recipe is compatible with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DietMask(u8);

impl DietMask {
    pub const ALL: DietMask = DietMask(0b1_1111);
    pub const NONE: DietMask = DietMask(0);

    /// Build a mask from raw bits; bits beyond the known diets are ignored.
    pub fn from_bits(bits: u32) -> Self {
        DietMask((bits & u32::from(Self::ALL.0)) as u8)
    }

    /// Parse the numeric `Diets` field.
    ///
    /// Missing, non-numeric, or zero values mean "compatible with every diet",
    /// matching how the legacy corpus was authored.
    pub fn parse(field: Option<&str>) -> Self {
        match field.and_then(|f| f.trim().parse::<u32>().ok()) {
            Some(bits) if bits != 0 => Self::from_bits(bits),
            _ => Self::ALL,
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn allows(self, diet: Diet) -> bool {
        self.0 & diet.bit() != 0
    }

    pub fn allowed(self) -> impl Iterator<Item = Diet> {
        Diet::ALL.into_iter().filter(move |d| self.allows(*d))
    }

    pub fn disallowed(self) -> impl Iterator<Item = Diet> {
        Diet::ALL.into_iter().filter(move |d| !self.allows(*d))
    }
}

impl Default for DietMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromIterator<Diet> for DietMask {
    fn from_iter<I: IntoIterator<Item = Diet>>(iter: I) -> Self {
        DietMask(iter.into_iter().fold(0, |acc, d| acc | d.bit()))
    }
}

/// Diet evidence contributed by one recipe.
#[derive(Debug, Clone, Copy)]
pub struct RecipeDiets<'a> {
    pub mask: DietMask,
    /// Resolved ingredient ids of the recipe.
    pub ingredients: &'a [usize],
}

/// Inferred `(diet, ingredient)` intolerance relation, indexed by ingredient id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Intolerances {
    by_ingredient: Vec<BTreeSet<Diet>>,
}

impl Intolerances {
    /// Diets ingredient `ingredient` must be excluded from.
    pub fn of(&self, ingredient: usize) -> Option<&BTreeSet<Diet>> {
        self.by_ingredient.get(ingredient)
    }

    pub fn excludes(&self, ingredient: usize, diet: Diet) -> bool {
        self.of(ingredient).is_some_and(|set| set.contains(&diet))
    }

    /// Every `(ingredient, diet)` pair, by ingredient then diet order. Each
    /// pair occurs once.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, Diet)> + '_ {
        self.by_ingredient
            .iter()
            .enumerate()
            .flat_map(|(i, set)| set.iter().map(move |d| (i, *d)))
    }

    pub fn len(&self) -> usize {
        self.by_ingredient.iter().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Infer per-ingredient diet exclusions for `ingredient_count` ingredients.
///
/// Ingredient ids outside `0..ingredient_count` are ignored.
pub fn infer_intolerances(ingredient_count: usize, recipes: &[RecipeDiets<'_>]) -> Intolerances {
    // Inverted index: ingredient -> recipes containing it.
    let mut containing: Vec<Vec<usize>> = vec![Vec::new(); ingredient_count];
    for (r, recipe) in recipes.iter().enumerate() {
        for &i in recipe.ingredients {
            if let Some(list) = containing.get_mut(i) {
                if list.last() != Some(&r) {
                    list.push(r);
                }
            }
        }
    }

    // Pass 1: candidate exclusions.
    let mut by_ingredient: Vec<BTreeSet<Diet>> = containing
        .iter()
        .map(|rs| {
            rs.iter()
                .flat_map(|&r| recipes[r].mask.disallowed())
                .collect()
        })
        .collect();

    // Pass 2: exoneration.
    for (set, rs) in by_ingredient.iter_mut().zip(&containing) {
        for &r in rs {
            for diet in recipes[r].mask.allowed() {
                set.remove(&diet);
            }
        }
    }

    Intolerances { by_ingredient }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_without(diet: Diet) -> DietMask {
        Diet::ALL.into_iter().filter(|d| *d != diet).collect()
    }

    #[test]
    fn test_mask_parse_defaults() {
        assert_eq!(DietMask::parse(None), DietMask::ALL);
        assert_eq!(DietMask::parse(Some("abc")), DietMask::ALL);
        assert_eq!(DietMask::parse(Some("0")), DietMask::ALL);
        assert_eq!(DietMask::parse(Some("4")).bits(), 4);
        assert_eq!(DietMask::parse(Some(" 255 ")), DietMask::ALL);
    }

    #[test]
    fn test_mask_bits_follow_diet_order() {
        let mask = DietMask::from_bits(0b00101);
        assert!(mask.allows(Diet::GlutenFree));
        assert!(!mask.allows(Diet::NutFree));
        assert!(mask.allows(Diet::Vegan));
        assert_eq!(
            mask.disallowed().collect::<Vec<_>>(),
            vec![Diet::NutFree, Diet::Vegetarian, Diet::MilkFree]
        );
    }

    #[test]
    fn test_diet_resolve_case_insensitive() {
        assert_eq!(Diet::resolve("vegan"), Some(Diet::Vegan));
        assert_eq!(Diet::resolve(" MILK FREE "), Some(Diet::MilkFree));
        assert_eq!(Diet::resolve("keto"), None);
    }

    #[test]
    fn test_beef_and_tofu() {
        let (beef, tofu) = (0, 1);
        let recipes = [
            RecipeDiets {
                mask: mask_without(Diet::Vegan),
                ingredients: &[beef],
            },
            RecipeDiets {
                mask: DietMask::ALL,
                ingredients: &[tofu],
            },
        ];
        let result = infer_intolerances(2, &recipes);
        assert!(result.excludes(beef, Diet::Vegan));
        assert!(!result.excludes(tofu, Diet::Vegan));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_cheese_exonerated() {
        let (cheese, ham) = (0, 1);
        let recipes = [
            RecipeDiets {
                mask: mask_without(Diet::Vegan),
                ingredients: &[cheese, ham],
            },
            RecipeDiets {
                mask: DietMask::ALL,
                ingredients: &[cheese],
            },
        ];
        let result = infer_intolerances(2, &recipes);
        assert!(!result.excludes(cheese, Diet::Vegan));
        assert!(result.excludes(ham, Diet::Vegan));
    }

    #[test]
    fn test_unused_and_always_compatible_ingredients() {
        let recipes = [RecipeDiets {
            mask: DietMask::ALL,
            ingredients: &[0],
        }];
        let result = infer_intolerances(3, &recipes);
        assert!(result.of(0).unwrap().is_empty());
        assert!(result.of(2).unwrap().is_empty());
        assert!(result.is_empty());
        assert_eq!(result.pairs().count(), 0);
    }

    #[test]
    fn test_inference_is_fixed_point() {
        let recipes = [
            RecipeDiets {
                mask: DietMask::from_bits(0b00011),
                ingredients: &[0, 1, 2],
            },
            RecipeDiets {
                mask: DietMask::from_bits(0b01100),
                ingredients: &[1, 3],
            },
            RecipeDiets {
                mask: DietMask::from_bits(0b10000),
                ingredients: &[2, 3, 3],
            },
        ];
        let first = infer_intolerances(4, &recipes);
        let second = infer_intolerances(4, &recipes);
        assert_eq!(first, second);
        // Ingredient 1 sits in recipes allowing {GF, NF} and {Vegan, Veg}.
        assert_eq!(
            first.of(1).unwrap().iter().copied().collect::<Vec<_>>(),
            vec![Diet::MilkFree]
        );
    }

    #[test]
    fn test_pairs_emitted_once() {
        let recipes = [
            RecipeDiets {
                mask: mask_without(Diet::Vegan),
                ingredients: &[0, 0],
            },
            RecipeDiets {
                mask: mask_without(Diet::Vegan),
                ingredients: &[0],
            },
        ];
        let pairs: Vec<_> = infer_intolerances(1, &recipes).pairs().collect();
        assert_eq!(pairs, vec![(0, Diet::Vegan)]);
    }

    #[test]
    fn test_out_of_range_ingredient_ignored() {
        let recipes = [RecipeDiets {
            mask: DietMask::NONE,
            ingredients: &[7],
        }];
        assert!(infer_intolerances(1, &recipes).is_empty());
    }
}
