//! Target relational schema and its dependency order.
//!
//! Each [`Table`] declares its columns, primary key, and foreign keys. The
//! emitter writes tables in [`Table::DEPENDENCY_ORDER`] and deletes them in
//! reverse; [`validate_order`] checks that every foreign key points at a
//! table placed earlier.

use std::fmt;

use crate::integrity::IntegrityError;

/// A table of the target schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    Media,
    Diet,
    IngredientList,
    Profile,
    Category,
    Timer,
    Ingredient,
    DietIntolerance,
    IngredientListIngredient,
    Recipe,
    Step,
    RecipeTimer,
    RecipeMedia,
    RecipeCategory,
    Menu,
    MenuRecipe,
    Planning,
    PlanningMenu,
}

const ID: &[&str] = &["ID"];

impl Table {
    /// Insertion order. Every table comes after the tables it references.
    pub const DEPENDENCY_ORDER: [Table; 18] = [
        Table::Media,
        Table::Diet,
        Table::IngredientList,
        Table::Profile,
        Table::Category,
        Table::Timer,
        Table::Ingredient,
        Table::DietIntolerance,
        Table::IngredientListIngredient,
        Table::Recipe,
        Table::Step,
        Table::RecipeTimer,
        Table::RecipeMedia,
        Table::RecipeCategory,
        Table::Menu,
        Table::MenuRecipe,
        Table::Planning,
        Table::PlanningMenu,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Media => "MEDIA",
            Table::Diet => "DIET",
            Table::IngredientList => "INGREDIENT_LIST",
            Table::Profile => "PROFILE",
            Table::Category => "CATEGORY",
            Table::Timer => "TIMER",
            Table::Ingredient => "INGREDIENT",
            Table::DietIntolerance => "DIET_INTOLERANCE",
            Table::IngredientListIngredient => "INGREDIENT_LIST_INGREDIENT",
            Table::Recipe => "RECIPE",
            Table::Step => "STEP",
            Table::RecipeTimer => "RECIPE_TIMER",
            Table::RecipeMedia => "RECIPE_MEDIA",
            Table::RecipeCategory => "RECIPE_CATEGORY",
            Table::Menu => "MENU",
            Table::MenuRecipe => "MENU_RECIPE",
            Table::Planning => "PLANNING",
            Table::PlanningMenu => "PLANNING_MENU",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Media => &["ID", "HASH", "NAME", "MIME"],
            Table::Diet => &["ID", "NAME"],
            Table::IngredientList => ID,
            Table::Profile => &[
                "ID",
                "USERNAME",
                "EMAIL",
                "PASSWORD",
                "FULL_NAME",
                "BIOGRAPHY",
                "PICTURE_ID",
                "FRIDGE_ID",
            ],
            Table::Category => &["ID", "NAME", "PARENT_ID"],
            Table::Timer => &["ID", "TIME_MIN", "TIME_MAX", "TYPE"],
            Table::Ingredient => &["ID", "NAME"],
            Table::DietIntolerance => &["DIET_ID", "INGREDIENT_ID"],
            Table::IngredientListIngredient => {
                &["INGREDIENT_LIST_ID", "INGREDIENT_ID", "QUANTITY", "UNIT"]
            }
            Table::Recipe => &[
                "ID",
                "NAME",
                "DESCRIPTION",
                "AUTHOR_ID",
                "INGREDIENT_LIST_ID",
                "SERVES",
                "CALORIES",
            ],
            Table::Step => &[
                "ID",
                "RECIPE_ID",
                "DESCRIPTION",
                "POSITION",
                "MEDIA_ID",
                "TIMER_ID",
            ],
            Table::RecipeTimer => &["RECIPE_ID", "TIMER_ID"],
            Table::RecipeMedia => &["MEDIA_ID", "RECIPE_ID"],
            Table::RecipeCategory => &["RECIPE_ID", "CATEGORY_ID"],
            Table::Menu => &["ID", "NAME"],
            Table::MenuRecipe => &["MENU_ID", "RECIPE_ID", "POSITION"],
            Table::Planning => &["ID", "NAME", "PROFILE_ID", "EXPIRY_DATE"],
            Table::PlanningMenu => &["PLANNING_ID", "MENU_ID", "POSITION"],
        }
    }

    pub fn primary_key(self) -> &'static [&'static str] {
        match self {
            Table::DietIntolerance => &["DIET_ID", "INGREDIENT_ID"],
            Table::IngredientListIngredient => &["INGREDIENT_LIST_ID", "INGREDIENT_ID"],
            Table::RecipeTimer => &["RECIPE_ID", "TIMER_ID"],
            Table::RecipeMedia => &["MEDIA_ID", "RECIPE_ID"],
            Table::RecipeCategory => &["RECIPE_ID", "CATEGORY_ID"],
            Table::MenuRecipe => &["MENU_ID", "RECIPE_ID"],
            Table::PlanningMenu => &["PLANNING_ID", "MENU_ID"],
            _ => ID,
        }
    }

    /// `(column, referenced table)` pairs. Every referenced table is keyed by `ID`.
    pub fn foreign_keys(self) -> &'static [(&'static str, Table)] {
        match self {
            Table::Profile => &[
                ("PICTURE_ID", Table::Media),
                ("FRIDGE_ID", Table::IngredientList),
            ],
            Table::Category => &[("PARENT_ID", Table::Category)],
            Table::DietIntolerance => &[
                ("DIET_ID", Table::Diet),
                ("INGREDIENT_ID", Table::Ingredient),
            ],
            Table::IngredientListIngredient => &[
                ("INGREDIENT_LIST_ID", Table::IngredientList),
                ("INGREDIENT_ID", Table::Ingredient),
            ],
            Table::Recipe => &[
                ("AUTHOR_ID", Table::Profile),
                ("INGREDIENT_LIST_ID", Table::IngredientList),
            ],
            Table::Step => &[
                ("RECIPE_ID", Table::Recipe),
                ("MEDIA_ID", Table::Media),
                ("TIMER_ID", Table::Timer),
            ],
            Table::RecipeTimer => &[("RECIPE_ID", Table::Recipe), ("TIMER_ID", Table::Timer)],
            Table::RecipeMedia => &[("MEDIA_ID", Table::Media), ("RECIPE_ID", Table::Recipe)],
            Table::RecipeCategory => &[
                ("RECIPE_ID", Table::Recipe),
                ("CATEGORY_ID", Table::Category),
            ],
            Table::MenuRecipe => &[("MENU_ID", Table::Menu), ("RECIPE_ID", Table::Recipe)],
            Table::Planning => &[("PROFILE_ID", Table::Profile)],
            Table::PlanningMenu => &[
                ("PLANNING_ID", Table::Planning),
                ("MENU_ID", Table::Menu),
            ],
            _ => &[],
        }
    }

    /// Tables keyed by a single `ID` column own an id sequence.
    pub fn has_sequence(self) -> bool {
        self.primary_key() == ID
    }

    /// Position of `column` in [`Table::columns`].
    pub fn column_index(self, column: &str) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check that every table in `order` follows the tables it references.
/// Self references are allowed.
pub fn validate_order(order: &[Table]) -> Result<(), IntegrityError> {
    for (pos, table) in order.iter().enumerate() {
        for (_, target) in table.foreign_keys() {
            if target == table {
                continue;
            }
            let placed_before = order[..pos].contains(target);
            if !placed_before {
                return Err(IntegrityError::TableOrder {
                    table: *table,
                    depends_on: *target,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_order_is_topological() {
        assert!(validate_order(&Table::DEPENDENCY_ORDER).is_ok());
    }

    #[test]
    fn test_dependency_order_covers_every_table_once() {
        let mut sorted = Table::DEPENDENCY_ORDER.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), Table::DEPENDENCY_ORDER.len());
    }

    #[test]
    fn test_misordered_tables_rejected() {
        let err = validate_order(&[Table::Recipe, Table::Profile, Table::IngredientList])
            .unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::TableOrder {
                table: Table::Recipe,
                depends_on: Table::Profile
            }
        ));
    }

    #[test]
    fn test_keys_name_real_columns() {
        for table in Table::DEPENDENCY_ORDER {
            for column in table.primary_key() {
                assert!(table.column_index(column).is_some(), "{table}.{column}");
            }
            for (column, target) in table.foreign_keys() {
                assert!(table.column_index(column).is_some(), "{table}.{column}");
                assert!(target.has_sequence(), "{target} must be keyed by ID");
            }
        }
    }

    #[test]
    fn test_sequences() {
        assert!(Table::Recipe.has_sequence());
        assert!(Table::IngredientList.has_sequence());
        assert!(!Table::RecipeTimer.has_sequence());
    }
}
