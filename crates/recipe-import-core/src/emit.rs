//! Relational emission.
//!
//! The [`Emitter`] walks the resolution context, the normalized corpus, and
//! the inferred intolerances, and produces a flat list of [`Statement`]s:
//!
//! 1. `SET search_path` (when configured).
//! 2. `DELETE` of every table in reverse dependency order.
//! 3. Inserts, block by block, in [`Table::DEPENDENCY_ORDER`]: media, diets,
//!    ingredient lists, profiles, categories, timers, ingredients,
//!    intolerances, personal stock, recipes (each with its ingredient list
//!    entries, timers, media, steps and categories), menus, plannings.
//! 4. A sequence restart for every id-keyed table that received rows.
//!
//! Ingredient lists share one id space: author `n` owns list `n`, recipe
//! `r` owns list `authors + r`.
//!
//! Rendering statements to text is left to the caller.

use anyhow::Result;

use crate::diet::{Diet, Intolerances};
use crate::models::{NormalizedCorpus, Recipe};
use crate::schema::{validate_order, Table};
use crate::tables::ResolutionContext;

/// A column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    /// The column's declared default.
    Default,
    Int(i64),
    Real(f64),
    Text(String),
    /// Binary content given as a hex string.
    Hex(String),
    /// A timestamp `n` days from the load time.
    DaysFromNow(i64),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Textual form used when comparing composite keys.
    pub fn key_fragment(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Default => "DEFAULT".to_string(),
            Value::Int(v) | Value::DaysFromNow(v) => v.to_string(),
            Value::Real(v) => v.to_string(),
            Value::Text(s) | Value::Hex(s) => s.clone(),
        }
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One row insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: Table,
    /// One value per [`Table::columns`] entry.
    pub values: Vec<Value>,
    /// Human-readable annotation rendered next to the statement.
    pub comment: Option<String>,
}

impl Insert {
    pub fn new(table: Table, values: Vec<Value>) -> Self {
        Self {
            table,
            values,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.table
            .column_index(column)
            .and_then(|i| self.values.get(i))
    }
}

/// A data-manipulation statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    SearchPath(Vec<String>),
    DeleteAll(Table),
    Insert(Insert),
    /// Restart `table`'s id sequence at `next`.
    RestartSequence { table: Table, next: i64 },
}

/// Produces the stored password of a profile.
pub trait PasswordHasher {
    fn hash_password(&self, username: &str) -> Result<String>;
}

/// Item of an author's personal ingredient stock.
#[derive(Debug, Clone, PartialEq)]
pub struct FridgeItem {
    pub author: usize,
    pub ingredient: usize,
    pub quantity: f64,
    pub unit: String,
}

/// An ordered selection of recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub name: String,
    pub recipes: Vec<usize>,
}

/// An author's schedule of menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planning {
    pub name: String,
    pub author: usize,
    /// Expiry relative to load time, in days.
    pub expiry_days: i64,
    /// Menu ids, in order.
    pub menus: Vec<usize>,
}

/// Auxiliary demo rows generated outside the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixtures {
    pub fridge_items: Vec<FridgeItem>,
    pub menus: Vec<Menu>,
    pub plannings: Vec<Planning>,
}

/// Everything the emitter reads.
pub struct EmitInput<'a> {
    pub ctx: &'a ResolutionContext,
    pub corpus: &'a NormalizedCorpus,
    pub intolerances: &'a Intolerances,
    pub fixtures: &'a Fixtures,
    /// Schemas for `SET search_path`; empty to omit the statement.
    pub search_path: &'a [String],
}

/// Walks the normalized corpus and produces statements in dependency order.
pub struct Emitter<'a> {
    input: EmitInput<'a>,
    hasher: &'a dyn PasswordHasher,
}

impl<'a> Emitter<'a> {
    pub fn new(input: EmitInput<'a>, hasher: &'a dyn PasswordHasher) -> Self {
        Self { input, hasher }
    }

    /// Id of the ingredient list owned by recipe `recipe`.
    pub fn recipe_list_id(&self, recipe: usize) -> usize {
        self.input.ctx.authors.len() + recipe
    }

    pub fn emit(&self) -> Result<Vec<Statement>> {
        validate_order(&Table::DEPENDENCY_ORDER)?;

        let mut out = Vec::new();
        if !self.input.search_path.is_empty() {
            out.push(Statement::SearchPath(self.input.search_path.to_vec()));
        }
        out.extend(
            Table::DEPENDENCY_ORDER
                .iter()
                .rev()
                .map(|t| Statement::DeleteAll(*t)),
        );

        self.emit_media(&mut out);
        self.emit_diets(&mut out);
        self.emit_ingredient_lists(&mut out);
        self.emit_profiles(&mut out)?;
        self.emit_categories(&mut out);
        self.emit_timers(&mut out);
        self.emit_ingredients(&mut out);
        self.emit_intolerances(&mut out);
        self.emit_fridges(&mut out);
        for recipe in &self.input.corpus.recipes {
            self.emit_recipe(recipe, &mut out);
        }
        self.emit_menus(&mut out);
        self.emit_plannings(&mut out);

        let restarts = sequence_restarts(&out);
        out.extend(restarts);

        tracing::info!(statements = out.len(), "statements emitted");
        Ok(out)
    }

    fn emit_media(&self, out: &mut Vec<Statement>) {
        for (id, media) in self.input.ctx.media.iter() {
            out.push(insert(
                Table::Media,
                vec![
                    id.into(),
                    Value::Hex(media.hash.to_uppercase()),
                    media.path.as_str().into(),
                    media.mime.clone().into(),
                ],
            ));
        }
    }

    fn emit_diets(&self, out: &mut Vec<Statement>) {
        for diet in Diet::ALL {
            out.push(insert(Table::Diet, vec![diet.id().into(), diet.name().into()]));
        }
    }

    fn emit_ingredient_lists(&self, out: &mut Vec<Statement>) {
        let count = self.input.ctx.authors.len() + self.input.corpus.recipes.len();
        for id in 0..count {
            out.push(insert(Table::IngredientList, vec![id.into()]));
        }
    }

    fn emit_profiles(&self, out: &mut Vec<Statement>) -> Result<()> {
        let ctx = self.input.ctx;
        for (id, author) in ctx.authors.iter() {
            let picture = author
                .picture
                .as_deref()
                .and_then(|p| ctx.resolve_media(p));
            out.push(insert(
                Table::Profile,
                vec![
                    id.into(),
                    author.name.as_str().into(),
                    author.email.as_str().into(),
                    self.hasher.hash_password(&author.name)?.into(),
                    author.full_name.clone().into(),
                    author.description.clone().into(),
                    picture.into(),
                    author.fridge_id.into(),
                ],
            ));
        }
        Ok(())
    }

    fn emit_categories(&self, out: &mut Vec<Statement>) {
        for (id, category) in self.input.ctx.categories.iter() {
            out.push(insert(
                Table::Category,
                vec![
                    id.into(),
                    category.name.as_str().into(),
                    category.parent.into(),
                ],
            ));
        }
    }

    fn emit_timers(&self, out: &mut Vec<Statement>) {
        for (id, timer) in self.input.corpus.timers.iter().enumerate() {
            // A zero bound means "open" in the target schema.
            let bound = |b: Option<u32>| Value::from(b.filter(|v| *v != 0));
            out.push(insert(
                Table::Timer,
                vec![
                    id.into(),
                    bound(timer.from),
                    bound(timer.to),
                    timer.kind.clone().into(),
                ],
            ));
        }
    }

    fn emit_ingredients(&self, out: &mut Vec<Statement>) {
        for (id, ingredient) in self.input.ctx.ingredients.iter() {
            out.push(insert(
                Table::Ingredient,
                vec![id.into(), ingredient.name.as_str().into()],
            ));
        }
    }

    fn emit_intolerances(&self, out: &mut Vec<Statement>) {
        for (ingredient, diet) in self.input.intolerances.pairs() {
            out.push(insert(
                Table::DietIntolerance,
                vec![diet.id().into(), ingredient.into()],
            ));
        }
    }

    fn emit_fridges(&self, out: &mut Vec<Statement>) {
        let ctx = self.input.ctx;
        for item in &self.input.fixtures.fridge_items {
            let Some(author) = ctx.authors.get(item.author) else {
                continue;
            };
            out.push(insert(
                Table::IngredientListIngredient,
                vec![
                    author.fridge_id.into(),
                    item.ingredient.into(),
                    Value::Real(item.quantity),
                    item.unit.as_str().into(),
                ],
            ));
        }
    }

    fn emit_recipe(&self, recipe: &Recipe, out: &mut Vec<Statement>) {
        let ctx = self.input.ctx;
        let corpus = self.input.corpus;
        let list_id = self.recipe_list_id(recipe.id);

        for entry in &recipe.ingredients {
            let line = &entry.source;
            let comment = format!(
                "{} {} {}",
                line.quantity.as_deref().unwrap_or(""),
                line.unit.as_deref().unwrap_or(""),
                line.name
            );
            out.push(Statement::Insert(
                Insert::new(
                    Table::IngredientListIngredient,
                    vec![
                        list_id.into(),
                        entry.ingredient.into(),
                        entry.quantity.map_or(Value::Default, Value::Real),
                        entry.unit.clone().into(),
                    ],
                )
                .with_comment(comment),
            ));
        }

        out.push(Statement::Insert(
            Insert::new(
                Table::Recipe,
                vec![
                    recipe.id.into(),
                    recipe.name.as_str().into(),
                    recipe.description.clone().into(),
                    recipe.author.into(),
                    list_id.into(),
                    recipe.serves.into(),
                    recipe.calories.into(),
                ],
            )
            .with_comment(format!("{} by {}", recipe.source_id, recipe.author_name)),
        ));

        for timer in &recipe.timers {
            out.push(insert(
                Table::RecipeTimer,
                vec![recipe.id.into(), timer.0.into()],
            ));
        }

        for media in &recipe.media {
            out.push(insert(
                Table::RecipeMedia,
                vec![(*media).into(), recipe.id.into()],
            ));
        }

        for step_id in &recipe.steps {
            let step = corpus.step(*step_id);
            out.push(insert(
                Table::Step,
                vec![
                    step.id.0.into(),
                    recipe.id.into(),
                    step.text.as_str().into(),
                    step.position.into(),
                    step.media.into(),
                    step.timer.map(|t| t.0).into(),
                ],
            ));
        }

        for category in &recipe.categories {
            let name = ctx
                .categories
                .get(*category)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            out.push(Statement::Insert(
                Insert::new(
                    Table::RecipeCategory,
                    vec![recipe.id.into(), (*category).into()],
                )
                .with_comment(name),
            ));
        }
    }

    fn emit_menus(&self, out: &mut Vec<Statement>) {
        for (id, menu) in self.input.fixtures.menus.iter().enumerate() {
            out.push(insert(Table::Menu, vec![id.into(), menu.name.as_str().into()]));
            for (position, recipe) in menu.recipes.iter().enumerate() {
                out.push(insert(
                    Table::MenuRecipe,
                    vec![id.into(), (*recipe).into(), position.into()],
                ));
            }
        }
    }

    fn emit_plannings(&self, out: &mut Vec<Statement>) {
        for (id, planning) in self.input.fixtures.plannings.iter().enumerate() {
            out.push(insert(
                Table::Planning,
                vec![
                    id.into(),
                    planning.name.as_str().into(),
                    planning.author.into(),
                    Value::DaysFromNow(planning.expiry_days),
                ],
            ));
            for (position, menu) in planning.menus.iter().enumerate() {
                out.push(insert(
                    Table::PlanningMenu,
                    vec![id.into(), (*menu).into(), position.into()],
                ));
            }
        }
    }
}

fn insert(table: Table, values: Vec<Value>) -> Statement {
    Statement::Insert(Insert::new(table, values))
}

/// One restart per id-keyed table that received rows, one past its highest id.
fn sequence_restarts(statements: &[Statement]) -> Vec<Statement> {
    Table::DEPENDENCY_ORDER
        .iter()
        .filter(|t| t.has_sequence())
        .filter_map(|&table| {
            let max = statements
                .iter()
                .filter_map(|s| match s {
                    Statement::Insert(i) if i.table == table => {
                        i.value("ID").and_then(Value::as_int)
                    }
                    _ => None,
                })
                .max()?;
            Some(Statement::RestartSequence {
                table,
                next: max + 1,
            })
        })
        .collect()
}
