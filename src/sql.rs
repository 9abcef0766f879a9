//! PostgreSQL text rendering of the emitted statement stream.

use recipe_import_core::emit::{Insert, Statement, Value};
use recipe_import_core::schema::Table;

/// Quote a string literal.
///
/// Single quotes are doubled and `&` is spliced in with `chr(38)` so that
/// `psql` variable substitution never sees it.
pub fn quote(text: &str) -> String {
    format!(
        "'{}'",
        text.replace('\'', "''").replace('&', "' || chr(38) || '")
    )
}

pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Default => "DEFAULT".to_string(),
        Value::Int(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(s) => quote(s),
        Value::Hex(h) => format!("decode({}, 'hex')", quote(h)),
        Value::DaysFromNow(days) => format!("now() + INTERVAL '{days} days'"),
    }
}

pub fn sequence_name(table: Table) -> String {
    format!("{}_id_seq", table.name().to_lowercase())
}

fn render_insert(insert: &Insert) -> String {
    let mut out = String::new();
    if let Some(comment) = &insert.comment {
        let comment = comment.replace(['\r', '\n'], " ");
        out.push_str(&format!("-- {}\n", comment.trim()));
    }
    let values: Vec<String> = insert.values.iter().map(render_value).collect();
    out.push_str(&format!(
        "INSERT INTO {} ({}) VALUES ({});",
        insert.table,
        insert.table.columns().join(", "),
        values.join(", ")
    ));
    out
}

pub fn render_statement(statement: &Statement) -> String {
    match statement {
        Statement::SearchPath(schemas) => format!("SET search_path TO {};", schemas.join(",")),
        Statement::DeleteAll(table) => format!("DELETE FROM {};", table.name().to_lowercase()),
        Statement::Insert(insert) => render_insert(insert),
        Statement::RestartSequence { table, next } => {
            format!("ALTER SEQUENCE {} RESTART WITH {};", sequence_name(*table), next)
        }
    }
}

/// Render a whole script, one statement per line, with a blank line between
/// groups of different kinds or tables.
pub fn render_script(statements: &[Statement]) -> String {
    let mut out = String::new();
    let mut previous: Option<(std::mem::Discriminant<Statement>, Option<Table>)> = None;
    for statement in statements {
        let group = (
            std::mem::discriminant(statement),
            match statement {
                Statement::Insert(i) => Some(i.table),
                _ => None,
            },
        );
        if previous.is_some_and(|p| p != group) {
            out.push('\n');
        }
        previous = Some(group);
        out.push_str(&render_statement(statement));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("Mom's"), "'Mom''s'");
        assert_eq!(quote("Salt & Pepper"), "'Salt ' || chr(38) || ' Pepper'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn test_values() {
        assert_eq!(render_value(&Value::Null), "NULL");
        assert_eq!(render_value(&Value::Default), "DEFAULT");
        assert_eq!(render_value(&Value::Int(-3)), "-3");
        assert_eq!(render_value(&Value::Real(0.5)), "0.5");
        assert_eq!(render_value(&Value::Real(250.0)), "250");
        assert_eq!(
            render_value(&Value::Hex("AB01".into())),
            "decode('AB01', 'hex')"
        );
        assert_eq!(
            render_value(&Value::DaysFromNow(-12)),
            "now() + INTERVAL '-12 days'"
        );
    }

    #[test]
    fn test_statements() {
        assert_eq!(
            render_statement(&Statement::SearchPath(vec!["internal".into(), "api".into()])),
            "SET search_path TO internal,api;"
        );
        assert_eq!(
            render_statement(&Statement::DeleteAll(Table::RecipeMedia)),
            "DELETE FROM recipe_media;"
        );
        assert_eq!(
            render_statement(&Statement::RestartSequence {
                table: Table::Recipe,
                next: 12
            }),
            "ALTER SEQUENCE recipe_id_seq RESTART WITH 12;"
        );
        let insert = Insert::new(Table::Diet, vec![Value::Int(2), "Vegan".into()])
            .with_comment("diet\nthree");
        assert_eq!(
            render_statement(&Statement::Insert(insert)),
            "-- diet three\nINSERT INTO DIET (ID, NAME) VALUES (2, 'Vegan');"
        );
    }

    #[test]
    fn test_script_groups() {
        let script = render_script(&[
            Statement::DeleteAll(Table::Diet),
            Statement::DeleteAll(Table::Media),
            Statement::Insert(Insert::new(Table::Diet, vec![Value::Int(0), "A".into()])),
            Statement::Insert(Insert::new(Table::Diet, vec![Value::Int(1), "B".into()])),
        ]);
        assert_eq!(
            script,
            "DELETE FROM diet;\nDELETE FROM media;\n\n\
             INSERT INTO DIET (ID, NAME) VALUES (0, 'A');\n\
             INSERT INTO DIET (ID, NAME) VALUES (1, 'B');\n"
        );
    }
}
