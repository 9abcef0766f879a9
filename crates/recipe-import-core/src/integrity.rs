//! Referential-integrity verification of an emitted statement stream.
//!
//! [`verify_statements`] replays the stream in order and checks that every
//! non-null foreign key names a row inserted earlier, and that no primary
//! key is inserted twice.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::emit::{Statement, Value};
use crate::schema::Table;

/// Violations found in a table order or a statement stream.
#[derive(Debug, Error, PartialEq)]
pub enum IntegrityError {
    #[error("table {table} is ordered before {depends_on}, which it references")]
    TableOrder { table: Table, depends_on: Table },

    #[error("statement {index}: {table}.{column} = {value} references a {target} row not emitted yet")]
    DanglingReference {
        index: usize,
        table: Table,
        column: &'static str,
        value: i64,
        target: Table,
    },

    #[error("statement {index}: duplicate primary key {key} in {table}")]
    DuplicateKey {
        index: usize,
        table: Table,
        key: String,
    },

    #[error("statement {index}: {table} expects {expected} values, got {actual}")]
    Arity {
        index: usize,
        table: Table,
        expected: usize,
        actual: usize,
    },
}

/// Summary of a verified stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub inserts: usize,
    pub references: usize,
}

/// Verify a statement stream in emission order.
pub fn verify_statements(statements: &[Statement]) -> Result<IntegrityReport, IntegrityError> {
    let mut ids: HashMap<Table, HashSet<i64>> = HashMap::new();
    let mut keys: HashMap<Table, HashSet<String>> = HashMap::new();
    let mut report = IntegrityReport::default();

    for (index, statement) in statements.iter().enumerate() {
        let Statement::Insert(insert) = statement else {
            continue;
        };
        let table = insert.table;
        let expected = table.columns().len();
        if insert.values.len() != expected {
            return Err(IntegrityError::Arity {
                index,
                table,
                expected,
                actual: insert.values.len(),
            });
        }

        for &(column, target) in table.foreign_keys() {
            let Some(value) = insert.value(column).and_then(Value::as_int) else {
                continue;
            };
            let known = ids.get(&target).is_some_and(|set| set.contains(&value));
            if !known {
                return Err(IntegrityError::DanglingReference {
                    index,
                    table,
                    column,
                    value,
                    target,
                });
            }
            report.references += 1;
        }

        let key = table
            .primary_key()
            .iter()
            .map(|c| insert.value(c).map(Value::key_fragment).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(",");
        if !keys.entry(table).or_default().insert(key.clone()) {
            return Err(IntegrityError::DuplicateKey { index, table, key });
        }
        if let Some(id) = insert.value("ID").and_then(Value::as_int) {
            ids.entry(table).or_default().insert(id);
        }
        report.inserts += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Insert;

    fn insert(table: Table, values: Vec<Value>) -> Statement {
        Statement::Insert(Insert::new(table, values))
    }

    #[test]
    fn test_reference_after_row_passes() {
        let stream = vec![
            Statement::DeleteAll(Table::Diet),
            insert(Table::Diet, vec![0usize.into(), "Vegan".into()]),
            insert(Table::Ingredient, vec![0usize.into(), "Beef".into()]),
            insert(Table::DietIntolerance, vec![0usize.into(), 0usize.into()]),
        ];
        let report = verify_statements(&stream).unwrap();
        assert_eq!(report.inserts, 3);
        assert_eq!(report.references, 2);
    }

    #[test]
    fn test_reference_before_row_fails() {
        let stream = vec![
            insert(Table::DietIntolerance, vec![0usize.into(), 0usize.into()]),
            insert(Table::Diet, vec![0usize.into(), "Vegan".into()]),
        ];
        let err = verify_statements(&stream).unwrap_err();
        assert!(matches!(
            err,
            IntegrityError::DanglingReference {
                index: 0,
                target: Table::Diet,
                ..
            }
        ));
    }

    #[test]
    fn test_null_reference_allowed() {
        let stream = vec![
            insert(Table::IngredientList, vec![0usize.into()]),
            insert(
                Table::Recipe,
                vec![
                    0usize.into(),
                    "Soup".into(),
                    Value::Null,
                    Value::Null,
                    0usize.into(),
                    Value::Null,
                    120u32.into(),
                ],
            ),
        ];
        assert!(verify_statements(&stream).is_ok());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let stream = vec![
            insert(Table::Diet, vec![0usize.into(), "Vegan".into()]),
            insert(Table::Diet, vec![0usize.into(), "Vegetarian".into()]),
        ];
        assert!(matches!(
            verify_statements(&stream),
            Err(IntegrityError::DuplicateKey { index: 1, .. })
        ));
    }

    #[test]
    fn test_arity_checked() {
        let stream = vec![insert(Table::Diet, vec![0usize.into()])];
        assert!(matches!(
            verify_statements(&stream),
            Err(IntegrityError::Arity {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }
}
