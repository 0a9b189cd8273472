pub mod classes;
pub mod grades;
pub mod students;

use rusqlite::types::Value;

/// WHERE clause builder shared by the listing queries.
#[derive(Debug, Default)]
pub(crate) struct Filters {
    clauses: Vec<&'static str>,
    values: Vec<Value>,
}

impl Filters {
    pub(crate) fn push(&mut self, clause: &'static str, value: Option<&str>) {
        let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return;
        };
        self.clauses.push(clause);
        self.values.push(Value::Text(v.to_string()));
    }

    pub(crate) fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub(crate) fn values(&self) -> Vec<Value> {
        self.values.clone()
    }

    pub(crate) fn values_with_page(&self, limit: i64, offset: i64) -> Vec<Value> {
        let mut v = self.values.clone();
        v.push(Value::Integer(limit));
        v.push(Value::Integer(offset));
        v
    }
}

pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
