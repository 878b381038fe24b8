use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::error::SQLError;
use crate::traits::{Row, SQLStore, Statement, Value};

/// SqliteStore is a SQLStore implementation backed by rusqlite (bundled SQLite).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        let conn = Connection::open(path).map_err(|e| SQLError::Connection(e.to_string()))?;

        // WAL for better concurrent read performance; foreign keys are off
        // by default in SQLite and the schema relies on them for cascades.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SQLError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SQLError::Connection(e.to_string()))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Real(f) => Box::new(*f),
                Value::Text(s) => Box::new(s.as_str()),
                Value::Blob(b) => Box::new(b.as_slice()),
            }
        })
        .collect()
}

impl SQLStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                let mut columns = Vec::new();
                for (i, name) in column_names.iter().enumerate() {
                    let val = row_value_at(row, i);
                    columns.push((name.clone(), val));
                }
                Ok(Row { columns })
            })
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(|e| SQLError::Query(e.to_string()))?);
        }
        Ok(result)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SQLError::Execution(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let affected = conn
            .execute(sql, param_refs.as_slice())
            .map_err(|e| SQLError::Execution(e.to_string()))?;

        Ok(affected as u64)
    }

    fn exec_transaction(&self, statements: &[Statement]) -> Result<(), SQLError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| SQLError::Execution(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| SQLError::Execution(e.to_string()))?;

        for stmt in statements {
            let bound = bind_params(&stmt.params);
            let param_refs: Vec<&dyn rusqlite::types::ToSql> =
                bound.iter().map(|b| b.as_ref()).collect();

            tx.execute(&stmt.sql, param_refs.as_slice())
                .map_err(|e| SQLError::Execution(e.to_string()))?;
        }

        tx.commit().map_err(|e| SQLError::Execution(e.to_string()))
    }
}

/// Extract a Value from a rusqlite row at a given column index.
fn row_value_at(row: &rusqlite::Row, idx: usize) -> Value {
    // Try integer first, then real, then text, then blob, then null.
    if let Ok(i) = row.get::<_, i64>(idx) {
        return Value::Integer(i);
    }
    if let Ok(f) = row.get::<_, f64>(idx) {
        return Value::Real(f);
    }
    if let Ok(s) = row.get::<_, String>(idx) {
        return Value::Text(s);
    }
    if let Ok(b) = row.get::<_, Vec<u8>>(idx) {
        return Value::Blob(b);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .exec(
                "CREATE TABLE items (id TEXT PRIMARY KEY, score REAL, count INTEGER)",
                &[],
            )
            .unwrap();
        store
    }

    #[test]
    fn exec_and_query() {
        let store = test_store();
        let affected = store
            .exec(
                "INSERT INTO items (id, score, count) VALUES (?1, ?2, ?3)",
                &[
                    Value::Text("a".into()),
                    Value::Real(1.5),
                    Value::Integer(3),
                ],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let rows = store
            .query("SELECT id, score, count FROM items", &[])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("id"), Some("a"));
        assert_eq!(rows[0].get_f64("score"), Some(1.5));
        assert_eq!(rows[0].get_i64("count"), Some(3));
    }

    #[test]
    fn unique_violation_detected() {
        let store = test_store();
        store
            .exec(
                "INSERT INTO items (id) VALUES (?1)",
                &[Value::Text("dup".into())],
            )
            .unwrap();
        let err = store
            .exec(
                "INSERT INTO items (id) VALUES (?1)",
                &[Value::Text("dup".into())],
            )
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn transaction_commits_all() {
        let store = test_store();
        store
            .exec_transaction(&[
                Statement::new(
                    "INSERT INTO items (id) VALUES (?1)",
                    vec![Value::Text("x".into())],
                ),
                Statement::new(
                    "INSERT INTO items (id) VALUES (?1)",
                    vec![Value::Text("y".into())],
                ),
            ])
            .unwrap();

        let rows = store.query("SELECT id FROM items", &[]).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn transaction_rolls_back_on_failure() {
        let store = test_store();
        store
            .exec(
                "INSERT INTO items (id) VALUES (?1)",
                &[Value::Text("x".into())],
            )
            .unwrap();

        // Second statement violates the primary key; the first must not stick.
        let result = store.exec_transaction(&[
            Statement::new(
                "INSERT INTO items (id) VALUES (?1)",
                vec![Value::Text("fresh".into())],
            ),
            Statement::new(
                "INSERT INTO items (id) VALUES (?1)",
                vec![Value::Text("x".into())],
            ),
        ]);
        assert!(result.is_err());

        let rows = store.query("SELECT id FROM items", &[]).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("data.sqlite")).unwrap();
        store
            .exec("CREATE TABLE t (id TEXT PRIMARY KEY)", &[])
            .unwrap();
        store
            .exec("INSERT INTO t (id) VALUES (?1)", &[Value::Text("1".into())])
            .unwrap();
        let rows = store.query("SELECT id FROM t", &[]).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
