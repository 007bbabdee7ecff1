//! SQLite driver backed by rusqlite.
//!
//! Handles are the statement SQL itself; compiled statements live in the
//! connection's prepared statement cache and are reused across binds.

use std::path::Path;

use querist_config::config::Config;
use rusqlite::{
    params_from_iter,
    types::{Value as SqlValue, ValueRef},
    Connection, OpenFlags, Row as SqlRow,
};
use serde_json::{Number, Value};
use tracing::{debug, trace};

use crate::{
    driver::{Driver, Row, RunResult},
    error::{DbError, Result},
};

/// Prepared statements kept compiled per connection.
const STATEMENT_CACHE_CAPACITY: usize = 64;

pub struct SqliteDriver {
    conn: Connection,
}

impl SqliteDriver {
    /// Opens the database described by `config`.
    pub fn open(config: &Config) -> Result<Self> {
        if config.is_memory() {
            return Self::open_in_memory();
        }

        let mode = config.access_mode()?;
        let mut flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if mode.read_only {
            flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
        } else {
            flags |= OpenFlags::SQLITE_OPEN_READ_WRITE;
        }
        if mode.create {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        Self::open_with_flags(&config.path, flags)
    }

    pub fn open_with_flags<P: AsRef<Path>>(path: P, flags: OpenFlags) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening sqlite database {}", path.display());
        let conn = Connection::open_with_flags(path, flags)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory sqlite database");
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
        Self {
            conn,
        }
    }

    /// Gets a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl Driver for SqliteDriver {
    type Handle = String;

    fn prepare(&self, sql: &str) -> Result<String> {
        trace!("Preparing: {sql}");
        self.conn.prepare_cached(sql)?;
        Ok(sql.to_string())
    }

    fn all(&self, handle: &String, args: &[Value]) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        self.each(handle, args, &mut |row| rows.push(row))?;
        Ok(rows)
    }

    fn each(&self, handle: &String, args: &[Value], f: &mut dyn FnMut(Row)) -> Result<usize> {
        trace!("Querying: {handle}");
        let mut stmt = self.conn.prepare_cached(handle)?;
        let columns = column_names(&stmt);
        let mut rows = stmt.query(params_from_iter(sql_args(args)?))?;

        let mut count = 0;
        while let Some(row) = rows.next()? {
            f(row_to_map(row, &columns)?);
            count += 1;
        }
        Ok(count)
    }

    fn get(&self, handle: &String, args: &[Value]) -> Result<Option<Row>> {
        trace!("Querying one: {handle}");
        let mut stmt = self.conn.prepare_cached(handle)?;
        let columns = column_names(&stmt);
        let mut rows = stmt.query(params_from_iter(sql_args(args)?))?;

        match rows.next()? {
            Some(row) => Ok(Some(row_to_map(row, &columns)?)),
            None => Ok(None),
        }
    }

    fn run(&self, handle: &String, args: &[Value]) -> Result<RunResult> {
        trace!("Running: {handle}");
        let mut stmt = self.conn.prepare_cached(handle)?;
        let readonly = stmt.readonly();

        // Step through any produced rows, e.g. `RETURNING` or a plain SELECT.
        let mut rows = stmt.query(params_from_iter(sql_args(args)?))?;
        while rows.next()?.is_some() {}
        drop(rows);

        let changes = if readonly {
            0
        } else {
            self.conn.changes() as usize
        };
        Ok(RunResult {
            last_insert_id: self.conn.last_insert_rowid(),
            changes,
        })
    }

    fn exec(&self, sql: &str) -> Result<()> {
        trace!("Executing batch: {sql}");
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

fn column_names(stmt: &rusqlite::Statement<'_>) -> Vec<String> {
    stmt.column_names().into_iter().map(String::from).collect()
}

fn sql_args(args: &[Value]) -> Result<Vec<SqlValue>> {
    args.iter().map(to_sql_value).collect()
}

/// Converts a bound JSON value into a SQLite value.
///
/// Arrays and objects are stored as JSON text. Unsigned integers above
/// `i64::MAX` have no SQLite integer representation and are rejected.
fn to_sql_value(value: &Value) -> Result<SqlValue> {
    let value = match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else if n.is_u64() {
                return Err(DbError::QueryError(format!(
                    "Integer {n} does not fit in a 64-bit signed column"
                )));
            } else {
                n.as_f64().map_or(SqlValue::Null, SqlValue::Real)
            }
        }
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    };
    Ok(value)
}

fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Array(b.iter().map(|byte| Value::from(*byte)).collect()),
    }
}

fn row_to_map(row: &SqlRow<'_>, columns: &[String]) -> rusqlite::Result<Row> {
    let mut map = Row::new();
    for (idx, name) in columns.iter().enumerate() {
        map.insert(name.clone(), from_sql_value(row.get_ref(idx)?));
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn setup_db() -> SqliteDriver {
        let driver = SqliteDriver::open_in_memory().unwrap();
        driver
            .exec(
                "CREATE TABLE packages (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    version TEXT NOT NULL,
                    size REAL,
                    checksum BLOB
                );
                INSERT INTO packages (name, version, size, checksum)
                    VALUES ('soar', '1.0.0', 1.5, x'0102');
                INSERT INTO packages (name, version, size)
                    VALUES ('zls', '0.15.1', NULL);",
            )
            .unwrap();
        driver
    }

    #[test]
    fn test_all_maps_columns() {
        let driver = setup_db();
        let handle = driver
            .prepare("SELECT id, name, size, checksum FROM packages ORDER BY id")
            .unwrap();
        let rows = driver.all(&handle, &[]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], json!(1));
        assert_eq!(rows[0]["name"], json!("soar"));
        assert_eq!(rows[0]["size"], json!(1.5));
        assert_eq!(rows[0]["checksum"], json!([1, 2]));
        assert_eq!(rows[1]["size"], Value::Null);
    }

    #[test]
    fn test_positional_args() {
        let driver = setup_db();
        let handle = driver
            .prepare("SELECT name FROM packages WHERE version = ? AND id > ?")
            .unwrap();
        let row = driver
            .get(&handle, &[json!("0.15.1"), json!(0)])
            .unwrap()
            .unwrap();
        assert_eq!(row["name"], json!("zls"));

        assert!(driver
            .get(&handle, &[json!("9.9.9"), json!(0)])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_each_counts_rows() {
        let driver = setup_db();
        let handle = driver.prepare("SELECT name FROM packages ORDER BY id").unwrap();
        let mut names = Vec::new();
        let count = driver
            .each(&handle, &[], &mut |row| names.push(row["name"].clone()))
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(names, vec![json!("soar"), json!("zls")]);
    }

    #[test]
    fn test_run_reports_changes() {
        let driver = setup_db();
        let insert = driver
            .prepare("INSERT INTO packages (name, version) VALUES (?, ?)")
            .unwrap();
        let result = driver.run(&insert, &[json!("ripgrep"), json!("14.1.0")]).unwrap();
        assert_eq!(
            result,
            RunResult {
                last_insert_id: 3,
                changes: 1
            }
        );

        let update = driver.prepare("UPDATE packages SET size = ?").unwrap();
        let result = driver.run(&update, &[json!(2)]).unwrap();
        assert_eq!(result.changes, 3);
    }

    #[test]
    fn test_value_conversions() {
        let driver = setup_db();
        let handle = driver
            .prepare("SELECT ? AS b, ? AS n, ? AS o")
            .unwrap();
        let row = driver
            .get(&handle, &[json!(true), Value::Null, json!({"k": [1]})])
            .unwrap()
            .unwrap();
        assert_eq!(row["b"], json!(1));
        assert_eq!(row["n"], Value::Null);
        assert_eq!(row["o"], json!("{\"k\":[1]}"));
    }

    #[test]
    fn test_run_steps_through_returned_rows() {
        let driver = setup_db();
        let insert = driver
            .prepare("INSERT INTO packages (name, version) VALUES (?, ?) RETURNING id")
            .unwrap();
        let result = driver.run(&insert, &[json!("fd"), json!("10.2.0")]).unwrap();
        assert_eq!(
            result,
            RunResult {
                last_insert_id: 3,
                changes: 1
            }
        );

        let select = driver.prepare("SELECT name FROM packages").unwrap();
        let result = driver.run(&select, &[]).unwrap();
        assert_eq!(result.changes, 0);
        assert_eq!(result.last_insert_id, 3);
    }

    #[test]
    fn test_unsigned_integer_out_of_range_is_rejected() {
        let driver = setup_db();
        let handle = driver.prepare("SELECT ? AS n").unwrap();
        let err = driver.get(&handle, &[json!(u64::MAX)]).unwrap_err();
        assert!(matches!(err, DbError::QueryError(_)));

        let row = driver
            .get(&handle, &[json!(i64::MAX as u64)])
            .unwrap()
            .unwrap();
        assert_eq!(row["n"], json!(i64::MAX));
    }

    #[test]
    fn test_prepare_reports_syntax_errors() {
        let driver = setup_db();
        let err = driver.prepare("SELEC nonsense").unwrap_err();
        assert!(matches!(err, DbError::QueryError(_)));
    }

    #[test]
    fn test_open_read_only_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            path: dir.path().join("missing.db").to_string_lossy().into_owned(),
            mode: Some("r".to_string()),
            ..Config::default()
        };
        let err = SqliteDriver::open(&config).err().unwrap();
        assert!(matches!(err, DbError::ConnectionError(_)));
    }

    #[test]
    fn test_open_file_with_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("querist.db");
        let config = Config {
            path: path.to_string_lossy().into_owned(),
            mode: Some("rwc".to_string()),
            ..Config::default()
        };
        let driver = SqliteDriver::open(&config).unwrap();
        driver.exec("CREATE TABLE t (id INTEGER)").unwrap();
        assert!(path.exists());
    }
}
