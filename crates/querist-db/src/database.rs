//! Database sessions.

use std::{fmt::Display, sync::LazyLock};

use querist_config::config::{Config, Engine};
use querist_query::Query;
use regex::Regex;
use tracing::{debug, warn};

use crate::{
    driver::{Driver, Params, Row, RunResult},
    error::{DbError, Result},
    registry::StatementRegistry,
    sqlite::SqliteDriver,
    statement::{Bound, Statement},
};

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)--.*?$").expect("unable to compile sql comment regex"));

/// Options for [`Database::exec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Strip `--` comments before executing.
    ///
    /// Comments are removed up to the end of the line without regard for
    /// string literals, so `--` inside a quoted string breaks the script.
    pub clean: bool,
    /// Wrap the script in `BEGIN TRANSACTION` / `END TRANSACTION`.
    pub transact: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            clean: true,
            transact: false,
        }
    }
}

/// A session over a driver, owning its named prepared statements.
///
/// # Example
///
/// ```rust
/// use querist_db::{Database, SqliteDriver};
/// use querist_query::{param, select};
/// use serde_json::json;
///
/// let mut db = Database::new(SqliteDriver::open_in_memory().unwrap());
/// db.exec("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", Default::default())
///     .unwrap();
/// db.run("INSERT INTO users (name) VALUES ('ferris')").unwrap();
///
/// db.prepare_named(
///     "user_by_id",
///     select(["name"]).from("users").where_("id").eq(param("id")),
/// )
/// .unwrap();
///
/// let params = json!({"id": 1});
/// let row = db
///     .bind("user_by_id", params.as_object().unwrap())
///     .unwrap()
///     .get()
///     .unwrap()
///     .unwrap();
/// assert_eq!(row["name"], json!("ferris"));
/// ```
pub struct Database<D: Driver> {
    driver: D,
    statements: StatementRegistry<D::Handle>,
}

impl<D: Driver> Database<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            statements: StatementRegistry::new(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn statements(&self) -> &StatementRegistry<D::Handle> {
        &self.statements
    }

    /// Compiles `query` without registering it.
    pub fn prepare(&self, query: Query) -> Result<Statement<D::Handle>> {
        let handle = self.driver.prepare(&query.to_string())?;
        Ok(Statement::new(handle, query))
    }

    /// Compiles `query` and registers it under `name`.
    ///
    /// A taken name fails before anything is sent to the driver.
    pub fn prepare_named(&mut self, name: &str, query: Query) -> Result<&Statement<D::Handle>> {
        if self.statements.contains(name) {
            return Err(DbError::DuplicateStatement(name.to_string()));
        }

        debug!("Preparing statement {name}: {query}");
        let statement = self.prepare(query)?;
        self.statements.register(name, statement)
    }

    pub fn statement(&self, name: &str) -> Result<&Statement<D::Handle>> {
        self.statements.lookup(name)
    }

    /// Returns the query of a named statement, for nesting in another query.
    pub fn sub(&self, name: &str) -> Result<Query> {
        Ok(self.statement(name)?.query().clone())
    }

    /// Binds named parameters to a registered statement.
    pub fn bind(&self, name: &str, params: &Params) -> Result<Bound<'_, D>> {
        let statement = self.statement(name)?;
        Bound::new(&self.driver, statement, params)
    }

    /// Binds named parameters to an unregistered statement.
    pub fn bind_statement<'a>(
        &'a self,
        statement: &'a Statement<D::Handle>,
        params: &Params,
    ) -> Result<Bound<'a, D>> {
        Bound::new(&self.driver, statement, params)
    }

    pub fn all(&self, sql: impl Display) -> Result<Vec<Row>> {
        let handle = self.driver.prepare(&sql.to_string())?;
        self.driver.all(&handle, &[])
    }

    pub fn each(&self, sql: impl Display, mut f: impl FnMut(Row)) -> Result<usize> {
        let handle = self.driver.prepare(&sql.to_string())?;
        self.driver.each(&handle, &[], &mut f)
    }

    pub fn get(&self, sql: impl Display) -> Result<Option<Row>> {
        let handle = self.driver.prepare(&sql.to_string())?;
        self.driver.get(&handle, &[])
    }

    pub fn run(&self, sql: impl Display) -> Result<RunResult> {
        let handle = self.driver.prepare(&sql.to_string())?;
        self.driver.run(&handle, &[])
    }

    /// Executes a script of one or more statements.
    pub fn exec(&self, sql: impl Display, options: ExecOptions) -> Result<()> {
        let script = prepare_script(&sql.to_string(), options);
        if script.trim().is_empty() {
            warn!("Executing an empty script");
        }
        self.driver.exec(&script)
    }
}

fn prepare_script(sql: &str, options: ExecOptions) -> String {
    let script = if options.clean {
        COMMENT_RE.replace_all(sql, "").into_owned()
    } else {
        sql.to_string()
    };

    if options.transact {
        format!("BEGIN TRANSACTION;{script};END TRANSACTION;")
    } else {
        script
    }
}

/// Opens a session using the driver selected by `config.engine`.
pub fn connect(config: &Config) -> Result<Database<SqliteDriver>> {
    match config.engine {
        Engine::Sqlite => Ok(Database::new(SqliteDriver::open(config)?)),
    }
}
