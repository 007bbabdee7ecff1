//! Prepared statement management over a pluggable database driver.
//!
//! A [`Database`] owns a [`Driver`] and a registry of named statements.
//! Statements are prepared from [`querist_query::Query`] values, which
//! remember the name behind every `?` placeholder, so they can later be
//! bound from a map of named values:
//!
//! ```rust
//! use querist_db::{connect, ExecOptions};
//! use querist_config::config::Config;
//! use querist_query::{param, select};
//! use serde_json::json;
//!
//! let mut db = connect(&Config::default()).unwrap();
//! db.exec(
//!     "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT); -- schema
//!      INSERT INTO users (name) VALUES ('ferris');",
//!     ExecOptions::default(),
//! )
//! .unwrap();
//!
//! db.prepare_named("by_name", select_name()).unwrap();
//! # fn select_name() -> querist_query::Query {
//! #     select(["id"]).from("users").where_("name").eq(param("name"))
//! # }
//!
//! let params = json!({"name": "ferris"});
//! let rows = db.bind("by_name", params.as_object().unwrap()).unwrap().all().unwrap();
//! assert_eq!(rows[0]["id"], json!(1));
//! ```

pub mod database;
pub mod driver;
pub mod error;
pub mod registry;
pub mod sqlite;
pub mod statement;

pub use database::{connect, Database, ExecOptions};
pub use driver::{Driver, Params, Row, RunResult};
pub use error::{DbError, Result};
pub use registry::StatementRegistry;
pub use sqlite::SqliteDriver;
pub use statement::{Bound, Statement};
