//! The seam between sessions and concrete database drivers.

use serde_json::{Map, Value};

use crate::error::Result;

/// A result row, keyed by column name.
pub type Row = Map<String, Value>;

/// Named parameter values supplied at bind time.
pub type Params = Map<String, Value>;

/// Outcome of a statement executed for its side effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Row id of the last inserted row.
    pub last_insert_id: i64,
    /// Number of rows changed by the statement.
    pub changes: usize,
}

/// Operations a database driver provides to a [`crate::Database`].
///
/// Arguments are positional and match the `?` placeholders of the prepared
/// SQL in order.
pub trait Driver {
    /// A compiled statement.
    type Handle;

    /// Compiles `sql`, reporting syntax errors immediately.
    fn prepare(&self, sql: &str) -> Result<Self::Handle>;

    /// Collects every result row.
    fn all(&self, handle: &Self::Handle, args: &[Value]) -> Result<Vec<Row>>;

    /// Streams result rows into `f`, returning how many were produced.
    fn each(
        &self,
        handle: &Self::Handle,
        args: &[Value],
        f: &mut dyn FnMut(Row),
    ) -> Result<usize>;

    /// Returns the first result row, if any.
    fn get(&self, handle: &Self::Handle, args: &[Value]) -> Result<Option<Row>>;

    /// Executes the statement for its side effects.
    fn run(&self, handle: &Self::Handle, args: &[Value]) -> Result<RunResult>;

    /// Executes a batch of semicolon separated statements.
    fn exec(&self, sql: &str) -> Result<()>;
}
