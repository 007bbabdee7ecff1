//! Shorthand constructors.
//!
//! Each function returns a fresh [`Query`] holding a single expression, for
//! use as a column, operand or subquery inside another query:
//!
//! ```rust
//! use querist_query::{count, desc, select, Term};
//!
//! let query = select([Term::from("repo"), count().into()])
//!     .from("packages")
//!     .group_by(["repo"])
//!     .order_by([desc("repo")]);
//!
//! assert_eq!(
//!     query.to_string(),
//!     "SELECT `repo`, COUNT(*) FROM `packages` GROUP BY `repo` ORDER BY `repo` DESC"
//! );
//! ```

use crate::{literal::Literal, query::Query, term::Term};

/// Starts a `SELECT` that is parenthesized when nested as a subquery.
pub fn select<I>(columns: I) -> Query
where
    I: IntoIterator,
    I::Item: Into<Term>,
{
    Query::new().select(columns).enclose()
}

/// Starts a `SELECT *` that is parenthesized when nested as a subquery.
pub fn select_all() -> Query {
    Query::new().select_all().enclose()
}

/// Raw SQL text, e.g. a hand-written statement to prepare.
pub fn raw(sql: impl Into<String>) -> Query {
    Query::new().raw(sql)
}

pub fn literal(value: impl Into<Literal>) -> Query {
    Query::new().literal(value)
}

/// A single `?` placeholder bound to `name`.
pub fn param(name: impl Into<String>) -> Query {
    Query::new().param(name)
}

/// `<name> AS <alias>`.
pub fn alias(name: impl Into<Term>, alias: impl Into<Term>) -> Query {
    let mut query = Query::new();
    let name = query.escape(name);
    query.push(name);
    query.alias(alias)
}

/// `<name> ASC`, for use in [`Query::order_by`].
pub fn asc(name: impl Into<Term>) -> Query {
    Query::new().ordered().order_asc(name)
}

/// `<name> DESC`, for use in [`Query::order_by`].
pub fn desc(name: impl Into<Term>) -> Query {
    Query::new().ordered().order_desc(name)
}

/// `COUNT(*)`.
pub fn count() -> Query {
    count_of("*")
}

/// `COUNT(<id>)`.
pub fn count_of(id: impl Into<Term>) -> Query {
    aggregate("count", id.into())
}

pub fn min(id: impl Into<Term>) -> Query {
    aggregate("min", id.into())
}

pub fn max(id: impl Into<Term>) -> Query {
    aggregate("max", id.into())
}

fn aggregate(name: &str, id: Term) -> Query {
    let mut query = Query::new();
    let id = query.escape(id);
    query.function(name, [id])
}
