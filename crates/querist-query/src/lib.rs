//! A chainable SQL text builder with named parameter tracking.
//!
//! Queries are assembled from fragments and rendered with [`Query::render`]
//! or `to_string()`. Placeholders are recorded by name with [`param`] so a
//! statement prepared from the query can later be bound from named values.

pub mod factory;
pub mod literal;
pub mod query;
pub mod term;

pub use factory::*;
pub use literal::Literal;
pub use query::Query;
pub use term::Term;
