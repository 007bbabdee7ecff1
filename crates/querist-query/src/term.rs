//! Operands accepted by the builder methods.

use crate::{literal::Literal, query::Query};

/// Something that can be escaped into a query fragment.
///
/// Strings are identifiers (`users`, `u.name`, `users u`), numbers and
/// booleans are literals, and a [`Query`] is a nested expression whose
/// parameters are carried over into the outer query.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Ident(String),
    Literal(Literal),
    Query(Query),
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::Ident(value.to_string())
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term::Ident(value)
    }
}

impl From<&String> for Term {
    fn from(value: &String) -> Self {
        Term::Ident(value.clone())
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Term::Literal(value)
    }
}

impl From<Query> for Term {
    fn from(value: Query) -> Self {
        Term::Query(value)
    }
}

impl From<&Query> for Term {
    fn from(value: &Query) -> Self {
        Term::Query(value.clone())
    }
}

macro_rules! impl_from_literal {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Term {
                fn from(value: $ty) -> Self {
                    Term::Literal(Literal::from(value))
                }
            }
        )*
    };
}

impl_from_literal!(i8, i16, i32, i64, u8, u16, u32, f32, f64, bool);
