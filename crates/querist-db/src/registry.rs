//! Named prepared statements of a session.

use std::collections::{hash_map::Entry, HashMap};

use tracing::debug;

use crate::{
    error::{DbError, Result},
    statement::Statement,
};

/// Maps unique names to prepared statements.
///
/// Names are never overwritten; a second registration under a taken name
/// fails and leaves the first statement in place.
#[derive(Debug)]
pub struct StatementRegistry<H> {
    statements: HashMap<String, Statement<H>>,
}

impl<H> Default for StatementRegistry<H> {
    fn default() -> Self {
        Self {
            statements: HashMap::new(),
        }
    }
}

impl<H> StatementRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        statement: Statement<H>,
    ) -> Result<&Statement<H>> {
        match self.statements.entry(name.into()) {
            Entry::Occupied(entry) => Err(DbError::DuplicateStatement(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!("Registered prepared statement {}", entry.key());
                Ok(entry.insert(statement))
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Result<&Statement<H>> {
        self.statements
            .get(name)
            .ok_or_else(|| DbError::StatementNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.statements.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use querist_query::{param, select};

    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = StatementRegistry::new();
        registry
            .register("by_id", Statement::new(1, select(["id"]).from("users")))
            .unwrap();

        assert!(registry.contains("by_id"));
        assert_eq!(registry.len(), 1);
        assert_eq!(*registry.lookup("by_id").unwrap().handle(), 1);
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let mut registry = StatementRegistry::new();
        registry
            .register(
                "user",
                Statement::new(1, select(["id"]).from("users").where_("id").eq(param("id"))),
            )
            .unwrap();

        let err = registry
            .register("user", Statement::new(2, select(["name"]).from("users")))
            .unwrap_err();
        assert!(matches!(err, DbError::DuplicateStatement(ref name) if name == "user"));

        let kept = registry.lookup("user").unwrap();
        assert_eq!(*kept.handle(), 1);
        assert_eq!(kept.params(), ["id"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_unknown_name() {
        let registry = StatementRegistry::<()>::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.lookup("nope"),
            Err(DbError::StatementNotFound(ref name)) if name == "nope"
        ));
    }
}
