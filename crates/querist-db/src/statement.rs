//! Prepared statements and named parameter binding.

use querist_query::Query;
use serde_json::Value;
use tracing::trace;

use crate::{
    driver::{Driver, Params, Row, RunResult},
    error::{DbError, Result},
};

/// A compiled driver handle together with the query it was built from.
///
/// The query's parameter names fix the positional order in which bound
/// values are handed to the driver.
#[derive(Debug)]
pub struct Statement<H> {
    handle: H,
    query: Query,
}

impl<H> Statement<H> {
    pub fn new(handle: H, query: Query) -> Self {
        Self {
            handle,
            query,
        }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Parameter names in placeholder order.
    pub fn params(&self) -> &[String] {
        self.query.params()
    }

    /// Validates `params` and orders its values positionally.
    ///
    /// Every declared name absent from `params` is reported in a single
    /// [`DbError::MissingParameters`]. Extra entries are ignored.
    pub fn arguments(&self, params: &Params) -> Result<Vec<Value>> {
        let missing = self
            .params()
            .iter()
            .filter(|key| !params.contains_key(key.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(DbError::MissingParameters(missing));
        }

        Ok(self
            .params()
            .iter()
            .filter_map(|key| params.get(key.as_str()).cloned())
            .collect())
    }
}

/// A statement with its arguments resolved, ready to execute.
pub struct Bound<'a, D: Driver> {
    driver: &'a D,
    statement: &'a Statement<D::Handle>,
    args: Vec<Value>,
}

impl<'a, D: Driver> Bound<'a, D> {
    pub fn new(
        driver: &'a D,
        statement: &'a Statement<D::Handle>,
        params: &Params,
    ) -> Result<Self> {
        let args = statement.arguments(params)?;
        trace!(params = ?statement.params(), args = ?args, "bound statement");
        Ok(Self {
            driver,
            statement,
            args,
        })
    }

    /// Positional arguments in placeholder order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn all(&self) -> Result<Vec<Row>> {
        self.driver.all(self.statement.handle(), &self.args)
    }

    /// Calls `f` for every row and returns the row count once done.
    pub fn each(&self, mut f: impl FnMut(Row)) -> Result<usize> {
        self.driver.each(self.statement.handle(), &self.args, &mut f)
    }

    pub fn get(&self) -> Result<Option<Row>> {
        self.driver.get(self.statement.handle(), &self.args)
    }

    pub fn run(&self) -> Result<RunResult> {
        self.driver.run(self.statement.handle(), &self.args)
    }
}

#[cfg(test)]
mod tests {
    use querist_query::{param, select};
    use serde_json::json;

    use super::*;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn statement() -> Statement<()> {
        let query = select(["id"])
            .from("users")
            .where_("a")
            .eq(param("a"))
            .and("b")
            .eq(param("b"));
        Statement::new((), query)
    }

    #[test]
    fn test_arguments_follow_declared_order() {
        let args = statement()
            .arguments(&params(json!({"b": 2, "a": 1})))
            .unwrap();
        assert_eq!(args, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_arguments_ignore_extra_keys() {
        let args = statement()
            .arguments(&params(json!({"a": "x", "b": null, "c": true})))
            .unwrap();
        assert_eq!(args, vec![json!("x"), Value::Null]);
    }

    #[test]
    fn test_missing_parameter_is_reported() {
        let err = statement()
            .arguments(&params(json!({"a": 1})))
            .unwrap_err();
        match err {
            DbError::MissingParameters(names) => assert_eq!(names, vec!["b".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_all_missing_parameters_are_reported() {
        let err = statement().arguments(&Params::new()).unwrap_err();
        match err {
            DbError::MissingParameters(names) => {
                assert_eq!(names, vec!["a".to_string(), "b".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_repeated_parameter_is_bound_twice() {
        let query = select_where_twice();
        let statement = Statement::new((), query);
        let args = statement.arguments(&params(json!({"v": 7}))).unwrap();
        assert_eq!(args, vec![json!(7), json!(7)]);
    }

    fn select_where_twice() -> Query {
        select(["id"])
            .from("t")
            .where_("x")
            .eq(param("v"))
            .or("y")
            .eq(param("v"))
    }

    #[test]
    fn test_statement_without_params_binds_empty() {
        let statement = Statement::new((), select(["id"]).from("users"));
        assert!(statement.arguments(&Params::new()).unwrap().is_empty());
    }
}
