//! The query builder implementation.

use std::fmt;

use crate::{literal::Literal, term::Term};

/// An append-only SQL builder.
///
/// Every method consumes the builder, appends one or more fragments and
/// hands the builder back, so calls chain naturally. Parameters are
/// recorded by name in the order their `?` placeholders appear, which is
/// the order a statement prepared from this query expects its arguments in.
///
/// # Example
///
/// ```rust
/// use querist_query::{param, select};
///
/// let query = select(["id", "name"])
///     .from("users")
///     .where_("id")
///     .eq(param("uid"));
///
/// assert_eq!(query.to_string(), "SELECT `id`, `name` FROM `users` WHERE `id` = ?");
/// assert_eq!(query.params(), ["uid"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    parts: Vec<String>,
    params: Vec<String>,
    enclosed: bool,
    ordered: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments appended so far.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Parameter names, one per `?` placeholder, in placeholder order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Whether this query is parenthesized when nested in another query.
    pub fn is_enclosed(&self) -> bool {
        self.enclosed
    }

    pub(crate) fn enclose(mut self) -> Self {
        self.enclosed = true;
        self
    }

    pub(crate) fn ordered(mut self) -> Self {
        self.ordered = true;
        self
    }

    pub(crate) fn push(&mut self, part: impl Into<String>) {
        self.parts.push(part.into());
    }

    /// Renders the query text.
    ///
    /// With `enclose` set, an enclosed query (one created through
    /// [`crate::select`]) is wrapped in parentheses.
    pub fn render(&self, enclose: bool) -> String {
        let sql = self.parts.join(" ");
        if enclose && self.enclosed {
            format!("({sql})")
        } else {
            sql
        }
    }

    /// Escapes a term into a fragment.
    ///
    /// - A nested query contributes its parameter names to this query and
    ///   renders in its enclosed form.
    /// - An identifier containing spaces is escaped word by word.
    /// - Otherwise each `.`-separated segment is quoted with backticks,
    ///   except a bare `*`.
    /// - Literals render as themselves.
    pub fn escape(&mut self, term: impl Into<Term>) -> String {
        match term.into() {
            Term::Query(query) => {
                self.params.extend(query.params.iter().cloned());
                query.render(true)
            }
            Term::Literal(literal) => literal.to_string(),
            Term::Ident(ident) => escape_identifier(&ident),
        }
    }

    fn escape_list<I>(&mut self, columns: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        columns.into_iter().map(|c| self.escape(c)).collect()
    }

    /// Appends `SELECT` and the escaped column list, or `SELECT *` when no
    /// columns are given.
    pub fn select<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        let columns = self.escape_list(columns);
        self.push("SELECT");
        if columns.is_empty() {
            self.push("*");
        } else {
            self.push(columns.join(", "));
        }
        self
    }

    /// Appends `SELECT *`.
    pub fn select_all(mut self) -> Self {
        self.push("SELECT");
        self.push("*");
        self
    }

    /// Appends a fragment verbatim, without escaping.
    pub fn raw(mut self, sql: impl Into<String>) -> Self {
        self.push(sql);
        self
    }

    /// Appends a literal value.
    pub fn literal(mut self, value: impl Into<Literal>) -> Self {
        let value = value.into();
        self.push(value.to_string());
        self
    }

    /// Appends a `?` placeholder bound to the named parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self.push("?");
        self
    }

    /// Appends a function call, `NAME(arg, arg)`.
    ///
    /// Arguments are inserted as given; escape them first if they are
    /// identifiers.
    pub fn function<I>(mut self, name: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string())
            .collect::<Vec<_>>();
        self.push(format!("{}({})", name.to_uppercase(), args.join(", ")));
        self
    }

    /// Appends `AS <alias>`.
    pub fn alias(mut self, alias: impl Into<Term>) -> Self {
        let alias = self.escape(alias);
        self.push("AS");
        self.push(alias);
        self
    }

    fn table_clause(mut self, keyword: &str, table: Term, alias: Option<Term>) -> Self {
        let table = self.escape(table);
        self.push(keyword);
        self.push(table);
        match alias {
            Some(alias) => self.alias(alias),
            None => self,
        }
    }

    pub fn from(self, table: impl Into<Term>) -> Self {
        self.table_clause("FROM", table.into(), None)
    }

    pub fn from_as(self, table: impl Into<Term>, alias: impl Into<Term>) -> Self {
        self.table_clause("FROM", table.into(), Some(alias.into()))
    }

    pub fn left_join(self, table: impl Into<Term>) -> Self {
        self.table_clause("LEFT OUTER JOIN", table.into(), None)
    }

    pub fn left_join_as(self, table: impl Into<Term>, alias: impl Into<Term>) -> Self {
        self.table_clause("LEFT OUTER JOIN", table.into(), Some(alias.into()))
    }

    pub fn right_join(self, table: impl Into<Term>) -> Self {
        self.table_clause("RIGHT OUTER JOIN", table.into(), None)
    }

    pub fn right_join_as(self, table: impl Into<Term>, alias: impl Into<Term>) -> Self {
        self.table_clause("RIGHT OUTER JOIN", table.into(), Some(alias.into()))
    }

    pub fn outer_join(self, table: impl Into<Term>) -> Self {
        self.table_clause("FULL OUTER JOIN", table.into(), None)
    }

    pub fn outer_join_as(self, table: impl Into<Term>, alias: impl Into<Term>) -> Self {
        self.table_clause("FULL OUTER JOIN", table.into(), Some(alias.into()))
    }

    /// Appends `INNER JOIN <table>`.
    pub fn join(self, table: impl Into<Term>) -> Self {
        self.table_clause("INNER JOIN", table.into(), None)
    }

    pub fn join_as(self, table: impl Into<Term>, alias: impl Into<Term>) -> Self {
        self.table_clause("INNER JOIN", table.into(), Some(alias.into()))
    }

    /// Same as [`Query::join`].
    pub fn inner_join(self, table: impl Into<Term>) -> Self {
        self.join(table)
    }

    pub fn inner_join_as(self, table: impl Into<Term>, alias: impl Into<Term>) -> Self {
        self.join_as(table, alias)
    }

    pub fn cross_join(self, table: impl Into<Term>) -> Self {
        self.table_clause("CROSS JOIN", table.into(), None)
    }

    pub fn cross_join_as(self, table: impl Into<Term>, alias: impl Into<Term>) -> Self {
        self.table_clause("CROSS JOIN", table.into(), Some(alias.into()))
    }

    fn keyword(mut self, keyword: &str, field: Term) -> Self {
        let field = self.escape(field);
        self.push(keyword);
        self.push(field);
        self
    }

    pub fn on(self, field: impl Into<Term>) -> Self {
        self.keyword("ON", field.into())
    }

    /// Appends `ON <field> = <value>`.
    pub fn on_eq(self, field: impl Into<Term>, value: impl Into<Term>) -> Self {
        self.on(field).eq(value)
    }

    pub fn where_(self, field: impl Into<Term>) -> Self {
        self.keyword("WHERE", field.into())
    }

    /// Appends `WHERE <field> = <value>`.
    pub fn where_eq(self, field: impl Into<Term>, value: impl Into<Term>) -> Self {
        self.where_(field).eq(value)
    }

    pub fn having(self, field: impl Into<Term>) -> Self {
        self.keyword("HAVING", field.into())
    }

    pub fn having_eq(self, field: impl Into<Term>, value: impl Into<Term>) -> Self {
        self.having(field).eq(value)
    }

    pub fn group_by<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        let columns = self.escape_list(columns);
        self.push("GROUP BY");
        self.push(columns.join(", "));
        self
    }

    /// Appends `ORDER BY` and the escaped, comma separated terms.
    ///
    /// Pass [`crate::asc`] and [`crate::desc`] terms to give each column a
    /// direction.
    pub fn order_by<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        let columns = self.escape_list(columns);
        self.push("ORDER BY");
        self.push(columns.join(", "));
        self.ordered = true;
        self
    }

    fn order(mut self, field: Term, direction: &str) -> Self {
        let field = self.escape(field);
        if !self.ordered {
            self.push("ORDER BY");
            self.ordered = true;
        }
        self.push(field);
        self.push(direction);
        self
    }

    /// Appends an ascending order term.
    ///
    /// Only the first order term of a query carries the `ORDER BY`
    /// keyword. Successive terms are appended without a separating comma.
    pub fn order_asc(self, field: impl Into<Term>) -> Self {
        self.order(field.into(), "ASC")
    }

    /// Appends a descending order term. See [`Query::order_asc`].
    pub fn order_desc(self, field: impl Into<Term>) -> Self {
        self.order(field.into(), "DESC")
    }

    /// Appends `LIMIT 0, <count>`.
    pub fn limit(mut self, count: impl Into<Term>) -> Self {
        let count = self.escape(count);
        self.push("LIMIT");
        self.push(format!("0, {count}"));
        self
    }

    /// Appends `LIMIT <start>, <count>`.
    pub fn limit_range(mut self, start: impl Into<Term>, count: impl Into<Term>) -> Self {
        let start = self.escape(start);
        let count = self.escape(count);
        self.push("LIMIT");
        self.push(format!("{start}, {count}"));
        self
    }

    pub fn and(self, field: impl Into<Term>) -> Self {
        self.keyword("AND", field.into())
    }

    pub fn or(self, field: impl Into<Term>) -> Self {
        self.keyword("OR", field.into())
    }

    /// Appends `IN <term>`, usually a subquery.
    pub fn in_(self, sub: impl Into<Term>) -> Self {
        self.keyword("IN", sub.into())
    }

    pub fn like(self, mask: impl Into<Term>) -> Self {
        self.keyword("LIKE", mask.into())
    }

    /// Appends `BETWEEN <a> AND <b>`.
    pub fn between(self, a: impl Into<Term>, b: impl Into<Term>) -> Self {
        self.keyword("BETWEEN", a.into()).keyword("AND", b.into())
    }

    pub fn eq(self, value: impl Into<Term>) -> Self {
        self.keyword("=", value.into())
    }

    pub fn gt(self, value: impl Into<Term>) -> Self {
        self.keyword(">", value.into())
    }

    pub fn gte(self, value: impl Into<Term>) -> Self {
        self.keyword(">=", value.into())
    }

    pub fn lt(self, value: impl Into<Term>) -> Self {
        self.keyword("<", value.into())
    }

    pub fn lte(self, value: impl Into<Term>) -> Self {
        self.keyword("<=", value.into())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

fn escape_identifier(ident: &str) -> String {
    if ident.contains(' ') {
        return ident
            .split(' ')
            .map(escape_identifier)
            .collect::<Vec<_>>()
            .join(" ");
    }

    ident
        .split('.')
        .map(|name| {
            if name == "*" {
                name.to_string()
            } else {
                format!("`{name}`")
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
