//! SQL translation of restrictions, orders and page requests.
//!
//! [`SqlBuilder`] renders the query model as parameterized SQL. Offset
//! requests become `LIMIT`/`OFFSET`; cursor requests become keyset
//! predicates over the effective order. Backward keyset queries select in
//! reversed order and set [`SqlQuery::reverse_results`]. Every page query
//! selects one row beyond the page size; that extra row must be dropped
//! before the rows are reversed, which [`SqlQuery::page_rows`] does.
//!
//! ```rust
//! use sift_query::sql::SqlBuilder;
//! use sift_query::{Attribute, PageRequest, Query};
//!
//! let year = Attribute::new("year");
//! let query = Query::new().where_(year.at_least(1960)?).sorted_by([year.asc()]);
//! let request = PageRequest::of_size(10)?.after_keyset([1984])?;
//!
//! let select = SqlBuilder::postgres().select_page("books", &query, &request)?;
//! assert_eq!(
//!     select.sql,
//!     "SELECT * FROM books WHERE year >= $1 AND ((year > $2)) ORDER BY year ASC LIMIT 11"
//! );
//! assert!(!select.reverse_results);
//! # Ok::<(), sift_query::QueryError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SiftConfig;
use crate::constraint::Constraint;
use crate::cursor::Cursor;
use crate::error::{QueryError, QueryResult};
use crate::expression::{Expression, FunctionName};
use crate::page_request::{Mode, PageRequest};
use crate::query::Query;
use crate::restriction::{Operator, Restriction};
use crate::sort::{Order, Sort, SortOrder};
use crate::value::Value;

/// Escape a string for use in SQL (for identifiers, not values).
pub fn escape_identifier(name: &str) -> String {
    let escaped = name.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Check if an identifier needs quoting.
pub fn needs_quoting(name: &str) -> bool {
    let reserved = [
        "user", "order", "group", "select", "from", "where", "table", "index",
        "key", "primary", "foreign", "check", "default", "null", "not", "and",
        "or", "in", "is", "like", "between", "case", "when", "then", "else",
        "end", "as", "on", "join", "left", "right", "inner", "outer", "cross",
        "natural", "using", "limit", "offset", "union", "intersect", "except",
        "all", "distinct", "having", "escape", "asc", "desc", "by", "count",
    ];

    if reserved.contains(&name.to_lowercase().as_str()) {
        return true;
    }

    !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        || name.starts_with(|c: char| c.is_ascii_digit())
}

/// SQL dialect: parameter placeholders and string literal rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum DatabaseType {
    /// PostgreSQL uses $1, $2, etc.
    #[default]
    #[serde(rename = "postgres", alias = "postgresql")]
    PostgreSQL,
    /// MySQL uses ?, ?, etc.
    #[serde(rename = "mysql")]
    MySQL,
    /// SQLite uses ?, ?, etc.
    #[serde(rename = "sqlite")]
    SQLite,
}

impl DatabaseType {
    /// Get the parameter placeholder for this database type.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::PostgreSQL => format!("${}", index),
            Self::MySQL | Self::SQLite => "?".to_string(),
        }
    }

    /// Quote an identifier if needed, with the dialect's quote character.
    ///
    /// MySQL uses backticks; PostgreSQL and SQLite use double quotes.
    pub fn quote_identifier(&self, name: &str) -> String {
        if !needs_quoting(name) {
            return name.to_string();
        }
        match self {
            Self::MySQL => format!("`{}`", name.replace('`', "``")),
            Self::PostgreSQL | Self::SQLite => escape_identifier(name),
        }
    }

    /// A single-character string literal, as used in `ESCAPE` clauses.
    pub fn char_literal(&self, c: char) -> String {
        match (self, c) {
            (Self::MySQL, '\\') => "'\\\\'".to_string(),
            (_, '\'') => "''''".to_string(),
            _ => format!("'{}'", c),
        }
    }
}

/// A rendered statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    /// The SQL text with dialect placeholders.
    pub sql: String,
    /// Parameter values, in placeholder order.
    pub params: Vec<Value>,
    /// Whether rows come back in reverse effective order and must be
    /// reversed by the caller.
    pub reverse_results: bool,
}

impl SqlQuery {
    /// Turn the rows fetched for a page query of `size` into page content.
    ///
    /// The extra look-ahead row is dropped first, then backward keyset rows
    /// are reversed into forward order. Returns the content and whether a
    /// further page exists in the fetch direction.
    pub fn page_rows<R>(&self, mut rows: Vec<R>, size: u32) -> (Vec<R>, bool) {
        let size = size as usize;
        let has_more = rows.len() > size;
        rows.truncate(size);
        if self.reverse_results {
            rows.reverse();
        }
        (rows, has_more)
    }
}

/// A SQL builder for constructing queries.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    db_type: DatabaseType,
    parts: Vec<String>,
    params: Vec<Value>,
    log_queries: bool,
}

impl SqlBuilder {
    /// Create a new SQL builder.
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            db_type,
            parts: Vec::new(),
            params: Vec::new(),
            log_queries: false,
        }
    }

    /// Create a builder for the configured dialect.
    pub fn from_config(config: &SiftConfig) -> Self {
        Self {
            log_queries: config.debug.log_queries,
            ..Self::new(config.sql.dialect)
        }
    }

    /// Create a PostgreSQL SQL builder.
    pub fn postgres() -> Self {
        Self::new(DatabaseType::PostgreSQL)
    }

    /// Create a MySQL SQL builder.
    pub fn mysql() -> Self {
        Self::new(DatabaseType::MySQL)
    }

    /// Create a SQLite SQL builder.
    pub fn sqlite() -> Self {
        Self::new(DatabaseType::SQLite)
    }

    /// The dialect.
    pub fn db_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Push a literal SQL string.
    pub fn push(&mut self, sql: impl AsRef<str>) -> &mut Self {
        self.parts.push(sql.as_ref().to_string());
        self
    }

    /// Push a parameter placeholder and record its value.
    pub fn push_param(&mut self, value: impl Into<Value>) -> &mut Self {
        let index = self.params.len() + 1;
        self.parts.push(self.db_type.placeholder(index));
        self.params.push(value.into());
        self
    }

    /// Push an identifier (properly quoted if needed).
    pub fn push_identifier(&mut self, name: &str) -> &mut Self {
        self.parts.push(self.db_type.quote_identifier(name));
        self
    }

    /// Push a restriction as a boolean SQL expression.
    pub fn push_restriction(&mut self, restriction: &Restriction) -> QueryResult<&mut Self> {
        match restriction {
            Restriction::Unrestricted { negated: false } => {
                self.push("1 = 1");
            }
            Restriction::Unrestricted { negated: true } => {
                self.push("1 = 0");
            }
            Restriction::Basic(basic) => {
                self.push_constraint(basic.expression(), basic.constraint())?;
            }
            Restriction::Composite(composite) => {
                if composite.is_negated() {
                    self.push("NOT ");
                }
                let separator = match composite.operator() {
                    Operator::All => " AND ",
                    Operator::Any => " OR ",
                };
                self.push("(");
                for (i, child) in composite.children().iter().enumerate() {
                    if i > 0 {
                        self.push(separator);
                    }
                    self.push_restriction(child)?;
                }
                self.push(")");
            }
        }
        Ok(self)
    }

    fn push_constraint(&mut self, subject: &Expression, constraint: &Constraint) -> QueryResult<()> {
        let folded = !constraint.is_case_sensitive();
        self.push_operand(subject, folded)?;
        match constraint {
            Constraint::EqualTo { value, .. }
            | Constraint::NotEqualTo { value, .. }
            | Constraint::GreaterThan(value)
            | Constraint::AtMost(value)
            | Constraint::LessThan(value)
            | Constraint::AtLeast(value) => {
                self.push(format!(" {} ", constraint.kind().as_sql()));
                self.push_operand(value, folded)?;
            }
            Constraint::Between { lower, upper } | Constraint::NotBetween { lower, upper } => {
                self.push(format!(" {} ", constraint.kind().as_sql()));
                self.push_expression(lower)?;
                self.push(" AND ");
                self.push_expression(upper)?;
            }
            Constraint::In(values) | Constraint::NotIn(values) => {
                self.push(format!(" {} (", constraint.kind().as_sql()));
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.push_expression(value)?;
                }
                self.push(")");
            }
            Constraint::Like { pattern, .. } | Constraint::NotLike { pattern, .. } => {
                self.push(format!(" {} ", constraint.kind().as_sql()));
                self.push_operand(pattern.pattern_expression(), folded)?;
                if let Some(escape) = pattern.escape() {
                    let literal = self.db_type.char_literal(escape);
                    self.push(format!(" ESCAPE {}", literal));
                }
            }
            Constraint::Null | Constraint::NotNull => {
                self.push(format!(" {}", constraint.kind().as_sql()));
            }
        }
        Ok(())
    }

    fn push_operand(&mut self, expression: &Expression, folded: bool) -> QueryResult<()> {
        if folded {
            self.push("LOWER(");
            self.push_expression(expression)?;
            self.push(")");
        } else {
            self.push_expression(expression)?;
        }
        Ok(())
    }

    /// Push an expression: literals become parameters.
    pub fn push_expression(&mut self, expression: &Expression) -> QueryResult<&mut Self> {
        match expression {
            Expression::Literal(value) => {
                self.push_param(value.clone());
            }
            Expression::Attribute(path) => {
                self.push_identifier(path.name());
            }
            Expression::Function(function) => match (function.name, function.operands.as_slice()) {
                (FunctionName::Neg, [operand]) => {
                    self.push("(-");
                    self.push_expression(operand)?;
                    self.push(")");
                }
                (name, [left, right]) if name.is_infix() => {
                    self.push("(");
                    self.push_expression(left)?;
                    self.push(format!(" {} ", name.as_str()));
                    self.push_expression(right)?;
                    self.push(")");
                }
                (name, [operand]) if !name.is_infix() => {
                    self.push(format!("{}(", name.as_str()));
                    self.push_expression(operand)?;
                    self.push(")");
                }
                (name, operands) => {
                    return Err(QueryError::invalid_argument(format!(
                        "{} cannot take {} operand(s)",
                        name.as_str(),
                        operands.len()
                    )));
                }
            },
        }
        Ok(self)
    }

    /// Push an `ORDER BY` clause. Nothing is pushed for an empty order.
    pub fn push_order(&mut self, order: &Order) -> &mut Self {
        for (i, sort) in order.iter().enumerate() {
            self.push(if i == 0 { " ORDER BY " } else { ", " });
            self.push_sort_key(sort);
            self.push(format!(" {}", sort.direction().as_sql()));
        }
        self
    }

    fn push_sort_key(&mut self, sort: &Sort) {
        if sort.ignore_case() {
            self.push("LOWER(");
            self.push_identifier(sort.property());
            self.push(")");
        } else {
            self.push_identifier(sort.property());
        }
    }

    fn push_sort_param(&mut self, sort: &Sort, key: &Value) {
        if sort.ignore_case() {
            self.push("LOWER(");
            self.push_param(key.clone());
            self.push(")");
        } else {
            self.push_param(key.clone());
        }
    }

    /// Push the keyset predicate selecting rows strictly after `cursor`
    /// in `order`.
    ///
    /// `(k1 > c1) OR (k1 = c1 AND k2 > c2) OR ...`, with `<` for
    /// descending criteria.
    pub fn push_keyset(&mut self, order: &Order, cursor: &Cursor) -> QueryResult<&mut Self> {
        cursor.check_arity(order)?;
        if let Some(position) = cursor.elements().iter().position(Value::is_null) {
            return Err(QueryError::unsupported("null keys in SQL keyset predicates")
                .with_attribute(order.sorts()[position].property()));
        }

        let sorts = order.sorts();
        let keys = cursor.elements();
        self.push("(");
        for i in 0..sorts.len() {
            if i > 0 {
                self.push(" OR ");
            }
            self.push("(");
            for (sort, key) in sorts.iter().zip(keys).take(i) {
                self.push_sort_key(sort);
                self.push(" = ");
                self.push_sort_param(sort, key);
                self.push(" AND ");
            }
            self.push_sort_key(&sorts[i]);
            self.push(match sorts[i].direction() {
                SortOrder::Asc => " > ",
                SortOrder::Desc => " < ",
            });
            self.push_sort_param(&sorts[i], &keys[i]);
            self.push(")");
        }
        self.push(")");
        Ok(self)
    }

    /// Render a page query against `table`.
    ///
    /// One row beyond the page size is requested so the caller can tell
    /// whether a further page exists.
    pub fn select_page(mut self, table: &str, query: &Query, request: &PageRequest) -> QueryResult<SqlQuery> {
        let order = query.effective_order();
        if request.mode().is_cursor() && order.is_empty() {
            return Err(QueryError::unsupported("keyset pagination without sort criteria")
                .with_suggestion("Add at least one sort criterion to the query"));
        }

        self.push("SELECT * FROM ").push_identifier(table);

        let restricted = !query.restriction().is_unrestricted();
        if restricted {
            self.push(" WHERE ").push_restriction(query.restriction())?;
        }

        let (order, reverse_results) = match (request.mode(), request.cursor()) {
            (Mode::CursorNext, Some(cursor)) => {
                self.push(if restricted { " AND " } else { " WHERE " });
                self.push_keyset(&order, cursor)?;
                (order, false)
            }
            (Mode::CursorPrevious, Some(cursor)) => {
                let reversed = order.reversed();
                self.push(if restricted { " AND " } else { " WHERE " });
                self.push_keyset(&reversed, cursor)?;
                (reversed, true)
            }
            _ => (order, false),
        };

        self.push_order(&order);
        self.push(format!(" LIMIT {}", u64::from(request.size()) + 1));
        if request.mode() == Mode::Offset && request.offset() > 0 {
            self.push(format!(" OFFSET {}", request.offset()));
        }

        let rendered = self.finish(reverse_results);
        crate::sift_debug!(mode = %request.mode(), params = rendered.params.len(), "rendered page query");
        Ok(rendered)
    }

    /// Render a count query against `table`.
    pub fn count(mut self, table: &str, restriction: &Restriction) -> QueryResult<SqlQuery> {
        self.push("SELECT COUNT(*) FROM ").push_identifier(table);
        if !restriction.is_unrestricted() {
            self.push(" WHERE ").push_restriction(restriction)?;
        }
        Ok(self.finish(false))
    }

    fn finish(self, reverse_results: bool) -> SqlQuery {
        let (sql, params) = self.build();
        if self.log_queries {
            info!(sql = %sql, params = params.len(), "generated query");
        }
        SqlQuery {
            sql,
            params,
            reverse_results,
        }
    }

    /// Build the final SQL string and parameters.
    pub fn build(&self) -> (String, Vec<Value>) {
        (self.parts.join(""), self.params.clone())
    }

    /// Get the current SQL string (without consuming).
    pub fn sql(&self) -> String {
        self.parts.join("")
    }

    /// Get the current parameters.
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

impl Default for SqlBuilder {
    fn default() -> Self {
        Self::postgres()
    }
}
