//! In-memory query engine.
//!
//! [`MemoryEngine`] executes the full query model over a vector of
//! [`Entity`] records. It is the reference collaborator: restrictions are
//! evaluated directly, ordering follows the effective order, and keyset
//! pages honour the forward/backward cursor semantics.
//!
//! Comparisons use two-valued logic. Null sorts before every other value and
//! never satisfies an equality or range test, so the negative constraint of
//! each pair always selects exactly the records its complement rejects.
//!
//! ```rust
//! use sift_query::{Attribute, MemoryEngine, PageRequest, Query, QueryEngine, Value};
//! use indexmap::IndexMap;
//!
//! # tokio_test_block(async {
//! let records: Vec<IndexMap<String, Value>> = (1..=5)
//!     .map(|n| IndexMap::from([("n".to_string(), Value::Int(n))]))
//!     .collect();
//! let engine = MemoryEngine::new(records);
//!
//! let n = Attribute::new("n");
//! let query = Query::new().where_(n.at_least(2)?).sorted_by([n.asc()]);
//! let page = engine.find_page(&query, &PageRequest::of_size(2)?).await?;
//!
//! assert_eq!(page.len(), 2);
//! assert_eq!(page.total_elements()?, 4);
//! # Ok::<(), sift_query::QueryError>(())
//! # }).unwrap();
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::config::{DEFAULT_MAX_PAGE_SIZE, PaginationConfig};
use crate::constraint::{Constraint, ConstraintKind};
use crate::cursor::Cursor;
use crate::engine::{BoxFuture, QueryEngine};
use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::expression::{Expression, FunctionName};
use crate::page::Page;
use crate::page_request::{Mode, PageRequest};
use crate::pattern::{Pattern, wildcard_match};
use crate::query::Query;
use crate::restriction::{Operator, Restriction};
use crate::sort::Order;
use crate::value::Value;

/// A query engine over records held in memory.
#[derive(Debug, Clone)]
pub struct MemoryEngine<T> {
    records: Vec<T>,
    max_size: u32,
    unsupported: HashSet<ConstraintKind>,
}

impl<T> Default for MemoryEngine<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            max_size: DEFAULT_MAX_PAGE_SIZE,
            unsupported: HashSet::new(),
        }
    }
}

impl<T: Entity + Clone> MemoryEngine<T> {
    /// Create an engine holding `records`, in insertion order.
    pub fn new(records: impl IntoIterator<Item = T>) -> Self {
        Self {
            records: records.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Apply the pagination limits from configuration.
    pub fn with_config(mut self, config: &PaginationConfig) -> Self {
        self.max_size = config.max_size;
        self
    }

    /// Reject page requests larger than `max_size`.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Report constraints of `kind` as unsupported.
    ///
    /// Useful to exercise fallback paths written for less capable stores.
    pub fn without_operator(mut self, kind: ConstraintKind) -> Self {
        self.unsupported.insert(kind);
        self
    }

    /// Add a record.
    pub fn insert(&mut self, record: T) {
        self.records.push(record);
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// The records matching `restriction`, in insertion order.
    pub fn filter(&self, restriction: &Restriction) -> QueryResult<Vec<&T>> {
        self.check_capabilities(restriction)?;
        let mut out = Vec::new();
        for record in &self.records {
            if matches(restriction, record)? {
                out.push(record);
            }
        }
        Ok(out)
    }

    /// Number of records matching `restriction`.
    pub fn count_matching(&self, restriction: &Restriction) -> QueryResult<u64> {
        Ok(self.filter(restriction)?.len() as u64)
    }

    /// Execute `query` for `request` synchronously.
    ///
    /// Cursor requests always yield cursored pages; `cursored` forces
    /// cursors for offset requests too.
    pub fn execute(&self, query: &Query, request: &PageRequest, cursored: bool) -> QueryResult<Page<T>> {
        if request.size() > self.max_size {
            return Err(QueryError::unsupported(format!(
                "page size {} above the limit of {}",
                request.size(),
                self.max_size
            )));
        }

        let order = query.effective_order();
        let cursored = cursored || request.mode().is_cursor();
        if cursored && order.is_empty() {
            return Err(QueryError::unsupported("keyset pagination without sort criteria")
                .with_suggestion("Add at least one sort criterion to the query"));
        }
        if let Some(cursor) = request.cursor() {
            cursor.check_arity(&order)?;
        }

        let mut matched: Vec<(Vec<Value>, &T)> = self
            .filter(query.restriction())?
            .into_iter()
            .map(|record| (sort_keys(record, &order), record))
            .collect();
        matched.sort_by(|a, b| compare_keys(&a.0, &b.0, &order));

        let len = matched.len();
        let size = request.size() as usize;
        let (start, end) = match (request.mode(), request.cursor()) {
            (Mode::CursorNext, Some(cursor)) => {
                let start = matched.partition_point(|(keys, _)| {
                    compare_keys(keys, cursor.elements(), &order) != Ordering::Greater
                });
                (start, start.saturating_add(size).min(len))
            }
            (Mode::CursorPrevious, Some(cursor)) => {
                let end = matched.partition_point(|(keys, _)| {
                    compare_keys(keys, cursor.elements(), &order) == Ordering::Less
                });
                (end.saturating_sub(size), end)
            }
            _ => {
                let start = usize::try_from(request.offset()).unwrap_or(usize::MAX).min(len);
                (start, start.saturating_add(size).min(len))
            }
        };

        let window = &matched[start..end];
        let content: Vec<T> = window.iter().map(|(_, record)| (*record).clone()).collect();
        let page = if cursored {
            let cursors = window
                .iter()
                .map(|(keys, _)| Cursor::new(keys.iter().cloned()))
                .collect::<QueryResult<Vec<_>>>()?;
            Page::cursored(content, cursors, request.clone())?
        } else {
            Page::new(content, request.clone())
        };
        // An empty keyset window has no boundary cursor to continue from.
        let navigable = !(cursored && start == end);
        let page = page
            .with_next(navigable && end < len)
            .with_previous(navigable && start > 0);

        debug!(
            mode = %request.mode(),
            page = request.page(),
            matched = len,
            returned = end - start,
            "memory engine page"
        );

        Ok(if request.request_total() {
            page.with_total(len as u64)
        } else {
            page
        })
    }

    fn check_capabilities(&self, restriction: &Restriction) -> QueryResult<()> {
        match restriction {
            Restriction::Unrestricted { .. } => Ok(()),
            Restriction::Basic(basic) => {
                let kind = basic.constraint().kind();
                if !self.unsupported.contains(&kind) {
                    return Ok(());
                }
                let err = QueryError::unsupported(format!("{} constraints", kind));
                Err(match basic.attribute() {
                    Some(attribute) => err.with_attribute(attribute),
                    None => err,
                })
            }
            Restriction::Composite(composite) => composite
                .children()
                .iter()
                .try_for_each(|child| self.check_capabilities(child)),
        }
    }
}

impl<T> QueryEngine<T> for MemoryEngine<T>
where
    T: Entity + Clone + Send + Sync,
{
    fn find_page<'a>(
        &'a self,
        query: &'a Query,
        request: &'a PageRequest,
    ) -> BoxFuture<'a, QueryResult<Page<T>>> {
        Box::pin(async move { self.execute(query, request, false) })
    }

    fn find_cursored_page<'a>(
        &'a self,
        query: &'a Query,
        request: &'a PageRequest,
    ) -> BoxFuture<'a, QueryResult<Page<T>>> {
        Box::pin(async move { self.execute(query, request, true) })
    }

    fn count<'a>(&'a self, restriction: &'a Restriction) -> BoxFuture<'a, QueryResult<u64>> {
        Box::pin(async move { self.count_matching(restriction) })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

fn sort_keys<E: Entity>(record: &E, order: &Order) -> Vec<Value> {
    order
        .iter()
        .map(|sort| record.attribute(sort.property()).unwrap_or(Value::Null))
        .collect()
}

/// Compare two key lists under `order`. Null sorts first.
fn compare_keys(a: &[Value], b: &[Value], order: &Order) -> Ordering {
    for ((x, y), sort) in a.iter().zip(b).zip(order.iter()) {
        let ordering = match (x.is_null(), y.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ if sort.ignore_case() => x.folded().compare(&y.folded()).unwrap_or(Ordering::Equal),
            _ => x.compare(y).unwrap_or(Ordering::Equal),
        };
        let ordering = if sort.is_ascending() {
            ordering
        } else {
            ordering.reverse()
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn matches<E: Entity>(restriction: &Restriction, record: &E) -> QueryResult<bool> {
    match restriction {
        Restriction::Unrestricted { negated } => Ok(!negated),
        Restriction::Basic(basic) => {
            let value = evaluate(basic.expression(), record)?;
            satisfies(&value, basic.constraint(), record)
        }
        Restriction::Composite(composite) => {
            let mut result = composite.operator() == Operator::All;
            for child in composite.children() {
                let matched = matches(child, record)?;
                match composite.operator() {
                    Operator::All if !matched => {
                        result = false;
                        break;
                    }
                    Operator::Any if matched => {
                        result = true;
                        break;
                    }
                    _ => {}
                }
            }
            Ok(result != composite.is_negated())
        }
    }
}

fn satisfies<E: Entity>(value: &Value, constraint: &Constraint, record: &E) -> QueryResult<bool> {
    Ok(match constraint {
        Constraint::EqualTo {
            value: other,
            case_sensitive,
        } => equals(value, &evaluate(other, record)?, *case_sensitive),
        Constraint::NotEqualTo {
            value: other,
            case_sensitive,
        } => !equals(value, &evaluate(other, record)?, *case_sensitive),
        Constraint::GreaterThan(bound) => ordered(value, &evaluate(bound, record)?) == Some(Ordering::Greater),
        Constraint::AtMost(bound) => ordered(value, &evaluate(bound, record)?) != Some(Ordering::Greater),
        Constraint::LessThan(bound) => ordered(value, &evaluate(bound, record)?) == Some(Ordering::Less),
        Constraint::AtLeast(bound) => ordered(value, &evaluate(bound, record)?) != Some(Ordering::Less),
        Constraint::Between { lower, upper } => within(value, lower, upper, record)?,
        Constraint::NotBetween { lower, upper } => !within(value, lower, upper, record)?,
        Constraint::In(values) => member(value, values, record)?,
        Constraint::NotIn(values) => !member(value, values, record)?,
        Constraint::Like {
            pattern,
            case_sensitive,
        } => like(value, pattern, *case_sensitive, record)?,
        Constraint::NotLike {
            pattern,
            case_sensitive,
        } => !like(value, pattern, *case_sensitive, record)?,
        Constraint::Null => value.is_null(),
        Constraint::NotNull => !value.is_null(),
    })
}

fn ordered(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }
    a.compare(b)
}

fn equals(a: &Value, b: &Value, case_sensitive: bool) -> bool {
    if case_sensitive {
        ordered(a, b) == Some(Ordering::Equal)
    } else {
        ordered(&a.folded(), &b.folded()) == Some(Ordering::Equal)
    }
}

fn within<E: Entity>(value: &Value, lower: &Expression, upper: &Expression, record: &E) -> QueryResult<bool> {
    let above = matches!(
        ordered(value, &evaluate(lower, record)?),
        Some(Ordering::Greater | Ordering::Equal)
    );
    let below = matches!(
        ordered(value, &evaluate(upper, record)?),
        Some(Ordering::Less | Ordering::Equal)
    );
    Ok(above && below)
}

fn member<E: Entity>(value: &Value, values: &[Expression], record: &E) -> QueryResult<bool> {
    for candidate in values {
        if equals(value, &evaluate(candidate, record)?, true) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn like<E: Entity>(value: &Value, pattern: &Pattern, case_sensitive: bool, record: &E) -> QueryResult<bool> {
    let Some(text) = text_of(value) else {
        return Ok(false);
    };
    let Some(pattern_text) = text_of(&evaluate(pattern.pattern_expression(), record)?) else {
        return Ok(false);
    };
    Ok(wildcard_match(&pattern_text, pattern.escape(), &text, !case_sensitive))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Char(c) => Some(c.to_string()),
        _ => None,
    }
}

/// Evaluate an expression against a record. Null operands yield null.
fn evaluate<E: Entity>(expression: &Expression, record: &E) -> QueryResult<Value> {
    match expression {
        Expression::Literal(value) => Ok(value.clone()),
        Expression::Attribute(path) => Ok(record.attribute(path.name()).unwrap_or(Value::Null)),
        Expression::Function(function) => {
            let operands = function
                .operands
                .iter()
                .map(|operand| evaluate(operand, record))
                .collect::<QueryResult<Vec<_>>>()?;
            apply(function.name, &operands)
        }
    }
}

fn apply(name: FunctionName, operands: &[Value]) -> QueryResult<Value> {
    if operands.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    let overflow = || QueryError::invalid_argument(format!("integer overflow in {}", name.as_str()));
    match (name, operands) {
        (FunctionName::Length, [value]) => Ok(Value::Int(text(name, value)?.chars().count() as i64)),
        (FunctionName::Lower, [value]) => Ok(Value::String(text(name, value)?.to_lowercase())),
        (FunctionName::Upper, [value]) => Ok(Value::String(text(name, value)?.to_uppercase())),
        (FunctionName::Abs, [Value::Int(i)]) => i.checked_abs().map(Value::Int).ok_or_else(overflow),
        (FunctionName::Abs, [Value::Float(x)]) => Ok(Value::Float(x.abs())),
        (FunctionName::Neg, [Value::Int(i)]) => i.checked_neg().map(Value::Int).ok_or_else(overflow),
        (FunctionName::Neg, [Value::Float(x)]) => Ok(Value::Float(-x)),
        (FunctionName::Plus, [Value::Int(a), Value::Int(b)]) => a.checked_add(*b).map(Value::Int).ok_or_else(overflow),
        (FunctionName::Minus, [Value::Int(a), Value::Int(b)]) => a.checked_sub(*b).map(Value::Int).ok_or_else(overflow),
        (FunctionName::Times, [Value::Int(a), Value::Int(b)]) => a.checked_mul(*b).map(Value::Int).ok_or_else(overflow),
        (FunctionName::Plus | FunctionName::Minus | FunctionName::Times | FunctionName::Divide, [a, b]) => {
            let (a, b) = (number(name, a)?, number(name, b)?);
            Ok(Value::Float(match name {
                FunctionName::Plus => a + b,
                FunctionName::Minus => a - b,
                FunctionName::Times => a * b,
                _ if b == 0.0 => return Err(QueryError::invalid_argument("division by zero")),
                _ => a / b,
            }))
        }
        _ => Err(QueryError::invalid_argument(format!(
            "{} cannot be applied to {} operand(s) of these types",
            name.as_str(),
            operands.len()
        ))),
    }
}

fn text(name: FunctionName, value: &Value) -> QueryResult<String> {
    text_of(value).ok_or_else(|| {
        QueryError::invalid_argument(format!("{} expects text, got {}", name.as_str(), value))
    })
}

fn number(name: FunctionName, value: &Value) -> QueryResult<f64> {
    match value {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(x) => Ok(*x),
        other => Err(QueryError::invalid_argument(format!(
            "{} expects a number, got {}",
            name.as_str(),
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;
    use crate::sort::Sort;
    use crate::{ErrorCode, cursor};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    type Record = IndexMap<String, Value>;

    fn book(title: &str, year: i64) -> Record {
        IndexMap::from([
            ("title".to_string(), Value::from(title)),
            ("year".to_string(), Value::Int(year)),
        ])
    }

    fn engine() -> MemoryEngine<Record> {
        MemoryEngine::new([
            book("Dune", 1965),
            book("Neuromancer", 1984),
            book("Foundation", 1951),
            book("Hyperion", 1989),
            book("Solaris", 1961),
        ])
    }

    fn titles(page: &Page<Record>) -> Vec<String> {
        page.iter()
            .filter_map(|r| r.attribute("title").and_then(|v| v.as_str().map(str::to_string)))
            .collect()
    }

    fn by_year() -> Query {
        Query::new().sorted_by([Sort::asc("year")])
    }

    #[tokio::test]
    async fn test_offset_pages() {
        let engine = engine();
        let first = engine.find_page(&by_year(), &PageRequest::of_size(2).unwrap()).await.unwrap();
        assert_eq!(titles(&first), vec!["Foundation", "Solaris"]);
        assert!(first.has_next());
        assert!(!first.has_previous());
        assert_eq!(first.total_elements().unwrap(), 5);
        assert!(!first.is_cursored());

        let third = engine
            .find_page(&by_year(), &PageRequest::of(3, 2, false).unwrap())
            .await
            .unwrap();
        assert_eq!(titles(&third), vec!["Hyperion"]);
        assert!(!third.has_next());
        assert!(third.has_previous());
        assert_eq!(third.total_elements().unwrap_err().code, ErrorCode::TotalNotRequested);
    }

    #[tokio::test]
    async fn test_cursor_next_starts_after_cursor() {
        let request = PageRequest::of_size(2).unwrap().after_keyset([1961]).unwrap();
        let page = engine().find_page(&by_year(), &request).await.unwrap();
        assert_eq!(titles(&page), vec!["Dune", "Neuromancer"]);
        assert!(page.has_previous());
        assert!(page.has_next());
        assert_eq!(page.cursor(1).unwrap(), &cursor![1984].unwrap());
    }

    #[tokio::test]
    async fn test_cursor_previous_keeps_forward_order() {
        let request = PageRequest::of_size(2).unwrap().before_keyset([1984]).unwrap();
        let page = engine().find_page(&by_year(), &request).await.unwrap();
        assert_eq!(titles(&page), vec!["Solaris", "Dune"]);
        assert!(page.has_previous());
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_empty_keyset_window_cannot_navigate() {
        let engine = engine();
        let query = by_year();
        let base = PageRequest::of_size(2).unwrap();

        let before_first = engine
            .find_page(&query, &base.before_keyset([1951]).unwrap())
            .await
            .unwrap();
        assert!(before_first.is_empty());
        assert!(!before_first.has_next());
        assert!(!before_first.has_previous());
        assert_eq!(
            before_first.next_page_request().unwrap_err().code,
            ErrorCode::NoSuchElement
        );

        let after_last = engine
            .find_page(&query, &base.after_keyset([1989]).unwrap())
            .await
            .unwrap();
        assert!(after_last.is_empty());
        assert!(!after_last.has_previous());
        assert!(!after_last.has_next());
        assert_eq!(
            after_last.previous_page_request().unwrap_err().code,
            ErrorCode::NoSuchElement
        );
    }

    #[tokio::test]
    async fn test_descending_cursor() {
        let query = Query::new().sorted_by([Sort::desc("year")]);
        let request = PageRequest::of_size(2).unwrap().after_keyset([1984]).unwrap();
        let page = engine().find_page(&query, &request).await.unwrap();
        assert_eq!(titles(&page), vec!["Dune", "Solaris"]);
    }

    #[tokio::test]
    async fn test_cursor_pagination_needs_order() {
        let request = PageRequest::of_size(2).unwrap().after_keyset([1]).unwrap();
        let err = engine().find_page(&Query::new(), &request).await.unwrap_err();
        assert!(err.is_unsupported());

        let err = engine()
            .find_cursored_page(&Query::new(), &PageRequest::of_size(2).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_unsupported());
    }

    #[tokio::test]
    async fn test_cursor_arity_must_match_order() {
        let request = PageRequest::of_size(2).unwrap().after_keyset(["Dune", "x"]).unwrap();
        let err = engine().find_page(&by_year(), &request).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CursorMismatch);
    }

    #[tokio::test]
    async fn test_unsupported_operator() {
        let engine = engine().without_operator(ConstraintKind::Like);
        let query = by_year().where_(Attribute::new("title").starts_with("D"));
        let err = engine.find_page(&query, &PageRequest::of_size(2).unwrap()).await.unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(err.context.attribute.as_deref(), Some("title"));
    }

    #[tokio::test]
    async fn test_max_size() {
        let engine = engine().with_max_size(3);
        let err = engine.find_page(&by_year(), &PageRequest::of_size(4).unwrap()).await.unwrap_err();
        assert!(err.is_unsupported());
    }

    #[tokio::test]
    async fn test_count() {
        let restriction = Attribute::new("year").less_than(1965).unwrap();
        assert_eq!(engine().count(&restriction).await.unwrap(), 2);
        assert_eq!(engine().count(&restriction.negate()).await.unwrap(), 3);
    }

    #[test]
    fn test_function_evaluation() {
        let long_titles = Restriction::on_expression(
            Expression::length(Expression::attribute("title")),
            Constraint::greater_than(8).unwrap(),
        );
        let found: Vec<_> = engine()
            .filter(&long_titles)
            .unwrap()
            .into_iter()
            .filter_map(|r| r.attribute("title"))
            .collect();
        assert_eq!(found, vec![Value::from("Neuromancer"), Value::from("Foundation")]);

        let decade = Restriction::on_expression(
            Expression::minus(Expression::attribute("year"), Expression::literal(1900)),
            Constraint::between(60, 69).unwrap(),
        );
        assert_eq!(engine().filter(&decade).unwrap().len(), 2);
    }

    #[test]
    fn test_null_handling() {
        let mut engine = engine();
        engine.insert(IndexMap::from([("title".to_string(), Value::from("Untitled"))]));

        let year = Attribute::new("year");
        assert_eq!(engine.filter(&year.is_null()).unwrap().len(), 1);
        assert_eq!(engine.filter(&year.equal_to(1965).unwrap()).unwrap().len(), 1);
        assert_eq!(engine.filter(&year.not_equal_to(1965).unwrap()).unwrap().len(), 5);

        let page = engine
            .execute(&by_year(), &PageRequest::of_size(1).unwrap(), false)
            .unwrap();
        assert_eq!(titles(&page), vec!["Untitled"]);
    }

    #[test]
    fn test_ignore_case_sort_and_match() {
        let engine = MemoryEngine::new([book("beta", 1), book("Alpha", 2), book("alpha", 3)]);
        let query = Query::new().sorted_by([Sort::asc_ignore_case("title"), Sort::desc("year")]);
        let page = engine.execute(&query, &PageRequest::of_size(3).unwrap(), false).unwrap();
        assert_eq!(titles(&page), vec!["alpha", "Alpha", "beta"]);

        let title = Attribute::new("title");
        assert_eq!(engine.filter(&title.equal_to_ignore_case("ALPHA").unwrap()).unwrap().len(), 2);
        assert_eq!(engine.filter(&title.equal_to("ALPHA").unwrap()).unwrap().len(), 0);
    }

    #[test]
    fn test_division_by_zero() {
        let restriction = Restriction::on_expression(
            Expression::divide(Expression::attribute("year"), Expression::literal(0)),
            Constraint::greater_than(1).unwrap(),
        );
        assert!(engine().filter(&restriction).unwrap_err().is_argument_error());
    }
}
