//! A query definition handed to the engine together with a page request.

use std::fmt;

use crate::restriction::Restriction;
use crate::sort::{Order, Sort};

/// Which records to select and how to order them.
///
/// Static sort criteria belong to the query definition and always take
/// precedence over the dynamic criteria supplied per call.
///
/// ```rust
/// use sift_query::{Order, Query, Sort};
///
/// let query = Query::new()
///     .static_sort([Sort::asc("a")])
///     .order_by(Order::by([Sort::desc("b"), Sort::asc("c")]));
///
/// assert_eq!(query.effective_order().to_string(), "a ASC, b DESC, c ASC");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Query {
    restriction: Restriction,
    static_sorts: Box<[Sort]>,
    dynamic: Order,
}

impl Query {
    /// An unrestricted, unordered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the restriction.
    pub fn where_(mut self, restriction: Restriction) -> Self {
        self.restriction = restriction;
        self
    }

    /// Set the statically declared sort criteria.
    pub fn static_sort(mut self, sorts: impl IntoIterator<Item = Sort>) -> Self {
        self.static_sorts = sorts.into_iter().collect();
        self
    }

    /// Set the dynamic order, used verbatim after the static criteria.
    pub fn order_by(mut self, order: impl Into<Order>) -> Self {
        self.dynamic = order.into();
        self
    }

    /// Set the dynamic order from loose sort criteria.
    pub fn sorted_by(self, sorts: impl IntoIterator<Item = Sort>) -> Self {
        self.order_by(Order::by(sorts))
    }

    /// The restriction.
    pub fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    /// The statically declared criteria.
    pub fn static_sorts(&self) -> &[Sort] {
        &self.static_sorts
    }

    /// The dynamic order.
    pub fn dynamic_order(&self) -> &Order {
        &self.dynamic
    }

    /// Static criteria followed by dynamic ones.
    pub fn effective_order(&self) -> Order {
        Order::merge(&self.static_sorts, &self.dynamic)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WHERE {}", self.restriction)?;
        let order = self.effective_order();
        if !order.is_empty() {
            write!(f, " ORDER BY {}", order)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;

    #[test]
    fn test_default_is_unrestricted_and_unordered() {
        let query = Query::new();
        assert!(query.restriction().is_unrestricted());
        assert!(query.effective_order().is_empty());
        assert_eq!(query.to_string(), "WHERE TRUE");
    }

    #[test]
    fn test_static_sorts_outrank_dynamic() {
        let query = Query::new()
            .sorted_by([Sort::desc("b")])
            .static_sort([Sort::asc("a")]);
        let order = query.effective_order();
        assert_eq!(order.sorts()[0], Sort::asc("a"));
        assert_eq!(order.sorts()[1], Sort::desc("b"));
    }

    #[test]
    fn test_display() {
        let query = Query::new()
            .where_(Restriction::on("age", Constraint::at_least(18).unwrap()))
            .sorted_by([Sort::asc("name")]);
        assert_eq!(query.to_string(), "WHERE age >= 18 ORDER BY name ASC");
    }
}
