//! Sort criteria and their precedence.
//!
//! An [`Order`] is an immutable list of [`Sort`] criteria, highest
//! precedence first. Static criteria declared with a query always outrank
//! the dynamic criteria supplied per call:
//!
//! ```rust
//! use sift_query::{Order, Sort};
//!
//! let fixed = [Sort::asc("a")];
//! let dynamic = Order::by([Sort::desc("b"), Sort::asc("c")]);
//!
//! let effective = Order::merge(&fixed, &dynamic);
//! assert_eq!(effective.to_string(), "a ASC, b DESC, c ASC");
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl SortOrder {
    /// Get the SQL keyword for this sort order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Asc
    }
}

/// One sort criterion: attribute, direction and case handling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    property: SmolStr,
    direction: SortOrder,
    #[serde(default)]
    ignore_case: bool,
}

impl Sort {
    /// Create a new sort criterion.
    pub fn of(property: impl Into<SmolStr>, direction: SortOrder, ignore_case: bool) -> Self {
        Self {
            property: property.into(),
            direction,
            ignore_case,
        }
    }

    /// Ascending, case-sensitive.
    pub fn asc(property: impl Into<SmolStr>) -> Self {
        Self::of(property, SortOrder::Asc, false)
    }

    /// Descending, case-sensitive.
    pub fn desc(property: impl Into<SmolStr>) -> Self {
        Self::of(property, SortOrder::Desc, false)
    }

    /// Ascending, ignoring case.
    pub fn asc_ignore_case(property: impl Into<SmolStr>) -> Self {
        Self::of(property, SortOrder::Asc, true)
    }

    /// Descending, ignoring case.
    pub fn desc_ignore_case(property: impl Into<SmolStr>) -> Self {
        Self::of(property, SortOrder::Desc, true)
    }

    /// The sorted attribute.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The direction.
    pub fn direction(&self) -> SortOrder {
        self.direction
    }

    /// Whether this criterion sorts ascending.
    pub fn is_ascending(&self) -> bool {
        self.direction == SortOrder::Asc
    }

    /// Whether text is compared case-insensitively.
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// The same criterion in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            property: self.property.clone(),
            direction: self.direction.reversed(),
            ignore_case: self.ignore_case,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.property, self.direction)?;
        if self.ignore_case {
            f.write_str(" IGNORE CASE")?;
        }
        Ok(())
    }
}

/// An ordered list of sort criteria, highest precedence first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order {
    sorts: Box<[Sort]>,
}

impl Order {
    /// No ordering.
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Order by the given criteria, in precedence order.
    pub fn by(sorts: impl IntoIterator<Item = Sort>) -> Self {
        Self {
            sorts: sorts.into_iter().collect(),
        }
    }

    /// The effective order: every static criterion, then every dynamic one.
    ///
    /// This is concatenation; duplicates are passed through untouched.
    pub fn merge(static_sorts: &[Sort], dynamic: &Order) -> Self {
        Self {
            sorts: static_sorts.iter().chain(dynamic.iter()).cloned().collect(),
        }
    }

    /// A sibling with `sort` appended at the lowest precedence.
    pub fn then(&self, sort: Sort) -> Self {
        Self {
            sorts: self.sorts.iter().cloned().chain([sort]).collect(),
        }
    }

    /// The same criteria with every direction reversed.
    pub fn reversed(&self) -> Self {
        Self {
            sorts: self.sorts.iter().map(Sort::reversed).collect(),
        }
    }

    /// The criteria, highest precedence first.
    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    /// Iterate over the criteria in precedence order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sort> {
        self.sorts.iter()
    }

    /// Number of criteria.
    pub fn len(&self) -> usize {
        self.sorts.len()
    }

    /// Whether the order is empty.
    pub fn is_empty(&self) -> bool {
        self.sorts.is_empty()
    }
}

impl From<Sort> for Order {
    fn from(sort: Sort) -> Self {
        Self::by([sort])
    }
}

impl From<Vec<Sort>> for Order {
    fn from(sorts: Vec<Sort>) -> Self {
        Self {
            sorts: sorts.into_boxed_slice(),
        }
    }
}

impl<'a> IntoIterator for &'a Order {
    type Item = &'a Sort;
    type IntoIter = std::slice::Iter<'a, Sort>;

    fn into_iter(self) -> Self::IntoIter {
        self.sorts.iter()
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sort) in self.sorts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", sort)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_is_concatenation() {
        let effective = Order::merge(
            &[Sort::asc("a")],
            &Order::by([Sort::desc("b"), Sort::asc("c")]),
        );
        assert_eq!(
            effective.sorts(),
            &[Sort::asc("a"), Sort::desc("b"), Sort::asc("c")]
        );
    }

    #[test]
    fn test_merge_keeps_duplicates() {
        let effective = Order::merge(&[Sort::asc("id")], &Order::by([Sort::desc("id")]));
        assert_eq!(effective.len(), 2);
        assert_eq!(effective.sorts()[0], Sort::asc("id"));
        assert_eq!(effective.sorts()[1], Sort::desc("id"));
    }

    #[test]
    fn test_merge_with_empty_sides() {
        let fixed = [Sort::asc("a")];
        assert_eq!(Order::merge(&fixed, &Order::unsorted()).sorts(), &fixed);
        assert!(Order::merge(&[], &Order::unsorted()).is_empty());
    }

    #[test]
    fn test_then_returns_sibling() {
        let base = Order::by([Sort::asc("a")]);
        let extended = base.then(Sort::desc("b"));
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
    }

    #[test]
    fn test_reversed() {
        let order = Order::by([Sort::asc("a"), Sort::desc_ignore_case("b")]);
        assert_eq!(order.reversed().to_string(), "a DESC, b ASC IGNORE CASE");
    }

    #[test]
    fn test_serde() {
        let order = Order::by([Sort::asc("title"), Sort::desc_ignore_case("author")]);
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.starts_with('['));
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }
}
