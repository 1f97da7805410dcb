//! Attribute handles with fluent restriction and sort builders.
//!
//! ```rust
//! use sift_query::Attribute;
//!
//! let title = Attribute::new("title");
//! let restriction = title.starts_with("Rust").and(Attribute::new("pages").at_least(100)?);
//!
//! assert_eq!(
//!     restriction.to_string(),
//!     "(title LIKE 'Rust%' ESCAPE '\\' AND pages >= 100)"
//! );
//! assert_eq!(title.desc().to_string(), "title DESC");
//! # Ok::<(), sift_query::QueryError>(())
//! ```

use smol_str::SmolStr;

use crate::constraint::Constraint;
use crate::error::QueryResult;
use crate::expression::{AttributePath, Expression};
use crate::pattern::Pattern;
use crate::restriction::Restriction;
use crate::sort::Sort;

/// A named attribute of the queried entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    path: AttributePath,
}

impl Attribute {
    /// An attribute handle.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            path: AttributePath::new(name),
        }
    }

    /// An attribute handle qualified by entity type.
    pub fn of(entity: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self {
            path: AttributePath::of(entity, name),
        }
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// This attribute as an expression.
    pub fn expression(&self) -> Expression {
        Expression::Attribute(self.path.clone())
    }

    /// Restrict this attribute with `constraint`.
    pub fn satisfies(&self, constraint: Constraint) -> Restriction {
        Restriction::on_expression(self.expression(), constraint)
    }

    /// `attribute = value`
    pub fn equal_to(&self, value: impl Into<Expression>) -> QueryResult<Restriction> {
        Ok(self.satisfies(Constraint::equal_to(value)?))
    }

    /// `attribute = value`, ignoring case.
    pub fn equal_to_ignore_case(&self, value: impl Into<Expression>) -> QueryResult<Restriction> {
        Ok(self.satisfies(Constraint::equal_to(value)?.ignore_case()))
    }

    /// `attribute <> value`
    pub fn not_equal_to(&self, value: impl Into<Expression>) -> QueryResult<Restriction> {
        Ok(self.satisfies(Constraint::not_equal_to(value)?))
    }

    /// `attribute > bound`
    pub fn greater_than(&self, bound: impl Into<Expression>) -> QueryResult<Restriction> {
        Ok(self.satisfies(Constraint::greater_than(bound)?))
    }

    /// `attribute < bound`
    pub fn less_than(&self, bound: impl Into<Expression>) -> QueryResult<Restriction> {
        Ok(self.satisfies(Constraint::less_than(bound)?))
    }

    /// `attribute >= bound`
    pub fn at_least(&self, bound: impl Into<Expression>) -> QueryResult<Restriction> {
        Ok(self.satisfies(Constraint::at_least(bound)?))
    }

    /// `attribute <= bound`
    pub fn at_most(&self, bound: impl Into<Expression>) -> QueryResult<Restriction> {
        Ok(self.satisfies(Constraint::at_most(bound)?))
    }

    /// `attribute BETWEEN lower AND upper`
    pub fn between(
        &self,
        lower: impl Into<Expression>,
        upper: impl Into<Expression>,
    ) -> QueryResult<Restriction> {
        Ok(self.satisfies(Constraint::between(lower, upper)?))
    }

    /// `attribute IN (values)`
    pub fn is_in<I, V>(&self, values: I) -> QueryResult<Restriction>
    where
        I: IntoIterator<Item = V>,
        V: Into<Expression>,
    {
        Ok(self.satisfies(Constraint::is_in(values)?))
    }

    /// `attribute NOT IN (values)`
    pub fn not_in<I, V>(&self, values: I) -> QueryResult<Restriction>
    where
        I: IntoIterator<Item = V>,
        V: Into<Expression>,
    {
        Ok(self.satisfies(Constraint::not_in(values)?))
    }

    /// `attribute LIKE pattern`
    pub fn like(&self, pattern: Pattern) -> QueryResult<Restriction> {
        Ok(self.satisfies(Constraint::like(pattern)?))
    }

    /// `attribute NOT LIKE pattern`
    pub fn not_like(&self, pattern: Pattern) -> QueryResult<Restriction> {
        Ok(self.satisfies(Constraint::not_like(pattern)?))
    }

    /// Text starting with the literal `prefix`.
    pub fn starts_with(&self, prefix: &str) -> Restriction {
        self.pattern_restriction(Pattern::prefix(prefix))
    }

    /// Text ending with the literal `suffix`.
    pub fn ends_with(&self, suffix: &str) -> Restriction {
        self.pattern_restriction(Pattern::suffix(suffix))
    }

    /// Text containing the literal `substring`.
    pub fn contains(&self, substring: &str) -> Restriction {
        self.pattern_restriction(Pattern::substring(substring))
    }

    fn pattern_restriction(&self, pattern: Pattern) -> Restriction {
        self.satisfies(Constraint::Like {
            pattern,
            case_sensitive: true,
        })
    }

    /// `attribute IS NULL`
    pub fn is_null(&self) -> Restriction {
        self.satisfies(Constraint::is_null())
    }

    /// `attribute IS NOT NULL`
    pub fn not_null(&self) -> Restriction {
        self.satisfies(Constraint::not_null())
    }

    /// Ascending sort on this attribute.
    pub fn asc(&self) -> Sort {
        Sort::asc(self.name())
    }

    /// Descending sort on this attribute.
    pub fn desc(&self) -> Sort {
        Sort::desc(self.name())
    }

    /// Ascending, case-insensitive sort on this attribute.
    pub fn asc_ignore_case(&self) -> Sort {
        Sort::asc_ignore_case(self.name())
    }

    /// Descending, case-insensitive sort on this attribute.
    pub fn desc_ignore_case(&self) -> Sort {
        Sort::desc_ignore_case(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintKind;
    use crate::value::Value;

    #[test]
    fn test_fluent_restrictions() {
        let age = Attribute::new("age");
        let r = age.between(18, 65).unwrap();
        match r {
            Restriction::Basic(basic) => {
                assert_eq!(basic.attribute(), Some("age"));
                assert_eq!(basic.constraint().kind(), ConstraintKind::Between);
            }
            _ => panic!("expected basic restriction"),
        }
    }

    #[test]
    fn test_null_argument_is_rejected() {
        assert!(Attribute::new("name").equal_to(Value::Null).unwrap_err().is_argument_error());
    }

    #[test]
    fn test_contains_escapes_literal() {
        let r = Attribute::new("code").contains("10%");
        assert_eq!(r.to_string(), "code LIKE '%10\\%%' ESCAPE '\\'");
    }

    #[test]
    fn test_qualified_attribute() {
        let r = Attribute::of("Book", "title").is_null();
        assert_eq!(r.to_string(), "Book.title IS NULL");
    }

    #[test]
    fn test_ignore_case_equality() {
        let r = Attribute::new("title").equal_to_ignore_case("rust").unwrap();
        assert_eq!(r.to_string(), "title = 'rust' IGNORE CASE");
    }
}
