//! Single-attribute predicate shapes and their complements.
//!
//! Every [`Constraint`] variant is paired with exactly one complement.
//! [`Constraint::negate`] swaps a constraint for its partner while keeping
//! the operands, without looking at any data:
//!
//! ```rust
//! use sift_query::{Constraint, ConstraintKind};
//!
//! let c = Constraint::at_least(18)?;
//! assert_eq!(c.negate(), Constraint::less_than(18)?);
//! assert_eq!(c.negate().negate(), c);
//! assert_eq!(ConstraintKind::AtLeast.complement(), ConstraintKind::LessThan);
//! # Ok::<(), sift_query::QueryError>(())
//! ```
//!
//! Factories reject the null literal; use [`Constraint::is_null`] instead:
//!
//! ```rust
//! use sift_query::{Constraint, Value};
//!
//! let err = Constraint::equal_to(Value::Null).unwrap_err();
//! assert!(err.is_argument_error());
//! ```

use std::fmt;

use crate::error::{QueryError, QueryResult};
use crate::expression::Expression;
use crate::pattern::Pattern;

/// The shape of a constraint, without operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `= value`
    EqualTo,
    /// `<> value`
    NotEqualTo,
    /// `> bound`
    GreaterThan,
    /// `<= bound`
    AtMost,
    /// `< bound`
    LessThan,
    /// `>= bound`
    AtLeast,
    /// `BETWEEN lower AND upper`
    Between,
    /// `NOT BETWEEN lower AND upper`
    NotBetween,
    /// `IN (values)`
    In,
    /// `NOT IN (values)`
    NotIn,
    /// `LIKE pattern`
    Like,
    /// `NOT LIKE pattern`
    NotLike,
    /// `IS NULL`
    Null,
    /// `IS NOT NULL`
    NotNull,
}

impl ConstraintKind {
    /// The complementary kind.
    pub const fn complement(self) -> Self {
        match self {
            Self::EqualTo => Self::NotEqualTo,
            Self::NotEqualTo => Self::EqualTo,
            Self::GreaterThan => Self::AtMost,
            Self::AtMost => Self::GreaterThan,
            Self::LessThan => Self::AtLeast,
            Self::AtLeast => Self::LessThan,
            Self::Between => Self::NotBetween,
            Self::NotBetween => Self::Between,
            Self::In => Self::NotIn,
            Self::NotIn => Self::In,
            Self::Like => Self::NotLike,
            Self::NotLike => Self::Like,
            Self::Null => Self::NotNull,
            Self::NotNull => Self::Null,
        }
    }

    /// Whether this kind is the negative member of its pair.
    pub const fn is_negative(self) -> bool {
        matches!(
            self,
            Self::NotEqualTo
                | Self::AtMost
                | Self::AtLeast
                | Self::NotBetween
                | Self::NotIn
                | Self::NotLike
                | Self::NotNull
        )
    }

    /// The SQL-style operator.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::EqualTo => "=",
            Self::NotEqualTo => "<>",
            Self::GreaterThan => ">",
            Self::AtMost => "<=",
            Self::LessThan => "<",
            Self::AtLeast => ">=",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Null => "IS NULL",
            Self::NotNull => "IS NOT NULL",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A predicate on one attribute (or expression).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// Equal to a value.
    EqualTo {
        /// The comparand.
        value: Expression,
        /// Whether text comparison is case-sensitive.
        case_sensitive: bool,
    },
    /// Not equal to a value.
    NotEqualTo {
        /// The comparand.
        value: Expression,
        /// Whether text comparison is case-sensitive.
        case_sensitive: bool,
    },
    /// Strictly greater than a bound.
    GreaterThan(Expression),
    /// Less than or equal to a bound.
    AtMost(Expression),
    /// Strictly less than a bound.
    LessThan(Expression),
    /// Greater than or equal to a bound.
    AtLeast(Expression),
    /// Within an inclusive range.
    Between {
        /// Inclusive lower bound.
        lower: Expression,
        /// Inclusive upper bound.
        upper: Expression,
    },
    /// Outside an inclusive range.
    NotBetween {
        /// Inclusive lower bound.
        lower: Expression,
        /// Inclusive upper bound.
        upper: Expression,
    },
    /// One of a set of values.
    In(Vec<Expression>),
    /// None of a set of values.
    NotIn(Vec<Expression>),
    /// Matches a pattern.
    Like {
        /// The pattern.
        pattern: Pattern,
        /// Whether matching is case-sensitive.
        case_sensitive: bool,
    },
    /// Does not match a pattern.
    NotLike {
        /// The pattern.
        pattern: Pattern,
        /// Whether matching is case-sensitive.
        case_sensitive: bool,
    },
    /// Is null.
    Null,
    /// Is not null.
    NotNull,
}

fn required(value: impl Into<Expression>, what: &str) -> QueryResult<Expression> {
    let value = value.into();
    if value.is_null_literal() {
        return Err(QueryError::argument_required(what)
            .with_suggestion("Use is_null() or not_null() to test for null"));
    }
    Ok(value)
}

fn required_set<I, V>(values: I) -> QueryResult<Vec<Expression>>
where
    I: IntoIterator<Item = V>,
    V: Into<Expression>,
{
    let values = values
        .into_iter()
        .map(|v| required(v, "set element"))
        .collect::<QueryResult<Vec<_>>>()?;
    if values.is_empty() {
        return Err(QueryError::argument_required("at least one value"));
    }
    Ok(values)
}

impl Constraint {
    /// `= value`
    pub fn equal_to(value: impl Into<Expression>) -> QueryResult<Self> {
        Ok(Self::EqualTo {
            value: required(value, "value")?,
            case_sensitive: true,
        })
    }

    /// `<> value`
    pub fn not_equal_to(value: impl Into<Expression>) -> QueryResult<Self> {
        Ok(Self::NotEqualTo {
            value: required(value, "value")?,
            case_sensitive: true,
        })
    }

    /// `> bound`
    pub fn greater_than(bound: impl Into<Expression>) -> QueryResult<Self> {
        Ok(Self::GreaterThan(required(bound, "bound")?))
    }

    /// `< bound`
    pub fn less_than(bound: impl Into<Expression>) -> QueryResult<Self> {
        Ok(Self::LessThan(required(bound, "bound")?))
    }

    /// `>= bound`
    pub fn at_least(bound: impl Into<Expression>) -> QueryResult<Self> {
        Ok(Self::AtLeast(required(bound, "bound")?))
    }

    /// `<= bound`
    pub fn at_most(bound: impl Into<Expression>) -> QueryResult<Self> {
        Ok(Self::AtMost(required(bound, "bound")?))
    }

    /// `BETWEEN lower AND upper`, both inclusive.
    pub fn between(
        lower: impl Into<Expression>,
        upper: impl Into<Expression>,
    ) -> QueryResult<Self> {
        Ok(Self::Between {
            lower: required(lower, "lower bound")?,
            upper: required(upper, "upper bound")?,
        })
    }

    /// `NOT BETWEEN lower AND upper`
    pub fn not_between(
        lower: impl Into<Expression>,
        upper: impl Into<Expression>,
    ) -> QueryResult<Self> {
        Ok(Self::NotBetween {
            lower: required(lower, "lower bound")?,
            upper: required(upper, "upper bound")?,
        })
    }

    /// `IN (values)`; the set must be non-empty.
    pub fn is_in<I, V>(values: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Expression>,
    {
        Ok(Self::In(required_set(values)?))
    }

    /// `NOT IN (values)`; the set must be non-empty.
    pub fn not_in<I, V>(values: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Expression>,
    {
        Ok(Self::NotIn(required_set(values)?))
    }

    /// `LIKE pattern`
    pub fn like(pattern: Pattern) -> QueryResult<Self> {
        Ok(Self::Like {
            pattern: checked_pattern(pattern)?,
            case_sensitive: true,
        })
    }

    /// `NOT LIKE pattern`
    pub fn not_like(pattern: Pattern) -> QueryResult<Self> {
        Ok(Self::NotLike {
            pattern: checked_pattern(pattern)?,
            case_sensitive: true,
        })
    }

    /// `IS NULL`
    pub fn is_null() -> Self {
        Self::Null
    }

    /// `IS NOT NULL`
    pub fn not_null() -> Self {
        Self::NotNull
    }

    /// The shape of this constraint.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::EqualTo { .. } => ConstraintKind::EqualTo,
            Self::NotEqualTo { .. } => ConstraintKind::NotEqualTo,
            Self::GreaterThan(_) => ConstraintKind::GreaterThan,
            Self::AtMost(_) => ConstraintKind::AtMost,
            Self::LessThan(_) => ConstraintKind::LessThan,
            Self::AtLeast(_) => ConstraintKind::AtLeast,
            Self::Between { .. } => ConstraintKind::Between,
            Self::NotBetween { .. } => ConstraintKind::NotBetween,
            Self::In(_) => ConstraintKind::In,
            Self::NotIn(_) => ConstraintKind::NotIn,
            Self::Like { .. } => ConstraintKind::Like,
            Self::NotLike { .. } => ConstraintKind::NotLike,
            Self::Null => ConstraintKind::Null,
            Self::NotNull => ConstraintKind::NotNull,
        }
    }

    /// The logical complement, carrying the same operands.
    pub fn negate(&self) -> Self {
        match self {
            Self::EqualTo {
                value,
                case_sensitive,
            } => Self::NotEqualTo {
                value: value.clone(),
                case_sensitive: *case_sensitive,
            },
            Self::NotEqualTo {
                value,
                case_sensitive,
            } => Self::EqualTo {
                value: value.clone(),
                case_sensitive: *case_sensitive,
            },
            Self::GreaterThan(bound) => Self::AtMost(bound.clone()),
            Self::AtMost(bound) => Self::GreaterThan(bound.clone()),
            Self::LessThan(bound) => Self::AtLeast(bound.clone()),
            Self::AtLeast(bound) => Self::LessThan(bound.clone()),
            Self::Between { lower, upper } => Self::NotBetween {
                lower: lower.clone(),
                upper: upper.clone(),
            },
            Self::NotBetween { lower, upper } => Self::Between {
                lower: lower.clone(),
                upper: upper.clone(),
            },
            Self::In(values) => Self::NotIn(values.clone()),
            Self::NotIn(values) => Self::In(values.clone()),
            Self::Like {
                pattern,
                case_sensitive,
            } => Self::NotLike {
                pattern: pattern.clone(),
                case_sensitive: *case_sensitive,
            },
            Self::NotLike {
                pattern,
                case_sensitive,
            } => Self::Like {
                pattern: pattern.clone(),
                case_sensitive: *case_sensitive,
            },
            Self::Null => Self::NotNull,
            Self::NotNull => Self::Null,
        }
    }

    /// A sibling that compares text case-insensitively.
    ///
    /// Only equality and pattern constraints carry case sensitivity; other
    /// constraints are returned unchanged.
    pub fn ignore_case(self) -> Self {
        match self {
            Self::EqualTo { value, .. } => Self::EqualTo {
                value,
                case_sensitive: false,
            },
            Self::NotEqualTo { value, .. } => Self::NotEqualTo {
                value,
                case_sensitive: false,
            },
            Self::Like { pattern, .. } => Self::Like {
                pattern,
                case_sensitive: false,
            },
            Self::NotLike { pattern, .. } => Self::NotLike {
                pattern,
                case_sensitive: false,
            },
            other => other,
        }
    }

    /// Whether text comparison is case-sensitive.
    pub fn is_case_sensitive(&self) -> bool {
        match self {
            Self::EqualTo { case_sensitive, .. }
            | Self::NotEqualTo { case_sensitive, .. }
            | Self::Like { case_sensitive, .. }
            | Self::NotLike { case_sensitive, .. } => *case_sensitive,
            _ => true,
        }
    }
}

fn checked_pattern(pattern: Pattern) -> QueryResult<Pattern> {
    if pattern.pattern_expression().is_null_literal() {
        return Err(QueryError::argument_required("pattern"));
    }
    Ok(pattern)
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            Self::EqualTo { value, .. }
            | Self::NotEqualTo { value, .. }
            | Self::GreaterThan(value)
            | Self::AtMost(value)
            | Self::LessThan(value)
            | Self::AtLeast(value) => write!(f, "{} {}", kind, value)?,
            Self::Between { lower, upper } | Self::NotBetween { lower, upper } => {
                write!(f, "{} {} AND {}", kind, lower, upper)?
            }
            Self::In(values) | Self::NotIn(values) => {
                write!(f, "{} (", kind)?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str(")")?
            }
            Self::Like { pattern, .. } | Self::NotLike { pattern, .. } => {
                write!(f, "{} {}", kind, pattern)?
            }
            Self::Null | Self::NotNull => f.write_str(kind.as_sql())?,
        }
        if !self.is_case_sensitive() {
            f.write_str(" IGNORE CASE")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn all_constraints() -> Vec<Constraint> {
        vec![
            Constraint::equal_to("a").unwrap(),
            Constraint::not_equal_to("a").unwrap().ignore_case(),
            Constraint::greater_than(1).unwrap(),
            Constraint::at_most(1).unwrap(),
            Constraint::less_than(1).unwrap(),
            Constraint::at_least(1).unwrap(),
            Constraint::between(1, 5).unwrap(),
            Constraint::not_between(1, 5).unwrap(),
            Constraint::is_in([1, 2, 3]).unwrap(),
            Constraint::not_in(["x", "y"]).unwrap(),
            Constraint::like(Pattern::prefix("Ru")).unwrap(),
            Constraint::not_like(Pattern::suffix("st")).unwrap(),
            Constraint::is_null(),
            Constraint::not_null(),
        ]
    }

    #[test]
    fn test_negation_is_an_involution() {
        for c in all_constraints() {
            assert_eq!(c.negate().negate(), c);
        }
    }

    #[test]
    fn test_negation_follows_complement_table() {
        for c in all_constraints() {
            let negated = c.negate();
            assert_eq!(negated.kind(), c.kind().complement());
            assert_ne!(negated.kind().is_negative(), c.kind().is_negative());
        }
    }

    #[test]
    fn test_bound_complements() {
        assert_eq!(
            Constraint::at_least(10).unwrap().negate(),
            Constraint::less_than(10).unwrap()
        );
        assert_eq!(
            Constraint::at_most(10).unwrap().negate(),
            Constraint::greater_than(10).unwrap()
        );
    }

    #[test]
    fn test_negation_keeps_case_sensitivity() {
        let c = Constraint::equal_to("Rust").unwrap().ignore_case();
        assert!(!c.negate().is_case_sensitive());
    }

    #[test]
    fn test_null_values_are_rejected() {
        assert!(Constraint::equal_to(Value::Null).unwrap_err().is_argument_error());
        assert!(Constraint::between(1, Value::Null).is_err());
        assert!(Constraint::is_in([Value::Int(1), Value::Null]).is_err());
        assert!(Constraint::like(Pattern::expression(Value::Null.into(), None)).is_err());
    }

    #[test]
    fn test_empty_set_is_rejected() {
        let err = Constraint::is_in(Vec::<i64>::new()).unwrap_err();
        assert!(err.is_argument_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(Constraint::between(1, 5).unwrap().to_string(), "BETWEEN 1 AND 5");
        assert_eq!(Constraint::is_in([1, 2]).unwrap().to_string(), "IN (1, 2)");
        assert_eq!(
            Constraint::equal_to("a").unwrap().ignore_case().to_string(),
            "= 'a' IGNORE CASE"
        );
        assert_eq!(Constraint::not_null().to_string(), "IS NOT NULL");
    }
}
