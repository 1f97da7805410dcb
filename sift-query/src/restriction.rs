//! Restriction trees: constraints bound to attributes, composed with ALL/ANY.
//!
//! ```rust
//! use sift_query::{Constraint, Pattern, Restriction};
//!
//! let adult = Restriction::on("age", Constraint::at_least(18)?);
//! let named = Restriction::on("name", Constraint::like(Pattern::prefix("A"))?);
//! let both = Restriction::all([adult, named])?;
//!
//! assert_eq!(both.to_string(), "(age >= 18 AND name LIKE 'A%' ESCAPE '\\')");
//! assert_eq!(both.negate().to_string(), "NOT (age >= 18 AND name LIKE 'A%' ESCAPE '\\')");
//! # Ok::<(), sift_query::QueryError>(())
//! ```
//!
//! # Negation
//!
//! Negating a basic restriction swaps its constraint for the complement.
//! Negating a composite only flips its `negated` flag, which consumers read
//! as `NOT (child1 OP child2 ...)`; children are shared, not rewritten.
//! [`Restriction::push_down_negation`] is available when a consumer needs
//! negation normal form.

use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;

use crate::constraint::Constraint;
use crate::error::{QueryError, QueryResult};
use crate::expression::{AttributePath, Expression};

/// How a composite restriction combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Every child must hold (conjunction).
    All,
    /// At least one child must hold (disjunction).
    Any,
}

impl Operator {
    /// The dual operator under De Morgan's laws.
    pub const fn dual(self) -> Self {
        match self {
            Self::All => Self::Any,
            Self::Any => Self::All,
        }
    }

    /// The SQL keyword joining children.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::All => "AND",
            Self::Any => "OR",
        }
    }
}

/// A constraint applied to one expression, usually an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasicRestriction {
    expression: Expression,
    constraint: Constraint,
}

impl BasicRestriction {
    /// The restricted expression.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// The attribute name, when the expression is a plain attribute.
    pub fn attribute(&self) -> Option<&str> {
        self.expression.attribute_name()
    }

    /// The constraint.
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    fn negate(&self) -> Self {
        Self {
            expression: self.expression.clone(),
            constraint: self.constraint.negate(),
        }
    }
}

/// ALL/ANY over a non-empty list of children, with an outer negation flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeRestriction {
    operator: Operator,
    children: Arc<[Restriction]>,
    negated: bool,
}

impl CompositeRestriction {
    /// The combining operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The children, in order.
    pub fn children(&self) -> &[Restriction] {
        &self.children
    }

    /// Whether the whole group is negated.
    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

/// A composable boolean predicate tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Restriction {
    /// Matches everything, or nothing when negated.
    Unrestricted {
        /// Whether the sentinel is negated.
        negated: bool,
    },
    /// A single constraint.
    Basic(BasicRestriction),
    /// A group of restrictions.
    Composite(CompositeRestriction),
}

impl Default for Restriction {
    fn default() -> Self {
        Self::unrestricted()
    }
}

impl Restriction {
    /// The sentinel that matches every record.
    pub fn unrestricted() -> Self {
        Self::Unrestricted { negated: false }
    }

    /// Restrict a named attribute.
    pub fn on(attribute: impl Into<SmolStr>, constraint: Constraint) -> Self {
        Self::on_expression(AttributePath::new(attribute).into(), constraint)
    }

    /// Restrict a derived expression such as `LENGTH(title)`.
    pub fn on_expression(expression: Expression, constraint: Constraint) -> Self {
        Self::Basic(BasicRestriction {
            expression,
            constraint,
        })
    }

    /// All of `children` must hold.
    pub fn all(children: impl IntoIterator<Item = Restriction>) -> QueryResult<Self> {
        Self::composite(Operator::All, children)
    }

    /// Any of `children` must hold.
    pub fn any(children: impl IntoIterator<Item = Restriction>) -> QueryResult<Self> {
        Self::composite(Operator::Any, children)
    }

    fn composite(
        operator: Operator,
        children: impl IntoIterator<Item = Restriction>,
    ) -> QueryResult<Self> {
        let children: Arc<[Restriction]> = children.into_iter().collect();
        if children.is_empty() {
            return Err(QueryError::argument_required("at least one restriction")
                .with_context(format!("Building {} group", operator.as_sql())));
        }
        Ok(Self::Composite(CompositeRestriction {
            operator,
            children,
            negated: false,
        }))
    }

    /// The negation of `restriction`.
    pub fn not(restriction: &Restriction) -> Self {
        restriction.negate()
    }

    /// The logical negation of this restriction.
    ///
    /// Basic nodes swap to the complementary constraint; composite nodes and
    /// the unrestricted sentinel flip their flag and share their children.
    pub fn negate(&self) -> Self {
        match self {
            Self::Unrestricted { negated } => Self::Unrestricted { negated: !negated },
            Self::Basic(basic) => Self::Basic(basic.negate()),
            Self::Composite(composite) => Self::Composite(CompositeRestriction {
                operator: composite.operator,
                children: Arc::clone(&composite.children),
                negated: !composite.negated,
            }),
        }
    }

    /// Conjunction with `other`, extending an un-negated ALL group in place.
    pub fn and(self, other: Restriction) -> Self {
        self.join(Operator::All, other)
    }

    /// Disjunction with `other`, extending an un-negated ANY group in place.
    pub fn or(self, other: Restriction) -> Self {
        self.join(Operator::Any, other)
    }

    fn join(self, operator: Operator, other: Restriction) -> Self {
        let children: Vec<Restriction> = match self {
            Self::Composite(composite)
                if composite.operator == operator && !composite.negated =>
            {
                let mut children = composite.children.to_vec();
                children.push(other);
                children
            }
            this => vec![this, other],
        };
        Self::Composite(CompositeRestriction {
            operator,
            children: children.into(),
            negated: false,
        })
    }

    /// Whether this node carries an outer negation.
    ///
    /// Basic nodes express negation through their constraint and always
    /// report `false`.
    pub fn is_negated(&self) -> bool {
        match self {
            Self::Unrestricted { negated } => *negated,
            Self::Basic(_) => false,
            Self::Composite(composite) => composite.negated,
        }
    }

    /// Whether this is the un-negated sentinel that matches everything.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted { negated: false })
    }

    /// An equivalent tree with no negated composite nodes.
    ///
    /// Negation is pushed through composites with De Morgan's laws and
    /// absorbed into leaf constraints as their complements.
    pub fn push_down_negation(&self) -> Self {
        self.normalize(false)
    }

    fn normalize(&self, negate: bool) -> Self {
        match self {
            Self::Unrestricted { negated } => Self::Unrestricted {
                negated: *negated != negate,
            },
            Self::Basic(basic) if negate => Self::Basic(basic.negate()),
            Self::Basic(_) => self.clone(),
            Self::Composite(composite) => {
                let negate = composite.negated != negate;
                let operator = if negate {
                    composite.operator.dual()
                } else {
                    composite.operator
                };
                Self::Composite(CompositeRestriction {
                    operator,
                    children: composite
                        .children
                        .iter()
                        .map(|child| child.normalize(negate))
                        .collect(),
                    negated: false,
                })
            }
        }
    }

    /// Number of basic restrictions in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Unrestricted { .. } => 0,
            Self::Basic(_) => 1,
            Self::Composite(composite) => composite.children.iter().map(Self::leaf_count).sum(),
        }
    }
}

impl From<BasicRestriction> for Restriction {
    fn from(basic: BasicRestriction) -> Self {
        Self::Basic(basic)
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted { negated: false } => f.write_str("TRUE"),
            Self::Unrestricted { negated: true } => f.write_str("FALSE"),
            Self::Basic(basic) => write!(f, "{} {}", basic.expression, basic.constraint),
            Self::Composite(composite) => {
                if composite.negated {
                    f.write_str("NOT ")?;
                }
                f.write_str("(")?;
                for (i, child) in composite.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", composite.operator.as_sql())?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}
