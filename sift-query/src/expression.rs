//! Expressions: literals, attribute references and derived functions.
//!
//! ```rust
//! use sift_query::{Expression, FunctionName, ValueType};
//!
//! let title = Expression::attribute("title");
//! let length = Expression::length(title.clone());
//!
//! assert_eq!(length.to_string(), "LENGTH(title)");
//! assert_eq!(length.value_type(), ValueType::Integer);
//! assert!(matches!(length, Expression::Function(ref f) if f.name == FunctionName::Length));
//! ```

use smol_str::SmolStr;
use std::fmt;

use crate::value::{Value, ValueType};

/// A reference to a value: a literal, a named attribute, or a function.
///
/// Expressions are pure data. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    /// A constant value.
    Literal(Value),
    /// A named attribute of the queried entity.
    Attribute(AttributePath),
    /// A function applied to other expressions.
    Function(Function),
}

impl Expression {
    /// A literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// An attribute reference.
    pub fn attribute(name: impl Into<SmolStr>) -> Self {
        Self::Attribute(AttributePath::new(name))
    }

    /// The text length of `operand`.
    pub fn length(operand: Expression) -> Self {
        Function::unary(FunctionName::Length, operand)
    }

    /// Lower-cased text of `operand`.
    pub fn lower(operand: Expression) -> Self {
        Function::unary(FunctionName::Lower, operand)
    }

    /// Upper-cased text of `operand`.
    pub fn upper(operand: Expression) -> Self {
        Function::unary(FunctionName::Upper, operand)
    }

    /// Absolute value of `operand`.
    pub fn abs(operand: Expression) -> Self {
        Function::unary(FunctionName::Abs, operand)
    }

    /// Arithmetic negation of `operand`.
    pub fn neg(operand: Expression) -> Self {
        Function::unary(FunctionName::Neg, operand)
    }

    /// `left + right`.
    pub fn plus(left: Expression, right: Expression) -> Self {
        Function::binary(FunctionName::Plus, left, right)
    }

    /// `left - right`.
    pub fn minus(left: Expression, right: Expression) -> Self {
        Function::binary(FunctionName::Minus, left, right)
    }

    /// `left * right`.
    pub fn times(left: Expression, right: Expression) -> Self {
        Function::binary(FunctionName::Times, left, right)
    }

    /// `left / right`.
    pub fn divide(left: Expression, right: Expression) -> Self {
        Function::binary(FunctionName::Divide, left, right)
    }

    /// Check if this is the null literal.
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Self::Literal(Value::Null))
    }

    /// The attribute name, if this is a plain attribute reference.
    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Self::Attribute(path) => Some(path.name()),
            _ => None,
        }
    }

    /// The declared type this expression evaluates to.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Literal(value) => value.value_type(),
            Self::Attribute(_) => ValueType::Any,
            Self::Function(function) => function.return_type,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{}", value),
            Self::Attribute(path) => write!(f, "{}", path),
            Self::Function(function) => write!(f, "{}", function),
        }
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<AttributePath> for Expression {
    fn from(path: AttributePath) -> Self {
        Self::Attribute(path)
    }
}

macro_rules! literal_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expression {
                fn from(v: $ty) -> Self {
                    Self::Literal(Value::from(v))
                }
            }
        )*
    };
}

literal_from!(bool, i32, i64, u32, f64, char, String, &str);

/// A (possibly entity-qualified) attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    entity: Option<SmolStr>,
    name: SmolStr,
}

impl AttributePath {
    /// An unqualified attribute.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            entity: None,
            name: name.into(),
        }
    }

    /// An attribute qualified by its entity type.
    pub fn of(entity: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self {
            entity: Some(entity.into()),
            name: name.into(),
        }
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning entity type, if qualified.
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(entity) => write!(f, "{}.{}", entity, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Functions that derive one value from other expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionName {
    /// Text length.
    Length,
    /// Lower-case text.
    Lower,
    /// Upper-case text.
    Upper,
    /// Absolute value.
    Abs,
    /// Negation.
    Neg,
    /// Addition.
    Plus,
    /// Subtraction.
    Minus,
    /// Multiplication.
    Times,
    /// Division.
    Divide,
}

impl FunctionName {
    /// The conventional name of this function.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "LENGTH",
            Self::Lower => "LOWER",
            Self::Upper => "UPPER",
            Self::Abs => "ABS",
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Times => "*",
            Self::Divide => "/",
        }
    }

    /// Whether this function is written infix between two operands.
    pub fn is_infix(&self) -> bool {
        matches!(self, Self::Plus | Self::Minus | Self::Times | Self::Divide)
    }
}

/// A function applied to operand expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    /// The function.
    pub name: FunctionName,
    /// The type the function returns.
    pub return_type: ValueType,
    /// The operands, in call order.
    pub operands: Vec<Expression>,
}

impl Function {
    /// Create a function expression.
    pub fn new(name: FunctionName, return_type: ValueType, operands: Vec<Expression>) -> Self {
        Self {
            name,
            return_type,
            operands,
        }
    }

    fn unary(name: FunctionName, operand: Expression) -> Expression {
        let return_type = match name {
            FunctionName::Length => ValueType::Integer,
            FunctionName::Lower | FunctionName::Upper => ValueType::Text,
            _ => numeric_type(&[&operand]),
        };
        Expression::Function(Self::new(name, return_type, vec![operand]))
    }

    fn binary(name: FunctionName, left: Expression, right: Expression) -> Expression {
        let return_type = match name {
            FunctionName::Divide => ValueType::Numeric,
            _ => numeric_type(&[&left, &right]),
        };
        Expression::Function(Self::new(name, return_type, vec![left, right]))
    }
}

fn numeric_type(operands: &[&Expression]) -> ValueType {
    if operands
        .iter()
        .all(|e| e.value_type() == ValueType::Integer)
    {
        ValueType::Integer
    } else {
        ValueType::Numeric
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name.is_infix(), self.operands.as_slice()) {
            (true, [left, right]) => write!(f, "({} {} {})", left, self.name.as_str(), right),
            (false, [operand]) if self.name == FunctionName::Neg => write!(f, "-{}", operand),
            _ => {
                write!(f, "{}(", self.name.as_str())?;
                for (i, operand) in self.operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", operand)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Expression::upper(Expression::attribute("title"));
        let b = Expression::upper(Expression::attribute("title"));
        assert_eq!(a, b);
        assert_ne!(a, Expression::lower(Expression::attribute("title")));
    }

    #[test]
    fn test_qualified_attribute_display() {
        let path = AttributePath::of("Book", "title");
        assert_eq!(path.to_string(), "Book.title");
        assert_eq!(path.entity(), Some("Book"));
        assert_eq!(Expression::from(path).attribute_name(), Some("title"));
    }

    #[test]
    fn test_arithmetic_display_and_type() {
        let expr = Expression::plus(Expression::attribute("price"), Expression::literal(5));
        assert_eq!(expr.to_string(), "(price + 5)");
        assert_eq!(expr.value_type(), ValueType::Numeric);

        let ints = Expression::times(Expression::literal(2), Expression::literal(3));
        assert_eq!(ints.value_type(), ValueType::Integer);
    }

    #[test]
    fn test_null_literal() {
        assert!(Expression::from(Value::Null).is_null_literal());
        assert!(!Expression::literal(0).is_null_literal());
    }
}
