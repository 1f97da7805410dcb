//! LIKE patterns with wildcard translation and literal escaping.
//!
//! A pattern uses two wildcards: [`CHAR_WILDCARD`] matches any single
//! character and [`STRING_WILDCARD`] matches any substring. Helpers that
//! take a raw literal escape both wildcards and the escape character so the
//! literal matches only itself:
//!
//! ```rust
//! use sift_query::Pattern;
//!
//! let p = Pattern::substring("50%_off");
//! assert_eq!(p.value(), Some("%50\\%\\_off%"));
//! assert_eq!(p.escape(), Some('\\'));
//!
//! assert_eq!(p.matches("get 50%_off today", false), Some(true));
//! assert_eq!(p.matches("get 50xyoff today", false), Some(false));
//! ```
//!
//! Explicit patterns are taken verbatim:
//!
//! ```rust
//! use sift_query::Pattern;
//!
//! let p = Pattern::pattern("Ru_t%");
//! assert_eq!(p.escape(), None);
//! assert_eq!(p.matches("Rust in Action", false), Some(true));
//! ```

use std::fmt;

use crate::error::{QueryError, QueryResult};
use crate::expression::Expression;
use crate::value::Value;

/// Matches any single character.
pub const CHAR_WILDCARD: char = '_';
/// Matches any substring, including the empty one.
pub const STRING_WILDCARD: char = '%';
/// Marks the next character as a literal.
pub const ESCAPE: char = '\\';

/// A pattern for `Like`/`NotLike` constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    expression: Expression,
    escape: Option<char>,
}

impl Pattern {
    /// A pattern taken verbatim. No escaping is performed.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            expression: Expression::Literal(Value::String(pattern.into())),
            escape: None,
        }
    }

    /// A pattern computed by an arbitrary expression, with an optional escape.
    pub fn expression(expression: Expression, escape: Option<char>) -> Self {
        Self { expression, escape }
    }

    /// Translate a pattern written with custom wildcards into the standard ones.
    ///
    /// Occurrences of the standard wildcards and the escape character in
    /// `pattern` are escaped so they match literally.
    pub fn pattern_with(
        pattern: &str,
        char_wildcard: char,
        string_wildcard: char,
    ) -> QueryResult<Self> {
        if char_wildcard == string_wildcard {
            return Err(QueryError::invalid_argument(
                "single-character and substring wildcards must differ",
            ));
        }
        let mut out = String::with_capacity(pattern.len() + 4);
        for ch in pattern.chars() {
            translate_char(ch, char_wildcard, string_wildcard, &mut out);
        }
        Ok(Self::escaped(out))
    }

    /// Like [`Pattern::pattern_with`], where `escape` marks the next
    /// character of `pattern` as a literal.
    pub fn pattern_escaped(
        pattern: &str,
        char_wildcard: char,
        string_wildcard: char,
        escape: char,
    ) -> QueryResult<Self> {
        if char_wildcard == string_wildcard
            || escape == char_wildcard
            || escape == string_wildcard
        {
            return Err(QueryError::invalid_argument(
                "wildcards and escape character must be distinct",
            ));
        }
        let mut out = String::with_capacity(pattern.len() + 4);
        let mut chars = pattern.chars();
        while let Some(ch) = chars.next() {
            if ch == escape {
                let literal = chars.next().ok_or_else(|| {
                    QueryError::invalid_argument(format!(
                        "pattern '{}' ends with the escape character",
                        pattern
                    ))
                })?;
                push_literal(literal, &mut out);
            } else {
                translate_char(ch, char_wildcard, string_wildcard, &mut out);
            }
        }
        Ok(Self::escaped(out))
    }

    /// Matches exactly `literal`.
    pub fn literal(literal: &str) -> Self {
        Self::escaped(escape_literal(literal))
    }

    /// Matches values starting with `prefix`.
    pub fn prefix(prefix: &str) -> Self {
        let mut value = escape_literal(prefix);
        value.push(STRING_WILDCARD);
        Self::escaped(value)
    }

    /// Matches values ending with `suffix`.
    pub fn suffix(suffix: &str) -> Self {
        let mut value = String::with_capacity(suffix.len() + 2);
        value.push(STRING_WILDCARD);
        value.push_str(&escape_literal(suffix));
        Self::escaped(value)
    }

    /// Matches values containing `substring`.
    pub fn substring(substring: &str) -> Self {
        let mut value = String::with_capacity(substring.len() + 3);
        value.push(STRING_WILDCARD);
        value.push_str(&escape_literal(substring));
        value.push(STRING_WILDCARD);
        Self::escaped(value)
    }

    /// Alias for [`Pattern::substring`].
    pub fn contains(substring: &str) -> Self {
        Self::substring(substring)
    }

    fn escaped(value: String) -> Self {
        Self {
            expression: Expression::Literal(Value::String(value)),
            escape: Some(ESCAPE),
        }
    }

    /// The pattern expression.
    pub fn pattern_expression(&self) -> &Expression {
        &self.expression
    }

    /// The pattern text, if the pattern is a string literal.
    pub fn value(&self) -> Option<&str> {
        match &self.expression {
            Expression::Literal(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The escape character the consumer must honor, if any.
    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    /// Match `text` against this pattern.
    ///
    /// Returns `None` when the pattern is not a string literal.
    pub fn matches(&self, text: &str, ignore_case: bool) -> Option<bool> {
        self.value()
            .map(|pattern| wildcard_match(pattern, self.escape, text, ignore_case))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)?;
        if let Some(escape) = self.escape {
            write!(f, " ESCAPE '{}'", escape)?;
        }
        Ok(())
    }
}

/// Escape wildcards and the escape character inside a raw literal.
pub fn escape_literal(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() + 4);
    for ch in literal.chars() {
        push_literal(ch, &mut out);
    }
    out
}

fn push_literal(ch: char, out: &mut String) {
    if ch == CHAR_WILDCARD || ch == STRING_WILDCARD || ch == ESCAPE {
        out.push(ESCAPE);
    }
    out.push(ch);
}

fn translate_char(ch: char, char_wildcard: char, string_wildcard: char, out: &mut String) {
    if ch == char_wildcard {
        out.push(CHAR_WILDCARD);
    } else if ch == string_wildcard {
        out.push(STRING_WILDCARD);
    } else {
        push_literal(ch, out);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Literal(char),
    AnyChar,
    AnyString,
}

fn tokenize(pattern: &str, escape: Option<char>) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        let token = if Some(ch) == escape {
            // A trailing escape matches itself.
            Token::Literal(chars.next().unwrap_or(ch))
        } else if ch == CHAR_WILDCARD {
            Token::AnyChar
        } else if ch == STRING_WILDCARD {
            Token::AnyString
        } else {
            Token::Literal(ch)
        };
        tokens.push(token);
    }
    tokens
}

/// Match `text` against a pattern written with the standard wildcards.
///
/// The whole of `text` must match.
pub fn wildcard_match(pattern: &str, escape: Option<char>, text: &str, ignore_case: bool) -> bool {
    let (pattern, text) = if ignore_case {
        (pattern.to_lowercase(), text.to_lowercase())
    } else {
        (pattern.to_string(), text.to_string())
    };
    let tokens = tokenize(&pattern, escape);
    let text: Vec<char> = text.chars().collect();

    let (mut t, mut p) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(Token::AnyString) => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(Token::AnyChar) => {
                p += 1;
                t += 1;
            }
            Some(Token::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    tokens[p..].iter().all(|token| *token == Token::AnyString)
}
