//! Construction macros for heterogeneous key lists.

/// Build an array of [`Value`](crate::Value)s from mixed literals.
///
/// ```rust
/// use sift_query::{keyset, Value};
///
/// let keys = keyset!["First", 2, '3'];
/// assert_eq!(keys[0], Value::from("First"));
/// assert_eq!(keys[2], Value::Char('3'));
/// ```
#[macro_export]
macro_rules! keyset {
    ($($key:expr),+ $(,)?) => {
        [$($crate::Value::from($key)),+]
    };
}

/// Build a [`Cursor`](crate::Cursor) from mixed literals.
///
/// Expands to a `QueryResult<Cursor>`.
///
/// ```rust
/// use sift_query::cursor;
///
/// let cursor = cursor!["k", '2', 3]?;
/// assert_eq!(cursor.size(), 3);
/// # Ok::<(), sift_query::QueryError>(())
/// ```
#[macro_export]
macro_rules! cursor {
    ($($key:expr),+ $(,)?) => {
        $crate::Cursor::new($crate::keyset![$($key),+])
    };
}
