//! Keyset cursors.
//!
//! A [`Cursor`] holds the sort-key values of one boundary entity,
//! positionally aligned with the effective order (static criteria first,
//! then dynamic). It always has at least one key.
//!
//! ```rust
//! use sift_query::{Cursor, Value};
//!
//! let cursor = Cursor::new([Value::from("First"), Value::from(2)])?;
//! assert_eq!(cursor.size(), 2);
//! assert_eq!(cursor.get(0), Some(&Value::from("First")));
//!
//! assert!(Cursor::new(Vec::<Value>::new()).is_err());
//! # Ok::<(), sift_query::QueryError>(())
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::sort::Order;
use crate::value::Value;

/// Sort-key values of a boundary entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "Vec<Value>")]
pub struct Cursor {
    keys: SmallVec<[Value; 4]>,
}

impl Cursor {
    /// Create a cursor from its keys. Fails when `keys` is empty.
    pub fn new<I, V>(keys: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let keys: SmallVec<[Value; 4]> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(QueryError::empty_cursor());
        }
        Ok(Self { keys })
    }

    /// Read the sort keys of `entity` in the order given by `order`.
    ///
    /// Missing attributes become null keys.
    pub fn for_entity<E: Entity + ?Sized>(entity: &E, order: &Order) -> QueryResult<Self> {
        Self::new(
            order
                .iter()
                .map(|sort| entity.attribute(sort.property()).unwrap_or(Value::Null)),
        )
        .map_err(|e| e.with_context("Building a cursor from an unordered query"))
    }

    /// The key at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.keys.get(index)
    }

    /// Number of keys.
    pub fn size(&self) -> usize {
        self.keys.len()
    }

    /// All keys, in sort-precedence order.
    pub fn elements(&self) -> &[Value] {
        &self.keys
    }

    /// Encode as a JSON array, suitable for handing to clients.
    pub fn to_json(&self) -> QueryResult<String> {
        serde_json::to_string(self)
            .map_err(|e| QueryError::internal(format!("cursor encoding failed: {}", e)).with_source(e))
    }

    /// Decode a cursor produced by [`Cursor::to_json`].
    pub fn from_json(json: &str) -> QueryResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            QueryError::invalid_argument(format!("malformed cursor: {}", e))
                .with_suggestion("Pass back a cursor exactly as it was returned")
                .with_source(e)
        })
    }

    /// Verify that this cursor has one key per sort criterion.
    pub fn check_arity(&self, order: &Order) -> QueryResult<()> {
        if self.keys.len() != order.len() {
            return Err(QueryError::cursor_mismatch(self.keys.len(), order.len()));
        }
        Ok(())
    }
}

impl TryFrom<Vec<Value>> for Cursor {
    type Error = QueryError;

    fn try_from(keys: Vec<Value>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<Cursor> for Vec<Value> {
    fn from(cursor: Cursor) -> Self {
        cursor.keys.into_vec()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cursor[")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", key)?;
        }
        f.write_str("]")
    }
}
