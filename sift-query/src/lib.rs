//! # sift-query
//!
//! A store-agnostic query model: composable restrictions, sort criteria and
//! pagination requests, plus the contract an execution engine fulfils.
//!
//! This crate provides:
//! - Typed constraints (`=`, `<>`, ranges, `IN`, `LIKE`, `IS NULL`) with
//!   constant-time negation
//! - Restriction trees combined with AND/OR and lazy NOT
//! - Static and dynamic sort criteria
//! - Offset and keyset (cursor) page requests and result pages
//! - An in-memory reference engine and a SQL translation
//!
//! ## Restrictions
//!
//! ```rust
//! use sift_query::{Attribute, Restriction};
//!
//! let price = Attribute::new("price");
//! let name = Attribute::new("name");
//!
//! let cheap_widgets = price.less_than(10)?.and(name.contains("widget"));
//! let others = cheap_widgets.negate();
//!
//! assert_eq!(
//!     others.to_string(),
//!     "NOT (price < 10 AND name LIKE '%widget%' ESCAPE '\\')"
//! );
//! assert_eq!(
//!     others.push_down_negation().to_string(),
//!     "(price >= 10 OR name NOT LIKE '%widget%' ESCAPE '\\')"
//! );
//! # Ok::<(), sift_query::QueryError>(())
//! ```
//!
//! ## Patterns
//!
//! ```rust
//! use sift_query::Pattern;
//!
//! // '*' and '?' translated to '%' and '_'; literal '_' is escaped
//! let pattern = Pattern::pattern_with("file_?.*", '?', '*')?;
//! assert_eq!(pattern.value(), Some("file\\__.%"));
//! assert_eq!(pattern.matches("file_1.rs", false), Some(true));
//! # Ok::<(), sift_query::QueryError>(())
//! ```
//!
//! ## Pagination
//!
//! ```rust
//! use sift_query::{PageRequest, Mode, keyset};
//!
//! let first = PageRequest::of_size(20)?;
//! assert_eq!(first.mode(), Mode::Offset);
//! assert_eq!(first.next()?.page(), 2);
//!
//! let after = first.after_keyset(keyset!["Smith", 42])?;
//! assert_eq!(after.mode(), Mode::CursorNext);
//! assert_eq!(after.to_string(), "PageRequest{page=1, size=20, mode=CURSOR_NEXT, 2 keys}");
//! # Ok::<(), sift_query::QueryError>(())
//! ```

pub mod attribute;
pub mod config;
pub mod constraint;
pub mod cursor;
pub mod engine;
pub mod entity;
pub mod error;
pub mod expression;
pub mod logging;
#[macro_use]
mod macros;
pub mod memory;
pub mod page;
pub mod page_request;
pub mod pattern;
pub mod query;
pub mod restriction;
pub mod sort;
pub mod sql;
pub mod value;

pub use attribute::Attribute;
pub use config::{DebugConfig, PaginationConfig, SiftConfig, SqlConfig};
pub use constraint::{Constraint, ConstraintKind};
pub use cursor::Cursor;
pub use engine::{BoxFuture, QueryEngine, collect_pages};
pub use entity::Entity;
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use expression::{AttributePath, Expression, Function, FunctionName};
pub use memory::MemoryEngine;
pub use page::Page;
pub use page_request::{DEFAULT_PAGE_SIZE, Mode, PageRequest};
pub use pattern::Pattern;
pub use query::Query;
pub use restriction::{BasicRestriction, CompositeRestriction, Operator, Restriction};
pub use sort::{Order, Sort, SortOrder};
pub use sql::{DatabaseType, SqlBuilder, SqlQuery};
pub use value::{Value, ValueType};

pub use logging::{get_log_format, get_log_level, init as init_logging, init_with_level, is_debug_enabled};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::attribute::Attribute;
    pub use crate::constraint::Constraint;
    pub use crate::cursor::Cursor;
    pub use crate::engine::QueryEngine;
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::expression::Expression;
    pub use crate::page::Page;
    pub use crate::page_request::{Mode, PageRequest};
    pub use crate::pattern::Pattern;
    pub use crate::query::Query;
    pub use crate::restriction::Restriction;
    pub use crate::sort::{Order, Sort, SortOrder};
    pub use crate::value::Value;
    pub use crate::{cursor, keyset};
}
