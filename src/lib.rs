//! # Sift
//!
//! Store-agnostic restrictions, sort criteria and pagination.
//!
//! Sift describes *which* records to fetch and *in what order* without
//! knowing anything about the store that executes the request:
//! - Composable restrictions with constant-time negation
//! - Static and dynamic sort criteria
//! - Offset and keyset (cursor) pagination with forward and backward
//!   navigation
//! - An in-memory reference engine and SQL translation
//!
//! ## Quick Start
//!
//! ```rust
//! use sift::prelude::*;
//! use sift::MemoryEngine;
//! use indexmap::IndexMap;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), sift::QueryError> {
//! let people: Vec<IndexMap<String, Value>> = ["Ada", "Grace", "Alan", "Edsger"]
//!     .into_iter()
//!     .map(|name| IndexMap::from([("name".to_string(), Value::from(name))]))
//!     .collect();
//! let engine = MemoryEngine::new(people);
//!
//! let name = Attribute::new("name");
//! let query = Query::new()
//!     .where_(name.starts_with("A").negate())
//!     .sorted_by([name.asc()]);
//!
//! let page = engine.find_page(&query, &PageRequest::of_size(10)?).await?;
//! assert_eq!(page.len(), 2);
//! assert_eq!(page.total_elements()?, 2);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use sift_query::*;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sift_query::prelude::*;
}
