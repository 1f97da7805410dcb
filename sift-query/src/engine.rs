//! The execution contract between the query model and a backing store.
//!
//! The model layer never executes anything. A [`QueryEngine`] receives a
//! [`Query`] and a [`PageRequest`] and returns a [`Page`]. Implementations
//! must honour these rules:
//!
//! - content is returned in the query's effective order, including for
//!   `CURSOR_PREVIOUS` requests, which select the elements immediately
//!   preceding the cursor
//! - totals are computed only when the request asks for them
//! - cursor pagination requires a non-empty effective order and a cursor of
//!   the same arity
//! - features the store cannot honour fail with an
//!   [`Unsupported`](crate::ErrorCode::Unsupported) error so callers can
//!   fall back

use std::future::Future;
use std::pin::Pin;

use crate::error::QueryResult;
use crate::page::Page;
use crate::page_request::PageRequest;
use crate::query::Query;
use crate::restriction::Restriction;

/// A boxed future for engine operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A store that can execute queries page by page.
pub trait QueryEngine<T>: Send + Sync {
    /// Fetch the page selected by `request`.
    ///
    /// Offset requests produce offset pages. Cursor requests produce
    /// cursored pages.
    fn find_page<'a>(
        &'a self,
        query: &'a Query,
        request: &'a PageRequest,
    ) -> BoxFuture<'a, QueryResult<Page<T>>>;

    /// Fetch the page selected by `request` with one cursor per element,
    /// whatever the request mode.
    fn find_cursored_page<'a>(
        &'a self,
        query: &'a Query,
        request: &'a PageRequest,
    ) -> BoxFuture<'a, QueryResult<Page<T>>>;

    /// Count the elements matching `restriction`.
    fn count<'a>(&'a self, restriction: &'a Restriction) -> BoxFuture<'a, QueryResult<u64>>;

    /// Name of this engine (for logging).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Walk every page from `first` onward and collect the content.
///
/// Cursor requests are followed through cursored pages, offset requests
/// through page numbers.
pub async fn collect_pages<T, E>(engine: &E, query: &Query, first: PageRequest) -> QueryResult<Vec<T>>
where
    E: QueryEngine<T> + ?Sized,
{
    let mut request = first;
    let mut out = Vec::new();
    loop {
        let page = if request.mode().is_cursor() {
            engine.find_cursored_page(query, &request).await?
        } else {
            engine.find_page(query, &request).await?
        };
        crate::sift_trace!(
            engine = engine.name(),
            page = request.page(),
            elements = page.len(),
            "collected page"
        );
        if !page.has_next() || page.is_empty() {
            out.extend(page);
            return Ok(out);
        }
        let next = page.next_page_request()?;
        out.extend(page);
        request = next;
    }
}
