//! Pages of results and navigation between them.
//!
//! A [`Page`] is returned by the query engine. It carries its content in
//! the effective sort order, whether neighbouring pages exist, optional
//! totals, and (for keyset pagination) one cursor per element. The next and
//! previous [`PageRequest`]s are derived from the page itself:
//!
//! ```rust
//! use sift_query::{Page, PageRequest};
//!
//! let request = PageRequest::of_size(2)?;
//! let page = Page::new(vec!["a", "b"], request)
//!     .with_next(true)
//!     .with_total(5);
//!
//! assert_eq!(page.total_pages()?, 3);
//! assert_eq!(page.next_page_request()?.page(), 2);
//! assert!(page.previous_page_request().unwrap_err().is_navigation_error());
//! # Ok::<(), sift_query::QueryError>(())
//! ```

use crate::cursor::Cursor;
use crate::error::{QueryError, QueryResult};
use crate::page_request::PageRequest;

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    content: Vec<T>,
    request: PageRequest,
    has_next: bool,
    has_previous: bool,
    total_elements: Option<u64>,
    cursors: Option<Vec<Cursor>>,
}

impl<T> Page<T> {
    /// A page navigated by offset.
    pub fn new(content: Vec<T>, request: PageRequest) -> Self {
        Self {
            content,
            request,
            has_next: false,
            has_previous: false,
            total_elements: None,
            cursors: None,
        }
    }

    /// A page navigated by keyset, with one cursor per element.
    pub fn cursored(content: Vec<T>, cursors: Vec<Cursor>, request: PageRequest) -> QueryResult<Self> {
        if content.len() != cursors.len() {
            return Err(QueryError::invalid_argument(format!(
                "a cursored page needs one cursor per element: {} elements, {} cursors",
                content.len(),
                cursors.len()
            )));
        }
        Ok(Self {
            cursors: Some(cursors),
            ..Self::new(content, request)
        })
    }

    /// Set whether a next page exists.
    pub fn with_next(mut self, has_next: bool) -> Self {
        self.has_next = has_next;
        self
    }

    /// Set whether a previous page exists.
    pub fn with_previous(mut self, has_previous: bool) -> Self {
        self.has_previous = has_previous;
        self
    }

    /// Set the total number of matching elements.
    pub fn with_total(mut self, total_elements: u64) -> Self {
        self.total_elements = Some(total_elements);
        self
    }

    /// The elements, in the effective sort order.
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Take the elements.
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }

    /// Number of elements on this page.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether this page has no elements.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The request that produced this page.
    pub fn page_request(&self) -> &PageRequest {
        &self.request
    }

    /// Whether a next page exists.
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Whether a previous page exists.
    pub fn has_previous(&self) -> bool {
        self.has_previous
    }

    /// Whether this page carries per-element cursors.
    pub fn is_cursored(&self) -> bool {
        self.cursors.is_some()
    }

    /// Total number of matching elements across all pages.
    ///
    /// Fails unless the request asked for totals.
    pub fn total_elements(&self) -> QueryResult<u64> {
        if !self.request.request_total() {
            return Err(QueryError::total_not_requested());
        }
        self.total_elements.ok_or_else(QueryError::total_unavailable)
    }

    /// Total number of pages of the requested size.
    pub fn total_pages(&self) -> QueryResult<u64> {
        let total = self.total_elements()?;
        Ok(total.div_ceil(u64::from(self.request.size())))
    }

    /// The cursor of the element at `index`.
    pub fn cursor(&self, index: usize) -> QueryResult<&Cursor> {
        let cursors = self
            .cursors
            .as_ref()
            .ok_or_else(|| QueryError::illegal_state("page was not produced by keyset pagination"))?;
        cursors.get(index).ok_or_else(|| {
            QueryError::invalid_argument(format!(
                "index {} is out of bounds for a page of {} elements",
                index,
                cursors.len()
            ))
        })
    }

    /// The request for the following page.
    ///
    /// Keyset pages continue after the cursor of their last element; offset
    /// pages move to the next page number. Fails when `has_next()` is false.
    pub fn next_page_request(&self) -> QueryResult<PageRequest> {
        if !self.has_next {
            return Err(QueryError::no_such_element("there is no next page"));
        }
        let page = self.request.page().saturating_add(1);
        match &self.cursors {
            Some(cursors) => {
                let last = cursors
                    .last()
                    .ok_or_else(|| QueryError::no_such_element("an empty page has no cursor"))?;
                PageRequest::cursor_next(
                    last.clone(),
                    page,
                    self.request.size(),
                    self.request.request_total(),
                )
            }
            None => self.offset_request(page),
        }
    }

    /// The request for the preceding page.
    ///
    /// Keyset pages continue before the cursor of their first element; the
    /// resulting page still lists its content in forward sort order.
    /// Fails when `has_previous()` is false.
    pub fn previous_page_request(&self) -> QueryResult<PageRequest> {
        if !self.has_previous {
            return Err(QueryError::no_such_element("there is no previous page"));
        }
        match &self.cursors {
            Some(cursors) => {
                let first = cursors
                    .first()
                    .ok_or_else(|| QueryError::no_such_element("an empty page has no cursor"))?;
                PageRequest::cursor_previous(
                    first.clone(),
                    self.request.page().saturating_sub(1).max(1),
                    self.request.size(),
                    self.request.request_total(),
                )
            }
            None => {
                if self.request.page() == 1 {
                    return Err(QueryError::no_such_element("there is no page before page 1"));
                }
                self.offset_request(self.request.page() - 1)
            }
        }
    }

    fn offset_request(&self, page: u64) -> QueryResult<PageRequest> {
        if self.request.mode().is_cursor() {
            return Err(QueryError::illegal_state(
                "a keyset page request produced a page without cursors",
            ));
        }
        PageRequest::of(page, self.request.size(), self.request.request_total())
    }

    /// Transform the elements, keeping the navigation state.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            request: self.request,
            has_next: self.has_next,
            has_previous: self.has_previous,
            total_elements: self.total_elements,
            cursors: self.cursors,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_request::Mode;
    use crate::{cursor, keyset};

    #[test]
    fn test_totals_require_request() {
        let page = Page::new(vec![1, 2], PageRequest::of_size(2).unwrap().without_total()).with_total(10);
        assert_eq!(page.total_elements().unwrap_err().code, crate::ErrorCode::TotalNotRequested);
        assert!(page.total_pages().unwrap_err().is_state_error());
    }

    #[test]
    fn test_totals_missing_from_engine() {
        let page = Page::new(vec![1], PageRequest::of_size(2).unwrap());
        assert_eq!(page.total_elements().unwrap_err().code, crate::ErrorCode::TotalUnavailable);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::new(Vec::<i32>::new(), PageRequest::of_size(10).unwrap()).with_total(21);
        assert_eq!(page.total_pages().unwrap(), 3);
        let empty = Page::new(Vec::<i32>::new(), PageRequest::of_size(10).unwrap()).with_total(0);
        assert_eq!(empty.total_pages().unwrap(), 0);
    }

    #[test]
    fn test_offset_navigation() {
        let page = Page::new(vec!["c", "d"], PageRequest::of(2, 2, false).unwrap())
            .with_next(true)
            .with_previous(true);

        let next = page.next_page_request().unwrap();
        assert_eq!(next.page(), 3);
        assert_eq!(next.mode(), Mode::Offset);
        assert!(!next.request_total());
        assert_eq!(page.previous_page_request().unwrap().page(), 1);
    }

    #[test]
    fn test_navigation_bounds() {
        let page = Page::new(vec![1], PageRequest::of_page(1).unwrap());
        assert_eq!(page.next_page_request().unwrap_err().code, crate::ErrorCode::NoSuchElement);
        assert_eq!(page.previous_page_request().unwrap_err().code, crate::ErrorCode::NoSuchElement);
    }

    #[test]
    fn test_cursored_navigation_uses_boundary_cursors() {
        let request = PageRequest::of_size(2).unwrap().after_keyset(keyset![2]).unwrap().with_page(2).unwrap();
        let page = Page::cursored(
            vec!["c", "d"],
            vec![cursor![3].unwrap(), cursor![4].unwrap()],
            request,
        )
        .unwrap()
        .with_next(true)
        .with_previous(true);

        let next = page.next_page_request().unwrap();
        assert_eq!(next.mode(), Mode::CursorNext);
        assert_eq!(next.cursor(), Some(&cursor![4].unwrap()));
        assert_eq!(next.page(), 3);

        let previous = page.previous_page_request().unwrap();
        assert_eq!(previous.mode(), Mode::CursorPrevious);
        assert_eq!(previous.cursor(), Some(&cursor![3].unwrap()));
        assert_eq!(previous.page(), 1);
    }

    #[test]
    fn test_cursored_page_needs_matching_cursors() {
        let request = PageRequest::of_size(2).unwrap();
        assert!(Page::cursored(vec![1, 2], vec![cursor![1].unwrap()], request).is_err());
    }

    #[test]
    fn test_cursor_access() {
        let request = PageRequest::of_size(2).unwrap();
        let page = Page::cursored(vec![1], vec![cursor![1].unwrap()], request.clone()).unwrap();
        assert!(page.cursor(0).is_ok());
        assert!(page.cursor(1).unwrap_err().is_argument_error());
        assert!(Page::new(vec![1], request).cursor(0).unwrap_err().is_navigation_error());
    }

    #[test]
    fn test_map_keeps_state() {
        let page = Page::new(vec![1, 2], PageRequest::of_size(2).unwrap())
            .with_next(true)
            .with_total(4)
            .map(|n| n * 10);
        assert_eq!(page.content(), &[10, 20]);
        assert!(page.has_next());
        assert_eq!(page.total_elements().unwrap(), 4);
    }
}
