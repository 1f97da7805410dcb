//! Page requests: offset-based and keyset-based.
//!
//! This module provides a single [`PageRequest`] value for both offset and
//! cursor (keyset) pagination.
//!
//! # Offset Pagination
//!
//! ```rust
//! use sift_query::{Mode, PageRequest};
//!
//! let request = PageRequest::of_page(3)?;
//! assert_eq!(request.size(), 10);
//! assert_eq!(request.mode(), Mode::Offset);
//! assert_eq!(request.offset(), 20);
//! assert_eq!(request.next()?.page(), 4);
//! # Ok::<(), sift_query::QueryError>(())
//! ```
//!
//! # Keyset Pagination
//!
//! ```rust
//! use sift_query::{keyset, Mode, PageRequest, Value};
//!
//! let request = PageRequest::of_size(20)?.after_keyset(keyset!["First", 2, 3])?;
//! assert_eq!(request.mode(), Mode::CursorNext);
//! assert_eq!(request.page(), 1);
//! assert_eq!(request.cursor().map(|c| c.size()), Some(3));
//! assert_eq!(request.to_string(), "PageRequest{page=1, size=20, mode=CURSOR_NEXT, 3 keys}");
//!
//! // The next cursor is only known once results are read.
//! assert!(request.next().unwrap_err().is_navigation_error());
//! # Ok::<(), sift_query::QueryError>(())
//! ```

use std::fmt;

use crate::cursor::Cursor;
use crate::error::{QueryError, QueryResult};
use crate::value::Value;

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// How a page is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// By numeric position: skip `(page - 1) * size` rows.
    Offset,
    /// The rows following the cursor in sort order.
    CursorNext,
    /// The rows preceding the cursor in sort order.
    CursorPrevious,
}

impl Mode {
    /// The conventional upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offset => "OFFSET",
            Self::CursorNext => "CURSOR_NEXT",
            Self::CursorPrevious => "CURSOR_PREVIOUS",
        }
    }

    /// Whether this is a keyset mode.
    pub fn is_cursor(&self) -> bool {
        !matches!(self, Self::Offset)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for one page of results.
///
/// Immutable: every builder method returns a new sibling request. A cursor
/// is present exactly when the mode is a keyset mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u64,
    size: u32,
    mode: Mode,
    cursor: Option<Cursor>,
    request_total: bool,
}

fn check_page(page: u64) -> QueryResult<u64> {
    if page < 1 {
        return Err(QueryError::invalid_argument(format!(
            "page number must be at least 1, got {}",
            page
        ))
        .with_attribute("page"));
    }
    Ok(page)
}

fn check_size(size: u32) -> QueryResult<u32> {
    if size < 1 {
        return Err(QueryError::invalid_argument(format!(
            "page size must be at least 1, got {}",
            size
        ))
        .with_attribute("size"));
    }
    Ok(size)
}

impl PageRequest {
    /// An offset request for `page` with the default size, requesting totals.
    pub fn of_page(page: u64) -> QueryResult<Self> {
        Self::of(page, DEFAULT_PAGE_SIZE, true)
    }

    /// An offset request for the first page of `size` rows, requesting totals.
    pub fn of_size(size: u32) -> QueryResult<Self> {
        Self::of(1, size, true)
    }

    /// An offset request.
    pub fn of(page: u64, size: u32, request_total: bool) -> QueryResult<Self> {
        Ok(Self {
            page: check_page(page)?,
            size: check_size(size)?,
            mode: Mode::Offset,
            cursor: None,
            request_total,
        })
    }

    /// A request for the rows after `cursor`.
    pub fn cursor_next(
        cursor: Cursor,
        page: u64,
        size: u32,
        request_total: bool,
    ) -> QueryResult<Self> {
        Ok(Self {
            page: check_page(page)?,
            size: check_size(size)?,
            mode: Mode::CursorNext,
            cursor: Some(cursor),
            request_total,
        })
    }

    /// A request for the rows before `cursor`.
    pub fn cursor_previous(
        cursor: Cursor,
        page: u64,
        size: u32,
        request_total: bool,
    ) -> QueryResult<Self> {
        Ok(Self {
            page: check_page(page)?,
            size: check_size(size)?,
            mode: Mode::CursorPrevious,
            cursor: Some(cursor),
            request_total,
        })
    }

    /// A sibling with a different page number.
    pub fn with_page(&self, page: u64) -> QueryResult<Self> {
        Ok(Self {
            page: check_page(page)?,
            ..self.clone()
        })
    }

    /// A sibling with a different page size.
    pub fn with_size(&self, size: u32) -> QueryResult<Self> {
        Ok(Self {
            size: check_size(size)?,
            ..self.clone()
        })
    }

    /// A sibling requesting the rows after the given keys.
    pub fn after_keyset<I, V>(&self, keys: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Ok(self.after_cursor(Cursor::new(keys)?))
    }

    /// A sibling requesting the rows before the given keys.
    pub fn before_keyset<I, V>(&self, keys: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Ok(self.before_cursor(Cursor::new(keys)?))
    }

    /// A sibling requesting the rows after `cursor`.
    pub fn after_cursor(&self, cursor: Cursor) -> Self {
        Self {
            mode: Mode::CursorNext,
            cursor: Some(cursor),
            ..self.clone()
        }
    }

    /// A sibling requesting the rows before `cursor`.
    pub fn before_cursor(&self, cursor: Cursor) -> Self {
        Self {
            mode: Mode::CursorPrevious,
            cursor: Some(cursor),
            ..self.clone()
        }
    }

    /// A sibling that asks the engine to compute totals.
    pub fn with_total(&self) -> Self {
        Self {
            request_total: true,
            ..self.clone()
        }
    }

    /// A sibling that does not ask for totals.
    pub fn without_total(&self) -> Self {
        Self {
            request_total: false,
            ..self.clone()
        }
    }

    /// The next offset page.
    ///
    /// Fails in keyset modes: the next cursor is only known from the
    /// results, so navigate through [`Page::next_page_request`](crate::Page::next_page_request).
    pub fn next(&self) -> QueryResult<Self> {
        if self.mode.is_cursor() {
            return Err(QueryError::illegal_state(format!(
                "next() is not available in {} mode",
                self.mode
            ))
            .with_suggestion("Use Page::next_page_request() for cursor pagination"));
        }
        let page = self.page.checked_add(1).ok_or_else(|| {
            QueryError::invalid_argument("page number overflow").with_attribute("page")
        })?;
        Ok(Self {
            page,
            ..self.clone()
        })
    }

    /// The previous offset page. Fails on the first page and in keyset modes.
    pub fn previous(&self) -> QueryResult<Self> {
        if self.mode.is_cursor() {
            return Err(QueryError::illegal_state(format!(
                "previous() is not available in {} mode",
                self.mode
            ))
            .with_suggestion("Use Page::previous_page_request() for cursor pagination"));
        }
        if self.page == 1 {
            return Err(QueryError::no_such_element("there is no page before page 1"));
        }
        Ok(Self {
            page: self.page - 1,
            ..self.clone()
        })
    }

    /// The page number, starting at 1.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// The maximum number of rows on the page.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// How the page is located.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The cursor, in keyset modes.
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Whether totals should be computed.
    pub fn request_total(&self) -> bool {
        self.request_total
    }

    /// Rows to skip in offset mode: `(page - 1) * size`.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(u64::from(self.size))
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageRequest{{page={}, size={}", self.page, self.size)?;
        if let Some(cursor) = &self.cursor {
            write!(f, ", mode={}, {} keys", self.mode, cursor.size())?;
        }
        f.write_str("}")
    }
}
