//! Cursor paging over creation timestamps.
//!
//! Messages are read newest first. A page's cursor is the creation time of
//! its last (oldest) item; the next page holds items strictly older than
//! that. Rows sharing the boundary timestamp are therefore skipped, which
//! is accepted given microsecond timestamps.
//!
//! End of stream is detected by a page that comes back shorter than the
//! requested size. A stream whose length is an exact multiple of the page
//! size needs one extra, empty page to report the end.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use roost_types::{ItemId, Message};

use crate::error::CoreError;

/// Default page size for message history.
pub const MESSAGES_PAGE_SIZE: usize = 20;

/// Anything that can be paged by creation time.
pub trait Chronological {
    /// Creation time, the paging key.
    fn created_at(&self) -> f64;

    /// Row identity, the tie-break between equal timestamps.
    fn id(&self) -> ItemId;
}

impl Chronological for Message {
    fn created_at(&self) -> f64 {
        self.created_at
    }

    fn id(&self) -> ItemId {
        self.id
    }
}

/// Newest first, then by id.
pub fn newest_first<T: Chronological>(a: &T, b: &T) -> Ordering {
    b.created_at()
        .total_cmp(&a.created_at())
        .then_with(|| a.id().cmp(&b.id()))
}

/// Opaque resume token: the timestamp of the last item already seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor(f64);

impl PageCursor {
    /// Cursor positioned after an item created at `timestamp`.
    pub fn after(timestamp: f64) -> Self {
        Self(timestamp)
    }

    /// Parse a cursor string. Empty means "start from the newest item".
    pub fn parse(token: &str) -> Result<Option<Self>, CoreError> {
        if token.is_empty() {
            return Ok(None);
        }
        match token.parse::<f64>() {
            Ok(timestamp) if timestamp.is_finite() => Ok(Some(Self(timestamp))),
            _ => Err(CoreError::MalformedCursor(token.to_string())),
        }
    }

    /// The boundary timestamp.
    pub fn timestamp(&self) -> f64 {
        self.0
    }

    /// Whether an item created at `created_at` belongs after this cursor.
    pub fn admits(&self, created_at: f64) -> bool {
        created_at < self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for PageCursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items, newest first.
    pub items: Vec<T>,
    /// Token for the next page; `None` when the page is empty.
    pub cursor: Option<PageCursor>,
    /// Whether the stream is exhausted.
    pub at_end: bool,
}

impl<T: Chronological> Page<T> {
    /// Wrap a batch fetched with a limit of `page_size`.
    pub fn from_batch(items: Vec<T>, page_size: usize) -> Self {
        let cursor = items.last().map(|item| PageCursor(item.created_at()));
        let at_end = items.len() != page_size;
        Self {
            items,
            cursor,
            at_end,
        }
    }

    /// The cursor as a string, empty when there is none.
    pub fn cursor_token(&self) -> String {
        self.cursor.map(|c| c.to_string()).unwrap_or_default()
    }
}

/// Page an in-memory collection.
pub fn paginate<T: Chronological + Clone>(
    source: &[T],
    cursor: Option<PageCursor>,
    page_size: usize,
) -> Page<T> {
    let mut older: Vec<T> = source
        .iter()
        .filter(|item| cursor.map_or(true, |c| c.admits(item.created_at())))
        .cloned()
        .collect();
    older.sort_by(newest_first);
    older.truncate(page_size);
    Page::from_batch(older, page_size)
}
