//! Page-number pagination.
//!
//! Listings are addressed by a 1-based page index taken straight from the
//! request. A missing or malformed index never fails: it is clamped to the
//! nearest valid page, so `?page=abc` shows the first page and `?page=999`
//! shows the last one.
//!
//! [`paginate`] slices an in-memory sequence. [`PageWindow`] exposes the same
//! clamping for database queries, where only the total count is known up
//! front and the rows of one page are fetched with `LIMIT`/`OFFSET`.

use std::num::IntErrorKind;

use serde::Serialize;

/// Items per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Resolved position of one page inside a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number.
    pub number: u64,
    /// Total number of pages (at least 1).
    pub num_pages: u64,
    /// Total number of items in the result set.
    pub count: u64,
    /// Effective page size.
    pub page_size: u64,
}

impl PageWindow {
    /// Resolve a raw page parameter against a result set of `count` items.
    #[must_use]
    pub fn resolve(count: u64, page_index: Option<&str>, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        // An empty result set still has one (empty) page.
        let num_pages = count.div_ceil(page_size).max(1);
        let number = match parse_page_index(page_index) {
            Some(n) if n < 1 => 1,
            Some(n) if n > i128::from(num_pages) => num_pages,
            Some(n) => n as u64,
            None => 1,
        };

        Self {
            number,
            num_pages,
            count,
            page_size,
        }
    }

    /// Number of items to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.number - 1) * self.page_size
    }

    /// Maximum number of items on this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.page_size
    }

    /// Whether a page exists before this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Whether a page exists after this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    /// Attach the items of this page.
    #[must_use]
    pub fn with_items<T>(self, items: Vec<T>) -> Page<T> {
        let len = items.len() as u64;
        let (start_index, end_index) = if len == 0 {
            (0, 0)
        } else {
            let start = self.offset() + 1;
            (start, start + len - 1)
        };

        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_previous: self.has_previous(),
            has_next: self.has_next(),
            previous_page_number: self.has_previous().then(|| self.number - 1),
            next_page_number: self.has_next().then(|| self.number + 1),
            start_index,
            end_index,
        }
    }
}

/// One page of an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in source order.
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: u64,
    /// Total number of pages.
    pub num_pages: u64,
    /// Total number of items across all pages.
    pub count: u64,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
    /// Number of the previous page, if any.
    pub previous_page_number: Option<u64>,
    /// Number of the next page, if any.
    pub next_page_number: Option<u64>,
    /// 1-based index of the first item on this page (0 when empty).
    pub start_index: u64,
    /// 1-based index of the last item on this page (0 when empty).
    pub end_index: u64,
}

impl<T> Page<T> {
    /// Transform every item, keeping the page metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous_page_number: self.previous_page_number,
            next_page_number: self.next_page_number,
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }

    /// Transform every item with a fallible function, keeping the page metadata.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous_page_number: self.previous_page_number,
            next_page_number: self.next_page_number,
            start_index: self.start_index,
            end_index: self.end_index,
        })
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice `items` into the page addressed by `page_index`.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page_index: Option<&str>, page_size: u64) -> Page<T> {
    let window = PageWindow::resolve(items.len() as u64, page_index, page_size);
    let start = (window.offset() as usize).min(items.len());
    let end = (start + window.limit() as usize).min(items.len());
    window.with_items(items[start..end].to_vec())
}

/// Parse a page parameter; `None` when absent or not an integer.
///
/// Integers too large for `i128` saturate so they still clamp to the
/// nearest end of the range.
fn parse_page_index(raw: Option<&str>) -> Option<i128> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse::<i128>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i128::MAX),
            IntErrorKind::NegOverflow => Some(i128::MIN),
            _ => None,
        },
    }
}
