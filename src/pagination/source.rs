//! Data source contract for the paginator.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A query the paginator can count and page through.
///
/// Implement this for a query builder, a repository call or a remote API;
/// [`VecSource`] covers in-memory collections.
pub trait DataSource: Send + Sync {
    /// Row type.
    type Item: Send;

    /// Total number of rows the query matches.
    fn count(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Fetch page `page` (1-based) of `limit` rows.
    fn paginate(&self, limit: u64, page: u64) -> impl Future<Output = Result<Page<Self::Item>>> + Send;
}

/// One page of rows with its position in the full result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Page number.
    pub current_page: u64,
    /// 1-based index of the first row, `None` for an empty page.
    pub from: Option<u64>,
    /// Last page number, at least 1.
    pub last_page: u64,
    /// Rows per page.
    pub per_page: u64,
    /// 1-based index of the last row, `None` for an empty page.
    pub to: Option<u64>,
    /// Total rows across all pages.
    pub total: u64,
    /// Rows on this page.
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page from its rows and the query totals.
    pub fn from_items(data: Vec<T>, total: u64, per_page: u64, current_page: u64) -> Self {
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = current_page
                .saturating_sub(1)
                .saturating_mul(per_page)
                .saturating_add(1);
            (Some(from), Some(from + data.len() as u64 - 1))
        };

        Self {
            current_page,
            from,
            last_page: last_page(total, per_page),
            per_page,
            to,
            total,
            data,
        }
    }
}

/// Last page number for `total` rows at `per_page` rows per page.
pub fn last_page(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page.max(1)).max(1)
}

/// In-memory data source over an owned vector.
#[derive(Debug, Clone, Default)]
pub struct VecSource<T> {
    items: Vec<T>,
}

impl<T> VecSource<T> {
    /// Create a source over `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Get the rows.
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for VecSource<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: Clone + Send + Sync> DataSource for VecSource<T> {
    type Item = T;

    async fn count(&self) -> Result<u64> {
        Ok(self.items.len() as u64)
    }

    async fn paginate(&self, limit: u64, page: u64) -> Result<Page<T>> {
        let page = page.max(1);
        let limit = limit.max(1);
        let offset = usize::try_from(page.saturating_sub(1).saturating_mul(limit)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);

        let rows = self.items.iter().skip(offset).take(take).cloned().collect();
        Ok(Page::from_items(rows, self.items.len() as u64, limit, page))
    }
}
