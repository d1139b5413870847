//! Unified-employee cache and pager.
//!
//! One [`EmployeeCache`] holds the whole unified collection (up to the
//! fetch limit) and serves zero-based pages from memory while the copy is
//! younger than the freshness window. The dashboard preview and the full
//! table both read from it, each through its own [`PageCursor`].
//!
//! Freshness is measured on the tokio clock so paused-time tests can step
//! through the window deterministically.

use crate::api_client::{ApiClient, ListParams};
use crate::constants::DashboardSettings;
use staffsync_core::{Transport, UnifiedEmployee};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Loading,
    Fresh,
    Stale,
}

/// Clamp `index` to the last valid page and return it with the slice
/// bounds `[start, end)` for a collection of `len` records.
pub fn page_bounds(len: usize, page_size: usize, index: usize) -> (usize, usize, usize) {
    let pages = total_pages(len, page_size);
    let index = index.min(pages.saturating_sub(1));
    let start = (index * page_size).min(len);
    let end = (start + page_size).min(len);
    (index, start, end)
}

/// `ceil(len / page_size)`.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// One served page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<R> {
    pub index: usize,
    pub total_pages: usize,
    /// Records held locally; pages are cut from these.
    pub total: usize,
    /// Count reported by the backend, which may exceed `total` when the
    /// fetch limit truncated the collection.
    pub reported_total: usize,
    pub records: Vec<R>,
}

/// Result of a page read. An empty collection is an explicit signal, never
/// an empty table.
#[derive(Debug, Clone, PartialEq)]
pub enum Page<R> {
    NoRecords,
    Rows(PageView<R>),
}

impl<R: Clone> Page<R> {
    pub fn slice(records: &[R], reported_total: usize, page_size: usize, index: usize) -> Self {
        if records.is_empty() {
            return Page::NoRecords;
        }
        let (index, start, end) = page_bounds(records.len(), page_size, index);
        Page::Rows(PageView {
            index,
            total_pages: total_pages(records.len(), page_size),
            total: records.len(),
            reported_total: reported_total.max(records.len()),
            records: records[start..end].to_vec(),
        })
    }
}

impl<R> Default for Page<R> {
    fn default() -> Self {
        Page::NoRecords
    }
}

impl<R> Page<R> {
    pub fn rows(&self) -> &[R] {
        match self {
            Page::NoRecords => &[],
            Page::Rows(view) => &view.records,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Page::NoRecords => 0,
            Page::Rows(view) => view.index,
        }
    }

    pub fn total_pages(&self) -> usize {
        match self {
            Page::NoRecords => 0,
            Page::Rows(view) => view.total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Page::NoRecords)
    }
}

// ============================================================================
// CURSOR
// ============================================================================

/// Requested page movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNav {
    First,
    Previous,
    Next,
    Last,
    Goto(usize),
}

/// Zero-based page position clamped to `[0, last]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCursor {
    index: usize,
    total_pages: usize,
}

impl PageCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Record a new page count and re-clamp the position.
    pub fn resize(&mut self, total_pages: usize) {
        self.total_pages = total_pages;
        self.index = self.index.min(self.last());
    }

    pub fn last(&self) -> usize {
        self.total_pages.saturating_sub(1)
    }

    /// Target index for `nav`, without moving.
    pub fn target(&self, nav: PageNav) -> usize {
        let target = match nav {
            PageNav::First => 0,
            PageNav::Previous => self.index.saturating_sub(1),
            PageNav::Next => self.index.saturating_add(1),
            PageNav::Last => self.last(),
            PageNav::Goto(index) => index,
        };
        target.min(self.last())
    }

    pub fn apply(&mut self, nav: PageNav) -> usize {
        self.index = self.target(nav);
        self.index
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index < self.last()
    }

    /// Adopt the index a page was actually served at.
    pub fn sync<R>(&mut self, page: &Page<R>) {
        self.total_pages = page.total_pages();
        self.index = page.index();
    }
}

// ============================================================================
// CACHE
// ============================================================================

pub struct EmployeeCache {
    records: Vec<UnifiedEmployee>,
    reported_total: usize,
    fetched_at: Option<Instant>,
    loading: bool,
    page_size: usize,
    fetch_limit: usize,
    freshness_window: Duration,
    fetches: u64,
    skipped: usize,
}

impl EmployeeCache {
    pub fn new(settings: &DashboardSettings) -> Self {
        Self {
            records: Vec::new(),
            reported_total: 0,
            fetched_at: None,
            loading: false,
            page_size: settings.page_size.max(1),
            fetch_limit: settings.fetch_limit,
            freshness_window: settings.freshness_window,
            fetches: 0,
            skipped: 0,
        }
    }

    pub fn state(&self) -> CacheState {
        if self.loading {
            return CacheState::Loading;
        }
        match self.fetched_at {
            None => CacheState::Empty,
            Some(at) if at.elapsed() < self.freshness_window => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.state() == CacheState::Fresh
    }

    /// Drop the held collection; the next read re-fetches everything.
    pub fn invalidate(&mut self) {
        if self.fetched_at.is_some() {
            tracing::debug!(records = self.records.len(), "Employee cache invalidated");
        }
        self.records.clear();
        self.reported_total = 0;
        self.fetched_at = None;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn reported_total(&self) -> usize {
        self.reported_total
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.records.len(), self.page_size)
    }

    /// Number of network fetches performed so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches
    }

    /// Rows the last fetch dropped as invalid. Reading resets the count so
    /// each fetch is reported once.
    pub fn take_skipped(&mut self) -> usize {
        std::mem::take(&mut self.skipped)
    }

    /// Age of the held collection, if any.
    pub fn age(&self) -> Option<Duration> {
        self.fetched_at.map(|at| at.elapsed())
    }

    /// Re-fetch the full collection when empty or stale.
    pub async fn ensure_fresh<T: Transport>(&mut self, api: &ApiClient<T>) -> Result<(), String> {
        match self.state() {
            CacheState::Fresh => Ok(()),
            _ => self.reload(api).await,
        }
    }

    async fn reload<T: Transport>(&mut self, api: &ApiClient<T>) -> Result<(), String> {
        self.loading = true;
        self.fetches += 1;
        let envelope = api
            .list_unified_employees(ListParams::limit(self.fetch_limit).with_offset(0))
            .await;
        self.loading = false;

        let count = envelope.count;
        let skipped = envelope.skipped;
        match envelope.into_result() {
            Ok(records) => {
                self.skipped = skipped;
                self.reported_total = count.map(|c| c as usize).unwrap_or(records.len());
                self.records = records;
                self.fetched_at = Some(Instant::now());
                tracing::debug!(
                    records = self.records.len(),
                    reported_total = self.reported_total,
                    "Employee cache refreshed"
                );
                Ok(())
            }
            Err(message) => {
                self.invalidate();
                Err(message)
            }
        }
    }

    /// Serve page `index`, fetching first when the held copy is empty or
    /// stale. Out-of-range indexes clamp to the last page.
    pub async fn get_page<T: Transport>(
        &mut self,
        api: &ApiClient<T>,
        index: usize,
    ) -> Result<Page<UnifiedEmployee>, String> {
        self.ensure_fresh(api).await?;
        Ok(self.page(index))
    }

    /// Cut a page from whatever is held, without touching the network.
    pub fn page(&self, index: usize) -> Page<UnifiedEmployee> {
        Page::slice(&self.records, self.reported_total, self.page_size, index)
    }
}
