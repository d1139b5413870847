//! Dashboard constants.
//!
//! Defaults for the `[dashboard]` configuration table and fixed limits the
//! backend imposes.

use std::time::Duration;

// ============================================================================
// PAGINATION
// ============================================================================

/// Rows per page in every paginated table.
pub const PAGE_SIZE: usize = 10;

/// Hard ceiling on records requested in one unified-collection fetch.
pub const MAX_FETCH_LIMIT: usize = 1000;

/// Records requested when listing one source.
pub const SOURCE_LIST_LIMIT: usize = 100;

// ============================================================================
// TIMING
// ============================================================================

/// Age after which the cached unified collection is re-fetched.
pub const FRESHNESS_WINDOW_MS: u64 = 30_000;

/// Delay between an acknowledged ETL trigger and the post-sync refresh.
pub const ETL_WAIT_MS: u64 = 15_000;

// ============================================================================
// MESSAGES
// ============================================================================

/// Messages kept in the log before the oldest are discarded.
pub const MAX_MESSAGES: usize = 50;

pub const ETL_REMINDER: &str =
    "Remember to run the ETL (press s) to propagate this change to the unified view.";

pub const NO_UNIFIED_RECORDS: &str =
    "No employees in the unified view. Run the ETL to synchronize the sources.";

/// Tunables for the cache, pager and sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub page_size: usize,
    pub fetch_limit: usize,
    pub freshness_window: Duration,
    pub etl_wait: Duration,
    pub source_list_limit: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            fetch_limit: MAX_FETCH_LIMIT,
            freshness_window: Duration::from_millis(FRESHNESS_WINDOW_MS),
            etl_wait: Duration::from_millis(ETL_WAIT_MS),
            source_list_limit: SOURCE_LIST_LIMIT,
        }
    }
}
