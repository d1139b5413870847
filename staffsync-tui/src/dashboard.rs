//! Dashboard controller.
//!
//! [`Dashboard`] owns every piece of client state: the gateway, the
//! unified-employee cache, the statistics panel, the ETL sequencer, the
//! session (filters, cursors, loaded listings) and the message log. Views
//! read it; key handlers call its operations. Nothing lives in globals.

use crate::api_client::{ApiClient, ListParams};
use crate::cache::{total_pages, EmployeeCache, Page, PageCursor, PageNav};
use crate::constants::{DashboardSettings, ETL_REMINDER, NO_UNIFIED_RECORDS};
use crate::etl::{self, EtlError, EtlSequencer, RefreshReport, RefreshTargets};
use crate::notifications::{NotificationLevel, Notifications};
use crate::stats::{StatStream, StatsPanel, StatsReport};
use futures_util::future::join3;
use serde_json::Value;
use staffsync_core::{
    EmployeeDraft, EmployeeId, MutableSource, Source, SourceEmployee, Transport, UnifiedEmployee,
};
use tokio::time::Instant;
use uuid::Uuid;

/// Records of one source as last listed.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceListing {
    pub source: Source,
    pub records: Vec<SourceEmployee>,
    /// Count reported by the backend; may exceed the listed records.
    pub total: usize,
}

impl SourceListing {
    /// Flat-file listings are displayed without ids or actions.
    pub fn is_read_only(&self) -> bool {
        self.source.is_read_only()
    }

    pub fn page(&self, page_size: usize, index: usize) -> Page<SourceEmployee> {
        Page::slice(&self.records, self.total, page_size, index)
    }
}

/// A delete waiting for explicit confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub source: MutableSource,
    pub id: EmployeeId,
    pub name: String,
}

impl PendingDelete {
    pub fn prompt(&self) -> String {
        format!(
            "Delete \"{}\" from {}? The unified view will only reflect this after the next ETL run.",
            self.name,
            self.source.source().label()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub source_filter: Option<Source>,
    pub source_cursor: PageCursor,
    pub source_listing: Option<SourceListing>,
    pub preview_cursor: PageCursor,
    pub preview_page: Page<UnifiedEmployee>,
    pub table_cursor: PageCursor,
    pub table_page: Page<UnifiedEmployee>,
    pub pending_delete: Option<PendingDelete>,
    pub etl_status: Option<Value>,
    pub etl_history: Option<Value>,
}

pub struct Dashboard<T> {
    api: ApiClient<T>,
    settings: DashboardSettings,
    pub cache: EmployeeCache,
    pub stats: StatsPanel,
    pub etl: EtlSequencer,
    pub session: SessionState,
    pub messages: Notifications,
}

impl<T: Transport> Dashboard<T> {
    pub fn new(api: ApiClient<T>, settings: DashboardSettings) -> Self {
        Self {
            cache: EmployeeCache::new(&settings),
            etl: EtlSequencer::new(settings.etl_wait),
            stats: StatsPanel::default(),
            session: SessionState::default(),
            messages: Notifications::default(),
            api,
            settings,
        }
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) -> Uuid {
        self.messages.push(level, message)
    }

    fn warn_skipped_rows(&mut self, skipped: usize, what: &str) {
        if skipped > 0 {
            self.notify(
                NotificationLevel::Warning,
                format!("Skipped {} invalid {} record(s)", skipped, what),
            );
        }
    }

    fn warn_on_failures(&mut self, report: &StatsReport) {
        if let Some(summary) = report.summary() {
            self.notify(NotificationLevel::Warning, summary);
        }
    }

    pub async fn initialize(&mut self) {
        self.refresh_all().await;
    }

    /// Invalidate the cache, then reload statistics, last sync and the
    /// preview's first page concurrently.
    pub async fn refresh_all(&mut self) {
        self.cache.invalidate();
        self.session.preview_cursor.reset();
        self.session.table_cursor.reset();

        let (report, sync, page) = join3(
            self.stats.refresh_all(&self.api, true),
            self.api.last_sync(),
            self.cache.get_page(&self.api, 0),
        )
        .await;

        let mut report = report;
        report.record(StatStream::LastSync, self.stats.apply_last_sync(sync));
        self.warn_on_failures(&report);
        self.show_preview(page);
        self.session.table_page = self.cache.page(0);
        self.session.table_cursor.sync(&self.session.table_page);

        if self.session.source_filter.is_some() {
            self.load_source_listing().await;
        }
    }

    // ========== UNIFIED EMPLOYEES ==========

    fn show_preview(&mut self, result: Result<Page<UnifiedEmployee>, String>) -> bool {
        let skipped = self.cache.take_skipped();
        self.warn_skipped_rows(skipped, "unified");
        match result {
            Ok(page) => {
                self.session.preview_cursor.sync(&page);
                self.session.preview_page = page;
                true
            }
            Err(message) => {
                self.session.preview_page = Page::NoRecords;
                self.notify(
                    NotificationLevel::Error,
                    format!("Failed to load employees: {}", message),
                );
                false
            }
        }
    }

    fn show_table(&mut self, result: Result<Page<UnifiedEmployee>, String>) -> bool {
        let skipped = self.cache.take_skipped();
        self.warn_skipped_rows(skipped, "unified");
        match result {
            Ok(page) => {
                self.session.table_cursor.sync(&page);
                self.session.table_page = page;
                true
            }
            Err(message) => {
                self.session.table_page = Page::NoRecords;
                self.notify(
                    NotificationLevel::Error,
                    format!("Failed to load employees: {}", message),
                );
                false
            }
        }
    }

    /// Dashboard preview page `index` (zero-based).
    pub async fn load_preview(&mut self, index: usize) -> bool {
        let result = self.cache.get_page(&self.api, index).await;
        self.show_preview(result)
    }

    pub async fn navigate_preview(&mut self, nav: PageNav) -> bool {
        let target = self.session.preview_cursor.target(nav);
        self.load_preview(target).await
    }

    /// Full-table page `index` (zero-based).
    pub async fn load_table(&mut self, index: usize) -> bool {
        let result = self.cache.get_page(&self.api, index).await;
        self.show_table(result)
    }

    pub async fn navigate_table(&mut self, nav: PageNav) -> bool {
        let target = self.session.table_cursor.target(nav);
        self.load_table(target).await
    }

    pub fn empty_unified_hint(&self) -> &'static str {
        NO_UNIFIED_RECORDS
    }

    pub async fn fetch_unified_employee(&mut self, id: EmployeeId) -> Option<UnifiedEmployee> {
        match self.api.get_unified_employee(id).await.into_result() {
            Ok(record) => Some(record),
            Err(message) => {
                self.notify(NotificationLevel::Error, message);
                None
            }
        }
    }

    // ========== SOURCES ==========

    /// Change the source filter. The source cursor returns to the first page.
    pub async fn select_source(&mut self, source: Source) -> bool {
        self.session.source_filter = Some(source);
        self.session.source_cursor.reset();
        self.load_source_listing().await
    }

    pub fn clear_source_filter(&mut self) {
        self.session.source_filter = None;
        self.session.source_cursor.reset();
        self.session.source_listing = None;
    }

    /// Reload the listing for the active filter.
    pub async fn load_source_listing(&mut self) -> bool {
        let Some(source) = self.session.source_filter else {
            return false;
        };
        let envelope = self
            .api
            .list_source_employees(source, ListParams::limit(self.settings.source_list_limit))
            .await;
        let reported = envelope.total.or(envelope.count);
        let skipped = envelope.skipped;

        match envelope.into_result() {
            Ok(records) => {
                self.warn_skipped_rows(skipped, source.label());
                let total = reported.map(|t| t as usize).unwrap_or(records.len());
                self.session
                    .source_cursor
                    .resize(total_pages(records.len(), self.settings.page_size));
                self.session.source_listing = Some(SourceListing {
                    source,
                    records,
                    total,
                });
                true
            }
            Err(message) => {
                self.session.source_listing = None;
                self.notify(
                    NotificationLevel::Error,
                    format!("Failed to load {} employees: {}", source.label(), message),
                );
                false
            }
        }
    }

    pub fn source_page(&self) -> Page<SourceEmployee> {
        match &self.session.source_listing {
            Some(listing) => {
                listing.page(self.settings.page_size, self.session.source_cursor.index())
            }
            None => Page::NoRecords,
        }
    }

    pub fn navigate_source(&mut self, nav: PageNav) -> usize {
        self.session.source_cursor.apply(nav)
    }

    pub async fn fetch_source_employee(
        &mut self,
        source: Source,
        id: EmployeeId,
    ) -> Option<SourceEmployee> {
        match self.api.get_source_employee(source, id).await.into_result() {
            Ok(record) => Some(record),
            Err(message) => {
                self.notify(NotificationLevel::Error, message);
                None
            }
        }
    }

    // ========== WRITES ==========

    pub async fn create_employee(&mut self, source: MutableSource, draft: &EmployeeDraft) -> bool {
        let envelope = self.api.create_source_employee(source, draft).await;
        if envelope.is_success() {
            self.after_write(source, envelope.message, "Employee created").await;
            true
        } else {
            self.notify(NotificationLevel::Error, envelope.message);
            false
        }
    }

    pub async fn update_employee(
        &mut self,
        source: MutableSource,
        id: EmployeeId,
        draft: &EmployeeDraft,
    ) -> bool {
        let envelope = self.api.update_source_employee(source, id, draft).await;
        if envelope.is_success() {
            self.after_write(source, envelope.message, "Employee updated").await;
            true
        } else {
            self.notify(NotificationLevel::Error, envelope.message);
            false
        }
    }

    /// Stage a delete. Nothing is sent until [`Dashboard::confirm_delete`].
    pub fn request_delete(&mut self, source: MutableSource, id: EmployeeId, name: &str) -> String {
        let pending = PendingDelete {
            source,
            id,
            name: name.to_string(),
        };
        let prompt = pending.prompt();
        self.session.pending_delete = Some(pending);
        prompt
    }

    pub fn cancel_delete(&mut self) {
        if self.session.pending_delete.take().is_some() {
            self.notify(NotificationLevel::Info, "Deletion cancelled");
        }
    }

    pub async fn confirm_delete(&mut self) -> bool {
        let Some(pending) = self.session.pending_delete.take() else {
            return false;
        };
        let envelope = self
            .api
            .delete_source_employee(pending.source, pending.id)
            .await;
        if envelope.is_success() {
            self.after_write(pending.source, envelope.message, "Employee deleted")
                .await;
            true
        } else {
            self.notify(NotificationLevel::Error, envelope.message);
            false
        }
    }

    async fn after_write(&mut self, source: MutableSource, message: String, fallback: &str) {
        let text = if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        };
        self.notify(NotificationLevel::Success, text);
        self.cache.invalidate();

        let report = self.stats.load_source_stats(&self.api, true).await;
        self.warn_on_failures(&report);
        if self.session.source_filter == Some(source.source()) {
            self.load_source_listing().await;
        }
        self.notify(NotificationLevel::Warning, ETL_REMINDER);
    }

    // ========== ETL ==========

    /// Send the trigger and start the wait. The refresh itself happens in
    /// [`Dashboard::poll_etl`] once the wait is over, so reads in between
    /// are served from the pre-sync cache.
    pub async fn trigger_etl(&mut self) -> Result<Instant, EtlError> {
        if let Err(err) = self.etl.begin_trigger() {
            self.notify(NotificationLevel::Warning, err.to_string());
            return Err(err);
        }
        let envelope = self.api.trigger_etl().await;
        match self.etl.acknowledge(envelope) {
            Ok(until) => {
                self.notify(
                    NotificationLevel::Success,
                    format!(
                        "ETL triggered. Refreshing data in {} seconds...",
                        self.etl.wait().as_secs()
                    ),
                );
                Ok(until)
            }
            Err(err) => {
                self.notify(NotificationLevel::Error, err.to_string());
                Err(err)
            }
        }
    }

    /// Run the post-sync refresh if the wait is over.
    pub async fn poll_etl(&mut self) -> Option<RefreshReport> {
        if !self.etl.begin_refresh() {
            return None;
        }
        Some(self.refresh_after_etl().await)
    }

    /// Trigger, wait, then refresh, in one call.
    pub async fn run_etl(&mut self) -> Result<RefreshReport, EtlError> {
        let until = self.trigger_etl().await?;
        tokio::time::sleep_until(until).await;
        match self.poll_etl().await {
            Some(report) => Ok(report),
            None => Err(EtlError::Busy {
                phase: self.etl.phase().name(),
            }),
        }
    }

    async fn refresh_after_etl(&mut self) -> RefreshReport {
        let report = etl::refresh_sequence(
            &self.api,
            RefreshTargets {
                stats: &mut self.stats,
                cache: &mut self.cache,
                preview: &mut self.session.preview_cursor,
                preview_page: &mut self.session.preview_page,
            },
        )
        .await;
        self.etl.finish();

        let skipped = self.cache.take_skipped();
        self.warn_skipped_rows(skipped, "unified");
        self.session.table_page = self.cache.page(0);
        self.session.table_cursor.sync(&self.session.table_page);

        let failures: Vec<String> = report
            .failures()
            .map(|outcome| {
                format!(
                    "Refresh of {} failed: {}",
                    outcome.step,
                    outcome.error.as_deref().unwrap_or_default()
                )
            })
            .collect();
        if failures.is_empty() {
            self.notify(
                NotificationLevel::Success,
                "Synchronization complete. The unified view has been updated.",
            );
        } else {
            for failure in failures {
                self.notify(NotificationLevel::Error, failure);
            }
        }
        report
    }

    pub async fn load_etl_status(&mut self) -> bool {
        match self.api.etl_status().await.into_result() {
            Ok(status) => {
                self.session.etl_status = Some(status);
                true
            }
            Err(message) => {
                self.notify(NotificationLevel::Error, message);
                false
            }
        }
    }

    pub async fn load_etl_history(&mut self) -> bool {
        match self.api.etl_history().await.into_result() {
            Ok(history) => {
                self.session.etl_history = Some(history);
                true
            }
            Err(message) => {
                self.notify(NotificationLevel::Error, message);
                false
            }
        }
    }

    // ========== MESSAGES ==========

    pub fn dismiss_message(&mut self, id: Uuid) -> bool {
        self.messages.dismiss(id)
    }
}
