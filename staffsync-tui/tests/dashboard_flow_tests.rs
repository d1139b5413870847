//! End-to-end flows through the dashboard controller against a scripted
//! backend. Time is paused so freshness and ETL waits are deterministic.

use serde_json::json;
use staffsync_test_utils::*;
use staffsync_tui::api_client::{ApiClient, ListParams};
use staffsync_tui::cache::{CacheState, PageNav};
use staffsync_tui::constants::{DashboardSettings, ETL_REMINDER};
use staffsync_tui::dashboard::Dashboard;
use staffsync_tui::etl::{EtlError, EtlPhase, RefreshStep};
use staffsync_tui::format::TableOptions;
use staffsync_tui::notifications::NotificationLevel;
use staffsync_tui::stats::ChartState;
use std::time::Duration;

fn dashboard(transport: ScriptedTransport) -> Dashboard<ScriptedTransport> {
    Dashboard::new(ApiClient::new(transport), DashboardSettings::default())
}

fn seeded(unified: usize) -> Dashboard<ScriptedTransport> {
    let transport = ScriptedTransport::new();
    seed_backend(&transport, unified);
    dashboard(transport)
}

fn backend(d: &Dashboard<ScriptedTransport>) -> &ScriptedTransport {
    d.api().transport()
}

fn preview_names(d: &Dashboard<ScriptedTransport>) -> Vec<String> {
    d.session
        .preview_page
        .rows()
        .iter()
        .map(|e| e.name.clone())
        .collect()
}

// ============================================================================
// CACHE FRESHNESS AND INVALIDATION
// ============================================================================

#[tokio::test(start_paused = true)]
async fn pages_within_window_reuse_one_fetch() {
    let mut d = seeded(25);
    assert!(d.load_preview(0).await);
    assert!(d.load_preview(1).await);
    assert!(d.load_table(2).await);
    tokio::time::advance(Duration::from_secs(29)).await;
    assert!(d.load_preview(0).await);
    assert_eq!(backend(&d).count(HttpMethod::Get, "/employes"), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(d.cache.state(), CacheState::Stale);
    assert!(d.load_preview(1).await);
    assert_eq!(backend(&d).count(HttpMethod::Get, "/employes"), 2);
    assert_eq!(d.cache.state(), CacheState::Fresh);
}

#[tokio::test(start_paused = true)]
async fn fetch_requests_whole_collection() {
    let mut d = seeded(3);
    d.load_preview(0).await;
    let request = backend(&d)
        .requests()
        .into_iter()
        .find(|r| r.path == "/employes")
        .unwrap();
    assert_eq!(request.query_value("limit"), Some("1000"));
    assert_eq!(request.query_value("offset"), Some("0"));
}

#[tokio::test(start_paused = true)]
async fn successful_write_invalidates_cache() {
    let mut d = seeded(12);
    d.load_preview(0).await;
    backend(&d).ok(
        HttpMethod::Post,
        "/sources/mysql/employes",
        json!({ "id": 99 }),
    );

    assert!(d.create_employee(MutableSource::Mysql, &sample_draft()).await);
    assert_eq!(d.cache.state(), CacheState::Empty);
    assert!(d.messages.contains(NotificationLevel::Warning, ETL_REMINDER));
    assert_eq!(backend(&d).count(HttpMethod::Get, "/sources/stats"), 1);

    d.load_preview(0).await;
    assert_eq!(backend(&d).count(HttpMethod::Get, "/employes"), 2);

    let body = backend(&d)
        .requests()
        .into_iter()
        .find(|r| r.method == HttpMethod::Post)
        .and_then(|r| r.body)
        .unwrap();
    assert_eq!(body["nom"], "Mariam Traore");
    assert!(body.get("id").is_none());
    assert!(body.get("source").is_none());
}

#[tokio::test(start_paused = true)]
async fn write_reloads_matching_source_listing() {
    let mut d = seeded(6);
    d.select_source(Source::Postgresql).await;
    backend(&d).ok(
        HttpMethod::Put,
        "/sources/postgresql/employes/4",
        json!({ "id": 4 }),
    );
    assert!(
        d.update_employee(MutableSource::Postgresql, EmployeeId(4), &sample_draft())
            .await
    );
    assert_eq!(
        backend(&d).count(HttpMethod::Get, "/sources/postgresql/employes"),
        2
    );
    assert_eq!(backend(&d).count(HttpMethod::Get, "/sources/mysql/employes"), 0);
}

#[tokio::test(start_paused = true)]
async fn invalid_draft_is_never_sent() {
    let mut d = seeded(3);
    let mut draft = sample_draft();
    draft.email = "not-an-email".to_string();
    assert!(!d.create_employee(MutableSource::Mysql, &draft).await);
    assert_eq!(backend(&d).count(HttpMethod::Post, "/sources/mysql/employes"), 0);
    assert_eq!(d.messages.with_level(NotificationLevel::Error).len(), 1);
}

// ============================================================================
// STAT RECONCILIATION
// ============================================================================

#[tokio::test(start_paused = true)]
async fn total_is_displayed_from_stats_endpoint() {
    let mut d = seeded(5);
    backend(&d).ok(HttpMethod::Get, "/stats", json!({ "total_employes": 42 }));
    d.refresh_all().await;
    assert_eq!(d.stats.total_employees().to_string(), "42");
}

#[tokio::test(start_paused = true)]
async fn chart_failure_does_not_block_total() {
    let mut d = seeded(9);
    backend(&d).fail(HttpMethod::Get, "/stats/sources", "connection reset");
    d.refresh_all().await;

    assert_eq!(d.stats.total_employees(), 9);
    assert!(matches!(d.stats.chart.state(), ChartState::Fallback(_)));
    assert_eq!(d.stats.source_counts.total(), 9);
    assert!(d
        .messages
        .with_level(NotificationLevel::Warning)
        .iter()
        .any(|n| n.message.contains("connection reset")));
    assert_eq!(d.session.preview_page.rows().len(), 9);
}

#[tokio::test(start_paused = true)]
async fn array_shape_on_map_endpoint_is_normalized() {
    let mut d = seeded(3);
    backend(&d).ok(
        HttpMethod::Get,
        "/sources/stats",
        json!([{ "source": "CSV", "count": 10 }]),
    );
    let mut stats = std::mem::take(&mut d.stats);
    let report = stats.load_source_stats(d.api(), false).await;
    d.stats = stats;
    assert!(report.is_clean());
    assert_eq!(d.stats.source_counts.csv, 10);
    assert_eq!(d.stats.source_counts.mysql, 0);
}

#[tokio::test(start_paused = true)]
async fn stats_requests_are_cache_busted() {
    let mut d = seeded(3);
    d.refresh_all().await;
    let stats = backend(&d)
        .requests()
        .into_iter()
        .find(|r| r.path == "/stats")
        .unwrap();
    assert!(stats.query_value("_").is_some());
}

// ============================================================================
// SOURCES
// ============================================================================

#[tokio::test(start_paused = true)]
async fn csv_listing_is_read_only_and_paged_locally() {
    let transport = ScriptedTransport::new();
    seed_backend(&transport, 3);
    transport.respond(
        HttpMethod::Get,
        "/sources/csv/employes",
        200,
        json!({ "success": true, "data": source_employees_json(23), "count": 23 }),
    );
    let mut d = dashboard(transport);

    assert!(d.select_source(Source::Csv).await);
    let request = backend(&d).requests().pop().unwrap();
    assert_eq!(request.query_value("limit"), Some("100"));

    let listing = d.session.source_listing.clone().unwrap();
    assert_eq!(listing.records.len(), 23);
    assert!(listing.is_read_only());
    let headers = TableOptions::source(listing.is_read_only()).headers();
    assert!(!headers.contains(&"Actions"));
    assert!(!headers.contains(&"ID"));
    assert!(Source::Csv.mutable().is_none());

    let mut rendered = d.source_page().rows().len();
    assert_eq!(d.navigate_source(PageNav::Next), 1);
    rendered += d.source_page().rows().len();
    assert_eq!(d.navigate_source(PageNav::Last), 2);
    rendered += d.source_page().rows().len();
    assert_eq!(rendered, 23);
    assert_eq!(d.navigate_source(PageNav::Next), 2);
    assert_eq!(
        backend(&d).count(HttpMethod::Get, "/sources/csv/employes"),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn filter_change_resets_source_cursor() {
    let mut d = seeded(3);
    d.select_source(Source::Mysql).await;
    d.navigate_source(PageNav::Last);
    assert_eq!(d.session.source_cursor.index(), 1);
    d.select_source(Source::Postgresql).await;
    assert_eq!(d.session.source_cursor.index(), 0);
    d.clear_source_filter();
    assert!(d.source_page().is_empty());
}

#[tokio::test(start_paused = true)]
async fn backend_rejection_is_shown_verbatim() {
    let mut d = seeded(4);
    d.load_preview(0).await;
    backend(&d).reject(
        HttpMethod::Post,
        "/sources/mysql/employes",
        "Email already exists",
    );

    assert!(!d.create_employee(MutableSource::Mysql, &sample_draft()).await);
    assert!(d
        .messages
        .contains(NotificationLevel::Error, "Email already exists"));
    assert!(d.cache.is_fresh());
    assert!(!d.messages.contains(NotificationLevel::Warning, ETL_REMINDER));
    assert_eq!(backend(&d).count(HttpMethod::Get, "/sources/stats"), 0);

    d.load_preview(0).await;
    assert_eq!(backend(&d).count(HttpMethod::Get, "/employes"), 1);
}

#[tokio::test(start_paused = true)]
async fn error_status_keeps_backend_message() {
    let mut d = seeded(4);
    backend(&d).respond(
        HttpMethod::Post,
        "/sources/postgresql/employes",
        400,
        failure_body("Email already exists"),
    );
    assert!(
        !d.create_employee(MutableSource::Postgresql, &sample_draft())
            .await
    );
    let latest = d.messages.latest().unwrap();
    assert_eq!(latest.level, NotificationLevel::Error);
    assert!(latest.message.contains("Email already exists"));
}

#[tokio::test(start_paused = true)]
async fn delete_waits_for_confirmation() {
    let mut d = seeded(4);
    d.load_preview(0).await;
    let path = "/sources/mysql/employes/7";
    backend(&d).ok(HttpMethod::Delete, path, json!(null));

    let prompt = d.request_delete(MutableSource::Mysql, EmployeeId(7), "Agent 7");
    assert!(prompt.contains("Agent 7"));
    assert!(prompt.contains("ETL"));
    d.cancel_delete();
    assert!(!d.confirm_delete().await);
    assert_eq!(backend(&d).count(HttpMethod::Delete, path), 0);

    d.request_delete(MutableSource::Mysql, EmployeeId(7), "Agent 7");
    assert!(d.confirm_delete().await);
    assert_eq!(backend(&d).count(HttpMethod::Delete, path), 1);
    assert_eq!(d.cache.state(), CacheState::Empty);
    assert!(d.session.pending_delete.is_none());
}

// ============================================================================
// ETL
// ============================================================================

#[tokio::test(start_paused = true)]
async fn reads_during_wait_are_served_from_cache() {
    let mut d = seeded(12);
    d.load_preview(0).await;
    backend(&d).ok(HttpMethod::Post, "/etl/trigger", json!({ "dag_run_id": "run-1" }));

    d.trigger_etl().await.unwrap();
    backend(&d).respond(
        HttpMethod::Get,
        "/employes",
        200,
        json!({ "success": true, "data": tagged_unified_employees_json(12, "post"), "count": 12 }),
    );

    tokio::time::advance(Duration::from_secs(10)).await;
    d.load_preview(0).await;
    assert_eq!(preview_names(&d)[0], "Employe 1");
    assert_eq!(backend(&d).count(HttpMethod::Get, "/employes"), 1);
    assert!(d.poll_etl().await.is_none());

    tokio::time::advance(Duration::from_secs(5)).await;
    let report = d.poll_etl().await.unwrap();
    assert!(report.is_success());
    assert_eq!(preview_names(&d)[0], "post 1");
    assert_eq!(d.etl.phase(), EtlPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn refresh_fetches_in_declared_order() {
    let mut d = seeded(6);
    d.initialize().await;
    backend(&d).ok(HttpMethod::Post, "/etl/trigger", json!({}));
    backend(&d).ok(HttpMethod::Get, "/stats", global_stats_json(40));
    backend(&d).ok(
        HttpMethod::Get,
        "/etl/last-sync",
        last_sync_json("2024-07-01 09:00:00", 40),
    );
    backend(&d).clear_log();

    let report = d.run_etl().await.unwrap();
    assert_eq!(report.order(), RefreshStep::ORDER.to_vec());
    assert_eq!(
        backend(&d).calls(),
        vec![
            "POST /etl/trigger",
            "GET /stats",
            "GET /stats/sources",
            "GET /sources/stats",
            "GET /etl/last-sync",
            "GET /employes",
        ]
    );
    assert_eq!(d.stats.total_employees(), 40);
    let synced = d.stats.last_sync.as_ref().and_then(|s| s.last_update).unwrap();
    assert_eq!(synced.format("%Y-%m-%d").to_string(), "2024-07-01");
    assert_eq!(d.etl.completed_runs(), 1);
}

#[tokio::test(start_paused = true)]
async fn second_trigger_while_waiting_is_busy() {
    let mut d = seeded(3);
    backend(&d).ok(HttpMethod::Post, "/etl/trigger", json!({}));
    d.trigger_etl().await.unwrap();

    let err = d.trigger_etl().await.unwrap_err();
    assert!(matches!(err, EtlError::Busy { .. }));
    assert_eq!(backend(&d).count(HttpMethod::Post, "/etl/trigger"), 1);
    assert!(d
        .messages
        .contains(NotificationLevel::Warning, "already waiting"));
}

#[tokio::test(start_paused = true)]
async fn rejected_trigger_returns_to_idle() {
    let mut d = seeded(3);
    backend(&d).reject(HttpMethod::Post, "/etl/trigger", "Airflow unreachable");

    let err = d.trigger_etl().await.unwrap_err();
    assert_eq!(err, EtlError::Rejected("Airflow unreachable".to_string()));
    assert!(d.etl.is_idle());
    assert!(d
        .messages
        .contains(NotificationLevel::Error, "Airflow unreachable"));

    tokio::time::advance(Duration::from_secs(20)).await;
    assert!(d.poll_etl().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn failed_step_does_not_stop_later_steps() {
    let mut d = seeded(6);
    backend(&d).ok(HttpMethod::Post, "/etl/trigger", json!({}));
    backend(&d).fail(HttpMethod::Get, "/etl/last-sync", "timeout");

    let report = d.run_etl().await.unwrap();
    assert!(!report.is_success());
    let failed: Vec<RefreshStep> = report.failures().map(|o| o.step).collect();
    assert_eq!(failed, vec![RefreshStep::LastSync]);
    assert_eq!(d.session.preview_page.rows().len(), 6);
    assert!(d
        .messages
        .contains(NotificationLevel::Error, "last synchronization"));
}

// ============================================================================
// DIRTY ROWS AND MALFORMED RESPONSES
// ============================================================================

#[tokio::test(start_paused = true)]
async fn one_dirty_csv_row_does_not_blank_the_listing() {
    let transport = ScriptedTransport::new();
    seed_backend(&transport, 3);
    let mut rows: Vec<_> = (1..=21).map(source_employee_json).collect();
    let mut nameless = source_employee_json(22);
    nameless["nom"] = json!("");
    let mut hand_typed = source_employee_json(23);
    hand_typed["date_embauche"] = json!("15/03/2021");
    rows.push(nameless);
    rows.push(hand_typed);
    transport.respond(
        HttpMethod::Get,
        "/sources/csv/employes",
        200,
        json!({ "success": true, "data": rows, "count": 23 }),
    );
    let mut d = dashboard(transport);

    assert!(d.select_source(Source::Csv).await);
    let listing = d.session.source_listing.clone().unwrap();
    assert_eq!(listing.records.len(), 22);
    assert_eq!(listing.total, 23);
    let last = listing.records.last().unwrap();
    assert_eq!(last.id, EmployeeId(23));
    assert_eq!(last.hire_date, None);
    assert!(d
        .messages
        .contains(NotificationLevel::Warning, "Skipped 1 invalid CSV record(s)"));

    let mut rendered = d.source_page().rows().len();
    d.navigate_source(PageNav::Next);
    rendered += d.source_page().rows().len();
    d.navigate_source(PageNav::Next);
    rendered += d.source_page().rows().len();
    assert_eq!(rendered, 22);
}

#[tokio::test(start_paused = true)]
async fn dirty_unified_row_is_dropped_from_preview() {
    let mut d = seeded(3);
    let mut rows: Vec<_> = (1..=4).map(|id| unified_employee_json(id, "MySQL")).collect();
    rows[1]["email"] = json!("   ");
    backend(&d).respond(
        HttpMethod::Get,
        "/employes",
        200,
        json!({ "success": true, "data": rows, "count": 4 }),
    );

    d.refresh_all().await;
    assert_eq!(
        preview_names(&d),
        vec!["Employe 1", "Employe 3", "Employe 4"]
    );
    assert!(d
        .messages
        .contains(NotificationLevel::Warning, "Skipped 1 invalid unified record(s)"));
    assert!(d.messages.with_level(NotificationLevel::Error).is_empty());

    d.load_preview(0).await;
    assert_eq!(
        d.messages
            .with_level(NotificationLevel::Warning)
            .iter()
            .filter(|n| n.message.starts_with("Skipped"))
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn non_json_stats_body_fails_only_its_stream() {
    let mut d = seeded(9);
    backend(&d).respond_raw(HttpMethod::Get, "/stats", 200, "<html>maintenance</html>");

    let envelope = d.api().get_stats(false).await;
    assert!(!envelope.success);
    assert!(envelope.data.is_none());
    assert!(envelope.message.starts_with("Invalid response"));

    d.refresh_all().await;
    assert_eq!(d.stats.total_employees(), 0);
    assert!(matches!(d.stats.chart.state(), ChartState::Chart(_)));
    assert_eq!(d.stats.source_counts.total(), 9);
    assert!(d
        .messages
        .contains(NotificationLevel::Warning, "Invalid response"));
    assert_eq!(d.session.preview_page.rows().len(), 9);
}

#[tokio::test(start_paused = true)]
async fn wrong_data_shape_is_a_decode_failure() {
    let mut d = seeded(5);
    backend(&d).ok(HttpMethod::Get, "/employes", json!({ "rows": [] }));

    assert!(!d.load_table(0).await);
    assert!(d.session.table_page.is_empty());
    let latest = d.messages.latest().unwrap();
    assert_eq!(latest.level, NotificationLevel::Error);
    assert!(latest.message.contains("Invalid response"));
}

#[tokio::test(start_paused = true)]
async fn plain_text_error_status_reports_the_status() {
    let mut d = seeded(3);
    backend(&d).respond_raw(
        HttpMethod::Get,
        "/sources/mysql/employes",
        502,
        "upstream connect error",
    );

    let envelope = d
        .api()
        .list_source_employees(Source::Mysql, ListParams::limit(100))
        .await;
    assert!(!envelope.success);
    assert!(envelope.message.contains("HTTP 502"));

    assert!(!d.select_source(Source::Mysql).await);
    assert!(d.session.source_listing.is_none());
    assert!(d.messages.contains(NotificationLevel::Error, "HTTP 502"));
}
