//! Keyboard-driven flows through the application state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::json;
use staffsync_test_utils::*;
use staffsync_tui::api_client::ApiClient;
use staffsync_tui::config::{DashboardConfig, LoggingConfig, ThemeConfig, TuiConfig};
use staffsync_tui::constants::ETL_REMINDER;
use staffsync_tui::etl::EtlPhase;
use staffsync_tui::nav::View;
use staffsync_tui::notifications::NotificationLevel;
use staffsync_tui::state::{App, EmployeeForm, FormMode};
use std::time::Duration;

fn base_config() -> TuiConfig {
    TuiConfig {
        api_base_url: "http://localhost:5000/api".to_string(),
        request_timeout_ms: 5_000,
        refresh_interval_ms: 250,
        persistence_path: "tmp/staffsync-tui.json".into(),
        logging: LoggingConfig {
            path: "tmp/staffsync-tui.log".into(),
            filter: "info".to_string(),
        },
        theme: ThemeConfig {
            mode: "light".to_string(),
        },
        dashboard: DashboardConfig {
            page_size: 10,
            fetch_limit: 1000,
            freshness_window_ms: 30_000,
            etl_wait_ms: 15_000,
            source_list_limit: 100,
        },
    }
}

async fn app(unified: usize) -> App<ScriptedTransport> {
    let transport = ScriptedTransport::new();
    seed_backend(&transport, unified);
    let mut app = App::new(base_config(), ApiClient::new(transport));
    app.dashboard.initialize().await;
    app
}

fn backend(app: &App<ScriptedTransport>) -> &ScriptedTransport {
    app.dashboard.api().transport()
}

async fn press(app: &mut App<ScriptedTransport>, code: KeyCode) -> bool {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).await
}

async fn type_text(app: &mut App<ScriptedTransport>, text: &str) {
    for ch in text.chars() {
        press(app, KeyCode::Char(ch)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn flat_file_source_refuses_new_records() {
    let mut app = app(6).await;
    press(&mut app, KeyCode::Char('c')).await;
    assert_eq!(app.active_view, View::Sources);
    assert_eq!(app.dashboard.session.source_filter, Some(Source::Csv));

    press(&mut app, KeyCode::Char('n')).await;
    assert!(app.form.is_none());
    assert!(app
        .dashboard
        .messages
        .contains(NotificationLevel::Warning, "read-only"));

    press(&mut app, KeyCode::Char('d')).await;
    assert!(app.dashboard.session.pending_delete.is_none());
}

#[tokio::test(start_paused = true)]
async fn create_form_submits_typed_fields() {
    let mut app = app(6).await;
    backend(&app).ok(HttpMethod::Post, "/sources/mysql/employes", json!({ "id": 13 }));

    press(&mut app, KeyCode::Char('m')).await;
    press(&mut app, KeyCode::Char('n')).await;
    assert_eq!(
        app.form.as_ref().map(|f| f.mode),
        Some(FormMode::Create(MutableSource::Mysql))
    );

    type_text(&mut app, "Awa Diallo").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "awa@example.com").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "Informatique").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "350 000").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "2022-05-01").await;
    press(&mut app, KeyCode::Enter).await;

    assert!(app.form.is_none());
    let body = backend(&app)
        .requests()
        .into_iter()
        .find(|r| r.method == HttpMethod::Post)
        .and_then(|r| r.body)
        .unwrap();
    assert_eq!(body["nom"], "Awa Diallo");
    assert_eq!(body["email"], "awa@example.com");
    assert_eq!(body["salaire"], 350000.0);
    assert_eq!(body["date_embauche"], "2022-05-01");
    assert!(app
        .dashboard
        .messages
        .contains(NotificationLevel::Warning, ETL_REMINDER));
}

#[tokio::test(start_paused = true)]
async fn bad_salary_keeps_form_open() {
    let mut app = app(3).await;
    press(&mut app, KeyCode::Char('p')).await;
    press(&mut app, KeyCode::Char('n')).await;
    type_text(&mut app, "Koffi").await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "koffi@example.com").await;
    press(&mut app, KeyCode::Tab).await;
    press(&mut app, KeyCode::Tab).await;
    type_text(&mut app, "beaucoup").await;
    press(&mut app, KeyCode::Enter).await;

    let form = app.form.as_ref().unwrap();
    assert!(form.error.as_deref().unwrap().contains("Salary"));
    assert_eq!(
        backend(&app).count(HttpMethod::Post, "/sources/postgresql/employes"),
        0
    );

    press(&mut app, KeyCode::Esc).await;
    assert!(app.form.is_none());
}

#[tokio::test(start_paused = true)]
async fn edit_prefills_from_fetched_record() {
    let mut app = app(3).await;
    let path = "/sources/mysql/employes/2";
    backend(&app).ok(HttpMethod::Get, path, source_employee_json(2));
    backend(&app).ok(HttpMethod::Put, path, json!({ "id": 2 }));

    press(&mut app, KeyCode::Char('m')).await;
    press(&mut app, KeyCode::Char('j')).await;
    press(&mut app, KeyCode::Char('e')).await;

    let form = app.form.as_ref().unwrap();
    assert_eq!(form.mode, FormMode::Edit(MutableSource::Mysql, EmployeeId(2)));
    assert_eq!(form.value(0), "Agent 2");
    assert_eq!(form.value(3), "275000");

    press(&mut app, KeyCode::Enter).await;
    assert!(app.form.is_none());
    assert_eq!(backend(&app).count(HttpMethod::Put, path), 1);
}

#[tokio::test(start_paused = true)]
async fn delete_asks_before_sending() {
    let mut app = app(3).await;
    let path = "/sources/postgresql/employes/1";
    backend(&app).ok(HttpMethod::Delete, path, json!(null));

    press(&mut app, KeyCode::Char('p')).await;
    press(&mut app, KeyCode::Char('d')).await;
    assert!(app.dashboard.session.pending_delete.is_some());
    press(&mut app, KeyCode::Char('n')).await;
    assert!(app.dashboard.session.pending_delete.is_none());
    assert!(app.form.is_none());

    press(&mut app, KeyCode::Char('d')).await;
    press(&mut app, KeyCode::Char('y')).await;
    assert_eq!(backend(&app).count(HttpMethod::Delete, path), 1);
}

#[tokio::test(start_paused = true)]
async fn etl_refresh_runs_on_tick_after_wait() {
    let mut app = app(6).await;
    backend(&app).ok(HttpMethod::Post, "/etl/trigger", json!({}));

    press(&mut app, KeyCode::Char('s')).await;
    assert!(matches!(app.dashboard.etl.phase(), EtlPhase::Waiting { .. }));
    let fetches = backend(&app).count(HttpMethod::Get, "/employes");

    app.on_tick().await;
    assert_eq!(backend(&app).count(HttpMethod::Get, "/employes"), fetches);

    tokio::time::advance(Duration::from_secs(15)).await;
    app.on_tick().await;
    assert_eq!(backend(&app).count(HttpMethod::Get, "/employes"), fetches + 1);
    assert!(app.dashboard.etl.is_idle());
}

#[tokio::test(start_paused = true)]
async fn view_keys_and_theme_toggle() {
    let mut app = app(14).await;
    press(&mut app, KeyCode::Char('2')).await;
    assert_eq!(app.active_view, View::Unified);
    assert_eq!(app.dashboard.session.table_page.rows().len(), 10);

    press(&mut app, KeyCode::Char('l')).await;
    assert_eq!(app.dashboard.session.table_cursor.index(), 1);
    assert_eq!(app.visible_rows(), 4);
    press(&mut app, KeyCode::Char('k')).await;
    assert_eq!(app.selected_row, 3);

    press(&mut app, KeyCode::Char('t')).await;
    assert!(app.persisted().dark_mode);
    assert_eq!(app.persisted().active_view, View::Unified);

    press(&mut app, KeyCode::Char('x')).await;
    assert!(press(&mut app, KeyCode::Char('q')).await);
}

#[tokio::test(start_paused = true)]
async fn help_modal_swallows_keys_until_closed() {
    let mut app = app(3).await;
    press(&mut app, KeyCode::Char('?')).await;
    assert!(app.modal.is_some());
    press(&mut app, KeyCode::Char('2')).await;
    assert_eq!(app.active_view, View::Dashboard);
    press(&mut app, KeyCode::Esc).await;
    assert!(app.modal.is_none());
}

#[test]
fn form_rejects_malformed_date() {
    let mut form = EmployeeForm::new(FormMode::Create(MutableSource::Postgresql));
    for (i, value) in ["Awa", "awa@example.com", "", "", "01/02/2020"].iter().enumerate() {
        form.focus = i;
        for ch in value.chars() {
            form.input(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }
    let err = form.to_draft().unwrap_err();
    assert!(err.contains("Hire date"));
}
