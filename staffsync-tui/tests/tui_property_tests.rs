use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use proptest::prelude::*;
use ratatui::style::Color;
use staffsync_core::Source;
use staffsync_tui::cache::{page_bounds, total_pages, Page, PageCursor, PageNav};
use staffsync_tui::config::{DashboardConfig, LoggingConfig, ThemeConfig, TuiConfig};
use staffsync_tui::format::{format_salary, page_label};
use staffsync_tui::keys::{map_key, Action};
use staffsync_tui::nav::View;
use staffsync_tui::persistence::{self, PersistedState};
use staffsync_tui::theme::{source_color, Palette};

fn base_config() -> TuiConfig {
    TuiConfig {
        api_base_url: "http://localhost:5000/api".to_string(),
        request_timeout_ms: 5_000,
        refresh_interval_ms: 250,
        persistence_path: "tmp/staffsync-tui.json".into(),
        logging: LoggingConfig {
            path: "tmp/staffsync-tui.log".into(),
            filter: "staffsync_tui=info".to_string(),
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

#[test]
fn base_config_is_valid() {
    let config = base_config();
    assert!(config.validate().is_ok());
    let settings = config.settings();
    assert_eq!(settings.page_size, 10);
    assert_eq!(settings.etl_wait.as_millis(), 15_000);
}

#[test]
fn config_requires_http_base_url() {
    let mut config = base_config();
    config.api_base_url = "localhost:5000".to_string();
    assert!(config.validate().is_err());
    config.api_base_url = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_requires_known_theme_mode() {
    let mut config = base_config();
    config.theme = ThemeConfig {
        mode: "solarized".to_string(),
    };
    assert!(config.validate().is_err());
    config.theme.mode = "Dark".to_string();
    assert!(config.validate().is_ok());
    assert!(config.dark_mode());
}

#[test]
fn config_rejects_unknown_fields() {
    let toml = r#"
        api_base_url = "http://localhost:5000/api"
        request_timeout_ms = 5000
        refresh_interval_ms = 250
        persistence_path = "tmp/state.json"
        retries = 3

        [logging]
        path = "tmp/tui.log"
        filter = "info"

        [theme]
        mode = "dark"

        [dashboard]
        page_size = 10
        fetch_limit = 1000
        freshness_window_ms = 30000
        etl_wait_ms = 15000
        source_list_limit = 100
    "#;
    assert!(TuiConfig::from_toml(toml).is_err());
    let valid = toml.replace("retries = 3", "");
    let config = TuiConfig::from_toml(&valid).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn persisted_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");
    assert!(persistence::load(&path).unwrap().is_none());

    let state = PersistedState {
        dark_mode: true,
        active_view: View::Sources,
    };
    persistence::save(&path, &state).unwrap();
    assert_eq!(persistence::load(&path).unwrap(), Some(state));
}

#[test]
fn source_colours_are_fixed() {
    assert_eq!(source_color(Some(Source::Csv)), Color::Rgb(0x10, 0xb9, 0x81));
    assert_eq!(source_color(Some(Source::Mysql)), Color::Rgb(0x3b, 0x82, 0xf6));
    assert_eq!(
        source_color(Some(Source::Postgresql)),
        Color::Rgb(0xf5, 0x9e, 0x0b)
    );
    assert_eq!(source_color(None), Color::Rgb(0x6b, 0x72, 0x80));
    assert_ne!(Palette::light(), Palette::dark());
}

#[test]
fn ctrl_c_quits_and_ctrl_r_refreshes() {
    let quit = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(map_key(quit), Some(Action::Quit));
    let refresh = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
    assert_eq!(map_key(refresh), Some(Action::Refresh));
    let select = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
    assert_eq!(map_key(select), Some(Action::SelectSource(Source::Csv)));
}

proptest! {
    #[test]
    fn keybinding_digit_switches_view(digit in 0u8..=9u8) {
        let ch = char::from(b'0' + digit);
        let event = KeyEvent {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        };
        let action = map_key(event);
        match ch {
            '1'..='3' => {
                let index = (digit - 1) as usize;
                prop_assert_eq!(action, Some(Action::SwitchView(index)));
                prop_assert!(View::from_index(index).is_some());
            }
            _ => prop_assert!(action.is_none()),
        }
    }

    #[test]
    fn navigation_keys_consistent(use_vim in prop::bool::ANY) {
        let (down, up) = if use_vim {
            (KeyCode::Char('j'), KeyCode::Char('k'))
        } else {
            (KeyCode::Down, KeyCode::Up)
        };
        prop_assert_eq!(map_key(KeyEvent::new(down, KeyModifiers::NONE)), Some(Action::MoveDown));
        prop_assert_eq!(map_key(KeyEvent::new(up, KeyModifiers::NONE)), Some(Action::MoveUp));
    }

    #[test]
    fn all_action_keys_mapped(key_char in "[qnedsrtxcmp?hjklgG]") {
        let ch = key_char.chars().next().unwrap();
        let event = KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE);
        prop_assert!(map_key(event).is_some(), "Key '{}' should map to an action", ch);
    }

    #[test]
    fn view_cycle_round_trips(index in 0usize..3) {
        let view = View::from_index(index).unwrap();
        prop_assert_eq!(view.next().previous(), view);
        prop_assert_eq!(view.index(), index);
    }

    #[test]
    fn invalid_fetch_limit_rejected(limit in prop_oneof![Just(0usize), 1001usize..5000]) {
        let mut config = base_config();
        config.dashboard.fetch_limit = limit;
        prop_assert!(config.validate().is_err());
    }

    #[test]
    fn valid_dashboard_settings_accepted(
        page_size in 1usize..50,
        fetch_limit in 1usize..=1000,
        wait in 0u64..60_000,
    ) {
        let mut config = base_config();
        config.dashboard.page_size = page_size;
        config.dashboard.fetch_limit = fetch_limit;
        config.dashboard.etl_wait_ms = wait;
        prop_assert!(config.validate().is_ok());
    }

    // ========================================================================
    // Pagination bounds
    // ========================================================================

    #[test]
    fn page_slice_length_is_bounded(total in 0usize..250, index in 0usize..40) {
        let records: Vec<usize> = (0..total).collect();
        let page = Page::slice(&records, total, 10, index);
        let pages = total_pages(total, 10);

        if total == 0 {
            prop_assert!(page.is_empty());
            prop_assert!(page_label(page.index(), page.total_pages()).is_none());
        } else {
            prop_assert_eq!(pages, (total + 9) / 10);
            let effective = index.min(pages - 1);
            let expected = 10usize.min(total - effective * 10);
            prop_assert_eq!(page.rows().len(), expected);
            prop_assert_eq!(page.index(), effective);
            prop_assert_eq!(page.rows().first().copied(), Some(effective * 10));
        }
    }

    #[test]
    fn out_of_range_page_equals_last_page(total in 1usize..250, beyond in 0usize..20) {
        let records: Vec<usize> = (0..total).collect();
        let pages = total_pages(total, 10);
        let last = Page::slice(&records, total, 10, pages - 1);
        let clamped = Page::slice(&records, total, 10, pages + beyond);
        prop_assert_eq!(last.rows(), clamped.rows());
        prop_assert_eq!(page_bounds(total, 10, pages + beyond), page_bounds(total, 10, pages - 1));
    }

    #[test]
    fn cursor_stays_within_pages(
        pages in 0usize..30,
        moves in prop::collection::vec(0u8..5, 0..40),
    ) {
        let mut cursor = PageCursor::new();
        cursor.resize(pages);
        for step in moves {
            let nav = match step {
                0 => PageNav::First,
                1 => PageNav::Previous,
                2 => PageNav::Next,
                3 => PageNav::Last,
                _ => PageNav::Goto(usize::MAX),
            };
            let index = cursor.apply(nav);
            prop_assert!(index <= pages.saturating_sub(1));
        }
    }

    #[test]
    fn salary_always_ends_with_currency(amount in 0f64..1.0e9) {
        let text = format_salary(Some(amount));
        prop_assert!(text.ends_with(" FCFA"));
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        prop_assert_eq!(digits.parse::<i64>().unwrap(), amount.round() as i64);
    }
}
