//! Application state and key handling.

use crate::api_client::ApiClient;
use crate::cache::PageNav;
use crate::config::TuiConfig;
use crate::dashboard::Dashboard;
use crate::keys::{map_key, Action};
use crate::nav::View;
use crate::notifications::NotificationLevel;
use crate::persistence::PersistedState;
use crate::theme::Palette;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Style;
use staffsync_core::timefmt::parse_calendar_date;
use staffsync_core::{
    EmployeeDraft, EmployeeId, MutableSource, Source, SourceEmployee, Transport, UnifiedEmployee,
};
use tui_textarea::TextArea;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub title: String,
    pub message: String,
}

/// Record shown in the detail overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailRecord {
    Unified(UnifiedEmployee),
    Source(Source, SourceEmployee),
}

// ============================================================================
// EMPLOYEE FORM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create(MutableSource),
    Edit(MutableSource, EmployeeId),
}

impl FormMode {
    pub fn source(&self) -> MutableSource {
        match self {
            FormMode::Create(source) | FormMode::Edit(source, _) => *source,
        }
    }

    pub fn title(&self) -> String {
        match self {
            FormMode::Create(source) => format!("New employee ({})", source.source().label()),
            FormMode::Edit(source, id) => {
                format!("Edit employee #{} ({})", id, source.source().label())
            }
        }
    }
}

pub const FORM_LABELS: [&str; 5] = ["Name", "Email", "Department", "Salary", "Hire date (YYYY-MM-DD)"];

/// Create/edit form, one single-line text area per field.
pub struct EmployeeForm {
    pub mode: FormMode,
    pub fields: Vec<TextArea<'static>>,
    pub focus: usize,
    pub error: Option<String>,
}

impl EmployeeForm {
    pub fn new(mode: FormMode) -> Self {
        Self::with_values(mode, &EmployeeDraft::default())
    }

    pub fn with_values(mode: FormMode, draft: &EmployeeDraft) -> Self {
        let values = [
            draft.name.clone(),
            draft.email.clone(),
            draft.department.clone().unwrap_or_default(),
            draft
                .salary
                .map(|s| format!("{}", s.round() as i64))
                .unwrap_or_default(),
            draft
                .hire_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ];
        let fields = values
            .into_iter()
            .map(|value| {
                let mut area = TextArea::from([value]);
                area.set_cursor_line_style(Style::default());
                area.move_cursor(tui_textarea::CursorMove::End);
                area
            })
            .collect();
        Self {
            mode,
            fields,
            focus: 0,
            error: None,
        }
    }

    pub fn value(&self, index: usize) -> String {
        self.fields
            .get(index)
            .map(|area| area.lines().join(""))
            .unwrap_or_default()
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_previous(&mut self) {
        self.focus = if self.focus == 0 {
            self.fields.len() - 1
        } else {
            self.focus - 1
        };
    }

    pub fn input(&mut self, key: KeyEvent) {
        if let Some(area) = self.fields.get_mut(self.focus) {
            area.input(key);
        }
    }

    /// Parse the fields into a request body.
    pub fn to_draft(&self) -> Result<EmployeeDraft, String> {
        let optional = |index: usize| {
            let value = self.value(index).trim().to_string();
            (!value.is_empty()).then_some(value)
        };

        let salary = match optional(3) {
            Some(raw) => {
                let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
                let value = compact
                    .parse::<f64>()
                    .map_err(|_| format!("Salary must be a number, got \"{}\"", raw))?;
                Some(value)
            }
            None => None,
        };
        let hire_date = match optional(4) {
            Some(raw) => Some(
                parse_calendar_date(&raw)
                    .ok_or_else(|| format!("Hire date must be YYYY-MM-DD, got \"{}\"", raw))?,
            ),
            None => None,
        };

        let draft = EmployeeDraft {
            name: self.value(0).trim().to_string(),
            email: self.value(1).trim().to_string(),
            department: optional(2),
            salary,
            hire_date,
        };
        draft.validate().map_err(|err| err.to_string())?;
        Ok(draft)
    }
}

// ============================================================================
// APP
// ============================================================================

pub struct App<T> {
    pub config: TuiConfig,
    pub palette: Palette,
    pub dark_mode: bool,
    pub active_view: View,
    pub dashboard: Dashboard<T>,
    /// Highlighted row within the visible page.
    pub selected_row: usize,
    pub form: Option<EmployeeForm>,
    pub modal: Option<Modal>,
    pub detail: Option<DetailRecord>,
}

impl<T: Transport> App<T> {
    pub fn new(config: TuiConfig, api: ApiClient<T>) -> Self {
        let dark_mode = config.dark_mode();
        let dashboard = Dashboard::new(api, config.settings());
        Self {
            palette: Palette::for_mode(dark_mode),
            dark_mode,
            active_view: View::Dashboard,
            dashboard,
            selected_row: 0,
            form: None,
            modal: None,
            detail: None,
            config,
        }
    }

    pub fn restore(&mut self, state: &PersistedState) {
        self.dark_mode = state.dark_mode;
        self.palette = Palette::for_mode(state.dark_mode);
        self.active_view = state.active_view;
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            dark_mode: self.dark_mode,
            active_view: self.active_view,
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.dashboard.messages.push(level, message);
    }

    pub fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.palette = Palette::for_mode(self.dark_mode);
    }

    /// Number of rows on the page the active view shows.
    pub fn visible_rows(&self) -> usize {
        match self.active_view {
            View::Dashboard => self.dashboard.session.preview_page.rows().len(),
            View::Unified => self.dashboard.session.table_page.rows().len(),
            View::Sources => self.dashboard.source_page().rows().len(),
        }
    }

    pub fn selected_unified(&self) -> Option<&UnifiedEmployee> {
        let page = match self.active_view {
            View::Dashboard => &self.dashboard.session.preview_page,
            View::Unified => &self.dashboard.session.table_page,
            View::Sources => return None,
        };
        page.rows().get(self.selected_row)
    }

    pub fn selected_source_employee(&self) -> Option<SourceEmployee> {
        if self.active_view != View::Sources {
            return None;
        }
        self.dashboard
            .source_page()
            .rows()
            .get(self.selected_row)
            .cloned()
    }

    pub fn select_next(&mut self) {
        let rows = self.visible_rows();
        self.selected_row = if rows == 0 {
            0
        } else {
            (self.selected_row + 1) % rows
        };
    }

    pub fn select_previous(&mut self) {
        let rows = self.visible_rows();
        self.selected_row = match (rows, self.selected_row) {
            (0, _) => 0,
            (_, 0) => rows - 1,
            (_, current) => current - 1,
        };
    }

    async fn switch_view(&mut self, view: View) {
        self.active_view = view;
        self.selected_row = 0;
        self.detail = None;
        match view {
            View::Unified => {
                let index = self.dashboard.session.table_cursor.index();
                self.dashboard.load_table(index).await;
            }
            View::Sources => {
                if self.dashboard.session.source_filter.is_some()
                    && self.dashboard.session.source_listing.is_none()
                {
                    self.dashboard.load_source_listing().await;
                }
            }
            View::Dashboard => {}
        }
    }

    async fn navigate(&mut self, nav: PageNav) {
        self.selected_row = 0;
        match self.active_view {
            View::Dashboard => {
                self.dashboard.navigate_preview(nav).await;
            }
            View::Unified => {
                self.dashboard.navigate_table(nav).await;
            }
            View::Sources => {
                self.dashboard.navigate_source(nav);
            }
        }
    }

    /// Mutable filter, or a message explaining why writes are unavailable.
    fn writable_source(&mut self) -> Option<MutableSource> {
        if self.active_view != View::Sources {
            self.notify(
                NotificationLevel::Info,
                "Open the Sources view (3) to edit records",
            );
            return None;
        }
        match self.dashboard.session.source_filter {
            None => {
                self.notify(NotificationLevel::Info, "Select a source first (c, m or p)");
                None
            }
            Some(source) => match source.mutable() {
                Some(mutable) => Some(mutable),
                None => {
                    self.notify(
                        NotificationLevel::Warning,
                        format!("The {} source is read-only", source.label()),
                    );
                    None
                }
            },
        }
    }

    async fn open_edit_form(&mut self) {
        let Some(source) = self.writable_source() else {
            return;
        };
        let Some(selected) = self.selected_source_employee() else {
            self.notify(NotificationLevel::Info, "No employee selected");
            return;
        };
        if let Some(record) = self
            .dashboard
            .fetch_source_employee(source.source(), selected.id)
            .await
        {
            self.form = Some(EmployeeForm::with_values(
                FormMode::Edit(source, record.id),
                &record.to_draft(),
            ));
        }
    }

    fn request_delete(&mut self) {
        let Some(source) = self.writable_source() else {
            return;
        };
        match self.selected_source_employee() {
            Some(record) => {
                self.dashboard.request_delete(source, record.id, &record.name);
            }
            None => self.notify(NotificationLevel::Info, "No employee selected"),
        }
    }

    async fn show_detail(&mut self) {
        if self.active_view == View::Sources {
            let Some(source) = self.dashboard.session.source_filter else {
                return;
            };
            if let Some(selected) = self.selected_source_employee() {
                if let Some(record) = self.dashboard.fetch_source_employee(source, selected.id).await {
                    self.detail = Some(DetailRecord::Source(source, record));
                }
            }
        } else if let Some(id) = self.selected_unified().map(|e| e.id) {
            if let Some(record) = self.dashboard.fetch_unified_employee(id).await {
                self.detail = Some(DetailRecord::Unified(record));
            }
        }
    }

    async fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(message) => {
                form.error = Some(message);
                return;
            }
        };
        let mode = form.mode;
        let saved = match mode {
            FormMode::Create(source) => self.dashboard.create_employee(source, &draft).await,
            FormMode::Edit(source, id) => self.dashboard.update_employee(source, id, &draft).await,
        };
        if saved {
            self.form = None;
            self.selected_row = 0;
        } else if let Some(form) = self.form.as_mut() {
            form.error = self
                .dashboard
                .messages
                .latest()
                .map(|n| n.message.clone());
        }
    }

    async fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Enter => self.submit_form().await,
            KeyCode::Tab | KeyCode::Down => {
                if let Some(form) = self.form.as_mut() {
                    form.focus_next();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if let Some(form) = self.form.as_mut() {
                    form.focus_previous();
                }
            }
            _ => {
                if let Some(form) = self.form.as_mut() {
                    form.input(key);
                }
            }
        }
    }

    async fn handle_delete_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.dashboard.confirm_delete().await;
                self.selected_row = 0;
            }
            KeyCode::Char('n') | KeyCode::Esc => self.dashboard.cancel_delete(),
            _ => {}
        }
    }

    /// Route a key press. Returns `true` when the app should exit.
    pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        if self.form.is_some() {
            self.handle_form_key(key).await;
            return false;
        }
        if self.dashboard.session.pending_delete.is_some() {
            self.handle_delete_key(key).await;
            return false;
        }
        if self.modal.is_some() || self.detail.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?')) {
                self.modal = None;
                self.detail = None;
            }
            return false;
        }
        match map_key(key) {
            Some(action) => self.handle_action(action).await,
            None => false,
        }
    }

    pub async fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::NextView => self.switch_view(self.active_view.next()).await,
            Action::PrevView => self.switch_view(self.active_view.previous()).await,
            Action::SwitchView(index) => {
                if let Some(view) = View::from_index(index) {
                    self.switch_view(view).await;
                }
            }
            Action::MoveDown => self.select_next(),
            Action::MoveUp => self.select_previous(),
            Action::FirstPage => self.navigate(PageNav::First).await,
            Action::PrevPage => self.navigate(PageNav::Previous).await,
            Action::NextPage => self.navigate(PageNav::Next).await,
            Action::LastPage => self.navigate(PageNav::Last).await,
            Action::SelectSource(source) => {
                self.active_view = View::Sources;
                self.selected_row = 0;
                self.dashboard.select_source(source).await;
            }
            Action::NewItem => {
                if let Some(source) = self.writable_source() {
                    self.form = Some(EmployeeForm::new(FormMode::Create(source)));
                }
            }
            Action::EditItem => self.open_edit_form().await,
            Action::DeleteItem => self.request_delete(),
            Action::TriggerEtl => {
                let _ = self.dashboard.trigger_etl().await;
            }
            Action::Refresh => {
                self.selected_row = 0;
                self.dashboard.refresh_all().await;
            }
            Action::ToggleTheme => self.toggle_theme(),
            Action::DismissMessage => {
                self.dashboard.messages.dismiss_latest();
            }
            Action::OpenHelp => {
                self.modal = Some(Modal {
                    title: "Keybindings".to_string(),
                    message: HELP_TEXT.to_string(),
                })
            }
            Action::Confirm => self.show_detail().await,
            Action::Cancel => {
                if self.active_view == View::Sources {
                    self.dashboard.clear_source_filter();
                    self.selected_row = 0;
                }
            }
        }
        false
    }

    /// Periodic work: finish a pending ETL refresh once its wait is over.
    pub async fn on_tick(&mut self) {
        if self.dashboard.poll_etl().await.is_some() {
            self.selected_row = 0;
        }
    }
}

const HELP_TEXT: &str = "1/2/3 or Tab switch view • j/k move • h/l page • g/G first/last page\n\
c/m/p pick source • Esc clear source • Enter details\n\
n new • e edit • d delete • s run ETL • r refresh\n\
t toggle theme • x dismiss message • q quit";
