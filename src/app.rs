//! Application state and key handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Duration;
use taskdeck::alerts::{self, AlertCenter};
use taskdeck::api::models::{Member, Project};
use taskdeck::api::HttpApiClient;
use taskdeck::config::ClientConfig;
use taskdeck::flows::Workspace;
use taskdeck::forms::{catalog, FieldKind, FormValues};
use taskdeck::refetch::{QueryKey, RefetchSet};
use taskdeck::session::{Session, SessionStore};
use taskdeck::wizard::{Focus, FormStep, SubmitOutcome, Wizard};
use tracing::{info, warn};

/// Screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Projects,
    ProjectCreate,
    InviteMember,
}

/// Main application struct
pub struct App {
    pub view: View,
    pub workspace: Workspace<HttpApiClient>,
    pub alerts: AlertCenter,
    pub session: Option<Session>,
    /// Form of the current view, if it has one
    pub form: Option<Wizard>,
    pub projects: Vec<Project>,
    pub members: Vec<Member>,
    pub selected_project: usize,
    /// Highlighted option of the focused multi-select field
    pub option_cursor: usize,
    store: Option<SessionStore>,
    alert_ttl: Duration,
    quit: bool,
}

impl App {
    /// Create the app, restoring the last session when there is one
    pub async fn new(config: &ClientConfig) -> Result<Self> {
        let client = Arc::new(HttpApiClient::from_config(config));
        info!(api = client.base_url(), "Starting taskdeck");

        let store = SessionStore::default_location();
        let session = match &store {
            Some(store) => store.load().unwrap_or_else(|e| {
                warn!("Ignoring unreadable session file: {e}");
                None
            }),
            None => None,
        };

        let mut app = Self::with_client(client, store, config.alert_ttl())?;
        if let Some(session) = session {
            app.enter_workspace(session).await;
        }
        Ok(app)
    }

    /// Build a signed-out app around a client
    pub fn with_client(
        client: Arc<HttpApiClient>,
        store: Option<SessionStore>,
        alert_ttl: Duration,
    ) -> Result<Self> {
        let (sender, center) = alerts::channel();
        Ok(Self {
            view: View::Login,
            workspace: Workspace::new(client, sender),
            alerts: center,
            session: None,
            form: Some(Wizard::single_step(catalog::login()?)),
            projects: Vec::new(),
            members: Vec::new(),
            selected_project: 0,
            option_cursor: 0,
            store,
            alert_ttl,
            quit: false,
        })
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Collect new alerts and let stale ones expire
    pub fn tick(&mut self) {
        self.alerts.drain();
        self.alerts.expire(self.alert_ttl);
    }

    async fn enter_workspace(&mut self, session: Session) {
        info!(user = %session.user.id, "Signed in");
        self.session = Some(session);
        self.form = None;
        self.view = View::Projects;
        self.reload().await;
    }

    /// Refetch the lists shown on the projects screen
    pub async fn reload(&mut self) {
        if let Some(session) = &self.session {
            let set = RefetchSet::of([QueryKey::Projects, QueryKey::Members]);
            let report = self.workspace.refresh(session, &set).await;
            if !report.is_clean() {
                self.workspace
                    .alerts()
                    .info("Some data could not be refreshed");
            }
        }
        self.sync_from_cache().await;
    }

    async fn sync_from_cache(&mut self) {
        self.projects = self.workspace.cache().projects().await;
        self.members = self.workspace.cache().members().await;
        if self.selected_project >= self.projects.len() {
            self.selected_project = self.projects.len().saturating_sub(1);
        }
    }

    async fn logout(&mut self) -> Result<()> {
        if let Some(store) = &self.store {
            store.clear()?;
        }
        self.session = None;
        self.workspace.cache().clear().await;
        self.projects.clear();
        self.members.clear();
        self.form = Some(Wizard::single_step(catalog::login()?));
        self.view = View::Login;
        Ok(())
    }

    fn open_project_form(&mut self) -> Result<()> {
        let today = chrono::Local::now().date_naive().to_string();
        let wizard = Wizard::single_step(catalog::project()?)
            .with_initial(FormValues::new().with("StartDate", today));
        self.open_form(View::ProjectCreate, wizard);
        Ok(())
    }

    fn open_invite_form(&mut self) -> Result<()> {
        let titles = ["Member details", "Projects", "Role"];
        let steps = catalog::INVITE_STEPS
            .iter()
            .zip(titles)
            .map(|(fields, title)| FormStep::new(title, fields))
            .collect();
        let wizard = Wizard::new(catalog::invite_member()?, steps)?;
        self.open_form(View::InviteMember, wizard);
        Ok(())
    }

    fn open_form(&mut self, view: View, wizard: Wizard) {
        self.form = Some(wizard);
        self.option_cursor = 0;
        self.view = view;
    }

    /// Options (id, label) offered by a multi-select field
    pub fn options_for(&self, field: &str) -> Vec<(String, String)> {
        match field {
            "projects" => self
                .projects
                .iter()
                .map(|p| (p.id.clone(), p.title.clone()))
                .collect(),
            "Team" | "members" => self
                .members
                .iter()
                .map(|m| (m.id.to_string(), m.name.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn focused_kind(&self) -> Option<FieldKind> {
        self.form
            .as_ref()
            .and_then(|f| f.focused_field())
            .map(|f| f.kind.clone())
    }

    fn focused_options(&self) -> Vec<(String, String)> {
        self.form
            .as_ref()
            .and_then(|f| f.focused_field())
            .map(|f| self.options_for(&f.name))
            .unwrap_or_default()
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if let Some(id) = self.alerts.current_error().map(|a| a.id) {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.alerts.dismiss(id);
                return Ok(());
            }
        }

        match self.view {
            View::Projects => self.handle_projects_key(key).await,
            View::Login | View::ProjectCreate | View::InviteMember => {
                self.handle_form_key(key).await
            }
        }
    }

    async fn handle_projects_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_project + 1 < self.projects.len() {
                    self.selected_project += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_project = self.selected_project.saturating_sub(1);
            }
            KeyCode::Char('n') => self.open_project_form()?,
            KeyCode::Char('i') => self.open_invite_form()?,
            KeyCode::Char('r') => self.reload().await,
            KeyCode::Char('L') => self.logout().await?,
            _ => {}
        }
        Ok(())
    }

    async fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let kind = self.focused_kind();
        let options = self.focused_options();
        let Some(form) = self.form.as_mut() else {
            return Ok(());
        };

        match key.code {
            KeyCode::Tab => {
                form.next_field();
                self.option_cursor = 0;
            }
            KeyCode::BackTab => {
                form.prev_field();
                self.option_cursor = 0;
            }
            KeyCode::Esc => self.cancel_form(),
            KeyCode::Enter => self.advance_form().await?,
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                match kind {
                    Some(FieldKind::Choice(_)) => {
                        form.cycle_focused_choice(forward);
                    }
                    Some(FieldKind::MultiSelect) if !options.is_empty() => {
                        self.option_cursor = if forward {
                            (self.option_cursor + 1) % options.len()
                        } else {
                            (self.option_cursor + options.len() - 1) % options.len()
                        };
                    }
                    _ => {}
                }
            }
            KeyCode::Char(' ') if kind == Some(FieldKind::MultiSelect) => {
                if let Some((id, _)) = options.get(self.option_cursor) {
                    form.edit_focused(|value| value.toggle_item(id));
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if accepts_typing(kind.as_ref()) {
                    form.edit_focused(|value| value.push_char(c));
                }
            }
            KeyCode::Backspace => {
                if accepts_typing(kind.as_ref()) {
                    form.edit_focused(|value| value.pop_char());
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Esc: back a step, or leave the form
    fn cancel_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.back() {
            self.option_cursor = 0;
            return;
        }
        if self.view == View::Login {
            return;
        }
        form.close();
        self.form = None;
        self.view = View::Projects;
    }

    /// Enter: next field, next step, or submit
    async fn advance_form(&mut self) -> Result<()> {
        let Some(form) = self.form.as_mut() else {
            return Ok(());
        };
        self.option_cursor = 0;
        if form.active_field() + 1 < form.field_count() {
            form.next_field();
            return Ok(());
        }
        if !form.is_last_step() {
            form.next();
            return Ok(());
        }
        self.submit_form().await
    }

    async fn submit_form(&mut self) -> Result<()> {
        let Some(mut form) = self.form.take() else {
            return Ok(());
        };

        match self.view {
            View::Login => {
                if let SubmitOutcome::Completed(session) = self.workspace.login(&mut form).await {
                    if let Some(store) = &self.store {
                        if let Err(e) = store.save(&session) {
                            warn!("Could not save session: {e}");
                        }
                    }
                    self.enter_workspace(session).await;
                    return Ok(());
                }
            }
            View::ProjectCreate | View::InviteMember => {
                if let Some(session) = self.session.as_ref() {
                    let completed = if self.view == View::ProjectCreate {
                        self.workspace
                            .create_project(&mut form, session)
                            .await
                            .is_completed()
                    } else {
                        self.workspace
                            .invite_member(&mut form, session)
                            .await
                            .is_completed()
                    };
                    if completed {
                        self.view = View::Projects;
                        self.sync_from_cache().await;
                        return Ok(());
                    }
                }
            }
            View::Projects => {}
        }

        self.form = Some(form);
        Ok(())
    }
}

/// Whether typed characters go into a field of this kind
fn accepts_typing(kind: Option<&FieldKind>) -> bool {
    matches!(
        kind,
        Some(
            FieldKind::Text
                | FieldKind::Secret
                | FieldKind::Multiline
                | FieldKind::Date
                | FieldKind::Number
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use pretty_assertions::assert_eq;
    use taskdeck::wizard::WizardPhase;

    fn test_app() -> App {
        let client = Arc::new(HttpApiClient::new(
            "http://127.0.0.1:9",
            Duration::from_millis(50),
        ));
        App::with_client(client, None, Duration::from_secs(5)).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_starts_at_login() {
        let app = test_app();
        assert_eq!(app.view, View::Login);
        assert!(app.form.is_some());
        assert!(!app.should_quit());
    }

    #[tokio::test]
    async fn test_typing_fills_focused_field() {
        let mut app = test_app();
        type_text(&mut app, "ann@x.com").await;
        app.handle_key(key(KeyCode::Tab)).await.unwrap();
        type_text(&mut app, "secretX").await;
        app.handle_key(key(KeyCode::Backspace)).await.unwrap();

        let values = app.form.as_ref().unwrap().values();
        assert_eq!(values.text("email"), "ann@x.com");
        assert_eq!(values.text("password"), "secret");
    }

    #[tokio::test]
    async fn test_invalid_login_stays_local() {
        let mut app = test_app();
        type_text(&mut app, "not-an-email").await;
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        app.handle_key(key(KeyCode::Enter)).await.unwrap();

        let form = app.form.as_ref().unwrap();
        assert_eq!(app.view, View::Login);
        assert_eq!(form.error("email"), Some(catalog::INVALID_EMAIL));
        assert!(form.error("password").is_some());
    }

    #[tokio::test]
    async fn test_invite_wizard_navigation() {
        let mut app = test_app();
        app.view = View::Projects;
        app.handle_key(key(KeyCode::Char('i'))).await.unwrap();
        assert_eq!(app.view, View::InviteMember);

        type_text(&mut app, "Ann").await;
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        type_text(&mut app, "ann@x.com").await;
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(
            app.form.as_ref().map(|f| f.phase()),
            Some(WizardPhase::Step(2))
        );

        app.handle_key(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(
            app.form.as_ref().map(|f| f.phase()),
            Some(WizardPhase::Step(1))
        );
        app.handle_key(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.view, View::Projects);
        assert!(app.form.is_none());
    }

    #[tokio::test]
    async fn test_multi_select_toggles_cursor_option() {
        let mut app = test_app();
        app.view = View::Projects;
        app.projects = vec![
            serde_json::from_value(serde_json::json!({"_id": "p1", "title": "Apollo"})).unwrap(),
            serde_json::from_value(serde_json::json!({"_id": "p2", "title": "Gemini"})).unwrap(),
        ];
        app.handle_key(key(KeyCode::Char('i'))).await.unwrap();
        type_text(&mut app, "Ann").await;
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        type_text(&mut app, "ann@x.com").await;
        app.handle_key(key(KeyCode::Enter)).await.unwrap();

        app.handle_key(key(KeyCode::Right)).await.unwrap();
        app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.values().list("projects"), ["p2".to_string()]);
    }

    #[tokio::test]
    async fn test_error_alert_is_dismissed_first() {
        let mut app = test_app();
        app.workspace.alerts().error("boom");
        app.tick();
        assert!(app.alerts.current_error().is_some());
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        assert!(app.alerts.current_error().is_none());
        assert_eq!(app.view, View::Login);
    }

    #[tokio::test]
    async fn test_quit_from_projects() {
        let mut app = test_app();
        app.view = View::Projects;
        app.handle_key(key(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit());
    }
}
