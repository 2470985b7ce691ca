//! UI module for rendering the TUI

mod components;
mod forms;
mod layout;
mod projects;

use crate::app::{App, View};
use components::render_error_dialog;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let main_area = layout::create_layout(frame.area());

    match app.view {
        View::Projects => projects::draw(frame, main_area, app),
        View::Login => forms::draw(frame, main_area, app, "Sign in"),
        View::ProjectCreate => forms::draw(frame, main_area, app, "New Project"),
        View::InviteMember => forms::draw(frame, main_area, app, "Invite Member"),
    }

    layout::draw_status_bar(frame, app);

    // Errors stay on top until dismissed
    if let Some(alert) = app.alerts.current_error() {
        render_error_dialog(frame, &alert.message);
    }
}
