//! Layout components (content area, status bar)

use crate::app::{App, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use taskdeck::alerts::AlertKind;

/// Split off the bottom line for the status bar
pub fn create_layout(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    chunks[0]
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![];

    // Session indicator
    match &app.session {
        Some(session) => {
            spans.push(Span::styled(" ● ", Style::default().fg(Color::Green)));
            spans.push(Span::styled(
                format!("{} ", session.user.name),
                Style::default().fg(Color::White),
            ));
        }
        None => spans.push(Span::styled(" ○ ", Style::default().fg(Color::Red))),
    }

    spans.push(Span::styled(
        get_view_hints(app),
        Style::default().fg(Color::Gray),
    ));

    // Latest transient alert; errors get a dialog instead
    if let Some(alert) = app.alerts.current().filter(|a| !a.is_error()) {
        let color = match alert.kind {
            AlertKind::Success => Color::Green,
            AlertKind::Info => Color::Blue,
            AlertKind::Error => Color::Red,
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(alert.message.as_str(), Style::default().fg(color)));
    }

    let quit_hint = " ^C:quit ";
    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: (quit_hint.len() as u16).min(area.width),
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the current view
fn get_view_hints(app: &App) -> String {
    match app.view {
        View::Login => "Tab:next  Enter:sign in".to_string(),
        View::Projects => "j/k:nav  n:new  i:invite  r:refresh  L:logout  q:quit".to_string(),
        View::ProjectCreate => "Tab:next  ←/→:choose  Space:toggle  Enter:next/submit  Esc:cancel"
            .to_string(),
        View::InviteMember => {
            let back = if app.form.as_ref().is_some_and(|f| !f.is_first_step()) {
                "Esc:back"
            } else {
                "Esc:cancel"
            };
            format!("Tab:next  ←/→:choose  Space:toggle  Enter:next/submit  {back}")
        }
    }
}
