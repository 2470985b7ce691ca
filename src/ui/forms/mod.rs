//! Wizard form rendering

mod field_renderer;

use crate::app::App;
use field_renderer::{draw_choice, draw_field_with_value, draw_options, OptionItem};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use taskdeck::forms::{FieldKind, FieldSchema};
use taskdeck::wizard::{Focus, Wizard};

const FIELD_HEIGHT: u16 = 3;
const MULTILINE_HEIGHT: u16 = 6;

fn field_height(field: &FieldSchema) -> u16 {
    match field.kind {
        FieldKind::Multiline => MULTILINE_HEIGHT,
        _ => FIELD_HEIGHT,
    }
}

/// Title shown on the form border, with the step for multi-step wizards
fn form_title(form: &Wizard, title: &str) -> String {
    match (form.step_number(), form.current_step()) {
        (Some(number), Some(step)) if form.step_count() > 1 => {
            format!(" {title} · Step {number}/{}: {} ", form.step_count(), step.title)
        }
        _ => format!(" {title} "),
    }
}

/// Draw the form of the current view
pub fn draw(frame: &mut Frame, area: Rect, app: &App, title: &str) {
    let Some(form) = app.form.as_ref() else {
        return;
    };

    let block = Block::default()
        .title(form_title(form, title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let fields = form.current_fields();
    let mut constraints: Vec<Constraint> = fields
        .iter()
        .map(|f| Constraint::Length(field_height(f)))
        .collect();
    constraints.push(Constraint::Length(1)); // Submit status
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let values = form.values();
    for (idx, field) in fields.iter().enumerate() {
        let is_active = idx == form.active_field();
        let error = form.error(&field.name);
        let value = values.get(&field.name).cloned().unwrap_or_default();

        match &field.kind {
            FieldKind::Choice(_) => {
                draw_choice(frame, chunks[idx], &field.label, value.as_text(), is_active, error)
            }
            FieldKind::MultiSelect => {
                let available = app.options_for(&field.name);
                let options: Vec<OptionItem> = available
                    .iter()
                    .map(|(id, label)| OptionItem {
                        label,
                        selected: value.as_list().contains(id),
                    })
                    .collect();
                draw_options(
                    frame,
                    chunks[idx],
                    &field.label,
                    &options,
                    Some(app.option_cursor),
                    is_active,
                    error,
                );
            }
            FieldKind::Secret => {
                let masked = "•".repeat(value.as_text().chars().count());
                draw_field_with_value(frame, chunks[idx], &field.label, &masked, is_active, false, error)
            }
            kind => draw_field_with_value(
                frame,
                chunks[idx],
                &field.label,
                &value.display_value(),
                is_active,
                *kind == FieldKind::Multiline,
                error,
            ),
        }
    }

    let status = if form.is_submitting() {
        Line::from(Span::styled("Submitting…", Style::default().fg(Color::Yellow)))
    } else if let Some(failure) = form.submit_error() {
        Line::from(Span::styled(
            failure.message.as_str(),
            Style::default().fg(Color::Red),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(status), chunks[fields.len()]);
}
