//! Projects grid view

use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use taskdeck::api::models::{Priority, Project};

const MIN_CARD_WIDTH: u16 = 24;
const CARD_HEIGHT: u16 = 4; // 1 (top border) + 2 (content) + 1 (bottom border)
const CARD_SPACING_H: u16 = 1;

/// Helper for grid layout calculations
struct GridLayout {
    columns: usize,
    card_width: u16,
}

impl GridLayout {
    fn new(area_width: u16) -> Self {
        // Account for outer block borders
        let usable_width = area_width.saturating_sub(2);
        let columns = if usable_width >= MIN_CARD_WIDTH {
            ((usable_width + CARD_SPACING_H) / (MIN_CARD_WIDTH + CARD_SPACING_H)) as usize
        } else {
            1
        }
        .max(1);

        let total_spacing = (columns.saturating_sub(1) as u16) * CARD_SPACING_H;
        let card_width = usable_width.saturating_sub(total_spacing) / columns as u16;

        Self {
            columns,
            card_width: card_width.max(MIN_CARD_WIDTH),
        }
    }

    fn card_area(&self, inner: Rect, index: usize) -> Rect {
        let (row, col) = (index / self.columns, index % self.columns);
        Rect {
            x: inner.x + (col as u16) * (self.card_width + CARD_SPACING_H),
            y: inner.y + (row as u16) * CARD_HEIGHT,
            width: self.card_width,
            height: CARD_HEIGHT,
        }
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

/// Draw the projects grid
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(format!(" Projects ({}) ", app.projects.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.projects.is_empty() {
        let message = Paragraph::new("No projects yet.\nPress 'n' to create one.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(message, inner);
        return;
    }

    let grid = GridLayout::new(area.width);
    for (idx, project) in app.projects.iter().enumerate() {
        let card_area = grid.card_area(inner, idx);
        if card_area.y + card_area.height > inner.y + inner.height
            || card_area.x + card_area.width > inner.x + inner.width
        {
            continue;
        }
        draw_project_card(frame, card_area, project, idx == app.selected_project);
    }
}

/// Truncate to `max` characters, marking the cut with an ellipsis
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn draw_project_card(frame: &mut Frame, area: Rect, project: &Project, is_selected: bool) {
    let border_style = if is_selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let bg_style = if is_selected {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(bg_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let title_style = if is_selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let line1 = Line::from(Span::styled(
        truncate(&project.title, inner.width as usize),
        title_style,
    ));

    let mut details = vec![Span::styled(
        project.priority.label(),
        Style::default().fg(priority_color(project.priority)),
    )];
    if let Some(due) = project.due_date {
        details.push(Span::styled(
            format!("  due {due}"),
            Style::default().fg(Color::Gray),
        ));
    }

    frame.render_widget(Paragraph::new(vec![line1, Line::from(details)]), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncate_marks_cut() {
        assert_eq!(truncate("Apollo", 10), "Apollo");
        assert_eq!(truncate("Apollo program", 6), "Apoll…");
    }

    #[test]
    fn test_grid_wraps_columns() {
        let grid = GridLayout::new(2 + 2 * MIN_CARD_WIDTH + CARD_SPACING_H);
        assert_eq!(grid.columns, 2);
        let inner = Rect::new(1, 1, 2 * MIN_CARD_WIDTH + CARD_SPACING_H, 20);
        assert_eq!(grid.card_area(inner, 2).y, 1 + CARD_HEIGHT);
        assert_eq!(grid.card_area(inner, 1).x, 1 + MIN_CARD_WIDTH + CARD_SPACING_H);
    }
}
