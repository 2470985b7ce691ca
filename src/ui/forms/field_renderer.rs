//! Field rendering utilities for forms

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// One option of a choice or multi-select field
pub struct OptionItem<'a> {
    pub label: &'a str,
    pub selected: bool,
}

fn border_style(is_active: bool, error: Option<&str>) -> Style {
    if error.is_some() {
        Style::default().fg(Color::Red)
    } else if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Bordered box with the label on top and the error, if any, underneath
fn field_block(label: &str, is_active: bool, error: Option<&str>) -> Block<'static> {
    let block = Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_style(border_style(is_active, error));
    match error {
        Some(message) => block.title_bottom(Line::from(Span::styled(
            format!(" {message} "),
            Style::default().fg(Color::Red),
        ))),
        None => block,
    }
}

/// Draw a text-like field
pub fn draw_field_with_value(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    is_active: bool,
    is_multiline: bool,
    error: Option<&str>,
) {
    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let display_value = if value.is_empty() && !is_active {
        "(empty)"
    } else {
        value
    };

    let cursor = if is_active { "▌" } else { "" };

    let content = if is_multiline {
        let mut lines: Vec<Line> = display_value
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect();
        if is_active {
            match lines.last_mut() {
                Some(last) => last
                    .spans
                    .push(Span::styled(cursor, Style::default().fg(Color::Cyan))),
                None => lines.push(Line::from(Span::styled(
                    cursor,
                    Style::default().fg(Color::Cyan),
                ))),
            }
        }
        Paragraph::new(lines)
    } else {
        Paragraph::new(Line::from(vec![
            Span::styled(display_value, style),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ]))
    };

    frame.render_widget(
        content
            .wrap(Wrap { trim: false })
            .block(field_block(label, is_active, error)),
        area,
    );
}

/// Draw a choice or multi-select field as a row of options
///
/// `cursor` marks the option Space would toggle.
pub fn draw_options(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    options: &[OptionItem],
    cursor: Option<usize>,
    is_active: bool,
    error: Option<&str>,
) {
    let mut spans = Vec::new();
    if options.is_empty() {
        spans.push(Span::styled(
            "(nothing to choose from)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    for (idx, option) in options.iter().enumerate() {
        let marker = if option.selected { "[x] " } else { "[ ] " };
        let mut style = if option.selected {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };
        if is_active && cursor == Some(idx) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(format!("{marker}{}", option.label), style));
        spans.push(Span::raw("  "));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: false })
            .block(field_block(label, is_active, error)),
        area,
    );
}

/// Draw a single-choice field as `◂ VALUE ▸`
pub fn draw_choice(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    is_active: bool,
    error: Option<&str>,
) {
    let arrow_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let line = Line::from(vec![
        Span::styled("◂ ", arrow_style),
        Span::styled(value, Style::default().fg(Color::White)),
        Span::styled(" ▸", arrow_style),
    ]);

    frame.render_widget(
        Paragraph::new(line).block(field_block(label, is_active, error)),
        area,
    );
}
