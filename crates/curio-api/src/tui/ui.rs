//! UI rendering

use crate::facets::{self, FacetRow};
use crate::Record;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, StatefulWidget},
    Frame,
};
use std::time::Instant;

use super::app::{App, Focus};

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut App) {
    // Title line on top, then the main horizontal split: left (search +
    // results) and right (feature)
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(frame.area());

    render_title_bar(frame, rows[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45), // Left: search input + result list
            Constraint::Percentage(55), // Right: feature panel
        ])
        .split(rows[1]);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Search input (single line, minimal)
            Constraint::Length(1), // Result count
            Constraint::Min(5),    // Result list
            Constraint::Length(1), // Status bar (shortcuts + spinner)
        ])
        .split(main_chunks[0]);

    render_search_input(frame, app, left_chunks[0]);
    render_result_count(frame, app, left_chunks[1]);
    render_result_list(frame, app, left_chunks[2]);
    render_status_bar(frame, app, left_chunks[3]);

    render_feature_panel(frame, app, main_chunks[1]);
}

/// One-line application header
fn render_title_bar(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            "  curio",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  collection browser", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the search input (minimal, thick bar on left, field prefix)
fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let cursor_style = Style::default().fg(Color::White).bg(Color::DarkGray);
    let text_style = Style::default().fg(Color::White);
    let bar_color = if app.focus == Focus::Search {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    // Split the input at cursor position
    let (before, after) = app.search_input.text.split_at(app.search_input.cursor);
    let cursor_char = after.chars().next();
    let after_cursor = cursor_char.map(|c| &after[c.len_utf8()..]).unwrap_or("");

    let mut spans = vec![
        Span::styled("▌ ", Style::default().fg(bar_color)),
        Span::styled(
            format!("{}: ", app.field.as_str()),
            Style::default().fg(Color::Cyan),
        ),
    ];

    if !before.is_empty() {
        spans.push(Span::styled(before, text_style));
    }

    // Cursor: show character at cursor position with block cursor, or a thick bar if at end
    if let Some(c) = cursor_char {
        spans.push(Span::styled(c.to_string(), cursor_style));
    } else if app.focus == Focus::Search {
        spans.push(Span::styled("█", Style::default().fg(Color::White)));
    }

    if !after_cursor.is_empty() {
        spans.push(Span::styled(after_cursor, text_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Result count + page position line (subtle)
fn render_result_count(frame: &mut Frame, app: &App, area: Rect) {
    let info = &app.state.results().info;
    let total = info.totalrecords.unwrap_or(0);
    let line = if total == 0 {
        Line::from(Span::styled(
            "  0 results",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = vec![Span::styled(
            format!("  {} results", total),
            Style::default().fg(Color::DarkGray),
        )];
        if let (Some(page), Some(pages)) = (info.page, info.pages) {
            spans.push(Span::styled(
                format!(" (page {}/{})", page, pages),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::DIM),
            ));
        }
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the result preview list with selection
fn render_result_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let selection_bg = Color::Rgb(38, 38, 38);
    let selected_index = app.list_state.selected();

    let items: Vec<ListItem> = app
        .state
        .results()
        .records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let is_selected = selected_index == Some(i);
            let lines = preview_lines(record, is_selected);
            let item = ListItem::new(lines);
            if is_selected {
                item.style(Style::default().bg(selection_bg))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items);
    StatefulWidget::render(list, area, frame.buffer_mut(), &mut app.list_state);
}

/// The two preview lines for one record: title, then date and people.
pub fn preview_lines(record: &Record, is_selected: bool) -> Vec<Line<'static>> {
    let selection_bg = Color::Rgb(38, 38, 38);
    let base_style = if is_selected {
        Style::default().bg(selection_bg)
    } else {
        Style::default()
    };
    let prefix = if is_selected {
        Span::styled("▌ ", Style::default().fg(Color::LightRed).bg(selection_bg))
    } else {
        Span::styled("  ", base_style)
    };

    let title_line = Line::from(vec![
        prefix.clone(),
        Span::styled(
            record.display_title().to_string(),
            base_style.fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ]);

    let mut detail = String::new();
    if let Some(dated) = record.dated.as_deref().filter(|s| facets::is_present(Some(s))) {
        detail.push_str(dated);
    }
    for person in &record.people {
        if let Some(name) = person
            .displayname
            .as_deref()
            .filter(|s| facets::is_present(Some(s)))
        {
            if !detail.is_empty() {
                detail.push_str(" · ");
            }
            detail.push_str(name);
        }
    }
    let detail_line = Line::from(vec![
        prefix,
        Span::styled(detail, base_style.fg(Color::DarkGray)),
    ]);

    vec![title_line, detail_line]
}

/// Render the feature panel showing the featured record's facts
fn render_feature_panel(frame: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.focus == Focus::Feature {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray).add_modifier(Modifier::DIM)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(border_style)
        .title(" Feature ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Nothing featured: the bordered container stays empty.
    let Some(record) = app.state.featured() else {
        return;
    };

    // Add 2 char left padding
    let padded = Rect {
        x: inner.x + 2,
        y: inner.y,
        width: inner.width.saturating_sub(2),
        height: inner.height,
    };
    let lines = feature_lines(record, app.link_cursor, padded.width);
    frame.render_widget(Paragraph::new(lines), padded);
}

/// Build the feature panel body: title header, the fact list with the
/// focused link highlighted, then the image section.
pub fn feature_lines(record: &Record, link_cursor: usize, width: u16) -> Vec<Line<'static>> {
    let label_style = Style::default().fg(Color::DarkGray);
    let value_style = Style::default().fg(Color::White);
    let link_style = Style::default().fg(Color::Cyan);
    let focused_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        record.display_title().to_string(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )));
    if let Some(dated) = record.dated.as_deref().filter(|s| facets::is_present(Some(s))) {
        lines.push(Line::from(Span::styled(
            dated.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    let mut link_index = 0usize;
    for row in facets::facet_rows(record) {
        lines.extend(facet_row_lines(
            &row,
            &mut link_index,
            link_cursor,
            width,
            label_style,
            value_style,
            link_style,
            focused_style,
        ));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "─── Images ───",
        Style::default().fg(Color::DarkGray),
    )));
    let images = facets::image_entries(record);
    if images.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nothing to display",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for entry in images {
            lines.push(Line::from(vec![
                Span::styled(entry.label, value_style),
                Span::styled("  ", label_style),
                Span::styled(entry.url, Style::default().fg(Color::Blue)),
            ]));
        }
    }

    lines
}

#[allow(clippy::too_many_arguments)]
fn facet_row_lines(
    row: &FacetRow,
    link_index: &mut usize,
    link_cursor: usize,
    width: u16,
    label_style: Style,
    value_style: Style,
    link_style: Style,
    focused_style: Style,
) -> Vec<Line<'static>> {
    const LABEL_WIDTH: usize = 14;
    let label = format!("{:<width$}", row.label, width = LABEL_WIDTH);
    let indent = " ".repeat(LABEL_WIDTH);

    let text_style = if row.link.is_some() {
        let focused = *link_index == link_cursor;
        *link_index += 1;
        if focused {
            focused_style
        } else {
            link_style
        }
    } else {
        value_style
    };

    let max_width = (width as usize).saturating_sub(LABEL_WIDTH + 2).max(8);
    wrap_text(&row.text, max_width)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let lead = if i == 0 { label.clone() } else { indent.clone() };
            Line::from(vec![
                Span::styled(lead, label_style),
                Span::styled(chunk, text_style),
            ])
        })
        .collect()
}

/// Render the status bar (keyboard shortcuts + loading spinner)
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let bracket = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled("  [", bracket),
        Span::styled("Tab pane", dim),
        Span::styled("] [", bracket),
        Span::styled("^f field", dim),
        Span::styled("] [", bracket),
        Span::styled("PgUp/PgDn page", dim),
        Span::styled("] [", bracket),
        Span::styled("Esc quit", dim),
        Span::styled("]", bracket),
    ];
    spans.extend(loading_spans(app.state.busy(), app.busy_since));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// The loading indicator: pure function of the busy flag. Nothing is
/// rendered when idle.
pub fn loading_spans(busy: bool, busy_since: Instant) -> Vec<Span<'static>> {
    if !busy {
        return Vec::new();
    }
    let bracket = Style::default().fg(Color::DarkGray);
    let dim_yellow = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::DIM);
    vec![
        Span::styled(" [", bracket),
        Span::styled(
            format!("{} Loading...", spinner_frame(busy_since)),
            dim_yellow,
        ),
        Span::styled("]", bracket),
    ]
}

fn spinner_frame(started_at: Instant) -> &'static str {
    const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let elapsed = started_at.elapsed().as_millis() / 80;
    let idx = (elapsed as usize) % FRAMES.len();
    FRAMES[idx]
}

/// Simple text wrapping
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}
