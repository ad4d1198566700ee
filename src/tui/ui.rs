//! UI rendering functions for the TUI.
//!
//! Lays out the question input, the markdown answer panel and, when the last answer
//! carried one, the emissions map drawn on a braille canvas.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Paragraph, Wrap,
        canvas::{Canvas, Circle, Map, MapResolution},
    },
};

use super::app::{App, Focus};
use crate::chart::{EmissionsMap, Rgb};

/// Degrees of latitude/longitude padded around the outermost markers.
const MAP_MARGIN_DEG: f64 = 1.0;
/// Canvas radius, in degrees, of the largest marker.
const MAX_RADIUS_DEG: f64 = 0.9;

/// Main rendering function for the TUI.
pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Question input
            Constraint::Min(0),    // Content area
            Constraint::Length(1), // Shortcut bar
        ])
        .split(size);

    render_question_input(frame, app, main_chunks[0]);

    match app.chart() {
        Some(chart) => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(main_chunks[1]);
            render_answer(frame, app, content_chunks[0]);
            render_map(frame, chart, content_chunks[1]);
        }
        None => render_answer(frame, app, main_chunks[1]),
    }

    render_shortcut_bar(frame, app, main_chunks[2]);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn render_question_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::QuestionInput;

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Question")
        .border_style(border_style(is_focused));

    let mut content = app.input().to_string();
    if is_focused && !app.is_pending() {
        content.push('█');
    }

    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Renders the last answer: heading, the question, then the markdown body.
fn render_answer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Answer")
        .border_style(border_style(app.focus() == Focus::Answer));

    let text = match app.answer() {
        Some(answer) => {
            let heading_style = if answer.is_error {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };

            let mut text = Text::from(vec![
                Line::styled(answer.heading.clone(), heading_style),
                Line::styled(
                    format!("> {}", answer.question),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
                Line::default(),
            ]);
            text.extend(tui_markdown::from_str(&answer.body));
            text
        }
        None if app.is_pending() => Text::from("Routing question..."),
        None => Text::from(
            "Ask about the internal documents, the air quality of a city, or CO₂ emissions in France.",
        ),
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.answer_scroll(), 0));

    frame.render_widget(paragraph, area);
}

/// Draws the regions as circles over the coastline map, with the colour legend below.
fn render_map(frame: &mut Frame, chart: &EmissionsMap, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);

    let bounds = chart.bounds(MAP_MARGIN_DEG);
    let size_max = chart.size_max();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(chart.title().to_string()),
        )
        .marker(Marker::Braille)
        .x_bounds([bounds.min_lon, bounds.max_lon])
        .y_bounds([bounds.min_lat, bounds.max_lat])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for point in chart.points() {
                let radius = if size_max > 0.0 {
                    point.marker_size / size_max * MAX_RADIUS_DEG
                } else {
                    0.0
                };
                ctx.draw(&Circle {
                    x: point.record.longitude,
                    y: point.record.latitude,
                    radius,
                    color: to_color(point.color),
                });
            }
        });

    frame.render_widget(canvas, chunks[0]);
    frame.render_widget(
        Paragraph::new(legend_line(chart)).wrap(Wrap { trim: true }),
        chunks[1],
    );
}

fn legend_line(chart: &EmissionsMap) -> Line<'static> {
    let legend = chart.legend();
    let span = legend.max - legend.min;

    let mut spans = vec![Span::styled(
        format!("{}: ", legend.title),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for tick in &legend.ticks {
        let t = if span > 0.0 {
            (tick.value - legend.min) / span
        } else {
            0.0
        };
        spans.push(Span::styled("● ", Style::default().fg(to_color(Rgb::yl_or_rd(t)))));
        spans.push(Span::raw(format!("{} {:.1}  ", tick.label, tick.value)));
    }
    Line::from(spans)
}

/// Shows the status message and context-aware shortcuts.
fn render_shortcut_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let mut spans = Vec::new();
    if let Some(status) = app.status() {
        spans.push(Span::styled(
            status.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(" | ", sep_style));
    }

    spans.extend([
        Span::styled("Ctrl+C", key_style),
        Span::raw(": quit"),
        Span::styled(" | ", sep_style),
        Span::styled("Tab", key_style),
        Span::raw(": switch panel"),
    ]);

    match app.focus() {
        Focus::QuestionInput => {
            spans.push(Span::styled(" | ", sep_style));
            spans.push(Span::styled("Enter", key_style));
            spans.push(Span::raw(": ask"));
        }
        Focus::Answer => {
            spans.push(Span::styled(" | ", sep_style));
            spans.push(Span::styled("j/k", key_style));
            spans.push(Span::raw(": scroll"));
            spans.push(Span::styled(" | ", sep_style));
            spans.push(Span::styled("q", key_style));
            spans.push(Span::raw(": quit"));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
