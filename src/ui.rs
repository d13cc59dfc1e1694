use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
};
use crate::app::App;
use crate::form::{Focus, PLACEHOLDER};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Style a line of Gherkin: keywords, tags, table rows and comments.
fn highlight_gherkin_line(text: &str) -> Line<'static> {
    let trimmed = text.trim_start();
    let indent = &text[..text.len() - trimmed.len()];

    if trimmed.starts_with('#') {
        return Line::styled(text.to_string(), Style::default().fg(Color::DarkGray));
    }
    if trimmed.starts_with('@') {
        return Line::styled(text.to_string(), Style::default().fg(Color::Magenta));
    }
    if trimmed.starts_with('|') {
        return Line::styled(text.to_string(), Style::default().fg(Color::Yellow));
    }

    const HEADINGS: [&str; 6] = [
        "Feature:",
        "Background:",
        "Scenario Outline:",
        "Scenario Template:",
        "Scenario:",
        "Examples:",
    ];
    const STEPS: [&str; 6] = ["Given ", "When ", "Then ", "And ", "But ", "* "];

    if let Some(keyword) = HEADINGS.into_iter().find(|k| trimmed.starts_with(*k)) {
        return Line::from(vec![
            Span::raw(indent.to_string()),
            Span::styled(keyword.to_string(), Style::default().fg(Color::Cyan).bold()),
            Span::styled(trimmed[keyword.len()..].to_string(), Style::default().bold()),
        ]);
    }
    if let Some(keyword) = STEPS.into_iter().find(|k| trimmed.starts_with(*k)) {
        return Line::from(vec![
            Span::raw(indent.to_string()),
            Span::styled(keyword.to_string(), Style::default().fg(Color::Green)),
            Span::raw(trimmed[keyword.len()..].to_string()),
        ]);
    }

    Line::raw(text.to_string())
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let now = Instant::now();

    // Leave room for the actions row, footer, header and at least a few output lines
    let max_input = area.height.saturating_sub(10).max(crate::input::MIN_INPUT_HEIGHT);
    let input_height = app
        .form
        .input
        .desired_height(area.width.saturating_sub(2), max_input);
    let error_height = if app.form.error().is_some() { 3 } else { 0 };

    let [header_area, input_area, actions_area, error_area, output_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(input_height),
            Constraint::Length(1),
            Constraint::Length(error_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(app, frame, header_area);
    render_input(app, frame, input_area);
    render_actions(app, frame, actions_area, now);
    if app.form.error().is_some() {
        render_error(app, frame, error_area);
    }
    render_output(app, frame, output_area, now);
    render_footer(app, frame, footer_area);

    if app.form.toast().is_some() {
        render_toast(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" BDD Test Case Generator ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!(" {} ", app.client.base_url()), Style::default().fg(Color::Gray)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    app.input_area = Some(area);
    let focused = app.form.focus == Focus::Input;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(" Requirement ");

    let inner_width = area.width.saturating_sub(2).max(1);
    let inner_height = area.height.saturating_sub(2).max(1);
    app.input_scroll = app
        .form
        .input
        .scroll_for_cursor(inner_width, inner_height, app.input_scroll);

    // Wrapping is done by the input itself so rows, cursor and height agree
    let paragraph = if app.form.input.is_empty() {
        Paragraph::new(Text::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
            .wrap(Wrap { trim: false })
    } else {
        let rows: Vec<Line> = app
            .form
            .input
            .wrapped_lines(inner_width)
            .into_iter()
            .map(Line::from)
            .collect();
        Paragraph::new(rows).scroll((app.input_scroll, 0))
    };
    frame.render_widget(paragraph.block(block), area);

    if focused {
        let (row, col) = app.form.input.visual_cursor(inner_width);
        let row = u16::try_from(row).unwrap_or(u16::MAX).saturating_sub(app.input_scroll);
        let x = area.x + 1 + col as u16;
        let y = area.y + 1 + row.min(inner_height - 1);
        frame.set_cursor_position(Position::new(x, y));
    }
}

fn render_actions(app: &App, frame: &mut Frame, area: Rect, now: Instant) {
    let button = Style::default().bg(Color::Blue).fg(Color::White).bold();
    let disabled = Style::default().bg(Color::DarkGray).fg(Color::Gray);
    let secondary = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = Vec::new();
    if app.form.is_loading() {
        let frame_idx = app.animation_frame as usize % SPINNER.len();
        spans.push(Span::styled(
            format!(" {} Generating... ", SPINNER[frame_idx]),
            disabled,
        ));
    } else {
        spans.push(Span::styled(" Generate ", button));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(" Clear ", secondary));

    if app.form.can_download() {
        let copy_label = if app.form.copy_feedback_active(now) { " ✓ Copied! " } else { " Copy " };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(copy_label, secondary));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(" Download ", secondary));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_error(app: &App, frame: &mut Frame, area: Rect) {
    let message = app.form.error().unwrap_or_default();
    let error = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        );
    frame.render_widget(error, area);
}

fn render_output(app: &mut App, frame: &mut Frame, area: Rect, now: Instant) {
    let (filename, lines) = match app.form.output() {
        Some(artifact) => (
            artifact.filename.clone(),
            artifact.gherkin.lines().map(highlight_gherkin_line).collect::<Vec<_>>(),
        ),
        None => {
            app.output_area = None;
            app.output_lines = 0;
            return;
        }
    };
    let line_count = lines.len() as u16;
    app.output_area = Some(area);

    let focused = app.form.focus == Focus::Output;
    let mut title = vec![
        Span::raw(" Generated Test Cases "),
        Span::styled(format!("{} ", filename), Style::default().fg(Color::Gray)),
    ];
    if app.form.copy_feedback_active(now) {
        title.push(Span::styled("✓ Copied! ", Style::default().fg(Color::Green)));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(focused))
                .title(Line::from(title)),
        )
        .scroll((app.output_scroll, 0));
    frame.render_widget(paragraph, area);

    app.output_height = area.height.saturating_sub(2);
    app.output_lines = line_count;

    if line_count > app.output_height {
        let mut scrollbar_state = ScrollbarState::new(line_count.saturating_sub(app.output_height) as usize)
            .position(app.output_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = if app.form.is_loading() {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White)
    };
    let mode_text = match app.form.focus {
        Focus::Input => " EDIT ",
        Focus::Output => " VIEW ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![Span::styled(mode_text, mode_style.add_modifier(Modifier::BOLD))];
    match app.form.focus {
        Focus::Input => hints.extend(vec![
            Span::styled(" C-Enter ", key_style),
            Span::styled(" generate ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" clear ", label_style),
        ]),
        Focus::Output => hints.extend(vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" c ", key_style),
            Span::styled(" copy ", label_style),
            Span::styled(" d ", key_style),
            Span::styled(" download ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" edit ", label_style),
        ]),
    }
    if app.form.output().is_some() {
        hints.extend(vec![
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
            Span::styled(" C-y ", key_style),
            Span::styled(" copy ", label_style),
            Span::styled(" C-s ", key_style),
            Span::styled(" download ", label_style),
        ]);
    }
    hints.extend(vec![
        Span::styled(" C-q ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_toast(app: &App, frame: &mut Frame, area: Rect) {
    let Some(toast) = app.form.toast() else {
        return;
    };

    let width = (toast.message.chars().count() as u16 + 4).min(area.width);
    let height = 3.min(area.height);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    };

    frame.render_widget(Clear, toast_area);
    frame.render_widget(
        Paragraph::new(toast.message.clone())
            .style(Style::default().fg(Color::Green))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green)),
            ),
        toast_area,
    );
}
