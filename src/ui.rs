//! UI rendering functions
//!
//! Everything here is a pure function of the application state. The event
//! loop calls [`ui`] once after every processed event; nothing in this
//! module mutates the [`App`].

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::App;
use crate::types::{Module, Phase};

/// Braille spinner, advanced one frame per timer tick.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(Paragraph::new(header_line(app)), chunks[0]);

    if app.ready && !app.modules().is_empty() {
        frame.render_widget(Paragraph::new(body_lines(app)), chunks[1]);
    }

    let footer =
        Paragraph::new("(press 'q' to quit)").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);
}

fn header_line(app: &App) -> Line<'static> {
    if !app.ready || app.modules.is_none() {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        return Line::styled(
            format!("{spinner} Loading modules..."),
            Style::default().fg(Color::Magenta).bold(),
        );
    }

    let modules = app.modules();
    if modules.is_empty() {
        return Line::styled(
            "✅ All modules are up-to-date!",
            Style::default().fg(Color::Green).bold(),
        );
    }

    let hint = Style::default().fg(Color::Cyan).bold();
    Line::from(vec![
        Span::styled("Press ", hint),
        Span::styled("enter", hint.underlined()),
        Span::styled(
            format!(" to update [{}/{}]", app.cursor + 1, modules.len()),
            hint,
        ),
    ])
}

fn body_lines(app: &App) -> Vec<Line<'static>> {
    let modules = app.modules();
    let top = app.viewport.offset;
    let bottom = (top + app.viewport.height as usize).min(modules.len());

    (top..bottom)
        .map(|i| {
            row_line(
                &modules[i],
                i == app.cursor,
                app.phase == Phase::Updating,
                app.spinner_frame,
                app.viewport.width,
            )
        })
        .collect()
}

/// One rendered list row. `width` is the full viewport width; the marker
/// column and the indirect annotation are carved out of it before the path
/// and versions are truncated.
fn row_line(
    module: &Module,
    selected: bool,
    busy: bool,
    spinner_frame: usize,
    width: u16,
) -> Line<'static> {
    let marker = if !selected {
        Span::raw(" ")
    } else if busy {
        Span::styled(
            SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()],
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled("❯", Style::default().fg(Color::Magenta))
    };

    // Unreachable for the filtered dataset; kept so this stays a total
    // function of the record it is given.
    let annotation = if module.indirect { " // indirect" } else { "" };

    let target = module
        .update
        .as_ref()
        .map_or("?", |update| update.version.as_str());
    let text = format!(" {} [{} -> {target}]", module.path, module.version);
    let max = (width as usize)
        .saturating_sub(1) // marker column
        .saturating_sub(annotation.width());

    let mut spans = vec![marker, Span::raw(truncate_to_width(&text, max))];
    if !annotation.is_empty() {
        spans.push(Span::styled(
            annotation,
            Style::default().fg(Color::Green).dim(),
        ));
    }
    Line::from(spans)
}

/// Display-width-aware truncation with a `…` tail. Returns the string
/// unchanged when it fits and an empty string when `max_width` is 0.
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let cw = c.width().unwrap_or(0);
        if used + cw + 1 > max_width {
            out.push('…');
            break;
        }
        out.push(c);
        used += cw;
    }
    out
}
