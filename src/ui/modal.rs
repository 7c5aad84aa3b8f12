// Modal UI components.
// Input forms, confirmation prompts, the help overlay and the sign-in screen.

use ratatui::{prelude::*, widgets::*};

use crate::state::{Confirm, Form};
use crate::theme::Palette;

/// A `width` x `height` rect centered in `area`, clipped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn hint_line(hints: &[(&'static str, &'static str)], palette: &Palette) -> Line<'static> {
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {}", key), Style::default().fg(palette.accent)));
        spans.push(Span::styled(format!(" = {} ", label), Style::default().fg(palette.muted)));
    }
    Line::from(spans)
}

fn field_lines(form: &Form, palette: &Palette) -> Vec<Line<'static>> {
    let width = form
        .fields
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(0);

    form.fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == form.focus;
            let label_style = if focused {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.muted)
            };
            let mut spans = vec![
                Span::styled(format!("{:<width$}  ", field.label, width = width), label_style),
                Span::styled(field.display_value(), Style::default().fg(palette.text)),
            ];
            if focused {
                spans.push(Span::styled("█", Style::default().fg(palette.warning)));
            }
            Line::from(spans)
        })
        .collect()
}

fn render_form_body(
    frame: &mut Frame,
    form: &Form,
    error: Option<&str>,
    area: Rect,
    palette: &Palette,
    submit_label: &'static str,
) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(format!(" {} ", form.title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Fields
            Constraint::Length(1), // Error
            Constraint::Length(1), // Instructions
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(field_lines(form, palette)), chunks[0]);

    if let Some(error) = error {
        let error_line = Paragraph::new(Span::styled(
            format!("❌ {}", error),
            Style::default().fg(palette.error),
        ));
        frame.render_widget(error_line, chunks[1]);
    }

    let instructions = hint_line(
        &[("Enter", submit_label), ("↑↓", "Field"), ("Esc", "Cancel")],
        palette,
    );
    frame.render_widget(
        Paragraph::new(instructions).alignment(Alignment::Center),
        chunks[2],
    );
}

/// Draw an input form on top of the current view.
pub fn draw_form(frame: &mut Frame, form: &Form, error: Option<&str>, palette: &Palette) {
    let height = form.fields.len() as u16 + 4;
    let area = centered(frame.area(), 70, height);
    render_form_body(frame, form, error, area, palette, "Next / Save");
}

/// Draw a yes/no confirmation prompt.
pub fn draw_confirm(frame: &mut Frame, confirm: &Confirm, palette: &Palette) {
    let area = centered(frame.area(), 56, 6);
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            confirm.prompt.clone(),
            Style::default().fg(palette.text),
        )),
        Line::from(""),
        hint_line(&[("y", "Confirm"), ("n/Esc", "Cancel")], palette),
    ];
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.warning))
                .title(" Confirm "),
        );
    frame.render_widget(widget, area);
}

/// Draw the full-screen sign-in view.
pub fn draw_login(
    frame: &mut Frame,
    form: &Form,
    error: Option<&str>,
    busy: bool,
    palette: &Palette,
) {
    let full = frame.area();
    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "signdesk",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "check-in console for upstream API accounts",
            Style::default().fg(palette.muted),
        )),
    ])
    .alignment(Alignment::Center);
    let title_area = Rect {
        height: 2.min(full.height),
        y: full.y + full.height.saturating_sub(8) / 2,
        ..full
    };
    frame.render_widget(title, title_area);

    let area = centered(full, 50, 6);
    let area = Rect {
        y: (title_area.y + 3).min(full.bottom().saturating_sub(area.height)),
        ..area
    };
    let error = if busy { None } else { error };
    render_form_body(frame, form, error, area, palette, "Sign in");

    if busy {
        let status = Paragraph::new(Span::styled(
            "⏳ Signing in...",
            Style::default().fg(palette.warning),
        ))
        .alignment(Alignment::Center);
        let status_area = Rect {
            y: area.bottom().min(full.bottom().saturating_sub(1)),
            height: 1,
            ..full
        };
        frame.render_widget(status, status_area);
    }
}

const HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("Tab / Shift-Tab", "Next / previous tab"),
            ("j k / ↑ ↓", "Move selection"),
            ("r", "Refresh current view"),
            ("T", "Toggle light / dark theme"),
            ("?", "Toggle this help"),
            ("q / Ctrl-C", "Quit"),
        ],
    ),
    (
        "Accounts",
        &[
            ("Enter", "Open account details"),
            ("s / h", "Sign in / health check selected"),
            ("S / H", "Sign all / check all"),
            ("t", "Show API tokens"),
            ("x", "Enable or disable account"),
            ("g / G", "Cycle group filter / move to next group"),
            ("a / d", "Add / delete account"),
            ("Esc", "Back"),
        ],
    ),
    (
        "Tokens",
        &[
            ("c", "Copy full key to clipboard"),
            ("s", "Sync tokens from upstream"),
            ("a / e / d", "Add / edit / delete token"),
        ],
    ),
    (
        "Logs & settings",
        &[
            ("n / p", "Next / previous page"),
            ("f / a / D", "Result, account and date filters"),
            ("1-6", "Add notification channel"),
            ("e / E / i", "Export / export with logs / import backup"),
        ],
    ),
];

/// Draw the keybinding help overlay.
pub fn draw_help(frame: &mut Frame, palette: &Palette) {
    let rows: usize = HELP.iter().map(|(_, keys)| keys.len() + 2).sum();
    let area = centered(frame.area(), 62, rows as u16 + 2);
    frame.render_widget(Clear, area);

    let mut lines = Vec::new();
    for (section, keys) in HELP {
        lines.push(Line::from(Span::styled(
            *section,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )));
        for (key, desc) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<18}", key), Style::default().fg(palette.warning)),
                Span::styled(*desc, Style::default().fg(palette.text)),
            ]));
        }
        lines.push(Line::from(""));
    }

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(" Help (press ? to close) "),
    );
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_clips_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        assert_eq!(centered(area, 20, 4), Rect::new(10, 3, 20, 4));
        assert_eq!(centered(area, 80, 40), area);
    }
}
