// Header line rendering: the drill-down trail on Accounts, a title elsewhere.

use ratatui::{prelude::*, widgets::*};

use crate::state::navigation::BreadcrumbNode;
use crate::theme::Palette;

/// Render the breadcrumb trail, with an optional note aligned right.
pub fn draw_breadcrumb(
    frame: &mut Frame,
    breadcrumbs: &[BreadcrumbNode],
    note: Option<&str>,
    area: Rect,
    palette: &Palette,
) {
    let mut spans = Vec::new();

    for (i, node) in breadcrumbs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(palette.muted)));
        }

        let style = if i == breadcrumbs.len() - 1 {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text)
        };

        spans.push(Span::styled(node.label.clone(), style));
    }

    render_with_note(frame, Line::from(spans), note, area, palette);
}

/// Render a plain title for tabs without a navigation stack.
pub fn draw_header(frame: &mut Frame, title: &str, note: &str, area: Rect, palette: &Palette) {
    let line = Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
    ));
    let note = (!note.is_empty()).then_some(note);
    render_with_note(frame, line, note, area, palette);
}

fn render_with_note(
    frame: &mut Frame,
    line: Line,
    note: Option<&str>,
    area: Rect,
    palette: &Palette,
) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(palette.border));
    frame.render_widget(Paragraph::new(line).block(block), area);

    if let Some(note) = note {
        let note_para = Paragraph::new(Line::from(Span::styled(
            note.to_string(),
            Style::default().fg(palette.muted),
        )))
        .alignment(Alignment::Right);
        frame.render_widget(
            note_para,
            Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: 1,
            },
        );
    }
}
