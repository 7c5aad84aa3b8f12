// UI module for rendering the TUI.
// Lays out the tab bar, header, active view and status bar, then any overlay.

mod breadcrumb;
mod charts;
mod list;
mod modal;
mod tabs;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Screen, Tab};
use crate::format::{format_datetime, format_number};
use crate::state::{LoadingState, SettingField, ViewLevel};
use crate::theme::Palette;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let palette = app.palette();

    if app.screen == Screen::Login {
        modal::draw_login(frame, &app.login_form, app.login_error.as_deref(), app.busy, &palette);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Length(2), // Breadcrumb / filters
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    tabs::draw_tabs(frame, app, chunks[0], &palette);
    draw_header(frame, app, chunks[1], &palette);
    draw_content(frame, app, chunks[2], &palette);
    draw_status_bar(frame, app, chunks[3], &palette);

    if let Some(form) = &app.form {
        modal::draw_form(frame, form, app.form_error.as_deref(), &palette);
    }
    if let Some(confirm) = &app.confirm {
        modal::draw_confirm(frame, confirm, &palette);
    }
    if app.show_help {
        modal::draw_help(frame, &palette);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    match app.active_tab {
        Tab::Accounts => {
            let filter = match app.nav.current() {
                ViewLevel::Accounts => Some(format!(
                    "{} | {} accounts",
                    app.accounts.selected_group_name(),
                    app.accounts.filtered().len()
                )),
                _ => None,
            };
            breadcrumb::draw_breadcrumb(frame, &app.nav.breadcrumbs(), filter.as_deref(), area, palette);
        }
        Tab::Dashboard => {
            let note = if app.dashboard.stale {
                "showing saved snapshot".to_string()
            } else {
                format!("{} accounts", app.dashboard.account_count())
            };
            breadcrumb::draw_header(frame, "Overview", &note, area, palette);
        }
        Tab::SignLogs => {
            let query = &app.sign_logs.query;
            let account = query
                .account_id
                .map(|id| {
                    app.accounts
                        .account_by_id(id)
                        .map_or_else(|| format!("#{}", id), |a| a.label())
                })
                .unwrap_or_else(|| "all accounts".to_string());
            let dates = match (&query.start_date, &query.end_date) {
                (None, None) => "any date".to_string(),
                (start, end) => format!(
                    "{} .. {}",
                    start.as_deref().unwrap_or(""),
                    end.as_deref().unwrap_or("")
                ),
            };
            let note = format!(
                "{} | {} | {} | {} ok / {} failed",
                account,
                app.sign_logs.success_filter_label(),
                dates,
                app.sign_logs.success_count,
                app.sign_logs.fail_count
            );
            breadcrumb::draw_header(frame, "Sign Logs", &note, area, palette);
        }
        Tab::Notify => {
            let note = format!("{} channels", app.notify.channels.len());
            breadcrumb::draw_header(frame, "Notification channels", &note, area, palette);
        }
        Tab::Statistics => {
            let note = format!(
                "last {} days | last {} months",
                app.statistics.days(),
                app.statistics.months()
            );
            breadcrumb::draw_header(frame, "Statistics", &note, area, palette);
        }
        Tab::Settings => breadcrumb::draw_header(frame, "Settings", "", area, palette),
        Tab::Audit => {
            let keyword = app.audit.query.keyword.as_deref().unwrap_or("");
            let note = if keyword.is_empty() {
                app.audit.action_filter_label().to_string()
            } else {
                format!("{} | \"{}\"", app.audit.action_filter_label(), keyword)
            };
            breadcrumb::draw_header(frame, "Audit log", &note, area, palette);
        }
        Tab::Console => {
            let note = format!("{} messages", app.console.len());
            breadcrumb::draw_header(frame, "Console", &note, area, palette);
        }
    }
}

/// Draw the main content area based on active tab.
fn draw_content(frame: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    match app.active_tab {
        Tab::Dashboard => charts::draw_dashboard(frame, &mut app.dashboard, area, palette),
        Tab::Accounts => draw_accounts_tab(frame, app, area, palette),
        Tab::SignLogs => list::render_sign_logs(frame, &mut app.sign_logs.logs, area, palette),
        Tab::Notify => list::render_channels(frame, &mut app.notify.channels, area, palette),
        Tab::Statistics => charts::draw_statistics(frame, &mut app.statistics, area, palette),
        Tab::Settings => draw_settings_tab(frame, app, area, palette),
        Tab::Audit => list::render_audit_logs(frame, &mut app.audit.logs, area, palette),
        Tab::Console => list::render_console(frame, &mut app.console, area, palette),
    }
}

/// Draw the Accounts tab with its drill-down levels.
fn draw_accounts_tab(frame: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    match app.nav.current().clone() {
        ViewLevel::Accounts => list::render_accounts(frame, &mut app.accounts, area, palette),
        ViewLevel::Account { .. } => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(area);
            let left = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(10), Constraint::Min(3)])
                .split(chunks[0]);

            list::render_account_info(frame, &app.detail.info, left[0], palette);
            list::render_account_channels(
                frame,
                &app.detail.channels,
                &mut app.detail.channel_state,
                left[1],
                palette,
            );
            list::render_history(frame, &mut app.detail.history, chunks[1], palette);
        }
        ViewLevel::Tokens { .. } => {
            list::render_tokens(frame, &mut app.detail.tokens, area, palette)
        }
    }
}

fn draw_settings_tab(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" System settings ");

    match &app.settings.settings {
        LoadingState::Loaded(settings) => {
            let items: Vec<ListItem> = SettingField::ALL
                .iter()
                .map(|field| {
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            format!("{:<32}", field.label()),
                            Style::default().fg(palette.text),
                        ),
                        Span::styled(field.value(settings), Style::default().fg(palette.accent)),
                    ]))
                })
                .collect();
            let mut state = ListState::default();
            state.select(Some(app.settings.selected));
            let widget = List::new(items)
                .block(block)
                .highlight_style(list::highlight_style(palette))
                .highlight_symbol("> ");
            frame.render_stateful_widget(widget, chunks[0], &mut state);
        }
        LoadingState::Loading => list::render_loading(frame, chunks[0], block, "Loading settings", palette),
        LoadingState::Error(e) => list::render_error(frame, chunks[0], block, e, palette),
        LoadingState::Idle => list::render_empty(frame, chunks[0], block, "Press r to load", palette),
    }

    let muted = Style::default().fg(palette.muted);
    let mut lines = vec![Line::from(Span::styled(
        "Scheduler",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    match &app.settings.scheduler {
        Some(status) => {
            let state = if status.running {
                Span::styled("running", Style::default().fg(palette.success))
            } else {
                Span::styled("stopped", Style::default().fg(palette.warning))
            };
            lines.push(Line::from(vec![Span::styled("  state     ", muted), state]));
            lines.push(Line::from(vec![
                Span::styled("  auto sign ", muted),
                Span::raw(if status.enabled { "enabled" } else { "disabled" }),
            ]));
            lines.push(Line::from(vec![
                Span::styled("  next run  ", muted),
                Span::raw(
                    status
                        .next_run
                        .as_deref()
                        .map(|t| format_datetime(Some(t)))
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]));
        }
        None => lines.push(Line::from(Span::styled("  unavailable", muted))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Backup",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(info) = &app.settings.backup_info {
        for (label, count) in [
            ("accounts", info.account_count),
            ("sign logs", info.sign_log_count),
            ("channels", info.notify_channel_count),
            ("settings", info.setting_count),
        ] {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<10}", label), muted),
                Span::raw(format_number(count as i64)),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  e export  E export with logs  i import  p password  L sign out",
        muted,
    )));

    let side = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Status "),
    );
    frame.render_widget(side, chunks[1]);
}

/// Draw the status bar with keybinding hints.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), Style::default().fg(palette.accent)),
            Span::styled(label, Style::default().fg(palette.muted)),
        ]
    };

    let tab_hints: &[(&str, &str)] = match app.active_tab {
        Tab::Dashboard => &[("s", "Sync endpoints"), ("S", "Sign all"), ("H", "Check all")],
        Tab::Accounts => match app.nav.current() {
            ViewLevel::Accounts => &[
                ("↵", "Open"),
                ("s", "Sign"),
                ("h", "Check"),
                ("t", "Tokens"),
                ("a", "Add"),
                ("d", "Delete"),
                ("g", "Group"),
                ("G", "Move"),
            ],
            ViewLevel::Account { .. } => &[
                ("↵", "Toggle channel"),
                ("s", "Sign"),
                ("h", "Check"),
                ("t", "Tokens"),
                ("n/p", "History page"),
                ("Esc", "Back"),
            ],
            ViewLevel::Tokens { .. } => &[
                ("c", "Copy key"),
                ("s", "Sync"),
                ("a", "Add"),
                ("e", "Edit"),
                ("d", "Delete"),
                ("Esc", "Back"),
            ],
        },
        Tab::SignLogs => &[("n/p", "Page"), ("f", "Result"), ("a", "Account"), ("D", "Dates")],
        Tab::Notify => &[("↵", "Toggle"), ("t", "Test"), ("d", "Delete"), ("1-6", "Add")],
        Tab::Statistics => &[("d", "Days")],
        Tab::Settings => &[("↵", "Edit"), ("p", "Password"), ("e", "Export"), ("i", "Import")],
        Tab::Audit => &[("n/p", "Page"), ("a", "Action"), ("/", "Search")],
        Tab::Console => &[("c", "Clear")],
    };

    let mut spans: Vec<Span> = Vec::new();
    if app.busy {
        spans.push(Span::styled(" ⏳ working", Style::default().fg(palette.warning)));
    }
    for (key, label) in tab_hints {
        spans.extend(hint(key, label));
    }
    for (key, label) in [("Tab", "Switch"), ("r", "Refresh"), ("T", "Theme"), ("?", "Help"), ("q", "Quit")] {
        spans.extend(hint(key, label));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
