// List rendering for the table-like views.
// Every view shares the loading, error and empty placeholders.

use chrono::{Local, TimeZone};
use ratatui::{prelude::*, widgets::*};

use crate::api::types::{
    AccountInfo, AccountNotify, AccountStatistics, ApiEndpoint, ApiToken, AuditLog, NotifyChannel,
    SignLog,
};
use crate::format::{
    channel_type_name, format_datetime, format_number, format_percent, format_quota,
    format_relative_time, health_status_kind, health_status_text, StatusKind,
};
use crate::state::{AccountStore, Console, ConsoleLevel, LoadingState, Page, SelectableList};
use crate::theme::Palette;

pub fn highlight_style(palette: &Palette) -> Style {
    Style::default()
        .bg(palette.selection)
        .add_modifier(Modifier::BOLD)
}

fn bordered(title: String, palette: &Palette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(title)
}

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, block: Block, message: &str, palette: &Palette) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.warning))
        .block(block);
    frame.render_widget(text, area);
}

/// Render an error message.
pub fn render_error(frame: &mut Frame, area: Rect, block: Block, error: &str, palette: &Palette) {
    let text = Paragraph::new(format!("❌ {}", error))
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.error))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, block: Block, message: &str, palette: &Palette) {
    let text = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.muted))
        .block(block);
    frame.render_widget(text, area);
}

/// Render the placeholder for a state that has nothing to list.
/// Returns the loaded data when there is something to draw.
fn placeholder<'a, T>(
    frame: &mut Frame,
    state: &'a LoadingState<T>,
    area: Rect,
    block: Block,
    noun: &str,
    palette: &Palette,
) -> Option<&'a T> {
    match state {
        LoadingState::Idle => {
            render_empty(frame, area, block, "Press r to load", palette);
            None
        }
        LoadingState::Loading => {
            render_loading(frame, area, block, &format!("Loading {}", noun), palette);
            None
        }
        LoadingState::Error(e) => {
            render_error(frame, area, block, e, palette);
            None
        }
        LoadingState::Loaded(data) => Some(data),
    }
}

fn status_color(kind: StatusKind, palette: &Palette) -> Color {
    match kind {
        StatusKind::Success => palette.success,
        StatusKind::Error => palette.error,
        StatusKind::Default => palette.muted,
    }
}

fn outcome_span(success: bool, palette: &Palette) -> Span<'static> {
    if success {
        Span::styled("✓ ", Style::default().fg(palette.success))
    } else {
        Span::styled("✗ ", Style::default().fg(palette.error))
    }
}

/// Render the account list, filtered by the selected group.
pub fn render_accounts(frame: &mut Frame, store: &mut AccountStore, area: Rect, palette: &Palette) {
    let block = bordered(" Accounts ".to_string(), palette);
    if placeholder(frame, &store.accounts, area, block.clone(), "accounts", palette).is_none() {
        return;
    }

    let now = Local::now();
    let items: Vec<ListItem> = store
        .filtered()
        .into_iter()
        .map(|account| {
            let health = health_status_kind(account.health_status);
            let mut spans = vec![
                Span::styled("● ", Style::default().fg(status_color(health, palette))),
                Span::styled(
                    format!("{:<20}", account.label()),
                    Style::default().fg(if account.is_active {
                        palette.text
                    } else {
                        palette.muted
                    }),
                ),
                Span::styled(
                    format!(" {:<10}", health_status_text(account.health_status)),
                    Style::default().fg(palette.muted),
                ),
                Span::styled(
                    format!(
                        " {:>12}",
                        account
                            .quota_display
                            .clone()
                            .unwrap_or_else(|| format_quota(account.cached_quota))
                    ),
                    Style::default().fg(palette.accent),
                ),
            ];
            if let Some(group) = store.group_of(account) {
                spans.push(Span::styled(
                    format!("  [{}]", group.name),
                    Style::default().fg(palette.info),
                ));
            }
            if !account.is_active {
                spans.push(Span::styled("  disabled", Style::default().fg(palette.warning)));
            }
            if let Some(last) = &account.last_sign {
                spans.push(Span::raw("  "));
                spans.push(outcome_span(last.success.unwrap_or(false), palette));
                spans.push(Span::styled(
                    format_relative_time(last.time.as_deref(), now),
                    Style::default().fg(palette.muted),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    if items.is_empty() {
        render_empty(frame, area, block, "No accounts in this group", palette);
        return;
    }

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(highlight_style(palette))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list_widget, area, &mut store.list_state);
}

/// Render the remote profile of one account.
pub fn render_account_info(
    frame: &mut Frame,
    info: &LoadingState<AccountInfo>,
    area: Rect,
    palette: &Palette,
) {
    let block = bordered(" Account ".to_string(), palette);
    let Some(info) = placeholder(frame, info, area, block.clone(), "account", palette) else {
        return;
    };

    let muted = Style::default().fg(palette.muted);
    let row = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{:<12}", label), muted), Span::raw(value)])
    };
    let lines = vec![
        row("user", format!("{} (#{})", info.username, info.id)),
        row("name", info.display_name.clone()),
        row("group", info.group.clone()),
        row(
            "balance",
            info.quota_display
                .clone()
                .unwrap_or_else(|| format_quota(Some(info.quota))),
        ),
        row(
            "used",
            info.used_quota_display
                .clone()
                .unwrap_or_else(|| format_quota(Some(info.used_quota))),
        ),
        row("requests", format_number(info.request_count as i64)),
        row(
            "invites",
            format!(
                "{} ({})",
                info.aff_count,
                info.aff_history_quota_display
                    .clone()
                    .unwrap_or_else(|| format_quota(Some(info.aff_history_quota)))
            ),
        ),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the notification channels bound to one account.
pub fn render_account_channels(
    frame: &mut Frame,
    channels: &LoadingState<Vec<AccountNotify>>,
    list_state: &mut ListState,
    area: Rect,
    palette: &Palette,
) {
    let block = bordered(" Notifications ".to_string(), palette);
    let Some(channels) = placeholder(frame, channels, area, block.clone(), "channels", palette)
    else {
        return;
    };
    if channels.is_empty() {
        render_empty(frame, area, block, "No notification channels", palette);
        return;
    }

    let items: Vec<ListItem> = channels
        .iter()
        .map(|channel| {
            let check = if channel.is_enabled { "[x] " } else { "[ ] " };
            ListItem::new(Line::from(vec![
                Span::raw(check),
                Span::styled(channel.channel_name.clone(), Style::default().fg(palette.text)),
                Span::styled(
                    format!("  {}", channel_type_name(&channel.channel_type)),
                    Style::default().fg(palette.muted),
                ),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(highlight_style(palette))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list_widget, area, list_state);
}

fn sign_log_items(page: &Page<SignLog>, show_user: bool, palette: &Palette) -> Vec<ListItem<'static>> {
    page.items
        .iter()
        .map(|log| {
            let mut spans = vec![
                outcome_span(log.success, palette),
                Span::styled(
                    format!("{:<17}", format_datetime(Some(&log.sign_time))),
                    Style::default().fg(palette.muted),
                ),
            ];
            if show_user {
                spans.push(Span::styled(
                    format!(" {:<16}", log.username.as_deref().unwrap_or("-")),
                    Style::default().fg(palette.text),
                ));
            }
            let reward = log
                .reward_display
                .clone()
                .unwrap_or_else(|| format_quota(Some(log.reward_quota)));
            spans.push(Span::styled(
                format!(" {:>10}", reward),
                Style::default().fg(palette.accent),
            ));
            if log.retry_count > 0 {
                spans.push(Span::styled(
                    format!("  retried {}x", log.retry_count),
                    Style::default().fg(palette.warning),
                ));
            }
            if let Some(message) = &log.message {
                spans.push(Span::styled(
                    format!("  {}", message),
                    Style::default().fg(palette.muted),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect()
}

fn render_sign_log_page(
    frame: &mut Frame,
    logs: &mut LoadingState<Page<SignLog>>,
    title: &str,
    show_user: bool,
    area: Rect,
    palette: &Palette,
) {
    let block = bordered(format!(" {} ", title), palette);
    let Some(page) = placeholder(frame, logs, area, block.clone(), "sign logs", palette) else {
        return;
    };
    if page.items.is_empty() {
        render_empty(frame, area, block, "No sign records", palette);
        return;
    }

    let block = bordered(format!(" {} ({}) ", title, page.summary()), palette);
    let items = sign_log_items(page, show_user, palette);
    if let LoadingState::Loaded(page) = logs {
        let list_widget = List::new(items)
            .block(block)
            .highlight_style(highlight_style(palette))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list_widget, area, &mut page.list_state);
    }
}

/// Render the global sign log listing.
pub fn render_sign_logs(
    frame: &mut Frame,
    logs: &mut LoadingState<Page<SignLog>>,
    area: Rect,
    palette: &Palette,
) {
    render_sign_log_page(frame, logs, "Sign Logs", true, area, palette);
}

/// Render one account's sign history.
pub fn render_history(
    frame: &mut Frame,
    logs: &mut LoadingState<Page<SignLog>>,
    area: Rect,
    palette: &Palette,
) {
    render_sign_log_page(frame, logs, "Sign history", false, area, palette);
}

fn format_unix(timestamp: Option<i64>) -> String {
    match timestamp {
        None | Some(-1) => "never".to_string(),
        Some(secs) => Local
            .timestamp_opt(secs, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string()),
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(6).collect();
    format!("sk-{}…", visible.trim_start_matches("sk-"))
}

/// Render the API tokens of one account.
pub fn render_tokens(
    frame: &mut Frame,
    list: &mut SelectableList<ApiToken>,
    area: Rect,
    palette: &Palette,
) {
    let block = bordered(" API Tokens ".to_string(), palette);
    let Some(tokens) = placeholder(frame, &list.data, area, block.clone(), "tokens", palette)
    else {
        return;
    };
    if tokens.is_empty() {
        render_empty(frame, area, block, "No tokens, press s to sync", palette);
        return;
    }

    let items: Vec<ListItem> = tokens
        .iter()
        .map(|token: &ApiToken| {
            let enabled = token.status == 1;
            let remain = if token.unlimited_quota {
                "unlimited".to_string()
            } else {
                format_quota(Some(token.remain_quota))
            };
            let expires = if token.never_expires() {
                "never".to_string()
            } else {
                format_unix(token.expired_time)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    if enabled { "● " } else { "○ " },
                    Style::default().fg(if enabled { palette.success } else { palette.muted }),
                ),
                Span::styled(
                    format!("{:<18}", token.name.as_deref().unwrap_or("unnamed")),
                    Style::default().fg(palette.text),
                ),
                Span::styled(format!(" {:<12}", mask_key(&token.key)), Style::default().fg(palette.muted)),
                Span::styled(format!(" {:>12}", remain), Style::default().fg(palette.accent)),
                Span::styled(
                    format!("  used {}", format_quota(Some(token.used_quota))),
                    Style::default().fg(palette.muted),
                ),
                Span::styled(format!("  expires {}", expires), Style::default().fg(palette.muted)),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(highlight_style(palette))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list_widget, area, &mut list.list_state);
}

/// Render the global notification channels.
pub fn render_channels(
    frame: &mut Frame,
    list: &mut SelectableList<NotifyChannel>,
    area: Rect,
    palette: &Palette,
) {
    let block = bordered(" Channels ".to_string(), palette);
    let Some(channels) = placeholder(frame, &list.data, area, block.clone(), "channels", palette)
    else {
        return;
    };
    if channels.is_empty() {
        render_empty(frame, area, block, "No channels, press 1-6 to add one", palette);
        return;
    }

    let items: Vec<ListItem> = channels
        .iter()
        .map(|channel: &NotifyChannel| {
            let (mark, color) = if channel.is_enabled {
                ("● enabled ", palette.success)
            } else {
                ("○ disabled", palette.muted)
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::styled(format!("  {:<20}", channel.name), Style::default().fg(palette.text)),
                Span::styled(
                    channel_type_name(&channel.channel_type),
                    Style::default().fg(palette.info),
                ),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(highlight_style(palette))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list_widget, area, &mut list.list_state);
}

/// Render the audit log page.
pub fn render_audit_logs(
    frame: &mut Frame,
    logs: &mut LoadingState<Page<AuditLog>>,
    area: Rect,
    palette: &Palette,
) {
    let block = bordered(" Audit log ".to_string(), palette);
    let Some(page) = placeholder(frame, logs, area, block.clone(), "audit log", palette) else {
        return;
    };
    if page.items.is_empty() {
        render_empty(frame, area, block, "No audit entries", palette);
        return;
    }

    let block = bordered(format!(" Audit log ({}) ", page.summary()), palette);
    let items: Vec<ListItem> = page
        .items
        .iter()
        .map(|log| {
            let target = match (&log.target_name, &log.target_type) {
                (Some(name), _) => name.clone(),
                (None, Some(kind)) => kind.clone(),
                (None, None) => String::new(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<17}", format_datetime(log.created_at.as_deref())),
                    Style::default().fg(palette.muted),
                ),
                Span::styled(
                    format!(" {:<12}", log.username.as_deref().unwrap_or("-")),
                    Style::default().fg(palette.text),
                ),
                Span::styled(
                    format!(" {:<16}", log.action_name.as_deref().unwrap_or(&log.action)),
                    Style::default().fg(palette.accent),
                ),
                Span::raw(format!(" {}", target)),
                Span::styled(
                    format!("  {}", log.ip_address.as_deref().unwrap_or("")),
                    Style::default().fg(palette.muted),
                ),
            ]))
        })
        .collect();

    if let LoadingState::Loaded(page) = logs {
        let list_widget = List::new(items)
            .block(block)
            .highlight_style(highlight_style(palette))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list_widget, area, &mut page.list_state);
    }
}

/// Render the upstream API endpoints list.
pub fn render_endpoints(
    frame: &mut Frame,
    list: &mut SelectableList<ApiEndpoint>,
    area: Rect,
    palette: &Palette,
) {
    let block = bordered(" API endpoints ".to_string(), palette);
    let Some(endpoints) = placeholder(frame, &list.data, area, block.clone(), "endpoints", palette)
    else {
        return;
    };
    if endpoints.is_empty() {
        render_empty(frame, area, block, "No endpoints, press s to sync", palette);
        return;
    }

    let items: Vec<ListItem> = endpoints
        .iter()
        .map(|endpoint: &ApiEndpoint| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<10}", endpoint.route), Style::default().fg(palette.accent)),
                Span::raw(endpoint.url.clone()),
                Span::styled(
                    format!("  {}", endpoint.description.as_deref().unwrap_or("")),
                    Style::default().fg(palette.muted),
                ),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(highlight_style(palette))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list_widget, area, &mut list.list_state);
}

/// Render the per-account statistics ranking.
pub fn render_account_stats(
    frame: &mut Frame,
    list: &mut SelectableList<AccountStatistics>,
    area: Rect,
    palette: &Palette,
) {
    let block = bordered(" Accounts ".to_string(), palette);
    let Some(stats) = placeholder(frame, &list.data, area, block.clone(), "account statistics", palette)
    else {
        return;
    };
    if stats.is_empty() {
        render_empty(frame, area, block, "No sign activity yet", palette);
        return;
    }

    let items: Vec<ListItem> = stats
        .iter()
        .map(|stat: &AccountStatistics| {
            let name = stat
                .username
                .clone()
                .unwrap_or_else(|| format!("#{}", stat.account_id));
            let reward = stat
                .total_reward_display
                .clone()
                .unwrap_or_else(|| format_quota(Some(stat.total_reward)));
            ListItem::new(Line::from(vec![
                Span::styled(
                    "● ",
                    Style::default().fg(status_color(health_status_kind(stat.health_status), palette)),
                ),
                Span::styled(format!("{:<16}", name), Style::default().fg(palette.text)),
                Span::raw(format!(" {:>4}/{:<4}", stat.success_count, stat.total_signs)),
                Span::styled(
                    format!(" {:>6}", format_percent(stat.success_rate, 1)),
                    Style::default().fg(palette.accent),
                ),
                Span::styled(format!(" {:>10}", reward), Style::default().fg(palette.success)),
                Span::styled(
                    format!("  {}d streak", stat.streak_days),
                    Style::default().fg(palette.muted),
                ),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(highlight_style(palette))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list_widget, area, &mut list.list_state);
}

/// Render the console activity log, oldest first.
pub fn render_console(frame: &mut Frame, console: &mut Console, area: Rect, palette: &Palette) {
    let block = bordered(" Console ".to_string(), palette);
    if console.is_empty() {
        render_empty(frame, area, block, "No messages yet", palette);
        return;
    }

    let items: Vec<ListItem> = console
        .messages()
        .map(|msg| {
            let color = match msg.level {
                ConsoleLevel::Info => palette.info,
                ConsoleLevel::Success => palette.success,
                ConsoleLevel::Warning => palette.warning,
                ConsoleLevel::Error => palette.error,
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    msg.timestamp.format("%H:%M:%S ").to_string(),
                    Style::default().fg(palette.muted),
                ),
                Span::styled(format!("{:<6}", msg.level.label()), Style::default().fg(color)),
                Span::raw(msg.message.clone()),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(highlight_style(palette))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list_widget, area, &mut console.list_state);
}
