// Dashboard and statistics views: summary cards, sign trend bars and rankings.

use chrono::Local;
use ratatui::{prelude::*, widgets::*};

use crate::format::{format_percent, format_quota, format_relative_time, format_short_date};
use crate::state::dashboard::ChartData;
use crate::state::{DashboardStore, LoadingState, StatisticsStore};
use crate::theme::Palette;

use super::list;

fn card<'a>(title: &'a str, value: String, detail: String, color: Color, palette: &Palette) -> Paragraph<'a> {
    Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(detail, Style::default().fg(palette.muted))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(format!(" {} ", title)),
    )
}

fn rate_gauge(title: &str, rate: f64, palette: &Palette) -> Gauge<'static> {
    let color = if rate >= 90.0 {
        palette.success
    } else if rate >= 60.0 {
        palette.warning
    } else {
        palette.error
    };
    Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title(format!(" {} ", title)),
        )
        .gauge_style(Style::default().fg(color))
        .ratio((rate / 100.0).clamp(0.0, 1.0))
        .label(format_percent(rate, 1))
}

/// Success and failure bars per day, newest on the right.
fn trend_chart<'a>(chart: &'a ChartData, title: &'a str, palette: &Palette) -> BarChart<'a> {
    let mut bar_chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border))
                .title(title),
        )
        .bar_width(3)
        .bar_gap(0)
        .group_gap(1);

    for (i, date) in chart.dates.iter().enumerate() {
        let success = chart.success.get(i).copied().unwrap_or(0);
        let fail = chart.fail.get(i).copied().unwrap_or(0);
        let group = BarGroup::default()
            .label(Line::from(format_short_date(date)))
            .bars(&[
                Bar::default()
                    .value(success)
                    .style(Style::default().fg(palette.success)),
                Bar::default()
                    .value(fail)
                    .style(Style::default().fg(palette.error)),
            ]);
        bar_chart = bar_chart.data(group);
    }
    bar_chart
}

/// Draw the dashboard tab.
pub fn draw_dashboard(frame: &mut Frame, store: &mut DashboardStore, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" Dashboard ");

    let Some(data) = &store.data else {
        if store.loading {
            list::render_loading(frame, area, block, "Loading dashboard", palette);
        } else {
            list::render_empty(frame, area, block, "Press r to load", palette);
        }
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(8),
        ])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(rows[0]);

    let unhealthy_color = if store.has_unhealthy_accounts() {
        palette.error
    } else {
        palette.success
    };
    frame.render_widget(
        card(
            "Accounts",
            data.account_count.to_string(),
            format!("{} active", data.active_account_count),
            palette.accent,
            palette,
        ),
        cards[0],
    );
    frame.render_widget(
        card(
            "Unhealthy",
            store.unhealthy_count().to_string(),
            "need attention".to_string(),
            unhealthy_color,
            palette,
        ),
        cards[1],
    );
    frame.render_widget(
        card(
            "Today",
            format!("{}/{}", store.today_sign_success(), store.today_sign_count()),
            "signed".to_string(),
            palette.info,
            palette,
        ),
        cards[2],
    );
    frame.render_widget(rate_gauge("Success rate", store.success_rate(), palette), cards[3]);
    frame.render_widget(
        card(
            "This month",
            store.month_reward().to_string(),
            format!("balance {}", store.total_quota()),
            palette.success,
            palette,
        ),
        cards[4],
    );

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);

    if store.has_daily_trend() {
        let chart = store.chart_data();
        frame.render_widget(trend_chart(&chart, " Sign trend ", palette), middle[0]);
    } else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Sign trend ");
        list::render_empty(frame, middle[0], block, "No sign activity yet", palette);
    }

    let now = Local::now();
    let recent: Vec<ListItem> = data
        .recent_signs
        .iter()
        .map(|sign| {
            let (mark, color) = if sign.success {
                ("✓ ", palette.success)
            } else {
                ("✗ ", palette.error)
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::styled(format!("{:<14}", sign.username), Style::default().fg(palette.text)),
                Span::styled(
                    format_relative_time(Some(&sign.sign_time), now),
                    Style::default().fg(palette.muted),
                ),
            ]))
        })
        .collect();
    let recent_widget = List::new(recent).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border))
            .title(" Recent signs "),
    );
    frame.render_widget(recent_widget, middle[1]);

    list::render_endpoints(frame, &mut store.endpoints, rows[2], palette);
}

/// Draw the statistics tab.
pub fn draw_statistics(frame: &mut Frame, store: &mut StatisticsStore, area: Rect, palette: &Palette) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Percentage(35),
        ])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" Overview ");
    match &store.overview {
        LoadingState::Loaded(overview) => {
            let cards = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 4); 4])
                .split(rows[0]);
            frame.render_widget(
                card(
                    "Accounts",
                    overview.total_accounts.to_string(),
                    format!("{} active", overview.active_accounts),
                    palette.accent,
                    palette,
                ),
                cards[0],
            );
            frame.render_widget(
                card(
                    "Today",
                    format!("{} ok", overview.today_success),
                    format!("{} failed", overview.today_fail),
                    palette.info,
                    palette,
                ),
                cards[1],
            );
            frame.render_widget(
                rate_gauge(
                    &format!("Month {}/{}", overview.month_success, overview.month_total),
                    overview.month_success_rate,
                    palette,
                ),
                cards[2],
            );
            frame.render_widget(
                card(
                    "Rewards",
                    overview
                        .total_reward_display
                        .clone()
                        .unwrap_or_else(|| format_quota(Some(overview.total_reward))),
                    format!(
                        "{} this month",
                        overview
                            .month_reward_display
                            .clone()
                            .unwrap_or_else(|| format_quota(Some(overview.month_reward)))
                    ),
                    palette.success,
                    palette,
                ),
                cards[3],
            );
        }
        LoadingState::Loading => list::render_loading(frame, rows[0], block, "Loading overview", palette),
        LoadingState::Error(e) => list::render_error(frame, rows[0], block, e, palette),
        LoadingState::Idle => list::render_empty(frame, rows[0], block, "Press r to load", palette),
    }

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let daily_title = format!(" Last {} days ", store.days());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(daily_title.clone());
    match &store.daily {
        LoadingState::Loaded(days) if !days.is_empty() => {
            let chart = ChartData {
                dates: days.iter().map(|d| d.date.clone()).collect(),
                success: days.iter().map(|d| d.success).collect(),
                fail: days.iter().map(|d| d.fail).collect(),
            };
            let widget = trend_chart(&chart, &daily_title, palette).max(store.daily_peak().max(1));
            frame.render_widget(widget, middle[0]);
        }
        LoadingState::Loaded(_) => list::render_empty(frame, middle[0], block, "No sign activity", palette),
        LoadingState::Loading => list::render_loading(frame, middle[0], block, "Loading daily statistics", palette),
        LoadingState::Error(e) => list::render_error(frame, middle[0], block, e, palette),
        LoadingState::Idle => list::render_empty(frame, middle[0], block, "Press r to load", palette),
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(format!(" Last {} months ", store.months()));
    match &store.monthly {
        LoadingState::Loaded(months) => {
            let items: Vec<ListItem> = months
                .iter()
                .map(|m| {
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{:<8}", m.month), Style::default().fg(palette.text)),
                        Span::raw(format!(" {:>4}/{:<4}", m.success, m.total)),
                        Span::styled(
                            format!(" {:>6}", format_percent(m.success_rate, 1)),
                            Style::default().fg(palette.accent),
                        ),
                        Span::styled(
                            format!(
                                " {:>10}",
                                m.reward_display
                                    .clone()
                                    .unwrap_or_else(|| format_quota(Some(m.reward)))
                            ),
                            Style::default().fg(palette.success),
                        ),
                    ]))
                })
                .collect();
            frame.render_widget(List::new(items).block(block), middle[1]);
        }
        LoadingState::Loading => list::render_loading(frame, middle[1], block, "Loading monthly statistics", palette),
        LoadingState::Error(e) => list::render_error(frame, middle[1], block, e, palette),
        LoadingState::Idle => list::render_empty(frame, middle[1], block, "Press r to load", palette),
    }

    list::render_account_stats(frame, &mut store.accounts, rows[2], palette);
}
