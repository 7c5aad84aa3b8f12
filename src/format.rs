// Presentation helpers.
// Formats quotas, timestamps, percentages and status labels for display.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use crate::api::types::{ChannelType, HealthStatus};

/// Server quota units per US dollar.
pub const QUOTA_PER_USD: f64 = 500_000.0;

/// Two-decimal dollar amount. A missing quota renders as `$0.00`.
pub fn format_quota(quota: Option<i64>) -> String {
    let usd = quota.unwrap_or(0) as f64 / QUOTA_PER_USD;
    format!("${:.2}", usd)
}

/// Dollar amount with precision scaled to magnitude.
///
/// Below one cent four decimals are shown; from $1000 up the integer part
/// gets thousands separators.
pub fn format_quota_precise(quota: i64) -> String {
    let usd = quota as f64 / QUOTA_PER_USD;
    if usd < 0.01 {
        format!("${:.4}", usd)
    } else if usd < 1000.0 {
        format!("${:.2}", usd)
    } else {
        let fixed = format!("{:.2}", usd);
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        format!("${}.{}", group_thousands(int_part), frac_part)
    }
}

/// Parse a server timestamp.
///
/// Accepts RFC 3339 and naive ISO values (`T` or space separated, optional
/// fraction). Naive values are read as local time.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local));
    }

    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d"];
    for format in NAIVE_FORMATS {
        let naive = if format == "%Y-%m-%d" {
            chrono::NaiveDate::parse_from_str(value, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        } else {
            NaiveDateTime::parse_from_str(value, format).ok()
        };
        if let Some(naive) = naive {
            return Local.from_local_datetime(&naive).earliest();
        }
    }

    None
}

/// Human "time ago" text. Missing or unparsable input yields an empty string.
pub fn format_relative_time(time: Option<&str>, now: DateTime<Local>) -> String {
    let Some(then) = time.and_then(parse_timestamp) else {
        return String::new();
    };

    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const WEEK: i64 = 7 * DAY;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    let diff = now.signed_duration_since(then).num_seconds();
    match diff {
        d if d < MINUTE => "just now".to_string(),
        d if d < HOUR => format!("{} min ago", d / MINUTE),
        d if d < DAY => format!("{} h ago", d / HOUR),
        d if d < 2 * DAY => "1 day ago".to_string(),
        d if d < WEEK => format!("{} days ago", d / DAY),
        d if d < MONTH => plural(d / WEEK, "week"),
        d if d < YEAR => plural(d / MONTH, "month"),
        d => plural(d / YEAR, "year"),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Format with `YYYY MM DD HH mm ss` tokens; each token is replaced once.
pub fn format_date(time: Option<&str>, pattern: &str) -> String {
    let Some(dt) = time.and_then(parse_timestamp) else {
        return String::new();
    };

    pattern
        .replacen("YYYY", &dt.format("%Y").to_string(), 1)
        .replacen("MM", &dt.format("%m").to_string(), 1)
        .replacen("DD", &dt.format("%d").to_string(), 1)
        .replacen("HH", &dt.format("%H").to_string(), 1)
        .replacen("mm", &dt.format("%M").to_string(), 1)
        .replacen("ss", &dt.format("%S").to_string(), 1)
}

pub fn format_datetime(time: Option<&str>) -> String {
    format_date(time, "YYYY-MM-DD HH:mm:ss")
}

/// `2024-03-05` becomes `03/05`; anything else is returned unchanged.
pub fn format_short_date(date: &str) -> String {
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() >= 3 {
        format!("{}/{}", parts[1], parts[2])
    } else {
        date.to_string()
    }
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    if value < 0 {
        format!("-{}", group_thousands(&digits))
    } else {
        group_thousands(&digits)
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}

/// Split a comma-separated model list, dropping blanks.
pub fn parse_models(model_limits: Option<&str>) -> Vec<String> {
    model_limits
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Badge category for a health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Default,
}

pub fn health_status_kind(status: HealthStatus) -> StatusKind {
    match status {
        HealthStatus::Healthy => StatusKind::Success,
        HealthStatus::Unhealthy => StatusKind::Error,
        HealthStatus::Unknown => StatusKind::Default,
    }
}

pub fn health_status_text(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "Healthy",
        HealthStatus::Unhealthy => "Unhealthy",
        HealthStatus::Unknown => "Unknown",
    }
}

/// Display name for a channel type, falling back to the raw value.
pub fn channel_type_name(channel_type: &str) -> String {
    let name = match ChannelType::parse(channel_type) {
        Some(ChannelType::Pushplus) => "PushPlus",
        Some(ChannelType::WechatMp) => "WeChat MP",
        Some(ChannelType::WechatWork) => "WeChat Work",
        Some(ChannelType::Dingtalk) => "DingTalk",
        Some(ChannelType::Feishu) => "Feishu",
        Some(ChannelType::Email) => "Email (SMTP)",
        None => return channel_type.to_string(),
    };
    name.to_string()
}

/// Token keys are stored without the `sk-` prefix clients expect.
pub fn full_token_key(key: &str) -> String {
    if key.starts_with("sk-") {
        key.to_string()
    } else {
        format!("sk-{}", key)
    }
}
