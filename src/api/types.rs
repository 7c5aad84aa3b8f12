// Server API record types.
// Defines structs for (de)serializing the automation server's REST payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Uniform response envelope used by every JSON endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

// ---- accounts ----

/// Health of an account's stored credential, as last checked by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    #[default]
    #[serde(other)]
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        }
    }
}

/// Registered third-party account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    #[serde(rename = "anyrouter_user_id", default)]
    pub remote_user_id: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub health_status: HealthStatus,
    #[serde(default)]
    pub health_message: Option<String>,
    #[serde(default)]
    pub last_health_check: Option<String>,
    #[serde(default)]
    pub group_id: Option<u64>,
    #[serde(default)]
    pub group: Option<AccountGroup>,
    #[serde(default)]
    pub cached_quota: Option<i64>,
    #[serde(default)]
    pub cached_used_quota: Option<i64>,
    #[serde(default)]
    pub cached_request_count: Option<u64>,
    #[serde(default)]
    pub quota_display: Option<String>,
    #[serde(default)]
    pub notify_channels: Vec<ChannelBrief>,
    #[serde(default)]
    pub last_sign: Option<LastSign>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Account {
    /// Best available label: display name, then username, then the id.
    pub fn label(&self) -> String {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.username.as_deref().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("account #{}", self.id))
    }
}

/// Most recent sign action recorded for an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastSign {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Short channel reference embedded in an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelBrief {
    pub id: u64,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub name: String,
}

/// Named color tag for account groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupColor {
    Blue,
    Green,
    Red,
    Orange,
    Purple,
    Pink,
    Cyan,
    #[default]
    #[serde(other)]
    Default,
}

impl GroupColor {
    /// Hex RGB value for the color tag.
    pub fn hex(&self) -> &'static str {
        match self {
            GroupColor::Default => "#8b8b8b",
            GroupColor::Blue => "#2080f0",
            GroupColor::Green => "#18a058",
            GroupColor::Red => "#d03050",
            GroupColor::Orange => "#f0a020",
            GroupColor::Purple => "#8b5cf6",
            GroupColor::Pink => "#ec4899",
            GroupColor::Cyan => "#06b6d4",
        }
    }

    /// RGB components of [`GroupColor::hex`].
    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = &self.hex()[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0x8b);
        (channel(0), channel(2), channel(4))
    }
}

/// Account group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: GroupColor,
    #[serde(default)]
    pub account_count: u64,
}

/// Create or update payload for a group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<GroupColor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAccount {
    pub session_cookie: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
}

/// Live account details fetched from the third-party service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub role: i64,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub quota: i64,
    #[serde(default)]
    pub used_quota: i64,
    #[serde(default)]
    pub request_count: u64,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub aff_code: Option<String>,
    #[serde(default)]
    pub aff_count: u64,
    #[serde(default)]
    pub aff_history_quota: i64,
    #[serde(default)]
    pub quota_display: Option<String>,
    #[serde(default)]
    pub used_quota_display: Option<String>,
    #[serde(default)]
    pub aff_history_quota_display: Option<String>,
}

// ---- tokens ----

/// API token derived from an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
    pub id: u64,
    #[serde(default)]
    pub account_id: Option<u64>,
    pub token_id: u64,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub remain_quota: i64,
    #[serde(default)]
    pub used_quota: i64,
    #[serde(default)]
    pub unlimited_quota: bool,
    #[serde(default)]
    pub model_limits_enabled: bool,
    #[serde(default)]
    pub model_limits: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub allow_ips: Option<String>,
    #[serde(default)]
    pub created_time: Option<i64>,
    #[serde(default)]
    pub accessed_time: Option<i64>,
    #[serde(default)]
    pub expired_time: Option<i64>,
    #[serde(default)]
    pub synced_at: Option<String>,
}

impl ApiToken {
    /// Tokens with `expired_time == -1` never expire.
    pub fn never_expires(&self) -> bool {
        matches!(self.expired_time, None | Some(-1))
    }
}

/// Create/update payload for an API token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenParams {
    pub name: String,
    pub remain_quota: i64,
    pub expired_time: i64,
    pub unlimited_quota: bool,
    pub model_limits_enabled: bool,
    pub model_limits: String,
    pub allow_ips: String,
    pub group: String,
}

impl Default for TokenParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            remain_quota: 0,
            expired_time: -1,
            unlimited_quota: true,
            model_limits_enabled: false,
            model_limits: String::new(),
            allow_ips: String::new(),
            group: String::new(),
        }
    }
}

// ---- sign actions ----

/// One recorded sign action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignLog {
    pub id: u64,
    pub account_id: u64,
    #[serde(default)]
    pub username: Option<String>,
    pub sign_time: String,
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reward_quota: i64,
    #[serde(default)]
    pub reward_display: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
}

/// Paged sign log listing with per-filter success/fail totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignLogPage {
    #[serde(default)]
    pub items: Vec<SignLog>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub success_count: Option<u64>,
    #[serde(default)]
    pub fail_count: Option<u64>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

/// Filters for the global sign log listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SignLogQuery {
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl Default for SignLogQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: default_page_size(),
            account_id: None,
            success: None,
            start_date: None,
            end_date: None,
        }
    }
}

/// Explicit outcome reported by newer servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignStatus {
    Success,
    AlreadySigned,
    Failed,
}

/// Message older servers return when the account was already signed today.
pub const ALREADY_SIGNED_MESSAGE: &str = "今日已签到";

/// Message returned when the upstream sign request failed.
pub const SIGN_FAILED_MESSAGE: &str = "签到失败";

/// Result of signing one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignOutcome {
    #[serde(default)]
    pub status: Option<SignStatus>,
    #[serde(default)]
    pub reward_quota: i64,
    #[serde(default)]
    pub reward_display: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sign_time: Option<String>,
}

impl SignOutcome {
    /// Effective status, inferred from the message when the server omits it.
    pub fn effective_status(&self) -> SignStatus {
        if let Some(status) = self.status {
            return status;
        }
        match self.message.as_str() {
            ALREADY_SIGNED_MESSAGE => SignStatus::AlreadySigned,
            SIGN_FAILED_MESSAGE => SignStatus::Failed,
            _ => SignStatus::Success,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSignItem {
    pub account_id: u64,
    #[serde(default)]
    pub username: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSignResult {
    #[serde(default)]
    pub total: u64,
    pub success_count: u64,
    pub fail_count: u64,
    #[serde(default)]
    pub already_signed_count: u64,
    #[serde(default)]
    pub results: Vec<BatchSignItem>,
}

// ---- health checks ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub account_id: u64,
    pub health_status: HealthStatus,
    #[serde(default)]
    pub health_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchHealthCheckResult {
    pub healthy_count: u64,
    pub unhealthy_count: u64,
    #[serde(default)]
    pub results: Vec<HealthCheckResult>,
}

// ---- notification channels ----

/// Supported delivery targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Pushplus,
    WechatMp,
    WechatWork,
    Dingtalk,
    Feishu,
    Email,
}

impl ChannelType {
    pub const ALL: [ChannelType; 6] = [
        ChannelType::Pushplus,
        ChannelType::WechatMp,
        ChannelType::WechatWork,
        ChannelType::Dingtalk,
        ChannelType::Feishu,
        ChannelType::Email,
    ];

    /// Wire name of the channel type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Pushplus => "pushplus",
            ChannelType::WechatMp => "wechat_mp",
            ChannelType::WechatWork => "wechat_work",
            ChannelType::Dingtalk => "dingtalk",
            ChannelType::Feishu => "feishu",
            ChannelType::Email => "email",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value.trim())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyChannel {
    pub id: u64,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub name: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    pub is_enabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateChannel {
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    pub name: String,
    pub config: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateChannel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
}

/// Per-account routing to one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountNotify {
    pub channel_id: u64,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub channel_type: String,
    pub is_enabled: bool,
    #[serde(default)]
    pub notify_config: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountNotifyConfig {
    pub channel_id: u64,
    pub is_enabled: bool,
    #[serde(default)]
    pub notify_config: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountNotifyUpdate {
    pub channels: Vec<AccountNotifyConfig>,
}

// ---- dashboard & statistics ----

/// Upstream API node tracked by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub id: u64,
    pub endpoint_id: u64,
    pub route: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrend {
    pub date: String,
    pub success: u64,
    pub fail: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentSign {
    #[serde(default)]
    pub username: String,
    pub sign_time: String,
    pub success: bool,
}

/// Dashboard summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub account_count: u64,
    #[serde(default)]
    pub active_account_count: u64,
    #[serde(default)]
    pub unhealthy_account_count: u64,
    #[serde(default)]
    pub today_sign_count: u64,
    #[serde(default)]
    pub today_sign_success: u64,
    #[serde(default)]
    pub success_rate: Option<f64>,
    #[serde(default)]
    pub month_reward: i64,
    #[serde(default)]
    pub month_reward_display: Option<String>,
    #[serde(default)]
    pub total_quota: i64,
    #[serde(default)]
    pub total_quota_display: Option<String>,
    #[serde(default)]
    pub total_used_quota: i64,
    #[serde(default)]
    pub total_used_quota_display: Option<String>,
    #[serde(default)]
    pub total_request_count: u64,
    #[serde(default)]
    pub daily_trend: Vec<DailyTrend>,
    #[serde(default)]
    pub recent_signs: Vec<RecentSign>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsOverview {
    #[serde(default)]
    pub total_accounts: u64,
    #[serde(default)]
    pub active_accounts: u64,
    #[serde(default)]
    pub today_success: u64,
    #[serde(default)]
    pub today_fail: u64,
    #[serde(default)]
    pub month_success: u64,
    #[serde(default)]
    pub month_total: u64,
    #[serde(default)]
    pub month_success_rate: f64,
    #[serde(default)]
    pub total_reward: i64,
    #[serde(default)]
    pub total_reward_display: Option<String>,
    #[serde(default)]
    pub month_reward: i64,
    #[serde(default)]
    pub month_reward_display: Option<String>,
    #[serde(default)]
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStatistics {
    pub date: String,
    pub success: u64,
    pub fail: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub reward: i64,
    #[serde(default)]
    pub reward_display: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStatistics {
    pub month: String,
    pub success: u64,
    pub fail: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub reward: i64,
    #[serde(default)]
    pub reward_display: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatistics {
    pub account_id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub total_signs: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub fail_count: u64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub total_reward: i64,
    #[serde(default)]
    pub total_reward_display: Option<String>,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub health_status: HealthStatus,
}

// ---- settings ----

/// Server-side automation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    #[serde(default)]
    pub auto_sign_enabled: bool,
    #[serde(default = "default_sign_time")]
    pub auto_sign_time: String,
    #[serde(default = "default_true")]
    pub health_check_enabled: bool,
    #[serde(default = "default_health_interval")]
    pub health_check_interval: u32,
    #[serde(default = "default_true")]
    pub sign_retry_enabled: bool,
    #[serde(default = "default_max_retries")]
    pub sign_max_retries: u32,
    #[serde(default = "default_retry_interval")]
    pub sign_retry_interval: u32,
}

fn default_sign_time() -> String {
    "08:00".to_string()
}

fn default_true() -> bool {
    true
}

fn default_health_interval() -> u32 {
    6
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_interval() -> u32 {
    30
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            auto_sign_enabled: false,
            auto_sign_time: default_sign_time(),
            health_check_enabled: true,
            health_check_interval: default_health_interval(),
            sign_retry_enabled: true,
            sign_max_retries: default_max_retries(),
            sign_retry_interval: default_retry_interval(),
        }
    }
}

/// Partial settings update; only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_sign_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_sign_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_retry_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_retry_interval: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStatus {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub sign_time: Option<String>,
    #[serde(default)]
    pub next_run: Option<String>,
    #[serde(default)]
    pub running: bool,
}

// ---- audit ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    pub action: String,
    #[serde(default)]
    pub action_name: Option<String>,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_id: Option<u64>,
    #[serde(default)]
    pub target_name: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditPage {
    #[serde(default)]
    pub items: Vec<AuditLog>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
    #[serde(default)]
    pub pages: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuditQuery {
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: default_page_size(),
            action: None,
            target_type: None,
            start_date: None,
            end_date: None,
            keyword: None,
        }
    }
}

/// Selectable audit action type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditActionOption {
    pub value: String,
    pub label: String,
}

// ---- auth ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginParams {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
}

// ---- backup ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupInfo {
    #[serde(default)]
    pub account_count: u64,
    #[serde(default)]
    pub sign_log_count: u64,
    #[serde(default)]
    pub notify_channel_count: u64,
    #[serde(default)]
    pub setting_count: u64,
}

/// `{"count": n}` payload returned by sync endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncCount {
    #[serde(default)]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_tolerates_sparse_payload() {
        let account: Account = serde_json::from_value(json!({
            "id": 7,
            "anyrouter_user_id": 1234,
            "username": "alice",
            "is_active": true,
            "health_status": "degraded",
            "created_at": "2024-03-05T08:00:00"
        }))
        .unwrap();

        assert_eq!(account.remote_user_id, Some(1234));
        assert_eq!(account.health_status, HealthStatus::Unknown);
        assert!(account.notify_channels.is_empty());
        assert_eq!(account.label(), "alice");
    }

    #[test]
    fn test_group_color_fallback_and_rgb() {
        let group: AccountGroup =
            serde_json::from_value(json!({"id": 1, "name": "main", "color": "teal"})).unwrap();
        assert_eq!(group.color, GroupColor::Default);
        assert_eq!(GroupColor::Blue.rgb(), (0x20, 0x80, 0xf0));
    }

    #[test]
    fn test_sign_outcome_status_inference() {
        let explicit: SignOutcome =
            serde_json::from_value(json!({"status": "failed", "message": "cookie expired"}))
                .unwrap();
        assert_eq!(explicit.effective_status(), SignStatus::Failed);

        let already: SignOutcome =
            serde_json::from_value(json!({"message": ALREADY_SIGNED_MESSAGE, "reward_quota": 0}))
                .unwrap();
        assert_eq!(already.effective_status(), SignStatus::AlreadySigned);

        let failed: SignOutcome = serde_json::from_value(json!({
            "message": SIGN_FAILED_MESSAGE, "reward_quota": 0, "reward_display": "$0.00"
        }))
        .unwrap();
        assert_eq!(failed.effective_status(), SignStatus::Failed);

        let fresh: SignOutcome = serde_json::from_value(
            json!({"message": "+$2.5", "reward_quota": 1250000, "reward_display": "$2.50"}),
        )
        .unwrap();
        assert_eq!(fresh.effective_status(), SignStatus::Success);
    }

    #[test]
    fn test_partial_updates_skip_absent_fields() {
        let update = SettingsUpdate {
            auto_sign_enabled: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"auto_sign_enabled": true})
        );

        let query = SignLogQuery {
            success: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"page": 1, "size": 20, "success": false})
        );
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: SystemSettings =
            serde_json::from_value(json!({"auto_sign_enabled": true})).unwrap();
        assert!(settings.auto_sign_enabled);
        assert_eq!(settings.auto_sign_time, "08:00");
        assert_eq!(settings.sign_retry_interval, 30);
    }

    #[test]
    fn test_channel_type_parse() {
        assert_eq!(ChannelType::parse("wechat_work"), Some(ChannelType::WechatWork));
        assert_eq!(ChannelType::parse("carrier pigeon"), None);
    }
}
