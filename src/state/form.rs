// Modal form and confirmation state.
// Forms collect text input and convert it into typed request payloads.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::api::types::{
    ApiToken, ChannelType, CreateAccount, CreateChannel, SettingsUpdate, TokenParams,
};
use crate::error::{ConsoleError, Result};
use crate::format::QUOTA_PER_USD;

use super::notify::{config_fields, config_from_pairs, is_secret_key};
use super::settings::SettingField;

/// Longest password the server accepts, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub key: &'static str,
    pub label: String,
    pub value: String,
    /// Rendered masked.
    pub secret: bool,
}

impl FormField {
    fn new(key: &'static str, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
            value: String::new(),
            secret: false,
        }
    }

    fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn display_value(&self) -> String {
        if self.secret {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// What a submitted form does.
#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    Login,
    AddAccount,
    AddToken { account_id: u64 },
    EditToken { account_id: u64, token_id: u64 },
    AddChannel(ChannelType),
    EditSetting(SettingField),
    ChangePassword,
    ImportBackup,
    SignLogDates,
    AuditKeyword,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl Form {
    fn new(kind: FormKind, title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            title: title.into(),
            fields,
            focus: 0,
        }
    }

    pub fn login() -> Self {
        Self::new(
            FormKind::Login,
            "Sign in",
            vec![
                FormField::new("username", "Username"),
                FormField::new("password", "Password").secret(),
            ],
        )
    }

    pub fn add_account() -> Self {
        Self::new(
            FormKind::AddAccount,
            "Add account",
            vec![
                FormField::new("user_id", "Remote user ID"),
                FormField::new("session_cookie", "Session cookie").secret(),
            ],
        )
    }

    /// Token form, prefilled when editing.
    pub fn token(account_id: u64, existing: Option<&ApiToken>) -> Self {
        let mut fields = vec![
            FormField::new("name", "Name"),
            FormField::new("quota", "Quota in USD (blank = unlimited)"),
            FormField::new("expires_days", "Expires in days (blank = never)"),
            FormField::new("allow_ips", "Allowed IPs"),
            FormField::new("group", "Group"),
        ];
        let Some(token) = existing else {
            return Self::new(FormKind::AddToken { account_id }, "Add token", fields);
        };

        let values = [
            token.name.clone().unwrap_or_default(),
            if token.unlimited_quota {
                String::new()
            } else {
                format!("{:.2}", token.remain_quota as f64 / QUOTA_PER_USD)
            },
            String::new(),
            token.allow_ips.clone().unwrap_or_default(),
            token.group.clone().unwrap_or_default(),
        ];
        for (field, value) in fields.iter_mut().zip(values) {
            field.value = value;
        }
        Self::new(
            FormKind::EditToken {
                account_id,
                token_id: token.token_id,
            },
            "Edit token",
            fields,
        )
    }

    pub fn channel(channel_type: ChannelType) -> Self {
        let mut fields = vec![FormField::new("name", "Name")];
        fields.extend(config_fields(channel_type).iter().map(|&key| {
            let field = FormField::new(key, key);
            if is_secret_key(key) { field.secret() } else { field }
        }));
        Self::new(
            FormKind::AddChannel(channel_type),
            format!("Add {} channel", crate::format::channel_type_name(channel_type.as_str())),
            fields,
        )
    }

    pub fn setting(field: SettingField, current: &str) -> Self {
        Self::new(
            FormKind::EditSetting(field),
            "Edit setting",
            vec![FormField::new("value", field.label()).with_value(current)],
        )
    }

    pub fn change_password() -> Self {
        Self::new(
            FormKind::ChangePassword,
            "Change password",
            vec![
                FormField::new("old_password", "Current password").secret(),
                FormField::new("new_password", "New password").secret(),
                FormField::new("confirm_password", "Repeat new password").secret(),
            ],
        )
    }

    pub fn import_backup() -> Self {
        Self::new(
            FormKind::ImportBackup,
            "Import backup",
            vec![
                FormField::new("path", "Backup file"),
                FormField::new("overwrite", "Overwrite existing (y/N)"),
            ],
        )
    }

    pub fn sign_log_dates(start: Option<&str>, end: Option<&str>) -> Self {
        Self::new(
            FormKind::SignLogDates,
            "Filter by date",
            vec![
                FormField::new("start_date", "From (YYYY-MM-DD)").with_value(start.unwrap_or_default()),
                FormField::new("end_date", "To (YYYY-MM-DD)").with_value(end.unwrap_or_default()),
            ],
        )
    }

    pub fn audit_keyword(current: Option<&str>) -> Self {
        Self::new(
            FormKind::AuditKeyword,
            "Search audit log",
            vec![FormField::new("keyword", "Keyword").with_value(current.unwrap_or_default())],
        )
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map_or("", |f| f.value.trim())
    }

    fn required(&self, key: &str) -> Result<String> {
        let value = self.value(key);
        if value.is_empty() {
            let label = self
                .fields
                .iter()
                .find(|f| f.key == key)
                .map_or(key, |f| f.label.as_str());
            return Err(ConsoleError::Other(format!("{} is required", label)));
        }
        Ok(value.to_string())
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn is_last_field(&self) -> bool {
        self.focus + 1 >= self.fields.len()
    }

    pub fn input(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn credentials(&self) -> Result<(String, String)> {
        Ok((self.required("username")?, self.required("password")?))
    }

    pub fn create_account(&self, group_id: Option<u64>) -> Result<CreateAccount> {
        Ok(CreateAccount {
            user_id: self.required("user_id")?,
            session_cookie: self.required("session_cookie")?,
            group_id,
        })
    }

    /// Token payload. Quota is entered in USD; expiry in days from `now`.
    pub fn token_params(&self, now: DateTime<Local>) -> Result<TokenParams> {
        let name = self.required("name")?;

        let quota = self.value("quota");
        let (remain_quota, unlimited_quota) = if quota.is_empty() {
            (0, true)
        } else {
            let usd: f64 = quota
                .trim_start_matches('$')
                .parse()
                .ok()
                .filter(|v: &f64| *v >= 0.0)
                .ok_or_else(|| ConsoleError::Other("Quota must be a positive amount".into()))?;
            ((usd * QUOTA_PER_USD).round() as i64, false)
        };

        let days = self.value("expires_days");
        let expired_time = if days.is_empty() {
            -1
        } else {
            let days: i64 = days
                .parse()
                .ok()
                .filter(|d| *d > 0)
                .ok_or_else(|| ConsoleError::Other("Expiry must be a whole number of days".into()))?;
            (now + Duration::days(days)).timestamp()
        };

        Ok(TokenParams {
            name,
            remain_quota,
            expired_time,
            unlimited_quota,
            allow_ips: self.value("allow_ips").to_string(),
            group: self.value("group").to_string(),
            ..TokenParams::default()
        })
    }

    pub fn create_channel(&self, channel_type: ChannelType) -> Result<CreateChannel> {
        let name = self.required("name")?;
        let config = config_from_pairs(
            self.fields
                .iter()
                .filter(|f| f.key != "name")
                .map(|f| (f.key, f.value.as_str())),
        );
        Ok(CreateChannel {
            channel_type,
            name,
            config,
        })
    }

    pub fn settings_update(&self, field: SettingField) -> Result<SettingsUpdate> {
        field.parse_input(self.value("value"))
    }

    /// Old and new password, after checking the repeat matches.
    pub fn password_change(&self) -> Result<(String, String)> {
        let old = self.required("old_password")?;
        let new = self.required("new_password")?;
        if new != self.value("confirm_password") {
            return Err(ConsoleError::Other("New passwords do not match".into()));
        }
        if new.len() > MAX_PASSWORD_BYTES {
            return Err(ConsoleError::Other(format!(
                "Password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        Ok((old, new))
    }

    pub fn backup_import(&self) -> Result<(PathBuf, bool)> {
        let path = PathBuf::from(self.required("path")?);
        let overwrite = matches!(self.value("overwrite").to_ascii_lowercase().as_str(), "y" | "yes");
        Ok((path, overwrite))
    }

    pub fn date_range(&self) -> Result<(Option<String>, Option<String>)> {
        let parse = |key: &str| -> Result<Option<String>> {
            let value = self.value(key);
            if value.is_empty() {
                return Ok(None);
            }
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| Some(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| ConsoleError::Other(format!("{} is not a YYYY-MM-DD date", value)))
        };
        Ok((parse("start_date")?, parse("end_date")?))
    }
}

/// Destructive action waiting for a yes/no answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    DeleteAccount(u64),
    DeleteToken { account_id: u64, token_id: u64 },
    DeleteChannel(u64),
    SignAll,
    Logout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Confirm {
    pub prompt: String,
    pub action: ConfirmAction,
}

impl Confirm {
    pub fn new(action: ConfirmAction, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fill(form: &mut Form, values: &[&str]) {
        for (i, value) in values.iter().enumerate() {
            form.fields[i].value = value.to_string();
        }
    }

    #[test]
    fn test_field_focus_wraps() {
        let mut form = Form::login();
        form.prev_field();
        assert_eq!(form.focus, 1);
        assert!(form.is_last_field());
        form.next_field();
        assert_eq!(form.focus, 0);

        form.input('a');
        form.input('b');
        form.backspace();
        assert_eq!(form.value("username"), "a");
        form.next_field();
        form.input('x');
        assert_eq!(form.fields[1].display_value(), "*");
    }

    #[test]
    fn test_required_fields() {
        let form = Form::add_account();
        let err = form.create_account(None).unwrap_err();
        assert_eq!(err.user_message(), "Remote user ID is required");
    }

    #[test]
    fn test_token_params() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        let mut form = Form::token(1, None);
        fill(&mut form, &["ci", "$2.50", "30", "", "default"]);

        let params = form.token_params(now).unwrap();
        assert_eq!(params.remain_quota, 1_250_000);
        assert!(!params.unlimited_quota);
        assert_eq!(params.expired_time, (now + Duration::days(30)).timestamp());
        assert_eq!(params.group, "default");

        fill(&mut form, &["ci", "", "", "", ""]);
        let params = form.token_params(now).unwrap();
        assert!(params.unlimited_quota);
        assert_eq!(params.expired_time, -1);

        fill(&mut form, &["ci", "abc"]);
        assert!(form.token_params(now).is_err());
    }

    #[test]
    fn test_edit_token_prefill() {
        let token: ApiToken = serde_json::from_value(serde_json::json!({
            "id": 3, "token_id": 42, "key": "abc", "name": "ci",
            "remain_quota": 500000, "unlimited_quota": false
        }))
        .unwrap();
        let form = Form::token(1, Some(&token));
        assert_eq!(
            form.kind,
            FormKind::EditToken {
                account_id: 1,
                token_id: 42
            }
        );
        assert_eq!(form.value("quota"), "1.00");
    }

    #[test]
    fn test_channel_form_marks_secrets() {
        let mut form = Form::channel(ChannelType::Dingtalk);
        assert!(form.fields.iter().any(|f| f.key == "secret" && f.secret));
        fill(&mut form, &["ops", "https://oapi.dingtalk.com/robot/send", ""]);

        let params = form.create_channel(ChannelType::Dingtalk).unwrap();
        assert_eq!(params.name, "ops");
        assert_eq!(params.config.len(), 1);
    }

    #[test]
    fn test_password_change_checks_repeat() {
        let mut form = Form::change_password();
        fill(&mut form, &["old", "new-pass", "new-pas"]);
        assert!(form.password_change().is_err());
        fill(&mut form, &["old", "new-pass", "new-pass"]);
        assert_eq!(
            form.password_change().unwrap(),
            ("old".to_string(), "new-pass".to_string())
        );
    }

    #[test]
    fn test_backup_import_and_dates() {
        let mut form = Form::import_backup();
        fill(&mut form, &["/tmp/backup.json", "Y"]);
        assert_eq!(
            form.backup_import().unwrap(),
            (PathBuf::from("/tmp/backup.json"), true)
        );

        let mut form = Form::sign_log_dates(None, None);
        fill(&mut form, &["2024-03-01", ""]);
        assert_eq!(
            form.date_range().unwrap(),
            (Some("2024-03-01".to_string()), None)
        );
        fill(&mut form, &["03/01/2024", ""]);
        assert!(form.date_range().is_err());
    }
}
