// Credential persistence and login session.
// Keeps the stored bearer token and the API client in step.

use crate::api::ApiClient;
use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::storage::{Preferences, paths};

/// Preferences key holding the bearer token.
pub const TOKEN_KEY: &str = "auth.token";

pub fn get_token(prefs: &Preferences) -> Option<String> {
    prefs
        .get(TOKEN_KEY)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub fn set_token(prefs: &mut Preferences, token: &str) -> Result<()> {
    prefs.set(TOKEN_KEY, token)
}

pub fn remove_token(prefs: &mut Preferences) -> Result<()> {
    prefs.remove(TOKEN_KEY)
}

pub fn is_logged_in(prefs: &Preferences) -> bool {
    get_token(prefs).is_some()
}

/// Operator session: persisted preferences plus an authenticated client.
pub struct Session {
    prefs: Preferences,
    client: ApiClient,
}

impl Session {
    /// Open the preferences file and restore any stored token onto the client.
    pub fn open(config: &ConsoleConfig) -> Result<Self> {
        let prefs = Preferences::open(paths::preferences_path(&config.data_dir))?;
        let mut client = ApiClient::new(config)?;
        client.set_token(get_token(&prefs));
        Ok(Self { prefs, client })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.prefs
    }

    pub fn is_logged_in(&self) -> bool {
        self.client.is_authenticated()
    }

    /// Log in and persist the returned token.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let result = self.client.login(username, password).await?;
        set_token(&mut self.prefs, &result.access_token)?;
        self.client.set_token(Some(result.access_token));
        tracing::info!(%username, "logged in");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.client.set_token(None);
        remove_token(&mut self.prefs)?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Drop a credential the server no longer accepts.
    pub fn expire(&mut self) {
        self.client.set_token(None);
        if let Err(error) = remove_token(&mut self.prefs) {
            tracing::warn!(%error, "failed to clear stored token");
        }
        tracing::warn!("session expired; stored token cleared");
    }
}
