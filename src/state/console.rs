// Console (notification) state.
// Holds a bounded history of action results and failures with an unread badge.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use ratatui::widgets::ListState;

use crate::error::{ConsoleError, Result};

/// Oldest messages are dropped beyond this many.
pub const MAX_MESSAGES: usize = 200;

/// Console message level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ConsoleLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ConsoleLevel::Info => "INFO",
            ConsoleLevel::Success => "OK",
            ConsoleLevel::Warning => "WARN",
            ConsoleLevel::Error => "ERROR",
        }
    }
}

/// A console message for the activity log.
#[derive(Debug, Clone)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl ConsoleMessage {
    pub fn new(level: ConsoleLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Local::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Console {
    messages: VecDeque<ConsoleMessage>,
    unread: usize,
    viewing: bool,
    pub list_state: ListState,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: ConsoleLevel, message: impl Into<String>) {
        let message = ConsoleMessage::new(level, message);
        match level {
            ConsoleLevel::Error => tracing::warn!(message = %message.message, "console error"),
            _ => tracing::info!(level = level.label(), message = %message.message, "console"),
        }

        self.messages.push_back(message);
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front();
        }
        if !self.viewing {
            self.unread = (self.unread + 1).min(MAX_MESSAGES);
        }
        self.scroll_to_bottom();
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ConsoleLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ConsoleLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(ConsoleLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ConsoleLevel::Error, message);
    }

    /// Record a failed request with the server detail.
    pub fn report(&mut self, err: &ConsoleError) {
        self.error(err.user_message());
    }

    /// Pass a result through, recording an error message on failure.
    pub fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &ConsoleMessage> + ExactSizeIterator {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&ConsoleMessage> {
        self.messages.back()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages since the console tab was last viewed.
    pub fn unread(&self) -> usize {
        self.unread
    }

    /// Mark whether the console is on screen; viewing clears the badge.
    pub fn set_viewing(&mut self, viewing: bool) {
        self.viewing = viewing;
        if viewing {
            self.unread = 0;
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.unread = 0;
        self.list_state.select(None);
    }

    fn scroll_to_bottom(&mut self) {
        if !self.messages.is_empty() {
            self.list_state.select(Some(self.messages.len() - 1));
        }
    }

    pub fn select_prev(&mut self) {
        super::list::step_selection(&mut self.list_state, self.messages.len(), false);
    }

    pub fn select_next(&mut self) {
        super::list::step_selection(&mut self.list_state, self.messages.len(), true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_history_is_bounded() {
        let mut console = Console::new();
        for i in 0..MAX_MESSAGES + 25 {
            console.info(format!("message {}", i));
        }
        assert_eq!(console.len(), MAX_MESSAGES);
        assert_eq!(console.messages().next().unwrap().message, "message 25");
        assert_eq!(console.list_state.selected(), Some(MAX_MESSAGES - 1));
    }

    #[test]
    fn test_unread_badge() {
        let mut console = Console::new();
        console.success("saved");
        console.error("failed");
        assert_eq!(console.unread(), 2);

        console.set_viewing(true);
        assert_eq!(console.unread(), 0);
        console.info("while viewing");
        assert_eq!(console.unread(), 0);

        console.set_viewing(false);
        console.warning("later");
        assert_eq!(console.unread(), 1);
    }

    #[test]
    fn test_track_records_server_detail() {
        let mut console = Console::new();
        let result: Result<()> = Err(ConsoleError::Api {
            status: StatusCode::BAD_REQUEST,
            detail: "Account already exists".into(),
        });

        assert!(console.track(result).is_err());
        let last = console.last().unwrap();
        assert_eq!(last.level, ConsoleLevel::Error);
        assert_eq!(last.message, "Account already exists");

        assert_eq!(console.track(Ok(5)).unwrap(), 5);
        assert_eq!(console.len(), 1);
    }
}
