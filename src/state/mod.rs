// State management module.
// Stores cache server data per tab and record every outcome on the console.

pub mod account_detail;
pub mod accounts;
pub mod audit;
pub mod console;
pub mod dashboard;
pub mod feedback;
pub mod form;
pub mod list;
pub mod navigation;
pub mod notify;
pub mod settings;
pub mod sign_logs;
pub mod statistics;

pub use account_detail::AccountDetailStore;
pub use accounts::AccountStore;
pub use audit::AuditStore;
pub use console::{Console, ConsoleLevel, ConsoleMessage};
pub use dashboard::DashboardStore;
pub use form::{Confirm, ConfirmAction, Form, FormKind};
pub use list::{LoadingState, Page, SelectableList};
pub use navigation::{NavigationStack, ViewLevel};
pub use notify::NotifyStore;
pub use settings::{SettingField, SettingsStore};
pub use sign_logs::SignLogStore;
pub use statistics::StatisticsStore;
