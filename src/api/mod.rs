// Automation server API module.
// Client, wire types and one endpoint file per resource group.

pub mod accounts;
pub mod audit;
pub mod auth;
pub mod backup;
pub mod client;
pub mod dashboard;
pub mod groups;
pub mod notify;
pub mod settings;
pub mod sign;
pub mod types;

pub use client::ApiClient;
pub use types::*;
