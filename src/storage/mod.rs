// Local persistent storage.
// Holds the credential and preference store plus cached server snapshots.

pub mod paths;
pub mod store;

pub use store::{CachedData, Preferences, SNAPSHOT_TTL, read_cached, read_if_valid, write_cached};
