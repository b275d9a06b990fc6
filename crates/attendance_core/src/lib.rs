//! Committee attendance tracker core.
//!
//! Static reference data (users, meetings, assignments, allowed committees)
//! is shadowed by whole-collection overrides kept in a per-profile store.
//! Submissions are an append-only log in the same store.

pub mod assignments;
pub mod calendar;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod meetings;
pub mod overrides;
pub mod profile;
pub mod reference;
pub mod schema;
pub mod session;
pub mod submissions;

pub use dispatch::{Command, Dispatcher, Outcome};
pub use error::{Error, Result};
pub use profile::{MemoryProfileStore, ProfileKey, ProfileStore};
