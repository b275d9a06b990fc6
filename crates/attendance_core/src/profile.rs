//! Keyed blob storage for one user profile.
//!
//! Everything the tracker persists lives under one of four keys. The store
//! knows nothing about the shape of the values; typed access goes through
//! [`crate::overrides`].

use crate::error::Result;
use std::collections::BTreeMap;

/// The four independent records a profile holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProfileKey {
    Session,
    Submissions,
    Meetings,
    Assignments,
}

impl ProfileKey {
    pub const ALL: [ProfileKey; 4] = [
        ProfileKey::Session,
        ProfileKey::Submissions,
        ProfileKey::Meetings,
        ProfileKey::Assignments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKey::Session => "session",
            ProfileKey::Submissions => "submissions",
            ProfileKey::Meetings => "meetingsOverride",
            ProfileKey::Assignments => "assignmentsOverride",
        }
    }
}

impl std::fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait ProfileStore {
    fn get(&self, key: ProfileKey) -> Result<Option<String>>;
    fn set(&mut self, key: ProfileKey, value: &str) -> Result<()>;
    fn remove(&mut self, key: ProfileKey) -> Result<()>;

    fn clear(&mut self) -> Result<()> {
        for key in ProfileKey::ALL {
            self.remove(key)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryProfileStore {
    entries: BTreeMap<ProfileKey, String>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, key: ProfileKey) -> Result<Option<String>> {
        Ok(self.entries.get(&key).cloned())
    }

    fn set(&mut self, key: ProfileKey, value: &str) -> Result<()> {
        self.entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: ProfileKey) -> Result<()> {
        self.entries.remove(&key);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
