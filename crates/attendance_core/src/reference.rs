//! Read-only seed data shipped with the application.
//!
//! Resources live under `<root>/data`. A logical name such as `"users"`
//! resolves to the first of `users.json`, `users.yaml`, `users.yml` that
//! exists; the extension picks the parser.

use crate::error::{Error, Result};
use crate::schema::{CommitteeAssignment, Meeting, User};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const USERS: &str = "users";
pub const MEETINGS: &str = "meetings";
pub const ASSIGNMENTS: &str = "assignments";
pub const COMMITTEES: &str = "committees";

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

#[derive(Debug, Clone)]
pub struct ReferenceLoader {
    data_dir: PathBuf,
}

impl ReferenceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: root.into().join("data"),
        }
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if Path::new(name).extension().is_some() {
            let path = self.data_dir.join(name);
            return path.exists().then_some(path);
        }
        EXTENSIONS
            .iter()
            .map(|ext| self.data_dir.join(format!("{name}.{ext}")))
            .find(|path| path.exists())
    }

    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.resolve(name).ok_or_else(|| Error::Load {
            resource: name.to_string(),
            reason: format!("not found under {}", self.data_dir.display()),
        })?;
        let raw = fs::read_to_string(&path).map_err(|err| Error::Load {
            resource: name.to_string(),
            reason: err.to_string(),
        })?;
        debug!(path = %path.display(), "loading reference data");

        let parsed = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw).map_err(|err| err.to_string()),
            _ => serde_json::from_str(&raw).map_err(|err| err.to_string()),
        };
        parsed.map_err(|reason| Error::Load {
            resource: name.to_string(),
            reason,
        })
    }

    pub fn users(&self) -> Result<Vec<User>> {
        self.load(USERS)
    }

    pub fn meetings(&self) -> Result<Vec<Meeting>> {
        self.load(MEETINGS)
    }

    pub fn assignments(&self) -> Result<Vec<CommitteeAssignment>> {
        self.load(ASSIGNMENTS)
    }

    /// Allowed committee names, sorted and deduplicated.
    pub fn committees(&self) -> Result<Vec<String>> {
        let names: BTreeSet<String> = self.load(COMMITTEES)?;
        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Role;

    fn loader_with(files: &[(&str, &str)]) -> (tempfile::TempDir, ReferenceLoader) {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir_all(&data).unwrap();
        for (name, body) in files {
            fs::write(data.join(name), body).unwrap();
        }
        let loader = ReferenceLoader::new(dir.path());
        (dir, loader)
    }

    #[test]
    fn loads_json_users() {
        let (_dir, loader) = loader_with(&[(
            "users.json",
            r#"[{"pid":"12345678","password":"senator1","role":"senator"}]"#,
        )]);
        let users = loader.users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Senator);
    }

    #[test]
    fn falls_through_to_yaml() {
        let (_dir, loader) = loader_with(&[(
            "committees.yaml",
            "- Rules Committee\n- Finance Committee\n- Rules Committee\n",
        )]);
        assert_eq!(
            loader.committees().unwrap(),
            vec!["Finance Committee".to_string(), "Rules Committee".to_string()]
        );
    }

    #[test]
    fn missing_resource_is_load_error() {
        let (_dir, loader) = loader_with(&[]);
        assert!(matches!(loader.users(), Err(Error::Load { .. })));
    }

    #[test]
    fn unparsable_resource_is_load_error() {
        let (_dir, loader) = loader_with(&[("meetings.json", "[{\"id\": ")]);
        let err = loader.meetings().unwrap_err();
        match err {
            Error::Load { resource, .. } => assert_eq!(resource, "meetings"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
