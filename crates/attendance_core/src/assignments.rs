//! Senator-to-committee assignments.

use crate::error::{Error, Result};
use crate::overrides;
use crate::profile::{ProfileKey, ProfileStore};
use crate::schema::{CommitteeAssignment, Role, User};
use std::collections::BTreeSet;
use tracing::info;

pub fn effective(
    store: &dyn ProfileStore,
    static_assignments: Vec<CommitteeAssignment>,
) -> Result<Vec<CommitteeAssignment>> {
    overrides::read(store, ProfileKey::Assignments, static_assignments)
}

/// Sorted committee names for `pid`, empty when the pid has no record.
pub fn assigned_committees(pid: &str, assignments: &[CommitteeAssignment]) -> Vec<String> {
    assignments
        .iter()
        .filter(|assignment| assignment.pid == pid)
        .flat_map(|assignment| assignment.committees.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Replace one senator's committees, then store the full assignment list.
pub fn set(
    store: &mut dyn ProfileStore,
    static_assignments: Vec<CommitteeAssignment>,
    directory: &[User],
    allowed: &[String],
    pid: &str,
    committees: impl IntoIterator<Item = String>,
) -> Result<CommitteeAssignment> {
    let pid = pid.trim();
    if !directory
        .iter()
        .any(|user| user.pid == pid && user.role == Role::Senator)
    {
        return Err(Error::validation(format!("'{pid}' is not a senator in the directory")));
    }

    let committees: BTreeSet<String> = committees
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    let unknown: Vec<&str> = committees
        .iter()
        .filter(|name| !allowed.contains(name))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(Error::validation(format!(
            "Not an allowed committee: {}",
            unknown.join(", ")
        )));
    }

    let mut assignments = effective(store, static_assignments)?;
    let updated = CommitteeAssignment {
        pid: pid.to_string(),
        committees,
    };
    assignments.retain(|assignment| assignment.pid != pid);
    assignments.push(updated.clone());
    assignments.sort_by(|a, b| a.pid.cmp(&b.pid));
    overrides::write(store, ProfileKey::Assignments, &assignments)?;
    info!(pid, count = updated.committees.len(), "assignment updated");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MemoryProfileStore;

    fn static_assignments() -> Vec<CommitteeAssignment> {
        vec![CommitteeAssignment {
            pid: "12345678".to_string(),
            committees: BTreeSet::from(["Academic Affairs Committee".to_string()]),
        }]
    }

    fn directory() -> Vec<User> {
        vec![
            User {
                pid: "12345678".to_string(),
                password: "senator1".to_string(),
                role: Role::Senator,
            },
            User {
                pid: "23456789".to_string(),
                password: "senator2".to_string(),
                role: Role::Senator,
            },
            User {
                pid: "admin".to_string(),
                password: "admin".to_string(),
                role: Role::Admin,
            },
        ]
    }

    fn allowed() -> Vec<String> {
        vec![
            "Academic Affairs Committee".to_string(),
            "Finance Committee".to_string(),
            "Rules Committee".to_string(),
        ]
    }

    #[test]
    fn static_assignment_lookup() {
        let store = MemoryProfileStore::new();
        let current = effective(&store, static_assignments()).unwrap();
        assert_eq!(
            assigned_committees("12345678", &current),
            vec!["Academic Affairs Committee".to_string()]
        );
        assert!(assigned_committees("00000000", &current).is_empty());
    }

    #[test]
    fn set_replaces_whole_list_override() {
        let mut store = MemoryProfileStore::new();
        let updated = set(
            &mut store,
            static_assignments(),
            &directory(),
            &allowed(),
            " 23456789 ",
            [
                "Rules Committee".to_string(),
                "Finance Committee".to_string(),
                "Rules Committee".to_string(),
            ],
        )
        .unwrap();
        assert_eq!(updated.committees.len(), 2);

        let current = effective(&store, Vec::new()).unwrap();
        assert_eq!(current.len(), 2);
        assert_eq!(
            assigned_committees("23456789", &current),
            vec!["Finance Committee".to_string(), "Rules Committee".to_string()]
        );
        assert_eq!(
            assigned_committees("12345678", &current),
            vec!["Academic Affairs Committee".to_string()]
        );
    }

    #[test]
    fn set_rejects_unknown_committee_and_non_senator() {
        let mut store = MemoryProfileStore::new();
        let bogus = set(
            &mut store,
            static_assignments(),
            &directory(),
            &allowed(),
            "12345678",
            ["Secret Committee".to_string()],
        );
        assert!(matches!(bogus, Err(Error::Validation(_))));

        let admin = set(
            &mut store,
            static_assignments(),
            &directory(),
            &allowed(),
            "admin",
            ["Rules Committee".to_string()],
        );
        assert!(admin.is_err());
        assert_eq!(store.get(ProfileKey::Assignments).unwrap(), None);
    }

    #[test]
    fn clearing_committees_keeps_the_record() {
        let mut store = MemoryProfileStore::new();
        set(&mut store, static_assignments(), &directory(), &allowed(), "12345678", Vec::new())
            .unwrap();
        let current = effective(&store, static_assignments()).unwrap();
        assert_eq!(current.len(), 1);
        assert!(assigned_committees("12345678", &current).is_empty());
    }
}
