use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Senator,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Role::Senator => "senator",
            Role::Admin => "admin",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct User {
    pub pid: String,
    pub password: String, // compared verbatim, never hashed
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommitteeAssignment {
    pub pid: String,
    pub committees: BTreeSet<String>, // deduplicated, iterates in display order
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Meeting {
    pub id: String,        // "m<integer>"
    pub committee: String,
    pub name: String,
    pub date: String,      // ISO-8601 calendar date, e.g. "2025-02-14"
    pub time: String,      // freeform display text, e.g. "6:00 PM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Fields an admin supplies when creating a meeting; the id is assigned on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingDraft {
    pub committee: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub location: Option<String>,
}

/// Inline edit of an existing meeting. `None` leaves the field untouched;
/// `location: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingPatch {
    pub committee: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<Option<String>>,
}

impl MeetingPatch {
    pub fn is_empty(&self) -> bool {
        self.committee.is_none()
            && self.name.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.location.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub pid: String,
    pub committee_name: String,
    pub meeting_name: String,
    pub meeting_date: String,
    pub meeting_id: String,
    pub timestamp: String, // RFC 3339 UTC with milliseconds
    pub attendance_confirmed: bool,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_data: Option<String>, // data URL, base64 payload
}

impl Submission {
    /// Identity used to detect duplicates on import.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.pid, &self.meeting_id, &self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Session {
    pub pid: String,
    pub role: Role,
    pub timestamp: i64, // epoch millis at login
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_uses_camel_case_wire_names() {
        let submission = Submission {
            pid: "12345678".to_string(),
            committee_name: "Academic Affairs Committee".to_string(),
            meeting_name: "Spring kickoff".to_string(),
            meeting_date: "2025-02-14".to_string(),
            meeting_id: "m1".to_string(),
            timestamp: "2025-02-14T18:00:00.000Z".to_string(),
            attendance_confirmed: true,
            notes: String::new(),
            attachment_name: None,
            attachment_data: None,
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["committeeName"], "Academic Affairs Committee");
        assert_eq!(value["attendanceConfirmed"], true);
        assert!(value.get("attachmentName").is_none());
    }

    #[test]
    fn assignment_committees_are_deduplicated_and_sorted() {
        let raw = r#"{"pid":"1","committees":["Rules","Finance","Rules"]}"#;
        let assignment: CommitteeAssignment = serde_json::from_str(raw).unwrap();
        let committees: Vec<&str> = assignment.committees.iter().map(String::as_str).collect();
        assert_eq!(committees, vec!["Finance", "Rules"]);
    }

    #[test]
    fn role_parses_lowercase() {
        let user: User =
            serde_json::from_str(r#"{"pid":"a","password":"b","role":"admin"}"#).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.role.to_string(), "admin");
    }
}
