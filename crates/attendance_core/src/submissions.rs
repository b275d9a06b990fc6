//! Append-only submission log.
//!
//! `record` never deduplicates; duplicate detection happens on `import`,
//! keyed on `(pid, meetingId, timestamp)`.

use crate::error::{Error, Result};
use crate::overrides;
use crate::profile::{ProfileKey, ProfileStore};
use crate::schema::{Meeting, Submission};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{info, warn};

/// Largest attachment accepted, measured on the raw bytes before encoding.
pub const MAX_ATTACHMENT_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub meeting_id: String,
    pub attendance_confirmed: bool,
    pub notes: String,
    pub attachment: Option<AttachmentUpload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported_count: usize,
    pub total_count: usize,
}

pub fn load(store: &dyn ProfileStore) -> Result<Vec<Submission>> {
    overrides::read(store, ProfileKey::Submissions, Vec::new())
}

pub fn record(store: &mut dyn ProfileStore, submission: Submission) -> Result<()> {
    let mut all = load(store)?;
    all.push(submission);
    overrides::write(store, ProfileKey::Submissions, &all)
}

/// JavaScript-style ISO timestamp: `2025-02-14T18:00:00.000Z`.
pub fn iso_timestamp(at: OffsetDateTime) -> Result<String> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    Ok(at.to_offset(time::UtcOffset::UTC).format(&format)?)
}

pub fn check_attachment(upload: &AttachmentUpload) -> Result<()> {
    if upload.bytes.len() > MAX_ATTACHMENT_BYTES {
        warn!(name = %upload.name, bytes = upload.bytes.len(), "attachment rejected");
        return Err(Error::validation(format!(
            "Attachment '{}' is {} bytes; the limit is {} bytes (2 MB)",
            upload.name,
            upload.bytes.len(),
            MAX_ATTACHMENT_BYTES
        )));
    }
    Ok(())
}

/// Encodes the attachment as a `data:` URL, the text form stored in the log.
pub fn encode_attachment(upload: &AttachmentUpload) -> String {
    format!(
        "data:{};base64,{}",
        guess_mime(&upload.name),
        STANDARD.encode(&upload.bytes)
    )
}

fn guess_mime(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Turn a senator's form into a log entry and append it.
///
/// The meeting must exist in `meetings` and belong to one of `committees`.
/// An oversized attachment rejects the whole submission.
pub fn submit(
    store: &mut dyn ProfileStore,
    pid: &str,
    meetings: &[Meeting],
    committees: &[String],
    form: SubmissionForm,
    now: OffsetDateTime,
) -> Result<Submission> {
    let meeting = meetings
        .iter()
        .find(|meeting| meeting.id == form.meeting_id)
        .ok_or_else(|| Error::validation(format!("Unknown meeting '{}'", form.meeting_id)))?;
    if !committees.iter().any(|committee| *committee == meeting.committee) {
        return Err(Error::validation(format!(
            "Meeting '{}' is not on one of your committees",
            meeting.id
        )));
    }
    if let Some(upload) = &form.attachment {
        check_attachment(upload)?;
    }

    let submission = Submission {
        pid: pid.to_string(),
        committee_name: meeting.committee.clone(),
        meeting_name: meeting.name.clone(),
        meeting_date: meeting.date.clone(),
        meeting_id: meeting.id.clone(),
        timestamp: iso_timestamp(now)?,
        attendance_confirmed: form.attendance_confirmed,
        notes: form.notes,
        attachment_name: form.attachment.as_ref().map(|upload| upload.name.clone()),
        attachment_data: form.attachment.as_ref().map(encode_attachment),
    };
    record(store, submission.clone())?;
    info!(pid, meeting_id = %submission.meeting_id, "submission recorded");
    Ok(submission)
}

/// Reads one import entry. Only `pid`, `meetingName` and `timestamp` decide
/// whether it is kept; the other fields default when missing or mistyped.
fn imported_submission(entry: &Value) -> Option<Submission> {
    let fields = entry.as_object()?;
    let pid = text_field(fields, "pid")?;
    let meeting_name = text_field(fields, "meetingName")?;
    let timestamp = text_field(fields, "timestamp")?;
    Some(Submission {
        pid,
        committee_name: text_field(fields, "committeeName").unwrap_or_default(),
        meeting_name,
        meeting_date: text_field(fields, "meetingDate").unwrap_or_default(),
        meeting_id: text_field(fields, "meetingId").unwrap_or_default(),
        timestamp,
        attendance_confirmed: fields.get("attendanceConfirmed").is_some_and(flag_value),
        notes: text_field(fields, "notes").unwrap_or_default(),
        attachment_name: text_field(fields, "attachmentName"),
        attachment_data: text_field(fields, "attachmentData"),
    })
}

/// Non-empty string, or a number in its JSON text form.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn flag_value(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => {
            matches!(text.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
        }
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

pub fn import_str(store: &mut dyn ProfileStore, payload: &str) -> Result<ImportSummary> {
    let value: Value =
        serde_json::from_str(payload).map_err(|err| Error::ImportFormat(err.to_string()))?;
    import(store, &value)
}

/// Merge `payload` into the log, appending only records whose identity is new.
/// Malformed entries are skipped one by one; a non-list payload imports nothing.
pub fn import(store: &mut dyn ProfileStore, payload: &Value) -> Result<ImportSummary> {
    let Value::Array(entries) = payload else {
        return Err(Error::ImportFormat(format!("found {}", json_kind(payload))));
    };

    let mut all = load(store)?;
    let mut seen: HashSet<(String, String, String)> = all.iter().map(identity_key).collect();

    let mut imported = 0;
    let mut skipped = 0;
    for (index, entry) in entries.iter().enumerate() {
        let Some(candidate) = imported_submission(entry) else {
            warn!(index, "import entry missing pid, meetingName or timestamp");
            skipped += 1;
            continue;
        };
        if seen.insert(identity_key(&candidate)) {
            all.push(candidate);
            imported += 1;
        }
    }

    if imported > 0 {
        overrides::write(store, ProfileKey::Submissions, &all)?;
    }
    info!(imported, skipped, total = all.len(), "import finished");
    Ok(ImportSummary {
        imported_count: imported,
        total_count: all.len(),
    })
}

fn identity_key(submission: &Submission) -> (String, String, String) {
    let (pid, meeting_id, timestamp) = submission.identity();
    (pid.to_string(), meeting_id.to_string(), timestamp.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    pub pid: Option<String>,
    pub committee: Option<String>,
    pub text: Option<String>,
}

impl SubmissionFilter {
    pub fn matches(&self, submission: &Submission) -> bool {
        if let Some(pid) = &self.pid {
            if !contains_ignore_case(&submission.pid, pid) {
                return false;
            }
        }
        if let Some(committee) = &self.committee {
            if submission.committee_name != *committee {
                return false;
            }
        }
        if let Some(text) = &self.text {
            if !contains_ignore_case(&submission.meeting_name, text)
                && !contains_ignore_case(&submission.notes, text)
            {
                return false;
            }
        }
        true
    }

    /// Matching submissions, newest first.
    pub fn apply(&self, submissions: &[Submission]) -> Vec<Submission> {
        let mut matched: Vec<Submission> = submissions
            .iter()
            .filter(|submission| self.matches(submission))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MemoryProfileStore;
    use serde_json::json;
    use time::macros::datetime;

    fn meeting() -> Meeting {
        Meeting {
            id: "m1".to_string(),
            committee: "Academic Affairs Committee".to_string(),
            name: "Curriculum review".to_string(),
            date: "2025-02-14".to_string(),
            time: "6:00 PM".to_string(),
            location: Some("Union 204".to_string()),
        }
    }

    fn form(attachment: Option<AttachmentUpload>) -> SubmissionForm {
        SubmissionForm {
            meeting_id: "m1".to_string(),
            attendance_confirmed: true,
            notes: "Quorum reached".to_string(),
            attachment,
        }
    }

    fn committees() -> Vec<String> {
        vec!["Academic Affairs Committee".to_string()]
    }

    #[test]
    fn timestamp_matches_iso_millis() {
        let at = datetime!(2025-02-14 18:05:09.123 UTC);
        assert_eq!(iso_timestamp(at).unwrap(), "2025-02-14T18:05:09.123Z");
    }

    #[test]
    fn submit_records_exactly_once() {
        let mut store = MemoryProfileStore::new();
        let now = datetime!(2025-02-14 19:00 UTC);
        let created = submit(&mut store, "12345678", &[meeting()], &committees(), form(None), now)
            .unwrap();

        let all = load(&store).unwrap();
        let hits = all
            .iter()
            .filter(|s| s.identity() == ("12345678", "m1", created.timestamp.as_str()))
            .count();
        assert_eq!(hits, 1);
        assert_eq!(all[0].committee_name, "Academic Affairs Committee");
        assert_eq!(all[0].meeting_date, "2025-02-14");
    }

    #[test]
    fn record_does_not_deduplicate() {
        let mut store = MemoryProfileStore::new();
        let now = datetime!(2025-02-14 19:00 UTC);
        let created =
            submit(&mut store, "1", &[meeting()], &committees(), form(None), now).unwrap();
        record(&mut store, created).unwrap();
        assert_eq!(load(&store).unwrap().len(), 2);
    }

    #[test]
    fn attachment_limit_is_inclusive() {
        let at_limit = AttachmentUpload {
            name: "minutes.pdf".to_string(),
            bytes: vec![0; MAX_ATTACHMENT_BYTES],
        };
        assert!(check_attachment(&at_limit).is_ok());

        let over = AttachmentUpload {
            name: "minutes.pdf".to_string(),
            bytes: vec![0; MAX_ATTACHMENT_BYTES + 1],
        };
        assert!(matches!(check_attachment(&over), Err(Error::Validation(_))));
    }

    #[test]
    fn oversized_attachment_records_nothing() {
        let mut store = MemoryProfileStore::new();
        let upload = AttachmentUpload {
            name: "scan.png".to_string(),
            bytes: vec![1; MAX_ATTACHMENT_BYTES + 1],
        };
        let now = datetime!(2025-02-14 19:00 UTC);
        let result = submit(&mut store, "1", &[meeting()], &committees(), form(Some(upload)), now);
        assert!(result.is_err());
        assert!(load(&store).unwrap().is_empty());
    }

    #[test]
    fn attachment_is_stored_as_data_url() {
        let mut store = MemoryProfileStore::new();
        let upload = AttachmentUpload {
            name: "Notes.PDF".to_string(),
            bytes: b"hello".to_vec(),
        };
        let now = datetime!(2025-02-14 19:00 UTC);
        let created =
            submit(&mut store, "1", &[meeting()], &committees(), form(Some(upload)), now).unwrap();
        assert_eq!(created.attachment_name.as_deref(), Some("Notes.PDF"));
        assert_eq!(
            created.attachment_data.as_deref(),
            Some("data:application/pdf;base64,aGVsbG8=")
        );
    }

    #[test]
    fn submit_rejects_foreign_committee_and_unknown_meeting() {
        let mut store = MemoryProfileStore::new();
        let now = datetime!(2025-02-14 19:00 UTC);
        let other = vec!["Finance Committee".to_string()];
        assert!(submit(&mut store, "1", &[meeting()], &other, form(None), now).is_err());

        let mut missing = form(None);
        missing.meeting_id = "m99".to_string();
        assert!(submit(&mut store, "1", &[meeting()], &committees(), missing, now).is_err());
        assert!(load(&store).unwrap().is_empty());
    }

    #[test]
    fn import_is_idempotent() {
        let mut store = MemoryProfileStore::new();
        let payload = json!([
            {"pid": "1", "meetingName": "A", "meetingId": "m1",
             "timestamp": "2025-01-01T00:00:00.000Z"},
            {"pid": "2", "meetingName": "B", "meetingId": "m2",
             "timestamp": "2025-01-02T00:00:00.000Z", "attendanceConfirmed": true, "notes": "ok"}
        ]);

        let first = import(&mut store, &payload).unwrap();
        assert_eq!(first, ImportSummary { imported_count: 2, total_count: 2 });
        let after_first = load(&store).unwrap();

        let second = import(&mut store, &payload).unwrap();
        assert_eq!(second, ImportSummary { imported_count: 0, total_count: 2 });
        assert_eq!(load(&store).unwrap(), after_first);
    }

    #[test]
    fn import_skips_malformed_entries_and_batch_duplicates() {
        let mut store = MemoryProfileStore::new();
        let payload = json!([
            {"pid": "1", "meetingName": "A", "meetingId": "m1", "timestamp": "t1"},
            {"pid": "1", "meetingName": "A again", "meetingId": "m1", "timestamp": "t1"},
            {"meetingName": "no pid", "timestamp": "t2"},
            {"pid": "3", "timestamp": "t3"},
            {"pid": "", "meetingName": "blank pid", "timestamp": "t5"},
            "not an object",
            42
        ]);
        let summary = import(&mut store, &payload).unwrap();
        assert_eq!(summary, ImportSummary { imported_count: 1, total_count: 1 });
        assert_eq!(load(&store).unwrap()[0].meeting_name, "A");
    }

    #[test]
    fn import_keeps_entries_with_loose_optional_fields() {
        let mut store = MemoryProfileStore::new();
        let payload = json!([
            {"pid": 12345678, "meetingName": "A", "meetingId": "m1", "timestamp": "t1"},
            {"pid": "2", "meetingName": "B", "meetingId": "m2", "timestamp": "t2",
             "notes": null, "committeeName": null, "attendanceConfirmed": "yes"},
            {"pid": "3", "meetingName": "C", "meetingId": 7, "timestamp": "t3",
             "attachmentName": 5, "attendanceConfirmed": {"nested": true}}
        ]);
        let summary = import(&mut store, &payload).unwrap();
        assert_eq!(summary, ImportSummary { imported_count: 3, total_count: 3 });

        let all = load(&store).unwrap();
        assert_eq!(all[0].pid, "12345678");
        assert_eq!(all[1].notes, "");
        assert_eq!(all[1].committee_name, "");
        assert!(all[1].attendance_confirmed);
        assert_eq!(all[2].meeting_id, "7");
        assert!(!all[2].attendance_confirmed);

        let again = import(&mut store, &payload).unwrap();
        assert_eq!(again.imported_count, 0);
    }

    #[test]
    fn non_list_import_is_rejected_without_changes() {
        let mut store = MemoryProfileStore::new();
        let err = import(&mut store, &json!({"pid": "1"})).unwrap_err();
        assert!(matches!(err, Error::ImportFormat(_)));
        assert!(matches!(import_str(&mut store, "not json"), Err(Error::ImportFormat(_))));
        assert_eq!(store.get(ProfileKey::Submissions).unwrap(), None);
    }

    #[test]
    fn filter_matches_and_orders_newest_first() {
        let base = Submission {
            pid: "12345678".to_string(),
            committee_name: "Finance Committee".to_string(),
            meeting_name: "Budget hearing".to_string(),
            meeting_date: "2025-03-01".to_string(),
            meeting_id: "m2".to_string(),
            timestamp: "2025-03-01T10:00:00.000Z".to_string(),
            attendance_confirmed: true,
            notes: "Approved line items".to_string(),
            attachment_name: None,
            attachment_data: None,
        };
        let mut later = base.clone();
        later.timestamp = "2025-03-02T10:00:00.000Z".to_string();
        later.committee_name = "Rules Committee".to_string();

        let all = vec![base.clone(), later.clone()];
        let everything = SubmissionFilter::default().apply(&all);
        assert_eq!(everything, vec![later.clone(), base.clone()]);

        let by_committee = SubmissionFilter {
            committee: Some("Finance Committee".to_string()),
            ..Default::default()
        };
        assert_eq!(by_committee.apply(&all), vec![base.clone()]);

        let by_text = SubmissionFilter {
            text: Some("LINE ITEMS".to_string()),
            pid: Some("3456".to_string()),
            ..Default::default()
        };
        assert_eq!(by_text.apply(&all).len(), 2);
    }
}
