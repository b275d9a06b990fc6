//! Renderers for submission exports and the calendar view.

use anyhow::Result;
use attendance_core::schema::Submission;
use std::fs;
use std::path::Path;
use time::Date;

pub mod calendar;
pub mod pdf;
pub mod table;
pub mod word;

pub const COLUMNS: [&str; 7] = [
    "PID",
    "Committee",
    "Meeting",
    "Date",
    "Submitted",
    "Attendance",
    "Notes / Attachment",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    /// Paginated table as a PDF.
    Pdf,
    /// The same pages as plain text, for previewing.
    Table,
    Word,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Table => "txt",
            ExportFormat::Word => "doc",
        }
    }
}

pub fn export_json(submissions: &[Submission]) -> Result<String> {
    Ok(serde_json::to_string_pretty(submissions)?)
}

pub fn render(
    format: ExportFormat,
    submissions: &[Submission],
    generated: Date,
) -> Result<Vec<u8>> {
    let rows = table::DEFAULT_ROWS_PER_PAGE;
    let text = match format {
        ExportFormat::Json => export_json(submissions)?,
        ExportFormat::Pdf => return pdf::render_pdf_document(submissions, rows, generated),
        ExportFormat::Table => table::render_table_document(submissions, rows, generated)?,
        ExportFormat::Word => word::render_word_document(submissions, generated)?,
    };
    Ok(text.into_bytes())
}

pub fn write_export(
    path: &Path,
    format: ExportFormat,
    submissions: &[Submission],
    generated: Date,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, render(format, submissions, generated)?)?;
    Ok(())
}

/// Row values in column order.
pub fn row_cells(submission: &Submission) -> [String; 7] {
    [
        submission.pid.clone(),
        submission.committee_name.clone(),
        submission.meeting_name.clone(),
        submission.meeting_date.clone(),
        submitted_at(&submission.timestamp),
        if submission.attendance_confirmed { "Yes" } else { "No" }.to_string(),
        notes_cell(submission),
    ]
}

/// Notes if there are any, otherwise the attachment name, otherwise blank.
pub fn notes_cell(submission: &Submission) -> String {
    let notes = submission.notes.trim();
    if !notes.is_empty() {
        return notes.to_string();
    }
    match &submission.attachment_name {
        Some(name) => format!("[attachment: {name}]"),
        None => String::new(),
    }
}

// "2025-02-14T19:30:00.250Z" -> "2025-02-14 19:30"
fn submitted_at(timestamp: &str) -> String {
    timestamp
        .split_once('T')
        .and_then(|(date, rest)| rest.get(..5).map(|clock| format!("{date} {clock}")))
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use attendance_core::schema::Submission;

    pub fn submission(pid: &str, notes: &str, attachment: Option<&str>) -> Submission {
        Submission {
            pid: pid.to_string(),
            committee_name: "Academic Affairs Committee".to_string(),
            meeting_name: "Curriculum review".to_string(),
            meeting_date: "2025-02-14".to_string(),
            meeting_id: "m1".to_string(),
            timestamp: "2025-02-14T19:30:00.250Z".to_string(),
            attendance_confirmed: true,
            notes: notes.to_string(),
            attachment_name: attachment.map(str::to_string),
            attachment_data: attachment.map(|_| "data:application/pdf;base64,AA==".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::submission;

    #[test]
    fn notes_win_over_attachment_name() {
        assert_eq!(notes_cell(&submission("1", "Quorum", Some("a.pdf"))), "Quorum");
        assert_eq!(notes_cell(&submission("1", "  ", Some("a.pdf"))), "[attachment: a.pdf]");
        assert_eq!(notes_cell(&submission("1", "", None)), "");
    }

    #[test]
    fn submitted_time_is_shortened() {
        let cells = row_cells(&submission("1", "", None));
        assert_eq!(cells[4], "2025-02-14 19:30");
        assert_eq!(cells[5], "Yes");
        assert_eq!(submitted_at("garbage"), "garbage");
    }

    #[test]
    fn write_export_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("submissions.pdf");
        let rows = [submission("1", "n", None)];
        write_export(&out, ExportFormat::Pdf, &rows, time::macros::date!(2025 - 03 - 01)).unwrap();
        let bytes = fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn json_export_round_trips_wire_names() {
        let raw = export_json(&[submission("1", "n", None)]).unwrap();
        assert!(raw.contains("\"meetingName\""));
        let parsed: Vec<Submission> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
