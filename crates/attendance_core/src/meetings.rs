//! Meeting calendar administration.
//!
//! Every mutation persists the entire list as the meetings override.

use crate::error::{Error, Result};
use crate::overrides;
use crate::profile::{ProfileKey, ProfileStore};
use crate::schema::{Meeting, MeetingDraft, MeetingPatch};
use time::Date;
use time::macros::format_description;
use tracing::info;

pub fn effective(store: &dyn ProfileStore, static_meetings: Vec<Meeting>) -> Result<Vec<Meeting>> {
    overrides::read(store, ProfileKey::Meetings, static_meetings)
}

/// `m<highest numeric suffix + 1>`; ids whose suffix is not all digits are ignored.
pub fn next_meeting_id<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let highest = ids
        .into_iter()
        .filter_map(|id| id.strip_prefix('m'))
        .filter(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    let next = highest
        .checked_add(1)
        .ok_or_else(|| Error::validation(format!("No meeting id left after m{highest}")))?;
    Ok(format!("m{next}"))
}

pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

fn require_field(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("Meeting {label} is required")));
    }
    Ok(())
}

fn require_date(value: &str) -> Result<()> {
    require_field("date", value)?;
    if parse_date(value).is_none() {
        return Err(Error::validation(format!(
            "Meeting date '{value}' is not a YYYY-MM-DD date"
        )));
    }
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Chronological order; ties broken by the display time text then id.
pub fn sort_meetings(meetings: &mut [Meeting]) {
    meetings.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.time.cmp(&b.time))
            .then_with(|| a.id.cmp(&b.id))
    });
}

pub fn list(store: &dyn ProfileStore, static_meetings: Vec<Meeting>) -> Result<Vec<Meeting>> {
    let mut meetings = effective(store, static_meetings)?;
    sort_meetings(&mut meetings);
    Ok(meetings)
}

/// Meetings of the given committees in chronological order.
pub fn for_committees(meetings: &[Meeting], committees: &[String]) -> Vec<Meeting> {
    let mut selected: Vec<Meeting> = meetings
        .iter()
        .filter(|meeting| committees.contains(&meeting.committee))
        .cloned()
        .collect();
    sort_meetings(&mut selected);
    selected
}

pub fn add(
    store: &mut dyn ProfileStore,
    static_meetings: Vec<Meeting>,
    draft: MeetingDraft,
) -> Result<Meeting> {
    require_field("committee", &draft.committee)?;
    require_field("name", &draft.name)?;
    require_date(&draft.date)?;

    let mut meetings = effective(store, static_meetings)?;
    let meeting = Meeting {
        id: next_meeting_id(meetings.iter().map(|meeting| meeting.id.as_str()))?,
        committee: draft.committee.trim().to_string(),
        name: draft.name.trim().to_string(),
        date: draft.date.trim().to_string(),
        time: draft.time.trim().to_string(),
        location: blank_to_none(draft.location),
    };
    meetings.push(meeting.clone());
    overrides::write(store, ProfileKey::Meetings, &meetings)?;
    info!(id = %meeting.id, committee = %meeting.committee, "meeting added");
    Ok(meeting)
}

pub fn update(
    store: &mut dyn ProfileStore,
    static_meetings: Vec<Meeting>,
    id: &str,
    patch: MeetingPatch,
) -> Result<Meeting> {
    let mut meetings = effective(store, static_meetings)?;
    let meeting = meetings
        .iter_mut()
        .find(|meeting| meeting.id == id)
        .ok_or_else(|| Error::validation(format!("Unknown meeting '{id}'")))?;

    if let Some(committee) = patch.committee {
        require_field("committee", &committee)?;
        meeting.committee = committee.trim().to_string();
    }
    if let Some(name) = patch.name {
        require_field("name", &name)?;
        meeting.name = name.trim().to_string();
    }
    if let Some(date) = patch.date {
        require_date(&date)?;
        meeting.date = date.trim().to_string();
    }
    if let Some(time) = patch.time {
        meeting.time = time.trim().to_string();
    }
    if let Some(location) = patch.location {
        meeting.location = blank_to_none(location);
    }

    let updated = meeting.clone();
    overrides::write(store, ProfileKey::Meetings, &meetings)?;
    info!(id = %updated.id, "meeting updated");
    Ok(updated)
}

pub fn remove(
    store: &mut dyn ProfileStore,
    static_meetings: Vec<Meeting>,
    id: &str,
) -> Result<Meeting> {
    let mut meetings = effective(store, static_meetings)?;
    let index = meetings
        .iter()
        .position(|meeting| meeting.id == id)
        .ok_or_else(|| Error::validation(format!("Unknown meeting '{id}'")))?;
    let removed = meetings.remove(index);
    overrides::write(store, ProfileKey::Meetings, &meetings)?;
    info!(id = %removed.id, "meeting removed");
    Ok(removed)
}
