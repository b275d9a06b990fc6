//! Single entry point translating user commands into store operations.
//!
//! Presentation code builds a [`Command`], hands it to [`Dispatcher::dispatch`]
//! and renders the [`Outcome`]. Role checks happen here, so views never touch
//! the profile store directly.

use crate::calendar::{self, CalendarGrid, YearMonth};
use crate::error::{Error, Result};
use crate::profile::ProfileStore;
use crate::reference::ReferenceLoader;
use crate::schema::{
    CommitteeAssignment, Meeting, MeetingDraft, MeetingPatch, Role, Session, Submission,
};
use crate::session::{self, Access, Dashboard};
use crate::submissions::{self, ImportSummary, SubmissionFilter, SubmissionForm};
use crate::{assignments, meetings};
use std::collections::BTreeSet;
use time::OffsetDateTime;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { pid: String, password: String },
    Logout,
    WhoAmI,
    /// Senator view: own committees, their meetings, what was already submitted.
    Dashboard,
    Submit(SubmissionForm),
    ListMeetings,
    AddMeeting(MeetingDraft),
    UpdateMeeting { id: String, patch: MeetingPatch },
    RemoveMeeting { id: String },
    ListSubmissions(SubmissionFilter),
    ListAssignments,
    ShowAssignment { pid: String },
    SetAssignment { pid: String, committees: Vec<String> },
    ListCommittees,
    Calendar { month: Option<YearMonth>, jump_to_first: bool },
    Import { payload: String },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenatorDashboard {
    pub pid: String,
    pub committees: Vec<String>,
    pub meetings: Vec<Meeting>,
    /// Meeting ids this senator has at least one submission for.
    pub submitted: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    LoggedIn(Session),
    LoggedOut,
    Session(Session),
    /// The command needs another view: login, or the session role's own dashboard.
    Redirect(Dashboard),
    Dashboard(SenatorDashboard),
    Submitted(Submission),
    Meetings(Vec<Meeting>),
    Meeting(Meeting),
    MeetingRemoved(Meeting),
    Submissions(Vec<Submission>),
    Assignments(Vec<CommitteeAssignment>),
    Assignment(CommitteeAssignment),
    Committees(Vec<String>),
    Calendar(CalendarGrid),
    Imported(ImportSummary),
    Reset,
}

macro_rules! authorize {
    ($self:ident, $role:expr) => {
        match session::require_auth($self.store.as_ref(), $role)? {
            Access::Granted(session) => session,
            Access::Login => return Ok(Outcome::Redirect(Dashboard::Login)),
            Access::Redirect(to) => return Ok(Outcome::Redirect(to)),
        }
    };
}

type Clock = Box<dyn Fn() -> OffsetDateTime>;

pub struct Dispatcher {
    store: Box<dyn ProfileStore>,
    reference: ReferenceLoader,
    clock: Clock,
}

impl Dispatcher {
    pub fn new(store: Box<dyn ProfileStore>, reference: ReferenceLoader) -> Self {
        Self {
            store,
            reference,
            clock: Box::new(OffsetDateTime::now_utc),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> OffsetDateTime + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Login { pid, password } => self.login(&pid, &password),
            Command::Logout => {
                session::logout(self.store.as_mut())?;
                Ok(Outcome::LoggedOut)
            }
            Command::WhoAmI => Ok(Outcome::Session(authorize!(self, None))),
            Command::Dashboard => self.dashboard(),
            Command::Submit(form) => self.submit(form),
            Command::ListMeetings => {
                authorize!(self, Some(Role::Admin));
                let static_meetings = self.reference.meetings()?;
                Ok(Outcome::Meetings(meetings::list(self.store.as_ref(), static_meetings)?))
            }
            Command::AddMeeting(draft) => {
                authorize!(self, Some(Role::Admin));
                self.ensure_allowed_committee(&draft.committee)?;
                let static_meetings = self.reference.meetings()?;
                let meeting = meetings::add(self.store.as_mut(), static_meetings, draft)?;
                Ok(Outcome::Meeting(meeting))
            }
            Command::UpdateMeeting { id, patch } => {
                authorize!(self, Some(Role::Admin));
                if patch.is_empty() {
                    return Err(Error::validation("Nothing to update"));
                }
                if let Some(committee) = &patch.committee {
                    self.ensure_allowed_committee(committee)?;
                }
                let static_meetings = self.reference.meetings()?;
                let meeting = meetings::update(self.store.as_mut(), static_meetings, &id, patch)?;
                Ok(Outcome::Meeting(meeting))
            }
            Command::RemoveMeeting { id } => {
                authorize!(self, Some(Role::Admin));
                let static_meetings = self.reference.meetings()?;
                let removed = meetings::remove(self.store.as_mut(), static_meetings, &id)?;
                Ok(Outcome::MeetingRemoved(removed))
            }
            Command::ListSubmissions(filter) => {
                authorize!(self, Some(Role::Admin));
                let all = submissions::load(self.store.as_ref())?;
                Ok(Outcome::Submissions(filter.apply(&all)))
            }
            Command::ListAssignments => {
                authorize!(self, Some(Role::Admin));
                let static_assignments = self.reference.assignments()?;
                let current = assignments::effective(self.store.as_ref(), static_assignments)?;
                Ok(Outcome::Assignments(current))
            }
            Command::ShowAssignment { pid } => {
                authorize!(self, Some(Role::Admin));
                let static_assignments = self.reference.assignments()?;
                let current = assignments::effective(self.store.as_ref(), static_assignments)?;
                Ok(Outcome::Committees(assignments::assigned_committees(pid.trim(), &current)))
            }
            Command::SetAssignment { pid, committees } => {
                authorize!(self, Some(Role::Admin));
                let directory = self.reference.users()?;
                let allowed = self.reference.committees()?;
                let static_assignments = self.reference.assignments()?;
                let updated = assignments::set(
                    self.store.as_mut(),
                    static_assignments,
                    &directory,
                    &allowed,
                    &pid,
                    committees,
                )?;
                Ok(Outcome::Assignment(updated))
            }
            Command::ListCommittees => {
                authorize!(self, Some(Role::Admin));
                Ok(Outcome::Committees(self.reference.committees()?))
            }
            Command::Calendar {
                month,
                jump_to_first,
            } => {
                authorize!(self, Some(Role::Admin));
                let static_meetings = self.reference.meetings()?;
                let current = meetings::effective(self.store.as_ref(), static_meetings)?;
                let today = YearMonth::of((self.clock)().date());
                let target = if jump_to_first {
                    calendar::first_meeting_month(&current).unwrap_or(today)
                } else {
                    month.unwrap_or(today)
                };
                Ok(Outcome::Calendar(calendar::layout(&current, target)))
            }
            Command::Import { payload } => {
                authorize!(self, Some(Role::Admin));
                let summary = submissions::import_str(self.store.as_mut(), &payload)?;
                Ok(Outcome::Imported(summary))
            }
            Command::Reset => {
                self.store.clear()?;
                info!("profile cleared");
                Ok(Outcome::Reset)
            }
        }
    }

    fn login(&mut self, pid: &str, password: &str) -> Result<Outcome> {
        let directory = self.reference.users()?;
        let now = (self.clock)();
        let millis = (now.unix_timestamp_nanos() / 1_000_000) as i64;
        match session::login(self.store.as_mut(), &directory, pid, password, millis)? {
            Some(session) => Ok(Outcome::LoggedIn(session)),
            None => Err(Error::validation("Invalid PID or password")),
        }
    }

    fn senator_scope(&self, pid: &str) -> Result<(Vec<String>, Vec<Meeting>)> {
        let static_assignments = self.reference.assignments()?;
        let current = assignments::effective(self.store.as_ref(), static_assignments)?;
        let committees = assignments::assigned_committees(pid, &current);
        let static_meetings = self.reference.meetings()?;
        let all_meetings = meetings::effective(self.store.as_ref(), static_meetings)?;
        Ok((committees, all_meetings))
    }

    fn dashboard(&mut self) -> Result<Outcome> {
        let session = authorize!(self, Some(Role::Senator));
        let (committees, all_meetings) = self.senator_scope(&session.pid)?;
        let submitted = submissions::load(self.store.as_ref())?
            .into_iter()
            .filter(|submission| submission.pid == session.pid)
            .map(|submission| submission.meeting_id)
            .collect();
        Ok(Outcome::Dashboard(SenatorDashboard {
            meetings: meetings::for_committees(&all_meetings, &committees),
            pid: session.pid,
            committees,
            submitted,
        }))
    }

    fn submit(&mut self, form: SubmissionForm) -> Result<Outcome> {
        let session = authorize!(self, Some(Role::Senator));
        let (committees, all_meetings) = self.senator_scope(&session.pid)?;
        let now = (self.clock)();
        let submission = submissions::submit(
            self.store.as_mut(),
            &session.pid,
            &all_meetings,
            &committees,
            form,
            now,
        )?;
        Ok(Outcome::Submitted(submission))
    }

    fn ensure_allowed_committee(&self, committee: &str) -> Result<()> {
        let allowed = self.reference.committees()?;
        if allowed.iter().any(|name| name == committee.trim()) {
            Ok(())
        } else {
            Err(Error::validation(format!("Not an allowed committee: {}", committee.trim())))
        }
    }
}
