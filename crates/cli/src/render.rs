use attendance_core::Outcome;
use attendance_core::dispatch::SenatorDashboard;
use attendance_core::schema::{Meeting, Submission};
use attendance_core::session::Dashboard;

pub fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::LoggedIn(session) => {
            println!("Signed in as {} ({})", session.pid, session.role);
            println!("Next: {}", dashboard_hint(session.role.dashboard()));
        }
        Outcome::LoggedOut => println!("Signed out"),
        Outcome::Session(session) => println!("{} ({})", session.pid, session.role),
        Outcome::Redirect(Dashboard::Login) => {
            eprintln!("Not signed in. Run `attendance login --pid <PID> --password <PASSWORD>`.");
        }
        Outcome::Redirect(to) => {
            eprintln!("That view is not available for your role. Try {}.", dashboard_hint(*to));
        }
        Outcome::Dashboard(dashboard) => print_dashboard(dashboard),
        Outcome::Submitted(submission) => println!(
            "Recorded submission for {} ({}) at {}",
            submission.meeting_name, submission.meeting_id, submission.timestamp
        ),
        Outcome::Meetings(meetings) => {
            if meetings.is_empty() {
                println!("No meetings.");
            }
            for meeting in meetings {
                println!("{}", meeting_line(meeting));
            }
        }
        Outcome::Meeting(meeting) => println!("Saved {}", meeting_line(meeting)),
        Outcome::MeetingRemoved(meeting) => println!("Removed {}", meeting_line(meeting)),
        Outcome::Submissions(submissions) => print_submissions(submissions),
        Outcome::Assignments(assignments) => {
            for assignment in assignments {
                let committees: Vec<&str> =
                    assignment.committees.iter().map(String::as_str).collect();
                println!("{}: {}", assignment.pid, committees.join(", "));
            }
        }
        Outcome::Assignment(assignment) => {
            let committees: Vec<&str> = assignment.committees.iter().map(String::as_str).collect();
            if committees.is_empty() {
                println!("{} now has no committees", assignment.pid);
            } else {
                println!("{} assigned to {}", assignment.pid, committees.join(", "));
            }
        }
        Outcome::Committees(committees) => {
            if committees.is_empty() {
                println!("No committees.");
            }
            for committee in committees {
                println!("{committee}");
            }
        }
        Outcome::Calendar(grid) => print!("{}", reports::calendar::render_calendar(grid)),
        Outcome::Imported(summary) => println!(
            "Imported {} new submissions ({} total)",
            summary.imported_count, summary.total_count
        ),
        Outcome::Reset => println!("Profile cleared"),
    }
}

fn dashboard_hint(dashboard: Dashboard) -> &'static str {
    match dashboard {
        Dashboard::Login => "`attendance login`",
        Dashboard::Senator => "`attendance dashboard`",
        Dashboard::Admin => "`attendance submissions list`",
    }
}

fn meeting_line(meeting: &Meeting) -> String {
    let mut line = format!(
        "{:<5} {} {:<10} {} - {}",
        meeting.id, meeting.date, meeting.time, meeting.committee, meeting.name
    );
    if let Some(location) = &meeting.location {
        line.push_str(&format!(" @ {location}"));
    }
    line
}

fn print_dashboard(dashboard: &SenatorDashboard) {
    println!("PID {}", dashboard.pid);
    if dashboard.committees.is_empty() {
        println!("You are not assigned to any committee.");
        return;
    }
    println!("Committees: {}", dashboard.committees.join(", "));
    if dashboard.meetings.is_empty() {
        println!("No meetings scheduled.");
    }
    for meeting in &dashboard.meetings {
        let mark = if dashboard.submitted.contains(&meeting.id) {
            "[submitted]"
        } else {
            "[ ]"
        };
        println!("{mark:<12}{}", meeting_line(meeting));
    }
}

fn print_submissions(submissions: &[Submission]) {
    if submissions.is_empty() {
        println!("No submissions.");
        return;
    }
    for submission in submissions {
        let cells = reports::row_cells(submission);
        println!("{}", cells.join(" | "));
    }
}
