use attendance_core::calendar::{CalendarGrid, Cell};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Text month view: a day grid (`*` marks days with meetings), the meetings
/// of the month in day order, and the committee colour legend.
pub fn render_calendar(grid: &CalendarGrid) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("{} {}", grid.month.month, grid.month.year));
    lines.push(WEEKDAYS.map(|day| format!("{day:>4}")).join(""));

    for week in grid.weeks() {
        let row: String = week
            .iter()
            .map(|cell| match cell {
                Cell::Blank => "    ".to_string(),
                Cell::Day { day, entries } if entries.is_empty() => format!("{day:>4}"),
                Cell::Day { day, .. } => format!("{:>4}", format!("{day}*")),
            })
            .collect();
        lines.push(row.trim_end().to_string());
    }

    lines.push(String::new());
    let mut any = false;
    for cell in &grid.cells {
        let Cell::Day { day, entries } = cell else {
            continue;
        };
        for entry in entries {
            any = true;
            lines.push(format!(
                "{:>2}  {} [{}] {} ({}) {}",
                day, entry.meeting_id, entry.color, entry.name, entry.committee, entry.time
            ));
        }
    }
    if !any {
        lines.push("_No meetings this month._".to_string());
    }

    if !grid.legend.is_empty() {
        lines.push(String::new());
        lines.push("Legend".to_string());
        for (committee, color) in &grid.legend {
            lines.push(format!("  {color}  {committee}"));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::calendar::{layout, YearMonth};
    use attendance_core::schema::Meeting;
    use time::Month;

    #[test]
    fn marks_meeting_days_and_lists_them() {
        let meetings = vec![Meeting {
            id: "m1".to_string(),
            committee: "Rules Committee".to_string(),
            name: "Bylaws".to_string(),
            date: "2025-03-14".to_string(),
            time: "4 PM".to_string(),
            location: None,
        }];
        let text = render_calendar(&layout(&meetings, YearMonth::new(2025, Month::March)));
        assert!(text.starts_with("March 2025\n"));
        assert!(text.contains(" 14*"));
        assert!(text.contains("14  m1 [#1f77b4] Bylaws (Rules Committee) 4 PM"));
        assert!(text.contains("Legend"));
    }

    #[test]
    fn empty_month_says_so() {
        let text = render_calendar(&layout(&[], YearMonth::new(2025, Month::April)));
        assert!(text.contains("_No meetings this month._"));
        assert!(!text.contains("Legend"));
    }
}
