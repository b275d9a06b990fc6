//! Month grid layout for the meeting calendar.
//!
//! Pure functions only; the caller keeps track of the month being viewed.

use crate::meetings::parse_date;
use crate::schema::Meeting;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use time::{Date, Month};

pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: Month,
}

impl YearMonth {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    pub fn of(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn next(self) -> Self {
        match self.month {
            Month::December => Self::new(self.year + 1, Month::January),
            month => Self::new(self.year, month.next()),
        }
    }

    pub fn previous(self) -> Self {
        match self.month {
            Month::January => Self::new(self.year - 1, Month::December),
            month => Self::new(self.year, month.previous()),
        }
    }

    pub fn days(self) -> u8 {
        time::util::days_in_year_month(self.year, self.month)
    }

    pub fn first_day(self) -> Option<Date> {
        Date::from_calendar_date(self.year, self.month, 1).ok()
    }

    pub fn contains(self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Parses `YYYY-MM`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (year, month) = value
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{value}'"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{value}'"))?;
        let month: u8 = month
            .parse()
            .map_err(|_| format!("invalid month in '{value}'"))?;
        let month = Month::try_from(month).map_err(|_| format!("month out of range in '{value}'"))?;
        let parsed = Self::new(year, month);
        parsed
            .first_day()
            .map(|_| parsed)
            .ok_or_else(|| format!("year out of range in '{value}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub meeting_id: String,
    pub name: String,
    pub committee: String,
    pub time: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Blank,
    Day { day: u8, entries: Vec<CalendarEntry> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    pub month: YearMonth,
    pub cells: Vec<Cell>,
    pub legend: Vec<(String, &'static str)>,
}

impl CalendarGrid {
    /// Rows of seven cells, Sunday first; the last row may be short.
    pub fn weeks(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(7)
    }
}

/// Colour per committee, by position in the sorted unique committee list.
pub fn committee_colors(meetings: &[Meeting]) -> BTreeMap<String, &'static str> {
    meetings
        .iter()
        .map(|meeting| meeting.committee.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(index, committee)| (committee, PALETTE[index % PALETTE.len()]))
        .collect()
}

/// Month of the earliest parseable meeting date.
pub fn first_meeting_month(meetings: &[Meeting]) -> Option<YearMonth> {
    meetings
        .iter()
        .filter_map(|meeting| parse_date(&meeting.date))
        .min()
        .map(YearMonth::of)
}

pub fn layout(meetings: &[Meeting], month: YearMonth) -> CalendarGrid {
    let colors = committee_colors(meetings);

    let mut by_day: BTreeMap<u8, Vec<CalendarEntry>> = BTreeMap::new();
    for meeting in meetings {
        let Some(date) = parse_date(&meeting.date) else {
            continue;
        };
        if !month.contains(date) {
            continue;
        }
        let color = colors
            .get(&meeting.committee)
            .copied()
            .unwrap_or(PALETTE[0]);
        by_day.entry(date.day()).or_default().push(CalendarEntry {
            meeting_id: meeting.id.clone(),
            name: meeting.name.clone(),
            committee: meeting.committee.clone(),
            time: meeting.time.clone(),
            color,
        });
    }

    let offset = month
        .first_day()
        .map(|first| first.weekday().number_days_from_sunday())
        .unwrap_or(0);
    let mut cells: Vec<Cell> = (0..offset).map(|_| Cell::Blank).collect();
    for day in 1..=month.days() {
        cells.push(Cell::Day {
            day,
            entries: by_day.remove(&day).unwrap_or_default(),
        });
    }

    CalendarGrid {
        month,
        cells,
        legend: colors.into_iter().collect(),
    }
}
