//! Month grid for the calendar view.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::deadline::DeadlineIndex;
use crate::error::{Error, Result};

/// First column of the month grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// Column of `day` in a week starting at `self`.
    pub fn column(self, day: Weekday) -> usize {
        let offset = match self {
            WeekStart::Sunday => day.num_days_from_sunday(),
            WeekStart::Monday => day.num_days_from_monday(),
        };
        offset as usize
    }

    pub fn labels(self) -> [&'static str; 7] {
        match self {
            WeekStart::Sunday => ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
            WeekStart::Monday => ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    /// Number of deadline entries on this day.
    pub deadlines: usize,
}

pub type Week = [Option<DayCell>; 7];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub week_start: WeekStart,
    pub weeks: Vec<Week>,
}

impl MonthGrid {
    /// Rows of seven cells covering the month; cells outside it are empty.
    pub fn build(year: i32, month: u32, week_start: WeekStart) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid month {year}-{month:02}")))?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| {
                Error::InvalidArgument(format!("month out of range {year}-{month:02}"))
            })?;

        let mut weeks = Vec::new();
        let mut week: Week = std::array::from_fn(|_| None);
        for date in first.iter_days().take_while(|date| *date < next) {
            let column = week_start.column(date.weekday());
            week[column] = Some(DayCell { date, deadlines: 0 });
            if column == 6 {
                weeks.push(std::mem::replace(&mut week, std::array::from_fn(|_| None)));
            }
        }
        if week.iter().any(Option::is_some) {
            weeks.push(week);
        }

        Ok(Self {
            year,
            month,
            week_start,
            weeks,
        })
    }

    /// Fill per-day deadline counts from `index`.
    pub fn with_markers(mut self, index: &DeadlineIndex) -> Self {
        for cell in self.weeks.iter_mut().flatten().flatten() {
            cell.deadlines = index.lookup_date(cell.date).len();
        }
        self
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten().flatten()
    }

    /// Plain-text rendering. Days with deadlines carry a `*`; `today` is
    /// bracketed.
    pub fn render(&self, today: Option<NaiveDate>) -> String {
        let title = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|first| first.format("%B %Y").to_string())
            .unwrap_or_default();
        let mut lines = vec![title];
        lines.push(
            self.week_start
                .labels()
                .iter()
                .map(|label| format!(" {label:>2} "))
                .collect::<String>(),
        );
        for week in &self.weeks {
            let row: String = week
                .iter()
                .map(|cell| match cell {
                    None => "    ".to_string(),
                    Some(cell) => {
                        let marker = if cell.deadlines > 0 { "*" } else { " " };
                        if Some(cell.date) == today {
                            format!("[{:>2}]", cell.date.day())
                        } else {
                            format!(" {:>2}{marker}", cell.date.day())
                        }
                    }
                })
                .collect();
            lines.push(row.trim_end().to_string());
        }
        lines.join("\n")
    }
}

/// Parse `YYYY-MM`.
pub fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let invalid = || Error::InvalidArgument(format!("invalid month '{raw}' (expected YYYY-MM)"));
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}
