//! Date range selection for the Período filter: named presets, manual
//! start/end picking and two independently navigable month calendars.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};

use crate::error::{ReceivablesError, Result};
use crate::fmt;

/// A selected period. Both ends are whole days; `start <= end` whenever
/// both are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self {
                start: Some(start),
                end: Some(end),
            }
        } else {
            Self {
                start: Some(end),
                end: Some(start),
            }
        }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn start_of_day(&self) -> Option<NaiveDateTime> {
        self.start.and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn end_of_day(&self) -> Option<NaiveDateTime> {
        self.end.and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
    }

    /// Whether `day` falls within the day-normalised bounds. Open ends do
    /// not constrain.
    pub fn contains(&self, day: NaiveDate) -> bool {
        let Some(noon) = day.and_hms_opt(12, 0, 0) else {
            return false;
        };
        self.start_of_day().map_or(true, |s| noon >= s)
            && self.end_of_day().map_or(true, |e| noon <= e)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// "dd/mm/yyyy até dd/mm/yyyy"; a missing end renders as "…".
    pub fn label(&self) -> String {
        let show = |d: Option<NaiveDate>| d.map(fmt::date).unwrap_or_else(|| "\u{2026}".into());
        format!("{} até {}", show(self.start), show(self.end))
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

pub struct DateRangePreset {
    pub label: &'static str,
    compute: fn(NaiveDate) -> DateRange,
}

impl DateRangePreset {
    pub fn range(&self, today: NaiveDate) -> DateRange {
        (self.compute)(today)
    }
}

fn days_back(today: NaiveDate, n: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
}

fn week_of(day: NaiveDate) -> DateRange {
    let back = u64::from(day.weekday().num_days_from_sunday());
    let start = days_back(day, back);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    DateRange::new(start, end)
}

fn month_of(day: NaiveDate) -> DateRange {
    let start = day.with_day(1).unwrap_or(day);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(day);
    DateRange::new(start, end)
}

fn previous_month(today: NaiveDate) -> NaiveDate {
    today.checked_sub_months(Months::new(1)).unwrap_or(today)
}

/// Shortcut table shown beside the calendars, in display order.
pub static PRESETS: &[DateRangePreset] = &[
    DateRangePreset {
        label: "Today",
        compute: DateRange::single,
    },
    DateRangePreset {
        label: "Yesterday",
        compute: |t| DateRange::single(days_back(t, 1)),
    },
    DateRangePreset {
        label: "This Week",
        compute: week_of,
    },
    DateRangePreset {
        label: "Last Week",
        compute: |t| week_of(days_back(t, 7)),
    },
    DateRangePreset {
        label: "This Month",
        compute: month_of,
    },
    DateRangePreset {
        label: "Last Month",
        compute: |t| month_of(previous_month(t)),
    },
    DateRangePreset {
        label: "Last 30 Days",
        compute: |t| DateRange::new(days_back(t, 29), t),
    },
    DateRangePreset {
        label: "Last 90 Days",
        compute: |t| DateRange::new(days_back(t, 89), t),
    },
    DateRangePreset {
        label: "Last 180 Days",
        compute: |t| DateRange::new(days_back(t, 179), t),
    },
    DateRangePreset {
        label: "All Time",
        compute: |t| DateRange::new(days_back(t, 3650), t),
    },
];

pub fn find_preset(label: &str) -> Option<&'static DateRangePreset> {
    let wanted = label.trim();
    PRESETS.iter().find(|p| p.label.eq_ignore_ascii_case(wanted))
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

/// Month shown by one of the two calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarPage {
    pub year: i32,
    pub month: u32,
}

impl CalendarPage {
    pub fn of(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    pub fn step(self, months: i32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

pub struct DateRangeSelector {
    today: NaiveDate,
    range: DateRange,
    left: CalendarPage,
    right: CalendarPage,
}

impl DateRangeSelector {
    pub fn new(today: NaiveDate) -> Self {
        let left = CalendarPage::of(today);
        Self {
            today,
            range: DateRange::single(today),
            left,
            right: left.step(1),
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        if let Some(start) = range.start {
            self.left = CalendarPage::of(start);
            self.right = self.left.step(1);
        }
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn presets(&self) -> &'static [DateRangePreset] {
        PRESETS
    }

    /// Replace the whole range with a preset's period.
    pub fn select_preset(&mut self, label: &str) -> Result<()> {
        let preset =
            find_preset(label).ok_or_else(|| ReceivablesError::UnknownPreset(label.to_string()))?;
        self.range = preset.range(self.today);
        if let Some(start) = self.range.start {
            self.left = CalendarPage::of(start);
            self.right = self.left.step(1);
        }
        tracing::debug!(preset = preset.label, range = %self.range.label(), "preset selected");
        Ok(())
    }

    /// Set one end from a calendar click. A start after the current end, or
    /// an end before the current start, collapses the range to that day.
    pub fn select_manual_date(&mut self, which: Endpoint, day: NaiveDate) {
        match which {
            Endpoint::Start => match self.range.end {
                Some(end) if day > end => self.range = DateRange::single(day),
                _ => self.range.start = Some(day),
            },
            Endpoint::End => match self.range.start {
                Some(start) if day < start => self.range = DateRange::single(day),
                _ => self.range.end = Some(day),
            },
        }
    }

    /// The preset whose period equals the current range, if any.
    pub fn active_preset(&self) -> Option<&'static str> {
        PRESETS
            .iter()
            .find(|p| p.range(self.today) == self.range)
            .map(|p| p.label)
    }

    pub fn clear(&mut self) {
        self.range = DateRange::single(self.today);
    }

    pub fn left_page(&self) -> CalendarPage {
        self.left
    }

    pub fn right_page(&self) -> CalendarPage {
        self.right
    }

    pub fn step_left(&mut self, months: i32) {
        self.left = self.left.step(months);
    }

    pub fn step_right(&mut self, months: i32) {
        self.right = self.right.step(months);
    }

    pub fn step_left_year(&mut self, years: i32) {
        self.left = self.left.step(years * 12);
    }

    pub fn step_right_year(&mut self, years: i32) {
        self.right = self.right.step(years * 12);
    }
}

/// Six weeks of seven cells, Sunday first; cells outside the month are None.
pub fn month_grid(page: CalendarPage) -> Vec<[Option<NaiveDate>; 7]> {
    let mut weeks = vec![[None; 7]; 6];
    let Some(first) = page.first_day() else {
        return weeks;
    };
    let lead = first.weekday().num_days_from_sunday() as usize;
    let mut day = Some(first);
    let mut slot = lead;
    while let Some(d) = day {
        if d.month() != page.month || slot >= 42 {
            break;
        }
        weeks[slot / 7][slot % 7] = Some(d);
        slot += 1;
        day = d.succ_opt();
    }
    weeks
}
