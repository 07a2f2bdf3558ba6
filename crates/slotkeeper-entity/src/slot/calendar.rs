//! Calendar arithmetic for slot generation.
//!
//! A [`DateRange`] and a set of [`DailyWindows`] expand into one
//! [`SlotPlan`] per window per calendar day. Saturday and Sunday use the
//! weekend windows. Wall-clock times are interpreted in a fixed UTC offset.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc, Weekday};
use serde::{Deserialize, Serialize};
use slotkeeper_core::types::TimeSlotId;
use slotkeeper_core::{AppError, AppResult};

use super::model::TimeSlot;

/// A daily time-of-day window with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow", into = "RawWindow")]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWindow {
    start_time: String,
    end_time: String,
}

impl TimeWindow {
    /// Build a window, rejecting empty or inverted intervals.
    pub fn new(start: NaiveTime, end: NaiveTime) -> AppResult<Self> {
        if start >= end {
            return Err(AppError::validation(format!(
                "Time window start {} must be before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse `HH:MM` (or `HH:MM:SS`) strings into a window.
    pub fn parse(start: &str, end: &str) -> AppResult<Self> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    /// Window start.
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// Window end.
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether the two windows share any instant. Touching ends do not count.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = AppError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::parse(&raw.start_time, &raw.end_time)
    }
}

impl From<TimeWindow> for RawWindow {
    fn from(w: TimeWindow) -> Self {
        Self {
            start_time: w.start.format("%H:%M").to_string(),
            end_time: w.end.format("%H:%M").to_string(),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Parse a time of day in `HH:MM` or `HH:MM:SS` form.
pub fn parse_time(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::validation(format!("Invalid time of day: '{value}'")))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::from_str(value)
        .map_err(|_| AppError::validation(format!("Invalid date: '{value}', expected YYYY-MM-DD")))
}

/// An inclusive range of calendar dates with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct RawRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `from > to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> AppResult<Self> {
        if from > to {
            return Err(AppError::validation(format!(
                "Date range start {from} is after end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// First day.
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last day (inclusive).
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Number of calendar days covered.
    pub fn len_days(&self) -> u32 {
        ((self.to - self.from).num_days() + 1) as u32
    }

    /// Iterate every date in the range.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let to = self.to;
        self.from.iter_days().take_while(move |d| *d <= to)
    }
}

impl TryFrom<RawRange> for DateRange {
    type Error = AppError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.from, raw.to)
    }
}

impl From<DateRange> for RawRange {
    fn from(r: DateRange) -> Self {
        Self {
            from: r.from,
            to: r.to,
        }
    }
}

/// One slot the generator intends to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPlan {
    /// Local calendar date.
    pub date: NaiveDate,
    /// Start instant in UTC.
    pub start_time: DateTime<Utc>,
    /// End instant in UTC.
    pub end_time: DateTime<Utc>,
}

/// Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Combine a local date and wall-clock time into a UTC instant.
pub fn to_utc(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(time);
    (local - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Windows generated on weekdays and on weekend days, each sorted by start.
///
/// Windows of one kind may overlap each other. The overlapping plans are
/// classified against the earlier ones of the same batch on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyWindows {
    weekday: Vec<TimeWindow>,
    weekend: Vec<TimeWindow>,
}

impl DailyWindows {
    /// The same single window every day.
    pub fn uniform(window: TimeWindow) -> Self {
        Self {
            weekday: vec![window],
            weekend: vec![window],
        }
    }

    /// Build from explicit window lists. Neither list may be empty.
    pub fn new(mut weekday: Vec<TimeWindow>, mut weekend: Vec<TimeWindow>) -> AppResult<Self> {
        if weekday.is_empty() || weekend.is_empty() {
            return Err(AppError::validation(
                "At least one time window is required for every day",
            ));
        }
        weekday.sort_by_key(|w| (w.start, w.end));
        weekend.sort_by_key(|w| (w.start, w.end));
        Ok(Self { weekday, weekend })
    }

    /// Windows that apply on `date`.
    pub fn for_date(&self, date: NaiveDate) -> &[TimeWindow] {
        if is_weekend(date) {
            &self.weekend
        } else {
            &self.weekday
        }
    }

    /// Largest number of windows on any one day.
    pub fn max_per_day(&self) -> usize {
        self.weekday.len().max(self.weekend.len())
    }
}

/// Expand a range into one plan per window per day, ordered by date then start.
pub fn expand(range: DateRange, windows: &DailyWindows, offset: FixedOffset) -> Vec<SlotPlan> {
    range
        .days()
        .flat_map(|date| {
            windows.for_date(date).iter().map(move |window| SlotPlan {
                date,
                start_time: to_utc(date, window.start, offset),
                end_time: to_utc(date, window.end, offset),
            })
        })
        .collect()
}

/// How a planned slot relates to the slots a chapter already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanVerdict {
    /// Nothing in the way; insert it.
    Create,
    /// A slot with the same date and start already exists.
    Duplicate(TimeSlotId),
    /// A different slot on the same chapter overlaps the interval.
    Overlap(TimeSlotId),
}

/// Classify `plan` against the chapter's `existing` slots.
pub fn classify(existing: &[TimeSlot], plan: &SlotPlan) -> PlanVerdict {
    if let Some(dup) = existing
        .iter()
        .find(|s| s.date == plan.date && s.start_time == plan.start_time)
    {
        return PlanVerdict::Duplicate(dup.id);
    }
    match existing
        .iter()
        .find(|s| s.overlaps(plan.start_time, plan.end_time))
    {
        Some(clash) => PlanVerdict::Overlap(clash.id),
        None => PlanVerdict::Create,
    }
}
