//! Conversion of weekly availability ranges into bookable one-hour slots.
//!
//! Ranges are written as `"09:00 AM - 12:00 PM"`. A range expands to every
//! time `start + k * 60min` that falls strictly before `end`, labelled in
//! 12-hour form without a leading zero (`"9:00 AM"`). Everything here is pure.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use thiserror::Error;
use tracing::warn;

use crate::models::{DaySlots, WeeklyAvailability};

pub const SLOT_MINUTES: u16 = 60;

#[derive(Debug, Error, PartialEq)]
pub enum SlotError {
    #[error("Invalid time string format: {0}")]
    InvalidTime(String),

    #[error("Invalid time range format: {0}")]
    InvalidRange(String),
}

/// Time of day on a 24-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Parse `"H:MM AM"` / `"HH:MM pm"`.
    pub fn parse(text: &str) -> Result<Self, SlotError> {
        let invalid = || SlotError::InvalidTime(text.to_string());

        let parts: Vec<&str> = text.trim().split(' ').collect();
        let [clock, period] = parts.as_slice() else {
            return Err(invalid());
        };

        let (hour_str, minute_str) = clock.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour_str.parse().map_err(|_| invalid())?;
        let minute: u8 = minute_str.parse().map_err(|_| invalid())?;

        if !(1..=12).contains(&hour) || minute > 59 {
            return Err(invalid());
        }

        let hour = match period.to_ascii_uppercase().as_str() {
            "AM" if hour == 12 => 0,
            "AM" => hour,
            "PM" if hour == 12 => 12,
            "PM" => hour + 12,
            _ => return Err(invalid()),
        };

        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn minutes_of_day(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    fn from_minutes(total: u16) -> Option<Self> {
        let hour = u8::try_from(total / 60).ok()?;
        let minute = u8::try_from(total % 60).ok()?;
        Self::new(hour, minute)
    }

    pub fn is_morning(&self) -> bool {
        self.hour < 12
    }

    /// Display label, e.g. `"9:00 AM"` or `"12:30 PM"`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        let period = if self.is_morning() { "AM" } else { "PM" };
        write!(f, "{}:{:02} {}", display_hour, self.minute, period)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeRange {
    pub fn parse(text: &str) -> Result<Self, SlotError> {
        let parts: Vec<&str> = text.split(" - ").collect();
        let [start, end] = parts.as_slice() else {
            return Err(SlotError::InvalidRange(text.to_string()));
        };

        Ok(Self {
            start: ClockTime::parse(start)?,
            end: ClockTime::parse(end)?,
        })
    }
}

/// Every slot start inside `range`. An empty or inverted range yields nothing.
pub fn expand_range(range: &TimeRange) -> Vec<ClockTime> {
    let end = range.end.minutes_of_day();
    let mut current = range.start.minutes_of_day();
    let mut slots = Vec::new();

    while current < end {
        if let Some(time) = ClockTime::from_minutes(current) {
            slots.push(time);
        }
        current += SLOT_MINUTES;
    }

    slots
}

/// Expand each range string in order, skipping the ones that do not parse.
pub fn expand_ranges<S: AsRef<str>>(ranges: &[S]) -> Vec<ClockTime> {
    ranges
        .iter()
        .filter_map(|raw| match TimeRange::parse(raw.as_ref()) {
            Ok(range) => Some(range),
            Err(e) => {
                warn!("Skipping availability range: {}", e);
                None
            }
        })
        .flat_map(|range| expand_range(&range))
        .collect()
}

pub fn weekday_key(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Sun => "sunday",
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
    }
}

/// Canonical label for a stored booking time so `"09:00 AM"` and `"9:00 AM"` collide.
pub fn canonical_label(time: &str) -> String {
    ClockTime::parse(time)
        .map(|t| t.label())
        .unwrap_or_else(|_| time.trim().to_string())
}

/// Slots still open on `date` given the labels already booked that day.
pub fn available_slots<S: AsRef<str>>(
    weekly: &WeeklyAvailability,
    date: NaiveDate,
    booked: &[S],
) -> DaySlots {
    let Some(day) = weekly.day(weekday_key(date)) else {
        return DaySlots::default();
    };
    if !day.is_available || day.slots.is_empty() {
        return DaySlots::default();
    }

    let booked: Vec<String> = booked.iter().map(|b| canonical_label(b.as_ref())).collect();

    let mut result = DaySlots::default();
    for time in expand_ranges(&day.slots) {
        let label = time.label();
        if booked.contains(&label) {
            continue;
        }
        if time.is_morning() {
            result.morning_slots.push(label);
        } else {
            result.evening_slots.push(label);
        }
    }

    result
}
