//! # Slot Generation
//!
//! Computes the bookable start times for a calendar date from the business's
//! operating hours for that weekday.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  compute_slots(date, hours, now)                                        │
//! │                                                                         │
//! │  no hours / closed ──────────────────────────────► []                   │
//! │  date before today ──────────────────────────────► []                   │
//! │                                                                         │
//! │  candidates: 0:00, 1:00, ... 23:00 (one per hour boundary)              │
//! │       │                                                                 │
//! │       ├── 24h day: keep all                                             │
//! │       └── otherwise drop [0, open) and [close, 24:00)                   │
//! │       │                                                                 │
//! │       └── date is today: drop every slot at or before now (minutes)     │
//! │                                                                         │
//! │  Example: open 10:00-14:00, now = today 11:05                           │
//! │    candidates in window: 10:00 11:00 12:00 13:00                        │
//! │    after "now" filter:               12:00 13:00                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The closing hour itself is never offered: a salon closing at 17:00 takes
//! its last booking at 16:00.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{BusinessHours, TimeSlot};
use crate::{MINUTES_PER_DAY, SLOT_INTERVAL_MINUTES};

// =============================================================================
// Time Parsing & Formatting
// =============================================================================

/// Parses an `"HH:MM"` time of day into minutes since midnight.
///
/// `"24:00"` is accepted and yields 1440 so a closing time can name the end
/// of the day.
///
/// ## Example
/// ```rust
/// use salon_core::slots::parse_time_of_day;
///
/// assert_eq!(parse_time_of_day("09:30").unwrap(), 570);
/// assert_eq!(parse_time_of_day("24:00").unwrap(), 1440);
/// assert!(parse_time_of_day("9.30").is_err());
/// ```
pub fn parse_time_of_day(value: &str) -> Result<u32, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "time".to_string(),
        reason: format!("'{}' {}", value, reason),
    };

    let (hours, minutes) = value
        .trim()
        .split_once(':')
        .ok_or_else(|| invalid("is not HH:MM"))?;

    let all_digits = |s: &str| !s.is_empty() && s.len() <= 2 && s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(hours) || minutes.len() != 2 || !all_digits(minutes) {
        return Err(invalid("is not HH:MM"));
    }

    let hours: u32 = hours.parse().map_err(|_| invalid("has a bad hour"))?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid("has a bad minute"))?;

    if minutes > 59 || hours > 24 || (hours == 24 && minutes != 0) {
        return Err(invalid("is out of range"));
    }

    Ok(hours * 60 + minutes)
}

/// Formats minutes since midnight as a 12-hour `"H:MM AM/PM"` label.
///
/// Used for both the slot buttons and the review screen.
///
/// ## Example
/// ```rust
/// use salon_core::slots::format_slot;
///
/// assert_eq!(format_slot(570), "9:30 AM");
/// assert_eq!(format_slot(1290), "9:30 PM");
/// assert_eq!(format_slot(0), "12:00 AM");
/// assert_eq!(format_slot(720), "12:00 PM");
/// ```
pub fn format_slot(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    let hour = minutes / 60;
    let minute = minutes % 60;
    let period = if hour < 12 { "AM" } else { "PM" };
    let hour_12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour_12, minute, period)
}

impl TimeSlot {
    /// Builds the slot starting at `minutes` since midnight, with its label.
    pub fn at(minutes: u32) -> Self {
        TimeSlot {
            minutes_since_midnight: minutes,
            display_label: format_slot(minutes),
        }
    }
}

// =============================================================================
// Business Hours Lookup
// =============================================================================

/// Weekday index of a date, Sunday = 0.
#[inline]
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Picks the business-hours entry that applies to `date`.
///
/// Returns `None` when the business has not published hours for that
/// weekday, which [`compute_slots`] treats as "nothing bookable".
pub fn business_hours_for(date: NaiveDate, week: &[BusinessHours]) -> Option<&BusinessHours> {
    let day = weekday_index(date);
    week.iter().find(|h| h.day_of_week == day)
}

/// Resolves the bookable window `[open, close)` in minutes.
fn opening_window(hours: &BusinessHours) -> CoreResult<(u32, u32)> {
    if hours.is_24_hours {
        return Ok((0, MINUTES_PER_DAY));
    }

    let malformed = |reason: String| CoreError::MalformedBusinessHours {
        day_of_week: hours.day_of_week,
        reason,
    };

    let open_str = hours
        .open_time
        .as_deref()
        .ok_or_else(|| malformed("missing openTime".to_string()))?;
    let close_str = hours
        .close_time
        .as_deref()
        .ok_or_else(|| malformed("missing closeTime".to_string()))?;

    let open = parse_time_of_day(open_str).map_err(|e| malformed(e.to_string()))?;
    let mut close = parse_time_of_day(close_str).map_err(|e| malformed(e.to_string()))?;

    if open >= MINUTES_PER_DAY {
        return Err(malformed(format!("openTime '{}' is the end of the day", open_str)));
    }

    // Closing at midnight means closing at the end of the day.
    if close == 0 && open > 0 {
        close = MINUTES_PER_DAY;
    }

    if close <= open {
        return Err(malformed(format!(
            "closeTime '{}' is not after openTime '{}'",
            close_str, open_str
        )));
    }

    Ok((open, close))
}

// =============================================================================
// Slot Computation
// =============================================================================

/// Computes the ordered bookable slots for `date`.
///
/// ## Arguments
/// * `date` - The calendar day the customer picked
/// * `hours` - Business hours for that day's weekday, `None` if unknown
/// * `now` - Current local time of the business
///
/// ## Returns
/// Slots in ascending order. An empty vector means closed or fully past;
/// it is not an error.
///
/// ## Errors
/// [`CoreError::MalformedBusinessHours`] when an open, non-24h day has
/// missing or unparseable times, or closes before it opens.
pub fn compute_slots(
    date: NaiveDate,
    hours: Option<&BusinessHours>,
    now: NaiveDateTime,
) -> CoreResult<Vec<TimeSlot>> {
    let Some(hours) = hours else {
        return Ok(Vec::new());
    };

    if !hours.is_open {
        return Ok(Vec::new());
    }

    let (open, close) = opening_window(hours)?;

    if date < now.date() {
        return Ok(Vec::new());
    }

    let slots = (0..MINUTES_PER_DAY)
        .step_by(SLOT_INTERVAL_MINUTES as usize)
        .filter(|m| *m >= open && *m < close)
        .filter(|m| !slot_has_started(date, *m, now))
        .map(TimeSlot::at)
        .collect();

    Ok(slots)
}

/// Returns true once the slot starting at `minutes` on `date` is no longer
/// bookable at `now`.
///
/// Minute precision: a slot starting at or before the current minute has
/// started.
pub fn slot_has_started(date: NaiveDate, minutes: u32, now: NaiveDateTime) -> bool {
    let today = now.date();
    date < today || (date == today && minutes <= now.hour() * 60 + now.minute())
}

/// Keeps the slots of `date` that have not started at `now`.
///
/// Slot lists shown on screen go stale as the day goes on; this drops the
/// ones that began since they were computed.
pub fn still_bookable(date: NaiveDate, slots: &[TimeSlot], now: NaiveDateTime) -> Vec<TimeSlot> {
    slots
        .iter()
        .filter(|s| !slot_has_started(date, s.minutes_since_midnight, now))
        .cloned()
        .collect()
}

/// Finds the slot starting at `minutes` in a computed slot list.
pub fn find_slot(slots: &[TimeSlot], minutes: u32) -> Option<&TimeSlot> {
    slots.iter().find(|s| s.minutes_since_midnight == minutes)
}

/// Finds the first date, starting from `now`'s day and looking ahead at most
/// `horizon_days`, that still has a bookable slot.
///
/// Used to preselect a date in the calendar so the customer does not land on
/// a closed day.
pub fn next_bookable_date(
    week: &[BusinessHours],
    now: NaiveDateTime,
    horizon_days: u32,
) -> CoreResult<Option<NaiveDate>> {
    let today = now.date();
    for offset in 0..=horizon_days {
        let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
            break;
        };
        if !compute_slots(date, business_hours_for(date, week), now)?.is_empty() {
            return Ok(Some(date));
        }
    }
    Ok(None)
}

// =============================================================================
// Unit Tests
// =============================================================================
