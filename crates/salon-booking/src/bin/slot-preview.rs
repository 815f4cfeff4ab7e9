//! # slot-preview
//!
//! Prints the bookable slots of a business for one date.
//!
//! ```text
//! slot-preview <hours.json> <YYYY-MM-DD> [HH:MM]
//! ```
//!
//! `hours.json` is the business-hours array as the marketplace API returns
//! it. The optional time stands in for "now" on that date; without it the
//! local clock is used.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{error, info};

use salon_booking::{BookingError, BookingResult};
use salon_core::slots::{business_hours_for, compute_slots, parse_time_of_day};
use salon_core::{BusinessHours, ValidationError};

#[derive(Debug)]
struct Args {
    hours_path: PathBuf,
    date: NaiveDate,
    now: Option<NaiveDateTime>,
}

const USAGE: &str = "usage: slot-preview <hours.json> <YYYY-MM-DD> [HH:MM]";

fn parse_args(path: &str, date: &str, time: Option<&str>) -> BookingResult<Args> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        salon_core::CoreError::from(ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        })
    })?;

    let now = match time {
        Some(time) => {
            let minutes = parse_time_of_day(time).map_err(salon_core::CoreError::from)?;
            // "24:00" is a closing time, not a moment of the day.
            let now = date.and_hms_opt(minutes / 60, minutes % 60, 0).ok_or_else(|| {
                salon_core::CoreError::from(ValidationError::OutOfRange {
                    field: "time".to_string(),
                    min: 0,
                    max: 1439,
                })
            })?;
            Some(now)
        }
        None => None,
    };

    Ok(Args {
        hours_path: PathBuf::from(path),
        date,
        now,
    })
}

fn run(args: Args) -> BookingResult<()> {
    let contents = std::fs::read_to_string(&args.hours_path)
        .map_err(|e| BookingError::ConfigLoadFailed(format!("{}: {}", args.hours_path.display(), e)))?;
    let week: Vec<BusinessHours> = serde_json::from_str(&contents)?;

    let now = args.now.unwrap_or_else(|| Local::now().naive_local());
    let hours = business_hours_for(args.date, &week);
    let slots = compute_slots(args.date, hours, now)?;
    info!(date = %args.date, %now, count = slots.len(), "Computed slots");

    if slots.is_empty() {
        println!("{}: no bookable slots", args.date);
        return Ok(());
    }

    println!("{}:", args.date);
    for slot in &slots {
        println!("  {:>8}  ({} min)", slot.display_label, slot.minutes_since_midnight);
    }

    Ok(())
}

fn main() -> ExitCode {
    salon_booking::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match args.as_slice() {
        [path, date] => parse_args(path, date, None),
        [path, date, time] => parse_args(path, date, Some(time.as_str())),
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match parsed.and_then(run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "slot-preview failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
