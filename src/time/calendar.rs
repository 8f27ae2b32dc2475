//! Calendar string parsing.
//!
//! Accepted forms (case-insensitive):
//!
//! * `2024-12-31`, `2024-12-31T06:30`, `2024-12-31 06:30:12.5Z`
//! * `2024-366T00:00:00` (day of year)
//! * `2024 DEC 31 06:30`, `1972-JAN-1`
//! * `31-DEC-2024 06:30:00`
//! * `JD 2460675.5`
//!
//! followed by an optional time system token: `UTC` (default), `TDB`, `ET`,
//! `TDT` or `TT`.
//!
//! Parsing produces *formal* seconds past 2000-01-01T12:00:00, counted on
//! uniform 86400 s days of the time system the string is written in. Leap
//! seconds are applied later, by [`crate::time::leapseconds`].

use hifitime::{Epoch, TimeScale};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{alpha1, char, digit0, digit1, space0, space1},
    combinator::{all_consuming, map_res, opt, recognize, value},
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};

use crate::{
    constants::{J2000_JD, SECONDS_PER_DAY},
    spkstate_errors::SpkStateError,
};

const MONTHS: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

/// Time system a calendar string is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSystem {
    #[default]
    Utc,
    /// Barycentric dynamical time, also spelled `ET`.
    Tdb,
    /// Terrestrial time, also spelled `TT`.
    Tdt,
}

/// A parsed calendar string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarTime {
    /// Seconds past 2000-01-01T12:00:00 on uniform 86400 s days.
    pub formal_seconds: f64,
    /// `true` when the seconds field is 60 or more.
    pub in_leap_second: bool,
    pub system: TimeSystem,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DatePart {
    Gregorian { year: i32, month: u8, day: u8 },
    DayOfYear { year: i32, doy: u16 },
    JulianDate(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Clock {
    hour: u8,
    minute: u8,
    second: f64,
}

impl CalendarTime {
    /// Parse a calendar string.
    ///
    /// Arguments
    /// -----------------
    /// * `text`: The time string, e.g. `"2024-12-31"` or `"2024 DEC 31 12:00 TDB"`.
    ///
    /// Return
    /// ----------
    /// * The parsed time, or [`SpkStateError::InvalidTimeString`].
    pub fn parse(text: &str) -> Result<Self, SpkStateError> {
        let invalid = |reason: String| SpkStateError::InvalidTimeString {
            input: text.to_string(),
            reason,
        };

        let normalized = text.trim().to_uppercase();
        let (_, (date, clock, system)) = time_string(&normalized)
            .map_err(|_| invalid("unrecognized time format".to_string()))?;

        if matches!(date, DatePart::JulianDate(_)) && clock.is_some() {
            return Err(invalid("a Julian date cannot carry a time of day".to_string()));
        }
        if let DatePart::JulianDate(jd) = date {
            if !jd.is_finite() {
                return Err(invalid(format!("Julian date {jd} is not a finite number")));
            }
        }
        let clock = clock.unwrap_or_default();

        let formal_seconds = match date {
            DatePart::JulianDate(jd) => (jd - J2000_JD) * SECONDS_PER_DAY,
            DatePart::Gregorian { year, month, day } => {
                calendar_seconds(year, month, day, &clock).map_err(invalid)?
            }
            DatePart::DayOfYear { year, doy } => {
                if doy == 0 || doy > days_in_year(year) {
                    return Err(invalid(format!("day {doy} does not exist in {year}")));
                }
                calendar_seconds(year, 1, 1, &clock).map_err(invalid)?
                    + f64::from(doy - 1) * SECONDS_PER_DAY
            }
        };

        Ok(CalendarTime {
            formal_seconds,
            in_leap_second: clock.second >= 60.0,
            system,
        })
    }
}

fn days_in_year(year: i32) -> u16 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    if leap {
        366
    } else {
        365
    }
}

/// Formal seconds between 2000-01-01T12:00:00 and the given calendar instant.
///
/// Both instants are built in TAI, which has no leap seconds, so the
/// difference is pure calendar arithmetic.
fn calendar_seconds(year: i32, month: u8, day: u8, clock: &Clock) -> Result<f64, String> {
    if !(0.0..61.0).contains(&clock.second) {
        return Err(format!("seconds field {} is out of range", clock.second));
    }
    let start_of_minute = Epoch::maybe_from_gregorian(
        year,
        month,
        day,
        clock.hour,
        clock.minute,
        0,
        0,
        TimeScale::TAI,
    )
    .map_err(|err| err.to_string())?;
    let j2000 = Epoch::maybe_from_gregorian(2000, 1, 1, 12, 0, 0, 0, TimeScale::TAI)
        .map_err(|err| err.to_string())?;

    Ok((start_of_minute - j2000).to_seconds() + clock.second)
}

fn month_from_name(word: &str) -> Result<u8, &'static str> {
    if word.len() < 3 {
        return Err("month abbreviation too short");
    }
    MONTHS
        .iter()
        .position(|month| month.starts_with(word))
        .map(|index| index as u8 + 1)
        .ok_or("unknown month")
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn year(input: &str) -> IResult<&str, i32> {
    map_res(take_while_m_n(4, 4, is_digit), str::parse::<i32>).parse(input)
}

fn two_digits(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(1, 2, is_digit), str::parse::<u8>).parse(input)
}

fn month_name(input: &str) -> IResult<&str, u8> {
    map_res(alpha1, month_from_name).parse(input)
}

fn seconds(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize((digit1, opt((char('.'), digit0)))),
        str::parse::<f64>,
    )
    .parse(input)
}

/// `YYYY-MM-DD` or `YYYY-DDD`
fn iso_date(input: &str) -> IResult<&str, DatePart> {
    let (input, (year, _)) = (year, char('-')).parse(input)?;
    alt((
        (two_digits, char('-'), two_digits)
            .map(move |(month, _, day)| DatePart::Gregorian { year, month, day }),
        map_res(take_while_m_n(3, 3, is_digit), str::parse::<u16>)
            .map(move |doy| DatePart::DayOfYear { year, doy }),
    ))
    .parse(input)
}

/// `YYYY MON DD` or `YYYY-MON-DD`
fn year_month_day(input: &str) -> IResult<&str, DatePart> {
    let separator = || alt((space1, tag("-")));
    (year, separator(), month_name, separator(), two_digits)
        .map(|(year, _, month, _, day)| DatePart::Gregorian { year, month, day })
        .parse(input)
}

/// `DD-MON-YYYY`
fn day_month_year(input: &str) -> IResult<&str, DatePart> {
    (two_digits, char('-'), month_name, char('-'), year)
        .map(|(day, _, month, _, year)| DatePart::Gregorian { year, month, day })
        .parse(input)
}

fn julian_date(input: &str) -> IResult<&str, DatePart> {
    preceded((tag("JD"), space0), double)
        .map(DatePart::JulianDate)
        .parse(input)
}

/// `THH:MM[:SS[.fff]]` or ` HH:MM[:SS[.fff]]`
fn clock(input: &str) -> IResult<&str, Clock> {
    preceded(
        alt((tag("T"), space1)),
        (two_digits, char(':'), two_digits, opt(preceded(char(':'), seconds))),
    )
    .map(|(hour, _, minute, second)| Clock {
        hour,
        minute,
        second: second.unwrap_or(0.0),
    })
    .parse(input)
}

fn time_system(input: &str) -> IResult<&str, TimeSystem> {
    alt((
        value(TimeSystem::Utc, tag("UTC")),
        value(TimeSystem::Tdb, tag("TDB")),
        value(TimeSystem::Tdt, tag("TDT")),
        value(TimeSystem::Tdb, tag("ET")),
        value(TimeSystem::Tdt, tag("TT")),
    ))
    .parse(input)
}

fn time_string(input: &str) -> IResult<&str, (DatePart, Option<Clock>, TimeSystem)> {
    all_consuming((
        alt((julian_date, iso_date, year_month_day, day_month_year)),
        opt(clock),
        opt(char('Z')),
        opt(preceded(space1, time_system)),
        space0,
    ))
    .map(|(date, clock, _, system, _)| (date, clock, system.unwrap_or_default()))
    .parse(input)
}
