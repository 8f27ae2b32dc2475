//! Conversion of calendar strings into ephemeris time.
//!
//! Ephemeris time ([`Et`]) is TDB seconds past J2000 (2000-01-01T12:00:00 TDB),
//! the time argument of every SPK evaluation.

use std::fmt;

use hifitime::Epoch;
use serde::Serialize;
use tracing::debug;

use crate::{kernels::pool::KernelPool, spkstate_errors::SpkStateError};
use calendar::{CalendarTime, TimeSystem};
use leapseconds::LeapSeconds;

pub mod calendar;
pub mod leapseconds;

/// Magnitude beyond which seconds past J2000 are not converted to an [`Epoch`].
const EPOCH_RANGE: f64 = 1.0e13;

/// Ephemeris time: TDB seconds past J2000.
///
/// Displays as a TDB calendar epoch, or as raw seconds when the value is not
/// a representable instant.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Et(pub f64);

impl Et {
    pub fn seconds(self) -> f64 {
        self.0
    }

    /// The instant as a TDB [`Epoch`], `None` for non-finite or far out of
    /// range values.
    pub fn epoch(self) -> Option<Epoch> {
        (self.0.is_finite() && self.0.abs() < EPOCH_RANGE)
            .then(|| Epoch::from_tdb_seconds(self.0))
    }
}

impl From<f64> for Et {
    fn from(seconds: f64) -> Self {
        Et(seconds)
    }
}

impl fmt::Display for Et {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.epoch() {
            Some(epoch) => write!(f, "{epoch}"),
            None => write!(f, "{} s past J2000 TDB", self.0),
        }
    }
}

/// Convert a time string into ephemeris time.
///
/// Arguments
/// -----------------
/// * `pool`: Kernel pool; must hold a leapseconds kernel unless the string is
///   already in TDB.
/// * `text`: A calendar string such as `"2024-12-31"`, see [`calendar`].
///
/// Return
/// ----------
/// * The ephemeris time, [`SpkStateError::InvalidTimeString`] for malformed
///   strings, or [`SpkStateError::NoLeapSeconds`] when a UTC or TDT string is
///   given and no leapseconds kernel is loaded.
pub fn str2et(pool: &KernelPool, text: &str) -> Result<Et, SpkStateError> {
    let time = CalendarTime::parse(text)?;

    let seconds = match time.system {
        TimeSystem::Tdb => time.formal_seconds,
        TimeSystem::Tdt => leapseconds(pool, text)?.tdt_to_tdb(time.formal_seconds),
        TimeSystem::Utc => leapseconds(pool, text)?.utc_to_tdb(&time),
    };

    debug!(input = text, et = seconds, "time string converted");
    Ok(Et(seconds))
}

fn leapseconds(pool: &KernelPool, text: &str) -> Result<LeapSeconds, SpkStateError> {
    LeapSeconds::from_variables(pool.variables())?
        .ok_or_else(|| SpkStateError::NoLeapSeconds(text.to_string()))
}
