//! # Constants and type definitions for spkstate
//!
//! This module centralizes the **physical constants**, **DAF layout sizes**, and **common type
//! aliases** shared by the kernel readers, the time converter and the state query.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian date of J2000.0 (2000-01-01 12:00:00 TDB)
pub const J2000_JD: f64 = 2_451_545.0;

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Mean obliquity of the ecliptic at J2000 (IAU 1976), in radians
pub const OBLIQUITY_J2000: f64 = 84_381.448 * RADSEC;

// -------------------------------------------------------------------------------------------------
// DAF layout
// -------------------------------------------------------------------------------------------------

/// Size of one DAF physical record in bytes
pub const DAF_RECORD_BYTES: usize = 1024;

/// Size of one DAF word (a double precision number) in bytes
pub const DAF_WORD_BYTES: usize = 8;

/// Longest observer/target chain followed before giving up
pub const MAX_CHAIN_DEPTH: usize = 100;

/// NAIF code of the solar system barycenter
pub const SSB: NaifId = 0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// NAIF integer code of a body
pub type NaifId = i32;
/// Distance in kilometers
pub type Kilometer = f64;
/// Duration in seconds
pub type Second = f64;
