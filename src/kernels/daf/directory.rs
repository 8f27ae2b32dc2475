//! Directory trailer of Chebyshev SPK segments (types 2 and 3).
//!
//! The last four words of a Chebyshev segment encode:
//!
//! * `init`: initial epoch of the first record (ET seconds from J2000 TDB),
//! * `intlen`: length of each record's time span (seconds),
//! * `rsize`: **record size in double-precision words**, not bytes,
//! * `n_records`: total number of records.
//!
//! Records are laid out back to back from the start of the segment, so the
//! record covering an epoch is found by plain arithmetic on `init` and `intlen`.

use std::fmt;

use hifitime::Duration;

use super::array::DafArray;
use crate::{spkstate_errors::SpkStateError, time::Et};

/// Directory trailer of a Chebyshev SPK segment.
#[derive(Debug, PartialEq, Clone)]
pub struct DirectoryData {
    pub init: f64,
    pub intlen: f64,
    pub rsize: usize,
    pub n_records: usize,
}

impl DirectoryData {
    /// Read the 4-word directory from the end of a segment.
    ///
    /// Arguments
    /// -----------------
    /// * `array`: The segment words.
    ///
    /// Return
    /// ----------
    /// * The directory, or [`SpkStateError::CorruptedSegment`] when the values
    ///   are inconsistent with the segment length.
    pub fn parse(array: &DafArray<'_>) -> Result<Self, SpkStateError> {
        let [init, intlen, rsize, n_records] = array.trailer::<4>()?;
        // Bounded by the segment length before any conversion to usize
        let words = array.len() as f64;
        if !init.is_finite()
            || !(intlen > 0.0 && intlen.is_finite())
            || !(3.0..=words).contains(&rsize)
            || !(1.0..=words).contains(&n_records)
        {
            return Err(array.corrupted(format!(
                "invalid Chebyshev directory (init {init}, intlen {intlen}, rsize {rsize}, n {n_records})"
            )));
        }

        let directory = DirectoryData {
            init,
            intlen,
            rsize: rsize as usize,
            n_records: n_records as usize,
        };

        let needed = directory
            .rsize
            .checked_mul(directory.n_records)
            .and_then(|words| words.checked_add(4));
        match needed {
            Some(needed) if needed <= array.len() => Ok(directory),
            _ => Err(array.corrupted(format!(
                "{} records of {} words do not fit in {} words",
                directory.n_records,
                directory.rsize,
                array.len()
            ))),
        }
    }

    /// 0-based index of the record covering `et`.
    ///
    /// Epochs past the last record boundary (the segment end itself) map to
    /// the last record.
    pub fn record_index(&self, et: f64) -> usize {
        let raw = ((et - self.init) / self.intlen).floor();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.n_records - 1)
        }
    }
}

impl fmt::Display for DirectoryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records of {} words every {} from {}",
            self.n_records,
            self.rsize,
            Duration::from_seconds(self.intlen),
            Et(self.init)
        )
    }
}
