//! Chebyshev record decoding and evaluation (SPK types 2 and 3).
//!
//! A record holds the midpoint `mid` (ET seconds), the half-interval `radius`
//! (seconds), then `ncoeff` coefficients per component:
//!
//! * type 2: X, Y, Z position (km); velocity is the time derivative,
//! * type 3: X, Y, Z position (km) then VX, VY, VZ velocity (km/s).
//!
//! The normalized time is `t = (et - mid) / radius`, clamped to `[-1, 1]`.
//! Since `dt/d(et) = 1 / radius`, derivatives of the position series are
//! scaled by `1 / radius` to give km/s.

use nalgebra::Vector3;

use super::{array::DafArray, directory::DirectoryData};
use crate::spkstate_errors::SpkStateError;

/// One Chebyshev record of an SPK type 2 or type 3 segment.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisRecord {
    /// Midpoint of the record time span (ET seconds from J2000 TDB).
    pub mid: f64,
    /// Half-width of the record interval (seconds).
    pub radius: f64,
    /// Position coefficients for X, Y, Z (km).
    pub position: [Vec<f64>; 3],
    /// Velocity coefficients for VX, VY, VZ (km/s), type 3 only.
    pub velocity: Option<[Vec<f64>; 3]>,
}

impl EphemerisRecord {
    /// Decode one record from its words.
    ///
    /// Arguments
    /// -----------------
    /// * `words`: Exactly one record: `mid`, `radius`, then the coefficients.
    /// * `with_velocity`: `true` for type 3 records (six coefficient sets).
    ///
    /// Return
    /// ----------
    /// * The decoded record, or `None` if the word count does not split evenly.
    pub fn from_words(words: &[f64], with_velocity: bool) -> Option<Self> {
        let components = if with_velocity { 6 } else { 3 };
        if words.len() < 2 + components || (words.len() - 2) % components != 0 {
            return None;
        }
        let ncoeff = (words.len() - 2) / components;

        let mut series = words[2..].chunks_exact(ncoeff).map(|c| c.to_vec());
        let mut next = || series.next().unwrap_or_default();

        let position = [next(), next(), next()];
        let velocity = with_velocity.then(|| [next(), next(), next()]);

        Some(EphemerisRecord {
            mid: words[0],
            radius: words[1],
            position,
            velocity,
        })
    }

    /// Read the record of a Chebyshev segment that covers `et`.
    ///
    /// Arguments
    /// -----------------
    /// * `array`: Segment words.
    /// * `directory`: Directory trailer of the segment.
    /// * `et`: Epoch in ET seconds.
    /// * `with_velocity`: `true` for type 3 segments.
    pub fn read(
        array: &DafArray<'_>,
        directory: &DirectoryData,
        et: f64,
        with_velocity: bool,
    ) -> Result<Self, SpkStateError> {
        let index = directory.record_index(et);
        let words = array.words(index * directory.rsize, directory.rsize)?;
        EphemerisRecord::from_words(&words, with_velocity).ok_or_else(|| {
            array.corrupted(format!(
                "record size {} does not match a type {} layout",
                directory.rsize,
                if with_velocity { 3 } else { 2 }
            ))
        })
    }

    /// Evaluate position (km) and velocity (km/s) at an ET epoch.
    pub fn interpolate(&self, ephem_time: f64) -> (Vector3<f64>, Vector3<f64>) {
        let normalized_time = ((ephem_time - self.mid) / self.radius).clamp(-1.0, 1.0);

        let mut position = Vector3::zeros();
        let mut velocity = Vector3::zeros();
        for axis in 0..3 {
            let (value, derivative) = chebyshev(&self.position[axis], normalized_time);
            position[axis] = value;
            velocity[axis] = derivative / self.radius;
        }

        if let Some(series) = &self.velocity {
            for axis in 0..3 {
                velocity[axis] = chebyshev(&series[axis], normalized_time).0;
            }
        }

        (position, velocity)
    }
}

/// Evaluate a Chebyshev series and its derivative with respect to `t`.
///
/// Uses `T_0 = 1`, `T_1 = t`, `T_n = 2 t T_{n-1} - T_{n-2}` and, for the
/// derivative, `T'_n = 2 t T'_{n-1} + 2 T_{n-1} - T'_{n-2}`.
pub fn chebyshev(coefficients: &[f64], t: f64) -> (f64, f64) {
    let Some(&c0) = coefficients.first() else {
        return (0.0, 0.0);
    };

    let mut value = c0;
    let mut derivative = 0.0;

    // (T_{n-2}, T_{n-1}) and (T'_{n-2}, T'_{n-1})
    let (mut t_prev, mut t_curr) = (1.0, t);
    let (mut d_prev, mut d_curr) = (0.0, 1.0);

    for (degree, c) in coefficients.iter().enumerate().skip(1) {
        if degree > 1 {
            let t_next = 2.0 * t * t_curr - t_prev;
            let d_next = 2.0 * t * d_curr + 2.0 * t_curr - d_prev;
            (t_prev, t_curr) = (t_curr, t_next);
            (d_prev, d_curr) = (d_curr, d_next);
        }
        value += c * t_curr;
        derivative += c * d_curr;
    }

    (value, derivative)
}
