//! UTC → TDB conversion driven by the variables of a leapseconds kernel.
//!
//! ```text
//! TAI = UTC + ΔAT(UTC)
//! TDT = TAI + DELTET/DELTA_T_A
//! TDB = TDT + K sin(E),   E = M0 + M1 TDT + EB sin(M0 + M1 TDT)
//! ```
//!
//! `ΔAT` is the step function given by `DELTET/DELTA_AT`, a flat list of
//! `(offset, @date)` pairs.

use itertools::Itertools;

use super::calendar::CalendarTime;
use crate::{
    kernels::text_kernel::{PoolValue, PoolVariables},
    spkstate_errors::SpkStateError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LeapSeconds {
    delta_t_a: f64,
    k: f64,
    eb: f64,
    m: [f64; 2],
    /// `(UTC formal seconds at which the offset starts, TAI - UTC)`, ascending.
    delta_at: Vec<(f64, f64)>,
}

fn numbers(variables: &PoolVariables, name: &str) -> Result<Vec<f64>, SpkStateError> {
    variables
        .get(name)
        .ok_or_else(|| SpkStateError::InvalidLeapSeconds(format!("{name} is not defined")))?
        .iter()
        .map(PoolValue::as_number)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| SpkStateError::InvalidLeapSeconds(format!("{name} holds non numeric values")))
}

fn scalar(variables: &PoolVariables, name: &str) -> Result<f64, SpkStateError> {
    match numbers(variables, name)?.as_slice() {
        [value] => Ok(*value),
        other => Err(SpkStateError::InvalidLeapSeconds(format!(
            "{name} must hold one value, found {}",
            other.len()
        ))),
    }
}

impl LeapSeconds {
    /// Build the conversion from kernel pool variables.
    ///
    /// Return
    /// ----------
    /// * `Ok(None)` when no leapseconds kernel is loaded (`DELTET/DELTA_AT`
    ///   undefined), [`SpkStateError::InvalidLeapSeconds`] when the `DELTET`
    ///   variables are incomplete or malformed.
    pub fn from_variables(variables: &PoolVariables) -> Result<Option<Self>, SpkStateError> {
        if !variables.contains_key("DELTET/DELTA_AT") {
            return Ok(None);
        }

        let table = numbers(variables, "DELTET/DELTA_AT")?;
        if table.is_empty() || table.len() % 2 != 0 {
            return Err(SpkStateError::InvalidLeapSeconds(format!(
                "DELTET/DELTA_AT must hold (offset, date) pairs, found {} values",
                table.len()
            )));
        }
        let delta_at: Vec<(f64, f64)> = table
            .into_iter()
            .tuples()
            .map(|(offset, start)| (start, offset))
            .collect();
        if !delta_at.iter().tuple_windows().all(|(a, b)| a.0 < b.0) {
            return Err(SpkStateError::InvalidLeapSeconds(
                "DELTET/DELTA_AT dates are not increasing".to_string(),
            ));
        }

        let m = match numbers(variables, "DELTET/M")?.as_slice() {
            [m0, m1] => [*m0, *m1],
            other => {
                return Err(SpkStateError::InvalidLeapSeconds(format!(
                    "DELTET/M must hold two values, found {}",
                    other.len()
                )))
            }
        };

        Ok(Some(LeapSeconds {
            delta_t_a: scalar(variables, "DELTET/DELTA_T_A")?,
            k: scalar(variables, "DELTET/K")?,
            eb: scalar(variables, "DELTET/EB")?,
            m,
            delta_at,
        }))
    }

    /// TAI - UTC at a UTC instant given in formal seconds past J2000.
    ///
    /// Instants before the first tabulated date use the first offset.
    pub fn delta_at(&self, utc: f64) -> f64 {
        self.delta_at
            .iter()
            .rev()
            .find(|(start, _)| *start <= utc)
            .or(self.delta_at.first())
            .map_or(0.0, |(_, offset)| *offset)
    }

    /// TDB seconds past J2000 from TDT seconds past J2000.
    pub fn tdt_to_tdb(&self, tdt: f64) -> f64 {
        let mean_anomaly = self.m[0] + self.m[1] * tdt;
        let eccentric_anomaly = mean_anomaly + self.eb * mean_anomaly.sin();
        tdt + self.k * eccentric_anomaly.sin()
    }

    /// TDB seconds past J2000 from a parsed UTC calendar time.
    pub fn utc_to_tdb(&self, utc: &CalendarTime) -> f64 {
        // Inside a leap second the offset of the day that ends is still valid
        let lookup = if utc.in_leap_second {
            utc.formal_seconds - 1.0
        } else {
            utc.formal_seconds
        };
        let tai = utc.formal_seconds + self.delta_at(lookup);
        self.tdt_to_tdb(tai + self.delta_t_a)
    }
}
