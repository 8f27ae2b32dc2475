//! State vector queries.
//!
//! The state of a body is found by following SPK segments from the body to
//! its segment center, then from that center to its own center, and so on
//! toward the solar system barycenter. The state of a target relative to an
//! observer is taken at the first body shared by the two chains.
//!
//! All chaining is done in J2000; the result is rotated into the requested
//! frame at the end.

use std::{fmt, ops::Sub, str::FromStr};

use nalgebra::{Rotation3, Vector3};
use serde::Serialize;
use tracing::debug;

use crate::{
    bodies::{body_id, display_name},
    constants::{Kilometer, NaifId, Second, MAX_CHAIN_DEPTH, SSB, VLIGHT},
    frames::Frame,
    kernels::pool::KernelPool,
    spkstate_errors::SpkStateError,
    time::Et,
};

/// Position (km) and velocity (km/s) of a body relative to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateVector {
    #[serde(serialize_with = "serialize_vector")]
    pub position: Vector3<Kilometer>,
    #[serde(serialize_with = "serialize_vector")]
    pub velocity: Vector3<f64>,
}

fn serialize_vector<S: serde::Serializer>(
    vector: &Vector3<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serde::Serialize::serialize(&[vector.x, vector.y, vector.z], serializer)
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        StateVector { position, velocity }
    }

    pub fn zeros() -> Self {
        StateVector::new(Vector3::zeros(), Vector3::zeros())
    }

    /// The six components `[x, y, z, vx, vy, vz]`.
    pub fn to_array(&self) -> [f64; 6] {
        let (p, v) = (&self.position, &self.velocity);
        [p.x, p.y, p.z, v.x, v.y, v.z]
    }

    pub fn rotated(&self, rotation: &Rotation3<f64>) -> Self {
        StateVector::new(rotation * self.position, rotation * self.velocity)
    }

    /// One-way light time for the position vector, in seconds.
    pub fn light_time(&self) -> Second {
        self.position.norm() / VLIGHT
    }
}

impl std::ops::Add for StateVector {
    type Output = StateVector;

    fn add(self, rhs: StateVector) -> StateVector {
        StateVector::new(self.position + rhs.position, self.velocity + rhs.velocity)
    }
}

impl Sub for StateVector {
    type Output = StateVector;

    fn sub(self, rhs: StateVector) -> StateVector {
        StateVector::new(self.position - rhs.position, self.velocity - rhs.velocity)
    }
}

/// Aberration correction applied to the target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbCorr {
    /// Geometric state.
    #[default]
    None,
    /// Light time, one Newtonian iteration.
    Lt,
    /// Light time, converged Newtonian iterations.
    Cn,
}

impl AbCorr {
    fn iterations(self) -> usize {
        match self {
            AbCorr::None => 0,
            AbCorr::Lt => 1,
            AbCorr::Cn => 3,
        }
    }
}

impl FromStr for AbCorr {
    type Err = SpkStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.split_whitespace().collect::<String>().to_uppercase();
        match compact.as_str() {
            "NONE" => Ok(AbCorr::None),
            "LT" => Ok(AbCorr::Lt),
            "CN" => Ok(AbCorr::Cn),
            _ => Err(SpkStateError::InvalidAberrationCorrection(s.to_string())),
        }
    }
}

impl fmt::Display for AbCorr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AbCorr::None => "NONE",
            AbCorr::Lt => "LT",
            AbCorr::Cn => "CN",
        };
        write!(f, "{s}")
    }
}

/// Links from a body toward the barycenter: each entry is a body of the
/// chain and the state of the starting body relative to it.
type Chain = Vec<(NaifId, StateVector)>;

fn chain(pool: &KernelPool, body: NaifId, et: f64) -> Result<Chain, SpkStateError> {
    let mut links = vec![(body, StateVector::zeros())];
    let mut current = body;
    let mut cumulative = StateVector::zeros();

    while current != SSB {
        let Some((spk, segment)) = pool.find_spk_segment(current, et) else {
            break;
        };
        if links.len() > MAX_CHAIN_DEPTH {
            return Err(SpkStateError::ChainTooDeep(body));
        }

        let (position, velocity) = spk.evaluate(segment, et)?;
        let to_j2000 = Frame::from_id(segment.summary.frame_id)?.rotation_to_j2000();
        cumulative = cumulative + StateVector::new(position, velocity).rotated(&to_j2000);

        current = segment.summary.center;
        links.push((current, cumulative));
    }

    Ok(links)
}

/// Geometric state of `target` relative to `observer` in J2000.
fn geometric_j2000(
    pool: &KernelPool,
    target: NaifId,
    observer: NaifId,
    et: f64,
) -> Result<StateVector, SpkStateError> {
    if target == observer {
        return Ok(StateVector::zeros());
    }

    let target_chain = chain(pool, target, et)?;
    let observer_chain = chain(pool, observer, et)?;

    target_chain
        .iter()
        .find_map(|(node, target_state)| {
            observer_chain
                .iter()
                .find(|(other, _)| other == node)
                .map(|(_, observer_state)| {
                    debug!(target, observer, common = node, "ephemeris chains joined");
                    *target_state - *observer_state
                })
        })
        .ok_or_else(|| {
            // Blame the body whose chain stops short of the barycenter
            let body = match target_chain.last() {
                Some((last, _)) if *last != SSB => target,
                _ => observer,
            };
            SpkStateError::InsufficientEphemerisData {
                body: display_name(pool, body),
                id: body,
                et,
            }
        })
}

/// State of a target relative to an observer, by NAIF codes.
///
/// Arguments
/// -----------------
/// * `pool`: Kernel pool holding the SPK kernels.
/// * `target`: NAIF code of the target.
/// * `et`: Observation epoch, TDB seconds past J2000.
/// * `frame`: Frame of the output state.
/// * `abcorr`: Aberration correction.
/// * `observer`: NAIF code of the observer.
///
/// Return
/// ----------
/// * The state of the target and the one-way light time (s) between the
///   observer and the target.
pub fn spkez(
    pool: &KernelPool,
    target: NaifId,
    et: Et,
    frame: Frame,
    abcorr: AbCorr,
    observer: NaifId,
) -> Result<(StateVector, Second), SpkStateError> {
    let et = et.seconds();

    let (state, light_time) = match abcorr {
        AbCorr::None => {
            let state = geometric_j2000(pool, target, observer, et)?;
            (state, state.light_time())
        }
        AbCorr::Lt | AbCorr::Cn => {
            let observer_ssb = geometric_j2000(pool, observer, SSB, et)?;
            let target_at = |epoch| geometric_j2000(pool, target, SSB, epoch);

            let mut light_time = (target_at(et)?.position - observer_ssb.position).norm() / VLIGHT;
            for _ in 0..abcorr.iterations() {
                light_time = (target_at(et - light_time)?.position - observer_ssb.position).norm()
                    / VLIGHT;
            }

            let target_ssb = target_at(et - light_time)?;
            let position = target_ssb.position - observer_ssb.position;

            // Rate of change of the light time along the line of sight
            let direction = position.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            let dlt = direction.dot(&(target_ssb.velocity - observer_ssb.velocity))
                / (VLIGHT + direction.dot(&target_ssb.velocity));
            let velocity = target_ssb.velocity * (1.0 - dlt) - observer_ssb.velocity;

            (StateVector::new(position, velocity), light_time)
        }
    };

    Ok((state.rotated(&frame.rotation_from_j2000()), light_time))
}

/// State of a target relative to an observer, by names.
///
/// Arguments
/// -----------------
/// * `pool`: Kernel pool holding the SPK kernels.
/// * `target`: Target name or NAIF code, e.g. `"JWST"`.
/// * `et`: Observation epoch, TDB seconds past J2000.
/// * `frame`: Output frame name, e.g. `"J2000"`.
/// * `abcorr`: Aberration correction, `"NONE"`, `"LT"` or `"CN"`.
/// * `observer`: Observer name or NAIF code, e.g. `"SUN"`.
///
/// Return
/// ----------
/// * The state of the target and the one-way light time in seconds.
pub fn spkezr(
    pool: &KernelPool,
    target: &str,
    et: Et,
    frame: &str,
    abcorr: &str,
    observer: &str,
) -> Result<(StateVector, Second), SpkStateError> {
    let target_id = body_id(pool, target)?;
    let observer_id = body_id(pool, observer)?;
    let frame: Frame = frame.parse()?;
    let abcorr: AbCorr = abcorr.parse()?;

    debug!(
        target = target_id,
        observer = observer_id,
        %frame,
        %abcorr,
        et = et.seconds(),
        "state query"
    );
    spkez(pool, target_id, et, frame, abcorr, observer_id)
}

#[cfg(test)]
mod test_state {
    use super::*;

    #[test]
    fn test_abcorr_parsing() {
        assert_eq!("none".parse::<AbCorr>().unwrap(), AbCorr::None);
        assert_eq!(" L T ".parse::<AbCorr>().unwrap(), AbCorr::Lt);
        assert_eq!("CN".parse::<AbCorr>().unwrap(), AbCorr::Cn);
        assert!(matches!(
            "XLT+S".parse::<AbCorr>(),
            Err(SpkStateError::InvalidAberrationCorrection(_))
        ));
        assert_eq!(AbCorr::Lt.to_string(), "LT");
    }

    #[test]
    fn test_state_vector_arithmetic() {
        let a = StateVector::new(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.1, 0.2, 0.3));
        let b = StateVector::new(Vector3::new(1.0, 1.0, 1.0), Vector3::new(0.1, 0.1, 0.1));

        assert_eq!((a - b).position, Vector3::new(0.0, 1.0, 2.0));
        assert_eq!((a + b).to_array()[3], 0.2);
        assert_eq!(StateVector::zeros().light_time(), 0.0);
    }

    #[test]
    fn test_same_body_without_kernels() {
        let pool = KernelPool::new();
        let (state, lt) =
            spkezr(&pool, "EARTH", Et(0.0), "J2000", "NONE", "399").unwrap();
        assert_eq!(state, StateVector::zeros());
        assert_eq!(lt, 0.0);
    }

    #[test]
    fn test_missing_data() {
        let pool = KernelPool::new();
        match spkezr(&pool, "JWST", Et(0.0), "J2000", "NONE", "SUN") {
            Err(SpkStateError::InsufficientEphemerisData { body, id, .. }) => {
                assert_eq!(body, "JWST");
                assert_eq!(id, -170);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_argument_errors() {
        let pool = KernelPool::new();
        assert!(matches!(
            spkezr(&pool, "NOPE", Et(0.0), "J2000", "NONE", "SUN"),
            Err(SpkStateError::UnknownBody(_))
        ));
        assert!(matches!(
            spkezr(&pool, "JWST", Et(0.0), "ITRF93", "NONE", "SUN"),
            Err(SpkStateError::UnknownFrame(_))
        ));
        assert!(matches!(
            spkezr(&pool, "JWST", Et(0.0), "J2000", "S", "SUN"),
            Err(SpkStateError::InvalidAberrationCorrection(_))
        ));
    }
}
