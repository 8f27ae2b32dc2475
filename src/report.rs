//! Printable result of a state query.

use std::fmt;

use serde::Serialize;

use crate::{state::StateVector, time::Et};

/// A state vector together with the query that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateReport {
    pub target: String,
    pub observer: String,
    pub frame: String,
    pub abcorr: String,
    /// The epoch as given by the user.
    pub epoch: String,
    pub et: Et,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    /// One-way light time in seconds.
    pub light_time: f64,
}

/// What was asked: names as the user wrote them.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    pub target: &'a str,
    pub observer: &'a str,
    pub frame: &'a str,
    pub abcorr: &'a str,
    pub epoch: &'a str,
}

impl StateReport {
    pub fn new(query: &Query<'_>, et: Et, state: &StateVector, light_time: f64) -> Self {
        let [x, y, z, vx, vy, vz] = state.to_array();
        StateReport {
            target: query.target.to_string(),
            observer: query.observer.to_string(),
            frame: query.frame.to_string(),
            abcorr: query.abcorr.to_string(),
            epoch: query.epoch.to_string(),
            et,
            position: [x, y, z],
            velocity: [vx, vy, vz],
            light_time,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn format_vector(vector: &[f64; 3]) -> String {
    let [x, y, z] = vector;
    format!("[{x} {y} {z}]")
}

/// Two lines: `Position (km): [x y z]` and `Velocity (km/s): [vx vy vz]`.
impl fmt::Display for StateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Position (km): {}", format_vector(&self.position))?;
        write!(f, "Velocity (km/s): {}", format_vector(&self.velocity))
    }
}
