//! Inertial reference frames.
//!
//! Segment data and query results may be expressed in `J2000` (NAIF frame 1,
//! the ICRF-aligned mean equator and equinox of J2000) or `ECLIPJ2000`
//! (NAIF frame 17, the mean ecliptic and equinox of J2000). The two differ
//! by a rotation about the X axis by the J2000 mean obliquity.

use std::{fmt, str::FromStr};

use nalgebra::{Rotation3, Vector3};

use crate::{constants::OBLIQUITY_J2000, spkstate_errors::SpkStateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    J2000,
    EclipJ2000,
}

impl Frame {
    /// Frame of a NAIF frame ID, as found in SPK segment summaries.
    pub fn from_id(id: i32) -> Result<Self, SpkStateError> {
        match id {
            1 => Ok(Frame::J2000),
            17 => Ok(Frame::EclipJ2000),
            _ => Err(SpkStateError::UnsupportedFrame(id)),
        }
    }

    pub fn id(self) -> i32 {
        match self {
            Frame::J2000 => 1,
            Frame::EclipJ2000 => 17,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Frame::J2000 => "J2000",
            Frame::EclipJ2000 => "ECLIPJ2000",
        }
    }

    /// Rotation taking vectors expressed in this frame into J2000.
    pub fn rotation_to_j2000(self) -> Rotation3<f64> {
        match self {
            Frame::J2000 => Rotation3::identity(),
            Frame::EclipJ2000 => Rotation3::from_axis_angle(&Vector3::x_axis(), OBLIQUITY_J2000),
        }
    }

    /// Rotation taking vectors expressed in J2000 into this frame.
    pub fn rotation_from_j2000(self) -> Rotation3<f64> {
        self.rotation_to_j2000().inverse()
    }
}

impl FromStr for Frame {
    type Err = SpkStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "J2000" | "EME2000" => Ok(Frame::J2000),
            "ECLIPJ2000" => Ok(Frame::EclipJ2000),
            _ => Err(SpkStateError::UnknownFrame(s.to_string())),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod test_frames {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_names_and_ids() {
        assert_eq!("j2000".parse::<Frame>().unwrap(), Frame::J2000);
        assert_eq!(" EclipJ2000 ".parse::<Frame>().unwrap(), Frame::EclipJ2000);
        assert!(matches!(
            "IAU_EARTH".parse::<Frame>(),
            Err(SpkStateError::UnknownFrame(_))
        ));

        assert_eq!(Frame::from_id(17).unwrap(), Frame::EclipJ2000);
        assert_eq!(Frame::from_id(Frame::J2000.id()).unwrap(), Frame::J2000);
        assert!(matches!(
            Frame::from_id(10013),
            Err(SpkStateError::UnsupportedFrame(10013))
        ));
        assert_eq!(Frame::EclipJ2000.to_string(), "ECLIPJ2000");
    }

    #[test]
    fn test_ecliptic_pole() {
        // The ecliptic pole seen from J2000 is tilted toward -Y by the obliquity
        let pole = Frame::EclipJ2000.rotation_to_j2000() * Vector3::z();
        assert_relative_eq!(
            pole,
            Vector3::new(0.0, -OBLIQUITY_J2000.sin(), OBLIQUITY_J2000.cos()),
            epsilon = 1e-15
        );

        let back = Frame::EclipJ2000.rotation_from_j2000() * pole;
        assert_relative_eq!(back, Vector3::z(), epsilon = 1e-15);
    }
}
