//! Segment types this crate evaluates.

use super::spk_file::SpkSegment;
use crate::spkstate_errors::SpkStateError;

/// Evaluator family of an SPK segment, keyed by its NAIF data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpkDataType {
    /// Type 2, Chebyshev position coefficients.
    ChebyshevPosition,
    /// Type 3, Chebyshev position and velocity coefficients.
    ChebyshevState,
    /// Type 8, Lagrange over equally spaced states.
    LagrangeEqual,
    /// Type 9, Lagrange over an epoch list.
    LagrangeUnequal,
    /// Type 12, Hermite over equally spaced states.
    HermiteEqual,
    /// Type 13, Hermite over an epoch list.
    HermiteUnequal,
}

impl SpkDataType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            2 => Some(SpkDataType::ChebyshevPosition),
            3 => Some(SpkDataType::ChebyshevState),
            8 => Some(SpkDataType::LagrangeEqual),
            9 => Some(SpkDataType::LagrangeUnequal),
            12 => Some(SpkDataType::HermiteEqual),
            13 => Some(SpkDataType::HermiteUnequal),
            _ => None,
        }
    }
}

impl TryFrom<&SpkSegment> for SpkDataType {
    type Error = SpkStateError;

    fn try_from(segment: &SpkSegment) -> Result<Self, Self::Error> {
        SpkDataType::from_code(segment.summary.data_type).ok_or_else(|| {
            SpkStateError::UnsupportedSpkType {
                data_type: segment.summary.data_type,
                segment: segment.name.clone(),
            }
        })
    }
}
