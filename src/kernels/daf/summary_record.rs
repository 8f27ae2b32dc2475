use std::fmt;

use nom::IResult;

use super::daf_header::ByteOrder;
use crate::{constants::NaifId, time::Et};

/// Descriptor of one SPK segment, as stored in a DAF summary record.
///
/// Addresses are 1-based DAF word addresses, inclusive on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub start_epoch: f64,
    pub end_epoch: f64,
    pub target: NaifId,
    pub center: NaifId,
    pub frame_id: i32,
    pub data_type: i32,
    pub initial_addr: i32,
    pub final_addr: i32,
}

impl Summary {
    pub fn parse(input: &[u8], order: ByteOrder) -> IResult<&[u8], Self> {
        let (input, start_epoch) = order.f64(input)?;
        let (input, end_epoch) = order.f64(input)?;

        let (input, target) = order.i32(input)?;
        let (input, center) = order.i32(input)?;
        let (input, frame_id) = order.i32(input)?;
        let (input, data_type) = order.i32(input)?;
        let (input, initial_addr) = order.i32(input)?;
        let (input, final_addr) = order.i32(input)?;
        Ok((
            input,
            Summary {
                start_epoch,
                end_epoch,
                target,
                center,
                frame_id,
                data_type,
                initial_addr,
                final_addr,
            },
        ))
    }

    /// Whether `et` falls inside the segment coverage (bounds included).
    pub fn covers(&self, et: f64) -> bool {
        et >= self.start_epoch && et <= self.end_epoch
    }

    /// Number of DAF words in the segment.
    pub fn word_count(&self) -> usize {
        (self.final_addr - self.initial_addr + 1).max(0) as usize
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "target {} wrt {} frame {} type {} [{} .. {}]",
            self.target,
            self.center,
            self.frame_id,
            self.data_type,
            Et(self.start_epoch),
            Et(self.end_epoch),
        )
    }
}

#[cfg(test)]
mod test_summary {
    use super::*;

    fn summary_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-14200747200.0f64).to_le_bytes());
        bytes.extend_from_slice(&20514081600.0f64.to_le_bytes());
        for v in [3, 0, 1, 2, 3021513, 4051108] {
            bytes.extend_from_slice(&i32::to_le_bytes(v));
        }
        bytes
    }

    #[test]
    fn test_summary_parse() {
        let bytes = summary_bytes();
        let (rest, summary) = Summary::parse(&bytes, ByteOrder::Little).unwrap();

        assert!(rest.is_empty());
        assert_eq!(
            summary,
            Summary {
                start_epoch: -14200747200.0,
                end_epoch: 20514081600.0,
                target: 3,
                center: 0,
                frame_id: 1,
                data_type: 2,
                initial_addr: 3021513,
                final_addr: 4051108,
            }
        );
        assert_eq!(summary.word_count(), 1029596);
    }

    #[test]
    fn test_summary_coverage() {
        let bytes = summary_bytes();
        let (_, summary) = Summary::parse(&bytes, ByteOrder::Little).unwrap();

        assert!(summary.covers(0.0));
        assert!(summary.covers(summary.end_epoch));
        assert!(!summary.covers(summary.end_epoch + 1.0));
        assert!(!summary.covers(-2.0e10));
    }

    #[test]
    fn test_summary_truncated() {
        let bytes = summary_bytes();
        assert!(Summary::parse(&bytes[..30], ByteOrder::Little).is_err());
    }

    #[test]
    fn test_display_with_non_finite_epochs() {
        let bytes = summary_bytes();
        let (_, mut summary) = Summary::parse(&bytes, ByteOrder::Little).unwrap();
        summary.start_epoch = f64::NAN;
        summary.end_epoch = f64::INFINITY;

        assert_eq!(
            summary.to_string(),
            "target 3 wrt 0 frame 1 type 2 [NaN s past J2000 TDB .. inf s past J2000 TDB]"
        );
    }
}
