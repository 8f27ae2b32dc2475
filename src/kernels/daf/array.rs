//! Word-addressed view over one DAF array (an SPK segment).
//!
//! DAF addresses count **double-precision words (8-byte units)** starting at 1.
//! An array occupies the inclusive address range `initial_addr ..= final_addr`
//! given by its summary. [`DafArray`] exposes that range with 0-based indices
//! and decodes words lazily, so segments of large planetary kernels are never
//! copied as a whole.

use super::{daf_header::ByteOrder, summary_record::Summary};
use crate::{constants::DAF_WORD_BYTES, spkstate_errors::SpkStateError};

#[derive(Debug, Clone, Copy)]
pub struct DafArray<'a> {
    bytes: &'a [u8],
    order: ByteOrder,
    /// Byte offset of the first word of the array inside `bytes`.
    offset: usize,
    len: usize,
    segment: &'a str,
}

impl<'a> DafArray<'a> {
    /// Build a view over the array described by `summary`.
    ///
    /// Arguments
    /// -----------------
    /// * `bytes`: Full content of the DAF file.
    /// * `order`: Byte order of the file.
    /// * `summary`: Segment descriptor holding the array addresses.
    /// * `segment`: Segment name, used in error messages.
    ///
    /// Return
    /// ----------
    /// * The view, or [`SpkStateError::CorruptedSegment`] if the addresses fall
    ///   outside the file.
    pub fn new(
        bytes: &'a [u8],
        order: ByteOrder,
        summary: &Summary,
        segment: &'a str,
    ) -> Result<Self, SpkStateError> {
        if summary.initial_addr < 1 || summary.final_addr < summary.initial_addr {
            return Err(SpkStateError::CorruptedSegment {
                segment: segment.to_string(),
                reason: format!(
                    "invalid address range {}..={}",
                    summary.initial_addr, summary.final_addr
                ),
            });
        }

        let offset = (summary.initial_addr as usize - 1) * DAF_WORD_BYTES;
        let len = summary.word_count();
        if offset + len * DAF_WORD_BYTES > bytes.len() {
            return Err(SpkStateError::CorruptedSegment {
                segment: segment.to_string(),
                reason: format!(
                    "address {} lies beyond the end of the file",
                    summary.final_addr
                ),
            });
        }

        Ok(DafArray {
            bytes,
            order,
            offset,
            len,
            segment,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decode the word at 0-based `index`.
    pub fn word(&self, index: usize) -> Result<f64, SpkStateError> {
        if index >= self.len {
            return Err(self.corrupted(format!(
                "word {index} requested from an array of {} words",
                self.len
            )));
        }
        let start = self.offset + index * DAF_WORD_BYTES;
        let mut raw = [0u8; DAF_WORD_BYTES];
        raw.copy_from_slice(&self.bytes[start..start + DAF_WORD_BYTES]);
        Ok(self.order.word(raw))
    }

    /// Decode `count` consecutive words starting at 0-based `start`.
    pub fn words(&self, start: usize, count: usize) -> Result<Vec<f64>, SpkStateError> {
        (start..start + count).map(|i| self.word(i)).collect()
    }

    /// Decode the trailing `N` words of the array (segment directories live there).
    pub fn trailer<const N: usize>(&self) -> Result<[f64; N], SpkStateError> {
        if self.len < N {
            return Err(self.corrupted(format!("array too short for a {N}-word trailer")));
        }
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.word(self.len - N + i)?;
        }
        Ok(out)
    }

    pub(crate) fn corrupted(&self, reason: impl Into<String>) -> SpkStateError {
        SpkStateError::CorruptedSegment {
            segment: self.segment.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod test_daf_array {
    use super::*;

    fn summary(initial_addr: i32, final_addr: i32) -> Summary {
        Summary {
            start_epoch: 0.0,
            end_epoch: 1.0,
            target: -170,
            center: 10,
            frame_id: 1,
            data_type: 13,
            initial_addr,
            final_addr,
        }
    }

    fn file_bytes() -> Vec<u8> {
        (1..=6)
            .flat_map(|v| (v as f64 * 1.5).to_le_bytes())
            .collect()
    }

    #[test]
    fn test_words_are_one_based_addresses() {
        let bytes = file_bytes();
        let array = DafArray::new(&bytes, ByteOrder::Little, &summary(2, 5), "test").unwrap();

        assert_eq!(array.len(), 4);
        assert_eq!(array.word(0).unwrap(), 3.0);
        assert_eq!(array.words(1, 2).unwrap(), vec![4.5, 6.0]);
        assert_eq!(array.trailer::<2>().unwrap(), [6.0, 7.5]);
        assert!(array.word(4).is_err());
    }

    #[test]
    fn test_array_outside_file_is_rejected() {
        let bytes = file_bytes();
        let err = DafArray::new(&bytes, ByteOrder::Little, &summary(4, 9), "test").unwrap_err();
        assert!(matches!(err, SpkStateError::CorruptedSegment { .. }));

        let err = DafArray::new(&bytes, ByteOrder::Little, &summary(0, 2), "test").unwrap_err();
        assert!(matches!(err, SpkStateError::CorruptedSegment { .. }));
    }
}
