//! Loader for binary SPK kernels.
//!
//! This module ties together the DAF file record, the linked list of summary
//! records, their name records and the per-type segment evaluators.
//!
//! # What this module does
//! 1. Reads the **DAF file record** to discover the binary layout (`ND`, `NI`,
//!    byte order, first summary record).
//! 2. Walks the **summary records** (`next` pointers) to discover segments
//!    (`target`, `center`, `frame`, `type`, addressing, time span) and reads
//!    the matching **segment names**.
//! 3. Keeps the file content in memory; segment words are decoded on demand
//!    when a state is requested.
//!
//! # Units & time scales
//! * Times are **ET/TDB seconds from J2000**.
//! * Positions are **kilometers**, velocities are **km/s**, expressed in the
//!   segment frame.

use camino::{Utf8Path, Utf8PathBuf};
use nalgebra::Vector3;
use tracing::debug;

use super::{
    array::DafArray,
    daf_header::DAFHeader,
    directory::DirectoryData,
    discrete_states::{DiscreteStates, Interpolation},
    ephemeris_record::EphemerisRecord,
    spk_type::SpkDataType,
    summary_record::Summary,
};
use crate::{
    constants::{NaifId, DAF_RECORD_BYTES, DAF_WORD_BYTES},
    spkstate_errors::SpkStateError,
};

/// One segment of an SPK file: its name and its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct SpkSegment {
    pub name: String,
    pub summary: Summary,
}

/// In-memory SPK kernel.
///
/// See also
/// ------------
/// * [`SpkFile::from_bytes`] – Index a file read by the kernel pool.
/// * [`SpkFile::find_segment`] – Segment selection for a body and an epoch.
/// * [`SpkFile::evaluate`] – State of a segment's target relative to its center.
#[derive(Debug, Clone)]
pub struct SpkFile {
    path: Utf8PathBuf,
    header: DAFHeader,
    segments: Vec<SpkSegment>,
    bytes: Vec<u8>,
}

impl SpkFile {
    /// Index an SPK file already held in memory.
    pub fn from_bytes(
        path: impl Into<Utf8PathBuf>,
        bytes: Vec<u8>,
    ) -> Result<Self, SpkStateError> {
        let path = path.into();

        let (_, header) = DAFHeader::parse(&bytes)
            .map_err(|_| SpkStateError::invalid_daf(&path, "truncated DAF file record"))?;

        if header.idword != "DAF/SPK" && header.idword != "NAIF/DAF" {
            return Err(SpkStateError::invalid_daf(
                &path,
                format!("'{}' is not an SPK file", header.idword),
            ));
        }
        if header.nd != 2 || header.ni != 6 {
            return Err(SpkStateError::invalid_daf(
                &path,
                format!("ND = {}, NI = {} is not an SPK layout", header.nd, header.ni),
            ));
        }

        let segments = SpkFile::read_summaries(&path, &header, &bytes)?;
        for segment in &segments {
            debug!(kernel = %path, name = %segment.name, "segment {}", segment.summary);
        }

        Ok(SpkFile {
            path,
            header,
            segments,
            bytes,
        })
    }

    /// Walk the doubly linked list of summary records from `fward`.
    fn read_summaries(
        path: &Utf8Path,
        header: &DAFHeader,
        bytes: &[u8],
    ) -> Result<Vec<SpkSegment>, SpkStateError> {
        let order = header.byte_order;
        let summary_bytes = header.summary_words() * DAF_WORD_BYTES;
        let name_bytes = summary_bytes;
        let max_hops = bytes.len() / DAF_RECORD_BYTES + 1;

        let mut segments = Vec::new();
        let mut record = header.fward;
        let mut hops = 0;

        while record > 0 {
            hops += 1;
            if hops > max_hops {
                return Err(SpkStateError::invalid_daf(
                    path,
                    "summary record list does not terminate",
                ));
            }

            let offset = (record as usize - 1) * DAF_RECORD_BYTES;
            let summary_record = bytes
                .get(offset..offset + DAF_RECORD_BYTES)
                .ok_or_else(|| {
                    SpkStateError::invalid_daf(path, format!("summary record {record} is missing"))
                })?;
            let name_record = bytes.get(offset + DAF_RECORD_BYTES..offset + 2 * DAF_RECORD_BYTES);

            // Control words: next record, previous record, number of summaries
            let control = (|| {
                let (input, next) = order.f64(summary_record)?;
                let (input, _prev) = order.f64(input)?;
                let (_, nsum) = order.f64(input)?;
                Ok::<_, nom::Err<nom::error::Error<&[u8]>>>((next, nsum))
            })();
            let (next, nsum) = control.map_err(|_| {
                SpkStateError::invalid_daf(path, format!("summary record {record} is truncated"))
            })?;

            let nsum = nsum.max(0.0) as usize;
            if 3 * DAF_WORD_BYTES + nsum * summary_bytes > DAF_RECORD_BYTES {
                return Err(SpkStateError::invalid_daf(
                    path,
                    format!("summary record {record} announces {nsum} summaries"),
                ));
            }

            for i in 0..nsum {
                let start = 3 * DAF_WORD_BYTES + i * summary_bytes;
                let (_, summary) =
                    Summary::parse(&summary_record[start..start + summary_bytes], order)
                        .map_err(|_| {
                            SpkStateError::invalid_daf(path, format!("summary {i} is truncated"))
                        })?;

                let name = name_record
                    .and_then(|names| names.get(i * name_bytes..(i + 1) * name_bytes))
                    .map(|raw| String::from_utf8_lossy(raw).trim_end().to_string())
                    .unwrap_or_default();

                segments.push(SpkSegment { name, summary });
            }

            record = next as i32;
        }

        Ok(segments)
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn header(&self) -> &DAFHeader {
        &self.header
    }

    pub fn segments(&self) -> &[SpkSegment] {
        &self.segments
    }

    /// Find the segment providing `target` at `et`.
    ///
    /// Segments later in the file take precedence over earlier ones.
    pub fn find_segment(&self, target: NaifId, et: f64) -> Option<&SpkSegment> {
        self.segments
            .iter()
            .rev()
            .find(|segment| segment.summary.target == target && segment.summary.covers(et))
    }

    /// State of a segment's target relative to its center, in the segment frame.
    ///
    /// Arguments
    /// -----------------
    /// * `segment`: A segment of this file.
    /// * `et`: Epoch in ET seconds; should lie in the segment coverage.
    ///
    /// Return
    /// ----------
    /// * `(position [km], velocity [km/s])`, or an error if the segment type is
    ///   not supported or the segment data are inconsistent.
    pub fn evaluate(
        &self,
        segment: &SpkSegment,
        et: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), SpkStateError> {
        let data_type = SpkDataType::try_from(segment)?;
        let array = DafArray::new(
            &self.bytes,
            self.header.byte_order,
            &segment.summary,
            &segment.name,
        )?;

        match data_type {
            SpkDataType::ChebyshevPosition | SpkDataType::ChebyshevState => {
                let directory = DirectoryData::parse(&array)?;
                let with_velocity = data_type == SpkDataType::ChebyshevState;
                let record = EphemerisRecord::read(&array, &directory, et, with_velocity)?;
                Ok(record.interpolate(et))
            }
            SpkDataType::LagrangeEqual => {
                DiscreteStates::equal_spacing(&array, Interpolation::Lagrange)?
                    .interpolate(&array, et)
            }
            SpkDataType::LagrangeUnequal => {
                DiscreteStates::unequal_spacing(&array, Interpolation::Lagrange)?
                    .interpolate(&array, et)
            }
            SpkDataType::HermiteEqual => {
                DiscreteStates::equal_spacing(&array, Interpolation::Hermite)?
                    .interpolate(&array, et)
            }
            SpkDataType::HermiteUnequal => {
                DiscreteStates::unequal_spacing(&array, Interpolation::Hermite)?
                    .interpolate(&array, et)
            }
        }
    }
}
