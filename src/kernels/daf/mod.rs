//! Binary DAF/SPK reader.
//!
//! Only the pieces needed to evaluate SPK segments are exposed; the
//! record-level parsers stay private to this module.

mod array;
pub mod daf_header;
mod directory;
mod discrete_states;
mod ephemeris_record;
pub mod spk_file;
pub mod spk_type;
pub mod summary_record;

pub use discrete_states::{hermite, lagrange};
pub use ephemeris_record::chebyshev;
pub use spk_file::{SpkFile, SpkSegment};
pub use spk_type::SpkDataType;
pub use summary_record::Summary;
