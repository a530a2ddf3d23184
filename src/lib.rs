//! `mzscan` normalizes the spectra, scan identities and acquisition
//! descriptions of vendor mass spectrometry data.
//!
//! Native vendor readers implement [`io::SpectrumSource`]. An
//! [`MSDataReader`] wraps one, maps native scan identities to dense indices,
//! assembles [`Spectrum`] records from their CV parameters, and classifies
//! their filter strings with [`filter`].
//!
//! ```
//! use mzscan::filter::parse_filter_text;
//!
//! let classification = parse_filter_text(
//!     "ITMS + c NSI r d sa Full ms2 538.8400@etd53.58@cid20.00 [120.0000-1627.0000]",
//! );
//! assert_eq!(classification.scan_type_tag, "ETciD-MSn");
//! assert_eq!(classification.ms_level, 2);
//! ```
pub mod cv;
pub mod filter;
pub mod io;
pub mod meta;
pub mod params;
pub mod prelude;
pub mod spectrum;

pub use crate::filter::{make_generic_filter, parse_filter_text, ScanFilterClassification};
pub use crate::io::{MSDataReader, ReaderOptions, ScanKey, ScanToIndexMap, SourceKind};
pub use crate::params::{Param, ParamDescribed, ParamList};
pub use crate::spectrum::{Precursor, Spectrum, SpectrumScanInfo};
