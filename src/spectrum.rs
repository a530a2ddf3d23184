//! The normalized in-memory representation of a mass spectrum and the records
//! that describe how it was acquired.
pub mod scan_properties;
#[allow(clippy::module_inception)]
pub mod spectrum;

pub use crate::spectrum::scan_properties::{
    activation_tag, Precursor, ScanEvent, ScanPolarity, ScanWindow, SpectrumScanInfo,
};
pub use crate::spectrum::spectrum::{Spectrum, RETENTION_TIME_TOLERANCE};
