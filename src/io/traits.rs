//! The contract between this crate and the native vendor readers that decode
//! raw files.
//!
//! Native readers are external collaborators. They implement [`SpectrumSource`]
//! and hand back loosely typed [`RawSpectrum`] records; everything downstream
//! of that is normalized by [`MSDataReader`](crate::io::MSDataReader).
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::cv;
use crate::meta::InstrumentConfiguration;
use crate::params::{Param, ParamDescribed, ParamList};
use crate::spectrum::{ScanEvent, ScanWindow};

use super::scan_index::ScanIndexError;
use super::source_kind::SourceKind;

/// The raw record of a single spectrum as the native reader produced it
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawSpectrum {
    pub native_id: String,
    pub mzs: Vec<f64>,
    pub intensities: Vec<f64>,
    /// Spectrum-level parameters
    pub params: ParamList,
    /// One parameter list per precursor
    pub precursors: Vec<ParamList>,
    pub scans: Vec<ScanEvent>,
}

impl RawSpectrum {
    pub fn new<S: Into<String>>(native_id: S) -> Self {
        Self {
            native_id: native_id.into(),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_precursor(mut self, params: ParamList) -> Self {
        self.precursors.push(params);
        self
    }

    /// Add a scan record with its parameters and a single scan window
    pub fn with_scan(mut self, params: ParamList, window: Option<(f64, f64)>) -> Self {
        let scan_windows = window
            .map(|(lo, hi)| vec![ScanWindow::new(lo, hi)])
            .unwrap_or_default();
        self.scans.push(ScanEvent {
            params,
            scan_windows,
        });
        self
    }

    pub fn with_arrays(mut self, mzs: Vec<f64>, intensities: Vec<f64>) -> Self {
        self.mzs = mzs;
        self.intensities = intensities;
        self
    }

    /// The filter string of the first scan carrying one, falling back to the
    /// spectrum-level filter string parameter
    pub fn filter_string(&self) -> &str {
        match ScanEvent::first_filter_string(&self.scans) {
            "" => self.get_value(cv::FILTER_STRING),
            text => text,
        }
    }

    /// Drop the signal arrays, keeping only metadata
    pub fn strip_arrays(&mut self) {
        self.mzs = Vec::new();
        self.intensities = Vec::new();
    }
}

/// A time series of one named channel, e.g. the total ion current
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawChromatogram {
    pub id: String,
    pub params: ParamList,
    pub times: Vec<f64>,
    pub intensities: Vec<f64>,
}

crate::impl_param_described!(RawSpectrum, RawChromatogram);

/// An error that prevents a data source from being opened at all
#[derive(Debug, Error)]
pub enum SourceOpenError {
    #[error("I/O error while opening {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not recognize the data format of {}", .0.display())]
    UnrecognizedFormat(PathBuf),
    #[error("The header of {} is corrupt or truncated: {reason}", .path.display())]
    CorruptHeader { path: PathBuf, reason: String },
    #[error("The native reader failed to open {}: {message}", .path.display())]
    Native { path: PathBuf, message: String },
}

/// An error that may arise when accessing a spectrum from a source
#[derive(Debug, Error)]
pub enum SpectrumAccessError {
    /// The source was never opened
    #[error("The data source was not opened")]
    NotOpened,
    /// An error resolving a spectrum by it's index
    #[error("The requested spectrum index {0} was not found")]
    SpectrumIndexNotFound(usize),
    /// An error resolving a spectrum by its native scan key
    #[error(transparent)]
    ScanIndex(#[from] ScanIndexError),
    /// The native reader failed to decode an existing spectrum
    #[error("Failed to read spectrum {index} ({native_id}): {message}")]
    ReadFailed {
        index: usize,
        native_id: String,
        message: String,
    },
    /// An I/O error prevented reading the spectrum, even if it could be found.
    #[error("I/O error occurred while reading: {0:?}")]
    IOError(#[source] Option<io::Error>),
}

impl From<SpectrumAccessError> for io::Error {
    fn from(value: SpectrumAccessError) -> Self {
        let s = value.to_string();
        match value {
            SpectrumAccessError::NotOpened => io::Error::new(io::ErrorKind::NotConnected, s),
            SpectrumAccessError::SpectrumIndexNotFound(_) => {
                io::Error::new(io::ErrorKind::NotFound, s)
            }
            SpectrumAccessError::ScanIndex(_) => io::Error::new(io::ErrorKind::NotFound, s),
            SpectrumAccessError::ReadFailed { .. } => io::Error::new(io::ErrorKind::InvalidData, s),
            SpectrumAccessError::IOError(e) => match e {
                Some(e) => e,
                None => io::Error::new(io::ErrorKind::Other, s),
            },
        }
    }
}

/// A native reader for one opened vendor data source.
///
/// Implementations are stateful and single-threaded. A caller that wants to
/// process scans in parallel opens one source per thread.
pub trait SpectrumSource {
    /// The vendor family the source was opened as
    fn source_kind(&self) -> SourceKind;

    /// Retrieve the number of spectra in the source
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the raw record of the spectrum at `index`. When `load_binary_data`
    /// is false the signal arrays may be left empty.
    fn read_raw(
        &mut self,
        index: usize,
        load_binary_data: bool,
    ) -> Result<RawSpectrum, SpectrumAccessError>;

    /// Read only the native id of the spectrum at `index`
    fn native_id(&mut self, index: usize) -> Result<String, SpectrumAccessError> {
        self.read_raw(index, false).map(|raw| raw.native_id)
    }

    fn chromatogram_count(&self) -> usize {
        0
    }

    fn read_chromatogram(&mut self, index: usize) -> Option<RawChromatogram> {
        let _ = index;
        None
    }

    /// The run start time exactly as the vendor reports it
    fn run_start_time(&self) -> Option<String> {
        None
    }

    fn instrument_configurations(&self) -> Vec<InstrumentConfiguration> {
        Vec::new()
    }
}

impl<T: SpectrumSource + ?Sized> SpectrumSource for Box<T> {
    fn source_kind(&self) -> SourceKind {
        (**self).source_kind()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn read_raw(
        &mut self,
        index: usize,
        load_binary_data: bool,
    ) -> Result<RawSpectrum, SpectrumAccessError> {
        (**self).read_raw(index, load_binary_data)
    }

    fn native_id(&mut self, index: usize) -> Result<String, SpectrumAccessError> {
        (**self).native_id(index)
    }

    fn chromatogram_count(&self) -> usize {
        (**self).chromatogram_count()
    }

    fn read_chromatogram(&mut self, index: usize) -> Option<RawChromatogram> {
        (**self).read_chromatogram(index)
    }

    fn run_start_time(&self) -> Option<String> {
        (**self).run_start_time()
    }

    fn instrument_configurations(&self) -> Vec<InstrumentConfiguration> {
        (**self).instrument_configurations()
    }
}
