use crate::meta::InstrumentConfiguration;

use super::source_kind::SourceKind;
use super::traits::{RawChromatogram, RawSpectrum, SpectrumAccessError, SpectrumSource};

#[derive(Debug, Clone)]
enum Entry {
    Readable(RawSpectrum),
    Unreadable { native_id: String, message: String },
}

/// A collection of raw spectra held in memory but providing an interface
/// identical to a native reader. Records are cloned on each read.
///
/// Entries may be marked unreadable to stand in for spectra the native reader
/// fails to decode.
#[derive(Debug, Clone)]
pub struct MemorySource {
    kind: SourceKind,
    entries: Vec<Entry>,
    chromatograms: Vec<RawChromatogram>,
    start_time: Option<String>,
    instrument_configurations: Vec<InstrumentConfiguration>,
}

impl MemorySource {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            chromatograms: Vec::new(),
            start_time: None,
            instrument_configurations: Vec::new(),
        }
    }

    pub fn push(&mut self, spectrum: RawSpectrum) {
        self.entries.push(Entry::Readable(spectrum));
    }

    /// Add a spectrum whose native id can be read but whose body fails to decode
    pub fn push_failure<S: Into<String>, M: Into<String>>(&mut self, native_id: S, message: M) {
        self.entries.push(Entry::Unreadable {
            native_id: native_id.into(),
            message: message.into(),
        });
    }

    pub fn with_run_start_time<S: Into<String>>(mut self, start_time: S) -> Self {
        self.start_time = Some(start_time.into());
        self
    }

    pub fn with_instrument_configuration(mut self, config: InstrumentConfiguration) -> Self {
        self.instrument_configurations.push(config);
        self
    }

    pub fn with_chromatogram(mut self, chromatogram: RawChromatogram) -> Self {
        self.chromatograms.push(chromatogram);
        self
    }
}

impl FromIterator<RawSpectrum> for MemorySource {
    /// Collect into a Thermo-flavored source
    fn from_iter<T: IntoIterator<Item = RawSpectrum>>(iter: T) -> Self {
        let mut this = Self::new(SourceKind::Thermo);
        iter.into_iter().for_each(|s| this.push(s));
        this
    }
}

impl SpectrumSource for MemorySource {
    fn source_kind(&self) -> SourceKind {
        self.kind
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn read_raw(
        &mut self,
        index: usize,
        load_binary_data: bool,
    ) -> Result<RawSpectrum, SpectrumAccessError> {
        match self.entries.get(index) {
            Some(Entry::Readable(spectrum)) => {
                let mut spectrum = spectrum.clone();
                if !load_binary_data {
                    spectrum.strip_arrays();
                }
                Ok(spectrum)
            }
            Some(Entry::Unreadable { native_id, message }) => Err(SpectrumAccessError::ReadFailed {
                index,
                native_id: native_id.clone(),
                message: message.clone(),
            }),
            None => Err(SpectrumAccessError::SpectrumIndexNotFound(index)),
        }
    }

    fn native_id(&mut self, index: usize) -> Result<String, SpectrumAccessError> {
        match self.entries.get(index) {
            Some(Entry::Readable(spectrum)) => Ok(spectrum.native_id.clone()),
            Some(Entry::Unreadable { native_id, .. }) => Ok(native_id.clone()),
            None => Err(SpectrumAccessError::SpectrumIndexNotFound(index)),
        }
    }

    fn chromatogram_count(&self) -> usize {
        self.chromatograms.len()
    }

    fn read_chromatogram(&mut self, index: usize) -> Option<RawChromatogram> {
        self.chromatograms.get(index).cloned()
    }

    fn run_start_time(&self) -> Option<String> {
        self.start_time.clone()
    }

    fn instrument_configurations(&self) -> Vec<InstrumentConfiguration> {
        self.instrument_configurations.clone()
    }
}
