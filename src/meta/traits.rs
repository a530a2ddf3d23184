use super::{InstrumentConfiguration, InstrumentDescription, MassSpectrometryRun, RunStartTime};

/// Mass spectrometry data files have specific metadata that describe them, independent of the spectra
pub trait MSDataFileMetadata {
    /// The instrument configurations the source declares, in declaration order
    fn instrument_configurations(&self) -> &[InstrumentConfiguration];

    fn run_description(&self) -> Option<&MassSpectrometryRun>;

    /// One description per instrument configuration
    fn instrument_descriptions(&self) -> Vec<InstrumentDescription> {
        self.instrument_configurations()
            .iter()
            .map(|c| c.describe())
            .collect()
    }

    /// The first non-empty serial number across the instrument configurations,
    /// or an empty string
    fn serial_number(&self) -> String {
        self.instrument_configurations()
            .iter()
            .map(|c| c.serial_number())
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    fn run_start_time(&self) -> Option<&RunStartTime> {
        self.run_description().and_then(|r| r.start_time.as_ref())
    }
}
