/// How much of each spectrum to decode when reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DetailLevel {
    /// Read the metadata and the signal arrays
    #[default]
    Full,
    /// Read only the metadata, leaving the signal arrays empty
    MetadataOnly,
}

/// Options controlling how an [`MSDataReader`](crate::io::MSDataReader)
/// normalizes the spectra of its source
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReaderOptions {
    /// Report every MS1 spectrum as centroided, trusting the vendor's centroiding
    pub require_vendor_centroided_ms1: bool,
    /// Report every MSn spectrum as centroided
    pub require_vendor_centroided_ms2: bool,
    pub detail_level: DetailLevel,
    /// Remember filter classifications per spectrum index once computed
    pub cache_classifications: bool,
    /// Keep precursor m/z values in generic filter strings
    pub include_precursor_mz: bool,
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_vendor_centroided_ms1(mut self, value: bool) -> Self {
        self.require_vendor_centroided_ms1 = value;
        self
    }

    pub fn require_vendor_centroided_ms2(mut self, value: bool) -> Self {
        self.require_vendor_centroided_ms2 = value;
        self
    }

    pub fn detail_level(mut self, detail_level: DetailLevel) -> Self {
        self.detail_level = detail_level;
        self
    }

    pub fn cache_classifications(mut self, value: bool) -> Self {
        self.cache_classifications = value;
        self
    }

    pub fn include_precursor_mz(mut self, value: bool) -> Self {
        self.include_precursor_mz = value;
        self
    }

    /// Whether a spectrum at `ms_level` must be reported as centroided regardless of what the source says
    pub fn forces_centroid(&self, ms_level: u8) -> bool {
        if ms_level > 1 {
            self.require_vendor_centroided_ms2
        } else {
            self.require_vendor_centroided_ms1
        }
    }

    pub fn load_binary_data(&self) -> bool {
        matches!(self.detail_level, DetailLevel::Full)
    }
}
