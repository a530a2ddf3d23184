use std::collections::HashMap;
use std::path::Path;

use crate::cv;
use crate::filter::{FilterParser, ScanFilterClassification, ScanTypeSummary};
use crate::meta::{
    InstrumentConfiguration, MSDataFileMetadata, MassSpectrometryRun, RunStartTime,
};
use crate::params::ParamDescribed;
use crate::spectrum::{Precursor, ScanPolarity, Spectrum, SpectrumScanInfo};

use super::options::ReaderOptions;
use super::scan_index::{ScanKey, ScanToIndexMap};
use super::source_kind::SourceKind;
use super::traits::{RawSpectrum, SourceOpenError, SpectrumAccessError, SpectrumSource};

/// The relative difference tolerated between a total ion current chromatogram
/// point and the total ion current of the matching spectrum
pub const TIC_RELATIVE_TOLERANCE: f64 = 1e-3;

/// The outcome of [`MSDataReader::check_tic_chromatogram`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TicComparison {
    pub chromatogram_points: usize,
    pub spectrum_count: usize,
    /// Indices whose spectrum total ion current disagrees with the chromatogram
    pub mismatches: Vec<usize>,
}

impl TicComparison {
    pub fn is_consistent(&self) -> bool {
        self.chromatogram_points == self.spectrum_count && self.mismatches.is_empty()
    }
}

/// Normalizes the spectra of one vendor data source.
///
/// The reader owns its [`SpectrumSource`] and releases it when dropped. A
/// source that failed to open produces an empty reader whose
/// [`MSDataReader::open_error`] says why, so callers can tell it apart from a
/// source that opened with zero spectra.
#[derive(Debug)]
pub struct MSDataReader<S: SpectrumSource> {
    source: Option<S>,
    options: ReaderOptions,
    scan_index: ScanToIndexMap,
    open_error: Option<SourceOpenError>,
    run: MassSpectrometryRun,
    instrument_configurations: Vec<InstrumentConfiguration>,
    classification_cache: HashMap<usize, ScanFilterClassification>,
}

impl<S: SpectrumSource> MSDataReader<S> {
    /// Wrap an opened source, building its scan index
    pub fn new(mut source: S, options: ReaderOptions) -> Self {
        let kind = source.source_kind();
        let scan_index = ScanToIndexMap::build(&mut source);
        if !scan_index.is_total() {
            log::warn!(
                "Only {} of {} spectra have a scan key",
                scan_index.len(),
                scan_index.spectrum_count()
            );
        }

        let start_time = source.run_start_time().and_then(|text| {
            let parsed = RunStartTime::parse(&text, kind.start_time_convention());
            if parsed.is_none() {
                log::warn!("Failed to parse the run start time {text:?}");
            }
            parsed
        });
        let instrument_configurations = source.instrument_configurations();
        let run = MassSpectrometryRun::new(
            Some(kind),
            start_time,
            instrument_configurations.first().map(|c| c.id),
        );

        Self {
            source: Some(source),
            options,
            scan_index,
            open_error: None,
            run,
            instrument_configurations,
            classification_cache: HashMap::new(),
        }
    }

    /// An empty reader recording why its source could not be opened
    pub fn from_error(error: SourceOpenError, options: ReaderOptions) -> Self {
        Self {
            source: None,
            options,
            scan_index: ScanToIndexMap::new(),
            open_error: Some(error),
            run: MassSpectrometryRun::default(),
            instrument_configurations: Vec::new(),
            classification_cache: HashMap::new(),
        }
    }

    pub fn from_open_result(result: Result<S, SourceOpenError>, options: ReaderOptions) -> Self {
        match result {
            Ok(source) => Self::new(source, options),
            Err(error) => {
                log::error!("{error}");
                Self::from_error(error, options)
            }
        }
    }

    /// Infer the [`SourceKind`] of `path` and open it with `opener`.
    ///
    /// This never fails. When the path is unrecognized or the opener fails the
    /// error is logged once and the reader is empty.
    pub fn open_path<P, F>(path: P, options: ReaderOptions, opener: F) -> Self
    where
        P: AsRef<Path>,
        F: FnOnce(&Path, SourceKind, &ReaderOptions) -> Result<S, SourceOpenError>,
    {
        let path = path.as_ref();
        let result =
            SourceKind::infer_from_path(path).and_then(|kind| opener(path, kind, &options));
        Self::from_open_result(result, options)
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    pub fn open_error(&self) -> Option<&SourceOpenError> {
        self.open_error.as_ref()
    }

    pub fn source_kind(&self) -> Option<SourceKind> {
        self.source.as_ref().map(|s| s.source_kind())
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// The number of spectra in the source, `0` when it failed to open
    pub fn spectrum_count(&self) -> usize {
        self.source.as_ref().map(|s| s.len()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.spectrum_count()
    }

    pub fn is_empty(&self) -> bool {
        self.spectrum_count() == 0
    }

    pub fn get_scan_to_index_mapping(&self) -> &ScanToIndexMap {
        &self.scan_index
    }

    /// Resolve a scan key to its spectrum index
    pub fn index_of(&self, key: &ScanKey) -> Result<usize, SpectrumAccessError> {
        Ok(self.scan_index.index_of(key)?)
    }

    pub fn into_inner(self) -> Option<S> {
        self.source
    }

    fn read_raw(
        &mut self,
        index: usize,
        load_binary_data: bool,
    ) -> Result<RawSpectrum, SpectrumAccessError> {
        let source = self.source.as_mut().ok_or(SpectrumAccessError::NotOpened)?;
        if index >= source.len() {
            return Err(SpectrumAccessError::SpectrumIndexNotFound(index));
        }
        source.read_raw(index, load_binary_data)
    }

    fn assemble(&self, index: usize, raw: RawSpectrum, load_binary_data: bool) -> Spectrum {
        let level = match u8::try_from(raw.get_value_as_i64(cv::MS_LEVEL)) {
            Ok(level) if level >= 1 => level,
            _ => {
                log::debug!("Spectrum {index} has no usable MS level, assuming 1");
                1
            }
        };

        let centroided =
            self.options.forces_centroid(level) || raw.has_param(cv::CENTROID_SPECTRUM);

        let first_scan = raw.scans.first();
        let polarity = match ScanPolarity::from_params(&raw.params) {
            ScanPolarity::Unknown => first_scan
                .map(|s| ScanPolarity::from_params(&s.params))
                .unwrap_or_default(),
            polarity => polarity,
        };
        let retention_time = first_scan.map(|s| s.start_time()).unwrap_or_default();
        let ion_mobility = first_scan.and_then(|s| s.ion_mobility());

        let scan_key = self
            .scan_index
            .key_of(index)
            .ok()
            .or_else(|| ScanKey::from_native_id(&raw.native_id));
        let id = match (&scan_key, self.source_kind()) {
            (Some(key), Some(kind)) => kind.format_id(key),
            _ => raw.native_id.clone(),
        };

        let RawSpectrum {
            native_id,
            mut mzs,
            mut intensities,
            precursors,
            ..
        } = raw;

        if !load_binary_data {
            mzs.clear();
            intensities.clear();
        } else if mzs.len() != intensities.len() {
            let n = mzs.len().min(intensities.len());
            log::warn!(
                "Spectrum {index} ({native_id}) has {} m/z values and {} intensities, truncating to {n}",
                mzs.len(),
                intensities.len()
            );
            mzs.truncate(n);
            intensities.truncate(n);
        }

        let precursors: Vec<Precursor> =
            precursors.into_iter().map(Precursor::from_params).collect();

        Spectrum {
            id,
            native_id,
            index,
            scan_key,
            level,
            retention_time,
            ion_mobility,
            centroided,
            polarity,
            negative_charge: polarity == ScanPolarity::Negative,
            mzs,
            intensities,
            precursors,
        }
    }

    /// Read and normalize the spectrum at `index`. When `load_binary_data` is
    /// false the signal arrays are empty.
    pub fn get_spectrum(
        &mut self,
        index: usize,
        load_binary_data: bool,
    ) -> Result<Spectrum, SpectrumAccessError> {
        let raw = self.read_raw(index, load_binary_data)?;
        Ok(self.assemble(index, raw, load_binary_data))
    }

    pub fn get_spectrum_by_key(
        &mut self,
        key: &ScanKey,
        load_binary_data: bool,
    ) -> Result<Spectrum, SpectrumAccessError> {
        let index = self.index_of(key)?;
        self.get_spectrum(index, load_binary_data)
    }

    pub fn get_precursors(&mut self, index: usize) -> Result<Vec<Precursor>, SpectrumAccessError> {
        let raw = self.read_raw(index, false)?;
        Ok(raw
            .precursors
            .into_iter()
            .map(Precursor::from_params)
            .collect())
    }

    /// The scan records of the spectrum at `index` with their scan windows
    pub fn get_spectrum_scan_info(
        &mut self,
        index: usize,
    ) -> Result<SpectrumScanInfo, SpectrumAccessError> {
        let raw = self.read_raw(index, false)?;
        Ok(SpectrumScanInfo { scans: raw.scans })
    }

    /// The filter string of the spectrum at `index`, empty when it has none
    pub fn get_scan_filter_text(&mut self, index: usize) -> Result<String, SpectrumAccessError> {
        let raw = self.read_raw(index, false)?;
        Ok(raw.filter_string().to_string())
    }

    fn classify_raw(&self, raw: &RawSpectrum, include_precursor_mz: bool) -> ScanFilterClassification {
        let isolation_width = raw
            .precursors
            .first()
            .and_then(|params| Precursor::from_params(params.clone()).isolation_width());
        FilterParser::new()
            .include_precursor_mz(include_precursor_mz)
            .isolation_width(isolation_width)
            .parse(raw.filter_string())
    }

    /// Classify the filter string of the spectrum at `index`, using the
    /// isolation width of its first precursor for the DIA decision.
    pub fn classify_scan(
        &mut self,
        index: usize,
    ) -> Result<ScanFilterClassification, SpectrumAccessError> {
        if let Some(hit) = self.classification_cache.get(&index) {
            return Ok(hit.clone());
        }
        let raw = self.read_raw(index, false)?;
        let classification = self.classify_raw(&raw, self.options.include_precursor_mz);
        if self.options.cache_classifications {
            self.classification_cache
                .insert(index, classification.clone());
        }
        Ok(classification)
    }

    fn log_skipped(&mut self, index: usize, error: &SpectrumAccessError) {
        let native_id = match error {
            SpectrumAccessError::ReadFailed { native_id, .. } => native_id.clone(),
            _ => self
                .source
                .as_mut()
                .and_then(|s| s.native_id(index).ok())
                .unwrap_or_default(),
        };
        log::warn!("Skipping spectrum {index} ({native_id}): {error}");
    }

    /// Iterate over every readable spectrum in index order. Spectra that fail
    /// to read are logged and skipped.
    pub fn iter_spectra(&mut self, load_binary_data: bool) -> SpectrumIter<'_, S> {
        SpectrumIter {
            reader: self,
            index: 0,
            load_binary_data,
        }
    }

    /// Classify and tally every readable spectrum, cross-checking each against
    /// its own MS level and precursor collision energy.
    pub fn summarize_scan_types(&mut self, include_precursor_mz: bool) -> ScanTypeSummary {
        let mut summary = ScanTypeSummary::new();
        for index in 0..self.spectrum_count() {
            match self.read_raw(index, false) {
                Ok(raw) => {
                    let classification = self.classify_raw(&raw, include_precursor_mz);
                    let spectrum = self.assemble(index, raw, false);
                    summary.accumulate_spectrum(&spectrum, &classification);
                }
                Err(e) => self.log_skipped(index, &e),
            }
        }
        log::debug!(
            "Summarized {} spectra into {} scan types",
            summary.total(),
            summary.len()
        );
        summary
    }

    /// Compare the source's total ion current chromatogram with the total ion
    /// current recorded on each spectrum. `None` when there is no such chromatogram.
    pub fn check_tic_chromatogram(&mut self) -> Option<TicComparison> {
        let source = self.source.as_mut()?;
        let tic = (0..source.chromatogram_count())
            .filter_map(|i| source.read_chromatogram(i))
            .find(|c| c.has_param(cv::TOTAL_ION_CURRENT_CHROMATOGRAM))?;

        let mut comparison = TicComparison {
            chromatogram_points: tic.intensities.len(),
            spectrum_count: self.spectrum_count(),
            mismatches: Vec::new(),
        };
        let n = comparison.chromatogram_points.min(comparison.spectrum_count);
        for (index, expected) in tic.intensities.iter().copied().enumerate().take(n) {
            let raw = match self.read_raw(index, false) {
                Ok(raw) => raw,
                Err(e) => {
                    self.log_skipped(index, &e);
                    continue;
                }
            };
            let Some(observed) = raw.get_value_as_f64_opt(cv::TOTAL_ION_CURRENT) else {
                continue;
            };
            if (observed - expected).abs() > TIC_RELATIVE_TOLERANCE * expected.abs().max(1.0) {
                comparison.mismatches.push(index);
            }
        }
        if !comparison.is_consistent() {
            log::warn!(
                "Total ion current chromatogram disagrees with spectra: {} points for {} spectra, {} mismatched",
                comparison.chromatogram_points,
                comparison.spectrum_count,
                comparison.mismatches.len()
            );
        }
        Some(comparison)
    }
}

impl<S: SpectrumSource> MSDataFileMetadata for MSDataReader<S> {
    fn instrument_configurations(&self) -> &[InstrumentConfiguration] {
        &self.instrument_configurations
    }

    fn run_description(&self) -> Option<&MassSpectrometryRun> {
        if self.is_open() {
            Some(&self.run)
        } else {
            None
        }
    }
}

/// An iterator over the readable spectra of an [`MSDataReader`]
pub struct SpectrumIter<'a, S: SpectrumSource> {
    reader: &'a mut MSDataReader<S>,
    index: usize,
    load_binary_data: bool,
}

impl<S: SpectrumSource> Iterator for SpectrumIter<'_, S> {
    type Item = Spectrum;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.reader.spectrum_count() {
            let index = self.index;
            self.index += 1;
            match self.reader.get_spectrum(index, self.load_binary_data) {
                Ok(spectrum) => return Some(spectrum),
                Err(e) => self.reader.log_skipped(index, &e),
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::io;

    use super::*;
    use crate::filter::DIA_ISOLATION_WIDTH_THRESHOLD;
    use crate::io::{DetailLevel, MemorySource, RawChromatogram};
    use crate::meta::{Component, ComponentType, StartTimeConvention};
    use crate::params::{Param, Unit};
    use crate::spectrum::RETENTION_TIME_TOLERANCE;

    const MS1_FILTER: &str = "FTMS + p NSI Full ms [350.0000-1800.0000]";

    fn precursor_params(mz: f64, half_width: f64) -> Vec<Param> {
        vec![
            Param::new(cv::ISOLATION_WINDOW_TARGET_MZ, mz),
            Param::new(cv::ISOLATION_WINDOW_LOWER_OFFSET, half_width),
            Param::new(cv::ISOLATION_WINDOW_UPPER_OFFSET, half_width),
            Param::new(cv::SELECTED_ION_MZ, mz),
            Param::flag(cv::BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION),
            Param::new(cv::COLLISION_ENERGY, 30.0),
        ]
    }

    /// Every fourth scan is a profile MS1 scan, the rest are centroided HCD MS2 scans
    fn make_raw(kind: SourceKind, key: ScanKey, i: usize, half_width: f64) -> RawSpectrum {
        let rt = i as f64 * 0.01;
        let mzs = vec![200.0, 300.5, 450.25];
        let intensities = vec![10.0, 50.0 + i as f64, 5.0];
        let tic: f64 = intensities.iter().sum();
        let raw = RawSpectrum::new(kind.format_native_id(&key))
            .with_arrays(mzs, intensities)
            .with_param(Param::flag(cv::POSITIVE_SCAN))
            .with_param(Param::new(cv::TOTAL_ION_CURRENT, tic));
        if i % 4 == 0 {
            raw.with_param(Param::new(cv::MS_LEVEL, 1))
                .with_param(Param::flag(cv::PROFILE_SPECTRUM))
                .with_scan(
                    vec![
                        Param::new(cv::SCAN_START_TIME, rt).with_unit(Unit::Minute),
                        Param::new(cv::FILTER_STRING, MS1_FILTER),
                    ],
                    Some((350.0, 1800.0)),
                )
        } else {
            let mz = 400.0 + i as f64 * 0.5;
            raw.with_param(Param::new(cv::MS_LEVEL, 2))
                .with_param(Param::flag(cv::CENTROID_SPECTRUM))
                .with_precursor(precursor_params(mz, half_width))
                .with_scan(
                    vec![
                        Param::new(cv::SCAN_START_TIME, rt).with_unit(Unit::Minute),
                        Param::new(
                            cv::FILTER_STRING,
                            format!("FTMS + c NSI d Full ms2 {mz:.4}@hcd30.00 [100.0000-2000.0000]"),
                        ),
                    ],
                    Some((100.0, 2000.0)),
                )
        }
    }

    fn thermo_fixture(n: usize) -> MemorySource {
        let mut source = MemorySource::new(SourceKind::Thermo);
        for i in 0..n {
            source.push(make_raw(SourceKind::Thermo, ScanKey::Scan(i as u32 + 1), i, 0.8));
        }
        source
    }

    fn thermo_header() -> Vec<u8> {
        let mut buf = vec![0x01, 0xA1];
        for c in "Finnigan".encode_utf16() {
            buf.extend(c.to_le_bytes());
        }
        buf.extend([0u8; 64]);
        buf
    }

    #[test_log::test]
    fn test_total_mapping() {
        let reader = MSDataReader::new(thermo_fixture(3316), ReaderOptions::default());
        assert!(reader.is_open());
        assert_eq!(reader.spectrum_count(), 3316);
        let mapping = reader.get_scan_to_index_mapping();
        assert_eq!(mapping.len(), reader.spectrum_count());
        assert!(mapping.is_total());
        assert_eq!(mapping.index_of(&ScanKey::Scan(3316)), Ok(3315));
    }

    #[test_log::test]
    fn test_corrupt_source() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("corrupt.raw");
        fs::write(&path, b"\x00\x01 this is not a RAW file")?;

        let mut reader = MSDataReader::open_path(&path, ReaderOptions::default(), |_, kind, _| {
            Ok(MemorySource::new(kind))
        });
        assert_eq!(reader.spectrum_count(), 0);
        assert!(!reader.is_open());
        assert!(matches!(
            reader.open_error(),
            Some(SourceOpenError::CorruptHeader { .. })
        ));
        assert!(reader.get_scan_to_index_mapping().is_empty());
        assert!(matches!(
            reader.get_spectrum(0, true),
            Err(SpectrumAccessError::NotOpened)
        ));
        assert_eq!(reader.iter_spectra(true).count(), 0);
        assert!(reader.summarize_scan_types(false).is_empty());
        assert!(reader.run_start_time().is_none());
        assert!(reader.check_tic_chromatogram().is_none());
        Ok(())
    }

    #[test_log::test]
    fn test_open_path() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("small.raw");
        fs::write(&path, thermo_header())?;

        let reader = MSDataReader::open_path(&path, ReaderOptions::default(), |p, kind, opts| {
            assert_eq!(kind, SourceKind::Thermo);
            assert!(!opts.require_vendor_centroided_ms1);
            assert!(p.ends_with("small.raw"));
            Ok(thermo_fixture(12))
        });
        assert_eq!(reader.spectrum_count(), 12);
        assert!(reader.open_error().is_none());
        assert_eq!(reader.source_kind(), Some(SourceKind::Thermo));

        let reader: MSDataReader<MemorySource> =
            MSDataReader::open_path(&path, ReaderOptions::default(), |p, _, _| {
                Err(SourceOpenError::Native {
                    path: p.to_path_buf(),
                    message: "license check failed".into(),
                })
            });
        assert_eq!(reader.spectrum_count(), 0);
        assert!(matches!(
            reader.open_error(),
            Some(SourceOpenError::Native { .. })
        ));
        Ok(())
    }

    #[test_log::test]
    fn test_frame_scan_round_trip() {
        let mut source = MemorySource::new(SourceKind::IonMobility);
        let mut i = 0;
        for frame in 20..23 {
            for scan in 88..93 {
                source.push(make_raw(
                    SourceKind::IonMobility,
                    ScanKey::frame_scan(frame, scan),
                    i,
                    0.8,
                ));
                i += 1;
            }
        }
        let mut reader = MSDataReader::new(source, ReaderOptions::default());
        let key = ScanKey::from_native_id("frame=21 scan=90").unwrap();
        assert_eq!(key, ScanKey::frame_scan(21, 90));

        let index = reader.index_of(&key).unwrap();
        assert_eq!(index, 7);
        assert_eq!(reader.get_scan_to_index_mapping().key_of(index), Ok(key));

        let spectrum = reader.get_spectrum(index, false).unwrap();
        assert_eq!(spectrum.scan_key, Some(key));
        assert_eq!(spectrum.native_id, "frame=21 scan=90 frameType=1");
        assert_eq!(spectrum.id, spectrum.native_id);

        let by_key = reader.get_spectrum_by_key(&key, false).unwrap();
        assert_eq!(by_key.index, index);
        assert!(matches!(
            reader.get_spectrum_by_key(&ScanKey::frame_scan(99, 1), false),
            Err(SpectrumAccessError::ScanIndex(_))
        ));
    }

    #[test_log::test]
    fn test_spectrum_assembly() {
        let mut reader = MSDataReader::new(thermo_fixture(8), ReaderOptions::default());

        let ms1 = reader.get_spectrum(4, true).unwrap();
        assert_eq!(ms1.id, "0.1.5");
        assert_eq!(ms1.native_id, "controllerType=0 controllerNumber=1 scan=5");
        assert_eq!(ms1.level, 1);
        assert!(!ms1.centroided);
        assert!(!ms1.negative_charge);
        assert!(ms1.precursors.is_empty());
        assert_eq!(ms1.len(), 3);

        let ms2 = reader.get_spectrum(5, true).unwrap();
        assert_eq!(ms2.level, 2);
        assert!(ms2.centroided);
        assert_eq!(ms2.precursors.len(), 1);
        assert_eq!(ms2.precursors[0].activation_types, vec!["hcd"]);
        assert_eq!(ms2.precursors[0].collision_energy, Some(30.0));
        assert_eq!(ms2.isolation_width(), Some(1.6));

        let stripped = reader.get_spectrum(5, false).unwrap();
        assert!(stripped.mzs.is_empty());
        assert!(stripped.intensities.is_empty());
        assert_eq!(stripped.precursors, ms2.precursors);

        assert_eq!(reader.get_precursors(5).unwrap(), ms2.precursors);
        assert!(reader.get_precursors(4).unwrap().is_empty());
        assert!(matches!(
            reader.get_spectrum(8, true),
            Err(SpectrumAccessError::SpectrumIndexNotFound(8))
        ));

        let info = reader.get_spectrum_scan_info(5).unwrap();
        assert_eq!(info.scans.len(), 1);
        assert_eq!(info.scans[0].scan_windows[0].lower_bound(), 100.0);
        assert_eq!(
            reader.get_scan_filter_text(5).unwrap(),
            "FTMS + c NSI d Full ms2 402.5000@hcd30.00 [100.0000-2000.0000]"
        );
    }

    #[test_log::test]
    fn test_spectrum_invariants() {
        let mut reader = MSDataReader::new(thermo_fixture(40), ReaderOptions::default());
        for index in 0..reader.spectrum_count() {
            let spectrum = reader.get_spectrum(index, true).unwrap();
            let info = reader.get_spectrum_scan_info(index).unwrap();
            assert!(spectrum.arrays_consistent());
            assert!(!spectrum.has_unexpected_precursors());
            assert!(spectrum.retention_time_matches(&info, RETENTION_TIME_TOLERANCE));
        }
    }

    #[test_log::test]
    fn test_centroid_override() {
        let options = ReaderOptions::new().require_vendor_centroided_ms1(true);
        let mut reader = MSDataReader::new(thermo_fixture(4), options);
        assert!(reader.get_spectrum(0, false).unwrap().centroided);

        let options = ReaderOptions::new().require_vendor_centroided_ms2(true);
        let mut reader = MSDataReader::new(thermo_fixture(4), options);
        assert!(!reader.get_spectrum(0, false).unwrap().centroided);
        assert!(reader.get_spectrum(1, false).unwrap().centroided);
    }

    #[test_log::test]
    fn test_mismatched_arrays_are_truncated() {
        let mut source = MemorySource::new(SourceKind::Bruker);
        source.push(
            RawSpectrum::new("scan=1")
                .with_param(Param::flag(cv::NEGATIVE_SCAN))
                .with_arrays(vec![100.0, 200.0, 300.0], vec![1.0, 2.0]),
        );
        source.push(RawSpectrum::new("scan=2").with_param(Param::new(cv::MS_LEVEL, 1)));
        let mut reader = MSDataReader::new(source, ReaderOptions::default());
        let spectrum = reader.get_spectrum(0, true).unwrap();
        assert_eq!(spectrum.mzs, vec![100.0, 200.0]);
        assert!(spectrum.arrays_consistent());
        assert_eq!(spectrum.level, 1);
        assert_eq!(spectrum.id, "1");
        assert!(spectrum.negative_charge);
        assert_eq!(spectrum.polarity(), ScanPolarity::Negative);
        assert_eq!(reader.get_scan_filter_text(0).unwrap(), "");
        assert!(reader.classify_scan(0).unwrap().is_unknown());

        let spectrum = reader.get_spectrum(1, true).unwrap();
        assert_eq!(spectrum.polarity(), ScanPolarity::Unknown);
        assert!(!spectrum.negative_charge);
    }

    #[test_log::test]
    fn test_read_failures_are_skipped() {
        let mut source = thermo_fixture(10);
        source.push_failure("controllerType=0 controllerNumber=1 scan=11", "bad block");
        source.push(make_raw(SourceKind::Thermo, ScanKey::Scan(12), 11, 0.8));
        let mut reader = MSDataReader::new(source, ReaderOptions::default());

        assert!(reader.get_scan_to_index_mapping().is_total());
        assert!(matches!(
            reader.get_spectrum(10, true),
            Err(SpectrumAccessError::ReadFailed { index: 10, .. })
        ));
        let indices: Vec<usize> = reader.iter_spectra(true).map(|s| s.index).collect();
        assert_eq!(indices.len(), 11);
        assert!(!indices.contains(&10));
        assert_eq!(indices.last(), Some(&11));

        let summary = reader.summarize_scan_types(false);
        assert_eq!(summary.total(), 11);
        assert_eq!(summary.ms1_count + summary.msn_count, 11);
    }

    #[test_log::test]
    fn test_classify_scan() {
        let options = ReaderOptions::new().cache_classifications(true);
        let mut reader = MSDataReader::new(thermo_fixture(4), options);
        let c = reader.classify_scan(1).unwrap();
        assert_eq!(c.scan_type_tag, "HCD-HMSn");
        assert_eq!(c.isolation_width, Some(1.6));
        assert!(!c.is_dia());
        assert_eq!(reader.classify_scan(1).unwrap(), c);
        assert_eq!(reader.classify_scan(0).unwrap().scan_type_tag, "HMS");

        let half_width = DIA_ISOLATION_WIDTH_THRESHOLD;
        let mut source = MemorySource::new(SourceKind::Thermo);
        for i in 0..4 {
            source.push(make_raw(SourceKind::Thermo, ScanKey::Scan(i as u32 + 1), i, half_width));
        }
        let mut reader = MSDataReader::new(source, ReaderOptions::default());
        let c = reader.classify_scan(2).unwrap();
        assert!(c.is_dia());
        assert_eq!(c.scan_type_tag, "DIA-HCD-HMSn");
    }

    #[test_log::test]
    fn test_summarize_scan_types() {
        let mut reader = MSDataReader::new(thermo_fixture(20), ReaderOptions::default());
        let summary = reader.summarize_scan_types(false);
        assert_eq!(summary.ms1_count, 5);
        assert_eq!(summary.msn_count, 15);
        assert_eq!(summary.count("HMS", "FTMS + p NSI Full ms"), 5);
        assert_eq!(
            summary.count("HCD-HMSn", "FTMS + c NSI d Full ms2 0@hcd30.00"),
            15
        );
        assert_eq!(summary.dependent_count, 15);
        assert!(summary.is_consistent());

        let summary = reader.summarize_scan_types(true);
        assert_eq!(summary.len(), 16);
    }

    #[test_log::test]
    fn test_metadata() {
        let config = InstrumentConfiguration {
            id: 0,
            ..Default::default()
        }
        .with_param(Param::flag(1001742))
        .with_param(Param::new(cv::INSTRUMENT_SERIAL_NUMBER, "VP10089"))
        .with_component(Component::new(
            ComponentType::Analyzer,
            1,
            vec![Param::flag(1000484)],
        ));
        let source = MemorySource::new(SourceKind::Bruker)
            .with_run_start_time("2019-08-20T09:15:00Z")
            .with_instrument_configuration(config);
        let reader = MSDataReader::new(source, ReaderOptions::default());

        assert_eq!(reader.serial_number(), "VP10089");
        let descr = reader.instrument_descriptions();
        assert_eq!(descr.len(), 1);
        assert_eq!(descr[0].model, "LTQ Orbitrap Velos");
        assert_eq!(descr[0].analyzer, "orbitrap");
        let start = reader.run_start_time().unwrap();
        assert_eq!(start.convention, StartTimeConvention::Utc);
        assert_eq!(
            reader.run_description().unwrap().source_kind,
            Some(SourceKind::Bruker)
        );

        let source = thermo_fixture(1).with_run_start_time("not a date");
        let reader = MSDataReader::new(source, ReaderOptions::default());
        assert!(reader.run_start_time().is_none());
        assert_eq!(reader.serial_number(), "");
    }

    #[test_log::test]
    fn test_tic_chromatogram() {
        let n = 6;
        let expected: Vec<f64> = (0..n).map(|i| 65.0 + i as f64).collect();
        let chromatogram = RawChromatogram {
            id: "TIC".into(),
            params: vec![Param::flag(cv::TOTAL_ION_CURRENT_CHROMATOGRAM)],
            times: (0..n).map(|i| i as f64 * 0.01).collect(),
            intensities: expected.clone(),
        };
        let source = thermo_fixture(n).with_chromatogram(chromatogram.clone());
        let mut reader = MSDataReader::new(source, ReaderOptions::default());
        let comparison = reader.check_tic_chromatogram().unwrap();
        assert!(comparison.is_consistent());

        let mut shifted = chromatogram;
        shifted.intensities[2] *= 2.0;
        shifted.intensities.pop();
        let source = thermo_fixture(n).with_chromatogram(shifted);
        let mut reader = MSDataReader::new(source, ReaderOptions::default());
        let comparison = reader.check_tic_chromatogram().unwrap();
        assert!(!comparison.is_consistent());
        assert_eq!(comparison.mismatches, vec![2]);
        assert_eq!(comparison.chromatogram_points, n - 1);

        let mut reader = MSDataReader::new(thermo_fixture(2), ReaderOptions::default());
        assert!(reader.check_tic_chromatogram().is_none());
    }

    #[test]
    fn test_detail_level_drives_iteration() {
        let options = ReaderOptions::new().detail_level(DetailLevel::MetadataOnly);
        let mut reader = MSDataReader::new(thermo_fixture(3), options);
        let load = reader.options().load_binary_data();
        assert!(reader.iter_spectra(load).all(|s| s.mzs.is_empty()));
    }
}
