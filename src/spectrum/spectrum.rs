//! The canonical spectrum representation shared by every source kind.
//!
//! A [`Spectrum`] is assembled by [`MSDataReader::get_spectrum`](crate::io::MSDataReader::get_spectrum)
//! from the CV parameters and signal arrays a native reader supplies. Ids are formatted
//! per source kind so that they match what other tools emit for the same file.
use crate::io::ScanKey;
use crate::spectrum::scan_properties::{Precursor, ScanPolarity, SpectrumScanInfo};

/// The largest difference, in minutes, tolerated between [`Spectrum::retention_time`]
/// and the scan start time of the spectrum's first scan record.
pub const RETENTION_TIME_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spectrum {
    /// The short, source-kind specific identifier, e.g. `0.1.42` for Thermo
    pub id: String,
    /// The vendor native identifier, reproduced verbatim
    pub native_id: String,
    /// The dense position of the spectrum in its source
    pub index: usize,
    pub scan_key: Option<ScanKey>,
    /// The MS order, 1 for survey scans
    pub level: u8,
    /// Minutes
    pub retention_time: f64,
    pub ion_mobility: Option<f64>,
    pub centroided: bool,
    /// `Unknown` when neither the spectrum nor its first scan declares a polarity
    pub polarity: ScanPolarity,
    pub negative_charge: bool,
    pub mzs: Vec<f64>,
    pub intensities: Vec<f64>,
    pub precursors: Vec<Precursor>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.mzs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mzs.is_empty()
    }

    pub fn polarity(&self) -> ScanPolarity {
        self.polarity
    }

    /// Iterate over (m/z, intensity) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.mzs.iter().copied().zip(self.intensities.iter().copied())
    }

    /// Whether the signal arrays agree in length
    pub fn arrays_consistent(&self) -> bool {
        self.mzs.len() == self.intensities.len()
    }

    /// An MS1 spectrum carrying precursors. Tolerated, but worth reporting on
    /// fixtures known to be well formed.
    pub fn has_unexpected_precursors(&self) -> bool {
        self.level == 1 && !self.precursors.is_empty()
    }

    /// The width of the first precursor's isolation window, if known
    pub fn isolation_width(&self) -> Option<f64> {
        self.precursors.first().and_then(|p| p.isolation_width())
    }

    /// Check [`Spectrum::retention_time`] against the scan start time reported by
    /// the spectrum's scan records.
    pub fn retention_time_matches(&self, scan_info: &SpectrumScanInfo, tolerance: f64) -> bool {
        (self.retention_time - scan_info.start_time()).abs() <= tolerance
    }

    pub fn total_ion_current(&self) -> f64 {
        self.intensities.iter().sum()
    }

    /// The (m/z, intensity) of the most intense point
    pub fn base_peak(&self) -> Option<(f64, f64)> {
        self.iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cv;
    use crate::params::ParamDescribed;
    use crate::spectrum::ScanEvent;
    use crate::Param;

    fn make_spectrum() -> Spectrum {
        Spectrum {
            id: "0.1.5".into(),
            native_id: "controllerType=0 controllerNumber=1 scan=5".into(),
            index: 4,
            scan_key: Some(ScanKey::Scan(5)),
            level: 1,
            retention_time: 0.25,
            polarity: ScanPolarity::Positive,
            mzs: vec![100.0, 200.0, 300.0],
            intensities: vec![10.0, 50.0, 20.0],
            ..Default::default()
        }
    }

    #[test]
    fn test_signal_properties() {
        let spectrum = make_spectrum();
        assert!(spectrum.arrays_consistent());
        assert_eq!(spectrum.len(), 3);
        assert_eq!(spectrum.base_peak(), Some((200.0, 50.0)));
        assert_eq!(spectrum.total_ion_current(), 80.0);
        assert_eq!(spectrum.polarity(), ScanPolarity::Positive);
        assert!(!spectrum.has_unexpected_precursors());
        assert_eq!(Spectrum::default().base_peak(), None);
        assert_eq!(Spectrum::default().polarity(), ScanPolarity::Unknown);
    }

    #[test]
    fn test_retention_time_cross_check() {
        let spectrum = make_spectrum();
        let mut event = ScanEvent::default();
        event.add_param(Param::new(cv::SCAN_START_TIME, 0.25005));
        let info = SpectrumScanInfo { scans: vec![event] };
        assert!(spectrum.retention_time_matches(&info, RETENTION_TIME_TOLERANCE));

        let mut event = ScanEvent::default();
        event.add_param(Param::new(cv::SCAN_START_TIME, 0.26));
        let info = SpectrumScanInfo { scans: vec![event] };
        assert!(!spectrum.retention_time_matches(&info, RETENTION_TIME_TOLERANCE));
    }
}
