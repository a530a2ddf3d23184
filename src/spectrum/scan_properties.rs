use crate::cv;
use crate::impl_param_described;
use crate::params::{ParamDescribed, ParamList, Unit};

/**
Describes the polarity of a mass spectrum. A spectrum is either `Positive` (1+), `Negative` (-1)
or `Unknown` (0). The `Unknown` state is the default.
*/
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanPolarity {
    #[default]
    Unknown = 0,
    Positive = 1,
    Negative = -1,
}

impl ScanPolarity {
    pub fn from_params(params: &[crate::params::Param]) -> Self {
        for p in params {
            match p.accession {
                cv::NEGATIVE_SCAN => return Self::Negative,
                cv::POSITIVE_SCAN => return Self::Positive,
                _ => {}
            }
        }
        Self::Unknown
    }

    pub fn sign(&self) -> Option<char> {
        match self {
            Self::Positive => Some('+'),
            Self::Negative => Some('-'),
            Self::Unknown => None,
        }
    }
}

/// The acquisition mass range of a scan, held as its two limit parameters
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanWindow {
    pub params: ParamList,
}

impl ScanWindow {
    pub fn new(lower_bound: f64, upper_bound: f64) -> Self {
        let params = vec![
            crate::Param::new(cv::SCAN_WINDOW_LOWER_LIMIT, lower_bound).with_unit(Unit::MZ),
            crate::Param::new(cv::SCAN_WINDOW_UPPER_LIMIT, upper_bound).with_unit(Unit::MZ),
        ];
        Self { params }
    }

    pub fn lower_bound(&self) -> f64 {
        self.get_value_as_f64(cv::SCAN_WINDOW_LOWER_LIMIT)
    }

    pub fn upper_bound(&self) -> f64 {
        self.get_value_as_f64(cv::SCAN_WINDOW_UPPER_LIMIT)
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Describes a single scan event. Unless additional post-processing is done,
/// there is usually only one event per spectrum.
pub struct ScanEvent {
    pub params: ParamList,
    pub scan_windows: Vec<ScanWindow>,
}

impl ScanEvent {
    /// The scan start time in minutes, or `0.0` when not reported.
    ///
    /// Values reported in seconds or milliseconds are converted.
    pub fn start_time(&self) -> f64 {
        match self.get_param(cv::SCAN_START_TIME) {
            Some(p) => {
                let value = p.coerce::<f64>().unwrap_or_default();
                match p.unit {
                    Unit::Second => value / 60.0,
                    Unit::Millisecond => value / 60_000.0,
                    _ => value,
                }
            }
            None => 0.0,
        }
    }

    pub fn filter_string(&self) -> &str {
        self.get_value(cv::FILTER_STRING)
    }

    /// The first non-empty filter string among `scans`, or `""`
    pub fn first_filter_string(scans: &[ScanEvent]) -> &str {
        scans
            .iter()
            .map(|s| s.filter_string())
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }

    /// Drift time or inverse reduced ion mobility, whichever is present
    pub fn ion_mobility(&self) -> Option<f64> {
        self.get_value_as_f64_opt(cv::ION_MOBILITY_DRIFT_TIME)
            .or_else(|| self.get_value_as_f64_opt(cv::INVERSE_REDUCED_ION_MOBILITY))
    }

    pub fn compensation_voltage(&self) -> Option<f64> {
        self.get_value_as_f64_opt(cv::FAIMS_COMPENSATION_VOLTAGE)
    }
}

/// The scan records of one spectrum, as returned by
/// [`MSDataReader::get_spectrum_scan_info`](crate::io::MSDataReader::get_spectrum_scan_info)
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectrumScanInfo {
    pub scans: Vec<ScanEvent>,
}

impl SpectrumScanInfo {
    pub fn first_scan(&self) -> Option<&ScanEvent> {
        self.scans.first()
    }

    /// The filter string of the first scan that carries one, or `""`
    pub fn filter_string(&self) -> &str {
        ScanEvent::first_filter_string(&self.scans)
    }

    pub fn start_time(&self) -> f64 {
        self.first_scan().map(|s| s.start_time()).unwrap_or_default()
    }
}

/// Map a dissociation method accession to the lowercase activation tag used
/// in activation type lists.
///
/// Supplemental terms map to the tag of the activation they supplement with.
pub fn activation_tag(accession: u32) -> Option<&'static str> {
    let tag = match accession {
        cv::COLLISION_INDUCED_DISSOCIATION
        | cv::TRAP_TYPE_COLLISION_INDUCED_DISSOCIATION
        | cv::SUPPLEMENTAL_COLLISION_INDUCED_DISSOCIATION => "cid",
        cv::BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION
        | cv::HIGHER_ENERGY_BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION
        | cv::SUPPLEMENTAL_BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION => "hcd",
        cv::ELECTRON_TRANSFER_DISSOCIATION => "etd",
        cv::NEGATIVE_ELECTRON_TRANSFER_DISSOCIATION => "netd",
        cv::ELECTRON_CAPTURE_DISSOCIATION => "ecd",
        cv::PULSED_Q_DISSOCIATION => "pqd",
        cv::ULTRAVIOLET_PHOTODISSOCIATION => "uvpd",
        _ => return None,
    };
    Some(tag)
}

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Describes the precursor ion of the owning spectrum.
pub struct Precursor {
    /// The isolation window target m/z
    pub isolation_mz: Option<f64>,
    /// The selected ion's m/z as reported, may not be the monoisotopic peak.
    pub precursor_mz: Option<f64>,
    pub collision_energy: Option<f64>,
    /// Lowercase activation tags in the order the vendor emitted them, without repeats
    pub activation_types: Vec<String>,
    pub isolation_window_lower_offset: Option<f64>,
    pub isolation_window_upper_offset: Option<f64>,
    /// The reported precursor ion's charge state. May be absent in
    /// some source files.
    pub charge: Option<i32>,
    /// Whether a supplemental dissociation term was present
    pub supplemental_activation: bool,
    pub params: ParamList,
}

impl Precursor {
    /// Build a precursor from the parameters the native reader attached to it
    pub fn from_params(params: ParamList) -> Self {
        let mut precursor = Precursor {
            params,
            ..Default::default()
        };
        precursor.isolation_mz = precursor.get_value_as_f64_opt(cv::ISOLATION_WINDOW_TARGET_MZ);
        precursor.precursor_mz = precursor.get_value_as_f64_opt(cv::SELECTED_ION_MZ);
        precursor.collision_energy = precursor.get_value_as_f64_opt(cv::COLLISION_ENERGY);
        precursor.isolation_window_lower_offset =
            precursor.get_value_as_f64_opt(cv::ISOLATION_WINDOW_LOWER_OFFSET);
        precursor.isolation_window_upper_offset =
            precursor.get_value_as_f64_opt(cv::ISOLATION_WINDOW_UPPER_OFFSET);
        precursor.charge = match precursor.get_value_as_i64(cv::CHARGE_STATE) {
            0 => None,
            z => Some(z as i32),
        };

        let mut activation_types: Vec<String> = Vec::new();
        for p in precursor.params.iter() {
            if matches!(
                p.accession,
                cv::SUPPLEMENTAL_COLLISION_INDUCED_DISSOCIATION
                    | cv::SUPPLEMENTAL_BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION
            ) {
                precursor.supplemental_activation = true;
            }
            if let Some(tag) = activation_tag(p.accession) {
                if !activation_types.iter().any(|t| t == tag) {
                    activation_types.push(tag.to_string());
                }
            }
        }
        precursor.activation_types = activation_types;
        precursor
    }

    /// The full isolation window width, when both offsets are known
    pub fn isolation_width(&self) -> Option<f64> {
        match (
            self.isolation_window_lower_offset,
            self.isolation_window_upper_offset,
        ) {
            (Some(lower), Some(upper)) => Some(lower + upper),
            _ => None,
        }
    }

    pub fn has_activation(&self, tag: &str) -> bool {
        self.activation_types.iter().any(|t| t == tag)
    }
}

impl_param_described!(ScanWindow, ScanEvent, Precursor);
