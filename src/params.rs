//! Controlled vocabulary parameters attached to spectra, precursors, scans and
//! instrument components.
//!
//! Vendor metadata is sparse and loosely typed, so every accessor here resolves
//! a missing or malformed value to a neutral default (`""` or `0`) instead of
//! failing.
use std::fmt::Display;
use std::str;

use crate::cv;

/// Units that a parameter's value might carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    // Mass
    MZ,

    // Time
    Minute,
    Second,
    Millisecond,
    VoltSecondPerSquareCentimeter,

    // Collision Energy
    Electronvolt,
    Volt,

    #[default]
    Unknown,
}

impl Unit {
    pub fn for_param(&self) -> (&'static str, &'static str) {
        match self {
            Self::Millisecond => ("UO:0000028", "millisecond"),
            Self::Second => ("UO:0000010", "second"),
            Self::Minute => ("UO:0000031", "minute"),
            Self::MZ => ("MS:1000040", "m/z"),
            Self::Electronvolt => ("UO:0000266", "electronvolt"),
            Self::Volt => ("UO:0000218", "volt"),
            Self::VoltSecondPerSquareCentimeter => ("MS:1002814", "volt-second per square centimeter"),
            Self::Unknown => ("", ""),
        }
    }

    pub fn from_accession(acc: &str) -> Unit {
        match acc {
            "UO:0000028" => Self::Millisecond,
            "UO:0000010" => Self::Second,
            "UO:0000031" => Self::Minute,
            "MS:1000040" => Self::MZ,
            "UO:0000266" => Self::Electronvolt,
            "UO:0000218" => Self::Volt,
            "MS:1002814" => Self::VoltSecondPerSquareCentimeter,
            _ => Unit::Unknown,
        }
    }
}

/// A single controlled vocabulary (accession, value) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    /// The numeric part of the `MS:` accession
    pub accession: u32,
    pub name: String,
    pub value: String,
    pub unit: Unit,
}

impl Param {
    /// Create a parameter, filling in its name from the known term table
    pub fn new<V: ToString>(accession: u32, value: V) -> Param {
        Param {
            accession,
            name: cv::term_name(accession).to_string(),
            value: value.to_string(),
            unit: Unit::Unknown,
        }
    }

    /// Create a value-less parameter, as used for flag-like terms
    pub fn flag(accession: u32) -> Param {
        Self::new(accession, "")
    }

    pub fn with_unit(mut self, unit: Unit) -> Param {
        self.unit = unit;
        self
    }

    pub fn coerce<T: str::FromStr>(&self) -> Result<T, T::Err> {
        self.value.trim().parse::<T>()
    }

    pub fn curie(&self) -> String {
        format!("MS:{:07}", self.accession)
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}|{}", self.curie(), self.name)
        } else {
            write!(f, "{}|{}={}", self.curie(), self.name, self.value)
        }
    }
}

pub type ParamList = Vec<Param>;

/// Find the first parameter with `accession` in `params`
pub fn find_param(params: &[Param], accession: u32) -> Option<&Param> {
    params.iter().find(|p| p.accession == accession)
}

/// The value of the first parameter with `accession`, or `""` when absent
pub fn get_value(params: &[Param], accession: u32) -> &str {
    find_param(params, accession)
        .map(|p| p.value.as_str())
        .unwrap_or_default()
}

/// The value of the first parameter with `accession` as a float, or `0.0` when absent
/// or unparsable
pub fn get_value_as_f64(params: &[Param], accession: u32) -> f64 {
    find_param(params, accession)
        .and_then(|p| p.coerce::<f64>().ok())
        .unwrap_or_default()
}

/// The value of the first parameter with `accession` as an integer, or `0` when absent
/// or unparsable.
///
/// Values written as floats (`"2.0"`) are truncated.
pub fn get_value_as_i64(params: &[Param], accession: u32) -> i64 {
    match find_param(params, accession) {
        Some(p) => match p.coerce::<i64>() {
            Ok(v) => v,
            Err(_) => p.coerce::<f64>().map(|v| v as i64).unwrap_or_default(),
        },
        None => 0,
    }
}

pub trait ParamDescribed {
    fn params(&self) -> &[Param];
    fn params_mut(&mut self) -> &mut ParamList;

    fn add_param(&mut self, param: Param) {
        self.params_mut().push(param);
    }

    fn extend_params(&mut self, it: impl IntoIterator<Item = Param>) {
        self.params_mut().extend(it)
    }

    fn get_param(&self, accession: u32) -> Option<&Param> {
        find_param(self.params(), accession)
    }

    fn has_param(&self, accession: u32) -> bool {
        self.get_param(accession).is_some()
    }

    fn get_value(&self, accession: u32) -> &str {
        get_value(self.params(), accession)
    }

    fn get_value_as_f64(&self, accession: u32) -> f64 {
        get_value_as_f64(self.params(), accession)
    }

    fn get_value_as_i64(&self, accession: u32) -> i64 {
        get_value_as_i64(self.params(), accession)
    }

    /// Like [`ParamDescribed::get_value_as_f64`] but distinguishes a missing parameter
    fn get_value_as_f64_opt(&self, accession: u32) -> Option<f64> {
        self.get_param(accession).and_then(|p| p.coerce().ok())
    }
}

#[macro_export]
macro_rules! impl_param_described {
    ($($t:ty), +) => {$(

        impl $crate::params::ParamDescribed for $t {
            fn params(&self) -> &[$crate::params::Param] {
                &self.params
            }

            fn params_mut(&mut self) -> &mut $crate::params::ParamList {
                &mut self.params
            }
        }
    )+};
}
