use std::fmt::Display;

use crate::spectrum::ScanPolarity;

use super::generic::generic_filter_of;
use super::tokens::{lex, FilterToken, MassAnalyzer, PrecursorClause, ScanRole};
use super::{DIA_ISOLATION_WIDTH_THRESHOLD, UNKNOWN_SCAN_TYPE};

bitflags::bitflags! {
    /// Boolean properties of a scan read from its filter string
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ScanFlags: u32 {
        /// `d`, acquired in response to a preceding scan
        const DEPENDENT = 1;
        /// `r`, rolling scan number
        const ROLLING = 1 << 1;
        /// `sa`
        const SUPPLEMENTAL_ACTIVATION = 1 << 2;
        /// `w`
        const WIDEBAND = 1 << 3;
        const ZOOM = 1 << 4;
        const SIM = 1 << 5;
        const SRM = 1 << 6;
        /// `msx`
        const MULTIPLEXED = 1 << 7;
        const LOCK_MASS = 1 << 8;
        const DIA = 1 << 9;
    }
}

impl Default for ScanFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// One activation step of a precursor clause, e.g. `etd53.58`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivationStage {
    /// The lowercase activation method, e.g. `cid`, `hcd` or `etd`
    pub method: String,
    pub energy: f64,
}

impl ActivationStage {
    pub fn new<S: Into<String>>(method: S, energy: f64) -> Self {
        Self {
            method: method.into(),
            energy,
        }
    }
}

impl Display for ActivationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:.2}", self.method, self.energy)
    }
}

/// An m/z interval from a bracketed list
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MassRange {
    pub low: f64,
    pub high: f64,
}

impl MassRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Everything a single filter string says about how its scan was acquired.
///
/// An unparseable string yields a classification whose `scan_type_tag` is
/// [`UNKNOWN_SCAN_TYPE`] with every other field at its default, except the
/// generic filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanFilterClassification {
    pub scan_type_tag: String,
    /// The filter with its numeric specifics normalized out, see [`make_generic_filter`](super::make_generic_filter)
    pub generic_filter: String,
    pub mass_analyzer: Option<MassAnalyzer>,
    pub polarity: ScanPolarity,
    pub ionization: Option<String>,
    pub is_centroid: Option<bool>,
    /// The MS level, `0` when unknown
    pub ms_level: u8,
    /// Every activation stage across all precursor clauses, in input order
    pub activation_stages: Vec<ActivationStage>,
    pub flags: ScanFlags,
    /// The FAIMS compensation voltage
    pub compensation_voltage: Option<f64>,
    pub precursor_mz_list: Vec<f64>,
    /// The acquisition mass range
    pub scan_range: Option<MassRange>,
    /// The entries of the last bracketed list
    pub mass_ranges: Vec<MassRange>,
    /// The isolation width the classification was computed with
    pub isolation_width: Option<f64>,
}

impl Default for ScanFilterClassification {
    fn default() -> Self {
        Self {
            scan_type_tag: UNKNOWN_SCAN_TYPE.to_string(),
            generic_filter: String::new(),
            mass_analyzer: None,
            polarity: ScanPolarity::Unknown,
            ionization: None,
            is_centroid: None,
            ms_level: 0,
            activation_stages: Vec::new(),
            flags: ScanFlags::empty(),
            compensation_voltage: None,
            precursor_mz_list: Vec::new(),
            scan_range: None,
            mass_ranges: Vec::new(),
            isolation_width: None,
        }
    }
}

impl ScanFilterClassification {
    /// Classify `text` with no isolation width information
    pub fn parse(text: &str) -> Self {
        FilterParser::default().parse(text)
    }

    /// Classify `text`, using `isolation_width` from the precursor of the same
    /// spectrum to decide whether the scan is DIA
    pub fn parse_with_isolation_width(text: &str, isolation_width: Option<f64>) -> Self {
        FilterParser::default()
            .isolation_width(isolation_width)
            .parse(text)
    }

    pub fn is_unknown(&self) -> bool {
        self.scan_type_tag == UNKNOWN_SCAN_TYPE
    }

    pub fn is_dependent(&self) -> bool {
        self.flags.contains(ScanFlags::DEPENDENT)
    }

    pub fn is_supplemental_activation(&self) -> bool {
        self.flags.contains(ScanFlags::SUPPLEMENTAL_ACTIVATION)
    }

    pub fn is_wideband(&self) -> bool {
        self.flags.contains(ScanFlags::WIDEBAND)
    }

    pub fn is_zoom(&self) -> bool {
        self.flags.contains(ScanFlags::ZOOM)
    }

    pub fn is_sim(&self) -> bool {
        self.flags.contains(ScanFlags::SIM)
    }

    pub fn is_srm(&self) -> bool {
        self.flags.contains(ScanFlags::SRM)
    }

    pub fn is_multiplexed(&self) -> bool {
        self.flags.contains(ScanFlags::MULTIPLEXED)
    }

    /// A heuristic: MSn scans isolated at least
    /// [`DIA_ISOLATION_WIDTH_THRESHOLD`] wide. Not a vendor-reported flag.
    pub fn is_dia(&self) -> bool {
        self.flags.contains(ScanFlags::DIA)
    }

    /// The activation methods in input order, without repeats
    pub fn activation_methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = Vec::new();
        for stage in self.activation_stages.iter() {
            if !methods.contains(&stage.method.as_str()) {
                methods.push(&stage.method);
            }
        }
        methods
    }

    /// The energy of the last activation stage
    pub fn collision_energy(&self) -> Option<f64> {
        self.activation_stages.last().map(|s| s.energy)
    }
}

/// Configures and runs the filter string classifier
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FilterParser {
    include_precursor_mz: bool,
    isolation_width: Option<f64>,
}

#[derive(Debug, Default)]
struct FilterState {
    analyzer: Option<MassAnalyzer>,
    polarity: ScanPolarity,
    ionization: Option<String>,
    centroid: Option<bool>,
    flags: ScanFlags,
    compensation_voltage: Option<f64>,
    role: Option<ScanRole>,
    ms_level: Option<u8>,
    clauses: Vec<PrecursorClause>,
    /// Precursor m/z written without an activation, as on SRM transitions
    bare_precursors: Vec<f64>,
    mass_ranges: Vec<MassRange>,
}

impl FilterState {
    fn accept(&mut self, token: FilterToken<'_>) {
        match token {
            FilterToken::Analyzer(analyzer) => self.analyzer = Some(analyzer),
            FilterToken::Polarity(polarity) => self.polarity = polarity,
            FilterToken::DataMode { centroid } => self.centroid = Some(centroid),
            FilterToken::Ionization(source) => self.ionization = Some(source.to_string()),
            FilterToken::Flag(flag) => self.flags |= flag,
            FilterToken::CompensationVoltage(cv) => self.compensation_voltage = Some(cv),
            FilterToken::Role(role) => {
                match role {
                    ScanRole::SIM => self.flags |= ScanFlags::SIM,
                    ScanRole::Zoom => self.flags |= ScanFlags::ZOOM,
                    ScanRole::SRM | ScanRole::CRM => self.flags |= ScanFlags::SRM,
                    _ => {}
                }
                self.role = Some(role);
            }
            FilterToken::MsLevel(level) => self.ms_level = Some(level),
            FilterToken::Precursor(clause) => self.clauses.push(clause),
            FilterToken::MassRanges(ranges) => self.mass_ranges = ranges,
            FilterToken::Number(mz) if self.expects_bare_precursor() => {
                self.bare_precursors.push(mz)
            }
            FilterToken::Qualifier(_) | FilterToken::Number(_) | FilterToken::Unknown(_) => {}
        }
    }

    fn expects_bare_precursor(&self) -> bool {
        matches!(self.role, Some(ScanRole::SRM | ScanRole::CRM))
            && self.ms_level.is_some()
            && self.clauses.is_empty()
            && self.mass_ranges.is_empty()
    }

    fn is_recognized(&self) -> bool {
        self.role.is_some() || self.ms_level.is_some()
    }

    fn resolve_ms_level(&self) -> u8 {
        let from_clauses = u8::try_from(self.clauses.len())
            .unwrap_or(u8::MAX)
            .saturating_add(1);
        match (self.ms_level, self.role) {
            // Some firmware writes `ms` on scans that carry precursor clauses
            (Some(1), _) if !self.clauses.is_empty() => from_clauses,
            (Some(level), _) => level,
            (None, Some(ScanRole::Q1MS | ScanRole::Q3MS)) => 1,
            (None, Some(ScanRole::SRM | ScanRole::CRM | ScanRole::ConstantNeutralLoss)) => {
                from_clauses.max(2)
            }
            (None, _) => from_clauses,
        }
    }
}

/// The label of the activation in `stages`, e.g. `HCD` or `ETciD`
fn activation_label(stages: &[ActivationStage], supplemental: bool) -> Option<String> {
    let first = stages.first()?;
    let has = |method: &str| stages.iter().any(|s| s.method == method);
    let label = if first.method == "etd" && has("hcd") {
        "EThcD".to_string()
    } else if first.method == "etd" && has("cid") {
        "ETciD".to_string()
    } else if first.method == "etd" && supplemental {
        "SA_ETD".to_string()
    } else {
        first.method.to_uppercase()
    };
    Some(label)
}

impl FilterParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep precursor m/z values in the generic filter
    pub fn include_precursor_mz(mut self, value: bool) -> Self {
        self.include_precursor_mz = value;
        self
    }

    pub fn isolation_width(mut self, value: Option<f64>) -> Self {
        self.isolation_width = value;
        self
    }

    /// Classify a filter string in a single left-to-right pass. Never fails.
    pub fn parse(&self, text: &str) -> ScanFilterClassification {
        let lexemes = lex(text);
        let generic_filter = generic_filter_of(&lexemes, self.include_precursor_mz);

        let mut state = FilterState::default();
        for lexeme in lexemes {
            state.accept(FilterToken::classify(lexeme));
        }

        if !state.is_recognized() {
            log::debug!("No scan role or MS level in filter {text:?}");
            return ScanFilterClassification {
                generic_filter,
                ..Default::default()
            };
        }
        self.build(state, generic_filter)
    }

    fn build(&self, state: FilterState, generic_filter: String) -> ScanFilterClassification {
        let ms_level = state.resolve_ms_level();
        let mut flags = state.flags;

        let is_dia = ms_level > 1
            && self
                .isolation_width
                .is_some_and(|w| w >= DIA_ISOLATION_WIDTH_THRESHOLD);
        if is_dia {
            flags |= ScanFlags::DIA;
        }

        let activation_stages: Vec<ActivationStage> = state
            .clauses
            .iter()
            .flat_map(|c| c.stages.iter().cloned())
            .collect();

        let precursor_mz_list: Vec<f64> = if !state.clauses.is_empty() {
            state.clauses.iter().map(|c| c.mz).collect()
        } else if !state.bare_precursors.is_empty() {
            state.bare_precursors.clone()
        } else if state.role.is_some_and(|r| r.targets_precursors()) {
            state.mass_ranges.iter().map(|r| r.midpoint()).collect()
        } else {
            Vec::new()
        };

        let scan_range = state
            .mass_ranges
            .iter()
            .copied()
            .reduce(|acc, r| MassRange::new(acc.low.min(r.low), acc.high.max(r.high)));

        let supplemental = flags.contains(ScanFlags::SUPPLEMENTAL_ACTIVATION);
        let act = state
            .clauses
            .last()
            .and_then(|c| activation_label(&c.stages, supplemental));
        let high_res = if state.analyzer.is_some_and(|a| a.is_high_resolution()) {
            "H"
        } else {
            ""
        };

        let mut scan_type_tag = match state.role {
            Some(ScanRole::Q1MS) => "Q1MS".to_string(),
            Some(ScanRole::Q3MS) => "Q3MS".to_string(),
            Some(ScanRole::SRM | ScanRole::CRM) => match &act {
                Some(act) => format!("{act}-SRM"),
                None => "SRM".to_string(),
            },
            Some(ScanRole::ConstantNeutralLoss) => "MRM_Full_NL".to_string(),
            Some(ScanRole::SIM) if ms_level == 1 => "SIM ms".to_string(),
            Some(ScanRole::Zoom) if ms_level == 1 => "Zoom-MS".to_string(),
            _ if ms_level == 1 => format!("{high_res}MS"),
            _ => match &act {
                Some(act) => format!("{act}-{high_res}MSn"),
                None => format!("{high_res}MSn"),
            },
        };
        if is_dia {
            scan_type_tag = format!("DIA-{scan_type_tag}");
        }

        ScanFilterClassification {
            scan_type_tag,
            generic_filter,
            mass_analyzer: state.analyzer,
            polarity: state.polarity,
            ionization: state.ionization,
            is_centroid: state.centroid,
            ms_level,
            activation_stages,
            flags,
            compensation_voltage: state.compensation_voltage,
            precursor_mz_list,
            scan_range,
            mass_ranges: state.mass_ranges,
            isolation_width: self.isolation_width,
        }
    }
}
