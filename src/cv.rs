//! PSI-MS controlled vocabulary accessions used when reading vendor metadata.
//!
//! Accessions are stored as the numeric part of the `MS:XXXXXXX` CURIE. The
//! [`term`] lookup resolves an accession to its name and the metadata category
//! it belongs to.
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

// Spectrum-level terms
pub const MS_LEVEL: u32 = 1000511;
pub const CENTROID_SPECTRUM: u32 = 1000127;
pub const PROFILE_SPECTRUM: u32 = 1000128;
pub const NEGATIVE_SCAN: u32 = 1000129;
pub const POSITIVE_SCAN: u32 = 1000130;
pub const TOTAL_ION_CURRENT: u32 = 1000285;
pub const TOTAL_ION_CURRENT_CHROMATOGRAM: u32 = 1000235;

// Scan-level terms
pub const SCAN_START_TIME: u32 = 1000016;
pub const FILTER_STRING: u32 = 1000512;
pub const PRESET_SCAN_CONFIGURATION: u32 = 1000616;
pub const ION_INJECTION_TIME: u32 = 1000927;
pub const SCAN_WINDOW_LOWER_LIMIT: u32 = 1000501;
pub const SCAN_WINDOW_UPPER_LIMIT: u32 = 1000500;
pub const ION_MOBILITY_DRIFT_TIME: u32 = 1002476;
pub const INVERSE_REDUCED_ION_MOBILITY: u32 = 1002815;
pub const FAIMS_COMPENSATION_VOLTAGE: u32 = 1001581;

// Precursor-level terms
pub const ISOLATION_WINDOW_TARGET_MZ: u32 = 1000827;
pub const ISOLATION_WINDOW_LOWER_OFFSET: u32 = 1000828;
pub const ISOLATION_WINDOW_UPPER_OFFSET: u32 = 1000829;
pub const SELECTED_ION_MZ: u32 = 1000744;
pub const CHARGE_STATE: u32 = 1000041;
pub const COLLISION_ENERGY: u32 = 1000045;

// Dissociation methods
pub const COLLISION_INDUCED_DISSOCIATION: u32 = 1000133;
pub const BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION: u32 = 1000422;
pub const HIGHER_ENERGY_BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION: u32 = 1002481;
pub const TRAP_TYPE_COLLISION_INDUCED_DISSOCIATION: u32 = 1002472;
pub const ELECTRON_TRANSFER_DISSOCIATION: u32 = 1000598;
pub const NEGATIVE_ELECTRON_TRANSFER_DISSOCIATION: u32 = 1003247;
pub const ELECTRON_CAPTURE_DISSOCIATION: u32 = 1000250;
pub const PULSED_Q_DISSOCIATION: u32 = 1000599;
pub const ULTRAVIOLET_PHOTODISSOCIATION: u32 = 1003246;
pub const SUPPLEMENTAL_COLLISION_INDUCED_DISSOCIATION: u32 = 1002679;
pub const SUPPLEMENTAL_BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION: u32 = 1002678;

// Instrument terms
pub const INSTRUMENT_MODEL: u32 = 1000031;
pub const INSTRUMENT_SERIAL_NUMBER: u32 = 1000529;
pub const MASS_ANALYZER_TYPE: u32 = 1000443;
pub const DETECTOR_TYPE: u32 = 1000026;
pub const IONIZATION_TYPE: u32 = 1000008;

/// The part of the instrument or acquisition a term describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TermCategory {
    InstrumentModel,
    MassAnalyzer,
    Detector,
    Ionization,
    Dissociation,
    Other,
}

/// A controlled vocabulary term known to this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Term {
    pub accession: u32,
    pub name: &'static str,
    pub category: TermCategory,
}

impl Term {
    const fn new(accession: u32, name: &'static str, category: TermCategory) -> Self {
        Self {
            accession,
            name,
            category,
        }
    }

    /// Whether this is the parent term naming a whole category rather than a member of it
    pub const fn is_category_root(&self) -> bool {
        matches!(
            self.accession,
            INSTRUMENT_MODEL | MASS_ANALYZER_TYPE | DETECTOR_TYPE | IONIZATION_TYPE
        )
    }

    pub fn curie(&self) -> String {
        format!("MS:{:07}", self.accession)
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.curie())
    }
}

use TermCategory::*;

const TERMS: &[Term] = &[
    Term::new(MS_LEVEL, "ms level", Other),
    Term::new(CENTROID_SPECTRUM, "centroid spectrum", Other),
    Term::new(PROFILE_SPECTRUM, "profile spectrum", Other),
    Term::new(NEGATIVE_SCAN, "negative scan", Other),
    Term::new(POSITIVE_SCAN, "positive scan", Other),
    Term::new(TOTAL_ION_CURRENT, "total ion current", Other),
    Term::new(TOTAL_ION_CURRENT_CHROMATOGRAM, "total ion current chromatogram", Other),
    Term::new(SCAN_START_TIME, "scan start time", Other),
    Term::new(FILTER_STRING, "filter string", Other),
    Term::new(PRESET_SCAN_CONFIGURATION, "preset scan configuration", Other),
    Term::new(ION_INJECTION_TIME, "ion injection time", Other),
    Term::new(SCAN_WINDOW_LOWER_LIMIT, "scan window lower limit", Other),
    Term::new(SCAN_WINDOW_UPPER_LIMIT, "scan window upper limit", Other),
    Term::new(ION_MOBILITY_DRIFT_TIME, "ion mobility drift time", Other),
    Term::new(INVERSE_REDUCED_ION_MOBILITY, "inverse reduced ion mobility", Other),
    Term::new(FAIMS_COMPENSATION_VOLTAGE, "FAIMS compensation voltage", Other),
    Term::new(ISOLATION_WINDOW_TARGET_MZ, "isolation window target m/z", Other),
    Term::new(ISOLATION_WINDOW_LOWER_OFFSET, "isolation window lower offset", Other),
    Term::new(ISOLATION_WINDOW_UPPER_OFFSET, "isolation window upper offset", Other),
    Term::new(SELECTED_ION_MZ, "selected ion m/z", Other),
    Term::new(CHARGE_STATE, "charge state", Other),
    Term::new(COLLISION_ENERGY, "collision energy", Other),
    Term::new(INSTRUMENT_SERIAL_NUMBER, "instrument serial number", Other),
    // Dissociation methods
    Term::new(COLLISION_INDUCED_DISSOCIATION, "collision-induced dissociation", Dissociation),
    Term::new(BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION, "beam-type collision-induced dissociation", Dissociation),
    Term::new(HIGHER_ENERGY_BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION, "higher energy beam-type collision-induced dissociation", Dissociation),
    Term::new(TRAP_TYPE_COLLISION_INDUCED_DISSOCIATION, "trap-type collision-induced dissociation", Dissociation),
    Term::new(ELECTRON_TRANSFER_DISSOCIATION, "electron transfer dissociation", Dissociation),
    Term::new(NEGATIVE_ELECTRON_TRANSFER_DISSOCIATION, "negative electron transfer dissociation", Dissociation),
    Term::new(ELECTRON_CAPTURE_DISSOCIATION, "electron capture dissociation", Dissociation),
    Term::new(PULSED_Q_DISSOCIATION, "pulsed q dissociation", Dissociation),
    Term::new(ULTRAVIOLET_PHOTODISSOCIATION, "ultraviolet photodissociation", Dissociation),
    Term::new(SUPPLEMENTAL_COLLISION_INDUCED_DISSOCIATION, "supplemental collision-induced dissociation", Dissociation),
    Term::new(SUPPLEMENTAL_BEAM_TYPE_COLLISION_INDUCED_DISSOCIATION, "supplemental beam-type collision-induced dissociation", Dissociation),
    // Instrument models
    Term::new(INSTRUMENT_MODEL, "instrument model", InstrumentModel),
    Term::new(1000447, "LTQ", InstrumentModel),
    Term::new(1000448, "LTQ FT", InstrumentModel),
    Term::new(1000449, "LTQ Orbitrap", InstrumentModel),
    Term::new(1000556, "LTQ Orbitrap XL", InstrumentModel),
    Term::new(1001742, "LTQ Orbitrap Velos", InstrumentModel),
    Term::new(1001911, "Q Exactive", InstrumentModel),
    Term::new(1002523, "Q Exactive HF", InstrumentModel),
    Term::new(1002416, "Orbitrap Fusion", InstrumentModel),
    Term::new(1002732, "Orbitrap Fusion Lumos", InstrumentModel),
    Term::new(1003028, "Orbitrap Exploris 480", InstrumentModel),
    Term::new(1003005, "timsTOF Pro", InstrumentModel),
    // Mass analyzers
    Term::new(MASS_ANALYZER_TYPE, "mass analyzer type", MassAnalyzer),
    Term::new(1000484, "orbitrap", MassAnalyzer),
    Term::new(1000083, "radial ejection linear ion trap", MassAnalyzer),
    Term::new(1000078, "axial ejection linear ion trap", MassAnalyzer),
    Term::new(1000082, "quadrupole ion trap", MassAnalyzer),
    Term::new(1000081, "quadrupole", MassAnalyzer),
    Term::new(1000084, "time-of-flight", MassAnalyzer),
    Term::new(1000079, "fourier transform ion cyclotron resonance mass spectrometer", MassAnalyzer),
    Term::new(1000080, "magnetic sector", MassAnalyzer),
    // Detectors
    Term::new(DETECTOR_TYPE, "detector type", Detector),
    Term::new(1000624, "inductive detector", Detector),
    Term::new(1000253, "electron multiplier", Detector),
    Term::new(1000114, "microchannel plate detector", Detector),
    Term::new(1000116, "photomultiplier", Detector),
    // Ionization
    Term::new(IONIZATION_TYPE, "ionization type", Ionization),
    Term::new(1000073, "electrospray ionization", Ionization),
    Term::new(1000398, "nanoelectrospray", Ionization),
    Term::new(1000075, "matrix-assisted laser desorption ionization", Ionization),
    Term::new(1000070, "atmospheric pressure chemical ionization", Ionization),
    Term::new(1000057, "electrospray inlet", Ionization),
    Term::new(1000485, "nanospray inlet", Ionization),
];

static TERMS_BY_ACCESSION: LazyLock<HashMap<u32, &'static Term>> =
    LazyLock::new(|| TERMS.iter().map(|t| (t.accession, t)).collect());

/// Look up a known term by its accession number
pub fn term(accession: u32) -> Option<&'static Term> {
    TERMS_BY_ACCESSION.get(&accession).copied()
}

/// The name of a known term, or an empty string
pub fn term_name(accession: u32) -> &'static str {
    term(accession).map(|t| t.name).unwrap_or_default()
}

pub fn term_category(accession: u32) -> Option<TermCategory> {
    term(accession).map(|t| t.category)
}

/// Look up a known term that is a member of `category`, excluding the category's parent term
pub fn member_term(accession: u32, category: TermCategory) -> Option<&'static Term> {
    term(accession).filter(|t| t.category == category && !t.is_category_root())
}
