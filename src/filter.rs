//! Classify vendor filter strings and tally scans by acquisition shape.
//!
//! A filter string is split into whitespace separated lexemes (bracketed
//! mass lists stay whole), each lexeme is classified on its own, and the
//! classified tokens are folded into a [`ScanFilterClassification`]. Tokens
//! that are not recognized are skipped, so a truncated or corrupt string
//! never fails.
mod classify;
mod generic;
mod summary;
pub mod tokens;

pub use classify::{
    ActivationStage, FilterParser, MassRange, ScanFilterClassification, ScanFlags,
};
pub use generic::make_generic_filter;
pub use summary::{
    CollisionEnergyMismatch, LevelMismatch, ScanTypeSummary, COLLISION_ENERGY_TOLERANCE,
};
pub use tokens::{FilterToken, MassAnalyzer, ScanRole};

/// MSn scans isolated at least this wide (in m/z) are taken to be DIA.
///
/// An empirical threshold, not a vendor-reported property.
pub const DIA_ISOLATION_WIDTH_THRESHOLD: f64 = 6.5;

/// The scan type tag of a filter string with no scan role or MS level
pub const UNKNOWN_SCAN_TYPE: &str = "Unknown";

/// Some acquisition software reports a meaningless collision energy on ETD
/// scans, so collision energy comparisons skip any scan activated by ETD.
pub const ETD_COLLISION_ENERGY_UNRELIABLE: bool = true;

/// Whether the collision energy recorded for these activation methods can be compared
pub fn collision_energy_is_reliable<S: AsRef<str>>(activation_types: &[S]) -> bool {
    !(ETD_COLLISION_ENERGY_UNRELIABLE && activation_types.iter().any(|a| a.as_ref() == "etd"))
}

/// Classify a filter string. A pure function of `text`.
pub fn parse_filter_text(text: &str) -> ScanFilterClassification {
    ScanFilterClassification::parse(text)
}
