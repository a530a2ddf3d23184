//! Split a filter string into lexemes and classify each lexeme.
use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;

use crate::spectrum::ScanPolarity;

use super::classify::{ActivationStage, MassRange, ScanFlags};

static PRECURSOR_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d*)?)@(.*)$").unwrap());

static ACTIVATION_STAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]*)(-?\d+(?:\.\d*)?)?$").unwrap());

static MS_LEVEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ms(\d*)$").unwrap());

static MASS_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:\.\d*)?)\s*-\s*(\d+(?:\.\d*)?)\s*$").unwrap());

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d*)?$").unwrap());

const IONIZATION_SOURCES: &[&str] = &[
    "NSI", "ESI", "APCI", "APPI", "EI", "CI", "MALDI", "FAB", "GD", "TSP", "FI", "FD", "CSI",
    "PSI",
];

/// The mass analyzer named at the head of a filter string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MassAnalyzer {
    FTMS,
    ITMS,
    ASTMS,
    TOFMS,
    SQMS,
    TQMS,
    Sector,
}

impl MassAnalyzer {
    pub fn from_token(token: &str) -> Option<Self> {
        let analyzer = match token {
            "FTMS" => Self::FTMS,
            "ITMS" => Self::ITMS,
            "ASTMS" => Self::ASTMS,
            "TOFMS" => Self::TOFMS,
            "SQMS" => Self::SQMS,
            "TQMS" => Self::TQMS,
            "Sector" => Self::Sector,
            _ => return None,
        };
        Some(analyzer)
    }

    /// Orbitrap, Astral and time-of-flight analyzers acquire high resolution scans
    pub fn is_high_resolution(&self) -> bool {
        matches!(self, Self::FTMS | Self::ASTMS | Self::TOFMS)
    }
}

impl Display for MassAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The acquisition role keyword of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanRole {
    Full,
    SIM,
    Zoom,
    SRM,
    CRM,
    Q1MS,
    Q3MS,
    /// Constant neutral loss
    ConstantNeutralLoss,
}

impl ScanRole {
    pub fn from_token(token: &str) -> Option<Self> {
        let role = match token {
            "Full" => Self::Full,
            "SIM" => Self::SIM,
            "Z" => Self::Zoom,
            "SRM" => Self::SRM,
            "CRM" => Self::CRM,
            "Q1MS" => Self::Q1MS,
            "Q3MS" => Self::Q3MS,
            "cnl" => Self::ConstantNeutralLoss,
            _ => return None,
        };
        Some(role)
    }

    /// Whether a bracket list after this role lists targeted precursors
    pub fn targets_precursors(&self) -> bool {
        matches!(self, Self::SRM | Self::Q1MS | Self::Q3MS)
    }
}

/// One `<mz>@<method><energy>[@<method><energy>...]` clause
#[derive(Debug, Clone, PartialEq)]
pub struct PrecursorClause {
    pub mz: f64,
    pub stages: Vec<ActivationStage>,
}

impl PrecursorClause {
    pub fn parse(lexeme: &str) -> Option<Self> {
        let caps = PRECURSOR_CLAUSE.captures(lexeme)?;
        let mz = caps.get(1)?.as_str().parse().ok()?;
        let rest = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let mut stages = Vec::new();
        for part in rest.split('@') {
            let Some(caps) = ACTIVATION_STAGE.captures(part) else {
                log::trace!("Skipping malformed activation stage {part:?} in {lexeme:?}");
                continue;
            };
            let method = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let energy = caps
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or_default();
            if method.is_empty() && caps.get(2).is_none() {
                continue;
            }
            let method = if method.is_empty() {
                "cid".to_string()
            } else {
                method.to_lowercase()
            };
            stages.push(ActivationStage::new(method, energy));
        }
        Some(Self { mz, stages })
    }
}

/// A classified lexeme of a filter string
#[derive(Debug, Clone, PartialEq)]
pub enum FilterToken<'a> {
    Analyzer(MassAnalyzer),
    Polarity(ScanPolarity),
    /// `c` for centroid, `p` for profile
    DataMode { centroid: bool },
    Ionization(&'a str),
    Flag(ScanFlags),
    /// An acquisition rate qualifier with no effect on classification
    Qualifier(&'a str),
    CompensationVoltage(f64),
    Role(ScanRole),
    MsLevel(u8),
    Precursor(PrecursorClause),
    MassRanges(Vec<MassRange>),
    Number(f64),
    Unknown(&'a str),
}

impl<'a> FilterToken<'a> {
    pub fn classify(lexeme: &'a str) -> Self {
        if let Some(analyzer) = MassAnalyzer::from_token(lexeme) {
            return Self::Analyzer(analyzer);
        }
        if let Some(role) = ScanRole::from_token(lexeme) {
            return Self::Role(role);
        }
        match lexeme {
            "+" => return Self::Polarity(ScanPolarity::Positive),
            "-" => return Self::Polarity(ScanPolarity::Negative),
            "c" => return Self::DataMode { centroid: true },
            "p" => return Self::DataMode { centroid: false },
            "d" => return Self::Flag(ScanFlags::DEPENDENT),
            "r" => return Self::Flag(ScanFlags::ROLLING),
            "sa" => return Self::Flag(ScanFlags::SUPPLEMENTAL_ACTIVATION),
            "w" => return Self::Flag(ScanFlags::WIDEBAND),
            "lock" => return Self::Flag(ScanFlags::LOCK_MASS),
            "msx" => return Self::Flag(ScanFlags::MULTIPLEXED),
            "t" | "E" | "u" => return Self::Qualifier(lexeme),
            _ => {}
        }
        if IONIZATION_SOURCES.contains(&lexeme) {
            return Self::Ionization(lexeme);
        }
        if let Some(value) = lexeme.strip_prefix("cv=") {
            return match value.parse() {
                Ok(value) => Self::CompensationVoltage(value),
                Err(_) => Self::Unknown(lexeme),
            };
        }
        if let Some(caps) = MS_LEVEL.captures(lexeme) {
            let digits = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            if digits.is_empty() {
                return Self::MsLevel(1);
            }
            return match digits.parse() {
                Ok(level) if level > 0 => Self::MsLevel(level),
                _ => Self::Unknown(lexeme),
            };
        }
        if lexeme.starts_with('[') {
            return Self::MassRanges(parse_mass_ranges(lexeme));
        }
        if let Some(clause) = PrecursorClause::parse(lexeme) {
            return Self::Precursor(clause);
        }
        if NUMBER.is_match(lexeme) {
            if let Ok(value) = lexeme.parse() {
                return Self::Number(value);
            }
        }
        log::trace!("Unrecognized filter token {lexeme:?}");
        Self::Unknown(lexeme)
    }
}

/// Parse `[low-high, low-high, ...]`, skipping pairs that do not parse.
/// A missing closing bracket is tolerated.
pub fn parse_mass_ranges(lexeme: &str) -> Vec<MassRange> {
    let inner = lexeme.trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .filter_map(|pair| {
            let caps = MASS_RANGE.captures(pair)?;
            let low = caps.get(1)?.as_str().parse().ok()?;
            let high = caps.get(2)?.as_str().parse().ok()?;
            Some(MassRange::new(low, high))
        })
        .collect()
}

/// Split a filter string on whitespace, keeping each bracketed list together
/// as a single lexeme even when it contains spaces.
pub fn lex(text: &str) -> Vec<&str> {
    let mut lexemes = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_bracket = false;
    for (i, c) in text.char_indices() {
        if in_bracket {
            if c == ']' {
                if let Some(s) = start.take() {
                    lexemes.push(&text[s..i + 1]);
                }
                in_bracket = false;
            }
            continue;
        }
        if c == '[' {
            if let Some(s) = start.take() {
                lexemes.push(&text[s..i]);
            }
            start = Some(i);
            in_bracket = true;
        } else if c.is_whitespace() {
            if let Some(s) = start.take() {
                lexemes.push(&text[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        lexemes.push(&text[s..]);
    }
    lexemes
}

/// Lex and classify a filter string
pub fn tokenize(text: &str) -> impl Iterator<Item = (&str, FilterToken<'_>)> {
    lex(text)
        .into_iter()
        .map(|lexeme| (lexeme, FilterToken::classify(lexeme)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lex() {
        assert_eq!(
            lex("FTMS + p NSI Full ms [350.0000-1800.0000]"),
            vec!["FTMS", "+", "p", "NSI", "Full", "ms", "[350.0000-1800.0000]"]
        );
        assert_eq!(
            lex("  SRM ms2 500.00@cid25.00 [150.00-151.00, 200.00-201.00]  "),
            vec!["SRM", "ms2", "500.00@cid25.00", "[150.00-151.00, 200.00-201.00]"]
        );
        assert_eq!(lex("Full ms [120.00-"), vec!["Full", "ms", "[120.00-"]);
        assert!(lex("   ").is_empty());
    }

    #[test]
    fn test_precursor_clause() {
        let clause = PrecursorClause::parse("538.8400@etd53.58@cid20.00").unwrap();
        assert_eq!(clause.mz, 538.84);
        assert_eq!(
            clause.stages,
            vec![
                ActivationStage::new("etd", 53.58),
                ActivationStage::new("cid", 20.0)
            ]
        );

        let clause = PrecursorClause::parse("1312.95@45.00").unwrap();
        assert_eq!(clause.stages, vec![ActivationStage::new("cid", 45.0)]);

        let clause = PrecursorClause::parse("445.12@HCD30.00").unwrap();
        assert_eq!(clause.stages[0].method, "hcd");

        assert!(PrecursorClause::parse("cv=-45.00").is_none());
        assert!(PrecursorClause::parse("445.12").is_none());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            FilterToken::classify("FTMS"),
            FilterToken::Analyzer(MassAnalyzer::FTMS)
        );
        assert_eq!(FilterToken::classify("ms"), FilterToken::MsLevel(1));
        assert_eq!(FilterToken::classify("ms3"), FilterToken::MsLevel(3));
        assert_eq!(FilterToken::classify("ms0"), FilterToken::Unknown("ms0"));
        assert_eq!(
            FilterToken::classify("cv=-45.00"),
            FilterToken::CompensationVoltage(-45.0)
        );
        assert_eq!(FilterToken::classify("Z"), FilterToken::Role(ScanRole::Zoom));
        assert_eq!(FilterToken::classify("NSI"), FilterToken::Ionization("NSI"));
        assert_eq!(FilterToken::classify("412.5"), FilterToken::Number(412.5));
        assert_eq!(FilterToken::classify("@@@"), FilterToken::Unknown("@@@"));
        assert_eq!(
            FilterToken::classify("[100.0-200.0, 300.0-bad]"),
            FilterToken::MassRanges(vec![MassRange::new(100.0, 200.0)])
        );
    }
}
