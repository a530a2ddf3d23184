use std::borrow::Cow;

use super::tokens::{lex, FilterToken};

/// Rebuild a filter from its lexemes with the numeric specifics of each
/// scan normalized out.
pub(crate) fn generic_filter_of(lexemes: &[&str], include_precursor_mz: bool) -> String {
    let parts: Vec<Cow<'_, str>> = lexemes
        .iter()
        .copied()
        .filter_map(|lexeme| match FilterToken::classify(lexeme) {
            FilterToken::MassRanges(_) => None,
            FilterToken::Precursor(_) if !include_precursor_mz => {
                let stages = lexeme.split_once('@').map(|(_, s)| s).unwrap_or_default();
                Some(Cow::Owned(format!("0@{stages}")))
            }
            FilterToken::Number(_) if !include_precursor_mz => Some(Cow::Borrowed("0")),
            _ => Some(Cow::Borrowed(lexeme)),
        })
        .collect();
    parts.join(" ")
}

/// Normalize a filter string into an aggregation key.
///
/// Bracketed mass lists are dropped, precursor m/z values become `0` unless
/// `include_precursor_mz` is set, and runs of whitespace collapse to a single
/// space. Activation energies and the FAIMS `cv=` value are kept. Applying
/// this twice gives the same result as applying it once.
pub fn make_generic_filter(text: &str, include_precursor_mz: bool) -> String {
    generic_filter_of(&lex(text), include_precursor_mz)
}
