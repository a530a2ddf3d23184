use indexmap::IndexMap;

use crate::spectrum::Spectrum;

use super::classify::ScanFilterClassification;
use super::collision_energy_is_reliable;

/// Filter and precursor collision energies closer than this agree
pub const COLLISION_ENERGY_TOLERANCE: f64 = 0.01;

/// A spectrum whose own MS level disagrees with the level its filter string implies
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelMismatch {
    pub index: usize,
    pub native_id: String,
    pub spectrum_level: u8,
    pub filter_level: u8,
}

/// A spectrum whose filter string collision energy disagrees with its precursor's
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionEnergyMismatch {
    pub index: usize,
    pub native_id: String,
    pub filter_energy: f64,
    pub precursor_energy: f64,
}

/// A grouped tally of scan classifications keyed by `(scan_type_tag, generic_filter)`.
///
/// Counts do not depend on the order scans are accumulated in. Disagreements
/// between the spectrum model and the filter strings are collected for the
/// caller rather than resolved.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanTypeSummary {
    #[cfg_attr(feature = "serde", serde(with = "indexmap::map::serde_seq"))]
    counts: IndexMap<(String, String), usize>,
    /// Spectra with `level == 1`, counted from the spectrum model
    pub ms1_count: usize,
    /// Spectra with `level > 1`, counted from the spectrum model
    pub msn_count: usize,
    pub dia_count: usize,
    pub dependent_count: usize,
    pub unknown_count: usize,
    pub level_mismatches: Vec<LevelMismatch>,
    pub collision_energy_mismatches: Vec<CollisionEnergyMismatch>,
}

impl ScanTypeSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally one classification
    pub fn accumulate(&mut self, classification: &ScanFilterClassification) {
        *self
            .counts
            .entry((
                classification.scan_type_tag.clone(),
                classification.generic_filter.clone(),
            ))
            .or_default() += 1;
        if classification.is_unknown() {
            self.unknown_count += 1;
        }
        if classification.is_dia() {
            self.dia_count += 1;
        }
        if classification.is_dependent() {
            self.dependent_count += 1;
        }
    }

    /// Tally one classification together with the spectrum it describes,
    /// cross-checking the MS level and the collision energy.
    pub fn accumulate_spectrum(
        &mut self,
        spectrum: &Spectrum,
        classification: &ScanFilterClassification,
    ) {
        self.accumulate(classification);
        if spectrum.level > 1 {
            self.msn_count += 1;
        } else {
            self.ms1_count += 1;
        }

        if !classification.is_unknown() && classification.ms_level != spectrum.level {
            log::warn!(
                "Spectrum {} ({}) has MS level {} but its filter implies {}",
                spectrum.index,
                spectrum.native_id,
                spectrum.level,
                classification.ms_level
            );
            self.level_mismatches.push(LevelMismatch {
                index: spectrum.index,
                native_id: spectrum.native_id.clone(),
                spectrum_level: spectrum.level,
                filter_level: classification.ms_level,
            });
        }

        let Some(precursor) = spectrum.precursors.first() else {
            return;
        };
        if !collision_energy_is_reliable(&precursor.activation_types)
            || !collision_energy_is_reliable(&classification.activation_methods())
        {
            return;
        }
        if let (Some(filter_energy), Some(precursor_energy)) =
            (classification.collision_energy(), precursor.collision_energy)
        {
            if (filter_energy - precursor_energy).abs() > COLLISION_ENERGY_TOLERANCE {
                log::warn!(
                    "Spectrum {} ({}) has collision energy {precursor_energy} but its filter says {filter_energy}",
                    spectrum.index,
                    spectrum.native_id,
                );
                self.collision_energy_mismatches
                    .push(CollisionEnergyMismatch {
                        index: spectrum.index,
                        native_id: spectrum.native_id.clone(),
                        filter_energy,
                        precursor_energy,
                    });
            }
        }
    }

    /// The number of scans tallied under `(scan_type_tag, generic_filter)`
    pub fn count(&self, scan_type_tag: &str, generic_filter: &str) -> usize {
        self.counts
            .get(&(scan_type_tag.to_string(), generic_filter.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// The number of distinct `(scan_type_tag, generic_filter)` groups
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, usize)> {
        self.counts
            .iter()
            .map(|((tag, filter), n)| (tag.as_str(), filter.as_str(), *n))
    }

    /// The groups sorted by key, for stable reporting
    pub fn sorted_counts(&self) -> Vec<(&str, &str, usize)> {
        let mut counts: Vec<_> = self.iter().collect();
        counts.sort_unstable();
        counts
    }

    /// Counts grouped by scan type tag alone, in first-seen order
    pub fn scan_type_counts(&self) -> IndexMap<&str, usize> {
        let mut counts = IndexMap::new();
        for (tag, _, n) in self.iter() {
            *counts.entry(tag).or_default() += n;
        }
        counts
    }

    /// Whether the spectrum model and the filter strings agree everywhere
    pub fn is_consistent(&self) -> bool {
        self.level_mismatches.is_empty() && self.collision_energy_mismatches.is_empty()
    }

    /// Fold another summary into this one
    pub fn merge(&mut self, other: ScanTypeSummary) {
        for (key, n) in other.counts {
            *self.counts.entry(key).or_default() += n;
        }
        self.ms1_count += other.ms1_count;
        self.msn_count += other.msn_count;
        self.dia_count += other.dia_count;
        self.dependent_count += other.dependent_count;
        self.unknown_count += other.unknown_count;
        self.level_mismatches.extend(other.level_mismatches);
        self.collision_energy_mismatches
            .extend(other.collision_energy_mismatches);
    }
}

impl<'a> Extend<&'a ScanFilterClassification> for ScanTypeSummary {
    fn extend<T: IntoIterator<Item = &'a ScanFilterClassification>>(&mut self, iter: T) {
        iter.into_iter().for_each(|c| self.accumulate(c));
    }
}
