#[allow(unused)]
use std::io::prelude::*;
use std::fmt::Display;

use indexmap::map::{Iter, Keys};
use indexmap::IndexMap;
use thiserror::Error;

use super::traits::SpectrumSource;

/// The native identity of a scan, independent of its position in the source.
///
/// Ordering is frame-major, sub-scan-minor, matching native enumeration order
/// of frame-based sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanKey {
    /// A linear vendor scan number
    Scan(u32),
    /// A (frame, sub-scan) pair from ion mobility and TDF sources
    FrameScan { frame: u32, scan: u32 },
}

impl ScanKey {
    pub fn frame_scan(frame: u32, scan: u32) -> Self {
        Self::FrameScan { frame, scan }
    }

    pub fn scan_number(&self) -> u32 {
        match self {
            Self::Scan(scan) => *scan,
            Self::FrameScan { scan, .. } => *scan,
        }
    }

    pub fn frame_number(&self) -> Option<u32> {
        match self {
            Self::Scan(_) => None,
            Self::FrameScan { frame, .. } => Some(*frame),
        }
    }

    /// Extract a key from a native id.
    ///
    /// A `frame=<f>` entry together with `scan=<s>` yields [`ScanKey::FrameScan`],
    /// otherwise `scan=<n>` yields [`ScanKey::Scan`]. Other `key=value` entries
    /// are ignored.
    pub fn from_native_id(native_id: &str) -> Option<Self> {
        let mut frame = None;
        let mut scan = None;
        for part in native_id.split_ascii_whitespace() {
            if let Some((k, v)) = part.split_once('=') {
                match k {
                    "frame" => frame = v.parse::<u32>().ok(),
                    "scan" => scan = v.parse::<u32>().ok(),
                    _ => {}
                }
            }
        }
        match (frame, scan) {
            (Some(frame), Some(scan)) => Some(Self::FrameScan { frame, scan }),
            (None, Some(scan)) => Some(Self::Scan(scan)),
            _ => None,
        }
    }
}

impl Display for ScanKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan(scan) => write!(f, "scan={scan}"),
            Self::FrameScan { frame, scan } => write!(f, "frame={frame} scan={scan}"),
        }
    }
}

impl From<u32> for ScanKey {
    fn from(value: u32) -> Self {
        Self::Scan(value)
    }
}

impl From<(u32, u32)> for ScanKey {
    fn from(value: (u32, u32)) -> Self {
        Self::FrameScan {
            frame: value.0,
            scan: value.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanIndexError {
    #[error("The scan key {0} was not found")]
    KeyNotFound(ScanKey),
    #[error("The spectrum index {0} was not found")]
    IndexNotFound(usize),
}

/**
A mapping from native scan identity to the dense, zero-based spectrum index,
ordered by native enumeration order.

A wrapper around [`indexmap::IndexMap`]. Built once per opened source and
immutable thereafter.
*/
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanToIndexMap {
    /// The mapping from key to spectrum index, ordered by occurrence
    #[cfg_attr(feature = "serde", serde(with = "indexmap::map::serde_seq"))]
    offsets: IndexMap<ScanKey, usize>,

    /// The key of each spectrum index, `None` where the native id was skipped
    keys_by_index: Vec<Option<ScanKey>>,

    /// The number of spectra the source reported when the map was built
    spectrum_count: usize,
}

impl ScanToIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every native id from `source` once, in native order, assigning
    /// indices `0..N-1`.
    ///
    /// Native ids that cannot be read or that carry no recognizable key are
    /// skipped with a warning, leaving the map partial (see [`ScanToIndexMap::is_total`]).
    pub fn build<S: SpectrumSource + ?Sized>(source: &mut S) -> Self {
        let n = source.len();
        let mut this = Self {
            offsets: IndexMap::with_capacity(n),
            keys_by_index: vec![None; n],
            spectrum_count: n,
        };
        for i in 0..n {
            let native_id = match source.native_id(i) {
                Ok(native_id) => native_id,
                Err(e) => {
                    log::warn!("Failed to read the native id of spectrum {i}: {e}");
                    continue;
                }
            };
            match ScanKey::from_native_id(&native_id) {
                Some(key) => {
                    if let Some(prev) = this.offsets.get(&key) {
                        log::warn!(
                            "Duplicate scan key {key} at spectrum {i}, keeping spectrum {prev}"
                        );
                    } else {
                        this.offsets.insert(key, i);
                        this.keys_by_index[i] = Some(key);
                    }
                }
                None => {
                    log::warn!("No scan key in native id {native_id:?} of spectrum {i}");
                }
            }
        }
        log::debug!(
            "Built scan index with {} keys over {} spectra",
            this.offsets.len(),
            this.spectrum_count
        );
        this
    }

    /// Get the spectrum index of the specified key
    #[inline]
    pub fn get(&self, key: &ScanKey) -> Option<usize> {
        self.offsets.get(key).copied()
    }

    /// Get the spectrum index of the specified key, failing when it is absent.
    ///
    /// Callers probing arbitrary keys should iterate the map instead, as
    /// partially acquired files may have gaps in their key space.
    pub fn index_of(&self, key: &ScanKey) -> Result<usize, ScanIndexError> {
        self.get(key).ok_or(ScanIndexError::KeyNotFound(*key))
    }

    /// Get the key of the spectrum at `index`
    pub fn key_of(&self, index: usize) -> Result<ScanKey, ScanIndexError> {
        self.keys_by_index
            .get(index)
            .copied()
            .flatten()
            .ok_or(ScanIndexError::IndexNotFound(index))
    }

    /// Get the associated key and index for the specified position in the map
    #[inline]
    pub fn get_index(&self, position: usize) -> Option<(ScanKey, usize)> {
        self.offsets.get_index(position).map(|(k, i)| (*k, *i))
    }

    /// Insert `key` with a spectrum index, returning the previous index if the key was present
    #[inline]
    pub fn insert<K: Into<ScanKey>>(&mut self, key: K, index: usize) -> Option<usize> {
        let key = key.into();
        self.spectrum_count = self.spectrum_count.max(index + 1);
        if self.keys_by_index.len() <= index {
            self.keys_by_index.resize(index + 1, None);
        }
        if let Some(displaced) = self.keys_by_index[index].replace(key) {
            if displaced != key {
                self.offsets.shift_remove(&displaced);
            }
        }
        let prev = self.offsets.insert(key, index);
        if let Some(prev) = prev.filter(|prev| *prev != index) {
            self.keys_by_index[prev] = None;
        }
        prev
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn spectrum_count(&self) -> usize {
        self.spectrum_count
    }

    /// Whether every index in `0..spectrum_count` has a key
    pub fn is_total(&self) -> bool {
        self.offsets.len() == self.spectrum_count
    }

    pub fn keys(&self) -> Keys<'_, ScanKey, usize> {
        self.offsets.keys()
    }

    /// Iterate over the keys and indices
    pub fn iter(&self) -> Iter<'_, ScanKey, usize> {
        self.offsets.iter()
    }

    /// Check if the key is in the map
    #[inline]
    pub fn contains_key(&self, key: &ScanKey) -> bool {
        self.offsets.contains_key(key)
    }

    #[cfg(feature = "serde")]
    /// Write the map out in JSON format to `writer`
    pub fn to_writer<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }

    #[cfg(feature = "serde")]
    /// Read a map in JSON format from `reader`
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

impl<'a> IntoIterator for &'a ScanToIndexMap {
    type Item = (&'a ScanKey, &'a usize);
    type IntoIter = Iter<'a, ScanKey, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
