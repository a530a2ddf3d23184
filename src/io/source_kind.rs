//! Resolve which vendor family a path belongs to, and how that family formats
//! its spectrum identifiers.
use std::fmt::Display;
use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;

use super::scan_index::ScanKey;
use super::traits::SourceOpenError;
use crate::meta::StartTimeConvention;

/// The vendor family of an opened data source, resolved once at open time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    /// Thermo RAW files, addressed by linear scan number
    Thermo,
    /// Bruker `.d` directories. BAF data is addressed by scan number, TDF data
    /// by (frame, scan) pairs.
    Bruker,
    /// UIMF ion mobility files, addressed by (frame, scan) pairs
    IonMobility,
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How one source kind turns a [`ScanKey`] into its native id and short id
struct IdFormat {
    native_id: fn(&ScanKey) -> String,
    id: fn(&ScanKey) -> String,
}

fn thermo_native_id(key: &ScanKey) -> String {
    format!(
        "controllerType=0 controllerNumber=1 scan={}",
        key.scan_number()
    )
}

fn thermo_id(key: &ScanKey) -> String {
    format!("0.1.{}", key.scan_number())
}

fn generic_native_id(key: &ScanKey) -> String {
    key.to_string()
}

fn generic_id(key: &ScanKey) -> String {
    match key {
        ScanKey::Scan(scan) => scan.to_string(),
        ScanKey::FrameScan { frame, scan } => format!("{frame}.{scan}"),
    }
}

fn ion_mobility_native_id(key: &ScanKey) -> String {
    match key {
        ScanKey::Scan(scan) => format!("scan={scan}"),
        ScanKey::FrameScan { frame, scan } => format!("frame={frame} scan={scan} frameType=1"),
    }
}

// Indexed by `SourceKind as usize`
static ID_FORMATS: [IdFormat; 3] = [
    IdFormat {
        native_id: thermo_native_id,
        id: thermo_id,
    },
    IdFormat {
        native_id: generic_native_id,
        id: generic_id,
    },
    IdFormat {
        native_id: ion_mobility_native_id,
        id: ion_mobility_native_id,
    },
];

impl SourceKind {
    fn id_format(&self) -> &'static IdFormat {
        &ID_FORMATS[*self as usize]
    }

    /// Format the vendor native id for `key`
    pub fn format_native_id(&self, key: &ScanKey) -> String {
        (self.id_format().native_id)(key)
    }

    /// Format the short spectrum id for `key`
    pub fn format_id(&self, key: &ScanKey) -> String {
        (self.id_format().id)(key)
    }

    /// Bruker acquisition software records the run start time in UTC while the
    /// other families record instrument local time.
    pub fn start_time_convention(&self) -> StartTimeConvention {
        match self {
            Self::Bruker => StartTimeConvention::Utc,
            Self::Thermo | Self::IonMobility => StartTimeConvention::LocalTime,
        }
    }

    /// Infer the source kind from the shape of `path` and the header bytes of
    /// the file it names.
    pub fn infer_from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceOpenError> {
        let path = path.as_ref();
        let io_error = |source: io::Error| SourceOpenError::Io {
            path: path.to_path_buf(),
            source,
        };
        let metadata = fs::metadata(path).map_err(io_error)?;

        if metadata.is_dir() {
            if path.join("analysis.tdf").exists() || path.join("analysis.baf").exists() {
                return Ok(Self::Bruker);
            }
            return Err(SourceOpenError::UnrecognizedFormat(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let mut buffer = [0u8; 18];
        let mut handle = fs::File::open(path).map_err(io_error)?;
        let n = read_prefix(&mut handle, &mut buffer).map_err(io_error)?;
        let header = &buffer[..n];

        let corrupt = |reason: &str| SourceOpenError::CorruptHeader {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        match extension.as_str() {
            "raw" => {
                if is_thermo_raw_prefix(header) {
                    Ok(Self::Thermo)
                } else {
                    Err(corrupt("missing Finnigan signature"))
                }
            }
            "uimf" => {
                if is_sqlite_prefix(header) {
                    Ok(Self::IonMobility)
                } else {
                    Err(corrupt("missing SQLite signature"))
                }
            }
            _ if is_thermo_raw_prefix(header) => Ok(Self::Thermo),
            _ => Err(SourceOpenError::UnrecognizedFormat(path.to_path_buf())),
        }
    }
}

fn read_prefix<R: Read>(handle: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buffer.len() {
        match handle.read(&mut buffer[total..])? {
            0 => break,
            n => total += n,
        }
    }
    Ok(total)
}

/// Check to see if a buffer contains the header of a Thermo RAW file
///
/// Thermo RAW files start with a UTF-16 header with "Finnigan" at
/// codepoints 1-9.
pub fn is_thermo_raw_prefix(buffer: &[u8]) -> bool {
    if buffer.len() < 18 {
        return false;
    }
    let view: Vec<u16> = buffer[2..18]
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&view) == "Finnigan"
}

/// Check to see if a buffer starts with the SQLite database signature, as UIMF files do
pub fn is_sqlite_prefix(buffer: &[u8]) -> bool {
    buffer.starts_with(b"SQLite format 3\0")
}

#[cfg(test)]
mod test {
    use super::*;

    fn thermo_header() -> Vec<u8> {
        let mut buf = vec![0x01, 0xA1];
        for c in "Finnigan".encode_utf16() {
            buf.extend(c.to_le_bytes());
        }
        buf.extend([0u8; 32]);
        buf
    }

    #[test]
    fn test_id_formats() {
        let key = ScanKey::Scan(42);
        assert_eq!(
            SourceKind::Thermo.format_native_id(&key),
            "controllerType=0 controllerNumber=1 scan=42"
        );
        assert_eq!(SourceKind::Thermo.format_id(&key), "0.1.42");
        assert_eq!(SourceKind::Bruker.format_native_id(&key), "scan=42");
        assert_eq!(SourceKind::Bruker.format_id(&key), "42");

        let key = ScanKey::frame_scan(21, 90);
        assert_eq!(
            SourceKind::IonMobility.format_native_id(&key),
            "frame=21 scan=90 frameType=1"
        );
        assert_eq!(
            SourceKind::IonMobility.format_id(&key),
            SourceKind::IonMobility.format_native_id(&key)
        );
        assert_eq!(SourceKind::Bruker.format_native_id(&key), "frame=21 scan=90");

        for kind in [SourceKind::Thermo, SourceKind::Bruker, SourceKind::IonMobility] {
            let key = ScanKey::Scan(7);
            assert_eq!(
                ScanKey::from_native_id(&kind.format_native_id(&key)),
                Some(key)
            );
        }
    }

    #[test]
    fn test_prefixes() {
        assert!(is_thermo_raw_prefix(&thermo_header()));
        assert!(!is_thermo_raw_prefix(b"Finnigan"));
        assert!(is_sqlite_prefix(b"SQLite format 3\0\x10\x00"));
        assert!(!is_sqlite_prefix(b"SQLite"));
    }

    #[test]
    fn test_infer_from_path() -> io::Result<()> {
        let dir = tempfile::tempdir()?;

        let raw_path = dir.path().join("small.RAW");
        fs::write(&raw_path, thermo_header())?;
        assert_eq!(SourceKind::infer_from_path(&raw_path).unwrap(), SourceKind::Thermo);

        let corrupt_path = dir.path().join("corrupt.raw");
        fs::write(&corrupt_path, b"not a raw file at all")?;
        assert!(matches!(
            SourceKind::infer_from_path(&corrupt_path),
            Err(SourceOpenError::CorruptHeader { .. })
        ));

        let uimf_path = dir.path().join("run.uimf");
        fs::write(&uimf_path, b"SQLite format 3\0 and then some pages")?;
        assert_eq!(SourceKind::infer_from_path(&uimf_path).unwrap(), SourceKind::IonMobility);

        let bruker_path = dir.path().join("run.d");
        fs::create_dir(&bruker_path)?;
        assert!(matches!(
            SourceKind::infer_from_path(&bruker_path),
            Err(SourceOpenError::UnrecognizedFormat(_))
        ));
        fs::write(bruker_path.join("analysis.tdf"), b"")?;
        assert_eq!(SourceKind::infer_from_path(&bruker_path).unwrap(), SourceKind::Bruker);

        assert!(matches!(
            SourceKind::infer_from_path(dir.path().join("missing.raw")),
            Err(SourceOpenError::Io { .. })
        ));
        Ok(())
    }
}
