//! Reading spectra out of native vendor readers and normalizing them.
pub mod memory;
pub mod options;
pub mod reader;
pub mod scan_index;
pub mod source_kind;
pub mod traits;

pub use crate::io::memory::MemorySource;
pub use crate::io::options::{DetailLevel, ReaderOptions};
pub use crate::io::reader::{MSDataReader, SpectrumIter, TicComparison, TIC_RELATIVE_TOLERANCE};
pub use crate::io::scan_index::{ScanIndexError, ScanKey, ScanToIndexMap};
pub use crate::io::source_kind::{is_sqlite_prefix, is_thermo_raw_prefix, SourceKind};
pub use crate::io::traits::{
    RawChromatogram, RawSpectrum, SourceOpenError, SpectrumAccessError, SpectrumSource,
};
