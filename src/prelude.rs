//! Traits needed to work with readers and CV parameter bearing records
pub use crate::io::SpectrumSource;
pub use crate::meta::MSDataFileMetadata;
pub use crate::params::ParamDescribed;
