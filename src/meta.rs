//! Metadata describing the instrument and the acquisition run as a whole
pub mod instrument;
pub mod run;
mod traits;

pub use crate::meta::instrument::{
    Component, ComponentType, InstrumentConfiguration, InstrumentDescription,
};
pub use crate::meta::run::{MassSpectrometryRun, RunStartTime, StartTimeConvention};
pub use crate::meta::traits::MSDataFileMetadata;
