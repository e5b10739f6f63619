//! Input surfaces: the binary amplitude file and its sidecar metadata.

pub mod amplitudes;
pub mod metadata;

pub use amplitudes::{AmplitudeFile, AmplitudeSource};
pub use metadata::InfMetadata;
