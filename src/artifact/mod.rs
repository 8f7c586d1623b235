//! Artifact types and the cycle date that parametrizes them.

mod builtin;
mod cycle;
mod descriptor;

pub use builtin::{AQM_RC, ArtifactKind, NEMS_CONFIGURE};
pub use cycle::CycleDate;
pub use descriptor::{ArtifactDescriptor, ArtifactTarget, FieldRule, FieldSource};

pub(crate) use descriptor::{PatternPart, parse_pattern};
