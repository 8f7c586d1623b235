//! Definition loading for the configuration generator.
//!
//! This module handles everything that happens before a settings object is
//! assembled:
//! - Loading shell-style or structured variable-definition files
//! - Flattening nested groups into a single set of definitions
//! - Typing raw definition tokens

mod definitions;
mod loader;
mod typer;

pub use definitions::Definitions;
pub use loader::{DefinitionFormat, DefinitionLoader};
pub use typer::infer_type;
