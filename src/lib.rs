// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # AQM Configgen
//!
//! Generates runtime configuration files for coupled air-quality forecast
//! runs (`aqm.rc`, `nems.configure`) from a pool of workflow variable
//! definitions and a template.
//!
//! ## Overview
//!
//! Every artifact goes through the same pipeline:
//!
//! 1. **Load**: shell-style (`var_defns.sh`) or YAML/JSON definitions are
//!    read into a flat [`Definitions`] set
//! 2. **Type**: raw tokens become booleans, numbers, lists or strings
//! 3. **Assemble**: an artifact descriptor picks and derives the fields of a
//!    [`Settings`] object, including dated input file paths
//! 4. **Serialize**: the settings become a YAML-compatible block
//! 5. **Render**: the block is rendered through a template and written
//!    atomically into the run directory
//!
//! ## Modules
//!
//! - [`config`]: Definition loading and value typing
//! - [`settings`]: Settings objects, assembly and serialization
//! - [`artifact`]: Artifact descriptors and cycle dates
//! - [`render`]: Template rendering and output digests
//! - [`generator`]: The per-artifact generation driver
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```no_run
//! use aqm_configgen::{AQM_RC, CycleDate, DefinitionLoader, GenerationRequest, Generator};
//!
//! # fn main() -> aqm_configgen::Result<()> {
//! let definitions = DefinitionLoader::new().load_file("var_defns.sh")?;
//! let request = GenerationRequest::new("/path/to/run")
//!     .with_cycle(CycleDate::parse("2021010100")?)
//!     .with_option("init_concentrations", true);
//!
//! let report = Generator::new(&AQM_RC, &definitions).generate(&request)?;
//! println!("wrote {}", report.output_path.display());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod render;
pub mod settings;

// ============================================================================
// Re-exports
// ============================================================================

pub use artifact::{AQM_RC, ArtifactDescriptor, ArtifactKind, CycleDate, NEMS_CONFIGURE};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{DefinitionLoader, Definitions, infer_type};
pub use error::{ConfigGenError, Result};
pub use generator::{GenerationReport, GenerationRequest, Generator, GeneratorState};
pub use render::{RenderOutcome, TemplateRenderer};
pub use settings::{SettingValue, Settings, to_block};
