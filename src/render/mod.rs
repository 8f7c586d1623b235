//! Template rendering.
//!
//! This module turns a serialized settings block into an output file:
//! - Compiling and evaluating templates with strict undefined handling
//! - Writing the result atomically into the run directory
//! - Digesting the written content

mod digest;
mod renderer;
mod template;

pub use digest::ContentHasher;
pub use renderer::{RenderOutcome, TemplateRenderer};
