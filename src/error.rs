//! Error types for the configuration generator.
//!
//! This module provides the error hierarchy for every stage of the
//! generation pipeline: loading definitions, assembling settings and
//! rendering templates.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the configuration generator.
#[derive(Debug, Error)]
pub enum ConfigGenError {
    /// Definition loading errors.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// A field required by an artifact is absent.
    #[error("Missing field: {0}")]
    MissingField(#[from] MissingFieldError),

    /// Template rendering errors.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// A command-line argument could not be interpreted.
    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: String,
        /// Why the value was rejected.
        message: String,
    },

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while reading a variable-definition source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The definition source does not exist.
    #[error("Definition file not found: {path}")]
    NotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The definition source exists but could not be read.
    #[error("Failed to read definition file {path}: {message}")]
    Unreadable {
        /// Path to the unreadable file.
        path: PathBuf,
        /// Underlying IO error description.
        message: String,
    },

    /// The definition source could not be parsed.
    #[error("Malformed definitions in {source_name}: {message}")]
    Malformed {
        /// Path or label of the source.
        source_name: String,
        /// Description of the parse failure.
        message: String,
    },

    /// A `NAME=VALUE` override was not well formed.
    #[error("Invalid definition override '{entry}': expected NAME=VALUE")]
    InvalidOverride {
        /// The rejected override entry.
        entry: String,
    },
}

/// A definition or option required to assemble an artifact is absent.
#[derive(Debug, Error)]
#[error("{artifact}: required value '{name}' is not defined (needed for field '{field}')")]
pub struct MissingFieldError {
    /// Artifact being assembled.
    pub artifact: String,
    /// Settings field that could not be built.
    pub field: String,
    /// Name of the missing definition, option or input.
    pub name: String,
}

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template file could not be read.
    #[error("Failed to read template {path}: {message}")]
    TemplateUnreadable {
        /// Path to the template.
        path: PathBuf,
        /// Underlying IO error description.
        message: String,
    },

    /// The template is not syntactically valid.
    #[error("Template syntax error in {path} at line {line}: {message}")]
    TemplateSyntax {
        /// Path to the template.
        path: PathBuf,
        /// 1-based line of the offending tag.
        line: usize,
        /// Description of the syntax error.
        message: String,
    },

    /// A variable reference has no value in the settings block.
    #[error("Undefined variable '{name}' in {path} at line {line}")]
    UnresolvedReference {
        /// Path to the template.
        path: PathBuf,
        /// The unresolved reference as written.
        name: String,
        /// 1-based line of the reference.
        line: usize,
    },

    /// The template failed while evaluating an expression, filter or loop.
    #[error("Template error in {path} at line {line}: {message}")]
    TemplateEvaluation {
        /// Path to the template.
        path: PathBuf,
        /// 1-based line of the failing expression.
        line: usize,
        /// Description of the failure.
        message: String,
    },

    /// The serialized settings block could not be parsed.
    #[error("Invalid settings block: {message}")]
    InvalidSettings {
        /// Description of the parse failure.
        message: String,
    },

    /// The rendered output could not be written.
    #[error("Failed to write output {path}: {message}")]
    OutputUnwritable {
        /// Path to the output file.
        path: PathBuf,
        /// Underlying IO error description.
        message: String,
    },
}

/// Result type alias for configuration generator operations.
pub type Result<T> = std::result::Result<T, ConfigGenError>;

impl ConfigGenError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl LoadError {
    /// Creates a malformed-source error.
    #[must_use]
    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

impl MissingFieldError {
    /// Creates a missing-field error.
    #[must_use]
    pub fn new(
        artifact: impl Into<String>,
        field: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            artifact: artifact.into(),
            field: field.into(),
            name: name.into(),
        }
    }
}

impl RenderError {
    /// Creates an invalid-settings error.
    #[must_use]
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }

    /// Creates an output-unwritable error.
    #[must_use]
    pub fn output_unwritable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::OutputUnwritable {
            path: path.into(),
            message: message.into(),
        }
    }
}
