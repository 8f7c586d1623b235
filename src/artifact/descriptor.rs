//! Data-driven description of a generated artifact.
//!
//! Every artifact type is described by a static [`ArtifactDescriptor`]: its
//! output file name, where its template path comes from and the ordered
//! rules producing each settings field. One generator handles all of them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Definitions;
use crate::error::{MissingFieldError, Result};

/// Where a settings field takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// The typed value of a definition variable.
    Definition(&'static str),
    /// A flag supplied by the caller for this artifact.
    Option(&'static str),
    /// A file path joined from pattern segments. Segments may reference
    /// definitions as `${NAME}` and cycle-date components as strftime
    /// specifiers (`%Y`, `%m`, `%d`, `%H`).
    Path(&'static [&'static str]),
}

/// One field of an artifact's settings object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field name as referenced by the template.
    pub name: &'static str,
    /// How the value is produced.
    pub source: FieldSource,
}

/// Static description of an artifact type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// Artifact name.
    pub name: &'static str,
    /// One-line description for listings.
    pub description: &'static str,
    /// Output file name used when no override is defined.
    pub default_file_name: &'static str,
    /// Definition variable that overrides the output file name.
    pub file_name_var: &'static str,
    /// Definition variable holding the template path.
    pub template_var: &'static str,
    /// Ordered field rules.
    pub fields: &'static [FieldRule],
}

/// Where an artifact is rendered from and written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactTarget {
    /// Run directory receiving the output.
    pub run_dir: PathBuf,
    /// Output file name inside the run directory.
    pub file_name: String,
    /// Template to render.
    pub template_path: PathBuf,
}

impl ArtifactTarget {
    /// Full path of the output file.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.run_dir.join(&self.file_name)
    }
}

/// A piece of a path pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternPart<'a> {
    /// Literal text, possibly containing strftime specifiers.
    Literal(&'a str),
    /// `${NAME}` reference to a definition.
    Variable(&'a str),
}

/// Splits a pattern into literal and `${NAME}` parts.
pub(crate) fn parse_pattern(pattern: &str) -> std::result::Result<Vec<PatternPart<'_>>, String> {
    let mut parts = Vec::new();
    let mut rest = pattern;

    while let Some(start) = rest.find("${") {
        if start > 0 {
            parts.push(PatternPart::Literal(&rest[..start]));
        }
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| format!("unclosed variable reference in '{pattern}'"))?;
        let name = after[..end].trim();
        if name.is_empty() {
            return Err(format!("empty variable reference in '{pattern}'"));
        }
        parts.push(PatternPart::Variable(name));
        rest = &after[end + 1..];
    }

    if !rest.is_empty() {
        parts.push(PatternPart::Literal(rest));
    }
    Ok(parts)
}

impl ArtifactDescriptor {
    /// Definition variables needed to assemble this artifact, in field order.
    #[must_use]
    pub fn required_definitions(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        let mut push = |name: &'static str| {
            if !names.contains(&name) {
                names.push(name);
            }
        };

        for field in self.fields {
            match field.source {
                FieldSource::Definition(name) => push(name),
                FieldSource::Option(_) => {}
                FieldSource::Path(segments) => {
                    for segment in segments {
                        for part in parse_pattern(segment).unwrap_or_default() {
                            if let PatternPart::Variable(name) = part {
                                push(name);
                            }
                        }
                    }
                }
            }
        }
        names
    }

    /// Caller-supplied options this artifact needs.
    #[must_use]
    pub fn required_options(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter_map(|field| match field.source {
                FieldSource::Option(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Returns true if any path field is built from the cycle date.
    #[must_use]
    pub fn uses_cycle_date(&self) -> bool {
        self.fields.iter().any(|field| match field.source {
            FieldSource::Path(segments) => segments.iter().any(|segment| {
                parse_pattern(segment)
                    .unwrap_or_default()
                    .iter()
                    .any(|part| matches!(part, PatternPart::Literal(text) if text.contains('%')))
            }),
            _ => false,
        })
    }

    /// Output file name: the override variable if defined, else the
    /// default name.
    #[must_use]
    pub fn output_file_name(&self, definitions: &Definitions) -> String {
        definitions
            .get(self.file_name_var)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.default_file_name)
            .to_string()
    }

    /// Resolves the run directory, output name and template path.
    ///
    /// An explicit template path wins over the descriptor's template
    /// variable.
    ///
    /// # Errors
    ///
    /// Returns an error if no template path is available.
    pub fn resolve_target(
        &self,
        run_dir: &Path,
        definitions: &Definitions,
        template_override: Option<&Path>,
    ) -> Result<ArtifactTarget> {
        let template_path = match template_override {
            Some(path) => path.to_path_buf(),
            None => definitions
                .get(self.template_var)
                .map(str::trim)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
                .ok_or_else(|| MissingFieldError::new(self.name, "template", self.template_var))?,
        };

        Ok(ArtifactTarget {
            run_dir: run_dir.to_path_buf(),
            file_name: self.output_file_name(definitions),
            template_path,
        })
    }
}
