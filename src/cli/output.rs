//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::artifact::{ArtifactDescriptor, ArtifactKind};
use crate::generator::{ArtifactPlan, GenerationReport};
use crate::render::ContentHasher;
use crate::settings::inline_value;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Settings field row for table display.
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Type")]
    value_type: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Artifact row for table display.
#[derive(Tabled)]
struct ArtifactRow {
    #[tabled(rename = "Artifact")]
    name: String,
    #[tabled(rename = "Template variable")]
    template_var: String,
    #[tabled(rename = "Needs")]
    needs: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the result of a generation.
    #[must_use]
    pub fn format_report(&self, report: &GenerationReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => {
                let hasher = ContentHasher::new();
                let mut output = String::new();
                let verb = if report.outcome.unchanged {
                    "Unchanged"
                } else {
                    "Generated"
                };
                let _ = writeln!(
                    output,
                    "{} {verb} {} ({} fields, {} bytes)",
                    "✓".green(),
                    report.output_path.display().to_string().bold(),
                    report.fields,
                    report.outcome.bytes_written
                );
                let _ = writeln!(output, "   Template: {}", report.template_path.display());
                let _ = writeln!(
                    output,
                    "   Digest:   {}",
                    hasher.short_hash(&report.outcome.digest).dimmed()
                );
                output
            }
        }
    }

    /// Formats a dry-run plan.
    #[must_use]
    pub fn format_plan(&self, plan: &ArtifactPlan) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(plan).unwrap_or_default(),
            OutputFormat::Text => Self::format_plan_text(plan),
        }
    }

    fn format_plan_text(plan: &ArtifactPlan) -> String {
        let mut output = String::new();

        let _ = write!(output, "\n{} {}\n", "Dry run:".yellow(), plan.artifact.bold());
        let _ = writeln!(output, "   Output:   {}", plan.target.output_path().display());
        let _ = write!(
            output,
            "   Template: {}\n\n",
            plan.target.template_path.display()
        );

        let rows: Vec<FieldRow> = plan
            .settings
            .iter()
            .map(|(name, value)| FieldRow {
                field: name.clone(),
                value_type: value.type_name().to_string(),
                value: Self::truncate(&inline_value(value), 72),
            })
            .collect();

        if !rows.is_empty() {
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        let _ = write!(output, "\n{}\n", "Nothing was written.".dimmed());
        output
    }

    /// Formats the list of known artifacts.
    #[must_use]
    pub fn format_artifacts(&self, kinds: &[ArtifactKind]) -> String {
        match self.format {
            OutputFormat::Json => {
                let artifacts: Vec<ArtifactJson> =
                    kinds.iter().map(|kind| ArtifactJson::from(kind.descriptor())).collect();
                serde_json::to_string_pretty(&artifacts).unwrap_or_default()
            }
            OutputFormat::Text => {
                let rows: Vec<ArtifactRow> = kinds
                    .iter()
                    .map(|kind| {
                        let descriptor = kind.descriptor();
                        let mut needs = descriptor.required_definitions();
                        needs.extend(descriptor.required_options());
                        ArtifactRow {
                            name: descriptor.name.green().to_string(),
                            template_var: descriptor.template_var.to_string(),
                            needs: needs.join("\n"),
                            description: descriptor.description.to_string(),
                        }
                    })
                    .collect();
                format!("{}\n", Table::new(rows))
            }
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }
}

// JSON serialization helpers

#[derive(serde::Serialize)]
struct ArtifactJson {
    name: &'static str,
    description: &'static str,
    default_file_name: &'static str,
    file_name_var: &'static str,
    template_var: &'static str,
    required_definitions: Vec<&'static str>,
    required_options: Vec<&'static str>,
    uses_cycle_date: bool,
}

impl From<&ArtifactDescriptor> for ArtifactJson {
    fn from(descriptor: &ArtifactDescriptor) -> Self {
        Self {
            name: descriptor.name,
            description: descriptor.description,
            default_file_name: descriptor.default_file_name,
            file_name_var: descriptor.file_name_var,
            template_var: descriptor.template_var,
            required_definitions: descriptor.required_definitions(),
            required_options: descriptor.required_options(),
            uses_cycle_date: descriptor.uses_cycle_date(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(OutputFormatter::truncate("short", 10), "short");
        assert_eq!(OutputFormatter::truncate("/data/fire/20210101", 10), "/data/f...");
        assert_eq!(OutputFormatter::truncate("ééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_artifacts_json() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let json: serde_json::Value =
            serde_json::from_str(&formatter.format_artifacts(&ArtifactKind::ALL))
                .expect("valid JSON");

        assert_eq!(json[0]["name"], "aqm.rc");
        assert_eq!(json[0]["uses_cycle_date"], true);
        assert_eq!(json[0]["required_options"][0], "init_concentrations");
        assert_eq!(json[1]["template_var"], "NEMS_CONFIG_TMPL_FP");
    }

    #[test]
    fn test_artifacts_text_lists_requirements() {
        colored::control::set_override(false);
        let text = OutputFormatter::new(OutputFormat::Text).format_artifacts(&ArtifactKind::ALL);

        assert!(text.contains("aqm.rc"));
        assert!(text.contains("AQM_FIRE_FILE_SUFFIX"));
        assert!(text.contains("DT_ATMOS"));
    }
}
