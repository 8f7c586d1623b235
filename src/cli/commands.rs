//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DefinitionFormat;

/// Configgen - runtime configuration generator for forecast model runs.
#[derive(Parser, Debug)]
#[command(name = "configgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by every generating command.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Run directory the file is written to.
    #[arg(short, long)]
    pub run_dir: PathBuf,

    /// Variable-definition file (shell, YAML or JSON). Falls back to a
    /// `CONFIGGEN_DEFNS` entry in the nearest `.env` file.
    #[arg(short, long, env = "CONFIGGEN_DEFNS")]
    pub path_to_defns: Option<PathBuf>,

    /// Format of the definition file; detected from its extension if unset.
    #[arg(short, long, value_enum)]
    pub format: Option<DefinitionFormat>,

    /// Template to render instead of the one named in the definitions.
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Override a definition (NAME=VALUE, repeatable).
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
    pub define: Vec<String>,

    /// Show the assembled settings without writing anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the air-quality model resource file (aqm.rc).
    AqmRc {
        /// Shared generation arguments.
        #[command(flatten)]
        common: CommonArgs,

        /// Cycle date (YYYYMMDD, YYYYMMDDHH or YYYYMMDDHHMM).
        #[arg(short, long)]
        cdate: String,

        /// Whether initial concentrations are used (true/false).
        #[arg(short, long)]
        init_concentrations: String,
    },

    /// Generate the model coupler configuration (nems.configure).
    NemsConfigure {
        /// Shared generation arguments.
        #[command(flatten)]
        common: CommonArgs,

        /// Cycle date; accepted for symmetry with aqm-rc, no field is dated.
        #[arg(short, long)]
        cdate: Option<String>,
    },

    /// List the artifacts that can be generated.
    Artifacts,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_aqm_rc() {
        let cli = Cli::try_parse_from([
            "configgen",
            "aqm-rc",
            "-r",
            "/run",
            "-c",
            "2021010100",
            "-i",
            "true",
            "-p",
            "/home/var_defns.sh",
            "-D",
            "AQM_RC_FIRE_FREQUENCY=daily",
            "--dry-run",
        ])
        .expect("valid arguments");

        match cli.command {
            Commands::AqmRc {
                common,
                cdate,
                init_concentrations,
            } => {
                assert_eq!(common.run_dir, PathBuf::from("/run"));
                assert_eq!(common.path_to_defns, Some(PathBuf::from("/home/var_defns.sh")));
                assert_eq!(common.format, None);
                assert_eq!(common.define, vec!["AQM_RC_FIRE_FREQUENCY=daily"]);
                assert!(common.dry_run);
                assert_eq!(cdate, "2021010100");
                assert_eq!(init_concentrations, "true");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_aqm_rc_requires_cdate() {
        let result = Cli::try_parse_from([
            "configgen",
            "aqm-rc",
            "--run-dir",
            "/run",
            "--init-concentrations",
            "false",
            "--path-to-defns",
            "/home/var_defns.sh",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "configgen",
            "nems-configure",
            "-r",
            "/run",
            "-p",
            "defns.yaml",
            "--output",
            "json",
            "-v",
        ])
        .expect("valid arguments");

        assert!(cli.verbose);
        assert!(matches!(cli.output, OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Commands::NemsConfigure { cdate: None, .. }
        ));
    }

    #[test]
    fn test_nems_configure_options() {
        let cli = Cli::try_parse_from([
            "configgen",
            "nems-configure",
            "-r",
            "/run",
            "-p",
            "defns.txt",
            "--format",
            "structured",
            "--cdate",
            "2021010100",
        ])
        .expect("valid arguments");

        match cli.command {
            Commands::NemsConfigure { common, cdate } => {
                assert_eq!(common.format, Some(DefinitionFormat::Structured));
                assert_eq!(cdate.as_deref(), Some("2021010100"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_unknown_definition_format() {
        let result = Cli::try_parse_from([
            "configgen",
            "nems-configure",
            "-r",
            "/run",
            "-p",
            "defns",
            "--format",
            "toml",
        ]);
        assert!(result.is_err());
    }
}
