//! Configgen CLI entrypoint.
//!
//! This is the main entrypoint for the configgen command-line tool.

use std::path::PathBuf;
use std::process::ExitCode;

use aqm_configgen::artifact::{ArtifactDescriptor, ArtifactKind, CycleDate};
use aqm_configgen::cli::{Cli, Commands, CommonArgs, OutputFormatter};
use aqm_configgen::config::{DefinitionLoader, Definitions, infer_type};
use aqm_configgen::error::{ConfigGenError, Result};
use aqm_configgen::generator::{GenerationRequest, Generator};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Variable naming the default definition file.
const DEFNS_VAR: &str = "CONFIGGEN_DEFNS";

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatches the parsed command.
fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::AqmRc {
            common,
            cdate,
            init_concentrations,
        } => {
            let cycle = CycleDate::parse(&cdate)?;
            let request = GenerationRequest::new(&common.run_dir)
                .with_cycle(cycle)
                .with_option("init_concentrations", infer_type(&init_concentrations));
            cmd_generate(ArtifactKind::AqmRc.descriptor(), &common, request, &formatter)
        }
        Commands::NemsConfigure { common, cdate } => {
            let mut request = GenerationRequest::new(&common.run_dir);
            if let Some(cdate) = cdate {
                request = request.with_cycle(CycleDate::parse(&cdate)?);
            }
            cmd_generate(
                ArtifactKind::NemsConfigure.descriptor(),
                &common,
                request,
                &formatter,
            )
        }
        Commands::Artifacts => {
            eprintln!("{}", formatter.format_artifacts(&ArtifactKind::ALL));
            Ok(())
        }
    }
}

/// Generates one artifact, or shows its plan on a dry run.
fn cmd_generate(
    descriptor: &'static ArtifactDescriptor,
    common: &CommonArgs,
    request: GenerationRequest,
    formatter: &OutputFormatter,
) -> Result<()> {
    let definitions = load_definitions(common)?;
    let request = match &common.template {
        Some(template) => request.with_template(template),
        None => request,
    };

    let mut generator = Generator::new(descriptor, &definitions);

    if common.dry_run {
        let plan = generator.plan(&request)?;
        eprintln!("{}", formatter.format_plan(&plan));
        return Ok(());
    }

    let report = generator.generate(&request)?;
    eprintln!("{}", formatter.format_report(&report));
    Ok(())
}

/// Loads the definition file and applies command-line overrides.
fn load_definitions(common: &CommonArgs) -> Result<Definitions> {
    let loader = match common.format {
        Some(format) => DefinitionLoader::new().with_format(format),
        None => DefinitionLoader::new(),
    };
    let definitions = loader.load_file(definitions_path(common)?)?;
    debug!("Loaded {} definitions", definitions.len());

    if common.define.is_empty() {
        return Ok(definitions);
    }

    info!("Applying {} definition overrides", common.define.len());
    Ok(definitions.with_overrides(&common.define)?)
}

/// Resolves the definition file from `--path-to-defns` or the
/// `CONFIGGEN_DEFNS` variable, then from the nearest `.env` file. The `.env`
/// entries are read, never exported to the process environment.
fn definitions_path(common: &CommonArgs) -> Result<PathBuf> {
    if let Some(path) = &common.path_to_defns {
        return Ok(path.clone());
    }

    dotenvy::from_filename_iter(".env")
        .ok()
        .and_then(|entries| {
            entries
                .filter_map(std::result::Result::ok)
                .find(|(name, _)| name == DEFNS_VAR)
        })
        .map(|(_, value)| {
            debug!("Using {DEFNS_VAR} from .env");
            PathBuf::from(value)
        })
        .ok_or_else(|| {
            ConfigGenError::invalid_argument(
                "path-to-defns",
                format!("no definition file given (use --path-to-defns or {DEFNS_VAR})"),
            )
        })
}
