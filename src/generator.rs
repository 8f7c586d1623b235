//! Artifact generation.
//!
//! A [`Generator`] drives one artifact through the pipeline: it assembles
//! the settings object from the definitions, serializes it to a block,
//! resolves where the template and output live, and renders.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::artifact::{ArtifactDescriptor, ArtifactTarget, CycleDate};
use crate::config::Definitions;
use crate::error::Result;
use crate::render::{RenderOutcome, TemplateRenderer};
use crate::settings::{SettingValue, Settings, SettingsAssembler, to_block};

/// Lifecycle of a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorState {
    /// Building the settings object.
    Assembling,
    /// Rendering the template.
    Rendering,
    /// Output written.
    Succeeded,
    /// Generation stopped with an error.
    Failed,
}

/// Inputs for one generation besides the definitions.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Directory the output is written to.
    pub run_dir: PathBuf,
    /// Cycle date for dated path fields.
    pub cycle: Option<CycleDate>,
    /// Caller-supplied artifact options.
    pub options: Settings,
    /// Template path overriding the definitions.
    pub template: Option<PathBuf>,
}

impl GenerationRequest {
    /// Creates a request targeting a run directory.
    #[must_use]
    pub fn new(run_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_dir: run_dir.into(),
            cycle: None,
            options: Settings::new(),
            template: None,
        }
    }

    /// Sets the cycle date.
    #[must_use]
    pub const fn with_cycle(mut self, cycle: CycleDate) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Sets an artifact option.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.options.insert(name, value);
        self
    }

    /// Sets an explicit template path.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// Assembled settings and resolved target, before anything is rendered.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactPlan {
    /// Artifact name.
    pub artifact: &'static str,
    /// Where the artifact will be rendered from and written to.
    pub target: ArtifactTarget,
    /// The assembled settings object.
    pub settings: Settings,
    /// The serialized settings block.
    pub block: String,
}

/// Summary of a completed generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Artifact name.
    pub artifact: &'static str,
    /// Path of the written file.
    pub output_path: PathBuf,
    /// Template that was rendered.
    pub template_path: PathBuf,
    /// Number of settings fields.
    pub fields: usize,
    /// Render result.
    pub outcome: RenderOutcome,
}

/// Generates one artifact from a shared definition set.
#[derive(Debug)]
pub struct Generator<'a> {
    descriptor: &'static ArtifactDescriptor,
    definitions: &'a Definitions,
    renderer: TemplateRenderer,
    state: GeneratorState,
}

impl<'a> Generator<'a> {
    /// Creates a generator for an artifact type.
    #[must_use]
    pub fn new(descriptor: &'static ArtifactDescriptor, definitions: &'a Definitions) -> Self {
        info!(
            "Generator for {} created with {} definitions",
            descriptor.name,
            definitions.len()
        );
        Self {
            descriptor,
            definitions,
            renderer: TemplateRenderer::new(),
            state: GeneratorState::Assembling,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> GeneratorState {
        self.state
    }

    /// Assembles and serializes the settings and resolves the target
    /// without rendering.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field or the template path is
    /// missing.
    pub fn plan(&self, request: &GenerationRequest) -> Result<ArtifactPlan> {
        let settings = SettingsAssembler::new(self.definitions)
            .with_cycle(request.cycle)
            .with_options(request.options.clone())
            .assemble(self.descriptor)?;

        let block = to_block(&settings);
        debug!("Settings for {}:\n{}", self.descriptor.name, block);

        let target = self.descriptor.resolve_target(
            &request.run_dir,
            self.definitions,
            request.template.as_deref(),
        )?;

        Ok(ArtifactPlan {
            artifact: self.descriptor.name,
            target,
            settings,
            block,
        })
    }

    /// Generates the artifact into the request's run directory.
    ///
    /// # Errors
    ///
    /// Returns an error if assembly or rendering fails. Nothing is written
    /// to the target in either case.
    pub fn generate(&mut self, request: &GenerationRequest) -> Result<GenerationReport> {
        self.state = GeneratorState::Assembling;
        let plan = match self.plan(request) {
            Ok(plan) => plan,
            Err(e) => {
                self.state = GeneratorState::Failed;
                return Err(e);
            }
        };

        self.state = GeneratorState::Rendering;
        let output_path = plan.target.output_path();
        info!(
            "Rendering {} from {}",
            output_path.display(),
            plan.target.template_path.display()
        );

        match self
            .renderer
            .render_to_file(&plan.block, &plan.target.template_path, &output_path)
        {
            Ok(outcome) => {
                self.state = GeneratorState::Succeeded;
                Ok(GenerationReport {
                    artifact: plan.artifact,
                    output_path,
                    template_path: plan.target.template_path,
                    fields: plan.settings.len(),
                    outcome,
                })
            }
            Err(e) => {
                self.state = GeneratorState::Failed;
                log_render_failure(&plan.target.template_path, &output_path, &plan.block);
                Err(e.into())
            }
        }
    }
}

fn log_render_failure(template_path: &Path, output_path: &Path, block: &str) {
    error!(
        "Failed to render {} from template {} with settings:\n{}",
        output_path.display(),
        template_path.display(),
        block
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{AQM_RC, NEMS_CONFIGURE};
    use crate::error::{ConfigGenError, RenderError};
    use std::fs;
    use tempfile::TempDir;

    const AQM_RC_TEMPLATE: &str = include_str!("../templates/aqm.rc");
    const NEMS_CONFIGURE_TEMPLATE: &str = include_str!("../templates/nems.configure");

    struct Fixture {
        dir: TempDir,
        definitions: Definitions,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().expect("tempdir");
            let aqm_template = dir.path().join("aqm.rc.tmpl");
            let nems_template = dir.path().join("nems.configure.tmpl");
            fs::write(&aqm_template, AQM_RC_TEMPLATE).expect("aqm template");
            fs::write(&nems_template, NEMS_CONFIGURE_TEMPLATE).expect("nems template");

            let mut definitions: Definitions = [
                ("AQM_CONFIG_DIR", "/cfg"),
                ("AQM_BIO_DIR", "/data/bio"),
                ("AQM_BIO_FILE", "BEIS_SARC401.ncf"),
                ("AQM_CANOPY_DIR", "/data/canopy"),
                ("AQM_CANOPY_FILE", "gfs.t12z.geo"),
                ("AQM_CANOPY_FILE_SUFFIX", ".canopy_regrid.nc"),
                ("AQM_FIRE_DIR", "/data/fire"),
                ("AQM_FIRE_FILE", "Hourly_Emissions_regrid_NA_13km"),
                ("AQM_FIRE_FILE_SUFFIX", "_h72.nc"),
                ("AQM_RC_FIRE_FREQUENCY", "hourly"),
                ("DT_ATMOS", "180"),
                ("PRINT_ESMF", "FALSE"),
                ("CPL_AQM", "TRUE"),
            ]
            .into_iter()
            .collect();
            definitions.define("AQM_RC_TMPL_FP", aqm_template.to_string_lossy());
            definitions.define("NEMS_CONFIG_TMPL_FP", nems_template.to_string_lossy());

            Self { dir, definitions }
        }

        fn run_dir(&self, name: &str) -> PathBuf {
            let run_dir = self.dir.path().join(name);
            fs::create_dir_all(&run_dir).expect("run dir");
            run_dir
        }
    }

    fn aqm_request(run_dir: &Path) -> GenerationRequest {
        GenerationRequest::new(run_dir)
            .with_cycle(CycleDate::from_ymdh(2021, 1, 1, 0).expect("valid date"))
            .with_option("init_concentrations", true)
    }

    #[test]
    fn test_generate_aqm_rc() {
        let fixture = Fixture::new();
        let run_dir = fixture.run_dir("run");

        let mut generator = Generator::new(&AQM_RC, &fixture.definitions);
        let report = generator.generate(&aqm_request(&run_dir)).expect("generated");

        assert_eq!(generator.state(), GeneratorState::Succeeded);
        assert_eq!(report.output_path, run_dir.join("aqm.rc"));
        assert_eq!(report.fields, 7);

        let content = fs::read_to_string(&report.output_path).expect("output");
        assert!(content.starts_with("#\n#  AQM resource file\n"));
        assert!(content.contains("init_concentrations: true\n"));
        assert!(content.contains("ae_matrix_nml: /cfg/AE_cb6r3_ae6_aq.nml\n"));
        assert!(content.contains("bio_file:      /data/bio/BEIS_SARC401.ncf\n"));
        assert!(content.contains(
            "canopy_file:      /data/canopy/gfs.t12z.geo.01.canopy_regrid.nc\n"
        ));
        assert!(content.contains(
            "fire_file:      /data/fire/20210101/\
             Hourly_Emissions_regrid_NA_13km_20210101_t00z_h72.nc\n"
        ));
        assert!(content.contains("fire_frequency: hourly\n"));
    }

    #[test]
    fn test_generate_nems_configure() {
        let fixture = Fixture::new();
        let run_dir = fixture.run_dir("run");

        let report = Generator::new(&NEMS_CONFIGURE, &fixture.definitions)
            .generate(&GenerationRequest::new(&run_dir))
            .expect("generated");

        let content = fs::read_to_string(&report.output_path).expect("output");
        assert!(content.starts_with("EARTH_component_list: ATM AQM\n"));
        assert!(content.contains("  @180\n    ATM phase1\n"));
        assert!(content.contains("AQM_model:          aqm\n"));
        assert!(content.ends_with("ESMF_logKindFlag: ESMF_LOGKIND_MULTI_ON_ERROR\n"));
    }

    #[test]
    fn test_output_name_override() {
        let fixture = Fixture::new();
        let run_dir = fixture.run_dir("run");
        let definitions = fixture
            .definitions
            .clone()
            .with_overrides(["NEMS_CONFIG_FN=model_configure.nems", "CPL_AQM=false"])
            .expect("overrides");

        let report = Generator::new(&NEMS_CONFIGURE, &definitions)
            .generate(&GenerationRequest::new(&run_dir))
            .expect("generated");

        assert_eq!(report.output_path, run_dir.join("model_configure.nems"));
        let content = fs::read_to_string(&report.output_path).expect("output");
        assert!(content.starts_with("EARTH_component_list: ATM\n"));
        assert!(!content.contains("AQM_model"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let fixture = Fixture::new();
        let first_dir = fixture.run_dir("first");
        let second_dir = fixture.run_dir("second");

        let first = Generator::new(&AQM_RC, &fixture.definitions)
            .generate(&aqm_request(&first_dir))
            .expect("first");
        let second = Generator::new(&AQM_RC, &fixture.definitions)
            .generate(&aqm_request(&second_dir))
            .expect("second");

        assert_eq!(first.outcome, second.outcome);
        assert_eq!(
            fs::read(&first.output_path).expect("first output"),
            fs::read(&second.output_path).expect("second output")
        );
    }

    #[test]
    fn test_missing_field_writes_nothing() {
        let fixture = Fixture::new();
        let run_dir = fixture.run_dir("run");
        let definitions: Definitions = fixture
            .definitions
            .iter()
            .filter(|(name, _)| *name != "AQM_FIRE_DIR")
            .collect();

        let mut generator = Generator::new(&AQM_RC, &definitions);
        let err = generator
            .generate(&aqm_request(&run_dir))
            .expect_err("missing AQM_FIRE_DIR");

        assert!(matches!(err, ConfigGenError::MissingField(ref e) if e.name == "AQM_FIRE_DIR"));
        assert_eq!(generator.state(), GeneratorState::Failed);
        assert!(!run_dir.join("aqm.rc").exists());
    }

    #[test]
    fn test_failed_render_keeps_previous_output() {
        let fixture = Fixture::new();
        let run_dir = fixture.run_dir("run");
        let output = run_dir.join("aqm.rc");
        fs::write(&output, "previous run\n").expect("seed");

        let broken = fixture.dir.path().join("broken.tmpl");
        fs::write(&broken, "fire: {{ aqm_rc_fire_file_fp }}\nextra: {{ not_a_field }}\n")
            .expect("template");

        let mut generator = Generator::new(&AQM_RC, &fixture.definitions);
        let err = generator
            .generate(&aqm_request(&run_dir).with_template(&broken))
            .expect_err("unresolved reference");

        assert!(matches!(
            err,
            ConfigGenError::Render(RenderError::UnresolvedReference { line: 2, .. })
        ));
        assert_eq!(generator.state(), GeneratorState::Failed);
        assert_eq!(fs::read_to_string(&output).expect("output"), "previous run\n");
    }

    #[test]
    fn test_plan_does_not_write() {
        let fixture = Fixture::new();
        let run_dir = fixture.run_dir("run");

        let plan = Generator::new(&AQM_RC, &fixture.definitions)
            .plan(&aqm_request(&run_dir))
            .expect("plan");

        assert_eq!(plan.artifact, "aqm.rc");
        assert_eq!(plan.target.output_path(), run_dir.join("aqm.rc"));
        assert!(plan.block.starts_with("aqm_config_dir: /cfg\ninit_concentrations: true\n"));
        assert!(!run_dir.join("aqm.rc").exists());
    }
}
