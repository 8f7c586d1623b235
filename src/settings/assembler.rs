//! Per-artifact settings assembly.

use std::path::PathBuf;

use tracing::debug;

use crate::artifact::{ArtifactDescriptor, CycleDate, FieldSource, PatternPart, parse_pattern};
use crate::config::Definitions;
use crate::error::{ConfigGenError, MissingFieldError, Result};

use super::object::Settings;
use super::value::SettingValue;

/// Name reported when a dated path is built without a cycle date.
const CYCLE_DATE: &str = "cycle date";

/// Builds the settings object for an artifact from definitions, the cycle
/// date and caller-supplied options.
#[derive(Debug, Clone)]
pub struct SettingsAssembler<'a> {
    definitions: &'a Definitions,
    cycle: Option<CycleDate>,
    options: Settings,
}

impl<'a> SettingsAssembler<'a> {
    /// Creates an assembler over a definition set.
    #[must_use]
    pub fn new(definitions: &'a Definitions) -> Self {
        Self {
            definitions,
            cycle: None,
            options: Settings::new(),
        }
    }

    /// Sets the cycle date used by dated path fields.
    #[must_use]
    pub const fn with_cycle(mut self, cycle: Option<CycleDate>) -> Self {
        self.cycle = cycle;
        self
    }

    /// Sets the artifact options (flags supplied by the caller).
    #[must_use]
    pub fn with_options(mut self, options: Settings) -> Self {
        self.options = options;
        self
    }

    /// Assembles the settings object, one field per descriptor rule in
    /// rule order.
    ///
    /// # Errors
    ///
    /// Returns a [`MissingFieldError`] for the first field whose source is
    /// absent.
    pub fn assemble(&self, descriptor: &ArtifactDescriptor) -> Result<Settings> {
        let mut settings = Settings::new();

        for rule in descriptor.fields {
            let value = match rule.source {
                FieldSource::Definition(var) => self
                    .definitions
                    .typed(var)
                    .ok_or_else(|| MissingFieldError::new(descriptor.name, rule.name, var))?,
                FieldSource::Option(option) => self
                    .options
                    .get(option)
                    .cloned()
                    .ok_or_else(|| MissingFieldError::new(descriptor.name, rule.name, option))?,
                FieldSource::Path(segments) => {
                    SettingValue::String(self.build_path(descriptor, rule.name, segments)?)
                }
            };
            debug!("{}: {} = {}", descriptor.name, rule.name, super::inline_value(&value));
            settings.insert(rule.name, value);
        }

        Ok(settings)
    }

    fn build_path(
        &self,
        descriptor: &ArtifactDescriptor,
        field: &str,
        segments: &[&str],
    ) -> Result<String> {
        let mut path = PathBuf::new();
        for segment in segments {
            path.push(self.expand(descriptor, field, segment)?);
        }
        Ok(path.to_string_lossy().into_owned())
    }

    fn expand(
        &self,
        descriptor: &ArtifactDescriptor,
        field: &str,
        pattern: &str,
    ) -> Result<String> {
        let parts = parse_pattern(pattern).map_err(ConfigGenError::internal)?;

        let mut expanded = String::new();
        for part in parts {
            match part {
                PatternPart::Variable(name) => {
                    let value = self
                        .definitions
                        .get(name)
                        .ok_or_else(|| MissingFieldError::new(descriptor.name, field, name))?;
                    expanded.push_str(value);
                }
                PatternPart::Literal(text) if text.contains('%') => {
                    let cycle = self
                        .cycle
                        .ok_or_else(|| MissingFieldError::new(descriptor.name, field, CYCLE_DATE))?;
                    expanded.push_str(&cycle.format(text)?);
                }
                PatternPart::Literal(text) => expanded.push_str(text),
            }
        }
        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{AQM_RC, NEMS_CONFIGURE};

    fn aqm_definitions() -> Definitions {
        [
            ("AQM_CONFIG_DIR", "/cfg"),
            ("AQM_BIO_DIR", "/data/bio"),
            ("AQM_BIO_FILE", "bio.nc"),
            ("AQM_CANOPY_DIR", "/data/canopy"),
            ("AQM_CANOPY_FILE", "gfs.canopy"),
            ("AQM_CANOPY_FILE_SUFFIX", ".nc"),
            ("AQM_FIRE_DIR", "/data/fire"),
            ("AQM_FIRE_FILE", "GBBEPx"),
            ("AQM_FIRE_FILE_SUFFIX", ".nc"),
            ("AQM_RC_FIRE_FREQUENCY", "hourly"),
        ]
        .into_iter()
        .collect()
    }

    fn cycle() -> Option<CycleDate> {
        CycleDate::from_ymdh(2021, 1, 1, 0)
    }

    #[test]
    fn test_assemble_aqm_rc() {
        let defs = aqm_definitions();
        let settings = SettingsAssembler::new(&defs)
            .with_cycle(cycle())
            .with_options(Settings::new().with("init_concentrations", true))
            .assemble(&AQM_RC)
            .expect("assembled");

        let names: Vec<&str> = settings.names().collect();
        assert_eq!(names, AQM_RC.fields.iter().map(|f| f.name).collect::<Vec<_>>());

        assert_eq!(settings.get("aqm_config_dir"), Some(&SettingValue::from("/cfg")));
        assert_eq!(settings.get("init_concentrations"), Some(&SettingValue::Bool(true)));
        assert_eq!(
            settings.get("aqm_rc_bio_file_fp"),
            Some(&SettingValue::from("/data/bio/bio.nc"))
        );
        assert_eq!(
            settings.get("aqm_rc_canopy_file_fp"),
            Some(&SettingValue::from("/data/canopy/gfs.canopy.01.nc"))
        );
        assert_eq!(
            settings.get("aqm_rc_fire_file_fp"),
            Some(&SettingValue::from("/data/fire/20210101/GBBEPx_20210101_t00z.nc"))
        );
        assert_eq!(
            settings.get("aqm_rc_fire_frequency"),
            Some(&SettingValue::from("hourly"))
        );
    }

    #[test]
    fn test_definitions_are_typed() {
        let defs: Definitions = [("DT_ATMOS", "180"), ("PRINT_ESMF", ".false."), ("CPL_AQM", "yes")]
            .into_iter()
            .collect();
        let settings = SettingsAssembler::new(&defs)
            .assemble(&NEMS_CONFIGURE)
            .expect("assembled");

        assert_eq!(settings.get("dt_atmos"), Some(&SettingValue::Integer(180)));
        assert_eq!(settings.get("print_esmf"), Some(&SettingValue::from(".false.")));
        assert_eq!(settings.get("cpl_aqm"), Some(&SettingValue::Bool(true)));
    }

    #[test]
    fn test_missing_definition() {
        let defs: Definitions = [("DT_ATMOS", "180"), ("CPL_AQM", "true")]
            .into_iter()
            .collect();
        let err = SettingsAssembler::new(&defs)
            .assemble(&NEMS_CONFIGURE)
            .expect_err("PRINT_ESMF is missing");

        match err {
            ConfigGenError::MissingField(e) => {
                assert_eq!(e.artifact, "nems.configure");
                assert_eq!(e.field, "print_esmf");
                assert_eq!(e.name, "PRINT_ESMF");
            }
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_path_variable() {
        let defs: Definitions = aqm_definitions()
            .iter()
            .filter(|(name, _)| *name != "AQM_FIRE_FILE")
            .collect();

        let err = SettingsAssembler::new(&defs)
            .with_cycle(cycle())
            .with_options(Settings::new().with("init_concentrations", false))
            .assemble(&AQM_RC)
            .expect_err("AQM_FIRE_FILE is missing");

        match err {
            ConfigGenError::MissingField(e) => {
                assert_eq!(e.field, "aqm_rc_fire_file_fp");
                assert_eq!(e.name, "AQM_FIRE_FILE");
            }
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_option() {
        let defs = aqm_definitions();
        let err = SettingsAssembler::new(&defs)
            .with_cycle(cycle())
            .assemble(&AQM_RC)
            .expect_err("option is missing");

        assert!(matches!(
            err,
            ConfigGenError::MissingField(ref e) if e.name == "init_concentrations"
        ));
    }

    #[test]
    fn test_dated_path_requires_cycle() {
        let defs = aqm_definitions();
        let err = SettingsAssembler::new(&defs)
            .with_options(Settings::new().with("init_concentrations", true))
            .assemble(&AQM_RC)
            .expect_err("no cycle date");

        assert!(matches!(
            err,
            ConfigGenError::MissingField(ref e)
                if e.name == CYCLE_DATE && e.field == "aqm_rc_canopy_file_fp"
        ));
    }

    #[test]
    fn test_path_uses_raw_tokens() {
        let mut defs = aqm_definitions();
        defs.define("AQM_BIO_FILE", "007");
        let settings = SettingsAssembler::new(&defs)
            .with_cycle(cycle())
            .with_options(Settings::new().with("init_concentrations", true))
            .assemble(&AQM_RC)
            .expect("assembled");

        assert_eq!(
            settings.get("aqm_rc_bio_file_fp"),
            Some(&SettingValue::from("/data/bio/007"))
        );
    }
}
