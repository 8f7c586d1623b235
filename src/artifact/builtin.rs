//! Built-in artifact types.

use serde::Serialize;

use super::descriptor::{ArtifactDescriptor, FieldRule, FieldSource};

/// Chemistry component resource file for the coupled air-quality model.
pub const AQM_RC: ArtifactDescriptor = ArtifactDescriptor {
    name: "aqm.rc",
    description: "Air-quality model resource file (emissions, canopy and fire inputs)",
    default_file_name: "aqm.rc",
    file_name_var: "AQM_RC_FN",
    template_var: "AQM_RC_TMPL_FP",
    fields: &[
        FieldRule {
            name: "aqm_config_dir",
            source: FieldSource::Definition("AQM_CONFIG_DIR"),
        },
        FieldRule {
            name: "init_concentrations",
            source: FieldSource::Option("init_concentrations"),
        },
        FieldRule {
            name: "aqm_rc_bio_file_fp",
            source: FieldSource::Path(&["${AQM_BIO_DIR}", "${AQM_BIO_FILE}"]),
        },
        FieldRule {
            name: "aqm_bio_dir",
            source: FieldSource::Definition("AQM_BIO_DIR"),
        },
        FieldRule {
            name: "aqm_rc_canopy_file_fp",
            source: FieldSource::Path(&[
                "${AQM_CANOPY_DIR}",
                "${AQM_CANOPY_FILE}.%m${AQM_CANOPY_FILE_SUFFIX}",
            ]),
        },
        FieldRule {
            name: "aqm_rc_fire_file_fp",
            source: FieldSource::Path(&[
                "${AQM_FIRE_DIR}",
                "%Y%m%d",
                "${AQM_FIRE_FILE}_%Y%m%d_t%Hz${AQM_FIRE_FILE_SUFFIX}",
            ]),
        },
        FieldRule {
            name: "aqm_rc_fire_frequency",
            source: FieldSource::Definition("AQM_RC_FIRE_FREQUENCY"),
        },
    ],
};

/// Coupler configuration for the modeling system.
pub const NEMS_CONFIGURE: ArtifactDescriptor = ArtifactDescriptor {
    name: "nems.configure",
    description: "Model coupler configuration (time step, ESMF logging, AQM coupling)",
    default_file_name: "nems.configure",
    file_name_var: "NEMS_CONFIG_FN",
    template_var: "NEMS_CONFIG_TMPL_FP",
    fields: &[
        FieldRule {
            name: "dt_atmos",
            source: FieldSource::Definition("DT_ATMOS"),
        },
        FieldRule {
            name: "print_esmf",
            source: FieldSource::Definition("PRINT_ESMF"),
        },
        FieldRule {
            name: "cpl_aqm",
            source: FieldSource::Definition("CPL_AQM"),
        },
    ],
};

/// The artifact types this tool can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// `aqm.rc`
    AqmRc,
    /// `nems.configure`
    NemsConfigure,
}

impl ArtifactKind {
    /// Every known artifact type.
    pub const ALL: [Self; 2] = [Self::AqmRc, Self::NemsConfigure];

    /// Static descriptor for this artifact type.
    #[must_use]
    pub const fn descriptor(self) -> &'static ArtifactDescriptor {
        match self {
            Self::AqmRc => &AQM_RC,
            Self::NemsConfigure => &NEMS_CONFIGURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_names_are_unique() {
        let names: Vec<&str> = ArtifactKind::ALL
            .iter()
            .map(|kind| kind.descriptor().name)
            .collect();
        assert_eq!(names, vec!["aqm.rc", "nems.configure"]);
    }

    #[test]
    fn test_field_order_matches_template_layout() {
        let fields: Vec<&str> = AQM_RC.fields.iter().map(|f| f.name).collect();
        assert_eq!(
            fields,
            vec![
                "aqm_config_dir",
                "init_concentrations",
                "aqm_rc_bio_file_fp",
                "aqm_bio_dir",
                "aqm_rc_canopy_file_fp",
                "aqm_rc_fire_file_fp",
                "aqm_rc_fire_frequency",
            ]
        );
        assert_eq!(
            NEMS_CONFIGURE.required_definitions(),
            vec!["DT_ATMOS", "PRINT_ESMF", "CPL_AQM"]
        );
    }
}
