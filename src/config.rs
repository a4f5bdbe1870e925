//! Pipeline configuration.
//!
//! Values resolve in three layers: the defaults below, the optional `options`
//! section of the mapping store, then command-line overrides.

use serde::{Deserialize, Serialize};

use crate::{
    categorical::FallbackPolicy,
    reconcile::Coercion,
    reshape::EavLayout,
};

pub const DEFAULT_IDENTITY_COLUMNS: &[&str] = &[
    "ID",
    "MakeText",
    "TypeName",
    "TypeNameFull",
    "ModelText",
    "ModelTypeText",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub identity_columns: Vec<String>,
    pub attribute_name_column: String,
    pub attribute_value_column: String,
    pub color_column: String,
    pub color_output_column: String,
    /// Receives the tokens after the first one of each raw color, when set.
    pub color_qualifier_column: Option<String>,
    pub color_default: String,
    pub make_column: String,
    pub make_output_column: String,
    pub make_suffix: String,
    /// Column of the target dataset whose values form the make vocabulary.
    pub target_make_column: String,
    pub placeholder: String,
    pub coercions: Vec<Coercion>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            identity_columns: DEFAULT_IDENTITY_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            attribute_name_column: "Attribute Names".to_string(),
            attribute_value_column: "Attribute Values".to_string(),
            color_column: "BodyColorText".to_string(),
            color_output_column: "BodyColorText_mapped".to_string(),
            color_qualifier_column: None,
            color_default: "Other".to_string(),
            make_column: "MakeText".to_string(),
            make_output_column: "MakeText_mapped".to_string(),
            make_suffix: "_SUP".to_string(),
            target_make_column: "make".to_string(),
            placeholder: "TBD".to_string(),
            coercions: Coercion::defaults(),
        }
    }
}

impl PipelineConfig {
    pub fn eav_layout(&self) -> EavLayout<'_> {
        EavLayout {
            identity_columns: &self.identity_columns,
            attribute_name_column: &self.attribute_name_column,
            attribute_value_column: &self.attribute_value_column,
        }
    }

    pub fn color_fallback(&self) -> FallbackPolicy {
        FallbackPolicy::Default(self.color_default.clone())
    }

    pub fn make_fallback(&self) -> FallbackPolicy {
        FallbackPolicy::Marker {
            suffix: self.make_suffix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::CoercionTarget;

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let config: PipelineConfig = serde_yaml::from_str(
            "color_default: Unknown\ncoercions:\n  - column: mileage\n    type: float\n",
        )
        .expect("parse options");
        assert_eq!(config.color_default, "Unknown");
        assert_eq!(config.make_suffix, "_SUP");
        assert_eq!(
            config.coercions,
            vec![Coercion::new("mileage", CoercionTarget::Float)]
        );
    }

    #[test]
    fn unknown_option_is_rejected() {
        let parsed: Result<PipelineConfig, _> = serde_yaml::from_str("colour_default: x\n");
        assert!(parsed.is_err());
    }
}
