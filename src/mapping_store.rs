//! The persisted mapping store: correspondence mapping, color lookup and
//! optional pipeline options, kept together in one YAML document.
//!
//! ```yaml
//! correspondence:
//!   make: MakeText_mapped
//!   color: BodyColorText_mapped
//!   mileage: Km
//!   price_on_request: null
//! color_lookup:
//!   schwarz: Black
//!   blau: Blue
//! options:
//!   placeholder: TBD
//! ```

use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    categorical::CategoricalLookup,
    config::PipelineConfig,
    reconcile::CorrespondenceMapping,
    yaml_provider,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingStore {
    pub correspondence: CorrespondenceMapping,
    pub color_lookup: BTreeMap<String, String>,
    #[serde(default)]
    pub options: Option<PipelineConfig>,
}

impl MappingStore {
    pub fn load(path: &Path) -> Result<Self> {
        let store: MappingStore = yaml_provider::load_from_path(path)
            .with_context(|| format!("Loading mapping store from {path:?}"))?;
        store.validate()?;
        Ok(store)
    }

    pub fn from_yaml(input: &str) -> Result<Self> {
        let store: MappingStore = yaml_provider::from_str(input)?;
        store.validate()?;
        Ok(store)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.correspondence.is_empty(),
            "Mapping store defines an empty correspondence mapping"
        );
        Ok(())
    }

    pub fn color_lookup(&self) -> CategoricalLookup {
        CategoricalLookup::from_pairs(&self.color_lookup)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        self.options.clone().unwrap_or_default()
    }
}
