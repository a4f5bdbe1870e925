use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

pub use serde_yaml::Value as YamlValue;

pub fn load_from_path<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Opening YAML file {path:?}"))?;
    from_str(&raw).with_context(|| format!("Parsing YAML file {path:?}"))
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    let value: YamlValue = serde_yaml::from_str(input)?;
    Ok(serde_yaml::from_value(value)?)
}
