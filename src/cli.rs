use std::path::PathBuf;

use clap::Parser;

use crate::config::PipelineConfig;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Reshape a supplier EAV export and reconcile it with a target dataset",
    long_about = None
)]
pub struct Cli {
    /// Supplier export in JSON-lines format ('-' for stdin)
    #[arg(short = 's', long = "supplier", default_value = "data/supplier_car.json")]
    pub supplier: PathBuf,
    /// Target dataset whose columns and vocabulary the output must match
    #[arg(short = 't', long = "target", default_value = "data/target_data.csv")]
    pub target: PathBuf,
    /// Mapping store (YAML) holding the correspondence mapping and color lookup
    #[arg(short = 'm', long = "mappings", default_value = "data/mapper_dicts.yaml")]
    pub mappings: PathBuf,
    /// Directory under which the snapshot directory is created
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,
    /// Delimiter of the target dataset (supports ',', 'tab', ';', '|')
    #[arg(long = "target-delimiter", value_parser = parse_delimiter)]
    pub target_delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Keep color qualifiers (e.g. "mét.") in this extra column
    #[arg(long = "color-qualifier-column")]
    pub color_qualifier_column: Option<String>,
    /// Placeholder written into target columns that have no source
    #[arg(long = "placeholder")]
    pub placeholder: Option<String>,
    /// Print the first N rows of the final table
    #[arg(long = "preview")]
    pub preview: Option<usize>,
    /// Run the pipeline and print the reconciliation plan without writing snapshots
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl Cli {
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(column) = &self.color_qualifier_column {
            config.color_qualifier_column = Some(column.clone());
        }
        if let Some(placeholder) = &self.placeholder {
            config.placeholder = placeholder.clone();
        }
    }
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
