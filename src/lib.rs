pub mod categorical;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io_utils;
pub mod loaders;
pub mod mapping_store;
pub mod pipeline;
pub mod preview;
pub mod reconcile;
pub mod reshape;
pub mod table;
pub mod writer;
pub mod yaml_provider;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::Cli;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("supplier_reconcile", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Arguments: {cli:?}");
    pipeline::execute(&cli)
}
