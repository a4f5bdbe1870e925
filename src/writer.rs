//! Persistence of the three pipeline snapshots.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use log::info;

use crate::{data::render_cell, io_utils, pipeline::Snapshots, table::Table};

pub trait SnapshotSink {
    /// Persists the snapshots and returns a description of where they went.
    fn write(&mut self, snapshots: &Snapshots) -> Result<String>;
}

/// Writes each snapshot as a CSV file inside a timestamped directory.
#[derive(Debug, Clone)]
pub struct CsvDirectorySink {
    root: PathBuf,
    directory_name: Option<String>,
}

impl CsvDirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            directory_name: None,
        }
    }

    /// Uses a fixed directory name instead of `complete_task_<timestamp>`.
    pub fn with_directory_name(mut self, name: impl Into<String>) -> Self {
        self.directory_name = Some(name.into());
        self
    }

    fn target_directory(&self) -> PathBuf {
        let name = self.directory_name.clone().unwrap_or_else(|| {
            format!("complete_task_{}", Local::now().format("%Y-%m-%d-%H-%M-%S"))
        });
        self.root.join(name)
    }
}

impl SnapshotSink for CsvDirectorySink {
    fn write(&mut self, snapshots: &Snapshots) -> Result<String> {
        let directory = self.target_directory();
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("Creating output directory {directory:?}"))?;
        for (position, (label, table)) in snapshots.labeled().into_iter().enumerate() {
            let path = directory.join(format!("STEP_{}_{label}.csv", position + 1));
            write_table(&path, table)?;
            info!(
                "Wrote {label} snapshot ({} row(s) x {} column(s)) to {path:?}",
                table.row_count(),
                table.column_count()
            );
        }
        Ok(directory.display().to_string())
    }
}

pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path, io_utils::DEFAULT_CSV_DELIMITER)?;
    writer
        .write_record(table.headers())
        .with_context(|| format!("Writing headers to {path:?}"))?;
    for (idx, row) in table.rows().iter().enumerate() {
        writer
            .write_record(row.iter().map(render_cell))
            .with_context(|| format!("Writing row {} to {path:?}", idx + 2))?;
    }
    writer
        .flush()
        .with_context(|| format!("Flushing {path:?}"))?;
    Ok(())
}
