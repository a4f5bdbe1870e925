//! The reconciliation pipeline: reshape, normalize, reconcile.
//!
//! [`run_pipeline`] performs the transformation over fully loaded inputs and
//! does no I/O beyond logging. [`execute`] is the command-line entry point: it
//! loads the inputs, runs the pipeline and hands the snapshots to a sink.

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    categorical::{
        CategoricalLookup, CategoricalSpec, KeyStrategy, MappingReport, map_categorical,
    },
    cli::Cli,
    config::PipelineConfig,
    io_utils, loaders,
    mapping_store::MappingStore,
    preview,
    reconcile::{self, CorrespondenceMapping, ReconcilePlan},
    reshape,
    table::Table,
    writer::{CsvDirectorySink, SnapshotSink},
};

#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub supplier: Table,
    pub target: Table,
    pub correspondence: CorrespondenceMapping,
    pub color_lookup: CategoricalLookup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshots {
    pub tidy: Table,
    pub normalized: Table,
    pub final_table: Table,
}

impl Snapshots {
    pub fn labeled(&self) -> [(&'static str, &Table); 3] {
        [
            ("tidy", &self.tidy),
            ("normalized", &self.normalized),
            ("final", &self.final_table),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub snapshots: Snapshots,
    pub plan: ReconcilePlan,
    pub color_report: MappingReport,
    pub make_report: MappingReport,
}

pub fn run_pipeline(inputs: &PipelineInputs, config: &PipelineConfig) -> Result<PipelineOutcome> {
    info!("Supplier data loaded with shape {}", shape(&inputs.supplier));

    let tidy = reshape::reshape(&inputs.supplier, config.eav_layout())
        .context("Reshaping supplier attributes")?;
    info!("Supplier data re-structured, new shape {}", shape(&tidy));

    let color_fallback = config.color_fallback();
    let (normalized, color_report) = map_categorical(
        tidy.clone(),
        &inputs.color_lookup,
        &CategoricalSpec {
            source_column: &config.color_column,
            output_column: &config.color_output_column,
            key: KeyStrategy::FirstToken,
            fallback: &color_fallback,
            qualifier_column: config.color_qualifier_column.as_deref(),
        },
    )
    .context("Mapping colors")?;
    log_report("Colors", &color_report);

    let makes = loaders::column_vocabulary(&inputs.target, &config.target_make_column)?;
    let make_lookup = CategoricalLookup::from_canonical_values(&makes);
    debug!("Make lookup built from {} target value(s)", make_lookup.len());
    let make_fallback = config.make_fallback();
    let (normalized, make_report) = map_categorical(
        normalized,
        &make_lookup,
        &CategoricalSpec {
            source_column: &config.make_column,
            output_column: &config.make_output_column,
            key: KeyStrategy::Folded,
            fallback: &make_fallback,
            qualifier_column: None,
        },
    )
    .context("Mapping makes")?;
    log_report("Makes", &make_report);

    let plan = ReconcilePlan::build(normalized.headers(), &inputs.correspondence);
    debug!(
        "Reconciliation plan: {} to delete, {} to rename, {} to synthesize",
        plan.to_delete.len(),
        plan.to_rename.len(),
        plan.to_synthesize.len()
    );
    let final_table = reconcile::apply(
        normalized.clone(),
        &plan,
        inputs.target.headers(),
        &config.placeholder,
        &config.coercions,
    )
    .context("Bringing supplier data to target format")?;
    info!(
        "Supplier data brought to target format, new shape {}",
        shape(&final_table)
    );

    Ok(PipelineOutcome {
        snapshots: Snapshots {
            tidy,
            normalized,
            final_table,
        },
        plan,
        color_report,
        make_report,
    })
}

fn log_report(stage: &str, report: &MappingReport) {
    if report.all_mapped() {
        info!("{stage} mapped into '{}'. {}", report.column, report.summary());
    } else {
        warn!("{stage} mapped into '{}'. {}", report.column, report.summary());
    }
}

fn shape(table: &Table) -> String {
    let (rows, columns) = table.shape();
    format!("({rows}, {columns})")
}

pub fn load_inputs(args: &Cli) -> Result<(PipelineInputs, PipelineConfig)> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let store = MappingStore::load(&args.mappings)?;
    let mut config = store.pipeline_config();
    args.apply_overrides(&mut config);

    let supplier = loaders::load_supplier_json(&args.supplier, encoding)
        .with_context(|| format!("Loading supplier data from {:?}", args.supplier))?;
    let delimiter = io_utils::resolve_input_delimiter(&args.target, args.target_delimiter);
    debug!(
        "Reading target {:?} with delimiter '{}'",
        args.target,
        io_utils::printable_delimiter(delimiter)
    );
    let target = loaders::load_target_table(&args.target, delimiter, encoding)
        .with_context(|| format!("Loading target data from {:?}", args.target))?;

    let inputs = PipelineInputs {
        supplier,
        target,
        color_lookup: store.color_lookup(),
        correspondence: store.correspondence,
    };
    Ok((inputs, config))
}

pub fn execute(args: &Cli) -> Result<()> {
    let (inputs, config) = load_inputs(args)?;
    let outcome = run_pipeline(&inputs, &config)?;
    drop(inputs);

    if let Some(rows) = args.preview {
        preview::print_preview(&outcome.snapshots.final_table, rows);
    }
    if args.dry_run {
        preview::print_plan(&outcome.plan);
        info!("Dry run complete; no snapshots written");
        return Ok(());
    }

    let mut sink = CsvDirectorySink::new(&args.output_dir);
    let destination = sink.write(&outcome.snapshots)?;
    info!("Success! Snapshots written to {destination}, task complete.");
    Ok(())
}
