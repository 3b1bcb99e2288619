use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::{
    cli::MergeArgs,
    codebook, concat, dataset, io_utils,
    metadata::{self, MetadataRegistry},
    reconcile::{self, LabelRegistry},
};

/// Runs the whole merge: read each wave in input order, reconcile its schema
/// against the shared registries, then concatenate and write once.
///
/// Waves must be processed strictly in input order; the registries are
/// order-dependent (first wave wins canonical names, last wave wins two of
/// the three metadata facets). Any per-wave failure aborts the run before
/// the output files are created.
pub fn execute(args: &MergeArgs) -> Result<()> {
    if args.inputs.is_empty() {
        bail!("At least one input file must be provided");
    }

    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let fallback = io_utils::resolve_input_delimiter(&args.inputs[0], args.delimiter);
    let output_delimiter =
        io_utils::resolve_output_delimiter(&args.output, args.output_delimiter, fallback);

    let mut registry = LabelRegistry::default();
    let mut merged_meta = MetadataRegistry::default();
    let mut tables = Vec::with_capacity(args.inputs.len());
    let mut renames = Vec::with_capacity(args.inputs.len());

    for input in &args.inputs {
        let delimiter = io_utils::resolve_input_delimiter(input, args.delimiter);
        info!("Processing {input:?}");
        let (table, book) = dataset::read(input, delimiter, encoding)
            .with_context(|| format!("Reading dataset {input:?}"))?;
        let rename = reconcile::reconcile(&table, &book, &mut registry)
            .with_context(|| format!("Reconciling schema for {input:?}"))?;
        debug!(
            "{input:?}: {} row(s), {} column(s), {} labeled",
            table.row_count(),
            table.column_count(),
            rename.len()
        );
        metadata::merge(&book, &rename, &mut merged_meta);
        tables.push(table);
        renames.push(rename);
    }

    let merged = concat::concatenate(&tables, &renames);
    dataset::write(
        &args.output,
        &merged,
        registry.column_labels(),
        &merged_meta,
        output_delimiter,
        codebook::DISPLAY_WIDTH,
    )
    .with_context(|| format!("Writing merged dataset to {:?}", args.output))?;

    info!(
        "✓ Merged {} wave(s) into {:?}: {} row(s) across {} column(s), {} label binding(s)",
        args.inputs.len(),
        args.output,
        merged.row_count(),
        merged.column_count(),
        registry.len()
    );
    Ok(())
}
