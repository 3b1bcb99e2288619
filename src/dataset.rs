//! Dataset reader and writer: a CSV body paired with a codebook sidecar.
//!
//! These are the physical-format collaborators around the reconciliation
//! engine. The reader materializes one wave into memory; the writer
//! serializes the merged result. Both serializations happen fully in memory
//! before any file is created, so a failed run leaves no partial output.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::Encoding;
use log::warn;

use crate::{
    codebook::{Codebook, VariableMeta},
    io_utils,
    metadata::MetadataRegistry,
    table::Table,
};

/// Sidecar path convention: `survey.csv` → `survey.codebook.yaml`.
pub fn codebook_path(data_path: &Path) -> PathBuf {
    data_path.with_extension("codebook.yaml")
}

/// Reads one wave. A missing sidecar yields an empty codebook (every column
/// unlabeled); a sidecar that exists but does not parse is a fatal error.
pub fn read(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<(Table, Codebook)> {
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let mut table = Table::new(headers);

    for (row_idx, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("Reading row {} in {path:?}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)?;
        let cells = decoded
            .into_iter()
            .map(|field| if field.is_empty() { None } else { Some(field) })
            .collect();
        table
            .push_row(cells)
            .with_context(|| format!("Row {} in {path:?}", row_idx + 2))?;
    }

    let codebook = load_codebook(path, &table)?;
    Ok((table, codebook))
}

fn load_codebook(data_path: &Path, table: &Table) -> Result<Codebook> {
    if io_utils::is_dash(data_path) {
        return Ok(Codebook::default());
    }
    let sidecar = codebook_path(data_path);
    if !sidecar.exists() {
        return Ok(Codebook::default());
    }
    let codebook = Codebook::load(&sidecar)?;
    for variable in &codebook.variables {
        if !table.has_column(&variable.name) {
            warn!(
                "Codebook {sidecar:?} describes column '{}' absent from {data_path:?}; ignoring it",
                variable.name
            );
        }
    }
    Ok(codebook)
}

/// Writes the merged table and its codebook. `labels` maps canonical column
/// name → label; `display_width` is stamped uniformly on every column.
pub fn write(
    path: &Path,
    table: &Table,
    labels: &BTreeMap<String, String>,
    metadata: &MetadataRegistry,
    delimiter: u8,
    display_width: u32,
) -> Result<()> {
    let body = render_body(table, delimiter)?;
    let codebook = build_codebook(table, labels, metadata, display_width);
    let sidecar_text = codebook.to_yaml_string()?;

    fs::write(path, body).with_context(|| format!("Creating output file {path:?}"))?;
    let sidecar = codebook_path(path);
    fs::write(&sidecar, sidecar_text)
        .with_context(|| format!("Creating codebook file {sidecar:?}"))?;
    Ok(())
}

fn render_body(table: &Table, delimiter: u8) -> Result<Vec<u8>> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true);
    let mut writer = builder.from_writer(Vec::new());
    writer
        .write_record(table.columns())
        .context("Writing output headers")?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .context("Writing output row")?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing output body: {err}"))
}

fn build_codebook(
    table: &Table,
    labels: &BTreeMap<String, String>,
    metadata: &MetadataRegistry,
    display_width: u32,
) -> Codebook {
    let variables = table
        .columns()
        .iter()
        .map(|column| VariableMeta {
            name: column.clone(),
            label: labels.get(column).cloned(),
            value_labels: metadata.value_labels(column).cloned().unwrap_or_default(),
            measure: metadata.measure(column).map(str::to_string),
            missing: metadata.missing(column).to_vec(),
            display_width: Some(display_width),
        })
        .collect();
    Codebook { variables }
}
