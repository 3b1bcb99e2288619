use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use serde_json::json;

use crate::{cli::InspectArgs, codebook::MissingRule, dataset, io_utils};

pub fn execute(args: &InspectArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let (table, codebook) = dataset::read(&args.input, delimiter, encoding)
        .with_context(|| format!("Reading dataset {:?}", args.input))?;

    if args.json {
        let variables = table
            .columns()
            .iter()
            .map(|column| {
                let meta = codebook.variable(column);
                json!({
                    "name": column,
                    "label": meta.and_then(|m| m.label.clone()),
                    "measure": meta.and_then(|m| m.measure.clone()),
                    "value_labels": meta.map(|m| m.value_labels.clone()).unwrap_or_default(),
                    "missing": meta
                        .map(|m| m.missing.iter().map(MissingRule::describe).collect::<Vec<_>>())
                        .unwrap_or_default(),
                })
            })
            .collect::<Vec<_>>();
        let summary = json!({
            "path": args.input.display().to_string(),
            "rows": table.row_count(),
            "columns": table.column_count(),
            "variables": variables,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let headers = ["column", "label", "measure", "value_labels", "missing"]
        .map(str::to_string)
        .to_vec();
    let rows = table
        .columns()
        .iter()
        .map(|column| {
            let meta = codebook.variable(column);
            vec![
                column.clone(),
                meta.and_then(|m| m.label.clone()).unwrap_or_default(),
                meta.and_then(|m| m.measure.clone()).unwrap_or_default(),
                meta.map(|m| m.value_labels.len().to_string())
                    .unwrap_or_else(|| "0".to_string()),
                meta.map(|m| m.missing.iter().map(MissingRule::describe).join(", "))
                    .unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();
    print_table(&headers, &rows);
    info!(
        "{:?}: {} row(s), {} column(s)",
        args.input,
        table.row_count(),
        table.column_count()
    );
    Ok(())
}

fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    println!("{}", format_row(headers, &widths));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    println!("{}", format_row(&separator, &widths));
    for row in rows {
        println!("{}", format_row(row, &widths));
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = cells
        .iter()
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}
