use std::collections::HashMap;

use crate::{reconcile::RenameMap, table::Table};

/// Unions all renamed waves into one table, row-wise and never join-based.
///
/// The result's column set is the union of renamed column names in
/// first-seen order across waves. A row's cell for a column absent from its
/// source wave is null. Rows keep their within-wave order and waves appear
/// in input order.
pub fn concatenate(tables: &[Table], renames: &[RenameMap]) -> Table {
    debug_assert_eq!(tables.len(), renames.len());

    let renamed_headers: Vec<Vec<String>> = tables
        .iter()
        .zip(renames)
        .map(|(table, map)| {
            table
                .columns()
                .iter()
                .map(|column| map.get(column).unwrap_or(column).clone())
                .collect()
        })
        .collect();

    let mut columns: Vec<String> = Vec::new();
    let mut slot_by_name: HashMap<String, usize> = HashMap::new();
    for headers in &renamed_headers {
        for name in headers {
            if !slot_by_name.contains_key(name) {
                slot_by_name.insert(name.clone(), columns.len());
                columns.push(name.clone());
            }
        }
    }

    let total_rows = tables.iter().map(Table::row_count).sum();
    let mut rows: Vec<Vec<Option<String>>> = Vec::with_capacity(total_rows);
    for (table, headers) in tables.iter().zip(&renamed_headers) {
        let slots: Vec<usize> = headers.iter().map(|name| slot_by_name[name]).collect();
        for row in table.rows() {
            let mut cells = vec![None; columns.len()];
            for (cell, slot) in row.iter().zip(&slots) {
                cells[*slot] = cell.clone();
            }
            rows.push(cells);
        }
    }

    Table::from_parts(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[Option<&str>]]) -> Table {
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table
                .push_row(row.iter().map(|cell| cell.map(str::to_string)).collect())
                .expect("row width");
        }
        table
    }

    #[test]
    fn columns_union_in_first_seen_order() {
        let first = table(&["age", "q1"], &[&[Some("34"), Some("1")]]);
        let second = table(&["q1", "region"], &[&[Some("2"), Some("north")]]);
        let renames = vec![RenameMap::new(), RenameMap::new()];

        let merged = concatenate(&[first, second], &renames);
        assert_eq!(merged.columns(), ["age", "q1", "region"]);
    }

    #[test]
    fn absent_columns_are_null_filled() {
        let first = table(&["age"], &[&[Some("34")]]);
        let second = table(&["region"], &[&[Some("north")]]);
        let renames = vec![RenameMap::new(), RenameMap::new()];

        let merged = concatenate(&[first, second], &renames);
        assert_eq!(merged.row_count(), 2);
        assert_eq!(merged.cell(0, 0), Some("34"));
        assert_eq!(merged.cell(0, 1), None);
        assert_eq!(merged.cell(1, 0), None);
        assert_eq!(merged.cell(1, 1), Some("north"));
    }

    #[test]
    fn rename_maps_align_columns_across_waves() {
        let first = table(&["resp_age"], &[&[Some("34")], &[Some("58")]]);
        let second = table(&["age"], &[&[Some("41")]]);
        let renames = vec![
            RenameMap::new(),
            RenameMap::from([("age".to_string(), "resp_age".to_string())]),
        ];

        let merged = concatenate(&[first, second], &renames);
        assert_eq!(merged.columns(), ["resp_age"]);
        assert_eq!(merged.row_count(), 3);
        assert_eq!(merged.cell(2, 0), Some("41"));
    }

    #[test]
    fn row_count_is_sum_of_wave_row_counts() {
        let first = table(&["a"], &[&[Some("1")], &[Some("2")]]);
        let second = table(&["a"], &[&[Some("3")]]);
        let third = table(&["a"], &[]);
        let renames = vec![RenameMap::new(); 3];

        let merged = concatenate(&[first, second, third], &renames);
        assert_eq!(merged.row_count(), 3);
    }
}
