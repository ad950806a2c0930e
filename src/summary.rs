// 🖨️ Table Summaries - Plain-text views for the console
// head / info / sample rows, in the spirit of a dataframe printout

use crate::table::Table;
use std::collections::BTreeSet;

/// Cells longer than this are cut in `format_head`
const MAX_CELL_WIDTH: usize = 24;

/// First `rows` rows with aligned columns
pub fn format_head(table: &Table, rows: usize) -> String {
    let shown: Vec<Vec<String>> = table
        .rows()
        .take(rows)
        .map(|row| row.cells().iter().map(|c| truncate(&c.to_string())).collect())
        .collect();

    let index_width = shown.len().saturating_sub(1).to_string().len();
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            shown
                .iter()
                .map(|cells| cells[i].chars().count())
                .chain(std::iter::once(truncate(column).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&" ".repeat(index_width));
    for (column, width) in table.columns().iter().zip(&widths) {
        out.push_str(&format!("  {:<width$}", truncate(column), width = *width));
    }
    out.push('\n');

    for (index, cells) in shown.iter().enumerate() {
        out.push_str(&format!("{:>width$}", index, width = index_width));
        for (cell, width) in cells.iter().zip(&widths) {
            out.push_str(&format!("  {:<width$}", cell, width = *width));
        }
        out.push('\n');
    }

    if table.len() > rows {
        out.push_str(&format!("... {} more rows\n", table.len() - rows));
    }
    out
}

/// Row count, then per column its non-empty count and the cell kinds seen
pub fn format_info(table: &Table) -> String {
    let mut out = format!("Table: {}\n", table.name());
    if table.is_empty() {
        out.push_str("Rows: 0 entries\n");
    } else {
        out.push_str(&format!(
            "Rows: {} entries, 0 to {}\n",
            table.len(),
            table.len() - 1
        ));
    }
    out.push_str(&format!("Columns (total {}):\n", table.columns().len()));

    let name_width = table
        .columns()
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0)
        .max("Column".len());

    out.push_str(&format!(
        " {:>3}  {:<name_width$}  {:>9}  Kinds\n",
        "#",
        "Column",
        "Non-Empty",
        name_width = name_width
    ));

    for (i, column) in table.columns().iter().enumerate() {
        let mut non_empty = 0;
        let mut kinds = BTreeSet::new();
        if let Some(values) = table.column_values(column) {
            for value in values {
                if !value.is_blank() {
                    non_empty += 1;
                    kinds.insert(value.kind());
                }
            }
        }
        let kinds = if kinds.is_empty() {
            "empty".to_string()
        } else {
            kinds.into_iter().collect::<Vec<_>>().join(", ")
        };

        out.push_str(&format!(
            " {:>3}  {:<name_width$}  {:>9}  {}\n",
            i,
            column,
            non_empty,
            kinds,
            name_width = name_width
        ));
    }

    out
}

/// Up to `rows` rows showing only `fields`, one labelled line each
pub fn format_sample<'a>(
    table: &Table,
    rows: usize,
    fields: impl IntoIterator<Item = &'a str> + Clone,
) -> String {
    let mut out = String::new();
    for row in table.rows().take(rows) {
        out.push_str(&format!("\nRow {}:\n", row.index() + 1));
        for field in fields.clone() {
            let value = row.get(field).map(|v| v.to_string()).unwrap_or_default();
            out.push_str(&format!("  {}: {}\n", label(field), value));
        }
    }
    out
}

/// `people` → `People`
fn label(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate(text: &str) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        single_line
    } else {
        let cut: String = single_line.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", cut)
    }
}
