// 📋 Table Layer - Row-indexed spreadsheets with named columns
// Readers for CSV and workbook files, one CSV writer

use crate::cell::CellValue;
use crate::error::{TableError, TableResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// TABLE
// ============================================================================

/// Table - Columns plus rows addressed by 0-based position
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        let mut table = Table {
            name: name.into(),
            ..Default::default()
        };
        for column in columns {
            table.add_column(&column);
        }
        table
    }

    /// Build a table from string cells, mainly for tests and fixtures
    pub fn from_rows(name: &str, columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Table::new(name, columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|cell| CellValue::from_text(cell)).collect());
        }
        table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Add a column at the end (no-op if it exists); returns its position
    pub fn add_column(&mut self, column: &str) -> usize {
        if let Some(position) = self.column_index(column) {
            return position;
        }
        let position = self.columns.len();
        self.columns.push(column.to_string());
        self.index.insert(column.to_string(), position);
        for row in &mut self.rows {
            row.push(CellValue::Empty);
        }
        position
    }

    /// Append a row; short rows are padded with `Empty`, long rows truncated
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(cells);
    }

    /// Row at `index`, or `None` past the end
    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        if index < self.rows.len() {
            Some(RowView { table: self, index })
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        (0..self.rows.len()).map(move |index| RowView { table: self, index })
    }

    pub fn get(&self, index: usize, column: &str) -> Option<&CellValue> {
        let position = self.column_index(column)?;
        self.rows.get(index)?.get(position)
    }

    /// Write a cell, adding the column if needed
    ///
    /// Returns false when `index` is past the last row.
    pub fn set(&mut self, index: usize, column: &str, value: CellValue) -> bool {
        if index >= self.rows.len() {
            return false;
        }
        let position = self.add_column(column);
        self.rows[index][position] = value;
        true
    }

    /// Cells of one column, top to bottom
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a CellValue>> {
        let position = self.column_index(column)?;
        Some(self.rows.iter().map(move |row| &row[position]))
    }
}

/// RowView - One row, looked up by column name
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> RowView<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell under `column`, or `None` if the table has no such column
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        self.table.get(self.index, column)
    }

    pub fn cells(&self) -> &'a [CellValue] {
        &self.table.rows[self.index]
    }
}

// ============================================================================
// FORMATS & READERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableFormat {
    Csv,
    Tsv,
    Workbook,
}

impl TableFormat {
    pub fn name(&self) -> &str {
        match self {
            TableFormat::Csv => "CSV",
            TableFormat::Tsv => "TSV",
            TableFormat::Workbook => "Workbook",
        }
    }

    /// Detect the format from the file extension
    pub fn detect(path: &Path) -> TableResult<TableFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "tsv" | "tab" => Ok(TableFormat::Tsv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(TableFormat::Workbook),
            _ => Err(TableError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            TableFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

/// TableReader - Load a file into a `Table`
pub trait TableReader: Send + Sync {
    fn read(&self, path: &Path) -> TableResult<Table>;

    fn format(&self) -> TableFormat;
}

/// Reader for the detected format; `sheet` only applies to workbooks
pub fn get_reader(format: TableFormat, sheet: Option<&str>) -> Box<dyn TableReader> {
    match format {
        TableFormat::Csv | TableFormat::Tsv => Box::new(CsvReader::new(format)),
        TableFormat::Workbook => Box::new(WorkbookReader::new(sheet.map(str::to_string))),
    }
}

/// Detect the format and read the file
pub fn read_table(path: &Path, sheet: Option<&str>) -> TableResult<Table> {
    let format = TableFormat::detect(path)?;
    get_reader(format, sheet).read(path)
}

/// Cell text pandas reads as NaN by default; these cells hold nothing
pub const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Cell value for text read from a sheet: empty and NA tokens are `Empty`
fn cell_from_text(text: &str) -> CellValue {
    if NA_TOKENS.contains(&text) {
        CellValue::Empty
    } else {
        CellValue::from_text(text)
    }
}

fn table_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("table")
        .to_string()
}

/// Header names as pandas reports them: blanks become `Unnamed: N`,
/// repeats get a `.1`, `.2` suffix
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (position, name) in raw.into_iter().enumerate() {
        let name = if name.trim().is_empty() {
            format!("Unnamed: {}", position)
        } else {
            name
        };

        let mut candidate = name.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{}.{}", name, count);
        }
        seen.insert(candidate.clone(), 0);
        headers.push(candidate);
    }

    headers
}

// ============================================================================
// CSV
// ============================================================================

pub struct CsvReader {
    format: TableFormat,
}

impl CsvReader {
    pub fn new(format: TableFormat) -> Self {
        CsvReader { format }
    }
}

impl TableReader for CsvReader {
    fn read(&self, path: &Path) -> TableResult<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.format.delimiter())
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let raw_headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        if raw_headers.is_empty() || raw_headers.iter().all(|h| h.is_empty()) {
            return Err(TableError::NoHeader(path.display().to_string()));
        }

        let mut table = Table::new(table_name(path), unique_headers(raw_headers));
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(cell_from_text).collect());
        }

        Ok(table)
    }

    fn format(&self) -> TableFormat {
        self.format
    }
}

/// Write `table` as CSV (tab-separated for `.tsv`)
///
/// Goes through a temporary sibling file that is renamed into place, so a
/// failed write leaves nothing behind at `path`.
pub fn write_csv(table: &Table, path: &Path) -> TableResult<()> {
    let delimiter = match TableFormat::detect(path) {
        Ok(TableFormat::Tsv) => b'\t',
        _ => b',',
    };
    let temp_path = temp_sibling(path);

    let result = write_records(table, &temp_path, delimiter)
        .and_then(|()| fs::rename(&temp_path, path).map_err(TableError::from));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_records(table: &Table, path: &Path, delimiter: u8) -> TableResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.cells().iter().map(CellValue::to_cell_string))?;
    }
    writer.flush()?;
    Ok(())
}

/// `<name>.tmp` next to `path`, used to stage writes before a rename
pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ============================================================================
// WORKBOOKS (xlsx, xls, ods)
// ============================================================================

pub struct WorkbookReader {
    sheet: Option<String>,
}

impl WorkbookReader {
    pub fn new(sheet: Option<String>) -> Self {
        WorkbookReader { sheet }
    }
}

#[cfg(feature = "xlsx")]
impl TableReader for WorkbookReader {
    fn read(&self, path: &Path) -> TableResult<Table> {
        use calamine::{open_workbook_auto, Reader};

        let mut workbook =
            open_workbook_auto(path).map_err(|e| TableError::Workbook(e.to_string()))?;

        let range = match &self.sheet {
            Some(name) => {
                if !workbook.sheet_names().iter().any(|s| s == name) {
                    return Err(TableError::MissingSheet(name.clone()));
                }
                workbook
                    .worksheet_range(name)
                    .map_err(|e| TableError::Workbook(e.to_string()))?
            }
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| TableError::MissingSheet(format!("first sheet of {}", path.display())))?
                .map_err(|e| TableError::Workbook(e.to_string()))?,
        };

        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| TableError::NoHeader(path.display().to_string()))?;
        let mut table = Table::new(table_name(path), header_names(header));
        for row in rows {
            table.push_row(row.iter().map(cell_from_data).collect());
        }

        Ok(table)
    }

    fn format(&self) -> TableFormat {
        TableFormat::Workbook
    }
}

#[cfg(not(feature = "xlsx"))]
impl TableReader for WorkbookReader {
    fn read(&self, path: &Path) -> TableResult<Table> {
        Err(TableError::UnsupportedFormat(format!(
            "{} (rebuild with --features xlsx)",
            path.display()
        )))
    }

    fn format(&self) -> TableFormat {
        TableFormat::Workbook
    }
}

#[cfg(feature = "xlsx")]
fn header_names(header: &[calamine::Data]) -> Vec<String> {
    unique_headers(header.iter().map(|cell| cell.to_string()).collect())
}

#[cfg(feature = "xlsx")]
fn cell_from_data(cell: &calamine::Data) -> CellValue {
    use calamine::{Data, DataType};

    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => cell_from_text(s),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(x) => CellValue::Number(*x),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| CellValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
            .unwrap_or(CellValue::Empty),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_row_lookup_and_absent_values() {
        let table = Table::from_rows("poems", &["title", "people"], &[&["Ode", "['Keats']"]]);

        let row = table.row(0).unwrap();
        assert_eq!(row.get("title"), Some(&CellValue::from("Ode")));
        assert_eq!(row.get("places"), None);
        assert!(table.row(1).is_none());
        assert_eq!(table.get(5, "title"), None);
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut table = Table::new("t", vec!["a".to_string(), "b".to_string()]);
        table.push_row(vec![CellValue::from("x")]);
        assert_eq!(table.get(0, "b"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_set_adds_missing_column() {
        let mut table = Table::from_rows("t", &["title"], &[&["Ode"], &["Elegy"]]);
        assert!(table.set(1, "sentiments", CellValue::from("awe")));
        assert_eq!(table.columns(), &["title".to_string(), "sentiments".to_string()]);
        assert_eq!(table.get(0, "sentiments"), Some(&CellValue::Empty));
        assert_eq!(table.get(1, "sentiments"), Some(&CellValue::from("awe")));
        assert!(!table.set(2, "title", CellValue::Empty));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(TableFormat::detect(Path::new("a.CSV")).unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::detect(Path::new("a.tsv")).unwrap(), TableFormat::Tsv);
        assert_eq!(
            TableFormat::detect(Path::new("main.xlsx")).unwrap(),
            TableFormat::Workbook
        );
        assert!(TableFormat::detect(Path::new("notes.txt")).is_err());
    }

    #[test]
    fn test_unique_headers() {
        let headers = unique_headers(vec![
            "people".to_string(),
            "".to_string(),
            "people".to_string(),
            "people".to_string(),
        ]);
        assert_eq!(headers, vec!["people", "Unnamed: 1", "people.1", "people.2"]);
    }

    #[test]
    fn test_csv_reader_handles_bom_and_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sheet1.csv");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "\u{feff}people,places\n\"['Ann', 'Bo']\",\nCid\n").unwrap();
        drop(file);

        let table = read_table(&path, None).unwrap();
        assert_eq!(table.name(), "Sheet1");
        assert_eq!(table.columns(), &["people".to_string(), "places".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "people"), Some(&CellValue::from("['Ann', 'Bo']")));
        assert_eq!(table.get(0, "places"), Some(&CellValue::Empty));
        assert_eq!(table.get(1, "places"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_csv_reader_treats_na_tokens_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sheet2.csv");
        fs::write(
            &path,
            "people,places,Sentiments,objects\nN/A,nan,NULL,None\n#N/A,<NA>,n/a,['N/A']\n",
        )
        .unwrap();

        let table = read_table(&path, None).unwrap();
        for column in ["people", "places", "Sentiments", "objects"] {
            assert_eq!(table.get(0, column), Some(&CellValue::Empty));
        }
        assert_eq!(table.get(1, "people"), Some(&CellValue::Empty));
        assert_eq!(table.get(1, "Sentiments"), Some(&CellValue::Empty));
        assert_eq!(table.get(1, "objects"), Some(&CellValue::from("['N/A']")));
    }

    #[test]
    fn test_na_tokens_match_exactly() {
        assert_eq!(cell_from_text("NA"), CellValue::Empty);
        assert_eq!(cell_from_text(""), CellValue::Empty);
        assert_eq!(cell_from_text(" NA "), CellValue::from(" NA "));
        assert_eq!(cell_from_text("Nancy"), CellValue::from("Nancy"));
        assert_eq!(cell_from_text("none"), CellValue::from("none"));
    }

    #[test]
    fn test_csv_reader_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        assert!(matches!(read_table(&path, None), Err(TableError::NoHeader(_))));
    }

    #[test]
    fn test_write_csv_round_trip() {
        use crate::literal::Literal;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::from_rows("out", &["title", "people"], &[&["Ode, Part 1", ""]]);
        table.set(
            0,
            "people",
            CellValue::Sequence(vec![Literal::str("Alice"), Literal::str("O'Neil")]),
        );
        write_csv(&table, &path).unwrap();

        assert!(!temp_sibling(&path).exists());
        let back = read_table(&path, None).unwrap();
        assert_eq!(back.get(0, "title"), Some(&CellValue::from("Ode, Part 1")));
        assert_eq!(
            back.get(0, "people"),
            Some(&CellValue::from("['Alice', \"O'Neil\"]"))
        );
    }

    #[test]
    fn test_write_csv_to_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let table = Table::from_rows("out", &["a"], &[&["1"]]);

        assert!(write_csv(&table, &path).is_err());
        assert!(!path.exists());
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_workbook_cell_mapping() {
        use calamine::{CellErrorType, Data};

        assert_eq!(cell_from_data(&Data::Empty), CellValue::Empty);
        assert_eq!(cell_from_data(&Data::String(String::new())), CellValue::Empty);
        assert_eq!(cell_from_data(&Data::String("N/A".to_string())), CellValue::Empty);
        assert_eq!(
            cell_from_data(&Data::String("['Rome']".to_string())),
            CellValue::from("['Rome']")
        );
        assert_eq!(cell_from_data(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(cell_from_data(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(cell_from_data(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(cell_from_data(&Data::Error(CellErrorType::NA)), CellValue::Empty);
        assert_eq!(
            cell_from_data(&Data::DateTimeIso("2024-03-01T10:00:00".to_string())),
            CellValue::from("2024-03-01T10:00:00")
        );
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_workbook_header_names() {
        use calamine::Data;

        let header = vec![
            Data::String("people".to_string()),
            Data::Empty,
            Data::String("people".to_string()),
            Data::Int(3),
        ];
        assert_eq!(header_names(&header), vec!["people", "Unnamed: 1", "people.1", "3"]);
    }

    #[test]
    fn test_get_reader_reports_format() {
        assert_eq!(get_reader(TableFormat::Tsv, None).format(), TableFormat::Tsv);
        assert_eq!(
            get_reader(TableFormat::Workbook, Some("Round 2")).format(),
            TableFormat::Workbook
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = read_table(Path::new("/nonexistent/main.csv"), None);
        assert!(result.is_err());
    }
}
