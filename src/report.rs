// 📊 Merge Report - What a run did, per source and per field
// Serialized to JSON alongside the merged sheet when requested

use crate::cell::CellValue;
use crate::merge::SENTIMENT_SEPARATOR;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// SOURCE COVERAGE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCoverage {
    pub name: String,

    /// Rows in the enrichment table
    pub rows: usize,

    /// Primary rows past the end of this table (they got nothing from it)
    pub uncovered_rows: usize,

    /// Rows beyond the primary table's length (never read)
    pub ignored_rows: usize,
}

impl SourceCoverage {
    pub fn new(name: &str, rows: usize, primary_rows: usize) -> Self {
        SourceCoverage {
            name: name.to_string(),
            rows,
            uncovered_rows: primary_rows.saturating_sub(rows),
            ignored_rows: rows.saturating_sub(primary_rows),
        }
    }

    pub fn is_aligned(&self) -> bool {
        self.uncovered_rows == 0 && self.ignored_rows == 0
    }
}

// ============================================================================
// FIELD STATS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldStats {
    pub field: String,

    /// Rows whose merged value is non-empty
    pub filled_rows: usize,

    /// Items (or sentiment labels) across all rows
    pub total_items: usize,
}

impl FieldStats {
    pub fn new(field: &str) -> Self {
        FieldStats {
            field: field.to_string(),
            ..Default::default()
        }
    }

    /// Count one merged value
    pub fn record(&mut self, value: &CellValue) {
        let items = match value {
            CellValue::Sequence(items) => items.len(),
            CellValue::Text(text) if text.is_empty() => 0,
            CellValue::Text(text) => text.split(SENTIMENT_SEPARATOR).count(),
            CellValue::Empty => 0,
            CellValue::Number(_) | CellValue::Bool(_) => 1,
        };
        if items > 0 {
            self.filled_rows += 1;
            self.total_items += items;
        }
    }
}

// ============================================================================
// MERGE REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub primary: String,
    pub rows_processed: usize,
    pub sources: Vec<SourceCoverage>,
    pub fields: Vec<FieldStats>,
    pub warnings: Vec<String>,
    pub merged_at: DateTime<Utc>,
}

impl MergeReport {
    pub fn new(primary: &str) -> Self {
        MergeReport {
            primary: primary.to_string(),
            rows_processed: 0,
            sources: Vec::new(),
            fields: Vec::new(),
            warnings: Vec::new(),
            merged_at: Utc::now(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldStats> {
        self.fields.iter().find(|f| f.field == name)
    }

    pub fn summary(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|f| format!("{} {}/{}", f.field, f.filled_rows, self.rows_processed))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Merged {} rows of {} from {} sources | filled: {} | {} warnings",
            self.rows_processed,
            self.primary,
            self.sources.len(),
            fields,
            self.warnings.len()
        )
    }

    /// Write the report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize merge report")
    }
}
