// ⚙️ Merge Engine - Row-by-row merge of enrichment sheets into the primary sheet
// Rows line up by position only. A shorter enrichment sheet simply stops contributing.

use crate::cell::CellValue;
use crate::config::MergeConfig;
use crate::plan::{FieldRule, MergePlan};
use crate::report::{FieldStats, MergeReport, SourceCoverage};
use crate::table::{read_table, temp_sibling, write_csv, Table};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ============================================================================
// MERGE ENGINE
// ============================================================================

pub struct MergeEngine {
    plan: MergePlan,
}

impl MergeEngine {
    pub fn new(plan: MergePlan) -> Self {
        MergeEngine { plan }
    }

    pub fn plan(&self) -> &MergePlan {
        &self.plan
    }

    /// Values the enrichment sources hold for `field` at row `index`
    ///
    /// Sources without that row contribute nothing; a missing column counts
    /// as an empty cell.
    pub fn gather(&self, field: &FieldRule, sources: &[Table], index: usize) -> Vec<CellValue> {
        let mut values = Vec::new();
        for (source_index, source) in sources.iter().enumerate() {
            let Some(row) = source.row(index) else {
                continue;
            };
            for column in field.columns_for(source_index) {
                values.push(row.get(column).cloned().unwrap_or_default());
            }
        }
        values
    }

    /// Merged value of `field` for row `index`, without writing it back
    pub fn merge_field(
        &self,
        field: &FieldRule,
        primary: &Table,
        sources: &[Table],
        index: usize,
    ) -> CellValue {
        let current = primary
            .get(index, &field.target)
            .cloned()
            .unwrap_or_default();
        let secondaries = self.gather(field, sources, index);
        field.kind.merge(&current, &secondaries)
    }

    /// Merge every field of every primary row in place
    pub fn run(&self, primary: &mut Table, sources: &[Table]) -> MergeReport {
        let mut report = MergeReport::new(primary.name());
        for problem in self.plan.check(sources.len()) {
            warn!("merge plan: {}", problem);
            report.warnings.push(problem);
        }

        for source in sources {
            let coverage = SourceCoverage::new(source.name(), source.len(), primary.len());
            if !coverage.is_aligned() {
                let message = format!(
                    "{} has {} rows but {} has {}; rows are matched by position",
                    source.name(),
                    source.len(),
                    primary.name(),
                    primary.len()
                );
                warn!("{}", message);
                report.warnings.push(message);
            }
            report.sources.push(coverage);
        }

        let mut stats: Vec<FieldStats> = self
            .plan
            .fields
            .iter()
            .map(|f| FieldStats::new(&f.target))
            .collect();

        for index in 0..primary.len() {
            for (field, field_stats) in self.plan.fields.iter().zip(stats.iter_mut()) {
                let merged = self.merge_field(field, primary, sources, index);
                field_stats.record(&merged);
                primary.set(index, &field.target, merged);
            }
        }

        // Make the target columns exist even for an empty primary table
        for field in &self.plan.fields {
            primary.add_column(&field.target);
        }

        report.rows_processed = primary.len();
        report.fields = stats;
        report
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new(MergePlan::default())
    }
}

// ============================================================================
// FULL RUN
// ============================================================================

/// Load every table, merge, then write the output (and report if configured)
///
/// Nothing is written unless every input loaded and merged.
pub fn run(config: &MergeConfig) -> Result<(Table, MergeReport)> {
    info!("Loading primary table {}", config.primary.path.display());
    let mut primary = read_table(&config.primary.path, config.primary.sheet.as_deref())
        .with_context(|| format!("Failed to read primary table: {}", config.primary.path.display()))?;
    info!("Loaded {} rows from {}", primary.len(), primary.name());

    let mut sources = Vec::with_capacity(config.sources.len());
    for input in &config.sources {
        let table = read_table(&input.path, input.sheet.as_deref())
            .with_context(|| format!("Failed to read enrichment table: {}", input.path.display()))?;
        info!("Loaded {} rows from {}", table.len(), table.name());
        sources.push(table);
    }

    let engine = MergeEngine::new(config.plan.clone());
    let report = engine.run(&mut primary, &sources);
    info!("{}", report.summary());

    // Report is staged before the CSV; a failure on either side leaves neither file
    let staged_report = match &config.report {
        Some(path) => Some((stage_report(&report, path)?, path)),
        None => None,
    };

    if let Err(err) = write_csv(&primary, &config.output) {
        if let Some((temp, _)) = &staged_report {
            let _ = fs::remove_file(temp);
        }
        return Err(err)
            .with_context(|| format!("Failed to write output: {}", config.output.display()));
    }
    info!("Merged table written to {}", config.output.display());

    if let Some((temp, report_path)) = staged_report {
        fs::rename(&temp, report_path)
            .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
        info!("Run report written to {}", report_path.display());
    }

    Ok((primary, report))
}

/// Write the report JSON to a temporary sibling of `path`
fn stage_report(report: &MergeReport, path: &Path) -> Result<PathBuf> {
    let json = report.to_json()?;
    let temp = temp_sibling(path);
    fs::write(&temp, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(temp)
}

// ============================================================================
// TESTS
// ============================================================================
