// 🔧 Configuration - Which files to merge and how
// Defaults in code → TOML file → command-line overrides

use crate::plan::MergePlan;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// One spreadsheet to read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInput {
    pub path: PathBuf,

    /// Worksheet name for workbooks; first sheet when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

impl TableInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TableInput {
            path: path.into(),
            sheet: None,
        }
    }

    /// Builder pattern: read a named worksheet
    pub fn with_sheet(mut self, sheet: &str) -> Self {
        self.sheet = Some(sheet.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Merged CSV output
    pub output: PathBuf,

    /// Optional JSON run report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,

    /// Rows shown in the console sample after a run
    pub sample_rows: usize,

    /// Sheet whose rows receive the merged values
    pub primary: TableInput,

    /// Enrichment sheets, in merge order
    pub sources: Vec<TableInput>,

    pub plan: MergePlan,
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            output: PathBuf::from("poems_merged_output.csv"),
            report: None,
            sample_rows: 3,
            primary: TableInput::new("main.xlsx"),
            sources: vec![TableInput::new("Sheet1.xlsx"), TableInput::new("Sheet2.xlsx")],
            plan: MergePlan::default(),
        }
    }
}

/// Command-line values that replace configured ones when present
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub primary: Option<PathBuf>,
    pub sources: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub sample_rows: Option<usize>,
}

impl MergeConfig {
    /// Parse a TOML document; omitted keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse merge configuration")
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Apply command-line overrides
    ///
    /// Given `--source` paths replace the whole source list.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(primary) = overrides.primary {
            self.primary = TableInput::new(primary);
        }
        if !overrides.sources.is_empty() {
            self.sources = overrides.sources.into_iter().map(TableInput::new).collect();
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if overrides.report.is_some() {
            self.report = overrides.report;
        }
        if let Some(rows) = overrides.sample_rows {
            self.sample_rows = rows;
        }
    }

    /// Reject configurations that would overwrite an input or merge nothing
    pub fn validate(&self) -> Result<()> {
        let inputs = std::iter::once(&self.primary).chain(&self.sources);
        for input in inputs {
            if same_path(&input.path, &self.output) {
                bail!(
                    "Output path {} is also an input; refusing to overwrite it",
                    self.output.display()
                );
            }
        }
        if self.plan.fields.is_empty() {
            bail!("Merge plan has no fields");
        }
        Ok(())
    }

    /// Serialize back to TOML (used to print the effective configuration)
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize merge configuration")
    }
}

/// Lexical path equality ignoring `.` components (`./a.csv` == `a.csv`)
fn same_path(a: &Path, b: &Path) -> bool {
    significant_components(a).eq(significant_components(b))
}

fn significant_components(path: &Path) -> impl Iterator<Item = Component<'_>> {
    path.components().filter(|c| !matches!(c, Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergeKind;

    #[test]
    fn test_defaults_match_poem_sheets() {
        let config = MergeConfig::default();
        assert_eq!(config.primary.path, PathBuf::from("main.xlsx"));
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sample_rows, 3);
        assert_eq!(config.plan, MergePlan::poems());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MergeConfig::from_toml_str(
            r#"
            output = "out/merged.csv"

            [primary]
            path = "poems.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.primary.path, PathBuf::from("poems.csv"));
        assert_eq!(config.output, PathBuf::from("out/merged.csv"));
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.plan, MergePlan::poems());
    }

    #[test]
    fn test_toml_sources_and_plan() {
        let config = MergeConfig::from_toml_str(
            r#"
            sample_rows = 5

            [[sources]]
            path = "annotations.xlsx"
            sheet = "Round 2"

            [[plan.fields]]
            target = "moods"
            kind = "sentiment"
            sources = [["mood", "mood_02"]]
            "#,
        )
        .unwrap();

        assert_eq!(config.sample_rows, 5);
        assert_eq!(
            config.sources,
            vec![TableInput::new("annotations.xlsx").with_sheet("Round 2")]
        );
        assert_eq!(config.plan.fields.len(), 1);
        assert_eq!(config.plan.fields[0].kind, MergeKind::Sentiment);
        assert_eq!(config.plan.fields[0].columns_for(0), &["mood", "mood_02"]);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(MergeConfig::from_toml_str("sample_rows = \"three\"").is_err());
        assert!(MergeConfig::from_toml_str("[[plan.fields]]\ntarget = \"x\"\nkind = \"tree\"").is_err());
    }

    #[test]
    fn test_overrides_replace_values() {
        let mut config = MergeConfig::default();
        config.apply(ConfigOverrides {
            primary: Some(PathBuf::from("a.csv")),
            sources: vec![PathBuf::from("b.csv")],
            output: None,
            report: Some(PathBuf::from("report.json")),
            sample_rows: Some(0),
        });

        assert_eq!(config.primary, TableInput::new("a.csv"));
        assert_eq!(config.sources, vec![TableInput::new("b.csv")]);
        assert_eq!(config.output, PathBuf::from("poems_merged_output.csv"));
        assert_eq!(config.report, Some(PathBuf::from("report.json")));
        assert_eq!(config.sample_rows, 0);
    }

    #[test]
    fn test_validate_rejects_output_over_input() {
        let mut config = MergeConfig::default();
        config.output = PathBuf::from("Sheet1.xlsx");
        assert!(config.validate().is_err());

        let mut config = MergeConfig::default();
        config.output = PathBuf::from("./Sheet1.xlsx");
        assert!(config.validate().is_err());

        let mut config = MergeConfig::default();
        config.primary = TableInput::new("data/./main.csv");
        config.output = PathBuf::from("data/main.csv");
        assert!(config.validate().is_err());

        let mut config = MergeConfig::default();
        config.plan = MergePlan::new(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = MergeConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(MergeConfig::from_toml_str(&text).unwrap(), config);
    }
}
