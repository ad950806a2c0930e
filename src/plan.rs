// 🗺️ Merge Plan - Which enrichment columns feed which primary field
// The default plan matches the poem annotation sheets.

use crate::merge::MergeKind;
use serde::{Deserialize, Serialize};

// ============================================================================
// FIELD RULE
// ============================================================================

/// FieldRule - One merged field of the primary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Primary column read as the first value and overwritten with the result
    pub target: String,

    pub kind: MergeKind,

    /// Columns read from each enrichment source, outer index = source order
    #[serde(default)]
    pub sources: Vec<Vec<String>>,
}

impl FieldRule {
    pub fn new(target: &str, kind: MergeKind) -> Self {
        FieldRule {
            target: target.to_string(),
            kind,
            sources: Vec::new(),
        }
    }

    pub fn list(target: &str) -> Self {
        Self::new(target, MergeKind::List)
    }

    pub fn sentiment(target: &str) -> Self {
        Self::new(target, MergeKind::Sentiment)
    }

    /// Builder pattern: columns of the next enrichment source
    pub fn from_source(mut self, columns: &[&str]) -> Self {
        self.sources
            .push(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Columns for the source at `source_index` (empty if none configured)
    pub fn columns_for(&self, source_index: usize) -> &[String] {
        self.sources
            .get(source_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ============================================================================
// MERGE PLAN
// ============================================================================

/// MergePlan - Ordered field rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergePlan {
    pub fields: Vec<FieldRule>,
}

impl MergePlan {
    pub fn new(fields: Vec<FieldRule>) -> Self {
        MergePlan { fields }
    }

    /// Plan for the poem sheets: people, places, sentiments, objects
    ///
    /// Enrichment sheets name their sentiment columns `Sentiments`, and only
    /// the first sheet carries `original_objects`.
    pub fn poems() -> Self {
        MergePlan::new(vec![
            FieldRule::list("people")
                .from_source(&["people", "people_02"])
                .from_source(&["people", "people_02"]),
            FieldRule::list("places")
                .from_source(&["places", "places_02"])
                .from_source(&["places", "places_02"]),
            FieldRule::sentiment("sentiments")
                .from_source(&["Sentiments", "Sentiments_02"])
                .from_source(&["Sentiments", "Sentiments_02"]),
            FieldRule::list("objects")
                .from_source(&[
                    "original_objects",
                    "objects",
                    "objects_02",
                    "objects_03",
                    "objects_04",
                    "objects_05",
                ])
                .from_source(&["objects", "objects_02", "objects_03", "objects_04", "objects_05"]),
        ])
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> + Clone {
        self.fields.iter().map(|f| f.target.as_str())
    }

    pub fn field(&self, target: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.target == target)
    }

    /// Problems worth a warning for `source_count` loaded enrichment tables
    pub fn check(&self, source_count: usize) -> Vec<String> {
        let mut problems = Vec::new();

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.target == field.target) {
                problems.push(format!(
                    "field '{}' appears more than once; later rules see earlier results",
                    field.target
                ));
            }
            if field.sources.len() > source_count {
                problems.push(format!(
                    "field '{}' names columns for {} sources but only {} loaded",
                    field.target,
                    field.sources.len(),
                    source_count
                ));
            }
        }

        problems
    }
}

impl Default for MergePlan {
    fn default() -> Self {
        Self::poems()
    }
}
