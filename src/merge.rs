// 🔗 Field Merger - Combine one field across the primary sheet and its enrichment sheets
// Two strategies: entity lists (people, places, objects) and sentiment labels

use crate::cell::CellValue;
use crate::literal::Literal;
use crate::normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sentiment label that means "no sentiment"
pub const NEUTRAL_SENTIMENT: &str = "neutral";

/// Separator between merged sentiment labels
pub const SENTIMENT_SEPARATOR: &str = ", ";

// ============================================================================
// MERGE KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeKind {
    /// Ordered, deduplicated list of entities
    List,

    /// Comma-separated labels with `neutral` dropped
    Sentiment,
}

impl MergeKind {
    /// Merge with this strategy and wrap the result as a cell
    pub fn merge(&self, primary: &CellValue, secondaries: &[CellValue]) -> CellValue {
        match self {
            MergeKind::List => CellValue::Sequence(merge_list(primary, secondaries)),
            MergeKind::Sentiment => CellValue::Text(merge_sentiments(primary, secondaries)),
        }
    }
}

// ============================================================================
// LIST FIELDS
// ============================================================================

/// Merge list-valued cells, primary first, keeping the first item per identity
///
/// Identity is the trimmed display form, so `'Alice'` in one sheet and
/// `Alice ` in another count once. Items with a blank identity are dropped.
pub fn merge_list(primary: &CellValue, secondaries: &[CellValue]) -> Vec<Literal> {
    let mut result = Vec::new();
    let mut seen = HashSet::new();

    for raw in std::iter::once(primary).chain(secondaries) {
        for item in normalize(raw) {
            let identity = item.identity();
            if !identity.is_empty() && seen.insert(identity) {
                result.push(item);
            }
        }
    }

    result
}

// ============================================================================
// SENTIMENT FIELD
// ============================================================================

/// Merge sentiment cells into one `", "`-joined string
///
/// Cells are split on commas rather than normalized; `neutral` is dropped
/// both as a whole cell and as a single label.
pub fn merge_sentiments(primary: &CellValue, secondaries: &[CellValue]) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut seen = HashSet::new();

    for raw in std::iter::once(primary).chain(secondaries) {
        if skips_sentiment(raw) {
            continue;
        }

        for piece in raw.to_string().split(',') {
            let label = piece.trim();
            if label.is_empty() || label == NEUTRAL_SENTIMENT {
                continue;
            }
            if seen.insert(label.to_string()) {
                result.push(label.to_string());
            }
        }
    }

    result.join(SENTIMENT_SEPARATOR)
}

fn skips_sentiment(raw: &CellValue) -> bool {
    raw.is_blank() || raw.as_text() == Some(NEUTRAL_SENTIMENT)
}

// ============================================================================
// TESTS
// ============================================================================
