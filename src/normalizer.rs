// 🧹 Value Normalizer - Any cell shape → ordered list of items
// Handles empty cells, native lists, list-as-text and plain strings.

use crate::cell::CellValue;
use crate::literal::{parse_literal, Literal, ParseOutcome};

/// Placeholder annotators write when a field has nothing to report
pub const PLACEHOLDER: &str = "---";

/// Convert one raw cell into its items
///
/// Precedence:
/// 1. missing, `""` or `"---"` → no items
/// 2. native sequence → returned as-is
/// 3. text → parsed as a literal; unparseable text becomes one trimmed item
/// 4. numbers and booleans → no items
///
/// Unparseable text is kept as an opaque item rather than rejected, so a
/// malformed list written as free text survives the merge unchanged.
pub fn normalize(raw: &CellValue) -> Vec<Literal> {
    match raw {
        CellValue::Empty => Vec::new(),
        CellValue::Text(text) if text.is_empty() || text == PLACEHOLDER => Vec::new(),
        CellValue::Sequence(items) => items.clone(),
        CellValue::Text(text) => match parse_literal(text) {
            ParseOutcome::Sequence(items) => items,
            ParseOutcome::Scalar(value) => vec![value],
            ParseOutcome::Failed => opaque_item(text),
        },
        CellValue::Number(_) | CellValue::Bool(_) => Vec::new(),
    }
}

fn opaque_item(text: &str) -> Vec<Literal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![Literal::str(trimmed)]
    }
}
