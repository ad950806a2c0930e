// 🧱 Cell Values - What a spreadsheet cell can hold
// Readers produce these; the normalizer and mergers consume them.

use crate::literal::{list_repr, python_float_repr, Literal};
use std::fmt;

/// CellValue - Tagged variant for one raw cell
///
/// `Number` and `Bool` come from typed workbook cells. `Sequence` holds
/// merged list values before they are written back out.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Sequence(Vec<Literal>),
}

impl CellValue {
    /// Text cell, with the empty string mapped to `Empty`
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(text.to_string())
        }
    }

    /// Missing value in the pandas sense: no content or a NaN number
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(x) => x.is_nan(),
            _ => false,
        }
    }

    /// Missing, or text with nothing in it
    pub fn is_blank(&self) -> bool {
        self.is_missing() || matches!(self, CellValue::Text(t) if t.is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Short type label for summaries
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Text(_) => "text",
            CellValue::Number(_) => "number",
            CellValue::Bool(_) => "bool",
            CellValue::Sequence(_) => "list",
        }
    }

    /// Text written to a CSV cell
    ///
    /// Lists are written in their literal form so the file reads back
    /// into the same list.
    pub fn to_cell_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(x) if x.is_nan() => String::new(),
            CellValue::Number(x) if x.fract() == 0.0 && x.abs() < 1e15 => format!("{}", *x as i64),
            CellValue::Number(x) => format!("{}", x),
            other => other.to_string(),
        }
    }
}

/// Display follows Python `str()` on the equivalent pandas value
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(t) => f.write_str(t),
            CellValue::Number(x) => f.write_str(&python_float_repr(*x)),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::Sequence(items) => f.write_str(&list_repr(items)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<Vec<Literal>> for CellValue {
    fn from(items: Vec<Literal>) -> Self {
        CellValue::Sequence(items)
    }
}
