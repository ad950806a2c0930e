// Poem Merge - Core Library
// Exposes all modules for use in the CLI binaries and tests

pub mod literal;     // Python-style literals found in annotation cells
pub mod cell;        // Raw cell values
pub mod normalizer;  // Cell → ordered items
pub mod merge;       // List and sentiment field mergers
pub mod error;       // Table boundary errors
pub mod table;       // Tables, readers, CSV writer
pub mod plan;        // Field → enrichment column mapping
pub mod report;      // Run report
pub mod summary;     // Console views of a table
pub mod config;      // TOML configuration + CLI overrides
pub mod pipeline;    // Row-by-row merge engine

// Re-export commonly used types
pub use literal::{parse_literal, Literal, ParseOutcome};
pub use cell::CellValue;
pub use normalizer::{normalize, PLACEHOLDER};
pub use merge::{merge_list, merge_sentiments, MergeKind, NEUTRAL_SENTIMENT};
pub use error::{TableError, TableResult};
pub use table::{
    get_reader, read_table, write_csv,
    CsvReader, RowView, Table, TableFormat, TableReader, WorkbookReader,
};
pub use plan::{FieldRule, MergePlan};
pub use report::{FieldStats, MergeReport, SourceCoverage};
pub use summary::{format_head, format_info, format_sample};
pub use config::{ConfigOverrides, MergeConfig, TableInput};
pub use pipeline::{run, MergeEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
