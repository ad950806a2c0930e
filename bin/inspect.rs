// 🔎 Inspect - Print the shape of one spreadsheet before merging it
// Usage: poem-inspect Sheet1.xlsx --rows 10

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

use poem_merge::{format_head, format_info, get_reader, TableFormat};

#[derive(Parser, Debug)]
#[command(name = "poem-inspect")]
#[command(about = "Show columns, fill counts and the first rows of a spreadsheet")]
#[command(version)]
struct Args {
    /// CSV, TSV or workbook file
    file: PathBuf,

    /// Rows to print
    #[arg(short, long, default_value = "5")]
    rows: usize,

    /// Worksheet name (workbooks only)
    #[arg(long)]
    sheet: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let reader = get_reader(TableFormat::detect(&args.file)?, args.sheet.as_deref());
    debug!("Reading {} as {}", args.file.display(), reader.format().name());

    let table = reader
        .read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    println!("{}", format_info(&table));
    print!("{}", format_head(&table, args.rows));

    Ok(())
}
