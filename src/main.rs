use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use poem_merge::{format_head, format_info, format_sample, run, ConfigOverrides, MergeConfig};

/// Merge enrichment sheets into the primary poem sheet
#[derive(Parser, Debug)]
#[command(name = "poem-merge")]
#[command(about = "Merge people, places, sentiments and objects from enrichment sheets into one table")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "POEM_MERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Primary sheet (overrides config)
    #[arg(long, value_name = "FILE")]
    primary: Option<PathBuf>,

    /// Enrichment sheet; repeat in merge order (replaces configured sources)
    #[arg(long = "source", value_name = "FILE")]
    sources: Vec<PathBuf>,

    /// Merged CSV output
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a JSON run report
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Rows to print in the sample after merging
    #[arg(long)]
    sample: Option<usize>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MergeConfig::load(path)?,
        None => MergeConfig::default(),
    };
    config.apply(ConfigOverrides {
        primary: args.primary,
        sources: args.sources,
        output: args.output,
        report: args.report,
        sample_rows: args.sample,
    });

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    config.validate()?;
    info!("poem-merge v{}", poem_merge::VERSION);

    let (merged, report) = run(&config)?;

    println!("\n{}", format_head(&merged, 5));
    println!("{}", format_info(&merged));

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Merge complete! Output saved to '{}'", config.output.display());
    println!("✓ Processed {} rows", report.rows_processed);
    for warning in &report.warnings {
        println!("⚠️  {}", warning);
    }

    if config.sample_rows > 0 {
        println!("\nSample of merged data:");
        print!(
            "{}",
            format_sample(&merged, config.sample_rows, config.plan.targets())
        );
    }

    Ok(())
}
