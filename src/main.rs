use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use library_fees::logging::init_tracing;
use library_fees::{
    add_date_range, date_range, format_fee, parse_count, reformat_dates, FeeReportGenerator,
    ReportSchema, SchemaKind,
};

#[derive(Parser)]
#[command(name = "library-fees", version, about = "Late-fee reports for library book returns")]
struct Cli {
    /// Log every skipped on-time return
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Total late fees per patron and write them as CSV
    Report {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Built-in input layout
        #[arg(long, default_value = "book-returns")]
        schema: SchemaKind,

        /// JSON schema file; takes precedence over --schema
        #[arg(long)]
        schema_file: Option<PathBuf>,

        /// Print the written report
        #[arg(long)]
        print: bool,
    },
    /// Reformat YYYY-MM-DD dates as "DD Mon YYYY"
    Reformat {
        #[arg(required = true)]
        dates: Vec<String>,
    },
    /// List consecutive days starting at a date
    Range {
        #[arg(long)]
        start: String,

        #[arg(long, allow_hyphen_values = true)]
        count: String,
    },
    /// Pair values with consecutive days starting at a date
    Pair {
        #[arg(long)]
        start: String,

        #[arg(allow_hyphen_values = true)]
        values: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Report {
            input,
            output,
            schema,
            schema_file,
            print,
        } => run_report(&input, &output, schema, schema_file.as_deref(), print)?,
        Command::Reformat { dates } => {
            for date in reformat_dates(&dates)? {
                println!("{}", date);
            }
        }
        Command::Range { start, count } => {
            let n = parse_count(&count)?;
            for day in date_range(&start, n)? {
                println!("{}", day.format("%Y-%m-%d"));
            }
        }
        Command::Pair { start, values } => {
            for (day, value) in add_date_range(values, &start)? {
                println!("{},{}", day.format("%Y-%m-%d"), value);
            }
        }
    }

    Ok(())
}

fn run_report(
    input: &Path,
    output: &Path,
    kind: SchemaKind,
    schema_file: Option<&Path>,
    print: bool,
) -> Result<()> {
    let (schema, label) = match schema_file {
        Some(path) => (ReportSchema::from_file(path)?, path.display().to_string()),
        None => (kind.schema(), kind.name().to_string()),
    };

    let generator = FeeReportGenerator::new(schema)?;
    let report = generator.generate_file(input, output).map_err(|err| {
        let stage = err.stage();
        anyhow::Error::new(err).context(format!(
            "Late-fee report failed during {} ({} -> {})",
            stage.name(),
            input.display(),
            output.display()
        ))
    })?;

    println!(
        "✓ {}: {} records read, {} late, {} patrons owe {}",
        label,
        report.records_read(),
        report.late_records(),
        report.len(),
        format_fee(report.grand_total())
    );
    println!("✓ Report written to {}", output.display());

    if print {
        let contents = fs::read_to_string(output)
            .with_context(|| format!("Failed to read back {}", output.display()))?;
        print!("{}", contents);
    }

    Ok(())
}
