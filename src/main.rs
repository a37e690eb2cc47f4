use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use xls2json::cli::{self, RunArgs, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "xls2json")]
#[command(version)]
#[command(about = "Extract data from an Excel spreadsheet to a JSON file")]
#[command(long_about = "xls2json - Spreadsheet rows → JSON records

Reads one sheet of an xls/xlsx/xlsb/ods workbook. Row 1 is the header; every
following row becomes one JSON record shaped by a template.

MODES (pick exactly one):
  -t, --template FILE       JSON template: nested objects of format strings
                            using {label} or {label:spec} placeholders
  -m, --mapping-labels L..  One key per label, value taken from that column
  -c, --column COL          Distinct values of a single column

RUNTIME FIELDS:
  {_row_number}   1-based data row number
  {_now}          Run timestamp (ISO-8601, ms), e.g. {_now:%Y-%m-%d}

UNIQUE KEY:
  -u email   or   -u 3 (0-based column index)
  Rows sharing a key collapse to the LAST row, kept at the position where
  the key first appeared.

EXAMPLES:
  xls2json users.xlsx -t template.json -o users.json --pretty
  xls2json users.xlsx -s Export -m id email -u email
  xls2json users.xlsx -c country
  xls2json locked.xlsx -p secret -m id email")]
struct Cli {
    /// Excel spreadsheet path
    file: PathBuf,

    /// Password of an encrypted workbook
    #[arg(short, long)]
    password: Option<String>,

    /// Name of the sheet where the data are stored
    #[arg(short, long, default_value = "Sheet1", env = "XLS2JSON_SHEET")]
    sheet: String,

    /// Output file path (stdout when omitted)
    #[arg(short, long, env = "XLS2JSON_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the JSON with a 2 space indentation
    #[arg(short = 'P', long, env = "XLS2JSON_PRETTY")]
    pretty: bool,

    /// JSON template file
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Output labels, each mapped to the header column of the same name
    #[arg(short, long, num_args = 1..)]
    mapping_labels: Option<Vec<String>>,

    /// Extract the distinct values of one column (label or 0-based index)
    #[arg(short, long)]
    column: Option<String>,

    /// Column label or 0-based index used to deduplicate rows
    #[arg(short, long)]
    unique_key: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| format!("xls2json={level}").into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> anyhow::Result<()> {
    let file = cli.file.clone();
    let config = RunConfig::from_args(RunArgs {
        input: cli.file,
        sheet: Some(cli.sheet),
        password: cli.password,
        template: cli.template,
        mapping_labels: cli.mapping_labels,
        column: cli.column,
        unique_key: cli.unique_key,
        output: cli.output,
        pretty: cli.pretty,
    })?;

    cli::run(&config).with_context(|| format!("Failed to convert {}", file.display()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "❌ Error:".bold().red(), e);
            ExitCode::FAILURE
        }
    }
}
