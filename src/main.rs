use clap::{Parser, Subcommand};
use sheetbind::cli;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetbind")]
#[command(about = "Template-driven spreadsheet import and export.")]
#[command(long_about = "Sheetbind - bind spreadsheet rows to records through column templates

A template is an ordered list of columns. Each column has a title, a record
field, a required flag, a maximum length and an optional value check. Rows
failing a check are dropped; a header that does not match the template aborts
the import with FILE_TITLE_ERROR.

COMMANDS:
  read      - Print the normalized rows of a workbook as JSON
  import    - Workbook to JSON records through a template
  export    - JSON records to Excel (.xlsx) through a template
  template  - Validate a template file and list its columns

EXAMPLES:
  sheetbind read apis.xlsx
  sheetbind import apis.xlsx --template api.yaml --report
  sheetbind export apis.json --template api.yaml -o apis.xlsx
  sheetbind template api.yaml")]
#[command(version)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Print the normalized rows of a workbook as JSON.

Row 0 is the header. Every row is as wide as the header row. Numbers lose a
trailing .0, date cells render as YYYY-MM-DD and formulas show their source.
Sheets with a header only produce no rows.")]
    /// Print normalized rows as JSON
    Read {
        /// Workbook file (.xlsx, .xls, .xlsb or .ods)
        file: PathBuf,

        /// Read every sheet with data, keyed by sheet name
        #[arg(long)]
        all_sheets: bool,
    },

    #[command(long_about = "Import the first sheet of a workbook through a template.

The header row must match the template titles position for position.
Each data row is checked column by column (required, then length, then the
column's value check); the first failure drops the row.

Records are printed as a JSON array, or written to --output.")]
    /// Import a workbook into JSON records
    Import {
        /// Workbook file (.xlsx, .xls, .xlsb or .ods)
        file: PathBuf,

        /// Template YAML file
        #[arg(short, long)]
        template: PathBuf,

        /// Bind only fields declared on the record itself
        #[arg(long)]
        declared_only: bool,

        /// List every dropped row on stderr
        #[arg(long)]
        report: bool,

        /// Write records to this JSON file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export JSON records to an Excel .xlsx file
    Export {
        /// JSON file holding an array of record objects
        input: PathBuf,

        /// Template YAML file
        #[arg(short, long)]
        template: PathBuf,

        /// Output Excel file path (.xlsx)
        #[arg(short, long)]
        output: PathBuf,

        /// Sheet name (defaults to the template's sheet)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Validate a template file and list its columns
    Template {
        /// Template YAML file
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sheetbind=debug" } else { "sheetbind=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Read { file, all_sheets } => cli::read(file, all_sheets)?,

        Commands::Import {
            file,
            template,
            declared_only,
            report,
            output,
        } => cli::import(file, template, declared_only, report, output)?,

        Commands::Export {
            input,
            template,
            output,
            sheet,
        } => cli::export(input, template, output, sheet)?,

        Commands::Template { file } => cli::template(file)?,
    }

    Ok(())
}
