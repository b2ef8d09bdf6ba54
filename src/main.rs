use clap::{Parser, Subcommand};
use entity_portation::cli::{self, ExportOptions, ImportOptions};
use entity_portation::logging;
use entity_portation::types::Portation;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "portation")]
#[command(about = "Export record lists to spreadsheets and import them back")]
#[command(long_about = "Portation - annotation-driven spreadsheet import/export

Records are plain YAML or JSON lists. Their classes, and how each field maps
to a column (label, position, visibility, value type), are declared in a
schema file.

COMMANDS:
  export   - Records to CSV, XLSX, HTML or XML
  import   - CSV, XLS, XLSX or ODS to records
  columns  - Show the columns a class maps to

EXAMPLES:
  portation export schema.yaml people.yaml people.csv
  portation export schema.yaml people.yaml report --format xlsx
  portation import schema.yaml people.csv --class Person -o people.json
  portation columns schema.yaml Person --mode import")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Export records to a spreadsheet file.

Each record names its class with a `_class` field; --class gives the class of
records without one. All records must share a common root class.

When the output name has no extension, the one of --format is appended.
Without --format, the format is guessed from the output extension.")]
    /// Export records to a spreadsheet
    Export {
        /// Schema file declaring the record classes
        schema: PathBuf,

        /// YAML or JSON list of records
        records: PathBuf,

        /// Output file
        output: PathBuf,

        /// Output format (csv, xlsx, html, xml)
        #[arg(short, long)]
        format: Option<String>,

        /// Class of records without a `_class` field
        #[arg(short, long)]
        class: Option<String>,

        /// Sheet title, overriding the class metadata
        #[arg(long)]
        sheet_title: Option<String>,

        /// Text for cells without a value
        #[arg(long)]
        fallback: Option<String>,

        /// CSV delimiter
        #[arg(short, long)]
        delimiter: Option<String>,

        /// YAML translation catalog (`source: target`)
        #[arg(short, long)]
        translations: Option<PathBuf>,

        /// Show detected columns
        #[arg(short, long)]
        verbose: bool,
    },

    /// Import a spreadsheet into records
    Import {
        /// Schema file declaring the record classes
        schema: PathBuf,

        /// Spreadsheet to read (csv, xls, xlsx, ods)
        input: PathBuf,

        /// Class of the imported records
        #[arg(short, long)]
        class: String,

        /// Output file (.yaml or .json); records go to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// The first row holds data, not column labels
        #[arg(long)]
        no_header: bool,

        /// CSV delimiter
        #[arg(short, long)]
        delimiter: Option<String>,

        /// Show mapped columns
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the columns a class maps to
    Columns {
        /// Schema file declaring the record classes
        schema: PathBuf,

        /// Class name
        class: String,

        /// Direction: export, import or both
        #[arg(short, long, default_value = "export")]
        mode: Portation,

        /// Only list annotated members (defaults to the class metadata)
        #[arg(long)]
        annotate: Option<bool>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            schema,
            records,
            output,
            format,
            class,
            sheet_title,
            fallback,
            delimiter,
            translations,
            verbose,
        } => {
            logging::init(verbose);
            cli::export(ExportOptions {
                schema,
                records,
                output,
                format,
                class,
                sheet_title,
                fallback,
                delimiter,
                translations,
                verbose,
            })?;
        }

        Commands::Import {
            schema,
            input,
            class,
            output,
            no_header,
            delimiter,
            verbose,
        } => {
            logging::init(verbose);
            cli::import(ImportOptions {
                schema,
                input,
                class,
                output,
                no_header,
                delimiter,
                verbose,
            })?;
        }

        Commands::Columns {
            schema,
            class,
            mode,
            annotate,
        } => {
            logging::init(false);
            cli::columns(schema, class, mode, annotate)?;
        }
    }

    Ok(())
}
