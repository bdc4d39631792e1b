//! gcpconv: Metashape marker exports to ground control point files.
//!
//! gcpconv reads the marker XML exported by Agisoft Metashape and writes a
//! tab-separated GCP text file: a PROJ.4 projection header followed by one
//! row per marker observation (world X/Y/Z, pixel x/y, image name).
//!
//! # Modules
//!
//! - [`ir`]: In-memory model of the export plus the XML reader and GCP writer
//! - [`projection`]: EPSG code to PROJ.4 header resolution with fallback
//! - [`conversion`]: The end-to-end pipeline and its report
//! - [`error`]: Error types for gcpconv operations

pub mod conversion;
pub mod error;
pub mod ir;
pub mod projection;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use conversion::{convert, convert_with, ConvertOptions};
pub use error::GcpError;

use projection::{LayeredDatabase, TableDatabase};

/// The gcpconv CLI application.
#[derive(Parser)]
#[command(name = "gcpconv")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a marker XML export into a GCP text file.
    Convert(ConvertArgs),
    /// Show the projection header an EPSG code resolves to.
    Projection(ProjectionArgs),
}

/// Options shared by every subcommand that resolves a projection.
#[derive(clap::Args)]
struct CrsArgs {
    /// EPSG code of the marker coordinates (default: 28992, RD New).
    #[arg(long)]
    epsg: Option<String>,

    /// CSV table of extra `code,proj4` definitions, consulted first.
    #[arg(long, env = "GCPCONV_CRS_TABLE")]
    crs_table: Option<PathBuf>,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Marker XML exported from Metashape.
    input: PathBuf,

    /// Output file (default: input with `.xml` replaced by `_converted.txt`).
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    crs: CrsArgs,

    /// Report format ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,
}

/// Arguments for the projection subcommand.
#[derive(clap::Args)]
struct ProjectionArgs {
    #[command(flatten)]
    crs: CrsArgs,
}

/// Run the gcpconv CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), GcpError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Projection(args)) => run_projection(args),
        None => {
            println!("gcpconv {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Convert Metashape marker exports into ground control point files.");
            println!();
            println!("Run 'gcpconv --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), GcpError> {
    // Reject a bad report style before touching the filesystem.
    if !matches!(args.report.as_str(), "text" | "json") {
        return Err(GcpError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            args.report
        )));
    }

    let database = load_database(&args.crs)?;
    let options = ConvertOptions {
        output: args.output,
        epsg: parse_epsg_arg(args.crs.epsg.as_deref()),
        database: &database,
    };

    let report = convert_with(&args.input, &options)?;

    if args.report == "json" {
        let json = serde_json::to_string_pretty(&report).map_err(|e| GcpError::Io(e.into()))?;
        println!("{json}");
    } else {
        print!("{report}");
    }

    Ok(())
}

/// Execute the projection subcommand.
fn run_projection(args: ProjectionArgs) -> Result<(), GcpError> {
    let database = load_database(&args.crs)?;
    let projection = projection::resolve(&database, parse_epsg_arg(args.crs.epsg.as_deref()));

    println!("EPSG:{}", projection.identifier);
    println!("{}", projection.definition);

    Ok(())
}

fn load_database(args: &CrsArgs) -> Result<LayeredDatabase, GcpError> {
    let table = args
        .crs_table
        .as_deref()
        .map(TableDatabase::from_path)
        .transpose()?;
    Ok(LayeredDatabase::new(table))
}

/// Parse the `--epsg` value. A non-integer value is not fatal: it is logged
/// and the default projection is used instead.
fn parse_epsg_arg(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(code) => Some(code),
        Err(_) => {
            log::warn!("invalid EPSG code '{raw}', using default projection");
            None
        }
    }
}
