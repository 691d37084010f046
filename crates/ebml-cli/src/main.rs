/// EBML command-line tool for inspecting, validating and building EBML streams.
///
/// # Command overview
///
/// ```text
/// ebml <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print the element tree of an EBML stream, with decoded values
///   validate   Check an EBML stream for structural correctness
///   encode     Create an EBML stream from a JSON manifest
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Raise log verbosity (-v debug, -vv trace)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                   |
/// |------|-------------------------------------------|
/// | 0    | Success                                   |
/// | 1    | Error (I/O failure, malformed stream, …)  |
///
/// All error details and log records are written to stderr so stdout can
/// be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};

mod cmd_encode;
mod cmd_inspect;
mod cmd_validate;
mod dictionary;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Command-line tool for EBML streams.
#[derive(Parser)]
#[command(name = "ebml", version, about = "EBML stream inspection and encoding")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise log verbosity. `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print the element tree of an EBML stream.
    Inspect(InspectArgs),
    /// Check an EBML stream for structural correctness.
    Validate(ValidateArgs),
    /// Create an EBML stream from a JSON manifest.
    Encode(EncodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `ebml inspect`.
///
/// Streams the file through the decoder and prints one line per element.
/// Elements are named and typed through a dictionary; the EBML header
/// elements are always known.
///
/// ```text
/// ┌────────────────┬───────────────────────────────────────────────────────┐
/// │ Flag           │ Effect                                                │
/// ├────────────────┼───────────────────────────────────────────────────────┤
/// │ --dictionary F │ Load element names and types from a JSON dictionary   │
/// │ --chunk-size N │ Feed the decoder N bytes at a time (default 4096)     │
/// │ --expand [N]   │ Print up to N values of binary(<scalar>) arrays (4)   │
/// └────────────────┴───────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the EBML stream.
    pub file: PathBuf,

    /// JSON dictionary describing element names and value types.
    #[arg(short, long)]
    pub dictionary: Option<PathBuf>,

    /// Number of bytes handed to the decoder per call.
    #[arg(long, default_value_t = 4096)]
    pub chunk_size: usize,

    /// Expand `binary(<scalar>)` leaves into at most this many values.
    ///
    /// Without this flag such leaves are reported as plain binary.
    #[arg(long, num_args = 0..=1, default_missing_value = "4")]
    pub expand: Option<usize>,
}

/// Arguments for `ebml validate`.
///
/// Decodes the whole stream and reports element count and maximum depth.
/// Exits with code 1 on any structural problem, including truncation.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the EBML stream.
    pub file: PathBuf,

    /// JSON dictionary; elements typed `master` are descended into.
    #[arg(short, long)]
    pub dictionary: Option<PathBuf>,
}

/// Arguments for `ebml encode`.
///
/// Reads a JSON manifest describing an element tree and writes the
/// encoded stream. See `cmd_encode` for the manifest format.
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// Path to the JSON manifest.
    pub input: PathBuf,

    /// Output file path.
    #[arg(short, long)]
    pub output: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Encode(args) => cmd_encode::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
