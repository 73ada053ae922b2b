//! `clap`-derived argument structs, one per binary.

use std::path::PathBuf;

use clap::Parser;

/// Reads a data file and emits its `.zsync` control file.
#[derive(Parser, Debug)]
#[command(name = "zsyncmake", version, about = "Generate a .zsync control file for a data file")]
pub struct GeneratorArgs {
    /// Block size in bytes; must be a power of two. Picked automatically
    /// from the input's length when omitted.
    #[arg(short = 'b', long = "blocksize")]
    pub blocksize: Option<u32>,

    /// Control-file output path. Defaults to `<input>.zsync`.
    #[arg(short = 'o', long = "outfile")]
    pub outfile: Option<PathBuf>,

    /// Suggested output filename recorded in the control file.
    #[arg(short = 'f', long = "filename")]
    pub filename: Option<String>,

    /// Mirror URL for the data file; repeatable.
    #[arg(short = 'u', long = "url")]
    pub urls: Vec<String>,

    /// Increase logging verbosity; repeatable.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Input data file. Reads standard input when omitted.
    pub input: Option<PathBuf>,
}

/// Reconstructs a target file from a control file plus local seeds and
/// mirror URLs.
#[derive(Parser, Debug)]
#[command(name = "zsync", version, about = "Reconstruct a file described by a .zsync control file")]
pub struct ClientArgs {
    /// Output path for the reconstructed file. Defaults to the control
    /// file's `Filename:` header.
    #[arg(short = 'o', long = "outfile")]
    pub outfile: Option<PathBuf>,

    /// Local file to scan for reusable blocks before downloading; repeatable.
    #[arg(short = 'i', long = "input")]
    pub seeds: Vec<PathBuf>,

    /// Referer URL used to resolve relative `URL:` headers when the control
    /// file itself was read from a local path.
    #[arg(short = 'u', long = "url")]
    pub referer: Option<String>,

    /// Suppress informational output; warnings and errors only.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Increase logging verbosity; repeatable.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Control-file path or URL.
    pub control: String,
}

/// Prints the byte ranges a client would still need to download, given a
/// control file and a candidate seed, without performing any network I/O.
#[derive(Parser, Debug)]
#[command(name = "zsyncrange", version, about = "Plan the byte ranges needed to reconstruct a target from a seed")]
pub struct PlannerArgs {
    /// Control-file path.
    pub control: PathBuf,

    /// Local seed file to scan for reusable blocks.
    pub seed: PathBuf,
}
