//! Command-line interface definitions

use std::path::PathBuf;

use clap::Parser;

/// flashmon - serial flash console simulator
///
/// Runs the flash console protocol against an in-memory emulated chip,
/// with stdin/stdout standing in for the serial line. Commands: `id`,
/// `cap`, `dump`, `wipe`, or a dump-format line to program 16 bytes.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Chip profile (RON file) selecting geometry and identification
    #[arg(long)]
    pub chip: Option<PathBuf>,

    /// Emulated capacity in bytes (overridden by --chip)
    #[arg(long, default_value_t = 16 * 1024 * 1024)]
    pub capacity: u32,

    /// Emulated page size in bytes (overridden by --chip)
    #[arg(long, default_value_t = 256)]
    pub page_size: u32,

    /// Preload the chip from a binary image (truncated to capacity)
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Pass terminal line feeds through untranslated instead of mapping
    /// them to the protocol's carriage-return terminator
    #[arg(long)]
    pub raw_newlines: bool,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
