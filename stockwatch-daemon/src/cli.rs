//! CLI argument definitions for stockwatch-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Stockwatch inventory scan daemon.
///
/// Scans every configured sensor on a bounded worker pool, merges the
/// results into one duplicate-free inventory, reports its size on a fixed
/// schedule, and shuts down within configured bounds.
#[derive(Parser, Debug)]
#[command(name = "stockwatch-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to stockwatch.toml configuration file.
    ///
    /// Built-in defaults are used when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and `STOCKWATCH_*` variables.
    /// A set `RUST_LOG` still wins.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and exit without scanning.
    #[arg(long)]
    pub validate: bool,
}
