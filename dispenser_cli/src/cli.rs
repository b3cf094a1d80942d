//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "dispenser", version, about = "Relay dispenser station")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/dispenser.toml")]
    pub config: PathBuf,

    /// Log and report as JSON instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); defaults to
    /// [logging].level, then info. RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve single-byte commands from stdin (A=attempt, S=status, T=toggle timed mode)
    Run {
        /// Start in timed mode (one attempt per cycle)
        #[arg(long, action = ArgAction::SetTrue)]
        timed: bool,
        #[command(flatten)]
        rt: RtArgs,
    },
    /// Run one dispense attempt and print the status (exit 6 on a failed dispense)
    Attempt {
        #[command(flatten)]
        rt: RtArgs,
    },
    /// Open the relay and alarm line, release the relay, read the alarm level once
    SelfCheck,
}

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct RtArgs {
    /// Enable real-time mode (SCHED_FIFO + mlockall) to tighten sampling windows
    #[arg(
        long,
        action = ArgAction::SetTrue,
        long_help = "Enable real-time mode on Linux: SCHED_FIFO priority and mlockall(MCL_CURRENT|MCL_FUTURE). Reduces scheduling jitter in the 130 ms sampling windows. Needs CAP_SYS_NICE/CAP_IPC_LOCK or root; failures are logged and ignored."
    )]
    pub rt: bool,
    /// SCHED_FIFO priority when --rt is enabled (clamped to the platform range)
    #[arg(long, value_name = "PRIO")]
    pub rt_prio: Option<i32>,
}
