mod cli;
mod console;
mod dispense;
mod error_fmt;
mod logging;
mod rt;

use std::process::exit;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use dispenser_core::DispenseStatus;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

/// Exit code for an attempt that completed with a Failure verdict.
const EXIT_DISPENSE_FAILED: i32 = 6;

fn main() {
    // Pretty panics/reports; ignore a second install.
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    match real_main(cli) {
        Ok(code) => exit(code),
        Err(e) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit(exit_code_for_error(&e));
        }
    }
}

fn real_main(cli: Cli) -> eyre::Result<i32> {
    let cfg = dispenser_config::load_file(&cli.config)?;
    // Dropped at the end of this function so the file writer flushes before exit.
    let _log_guard = logging::init_logging(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::Relaxed);
        })?;
    }

    match cli.cmd {
        Commands::Run { timed, rt } => {
            rt::setup_rt_once(rt.rt, rt.rt_prio);
            let status = dispense::run_station(&cfg, timed, shutdown)?;
            tracing::info!(%status, "station stopped");
            Ok(0)
        }
        Commands::Attempt { rt } => {
            rt::setup_rt_once(rt.rt, rt.rt_prio);
            let (status, report) = dispense::run_attempt(&cfg)?;
            if cli.json {
                println!("{}", dispense::report_json(status, report.as_ref()));
            } else {
                println!("Status: {}", status.code());
            }
            Ok(if status == DispenseStatus::Failure {
                EXIT_DISPENSE_FAILED
            } else {
                0
            })
        }
        Commands::SelfCheck => {
            let level = dispense::self_check(&cfg)?;
            if cli.json {
                println!("{}", serde_json::json!({ "ok": true, "alarm_level": level }));
            } else {
                println!("self-check ok: relay released, alarm level {level}");
            }
            Ok(0)
        }
    }
}
