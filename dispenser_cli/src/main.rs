#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `dispenser` binary: scheduled runs, manual dispensing and self checks
//! over the simulated or real hardware stack.

mod app;
mod cli;
mod error_fmt;
mod logging;

use clap::Parser;
use dispenser_core::DispenseOutcome;

use crate::cli::{Cli, Commands, JSON_MODE};

fn main() {
    let code = match real_main() {
        Ok(code) => code,
        Err(err) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", error_fmt::format_error_json(&err));
            } else {
                eprintln!("{}", error_fmt::humanize(&err));
            }
            error_fmt::exit_code_for_error(&err)
        }
    };
    std::process::exit(code);
}

fn real_main() -> eyre::Result<i32> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let cfg = app::load_config(&cli.config)?;
    logging::init(cli.log_level.as_deref(), cli.json, &cfg.logging)?;

    match cli.cmd {
        Commands::Run => {
            app::run(&cfg, cli.schedule.as_deref())?;
            Ok(0)
        }
        Commands::Dispense { slot } => {
            let outcome = app::dispense_once(&cfg, slot)?;
            report_outcome(outcome, cli.json);
            Ok(exit_code_for_outcome(outcome))
        }
        Commands::SelfCheck => {
            app::self_check(&cfg)?;
            Ok(0)
        }
    }
}

fn outcome_name(outcome: DispenseOutcome) -> &'static str {
    match outcome {
        DispenseOutcome::Taken => "taken",
        DispenseOutcome::NotTaken => "not_taken",
        DispenseOutcome::Failed => "failed",
    }
}

fn report_outcome(outcome: DispenseOutcome, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({ "outcome": outcome_name(outcome) })
        );
    } else {
        println!("outcome: {}", outcome_name(outcome));
    }
}

/// 0 = taken; 4 = dispensed but not taken; 5 = dispense failed.
fn exit_code_for_outcome(outcome: DispenseOutcome) -> i32 {
    match outcome {
        DispenseOutcome::Taken => 0,
        DispenseOutcome::NotTaken => 4,
        DispenseOutcome::Failed => 5,
    }
}
