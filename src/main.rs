//! flashmon - serial flash console simulator
//!
//! Runs the firmware console protocol (`flashmon-core`) on the host,
//! against an in-memory emulated chip (`flashmon-dummy`), with
//! stdin/stdout standing in for the serial line. The same core runs
//! unchanged on a target where a real flash driver and UART implement the
//! two seams.
//!
//! ```text
//! $ flashmon --capacity 512
//! id
//! ef4018
//! ef17
//! d16a99cc0f4523b7
//! dump
//! 00000000: ffff ffff ffff ffff ffff ffff ffff ffff  ................
//! ...
//! ```

mod cli;
mod error;
mod port;
mod profile;

use std::thread;
use std::time::Duration;

use clap::Parser;
use flashmon_core::Console;
use flashmon_dummy::{DummyConfig, DummyFlash};

use crate::cli::Cli;
use crate::error::AppError;
use crate::port::StdioPort;
use crate::profile::ChipProfile;

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let config = match &cli.chip {
        Some(path) => {
            let profile = ChipProfile::load(path)?;
            log::info!("loaded chip profile {} from {}", profile.name, path.display());
            DummyConfig::from(&profile)
        }
        None => DummyConfig {
            capacity: cli.capacity,
            page_size: cli.page_size,
            ..DummyConfig::default()
        },
    };

    log::info!(
        "emulating {} byte chip, {} byte pages; commands: id, cap, dump, wipe",
        config.capacity,
        config.page_size
    );

    let flash = match &cli.image {
        Some(path) => {
            let image = std::fs::read(path)?;
            log::info!("preloading {} bytes from {}", image.len(), path.display());
            DummyFlash::with_data(config, &image)?
        }
        None => DummyFlash::new(config)?,
    };

    let port = StdioPort::open(!cli.raw_newlines);
    let mut console = Console::new(flash, port);

    loop {
        console.tick()?;
        if console.port().at_eof() && !console.dump_active() {
            break;
        }
        if !console.dump_active() {
            // idle: don't spin on an empty input queue
            thread::sleep(Duration::from_millis(1));
        }
    }

    if console.faulted() {
        log::warn!("session ended with the device fault latched");
    }

    Ok(())
}
