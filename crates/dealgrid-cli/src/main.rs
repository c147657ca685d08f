// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use dealgrid_app::{GridState, MemoryViewSlot, ViewSlot};
use dealgrid_db::{Store, seed_deals};
use dealgrid_tui::UiOptions;
use runtime::HostRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `dealgrid --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let db_path = config.db_path()?;
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let log_path = config.log_path()?;
    logging::init(&log_path, config.log_level())?;
    info!(
        config = %options.config_path.display(),
        log = %log_path.display(),
        memory = options.memory,
        "starting dealgrid"
    );

    let ui = UiOptions {
        page_rows: config.page_rows(),
    };

    if options.memory {
        if options.check_only {
            return Ok(());
        }
        return launch(MemoryViewSlot::default(), ui);
    }

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or DEALGRID_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    if options.reset_view {
        let removed = store.reset_view_state()?;
        info!(removed, "reset view state on request");
    }
    if options.check_only {
        return Ok(());
    }

    launch(store, ui)
}

fn launch<S: ViewSlot>(slot: S, ui: UiOptions) -> Result<()> {
    let mut grid = GridState::new(seed_deals(), slot);
    let mut runtime = HostRuntime::default();
    let result = dealgrid_tui::run_app(&mut grid, &mut runtime, ui);
    info!(handled = runtime.handled(), "dealgrid exited");
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    memory: bool,
    reset_view: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        memory: false,
        reset_view: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--memory" => {
                options.memory = true;
            }
            "--reset-view" => {
                options.reset_view = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.memory && options.reset_view {
        return Err(anyhow::anyhow!(
            "--reset-view clears the persisted view and has no effect with --memory; pass only one"
        ));
    }

    Ok(options)
}

fn print_help() {
    println!("dealgrid");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --memory                 Keep view state in memory for this session only");
    println!("  --reset-view             Clear the saved view state before starting");
    println!("  --check                  Validate config + DB, then exit");
    println!("  --help                   Show this help");
}
