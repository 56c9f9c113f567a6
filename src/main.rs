mod cli;
mod config;
mod instance;
mod module;
mod poll;
mod test;
mod ui;
mod widgets;
mod write;

use crate::cli::ArgParser;
use crate::config::Settings;
use crate::instance::Role;
use crate::module::Module;
use crate::poll::Tick;
use crate::ui::App;

use clap::Parser;
use itertools::Itertools;
use log::Logger;
use register::{canonical_address, Bank};
use tokio::runtime::Runtime;
use util::Expect;

fn print_log(log: &Logger) {
    for msg in log.drain() {
        if msg.is_err() {
            eprintln!("{}", msg);
        } else {
            println!("{}", msg);
        }
    }
}

fn print_tick(module: &Module, tick: &Tick) {
    for bank in Bank::ALL {
        let Some(values) = tick.values(bank) else {
            continue;
        };
        let line = module
            .config()
            .window(bank)
            .offsets()
            .zip(values.iter())
            .map(|(offset, value)| format!("{}={}", canonical_address(bank, offset), value))
            .join(" ");
        println!("{}: {}", bank, line);
    }
}

/// Start the session, print every refresh and stop after `ticks` cycles (or never)
fn run_headless(
    runtime: &Runtime,
    mut module: Module,
    log: Logger,
    ticks: Option<usize>,
) -> anyhow::Result<()> {
    let started = runtime.block_on(module.start());
    print_log(&log);
    started?;

    let mut done = 0;
    loop {
        if ticks.is_some_and(|t| done >= t) {
            break;
        }
        let armed = module.poll().is_armed();
        let tick = runtime.block_on(async {
            if armed {
                module.poll().wait().await;
            }
            module.refresh().await
        });
        let Some(tick) = tick else {
            break;
        };
        print_tick(&module, &tick);
        print_log(&log);
        done += 1;

        // Without an interval there is exactly one refresh
        if !armed {
            break;
        }
    }

    runtime.block_on(module.stop());
    print_log(&log);
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let args = ArgParser::parse();

    let settings = match args.config.as_deref() {
        Some(path) => Settings::read(path)?,
        None => Settings::default(),
    };

    let log = Logger::default();
    let role = if args.server { Role::Server } else { Role::Client };
    let interval = match args.interval {
        Some(v) => Some(v),
        None => settings.interval()?,
    };

    let mut module = Module::new(role, args.net.clone(), interval, log.clone());
    module.load(&settings)?;
    for bank in args.watch.iter() {
        module.set_watch(*bank, true);
    }

    // Initialize tokio runtime for modbus server and client
    let runtime = Runtime::new().panic(|e| format!("Failed to create runtime. [{}]", e));

    if args.headless {
        run_headless(&runtime, module, log, args.ticks)
    } else {
        App::new(module, log, settings.ui.history_length).run(&runtime)
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
