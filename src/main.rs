//! Timebox - focus cycle tracker
//!
//! CLI entry point. Every invocation rehydrates the stored state, applies one
//! command and exits; `watch` keeps ticking until the active cycle ends.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use timebox::cli::display::CycleDisplay;
use timebox::cli::{render_history, render_status};
use timebox::config::TimeboxConfig;
use timebox::logging::init_tracing;
use timebox::store::{CyclesController, FileStore};
use timebox::store::KeyValueStore;
use timebox::ticker::{watch, TickOutcome};
use timebox::{Clock, CycleId};

/// Focus cycle tracker
///
/// Starts timed work cycles, finishes or interrupts them, and keeps the
/// history across restarts.
#[derive(Parser, Debug)]
#[command(name = "timebox", version, about)]
struct Cli {
    /// Path to the timebox.toml configuration file
    #[arg(long, default_value = "timebox.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a new cycle and make it the active one
    Start {
        /// What the cycle is spent on
        #[arg(long)]
        task: String,

        /// Cycle length in minutes (defaults to timer.default_minutes)
        #[arg(long)]
        minutes: Option<u32>,

        /// Keep counting down after starting
        #[arg(long)]
        watch: bool,

        /// Interrupt the running cycle instead of refusing to start
        #[arg(long)]
        force: bool,
    },
    /// Mark the active cycle as finished
    Finish,
    /// Interrupt the active cycle
    Interrupt,
    /// Show the active cycle and its countdown
    Status,
    /// List every cycle, newest first
    History,
    /// Count down the active cycle until it finishes
    Watch,
}

type Controller = CyclesController<FileStore>;

/// Start a cycle, refusing while another one is still running.
///
/// A running cycle whose time ran out is finished first. With `force` a
/// running cycle is interrupted instead of blocking the start.
fn start_cycle<S: KeyValueStore, C: Clock>(
    controller: &mut CyclesController<S, C>,
    task: &str,
    minutes: u32,
    force: bool,
) -> Result<CycleId> {
    timebox::tick(controller);

    if let Some(running) = controller.active_cycle().map(|c| c.task.clone()) {
        if !force {
            bail!(
                "'{running}' is still running; run `timebox finish` or `timebox interrupt` first, or pass --force"
            );
        }
        controller.interrupt_current_cycle();
        eprintln!("{} {running}", "Interrupted".red().bold());
    }

    controller
        .create_new_cycle(task, minutes)
        .context("Cannot start cycle")
}

/// Tick the active cycle until it ends or Ctrl-C is pressed.
async fn run_watch(controller: &mut Controller, config: &TimeboxConfig) -> Result<()> {
    let Some(task) = controller.active_cycle().map(|c| c.task.clone()) else {
        println!("{}", "No cycle is running".dimmed());
        return Ok(());
    };

    let display = CycleDisplay::new(&task);
    display.print_header();

    let period = config.timer.tick_period();
    tokio::select! {
        _ = watch(controller, period, |outcome| display.render_tick(outcome)) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            eprintln!();
            eprintln!("Stopped watching; the cycle keeps running.");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TimeboxConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from '{}'", cli.config.display()))?;
    init_tracing(&config.logging.level);

    let store = FileStore::new(&config.storage.dir).with_context(|| {
        format!(
            "Failed to open store at '{}'",
            config.storage.dir.display()
        )
    })?;
    let mut controller = CyclesController::open(store, &config.storage.namespace);

    match cli.command {
        Commands::Start {
            task,
            minutes,
            watch,
            force,
        } => {
            let minutes = minutes.unwrap_or(config.timer.default_minutes);
            start_cycle(&mut controller, &task, minutes, force)?;
            println!("{} {} ({minutes}m)", "Started".green().bold(), task.trim());
            if watch {
                run_watch(&mut controller, &config).await?;
            }
        }
        Commands::Finish => match controller.active_cycle().map(|c| c.task.clone()) {
            Some(task) => {
                controller.mark_active_cycle_as_finished();
                println!("{} {task}", "Finished".green().bold());
            }
            None => println!("{}", "No cycle is running".dimmed()),
        },
        Commands::Interrupt => match controller.active_cycle().map(|c| c.task.clone()) {
            Some(task) => {
                controller.interrupt_current_cycle();
                println!("{} {task}", "Interrupted".red().bold());
            }
            None => println!("{}", "No cycle is running".dimmed()),
        },
        Commands::Status => {
            // A single tick brings the countdown up to date, and closes the
            // cycle if it ran out while nobody was watching.
            match timebox::tick(&mut controller) {
                TickOutcome::Finished(_) => {
                    println!("{}", "The last cycle has finished".green());
                }
                TickOutcome::Running(countdown) => {
                    render_status(controller.active_cycle(), Some(&countdown));
                }
                TickOutcome::Idle => render_status(None, None),
            }
        }
        Commands::History => {
            render_history(controller.cycles(), controller.clock().now());
        }
        Commands::Watch => run_watch(&mut controller, &config).await?,
    }

    Ok(())
}
