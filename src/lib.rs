// src/lib.rs

//! Run named tasks in dependency order.
//!
//! The core is [`Runner`]: register tasks with [`Runner::add`], then call one
//! of [`Runner::run`], [`Runner::run_sync`], [`Runner::run_some`] or
//! [`Runner::run_some_sync`]. The `deptask` binary wraps it around a TOML
//! pipeline of shell commands.

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::dag::TaskStatus;
use crate::errors::RunnerError;
use crate::types::ExecutionMode;

pub use crate::engine::{Runner, TaskName};
pub use crate::errors::TaskFailure;
pub use crate::exec::{RunHooks, ShellCommand, TaskContext, Work};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - runner construction and validation
/// - Ctrl-C handling (cancels the run's context)
/// - the sequential or concurrent run
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    let mut runner = cfg.build_runner()?;
    let extra_skips: Vec<&str> = args.skip.iter().map(String::as_str).collect();
    runner.skip(&extra_skips);

    if let Err(err) = runner.validate() {
        report_validation_error(&runner, &err);
        return Err(err.into());
    }

    let mode = args.mode_override().unwrap_or(cfg.config.mode);
    let names: Vec<&str> = args.tasks.iter().map(String::as_str).collect();

    if args.dry_run {
        print_dry_run(&mut runner, &cfg, mode, &names)?;
        return Ok(());
    }

    let ctx = TaskContext::new();
    {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            warn!("Ctrl+C received; cancelling run");
            ctx.cancel();
        });
    }

    info!(%mode, requested = ?names, "starting pipeline");
    let result = match mode {
        ExecutionMode::Sequential => runner.run_some_sync(&ctx, &names).await,
        ExecutionMode::Concurrent => runner.run_some(&ctx, &names).await,
    };

    log_summary(&runner, &selected_tasks(&runner, &names));

    match result {
        Ok(()) => {
            info!("pipeline finished");
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "pipeline failed");
            Err(err.into())
        }
    }
}

fn report_validation_error(runner: &Runner, err: &RunnerError) {
    error!(error = %err, "pipeline graph is invalid");
    if matches!(err, RunnerError::Cyclic) {
        for cycle in runner.cyclic_tasks() {
            error!(tasks = ?cycle, "tasks forming a cycle");
        }
    }
}

/// Tasks a run over `names` touches, for reporting.
fn selected_tasks(runner: &Runner, names: &[&str]) -> BTreeSet<TaskName> {
    let mut selected: BTreeSet<TaskName> = runner.list_deps(names).into_iter().collect();
    selected.extend(
        names
            .iter()
            .filter(|name| runner.status(name).is_ok())
            .map(|name| name.to_string()),
    );
    selected
}

fn log_summary(runner: &Runner, selected: &BTreeSet<TaskName>) {
    for name in selected.iter() {
        match runner.status(name) {
            Ok(TaskStatus::Succeeded) => info!(task = %name, "succeeded"),
            Ok(TaskStatus::Skipped) => info!(task = %name, "skipped"),
            Ok(TaskStatus::Failed(err)) => error!(task = %name, error = %err, "failed"),
            Ok(TaskStatus::Pending) => warn!(task = %name, "not run"),
            Err(err) => debug!(task = %name, error = %err, "no status"),
        }
    }
}

/// Print the execution plan: layers in the order they would run.
fn print_dry_run(
    runner: &mut Runner,
    cfg: &ConfigFile,
    mode: ExecutionMode,
    names: &[&str],
) -> Result<()> {
    let layers = runner.layers()?;
    let selected = selected_tasks(runner, names);

    println!("deptask dry-run");
    println!("  mode = {mode}");
    if !names.is_empty() {
        println!("  requested = {:?}", names);
    }
    println!();

    let mut step = 0;
    for layer in layers.iter().rev() {
        let members: Vec<&TaskName> = layer.iter().filter(|name| selected.contains(*name)).collect();
        if members.is_empty() {
            continue;
        }

        step += 1;
        println!("layer {step}:");
        for name in members {
            println!("  - {name}");
            if let Some(task) = cfg.task.get(name) {
                println!("      cmd: {}", task.cmd);
                if !task.after.is_empty() {
                    println!("      after: {:?}", task.after);
                }
            }
            if runner.skipped(name).unwrap_or(false) {
                println!("      skipped: true");
            }
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
