//! Development automation tasks for the `Flagwise` workspace.
//!
//! Run with: `cargo xtask <command>`
//!
//! This is a CLI tool for developers, so `println!` and `eprintln!` are
//! intentionally used for user-facing output rather than structured logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::{Command, ExitCode};

use anyhow::anyhow;

mod features;

/// Task name and help line, in `ci` order after `ci` itself.
const TASKS: &[(&str, &str)] = &[
    ("ci", "Run all CI checks (fmt, clippy, check-crates, test, bench)"),
    ("fmt", "Check Rust code formatting"),
    ("clippy", "Run Clippy lints"),
    ("check-crates", "Verify every crate compiles in isolation"),
    ("test", "Run all tests"),
    ("bench", "Compile the criterion benchmarks without running them"),
];

type Task = fn() -> anyhow::Result<()>;

fn task(name: &str) -> Option<Task> {
    let run: Task = match name {
        "ci" => run_ci,
        "fmt" => run_fmt,
        "clippy" => run_clippy,
        "check-crates" => features::check_isolated_crates,
        "test" => run_test,
        "bench" => run_bench,
        _ => return None,
    };
    Some(run)
}

fn main() -> ExitCode {
    let name = env::args().nth(1);

    let result = match name.as_deref() {
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(name) => match task(name) {
            Some(run) => run(),
            None => {
                eprintln!("Unknown task: {name}");
                eprintln!();
                print_help();
                Err(anyhow!("Unknown task"))
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Task failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("Flagwise Development Tasks");
    println!();
    println!("USAGE:");
    println!("    cargo xtask <TASK>");
    println!();
    println!("TASKS:");
    for (name, about) in TASKS {
        println!("    {name:<14}{about}");
    }
    println!("    {:<14}Show this help message", "help");
}

/// Run all CI checks in sequence
fn run_ci() -> anyhow::Result<()> {
    println!("==> Running CI checks...\n");

    let steps = &TASKS[1..];
    for (index, (name, about)) in steps.iter().enumerate() {
        println!("\n==> Step {}/{}: {about}...", index + 1, steps.len());
        let run = task(name).ok_or_else(|| anyhow!("no runner for task '{name}'"))?;
        run()?;
    }

    println!("\n✓ All CI checks passed!");
    Ok(())
}

/// Check Rust code formatting
fn run_fmt() -> anyhow::Result<()> {
    let status = Command::new("cargo").args(["fmt", "--all", "--", "--check"]).status()?;

    if !status.success() {
        anyhow::bail!("Format check failed. Run 'cargo fmt --all' to fix.");
    }

    Ok(())
}

/// Run Clippy lints
fn run_clippy() -> anyhow::Result<()> {
    let status =
        Command::new("cargo").args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]).status()?;

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("Clippy run failed. See output above."))
    }
}

/// Compile benchmarks so they do not rot between runs
fn run_bench() -> anyhow::Result<()> {
    let status =
        Command::new("cargo").args(["bench", "-p", "flagwise-core", "--no-run"]).status()?;

    if !status.success() {
        anyhow::bail!("Benchmarks failed to compile");
    }

    Ok(())
}

/// Run all workspace tests
fn run_test() -> anyhow::Result<()> {
    let status = Command::new("cargo").args(["test", "--workspace"]).status()?;

    if !status.success() {
        anyhow::bail!("Tests failed");
    }

    Ok(())
}
