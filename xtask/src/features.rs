use std::process::Command;

use anyhow::{Context, Result};

/// Crates checked one at a time, so a crate that only compiles thanks to
/// features enabled by a sibling is caught.
const CRATES: &[&str] = &["flagwise-domain", "flagwise-core", "flagwise-infra", "flagwise-app"];

/// Check that every workspace crate compiles on its own, with and without
/// dev-dependencies.
pub fn check_isolated_crates() -> Result<()> {
    println!("Checking {} crates in isolation...", CRATES.len());

    for (index, krate) in CRATES.iter().enumerate() {
        for all_targets in [false, true] {
            let label = if all_targets { format!("{krate} (all targets)") } else { (*krate).to_string() };
            println!("\n[{}/{}] cargo check -p {label}", index + 1, CRATES.len());

            let mut command = Command::new("cargo");
            command.arg("check").arg("-p").arg(krate);
            if all_targets {
                command.arg("--all-targets");
            }

            let status = command
                .status()
                .with_context(|| format!("Failed to run cargo check for '{label}'"))?;

            if !status.success() {
                anyhow::bail!("Crate '{label}' failed to compile in isolation");
            }
        }

        println!("✅ {krate} compiles in isolation");
    }

    println!("\n✅ All {} crates compile in isolation!", CRATES.len());

    Ok(())
}
