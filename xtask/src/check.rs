use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::cargo::{OnFailure, Step};

const TARGET: &str = "thumbv7em-none-eabihf";

pub fn run(host_only: bool) -> Result<()> {
    println!();
    println!("{}", "🔍 Checking driver builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    let target_steps = [
        Step {
            title: "Checking msm261 for the target (defmt)",
            args: &["check", "-p", "msm261", "--target", TARGET, "--features", "defmt"],
            on_failure: OnFailure::Abort,
        },
        Step {
            title: "Checking platform crate (no_std)",
            args: &["check", "-p", "platform", "--target", TARGET, "--no-default-features"],
            on_failure: OnFailure::Abort,
        },
    ];
    let host_steps = [
        Step {
            title: "Checking msm261 on the host (tracing)",
            args: &["check", "-p", "msm261", "--features", "tracing"],
            on_failure: OnFailure::Abort,
        },
        Step {
            title: "Running clippy lints",
            args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            on_failure: OnFailure::Warn,
        },
        Step {
            title: "Checking code formatting",
            args: &["fmt", "--all", "--check"],
            on_failure: OnFailure::Warn,
        },
    ];

    if host_only {
        println!("{}", format!("  Skipping {TARGET} checks").dimmed());
        println!();
    } else {
        for step in &target_steps {
            step.run()?;
        }
    }
    for step in &host_steps {
        step.run()?;
    }

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
