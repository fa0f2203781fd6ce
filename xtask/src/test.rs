use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::cargo::{test_summary, OnFailure, Step};

pub fn run(unit_only: bool, integration_only: bool, logs: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();

    let total_start = Instant::now();

    let run_unit = !integration_only;
    let run_integration = !unit_only;

    // `-p msm261 --features tracing` so the driver's log macros reach the
    // subscriber the integration tests install.
    let integration_args: &[&str] = if logs {
        &["test", "-p", "msm261", "--features", "tracing", "--tests"]
    } else {
        &["test", "-p", "msm261", "-p", "platform", "--tests"]
    };

    let steps = [
        (
            run_unit,
            Step {
                title: "Unit tests",
                args: &["test", "--lib", "--workspace"],
                on_failure: OnFailure::Abort,
            },
        ),
        (
            run_integration,
            Step {
                title: "Integration tests",
                args: integration_args,
                on_failure: OnFailure::Abort,
            },
        ),
        (
            true,
            Step {
                title: "Doc tests",
                args: &["test", "--doc", "--workspace"],
                on_failure: OnFailure::Warn,
            },
        ),
    ];

    for (enabled, step) in &steps {
        if !enabled {
            continue;
        }
        if let Some(output) = step.run()? {
            println!("    {}", test_summary(&output).dimmed());
            println!();
        }
    }

    println!(
        "{}",
        format!(
            "✓ All tests completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
