use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output};
use std::time::Instant;

/// What to do when a step fails.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Abort,
    Warn,
}

/// One `cargo` invocation with a progress line before and a verdict after.
pub struct Step<'a> {
    pub title: &'a str,
    pub args: &'a [&'a str],
    pub on_failure: OnFailure,
}

impl Step<'_> {
    /// Run the step. `Ok(Some(output))` on success, `Ok(None)` on a tolerated
    /// failure.
    pub fn run(&self) -> Result<Option<Output>> {
        println!("{}", format!("  {}...", self.title).cyan());
        let start = Instant::now();

        let output = Command::new("cargo")
            .args(self.args)
            .output()
            .with_context(|| format!("Failed to spawn cargo {}", self.args.join(" ")))?;

        if output.status.success() {
            println!(
                "{}",
                format!(
                    "  ✓ {} passed in {:.2}s",
                    self.title,
                    start.elapsed().as_secs_f64()
                )
                .green()
            );
            println!();
            return Ok(Some(output));
        }

        match self.on_failure {
            OnFailure::Abort => {
                eprintln!("{}", format!("  ✗ {} failed", self.title).red().bold());
                eprintln!();
                print_indented(&output);
                anyhow::bail!("{} failed", self.title);
            }
            OnFailure::Warn => {
                eprintln!("{}", format!("  ⚠ {} reported problems", self.title).yellow().bold());
                print_indented(&output);
                println!();
                Ok(None)
            }
        }
    }
}

fn print_indented(output: &Output) {
    for stream in [&output.stdout, &output.stderr] {
        for line in String::from_utf8_lossy(stream).lines() {
            eprintln!("  {line}");
        }
    }
}

/// "5 passed; 0 failed; ..." from libtest output, summed over every binary.
pub fn test_summary(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut passed = 0usize;
    let mut binaries = 0usize;
    for line in stdout.lines() {
        let Some(rest) = line.split("test result:").nth(1) else {
            continue;
        };
        binaries = binaries.saturating_add(1);
        let count = rest
            .split(';')
            .find_map(|part| part.trim().trim_start_matches("ok.").trim().strip_suffix(" passed"))
            .and_then(|n| n.trim().parse::<usize>().ok())
            .unwrap_or(0);
        passed = passed.saturating_add(count);
    }
    if binaries == 0 {
        "(summary not available)".to_string()
    } else {
        format!("({passed} passed across {binaries} binaries)")
    }
}
