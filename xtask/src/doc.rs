use anyhow::Result;
use colored::Colorize;

use crate::cargo::{OnFailure, Step};

/// Driver-facing crates. `msm261/std` pulls the simulation into the docs.
const DOC_ARGS: &[&str] = &[
    "doc",
    "-p",
    "msm261",
    "-p",
    "platform",
    "--no-deps",
    "--features",
    "msm261/std",
];

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building documentation...".cyan().bold());
    println!();

    let mut args = DOC_ARGS.to_vec();
    if open {
        args.push("--open");
    }

    Step {
        title: "Building msm261 and platform docs",
        args: &args,
        on_failure: OnFailure::Abort,
    }
    .run()?;

    if !open {
        println!(
            "   {}",
            "target/doc/msm261/index.html, or `cargo run -p xtask -- doc --open`".dimmed()
        );
        println!();
    }

    Ok(())
}
