use std::io::{self, Write};

use anyhow::Context;
use colored::Colorize;
use odbstat_pack::{Garbage, PackManager};
use odbstat_store::{LooseObjectScanner, ObjectDirLocator, Report};
use serde_json::{Map, Value};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let objects_dir = ObjectDirLocator::from_env()?
        .locate()
        .context("cannot locate an object directory")?;
    debug!(path = %objects_dir.display(), verbose = cli.verbose, "counting objects");

    let mut packs = PackManager::new(&objects_dir);
    let mut reporter = |garbage: &Garbage| print_garbage(garbage);
    let report = LooseObjectScanner::new(&objects_dir)
        .scan(cli.verbose, &mut packs, &mut reporter)
        .with_context(|| format!("scan of {} failed", objects_dir.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Text => report.write_text(&mut out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &json_report(&report))?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn print_garbage(garbage: &Garbage) {
    eprintln!("{} {}", "error:".red().bold(), garbage);
}

/// Same labels and units as the text report.
fn json_report(report: &Report) -> Value {
    let fields: Map<String, Value> = report
        .fields()
        .into_iter()
        .map(|(label, value)| (label.to_string(), Value::from(value)))
        .collect();
    Value::Object(fields)
}
