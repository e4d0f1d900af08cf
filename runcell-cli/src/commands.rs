//! Command handlers for the runcell CLI

use anyhow::{bail, Context, Result};
use runcell_engine::{ExecutionPipeline, ExecutionRequest, Report, Severity};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Run one snippet and print the report (or raw JSON outcome).
///
/// Returns the process exit code: 0 for a successful run, 1 for any other
/// terminal outcome.
pub async fn execute_run(
    language: String,
    file: Option<String>,
    code: Option<String>,
    timeout: Option<u64>,
    json: bool,
) -> Result<i32> {
    let source_text = read_source(file, code)?;
    debug!(source_len = source_text.len(), "dispatching run");

    let mut request = ExecutionRequest::new(language, source_text);
    if let Some(secs) = timeout {
        request = request.with_run_timeout(Duration::from_secs(secs));
    }

    let pipeline = ExecutionPipeline::new();
    let outcome = pipeline.execute(request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        let report = Report::from_outcome(&outcome);
        match report.severity {
            Severity::Info => print_body(&report.body, false),
            Severity::Error => print_body(&report.body, true),
        }
    }

    Ok(if outcome.success() { 0 } else { 1 })
}

/// List the registered language profiles.
pub fn execute_languages() {
    let pipeline = ExecutionPipeline::new();
    let mut profiles: Vec<_> = pipeline.registry().iter().collect();
    profiles.sort_by(|a, b| a.id.cmp(&b.id));

    println!(
        "{:<12} {:<14} {:<12} {:>12} {:>16}",
        "ID", "NAME", "KIND", "RUN TIMEOUT", "COMPILE TIMEOUT"
    );
    for profile in profiles {
        let kind = if profile.is_compiled() {
            "compiled"
        } else {
            "interpreted"
        };
        let compile_timeout = if profile.is_compiled() {
            format!("{}s", profile.compile_timeout.as_secs())
        } else {
            "-".to_string()
        };
        println!(
            "{:<12} {:<14} {:<12} {:>11}s {:>16}",
            profile.id,
            profile.display_name,
            kind,
            profile.run_timeout.as_secs(),
            compile_timeout,
        );
    }
}

fn read_source(file: Option<String>, code: Option<String>) -> Result<String> {
    if let Some(code) = code {
        return Ok(code);
    }

    match file.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading source from stdin")?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading source file '{}'", path)),
        None => bail!("no source given: pass a file path, '-' for stdin, or --code"),
    }
}

fn print_body(body: &str, to_stderr: bool) {
    if body.is_empty() {
        return;
    }
    let newline = if body.ends_with('\n') { "" } else { "\n" };
    if to_stderr {
        eprint!("{}{}", body, newline);
    } else {
        print!("{}{}", body, newline);
    }
}
