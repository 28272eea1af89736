//! detci entry point.
//!
//! Exit contract: 0 on full success (including the nothing-to-validate
//! case); non-zero with a space-joined list of failed titles when
//! reconciliation finds mismatches, or when the change set cannot be
//! resolved / the backend cannot be constructed before processing starts.

use clap::Parser;

use detci_runner::changeset::resolve_changes;
use detci_runner::config::{Args, Config};
use detci_runner::pipeline::{self, DocStatus, RunReport};
use detci_runner::splunk::SplunkBackend;
use detci_runner::stimulus::InterpreterStimulus;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "detci_runner=info".into()),
        )
        .init();

    let config = Config::resolve(Args::parse())?;

    println!("Revision:   {}", config.revision);
    println!("Backend:    {}", config.splunk.base_url);
    println!("Repo root:  {}", config.repo_root.display());
    println!();

    let entries = resolve_changes(&config.repo_root, &config.revision)?;
    let backend = SplunkBackend::new(&config.splunk)?;
    let stimulus =
        InterpreterStimulus::new(config.interpreter.clone(), config.interpreter_args.clone());

    let report = pipeline::run(&entries, &backend, &stimulus, &config.options);
    print_summary(&report);

    if report.passed {
        println!("ALL DETECTIONS SUCCESSFULLY VALIDATED");
        Ok(())
    } else {
        eprintln!("ALERTS DID NOT PASS VALIDATION: {}", report.failure_summary());
        std::process::exit(1);
    }
}

fn print_summary(report: &RunReport) {
    let registered = report
        .outcomes
        .iter()
        .filter(|o| o.status == DocStatus::Registered)
        .count();
    let skipped = report.outcomes.len() - registered;

    println!();
    println!("─── REPORT ───");
    println!("Paths in change set:  {}", report.outcomes.len());
    println!("Alerts registered:    {}", registered);
    println!("Paths skipped:        {}", skipped);
    if report.validation_skipped {
        println!("Validation:           skipped (nothing registered)");
    } else {
        println!(
            "Validation:           {}/{} fired",
            report.expected.len() - report.failed.len(),
            report.expected.len()
        );
    }
    for failed in &report.failed {
        println!("  ✗ {} never fired", failed);
    }
    println!();
}
