use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flakehound::cli::{Cli, Command, OutputFormat};
use flakehound::config::AnalysisConfig;
use flakehound::engine::StabilityEngine;
use flakehound::history::{merge_histories, HistoryStore};
use flakehound::json_output::JsonReport;
use flakehound::model::{RunInput, TestResult};
use flakehound::stability::SuiteStats;
use flakehound::{retry, stability};

/// Initialize tracing subscriber for diagnostic output
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print per-test verdicts and the suite roll-up
fn print_text_report(results: &[TestResult], stats: &SuiteStats) {
    println!("=== Test Stability Report ===");
    println!();
    for test in results {
        let verdict = test
            .stability_score
            .as_ref()
            .map(stability::summary_line)
            .unwrap_or_else(|| "unscored".to_string());
        let trend = test
            .performance_trend
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "Stable".to_string());
        println!("{} [{}]", test.title, verdict);
        println!("    trend: {}, retries: {}", trend, retry::retry_summary(test));
    }
    println!();
    println!("─────────────────────────────────────────");
    println!(
        "total: {}  passed: {}  failed: {}  skipped: {}",
        stats.total, stats.passed, stats.failed, stats.skipped
    );
    println!(
        "flaky: {}  slow: {}  pass rate: {}%  avg stability: {:.0}",
        stats.flaky, stats.slow, stats.pass_rate, stats.average_stability
    );

    let problematic = stability::problematic_tests(results);
    if !problematic.is_empty() {
        println!();
        println!("⚠️  Needs attention ({}):", problematic.len());
        for test in problematic {
            println!("  - {}", test.test_id);
        }
    }
}

fn run_merge(sources: &[PathBuf], output: &Path, max_runs: usize) -> Result<()> {
    let merged = merge_histories(sources, output, max_runs)?;
    println!(
        "merged {} runs, {} tests, {} summaries into {}",
        merged.runs.len(),
        merged.tests.len(),
        merged.summaries.len(),
        output.display()
    );
    Ok(())
}

fn run_analyze(
    results: &Path,
    history: &Path,
    update_history: bool,
    adaptive: bool,
    format: OutputFormat,
    max_runs: usize,
) -> Result<()> {
    let raw = std::fs::read_to_string(results)
        .with_context(|| format!("failed to read run input {}", results.display()))?;
    let mut run: RunInput = serde_json::from_str(&raw)
        .with_context(|| format!("run input {} is not valid JSON", results.display()))?;

    let config = AnalysisConfig {
        adaptive_threshold: adaptive,
        max_history_runs: max_runs,
        ..AnalysisConfig::default()
    };
    config
        .validate()
        .map_err(|reason| anyhow::anyhow!("invalid configuration: {reason}"))?;

    let store = HistoryStore::load(history, max_runs);
    let mut engine = StabilityEngine::new(store, config);

    for test in &mut run.tests {
        engine.annotate(test);
    }

    let stats = if update_history {
        engine.complete_run(&run.run_id, run.timestamp, &run.tests)?
    } else {
        stability::suite_stats(&run.tests)
    };

    match format {
        OutputFormat::Text => print_text_report(&run.tests, &stats),
        OutputFormat::Json => {
            let report = JsonReport::new(run.timestamp, run.tests, stats);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Command::Merge {
            sources,
            output,
            max_runs,
        } => run_merge(&sources, &output, max_runs),
        Command::Analyze {
            results,
            history,
            update_history,
            adaptive,
            format,
            max_runs,
        } => run_analyze(
            &results,
            &history,
            update_history,
            adaptive,
            format,
            max_runs,
        ),
    }
}
