//! Command-line front end for the tensor showcase.
//!
//! Runs catalogue demos, benchmarks them, samples backend memory while demos
//! run, and exports the session.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod chart;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tensor_showcase_core::{
    Demo, DemoOrchestrator, DemoOutcome, HostBackend, PerformanceMonitor, SessionState,
    ShowcaseConfig, ShowcaseError,
};
use tensor_showcase_demos::{catalogue, demo, CustomTensor, DemoKind};
use tensor_showcase_export::{ExportFormat, ExportSerializer, FileSink};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::chart::{format_reading, TerminalChart};

/// Tensor showcase CLI.
#[derive(Parser, Debug)]
#[command(name = "showcase")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./showcase.{toml,json,yaml} if present).
    #[arg(short, long, global = true, env = "SHOWCASE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run demos and print their narratives.
    Run {
        /// Demos to run, by name. Runs the whole catalogue when empty.
        demos: Vec<String>,

        /// Run the whole catalogue.
        #[arg(long)]
        all: bool,

        /// Literal for the custom-tensor demo, e.g. "[[1, 2], [3, 4]]".
        #[arg(long)]
        tensor: Option<String>,

        /// Export the session afterwards: json, csv, txt or html.
        #[arg(short, long)]
        export: Option<String>,

        /// Leave performance metrics out of the export.
        #[arg(long)]
        without_metrics: bool,
    },

    /// Benchmark one demo.
    Benchmark {
        /// Demo name.
        demo: String,

        /// Iterations (defaults to the configured count).
        #[arg(short = 'n', long)]
        iterations: Option<usize>,
    },

    /// List the demo catalogue.
    List,

    /// Run demos while sampling backend memory.
    Monitor {
        /// Number of readings to take.
        #[arg(long, default_value_t = 5)]
        ticks: usize,
    },

    /// Show version and effective configuration.
    Status,
}

/// Run the CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(Cli::parse())
}

/// Run the CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(cli.verbose, cli.log_format);

    let config = ShowcaseConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Run {
            demos,
            all,
            tensor,
            export,
            without_metrics,
        } => {
            // Validate before running anything.
            let format = export
                .as_deref()
                .map(str::parse::<ExportFormat>)
                .transpose()?;
            let demos = resolve_demos(&demos, all, tensor.as_deref())?;

            let mut orchestrator = orchestrator(&config).with_sink(Box::new(TerminalChart));
            let mut failures = 0;
            for demo in &demos {
                println!("{}", format!("=== {} ===", demo.name()).as_str().cyan().bold());
                let outcome = orchestrator.run(demo.as_ref());
                if let Some(entry) = orchestrator.session().results.last() {
                    println!("{}", entry.content);
                }
                print_outcome(&outcome);
                if !outcome.is_success() {
                    failures += 1;
                }
                println!();
            }

            let summary = orchestrator.session().metrics.summary();
            println!(
                "{} demos, {} failed, average {:.3} ms",
                demos.len(),
                failures,
                summary.average_execution_time_ms
            );

            if let Some(format) = format {
                let payload = ExportSerializer::new(config.export.title.clone()).export_session(
                    format,
                    orchestrator.session(),
                    !without_metrics,
                )?;
                let path = FileSink::new(&config.export.output_dir).write(&payload)?;
                println!("{} {}", "Exported".green(), path.display());
            }
            Ok(())
        }
        Commands::Benchmark { demo: name, iterations } => {
            let kind: DemoKind = name.parse()?;
            let iterations = iterations.unwrap_or(config.benchmark.iterations);

            let mut orchestrator = orchestrator(&config);
            let report = orchestrator.benchmark(demo(kind).as_ref(), iterations)?;

            println!("{}", format!("=== Benchmark: {kind} ===").as_str().cyan().bold());
            println!("Iterations:   {}", report.iterations);
            println!("Average time: {:.3} ms", report.average_time_ms);
            println!("Min time:     {:.3} ms", report.min_time_ms);
            println!("Max time:     {:.3} ms", report.max_time_ms);
            println!("Memory delta: {} bytes", report.memory_delta_bytes);
            Ok(())
        }
        Commands::List => {
            for kind in DemoKind::ALL {
                let demo = demo(kind);
                println!("{:<20} {}", kind.slug().bold(), demo.description());
            }
            Ok(())
        }
        Commands::Monitor { ticks } => monitor(&config, ticks),
        Commands::Status => {
            println!("Tensor Showcase");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("\nConfiguration:");
            println!("  metrics.capacity           = {}", config.metrics.capacity);
            println!("  monitor.interval_ms        = {}", config.monitor.interval_ms);
            println!("  monitor.memory_budget_bytes = {}", config.monitor.memory_budget_bytes);
            println!("  export.output_dir          = {}", config.export.output_dir.display());
            println!("  export.title               = {}", config.export.title);
            println!("  benchmark.iterations       = {}", config.benchmark.iterations);
            println!("\nDemos: {}", DemoKind::ALL.len());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,tensor_showcase_core={level},tensor_showcase_export={level},\
             tensor_showcase_demos={level},tensor_showcase_cli={level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // A subscriber may already be installed when embedded.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

fn orchestrator(config: &ShowcaseConfig) -> DemoOrchestrator {
    DemoOrchestrator::new(
        HostBackend::new(),
        SessionState::with_metric_capacity(config.metrics.capacity),
    )
}

fn print_outcome(outcome: &DemoOutcome) {
    match outcome {
        DemoOutcome::Succeeded {
            elapsed_ms,
            memory_delta_bytes,
            released,
        } => println!(
            "{} {elapsed_ms:.3} ms, memory {memory_delta_bytes:+} bytes, released {released} tensors",
            "✓".green()
        ),
        DemoOutcome::Failed { released, .. } => {
            println!("{} failed, released {released} tensors", "✗".red())
        }
    }
}

/// Turn demo names into demos. Empty `names` or `all` selects the whole
/// catalogue; `tensor` replaces the custom-tensor literal and is rejected
/// when that demo is not selected.
pub fn resolve_demos(
    names: &[String],
    all: bool,
    tensor: Option<&str>,
) -> anyhow::Result<Vec<Box<dyn Demo>>> {
    let kinds: Vec<DemoKind> = if all || names.is_empty() {
        DemoKind::ALL.to_vec()
    } else {
        names
            .iter()
            .map(|name| name.parse())
            .collect::<Result<_, _>>()?
    };

    if tensor.is_some() && !kinds.contains(&DemoKind::CustomTensor) {
        return Err(ShowcaseError::invalid_argument(format!(
            "--tensor only applies to the {} demo, which is not selected",
            DemoKind::CustomTensor
        ))
        .into());
    }

    Ok(kinds
        .into_iter()
        .map(|kind| match (kind, tensor) {
            (DemoKind::CustomTensor, Some(literal)) => {
                Box::new(CustomTensor::new(literal)) as Box<dyn Demo>
            }
            (kind, _) => demo(kind),
        })
        .collect())
}

fn monitor(config: &ShowcaseConfig, ticks: usize) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&runtime, async {
        let orchestrator = Rc::new(RefCell::new(orchestrator(config)));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let mut monitor = PerformanceMonitor::new(config.monitor.interval());
        let source = Rc::clone(&orchestrator);
        let budget = config.monitor.memory_budget_bytes;
        monitor.start(
            move || source.borrow().performance_reading(budget),
            move |reading| {
                let _ = tx.send(reading);
            },
        );
        info!(ticks, "monitoring");

        let demos = catalogue();
        for tick in 0..ticks {
            let Some(reading) = rx.recv().await else {
                break;
            };
            println!("{}", format_reading(&reading));

            let demo = &demos[tick % demos.len()];
            let outcome = orchestrator.borrow_mut().run(demo.as_ref());
            let status = if outcome.is_success() {
                "ok".green()
            } else {
                "failed".red()
            };
            println!("  ran {} ({status})", demo.name());
        }

        monitor.stop();
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_export() {
        let cli = Cli::try_parse_from([
            "showcase",
            "run",
            "reshape",
            "math-ops",
            "--export",
            "html",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { demos, export, all, .. } => {
                assert_eq!(demos, vec!["reshape", "math-ops"]);
                assert_eq!(export.as_deref(), Some("html"));
                assert!(!all);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_benchmark_iterations() {
        let cli =
            Cli::try_parse_from(["showcase", "benchmark", "matrix-ops", "-n", "25", "--log-format", "json"])
                .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Benchmark { demo, iterations } => {
                assert_eq!(demo, "matrix-ops");
                assert_eq!(iterations, Some(25));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_resolve_demos() {
        assert_eq!(resolve_demos(&[], false, None).unwrap().len(), DemoKind::ALL.len());

        let names = vec!["custom-tensor".to_string(), "reductions".to_string()];
        let demos = resolve_demos(&names, false, Some("[7, 8]")).unwrap();
        assert_eq!(demos.len(), 2);
        assert_eq!(demos[0].name(), "Custom Tensor");
        assert_eq!(demos[1].name(), "Reduction Operations");

        assert!(resolve_demos(&["nope".to_string()], false, None).is_err());
    }

    #[test]
    fn test_tensor_literal_requires_custom_tensor() {
        let err = resolve_demos(&["reshape".to_string()], false, Some("[1, 2]"))
            .err()
            .unwrap();
        let err = err.downcast::<ShowcaseError>().unwrap();
        assert!(matches!(err, ShowcaseError::InvalidArgument(_)));
        assert!(err.to_string().contains("custom-tensor"));

        let demos = resolve_demos(&[], true, Some("[1, 2]")).unwrap();
        assert_eq!(demos.len(), DemoKind::ALL.len());
        assert!(demos.iter().any(|d| d.name() == "Custom Tensor"));
    }
}
