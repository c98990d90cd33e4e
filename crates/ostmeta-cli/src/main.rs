//! ostmeta CLI - export remote application repository metadata as JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use ostmeta_export::{export, ExportConfig, ExportReport, RefFilter};
use serde::Serialize;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Completed, but some refs were skipped with diagnostics.
const EXIT_PARTIAL: i32 = 2;
/// Completed, but no ref produced a usable record.
const EXIT_EMPTY: i32 = 3;

/// Export every published ref's packaging metadata (and embedded build
/// manifest, when present) from a remote application repository as one
/// JSON array.
#[derive(Parser, Debug)]
#[command(name = "ostmeta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository root URL
    url: Url,

    /// Process only these full ref names (repeatable)
    #[arg(short, long = "ref", value_name = "REF")]
    refs: Vec<String>,

    /// Keep only refs for this architecture (e.g. x86_64)
    #[arg(short, long)]
    arch: Option<String>,

    /// Drop .Locale/.Sources/.Debug build byproducts
    #[arg(long)]
    no_built_extensions: bool,

    /// Do not look for embedded build manifests
    #[arg(long)]
    no_manifests: bool,

    /// Maximum refs in flight at once
    #[arg(short, long, default_value_t = ostmeta_export::DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Write the JSON array here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ostmeta={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config = ExportConfig::new(cli.url);
    config.filter = RefFilter {
        refs: (!cli.refs.is_empty()).then_some(cli.refs),
        arch: cli.arch,
        skip_built_extensions: cli.no_built_extensions,
    };
    config.concurrency = cli.concurrency;
    config.fetch_manifests = !cli.no_manifests;

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping");
            let _ = shutdown_tx.send(());
        }
    });

    let report = export(config, shutdown_rx).await?;
    write_records(&report, cli.output.as_deref())?;

    Ok(if report.is_empty() {
        EXIT_EMPTY
    } else if report.is_complete() {
        0
    } else {
        EXIT_PARTIAL
    })
}

fn write_records(report: &ExportReport, output: Option<&Path>) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    report
        .records
        .serialize(&mut serializer)
        .context("serializing records")?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
