mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use console::style;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::{fmt, EnvFilter};

use uptime_core::{
    attempt_channel, Delivery, HttpProber, JsonFileStore, ProbeAttempt, ProbeEngine,
    PushoverNotifier, RunReport, Runner,
};

/// HTTP uptime monitor. Probes endpoints once and reports up/down changes.
#[derive(Parser)]
#[command(name = "uptime-monitor", version, about)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, default_value = "settings.toml")]
    config: PathBuf,

    /// Status snapshot file. Overrides config file.
    #[arg(long)]
    status_file: Option<PathBuf>,

    /// Probe and save status without sending a notification.
    #[arg(long, default_value_t = false)]
    no_notify: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let app_config = match config::AppConfig::load(&cli.config) {
        Ok(c) => {
            init_tracing(&c.log_format);
            tracing::debug!(path = %cli.config.display(), "Loaded config file");
            c
        }
        Err(e) => {
            init_tracing("pretty");
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let probe_config = app_config.probe.to_probe_config();
    let shared_client =
        match HttpProber::build_client(probe_config.request_timeout, &probe_config.user_agent) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build HTTP client");
                std::process::exit(1);
            }
        };

    let (attempt_tx, attempt_rx) = attempt_channel();
    let printer = tokio::spawn(print_attempts(attempt_rx));

    let prober = Arc::new(HttpProber::with_client(shared_client.clone()));
    let engine = ProbeEngine::new(probe_config, prober).with_attempt_tx(attempt_tx);

    let status_file = cli
        .status_file
        .clone()
        .unwrap_or_else(|| app_config.status_file.clone());
    let mut runner = Runner::new(engine, JsonFileStore::new(&status_file));

    match (&app_config.pushover, cli.no_notify) {
        (Some(pushover), false) => {
            runner = runner.with_notifier(Arc::new(PushoverNotifier::new(
                pushover.clone(),
                shared_client,
            )));
        }
        (Some(_), true) => tracing::info!("Notification disabled by --no-notify"),
        (None, _) => tracing::info!("No [pushover] section, reports will not be sent"),
    }

    let result = runner.probe_and_save(&app_config.to_targets()).await;

    // Closing the attempt channel lets the printer drain before the banner.
    runner.engine_mut().close_attempts();
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "Attempt printer failed");
    }

    let mut report = match result {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(status_file = %status_file.display(), "{}", e);
            std::process::exit(1);
        }
    };

    print_report(&report);
    runner.deliver(&mut report).await;
    if let Delivery::Failed(reason) = &report.delivery {
        eprintln!(
            "\n{} {}",
            style("Notification not delivered:").yellow(),
            reason
        );
    }
}

async fn print_attempts(mut rx: UnboundedReceiver<ProbeAttempt>) {
    while let Some(attempt) = rx.recv().await {
        if attempt.result.is_up() {
            println!("checking {} ... {}", attempt.target, style("OK").green());
        } else {
            println!(
                "checking {} ... {}  {}",
                attempt.target,
                style("ERROR").red().bold(),
                style(&attempt.result).dim()
            );
        }
    }
}

fn print_report(report: &RunReport) {
    let Some(message) = &report.message else {
        return;
    };

    println!();
    println!("{}", style("======").dim());
    println!("{}", style("Report").bold());
    println!("{}", style("======").dim());
    println!();
    println!("{}", message);
}

/// Used when `RUST_LOG` is unset. Per-target failures log at info.
const DEFAULT_LOG_FILTER: &str = "info";

fn init_tracing(log_format: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match log_format {
        "json" => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
