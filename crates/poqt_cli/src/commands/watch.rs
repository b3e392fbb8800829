//! `poqt watch`: long-running reminder host.
//!
//! Re-arms every pending reminder on start, prints each one as it fires and
//! periodically re-reads storage so tasks added by other invocations get
//! armed too. Logs go to `<data_dir>/logs/poqt.log`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use poqt_constant::app::{self, WATCH_LOG_FILE};
use poqt_core::db;
use poqt_observability::{LogSink, ObservabilityConfig};
use poqt_runtime::{Notification, Notifier, ReloadSummary, Runtime};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::due::format_due;
use crate::output;

/// Prints fired reminders to the terminal.
struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: &Notification) -> poqt_core::Result<()> {
        let due = notification.due.map(format_due).unwrap_or_default();
        let body = if due.is_empty() {
            notification.body.clone()
        } else {
            format!("{} ({})", notification.body, due)
        };
        let data = serde_json::to_value(notification).unwrap_or_default();
        output::notify(&notification.title, &body, &data);
        Ok(())
    }
}

pub async fn handle(data_dir: &Path, verbose: bool, rescan: u64) -> Result<()> {
    init_logging(data_dir, verbose)?;

    let mut runtime = Runtime::open(data_dir)?;
    let summary = runtime.reload_all()?;
    report(&summary);
    let dispatcher = runtime.spawn_dispatcher(Arc::new(ConsoleNotifier))?;

    output::dim(&format!(
        "{} is watching for reminders, Ctrl+C to stop",
        app::DISPLAY_NAME
    ));
    let mut ticker = (rescan > 0).then(|| {
        let mut interval = tokio::time::interval(Duration::from_secs(rescan));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval
    });
    // the first tick completes immediately
    if let Some(ticker) = ticker.as_mut() {
        ticker.tick().await;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = next_tick(ticker.as_mut()) => {
                match runtime.reload_all() {
                    Ok(summary) => tracing::debug!(
                        considered = summary.considered,
                        armed = summary.armed,
                        "rescan"
                    ),
                    Err(e) => tracing::warn!(error = %e, "rescan failed"),
                }
            }
        }
    }

    dispatcher.abort();
    tracing::info!("watch stopped");
    poqt_observability::shutdown();
    Ok(())
}

async fn next_tick(ticker: Option<&mut tokio::time::Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn report(summary: &ReloadSummary) {
    let text = format!(
        "Armed {} of {} pending reminders ({} already past, {} failed)",
        summary.armed, summary.considered, summary.skipped, summary.failed
    );
    if summary.failed > 0 {
        output::warning(&text);
    } else {
        output::success(&text, summary);
    }
}

/// Console logging only with `--verbose`; the log file always gets info and up.
fn init_logging(data_dir: &Path, verbose: bool) -> Result<()> {
    let logs = db::logs_dir(data_dir);
    std::fs::create_dir_all(&logs)?;
    let sink = file_sink(logs.join(WATCH_LOG_FILE));

    let mut config = ObservabilityConfig::from_env()
        .with_console(verbose)
        .with_log_sink(sink);
    if config.service_version.is_none() {
        config = config.with_version(app::VERSION);
    }
    if verbose {
        config = config.with_log_level("debug");
    } else if config.log_level.is_none() {
        config = config.with_log_level("info");
    }
    if let Err(e) = poqt_observability::init(config) {
        output::warning(&format!("Logging init failed (continuing): {}", e));
    }
    Ok(())
}

/// Lines are handed to a writer task; a full channel drops the line.
fn file_sink(path: PathBuf) -> LogSink {
    let (tx, mut rx) = mpsc::channel::<String>(512);
    tokio::spawn(async move {
        let mut file = match tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) => {
                output::warning(&format!("Cannot open {}: {}", path.display(), e));
                return;
            }
        };
        while let Some(mut line) = rx.recv().await {
            line.push('\n');
            if file.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });
    Arc::new(move |line| {
        let _ = tx.try_send(line);
    })
}
