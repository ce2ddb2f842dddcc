//! Process-wide sink for failures that happen outside any request.
//!
//! Reports are logged at `warn` by a [`FailureMonitor`] task and counted.
//! Nothing on this path ever terminates the process.

use once_cell::sync::OnceCell;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

static GLOBAL_REPORTER: OnceCell<FailureReporter> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub source: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct FailureReporter {
    tx: mpsc::UnboundedSender<FailureReport>,
    reported: Arc<AtomicU64>,
}

pub struct FailureMonitor {
    rx: mpsc::UnboundedReceiver<FailureReport>,
}

pub fn failure_channel() -> (FailureReporter, FailureMonitor) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        FailureReporter {
            tx,
            reported: Arc::new(AtomicU64::new(0)),
        },
        FailureMonitor { rx },
    )
}

impl FailureReporter {
    pub fn report(&self, source: impl Into<String>, error: impl Display) {
        self.reported.fetch_add(1, Ordering::Relaxed);

        let report = FailureReport {
            source: source.into(),
            message: error.to_string(),
        };

        if let Err(mpsc::error::SendError(report)) = self.tx.send(report) {
            log_report(&report);
        }
    }

    /// Number of failures reported since the channel was created.
    pub fn reported(&self) -> u64 {
        self.reported.load(Ordering::Relaxed)
    }

    /// Runs `future` on its own task; an `Err` or a panic is reported instead
    /// of being lost.
    pub fn spawn_supervised<F, E>(&self, name: &'static str, future: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let reporter = self.clone();
        let task = tokio::spawn(future);

        tokio::spawn(async move {
            match task.await {
                Ok(Ok(())) => tracing::debug!(task = name, "Supervised task finished"),
                Ok(Err(e)) => reporter.report(name, e),
                Err(join_error) if join_error.is_panic() => {
                    reporter.report(name, format!("task panicked: {}", join_error))
                }
                Err(join_error) => tracing::debug!(task = name, error = %join_error, "Supervised task cancelled"),
            }
        })
    }
}

impl FailureMonitor {
    pub async fn run(mut self) {
        while let Some(report) = self.rx.recv().await {
            log_report(&report);
        }
    }
}

fn log_report(report: &FailureReport) {
    tracing::warn!(
        source = %report.source,
        error = %report.message,
        "Unhandled failure; continuing"
    );
}

/// Makes `reporter` the process-wide sink and routes panics into it.
/// Returns `false` if a reporter was already installed.
pub fn install_failure_reporter(reporter: FailureReporter) -> bool {
    if GLOBAL_REPORTER.set(reporter.clone()).is_err() {
        return false;
    }

    std::panic::set_hook(Box::new(move |info| {
        reporter.report("panic", info);
    }));

    true
}

/// Reports through the installed sink, or logs directly when none is installed.
pub fn report_unhandled(source: &str, error: impl Display) {
    match GLOBAL_REPORTER.get() {
        Some(reporter) => reporter.report(source, error),
        None => log_report(&FailureReport {
            source: source.to_string(),
            message: error.to_string(),
        }),
    }
}

/// [`FailureReporter::spawn_supervised`] on the installed sink.
pub fn spawn_supervised<F, E>(name: &'static str, future: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Display + Send + 'static,
{
    match GLOBAL_REPORTER.get() {
        Some(reporter) => reporter.spawn_supervised(name, future),
        None => tokio::spawn(async move {
            if let Err(e) = future.await {
                report_unhandled(name, e);
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_are_counted_and_delivered() {
        let (reporter, mut monitor) = failure_channel();

        reporter.report("worker", "boom");

        assert_eq!(reporter.reported(), 1);
        let report = monitor.rx.recv().await.expect("report delivered");
        assert_eq!(report.source, "worker");
        assert_eq!(report.message, "boom");
    }

    #[tokio::test]
    async fn reporting_without_a_monitor_does_not_panic() {
        let (reporter, monitor) = failure_channel();
        drop(monitor);

        reporter.report("orphan", "nobody listening");

        assert_eq!(reporter.reported(), 1);
    }

    #[tokio::test]
    async fn supervised_errors_are_reported() {
        let (reporter, mut monitor) = failure_channel();

        reporter
            .spawn_supervised("failing", async { Err::<(), _>("store went away") })
            .await
            .expect("supervisor task");

        assert_eq!(reporter.reported(), 1);
        let report = monitor.rx.recv().await.expect("report delivered");
        assert_eq!(report.source, "failing");
        assert_eq!(report.message, "store went away");
    }

    #[tokio::test]
    async fn supervised_panics_are_reported_and_contained() {
        let (reporter, mut monitor) = failure_channel();

        reporter
            .spawn_supervised("panicking", async {
                if true {
                    panic!("unexpected state");
                }
                Ok::<(), String>(())
            })
            .await
            .expect("supervisor survives the panic");

        let report = monitor.rx.recv().await.expect("report delivered");
        assert_eq!(report.source, "panicking");
        assert!(report.message.contains("panicked"));
    }

    #[tokio::test]
    async fn successful_tasks_report_nothing() {
        let (reporter, _monitor) = failure_channel();

        reporter
            .spawn_supervised("quiet", async { Ok::<(), String>(()) })
            .await
            .expect("supervisor task");

        assert_eq!(reporter.reported(), 0);
    }
}
