pub mod failures;
pub mod logging;

pub use failures::{
    FailureMonitor, FailureReporter, failure_channel, install_failure_reporter, report_unhandled,
    spawn_supervised,
};
pub use logging::{init_tracing, shutdown_tracing};
