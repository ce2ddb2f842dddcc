use registration_service::config::{RegistrationConfig, SERVICE_NAME};
use registration_service::startup::Application;
use service_core::observability::{
    failure_channel, init_tracing, install_failure_reporter, shutdown_tracing,
};
use service_core::shutdown::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RegistrationConfig::load()?;

    init_tracing(
        SERVICE_NAME,
        &config.common.log_level,
        config.common.log_format,
        config.common.otlp_endpoint.as_deref(),
    );

    // Failures outside request scope are logged and never stop the process.
    let (reporter, monitor) = failure_channel();
    tokio::spawn(monitor.run());
    install_failure_reporter(reporter);

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("MongoDB connection error: {}", e);
        e
    })?;

    tracing::info!(
        "Server running on http://localhost:{}",
        application.port()
    );

    application.run_until_stopped(shutdown_signal()).await?;
    shutdown_tracing();

    Ok(())
}
