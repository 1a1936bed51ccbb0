pub mod api;
pub mod generators;
pub mod models;
pub mod services;
pub mod subsystems;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::generators::{BackendClient, StubGenerator};
use crate::models::config::{AppConfig, LoggingConfig, load_effective_config};
use crate::services::dispatcher::Dispatcher;
use crate::services::interaction_log::JsonlInteractionLog;
use crate::services::validator::Validator;
use crate::subsystems::http::HttpSubsystem;

/// High-level entrypoint: load config, init logging, run the HTTP subsystem
pub async fn run_with_config_path(path: &str) -> anyhow::Result<()> {
    let cfg = load_effective_config(path)?;
    let _guard = init_logging(&cfg.logging)?;
    if !std::path::Path::new(path).exists() {
        warn!(path, "config file not found, using defaults");
    }
    run_server(cfg).await
}

/// Initializes structured logging (RUST_LOG wins over `logging.level`).
///
/// When `operator_log_dir` is set, warn/error events are also written to
/// `operator.log` there; keep the returned guard alive until exit.
pub fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let log_spec = std::env::var("RUST_LOG").unwrap_or_else(|_| cfg.level.clone());
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(EnvFilter::new(log_spec));

    let (operator, guard) = match cfg.operator_log_dir.as_ref() {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("failed to create operator log dir {dir}"))?;
            let appender = tracing_appender::rolling::never(dir, "operator.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(LevelFilter::WARN);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Повторная инициализация (например, в тестах) не считается ошибкой
    let _ = tracing_subscriber::registry().with(console).with(operator).try_init();
    Ok(guard)
}

/// Opens the interaction log and wires generators and dispatcher from config.
pub async fn build_dispatcher(cfg: &AppConfig) -> anyhow::Result<(Arc<Dispatcher>, Arc<JsonlInteractionLog>)> {
    let interaction_log = Arc::new(
        JsonlInteractionLog::open(&cfg.interaction_log.path)
            .await
            .with_context(|| format!("failed to open interaction log {}", cfg.interaction_log.path))?,
    );
    let stub = Arc::new(StubGenerator::new().context("failed to compile stub templates")?);
    let backend = Arc::new(BackendClient::from_config(&cfg.backend));

    let dispatcher = Dispatcher::builder()
        .validator(Validator::from_config(&cfg.validation))
        .stub(stub)
        .backend(backend)
        .interaction_log(interaction_log.clone())
        .preview_chars(cfg.backend.log_prompt_preview_chars)
        .build();
    Ok((Arc::new(dispatcher), interaction_log))
}

/// Runs the HTTP subsystem under a graceful-shutdown supervisor until SIGINT/SIGTERM.
pub async fn run_server(cfg: AppConfig) -> anyhow::Result<()> {
    info!(
        addr = %cfg.server.bind_addr(),
        backend = %cfg.backend.base_url,
        model = %cfg.backend.model,
        interaction_log = %cfg.interaction_log.path,
        "minivault starting"
    );

    let (dispatcher, interaction_log) = build_dispatcher(&cfg).await?;
    let http = HttpSubsystem::builder()
        .config(cfg.server.clone())
        .dispatcher(dispatcher)
        .interaction_log(interaction_log)
        .build();

    Toplevel::new(move |s| async move {
        s.start(SubsystemBuilder::new("http", move |h| http.run(h)));
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_secs(cfg.server.shutdown_timeout_secs))
    .await
    .map_err(|e| anyhow::anyhow!("shutdown error: {e}"))
}
