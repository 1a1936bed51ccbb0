use std::sync::Arc;

use bon::Builder;
use tokio::net::TcpListener;
use tokio_graceful_shutdown::SubsystemHandle;
use tracing::{error, info};

use crate::api;
use crate::models::config::ServerConfig;
use crate::services::dispatcher::Dispatcher;
use crate::services::interaction_log::JsonlInteractionLog;

#[derive(Builder)]
pub struct HttpSubsystem {
    pub(crate) config: ServerConfig,
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) interaction_log: Arc<JsonlInteractionLog>,
}

impl HttpSubsystem {
    pub async fn run(self, subsys: SubsystemHandle) -> std::io::Result<()> {
        info!("Starting HTTP subsystem");

        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr).await?;
        let served = api::serve(listener, Arc::clone(&self.dispatcher), async move {
            subsys.on_shutdown_requested().await;
            info!("HTTP subsystem: shutdown requested, draining requests");
        })
        .await;

        // Лог закрываем после того, как все запросы завершены
        if let Err(e) = self.interaction_log.close().await {
            error!(error = %e, path = %self.interaction_log.path().display(), "failed to close interaction log");
        }

        served?;
        info!("HTTP subsystem finished");
        Ok(())
    }
}
