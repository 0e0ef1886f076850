//! Entry point for the surrounding framework
//!
//! [`Provider::configure`] validates settings, optionally checks the
//! gateway, and wires the route manager and server locator around one
//! shared [`LockRegistry`].

use std::sync::Arc;
use tracing::info;

use crate::config::ProviderConfig;
use crate::error::{Phase, RouteError, RouteResult};
use crate::gateway::GatewayApi;
use crate::locator::ServerLocator;
use crate::locks::LockRegistry;
use crate::manager::RouteManager;

pub struct Provider {
    routes: RouteManager,
    servers: ServerLocator,
    locks: Arc<LockRegistry>,
}

impl Provider {
    pub async fn configure(config: &ProviderConfig, gateway: Arc<dyn GatewayApi>) -> RouteResult<Self> {
        config.validate()?;
        let retry = config.retry_policy();

        if config.api.connection_check {
            info!("Checking connection to {}", config.api.url);
            retry.run(|| gateway.check_connection())
                .await
                .map_err(|e| RouteError::upstream_unscoped(Phase::ConnectionCheck, e))?;
        }

        let locks = Arc::new(LockRegistry::new());
        Ok(Self {
            routes: RouteManager::new(Arc::clone(&gateway), Arc::clone(&locks)),
            servers: ServerLocator::new(gateway, retry),
            locks,
        })
    }

    pub fn routes(&self) -> &RouteManager {
        &self.routes
    }

    pub fn servers(&self) -> &ServerLocator {
        &self.servers
    }

    pub fn locks(&self) -> &Arc<LockRegistry> {
        &self.locks
    }
}
