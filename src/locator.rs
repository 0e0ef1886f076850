//! Route and server lookup
//!
//! Every lookup lists the full route table (or server list) from the
//! gateway; nothing is cached, so results are only as fresh as the API.

use std::sync::Arc;
use tracing::debug;

use crate::error::{Phase, RouteError, RouteResult};
use crate::gateway::GatewayApi;
use crate::import_key::ImportKey;
use crate::model::{Route, ServerState};
use crate::retry::RetryPolicy;

pub struct RouteLocator {
    gateway: Arc<dyn GatewayApi>,
}

impl RouteLocator {
    pub fn new(gateway: Arc<dyn GatewayApi>) -> Self {
        Self { gateway }
    }

    /// Current route table of a server
    pub async fn list(&self, server_id: &str) -> RouteResult<Vec<Route>> {
        let routes = self.gateway.get_routes_by_server(server_id)
            .await
            .map_err(|e| RouteError::upstream(Phase::Lookup, server_id, e))?;
        debug!("Server {} has {} routes", server_id, routes.len());
        Ok(routes)
    }

    async fn find<P>(&self, server_id: &str, what: &str, predicate: P) -> RouteResult<Route>
    where
        P: Fn(&Route) -> bool,
    {
        self.list(server_id)
            .await?
            .into_iter()
            .find(|route| predicate(route))
            .ok_or_else(|| RouteError::NotFound(format!(
                "could not find a route with {} on server {}", what, server_id
            )))
    }

    /// First route whose network equals `network` exactly (string equality)
    pub async fn find_by_network(&self, server_id: &str, network: &str) -> RouteResult<Route> {
        self.find(server_id, &format!("network {}", network), |route| route.network == network)
            .await
    }

    pub async fn find_by_id(&self, server_id: &str, route_id: &str) -> RouteResult<Route> {
        self.find(server_id, &format!("id {}", route_id), |route| route.id == route_id)
            .await
    }

    pub async fn find_by_import_key(&self, key: &ImportKey) -> RouteResult<Route> {
        self.find_by_id(&key.server_id, &key.route_id).await
    }
}

/// Read-only server lookup by display name
pub struct ServerLocator {
    gateway: Arc<dyn GatewayApi>,
    retry: RetryPolicy,
}

impl ServerLocator {
    pub fn new(gateway: Arc<dyn GatewayApi>, retry: RetryPolicy) -> Self {
        Self { gateway, retry }
    }

    /// First server whose name equals `name` exactly
    pub async fn find_by_name(&self, name: &str) -> RouteResult<ServerState> {
        let servers = self.retry
            .run(|| self.gateway.get_servers())
            .await
            .map_err(|e| RouteError::upstream_unscoped(Phase::Lookup, e))?;

        servers.into_iter()
            .find(|server| server.name == name)
            .map(ServerState::from)
            .ok_or_else(|| RouteError::NotFound(format!("Server not found: {}", name)))
    }
}
