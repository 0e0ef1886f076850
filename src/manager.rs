//! Route manager
//!
//! Every route mutation runs under the server's lock from the
//! [`LockRegistry`] and is bracketed by a server stop and start:
//!
//! ```text
//! lock ─► (lookup) ─► stop ─► add/update/delete ─► start ─► (re-read) ─► unlock
//! ```
//!
//! The lock guard is dropped on every exit path. Start is only issued once
//! the mutation succeeded; a failed mutation after a successful stop leaves
//! the server stopped and is reported as a mutate-phase failure.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, Phase, RouteError, RouteResult};
use crate::gateway::GatewayApi;
use crate::import_key::ImportKey;
use crate::locator::RouteLocator;
use crate::locks::LockRegistry;
use crate::model::{NewRoute, RouteState};
use crate::validation::{validate_cidr, validate_server_id};

/// Request to create a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRouteRequest {
    pub server_id: String,
    pub network: String,
    pub comment: String,
    /// Sent as `false` when absent
    #[serde(default)]
    pub nat: Option<bool>,
}

/// Request to change the mutable attributes of a route
///
/// Absent fields keep the value currently stored on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRouteRequest {
    pub server_id: String,
    pub route_id: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub nat: Option<bool>,
}

/// Create/read/update/delete/import of routes on gateway servers
pub struct RouteManager {
    gateway: Arc<dyn GatewayApi>,
    locator: RouteLocator,
    locks: Arc<LockRegistry>,
}

impl RouteManager {
    pub fn new(gateway: Arc<dyn GatewayApi>, locks: Arc<LockRegistry>) -> Self {
        Self {
            locator: RouteLocator::new(Arc::clone(&gateway)),
            gateway,
            locks,
        }
    }

    pub fn locator(&self) -> &RouteLocator {
        &self.locator
    }

    /// Create a route, rejecting a network that is already routed on the server
    pub async fn create(&self, request: CreateRouteRequest) -> RouteResult<RouteState> {
        validate_server_id(&request.server_id)?;
        validate_cidr(&request.network)?;
        let server_id = request.server_id.as_str();

        let _guard = self.locks.lock(server_id).await;
        debug!("Locked server {} for route create", server_id);

        let routes = self.locator.list(server_id).await?;
        if let Some(existing) = routes.iter().find(|route| route.network == request.network) {
            return Err(RouteError::AlreadyExists(format!(
                "Route already exist with same network {} on {} server. Route ID {}",
                request.network, server_id, existing.id
            )));
        }

        let new_route = NewRoute {
            network: request.network.clone(),
            comment: request.comment.clone(),
            nat: request.nat.unwrap_or(false),
        };

        self.stop(server_id).await?;
        let added = self.gateway.add_route_to_server(server_id, new_route)
            .await
            .map_err(|e| self.mutate_failed(server_id, e))?;
        info!("Added route {} ({}) to server {}", added.id, added.network, server_id);
        self.start(server_id).await?;

        let route = self.locator.find_by_id(server_id, &added.id).await?;
        Ok(RouteState::from_route(server_id, route))
    }

    /// Current state of a route; takes no lock
    pub async fn read(&self, server_id: &str, route_id: &str) -> RouteResult<RouteState> {
        validate_server_id(server_id)?;
        let route = self.locator.find_by_id(server_id, route_id).await?;
        Ok(RouteState::from_route(server_id, route))
    }

    /// Route on `server_id` routing `network`; takes no lock
    pub async fn read_by_network(&self, server_id: &str, network: &str) -> RouteResult<RouteState> {
        validate_server_id(server_id)?;
        validate_cidr(network)?;
        let route = self.locator.find_by_network(server_id, network).await?;
        Ok(RouteState::from_route(server_id, route))
    }

    /// Apply the supplied fields of `request` to an existing route
    pub async fn update(&self, request: UpdateRouteRequest) -> RouteResult<RouteState> {
        validate_server_id(&request.server_id)?;
        let server_id = request.server_id.as_str();

        let _guard = self.locks.lock(server_id).await;
        debug!("Locked server {} for route update", server_id);

        let mut route = self.locator.find_by_id(server_id, &request.route_id).await?;
        if let Some(comment) = request.comment {
            route.comment = comment;
        }
        if let Some(nat) = request.nat {
            route.nat = nat;
        }

        self.stop(server_id).await?;
        let updated = self.gateway.update_route_on_server(server_id, route)
            .await
            .map_err(|e| self.mutate_failed(server_id, e))?;
        info!("Updated route {} on server {}", updated.id, server_id);
        self.start(server_id).await?;

        let route = self.locator.find_by_id(server_id, &updated.id).await?;
        Ok(RouteState::from_route(server_id, route))
    }

    /// Remove a route; a missing route is reported by the gateway
    pub async fn delete(&self, server_id: &str, route_id: &str) -> RouteResult<()> {
        validate_server_id(server_id)?;

        let _guard = self.locks.lock(server_id).await;
        debug!("Locked server {} for route delete", server_id);

        self.stop(server_id).await?;
        self.gateway.delete_route_from_server(server_id, route_id)
            .await
            .map_err(|e| self.mutate_failed(server_id, e))?;
        info!("Deleted route {} from server {}", route_id, server_id);
        self.start(server_id).await
    }

    /// Adopt an existing route from a `server/<id>/route/<id>` key
    pub async fn import(&self, raw: &str) -> RouteResult<RouteState> {
        let key = ImportKey::parse(raw)?;
        let route = self.locator.find_by_import_key(&key).await?;
        info!("Imported route {} from server {}", route.id, key.server_id);
        Ok(RouteState::from_route(&key.server_id, route))
    }

    async fn stop(&self, server_id: &str) -> RouteResult<()> {
        info!("Stopping server {}", server_id);
        self.gateway.stop_server(server_id)
            .await
            .map_err(|e| RouteError::upstream(Phase::Stop, server_id, e))
    }

    async fn start(&self, server_id: &str) -> RouteResult<()> {
        info!("Starting server {}", server_id);
        self.gateway.start_server(server_id)
            .await
            .map_err(|e| RouteError::upstream(Phase::Start, server_id, e))
    }

    fn mutate_failed(&self, server_id: &str, error: GatewayError) -> RouteError {
        warn!("Route change failed on server {}; server left stopped: {}", server_id, error);
        RouteError::upstream(Phase::Mutate, server_id, error)
    }
}
