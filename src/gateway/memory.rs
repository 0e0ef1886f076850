//! In-process gateway
//!
//! Keeps servers and route tables in memory, enforces the stopped-server
//! rule for route-table changes, and journals every call in order. Used as
//! a dry-run backend and as the recording collaborator in tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::GatewayApi;
use crate::error::{GatewayError, GatewayResult};
use crate::model::{NewRoute, Route, Server};

/// Gateway operation kinds, used for the journal and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    GetServers,
    GetRoutes,
    AddRoute,
    UpdateRoute,
    DeleteRoute,
    StopServer,
    StartServer,
    CheckConnection,
}

impl GatewayOp {
    /// Add, update or delete
    pub fn is_mutation(&self) -> bool {
        matches!(self, GatewayOp::AddRoute | GatewayOp::UpdateRoute | GatewayOp::DeleteRoute)
    }
}

/// One journaled gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCall {
    pub op: GatewayOp,
    pub server_id: Option<String>,
    /// Network for adds, route id for updates and deletes
    pub detail: Option<String>,
}

impl GatewayCall {
    fn new(op: GatewayOp, server_id: Option<&str>, detail: Option<&str>) -> Self {
        Self {
            op,
            server_id: server_id.map(str::to_string),
            detail: detail.map(str::to_string),
        }
    }
}

impl fmt::Display for GatewayCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.op)?;
        if let Some(server_id) = &self.server_id {
            write!(f, "({}", server_id)?;
            if let Some(detail) = &self.detail {
                write!(f, ", {}", detail)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

struct ServerEntry {
    server: Server,
    running: bool,
    routes: Vec<Route>,
}

#[derive(Default)]
struct Inner {
    servers: Vec<ServerEntry>,
    journal: Vec<GatewayCall>,
    faults: HashSet<GatewayOp>,
}

impl Inner {
    fn server(&self, server_id: &str) -> GatewayResult<&ServerEntry> {
        self.servers.iter()
            .find(|entry| entry.server.id == server_id)
            .ok_or_else(|| GatewayError::UnknownServer(server_id.to_string()))
    }

    fn server_mut(&mut self, server_id: &str) -> GatewayResult<&mut ServerEntry> {
        self.servers.iter_mut()
            .find(|entry| entry.server.id == server_id)
            .ok_or_else(|| GatewayError::UnknownServer(server_id.to_string()))
    }

    /// Stopped server whose route table may change
    fn offline_server_mut(&mut self, server_id: &str) -> GatewayResult<&mut ServerEntry> {
        let entry = self.server_mut(server_id)?;
        if entry.running {
            return Err(GatewayError::ServerOnline(server_id.to_string()));
        }
        Ok(entry)
    }

    fn record(&mut self, call: GatewayCall) -> GatewayResult<()> {
        let op = call.op;
        debug!("Gateway call: {}", call);
        self.journal.push(call);
        if self.faults.remove(&op) {
            return Err(GatewayError::Status {
                status: 500,
                message: format!("injected {:?} failure", op),
            });
        }
        Ok(())
    }
}

/// Gateway backed by process memory
#[derive(Default)]
pub struct MemoryGateway {
    inner: Mutex<Inner>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a running server
    pub fn with_server(mut self, id: &str, name: &str) -> Self {
        self.inner.get_mut().servers.push(ServerEntry {
            server: Server {
                id: id.to_string(),
                name: name.to_string(),
            },
            running: true,
            routes: Vec::new(),
        });
        self
    }

    /// Seed a route on a server added with [`MemoryGateway::with_server`]
    ///
    /// Routes for unknown servers are ignored.
    pub fn with_route(mut self, server_id: &str, route: Route) -> Self {
        if let Ok(entry) = self.inner.get_mut().server_mut(server_id) {
            entry.routes.push(route);
        }
        self
    }

    /// Make the next call of `op` fail with a 500 status
    pub async fn fail_next(&self, op: GatewayOp) {
        self.inner.lock().await.faults.insert(op);
    }

    /// Calls received so far, oldest first
    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.inner.lock().await.journal.clone()
    }

    /// Running flag of a server, `None` when unknown
    pub async fn is_running(&self, server_id: &str) -> Option<bool> {
        let inner = self.inner.lock().await;
        inner.server(server_id).ok().map(|entry| entry.running)
    }

    /// Current route table of a server
    pub async fn routes(&self, server_id: &str) -> Vec<Route> {
        let inner = self.inner.lock().await;
        inner.server(server_id)
            .map(|entry| entry.routes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GatewayApi for MemoryGateway {
    async fn get_servers(&self) -> GatewayResult<Vec<Server>> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock().await;
        inner.record(GatewayCall::new(GatewayOp::GetServers, None, None))?;
        Ok(inner.servers.iter().map(|entry| entry.server.clone()).collect())
    }

    async fn get_routes_by_server(&self, server_id: &str) -> GatewayResult<Vec<Route>> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock().await;
        inner.record(GatewayCall::new(GatewayOp::GetRoutes, Some(server_id), None))?;
        Ok(inner.server(server_id)?.routes.clone())
    }

    async fn add_route_to_server(&self, server_id: &str, route: NewRoute) -> GatewayResult<Route> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock().await;
        inner.record(GatewayCall::new(GatewayOp::AddRoute, Some(server_id), Some(route.network.as_str())))?;

        let entry = inner.offline_server_mut(server_id)?;
        if entry.routes.iter().any(|existing| existing.network == route.network) {
            return Err(GatewayError::Status {
                status: 400,
                message: format!("network {} is already routed", route.network),
            });
        }

        let added = route.into_route(Uuid::new_v4().simple().to_string());
        entry.routes.push(added.clone());
        Ok(added)
    }

    async fn update_route_on_server(&self, server_id: &str, route: Route) -> GatewayResult<Route> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock().await;
        inner.record(GatewayCall::new(GatewayOp::UpdateRoute, Some(server_id), Some(route.id.as_str())))?;

        let entry = inner.offline_server_mut(server_id)?;
        let existing = entry.routes.iter_mut()
            .find(|existing| existing.id == route.id)
            .ok_or_else(|| GatewayError::UnknownRoute(route.id.clone()))?;

        // Network is fixed after creation
        existing.comment = route.comment;
        existing.nat = route.nat;
        Ok(existing.clone())
    }

    async fn delete_route_from_server(&self, server_id: &str, route_id: &str) -> GatewayResult<()> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock().await;
        inner.record(GatewayCall::new(GatewayOp::DeleteRoute, Some(server_id), Some(route_id)))?;

        let entry = inner.offline_server_mut(server_id)?;
        let before = entry.routes.len();
        entry.routes.retain(|route| route.id != route_id);
        if entry.routes.len() == before {
            return Err(GatewayError::UnknownRoute(route_id.to_string()));
        }
        Ok(())
    }

    async fn stop_server(&self, server_id: &str) -> GatewayResult<()> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock().await;
        inner.record(GatewayCall::new(GatewayOp::StopServer, Some(server_id), None))?;
        inner.server_mut(server_id)?.running = false;
        Ok(())
    }

    async fn start_server(&self, server_id: &str) -> GatewayResult<()> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock().await;
        inner.record(GatewayCall::new(GatewayOp::StartServer, Some(server_id), None))?;
        inner.server_mut(server_id)?.running = true;
        Ok(())
    }

    async fn check_connection(&self) -> GatewayResult<()> {
        let mut inner = self.inner.lock().await;
        inner.record(GatewayCall::new(GatewayOp::CheckConnection, None, None))
    }
}
