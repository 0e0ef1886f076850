//! Gateway API contract
//!
//! Route management only needs a handful of calls from the VPN gateway
//! API. They are collected in the [`GatewayApi`] trait so the HTTP client,
//! the in-process [`memory::MemoryGateway`] and test mocks are
//! interchangeable.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │   RouteManager / ServerLocator       │
//! └──────────────────┬───────────────────┘
//!                    │ Arc<dyn GatewayApi>
//!        ┌───────────┼────────────┐
//!        ▼           ▼            ▼
//!    ┌───────┐   ┌────────┐   ┌──────┐
//!    │ HTTP  │   │ Memory │   │ Mock │
//!    └───────┘   └────────┘   └──────┘
//! ```

pub mod memory;

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::model::{NewRoute, Route, Server};

/// Operations the route core consumes from the gateway API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// List every server known to the gateway
    async fn get_servers(&self) -> GatewayResult<Vec<Server>>;

    /// List the route table of a server
    async fn get_routes_by_server(&self, server_id: &str) -> GatewayResult<Vec<Route>>;

    /// Add a route; the returned route carries its assigned identity
    async fn add_route_to_server(&self, server_id: &str, route: NewRoute) -> GatewayResult<Route>;

    /// Replace the mutable attributes of an existing route
    async fn update_route_on_server(&self, server_id: &str, route: Route) -> GatewayResult<Route>;

    async fn delete_route_from_server(&self, server_id: &str, route_id: &str) -> GatewayResult<()>;

    async fn stop_server(&self, server_id: &str) -> GatewayResult<()>;

    async fn start_server(&self, server_id: &str) -> GatewayResult<()>;

    /// Cheap authenticated call used to verify credentials and reachability
    async fn check_connection(&self) -> GatewayResult<()>;
}

pub use memory::{GatewayCall, GatewayOp, MemoryGateway};
