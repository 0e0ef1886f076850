//! routectl - VPN gateway route management
//!
//! Async library for managing the route tables of VPN gateway servers:
//! - Route create/read/update/delete/import
//! - Per-server locking so concurrent callers never interleave
//!   stop/mutate/start sequences on the same server
//! - Route lookup by id, network or `server/<id>/route/<id>` import key
//! - Server lookup by name
//!
//! The gateway API itself is reached through the [`GatewayApi`] trait.

pub mod error;
pub mod model;
pub mod validation;
pub mod import_key;
pub mod gateway;
pub mod locks;
pub mod locator;
pub mod manager;
pub mod retry;
pub mod config;
pub mod provider;
pub mod logging;

// Re-export commonly used types
pub use error::{GatewayError, GatewayResult, Phase, RouteError, RouteResult};
pub use model::{NewRoute, Route, RouteState, Server, ServerState};
pub use import_key::ImportKey;
pub use gateway::{GatewayApi, GatewayCall, GatewayOp, MemoryGateway};
pub use locks::{LockRegistry, ServerLock};
pub use locator::{RouteLocator, ServerLocator};
pub use manager::{CreateRouteRequest, RouteManager, UpdateRouteRequest};
pub use retry::{RetryPolicy, RetrySettings};
pub use config::{ApiSettings, ProviderConfig};
pub use provider::Provider;
