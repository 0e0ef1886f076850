//! Gateway entities and the resource state handed back to callers

use serde::{Deserialize, Serialize};

/// VPN server as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
}

/// Route attached to a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Identity assigned by the gateway on creation
    pub id: String,
    /// Destination network in CIDR notation, immutable once created
    pub network: String,
    #[serde(default)]
    pub comment: String,
    /// NAT traffic destined to this network
    #[serde(default)]
    pub nat: bool,
}

/// Route body sent to the gateway when adding a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoute {
    pub network: String,
    pub comment: String,
    pub nat: bool,
}

impl NewRoute {
    pub(crate) fn into_route(self, id: String) -> Route {
        Route {
            id,
            network: self.network,
            comment: self.comment,
            nat: self.nat,
        }
    }
}

/// Populated route resource returned by every entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteState {
    pub id: String,
    pub server_id: String,
    pub network: String,
    pub comment: String,
    pub nat: bool,
}

impl RouteState {
    pub fn from_route(server_id: &str, route: Route) -> Self {
        Self {
            id: route.id,
            server_id: server_id.to_string(),
            network: route.network,
            comment: route.comment,
            nat: route.nat,
        }
    }
}

/// Server lookup result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerState {
    pub id: String,
    pub name: String,
}

impl From<Server> for ServerState {
    fn from(server: Server) -> Self {
        Self {
            id: server.id,
            name: server.name,
        }
    }
}
