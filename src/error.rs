//! Error types for routectl

use std::fmt;
use thiserror::Error;

/// Failure reported by the gateway API client
#[derive(Debug, Error)]
pub enum GatewayError {
    /// API answered with a non-success status
    #[error("API request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    /// Request never completed
    #[error("API unreachable: {0}")]
    Transport(String),
    /// Server does not exist on the gateway
    #[error("unknown server: {0}")]
    UnknownServer(String),
    /// Route does not exist on the server
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    /// Route table mutated while the server is running
    #[error("server {0} must be stopped before its routes can change")]
    ServerOnline(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Step of a route operation that talked to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lookup,
    Stop,
    Mutate,
    Start,
    ConnectionCheck,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Lookup => "lookup",
            Phase::Stop => "stop",
            Phase::Mutate => "mutate",
            Phase::Start => "start",
            Phase::ConnectionCheck => "connection check",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RouteError {
    /// No route or server matches
    #[error("Not found: {0}")]
    NotFound(String),
    /// A route with the same network is already on the server
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Import key does not have the expected shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// Rejected user input
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Gateway call failed
    #[error("{phase} failed{}: {source}", on_server(.server_id))]
    Upstream {
        phase: Phase,
        /// `None` for calls not scoped to a server
        server_id: Option<String>,
        #[source]
        source: GatewayError,
    },
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

fn on_server(server_id: &Option<String>) -> String {
    match server_id {
        Some(id) => format!(" on server {}", id),
        None => String::new(),
    }
}

impl RouteError {
    pub(crate) fn upstream(phase: Phase, server_id: &str, source: GatewayError) -> Self {
        RouteError::Upstream {
            phase,
            server_id: Some(server_id.to_string()),
            source,
        }
    }

    /// Failure of a call that is not about one server (listing, connection check)
    pub(crate) fn upstream_unscoped(phase: Phase, source: GatewayError) -> Self {
        RouteError::Upstream {
            phase,
            server_id: None,
            source,
        }
    }

    /// True when the route (or server) is gone, so callers can drop it from state
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouteError::NotFound(_))
    }

    /// Phase that produced an upstream failure
    pub fn phase(&self) -> Option<Phase> {
        match self {
            RouteError::Upstream { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

pub type RouteResult<T> = Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_names_phase() {
        let err = RouteError::upstream(
            Phase::Stop,
            "srv1",
            GatewayError::Transport("connection reset".to_string()),
        );
        assert_eq!(err.phase(), Some(Phase::Stop));
        assert_eq!(
            err.to_string(),
            "stop failed on server srv1: API unreachable: connection reset"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_unscoped_upstream_message() {
        let err = RouteError::upstream_unscoped(
            Phase::ConnectionCheck,
            GatewayError::Status { status: 401, message: "unauthorized".to_string() },
        );
        assert_eq!(
            err.to_string(),
            "connection check failed: API request failed with status 401: unauthorized"
        );
    }

    #[test]
    fn test_not_found() {
        let err = RouteError::NotFound("Unable to find route.".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.phase(), None);
    }
}
