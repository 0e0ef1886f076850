//! Input validation
//!
//! Requests are checked here before any gateway call is made.

use crate::error::{RouteError, RouteResult};
use std::net::IpAddr;

/// Validate a network in CIDR notation (`addr/prefix`)
///
/// The address must parse as IPv4 or IPv6 and the prefix must fit the
/// address family. Surrounding whitespace is rejected rather than trimmed
/// because routes are matched by exact string equality.
pub fn validate_cidr(network: &str) -> RouteResult<()> {
    if network.is_empty() {
        return Err(RouteError::InvalidParameter(
            "Network cannot be empty".to_string()
        ));
    }

    if network.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(RouteError::InvalidParameter(
            format!("Invalid network '{}': contains whitespace or control characters", network.escape_debug())
        ));
    }

    let (addr, prefix) = network.split_once('/').ok_or_else(|| {
        RouteError::InvalidParameter(format!("Invalid network '{}': expected address/prefix", network))
    })?;

    let addr: IpAddr = addr.parse().map_err(|_| {
        RouteError::InvalidParameter(format!("Invalid network '{}': bad address", network))
    })?;

    // Leading '+' is accepted by u8::from_str but is not CIDR
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
        return Err(RouteError::InvalidParameter(
            format!("Invalid network '{}': bad prefix length", network)
        ));
    }

    let prefix: u8 = prefix.parse().map_err(|_| {
        RouteError::InvalidParameter(format!("Invalid network '{}': bad prefix length", network))
    })?;

    validate_prefix_len(prefix, addr.is_ipv6())
}

/// Validate prefix length for IPv4 or IPv6
pub fn validate_prefix_len(prefix: u8, is_ipv6: bool) -> RouteResult<()> {
    let max = if is_ipv6 { 128 } else { 32 };
    if prefix > max {
        return Err(RouteError::InvalidParameter(
            format!("Prefix length {} exceeds maximum {}", prefix, max)
        ));
    }
    Ok(())
}

/// Validate a server identity
///
/// Server ids are opaque to this crate; only an empty id is rejected.
pub fn validate_server_id(id: &str) -> RouteResult<()> {
    if id.is_empty() {
        return Err(RouteError::InvalidParameter(
            "Server id cannot be empty".to_string()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cidr_validation() {
        // Valid IPv4
        assert!(validate_cidr("10.0.0.0/24").is_ok());
        assert!(validate_cidr("0.0.0.0/0").is_ok());
        assert!(validate_cidr("192.168.1.1/32").is_ok());

        // Valid IPv6
        assert!(validate_cidr("fd00::/8").is_ok());
        assert!(validate_cidr("::/0").is_ok());
        assert!(validate_cidr("2001:db8::/128").is_ok());

        // Missing or bad prefix
        assert!(validate_cidr("10.0.0.0").is_err());
        assert!(validate_cidr("10.0.0.0/").is_err());
        assert!(validate_cidr("10.0.0.0/33").is_err());
        assert!(validate_cidr("10.0.0.0/+8").is_err());
        assert!(validate_cidr("fd00::/129").is_err());

        // Bad address
        assert!(validate_cidr("256.0.0.0/8").is_err());
        assert!(validate_cidr("office/24").is_err());

        // Whitespace and injection attempts
        assert!(validate_cidr(" 10.0.0.0/24").is_err());
        assert!(validate_cidr("10.0.0.0/24\n").is_err());
        assert!(validate_cidr("10.0.0.0/24; rm -rf /").is_err());

        // Empty
        assert!(validate_cidr("").is_err());
    }

    #[test]
    fn test_prefix_len_validation() {
        assert!(validate_prefix_len(32, false).is_ok());
        assert!(validate_prefix_len(33, false).is_err());
        assert!(validate_prefix_len(128, true).is_ok());
        assert!(validate_prefix_len(129, true).is_err());
    }

    #[test]
    fn test_server_id_validation() {
        assert!(validate_server_id("srv1").is_ok());
        assert!(validate_server_id("5f2a9c0e1b3d4e5f6a7b8c9d").is_ok());

        // Ids are opaque
        assert!(validate_server_id("Srv-1").is_ok());
        assert!(validate_server_id(&"a".repeat(65)).is_ok());

        assert!(validate_server_id("").is_err());
    }
}
