//! Composite identifier used to adopt an existing route
//!
//! Shape: `server/<server_id>/route/<route_id>`, both ids lowercase
//! alphanumeric.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{RouteError, RouteResult};

const IMPORT_KEY_PATTERN: &str = r"^server/([a-z0-9]+)/route/([a-z0-9]+)$";

fn import_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IMPORT_KEY_PATTERN).expect("import key pattern is valid"))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportKey {
    pub server_id: String,
    pub route_id: String,
}

impl ImportKey {
    pub fn new(server_id: impl Into<String>, route_id: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
            route_id: route_id.into(),
        }
    }

    /// Parse `raw`, which must be exactly `server/<id>/route/<id>`
    ///
    /// The pattern is anchored at both ends: leading or trailing text,
    /// such as `server/a/route/b/extra`, is `InvalidFormat`.
    pub fn parse(raw: &str) -> RouteResult<Self> {
        let captures = import_key_regex().captures(raw).ok_or_else(|| {
            RouteError::InvalidFormat(format!(
                "'{}' must be server/<server_id>/route/<route_id> with lowercase alphanumeric ids",
                raw
            ))
        })?;

        Ok(Self::new(&captures[1], &captures[2]))
    }
}

impl FromStr for ImportKey {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ImportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server/{}/route/{}", self.server_id, self.route_id)
    }
}
