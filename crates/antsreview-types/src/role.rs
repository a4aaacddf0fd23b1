//! Capability roles held by protocol participants

use serde::{Deserialize, Serialize};
use std::fmt;

/// A capability managed by the role registry.
///
/// Membership in each role is independent: one address may hold several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May grant and revoke roles and pause the protocol
    Admin,
    /// May issue new review tasks
    Issuer,
    /// May submit reviews against tasks
    PeerReviewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Issuer => "issuer",
            Role::PeerReviewer => "peer_reviewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
