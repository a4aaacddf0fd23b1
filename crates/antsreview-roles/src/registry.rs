//! The role registry
//!
//! Membership is boolean per role. Granting a role that is already held, or
//! revoking one that is not, succeeds without emitting an event.

use std::collections::HashMap;
use std::sync::Arc;

use antsreview_events::{EventLog, ProtocolEvent};
use antsreview_types::{Address, ReviewError, Result, Role};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::CapabilityCheck;

/// Internal state of the registry
#[derive(Debug, Default)]
struct RoleState {
    /// Members per role, in grant order
    members: HashMap<Role, Vec<Address>>,
    paused: bool,
}

impl RoleState {
    fn has(&self, role: Role, account: &Address) -> bool {
        self.members
            .get(&role)
            .map(|m| m.contains(account))
            .unwrap_or(false)
    }

    fn count(&self, role: Role) -> usize {
        self.members.get(&role).map(Vec::len).unwrap_or(0)
    }

    fn require_admin(&self, caller: &Address, action: &str) -> Result<()> {
        if self.has(Role::Admin, caller) {
            Ok(())
        } else {
            warn!(caller = %caller, action, "admin capability required");
            Err(ReviewError::not_admin(caller, action))
        }
    }
}

/// Registry of admin, issuer and peer-reviewer capabilities.
///
/// The deploying address becomes the owner and the first admin.
pub struct RoleRegistry {
    owner: Address,
    state: RwLock<RoleState>,
    events: Arc<EventLog>,
}

impl RoleRegistry {
    /// Create a registry whose only admin is `owner`
    pub fn new(owner: Address, events: Arc<EventLog>) -> Self {
        let mut state = RoleState::default();
        state.members.insert(Role::Admin, vec![owner.clone()]);
        Self {
            owner,
            state: RwLock::new(state),
            events,
        }
    }

    /// The deploying address
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    // ========================================================================
    // Mutations (admin only)
    // ========================================================================

    pub async fn add_issuer(&self, caller: &Address, account: &Address) -> Result<()> {
        self.grant(caller, Role::Issuer, account).await
    }

    pub async fn remove_issuer(&self, caller: &Address, account: &Address) -> Result<()> {
        self.revoke(caller, Role::Issuer, account).await
    }

    pub async fn add_peer_reviewer(&self, caller: &Address, account: &Address) -> Result<()> {
        self.grant(caller, Role::PeerReviewer, account).await
    }

    pub async fn remove_peer_reviewer(&self, caller: &Address, account: &Address) -> Result<()> {
        self.revoke(caller, Role::PeerReviewer, account).await
    }

    pub async fn add_admin(&self, caller: &Address, account: &Address) -> Result<()> {
        self.grant(caller, Role::Admin, account).await
    }

    /// Revoke admin capability. Fails with `LastAdmin` if `account` is the
    /// only remaining admin.
    pub async fn remove_admin(&self, caller: &Address, account: &Address) -> Result<()> {
        self.revoke(caller, Role::Admin, account).await
    }

    /// Suspend every engine mutation
    pub async fn pause(&self, caller: &Address) -> Result<()> {
        let mut state = self.state.write().await;
        state.require_admin(caller, "pause")?;
        if state.paused {
            return Err(ReviewError::AlreadyPaused);
        }

        state.paused = true;
        self.events
            .record(ProtocolEvent::Paused {
                account: caller.clone(),
            })
            .await;
        info!(account = %caller, "protocol paused");
        Ok(())
    }

    /// Resume engine mutations
    pub async fn unpause(&self, caller: &Address) -> Result<()> {
        let mut state = self.state.write().await;
        state.require_admin(caller, "unpause")?;
        if !state.paused {
            return Err(ReviewError::NotPaused);
        }

        state.paused = false;
        self.events
            .record(ProtocolEvent::Unpaused {
                account: caller.clone(),
            })
            .await;
        info!(account = %caller, "protocol unpaused");
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn has_role(&self, role: Role, account: &Address) -> bool {
        self.state.read().await.has(role, account)
    }

    /// Members of a role, in grant order
    pub async fn members(&self, role: Role) -> Vec<Address> {
        let state = self.state.read().await;
        state.members.get(&role).cloned().unwrap_or_default()
    }

    pub async fn member_count(&self, role: Role) -> usize {
        self.state.read().await.count(role)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn grant(&self, caller: &Address, role: Role, account: &Address) -> Result<()> {
        let mut state = self.state.write().await;
        state.require_admin(caller, &format!("grant {}", role))?;
        if state.has(role, account) {
            debug!(role = %role, account = %account, "role already held");
            return Ok(());
        }

        state.members.entry(role).or_default().push(account.clone());
        self.events
            .record(ProtocolEvent::RoleGranted {
                role,
                account: account.clone(),
                sender: caller.clone(),
            })
            .await;
        info!(role = %role, account = %account, sender = %caller, "role granted");
        Ok(())
    }

    async fn revoke(&self, caller: &Address, role: Role, account: &Address) -> Result<()> {
        let mut state = self.state.write().await;
        state.require_admin(caller, &format!("revoke {}", role))?;
        if !state.has(role, account) {
            debug!(role = %role, account = %account, "role not held");
            return Ok(());
        }
        if role == Role::Admin && state.count(Role::Admin) == 1 {
            return Err(ReviewError::LastAdmin {
                account: account.clone(),
            });
        }

        if let Some(members) = state.members.get_mut(&role) {
            members.retain(|m| m != account);
        }
        self.events
            .record(ProtocolEvent::RoleRevoked {
                role,
                account: account.clone(),
                sender: caller.clone(),
            })
            .await;
        info!(role = %role, account = %account, sender = %caller, "role revoked");
        Ok(())
    }
}

#[async_trait::async_trait]
impl CapabilityCheck for RoleRegistry {
    async fn is_admin(&self, account: &Address) -> bool {
        self.has_role(Role::Admin, account).await
    }

    async fn is_issuer(&self, account: &Address) -> bool {
        self.has_role(Role::Issuer, account).await
    }

    async fn is_peer_reviewer(&self, account: &Address) -> bool {
        self.has_role(Role::PeerReviewer, account).await
    }

    async fn is_paused(&self) -> bool {
        self.state.read().await.paused
    }
}
