//! Authorization policy for character mutations.
//!
//! A single rule governs every mutating and destructive operation: an actor
//! may always act on their own record, and only officers may act on anyone
//! else's. Role membership is resolved by the caller into the typed
//! [`Actor::is_officer`] flag before a request reaches the core.

use serde::{Deserialize, Serialize};

use crate::types::Snowflake;

/// The member issuing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Snowflake,
    pub is_officer: bool,
}

impl Actor {
    pub fn member(user_id: Snowflake) -> Self {
        Self {
            user_id,
            is_officer: false,
        }
    }

    pub fn officer(user_id: Snowflake) -> Self {
        Self {
            user_id,
            is_officer: true,
        }
    }

    /// Whether this actor owns a record belonging to `owner_id`.
    pub fn owns(&self, owner_id: Snowflake) -> bool {
        self.user_id == owner_id
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `actor` may act on a record.
///
/// `is_self` is true when the target record belongs to the actor.
pub fn authorize(actor: &Actor, is_self: bool) -> Decision {
    if is_self || actor.is_officer {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Decide whether `actor` may bulk-delete a whole group.
///
/// Bulk deletion is never a self-action, so it always requires the officer
/// capability regardless of whose records are affected.
pub fn authorize_bulk(actor: &Actor) -> Decision {
    authorize(actor, false)
}
