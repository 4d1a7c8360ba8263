//! Audit trail constants.
//!
//! Every successful mutation or deletion produces an audit entry carrying
//! the actor, the affected character and the operation. These names are the
//! `event_type` values on the event bus and the `action_type` column of
//! `audit_logs`.

/// Known audit action types.
pub mod action_types {
    pub const CHARACTER_UPDATED: &str = "character.updated";
    pub const CHARACTER_DELETED: &str = "character.deleted";
    pub const PURGE_REQUESTED: &str = "characters.purge_requested";
    pub const PURGE_CANCELLED: &str = "characters.purge_cancelled";
    pub const CHARACTERS_PURGED: &str = "characters.purged";
}

/// Operation names for deletions (updates use [`crate::stats::op_names`]).
pub mod op_names {
    pub const DELETE: &str = "delete";
    pub const DELETE_ALL: &str = "delete_all";
}

/// Whether an action type changes stored state and so must be persisted to
/// `audit_logs`. Prompts and cancellations are informational only.
pub fn is_persisted(action_type: &str) -> bool {
    matches!(
        action_type,
        action_types::CHARACTER_UPDATED
            | action_types::CHARACTER_DELETED
            | action_types::CHARACTERS_PURGED
    )
}
