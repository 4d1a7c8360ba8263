//! Normalized requests and their results.
//!
//! Front ends (chat commands, the HTTP API) parse whatever their users typed
//! into an [`Intent`]; the engine never sees raw text except confirmation
//! replies.

use gsbot_core::audit::op_names as audit_ops;
use gsbot_core::policy::Actor;
use gsbot_core::stats::{op_names, AttributeUpdate};
use gsbot_core::types::{Snowflake, Timestamp};
use gsbot_db::models::character::Character;
use gsbot_db::models::historical::Historical;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// What the actor wants done.
///
/// `SetPic` carries the raw image source; the engine uploads it and stores
/// the resulting URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    SetAp {
        ap: i32,
    },
    SetAap {
        aap: i32,
    },
    SetDp {
        dp: i32,
    },
    SetLevel {
        level: i32,
    },
    SetProgress {
        percent: f64,
    },
    SetPic {
        source: String,
    },
    SetAll {
        level: i32,
        ap: i32,
        aap: i32,
        dp: i32,
        level_progress: f64,
    },
    Delete,
    DeleteAll,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetAp { .. } => op_names::SET_AP,
            Self::SetAap { .. } => op_names::SET_AAP,
            Self::SetDp { .. } => op_names::SET_DP,
            Self::SetLevel { .. } => op_names::SET_LEVEL,
            Self::SetProgress { .. } => op_names::SET_PROGRESS,
            Self::SetPic { .. } => op_names::SET_PIC,
            Self::SetAll { .. } => op_names::SET_ALL,
            Self::Delete => audit_ops::DELETE,
            Self::DeleteAll => audit_ops::DELETE_ALL,
        }
    }

    /// The stat change this operation describes, if it is one that needs no
    /// upload. `SetPic`, `Delete` and `DeleteAll` return `None`.
    pub fn stat_update(&self) -> Option<AttributeUpdate> {
        let update = match *self {
            Self::SetAp { ap } => AttributeUpdate::SetAp { ap },
            Self::SetAap { aap } => AttributeUpdate::SetAap { aap },
            Self::SetDp { dp } => AttributeUpdate::SetDp { dp },
            Self::SetLevel { level } => AttributeUpdate::SetLevel { level },
            Self::SetProgress { percent } => AttributeUpdate::SetProgress { percent },
            Self::SetAll {
                level,
                ap,
                aap,
                dp,
                level_progress,
            } => AttributeUpdate::SetAll {
                level,
                ap,
                aap,
                dp,
                level_progress,
            },
            Self::SetPic { .. } | Self::Delete | Self::DeleteAll => return None,
        };
        Some(update)
    }
}

/// A fully parsed request from one member of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub actor: Actor,
    pub group_id: Snowflake,
    /// Display-name fragment of the target; empty means "my own character".
    /// Ignored by `DeleteAll`.
    pub target: String,
    pub operation: Operation,
    /// Request time; becomes `updated_at` and snapshot timestamps.
    pub now: Timestamp,
}

impl Intent {
    pub fn new(
        actor: Actor,
        group_id: Snowflake,
        target: impl Into<String>,
        operation: Operation,
        now: Timestamp,
    ) -> Self {
        Self {
            actor,
            group_id,
            target: target.into(),
            operation,
            now,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A character as it stands after an update, with its snapshot history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterView {
    pub character: Character,
    pub history: Vec<Historical>,
}

/// Names of a character removed by a single delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedCharacter {
    pub display_name: String,
    pub char_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletionReceipt {
    pub group_id: Snowflake,
    pub deleted: u64,
    /// Set for single deletes only.
    pub character: Option<DeletedCharacter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Updated(CharacterView),
    Deleted(DeletionReceipt),
}
