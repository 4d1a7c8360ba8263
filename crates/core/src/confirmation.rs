//! Confirmation handshake for purging every character in a group.
//!
//! The purge is irreversible, so it is gated on an explicit reply from the
//! officer who requested it. The handshake is a small state machine:
//!
//! ```text
//! AwaitingConfirmation --"Yes" from initiator--> Confirmed --deleted--> Completed
//!          |--any other reply from initiator--> MismatchedReply
//!          '--deadline----------------------> TimedOut
//! ```
//!
//! Replies from anyone other than the initiator are ignored. `TimedOut` and
//! `MismatchedReply` are terminal and delete nothing.

use crate::error::CoreError;
use crate::types::Snowflake;

/// The only reply that confirms a purge. Compared case-sensitively.
pub const CONFIRM_TOKEN: &str = "Yes";

/// Default confirmation window.
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// States and signals
// ---------------------------------------------------------------------------

/// Where a purge handshake currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeState {
    AwaitingConfirmation,
    Confirmed,
    Completed { deleted: u64 },
    TimedOut,
    MismatchedReply { reply: String },
}

impl PurgeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Confirmed => "confirmed",
            Self::Completed { .. } => "completed",
            Self::TimedOut => "timed_out",
            Self::MismatchedReply { .. } => "mismatched_reply",
        }
    }

    /// Terminal states accept no further signals.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::TimedOut | Self::MismatchedReply { .. }
        )
    }

    /// Terminal states in which nothing was deleted.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::TimedOut | Self::MismatchedReply { .. })
    }
}

/// Inputs that drive a purge handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeSignal {
    /// A chat reply observed while waiting.
    Reply { actor_id: Snowflake, text: String },
    /// The confirmation window elapsed.
    Deadline,
    /// The confirmed deletion finished.
    Deleted { count: u64 },
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// A single purge handshake for one group.
#[derive(Debug, Clone)]
pub struct PurgeHandshake {
    group_id: Snowflake,
    initiator: Snowflake,
    state: PurgeState,
}

impl PurgeHandshake {
    /// Start a handshake in `AwaitingConfirmation`.
    pub fn begin(group_id: Snowflake, initiator: Snowflake) -> Self {
        Self {
            group_id,
            initiator,
            state: PurgeState::AwaitingConfirmation,
        }
    }

    pub fn group_id(&self) -> Snowflake {
        self.group_id
    }

    pub fn initiator(&self) -> Snowflake {
        self.initiator
    }

    pub fn state(&self) -> &PurgeState {
        &self.state
    }

    /// Feed a signal into the machine and return the resulting state.
    ///
    /// Signals that make no sense in the current state (a reply after the
    /// handshake finished, a deletion count before confirmation) are
    /// rejected without changing state.
    pub fn advance(&mut self, signal: PurgeSignal) -> Result<&PurgeState, CoreError> {
        let next = match (&self.state, signal) {
            (PurgeState::AwaitingConfirmation, PurgeSignal::Reply { actor_id, .. })
                if actor_id != self.initiator =>
            {
                PurgeState::AwaitingConfirmation
            }
            (PurgeState::AwaitingConfirmation, PurgeSignal::Reply { text, .. }) => {
                if text == CONFIRM_TOKEN {
                    PurgeState::Confirmed
                } else {
                    PurgeState::MismatchedReply { reply: text }
                }
            }
            (PurgeState::AwaitingConfirmation, PurgeSignal::Deadline) => PurgeState::TimedOut,
            (PurgeState::Confirmed, PurgeSignal::Deleted { count }) => {
                PurgeState::Completed { deleted: count }
            }
            (state, signal) => {
                return Err(CoreError::Internal(format!(
                    "purge handshake for group {} cannot accept {signal:?} while {}",
                    self.group_id,
                    state.as_str()
                )));
            }
        };
        self.state = next;
        Ok(&self.state)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
