//! Routing of confirmation replies to waiting purges.
//!
//! A purge registers a wait for its group and then blocks on the returned
//! receiver. Front ends forward every candidate reply with
//! [`ConfirmationHub::deliver`]; the purge itself decides which replies
//! count (see `gsbot_core::confirmation::PurgeHandshake`).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use gsbot_core::types::{Snowflake, Timestamp};
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

/// A chat reply forwarded to a waiting purge.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub actor_id: Snowflake,
    pub text: String,
}

/// Whether a delivered reply reached a waiting purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    Delivered,
    NoPendingConfirmation,
}

struct PendingWait {
    ticket: u64,
    initiator: Snowflake,
    sender: mpsc::UnboundedSender<Reply>,
    opened_at: Timestamp,
}

/// A registered wait. Dropping the receiver abandons it; the next
/// [`ConfirmationHub::open`] for the group reclaims the slot.
pub struct PendingConfirmation {
    pub ticket: u64,
    pub receiver: mpsc::UnboundedReceiver<Reply>,
}

/// The group already has a live purge awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyPending {
    pub initiator: Snowflake,
    pub opened_at: Timestamp,
}

/// At most one pending purge per group.
pub struct ConfirmationHub {
    pending: RwLock<HashMap<Snowflake, PendingWait>>,
    next_ticket: AtomicU64,
}

impl ConfirmationHub {
    pub fn new() -> Self {
        Self {
            pending: RwLock::new(HashMap::new()),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Register a wait for `group_id`.
    pub async fn open(
        &self,
        group_id: Snowflake,
        initiator: Snowflake,
        now: Timestamp,
    ) -> Result<PendingConfirmation, AlreadyPending> {
        let mut pending = self.pending.write().await;
        if let Some(existing) = pending.get(&group_id) {
            if !existing.sender.is_closed() {
                return Err(AlreadyPending {
                    initiator: existing.initiator,
                    opened_at: existing.opened_at,
                });
            }
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        pending.insert(
            group_id,
            PendingWait {
                ticket,
                initiator,
                sender,
                opened_at: now,
            },
        );
        Ok(PendingConfirmation { ticket, receiver })
    }

    /// Forward a reply to the purge waiting in `group_id`, if any.
    pub async fn deliver(&self, group_id: Snowflake, actor_id: Snowflake, text: &str) -> Delivery {
        let pending = self.pending.read().await;
        let Some(wait) = pending.get(&group_id) else {
            return Delivery::NoPendingConfirmation;
        };
        let reply = Reply {
            actor_id,
            text: text.to_string(),
        };
        match wait.sender.send(reply) {
            Ok(()) => Delivery::Delivered,
            Err(_) => Delivery::NoPendingConfirmation,
        }
    }

    /// Remove the wait registered under `ticket`. A newer wait for the same
    /// group is left alone.
    pub async fn close(&self, group_id: Snowflake, ticket: u64) {
        let mut pending = self.pending.write().await;
        if pending.get(&group_id).is_some_and(|w| w.ticket == ticket) {
            pending.remove(&group_id);
        }
    }

    pub async fn is_pending(&self, group_id: Snowflake) -> bool {
        self.pending
            .read()
            .await
            .get(&group_id)
            .is_some_and(|w| !w.sender.is_closed())
    }
}

impl Default for ConfirmationHub {
    fn default() -> Self {
        Self::new()
    }
}
