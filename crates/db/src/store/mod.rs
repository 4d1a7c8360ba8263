//! The record store seam.
//!
//! [`CharacterStore`] is the only way the engine reads or writes characters.
//! Implementations must serialize read-modify-write per character and apply
//! each update (including its history snapshot) all-or-nothing.

use async_trait::async_trait;
use gsbot_core::error::CoreError;
use gsbot_core::stats::ValidatedUpdate;
use gsbot_core::types::{DbId, Snowflake, Timestamp};

use crate::models::character::{Character, NewCharacter};
use crate::models::historical::Historical;

pub mod memory;
pub mod postgres;

pub use memory::MemoryCharacterStore;
pub use postgres::PgCharacterStore;

/// Failures surfaced by a [`CharacterStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Owner {owner_id} already has a primary character in group {group_id}")]
    DuplicatePrimary {
        owner_id: Snowflake,
        group_id: Snowflake,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The stored row plus the requested change would break a stat
    /// invariant. Nothing was written.
    #[error("Rejected: {0}")]
    Rejected(#[from] CoreError),
}

/// Persistent storage of characters and their history, scoped by group.
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Insert a character. Fails with [`StoreError::DuplicatePrimary`] if the
    /// owner already has a primary in the group, or [`StoreError::Rejected`]
    /// if its gear score does not fit.
    async fn insert(&self, input: &NewCharacter) -> Result<Character, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Character>, StoreError>;

    async fn find_primary_by_owner(
        &self,
        group_id: Snowflake,
        owner_id: Snowflake,
    ) -> Result<Option<Character>, StoreError>;

    /// First primary in the group whose display name contains `needle`
    /// (case-insensitive), in ascending id order.
    async fn find_primary_by_display_name(
        &self,
        group_id: Snowflake,
        needle: &str,
    ) -> Result<Option<Character>, StoreError>;

    async fn list_by_group(&self, group_id: Snowflake) -> Result<Vec<Character>, StoreError>;

    /// Snapshots for a character in insertion order.
    async fn list_history(&self, character_id: DbId) -> Result<Vec<Historical>, StoreError>;

    /// Apply `update` atomically and stamp `updated_at = now`.
    ///
    /// Returns `None` without writing if the character no longer exists, and
    /// [`StoreError::Rejected`] if the change cannot be applied to the
    /// stored stats.
    async fn apply_update(
        &self,
        id: DbId,
        update: &ValidatedUpdate,
        now: Timestamp,
    ) -> Result<Option<Character>, StoreError>;

    /// Delete one character and its history. Returns `false` if absent.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    /// Delete every character (and history) in a group, returning the count.
    async fn delete_by_group(&self, group_id: Snowflake) -> Result<u64, StoreError>;
}
