//! [`CharacterStore`] backed by PostgreSQL.

use async_trait::async_trait;
use gsbot_core::stats::ValidatedUpdate;
use gsbot_core::types::{DbId, Snowflake, Timestamp};

use crate::models::character::{Character, NewCharacter};
use crate::models::historical::Historical;
use crate::repositories::{CharacterRepo, HistoricalRepo};
use crate::store::{CharacterStore, StoreError};
use crate::DbPool;

/// Name of the partial unique index enforcing one primary per owner/group.
const PRIMARY_CONSTRAINT: &str = "uq_characters_primary_owner_group";

/// Postgres store. Row locks (`SELECT ... FOR UPDATE`) serialize concurrent
/// updates to the same character.
#[derive(Clone)]
pub struct PgCharacterStore {
    pool: DbPool,
}

impl PgCharacterStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a unique violation on the primary index to a typed error.
fn classify_insert_error(err: sqlx::Error, input: &NewCharacter) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        // PostgreSQL unique constraint violation: error code 23505
        if db_err.code().as_deref() == Some("23505")
            && db_err.constraint() == Some(PRIMARY_CONSTRAINT)
        {
            tracing::debug!(
                owner_id = input.owner_id,
                group_id = input.group_id,
                "Rejected second primary character"
            );
            return StoreError::DuplicatePrimary {
                owner_id: input.owner_id,
                group_id: input.group_id,
            };
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl CharacterStore for PgCharacterStore {
    async fn insert(&self, input: &NewCharacter) -> Result<Character, StoreError> {
        let gear_score = input.gear_score()?;
        CharacterRepo::create(&self.pool, input, gear_score)
            .await
            .map_err(|e| classify_insert_error(e, input))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Character>, StoreError> {
        Ok(CharacterRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_primary_by_owner(
        &self,
        group_id: Snowflake,
        owner_id: Snowflake,
    ) -> Result<Option<Character>, StoreError> {
        Ok(CharacterRepo::find_primary_by_owner(&self.pool, group_id, owner_id).await?)
    }

    async fn find_primary_by_display_name(
        &self,
        group_id: Snowflake,
        needle: &str,
    ) -> Result<Option<Character>, StoreError> {
        Ok(CharacterRepo::find_primary_by_display_name(&self.pool, group_id, needle).await?)
    }

    async fn list_by_group(&self, group_id: Snowflake) -> Result<Vec<Character>, StoreError> {
        Ok(CharacterRepo::list_by_group(&self.pool, group_id).await?)
    }

    async fn list_history(&self, character_id: DbId) -> Result<Vec<Historical>, StoreError> {
        Ok(HistoricalRepo::list_by_character(&self.pool, character_id).await?)
    }

    async fn apply_update(
        &self,
        id: DbId,
        update: &ValidatedUpdate,
        now: Timestamp,
    ) -> Result<Option<Character>, StoreError> {
        CharacterRepo::apply_update(&self.pool, id, update, now).await
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(CharacterRepo::delete(&self.pool, id).await?)
    }

    async fn delete_by_group(&self, group_id: Snowflake) -> Result<u64, StoreError> {
        Ok(CharacterRepo::delete_by_group(&self.pool, group_id).await?)
    }
}
