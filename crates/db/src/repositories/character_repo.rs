//! Repository for the `characters` table.

use gsbot_core::stats::{self, ValidatedUpdate};
use gsbot_core::types::{DbId, Snowflake, Timestamp};
use sqlx::PgPool;

use crate::models::character::{Character, NewCharacter};
use crate::repositories::HistoricalRepo;
use crate::store::StoreError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, group_id, display_name, char_name, char_class, level, \
     level_progress, attack_power, accessory_attack_power, defense_power, gear_score, \
     gear_pic_url, is_primary, created_at, updated_at";

/// Provides CRUD operations for characters plus the locked stat update.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character, returning the created row.
    ///
    /// `gear_score` is derived from the inserted stats by the caller. If
    /// `is_primary` is `None`, the character becomes the owner's primary.
    pub async fn create(
        pool: &PgPool,
        input: &NewCharacter,
        gear_score: i32,
    ) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (owner_id, group_id, display_name, char_name, char_class,
                level, level_progress, attack_power, accessory_attack_power, defense_power,
                gear_score, gear_pic_url, is_primary)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, COALESCE($13, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(input.owner_id)
            .bind(input.group_id)
            .bind(&input.display_name)
            .bind(&input.char_name)
            .bind(&input.char_class)
            .bind(input.level)
            .bind(input.level_progress)
            .bind(input.attack_power)
            .bind(input.accessory_attack_power)
            .bind(input.defense_power)
            .bind(gear_score)
            .bind(&input.gear_pic_url)
            .bind(input.is_primary)
            .fetch_one(pool)
            .await
    }

    /// Find a character by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an owner's primary character within a group.
    pub async fn find_primary_by_owner(
        pool: &PgPool,
        group_id: Snowflake,
        owner_id: Snowflake,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE group_id = $1 AND owner_id = $2 AND is_primary
             LIMIT 1"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(group_id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the first primary character in a group whose display name
    /// contains `needle`, ignoring case. Ties resolve by ascending `id`.
    ///
    /// Uses `strpos` rather than `ILIKE` so `%` and `_` in the needle match
    /// literally.
    pub async fn find_primary_by_display_name(
        pool: &PgPool,
        group_id: Snowflake,
        needle: &str,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE group_id = $1 AND is_primary
               AND strpos(lower(display_name), lower($2)) > 0
             ORDER BY id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(group_id)
            .bind(needle)
            .fetch_optional(pool)
            .await
    }

    /// List all characters in a group, ordered by id ascending.
    pub async fn list_by_group(
        pool: &PgPool,
        group_id: Snowflake,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE group_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a stat update under a row lock.
    ///
    /// The row is read with `SELECT ... FOR UPDATE`, the new stats are
    /// computed, any pre-update snapshot is appended to `historicals`, and the
    /// row is rewritten, all in one transaction. Returns `None` (and writes
    /// nothing) if no row with the given `id` exists.
    pub async fn apply_update(
        pool: &PgPool,
        id: DbId,
        update: &ValidatedUpdate,
        now: Timestamp,
    ) -> Result<Option<Character>, StoreError> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM characters WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Character>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        // Dropping the transaction on rejection releases the row lock.
        let outcome = stats::apply(&current.stats(), update, now)?;

        if let Some(snapshot) = &outcome.snapshot {
            HistoricalRepo::insert(&mut *tx, id, snapshot).await?;
        }

        let query = format!(
            "UPDATE characters SET
                level = $2,
                level_progress = $3,
                attack_power = $4,
                accessory_attack_power = $5,
                defense_power = $6,
                gear_score = $7,
                gear_pic_url = $8,
                updated_at = $9
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(outcome.stats.level)
            .bind(outcome.stats.level_progress)
            .bind(outcome.stats.attack_power)
            .bind(outcome.stats.accessory_attack_power)
            .bind(outcome.stats.defense_power)
            .bind(outcome.stats.gear_score)
            .bind(&outcome.stats.gear_pic_url)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Permanently delete a character by ID. Historical rows cascade.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every character in a group. Returns the number removed.
    pub async fn delete_by_group(pool: &PgPool, group_id: Snowflake) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM characters WHERE group_id = $1")
            .bind(group_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
