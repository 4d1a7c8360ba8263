//! Repository for the `historicals` table (append-only).

use gsbot_core::stats::StatSnapshot;
use gsbot_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::historical::Historical;

const COLUMNS: &str = "id, character_id, entry_type, char_class, recorded_at, level, \
     level_progress, attack_power, accessory_attack_power, defense_power, gear_score";

/// Append and list stat snapshots. Rows are never updated.
pub struct HistoricalRepo;

impl HistoricalRepo {
    /// Append a snapshot for a character.
    ///
    /// Takes a connection rather than the pool so it can join the caller's
    /// transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        character_id: DbId,
        snapshot: &StatSnapshot,
    ) -> Result<Historical, sqlx::Error> {
        let query = format!(
            "INSERT INTO historicals (character_id, entry_type, char_class, recorded_at, level,
                level_progress, attack_power, accessory_attack_power, defense_power, gear_score)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Historical>(&query)
            .bind(character_id)
            .bind(&snapshot.entry_type)
            .bind(&snapshot.char_class)
            .bind(snapshot.recorded_at)
            .bind(snapshot.level)
            .bind(snapshot.level_progress)
            .bind(snapshot.attack_power)
            .bind(snapshot.accessory_attack_power)
            .bind(snapshot.defense_power)
            .bind(snapshot.gear_score)
            .fetch_one(conn)
            .await
    }

    /// List a character's snapshots in insertion order.
    pub async fn list_by_character(
        pool: &PgPool,
        character_id: DbId,
    ) -> Result<Vec<Historical>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM historicals
             WHERE character_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Historical>(&query)
            .bind(character_id)
            .fetch_all(pool)
            .await
    }
}
