//! Historical snapshot model.

use gsbot_core::stats;
use gsbot_core::types::{DbId, Timestamp};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use sqlx::FromRow;

/// A row from the `historicals` table. Never updated after insert.
///
/// Serializes with an extra derived `combined_level` field.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Historical {
    pub id: DbId,
    pub character_id: DbId,
    pub entry_type: String,
    pub char_class: String,
    pub recorded_at: Timestamp,
    pub level: i32,
    pub level_progress: f64,
    pub attack_power: i32,
    pub accessory_attack_power: i32,
    pub defense_power: i32,
    pub gear_score: i32,
}

impl Historical {
    /// `level + progress / 100`, e.g. `61.455` for level 61 at 45.5%.
    pub fn combined_level(&self) -> f64 {
        stats::combined_level(self.level, self.level_progress)
    }
}

impl Serialize for Historical {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_struct("Historical", 12)?;
        row.serialize_field("id", &self.id)?;
        row.serialize_field("character_id", &self.character_id)?;
        row.serialize_field("entry_type", &self.entry_type)?;
        row.serialize_field("char_class", &self.char_class)?;
        row.serialize_field("recorded_at", &self.recorded_at)?;
        row.serialize_field("level", &self.level)?;
        row.serialize_field("level_progress", &self.level_progress)?;
        row.serialize_field("combined_level", &self.combined_level())?;
        row.serialize_field("attack_power", &self.attack_power)?;
        row.serialize_field("accessory_attack_power", &self.accessory_attack_power)?;
        row.serialize_field("defense_power", &self.defense_power)?;
        row.serialize_field("gear_score", &self.gear_score)?;
        row.end()
    }
}
