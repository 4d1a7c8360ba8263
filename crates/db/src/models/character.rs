//! Character entity model and DTOs.

use gsbot_core::error::CoreError;
use gsbot_core::stats::{self, CharacterStats};
use gsbot_core::types::{DbId, Snowflake, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A character row from the `characters` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub owner_id: Snowflake,
    pub group_id: Snowflake,
    /// Family name; the handle officers use to target a member.
    pub display_name: String,
    pub char_name: String,
    pub char_class: String,
    pub level: i32,
    pub level_progress: f64,
    pub attack_power: i32,
    pub accessory_attack_power: i32,
    pub defense_power: i32,
    /// Always `accessory_attack_power + defense_power`.
    pub gear_score: i32,
    pub gear_pic_url: Option<String>,
    pub is_primary: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Character {
    /// The mutable stat block of this character.
    pub fn stats(&self) -> CharacterStats {
        CharacterStats {
            char_class: self.char_class.clone(),
            level: self.level,
            level_progress: self.level_progress,
            attack_power: self.attack_power,
            accessory_attack_power: self.accessory_attack_power,
            defense_power: self.defense_power,
            gear_score: self.gear_score,
            gear_pic_url: self.gear_pic_url.clone(),
        }
    }

    /// Overwrite the stat block and stamp `updated_at`.
    pub fn set_stats(&mut self, stats: CharacterStats, now: Timestamp) {
        self.char_class = stats.char_class;
        self.level = stats.level;
        self.level_progress = stats.level_progress;
        self.attack_power = stats.attack_power;
        self.accessory_attack_power = stats.accessory_attack_power;
        self.defense_power = stats.defense_power;
        self.gear_score = stats.gear_score;
        self.gear_pic_url = stats.gear_pic_url;
        self.updated_at = now;
    }
}

/// DTO for creating a new character.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCharacter {
    pub owner_id: Snowflake,
    pub group_id: Snowflake,
    pub display_name: String,
    pub char_name: String,
    pub char_class: String,
    pub level: i32,
    pub level_progress: f64,
    pub attack_power: i32,
    pub accessory_attack_power: i32,
    pub defense_power: i32,
    pub gear_pic_url: Option<String>,
    /// Defaults to `true` if omitted.
    pub is_primary: Option<bool>,
}

impl NewCharacter {
    /// Gear score the inserted row will carry.
    pub fn gear_score(&self) -> Result<i32, CoreError> {
        stats::gear_score(self.accessory_attack_power, self.defense_power)
    }
}
