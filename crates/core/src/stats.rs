//! Character stat mutations and historical snapshots.
//!
//! Pure functions only: the store layer runs [`apply`] inside its own
//! read-modify-write transaction so the derived fields and the snapshot are
//! committed together or not at all.
//!
//! Invariant maintained by every operation: `gear_score ==
//! accessory_attack_power + defense_power`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Entry type recorded on snapshots taken by a full update.
pub const ENTRY_TYPE_UPDATE: &str = "update";

/// Level progress is a percentage in `[0, PROGRESS_CEILING)`.
pub const PROGRESS_CEILING: f64 = 100.0;

/// Operation names, as used in audit entries and error context.
pub mod op_names {
    pub const SET_AP: &str = "set_ap";
    pub const SET_AAP: &str = "set_aap";
    pub const SET_DP: &str = "set_dp";
    pub const SET_LEVEL: &str = "set_level";
    pub const SET_PROGRESS: &str = "set_progress";
    pub const SET_PIC: &str = "set_pic";
    pub const SET_ALL: &str = "set_all";
}

// ---------------------------------------------------------------------------
// Stat block
// ---------------------------------------------------------------------------

/// The mutable stat block of a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub char_class: String,
    pub level: i32,
    pub level_progress: f64,
    pub attack_power: i32,
    pub accessory_attack_power: i32,
    pub defense_power: i32,
    pub gear_score: i32,
    pub gear_pic_url: Option<String>,
}

/// Derived gear score for a pair of stats. Fails if the sum does not fit.
pub fn gear_score(accessory_attack_power: i32, defense_power: i32) -> Result<i32, CoreError> {
    accessory_attack_power
        .checked_add(defense_power)
        .ok_or_else(|| CoreError::Validation("aap + dp overflows gear score".to_string()))
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// A requested change to a character's stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AttributeUpdate {
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
        url: String,
    },
    SetAll {
        level: i32,
        ap: i32,
        aap: i32,
        dp: i32,
        level_progress: f64,
    },
}

impl AttributeUpdate {
    /// Operation name for audit entries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetAp { .. } => op_names::SET_AP,
            Self::SetAap { .. } => op_names::SET_AAP,
            Self::SetDp { .. } => op_names::SET_DP,
            Self::SetLevel { .. } => op_names::SET_LEVEL,
            Self::SetProgress { .. } => op_names::SET_PROGRESS,
            Self::SetPic { .. } => op_names::SET_PIC,
            Self::SetAll { .. } => op_names::SET_ALL,
        }
    }

    /// Check parameter ranges, producing an update the store may apply.
    pub fn validate(self) -> Result<ValidatedUpdate, CoreError> {
        match &self {
            Self::SetAp { ap } => validate_stat("ap", *ap)?,
            Self::SetAap { aap } => validate_stat("aap", *aap)?,
            Self::SetDp { dp } => validate_stat("dp", *dp)?,
            Self::SetLevel { level } => validate_stat("level", *level)?,
            Self::SetProgress { percent } => validate_progress(*percent)?,
            Self::SetPic { url } => validate_pic_url(url)?,
            Self::SetAll {
                level,
                ap,
                aap,
                dp,
                level_progress,
            } => {
                validate_stat("level", *level)?;
                validate_stat("ap", *ap)?;
                validate_stat("aap", *aap)?;
                validate_stat("dp", *dp)?;
                validate_progress(*level_progress)?;
                gear_score(*aap, *dp)?;
            }
        }
        Ok(ValidatedUpdate(self))
    }
}

/// An [`AttributeUpdate`] whose parameters passed [`AttributeUpdate::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUpdate(AttributeUpdate);

impl ValidatedUpdate {
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn inner(&self) -> &AttributeUpdate {
        &self.0
    }
}

fn validate_stat(field: &str, value: i32) -> Result<(), CoreError> {
    if value < 0 {
        return Err(CoreError::Validation(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a level progress percentage lies in `[0, 100)`.
pub fn validate_progress(percent: f64) -> Result<(), CoreError> {
    if !percent.is_finite() || !(0.0..PROGRESS_CEILING).contains(&percent) {
        return Err(CoreError::Validation(format!(
            "level progress must be within [0, {PROGRESS_CEILING}), got {percent}"
        )));
    }
    Ok(())
}

/// Validate that a gear picture URL is an absolute http(s) URL.
pub fn validate_pic_url(url: &str) -> Result<(), CoreError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(CoreError::Validation(
            "gear pic url must not be empty".to_string(),
        ));
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(CoreError::Validation(format!(
            "gear pic url must be http(s), got '{url}'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Immutable copy of a character's combat stats at a point in time.
///
/// Level and progress are kept apart; see [`combined_level`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSnapshot {
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

impl StatSnapshot {
    /// Capture `stats` as they are right now.
    pub fn capture(stats: &CharacterStats, recorded_at: Timestamp) -> Self {
        Self {
            entry_type: ENTRY_TYPE_UPDATE.to_string(),
            char_class: stats.char_class.to_uppercase(),
            recorded_at,
            level: stats.level,
            level_progress: stats.level_progress,
            attack_power: stats.attack_power,
            accessory_attack_power: stats.accessory_attack_power,
            defense_power: stats.defense_power,
            gear_score: stats.gear_score,
        }
    }
}

/// Level and progress folded into one decimal: `level + progress / 100`.
///
/// Level 5 at 7% is `5.07` and at 70% is `5.7`, so the two never collide.
pub fn combined_level(level: i32, level_progress: f64) -> f64 {
    f64::from(level) + level_progress / PROGRESS_CEILING
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Result of applying an update to a stat block.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub stats: CharacterStats,
    /// Pre-update snapshot to append to history; only `set_all` produces one.
    pub snapshot: Option<StatSnapshot>,
}

/// Apply `update` to `current`, recomputing derived fields.
///
/// Fails with [`CoreError::Validation`] if a single-field `aap`/`dp` change
/// would push the gear score past `i32::MAX` given the other stored stat.
pub fn apply(
    current: &CharacterStats,
    update: &ValidatedUpdate,
    now: Timestamp,
) -> Result<UpdateOutcome, CoreError> {
    let mut stats = current.clone();
    let mut snapshot = None;

    match update.inner() {
        AttributeUpdate::SetAp { ap } => stats.attack_power = *ap,
        AttributeUpdate::SetAap { aap } => {
            stats.gear_score = gear_score(*aap, current.defense_power)?;
            stats.accessory_attack_power = *aap;
        }
        AttributeUpdate::SetDp { dp } => {
            stats.gear_score = gear_score(current.accessory_attack_power, *dp)?;
            stats.defense_power = *dp;
        }
        AttributeUpdate::SetLevel { level } => stats.level = *level,
        AttributeUpdate::SetProgress { percent } => stats.level_progress = *percent,
        AttributeUpdate::SetPic { url } => stats.gear_pic_url = Some(url.trim().to_string()),
        AttributeUpdate::SetAll {
            level,
            ap,
            aap,
            dp,
            level_progress,
        } => {
            stats.gear_score = gear_score(*aap, *dp)?;
            // Snapshot before overwrite.
            snapshot = Some(StatSnapshot::capture(current, now));
            stats.level = *level;
            stats.attack_power = *ap;
            stats.accessory_attack_power = *aap;
            stats.defense_power = *dp;
            stats.level_progress = *level_progress;
        }
    }

    Ok(UpdateOutcome { stats, snapshot })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn stats() -> CharacterStats {
        CharacterStats {
            char_class: "Sorceress".to_string(),
            level: 61,
            level_progress: 45.5,
            attack_power: 230,
            accessory_attack_power: 200,
            defense_power: 50,
            gear_score: 250,
            gear_pic_url: None,
        }
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn run(update: AttributeUpdate) -> UpdateOutcome {
        apply(&stats(), &update.validate().unwrap(), now()).unwrap()
    }

    #[test]
    fn set_dp_recomputes_gear_score_and_keeps_aap() {
        let out = run(AttributeUpdate::SetDp { dp: 70 });
        assert_eq!(out.stats.defense_power, 70);
        assert_eq!(out.stats.gear_score, 270);
        assert_eq!(out.stats.accessory_attack_power, 200);
        assert!(out.snapshot.is_none());
    }

    #[test]
    fn set_aap_recomputes_gear_score() {
        let out = run(AttributeUpdate::SetAap { aap: 210 });
        assert_eq!(out.stats.accessory_attack_power, 210);
        assert_eq!(out.stats.gear_score, 260);
    }

    #[test]
    fn set_ap_leaves_gear_score_alone() {
        let out = run(AttributeUpdate::SetAp { ap: 300 });
        assert_eq!(out.stats.attack_power, 300);
        assert_eq!(out.stats.gear_score, 250);
    }

    #[test]
    fn set_level_and_progress_touch_only_their_fields() {
        let out = run(AttributeUpdate::SetLevel { level: 62 });
        assert_eq!(out.stats.level, 62);
        assert_eq!(out.stats.level_progress, 45.5);

        let out = run(AttributeUpdate::SetProgress { percent: 3.25 });
        assert_eq!(out.stats.level, 61);
        assert_eq!(out.stats.level_progress, 3.25);
    }

    #[test]
    fn set_pic_stores_trimmed_url() {
        let out = run(AttributeUpdate::SetPic {
            url: " https://img.example/gear.png ".to_string(),
        });
        assert_eq!(
            out.stats.gear_pic_url.as_deref(),
            Some("https://img.example/gear.png")
        );
    }

    #[test]
    fn set_all_snapshots_previous_state_then_overwrites() {
        let out = run(AttributeUpdate::SetAll {
            level: 62,
            ap: 240,
            aap: 245,
            dp: 300,
            level_progress: 4.5,
        });

        let snap = out.snapshot.expect("set_all must snapshot");
        assert_eq!(snap.entry_type, ENTRY_TYPE_UPDATE);
        assert_eq!(snap.char_class, "SORCERESS");
        assert_eq!(snap.recorded_at, now());
        assert_eq!(snap.level, 61);
        assert_eq!(snap.level_progress, 45.5);
        assert_eq!(snap.attack_power, 230);
        assert_eq!(snap.accessory_attack_power, 200);
        assert_eq!(snap.defense_power, 50);
        assert_eq!(snap.gear_score, 250);

        assert_eq!(out.stats.level, 62);
        assert_eq!(out.stats.attack_power, 240);
        assert_eq!(out.stats.gear_score, 545);
        assert_eq!(out.stats.level_progress, 4.5);
        assert_eq!(out.stats.char_class, "Sorceress");
    }

    #[test]
    fn gear_score_invariant_holds_for_every_update() {
        let updates = [
            AttributeUpdate::SetAp { ap: 1 },
            AttributeUpdate::SetAap { aap: 7 },
            AttributeUpdate::SetDp { dp: 9 },
            AttributeUpdate::SetLevel { level: 1 },
            AttributeUpdate::SetProgress { percent: 99.9 },
            AttributeUpdate::SetAll {
                level: 1,
                ap: 2,
                aap: 3,
                dp: 4,
                level_progress: 0.0,
            },
        ];
        for update in updates {
            let out = run(update);
            assert_eq!(
                out.stats.gear_score,
                out.stats.accessory_attack_power + out.stats.defense_power
            );
        }
    }

    #[test]
    fn single_field_change_that_overflows_gear_score_is_rejected() {
        let err = apply(
            &stats(),
            &AttributeUpdate::SetAap { aap: i32::MAX }.validate().unwrap(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg.contains("gear score")));

        let mut current = stats();
        current.accessory_attack_power = i32::MAX - 10;
        current.defense_power = 0;
        current.gear_score = i32::MAX - 10;
        let err = apply(
            &current,
            &AttributeUpdate::SetDp { dp: 11 }.validate().unwrap(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let out = apply(
            &current,
            &AttributeUpdate::SetDp { dp: 10 }.validate().unwrap(),
            now(),
        )
        .unwrap();
        assert_eq!(out.stats.gear_score, i32::MAX);
    }

    #[test]
    fn negative_stats_rejected() {
        let err = AttributeUpdate::SetDp { dp: -1 }.validate().unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg.contains("dp")));
    }

    #[test]
    fn progress_must_be_below_one_hundred() {
        assert!(AttributeUpdate::SetProgress { percent: 100.0 }.validate().is_err());
        assert!(AttributeUpdate::SetProgress { percent: -0.1 }.validate().is_err());
        assert!(AttributeUpdate::SetProgress { percent: f64::NAN }.validate().is_err());
        assert!(AttributeUpdate::SetProgress { percent: 0.0 }.validate().is_ok());
        assert!(AttributeUpdate::SetProgress { percent: 99.99 }.validate().is_ok());
    }

    #[test]
    fn set_all_validates_every_field() {
        let bad = AttributeUpdate::SetAll {
            level: 60,
            ap: 200,
            aap: 200,
            dp: 200,
            level_progress: 150.0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn pic_url_must_be_http() {
        assert!(validate_pic_url("").is_err());
        assert!(validate_pic_url("ftp://x/y.png").is_err());
        assert!(validate_pic_url("http://x/y.png").is_ok());
    }

    #[test]
    fn combined_level_does_not_collide() {
        assert_ne!(combined_level(5, 7.0), combined_level(5, 70.0));
        assert!((combined_level(5, 70.0) - 5.7).abs() < 1e-9);
        assert!((combined_level(5, 7.0) - 5.07).abs() < 1e-9);
    }

    #[test]
    fn update_names_match_operations() {
        assert_eq!(AttributeUpdate::SetAp { ap: 0 }.name(), "set_ap");
        assert_eq!(
            AttributeUpdate::SetPic {
                url: String::new()
            }
            .name(),
            "set_pic"
        );
    }

    #[test]
    fn updates_deserialize_from_tagged_json() {
        let update: AttributeUpdate =
            serde_json::from_value(serde_json::json!({"op": "set_dp", "dp": 70})).unwrap();
        assert_eq!(update, AttributeUpdate::SetDp { dp: 70 });
    }
}
