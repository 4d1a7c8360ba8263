//! In-process [`CharacterStore`] for tests and database-less runs.
//!
//! All state sits behind one async mutex, so every read-modify-write is
//! serialized. Updates are computed on a copy and committed only once the
//! whole change (row plus snapshot) is ready.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use gsbot_core::stats::{self, ValidatedUpdate};
use gsbot_core::types::{DbId, Snowflake, Timestamp};
use tokio::sync::Mutex;

use crate::models::character::{Character, NewCharacter};
use crate::models::historical::Historical;
use crate::store::{CharacterStore, StoreError};

#[derive(Default)]
struct MemoryState {
    next_character_id: DbId,
    next_historical_id: DbId,
    /// Keyed by id, so iteration order is insertion order.
    characters: BTreeMap<DbId, Character>,
    history: BTreeMap<DbId, Vec<Historical>>,
}

/// Memory-backed store.
#[derive(Default)]
pub struct MemoryCharacterStore {
    state: Mutex<MemoryState>,
    fail_writes: AtomicBool,
}

impl MemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail at commit time with
    /// [`StoreError::Unavailable`]. Reads keep working.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is rejecting writes".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_primary_in(character: &Character, group_id: Snowflake) -> bool {
    character.group_id == group_id && character.is_primary
}

#[async_trait]
impl CharacterStore for MemoryCharacterStore {
    async fn insert(&self, input: &NewCharacter) -> Result<Character, StoreError> {
        let gear_score = input.gear_score()?;
        let mut state = self.state.lock().await;
        let is_primary = input.is_primary.unwrap_or(true);

        if is_primary
            && state
                .characters
                .values()
                .any(|c| is_primary_in(c, input.group_id) && c.owner_id == input.owner_id)
        {
            return Err(StoreError::DuplicatePrimary {
                owner_id: input.owner_id,
                group_id: input.group_id,
            });
        }
        self.check_writable()?;

        state.next_character_id += 1;
        let now = Utc::now();
        let character = Character {
            id: state.next_character_id,
            owner_id: input.owner_id,
            group_id: input.group_id,
            display_name: input.display_name.clone(),
            char_name: input.char_name.clone(),
            char_class: input.char_class.clone(),
            level: input.level,
            level_progress: input.level_progress,
            attack_power: input.attack_power,
            accessory_attack_power: input.accessory_attack_power,
            defense_power: input.defense_power,
            gear_score,
            gear_pic_url: input.gear_pic_url.clone(),
            is_primary,
            created_at: now,
            updated_at: now,
        };
        state.characters.insert(character.id, character.clone());
        Ok(character)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Character>, StoreError> {
        Ok(self.state.lock().await.characters.get(&id).cloned())
    }

    async fn find_primary_by_owner(
        &self,
        group_id: Snowflake,
        owner_id: Snowflake,
    ) -> Result<Option<Character>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .characters
            .values()
            .find(|c| is_primary_in(c, group_id) && c.owner_id == owner_id)
            .cloned())
    }

    async fn find_primary_by_display_name(
        &self,
        group_id: Snowflake,
        needle: &str,
    ) -> Result<Option<Character>, StoreError> {
        let needle = needle.to_lowercase();
        let state = self.state.lock().await;
        Ok(state
            .characters
            .values()
            .find(|c| {
                is_primary_in(c, group_id) && c.display_name.to_lowercase().contains(&needle)
            })
            .cloned())
    }

    async fn list_by_group(&self, group_id: Snowflake) -> Result<Vec<Character>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .characters
            .values()
            .filter(|c| c.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn list_history(&self, character_id: DbId) -> Result<Vec<Historical>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.history.get(&character_id).cloned().unwrap_or_default())
    }

    async fn apply_update(
        &self,
        id: DbId,
        update: &ValidatedUpdate,
        now: Timestamp,
    ) -> Result<Option<Character>, StoreError> {
        let mut state = self.state.lock().await;
        let Some(current) = state.characters.get(&id).cloned() else {
            return Ok(None);
        };

        let outcome = stats::apply(&current.stats(), update, now)?;
        let mut updated = current;
        updated.set_stats(outcome.stats, now);

        // Commit point: nothing above has touched stored state.
        self.check_writable()?;

        if let Some(snapshot) = outcome.snapshot {
            state.next_historical_id += 1;
            let historical = Historical {
                id: state.next_historical_id,
                character_id: id,
                entry_type: snapshot.entry_type,
                char_class: snapshot.char_class,
                recorded_at: snapshot.recorded_at,
                level: snapshot.level,
                level_progress: snapshot.level_progress,
                attack_power: snapshot.attack_power,
                accessory_attack_power: snapshot.accessory_attack_power,
                defense_power: snapshot.defense_power,
                gear_score: snapshot.gear_score,
            };
            state.history.entry(id).or_default().push(historical);
        }
        state.characters.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if !state.characters.contains_key(&id) {
            return Ok(false);
        }
        self.check_writable()?;
        state.characters.remove(&id);
        state.history.remove(&id);
        Ok(true)
    }

    async fn delete_by_group(&self, group_id: Snowflake) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        self.check_writable()?;
        let ids: Vec<DbId> = state
            .characters
            .values()
            .filter(|c| c.group_id == group_id)
            .map(|c| c.id)
            .collect();
        for id in &ids {
            state.characters.remove(id);
            state.history.remove(id);
        }
        Ok(ids.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
