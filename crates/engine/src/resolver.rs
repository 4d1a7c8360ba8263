//! Target resolution: turn a selector into exactly one character.

use gsbot_core::policy::Actor;
use gsbot_core::types::Snowflake;
use gsbot_db::models::character::Character;
use gsbot_db::{CharacterStore, StoreError};

/// The resolved target and whether the actor owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub character: Character,
    pub is_self: bool,
}

/// Resolve `selector` to a primary character in `group_id`.
///
/// An empty (or all-whitespace) selector means the actor's own primary
/// character. Otherwise the first primary whose display name contains the
/// selector, case-insensitively, wins. `is_self` is true whenever the
/// resolved character belongs to the actor, however it was selected.
pub async fn resolve(
    store: &dyn CharacterStore,
    actor: &Actor,
    group_id: Snowflake,
    selector: &str,
) -> Result<Option<Resolution>, StoreError> {
    let selector = selector.trim();
    let found = if selector.is_empty() {
        store.find_primary_by_owner(group_id, actor.user_id).await?
    } else {
        store.find_primary_by_display_name(group_id, selector).await?
    };

    Ok(found.map(|character| Resolution {
        is_self: actor.owns(character.owner_id),
        character,
    }))
}

#[cfg(test)]
mod tests {
    use gsbot_db::models::character::NewCharacter;
    use gsbot_db::MemoryCharacterStore;

    use super::*;

    fn new_character(owner_id: Snowflake, name: &str) -> NewCharacter {
        NewCharacter {
            owner_id,
            group_id: 10,
            display_name: name.to_string(),
            char_name: format!("{name}Char"),
            char_class: "Sorceress".to_string(),
            level: 60,
            level_progress: 0.0,
            attack_power: 100,
            accessory_attack_power: 100,
            defense_power: 100,
            gear_pic_url: None,
            is_primary: None,
        }
    }

    #[tokio::test]
    async fn empty_selector_resolves_own_character() {
        let store = MemoryCharacterStore::new();
        store.insert(&new_character(7, "Moonlit")).await.unwrap();

        let r = resolve(&store, &Actor::member(7), 10, "  ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(r.character.display_name, "Moonlit");
        assert!(r.is_self);
    }

    #[tokio::test]
    async fn naming_own_character_still_counts_as_self() {
        let store = MemoryCharacterStore::new();
        store.insert(&new_character(7, "Moonlit")).await.unwrap();

        let r = resolve(&store, &Actor::member(7), 10, "moonlit")
            .await
            .unwrap()
            .unwrap();
        assert!(r.is_self);

        let r = resolve(&store, &Actor::member(8), 10, "moon")
            .await
            .unwrap()
            .unwrap();
        assert!(!r.is_self);
    }

    #[tokio::test]
    async fn missing_target_resolves_to_none() {
        let store = MemoryCharacterStore::new();
        assert!(resolve(&store, &Actor::member(7), 10, "")
            .await
            .unwrap()
            .is_none());
        assert!(resolve(&store, &Actor::member(7), 10, "ghost")
            .await
            .unwrap()
            .is_none());
    }
}
