//! Single deletes and the confirmed group purge.
//!
//! Purge tests run on a paused clock so the confirmation window elapses
//! instantly once every task is idle.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::*;
use gsbot_core::policy::Actor;
use gsbot_db::CharacterStore;
use gsbot_engine::confirm::Delivery;
use gsbot_engine::{DeletionReceipt, Engine, HandleError, Operation, Outcome};
use gsbot_events::RosterEvent;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_three(h: &Harness) {
    seed(&h.store, 1, "Alpha").await;
    seed(&h.store, 2, "Bravo").await;
    seed(&h.store, 3, "Charlie").await;
}

/// Start a purge in the background and wait until it is prompting.
async fn start_purge(
    engine: &Arc<Engine>,
    events: &mut broadcast::Receiver<RosterEvent>,
    actor: Actor,
) -> JoinHandle<Result<Outcome, gsbot_engine::HandleError>> {
    let engine = Arc::clone(engine);
    let task = tokio::spawn(async move {
        engine
            .handle(intent(actor, "", Operation::DeleteAll))
            .await
    });
    loop {
        let event = events.recv().await.unwrap();
        if event.event_type == "characters.purge_requested" {
            assert_eq!(event.payload["confirm_token"], "Yes");
            assert_eq!(event.payload["timeout_secs"], 10);
            return task;
        }
    }
}

fn expect_deleted(result: Result<Outcome, HandleError>) -> DeletionReceipt {
    match result {
        Ok(Outcome::Deleted(receipt)) => receipt,
        other => panic!("expected a deletion, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: "Yes" purges, "yes" does not
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_purge_confirmed_then_wrong_case_cancels() {
    let h = harness();
    let mut events = h.bus.subscribe();
    seed_three(&h).await;

    let task = start_purge(&h.engine, &mut events, Actor::officer(9)).await;
    assert_eq!(
        h.engine.deliver_confirmation(GROUP, 9, "Yes").await,
        Delivery::Delivered
    );
    let receipt = expect_deleted(task.await.unwrap());
    assert_eq!(receipt.deleted, 3);
    assert_eq!(receipt.group_id, GROUP);
    assert!(h.store.list_by_group(GROUP).await.unwrap().is_empty());

    seed_three(&h).await;
    let task = start_purge(&h.engine, &mut events, Actor::officer(9)).await;
    h.engine.deliver_confirmation(GROUP, 9, "yes").await;
    let err = task.await.unwrap().unwrap_err();
    assert_matches!(err, HandleError::Cancelled { actor_id: 9, ref reply, .. } if reply == "yes");
    assert_eq!(h.store.list_by_group(GROUP).await.unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Test: silence and foreign replies
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_purge_times_out_without_reply() {
    let h = harness();
    let mut events = h.bus.subscribe();
    seed_three(&h).await;

    let task = start_purge(&h.engine, &mut events, Actor::officer(9)).await;
    let err = task.await.unwrap().unwrap_err();
    assert_matches!(err, HandleError::Timeout { actor_id: 9, group_id: GROUP });
    assert_eq!(h.store.list_by_group(GROUP).await.unwrap().len(), 3);

    // The window is closed; late replies go nowhere.
    assert_eq!(
        h.engine.deliver_confirmation(GROUP, 9, "Yes").await,
        Delivery::NoPendingConfirmation
    );
}

#[tokio::test(start_paused = true)]
async fn test_other_members_cannot_confirm() {
    let h = harness();
    let mut events = h.bus.subscribe();
    seed_three(&h).await;

    let task = start_purge(&h.engine, &mut events, Actor::officer(9)).await;
    h.engine.deliver_confirmation(GROUP, 1, "Yes").await;
    h.engine.deliver_confirmation(GROUP, 2, "Yes").await;

    let err = task.await.unwrap().unwrap_err();
    assert_matches!(err, HandleError::Timeout { .. });
    assert_eq!(h.store.list_by_group(GROUP).await.unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_foreign_reply_then_initiator_confirms() {
    let h = harness();
    let mut events = h.bus.subscribe();
    seed_three(&h).await;

    let task = start_purge(&h.engine, &mut events, Actor::officer(9)).await;
    h.engine.deliver_confirmation(GROUP, 1, "no").await;
    h.engine.deliver_confirmation(GROUP, 9, "Yes").await;

    assert_eq!(expect_deleted(task.await.unwrap()).deleted, 3);
}

// ---------------------------------------------------------------------------
// Test: a pending purge does not block other actors
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_member_updates_while_purge_awaits_confirmation() {
    let h = harness();
    let mut events = h.bus.subscribe();
    seed_three(&h).await;

    let task = start_purge(&h.engine, &mut events, Actor::officer(9)).await;
    let view = expect_updated(
        h.engine
            .handle(intent(Actor::member(2), "", Operation::SetAp { ap: 999 }))
            .await,
    );
    assert_eq!(view.character.display_name, "Bravo");
    assert_eq!(view.character.attack_power, 999);
    assert!(!task.is_finished());

    h.engine.deliver_confirmation(GROUP, 9, "Yes").await;
    assert_eq!(expect_deleted(task.await.unwrap()).deleted, 3);
}

#[tokio::test(start_paused = true)]
async fn test_update_made_during_purge_window_survives_timeout() {
    let h = harness();
    let mut events = h.bus.subscribe();
    seed_three(&h).await;

    let task = start_purge(&h.engine, &mut events, Actor::officer(9)).await;
    expect_updated(
        h.engine
            .handle(intent(Actor::member(2), "", Operation::SetAp { ap: 999 }))
            .await,
    );

    let err = task.await.unwrap().unwrap_err();
    assert_matches!(err, HandleError::Timeout { .. });
    let bravo = h
        .store
        .find_primary_by_owner(GROUP, 2)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bravo.attack_power, 999);
    assert_eq!(h.store.list_by_group(GROUP).await.unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// Test: purge guards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_members_cannot_purge() {
    let h = harness();
    seed_three(&h).await;

    let err = h
        .engine
        .handle(intent(Actor::member(1), "", Operation::DeleteAll))
        .await
        .unwrap_err();
    assert_matches!(err, HandleError::Unauthorized { operation: "delete_all", .. });
    assert_eq!(h.store.list_by_group(GROUP).await.unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_second_purge_in_same_group_conflicts() {
    let h = harness();
    let mut events = h.bus.subscribe();
    seed_three(&h).await;

    let first = start_purge(&h.engine, &mut events, Actor::officer(9)).await;
    let err = h
        .engine
        .handle(intent(Actor::officer(8), "", Operation::DeleteAll))
        .await
        .unwrap_err();
    assert_matches!(err, HandleError::Conflict { .. });

    h.engine.deliver_confirmation(GROUP, 9, "Yes").await;
    assert_eq!(expect_deleted(first.await.unwrap()).deleted, 3);
}

#[tokio::test(start_paused = true)]
async fn test_purge_store_failure_is_reported() {
    let h = harness();
    let mut events = h.bus.subscribe();
    seed_three(&h).await;
    h.store.set_fail_writes(true);

    let task = start_purge(&h.engine, &mut events, Actor::officer(9)).await;
    h.engine.deliver_confirmation(GROUP, 9, "Yes").await;
    let err = task.await.unwrap().unwrap_err();
    assert_matches!(err, HandleError::StoreWriteFailure { operation: "delete_all", .. });

    h.store.set_fail_writes(false);
    assert_eq!(h.store.list_by_group(GROUP).await.unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_purge_publishes_audit_event() {
    let h = harness();
    let mut events = h.bus.subscribe();
    seed_three(&h).await;

    let task = start_purge(&h.engine, &mut events, Actor::officer(9)).await;
    h.engine.deliver_confirmation(GROUP, 9, "Yes").await;
    task.await.unwrap().unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type, "characters.purged");
    assert_eq!(event.operation, "delete_all");
    assert_eq!(event.payload["deleted"], 3);
}

// ---------------------------------------------------------------------------
// Test: single delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_delete_own_character() {
    let h = harness();
    let a = seed(&h.store, 1, "Alpha").await;
    seed(&h.store, 2, "Bravo").await;

    let receipt = expect_deleted(
        h.engine
            .handle(intent(Actor::member(1), "", Operation::Delete))
            .await,
    );
    assert_eq!(receipt.deleted, 1);
    let removed = receipt.character.unwrap();
    assert_eq!(removed.display_name, "Alpha");
    assert_eq!(removed.char_name, "AlphaChar");
    assert!(h.store.find_by_id(a.id).await.unwrap().is_none());
    assert_eq!(h.store.list_by_group(GROUP).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_member_cannot_delete_others() {
    let h = harness();
    seed(&h.store, 1, "Alpha").await;
    let b = seed(&h.store, 2, "Bravo").await;

    let err = h
        .engine
        .handle(intent(Actor::member(1), "bravo", Operation::Delete))
        .await
        .unwrap_err();
    assert_matches!(err, HandleError::Unauthorized { operation: "delete", .. });
    assert_eq!(h.store.find_by_id(b.id).await.unwrap().unwrap(), b);

    // Officers may.
    let receipt = expect_deleted(
        h.engine
            .handle(intent(Actor::officer(5), "bravo", Operation::Delete))
            .await,
    );
    assert_eq!(receipt.deleted, 1);
}

#[tokio::test]
async fn test_delete_missing_character_is_not_found() {
    let h = harness();
    let err = h
        .engine
        .handle(intent(Actor::member(1), "", Operation::Delete))
        .await
        .unwrap_err();
    assert_matches!(err, HandleError::NotFound { operation: "delete", .. });
}
