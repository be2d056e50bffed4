//! Integration tests for speculative apply, commit and rollback

mod common;

use common::{fixture, positions, titles};
use kanban_board::card::{AddCard, MoveCard};
use kanban_board::engine::MutationPhase;
use kanban_board::store::{FailureRule, RecordKind, RecordStore, StoreOp};
use kanban_board::types::NewCard;
use kanban_board::{
    BoardEngine, BoardId, EngineConfig, MemoryStore, MutationOutcome, Position, ViewState,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_reorder_within_column() {
    let fx = fixture(MemoryStore::new(), EngineConfig::default()).await;
    let b = fx.cards[1].clone();

    let outcome = fx
        .engine
        .apply(MoveCard::new(b.clone(), fx.todo.clone(), 0))
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Committed);

    let board = fx.engine.board().unwrap();
    assert_eq!(titles(&board, &fx.todo), vec!["B", "A", "C"]);
    assert_eq!(positions(&board, &fx.todo), vec![0, 1, 2]);

    // The moved card is written first, then A's renumber
    let writes = fx.store.write_calls().await;
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].op, StoreOp::Update);
    assert_eq!(writes[0].target, b.as_str());
    assert_eq!(writes[0].payload, Some(json!({"position": 0})));
    assert_eq!(writes[1].target, fx.cards[0].as_str());
    assert_eq!(writes[1].payload, Some(json!({"position": 1})));
}

#[tokio::test]
async fn test_move_to_empty_column() {
    let fx = fixture(MemoryStore::new(), EngineConfig::default()).await;
    let a = fx.cards[0].clone();

    let outcome = fx
        .engine
        .apply(MoveCard::new(a.clone(), fx.doing.clone(), 0))
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Committed);

    let board = fx.engine.board().unwrap();
    assert_eq!(titles(&board, &fx.todo), vec!["B", "C"]);
    assert_eq!(positions(&board, &fx.todo), vec![0, 1]);
    assert_eq!(titles(&board, &fx.doing), vec!["A"]);
    assert_eq!(positions(&board, &fx.doing), vec![0]);

    let stored = fx.store.peek_card(&a).await.unwrap();
    assert_eq!(stored.column_id, fx.doing);
    assert_eq!(stored.position, Position::new(0));
}

#[tokio::test]
async fn test_failed_move_restores_both_columns() {
    let fx = fixture(MemoryStore::new(), EngineConfig::default()).await;
    let snapshot = fx.engine.board().unwrap();
    fx.store.inject(FailureRule::writes("network unreachable")).await;

    let outcome = fx
        .engine
        .apply(MoveCard::new(fx.cards[0].clone(), fx.doing.clone(), 0))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        MutationOutcome::RolledBack {
            message: "network unreachable".into(),
            stale: false,
        }
    );

    let view = fx.engine.view();
    let ready = view.ready().unwrap();
    assert_eq!(ready.board, snapshot);
    assert_eq!(ready.phase(), MutationPhase::Idle);
    assert_eq!(ready.error.as_ref().unwrap().message, "network unreachable");
    assert!(!ready.stale);
}

#[tokio::test(start_paused = true)]
async fn test_created_card_visible_before_store_responds() {
    let store = MemoryStore::new().with_write_latency(Duration::from_millis(500));
    let fx = fixture(store, EngineConfig::default()).await;

    // Max position in Todo becomes 4
    fx.store
        .create_card(
            &fx.todo,
            NewCard {
                board_id: fx.board.clone(),
                title: "D".into(),
                description: None,
                position: Position::new(4),
            },
        )
        .await
        .unwrap();
    fx.engine.reload().await.unwrap();
    fx.store.clear_calls().await;

    let mut rx = fx.engine.subscribe();
    let engine = fx.engine.clone();
    let todo = fx.todo.clone();
    let pending = tokio::spawn(async move { engine.apply(AddCard::new(todo, "E")).await });

    rx.wait_for(|state| {
        state
            .ready()
            .is_some_and(|view| view.phase() == MutationPhase::Speculating)
    })
    .await
    .unwrap();

    let board = fx.engine.board().unwrap();
    assert_eq!(titles(&board, &fx.todo), vec!["A", "B", "C", "D", "E"]);
    assert_eq!(positions(&board, &fx.todo)[4], 5);
    assert!(fx.store.write_calls().await.is_empty());

    assert_eq!(pending.await.unwrap().unwrap(), MutationOutcome::Committed);
    let stored = fx.store.list_cards(&fx.todo).await.unwrap();
    assert_eq!(stored.last().unwrap().title, "E");
    assert_eq!(stored.last().unwrap().position, Position::new(5));
}

#[tokio::test]
async fn test_missing_board_is_not_found() {
    let engine = BoardEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default());
    let missing = BoardId::from_string("does-not-exist");

    engine.load(&missing).await.unwrap();
    assert_eq!(engine.view(), ViewState::NotFound { board_id: missing });
}

#[tokio::test]
async fn test_load_failure_then_reload() {
    let fx = fixture(MemoryStore::new(), EngineConfig::default()).await;
    fx.store
        .inject(FailureRule::on(StoreOp::List, RecordKind::Column, "service unavailable"))
        .await;

    assert!(fx.engine.reload().await.is_err());
    assert!(matches!(
        fx.engine.view(),
        ViewState::LoadError { ref message, .. } if message == "service unavailable"
    ));

    fx.store.heal().await;
    fx.engine.reload().await.unwrap();
    assert_eq!(fx.engine.board().unwrap().card_count(), 3);
}

#[tokio::test]
async fn test_move_to_same_index_sends_nothing() {
    let fx = fixture(MemoryStore::new(), EngineConfig::default()).await;
    fx.store.clear_calls().await;
    let mut rx = fx.engine.subscribe();

    let outcome = fx
        .engine
        .apply(MoveCard::new(fx.cards[2].clone(), fx.todo.clone(), 2))
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Unchanged);
    assert!(fx.store.calls().await.is_empty());
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn test_index_zero_and_back_restores_order() {
    let fx = fixture(MemoryStore::new(), EngineConfig::default()).await;
    let c = fx.cards[2].clone();

    fx.engine
        .apply(MoveCard::new(c.clone(), fx.todo.clone(), 0))
        .await
        .unwrap();
    assert_eq!(titles(&fx.engine.board().unwrap(), &fx.todo), vec!["C", "A", "B"]);

    fx.engine
        .apply(MoveCard::new(c, fx.todo.clone(), 2))
        .await
        .unwrap();
    let board = fx.engine.board().unwrap();
    assert_eq!(titles(&board, &fx.todo), vec!["A", "B", "C"]);
    assert_eq!(positions(&board, &fx.todo), vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_error_clears_after_three_seconds() {
    let fx = fixture(MemoryStore::new(), EngineConfig::default()).await;
    fx.store.inject(FailureRule::writes("offline")).await;

    fx.engine
        .apply(MoveCard::new(fx.cards[0].clone(), fx.doing.clone(), 0))
        .await
        .unwrap();
    assert!(fx.engine.view().ready().unwrap().error.is_some());

    tokio::time::sleep(Duration::from_millis(2_999)).await;
    assert!(fx.engine.view().ready().unwrap().error.is_some());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(fx.engine.view().ready().unwrap().error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_newer_error_outlives_older_timer() {
    let fx = fixture(MemoryStore::new(), EngineConfig::default()).await;
    fx.store.inject(FailureRule::writes("offline")).await;

    fx.engine
        .apply(MoveCard::new(fx.cards[0].clone(), fx.doing.clone(), 0))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    fx.engine
        .apply(MoveCard::new(fx.cards[1].clone(), fx.doing.clone(), 0))
        .await
        .unwrap();

    // First timer fires at 3 s; the second error stays until 5 s
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert!(fx.engine.view().ready().unwrap().error.is_some());

    tokio::time::sleep(Duration::from_millis(1_501)).await;
    assert!(fx.engine.view().ready().unwrap().error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_times_out_and_rolls_back() {
    let store = MemoryStore::new().with_write_latency(Duration::from_secs(30));
    let config = EngineConfig::default().with_remote_timeout(Duration::from_secs(10));
    let fx = fixture(store, config).await;
    let snapshot = fx.engine.board().unwrap();
    fx.store.clear_calls().await;

    let outcome = fx
        .engine
        .apply(AddCard::new(fx.todo.clone(), "Slow"))
        .await
        .unwrap();
    assert!(matches!(outcome, MutationOutcome::RolledBack { stale: false, .. }));
    assert_eq!(fx.engine.board().unwrap(), snapshot);
    assert!(fx.store.write_calls().await.is_empty());
}

#[tokio::test]
async fn test_partial_failure_marks_view_stale() {
    let fx = fixture(MemoryStore::new(), EngineConfig::default()).await;
    let snapshot = fx.engine.board().unwrap();

    // The moved card's write goes through, the sibling renumber does not
    fx.store
        .inject(FailureRule::on(StoreOp::Update, RecordKind::Card, "lost connection").after(1))
        .await;

    let outcome = fx
        .engine
        .apply(MoveCard::new(fx.cards[1].clone(), fx.todo.clone(), 0))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        MutationOutcome::RolledBack {
            message: "lost connection".into(),
            stale: true,
        }
    );

    let view = fx.engine.view();
    let ready = view.ready().unwrap();
    assert_eq!(ready.board, snapshot);
    assert!(ready.stale);

    fx.store.heal().await;
    fx.engine.reload().await.unwrap();
    assert!(!fx.engine.view().ready().unwrap().stale);
}

#[tokio::test]
async fn test_subscribers_see_speculation_then_commit() {
    let fx = fixture(MemoryStore::new(), EngineConfig::default()).await;
    let mut rx = fx.engine.subscribe();

    fx.engine
        .apply(MoveCard::new(fx.cards[0].clone(), fx.doing.clone(), 0))
        .await
        .unwrap();

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    let ready = state.ready().unwrap();
    assert_eq!(ready.phase(), MutationPhase::Idle);
    assert_eq!(titles(&ready.board, &fx.doing), vec!["A"]);
}
