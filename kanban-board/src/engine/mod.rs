//! Optimistic mutation engine.
//!
//! The engine owns the observable [`ViewState`] of one board. A mutation is
//! planned against the current board, the candidate is published immediately,
//! and only then are the remote writes issued. When every write succeeds the
//! candidate stands; when any fails the view goes back to the exact snapshot
//! taken before speculation and a transient error is shown for a while.
//!
//! One mutation is in flight at a time. Depending on
//! [`ConcurrencyPolicy`](crate::ConcurrencyPolicy) a second intent waits
//! for the slot or is rejected with [`KanbanError::Busy`].

mod drag;
mod plan;
mod state;

pub use drag::DragEvent;
pub use plan::{IdMap, Mutation, Plan, PlanContext, RemoteWrite, Speculation, Written};
pub(crate) use plan::{optional_text, required_title};
pub use state::{
    transition, DragFeedback, DropTarget, MutationPhase, PendingMutation, ReadyView,
    TransientError, ViewEvent, ViewState,
};

use crate::config::{ConcurrencyPolicy, EngineConfig};
use crate::error::{KanbanError, Result};
use crate::loader::load_board;
use crate::ordering::OrderingPolicy;
use crate::store::RecordStore;
use crate::types::{Board, BoardId, MutationRecord, Settlement};
use futures::future::join_all;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::{debug, error, info, instrument, warn};

/// How a call to [`BoardEngine::apply`] settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Every remote write succeeded
    Committed,
    /// The intent changed nothing and nothing was sent
    Unchanged,
    /// A remote write failed and the view was restored
    RolledBack {
        message: String,
        /// Some writes had already been applied remotely
        stale: bool,
    },
}

impl MutationOutcome {
    pub fn settlement(&self) -> Settlement {
        match self {
            Self::Committed => Settlement::Committed,
            Self::Unchanged => Settlement::Unchanged,
            Self::RolledBack { .. } => Settlement::RolledBack,
        }
    }
}

/// A remote failure part way through a plan
struct Failure {
    error: KanbanError,
    /// Writes that succeeded before the failure was observed
    applied: usize,
}

struct EngineInner {
    store: Arc<dyn RecordStore>,
    config: EngineConfig,
    view: watch::Sender<ViewState>,
    /// The in-flight slot. Whoever holds it also owns the provisional id map.
    slot: Mutex<IdMap>,
    history: Mutex<VecDeque<MutationRecord>>,
    error_ids: AtomicU64,
}

/// Optimistic engine for one board view. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct BoardEngine {
    inner: Arc<EngineInner>,
}

impl BoardEngine {
    /// Create an engine over `store`. Nothing is loaded yet.
    pub fn new(store: Arc<dyn RecordStore>, config: EngineConfig) -> Self {
        let (view, _) = watch::channel(ViewState::Idle);
        Self {
            inner: Arc::new(EngineInner {
                store,
                config,
                view,
                slot: Mutex::new(IdMap::new()),
                history: Mutex::new(VecDeque::new()),
                error_ids: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.inner.store
    }

    /// Receive every published view state
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.inner.view.subscribe()
    }

    /// The current view state
    pub fn view(&self) -> ViewState {
        self.inner.view.borrow().clone()
    }

    /// The board currently shown, speculative or committed
    pub fn board(&self) -> Option<Board> {
        self.inner.view.borrow().board().cloned()
    }

    /// Settled mutations, oldest first
    pub async fn history(&self) -> Vec<MutationRecord> {
        self.inner.history.lock().await.iter().cloned().collect()
    }

    /// Load `board_id` into the view.
    ///
    /// A missing board is not an error: the view moves to `NotFound`. A failed
    /// load moves the view to `LoadError` and returns the error.
    #[instrument(skip_all, fields(board = %board_id))]
    pub async fn load(&self, board_id: &BoardId) -> Result<()> {
        let mut ids = self.inner.slot.lock().await;
        if self.inner.view.borrow().board_id() != Some(board_id) {
            ids.clear();
        }
        self.dispatch(ViewEvent::LoadStarted(board_id.clone()));

        match self
            .bounded(load_board(self.inner.store.as_ref(), board_id))
            .await
        {
            Ok(board) => {
                if board.is_none() {
                    info!("board not found");
                }
                self.dispatch(ViewEvent::Loaded {
                    board_id: board_id.clone(),
                    board,
                });
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "failed to load board");
                self.dispatch(ViewEvent::LoadFailed {
                    board_id: board_id.clone(),
                    message: err.user_message(),
                });
                Err(err)
            }
        }
    }

    /// Load the current board again, discarding local state
    pub async fn reload(&self) -> Result<()> {
        let board_id = self
            .inner
            .view
            .borrow()
            .board_id()
            .cloned()
            .ok_or(KanbanError::NotReady)?;
        self.load(&board_id).await
    }

    /// Apply an intent optimistically.
    ///
    /// Local errors (unknown ids, invalid values) are returned before anything
    /// is published. Remote failures are absorbed: the view is rolled back and
    /// the outcome says so.
    ///
    /// Ids of records that were still provisional when the intent was formed
    /// are translated to the ids the store assigned before planning.
    #[instrument(skip_all, fields(op = mutation.op_string()))]
    pub async fn apply<M: Mutation>(&self, mut mutation: M) -> Result<MutationOutcome> {
        let mut ids = self.acquire().await?;
        let start = Instant::now();
        if !ids.is_empty() {
            mutation.remap_ids(&ids);
        }
        let op = mutation.op_string();
        let input = serde_json::to_value(&mutation).unwrap_or_default();

        let snapshot = self.board().ok_or(KanbanError::NotReady)?;
        let ctx = PlanContext::from_config(&self.inner.config);

        let mut speculation = match mutation.plan(&snapshot, &ctx)? {
            Plan::Unchanged => {
                debug!("intent changes nothing");
                self.record(MutationRecord::new(
                    op,
                    input,
                    Settlement::Unchanged,
                    0,
                    elapsed_ms(start),
                ))
                .await;
                return Ok(MutationOutcome::Unchanged);
            }
            Plan::Apply(speculation) => speculation,
        };
        self.check_ordering(&ctx.ordering, &snapshot, &mut speculation)?;

        let writes = speculation.write_count();
        self.dispatch(ViewEvent::Speculated {
            op: op.to_string(),
            candidate: speculation.candidate.clone(),
        });

        let pending = Unsettled::new(self, &snapshot);
        let result = self.realize(&mut speculation, &mut ids).await;
        pending.settle();

        match result {
            Ok(()) => {
                self.dispatch(ViewEvent::Committed {
                    board: speculation.candidate,
                });
                self.record(MutationRecord::new(
                    op,
                    input,
                    Settlement::Committed,
                    writes,
                    elapsed_ms(start),
                ))
                .await;
                Ok(MutationOutcome::Committed)
            }
            Err(Failure { error, applied }) => {
                let stale = applied > 0;
                if stale {
                    warn!(
                        applied,
                        writes,
                        error = %error,
                        "mutation partially applied remotely; view is stale until reloaded"
                    );
                } else {
                    warn!(error = %error, "mutation rolled back");
                }

                let message = self.roll_back(snapshot, &error, stale);
                self.record(
                    MutationRecord::new(
                        op,
                        input,
                        Settlement::RolledBack,
                        writes,
                        elapsed_ms(start),
                    )
                    .with_error(error.to_string()),
                )
                .await;

                if error.is_remote_failure() {
                    Ok(MutationOutcome::RolledBack { message, stale })
                } else {
                    Err(error)
                }
            }
        }
    }

    async fn acquire(&self) -> Result<MutexGuard<'_, IdMap>> {
        match self.inner.config.concurrency {
            ConcurrencyPolicy::Queue => Ok(self.inner.slot.lock().await),
            ConcurrencyPolicy::Reject => self.inner.slot.try_lock().map_err(|_| {
                debug!("rejecting intent while another mutation is in flight");
                KanbanError::Busy
            }),
        }
    }

    /// Issue the primary write, then any followups concurrently
    async fn realize(
        &self,
        speculation: &mut Speculation,
        ids: &mut IdMap,
    ) -> std::result::Result<(), Failure> {
        let store = self.inner.store.as_ref();

        let written = self
            .bounded(speculation.primary.execute(store))
            .await
            .map_err(|error| Failure { error, applied: 0 })?;
        speculation
            .primary
            .reconcile(&written, &mut speculation.candidate, ids);

        if speculation.followups.is_empty() {
            return Ok(());
        }

        let results = join_all(
            speculation
                .followups
                .iter()
                .map(|write| self.bounded(write.execute(store))),
        )
        .await;

        let mut applied = 1;
        let mut first_error = None;
        for (write, result) in speculation.followups.iter().zip(results) {
            match result {
                Ok(_) => applied += 1,
                Err(err) => {
                    warn!(write = %write.describe(), error = %err, "followup write failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(error) => Err(Failure { error, applied }),
            None => Ok(()),
        }
    }

    /// Run a remote call under the configured timeout
    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match self.inner.config.remote_timeout() {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                KanbanError::Timeout {
                    elapsed_ms: limit.as_millis() as u64,
                }
            })?,
            None => call.await,
        }
    }

    /// Restore `snapshot` and show an error that clears itself
    fn roll_back(&self, snapshot: Board, error: &KanbanError, stale: bool) -> String {
        let id = self.inner.error_ids.fetch_add(1, AtomicOrdering::Relaxed) + 1;
        let message = error.user_message();
        self.dispatch(ViewEvent::RolledBack {
            snapshot,
            error: TransientError {
                id,
                message: message.clone(),
            },
            stale,
        });

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return message;
        };
        let inner: Weak<EngineInner> = Arc::downgrade(&self.inner);
        let display = self.inner.config.error_display();
        runtime.spawn(async move {
            tokio::time::sleep(display).await;
            if let Some(inner) = inner.upgrade() {
                publish(&inner.view, ViewEvent::ErrorExpired { id });
            }
        });

        message
    }

    /// Reject candidates whose sibling positions are out of order.
    ///
    /// Boards that were already out of order when loaded are left alone.
    fn check_ordering(
        &self,
        ordering: &OrderingPolicy,
        snapshot: &Board,
        speculation: &mut Speculation,
    ) -> Result<()> {
        let Err(defect) = verify_board(ordering, &speculation.candidate) else {
            return Ok(());
        };
        if verify_board(ordering, snapshot).is_err() {
            warn!(defect = %defect, "board was out of order before this mutation");
            return Ok(());
        }

        error!(defect = %defect, "planned board breaks sibling ordering");
        if cfg!(debug_assertions) {
            return Err(defect);
        }
        ordering.densify(&mut speculation.candidate.columns);
        for column in &mut speculation.candidate.columns {
            ordering.densify(&mut column.cards);
        }
        Ok(())
    }

    async fn record(&self, record: MutationRecord) {
        info!(
            op = %record.op,
            settlement = ?record.settlement,
            writes = record.writes,
            duration_ms = record.duration_ms,
            "mutation settled"
        );
        let mut history = self.inner.history.lock().await;
        history.push_back(record);
        while history.len() > self.inner.config.history_limit {
            history.pop_front();
        }
    }

    fn dispatch(&self, event: ViewEvent) {
        publish(&self.inner.view, event);
    }
}

/// Restores the snapshot when an `apply` future is dropped mid-flight.
///
/// Some writes may have landed by then, so the restored view is marked stale.
struct Unsettled<'a> {
    engine: &'a BoardEngine,
    snapshot: &'a Board,
    armed: bool,
}

impl<'a> Unsettled<'a> {
    fn new(engine: &'a BoardEngine, snapshot: &'a Board) -> Self {
        Self {
            engine,
            snapshot,
            armed: true,
        }
    }

    /// The writes settled one way or the other
    fn settle(mut self) {
        self.armed = false;
    }
}

impl Drop for Unsettled<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("mutation dropped before its writes settled; restoring snapshot");
            self.engine.roll_back(self.snapshot.clone(), &KanbanError::Interrupted, true);
        }
    }
}

fn publish(view: &watch::Sender<ViewState>, event: ViewEvent) {
    view.send_modify(|state| {
        let current = std::mem::take(state);
        *state = transition(current, event);
    });
}

fn verify_board(ordering: &OrderingPolicy, board: &Board) -> Result<()> {
    ordering.verify(&board.columns)?;
    for column in &board.columns {
        ordering.verify(&column.cards)?;
    }
    Ok(())
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{MoveCard, UpdateCard};
    use crate::store::{FailureRule, MemoryStore};
    use crate::test_support::seed_board;

    async fn engine() -> (Arc<MemoryStore>, BoardEngine, crate::test_support::Seeded) {
        let store = Arc::new(MemoryStore::new());
        let seeded = seed_board(store.as_ref()).await;
        let engine = BoardEngine::new(store.clone(), EngineConfig::default());
        engine.load(&seeded.board).await.unwrap();
        (store, engine, seeded)
    }

    #[tokio::test]
    async fn test_apply_before_load_is_not_ready() {
        let engine = BoardEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default());
        let result = engine
            .apply(UpdateCard::new("missing").with_title("x"))
            .await;
        assert!(matches!(result, Err(KanbanError::NotReady)));
    }

    #[tokio::test]
    async fn test_local_error_publishes_nothing() {
        let (store, engine, _) = engine().await;
        store.clear_calls().await;
        let before = engine.view();

        let result = engine.apply(UpdateCard::new("ghost").with_title("x")).await;
        assert!(matches!(result, Err(KanbanError::NotFound { .. })));
        assert_eq!(engine.view(), before);
        assert!(store.write_calls().await.is_empty());
        assert!(engine.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_is_recorded() {
        let (store, engine, seeded) = engine().await;
        store.clear_calls().await;

        let outcome = engine
            .apply(MoveCard::new(seeded.cards[1].clone(), seeded.todo.clone(), 1))
            .await
            .unwrap();
        assert_eq!(outcome, MutationOutcome::Unchanged);
        assert!(store.write_calls().await.is_empty());

        let history = engine.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].op, "move card");
        assert_eq!(history[0].settlement, Settlement::Unchanged);
        assert_eq!(history[0].writes, 0);
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let store = Arc::new(MemoryStore::new());
        let seeded = seed_board(store.as_ref()).await;
        let config = EngineConfig {
            history_limit: 2,
            ..EngineConfig::default()
        };
        let engine = BoardEngine::new(store.clone(), config);
        engine.load(&seeded.board).await.unwrap();

        for title in ["one", "two", "three"] {
            engine
                .apply(UpdateCard::new(seeded.cards[0].clone()).with_title(title))
                .await
                .unwrap();
        }

        let history = engine.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].input["title"], "three");
    }

    #[tokio::test]
    async fn test_remote_failure_rolls_back_and_records_error() {
        let (store, engine, seeded) = engine().await;
        let before = engine.board().unwrap();
        store.inject(FailureRule::writes("row level security")).await;

        let outcome = engine
            .apply(UpdateCard::new(seeded.cards[0].clone()).with_title("renamed"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            MutationOutcome::RolledBack {
                message: "row level security".into(),
                stale: false,
            }
        );
        assert_eq!(engine.board().unwrap(), before);

        let history = engine.history().await;
        assert_eq!(history[0].settlement, Settlement::RolledBack);
        assert!(history[0].error.as_deref().unwrap().contains("row level security"));
    }

    #[tokio::test]
    async fn test_reload_without_board_is_not_ready() {
        let engine = BoardEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default());
        assert!(matches!(engine.reload().await, Err(KanbanError::NotReady)));
    }

    #[test]
    fn test_outcome_settlement() {
        assert_eq!(MutationOutcome::Committed.settlement(), Settlement::Committed);
        assert_eq!(
            MutationOutcome::RolledBack {
                message: "x".into(),
                stale: false
            }
            .settlement(),
            Settlement::RolledBack
        );
    }
}
