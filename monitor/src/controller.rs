use crate::client::{Fetched, StatusSource};
use crate::types::StatusSnapshot;
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Before the first fetch resolves
    #[default]
    Loading,
    Ready,
}

/// Last-known dashboard state. Written only by [`DashboardController`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub phase: Phase,
    /// Most recent successful snapshot; a failed fetch never clears it.
    pub last_snapshot: Option<StatusSnapshot>,
    pub last_success_at: Option<DateTime<Local>>,
    /// Failed fetches since the last success
    pub consecutive_failures: u32,
}

impl UiState {
    /// Loading -> Ready on any result. A snapshot replaces the retained one,
    /// Unavailable leaves it untouched.
    fn apply(&mut self, fetched: Fetched, now: DateTime<Local>) {
        self.phase = Phase::Ready;
        match fetched {
            Fetched::Snapshot(snapshot) => {
                self.last_snapshot = Some(snapshot);
                self.last_success_at = Some(now);
                self.consecutive_failures = 0;
            }
            Fetched::Unavailable => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("dashboard polling is already running")]
    AlreadyRunning,
    #[error("dashboard controller has been stopped")]
    Stopped,
}

struct Inner {
    state: UiState,
    highest_applied: u64,
    stopped: bool,
}

/// State shared between the controller, its timer task and in-flight fetches
struct Shared {
    source: Arc<dyn StatusSource>,
    next_seq: AtomicU64,
    inner: Mutex<Inner>,
    tx: watch::Sender<UiState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sequence numbers start at 1 and are taken when a fetch is initiated.
    fn begin_fetch(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply the result of fetch `seq`. Returns false if it was discarded.
    fn apply(&self, seq: u64, fetched: Fetched) -> bool {
        let mut inner = self.lock();

        if inner.stopped {
            debug!("Poll #{seq} resolved after stop, discarding");
            return false;
        }
        if seq <= inner.highest_applied {
            debug!(
                "Poll #{seq} resolved after #{}, discarding stale result",
                inner.highest_applied
            );
            return false;
        }
        inner.highest_applied = seq;

        let had_snapshot = inner.state.last_snapshot.is_some();
        let failures_before = inner.state.consecutive_failures;
        match &fetched {
            Fetched::Snapshot(_) if !had_snapshot => info!("First status snapshot received"),
            Fetched::Snapshot(_) if failures_before > 0 => {
                info!("Backend reachable again after {failures_before} failed polls")
            }
            Fetched::Unavailable if had_snapshot => {
                debug!("Poll #{seq} unavailable, keeping last good snapshot")
            }
            Fetched::Unavailable if inner.state.phase == Phase::Loading => {
                info!("First poll failed, backend unreachable")
            }
            _ => {}
        }

        inner.state.apply(fetched, Local::now());
        self.tx.send_replace(inner.state.clone());
        true
    }

    async fn fetch_and_apply(&self, seq: u64) -> bool {
        let fetched = self.source.fetch_status().await;
        self.apply(seq, fetched)
    }
}

/// Polls a [`StatusSource`] on a fixed period and keeps the dashboard state.
///
/// The repeating timer is owned by the controller. [`stop`](Self::stop) or
/// dropping the controller aborts it, and from that point no result is
/// applied, including results of fetches already in flight.
pub struct DashboardController {
    shared: Arc<Shared>,
    period: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl DashboardController {
    pub fn new<S: StatusSource>(source: S, period: Duration) -> Self {
        Self::with_source(Arc::new(source), period)
    }

    pub fn with_source(source: Arc<dyn StatusSource>, period: Duration) -> Self {
        let (tx, _rx) = watch::channel(UiState::default());
        Self {
            shared: Arc::new(Shared {
                source,
                next_seq: AtomicU64::new(0),
                inner: Mutex::new(Inner {
                    state: UiState::default(),
                    highest_applied: 0,
                    stopped: false,
                }),
                tx,
            }),
            period,
            timer: Mutex::new(None),
        }
    }

    /// Receives every applied state change.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.shared.tx.subscribe()
    }

    pub fn state(&self) -> UiState {
        self.shared.lock().state.clone()
    }

    /// Fetch immediately, then once per period. Must be called from within
    /// a Tokio runtime.
    pub fn start(&self) -> Result<(), ControllerError> {
        let mut timer = self.timer_slot();
        if self.shared.lock().stopped {
            return Err(ControllerError::Stopped);
        }
        if timer.is_some() {
            return Err(ControllerError::AlreadyRunning);
        }

        let shared = Arc::clone(&self.shared);
        let period = self.period;
        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately
                ticker.tick().await;
                let seq = shared.begin_fetch();
                debug!("Poll #{seq}");
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    shared.fetch_and_apply(seq).await;
                });
            }
        }));

        info!("Dashboard polling started (every {}ms)", period.as_millis());
        Ok(())
    }

    /// Cancel the timer. Idempotent; results still in flight are dropped.
    pub fn stop(&self) {
        let was_stopped = std::mem::replace(&mut self.shared.lock().stopped, true);
        if let Some(handle) = self.timer_slot().take() {
            handle.abort();
        }
        if !was_stopped {
            info!("Dashboard polling stopped");
        }
    }

    /// One fetch-and-apply outside the schedule. Returns whether the result
    /// was applied.
    pub async fn poll_once(&self) -> bool {
        let seq = self.shared.begin_fetch();
        self.shared.fetch_and_apply(seq).await
    }

    fn timer_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        self.stop();
    }
}
