//! Fixed-interval polling of a job until it reaches a terminal status.
//!
//! Each watch runs as its own tokio task. A session moves `Idle -> Polling ->
//! Done` and reports its outcome to the caller's callback at most once:
//! - `Ok(snapshot)` when the job is Completed or Failed
//! - `Err(WatchError::Timeout)` when the deadline passes first
//! - `Err(WatchError::NotFound)` when the source does not know the job
//!
//! A cancelled session never invokes its callback.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use strum::Display;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::models::status::PublicStatus;

/// Default delay between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Anything that can report a point-in-time job status.
pub trait StatusSource: Send + Sync + 'static {
    fn status(&self, id: &str) -> impl Future<Output = Result<PublicStatus, SourceError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub interval: Duration,
    /// Maximum wall-clock duration of the session; `None` waits forever.
    pub timeout: Option<Duration>,
}

impl WatchOptions {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Idle,
    Polling,
    Done,
}

pub type WatchResult = Result<PublicStatus, WatchError>;

type Callback = Box<dyn FnOnce(WatchResult) + Send>;
type CallbackSlot = Arc<Mutex<Option<Callback>>>;

/// Handle to a running watch session.
///
/// Dropping the handle detaches the session; it keeps polling and still
/// delivers its outcome.
pub struct WatchHandle {
    id: String,
    callback: CallbackSlot,
    cancel_tx: Option<oneshot::Sender<()>>,
    state_rx: watch::Receiver<SessionState>,
    task: JoinHandle<WatchResult>,
}

impl WatchHandle {
    pub fn job_id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Stop the session. Returns true if this prevented the callback from
    /// running, false if the outcome had already been delivered.
    pub fn cancel(&mut self) -> bool {
        let pending = take_callback(&self.callback).is_some();
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
        if pending {
            tracing::debug!(job_id = %self.id, "Watch cancelled");
        }
        pending
    }

    /// Wait for the session to finish and return its outcome.
    pub async fn wait(self) -> WatchResult {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(job_id = %self.id, error = %e, "Watch task aborted");
                Err(WatchError::Cancelled)
            }
        }
    }
}

/// Start polling `id` on `source` until it reaches a terminal status.
pub fn watch_job<S, F>(
    source: Arc<S>,
    id: impl Into<String>,
    options: WatchOptions,
    on_update: F,
) -> WatchHandle
where
    S: StatusSource,
    F: FnOnce(WatchResult) + Send + 'static,
{
    let id = id.into();
    let on_update: Callback = Box::new(on_update);
    let callback: CallbackSlot = Arc::new(Mutex::new(Some(on_update)));
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let (state_tx, state_rx) = watch::channel(SessionState::Idle);

    let task = tokio::spawn(run_session(
        source,
        id.clone(),
        options,
        cancel_rx,
        Arc::clone(&callback),
        state_tx,
    ));

    WatchHandle {
        id,
        callback,
        cancel_tx: Some(cancel_tx),
        state_rx,
        task,
    }
}

async fn run_session<S: StatusSource>(
    source: Arc<S>,
    id: String,
    options: WatchOptions,
    mut cancel_rx: oneshot::Receiver<()>,
    callback: CallbackSlot,
    state_tx: watch::Sender<SessionState>,
) -> WatchResult {
    state_tx.send_replace(SessionState::Polling);
    tracing::debug!(
        job_id = %id,
        interval_ms = options.interval.as_millis() as u64,
        "Watch started"
    );

    let started = Instant::now();
    let deadline = options.timeout.map(|t| started + t);
    let mut ticker = tokio::time::interval(options.interval.max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut detached = false;
    let mut last: Option<PublicStatus> = None;
    let mut ticks: u64 = 0;

    let outcome = loop {
        tokio::select! {
            biased;
            signal = &mut cancel_rx, if !detached => {
                if signal.is_ok() {
                    break Err(WatchError::Cancelled);
                }
                // Sender dropped without cancelling.
                detached = true;
                continue;
            }
            _ = sleep_until(deadline) => {
                break Err(timeout(&id, started, last.take()));
            }
            _ = ticker.tick() => {}
        }

        ticks += 1;
        let query = source.status(&id);
        let response = match deadline {
            Some(at) => match tokio::time::timeout_at(at, query).await {
                Ok(response) => response,
                Err(_) => break Err(timeout(&id, started, last.take())),
            },
            None => query.await,
        };

        match response {
            Ok(snapshot) if snapshot.status.is_terminal() => break Ok(snapshot),
            Ok(snapshot) => {
                tracing::trace!(
                    job_id = %id,
                    tick = ticks,
                    status = %snapshot.status,
                    progress = snapshot.progress,
                    "Job still running"
                );
                last = Some(snapshot);
            }
            Err(SourceError::NotFound(_)) => break Err(WatchError::NotFound(id.clone())),
            Err(e) => {
                tracing::warn!(
                    job_id = %id,
                    tick = ticks,
                    error = %e,
                    "Status query failed, will retry"
                );
            }
        }
    };

    let pending = take_callback(&callback);
    state_tx.send_replace(SessionState::Done);

    match pending {
        Some(on_update) => {
            match &outcome {
                Ok(snapshot) => {
                    tracing::info!(job_id = %id, status = %snapshot.status, ticks, "Watch finished")
                }
                Err(e) => tracing::info!(job_id = %id, error = %e, ticks, "Watch ended"),
            }
            on_update(outcome.clone());
            outcome
        }
        None => Err(WatchError::Cancelled),
    }
}

fn take_callback(slot: &CallbackSlot) -> Option<Callback> {
    slot.lock().unwrap_or_else(|e| e.into_inner()).take()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn timeout(id: &str, started: Instant, last: Option<PublicStatus>) -> WatchError {
    WatchError::Timeout {
        id: id.to_string(),
        elapsed: started.elapsed(),
        last,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Status source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WatchError {
    #[error("Job {id} did not reach a terminal status within {elapsed:?}")]
    Timeout {
        id: String,
        elapsed: Duration,
        /// Most recent non-terminal snapshot, if any was observed.
        last: Option<PublicStatus>,
    },

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Watch cancelled")]
    Cancelled,
}
