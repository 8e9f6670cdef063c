//! Countdown driver for exam sessions.
//!
//! The session has no clock of its own; time only moves when something calls
//! [`ExamSession::tick`]. [`Countdown`] is that something for a live attempt:
//! a tokio task that ticks a [`SharedSession`] on a fixed interval and stops
//! once the session is no longer in progress.
//!
//! Every writer (the countdown and the presentation layer) must go through
//! the same mutex, so a last-second answer is either captured before expiry
//! grades the attempt or rejected with `SessionClosed`, never lost silently.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;

use crate::session::{ExamSession, SessionStatus};

/// A session shared between the countdown and its other writers.
pub type SharedSession = Arc<Mutex<ExamSession>>;

/// Wrap a session for sharing with a [`Countdown`].
pub fn shared(session: ExamSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// Format seconds as `m:ss`.
pub fn format_time(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Shortest tick period a countdown accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running countdown task.
pub struct Countdown {
    handle: JoinHandle<SessionStatus>,
}

impl Countdown {
    /// Start ticking `session` every `interval`.
    ///
    /// Each tick advances the session clock by the interval's whole seconds,
    /// and by at least one. Only whole-second intervals keep the session
    /// clock in step with wall time: 1500ms ticks move it by one second
    /// each, and sub-second intervals run it faster than real time. A zero
    /// interval is raised to one millisecond. The first tick fires one
    /// interval after spawning.
    pub fn spawn(session: SharedSession, interval: Duration) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let step = interval.as_secs().max(1);
        if interval.subsec_nanos() != 0 {
            tracing::warn!(
                "countdown interval {interval:?} is not whole seconds; each tick moves the clock {step}s"
            );
        }
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                let mut guard = session.lock().await;
                let status = guard.tick(step);
                if status.is_terminal() {
                    tracing::debug!(
                        "countdown for session {} stopped: {status}",
                        guard.id()
                    );
                    return status;
                }
            }
        });
        Self { handle }
    }

    /// Whether the task has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the countdown without touching the session.
    pub fn stop(self) {
        self.handle.abort();
    }

    /// Wait for the countdown to end on its own and return the final status.
    pub async fn join(self) -> anyhow::Result<SessionStatus> {
        self.handle
            .await
            .map_err(|e| anyhow::anyhow!("countdown task failed: {e}"))
    }
}
