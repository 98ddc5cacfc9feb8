//! Server lifecycle: the shutdown signal and the set of running tasks.
//!
//! Every session's cancellation token is a child of the shutdown token, so
//! cancelling it reaches all connections at once. Connection tasks are
//! spawned on the tracker so shutdown can wait for them to drain.

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[derive(Default)]
pub struct LifecycleManager {
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that fires when the server shuts down, or earlier if
    /// cancelled on its own.
    pub fn session_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Fire the shutdown signal and stop accepting new tasks.
    pub fn begin_shutdown(&self) {
        self.shutdown.cancel();
        self.tracker.close();
    }
}
