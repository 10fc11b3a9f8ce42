use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::context::CallContext;
use crate::application::songs::SongService;

#[derive(Clone)]
pub struct ApiState {
    pub songs: Arc<SongService>,
    pub request_timeout: Duration,
    /// Cancelled on shutdown; every request context is a child of it.
    pub shutdown: CancellationToken,
}

impl ApiState {
    pub fn new(songs: Arc<SongService>, request_timeout: Duration) -> Self {
        Self {
            songs,
            request_timeout,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Fresh per-request context bounded by the request timeout.
    pub fn call_context(&self) -> CallContext {
        CallContext::with_timeout(self.shutdown.child_token(), self.request_timeout)
    }
}
