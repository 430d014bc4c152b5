//! Cancellation coordination
//!
//! Each generation gets its own [`GenerationToken`]. A stop request signals
//! only the token of the generation that is live right now; signals aimed at
//! a generation that already finished are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

/// Cancellation signal scoped to one generation.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    id: u64,
    inner: CancellationToken,
    completed: Arc<AtomicBool>,
}

impl GenerationToken {
    fn new(id: u64) -> Self {
        Self {
            id,
            inner: CancellationToken::new(),
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Request cancellation.
    ///
    /// Returns `false` when the token was already signaled or its generation
    /// already completed.
    pub fn signal(&self) -> bool {
        if self.completed.load(Ordering::SeqCst) || self.inner.is_cancelled() {
            return false;
        }
        self.inner.cancel();
        true
    }

    pub fn is_signaled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Resolves once the token is signaled.
    pub async fn signaled(&self) {
        self.inner.cancelled().await
    }

    fn mark_completed(&self) {
        self.completed.store(true, Ordering::SeqCst);
    }
}

/// Hands out tokens and tracks which one belongs to the live generation.
#[derive(Debug, Default)]
pub struct CancellationCoordinator {
    next_id: u64,
    current: Option<GenerationToken>,
}

impl CancellationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh, unsignaled token and make it current.
    pub fn begin(&mut self) -> GenerationToken {
        self.next_id += 1;
        let token = GenerationToken::new(self.next_id);
        self.current = Some(token.clone());
        token
    }

    /// Signal the live generation, if any. Returns whether a signal was set.
    pub fn signal_current(&mut self) -> bool {
        self.current.as_ref().is_some_and(GenerationToken::signal)
    }

    /// Retire `token`. Later signals against it are no-ops.
    pub fn complete(&mut self, token: &GenerationToken) {
        token.mark_completed();
        if self.current.as_ref().is_some_and(|t| t.id == token.id) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&GenerationToken> {
        self.current.as_ref()
    }
}
