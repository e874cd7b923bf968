//! Debouncing of search-as-you-type input.
//!
//! Every keystroke submits the current term; only a term that stays current
//! for the whole quiet period is let through to the list endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Coalesces rapid search-term changes.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the quiet period. Returns the term if no newer term was
    /// submitted meanwhile, `None` if it was superseded.
    pub async fn settle(&self, term: String) -> Option<String> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.generation.load(Ordering::SeqCst) == ticket {
            Some(term)
        } else {
            tracing::trace!(term = %term, "Search term superseded");
            None
        }
    }
}
