//! De-duplication for the continuous scan feed.
//!
//! A camera decoder reports the same code many times while it stays in
//! view. `ScanDebouncer` collapses repeats of one code inside a window
//! into a single event. Manual entries should bypass it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default window for treating identical codes as one scan.
pub const DEFAULT_DEDUPE_WINDOW: Duration = Duration::from_millis(2000);

#[derive(Debug)]
pub struct ScanDebouncer {
    window: Duration,
    last_accepted: HashMap<String, Instant>,
}

impl Default for ScanDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUPE_WINDOW)
    }
}

impl ScanDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` if `code` should be processed. A repeat of the same
    /// code less than `window` after its last accepted occurrence is
    /// dropped; other codes are unaffected.
    pub fn accept(&mut self, code: &str, now: Instant) -> bool {
        let code = code.trim();
        if code.is_empty() {
            return false;
        }

        if let Some(&last) = self.last_accepted.get(code) {
            if now.saturating_duration_since(last) < self.window {
                return false;
            }
        }

        // Forget codes whose window has already closed
        let window = self.window;
        self.last_accepted
            .retain(|_, seen| now.saturating_duration_since(*seen) < window);
        self.last_accepted.insert(code.to_string(), now);
        true
    }
}
