//! User-visible error reporting seam.
//!
//! The custom-property surfaces report fetch failures through a [`Notifier`]
//! instead of rendering errors themselves. Reporting is fire-and-forget: it
//! never blocks, never fails, and never alters the caller's control flow.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Fire-and-forget reporting of user-visible errors
pub trait Notifier: Send + Sync {
    fn error(&self, message: String);
}

/// Notifier that only writes to the log (non-interactive default)
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: String) {
        log::error!("{}", message);
    }
}

const MAX_TOASTS: usize = 8;
const TOAST_TTL: Duration = Duration::from_secs(6);

/// Bounded queue of recent errors, surfaced by the TUI status line.
///
/// Clones share the same queue, so the shell can keep one end while the app
/// holds the other behind `dyn Notifier`.
#[derive(Clone, Default)]
pub struct ToastQueue {
    toasts: Arc<Mutex<VecDeque<(Instant, String)>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent message still within its display window
    pub fn latest(&self) -> Option<String> {
        let toasts = self.toasts.lock().ok()?;
        let (shown_at, message) = toasts.back()?;
        if shown_at.elapsed() < TOAST_TTL {
            Some(message.clone())
        } else {
            None
        }
    }
}

impl Notifier for ToastQueue {
    fn error(&self, message: String) {
        log::error!("{}", message);
        if let Ok(mut toasts) = self.toasts.lock() {
            if toasts.len() == MAX_TOASTS {
                toasts.pop_front();
            }
            toasts.push_back((Instant::now(), message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_queue_keeps_latest_and_bounds_len() {
        let queue = ToastQueue::new();
        for i in 0..20 {
            queue.error(format!("boom {}", i));
        }
        assert_eq!(queue.latest(), Some("boom 19".into()));
        assert!(queue.toasts.lock().unwrap().len() <= MAX_TOASTS);
    }
}
