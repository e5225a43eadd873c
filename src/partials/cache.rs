//! Build-wide cache of cacheable partial output.
//!
//! An entry is created the first time a name is requested and is never
//! replaced afterwards, so each name renders at most once per build.
//!
//! ```text
//! claim(name) ──► Pending ──fulfil(name, html)──► Ready(html)
//!                    │                               │
//!                    └── sweep sees ""               └── sweep sees html
//! ```

use crate::log;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SimpleEntry {
    /// Render scheduled, output not available yet.
    Pending,
    /// Final output or failure marker.
    Ready(String),
}

#[derive(Debug, Default)]
pub struct SimpleCache {
    entries: Mutex<FxHashMap<String, SimpleEntry>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl SimpleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name` for rendering.
    ///
    /// Returns `true` only for the first request of a name; the caller is
    /// then responsible for producing its value.
    pub fn claim(&self, name: &str) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(name) {
            return false;
        }
        entries.insert(name.to_owned(), SimpleEntry::Pending);
        true
    }

    /// Store the rendered value for a claimed name. Ready values are final.
    pub fn fulfil(&self, name: &str, value: String) {
        let mut entries = self.entries.lock();
        match entries.get(name) {
            Some(SimpleEntry::Ready(_)) => {}
            _ => {
                entries.insert(name.to_owned(), SimpleEntry::Ready(value));
            }
        }
    }

    /// Cached value, if the render has completed.
    pub fn get(&self, name: &str) -> Option<String> {
        match self.entries.lock().get(name) {
            Some(SimpleEntry::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Number of names requested so far, pending or ready.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remember a background render so [`settle`](Self::settle) can await it.
    pub fn track(&self, handle: JoinHandle<()>) {
        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }

    /// Wait for every background render, including ones scheduled while waiting.
    pub async fn settle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.in_flight.lock());
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    log!("error"; "background partial render aborted: {}", err);
                }
            }
        }
    }
}

/// Remove exactly one trailing line terminator (`\n` or `\r\n`).
pub fn strip_trailing_newline(output: &str) -> &str {
    output
        .strip_suffix("\r\n")
        .or_else(|| output.strip_suffix('\n'))
        .unwrap_or(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn test_claim_once() {
        let cache = SimpleCache::new();
        assert!(cache.claim("header"));
        assert!(!cache.claim("header"));
        assert!(cache.claim("footer"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_pending_has_no_value() {
        let cache = SimpleCache::new();
        cache.claim("header");

        assert_eq!(cache.get("header"), None);
        assert!(!cache.claim("header"));
        assert_eq!(cache.get("unknown"), None);
    }

    #[test]
    fn test_ready_value_is_final() {
        let cache = SimpleCache::new();
        cache.claim("header");
        cache.fulfil("header", "<h/>".into());
        cache.fulfil("header", "<other/>".into());

        assert_eq!(cache.get("header").as_deref(), Some("<h/>"));
        assert!(!cache.claim("header"));
    }

    #[test]
    fn test_strip_exactly_one_terminator() {
        assert_eq!(strip_trailing_newline("Hello\n"), "Hello");
        assert_eq!(strip_trailing_newline("Hello\n\n"), "Hello\n");
        assert_eq!(strip_trailing_newline("Hello\r\n"), "Hello");
        assert_eq!(strip_trailing_newline("Hello"), "Hello");
        assert_eq!(strip_trailing_newline("line\nline"), "line\nline");
        assert_eq!(strip_trailing_newline(""), "");
    }

    #[tokio::test]
    async fn test_settle_waits_for_tracked_renders() {
        let cache = Arc::new(SimpleCache::new());
        let done = Arc::new(AtomicUsize::new(0));

        for name in ["a", "b"] {
            cache.claim(name);
            let cache_ref = Arc::clone(&cache);
            let done = Arc::clone(&done);
            cache.track(tokio::spawn(async move {
                tokio::task::yield_now().await;
                cache_ref.fulfil(name, name.to_uppercase());
                done.fetch_add(1, Ordering::SeqCst);
            }));
        }

        cache.settle().await;
        assert_eq!(done.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get("b").as_deref(), Some("B"));
    }
}
