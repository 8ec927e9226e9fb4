//! Content synchronization between the surface and a persistence backend.
//!
//! The bridge tracks one dirty/synced flag per surface. Local edits mark it
//! dirty; [`SyncBridge::flush`] hands the pending value to a sink and only
//! marks synced when the sink accepted it, so a failed write stays pending
//! for the next flush.

use thiserror::Error;
use tracing::{debug, warn};

use crate::surface::EditableSurface;

/// A persistence backend failure.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("content sink rejected the value: {0}")]
    Rejected(String),

    #[error("content sink unavailable: {0}")]
    Unavailable(String),
}

/// Where flushed content goes: a store, an autosave file, an HTTP client.
pub trait ContentSink {
    fn persist(&mut self, value: &str) -> Result<(), SinkError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum SyncState {
    /// Nothing loaded yet.
    Idle,
    /// The sink holds this value.
    Synced(String),
    /// Local edits produced this value; the sink has not seen it.
    Dirty(String),
}

/// Tracks which side holds the newest value.
#[derive(Debug)]
pub struct SyncBridge {
    state: SyncState,
}

impl Default for SyncBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncBridge {
    pub fn new() -> Self {
        Self {
            state: SyncState::Idle,
        }
    }

    /// Load a stored value into the surface. Goes through the idempotent
    /// external push, so reloading the already-current value disturbs
    /// nothing.
    pub fn load(&mut self, surface: &mut EditableSurface, value: &str) {
        surface.set_value(value);
        self.state = SyncState::Synced(surface.value());
    }

    /// Record a local edit. Values already synced are ignored.
    pub fn note_change(&mut self, value: &str) {
        match &self.state {
            SyncState::Synced(synced) if synced == value => {}
            _ => self.state = SyncState::Dirty(value.to_string()),
        }
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self.state, SyncState::Dirty(_))
    }

    /// Push the pending value to the sink. On success the bridge is clean;
    /// on failure the value stays dirty and the error propagates.
    pub fn flush(&mut self, sink: &mut dyn ContentSink) -> Result<(), SinkError> {
        let SyncState::Dirty(value) = &self.state else {
            debug!("flush skipped: nothing dirty");
            return Ok(());
        };
        let value = value.clone();
        match sink.persist(&value) {
            Ok(()) => {
                self.state = SyncState::Synced(value);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "content sink failed, value stays pending");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemorySink {
        stored: Vec<String>,
        fail_next: bool,
    }

    impl ContentSink for MemorySink {
        fn persist(&mut self, value: &str) -> Result<(), SinkError> {
            if self.fail_next {
                self.fail_next = false;
                return Err(SinkError::Unavailable("offline".into()));
            }
            self.stored.push(value.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_load_then_flush_is_clean() {
        let mut surface = EditableSurface::new();
        let mut bridge = SyncBridge::new();
        let mut sink = MemorySink::default();

        bridge.load(&mut surface, "<p>stored</p>");
        assert!(!bridge.is_dirty());
        bridge.flush(&mut sink).unwrap();
        assert!(sink.stored.is_empty());
    }

    #[test]
    fn test_edit_marks_dirty_and_flush_persists() {
        let mut surface = EditableSurface::new();
        let mut bridge = SyncBridge::new();
        let mut sink = MemorySink::default();

        bridge.load(&mut surface, "<p>a</p>");
        surface.editor_mut().select_offsets(1, 1);
        surface.insert_text("b");
        bridge.note_change(&surface.value());
        assert!(bridge.is_dirty());

        bridge.flush(&mut sink).unwrap();
        assert!(!bridge.is_dirty());
        assert_eq!(sink.stored, vec!["<p>ab</p>".to_string()]);
    }

    #[test]
    fn test_failed_flush_stays_dirty() {
        let mut bridge = SyncBridge::new();
        let mut sink = MemorySink {
            fail_next: true,
            ..Default::default()
        };

        bridge.note_change("<p>pending</p>");
        assert!(bridge.flush(&mut sink).is_err());
        assert!(bridge.is_dirty());

        // The next flush retries the same value.
        bridge.flush(&mut sink).unwrap();
        assert_eq!(sink.stored, vec!["<p>pending</p>".to_string()]);
        assert!(!bridge.is_dirty());
    }

    #[test]
    fn test_note_change_of_synced_value_is_ignored() {
        let mut surface = EditableSurface::new();
        let mut bridge = SyncBridge::new();

        bridge.load(&mut surface, "<p>same</p>");
        bridge.note_change(&surface.value());
        assert!(!bridge.is_dirty());
    }
}
