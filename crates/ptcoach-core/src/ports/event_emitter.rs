//! Event emitter trait for pushing session events to the UI layer.
//!
//! Implementations handle transport details (channels, platform bridges).

use tokio::sync::mpsc;

use crate::events::SessionEvent;

/// Trait for emitting session events.
///
/// This abstraction keeps channel types out of the public API surface of the
/// session manager and coordinator.
///
/// # Implementations
///
/// - [`NoopEmitter`] - For tests and CLI contexts that don't need events
/// - [`ChannelEmitter`] - Forwards into an unbounded tokio channel
pub trait SessionEventEmitter: Send + Sync {
    /// Emit a session event.
    ///
    /// This method must not block.
    fn emit(&self, event: SessionEvent);
}

/// A no-op event emitter.
#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub const fn new() -> Self {
        Self
    }
}

impl SessionEventEmitter for NoopEmitter {
    fn emit(&self, _event: SessionEvent) {}
}

/// Emitter backed by an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelEmitter {
    /// Create an emitter and the receiver that observes its events.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SessionEventEmitter for ChannelEmitter {
    fn emit(&self, event: SessionEvent) {
        // Best-effort: a dropped receiver just means nobody is listening.
        if self.tx.send(event).is_err() {
            tracing::trace!("Session event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn noop_emitter_discards() {
        let emitter: Arc<dyn SessionEventEmitter> = Arc::new(NoopEmitter::new());
        emitter.emit(SessionEvent::ExerciseSessionStarted);
    }

    #[test]
    fn channel_emitter_forwards_in_order() {
        let (emitter, mut rx) = ChannelEmitter::new();
        emitter.emit(SessionEvent::ExerciseSessionStarted);
        emitter.emit(SessionEvent::ExerciseSessionStopped);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::ExerciseSessionStarted);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::ExerciseSessionStopped);
    }

    #[test]
    fn channel_emitter_survives_dropped_receiver() {
        let (emitter, rx) = ChannelEmitter::new();
        drop(rx);
        emitter.emit(SessionEvent::ExerciseSessionStarted);
    }
}
