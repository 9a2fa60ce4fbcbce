//! FIFO serializer for speak and listen operations.
//!
//! Only one operation touches the audio path at a time. Enqueueing onto an
//! idle queue spawns a drain task; the task exits (and clears `processing`
//! under the same lock) when it finds the queue empty, so the next enqueue
//! starts a fresh one.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use ptcoach_core::{AudioOperationKind, SessionEvent, SessionEventEmitter, SpeechRecognizerPort};

use crate::error::VoiceError;
use crate::manager::VoiceSessionManager;

/// A queued audio operation. Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioOperation {
    Speak(String),
    /// Listen until stopped, or for at most the given duration.
    Listen(Option<Duration>),
}

impl AudioOperation {
    #[must_use]
    pub const fn kind(&self) -> AudioOperationKind {
        match self {
            Self::Speak(_) => AudioOperationKind::Speak,
            Self::Listen(_) => AudioOperationKind::Listen,
        }
    }
}

/// How a queued operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Completed,
    /// The operation ran but its collaborator failed. The queue still advanced.
    Failed(String),
    /// Drained before it ran.
    Cancelled,
}

/// Resolves once the operation has finished. Dropping it is fine.
pub type OperationCompletion = oneshot::Receiver<OperationOutcome>;

struct Queued {
    operation: AudioOperation,
    done: oneshot::Sender<OperationOutcome>,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Queued>,
    processing: bool,
    current: Option<AudioOperationKind>,
    /// Stop token of the in-flight operation, created when it is dequeued.
    stop: Option<oneshot::Sender<()>>,
}

struct QueueInner {
    voice: VoiceSessionManager,
    recognizer: Arc<dyn SpeechRecognizerPort>,
    emitter: Arc<dyn SessionEventEmitter>,
    state: Mutex<QueueState>,
}

/// Serializes speak and listen requests.
#[derive(Clone)]
pub struct AudioOperationQueue {
    inner: Arc<QueueInner>,
}

impl AudioOperationQueue {
    pub fn new(
        voice: VoiceSessionManager,
        recognizer: Arc<dyn SpeechRecognizerPort>,
        emitter: Arc<dyn SessionEventEmitter>,
    ) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                voice,
                recognizer,
                emitter,
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// Queue `text` for local speech.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn enqueue_speak(&self, text: impl Into<String>) -> OperationCompletion {
        self.enqueue(AudioOperation::Speak(text.into()))
    }

    /// Queue a listen operation, auto-stopping after `duration` if given.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn enqueue_listen(&self, duration: Option<Duration>) -> OperationCompletion {
        self.enqueue(AudioOperation::Listen(duration))
    }

    pub fn enqueue(&self, operation: AudioOperation) -> OperationCompletion {
        let (done, completion) = oneshot::channel();
        let kind = operation.kind();

        let mut st = self.lock();
        st.pending.push_back(Queued { operation, done });
        let start = !st.processing;
        st.processing = true;
        let depth = st.pending.len();
        drop(st);

        tracing::debug!(?kind, depth, "Audio operation queued");
        if start {
            tokio::spawn(self.clone().run());
        }
        completion
    }

    /// End the in-flight listen operation, advancing the queue.
    ///
    /// The stop sticks to the operation, so it also lands while the listen
    /// is still interrupting agent speech.
    pub fn stop_listening(&self) {
        let stop = {
            let mut st = self.lock();
            if st.current == Some(AudioOperationKind::Listen) {
                st.stop.take()
            } else {
                None
            }
        };
        if let Some(stop) = stop {
            tracing::debug!("Stopping in-flight listen operation");
            let _ = stop.send(());
        }
    }

    /// Cancel everything pending, end an in-flight listen and stop the
    /// recognizer. Returns how many pending operations were cancelled.
    pub async fn drain(&self) -> usize {
        let cancelled: Vec<Queued> = {
            let mut st = self.lock();
            st.pending.drain(..).collect()
        };
        let count = cancelled.len();
        for queued in cancelled {
            // Receiver may already be gone.
            let _ = queued.done.send(OperationOutcome::Cancelled);
        }

        self.stop_listening();
        if self.inner.recognizer.is_listening() {
            self.inner.recognizer.stop_listening().await;
        }
        if count > 0 {
            tracing::info!(cancelled = count, "Audio queue drained");
        }
        count
    }

    /// Operations waiting behind the in-flight one.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.lock().processing
    }

    /// Kind of the operation currently running.
    #[must_use]
    pub fn current(&self) -> Option<AudioOperationKind> {
        self.lock().current
    }

    async fn run(self) {
        loop {
            let Some((next, stop)) = self.next_operation() else {
                tracing::trace!("Audio queue idle");
                return;
            };

            let kind = next.operation.kind();
            let outcome = match &next.operation {
                AudioOperation::Speak(text) => self.speak(text).await,
                AudioOperation::Listen(duration) => self.listen(*duration, stop).await,
            };

            {
                let mut st = self.lock();
                st.current = None;
                st.stop = None;
            }
            self.inner
                .emitter
                .emit(SessionEvent::AudioOperationFinished { kind });
            let _ = next.done.send(outcome);
        }
    }

    fn next_operation(&self) -> Option<(Queued, oneshot::Receiver<()>)> {
        let mut st = self.lock();
        let Some(next) = st.pending.pop_front() else {
            st.processing = false;
            st.current = None;
            st.stop = None;
            return None;
        };
        let (stop, stopped) = oneshot::channel();
        st.current = Some(next.operation.kind());
        st.stop = Some(stop);
        Some((next, stopped))
    }

    async fn speak(&self, text: &str) -> OperationOutcome {
        if self.inner.recognizer.is_listening() {
            self.inner.recognizer.stop_listening().await;
        }
        match self.inner.voice.speak(text).await {
            Ok(()) => OperationOutcome::Completed,
            // Already logged by the manager.
            Err(e) => OperationOutcome::Failed(e.to_string()),
        }
    }

    async fn listen(
        &self,
        duration: Option<Duration>,
        mut stopped: oneshot::Receiver<()>,
    ) -> OperationOutcome {
        self.inner.voice.stop_speaking().await;

        if !matches!(stopped.try_recv(), Err(TryRecvError::Empty)) {
            tracing::debug!("Listen stopped before the recognizer started");
            return OperationOutcome::Completed;
        }

        if let Err(e) = self.inner.recognizer.start_listening().await {
            let err = VoiceError::Recognition(e.to_string());
            tracing::warn!(error = %err, "Speech recognizer failed to start");
            return OperationOutcome::Failed(err.to_string());
        }
        tracing::debug!(?duration, "Listening");

        // A closed token means the operation was torn down; treat it as a stop.
        match duration {
            Some(limit) => {
                tokio::select! {
                    () = tokio::time::sleep(limit) => tracing::debug!("Listen duration elapsed"),
                    _ = &mut stopped => tracing::debug!("Listen stopped"),
                }
            }
            None => {
                let _ = stopped.await;
            }
        }

        self.inner.recognizer.stop_listening().await;
        OperationOutcome::Completed
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for AudioOperationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.lock();
        f.debug_struct("AudioOperationQueue")
            .field("pending", &st.pending.len())
            .field("processing", &st.processing)
            .field("current", &st.current)
            .finish()
    }
}
