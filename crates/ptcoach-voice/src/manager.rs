//! Voice session manager: the single owner of the remote agent connection.
//!
//! ```text
//!   Idle → Requesting → Connecting → Connected
//!    ▲                                   │
//!    └──────────── Disconnecting ◀───────┘
//! ```
//!
//! At most one agent session exists at a time. Every transition happens
//! under one state mutex, and the mutex is never held across an `.await`:
//! each async operation claims its step under the lock, releases it, awaits
//! the platform, then re-checks that its claim is still current before
//! committing. A teardown bumps `start_seq`, which is how an in-flight start
//! learns it was cancelled, and `epoch`, which is how a pending reconnect
//! timer learns it is stale.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;

use ptcoach_core::{
    AgentErrorKind, AgentEvent, AgentSessionConfig, AgentType, AudioCategory,
    ConversationMessage, ConversationalAgentPort, Mode, SessionEvent, SessionEventEmitter,
    SessionPhase, SessionState, SpeechSynthesizerPort,
};

use crate::config::VoiceSessionConfig;
use crate::error::VoiceError;
use crate::hardware::SharedAudioHardware;
use crate::session::AgentSession;
use crate::tools::{SharedOutputs, build_tools};

// ── State ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ManagerState {
    phase: SessionPhase,
    /// Agent the current phase belongs to.
    agent: Option<AgentType>,
    /// Per-agent "start requested" flags, indexed by [`AgentType::index`].
    requested: [bool; AgentType::ALL.len()],
    session: Option<Arc<AgentSession>>,
    cleaning_up: bool,
    mode: Mode,
    reconnect_attempts: u32,
    /// Bumped on every teardown and explicit end.
    epoch: u64,
    /// Identifies the start attempt that owns the current phase.
    start_seq: u64,
    transcript: Vec<ConversationMessage>,
}

impl ManagerState {
    fn owns(&self, agent: AgentType, seq: u64) -> bool {
        self.start_seq == seq && self.requested[agent.index()] && !self.cleaning_up
    }

    fn is_idle(&self) -> bool {
        self.session.is_none() && self.phase == SessionPhase::Idle && !self.requested.contains(&true)
    }
}

enum Admission {
    Accepted(u64),
    Supersede(Option<AgentType>),
    Skip(&'static str),
}

enum Teardown {
    Skip,
    Run {
        session: Option<Arc<AgentSession>>,
        epoch: u64,
    },
}

struct Inner {
    transport: Arc<dyn ConversationalAgentPort>,
    hardware: SharedAudioHardware,
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    emitter: Arc<dyn SessionEventEmitter>,
    outputs: SharedOutputs,
    config: VoiceSessionConfig,
    state: Mutex<ManagerState>,
}

// ── Manager ────────────────────────────────────────────────────────

/// Owns the lifecycle of the one remote agent session.
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct VoiceSessionManager {
    inner: Arc<Inner>,
}

impl VoiceSessionManager {
    pub fn new(
        transport: Arc<dyn ConversationalAgentPort>,
        hardware: SharedAudioHardware,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        emitter: Arc<dyn SessionEventEmitter>,
        config: VoiceSessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                hardware,
                synthesizer,
                emitter,
                outputs: SharedOutputs::new(),
                config,
                state: Mutex::new(ManagerState::default()),
            }),
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    /// Coarse connection state for the UI.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.phase().state()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.lock().mode
    }

    /// Agent of the current (or in-flight) session.
    #[must_use]
    pub fn active_agent(&self) -> Option<AgentType> {
        self.lock().agent
    }

    #[must_use]
    pub fn is_requested(&self, agent: AgentType) -> bool {
        self.lock().requested[agent.index()]
    }

    #[must_use]
    pub fn is_cleaning_up(&self) -> bool {
        self.lock().cleaning_up
    }

    #[must_use]
    pub fn conversation_id(&self) -> Option<String> {
        self.lock()
            .session
            .as_ref()
            .map(|s| s.conversation_id().to_owned())
    }

    /// Reconnection attempts made since the last successful connect.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.lock().reconnect_attempts
    }

    /// Whether the agent or the local synthesizer is currently speaking.
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.mode() == Mode::Speaking || self.inner.synthesizer.is_speaking()
    }

    /// Values the agents pushed back through client tools.
    #[must_use]
    pub fn outputs(&self) -> &SharedOutputs {
        &self.inner.outputs
    }

    #[must_use]
    pub fn hardware(&self) -> &SharedAudioHardware {
        &self.inner.hardware
    }

    #[must_use]
    pub fn config(&self) -> &VoiceSessionConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn transcript(&self) -> Vec<ConversationMessage> {
        self.lock().transcript.clone()
    }

    pub fn clear_transcript(&self) {
        self.lock().transcript.clear();
    }

    // ── Start ──────────────────────────────────────────────────────

    /// Start a session with `agent`.
    ///
    /// Duplicate requests, requests during cleanup and onboarding after it
    /// completed return `Ok(())` without doing anything. If another agent's
    /// session is live it is torn down first and the start is retried, up to
    /// `max_supersede_retries` times.
    pub async fn start_session(&self, agent: AgentType) -> Result<(), VoiceError> {
        let mut superseded = 0;
        loop {
            match self.admit(agent) {
                Admission::Skip(reason) => {
                    tracing::debug!(%agent, reason, "Ignoring voice session start");
                    return Ok(());
                }
                Admission::Supersede(active) => {
                    if superseded >= self.inner.config.max_supersede_retries {
                        tracing::warn!(%agent, ?active, attempts = superseded, "Could not supersede active voice session");
                        return Err(VoiceError::SessionBusy);
                    }
                    superseded += 1;
                    tracing::info!(%agent, ?active, "Superseding active voice session");
                    self.end_session().await;
                    tokio::time::sleep(self.inner.config.supersede_settle).await;
                }
                Admission::Accepted(seq) => return self.connect(agent, seq).await,
            }
        }
    }

    fn admit(&self, agent: AgentType) -> Admission {
        let onboarded = agent == AgentType::Onboarding && self.inner.outputs.onboarding_complete();

        let mut st = self.lock();
        if st.cleaning_up {
            return Admission::Skip("cleanup in progress");
        }
        if st.requested[agent.index()] {
            return Admission::Skip("already requested");
        }
        if onboarded {
            return Admission::Skip("onboarding already complete");
        }
        if !st.is_idle() {
            return Admission::Supersede(st.agent);
        }

        st.requested[agent.index()] = true;
        st.agent = Some(agent);
        st.phase = SessionPhase::Requesting;
        st.start_seq += 1;
        let seq = st.start_seq;
        drop(st);

        self.emit_phase(Some(agent), SessionPhase::Requesting);
        Admission::Accepted(seq)
    }

    async fn connect(&self, agent: AgentType, seq: u64) -> Result<(), VoiceError> {
        if let Err(e) = self.configure_hardware().await {
            tracing::error!(%agent, error = %e, "Audio hardware unavailable for voice session");
            self.abandon_start(agent, seq);
            return Err(e);
        }
        if !self.advance(agent, seq, SessionPhase::Connecting) {
            tracing::info!(%agent, "Voice session start cancelled before connecting");
            self.release_hardware_if_idle().await;
            return Err(VoiceError::Cancelled);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(pump_events(Arc::downgrade(&self.inner), agent, seq, rx));
        let config = AgentSessionConfig {
            agent_id: agent.agent_id().to_owned(),
            tools: build_tools(agent, &self.inner.outputs, &self.inner.emitter),
        };
        tracing::info!(%agent, agent_id = %config.agent_id, tools = config.tools.len(), "Connecting to agent");

        match self.inner.transport.start_session(config, tx).await {
            Ok(connection) => {
                let session = Arc::new(AgentSession::new(agent, connection, pump));
                if self.install(agent, seq, &session) {
                    tracing::info!(%agent, conversation_id = session.conversation_id(), "Voice session connected");
                    return Ok(());
                }

                tracing::info!(%agent, "Voice session start cancelled while connecting");
                if let Err(e) = session.end().await {
                    tracing::warn!(%agent, error = %e, "Failed to close cancelled agent session");
                }
                self.release_hardware_if_idle().await;
                Err(VoiceError::Cancelled)
            }
            Err(e) => {
                pump.abort();
                let err = VoiceError::from(e);
                tracing::warn!(%agent, error = %err, "Agent connection failed");
                let owned = self.abandon_start(agent, seq);
                self.release_hardware_if_idle().await;
                if let Some(epoch) = owned.filter(|_| err.is_transport()) {
                    self.schedule_reconnect(agent, epoch);
                }
                Err(err)
            }
        }
    }

    /// Configure for voice, resetting the hardware and retrying once on failure.
    async fn configure_hardware(&self) -> Result<(), VoiceError> {
        let hw = &self.inner.hardware;
        match hw.configure(AudioCategory::PlayAndRecord).await {
            Err(VoiceError::AudioConfiguration(reason)) => {
                tracing::warn!(%reason, "Audio configuration failed, resetting hardware and retrying");
                if let Err(e) = hw.deactivate().await {
                    tracing::debug!(error = %e, "Hardware reset before retry failed");
                }
                hw.configure(AudioCategory::PlayAndRecord).await
            }
            other => other,
        }
    }

    fn advance(&self, agent: AgentType, seq: u64, phase: SessionPhase) -> bool {
        let mut st = self.lock();
        if !st.owns(agent, seq) {
            return false;
        }
        st.phase = phase;
        drop(st);
        self.emit_phase(Some(agent), phase);
        true
    }

    fn install(&self, agent: AgentType, seq: u64, session: &Arc<AgentSession>) -> bool {
        let mut st = self.lock();
        if !st.owns(agent, seq) {
            return false;
        }
        st.session = Some(Arc::clone(session));
        st.phase = SessionPhase::Connected;
        st.mode = Mode::Listening;
        st.reconnect_attempts = 0;
        drop(st);
        self.emit_phase(Some(agent), SessionPhase::Connected);
        true
    }

    /// Roll back a failed start. Returns the epoch it was rolled back in,
    /// or `None` if the start was already cancelled by someone else.
    fn abandon_start(&self, agent: AgentType, seq: u64) -> Option<u64> {
        let mut st = self.lock();
        if st.start_seq != seq {
            return None;
        }
        st.requested[agent.index()] = false;
        if st.session.is_none() {
            st.phase = SessionPhase::Idle;
            st.agent = None;
        }
        let epoch = st.epoch;
        drop(st);
        self.emit_phase(None, SessionPhase::Idle);
        Some(epoch)
    }

    async fn release_hardware_if_idle(&self) {
        let idle = {
            let st = self.lock();
            st.is_idle() && !st.cleaning_up
        };
        if idle {
            if let Err(e) = self.inner.hardware.deactivate().await {
                tracing::warn!(error = %e, "Failed to release audio hardware");
            }
        }
    }

    // ── End ────────────────────────────────────────────────────────

    /// End the current session and release the audio hardware.
    ///
    /// Also cancels an in-flight start and any pending reconnection. Safe to
    /// call repeatedly; calls made while a cleanup runs return immediately.
    pub async fn end_session(&self) {
        self.teardown(true).await;
    }

    /// Returns the epoch the teardown ran in, or `None` if it was skipped.
    async fn teardown(&self, explicit: bool) -> Option<u64> {
        let (session, epoch) = match self.begin_teardown(explicit) {
            Teardown::Skip => return None,
            Teardown::Run { session, epoch } => (session, epoch),
        };

        if let Some(session) = session {
            if let Err(e) = session.end().await {
                tracing::warn!(agent = %session.agent(), error = %e, "Ending agent session failed, continuing teardown");
            }
        }
        tokio::time::sleep(self.inner.config.teardown_settle).await;
        if let Err(e) = self.inner.hardware.deactivate().await {
            tracing::warn!(error = %e, "Audio hardware deactivation failed during teardown");
        }
        self.finish_teardown();
        Some(epoch)
    }

    fn begin_teardown(&self, explicit: bool) -> Teardown {
        let mut st = self.lock();
        // An explicit end also voids the reconnect of a teardown already running.
        if explicit {
            st.epoch += 1;
            st.reconnect_attempts = 0;
        }
        if st.cleaning_up {
            tracing::debug!("Voice session cleanup already in progress");
            return Teardown::Skip;
        }
        if !explicit {
            st.epoch += 1;
        }
        if st.is_idle() {
            tracing::debug!("No voice session to end");
            return Teardown::Skip;
        }

        st.cleaning_up = true;
        st.start_seq += 1;
        st.phase = SessionPhase::Disconnecting;
        let agent = st.agent;
        let session = st.session.take();
        let epoch = st.epoch;
        drop(st);

        tracing::info!(?agent, explicit, "Ending voice session");
        self.emit_phase(agent, SessionPhase::Disconnecting);
        Teardown::Run { session, epoch }
    }

    fn finish_teardown(&self) {
        let mut st = self.lock();
        st.requested = [false; AgentType::ALL.len()];
        st.phase = SessionPhase::Idle;
        st.agent = None;
        st.mode = Mode::Listening;
        st.cleaning_up = false;
        drop(st);

        self.emit_phase(None, SessionPhase::Idle);
        tracing::info!("Voice session ended");
    }

    // ── Agent callbacks ────────────────────────────────────────────

    fn handle_agent_event(&self, agent: AgentType, seq: u64, event: AgentEvent) {
        let mut st = self.lock();
        if st.start_seq != seq {
            tracing::trace!(%agent, ?event, "Dropping event from stale agent session");
            return;
        }

        match event {
            AgentEvent::Connected { conversation_id } => {
                drop(st);
                tracing::debug!(%agent, %conversation_id, "Agent reported connected");
            }
            AgentEvent::ModeChanged(mode) => {
                let changed = st.mode != mode;
                st.mode = mode;
                drop(st);
                if changed {
                    tracing::debug!(%agent, ?mode, "Agent mode changed");
                    self.inner.emitter.emit(SessionEvent::ModeChanged { mode });
                }
            }
            AgentEvent::VolumeUpdate(level) => {
                drop(st);
                self.inner.emitter.emit(SessionEvent::VolumeUpdate {
                    level: level.clamp(0.0, 1.0),
                });
            }
            AgentEvent::Message { text, role } => {
                st.transcript.push(ConversationMessage {
                    role,
                    content: text.clone(),
                });
                drop(st);
                self.inner
                    .emitter
                    .emit(SessionEvent::Message { role, content: text });
            }
            AgentEvent::Disconnected => {
                let cleaning = st.cleaning_up;
                drop(st);
                if !cleaning {
                    tracing::info!(%agent, "Agent disconnected");
                    self.spawn_teardown(agent, false);
                }
            }
            AgentEvent::Error {
                kind,
                code,
                details,
            } => {
                let cleaning = st.cleaning_up;
                drop(st);
                if cleaning {
                    return;
                }
                tracing::error!(%agent, ?kind, %code, %details, "Agent reported an error");
                self.inner.emitter.emit(SessionEvent::AgentError {
                    agent,
                    code,
                    details,
                });
                self.spawn_teardown(agent, kind == AgentErrorKind::Transport);
            }
        }
    }

    fn spawn_teardown(&self, agent: AgentType, reconnect: bool) {
        let manager = self.clone();
        tokio::spawn(async move {
            if let Some(epoch) = manager.teardown(false).await.filter(|_| reconnect) {
                manager.schedule_reconnect(agent, epoch);
            }
        });
    }

    // ── Reconnection ───────────────────────────────────────────────

    /// Schedule the next reconnection attempt, unless an explicit end has
    /// moved the epoch past `epoch` since the failure was observed.
    fn schedule_reconnect(&self, agent: AgentType, epoch: u64) {
        if agent == AgentType::Onboarding && self.inner.outputs.onboarding_complete() {
            tracing::debug!("Onboarding complete, not reconnecting");
            return;
        }

        let (attempt, delay) = {
            let mut st = self.lock();
            if st.epoch != epoch {
                tracing::debug!(%agent, "Voice session ended explicitly, not reconnecting");
                return;
            }
            let attempt = st.reconnect_attempts;
            let Some(delay) = self.inner.config.reconnect.delay_for(attempt) else {
                st.reconnect_attempts = 0;
                if st.session.is_none() {
                    st.requested[agent.index()] = false;
                }
                drop(st);
                tracing::warn!(%agent, attempts = attempt, "Reconnection attempts exhausted");
                self.inner
                    .emitter
                    .emit(SessionEvent::ReconnectExhausted { agent });
                return;
            };
            st.reconnect_attempts = attempt + 1;
            (attempt, delay)
        };

        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(%agent, attempt, delay_ms, "Scheduling agent reconnection");
        self.inner.emitter.emit(SessionEvent::ReconnectScheduled {
            agent,
            attempt,
            delay_ms,
        });

        let manager = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !manager.reconnect_still_wanted(agent, epoch) {
                tracing::debug!(%agent, attempt, "Dropping stale reconnection");
                return;
            }
            if let Err(e) = manager.start_session(agent).await {
                tracing::warn!(%agent, attempt, error = %e, "Reconnection attempt failed");
            }
        });
    }

    fn reconnect_still_wanted(&self, agent: AgentType, epoch: u64) -> bool {
        if agent == AgentType::Onboarding && self.inner.outputs.onboarding_complete() {
            return false;
        }
        let st = self.lock();
        st.epoch == epoch && st.is_idle() && !st.cleaning_up
    }

    // ── Audio control ──────────────────────────────────────────────

    /// Stop sending microphone audio to the agent. No-op when not connected.
    pub async fn pause_listening(&self) -> Result<(), VoiceError> {
        let Some(session) = self.connected_session() else {
            tracing::debug!("No connected session, nothing to pause");
            return Ok(());
        };
        session.stop_recording().await?;
        tracing::debug!(agent = %session.agent(), "Agent listening paused");
        Ok(())
    }

    /// Resume sending microphone audio to the agent. No-op when not connected.
    pub async fn resume_listening(&self) -> Result<(), VoiceError> {
        let Some(session) = self.connected_session() else {
            tracing::debug!("No connected session, nothing to resume");
            return Ok(());
        };
        session.start_recording().await?;
        tracing::debug!(agent = %session.agent(), "Agent listening resumed");
        Ok(())
    }

    /// Speak `text` with the local synthesizer, resolving when it finishes.
    pub async fn speak(&self, text: &str) -> Result<(), VoiceError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        tracing::debug!(chars = text.len(), "Speaking locally");
        self.inner.synthesizer.speak(text).await.map_err(|e| {
            tracing::warn!(error = %e, "Local speech failed");
            VoiceError::from(e)
        })
    }

    /// Interrupt the agent if it is speaking and stop any local utterance.
    pub async fn stop_speaking(&self) {
        let session = {
            let st = self.lock();
            if st.mode == Mode::Speaking {
                st.session.clone()
            } else {
                None
            }
        };
        if let Some(session) = session {
            if let Err(e) = session.interrupt().await {
                tracing::warn!(agent = %session.agent(), error = %e, "Failed to interrupt agent");
            }
        }
        if self.inner.synthesizer.is_speaking() {
            self.inner.synthesizer.stop();
        }
    }

    fn connected_session(&self) -> Option<Arc<AgentSession>> {
        let st = self.lock();
        if st.phase == SessionPhase::Connected {
            st.session.clone()
        } else {
            None
        }
    }

    fn emit_phase(&self, agent: Option<AgentType>, phase: SessionPhase) {
        tracing::debug!(?agent, ?phase, "Voice session phase transition");
        self.inner
            .emitter
            .emit(SessionEvent::PhaseChanged { agent, phase });
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for VoiceSessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.lock();
        f.debug_struct("VoiceSessionManager")
            .field("phase", &st.phase)
            .field("agent", &st.agent)
            .field("requested", &st.requested)
            .field("cleaning_up", &st.cleaning_up)
            .finish_non_exhaustive()
    }
}

/// Forward transport callbacks into the manager until the stream closes.
///
/// Holds only a weak reference so a live connection does not keep a dropped
/// manager alive.
async fn pump_events(
    inner: Weak<Inner>,
    agent: AgentType,
    seq: u64,
    mut events: mpsc::UnboundedReceiver<AgentEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        VoiceSessionManager { inner }.handle_agent_event(agent, seq, event);
    }
    tracing::trace!(%agent, "Agent event stream closed");
}
