//! Hand-written mock ports shared by the integration tests.
//!
//! Every mock appends to one [`EventLog`] so tests can assert on the exact
//! interleaving of hardware, transport and collaborator calls.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

use ptcoach_core::{
    AgentConnection, AgentEvent, AgentEventSink, AgentPortError, AgentSessionConfig,
    AudioCategory, AudioHardwareError, AudioHardwarePort, AuthorizationStatus,
    CaptureCollaborator, ChannelEmitter, CollaboratorError, ConversationalAgentPort,
    PermissionProbe, ReportBackendPort, ReportPortError, ReportRequest, ReportResponse,
    SessionEvent, SessionEventEmitter, SpeechError, SpeechRecognizerPort, SpeechSynthesizerPort,
};
use ptcoach_voice::{
    AudioOperationQueue, CaptureCollaborators, PermissionSet, SessionCoordinator,
    SharedAudioHardware, VoiceSessionConfig, VoiceSessionManager,
};

// ── Event log ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|e| e == entry)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.position(entry).is_some()
    }
}

/// Tracks how many audio operations are running at once.
#[derive(Default)]
pub struct Activity {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Activity {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

// ── Agent transport ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connect,
    TransportError,
    Reject,
}

pub struct MockTransport {
    log: EventLog,
    connect_delay: Mutex<Duration>,
    interrupt_delay: Mutex<Duration>,
    script: Mutex<VecDeque<ConnectOutcome>>,
    fallback: Mutex<ConnectOutcome>,
    sinks: Mutex<Vec<AgentEventSink>>,
    connect_times: Mutex<Vec<Instant>>,
    configs: Mutex<Vec<AgentSessionConfig>>,
    connections: AtomicUsize,
}

impl MockTransport {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            connect_delay: Mutex::new(Duration::from_millis(50)),
            interrupt_delay: Mutex::new(Duration::ZERO),
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(ConnectOutcome::Connect),
            sinks: Mutex::new(Vec::new()),
            connect_times: Mutex::new(Vec::new()),
            configs: Mutex::new(Vec::new()),
            connections: AtomicUsize::new(0),
        }
    }

    pub fn set_connect_delay(&self, delay: Duration) {
        *self.connect_delay.lock().unwrap() = delay;
    }

    /// How long `interrupt` takes on connections opened afterwards.
    pub fn set_interrupt_delay(&self, delay: Duration) {
        *self.interrupt_delay.lock().unwrap() = delay;
    }

    /// Outcome used once the script runs out.
    pub fn set_fallback(&self, outcome: ConnectOutcome) {
        *self.fallback.lock().unwrap() = outcome;
    }

    pub fn script(&self, outcomes: impl IntoIterator<Item = ConnectOutcome>) {
        self.script.lock().unwrap().extend(outcomes);
    }

    pub fn connect_attempts(&self) -> usize {
        self.connect_times.lock().unwrap().len()
    }

    pub fn connect_times(&self) -> Vec<Instant> {
        self.connect_times.lock().unwrap().clone()
    }

    pub fn last_config(&self) -> Option<AgentSessionConfig> {
        self.configs.lock().unwrap().last().cloned()
    }

    /// Deliver `event` on the most recent session's callback channel.
    pub fn send(&self, event: AgentEvent) {
        let sinks = self.sinks.lock().unwrap();
        sinks
            .last()
            .expect("no session opened")
            .send(event)
            .expect("event pump gone");
    }
}

#[async_trait]
impl ConversationalAgentPort for MockTransport {
    async fn start_session(
        &self,
        config: AgentSessionConfig,
        events: AgentEventSink,
    ) -> Result<Box<dyn AgentConnection>, AgentPortError> {
        let agent_id = config.agent_id.clone();
        self.log.push(format!("connect {agent_id}"));
        self.connect_times.lock().unwrap().push(Instant::now());
        self.configs.lock().unwrap().push(config);

        let delay = *self.connect_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(*self.fallback.lock().unwrap());
        match outcome {
            ConnectOutcome::Connect => {
                let n = self.connections.fetch_add(1, Ordering::SeqCst) + 1;
                let conversation_id = format!("conv-{n}");
                let _ = events.send(AgentEvent::Connected {
                    conversation_id: conversation_id.clone(),
                });
                self.sinks.lock().unwrap().push(events);
                Ok(Box::new(MockConnection {
                    agent_id,
                    conversation_id,
                    log: self.log.clone(),
                    interrupt_delay: *self.interrupt_delay.lock().unwrap(),
                }))
            }
            ConnectOutcome::TransportError => Err(AgentPortError::Transport("network down".into())),
            ConnectOutcome::Reject => Err(AgentPortError::Rejected("agent disabled".into())),
        }
    }
}

pub struct MockConnection {
    agent_id: String,
    conversation_id: String,
    log: EventLog,
    interrupt_delay: Duration,
}

#[async_trait]
impl AgentConnection for MockConnection {
    async fn end_session(&self) -> Result<(), AgentPortError> {
        self.log.push(format!("end {}", self.agent_id));
        Ok(())
    }

    async fn start_recording(&self) -> Result<(), AgentPortError> {
        self.log.push("start_recording");
        Ok(())
    }

    async fn stop_recording(&self) -> Result<(), AgentPortError> {
        self.log.push("stop_recording");
        Ok(())
    }

    async fn interrupt(&self) -> Result<(), AgentPortError> {
        tokio::time::sleep(self.interrupt_delay).await;
        self.log.push("interrupt");
        Ok(())
    }

    fn conversation_id(&self) -> String {
        self.conversation_id.clone()
    }
}

// ── Audio hardware ─────────────────────────────────────────────────

pub struct MockHardware {
    log: EventLog,
    failures_left: AtomicUsize,
    pub activations: AtomicUsize,
    pub deactivations: AtomicUsize,
}

impl MockHardware {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            failures_left: AtomicUsize::new(0),
            activations: AtomicUsize::new(0),
            deactivations: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioHardwarePort for MockHardware {
    async fn activate(&self, category: AudioCategory) -> Result<(), AudioHardwareError> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            self.log.push("hw activate failed");
            return Err(AudioHardwareError::Category {
                category,
                reason: "route unavailable".into(),
            });
        }
        self.log.push("hw activate");
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), AudioHardwareError> {
        self.deactivations.fetch_add(1, Ordering::SeqCst);
        self.log.push("hw deactivate");
        Ok(())
    }
}

// ── Speech ─────────────────────────────────────────────────────────

pub struct MockSynthesizer {
    log: EventLog,
    activity: Arc<Activity>,
    duration: Duration,
    speaking: AtomicBool,
    pub finished_at: Mutex<Vec<Instant>>,
}

impl MockSynthesizer {
    pub fn new(log: EventLog, activity: Arc<Activity>, duration: Duration) -> Self {
        Self {
            log,
            activity,
            duration,
            speaking: AtomicBool::new(false),
            finished_at: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizerPort for MockSynthesizer {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.activity.enter();
        self.speaking.store(true, Ordering::SeqCst);
        self.log.push(format!("speak {text}"));
        tokio::time::sleep(self.duration).await;
        self.speaking.store(false, Ordering::SeqCst);
        self.finished_at.lock().unwrap().push(Instant::now());
        self.activity.exit();
        if text == "boom" {
            return Err(SpeechError::Synthesis("voice unavailable".into()));
        }
        Ok(())
    }

    fn stop(&self) {
        self.log.push("tts stop");
        self.speaking.store(false, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }
}

pub struct MockRecognizer {
    log: EventLog,
    activity: Arc<Activity>,
    listening: AtomicBool,
    fail_next_start: AtomicBool,
    pub started_at: Mutex<Vec<Instant>>,
    pub stopped_at: Mutex<Vec<Instant>>,
}

impl MockRecognizer {
    pub fn new(log: EventLog, activity: Arc<Activity>) -> Self {
        Self {
            log,
            activity,
            listening: AtomicBool::new(false),
            fail_next_start: AtomicBool::new(false),
            started_at: Mutex::new(Vec::new()),
            stopped_at: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next_start(&self) {
        self.fail_next_start.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpeechRecognizerPort for MockRecognizer {
    async fn start_listening(&self) -> Result<(), CollaboratorError> {
        if self.fail_next_start.swap(false, Ordering::SeqCst) {
            self.log.push("listen start failed");
            return Err(CollaboratorError::StartFailed {
                name: "recognizer".into(),
                reason: "microphone in use".into(),
            });
        }
        self.activity.enter();
        self.listening.store(true, Ordering::SeqCst);
        self.started_at.lock().unwrap().push(Instant::now());
        self.log.push("listen start");
        Ok(())
    }

    async fn stop_listening(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            self.activity.exit();
            self.stopped_at.lock().unwrap().push(Instant::now());
            self.log.push("listen stop");
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }
}

// ── Capture collaborators & permissions ────────────────────────────

pub struct MockCapture {
    name: &'static str,
    log: EventLog,
    ready_after: Duration,
}

impl MockCapture {
    pub fn new(name: &'static str, log: EventLog, ready_after: Duration) -> Self {
        Self {
            name,
            log,
            ready_after,
        }
    }
}

#[async_trait]
impl CaptureCollaborator for MockCapture {
    fn name(&self) -> &str {
        self.name
    }

    async fn start_session(&self) -> Result<(), CollaboratorError> {
        self.log.push(format!("{} start", self.name));
        Ok(())
    }

    async fn stop_session(&self) {
        self.log.push(format!("{} stop", self.name));
    }

    async fn clean_up(&self) {
        self.log.push(format!("{} clean", self.name));
    }

    async fn wait_ready(&self) {
        tokio::time::sleep(self.ready_after).await;
    }
}

pub struct StaticProbe {
    status: AuthorizationStatus,
    delay: Duration,
}

impl StaticProbe {
    pub fn arc(status: AuthorizationStatus, delay_ms: u64) -> Arc<dyn PermissionProbe> {
        Arc::new(Self {
            status,
            delay: Duration::from_millis(delay_ms),
        })
    }
}

#[async_trait]
impl PermissionProbe for StaticProbe {
    async fn status(&self) -> AuthorizationStatus {
        tokio::time::sleep(self.delay).await;
        self.status
    }

    async fn request(&self) -> bool {
        false
    }
}

// ── Report backend ─────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingBackend {
    pub requests: Mutex<Vec<ReportRequest>>,
    pub fail: bool,
}

#[async_trait]
impl ReportBackendPort for RecordingBackend {
    async fn generate_report(
        &self,
        request: &ReportRequest,
    ) -> Result<ReportResponse, ReportPortError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(ReportPortError::Unreachable("connection refused".into()));
        }
        Ok(ReportResponse {
            status: Some("success".into()),
            report_id: Some("r-1".into()),
            ..ReportResponse::default()
        })
    }
}

// ── Harness ────────────────────────────────────────────────────────

/// Speech takes this long in the mock synthesizer.
pub const SPEAK_DURATION: Duration = Duration::from_secs(2);

pub struct Harness {
    pub log: EventLog,
    pub activity: Arc<Activity>,
    pub transport: Arc<MockTransport>,
    pub hardware: Arc<MockHardware>,
    pub synthesizer: Arc<MockSynthesizer>,
    pub recognizer: Arc<MockRecognizer>,
    pub emitter: Arc<dyn SessionEventEmitter>,
    pub manager: VoiceSessionManager,
    pub queue: AudioOperationQueue,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(VoiceSessionConfig::default())
    }

    pub fn with_config(config: VoiceSessionConfig) -> Self {
        let log = EventLog::default();
        let activity = Arc::new(Activity::default());
        let transport = Arc::new(MockTransport::new(log.clone()));
        let hardware = Arc::new(MockHardware::new(log.clone()));
        let synthesizer = Arc::new(MockSynthesizer::new(
            log.clone(),
            Arc::clone(&activity),
            SPEAK_DURATION,
        ));
        let recognizer = Arc::new(MockRecognizer::new(log.clone(), Arc::clone(&activity)));
        let (emitter, events) = ChannelEmitter::new();
        let emitter: Arc<dyn SessionEventEmitter> = Arc::new(emitter);

        let shared = SharedAudioHardware::new(
            Arc::clone(&hardware) as Arc<dyn AudioHardwarePort>,
            config.hardware_poll,
            config.hardware_max_wait,
        );
        let manager = VoiceSessionManager::new(
            Arc::clone(&transport) as Arc<dyn ConversationalAgentPort>,
            shared,
            Arc::clone(&synthesizer) as Arc<dyn SpeechSynthesizerPort>,
            Arc::clone(&emitter),
            config,
        );
        let queue = AudioOperationQueue::new(
            manager.clone(),
            Arc::clone(&recognizer) as Arc<dyn SpeechRecognizerPort>,
            Arc::clone(&emitter),
        );

        Self {
            log,
            activity,
            transport,
            hardware,
            synthesizer,
            recognizer,
            emitter,
            manager,
            queue,
            events,
        }
    }

    /// Build a coordinator over this harness' manager and queue.
    pub fn coordinator(
        &self,
        permissions: PermissionSet,
        camera_ready_after: Duration,
    ) -> SessionCoordinator {
        let capture = CaptureCollaborators {
            camera: Arc::new(MockCapture::new("camera", self.log.clone(), camera_ready_after)),
            pose: Arc::new(MockCapture::new("pose", self.log.clone(), Duration::ZERO)),
        };
        SessionCoordinator::new(
            self.manager.clone(),
            self.queue.clone(),
            permissions,
            capture,
            Arc::clone(&self.emitter),
        )
    }

    /// Everything emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

pub fn granted_permissions() -> PermissionSet {
    PermissionSet::new(
        StaticProbe::arc(AuthorizationStatus::Authorized, 5),
        StaticProbe::arc(AuthorizationStatus::Authorized, 10),
        StaticProbe::arc(AuthorizationStatus::Authorized, 1),
    )
}

/// Let spawned tasks (event pump, teardown) run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
