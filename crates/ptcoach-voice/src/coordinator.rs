//! Exercise session orchestration.
//!
//! The coordinator holds handles to the voice manager, the audio queue and
//! the external collaborators; it owns none of them. Start and stop are
//! serialized by one async mutex over the `active` flag, so a stop issued
//! during a start runs after the start has settled.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use ptcoach_core::{
    AgentType, AudioCategory, CaptureCollaborator, ConversationMessage, ExerciseBackendPort,
    ExerciseMetrics, ExercisePlan, GenerateExercisesRequest, PermissionReport, ReportBackendPort,
    ReportRequest, ReportResponse, SessionEvent, SessionEventEmitter,
};

use crate::error::VoiceError;
use crate::manager::VoiceSessionManager;
use crate::permissions::PermissionSet;
use crate::queue::{AudioOperationQueue, OperationCompletion};

/// Camera capture and pose estimation, started and stopped as a pair.
#[derive(Clone)]
pub struct CaptureCollaborators {
    pub camera: Arc<dyn CaptureCollaborator>,
    pub pose: Arc<dyn CaptureCollaborator>,
}

/// Starts and stops full exercise sessions.
pub struct SessionCoordinator {
    voice: VoiceSessionManager,
    queue: AudioOperationQueue,
    permissions: PermissionSet,
    capture: CaptureCollaborators,
    emitter: Arc<dyn SessionEventEmitter>,
    report: Option<Arc<dyn ReportBackendPort>>,
    exercises: Option<Arc<dyn ExerciseBackendPort>>,
    fallback_patient_id: Option<String>,
    camera_ready_timeout: Duration,
    active: Mutex<bool>,
}

impl SessionCoordinator {
    pub fn new(
        voice: VoiceSessionManager,
        queue: AudioOperationQueue,
        permissions: PermissionSet,
        capture: CaptureCollaborators,
        emitter: Arc<dyn SessionEventEmitter>,
    ) -> Self {
        let camera_ready_timeout = voice.config().camera_ready_timeout;
        Self {
            voice,
            queue,
            permissions,
            capture,
            emitter,
            report: None,
            exercises: None,
            fallback_patient_id: None,
            camera_ready_timeout,
            active: Mutex::new(false),
        }
    }

    /// Export transcripts to `backend` when an exercise completes.
    #[must_use]
    pub fn with_report_backend(mut self, backend: Arc<dyn ReportBackendPort>) -> Self {
        self.report = Some(backend);
        self
    }

    /// Fetch the exercise plan from `backend` once onboarding finishes.
    #[must_use]
    pub fn with_exercise_backend(mut self, backend: Arc<dyn ExerciseBackendPort>) -> Self {
        self.exercises = Some(backend);
        self
    }

    /// Patient id used for reports when onboarding did not capture one.
    #[must_use]
    pub fn with_fallback_patient_id(mut self, patient_id: Option<String>) -> Self {
        self.fallback_patient_id = patient_id;
        self
    }

    #[must_use]
    pub const fn voice(&self) -> &VoiceSessionManager {
        &self.voice
    }

    #[must_use]
    pub const fn queue(&self) -> &AudioOperationQueue {
        &self.queue
    }

    pub async fn is_active(&self) -> bool {
        *self.active.lock().await
    }

    pub async fn check_all_permissions(&self) -> PermissionReport {
        self.permissions.check_all().await
    }

    /// Start camera, pose estimation and the exercise coach.
    ///
    /// Missing permissions fail with [`VoiceError::PermissionDenied`] before
    /// anything is touched. A voice start failure does not fail the session;
    /// the manager's reconnection policy handles it.
    pub async fn start_exercise_session(&self) -> Result<(), VoiceError> {
        let mut active = self.active.lock().await;
        if *active {
            tracing::debug!("Exercise session already active");
            return Ok(());
        }

        let report = self.permissions.check_all().await;
        if !report.all_granted() {
            self.emitter.emit(SessionEvent::PermissionsDenied { report });
            return Err(VoiceError::PermissionDenied(report));
        }

        let hardware = self.voice.hardware();
        hardware.configure(AudioCategory::PlayAndRecord).await?;
        if let Err(e) = self.start_capture().await {
            tracing::error!(error = %e, "Exercise session failed to start");
            if let Err(e) = hardware.deactivate().await {
                tracing::warn!(error = %e, "Failed to release audio hardware after start failure");
            }
            return Err(e);
        }

        *active = true;
        drop(active);
        tracing::info!("Exercise session started");
        self.emitter.emit(SessionEvent::ExerciseSessionStarted);

        if let Err(e) = self.voice.start_session(AgentType::ExerciseCoach).await {
            tracing::warn!(error = %e, "Exercise coach did not connect");
        }
        Ok(())
    }

    async fn start_capture(&self) -> Result<(), VoiceError> {
        let CaptureCollaborators { camera, pose } = &self.capture;

        camera.start_session().await?;
        if tokio::time::timeout(self.camera_ready_timeout, camera.wait_ready())
            .await
            .is_err()
        {
            tracing::error!(timeout = ?self.camera_ready_timeout, "Camera did not become ready");
            shut_down(camera.as_ref()).await;
            return Err(VoiceError::CameraTimeout(self.camera_ready_timeout));
        }

        if let Err(e) = pose.start_session().await {
            shut_down(camera.as_ref()).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Stop everything the exercise session started. Safe to call when inactive.
    pub async fn stop_exercise_session(&self) {
        let mut active = self.active.lock().await;
        if !*active {
            tracing::debug!("No exercise session to stop");
            return;
        }

        self.queue.drain().await;
        shut_down(self.capture.camera.as_ref()).await;
        shut_down(self.capture.pose.as_ref()).await;
        self.voice.stop_speaking().await;
        self.voice.end_session().await;
        if let Err(e) = self.voice.hardware().deactivate().await {
            tracing::warn!(error = %e, "Audio hardware deactivation failed");
        }

        *active = false;
        drop(active);
        tracing::info!("Exercise session stopped");
        self.emitter.emit(SessionEvent::ExerciseSessionStopped);
    }

    /// Export the transcript for `exercise_id`, then stop the session and
    /// clear per-exercise data.
    ///
    /// Returns `Ok(None)` when no backend or patient id is available. The
    /// session is stopped and the transcript cleared even if the export fails.
    pub async fn complete_exercise_session(
        &self,
        exercise_id: &str,
    ) -> Result<Option<ReportResponse>, VoiceError> {
        let transcript = self.voice.transcript();
        let metrics = ExerciseMetrics::extract(&transcript);
        tracing::info!(
            exercise_id,
            messages = transcript.len(),
            sets = metrics.sets_completed,
            reps = metrics.reps_completed,
            minutes = metrics.duration_minutes,
            "Exercise completed"
        );

        let exported = self.export(exercise_id, transcript).await;

        self.stop_exercise_session().await;
        self.voice.clear_transcript();
        self.voice.outputs().clear_exercise_data();
        exported
    }

    async fn export(
        &self,
        exercise_id: &str,
        conversation_history: Vec<ConversationMessage>,
    ) -> Result<Option<ReportResponse>, VoiceError> {
        let Some(backend) = &self.report else {
            tracing::debug!("No report backend configured");
            return Ok(None);
        };
        let Some(patient_id) = self
            .voice
            .outputs()
            .patient_id()
            .or_else(|| self.fallback_patient_id.clone())
        else {
            tracing::warn!(exercise_id, "No patient id, skipping report export");
            return Ok(None);
        };

        let request = ReportRequest {
            patient_id,
            exercise_id: exercise_id.to_owned(),
            conversation_history,
        };
        let response = backend.generate_report(&request).await.map_err(|e| {
            tracing::error!(exercise_id, error = %e, "Report export failed");
            VoiceError::from(e)
        })?;

        if response.is_success() {
            tracing::info!(exercise_id, report_id = ?response.report_id, "Exercise report generated");
            Ok(Some(response))
        } else {
            let reason = response
                .error
                .or(response.status)
                .unwrap_or_else(|| "unknown status".to_owned());
            tracing::error!(exercise_id, %reason, "Report backend returned an error");
            Err(VoiceError::Report(reason))
        }
    }

    pub async fn start_onboarding(&self) -> Result<(), VoiceError> {
        self.voice.start_session(AgentType::Onboarding).await
    }

    /// End the onboarding conversation and hand the patient id it captured
    /// to the exercise backend.
    ///
    /// Returns `Ok(None)` while onboarding is incomplete, or when no backend
    /// or patient id is available.
    pub async fn finish_onboarding(&self) -> Result<Option<ExercisePlan>, VoiceError> {
        if self.voice.active_agent() == Some(AgentType::Onboarding) {
            self.voice.end_session().await;
        }

        let outputs = self.voice.outputs();
        if !outputs.onboarding_complete() {
            tracing::debug!("Onboarding not complete, no exercise plan yet");
            return Ok(None);
        }
        let Some(backend) = &self.exercises else {
            tracing::debug!("No exercise backend configured");
            return Ok(None);
        };
        let Some(patient_id) = outputs.patient_id() else {
            tracing::warn!("Onboarding completed without a patient id");
            return Ok(None);
        };

        let request = GenerateExercisesRequest::for_patient(patient_id.clone());
        let plan = backend.generate_exercises(&request).await.map_err(|e| {
            tracing::error!(%patient_id, error = %e, "Exercise plan request failed");
            VoiceError::from(e)
        })?;

        tracing::info!(%patient_id, exercises = plan.exercises.len(), "Exercise plan ready");
        self.emitter.emit(SessionEvent::ExercisePlanReady {
            patient_id,
            exercise_count: plan.exercises.len(),
        });
        Ok(Some(plan))
    }

    pub async fn start_coaching(&self) -> Result<(), VoiceError> {
        self.voice.start_session(AgentType::ExerciseCoach).await
    }

    pub fn queue_speech(&self, text: impl Into<String>) -> OperationCompletion {
        self.queue.enqueue_speak(text)
    }

    pub fn queue_listen(&self, duration: Option<Duration>) -> OperationCompletion {
        self.queue.enqueue_listen(duration)
    }

    pub fn stop_listening(&self) {
        self.queue.stop_listening();
    }
}

async fn shut_down(collaborator: &dyn CaptureCollaborator) {
    tracing::debug!(name = collaborator.name(), "Stopping collaborator");
    collaborator.stop_session().await;
    collaborator.clean_up().await;
}

impl fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("voice", &self.voice)
            .field("queue", &self.queue)
            .field("has_report_backend", &self.report.is_some())
            .field("has_exercise_backend", &self.exercises.is_some())
            .finish_non_exhaustive()
    }
}
