//! Camera, microphone and speech-recognition authorization, checked together.

use std::fmt;
use std::sync::Arc;

use ptcoach_core::{AuthorizationStatus, PermissionProbe, PermissionReport};

/// The three authorization probes an exercise session depends on.
#[derive(Clone)]
pub struct PermissionSet {
    pub camera: Arc<dyn PermissionProbe>,
    pub microphone: Arc<dyn PermissionProbe>,
    pub speech_recognition: Arc<dyn PermissionProbe>,
}

impl PermissionSet {
    pub fn new(
        camera: Arc<dyn PermissionProbe>,
        microphone: Arc<dyn PermissionProbe>,
        speech_recognition: Arc<dyn PermissionProbe>,
    ) -> Self {
        Self {
            camera,
            microphone,
            speech_recognition,
        }
    }

    /// Query all three authorizations concurrently, prompting where the user
    /// has not decided yet.
    pub async fn check_all(&self) -> PermissionReport {
        let (camera, microphone, speech_recognition) = tokio::join!(
            ensure(self.camera.as_ref(), "camera"),
            ensure(self.microphone.as_ref(), "microphone"),
            ensure(self.speech_recognition.as_ref(), "speech_recognition"),
        );
        let report = PermissionReport {
            camera,
            microphone,
            speech_recognition,
        };
        if report.all_granted() {
            tracing::debug!("All permissions granted");
        } else {
            tracing::warn!(camera, microphone, speech_recognition, "Permissions missing");
        }
        report
    }
}

async fn ensure(probe: &dyn PermissionProbe, domain: &'static str) -> bool {
    match probe.status().await {
        AuthorizationStatus::Authorized => true,
        AuthorizationStatus::Denied => false,
        AuthorizationStatus::NotDetermined => {
            tracing::info!(domain, "Requesting authorization");
            probe.request().await
        }
    }
}

impl fmt::Debug for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionSet").finish_non_exhaustive()
    }
}
