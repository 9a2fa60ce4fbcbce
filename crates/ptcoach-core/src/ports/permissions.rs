//! Authorization collaborators (camera, microphone, speech recognition).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Tri-state authorization as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    /// The user has not been asked yet.
    NotDetermined,
    /// The user (or a policy) refused access.
    Denied,
    Authorized,
}

/// One authorization domain, queried asynchronously.
#[async_trait]
pub trait PermissionProbe: Send + Sync {
    /// Current authorization without prompting the user.
    async fn status(&self) -> AuthorizationStatus;

    /// Prompt the user; resolves to whether access was granted.
    async fn request(&self) -> bool;
}

/// Outcome of checking all three authorizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionReport {
    pub camera: bool,
    pub microphone: bool,
    pub speech_recognition: bool,
}

impl PermissionReport {
    /// Logical AND of the three checks.
    #[must_use]
    pub const fn all_granted(&self) -> bool {
        self.camera && self.microphone && self.speech_recognition
    }
}
