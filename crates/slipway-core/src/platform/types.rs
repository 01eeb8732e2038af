//! Wire types for the platform API.

use crate::poll::Observation;
use serde::{Deserialize, Serialize};

/// Deployment lifecycle status as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployState {
    Queued,
    Building,
    Deploying,
    Ready,
    Failed,
    Error,
}

impl DeployState {
    /// True once no further status transitions can occur.
    pub fn is_terminal(self) -> bool {
        matches!(self, DeployState::Ready | DeployState::Failed | DeployState::Error)
    }

    pub fn is_success(self) -> bool {
        matches!(self, DeployState::Ready)
    }

    /// Map into the poll fragment's view of the world.
    pub fn observe(self) -> Observation {
        match self {
            DeployState::Ready => Observation::Ready,
            DeployState::Failed | DeployState::Error => Observation::Failed {
                status: self.label().to_string(),
            },
            DeployState::Queued | DeployState::Building | DeployState::Deploying => {
                Observation::Pending
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeployState::Queued => "queued",
            DeployState::Building => "building",
            DeployState::Deploying => "deploying",
            DeployState::Ready => "ready",
            DeployState::Failed => "failed",
            DeployState::Error => "error",
        }
    }
}

/// Provider-assigned deployment handle.
#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    pub id: String,
    pub status: DeployState,
}

/// One uploaded object in the deployment manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub key: String,
    pub size: u64,
    pub sha256: String,
}

/// Body of the create-deployment request.
#[derive(Debug, Clone, Serialize)]
pub struct DeployManifest {
    pub files: Vec<ManifestEntry>,
    /// Key of the source archive when archive upload mode is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_from_lowercase_json() {
        let d: Deployment =
            serde_json::from_str(r#"{"id":"dep-42","status":"building"}"#).unwrap();
        assert_eq!(d.id, "dep-42");
        assert_eq!(d.status, DeployState::Building);
    }

    #[test]
    fn terminality_table() {
        assert!(!DeployState::Queued.is_terminal());
        assert!(!DeployState::Building.is_terminal());
        assert!(!DeployState::Deploying.is_terminal());
        assert!(DeployState::Ready.is_terminal());
        assert!(DeployState::Failed.is_terminal());
        assert!(DeployState::Error.is_terminal());
        assert!(DeployState::Ready.is_success());
        assert!(!DeployState::Failed.is_success());
    }

    #[test]
    fn failed_states_observe_with_their_label() {
        match DeployState::Error.observe() {
            Observation::Failed { status } => assert_eq!(status, "error"),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(DeployState::Ready.observe(), Observation::Ready);
        assert_eq!(DeployState::Queued.observe(), Observation::Pending);
    }

    #[test]
    fn manifest_omits_missing_archive() {
        let m = DeployManifest {
            files: vec![ManifestEntry {
                key: "index.html".to_string(),
                size: 10,
                sha256: "ab".to_string(),
            }],
            archive: None,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("archive").is_none());
        assert_eq!(json["files"][0]["key"], "index.html");
    }
}
