//! Poll a remote status on a fixed interval until it reaches a terminal
//! state or the attempt budget runs out.
//!
//! Three outcomes are kept distinct on purpose: an explicit remote failure
//! stops immediately and carries whatever diagnostics the probe can fetch;
//! a still-pending status keeps polling; an exhausted budget is ambiguous,
//! so it gets its own error kind and the operator is told to check state
//! manually instead of being shown a generic failure.

use crate::config::PollConfig;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// One observation of the remote status, as seen by the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Terminal success.
    Ready,
    /// Not terminal yet; keep polling.
    Pending,
    /// Terminal failure, with the remote status label.
    Failed { status: String },
}

/// Source of status observations plus best-effort failure diagnostics.
#[async_trait]
pub trait StatusProbe {
    /// Fetch the current remote status.
    async fn fetch(&mut self) -> anyhow::Result<Observation>;

    /// Fetch supplementary diagnostic detail (e.g. build logs) after an
    /// explicit failure. Best effort; `None` when unavailable.
    async fn diagnostics(&mut self) -> Option<String>;
}

/// Interval and attempt budget for one poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(cfg: &PollConfig) -> Self {
        Self {
            interval: Duration::from_secs(cfg.interval_secs),
            max_attempts: cfg.max_attempts.max(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    /// The remote reported a terminal failure state.
    #[error("remote reported terminal state '{status}'")]
    Failed {
        status: String,
        diagnostics: Option<String>,
    },
    /// Budget exhausted without reaching a terminal state. Ambiguous: the
    /// operation may still complete; the caller should check manually.
    #[error("no terminal state after {attempts} checks; check status manually")]
    TimedOut { attempts: u32 },
    /// A status fetch itself failed.
    #[error("status fetch failed: {0:#}")]
    Fetch(anyhow::Error),
}

/// Poll `probe` until a terminal state or the attempt budget is reached.
pub async fn poll_until_terminal<P: StatusProbe + Send>(
    policy: &PollPolicy,
    probe: &mut P,
) -> Result<(), PollError> {
    for attempt in 1..=policy.max_attempts {
        match probe.fetch().await.map_err(PollError::Fetch)? {
            Observation::Ready => {
                tracing::debug!("terminal success after {} checks", attempt);
                return Ok(());
            }
            Observation::Failed { status } => {
                let diagnostics = probe.diagnostics().await;
                return Err(PollError::Failed {
                    status,
                    diagnostics,
                });
            }
            Observation::Pending => {
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.interval).await;
                }
            }
        }
    }
    Err(PollError::TimedOut {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted {
        observations: VecDeque<Observation>,
        fetches: u32,
        diagnostics_calls: u32,
    }

    impl Scripted {
        fn new(observations: Vec<Observation>) -> Self {
            Self {
                observations: observations.into(),
                fetches: 0,
                diagnostics_calls: 0,
            }
        }
    }

    #[async_trait]
    impl StatusProbe for Scripted {
        async fn fetch(&mut self) -> anyhow::Result<Observation> {
            self.fetches += 1;
            self.observations
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }

        async fn diagnostics(&mut self) -> Option<String> {
            self.diagnostics_calls += 1;
            Some("boom at step 3".to_string())
        }
    }

    fn policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(100),
            max_attempts,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_success_after_pending_then_ready() {
        let mut probe = Scripted::new(vec![
            Observation::Pending,
            Observation::Pending,
            Observation::Ready,
        ]);
        poll_until_terminal(&policy(10), &mut probe).await.unwrap();
        assert_eq!(probe.fetches, 3);
        assert_eq!(probe.diagnostics_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_failure_stops_immediately_and_fetches_diagnostics() {
        let mut probe = Scripted::new(vec![
            Observation::Pending,
            Observation::Failed {
                status: "failed".to_string(),
            },
            Observation::Ready,
        ]);
        let err = poll_until_terminal(&policy(10), &mut probe)
            .await
            .unwrap_err();
        match err {
            PollError::Failed {
                status,
                diagnostics,
            } => {
                assert_eq!(status, "failed");
                assert_eq!(diagnostics.as_deref(), Some("boom at step 3"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        // Two fetches, not three: the failure is terminal.
        assert_eq!(probe.fetches, 2);
        assert_eq!(probe.diagnostics_calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn budget_exhaustion_is_a_distinct_kind() {
        let mut probe = Scripted::new(vec![Observation::Pending; 4]);
        let err = poll_until_terminal(&policy(4), &mut probe).await.unwrap_err();
        match err {
            PollError::TimedOut { attempts } => assert_eq!(attempts, 4),
            other => panic!("expected TimedOut, got {other:?}"),
        }
        assert_eq!(probe.fetches, 4);
        assert_eq!(probe.diagnostics_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_propagates() {
        let mut probe = Scripted::new(vec![]);
        let err = poll_until_terminal(&policy(3), &mut probe).await.unwrap_err();
        assert!(matches!(err, PollError::Fetch(_)));
    }
}
