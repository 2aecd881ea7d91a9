//! Automation supervisor: owns the single workflow task and its
//! Idle / Running / Stopping lifecycle.
//!
//! At most one workflow runs at a time. Start requests while a workflow is
//! live are acknowledged without side effects; stop requests cancel the
//! token and let the cycle wind down at its next iteration boundary.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use url::Url;

use crate::config::AppConfig;
use crate::direction::{DirectionConfig, DirectionSet};
use crate::workflow::{self, SessionLauncher, SessionSpec, WorkflowTuning};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutomationState {
    Idle,
    Running,
    /// Stop requested, workflow still winding down. Reported to clients
    /// as running until the session is released.
    Stopping,
}

/// Point-in-time view for `/status`.
#[derive(Clone, Debug)]
pub struct StatusSnapshot {
    pub state: AutomationState,
    pub started_at: Option<DateTime<Utc>>,
    pub directions: DirectionSet,
}

impl StatusSnapshot {
    pub fn is_running(&self) -> bool {
        self.state != AutomationState::Idle
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started(DirectionSet),
    AlreadyRunning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    Requested,
    NotRunning,
}

#[derive(Debug, Error)]
pub enum StartError {
    /// The target URL is unset or does not parse; nothing was started.
    #[error("invalid target URL configuration")]
    InvalidConfiguration,
}

struct Inner {
    state: AutomationState,
    started_at: Option<DateTime<Utc>>,
    cancel: Option<CancellationToken>,
}

pub struct Supervisor {
    launcher: Arc<dyn SessionLauncher>,
    config: Arc<AppConfig>,
    directions: Arc<DirectionConfig>,
    tuning: WorkflowTuning,
    inner: Mutex<Inner>,
}

impl Supervisor {
    pub fn new(launcher: Arc<dyn SessionLauncher>, config: Arc<AppConfig>) -> Self {
        Self {
            launcher,
            config,
            directions: Arc::new(DirectionConfig::default()),
            tuning: WorkflowTuning::default(),
            inner: Mutex::new(Inner {
                state: AutomationState::Idle,
                started_at: None,
                cancel: None,
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_tuning(mut self, tuning: WorkflowTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Validate configuration, claim the Idle slot, and spawn the workflow.
    pub fn start(
        self: &Arc<Self>,
        requested: Option<DirectionSet>,
    ) -> Result<StartOutcome, StartError> {
        let spec = self.session_spec()?;
        let cancel = CancellationToken::new();
        let set = requested.unwrap_or_default();
        {
            let mut inner = self.inner.lock().expect("supervisor state poisoned");
            if inner.state != AutomationState::Idle {
                return Ok(StartOutcome::AlreadyRunning);
            }
            inner.state = AutomationState::Running;
            inner.started_at = Some(Utc::now());
            inner.cancel = Some(cancel.clone());
            self.directions.store(set);
        }

        info!(up = set.up, down = set.down, "automation starting");
        let supervisor = Arc::clone(self);
        tokio::spawn(async move {
            let result = workflow::run(
                supervisor.launcher.as_ref(),
                &spec,
                &supervisor.directions,
                &cancel,
                &supervisor.tuning,
            )
            .await;
            match result {
                Ok(()) => info!("automation finished"),
                Err(err) => error!(%err, "automation ended with error"),
            }
            supervisor.finish();
        });
        Ok(StartOutcome::Started(set))
    }

    /// Request cancellation. The workflow keeps its Running-facing status
    /// until the session is actually released.
    pub fn stop(&self) -> StopOutcome {
        let mut inner = self.inner.lock().expect("supervisor state poisoned");
        match inner.state {
            AutomationState::Idle => StopOutcome::NotRunning,
            AutomationState::Running | AutomationState::Stopping => {
                inner.state = AutomationState::Stopping;
                if let Some(cancel) = &inner.cancel {
                    cancel.cancel();
                }
                info!("stop requested");
                StopOutcome::Requested
            }
        }
    }

    pub fn status(&self) -> StatusSnapshot {
        let inner = self.inner.lock().expect("supervisor state poisoned");
        StatusSnapshot {
            state: inner.state,
            started_at: inner.started_at,
            directions: self.directions.snapshot(),
        }
    }

    /// Apply a direction update; a live cycle picks it up at its next
    /// iteration boundary.
    pub fn update_directions(&self, set: DirectionSet) -> DirectionSet {
        self.directions.store(set);
        info!(up = set.up, down = set.down, "directions updated");
        set
    }

    fn session_spec(&self) -> Result<SessionSpec, StartError> {
        let raw = self
            .config
            .target_url
            .as_deref()
            .ok_or(StartError::InvalidConfiguration)?;
        let url = Url::parse(raw).map_err(|_| StartError::InvalidConfiguration)?;
        Ok(SessionSpec {
            url: url.to_string(),
            username: self.config.username.clone(),
            password: self.config.password.clone(),
            up_label: self.config.up_label.clone(),
            down_label: self.config.down_label.clone(),
        })
    }

    fn finish(&self) {
        let mut inner = self.inner.lock().expect("supervisor state poisoned");
        inner.state = AutomationState::Idle;
        inner.started_at = None;
        inner.cancel = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fast_tuning, wait_until_idle, FakeLauncher, FakePage};
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::time::sleep;

    fn test_config(target_url: Option<&str>) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            listen_port: 0,
            target_url: target_url.map(str::to_string),
            username: "admin".to_string(),
            password: "secret".to_string(),
            up_label: "Unlimited".to_string(),
            down_label: "10MB".to_string(),
        })
    }

    fn supervisor_with(launcher: Arc<FakeLauncher>) -> Arc<Supervisor> {
        Arc::new(
            Supervisor::new(launcher, test_config(Some("http://flood.local:3000")))
                .with_tuning(fast_tuning()),
        )
    }

    #[tokio::test]
    async fn second_start_is_acknowledged_without_a_new_session() {
        let page = Arc::new(FakePage::logged_in());
        let launcher = Arc::new(FakeLauncher::new(page.clone()));
        let supervisor = supervisor_with(launcher.clone());

        let first = supervisor.start(None).unwrap();
        assert_eq!(first, StartOutcome::Started(DirectionSet::both()));
        let second = supervisor.start(None).unwrap();
        assert_eq!(second, StartOutcome::AlreadyRunning);

        sleep(Duration::from_millis(20)).await;
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);

        supervisor.stop();
        wait_until_idle(&supervisor, Duration::from_secs(2)).await;
    }

    #[tokio::test]
    async fn stop_releases_the_session_and_returns_to_idle() {
        let page = Arc::new(FakePage::logged_in());
        let launcher = Arc::new(FakeLauncher::new(page.clone()));
        let supervisor = supervisor_with(launcher);

        supervisor.start(None).unwrap();
        assert!(supervisor.status().is_running());

        assert_eq!(supervisor.stop(), StopOutcome::Requested);
        wait_until_idle(&supervisor, Duration::from_secs(2)).await;

        let status = supervisor.status();
        assert_eq!(status.state, AutomationState::Idle);
        assert!(status.started_at.is_none());
        assert_eq!(page.close_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_while_idle_reports_not_running() {
        let page = Arc::new(FakePage::logged_in());
        let supervisor = supervisor_with(Arc::new(FakeLauncher::new(page)));
        assert_eq!(supervisor.stop(), StopOutcome::NotRunning);
    }

    #[tokio::test]
    async fn workflow_error_resets_to_idle_and_releases_once() {
        let page = Arc::new(FakePage::logged_in());
        page.set_labels(&["5MB", "25MB"]);
        let launcher = Arc::new(FakeLauncher::new(page.clone()));
        let supervisor = supervisor_with(launcher);

        supervisor.start(None).unwrap();
        wait_until_idle(&supervisor, Duration::from_secs(2)).await;
        assert_eq!(page.close_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn acquisition_failure_resets_to_idle() {
        let page = Arc::new(FakePage::logged_in());
        let launcher = Arc::new(FakeLauncher::failing(page.clone()));
        let supervisor = supervisor_with(launcher);

        assert!(matches!(
            supervisor.start(None),
            Ok(StartOutcome::Started(_))
        ));
        wait_until_idle(&supervisor, Duration::from_secs(2)).await;
        assert_eq!(page.close_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_directions_keep_the_workflow_alive_but_inactive() {
        let page = Arc::new(FakePage::logged_in());
        let launcher = Arc::new(FakeLauncher::new(page.clone()));
        let supervisor = supervisor_with(launcher);

        supervisor.start(Some(DirectionSet::none())).unwrap();
        sleep(Duration::from_millis(30)).await;

        assert!(supervisor.status().is_running());
        assert!(page.selected_labels().is_empty());

        supervisor.stop();
        wait_until_idle(&supervisor, Duration::from_secs(2)).await;
    }

    #[tokio::test]
    async fn invalid_target_url_never_starts() {
        let page = Arc::new(FakePage::logged_in());
        let launcher = Arc::new(FakeLauncher::new(page));
        for target in [None, Some("not a url")] {
            let supervisor = Arc::new(
                Supervisor::new(launcher.clone(), test_config(target)).with_tuning(fast_tuning()),
            );
            assert!(matches!(
                supervisor.start(None),
                Err(StartError::InvalidConfiguration)
            ));
            assert_eq!(supervisor.status().state, AutomationState::Idle);
        }
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    }
}
