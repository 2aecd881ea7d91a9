//! The session workflow: authenticate once, then cycle forever.
//!
//! One workflow owns one browser session for its whole lifetime. The flow
//! is strictly linear (authenticate, then the cycling loop); only the
//! menu-open step retries, everything else is terminal for the session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use cdp_session::{CdpSession, SessionConfig};
use ui_actions::{
    locate_and_act, select_by_label, ActionError, PagePort, RetryPolicy, SuccessCondition,
};

use crate::direction::{Direction, DirectionConfig};

/// Selectors for the Flood web UI this workflow drives.
pub mod selectors {
    pub const LOGIN_USERNAME: &str = r#"input[type="text"]"#;
    pub const LOGIN_PASSWORD: &str = r#"input[type="password"]"#;
    pub const LOGIN_SUBMIT: &str = "button";
    pub const LIMITS_TOGGLE: &str = "svg.icon--limits";
    pub const DROPDOWN_LIST: &str = ".dropdown__list";
    pub const DROPDOWN_OPTION: &str = "li.dropdown__item.menu__item.is-selectable";
}

/// Everything a single session needs to know about its target.
#[derive(Clone, Debug)]
pub struct SessionSpec {
    pub url: String,
    pub username: String,
    pub password: String,
    pub up_label: String,
    pub down_label: String,
}

impl SessionSpec {
    pub fn target_label(&self, direction: Direction) -> &str {
        match direction {
            Direction::Up => &self.up_label,
            Direction::Down => &self.down_label,
        }
    }
}

/// Timing knobs for the workflow. Tests shrink these to milliseconds.
#[derive(Clone, Debug)]
pub struct WorkflowTuning {
    /// Navigation deadline during authentication.
    pub nav_timeout: Duration,
    /// Bound on waiting for each login form field.
    pub login_wait: Duration,
    /// Pause after each direction's toggle.
    pub settle: Duration,
    /// Re-check interval while no direction is enabled.
    pub idle_recheck: Duration,
    /// Retry policy for opening the speed-limits menu.
    pub menu_retry: RetryPolicy,
}

impl Default for WorkflowTuning {
    fn default() -> Self {
        Self {
            nav_timeout: Duration::from_secs(30),
            login_wait: Duration::from_secs(10),
            settle: Duration::from_secs(5),
            idle_recheck: Duration::from_secs(1),
            menu_retry: RetryPolicy::default()
                .with_attempts(10)
                .with_delay(Duration::from_millis(1000))
                .with_probe_timeout(Duration::from_millis(800))
                .expecting(SuccessCondition::ElementAppears(
                    selectors::DROPDOWN_LIST.to_string(),
                )),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The login form never rendered; fatal before cycling ever begins.
    #[error("login form not found: {0}")]
    LoginFormNotFound(String),

    /// The browser session could not be acquired.
    #[error("browser session unavailable: {0}")]
    SessionUnavailable(ActionError),

    /// Any interaction failure past authentication, including
    /// `RetryExhausted` and `OptionNotFound`.
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Produces the browser session a workflow will own. Seam for tests.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn PagePort>, ActionError>;
}

/// Launcher backed by a real CDP browser session.
pub struct CdpLauncher {
    config: SessionConfig,
}

impl CdpLauncher {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(SessionConfig::from_env())
    }
}

#[async_trait]
impl SessionLauncher for CdpLauncher {
    async fn launch(&self) -> Result<Arc<dyn PagePort>, ActionError> {
        let session = CdpSession::launch(&self.config).await?;
        Ok(Arc::new(session))
    }
}

/// Acquire a session, drive it, and release it on every exit path.
pub async fn run(
    launcher: &dyn SessionLauncher,
    spec: &SessionSpec,
    directions: &DirectionConfig,
    cancel: &CancellationToken,
    tuning: &WorkflowTuning,
) -> Result<(), WorkflowError> {
    let page = launcher
        .launch()
        .await
        .map_err(WorkflowError::SessionUnavailable)?;

    let result = drive(page.as_ref(), spec, directions, cancel, tuning).await;
    page.close().await;
    result
}

async fn drive(
    page: &dyn PagePort,
    spec: &SessionSpec,
    directions: &DirectionConfig,
    cancel: &CancellationToken,
    tuning: &WorkflowTuning,
) -> Result<(), WorkflowError> {
    authenticate(page, spec, tuning).await?;
    cycle(page, spec, directions, cancel, tuning).await
}

#[instrument(skip_all, fields(url = %spec.url))]
async fn authenticate(
    page: &dyn PagePort,
    spec: &SessionSpec,
    tuning: &WorkflowTuning,
) -> Result<(), WorkflowError> {
    info!("navigating to target");
    page.goto(&spec.url, tuning.nav_timeout).await?;

    for field in [selectors::LOGIN_USERNAME, selectors::LOGIN_PASSWORD] {
        page.wait_for_selector(field, tuning.login_wait)
            .await
            .map_err(|err| match err {
                ActionError::WaitTimeout(_) => WorkflowError::LoginFormNotFound(field.to_string()),
                other => WorkflowError::Action(other),
            })?;
    }

    info!("filling login form");
    page.type_text(selectors::LOGIN_USERNAME, &spec.username)
        .await?;
    page.type_text(selectors::LOGIN_PASSWORD, &spec.password)
        .await?;

    info!("submitting login form");
    page.press_key(selectors::LOGIN_SUBMIT, "Enter").await?;
    Ok(())
}

/// The indefinite cycling loop. Cancellation is observed once per outer
/// iteration; the direction set is re-read fresh each time so `/settings`
/// updates land at the next boundary.
async fn cycle(
    page: &dyn PagePort,
    spec: &SessionSpec,
    directions: &DirectionConfig,
    cancel: &CancellationToken,
    tuning: &WorkflowTuning,
) -> Result<(), WorkflowError> {
    loop {
        if cancel.is_cancelled() {
            info!("cancellation observed, ending cycle");
            return Ok(());
        }

        let enabled = directions.snapshot();
        if enabled.is_empty() {
            sleep(tuning.idle_recheck).await;
            continue;
        }

        for direction in enabled.iter() {
            debug!(?direction, "opening speed-limits menu");
            locate_and_act(page, selectors::LIMITS_TOGGLE, &tuning.menu_retry).await?;

            let label = spec.target_label(direction);
            select_by_label(page, selectors::DROPDOWN_OPTION, label).await?;
            info!(?direction, label, "limit reset");

            sleep(tuning.settle).await;
        }
    }
}
