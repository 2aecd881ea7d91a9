//! Shared fakes for workflow, supervisor and router tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use ui_actions::{ActionError, ElementRect, PagePort, RetryPolicy, SuccessCondition};

use crate::direction::{DirectionConfig, DirectionSet};
use crate::supervisor::{AutomationState, Supervisor};
use crate::workflow::{selectors, SessionLauncher, SessionSpec, WorkflowTuning};

/// Scripted page. Selectors listed in `present` resolve immediately,
/// everything else times out; option clicks are recorded by label.
pub(crate) struct FakePage {
    present: Mutex<HashSet<String>>,
    labels: Mutex<Vec<String>>,
    selected: Mutex<Vec<String>>,
    pending_target: Mutex<Option<(String, usize)>>,
    pub(crate) close_count: AtomicUsize,
    select_count: AtomicUsize,
    cancel_after: Mutex<Option<(usize, CancellationToken)>>,
    flip_on_select: Mutex<Option<(Arc<DirectionConfig>, DirectionSet)>>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self {
            present: Mutex::new(HashSet::new()),
            labels: Mutex::new(vec!["Unlimited".to_string(), "10MB".to_string()]),
            selected: Mutex::new(Vec::new()),
            pending_target: Mutex::new(None),
            close_count: AtomicUsize::new(0),
            select_count: AtomicUsize::new(0),
            cancel_after: Mutex::new(None),
            flip_on_select: Mutex::new(None),
        }
    }
}

impl FakePage {
    /// A page where the login form and the fully rendered limits menu are
    /// all reachable.
    pub(crate) fn logged_in() -> Self {
        let page = Self::default();
        {
            let mut present = page.present.lock().unwrap();
            for selector in [
                selectors::LOGIN_USERNAME,
                selectors::LOGIN_PASSWORD,
                selectors::LOGIN_SUBMIT,
                selectors::LIMITS_TOGGLE,
                selectors::DROPDOWN_LIST,
                selectors::DROPDOWN_OPTION,
            ] {
                present.insert(selector.to_string());
            }
        }
        page
    }

    pub(crate) fn set_labels(&self, labels: &[&str]) {
        *self.labels.lock().unwrap() = labels.iter().map(|s| s.to_string()).collect();
    }

    pub(crate) fn selected_labels(&self) -> Vec<String> {
        self.selected.lock().unwrap().clone()
    }

    /// Cancel `token` once `count` option selections have landed.
    pub(crate) fn cancel_after_selects(&self, count: usize, token: CancellationToken) {
        *self.cancel_after.lock().unwrap() = Some((count, token));
    }

    /// Swap the live direction config to `set` after the first selection.
    pub(crate) fn flip_directions_on_first_select(
        &self,
        config: Arc<DirectionConfig>,
        set: DirectionSet,
    ) {
        *self.flip_on_select.lock().unwrap() = Some((config, set));
    }

    fn record_selection(&self, index: usize) {
        let label = self
            .labels
            .lock()
            .unwrap()
            .get(index)
            .cloned()
            .unwrap_or_default();
        self.selected.lock().unwrap().push(label);

        let selects = self.select_count.fetch_add(1, Ordering::SeqCst) + 1;
        if selects == 1 {
            if let Some((config, set)) = self.flip_on_select.lock().unwrap().take() {
                config.store(set);
            }
        }
        let trigger = self.cancel_after.lock().unwrap().clone();
        if let Some((count, token)) = trigger {
            if selects >= count {
                token.cancel();
            }
        }
    }

    fn has(&self, selector: &str) -> bool {
        self.present.lock().unwrap().contains(selector)
    }
}

#[async_trait]
impl PagePort for FakePage {
    async fn goto(&self, _url: &str, _deadline: Duration) -> Result<(), ActionError> {
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _deadline: Duration,
    ) -> Result<(), ActionError> {
        if self.has(selector) {
            Ok(())
        } else {
            Err(ActionError::WaitTimeout(selector.to_string()))
        }
    }

    async fn wait_for_gone(&self, selector: &str, _deadline: Duration) -> Result<(), ActionError> {
        if self.has(selector) {
            Err(ActionError::WaitTimeout(selector.to_string()))
        } else {
            Ok(())
        }
    }

    async fn element_rect(&self, selector: &str, index: usize) -> Result<ElementRect, ActionError> {
        if !self.has(selector) {
            return Err(ActionError::ElementNotFound(selector.to_string()));
        }
        *self.pending_target.lock().unwrap() = Some((selector.to_string(), index));
        Ok(ElementRect {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        })
    }

    async fn move_pointer(&self, _x: f64, _y: f64) -> Result<(), ActionError> {
        Ok(())
    }

    async fn press_pointer(&self, _x: f64, _y: f64) -> Result<(), ActionError> {
        Ok(())
    }

    async fn release_pointer(&self, _x: f64, _y: f64) -> Result<(), ActionError> {
        let target = self.pending_target.lock().unwrap().take();
        if let Some((selector, index)) = target {
            if selector == selectors::DROPDOWN_OPTION {
                self.record_selection(index);
            }
        }
        Ok(())
    }

    async fn type_text(&self, selector: &str, _text: &str) -> Result<(), ActionError> {
        if self.has(selector) {
            Ok(())
        } else {
            Err(ActionError::ElementNotFound(selector.to_string()))
        }
    }

    async fn press_key(&self, selector: &str, _key: &str) -> Result<(), ActionError> {
        if self.has(selector) {
            Ok(())
        } else {
            Err(ActionError::ElementNotFound(selector.to_string()))
        }
    }

    async fn option_labels(&self, _selector: &str) -> Result<Vec<String>, ActionError> {
        Ok(self.labels.lock().unwrap().clone())
    }

    async fn close(&self) {
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Launcher handing out one shared fake page, optionally failing every
/// acquisition (cleaning up the half-acquired session like the real one).
pub(crate) struct FakeLauncher {
    page: Arc<FakePage>,
    fail: bool,
    pub(crate) launches: AtomicUsize,
}

impl FakeLauncher {
    pub(crate) fn new(page: Arc<FakePage>) -> Self {
        Self {
            page,
            fail: false,
            launches: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(page: Arc<FakePage>) -> Self {
        Self {
            page,
            fail: true,
            launches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Arc<dyn PagePort>, ActionError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            self.page.close_count.fetch_add(1, Ordering::SeqCst);
            return Err(ActionError::CdpIo("browser launch failed".to_string()));
        }
        Ok(self.page.clone())
    }
}

pub(crate) fn spec() -> SessionSpec {
    SessionSpec {
        url: "http://flood.local:3000".to_string(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        up_label: "Unlimited".to_string(),
        down_label: "10MB".to_string(),
    }
}

pub(crate) fn fast_tuning() -> WorkflowTuning {
    WorkflowTuning {
        nav_timeout: Duration::from_millis(50),
        login_wait: Duration::from_millis(10),
        settle: Duration::from_millis(1),
        idle_recheck: Duration::from_millis(1),
        menu_retry: RetryPolicy::default()
            .with_attempts(3)
            .with_delay(Duration::from_millis(2))
            .with_probe_timeout(Duration::from_millis(1))
            .expecting(SuccessCondition::ElementAppears(
                selectors::DROPDOWN_LIST.to_string(),
            )),
    }
}

/// Poll the supervisor until it reports Idle or the deadline passes.
pub(crate) async fn wait_until_idle(supervisor: &Supervisor, deadline: Duration) {
    let deadline_at = tokio::time::Instant::now() + deadline;
    loop {
        if supervisor.status().state == AutomationState::Idle {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline_at,
            "supervisor did not return to idle in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
