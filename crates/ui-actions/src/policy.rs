//! Retry policy parameter object for the bounded locator.

use std::time::Duration;

/// Postcondition that must hold after an element is located (and clicked).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuccessCondition {
    /// A secondary selector must appear within the probe timeout.
    ElementAppears(String),
    /// The located selector itself must disappear within the probe timeout.
    ElementDisappears,
}

/// Immutable per-call configuration for [`crate::locate_and_act`].
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Maximum number of location attempts before giving up.
    pub max_attempts: u32,
    /// Sleep between failed attempts.
    pub inter_attempt_delay: Duration,
    /// Bound on each individual wait. Clamped strictly below
    /// `inter_attempt_delay` so the total retry budget stays bounded.
    pub probe_timeout: Duration,
    /// Whether to click the element once located.
    pub click_on_found: bool,
    /// Optional postcondition; `None` means mere location (plus click, if
    /// requested) is success.
    pub success: Option<SuccessCondition>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            inter_attempt_delay: Duration::from_millis(500),
            probe_timeout: Duration::from_millis(400),
            click_on_found: true,
            success: None,
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inter_attempt_delay = delay;
        self
    }

    pub fn with_probe_timeout(mut self, probe: Duration) -> Self {
        self.probe_timeout = probe;
        self
    }

    pub fn with_click(mut self, click_on_found: bool) -> Self {
        self.click_on_found = click_on_found;
        self
    }

    pub fn expecting(mut self, condition: SuccessCondition) -> Self {
        self.success = Some(condition);
        self
    }

    /// Probe timeout honoring the strictly-shorter-than-delay invariant.
    pub fn bounded_probe(&self) -> Duration {
        if self.probe_timeout < self.inter_attempt_delay {
            self.probe_timeout
        } else {
            self.inter_attempt_delay
                .saturating_sub(Duration::from_millis(1))
        }
    }
}
