//! Error types for UI interaction operations.

use thiserror::Error;

/// Failures surfaced by page interactions and the retry locator.
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// Selector matched no element on the page.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// Element exists but is not rendered, so it has no bounding box.
    #[error("no bounding box for element: {0}")]
    NoBoundingBox(String),

    /// A bounded wait elapsed before its condition held.
    #[error("wait timed out: {0}")]
    WaitTimeout(String),

    /// The retry locator exhausted its attempt budget for a selector.
    #[error("retry attempts exhausted for selector: {0}")]
    RetryExhausted(String),

    /// No rendered option carried the requested label.
    #[error("option not found: {0}")]
    OptionNotFound(String),

    /// CDP transport or protocol failure.
    #[error("cdp i/o failure: {0}")]
    CdpIo(String),

    /// Invariant violation; not expected during normal operation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Transient location failures the retry locator may recover from.
    /// Everything else is terminal for the current attempt chain.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ActionError::ElementNotFound(_)
                | ActionError::NoBoundingBox(_)
                | ActionError::WaitTimeout(_)
        )
    }
}
