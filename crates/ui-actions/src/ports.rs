//! The seam between interaction logic and a live browser page.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::ActionError;

/// Bounding region of a rendered element, viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One page/tab of one browser session. The workflow owns a single
/// implementation of this for its entire lifetime and releases it through
/// [`PagePort::close`] on every exit path.
#[async_trait]
pub trait PagePort: Send + Sync {
    /// Navigate the page, bounded by `deadline`.
    async fn goto(&self, url: &str, deadline: Duration) -> Result<(), ActionError>;

    /// Wait until `selector` matches at least one element.
    /// Fails with [`ActionError::WaitTimeout`] once `deadline` elapses.
    async fn wait_for_selector(&self, selector: &str, deadline: Duration)
        -> Result<(), ActionError>;

    /// Wait until `selector` matches nothing. Same timeout contract as
    /// [`PagePort::wait_for_selector`].
    async fn wait_for_gone(&self, selector: &str, deadline: Duration) -> Result<(), ActionError>;

    /// Bounding rect of the `index`-th element matching `selector`.
    async fn element_rect(&self, selector: &str, index: usize) -> Result<ElementRect, ActionError>;

    async fn move_pointer(&self, x: f64, y: f64) -> Result<(), ActionError>;
    async fn press_pointer(&self, x: f64, y: f64) -> Result<(), ActionError>;
    async fn release_pointer(&self, x: f64, y: f64) -> Result<(), ActionError>;

    /// Focus the first element matching `selector` and type `text` into it.
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), ActionError>;

    /// Focus the first element matching `selector` and press a key on it.
    async fn press_key(&self, selector: &str, key: &str) -> Result<(), ActionError>;

    /// Trimmed visible text of every element matching `selector`, in DOM
    /// order. The order is stable with respect to `element_rect` indices.
    async fn option_labels(&self, selector: &str) -> Result<Vec<String>, ActionError>;

    /// Release the underlying browser session. Idempotence is not required;
    /// callers invoke this exactly once.
    async fn close(&self);
}
