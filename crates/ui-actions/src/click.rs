//! Human-like pointer interaction.
//!
//! Dispatches a move / press / dwell / release sequence at a jittered point
//! inside the target element, so the page sees something closer to a real
//! pointer than a synthetic `el.click()`. No retries here; that is the
//! caller's job.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::debug;

use crate::errors::ActionError;
use crate::ports::{ElementRect, PagePort};

/// How long the button stays pressed.
const DWELL: Duration = Duration::from_millis(20);

/// Maximum offset from the element center on each axis.
const JITTER_PX: f64 = 5.0;

/// Click the `index`-th element matching `selector` with a jittered,
/// dwelled pointer sequence.
pub async fn human_click(
    page: &dyn PagePort,
    selector: &str,
    index: usize,
) -> Result<(), ActionError> {
    let rect = page.element_rect(selector, index).await?;
    let (x, y) = jittered_point(&rect);
    debug!(selector, index, x, y, "dispatching pointer click");

    page.move_pointer(x, y).await?;
    page.press_pointer(x, y).await?;
    sleep(DWELL).await;
    page.release_pointer(x, y).await?;
    Ok(())
}

fn jittered_point(rect: &ElementRect) -> (f64, f64) {
    let (cx, cy) = rect.center();
    let mut rng = rand::thread_rng();
    (
        cx + rng.gen_range(-JITTER_PX..=JITTER_PX),
        cy + rng.gen_range(-JITTER_PX..=JITTER_PX),
    )
}
