//! Bounded retry locator.
//!
//! Wraps element location (and optionally a click) in an attempt-counted
//! loop with a success postcondition, tolerating the asynchronous rendering
//! of the target UI. This is the only layer that retries; exhaustion
//! surfaces as a hard [`ActionError::RetryExhausted`].

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::click::human_click;
use crate::errors::ActionError;
use crate::policy::{RetryPolicy, SuccessCondition};
use crate::ports::PagePort;

/// Locate `selector`, optionally click it, and wait for the policy's
/// success condition, retrying up to `policy.max_attempts` times.
///
/// A postcondition timeout counts as a failed attempt and the click is
/// reissued on the next pass, since the UI may not have registered it.
pub async fn locate_and_act(
    page: &dyn PagePort,
    selector: &str,
    policy: &RetryPolicy,
) -> Result<(), ActionError> {
    let probe = policy.bounded_probe();
    let mut attempts = 0u32;

    while attempts < policy.max_attempts {
        if let Err(err) = page.wait_for_selector(selector, probe).await {
            if !err.is_retryable() {
                return Err(err);
            }
            attempts += 1;
            debug!(selector, attempts, %err, "locate attempt failed");
            if attempts < policy.max_attempts {
                sleep(policy.inter_attempt_delay).await;
            }
            continue;
        }

        if policy.click_on_found {
            if let Err(err) = human_click(page, selector, 0).await {
                if !err.is_retryable() {
                    return Err(err);
                }
                attempts += 1;
                warn!(selector, attempts, %err, "click failed, retrying");
                if attempts < policy.max_attempts {
                    sleep(policy.inter_attempt_delay).await;
                }
                continue;
            }
        }

        let outcome = match &policy.success {
            None => return Ok(()),
            Some(SuccessCondition::ElementAppears(secondary)) => {
                page.wait_for_selector(secondary, probe).await
            }
            Some(SuccessCondition::ElementDisappears) => {
                page.wait_for_gone(selector, probe).await
            }
        };

        match outcome {
            Ok(()) => return Ok(()),
            Err(err) if err.is_retryable() => {
                attempts += 1;
                warn!(selector, attempts, %err, "postcondition not met, retrying");
                if attempts < policy.max_attempts {
                    sleep(policy.inter_attempt_delay).await;
                }
            }
            Err(err) => return Err(err),
        }
    }

    Err(ActionError::RetryExhausted(selector.to_string()))
}
