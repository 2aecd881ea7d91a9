//! Selecting a rendered option by its visible label.
//!
//! The match itself is a pure scan over (index, label) pairs so it can be
//! unit tested without a live session; the async wrapper fetches the labels
//! through the port and clicks the winner.

use tracing::debug;

use crate::click::human_click;
use crate::errors::ActionError;
use crate::ports::PagePort;

/// First index whose trimmed label equals `target`, or `None`.
pub fn match_label<'a, I>(labels: I, target: &str) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    labels
        .into_iter()
        .position(|label| label.trim() == target)
}

/// Scan all elements matching `option_selector` and click the first whose
/// visible text equals `target`. Fails with [`ActionError::OptionNotFound`]
/// when nothing matches; the caller treats that as fatal.
pub async fn select_by_label(
    page: &dyn PagePort,
    option_selector: &str,
    target: &str,
) -> Result<(), ActionError> {
    let labels = page.option_labels(option_selector).await?;
    let index = match_label(labels.iter().map(String::as_str), target)
        .ok_or_else(|| ActionError::OptionNotFound(target.to_string()))?;
    debug!(target, index, "matched option label");
    human_click(page, option_selector, index).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_label() {
        let labels = ["5MB", "10MB", "Unlimited"];
        assert_eq!(match_label(labels, "Unlimited"), Some(2));
    }

    #[test]
    fn trims_whitespace_before_comparing() {
        let labels = ["  Unlimited \n", "10MB"];
        assert_eq!(match_label(labels, "Unlimited"), Some(0));
    }

    #[test]
    fn first_match_wins() {
        let labels = ["Unlimited", "Unlimited"];
        assert_eq!(match_label(labels, "Unlimited"), Some(0));
    }

    #[test]
    fn no_match_yields_none() {
        let labels = ["5MB", "10MB"];
        assert_eq!(match_label(labels, "Unlimited"), None);
        assert_eq!(match_label([], "Unlimited"), None);
    }

    #[test]
    fn substring_is_not_a_match() {
        let labels = ["Unlimited uploads"];
        assert_eq!(match_label(labels, "Unlimited"), None);
    }
}
