//! Retry-driven UI interaction primitives.
//!
//! This crate holds the pieces of the automation that do not care where the
//! page comes from: a [`PagePort`] seam the browser layer implements, a
//! bounded retry locator, a human-like click primitive and a pure
//! label-matching selection helper. Everything here is exercised against
//! fake ports in tests; the live CDP implementation lives in `cdp-session`.

pub mod click;
pub mod errors;
pub mod locator;
pub mod policy;
pub mod ports;
pub mod select;

pub use click::human_click;
pub use errors::ActionError;
pub use locator::locate_and_act;
pub use policy::{RetryPolicy, SuccessCondition};
pub use ports::{ElementRect, PagePort};
pub use select::{match_label, select_by_label};
