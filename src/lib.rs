//! Floodgate: a small control service that drives one browser session
//! against a Flood torrent web UI, resetting its speed-limit menu whenever
//! the target application re-applies a throttle.
//!
//! Layering, top down: HTTP control surface ([`server`]) → automation
//! supervisor ([`supervisor`]) → session workflow ([`workflow`]) → retry
//! locator and interaction primitives (`ui-actions`) → live CDP session
//! (`cdp-session`).

pub mod config;
pub mod direction;
pub mod server;
pub mod supervisor;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;
