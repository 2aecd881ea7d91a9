//! Chromium-backed implementation of the `ui-actions` page port.
//!
//! One launched browser, one page. The session is exclusively owned by the
//! workflow that launched it and torn down through [`CdpSession::close`].

pub mod config;
pub mod session;

pub use config::SessionConfig;
pub use session::CdpSession;
