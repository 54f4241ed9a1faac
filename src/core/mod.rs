//! Terminal ownership.
//!
//! - **session**: `Session`, the raw-mode lease on the controlling terminal
//! - **teardown**: once-per-process exit, panic and signal restoration hooks
//!
//! # Lifecycle
//!
//! ```text
//! Session::open ──▶ RawMode::enable ──▶ teardown::register_once
//!      │                                   ├── atexit
//!      │                                   ├── panic hook
//!      │                                   └── SIGTERM/SIGHUP/SIGQUIT, SIGINT flag
//!      ▼
//! Session::close / exit / signal ──▶ restore (first caller wins)
//! ```

pub mod session;
pub mod teardown;

pub use session::{CrosstermRawMode, RawMode, Session};
