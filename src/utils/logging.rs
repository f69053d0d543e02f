//! Per-module switchable logging.
//!
//! Every module that logs declares its own flag and then calls the macros,
//! which are exported at the crate root:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_info!("page mounted at {}", path);
//! ```
//!
//! Flipping the flag to `false` silences one module without touching the
//! `RUST_LOG` filter used for everything else.

/// Info-level log, gated on the caller's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn-level log, gated on the caller's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Error-level log, gated on the caller's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}

/// Debug-level log, gated on the caller's `ENABLE_LOGS`.
///
/// Undelivered analytics events end up here, so this is the one to enable
/// with `RUST_LOG=page_engagement=debug` when checking event payloads locally.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}
