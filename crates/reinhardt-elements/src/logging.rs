//! Logging abstraction layer for reinhardt-elements
//!
//! Lifecycle callbacks never let an error escape into the host page. Failures are
//! reported through these macros instead, which route to the host's diagnostic
//! channel on each target.
//!
//! ## Macro Overview
//!
//! | Macro | Condition | WASM | Non-WASM |
//! |-------|-----------|------|----------|
//! | `debug_log!` | `debug-hooks` feature + `debug_assertions` | `console.debug` | `tracing::debug!` |
//! | `info_log!` | `debug_assertions` | `console.info` | `tracing::info!` |
//! | `warn_log!` | always | `console.warn` | `tracing::warn!` |
//! | `error_log!` | always | `console.error` | `tracing::error!` |
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_elements::{error_log, warn_log};
//!
//! error_log!("<{}>: {}", tag, error);
//! warn_log!("hydration mismatch in <{}>", tag);
//! ```

#[cfg(not(target_arch = "wasm32"))]
#[doc(hidden)]
pub use tracing as __tracing;

#[cfg(target_arch = "wasm32")]
#[doc(hidden)]
pub use web_sys as __web_sys;

/// Logs a debug message (requires `debug-hooks` feature + `debug_assertions`)
#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-hooks", target_arch = "wasm32"))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::logging::__web_sys::console::debug_1(&format!($($arg)*).into());
	}};
}

/// Logs a debug message (requires `debug-hooks` feature + `debug_assertions`)
#[macro_export]
#[cfg(all(debug_assertions, feature = "debug-hooks", not(target_arch = "wasm32")))]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		$crate::logging::__tracing::debug!("{}", format!($($arg)*));
	}};
}

/// No-op debug_log when conditions are not met
#[macro_export]
#[cfg(not(all(debug_assertions, feature = "debug-hooks")))]
macro_rules! debug_log {
	($($arg:tt)*) => {{}};
}

/// Logs an info message (requires `debug_assertions`)
#[macro_export]
#[cfg(all(debug_assertions, target_arch = "wasm32"))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::logging::__web_sys::console::info_1(&format!($($arg)*).into());
	}};
}

/// Logs an info message (requires `debug_assertions`)
#[macro_export]
#[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
macro_rules! info_log {
	($($arg:tt)*) => {{
		$crate::logging::__tracing::info!("{}", format!($($arg)*));
	}};
}

/// No-op info_log in release builds
#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! info_log {
	($($arg:tt)*) => {{}};
}

/// Logs a warning message.
///
/// Unlike `info_log!`, warnings stay active in release builds: they report
/// recoverable problems such as hydration mismatches.
#[macro_export]
#[cfg(target_arch = "wasm32")]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::logging::__web_sys::console::warn_1(&format!($($arg)*).into());
	}};
}

/// Logs a warning message.
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! warn_log {
	($($arg:tt)*) => {{
		$crate::logging::__tracing::warn!("{}", format!($($arg)*));
	}};
}

/// Logs an error message.
///
/// Used for every failure absorbed inside a lifecycle callback
/// (`ComponentNotFound`, `InvalidJson`). Always active.
///
/// # Example
///
/// ```ignore
/// error_log!("<{}>: {}", tag, error);
/// ```
#[macro_export]
#[cfg(target_arch = "wasm32")]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::logging::__web_sys::console::error_1(&format!($($arg)*).into());
	}};
}

/// Logs an error message.
#[macro_export]
#[cfg(not(target_arch = "wasm32"))]
macro_rules! error_log {
	($($arg:tt)*) => {{
		$crate::logging::__tracing::error!("{}", format!($($arg)*));
	}};
}
