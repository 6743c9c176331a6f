//! Error types for reinhardt-elements

use std::fmt;
use thiserror::Error;

/// The props layer a JSON payload was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropsSource {
	/// The `props` attribute on the element.
	Attribute,
	/// The embedded `<script type="application/json">` block.
	ScriptBlock,
}

impl fmt::Display for PropsSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Attribute => write!(f, "props attribute"),
			Self::ScriptBlock => write!(f, "json script block"),
		}
	}
}

/// Error type for element definition and lifecycle operations.
///
/// Only [`ElementError::PromiseNotSupported`] is ever returned to a caller.
/// The other variants are absorbed inside lifecycle callbacks: they are logged
/// and recorded on the element (see `ElementRegistry::last_error`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
	/// A deferred component factory was used in a server (non-interactive) context.
	#[error("Promises cannot be used for SSR (<{tag}>)")]
	PromiseNotSupported {
		/// The resolved tag name.
		tag: String,
	},

	/// The resolved value did not contain exactly one usable component.
	#[error("Cannot find component in provided function (<{tag}>, {candidates} candidates)")]
	ComponentNotFound {
		/// The resolved tag name.
		tag: String,
		/// Number of component entries found in the module.
		candidates: usize,
	},

	/// A props payload could not be parsed into a JSON object.
	#[error("Invalid JSON string passed to component ({layer}): {message}")]
	InvalidJson {
		/// Which props layer failed.
		layer: PropsSource,
		/// Parser message.
		message: String,
	},
}

impl ElementError {
	pub(crate) fn invalid_json(layer: PropsSource, message: impl Into<String>) -> Self {
		Self::InvalidJson {
			layer,
			message: message.into(),
		}
	}
}

/// Result type for element operations
pub type Result<T> = std::result::Result<T, ElementError>;
