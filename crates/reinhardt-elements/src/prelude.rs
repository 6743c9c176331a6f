//! Convenience re-exports for common usage.
//!
//! ```ignore
//! use reinhardt_elements::prelude::*;
//! ```

// Registration
pub use crate::config::{DefineOptions, ElementsConfig};
pub use crate::registry::ElementRegistry;
pub use crate::ssr::ElementFactory;

// Components
pub use crate::component::{Component, ComponentResult, Export, ModuleItem};
pub use crate::page::{IntoPage, Page, PageElement};
pub use crate::props::{Props, PropsMap};

// Host document and lifecycle
pub use crate::dom::{Document, Element};
pub use crate::element::MountState;

// Error types
pub use crate::error::ElementError;
