//! Component resolution.
//!
//! Turns an [`Export`] into the one component a tag renders with. Module
//! exports are searched shallowly:
//!
//! 1. the entry named after the tag in PascalCase (`message-six` -> `MessageSix`),
//!    if it is a component;
//! 2. otherwise the only component entry;
//! 3. otherwise [`ElementError::ComponentNotFound`].

use crate::component::{Component, ComponentResult, Export};
use crate::error::{ElementError, Result};
use convert_case::{Case, Casing};

/// Returns the PascalCase export name for a tag (`message-six` -> `MessageSix`).
pub fn export_name(tag: &str) -> String {
	tag.from_case(Case::Kebab).to_case(Case::Pascal)
}

/// Infers the component from a resolved export.
pub fn infer_component(tag: &str, export: Export) -> Result<Component> {
	let entries = match export {
		Export::Component(component) => return Ok(component),
		Export::Module(entries) => entries,
	};

	let by_name = export_name(tag);
	if let Some(component) = entries.get(&by_name).and_then(|item| item.as_component()) {
		return Ok(component.clone());
	}

	let mut candidates = entries.values().filter_map(|item| item.as_component());
	match (candidates.next(), candidates.next()) {
		(Some(component), None) => Ok(component.clone()),
		_ => Err(ElementError::ComponentNotFound {
			tag: tag.to_string(),
			candidates: entries.values().filter(|item| item.as_component().is_some()).count(),
		}),
	}
}

/// Resolves a factory result that must be available synchronously.
///
/// Used in server contexts, where a deferred result is an error.
pub fn resolve_now(tag: &str, result: ComponentResult) -> Result<Component> {
	match result {
		ComponentResult::Ready(export) => infer_component(tag, export),
		ComponentResult::Deferred(_) => Err(ElementError::PromiseNotSupported {
			tag: tag.to_string(),
		}),
	}
}
