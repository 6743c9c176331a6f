//! Component references and factory results.
//!
//! A component is anything callable with [`Props`] that returns a [`Page`].
//! Factories registered with `define` return a [`ComponentResult`]: either a
//! ready [`Export`] or a deferred one that resolves on the microtask queue.
//! An export is a component or a module whose single component entry has to
//! be inferred (see [`crate::resolver`]).

use crate::page::Page;
use crate::props::Props;
use futures::future::{FutureExt, LocalBoxFuture};
use indexmap::IndexMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

type RenderFn = dyn Fn(&Props) -> Page;

/// A shareable component reference.
///
/// Cloning is cheap; every clone renders through the same function.
#[derive(Clone)]
pub struct Component {
	name: Option<String>,
	render: Rc<RenderFn>,
}

impl Component {
	/// Creates a component from a render function.
	pub fn new<F>(render: F) -> Self
	where
		F: Fn(&Props) -> Page + 'static,
	{
		Self {
			name: None,
			render: Rc::new(render),
		}
	}

	/// Creates a named component. The name only appears in diagnostics.
	pub fn named<F>(name: impl Into<String>, render: F) -> Self
	where
		F: Fn(&Props) -> Page + 'static,
	{
		Self {
			name: Some(name.into()),
			render: Rc::new(render),
		}
	}

	/// Returns the component name, if any.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Renders the component with the given props.
	pub fn render(&self, props: &Props) -> Page {
		(self.render)(props)
	}

	/// Returns `true` if both references point at the same render function.
	pub fn ptr_eq(&self, other: &Component) -> bool {
		Rc::ptr_eq(&self.render, &other.render)
	}
}

impl fmt::Debug for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Component")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

/// One entry of a module export.
#[derive(Debug, Clone)]
pub enum ModuleItem {
	/// A renderable component.
	Component(Component),
	/// Any other exported value (constants, metadata).
	Value(serde_json::Value),
}

impl ModuleItem {
	/// Capability check: returns the component if this entry can render props.
	pub fn as_component(&self) -> Option<&Component> {
		match self {
			Self::Component(component) => Some(component),
			Self::Value(_) => None,
		}
	}
}

impl From<Component> for ModuleItem {
	fn from(component: Component) -> Self {
		Self::Component(component)
	}
}

impl From<serde_json::Value> for ModuleItem {
	fn from(value: serde_json::Value) -> Self {
		Self::Value(value)
	}
}

/// The value a factory produces once resolved.
#[derive(Debug, Clone)]
pub enum Export {
	/// A component reference, used as-is.
	Component(Component),
	/// A mapping of named exports; the component must be inferred.
	Module(IndexMap<String, ModuleItem>),
}

impl Export {
	/// Builds a module export from `(name, item)` pairs.
	pub fn module<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<ModuleItem>,
	{
		Self::Module(
			entries
				.into_iter()
				.map(|(key, item)| (key.into(), item.into()))
				.collect(),
		)
	}
}

impl From<Component> for Export {
	fn from(component: Component) -> Self {
		Self::Component(component)
	}
}

/// The result of calling a component factory.
pub enum ComponentResult {
	/// The export is available immediately.
	Ready(Export),
	/// The export resolves later. Only valid in an interactive context.
	Deferred(LocalBoxFuture<'static, Export>),
}

impl ComponentResult {
	/// Wraps a future that resolves to an export.
	pub fn deferred<F, E>(future: F) -> Self
	where
		F: Future<Output = E> + 'static,
		E: Into<Export> + 'static,
	{
		Self::Deferred(future.map(Into::into).boxed_local())
	}

	/// Returns `true` for deferred results.
	pub fn is_deferred(&self) -> bool {
		matches!(self, Self::Deferred(_))
	}
}

impl fmt::Debug for ComponentResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ready(export) => f.debug_tuple("Ready").field(export).finish(),
			Self::Deferred(_) => f.debug_tuple("Deferred").field(&"<future>").finish(),
		}
	}
}

impl From<Export> for ComponentResult {
	fn from(export: Export) -> Self {
		Self::Ready(export)
	}
}

impl From<Component> for ComponentResult {
	fn from(component: Component) -> Self {
		Self::Ready(Export::Component(component))
	}
}

/// A registered factory, called when a component is needed.
pub(crate) type ComponentFactory = Rc<dyn Fn() -> ComponentResult>;

#[cfg(test)]
mod tests {
	use super::*;
	use crate::page::PageElement;
	use futures::executor::block_on;
	use rstest::rstest;

	fn greeting() -> Component {
		Component::named("Greeting", |props: &Props| {
			PageElement::new("em")
				.child(props.get_str("value").unwrap_or_default().to_owned())
				.into()
		})
	}

	#[rstest]
	fn test_component_renders_props() {
		let props = Props::from_values(serde_json::json!({"value": "x"}));
		assert_eq!(greeting().render(&props).render_to_string(), "<em>x</em>");
	}

	#[rstest]
	fn test_component_clone_shares_render_fn() {
		let component = greeting();
		let clone = component.clone();
		assert!(component.ptr_eq(&clone));
		assert!(!component.ptr_eq(&greeting()));
		assert_eq!(clone.name(), Some("Greeting"));
	}

	#[rstest]
	fn test_module_item_capability_check() {
		assert!(ModuleItem::from(greeting()).as_component().is_some());
		assert!(
			ModuleItem::from(serde_json::json!("1.0"))
				.as_component()
				.is_none()
		);
	}

	#[rstest]
	fn test_export_module_keeps_order() {
		let export = Export::module([
			("version", ModuleItem::from(serde_json::json!(1))),
			("Greeting", ModuleItem::from(greeting())),
		]);
		let Export::Module(entries) = export else {
			panic!("expected module");
		};
		let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
		assert_eq!(keys, vec!["version", "Greeting"]);
	}

	#[rstest]
	fn test_deferred_result_resolves() {
		let result = ComponentResult::deferred(async { greeting() });
		assert!(result.is_deferred());
		let ComponentResult::Deferred(future) = result else {
			panic!("expected deferred");
		};
		assert!(matches!(block_on(future), Export::Component(_)));
	}

	#[rstest]
	fn test_ready_result_from_component() {
		let result = ComponentResult::from(greeting());
		assert!(!result.is_deferred());
	}
}
