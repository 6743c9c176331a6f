//! Tag registration.
//!
//! An [`ElementRegistry`] owns everything the bridge keeps: definitions per tag,
//! the per-element lifecycle records, the child cache, the renderer and the
//! microtask queue deferred factories resolve on. There is no global registry;
//! documents are created against a registry explicitly.
//!
//! ## Example
//!
//! ```
//! use reinhardt_elements::{Component, DefineOptions, Document, ElementRegistry, ElementsConfig};
//! use reinhardt_elements::page::{IntoPage, PageElement};
//!
//! let registry = ElementRegistry::interactive(ElementsConfig::default());
//! registry
//!     .define(
//!         "message",
//!         || Component::new(|props| {
//!             PageElement::new("em")
//!                 .child(props.get_str("value").unwrap_or_default().to_owned())
//!                 .into_page()
//!         }),
//!         DefineOptions::new(),
//!     )
//!     .unwrap();
//!
//! let document = Document::new(&registry);
//! let element = document.create_element("component-message");
//! element.set_attribute("props", r#"{"value":"hello"}"#);
//! document.body().append_child(&element);
//!
//! assert_eq!(element.inner_html(), "<em>hello</em>");
//! ```

use crate::cache::{ChildCache, WeakKeyMap};
use crate::component::{Component, ComponentFactory, ComponentResult, Export};
use crate::config::{DefineOptions, ElementsConfig};
use crate::dom::Element;
use crate::element::{Instance, MountState};
use crate::error::{ElementError, Result};
use crate::props::PropsMap;
use crate::renderer::{DomRenderer, Renderer};
use crate::resolver::{infer_component, resolve_now};
use crate::ssr::ElementFactory;
use crate::{error_log, info_log};
use futures::executor::{LocalPool, LocalSpawner};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// One registered tag.
pub(crate) struct Definition {
	tag: String,
	factory: ComponentFactory,
	options: DefineOptions,
	component: RefCell<Option<Component>>,
}

impl Definition {
	fn new(tag: String, factory: ComponentFactory, options: DefineOptions) -> Self {
		Self {
			tag,
			factory,
			options,
			component: RefCell::new(None),
		}
	}

	pub(crate) fn tag(&self) -> &str {
		&self.tag
	}

	pub(crate) fn options(&self) -> &DefineOptions {
		&self.options
	}

	/// Returns the resolved, wrapped component if it is cached.
	pub(crate) fn cached(&self) -> Option<Component> {
		self.component.borrow().clone()
	}

	pub(crate) fn call_factory(&self) -> ComponentResult {
		(self.factory)()
	}

	/// Infers, wraps and caches the component. The first stored component wins.
	pub(crate) fn store(&self, export: Export) -> Result<Component> {
		if let Some(component) = self.cached() {
			return Ok(component);
		}
		let component = self.options.apply_wrap(infer_component(&self.tag, export)?);
		*self.component.borrow_mut() = Some(component.clone());
		Ok(component)
	}

	/// Returns the component, calling the factory if needed. Deferred results fail.
	pub(crate) fn component_now(&self) -> Result<Component> {
		if let Some(component) = self.cached() {
			return Ok(component);
		}
		let component = self
			.options
			.apply_wrap(resolve_now(&self.tag, self.call_factory())?);
		*self.component.borrow_mut() = Some(component.clone());
		Ok(component)
	}
}

/// Registers components as custom elements and drives their lifecycle.
pub struct ElementRegistry {
	pub(crate) config: ElementsConfig,
	interactive: bool,
	definitions: RefCell<HashMap<String, Rc<Definition>>>,
	pub(crate) instances: RefCell<WeakKeyMap<Instance>>,
	pub(crate) child_cache: RefCell<ChildCache>,
	pub(crate) renderer: Box<dyn Renderer>,
	microtasks: RefCell<LocalPool>,
	pub(crate) spawner: LocalSpawner,
	pub(crate) this: Weak<ElementRegistry>,
}

impl ElementRegistry {
	/// Creates a registry for an interactive (browser-like) context.
	pub fn interactive(config: ElementsConfig) -> Rc<Self> {
		Self::build(config, true, Box::new(DomRenderer::new()))
	}

	/// Creates an interactive registry with a custom renderer.
	pub fn with_renderer<R>(config: ElementsConfig, renderer: R) -> Rc<Self>
	where
		R: Renderer + 'static,
	{
		Self::build(config, true, Box::new(renderer))
	}

	/// Creates a registry for a server context.
	///
	/// Definitions never attach to documents, and factories are resolved
	/// eagerly: a deferred factory fails at `define` time.
	pub fn server(config: ElementsConfig) -> Rc<Self> {
		Self::build(config, false, Box::new(DomRenderer::new()))
	}

	fn build(config: ElementsConfig, interactive: bool, renderer: Box<dyn Renderer>) -> Rc<Self> {
		let microtasks = LocalPool::new();
		let spawner = microtasks.spawner();
		Rc::new_cyclic(|this| Self {
			config,
			interactive,
			definitions: RefCell::new(HashMap::new()),
			instances: RefCell::new(WeakKeyMap::new()),
			child_cache: RefCell::new(ChildCache::new()),
			renderer,
			microtasks: RefCell::new(microtasks),
			spawner,
			this: this.clone(),
		})
	}

	/// Returns the configuration.
	pub fn config(&self) -> &ElementsConfig {
		&self.config
	}

	/// Returns `true` for interactive registries.
	pub fn is_interactive(&self) -> bool {
		self.interactive
	}

	/// Registers a component factory under a tag name.
	///
	/// Names without a hyphen get the configured prefix. The first definition
	/// of a tag wins; later calls return a factory bound to it.
	///
	/// # Errors
	///
	/// On a server registry the factory is called immediately, and a deferred
	/// result fails with `PromiseNotSupported`. A module export without a
	/// single component fails with `ComponentNotFound`.
	pub fn define<F, R>(
		&self,
		name: &str,
		factory: F,
		options: DefineOptions,
	) -> Result<ElementFactory>
	where
		F: Fn() -> R + 'static,
		R: Into<ComponentResult>,
	{
		let tag = self.config.tag_name(name);

		let existing = self.definitions.borrow().get(&tag).cloned();
		let definition = match existing {
			Some(definition) => {
				info_log!("<{}> is already defined, keeping the first definition", tag);
				definition
			}
			None => {
				let factory: ComponentFactory =
					Rc::new(move || -> ComponentResult { factory().into() });
				let definition = Rc::new(Definition::new(tag.clone(), factory, options));
				if !self.interactive {
					definition.component_now().inspect_err(|err| {
						error_log!("<{}>: {}", tag, err);
					})?;
				}
				self.definitions
					.borrow_mut()
					.insert(tag, Rc::clone(&definition));
				definition
			}
		};

		Ok(ElementFactory::new(
			definition,
			self.config.server_attribute.clone(),
		))
	}

	/// Returns `true` if a tag is defined.
	pub fn is_defined(&self, tag: &str) -> bool {
		self.definitions
			.borrow()
			.contains_key(&tag.to_ascii_lowercase())
	}

	/// Returns the defined tag names, sorted.
	pub fn tag_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.definitions.borrow().keys().cloned().collect();
		names.sort();
		names
	}

	pub(crate) fn definition(&self, tag: &str) -> Option<Rc<Definition>> {
		self.definitions.borrow().get(tag).cloned()
	}

	/// Runs queued continuations until none can make progress.
	///
	/// Deferred factories resolve here; the host calls it from its event loop.
	/// Calls made while the queue is already running are ignored.
	pub fn flush_microtasks(&self) {
		match self.microtasks.try_borrow_mut() {
			Ok(mut pool) => pool.run_until_stalled(),
			Err(_) => info_log!("microtask queue is already running"),
		}
	}

	/// Returns the lifecycle state of an element, if it was ever connected.
	pub fn state_of(&self, element: &Element) -> Option<MountState> {
		self.instances.borrow().get(element).map(Instance::state)
	}

	/// Returns the merged props an element last rendered with, before `format_props`.
	pub fn props_of(&self, element: &Element) -> Option<PropsMap> {
		self.instances
			.borrow()
			.get(element)
			.filter(|instance| instance.render_count() > 0)
			.map(|instance| instance.props().clone())
	}

	/// Returns the most recent error absorbed for an element.
	pub fn last_error(&self, element: &Element) -> Option<ElementError> {
		self.instances
			.borrow()
			.get(element)
			.and_then(|instance| instance.last_error().cloned())
	}

	/// Returns how many times an element was rendered.
	pub fn render_count(&self, element: &Element) -> usize {
		self.instances
			.borrow()
			.get(element)
			.map_or(0, Instance::render_count)
	}

	/// Returns the number of live elements with cached children.
	pub fn cached_children(&self) -> usize {
		self.child_cache.borrow().live_len()
	}
}

impl fmt::Debug for ElementRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ElementRegistry")
			.field("config", &self.config)
			.field("interactive", &self.interactive)
			.field("tags", &self.tag_names())
			.finish_non_exhaustive()
	}
}
