//! Element lifecycle.
//!
//! Each DOM callback maps to exactly one transition of [`MountState`]:
//!
//! ```text
//!                connect (ready)                       disconnect
//!  Unmounted ───────────────────────────▶ Mounted ─────────────────▶ Disconnected
//!      │                                   ▲   │ attribute change      │
//!      │ connect (deferred)                │   └──────▶ re-render      │ reconnect
//!      ▼               resolved + connected│                           │ (cached children)
//!  Resolving ──────────────────────────────┘ ◀─────────────────────────┘
//!      │ resolved while detached
//!      ▼
//!  Unmounted
//! ```
//!
//! No error leaves a callback: failures are logged with `error_log!` and
//! recorded on the element.

use crate::component::{Component, ComponentResult, Export};
use crate::dom::{Element, LifecycleObserver, WeakElement};
use crate::error::{ElementError, PropsSource};
use crate::props::{Props, PropsMap, PropsResolver, parse_json};
use crate::registry::{Definition, ElementRegistry};
use crate::renderer::RenderMode;
use crate::slots::{SlotExtractor, SlotMap};
use crate::{debug_log, error_log};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use std::rc::Rc;

/// Lifecycle state of a custom element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
	/// Not rendered; the next connect starts from scratch.
	Unmounted,
	/// Waiting for a deferred factory.
	Resolving,
	/// Attached and rendered.
	Mounted,
	/// Detached after being mounted; children are cached.
	Disconnected,
}

/// The per-element record kept in the registry's side table.
#[derive(Debug)]
pub(crate) struct Instance {
	state: MountState,
	props: PropsMap,
	script_props: Option<PropsMap>,
	slots: SlotMap,
	server: bool,
	last_error: Option<ElementError>,
	render_count: usize,
}

impl Instance {
	fn new(server: bool) -> Self {
		Self {
			state: MountState::Unmounted,
			props: PropsMap::new(),
			script_props: None,
			slots: SlotMap::new(),
			server,
			last_error: None,
			render_count: 0,
		}
	}

	pub(crate) fn state(&self) -> MountState {
		self.state
	}

	pub(crate) fn props(&self) -> &PropsMap {
		&self.props
	}

	pub(crate) fn last_error(&self) -> Option<&ElementError> {
		self.last_error.as_ref()
	}

	pub(crate) fn render_count(&self) -> usize {
		self.render_count
	}
}

impl ElementRegistry {
	fn on_connected(&self, element: &Element) {
		let Some(definition) = self.definition(&element.tag_name()) else {
			return;
		};
		let state = self.state_of(element);
		match state {
			None | Some(MountState::Unmounted) => self.mount(&definition, element),
			Some(MountState::Disconnected) => self.remount(&definition, element),
			Some(MountState::Resolving) | Some(MountState::Mounted) => {
				debug_log!("<{}>: connected while {:?}", definition.tag(), state);
			}
		}
	}

	fn on_disconnected(&self, element: &Element) {
		let slots = {
			let mut instances = self.instances.borrow_mut();
			match instances.get_mut(element) {
				Some(instance) if instance.state == MountState::Mounted => {
					instance.state = MountState::Disconnected;
					std::mem::take(&mut instance.slots)
				}
				_ => return,
			}
		};
		self.child_cache.borrow_mut().capture(element, slots);
		self.renderer.unmount(element);
	}

	fn on_attribute_changed(&self, element: &Element, name: &str) {
		let Some(definition) = self.definition(&element.tag_name()) else {
			return;
		};
		let resolver = PropsResolver::new(
			&self.config.props_attribute,
			definition.options().observed_attributes(),
		);
		if !resolver.observes(name) || self.state_of(element) != Some(MountState::Mounted) {
			return;
		}
		if let Some(component) = definition.cached() {
			self.render(&definition, element, &component, RenderMode::Mount);
		}
	}

	/// First connect: extract content, then resolve and render.
	fn mount(&self, definition: &Rc<Definition>, element: &Element) {
		let server = element.has_attribute(&self.config.server_attribute);
		let extraction = SlotExtractor::extract_nodes(element.child_pages(), server);

		let mut instance = Instance::new(server);
		instance.slots = extraction.slots;
		if let Some(raw) = extraction.json {
			match parse_json(&raw, PropsSource::ScriptBlock) {
				Ok(layer) => instance.script_props = Some(layer),
				Err(err) => {
					error_log!("<{}>: {}", definition.tag(), err);
					instance.last_error = Some(err);
				}
			}
		}

		let component = match definition.cached() {
			Some(component) => Ok(component),
			None => match definition.call_factory() {
				ComponentResult::Ready(export) => definition.store(export),
				ComponentResult::Deferred(future) => {
					instance.state = MountState::Resolving;
					self.instances.borrow_mut().insert(element, instance);
					self.spawn_resolution(Rc::clone(definition), element.downgrade(), future);
					return;
				}
			},
		};

		self.instances.borrow_mut().insert(element, instance);
		match component {
			Ok(component) => self.render(definition, element, &component, mount_mode(server)),
			Err(err) => self.fail(definition, element, err),
		}
	}

	/// Reconnect after a move: render again from the cached children.
	fn remount(&self, definition: &Rc<Definition>, element: &Element) {
		let slots = self.child_cache.borrow().restore(element).unwrap_or_default();
		if let Some(instance) = self.instances.borrow_mut().get_mut(element) {
			instance.slots = slots;
		}
		match definition.cached() {
			Some(component) => self.render(definition, element, &component, RenderMode::Mount),
			None => self.mount(definition, element),
		}
	}

	fn spawn_resolution(
		&self,
		definition: Rc<Definition>,
		element: WeakElement,
		future: LocalBoxFuture<'static, Export>,
	) {
		let registry = self.this.clone();
		let task = async move {
			let export = future.await;
			if let Some(registry) = registry.upgrade() {
				registry.finish_resolution(&definition, &element, export);
			}
		};
		if let Err(err) = self.spawner.spawn_local(task) {
			error_log!("failed to queue component resolution: {}", err);
		}
	}

	/// Continuation of a deferred factory.
	fn finish_resolution(
		&self,
		definition: &Rc<Definition>,
		element: &WeakElement,
		export: Export,
	) {
		let Some(element) = element.upgrade() else {
			return;
		};
		if self.state_of(&element) != Some(MountState::Resolving) {
			return;
		}

		let component = match definition.store(export) {
			Ok(component) => component,
			Err(err) => return self.fail(definition, &element, err),
		};

		if !element.is_connected() {
			debug_log!("<{}>: resolved while detached, not rendering", definition.tag());
			self.set_state(&element, MountState::Unmounted);
			return;
		}

		let server = self
			.instances
			.borrow()
			.get(&element)
			.is_some_and(|instance| instance.server);
		self.render(definition, &element, &component, mount_mode(server));
	}

	/// Recomputes props and renders. No borrow is held while user code runs.
	fn render(
		&self,
		definition: &Rc<Definition>,
		element: &Element,
		component: &Component,
		mode: RenderMode,
	) {
		let (resolved, slots) = {
			let instances = self.instances.borrow();
			let Some(instance) = instances.get(element) else {
				return;
			};
			let resolver = PropsResolver::new(
				&self.config.props_attribute,
				definition.options().observed_attributes(),
			);
			(
				resolver.resolve(&element.attributes(), instance.script_props.as_ref()),
				instance.slots.clone(),
			)
		};
		for err in &resolved.errors {
			error_log!("<{}>: {}", definition.tag(), err);
		}

		let formatted = definition.options().apply_format(resolved.props.clone());
		let page = component.render(&Props::new(formatted, slots));

		if let Some(instance) = self.instances.borrow_mut().get_mut(element) {
			instance.state = MountState::Mounted;
			instance.props = resolved.props;
			instance.render_count += 1;
			if let Some(err) = resolved.errors.last() {
				instance.last_error = Some(err.clone());
			}
		}
		self.renderer.render(&page, element, mode);
	}

	fn fail(&self, definition: &Definition, element: &Element, err: ElementError) {
		error_log!("<{}>: {}", definition.tag(), err);
		if let Some(instance) = self.instances.borrow_mut().get_mut(element) {
			instance.state = MountState::Unmounted;
			instance.last_error = Some(err);
		}
	}

	fn set_state(&self, element: &Element, state: MountState) {
		if let Some(instance) = self.instances.borrow_mut().get_mut(element) {
			instance.state = state;
		}
	}
}

fn mount_mode(server: bool) -> RenderMode {
	if server {
		RenderMode::Hydrate
	} else {
		RenderMode::Mount
	}
}

impl LifecycleObserver for ElementRegistry {
	fn observes(&self, tag: &str) -> bool {
		self.is_interactive() && self.is_defined(tag)
	}

	fn connected(&self, element: &Element) {
		self.on_connected(element);
	}

	fn disconnected(&self, element: &Element) {
		self.on_disconnected(element);
	}

	fn attribute_changed(
		&self,
		element: &Element,
		name: &str,
		_old: Option<&str>,
		_new: Option<&str>,
	) {
		self.on_attribute_changed(element, name);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{DefineOptions, ElementsConfig};
	use crate::dom::Document;
	use crate::page::{IntoPage, PageElement};
	use rstest::{fixture, rstest};

	fn value_component() -> Component {
		Component::new(|props: &Props| {
			PageElement::new("em")
				.child(props.get_str("value").unwrap_or_default().to_owned())
				.into_page()
		})
	}

	#[fixture]
	fn registry() -> Rc<ElementRegistry> {
		let registry = ElementRegistry::interactive(ElementsConfig::default());
		registry
			.define("message-one", value_component, DefineOptions::new())
			.unwrap();
		registry
	}

	#[rstest]
	fn test_connect_mounts(registry: Rc<ElementRegistry>) {
		let document = Document::new(&registry);
		let element = document.create_element("message-one");
		element.set_attribute("props", r#"{"value":"x"}"#);

		assert_eq!(registry.state_of(&element), None);
		document.body().append_child(&element);

		assert_eq!(registry.state_of(&element), Some(MountState::Mounted));
		assert_eq!(registry.render_count(&element), 1);
		assert_eq!(element.inner_html(), "<em>x</em>");
	}

	#[rstest]
	fn test_attribute_change_before_mount_is_ignored(registry: Rc<ElementRegistry>) {
		let document = Document::new(&registry);
		let element = document.create_element("message-one");
		element.set_attribute("props", r#"{"value":"first"}"#);
		element.set_attribute("props", r#"{"value":"last"}"#);

		assert_eq!(registry.render_count(&element), 0);
		document.body().append_child(&element);

		assert_eq!(registry.render_count(&element), 1);
		assert_eq!(element.inner_html(), "<em>last</em>");
	}

	#[rstest]
	fn test_unobserved_attribute_does_not_render(registry: Rc<ElementRegistry>) {
		let document = Document::new(&registry);
		let element = document.create_element("message-one");
		document.body().append_child(&element);

		element.set_attribute("class", "card");

		assert_eq!(registry.render_count(&element), 1);
	}

	#[rstest]
	fn test_disconnect_unmounts_and_caches(registry: Rc<ElementRegistry>) {
		let document = Document::new(&registry);
		let element = document.create_element("message-one");
		element.set_inner_html("<p>child</p>");
		document.body().append_child(&element);

		element.remove();

		assert_eq!(registry.state_of(&element), Some(MountState::Disconnected));
		assert!(element.children().is_empty());
		assert_eq!(registry.cached_children(), 1);
	}

	#[rstest]
	fn test_attribute_change_while_disconnected_is_ignored(registry: Rc<ElementRegistry>) {
		let document = Document::new(&registry);
		let element = document.create_element("message-one");
		document.body().append_child(&element);
		element.remove();

		element.set_attribute("props", r#"{"value":"x"}"#);

		assert_eq!(registry.render_count(&element), 1);
		assert!(element.children().is_empty());
	}

	#[rstest]
	fn test_invalid_script_block_is_recorded(registry: Rc<ElementRegistry>) {
		let document = Document::new(&registry);
		let element = document.create_element("message-one");
		element.set_inner_html(r#"<script type="application/json">{oops</script>"#);

		document.body().append_child(&element);

		assert_eq!(registry.state_of(&element), Some(MountState::Mounted));
		assert!(matches!(
			registry.last_error(&element),
			Some(ElementError::InvalidJson {
				layer: PropsSource::ScriptBlock,
				..
			})
		));
		assert_eq!(element.inner_html(), "<em></em>");
	}

	#[rstest]
	fn test_undefined_tags_are_not_tracked(registry: Rc<ElementRegistry>) {
		let document = Document::new(&registry);
		let element = document.create_element("message-unknown");

		document.body().append_child(&element);

		assert_eq!(registry.state_of(&element), None);
	}

	#[rstest]
	fn test_server_registry_never_observes() {
		let registry = ElementRegistry::server(ElementsConfig::default());
		registry
			.define("message-one", value_component, DefineOptions::new())
			.unwrap();

		assert!(!registry.observes("message-one"));
	}

	#[rstest]
	#[case(false, RenderMode::Mount)]
	#[case(true, RenderMode::Hydrate)]
	fn test_mount_mode(#[case] server: bool, #[case] expected: RenderMode) {
		assert_eq!(mount_mode(server), expected);
	}
}
