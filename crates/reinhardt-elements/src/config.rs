//! Registry configuration and per-definition options.

use crate::component::Component;
use crate::props::PropsMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Registry-wide configuration.
///
/// Deserializable so hosts can load it alongside their own settings; every
/// field falls back to its default when missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementsConfig {
	/// Prefix added to names without a hyphen (`message` -> `component-message`).
	pub tag_prefix: String,
	/// Attribute carrying the JSON props layer.
	pub props_attribute: String,
	/// Attribute marking server-rendered content.
	pub server_attribute: String,
}

impl Default for ElementsConfig {
	fn default() -> Self {
		Self {
			tag_prefix: "component".to_string(),
			props_attribute: "props".to_string(),
			server_attribute: "server".to_string(),
		}
	}
}

impl ElementsConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the tag prefix.
	pub fn tag_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.tag_prefix = prefix.into();
		self
	}

	/// Sets the JSON props attribute name.
	pub fn props_attribute(mut self, name: impl Into<String>) -> Self {
		self.props_attribute = name.into().to_ascii_lowercase();
		self
	}

	/// Sets the server marker attribute name.
	pub fn server_attribute(mut self, name: impl Into<String>) -> Self {
		self.server_attribute = name.into().to_ascii_lowercase();
		self
	}

	/// Derives the final tag name for a registered name.
	///
	/// Names are lower-cased; names without a hyphen get the prefix.
	pub fn tag_name(&self, name: &str) -> String {
		let name = name.to_ascii_lowercase();
		if name.contains('-') {
			name
		} else {
			format!("{}-{}", self.tag_prefix.to_ascii_lowercase(), name)
		}
	}
}

pub(crate) type FormatProps = Rc<dyn Fn(PropsMap) -> PropsMap>;
pub(crate) type WrapComponent = Rc<dyn Fn(Component) -> Component>;

/// Options for a single `define` call.
///
/// # Example
///
/// ```
/// use reinhardt_elements::DefineOptions;
///
/// let options = DefineOptions::new()
///     .attributes(["custom-title"])
///     .format_props(|mut props| {
///         props.insert("formatted".into(), true.into());
///         props
///     });
/// assert_eq!(options.observed_attributes(), ["custom-title"]);
/// ```
#[derive(Clone, Default)]
pub struct DefineOptions {
	pub(crate) attributes: Vec<String>,
	pub(crate) format_props: Option<FormatProps>,
	pub(crate) wrap_component: Option<WrapComponent>,
}

impl DefineOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Whitelists attributes that become camelCase props.
	pub fn attributes<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for name in names {
			let name = name.as_ref().to_ascii_lowercase();
			if !self.attributes.contains(&name) {
				self.attributes.push(name);
			}
		}
		self
	}

	/// Transforms the merged props before every render.
	pub fn format_props<F>(mut self, hook: F) -> Self
	where
		F: Fn(PropsMap) -> PropsMap + 'static,
	{
		self.format_props = Some(Rc::new(hook));
		self
	}

	/// Wraps the resolved component once, before it is cached for the tag.
	pub fn wrap_component<F>(mut self, hook: F) -> Self
	where
		F: Fn(Component) -> Component + 'static,
	{
		self.wrap_component = Some(Rc::new(hook));
		self
	}

	/// Returns the whitelisted attribute names.
	pub fn observed_attributes(&self) -> &[String] {
		&self.attributes
	}

	pub(crate) fn apply_format(&self, props: PropsMap) -> PropsMap {
		match &self.format_props {
			Some(hook) => hook(props),
			None => props,
		}
	}

	pub(crate) fn apply_wrap(&self, component: Component) -> Component {
		match &self.wrap_component {
			Some(hook) => hook(component),
			None => component,
		}
	}
}

impl fmt::Debug for DefineOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DefineOptions")
			.field("attributes", &self.attributes)
			.field("format_props", &self.format_props.is_some())
			.field("wrap_component", &self.wrap_component.is_some())
			.finish()
	}
}
