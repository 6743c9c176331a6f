//! Props resolution.
//!
//! Props come from three sources, merged in this order:
//!
//! 1. the embedded JSON script block (base layer, read once at first mount),
//! 2. the `props` attribute, whose keys override the script block,
//! 3. whitelisted attributes, added as camelCase keys only where neither JSON
//!    layer already supplies the key.
//!
//! Attributes that are not whitelisted never become props.

use crate::error::{ElementError, PropsSource};
use crate::page::Page;
use crate::slots::SlotMap;
use convert_case::{Case, Casing};
use serde_json::Value;

/// JSON props as handed to `format_props` and serialized for hydration.
pub type PropsMap = serde_json::Map<String, Value>;

/// The props a component renders with: JSON values plus slot content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
	values: PropsMap,
	slots: SlotMap,
}

impl Props {
	/// Creates props from JSON values and slot content.
	pub fn new(values: PropsMap, slots: SlotMap) -> Self {
		Self { values, slots }
	}

	/// Creates props from a JSON value. Anything but an object yields empty props.
	pub fn from_values(values: Value) -> Self {
		match values {
			Value::Object(map) => Self::new(map, SlotMap::new()),
			_ => Self::default(),
		}
	}

	/// Returns the JSON values.
	pub fn values(&self) -> &PropsMap {
		&self.values
	}

	/// Returns the slot map.
	pub fn slots(&self) -> &SlotMap {
		&self.slots
	}

	/// Returns a JSON value by key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.values.get(key)
	}

	/// Returns a string value by key.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.values.get(key).and_then(Value::as_str)
	}

	/// Returns the fragment for a named slot.
	pub fn slot(&self, name: &str) -> Option<&Page> {
		self.slots.get(name)
	}

	/// Returns the generic children content.
	pub fn children(&self) -> Option<&Page> {
		self.slots.children()
	}

	/// Returns a prop as renderable content.
	///
	/// A slot with this name wins over a JSON value. Strings render as text,
	/// numbers and booleans as their JSON text. `null` and empty results are
	/// `None`, so callers can treat the prop as absent.
	pub fn node(&self, key: &str) -> Option<Page> {
		let page = match self.slots.get(key) {
			Some(slot) => slot.clone(),
			None => match self.values.get(key)? {
				Value::Null => return None,
				Value::String(text) => Page::text(text.clone()),
				other => Page::text(other.to_string()),
			},
		};
		(!page.is_empty()).then_some(page)
	}
}

/// Converts an attribute name to its prop key (`custom-title` -> `customTitle`).
pub fn prop_key(attribute: &str) -> String {
	attribute.from_case(Case::Kebab).to_case(Case::Camel)
}

/// Parses one JSON props layer.
///
/// The payload must be a JSON object; anything else is `InvalidJson`.
pub fn parse_json(raw: &str, layer: PropsSource) -> Result<PropsMap, ElementError> {
	match serde_json::from_str::<Value>(raw) {
		Ok(Value::Object(map)) => Ok(map),
		Ok(other) => Err(ElementError::invalid_json(
			layer,
			format!("expected a JSON object, found {}", json_kind(&other)),
		)),
		Err(err) => Err(ElementError::invalid_json(layer, err.to_string())),
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

/// Merged props plus the errors absorbed while merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedProps {
	/// The fully merged props.
	pub props: PropsMap,
	/// Parse failures; each failed layer contributed nothing.
	pub errors: Vec<ElementError>,
}

/// Merges the JSON attribute, the script block layer and whitelisted attributes.
#[derive(Debug, Clone, Copy)]
pub struct PropsResolver<'a> {
	props_attribute: &'a str,
	whitelist: &'a [String],
}

impl<'a> PropsResolver<'a> {
	/// Creates a resolver reading the JSON attribute `props_attribute` and the
	/// whitelisted attribute names.
	pub fn new(props_attribute: &'a str, whitelist: &'a [String]) -> Self {
		Self {
			props_attribute,
			whitelist,
		}
	}

	/// Returns `true` if a change to `attribute` requires recomputing props.
	pub fn observes(&self, attribute: &str) -> bool {
		attribute == self.props_attribute || self.whitelist.iter().any(|name| name == attribute)
	}

	/// Computes the merged props from the element's live attributes.
	///
	/// `script_layer` is the already parsed script block.
	pub fn resolve(
		&self,
		attributes: &[(String, String)],
		script_layer: Option<&PropsMap>,
	) -> ResolvedProps {
		let mut resolved = ResolvedProps {
			props: script_layer.cloned().unwrap_or_default(),
			errors: Vec::new(),
		};

		if let Some(raw) = attribute(attributes, self.props_attribute) {
			match parse_json(raw, PropsSource::Attribute) {
				Ok(layer) => resolved.props.extend(layer),
				Err(err) => resolved.errors.push(err),
			}
		}

		for name in self.whitelist {
			if let Some(value) = attribute(attributes, name) {
				resolved
					.props
					.entry(prop_key(name))
					.or_insert_with(|| Value::String(value.to_owned()));
			}
		}

		resolved
	}
}

fn attribute<'v>(attributes: &'v [(String, String)], name: &str) -> Option<&'v str> {
	attributes
		.iter()
		.find(|(key, _)| key == name)
		.map(|(_, value)| value.as_str())
}
