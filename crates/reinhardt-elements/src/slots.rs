//! Slot extraction.
//!
//! Splits the markup an element contains when it first mounts into:
//!
//! - the embedded `<script type="application/json">` block (props metadata,
//!   never content),
//! - named slots: every top-level child with a `slot="name"` attribute,
//!   routed to the prop `name`,
//! - children: everything else, in document order.
//!
//! ```text
//! <message-one>
//!   <script type="application/json">{"value":"x"}</script>   -> script layer
//!   <div slot="customTitle"><em>Title</em></div>            -> slots["customTitle"]
//!   <p>Body</p>                                              -> children
//! </message-one>
//! ```

use crate::page::{Page, PageElement};
use crate::parse::parse_fragment;
use indexmap::IndexMap;

/// The MIME type of the embedded props block.
pub const JSON_SCRIPT_TYPE: &str = "application/json";

/// The attribute routing a child into a named slot.
pub const SLOT_ATTRIBUTE: &str = "slot";

/// Named slot fragments plus the default children entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotMap {
	named: IndexMap<String, Page>,
	children: Option<Page>,
}

impl SlotMap {
	/// Creates an empty slot map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the fragment for a named slot.
	pub fn get(&self, name: &str) -> Option<&Page> {
		self.named.get(name)
	}

	/// Returns the default (non-slotted) content.
	pub fn children(&self) -> Option<&Page> {
		self.children.as_ref()
	}

	/// Iterates over named slots in document order of first appearance.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Page)> {
		self.named.iter().map(|(name, page)| (name.as_str(), page))
	}

	/// Returns the number of named slots.
	pub fn len(&self) -> usize {
		self.named.len()
	}

	/// Returns `true` if there are no named slots and no children.
	pub fn is_empty(&self) -> bool {
		self.named.is_empty() && self.children.is_none()
	}

	/// Sets the default children entry.
	pub fn set_children(&mut self, children: Page) {
		self.children = (!children.is_empty()).then_some(children);
	}

	/// Appends content to a named slot, concatenating with earlier content.
	pub fn append(&mut self, name: impl Into<String>, content: Vec<Page>) {
		let slot = self
			.named
			.entry(name.into())
			.or_insert_with(|| Page::Fragment(Vec::new()));
		if let Page::Fragment(nodes) = slot {
			nodes.extend(content);
		}
	}
}

/// The result of extracting an element's initial content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
	/// Text of the first top-level JSON script block, if any.
	pub json: Option<String>,
	/// Slots and children. Empty for server-rendered elements.
	pub slots: SlotMap,
}

/// Partitions contained markup into slots, children and the JSON block.
pub struct SlotExtractor;

impl SlotExtractor {
	/// Extracts slots from an element's contained markup.
	///
	/// When `server_rendered` is set only the JSON block is read: the rest of
	/// the markup is the component's own output and is left to the renderer.
	pub fn extract(markup: &str, server_rendered: bool) -> Extraction {
		Self::extract_nodes(parse_fragment(markup), server_rendered)
	}

	/// Same as [`SlotExtractor::extract`], for already parsed nodes.
	pub fn extract_nodes(nodes: Vec<Page>, server_rendered: bool) -> Extraction {
		let mut extraction = Extraction::default();
		let mut children = Vec::new();

		for node in nodes {
			let element = match node {
				Page::Element(element) => element,
				other => {
					if !server_rendered {
						children.push(other);
					}
					continue;
				}
			};

			if is_json_script(&element) {
				if extraction.json.is_none() {
					extraction.json = Some(text_content(&element));
				}
				continue;
			}

			if server_rendered {
				continue;
			}

			match element.get_attr(SLOT_ATTRIBUTE).map(str::to_owned) {
				Some(name) => extraction.slots.append(name, element.into_children()),
				None => children.push(Page::Element(element)),
			}
		}

		if !server_rendered {
			extraction.slots.set_children(Page::Fragment(children));
		}

		extraction
	}
}

/// Returns `true` for `<script type="application/json">`.
pub fn is_json_script(element: &PageElement) -> bool {
	element.tag_name() == "script"
		&& element
			.get_attr("type")
			.is_some_and(|value| value.trim().eq_ignore_ascii_case(JSON_SCRIPT_TYPE))
}

fn text_content(element: &PageElement) -> String {
	let mut text = String::new();
	for child in element.child_views() {
		collect_text(child, &mut text);
	}
	text
}

fn collect_text(page: &Page, output: &mut String) {
	match page {
		Page::Text(text) | Page::Raw(text) => output.push_str(text),
		Page::Element(element) => {
			for child in element.child_views() {
				collect_text(child, output);
			}
		}
		Page::Fragment(children) => {
			for child in children {
				collect_text(child, output);
			}
		}
		Page::Empty => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_extract_children_only() {
		let html = r#"<p data-title="test">Testing</p><br><button title="test">Click here</button>"#;
		let extraction = SlotExtractor::extract(html, false);

		assert!(extraction.json.is_none());
		assert_eq!(extraction.slots.len(), 0);
		assert_eq!(
			extraction.slots.children().map(Page::render_to_string),
			Some(
				r#"<p data-title="test">Testing</p><br /><button title="test">Click here</button>"#
					.to_string()
			)
		);
	}

	#[rstest]
	fn test_extract_excludes_json_script() {
		let html = r#"<script type="application/json">{"value":"x"}</script><p>Body</p>"#;
		let extraction = SlotExtractor::extract(html, false);

		assert_eq!(extraction.json.as_deref(), Some(r#"{"value":"x"}"#));
		assert_eq!(
			extraction.slots.children().map(Page::render_to_string),
			Some("<p>Body</p>".to_string())
		);
	}

	#[rstest]
	fn test_extract_named_slot_uses_inner_markup() {
		let html = r#"<div slot="customTitle"><em>customTitle</em></div>"#;
		let extraction = SlotExtractor::extract(html, false);

		assert_eq!(
			extraction
				.slots
				.get("customTitle")
				.map(Page::render_to_string),
			Some("<em>customTitle</em>".to_string())
		);
		assert!(extraction.slots.children().is_none());
	}

	#[rstest]
	fn test_extract_same_slot_concatenates_in_document_order() {
		let html = r#"<span slot="items">a</span><p>middle</p><span slot="items">b</span>"#;
		let extraction = SlotExtractor::extract(html, false);

		assert_eq!(extraction.slots.len(), 1);
		assert_eq!(
			extraction.slots.get("items").map(Page::render_to_string),
			Some("ab".to_string())
		);
		assert_eq!(
			extraction.slots.children().map(Page::render_to_string),
			Some("<p>middle</p>".to_string())
		);
	}

	#[rstest]
	fn test_extract_only_top_level_slots() {
		let html = r#"<section><div slot="nested">x</div></section>"#;
		let extraction = SlotExtractor::extract(html, false);

		assert!(extraction.slots.get("nested").is_none());
		assert_eq!(
			extraction.slots.children().map(Page::render_to_string),
			Some(r#"<section><div slot="nested">x</div></section>"#.to_string())
		);
	}

	#[rstest]
	fn test_extract_server_rendered_reads_json_only() {
		let html = r#"<em>serverRender</em><script type="application/json">{"value":"serverRender"}</script>"#;
		let extraction = SlotExtractor::extract(html, true);

		assert_eq!(
			extraction.json.as_deref(),
			Some(r#"{"value":"serverRender"}"#)
		);
		assert!(extraction.slots.is_empty());
	}

	#[rstest]
	fn test_extract_first_json_script_wins() {
		let html = r#"<script type="application/json">{"a":1}</script><script type="application/json">{"a":2}</script>"#;
		let extraction = SlotExtractor::extract(html, false);

		assert_eq!(extraction.json.as_deref(), Some(r#"{"a":1}"#));
		assert!(extraction.slots.children().is_none());
	}

	#[rstest]
	fn test_other_scripts_are_children() {
		let html = r#"<script>let a = 1;</script>"#;
		let extraction = SlotExtractor::extract(html, false);

		assert!(extraction.json.is_none());
		assert!(extraction.slots.children().is_some());
	}

	#[rstest]
	fn test_empty_markup_yields_empty_slots() {
		let extraction = SlotExtractor::extract("", false);
		assert!(extraction.slots.is_empty());
	}
}
