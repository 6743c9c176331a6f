//! Server rendering.
//!
//! A definition renders on the server as its wrapper element carrying the
//! server marker, the component output, and one trailing JSON script block with
//! the props it was rendered from:
//!
//! ```text
//! <message-one server="">
//!   <em>serverValue</em>
//!   <script type="application/json">{"value":"serverValue"}</script>
//! </message-one>
//! ```
//!
//! On the client the marker makes the bridge skip children extraction and
//! hydrate the existing markup, reading its props back from the script block.

use crate::error::Result;
use crate::page::{Page, PageElement};
use crate::props::{Props, PropsMap};
use crate::registry::Definition;
use crate::slots::{JSON_SCRIPT_TYPE, SlotMap};
use std::rc::Rc;

/// Escapes JSON content for safe embedding in HTML script tags.
///
/// `</` becomes `<\/`, which JSON parsers read back as `</` while HTML
/// parsers no longer see a closing tag.
pub fn escape_json_for_script(json: &str) -> String {
	json.replace("</", "<\\/")
}

/// Builds the `<script type="application/json">` block for `props`.
pub fn json_script(props: &PropsMap) -> Page {
	let json = serde_json::to_string(props).unwrap_or_else(|_| "{}".to_string());
	PageElement::new("script")
		.attr("type", JSON_SCRIPT_TYPE)
		.child(Page::raw(escape_json_for_script(&json)))
		.into()
}

/// Renders a defined component as server markup.
///
/// Returned by [`ElementRegistry::define`](crate::ElementRegistry::define).
#[derive(Clone)]
pub struct ElementFactory {
	definition: Rc<Definition>,
	server_attribute: String,
}

impl ElementFactory {
	pub(crate) fn new(definition: Rc<Definition>, server_attribute: String) -> Self {
		Self {
			definition,
			server_attribute,
		}
	}

	/// Returns the final tag name.
	pub fn tag_name(&self) -> &str {
		self.definition.tag()
	}

	/// Renders the wrapper element for `props`.
	///
	/// The script block carries `props` as given; `format_props` is applied
	/// only to what the component receives, so hydration applies it exactly
	/// once more on the client.
	///
	/// # Errors
	///
	/// Returns `PromiseNotSupported` if the component is not available
	/// synchronously, or `ComponentNotFound` if it cannot be inferred.
	pub fn render(&self, props: PropsMap) -> Result<Page> {
		let component = self.definition.component_now()?;
		let script = json_script(&props);
		let formatted = self.definition.options().apply_format(props);
		let output = component.render(&Props::new(formatted, SlotMap::new()));

		Ok(PageElement::new(self.tag_name().to_owned())
			.attr(self.server_attribute.clone(), "")
			.child(output)
			.child(script)
			.into())
	}

	/// Renders the wrapper element to an HTML string.
	pub fn render_to_string(&self, props: PropsMap) -> Result<String> {
		self.render(props).map(|page| page.render_to_string())
	}
}

impl std::fmt::Debug for ElementFactory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ElementFactory")
			.field("tag", &self.tag_name())
			.field("server_attribute", &self.server_attribute)
			.finish()
	}
}
