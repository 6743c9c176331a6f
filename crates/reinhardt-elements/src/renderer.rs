//! Render capability.
//!
//! The lifecycle controller never touches element content directly; it hands
//! the component output to a [`Renderer`]. The shipped [`DomRenderer`] replaces
//! content wholesale and, in hydrate mode, adopts server markup that already
//! matches the output.

use crate::dom::Element;
use crate::page::Page;
use crate::slots::is_json_script;
use crate::warn_log;

/// How rendered output meets the existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
	/// Replace whatever the element contains.
	Mount,
	/// The element holds server-rendered markup; adopt it where it matches.
	Hydrate,
}

/// Renders a page into a target element.
pub trait Renderer {
	/// Renders `page` as the content of `target`.
	fn render(&self, page: &Page, target: &Element, mode: RenderMode);

	/// Removes rendered content from `target`.
	fn unmount(&self, target: &Element);
}

/// Renders into the in-memory [`dom`](crate::dom).
#[derive(Debug, Default, Clone, Copy)]
pub struct DomRenderer;

impl DomRenderer {
	/// Creates a renderer.
	pub fn new() -> Self {
		Self
	}

	fn matches_server_markup(page: &Page, target: &Element) -> bool {
		let existing: Vec<Page> = target
			.child_pages()
			.into_iter()
			.filter(|node| !matches!(node, Page::Element(el) if is_json_script(el)))
			.collect();
		Page::Fragment(existing).render_to_string() == page.render_to_string()
	}
}

impl Renderer for DomRenderer {
	fn render(&self, page: &Page, target: &Element, mode: RenderMode) {
		if mode == RenderMode::Hydrate {
			if Self::matches_server_markup(page, target) {
				return;
			}
			warn_log!(
				"<{}>: server markup does not match the component output, re-rendering",
				target.tag_name()
			);
		}
		let nodes = target.build_nodes(std::slice::from_ref(page));
		target.replace_children(nodes);
	}

	fn unmount(&self, target: &Element) {
		target.replace_children(Vec::new());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::Document;
	use crate::page::PageElement;
	use rstest::rstest;

	fn output() -> Page {
		PageElement::new("em").child("serverRender").into()
	}

	#[rstest]
	fn test_mount_replaces_content() {
		let document = Document::detached();
		let target = document.create_element("message-one");
		target.set_inner_html("<p>old</p>");

		DomRenderer::new().render(&output(), &target, RenderMode::Mount);

		assert_eq!(target.inner_html(), "<em>serverRender</em>");
	}

	#[rstest]
	fn test_hydrate_adopts_matching_markup() {
		let document = Document::detached();
		let target = document.create_element("message-one");
		target.set_inner_html(
			r#"<em>serverRender</em><script type="application/json">{"value":"serverRender"}</script>"#,
		);
		let adopted = target.child_elements()[0].clone();

		DomRenderer::new().render(&output(), &target, RenderMode::Hydrate);

		assert!(target.child_elements()[0].ptr_eq(&adopted));
		assert_eq!(target.child_elements().len(), 2);
	}

	#[rstest]
	fn test_hydrate_replaces_mismatched_markup() {
		let document = Document::detached();
		let target = document.create_element("message-one");
		target.set_inner_html("<em>stale</em>");

		DomRenderer::new().render(&output(), &target, RenderMode::Hydrate);

		assert_eq!(target.inner_html(), "<em>serverRender</em>");
	}

	#[rstest]
	fn test_unmount_clears_content() {
		let document = Document::detached();
		let target = document.create_element("message-one");
		DomRenderer::new().render(&output(), &target, RenderMode::Mount);

		DomRenderer::new().unmount(&target);

		assert!(target.children().is_empty());
	}
}
