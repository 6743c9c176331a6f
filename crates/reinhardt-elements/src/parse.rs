//! HTML fragment parsing.
//!
//! Converts contained markup into a [`Page`] tree so slot content and children
//! can be handed to components as renderable fragments. Parsing is delegated to
//! `scraper` (html5ever); this module only maps its node tree onto `Page`.

use crate::page::{Page, PageElement, RAW_TEXT_ELEMENTS};
use scraper::{ElementRef, Html, Node};

/// Parses an HTML fragment into a list of top-level nodes.
///
/// Comments, doctypes and processing instructions are dropped. Attribute
/// order is preserved. Text inside `script`/`style` is kept verbatim.
pub fn parse_fragment(markup: &str) -> Vec<Page> {
	if markup.is_empty() {
		return Vec::new();
	}

	let fragment = Html::parse_fragment(markup);
	// `parse_fragment` wraps the nodes in a synthetic <html> root.
	let root = fragment.root_element();
	convert_children(root, false)
}

/// Parses an HTML fragment into a single renderable tree.
///
/// # Example
///
/// ```
/// use reinhardt_elements::parse::parse_html;
///
/// let view = parse_html("<h1>Hello</h1><section><h2 title=\"Main\">World</h2></section>");
/// assert_eq!(
///     view.render_to_string(),
///     "<h1>Hello</h1><section><h2 title=\"Main\">World</h2></section>"
/// );
/// ```
pub fn parse_html(markup: &str) -> Page {
	Page::Fragment(parse_fragment(markup))
}

fn convert_children(parent: ElementRef<'_>, raw_text: bool) -> Vec<Page> {
	let mut nodes = Vec::new();

	for child in parent.children() {
		match child.value() {
			Node::Text(text) => {
				let content: &str = &text.text;
				if raw_text {
					nodes.push(Page::raw(content.to_owned()));
				} else {
					nodes.push(Page::text(content.to_owned()));
				}
			}
			Node::Element(_) => {
				if let Some(element) = ElementRef::wrap(child) {
					nodes.push(Page::Element(convert_element(element)));
				}
			}
			_ => {}
		}
	}

	nodes
}

fn convert_element(element: ElementRef<'_>) -> PageElement {
	let value = element.value();
	let tag = value.name().to_owned();
	let raw_text = RAW_TEXT_ELEMENTS.contains(&tag.as_str());

	let mut page = PageElement::new(tag);
	for (name, attr_value) in value.attrs() {
		page.push_attr(name.to_owned(), attr_value.to_owned());
	}

	if !page.is_void() {
		for child in convert_children(element, raw_text) {
			page.push_child(child);
		}
	}

	page
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_empty() {
		assert!(parse_fragment("").is_empty());
	}

	#[rstest]
	fn test_parse_keeps_top_level_order() {
		let nodes = parse_fragment("<p>one</p>two<span>three</span>");
		assert_eq!(nodes.len(), 3);
		assert!(matches!(&nodes[0], Page::Element(el) if el.tag_name() == "p"));
		assert_eq!(nodes[1], Page::text("two"));
		assert!(matches!(&nodes[2], Page::Element(el) if el.tag_name() == "span"));
	}

	#[rstest]
	fn test_parse_preserves_attribute_order() {
		let nodes = parse_fragment(r#"<button title="test" type="button">Click here</button>"#);
		let Page::Element(button) = &nodes[0] else {
			panic!("expected element");
		};
		let names: Vec<&str> = button.attrs().iter().map(|(k, _)| k.as_ref()).collect();
		assert_eq!(names, vec!["title", "type"]);
	}

	#[rstest]
	fn test_parse_void_elements() {
		let view = parse_html("<p>a</p><br><img src=\"x.png\">");
		assert_eq!(
			view.render_to_string(),
			"<p>a</p><br /><img src=\"x.png\" />"
		);
	}

	#[rstest]
	fn test_parse_script_text_is_raw() {
		let view = parse_html(r#"<script type="application/json">{"value":"a & b"}</script>"#);
		assert_eq!(
			view.render_to_string(),
			r#"<script type="application/json">{"value":"a & b"}</script>"#
		);
	}

	#[rstest]
	fn test_parse_drops_comments() {
		let view = parse_html("<!-- note --><em>x</em>");
		assert_eq!(view.render_to_string(), "<em>x</em>");
	}

	#[rstest]
	fn test_parse_text_entities_round_trip() {
		let view = parse_html("<p>a &amp; b &lt; c</p>");
		assert_eq!(view.render_to_string(), "<p>a &amp; b &lt; c</p>");
	}
}
