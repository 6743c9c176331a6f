//! Renderable markup trees.
//!
//! Components return a [`Page`]; renderers turn it into DOM nodes or a string.
//! Parsed markup lands here too (see [`crate::parse`]), so slots and children
//! travel through the bridge as trees rather than raw strings.
//!
//! ## Example
//!
//! ```
//! use reinhardt_elements::page::{IntoPage, PageElement};
//!
//! let card = PageElement::new("section")
//!     .attr("class", "card")
//!     .child(PageElement::new("h2").child("Title"))
//!     .child("Body")
//!     .into_page();
//!
//! assert_eq!(
//!     card.render_to_string(),
//!     r#"<section class="card"><h2>Title</h2>Body</section>"#
//! );
//! ```

use std::borrow::Cow;

type Str = Cow<'static, str>;

/// Elements that never have a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
	"source", "track", "wbr",
];

/// Elements whose text content is emitted verbatim.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Returns `true` if `tag` is a void element.
pub fn is_void_element(tag: &str) -> bool {
	VOID_ELEMENTS.contains(&tag)
}

/// A node of renderable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
	/// An element with attributes and children.
	Element(PageElement),
	/// Text, escaped on output.
	Text(Str),
	/// Trusted markup, emitted verbatim.
	///
	/// Used for the body of raw-text elements such as the embedded JSON
	/// script block.
	Raw(Str),
	/// Sibling nodes without a wrapper.
	Fragment(Vec<Page>),
	/// Nothing.
	Empty,
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
	tag: Str,
	attrs: Vec<(Str, Str)>,
	children: Vec<Page>,
}

impl PageElement {
	/// Creates an element with no attributes or children.
	pub fn new(tag: impl Into<Str>) -> Self {
		Self {
			tag: tag.into(),
			attrs: Vec::new(),
			children: Vec::new(),
		}
	}

	/// Builder form of [`push_attr`](Self::push_attr).
	pub fn attr(mut self, name: impl Into<Str>, value: impl Into<Str>) -> Self {
		self.push_attr(name, value);
		self
	}

	/// Builder form of [`push_child`](Self::push_child).
	pub fn child(mut self, child: impl IntoPage) -> Self {
		self.push_child(child);
		self
	}

	/// Appends an attribute. Duplicates are kept; lookups see the first.
	pub fn push_attr(&mut self, name: impl Into<Str>, value: impl Into<Str>) {
		self.attrs.push((name.into(), value.into()));
	}

	/// Appends a child. Void elements never render their children.
	pub fn push_child(&mut self, child: impl IntoPage) {
		self.children.push(child.into_page());
	}

	/// Returns the tag name.
	pub fn tag_name(&self) -> &str {
		&self.tag
	}

	/// Returns the attributes in insertion order.
	pub fn attrs(&self) -> &[(Str, Str)] {
		&self.attrs
	}

	/// Returns the value of the first attribute called `name`.
	pub fn get_attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find_map(|(key, value)| (key == name).then_some(value.as_ref()))
	}

	/// Returns the children.
	pub fn child_views(&self) -> &[Page] {
		&self.children
	}

	/// Returns `true` for void elements.
	pub fn is_void(&self) -> bool {
		is_void_element(&self.tag)
	}

	/// Consumes the element, returning its children.
	pub fn into_children(self) -> Vec<Page> {
		self.children
	}
}

impl Page {
	/// A text node.
	pub fn text(content: impl Into<Str>) -> Self {
		Self::Text(content.into())
	}

	/// A verbatim markup node.
	pub fn raw(markup: impl Into<Str>) -> Self {
		Self::Raw(markup.into())
	}

	/// A fragment of the given nodes.
	pub fn fragment(children: impl IntoIterator<Item = impl IntoPage>) -> Self {
		Self::Fragment(children.into_iter().map(IntoPage::into_page).collect())
	}

	/// Returns `true` if rendering produces no output.
	pub fn is_empty(&self) -> bool {
		match self {
			Page::Element(_) => false,
			Page::Text(text) | Page::Raw(text) => text.is_empty(),
			Page::Fragment(children) => children.iter().all(Page::is_empty),
			Page::Empty => true,
		}
	}

	/// Serializes to HTML.
	///
	/// Text and attribute values are escaped, except text inside
	/// [`RAW_TEXT_ELEMENTS`]. Void elements are written as `<tag />`.
	pub fn render_to_string(&self) -> String {
		let mut out = String::new();
		write_page(&mut out, self, false);
		out
	}
}

fn write_page(out: &mut String, page: &Page, raw_text: bool) {
	match page {
		Page::Element(element) => write_element(out, element),
		Page::Text(text) if raw_text => out.push_str(text),
		Page::Text(text) => out.push_str(&html_escape::encode_text(text)),
		Page::Raw(markup) => out.push_str(markup),
		Page::Fragment(children) => {
			for child in children {
				write_page(out, child, raw_text);
			}
		}
		Page::Empty => {}
	}
}

fn write_element(out: &mut String, element: &PageElement) {
	let tag = element.tag_name();
	out.push('<');
	out.push_str(tag);
	for (name, value) in &element.attrs {
		out.push_str(&format!(
			" {}=\"{}\"",
			name,
			html_escape::encode_double_quoted_attribute(value)
		));
	}
	if element.is_void() {
		out.push_str(" />");
		return;
	}
	out.push('>');
	let raw_text = RAW_TEXT_ELEMENTS.contains(&tag);
	for child in &element.children {
		write_page(out, child, raw_text);
	}
	out.push_str(&format!("</{tag}>"));
}

/// Conversion into a [`Page`], accepted wherever a child is expected.
pub trait IntoPage {
	/// Performs the conversion.
	fn into_page(self) -> Page;
}

impl IntoPage for Page {
	fn into_page(self) -> Page {
		self
	}
}

impl IntoPage for PageElement {
	fn into_page(self) -> Page {
		Page::Element(self)
	}
}

impl From<PageElement> for Page {
	fn from(element: PageElement) -> Self {
		Page::Element(element)
	}
}

impl IntoPage for String {
	fn into_page(self) -> Page {
		Page::Text(Cow::Owned(self))
	}
}

impl IntoPage for &'static str {
	fn into_page(self) -> Page {
		Page::Text(Cow::Borrowed(self))
	}
}

impl<T: IntoPage> IntoPage for Option<T> {
	fn into_page(self) -> Page {
		self.map_or(Page::Empty, IntoPage::into_page)
	}
}

impl<T: IntoPage> IntoPage for Vec<T> {
	fn into_page(self) -> Page {
		Page::fragment(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("br", true)]
	#[case("img", true)]
	#[case("div", false)]
	#[case("message-one", false)]
	fn test_void_element_detection(#[case] tag: &str, #[case] expected: bool) {
		assert_eq!(PageElement::new(tag.to_owned()).is_void(), expected);
	}

	#[rstest]
	fn test_render_nested_elements() {
		let page = PageElement::new("p")
			.child("Hello, ")
			.child(PageElement::new("em").child("slot"))
			.into_page();

		assert_eq!(page.render_to_string(), "<p>Hello, <em>slot</em></p>");
	}

	#[rstest]
	fn test_void_element_ignores_children() {
		let page = PageElement::new("br").child("ignored").into_page();

		assert_eq!(page.render_to_string(), "<br />");
	}

	#[rstest]
	fn test_render_text_is_escaped() {
		let page = Page::text("<b>&</b>");

		assert_eq!(page.render_to_string(), "&lt;b&gt;&amp;&lt;/b&gt;");
	}

	#[rstest]
	fn test_render_attribute_is_escaped() {
		let page = PageElement::new("p").attr("title", "say \"hi\"").into_page();

		assert_eq!(page.render_to_string(), "<p title=\"say &quot;hi&quot;\"></p>");
	}

	#[rstest]
	fn test_render_raw_is_verbatim() {
		let page = PageElement::new("script")
			.attr("type", "application/json")
			.child(Page::raw(r#"{"value":"<x>"}"#))
			.into_page();

		assert_eq!(
			page.render_to_string(),
			r#"<script type="application/json">{"value":"<x>"}</script>"#
		);
	}

	#[rstest]
	fn test_text_inside_script_is_not_escaped() {
		let page = PageElement::new("script").child("a < b").into_page();

		assert_eq!(page.render_to_string(), "<script>a < b</script>");
	}

	#[rstest]
	#[case(Page::Empty, true)]
	#[case(Page::text(""), true)]
	#[case(Page::fragment([Page::Empty, Page::text("")]), true)]
	#[case(Page::text("x"), false)]
	#[case(PageElement::new("br").into_page(), false)]
	fn test_is_empty(#[case] page: Page, #[case] expected: bool) {
		assert_eq!(page.is_empty(), expected);
	}

	#[rstest]
	fn test_get_attr_returns_first_match() {
		let element = PageElement::new("div")
			.attr("slot", "title")
			.attr("slot", "other");

		assert_eq!(element.get_attr("slot"), Some("title"));
		assert_eq!(element.get_attr("id"), None);
	}

	#[rstest]
	fn test_option_and_vec_conversions() {
		let page = vec![Some("a").into_page(), None::<&'static str>.into_page(), "b".into_page()]
			.into_page();

		assert_eq!(page.render_to_string(), "ab");
	}
}
