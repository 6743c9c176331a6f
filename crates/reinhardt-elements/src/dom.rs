//! In-memory host document.
//!
//! A small DOM that delivers the custom element callbacks the bridge reacts
//! to: connected, disconnected and attribute changed. It lets the lifecycle be
//! driven end to end on native targets, the same way a browser would drive it.
//!
//! ## Callback dispatch
//!
//! Callbacks go to the [`LifecycleObserver`] the owning [`Document`] was
//! created with (normally an [`ElementRegistry`](crate::ElementRegistry)).
//! When a subtree is attached or detached, the affected custom elements are
//! collected in tree order first and dispatched afterwards, with no borrow
//! held, so a callback may freely mutate the tree. A collected element that is
//! no longer in the expected state when its turn comes is skipped.

use crate::page::{Page, PageElement, RAW_TEXT_ELEMENTS, is_void_element};
use crate::parse::parse_fragment;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Receives custom element callbacks.
pub trait LifecycleObserver {
	/// Returns `true` if elements with this tag get callbacks.
	fn observes(&self, tag: &str) -> bool;

	/// The element was attached to a connected tree.
	fn connected(&self, element: &Element);

	/// The element was detached from a connected tree.
	fn disconnected(&self, element: &Element);

	/// An attribute was set or removed. `new` is `None` on removal.
	fn attribute_changed(
		&self,
		element: &Element,
		name: &str,
		old: Option<&str>,
		new: Option<&str>,
	);
}

type Owner = Weak<dyn LifecycleObserver>;

struct ElementData {
	tag: String,
	attrs: Vec<(String, String)>,
	children: Vec<Node>,
	parent: Option<Weak<RefCell<ElementData>>>,
	connected: bool,
	owner: Option<Owner>,
}

/// A DOM element handle. Clones refer to the same element.
#[derive(Clone)]
pub struct Element(Rc<RefCell<ElementData>>);

/// A non-owning element handle.
#[derive(Clone)]
pub struct WeakElement(Weak<RefCell<ElementData>>);

/// A child node.
#[derive(Debug, Clone)]
pub enum Node {
	/// An element node.
	Element(Element),
	/// A text node.
	Text(String),
}

impl Element {
	fn with_owner(tag: &str, owner: Option<Owner>) -> Self {
		Self(Rc::new(RefCell::new(ElementData {
			tag: tag.to_ascii_lowercase(),
			attrs: Vec::new(),
			children: Vec::new(),
			parent: None,
			connected: false,
			owner,
		})))
	}

	/// Creates a detached element in the same document as `self`.
	pub fn create_element(&self, tag: &str) -> Element {
		Element::with_owner(tag, self.0.borrow().owner.clone())
	}

	/// Returns the lower-cased tag name.
	pub fn tag_name(&self) -> String {
		self.0.borrow().tag.clone()
	}

	/// Returns a stable identity for this element, valid while it is alive.
	pub fn key(&self) -> usize {
		Rc::as_ptr(&self.0) as *const () as usize
	}

	/// Returns `true` if both handles refer to the same element.
	pub fn ptr_eq(&self, other: &Element) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Creates a weak handle.
	pub fn downgrade(&self) -> WeakElement {
		WeakElement(Rc::downgrade(&self.0))
	}

	/// Returns `true` if the element is attached to its document's body.
	pub fn is_connected(&self) -> bool {
		self.0.borrow().connected
	}

	/// Returns the parent element.
	pub fn parent(&self) -> Option<Element> {
		self.0.borrow().parent.as_ref()?.upgrade().map(Element)
	}

	/// Returns an attribute value.
	pub fn get_attribute(&self, name: &str) -> Option<String> {
		let name = name.to_ascii_lowercase();
		self.0
			.borrow()
			.attrs
			.iter()
			.find(|(key, _)| *key == name)
			.map(|(_, value)| value.clone())
	}

	/// Returns `true` if the attribute is present.
	pub fn has_attribute(&self, name: &str) -> bool {
		let name = name.to_ascii_lowercase();
		self.0.borrow().attrs.iter().any(|(key, _)| *key == name)
	}

	/// Returns a snapshot of all attributes, in insertion order.
	pub fn attributes(&self) -> Vec<(String, String)> {
		self.0.borrow().attrs.clone()
	}

	/// Sets an attribute, notifying the observer for custom elements.
	pub fn set_attribute(&self, name: &str, value: &str) {
		let name = name.to_ascii_lowercase();
		let old = {
			let mut data = self.0.borrow_mut();
			match data.attrs.iter_mut().find(|(key, _)| *key == name) {
				Some((_, current)) => Some(std::mem::replace(current, value.to_owned())),
				None => {
					data.attrs.push((name.clone(), value.to_owned()));
					None
				}
			}
		};
		self.notify_attribute(&name, old.as_deref(), Some(value));
	}

	/// Removes an attribute, notifying the observer if it was present.
	pub fn remove_attribute(&self, name: &str) {
		let name = name.to_ascii_lowercase();
		let old = {
			let mut data = self.0.borrow_mut();
			let position = data.attrs.iter().position(|(key, _)| *key == name);
			position.map(|index| data.attrs.remove(index).1)
		};
		if let Some(old) = old {
			self.notify_attribute(&name, Some(&old), None);
		}
	}

	fn notify_attribute(&self, name: &str, old: Option<&str>, new: Option<&str>) {
		if let Some(observer) = self.observer() {
			observer.attribute_changed(self, name, old, new);
		}
	}

	fn observer(&self) -> Option<Rc<dyn LifecycleObserver>> {
		let data = self.0.borrow();
		let observer = data.owner.as_ref()?.upgrade()?;
		observer.observes(&data.tag).then_some(observer)
	}

	/// Returns a snapshot of the child nodes.
	pub fn children(&self) -> Vec<Node> {
		self.0.borrow().children.clone()
	}

	/// Returns the child elements.
	pub fn child_elements(&self) -> Vec<Element> {
		self.0
			.borrow()
			.children
			.iter()
			.filter_map(|node| match node {
				Node::Element(element) => Some(element.clone()),
				Node::Text(_) => None,
			})
			.collect()
	}

	/// Appends a child element, moving it out of its current parent first.
	pub fn append_child(&self, child: &Element) {
		child.remove();
		child.0.borrow_mut().parent = Some(Rc::downgrade(&self.0));
		self.0.borrow_mut().children.push(Node::Element(child.clone()));
		if self.is_connected() {
			set_connected(child, true);
		}
	}

	/// Appends a text node.
	pub fn append_text(&self, text: &str) {
		self.0.borrow_mut().children.push(Node::Text(text.to_owned()));
	}

	/// Detaches the element from its parent.
	pub fn remove(&self) {
		let Some(parent) = self.parent() else {
			return;
		};
		{
			let mut data = parent.0.borrow_mut();
			data.children
				.retain(|node| !matches!(node, Node::Element(el) if el.ptr_eq(self)));
		}
		self.0.borrow_mut().parent = None;
		if self.is_connected() {
			set_connected(self, false);
		}
	}

	/// Replaces all children.
	pub fn replace_children(&self, nodes: Vec<Node>) {
		let old = std::mem::take(&mut self.0.borrow_mut().children);
		let connected = self.is_connected();
		for node in &old {
			if let Node::Element(element) = node {
				element.0.borrow_mut().parent = None;
				if connected {
					set_connected(element, false);
				}
			}
		}

		for node in &nodes {
			if let Node::Element(element) = node {
				element.remove();
				element.0.borrow_mut().parent = Some(Rc::downgrade(&self.0));
			}
		}
		self.0.borrow_mut().children = nodes.clone();
		if connected {
			for node in &nodes {
				if let Node::Element(element) = node {
					set_connected(element, true);
				}
			}
		}
	}

	/// Parses markup and replaces the children with it.
	pub fn set_inner_html(&self, markup: &str) {
		let pages = parse_fragment(markup);
		self.replace_children(self.build_nodes(&pages));
	}

	/// Serializes the children.
	pub fn inner_html(&self) -> String {
		Page::Fragment(self.child_pages()).render_to_string()
	}

	/// Serializes the element itself, children included.
	pub fn outer_html(&self) -> String {
		self.to_page().render_to_string()
	}

	/// Converts the children to renderable pages.
	pub fn child_pages(&self) -> Vec<Page> {
		let data = self.0.borrow();
		let raw_text = RAW_TEXT_ELEMENTS.contains(&data.tag.as_str());
		data.children
			.iter()
			.map(|node| match node {
				Node::Element(element) => element.to_page(),
				Node::Text(text) if raw_text => Page::raw(text.clone()),
				Node::Text(text) => Page::text(text.clone()),
			})
			.collect()
	}

	/// Converts the element subtree to a renderable page.
	pub fn to_page(&self) -> Page {
		let mut element = {
			let data = self.0.borrow();
			let mut element = PageElement::new(data.tag.clone());
			for (name, value) in &data.attrs {
				element.push_attr(name.clone(), value.clone());
			}
			element
		};
		for child in self.child_pages() {
			element.push_child(child);
		}
		Page::Element(element)
	}

	/// Builds detached nodes owned by this element's document.
	pub fn build_nodes(&self, pages: &[Page]) -> Vec<Node> {
		let mut nodes = Vec::new();
		for page in pages {
			self.build_into(page, false, &mut nodes);
		}
		nodes
	}

	fn build_into(&self, page: &Page, raw_text: bool, nodes: &mut Vec<Node>) {
		match page {
			Page::Element(source) => {
				let element = self.create_element(source.tag_name());
				{
					let mut data = element.0.borrow_mut();
					for (name, value) in source.attrs() {
						data.attrs.push((name.to_ascii_lowercase(), value.to_string()));
					}
				}
				if !is_void_element(source.tag_name()) {
					let raw_text = RAW_TEXT_ELEMENTS.contains(&source.tag_name());
					let mut children = Vec::new();
					for child in source.child_views() {
						element.build_into(child, raw_text, &mut children);
					}
					for child in &children {
						if let Node::Element(child) = child {
							child.0.borrow_mut().parent = Some(Rc::downgrade(&element.0));
						}
					}
					element.0.borrow_mut().children = children;
				}
				nodes.push(Node::Element(element));
			}
			Page::Text(text) => push_text(nodes, text),
			Page::Raw(markup) if raw_text => push_text(nodes, markup),
			Page::Raw(markup) => {
				for parsed in parse_fragment(markup) {
					self.build_into(&parsed, false, nodes);
				}
			}
			Page::Fragment(children) => {
				for child in children {
					self.build_into(child, raw_text, nodes);
				}
			}
			Page::Empty => {}
		}
	}
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
	if text.is_empty() {
		return;
	}
	match nodes.last_mut() {
		Some(Node::Text(previous)) => previous.push_str(text),
		_ => nodes.push(Node::Text(text.to_owned())),
	}
}

/// Flips the connected flag on a subtree and dispatches the callbacks.
fn set_connected(root: &Element, connected: bool) {
	let mut changed = Vec::new();
	collect_subtree(root, &mut changed);

	let mut pending = Vec::new();
	for element in changed {
		let observer = {
			let mut data = element.0.borrow_mut();
			if data.connected == connected {
				continue;
			}
			data.connected = connected;
			data.owner.as_ref().and_then(Weak::upgrade)
		};
		if let Some(observer) = observer.filter(|o| o.observes(&element.tag_name())) {
			pending.push((element, observer));
		}
	}

	for (element, observer) in pending {
		if element.is_connected() != connected {
			continue;
		}
		if connected {
			observer.connected(&element);
		} else {
			observer.disconnected(&element);
		}
	}
}

fn collect_subtree(root: &Element, output: &mut Vec<Element>) {
	output.push(root.clone());
	for child in root.child_elements() {
		collect_subtree(&child, output);
	}
}

impl WeakElement {
	/// Upgrades to a strong handle if the element is still alive.
	pub fn upgrade(&self) -> Option<Element> {
		self.0.upgrade().map(Element)
	}

	/// Returns `true` while the element is alive.
	pub fn is_alive(&self) -> bool {
		self.0.strong_count() > 0
	}

	/// Returns the identity of the element this handle points at.
	pub fn key(&self) -> usize {
		self.0.as_ptr() as *const () as usize
	}
}

impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl Eq for Element {}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let data = self.0.borrow();
		f.debug_struct("Element")
			.field("tag", &data.tag)
			.field("attrs", &data.attrs)
			.field("connected", &data.connected)
			.finish_non_exhaustive()
	}
}

impl fmt::Debug for WeakElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("WeakElement").field(&self.key()).finish()
	}
}

/// A document: a connected `body` plus the observer its elements report to.
#[derive(Clone)]
pub struct Document {
	body: Element,
}

impl Document {
	/// Creates a document whose custom elements report to `observer`.
	pub fn new<O>(observer: &Rc<O>) -> Self
	where
		O: LifecycleObserver + 'static,
	{
		let weak: Weak<O> = Rc::downgrade(observer);
		let owner: Owner = weak;
		Self::with_owner(Some(owner))
	}

	/// Creates a document without an observer: no element is ever upgraded.
	pub fn detached() -> Self {
		Self::with_owner(None)
	}

	fn with_owner(owner: Option<Owner>) -> Self {
		let body = Element::with_owner("body", owner);
		body.0.borrow_mut().connected = true;
		Self { body }
	}

	/// Returns the body element.
	pub fn body(&self) -> &Element {
		&self.body
	}

	/// Creates a detached element owned by this document.
	pub fn create_element(&self, tag: &str) -> Element {
		self.body.create_element(tag)
	}
}

impl fmt::Debug for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("body", &self.body)
			.finish()
	}
}
