//! Element-keyed side tables.
//!
//! Per-element state lives beside the DOM rather than on it: the registry keeps
//! one [`WeakKeyMap`] of lifecycle records and a [`ChildCache`] of extracted
//! content. Keys are weak, so a table never keeps an element alive and entries
//! for dropped elements are never observable. Dead entries are pruned lazily on
//! the next insert.

use crate::dom::{Element, WeakElement};
use crate::slots::SlotMap;
use std::collections::HashMap;

/// A map keyed weakly by element identity.
///
/// Holding the weak handle pins the allocation, so an identity key can never be
/// reused by a newer element while its entry exists.
#[derive(Debug)]
pub struct WeakKeyMap<V> {
	entries: HashMap<usize, (WeakElement, V)>,
}

impl<V> Default for WeakKeyMap<V> {
	fn default() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}
}

impl<V> WeakKeyMap<V> {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a value for `element`, returning the previous one.
	pub fn insert(&mut self, element: &Element, value: V) -> Option<V> {
		self.prune();
		self.entries
			.insert(element.key(), (element.downgrade(), value))
			.map(|(_, previous)| previous)
	}

	/// Returns the value stored for `element`.
	pub fn get(&self, element: &Element) -> Option<&V> {
		self.entries.get(&element.key()).map(|(_, value)| value)
	}

	/// Returns the value stored for `element` mutably.
	pub fn get_mut(&mut self, element: &Element) -> Option<&mut V> {
		self.entries.get_mut(&element.key()).map(|(_, value)| value)
	}

	/// Removes the value stored for `element`.
	pub fn remove(&mut self, element: &Element) -> Option<V> {
		self.entries.remove(&element.key()).map(|(_, value)| value)
	}

	/// Returns `true` if an entry exists for `element`.
	pub fn contains(&self, element: &Element) -> bool {
		self.entries.contains_key(&element.key())
	}

	/// Returns the number of entries whose element is still alive.
	pub fn live_len(&self) -> usize {
		self.entries
			.values()
			.filter(|(weak, _)| weak.is_alive())
			.count()
	}

	fn prune(&mut self) {
		self.entries.retain(|_, (weak, _)| weak.is_alive());
	}
}

/// Extracted slots and children, kept across a disconnect.
///
/// Written when a mounted element is disconnected and read when it reconnects,
/// so a DOM move renders the same content even though the element's own
/// children were replaced by the component output.
#[derive(Debug, Default)]
pub struct ChildCache {
	entries: WeakKeyMap<SlotMap>,
}

impl ChildCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores the slot map for `element`, replacing any earlier capture.
	pub fn capture(&mut self, element: &Element, slots: SlotMap) {
		self.entries.insert(element, slots);
	}

	/// Returns the captured slot map for `element`.
	///
	/// The entry stays in place; a later move restores the same content.
	pub fn restore(&self, element: &Element) -> Option<SlotMap> {
		self.entries.get(element).cloned()
	}

	/// Returns the number of captures whose element is still alive.
	pub fn live_len(&self) -> usize {
		self.entries.live_len()
	}
}
