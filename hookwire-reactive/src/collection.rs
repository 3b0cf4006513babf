//! Collection
//!
//! A lazy, keyed, memoizing factory cache. Items are only
//! ever constructed by the collection's creator and never evicted.
//!
//! Collections aren't reactive themselves, they're typically used
//! to lazily create a reactive [`Value`](crate::Value) per key.

// Imports
use {
	core::{cell::RefCell, fmt},
	indexmap::IndexMap,
	std::rc::Rc,
};

/// Item creator.
///
/// Receives the key, the initial value, if any, and the previous item, if any.
type Creator<T, V> = dyn Fn(&str, Option<V>, Option<&T>) -> T;

/// Inner
struct Inner<T, V> {
	/// Items, in insertion order
	items: RefCell<IndexMap<String, T>>,

	/// Creator
	creator: Box<Creator<T, V>>,
}

/// Collection
pub struct Collection<T, V = T> {
	/// Inner
	inner: Rc<Inner<T, V>>,
}

impl<T, V> Collection<T, V> {
	/// Creates a new, empty, collection
	pub fn new<F>(creator: F) -> Self
	where
		F: Fn(&str, Option<V>, Option<&T>) -> T + 'static,
	{
		let inner = Inner {
			items:   RefCell::new(IndexMap::new()),
			creator: Box::new(creator),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Gets the item for `id`, creating it with `initial` if it doesn't exist
	pub fn get(&self, id: &str, initial: Option<V>) -> T
	where
		T: Clone,
	{
		if let Some(item) = self.inner.items.borrow().get(id) {
			return item.clone();
		}

		// Note: The creator might use this collection, so we can't keep it borrowed
		let item = (self.inner.creator)(id, initial, None);
		self.inner
			.items
			.borrow_mut()
			.entry(id.to_owned())
			.or_insert(item)
			.clone()
	}

	/// Re-creates the item for `id` with `value`, replacing any existing item.
	///
	/// The creator receives the previous item, if any.
	pub fn upget(&self, id: &str, value: V) -> T
	where
		T: Clone,
	{
		let prev = self.inner.items.borrow().get(id).cloned();
		let item = (self.inner.creator)(id, Some(value), prev.as_ref());
		self.inner.items.borrow_mut().insert(id.to_owned(), item.clone());

		item
	}

	/// Returns if an item exists for `id`
	#[must_use]
	pub fn has(&self, id: &str) -> bool {
		self.inner.items.borrow().contains_key(id)
	}

	/// Returns the number of items
	#[must_use]
	pub fn len(&self) -> usize {
		self.inner.items.borrow().len()
	}

	/// Returns if there are no items
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns all keys, in insertion order
	#[must_use]
	pub fn keys(&self) -> Vec<String> {
		self.inner.items.borrow().keys().cloned().collect()
	}

	/// Maps all items, in insertion order.
	///
	/// `f` receives the item, its key, its index and a snapshot
	/// of all items.
	pub fn map<F, U>(&self, mut f: F) -> Vec<U>
	where
		T: Clone,
		F: FnMut(&T, &str, usize, &IndexMap<String, T>) -> U,
	{
		let items = self.inner.items.borrow().clone();
		items
			.iter()
			.enumerate()
			.map(|(idx, (key, item))| f(item, key, idx, &items))
			.collect()
	}
}

impl<T, V> Clone for Collection<T, V> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: fmt::Debug, V> fmt::Debug for Collection<T, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Collection")
			.field("items", &*self.inner.items.borrow())
			.finish_non_exhaustive()
	}
}
