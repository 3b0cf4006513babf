//! Value
//!
//! A reactive cell. Reading it while a hook is executing registers
//! that hook as a dependent, and writing to it notifies every dependent
//! once the current turn ends.

// Imports
use {
	crate::{
		hook::{HookRef, WeakHookRef},
		loc::Loc,
		provider::{Provider, WeakProvider},
		run_queue::Debounced,
	},
	core::{cell::RefCell, fmt, mem},
	std::{
		collections::HashSet,
		rc::{Rc, Weak},
	},
};

/// Dependents of a value
type Dependents = RefCell<HashSet<WeakHookRef>>;

/// Inner
struct Inner<T> {
	/// Value
	value: RefCell<T>,

	/// Dependents
	dependents: Rc<Dependents>,

	/// Debounced trigger
	trigger: Debounced,

	/// Provider
	provider: WeakProvider,
}

/// Value
pub struct Value<T> {
	/// Inner
	inner: Rc<Inner<T>>,
}

impl<T> Value<T> {
	/// Creates a new value on a provider.
	///
	/// Prefer [`Provider::use_value`].
	pub(crate) fn new(provider: &Provider, value: T) -> Self {
		let dependents = Rc::new(Dependents::default());
		let trigger = Debounced::new(provider.queue().clone(), {
			let dependents = Rc::downgrade(&dependents);
			move || self::notify(&dependents)
		});

		let inner = Inner {
			value: RefCell::new(value),
			dependents,
			trigger,
			provider: provider.downgrade(),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Returns a unique identifier to this value.
	///
	/// Cloning the value will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		Rc::as_ptr(&self.inner).cast::<()>() as usize
	}

	/// Registers the current hook of the provider as a dependent
	#[track_caller]
	fn gather(&self) {
		let Some(provider) = self.inner.provider.upgrade() else {
			return;
		};

		match provider.hook() {
			Some(hook) => self.add_dependent(&hook),
			None =>
				if provider.config().warn_untracked_reads {
					tracing::warn!(
						location=%Loc::caller(),
						"Value was read while no hook was executing, it won't notify anyone when changed"
					);
				},
		}
	}

	/// Adds a dependent to this value
	pub fn add_dependent(&self, hook: &HookRef) {
		self.inner.dependents.borrow_mut().insert(hook.downgrade());
	}

	/// Returns the number of dependents of this value.
	///
	/// Dependents that were already dropped might still be counted
	/// until the next notification.
	#[must_use]
	pub fn dependents_len(&self) -> usize {
		self.inner.dependents.borrow().len()
	}

	/// Returns if a notification is pending for the end of the turn
	#[must_use]
	pub fn is_trigger_pending(&self) -> bool {
		self.inner.trigger.is_pending()
	}

	/// Uses the value, registering the current hook as a dependent
	#[track_caller]
	pub fn with<F, O>(&self, f: F) -> O
	where
		F: FnOnce(&T) -> O,
	{
		self.gather();
		self.with_raw(f)
	}

	/// Uses the value without registering any dependents
	pub fn with_raw<F, O>(&self, f: F) -> O
	where
		F: FnOnce(&T) -> O,
	{
		let value = self
			.inner
			.value
			.try_borrow()
			.expect("Cannot read value while it's being updated");
		f(&value)
	}

	/// Gets the value, registering the current hook as a dependent
	#[track_caller]
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.with(T::clone)
	}

	/// Gets the value without registering any dependents
	pub fn get_raw(&self) -> T
	where
		T: Clone,
	{
		self.with_raw(T::clone)
	}

	/// Updates the value and notifies all dependents at the end of the turn.
	///
	/// Dependents are notified even if the value didn't change.
	pub fn update<F, O>(&self, f: F) -> O
	where
		F: FnOnce(&mut T) -> O,
	{
		let output = self.update_raw(f);
		self.inner.trigger.call();

		output
	}

	/// Updates the value without notifying any dependents
	pub fn update_raw<F, O>(&self, f: F) -> O
	where
		F: FnOnce(&mut T) -> O,
	{
		let mut value = self
			.inner
			.value
			.try_borrow_mut()
			.expect("Cannot update value while it's being used");
		f(&mut value)
	}

	/// Sets the value and notifies all dependents at the end of the turn
	pub fn set(&self, new_value: T) {
		self.update(|value| *value = new_value);
	}

	/// Sets the value to the output of `f` and notifies all dependents
	/// at the end of the turn
	pub fn set_with<F>(&self, f: F)
	where
		F: FnOnce() -> T,
	{
		self.set(f());
	}

	/// Sets the value without notifying any dependents
	pub fn set_raw(&self, new_value: T) {
		self.update_raw(|value| *value = new_value);
	}

	/// Replaces the value, returning the previous one, and notifies
	/// all dependents at the end of the turn
	pub fn replace(&self, new_value: T) -> T {
		self.update(|value| mem::replace(value, new_value))
	}

	/// Notifies all dependents at the end of the turn without changing the value
	pub fn trigger(&self) {
		self.inner.trigger.call();
	}

	/// Alias for [`get`](Self::get)
	#[track_caller]
	pub fn current(&self) -> T
	where
		T: Clone,
	{
		self.get()
	}

	/// Alias for [`set`](Self::set)
	pub fn set_current(&self, new_value: T) {
		self.set(new_value);
	}
}

/// Notifies all dependents
fn notify(dependents: &Weak<Dependents>) {
	let Some(dependents) = dependents.upgrade() else {
		return;
	};

	// Note: We collect the hooks before triggering them, since
	//       a hook might read this value again while being triggered.
	let hooks = {
		let mut dependents = dependents.borrow_mut();
		dependents.retain(|hook| hook.upgrade().is_some());
		dependents.iter().filter_map(WeakHookRef::upgrade).collect::<Vec<_>>()
	};

	tracing::trace!(dependents = hooks.len(), "Notifying value dependents");
	for hook in hooks {
		hook.trigger();
	}
}

impl<T> Clone for Value<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("Value");
		match self.inner.value.try_borrow() {
			Ok(value) => s.field("value", &*value),
			Err(_) => s.field("value", &"<borrowed>"),
		};
		s.field("dependents", &self.dependents_len())
			.field("trigger", &self.inner.trigger)
			.finish()
	}
}
