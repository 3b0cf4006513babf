//! Hook
//!
//! A hook is an externally owned identity that owns state slots
//! and gets notified whenever a value it read changes.

// Imports
use {
	core::{
		fmt,
		hash::{Hash, Hasher},
	},
	std::rc::{Rc, Weak},
};

/// Hook capability.
///
/// Implemented by the host (e.g. a component of some UI layer).
/// The core never constructs hosts hooks, it only ever calls
/// these methods.
pub trait Hook {
	/// Called when any value read by this hook changed.
	///
	/// The host decides how and when to re-invoke the hook logic.
	fn trigger(&self);

	/// Called when the hook is first made current in a provider
	fn on_mount(&self) {}

	/// Called once the hook was unmounted and all of its cleanups ran
	fn on_unmount(&self) {}
}

/// Hook reference.
///
/// Identity is pointer equality, so cloning a reference retains
/// the same hook.
#[derive(derive_more::Deref)]
pub struct HookRef {
	/// Inner
	#[deref(forward)]
	inner: Rc<dyn Hook>,
}

impl HookRef {
	/// Creates a new hook reference from a hook
	pub fn new<H>(hook: H) -> Self
	where
		H: Hook + 'static,
	{
		Self { inner: Rc::new(hook) }
	}

	/// Returns a unique identifier to this hook.
	///
	/// Downgrading and cloning the reference will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		Rc::as_ptr(&self.inner).cast::<()>() as usize
	}

	/// Downgrades this reference
	#[must_use]
	pub fn downgrade(&self) -> WeakHookRef {
		WeakHookRef {
			inner: Rc::downgrade(&self.inner),
		}
	}
}

impl<H: Hook + 'static> From<Rc<H>> for HookRef {
	fn from(inner: Rc<H>) -> Self {
		Self { inner }
	}
}

impl From<Rc<dyn Hook>> for HookRef {
	fn from(inner: Rc<dyn Hook>) -> Self {
		Self { inner }
	}
}

impl PartialEq for HookRef {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for HookRef {}

impl Clone for HookRef {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl Hash for HookRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl fmt::Debug for HookRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookRef").field("id", &self.id()).finish()
	}
}

/// Weak hook reference
///
/// Used by values to keep track of their dependents without
/// keeping them alive.
pub struct WeakHookRef {
	/// Inner
	inner: Weak<dyn Hook>,
}

impl WeakHookRef {
	/// Returns a unique identifier to this hook.
	///
	/// Upgrading and cloning the reference will retain the same id
	#[must_use]
	pub fn id(&self) -> usize {
		Weak::as_ptr(&self.inner).cast::<()>() as usize
	}

	/// Upgrades this reference
	#[must_use]
	pub fn upgrade(&self) -> Option<HookRef> {
		let inner = self.inner.upgrade()?;
		Some(HookRef { inner })
	}
}

impl PartialEq for WeakHookRef {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for WeakHookRef {}

impl Clone for WeakHookRef {
	fn clone(&self) -> Self {
		Self {
			inner: Weak::clone(&self.inner),
		}
	}
}

impl Hash for WeakHookRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl fmt::Debug for WeakHookRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakHookRef").field("id", &self.id()).finish()
	}
}
