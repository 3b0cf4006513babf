//! Closure-based hook

// Imports
use {
	hookwire_reactive::{Hook, HookRef},
	std::rc::Rc,
};

/// Callback of a [`FnHook`]
type Callback = Box<dyn Fn()>;

/// A hook built from closures
#[derive(derive_more::Debug)]
pub struct FnHook {
	/// Name, for logging
	name: &'static str,

	/// Trigger
	#[debug(skip)]
	trigger: Callback,

	/// Called on mount
	#[debug(skip)]
	on_mount: Option<Callback>,

	/// Called on unmount
	#[debug(skip)]
	on_unmount: Option<Callback>,
}

impl FnHook {
	/// Creates a new hook that calls `trigger` whenever triggered
	pub fn new<F>(name: &'static str, trigger: F) -> Self
	where
		F: Fn() + 'static,
	{
		Self {
			name,
			trigger: Box::new(trigger),
			on_mount: None,
			on_unmount: None,
		}
	}

	/// Calls `f` when this hook is mounted
	#[must_use]
	pub fn on_mount<F>(mut self, f: F) -> Self
	where
		F: Fn() + 'static,
	{
		self.on_mount = Some(Box::new(f));
		self
	}

	/// Calls `f` when this hook is unmounted
	#[must_use]
	pub fn on_unmount<F>(mut self, f: F) -> Self
	where
		F: Fn() + 'static,
	{
		self.on_unmount = Some(Box::new(f));
		self
	}

	/// Returns the name of this hook
	#[must_use]
	pub const fn name(&self) -> &'static str {
		self.name
	}

	/// Converts this hook into a reference, returning
	/// it along with the hook itself.
	#[must_use]
	pub fn into_ref(self) -> (Rc<Self>, HookRef) {
		let hook = Rc::new(self);
		(Rc::clone(&hook), HookRef::from(hook))
	}
}

impl Hook for FnHook {
	fn trigger(&self) {
		tracing::trace!(hook = self.name, "Triggering hook");
		(self.trigger)();
	}

	fn on_mount(&self) {
		if let Some(on_mount) = &self.on_mount {
			on_mount();
		}
	}

	fn on_unmount(&self) {
		if let Some(on_unmount) = &self.on_unmount {
			on_unmount();
		}
	}
}
