//! Test utilities

// Imports
use {
	crate::{Hook, HookRef},
	core::cell::Cell,
	std::rc::Rc,
};

/// Hook that counts how many times each of its methods were called
#[derive(Default, Debug)]
pub struct CountingHook {
	/// Triggers
	pub triggers: Cell<usize>,

	/// Mounts
	pub mounts: Cell<usize>,

	/// Unmounts
	pub unmounts: Cell<usize>,
}

impl CountingHook {
	/// Creates a new hook, returning it along with a reference to it
	pub fn new() -> (Rc<Self>, HookRef) {
		let hook = Rc::new(Self::default());
		let hook_ref = HookRef::from(Rc::clone(&hook));
		(hook, hook_ref)
	}
}

impl Hook for CountingHook {
	fn trigger(&self) {
		self.triggers.set(self.triggers.get() + 1);
	}

	fn on_mount(&self) {
		self.mounts.set(self.mounts.get() + 1);
	}

	fn on_unmount(&self) {
		self.unmounts.set(self.unmounts.get() + 1);
	}
}

/// Initializes logging for tests
pub fn init_logging() {
	_ = hookwire_logger::try_init();
}
