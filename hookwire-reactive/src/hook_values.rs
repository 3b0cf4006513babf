//! Hook values
//!
//! The ordered state slots of a single hook.
//!
//! Slots are addressed by allocation order: the Nth slot requested
//! during an invocation of a hook is the same slot as the Nth one
//! requested during any other invocation of it. This only holds if
//! the hook requests its slots in the same order every time it's
//! invoked, which can't be verified here. When mismatch detection is
//! enabled, a differing slot count between invocations is logged, but
//! never corrected.

// Imports
use core::{any::Any, fmt};

/// Slot cleanup
pub(crate) type SlotCleanup = Box<dyn FnOnce()>;

/// Hook values
pub struct HookValues {
	/// Slots
	slots: Vec<Box<dyn Any>>,

	/// Cleanups, registered in allocation order
	cleanups: Vec<SlotCleanup>,

	/// Slot cursor for the current invocation
	count: usize,

	/// Number of times this hook was invoked
	invocations: usize,

	/// Number of slot mismatches detected
	mismatches: usize,

	/// Id of the owning hook, for diagnostics
	hook_id: usize,
}

impl HookValues {
	/// Creates new, empty, hook values
	pub(crate) const fn new(hook_id: usize) -> Self {
		Self {
			slots: vec![],
			cleanups: vec![],
			count: 0,
			invocations: 0,
			mismatches: 0,
			hook_id,
		}
	}

	/// Returns the number of allocated slots
	#[must_use]
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Returns if no slots were allocated
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Returns the slot cursor of the current invocation
	#[must_use]
	pub const fn count(&self) -> usize {
		self.count
	}

	/// Returns the number of times the owning hook was made current
	#[must_use]
	pub const fn invocations(&self) -> usize {
		self.invocations
	}

	/// Returns the number of slot mismatches detected so far.
	///
	/// Only counted while mismatch detection is enabled.
	#[must_use]
	pub const fn mismatches(&self) -> usize {
		self.mismatches
	}

	/// Moves the cursor past every allocated slot, for invocations
	/// that skipped the hook's logic.
	pub(crate) fn skip(&mut self) {
		self.count = self.slots.len();
	}

	/// Resets the slot cursor for a new invocation
	pub(crate) fn reset(&mut self, detect_mismatch: bool) {
		if detect_mismatch && self.invocations != 0 && self.count < self.slots.len() {
			tracing::warn!(
				hook = self.hook_id,
				used = self.count,
				allocated = self.slots.len(),
				"Hook used fewer slots than allocated, hook call order must be stable across invocations"
			);
			self.mismatches += 1;
		}

		self.count = 0;
		self.invocations += 1;
	}

	/// Advances the cursor, returning the index of the slot and the slot, if already allocated.
	pub(crate) fn next_slot(&mut self, detect_mismatch: bool) -> (usize, Option<&dyn Any>) {
		let idx = self.count;
		self.count += 1;

		let slot = self.slots.get(idx).map(|slot| &**slot);
		if detect_mismatch && slot.is_none() && self.invocations > 1 {
			tracing::warn!(
				hook = self.hook_id,
				idx,
				"Hook allocated a new slot after its first invocation, hook call order must be stable across invocations"
			);
			self.mismatches += 1;
		}

		(idx, slot)
	}

	/// Pushes a newly allocated slot
	pub(crate) fn push(&mut self, idx: usize, slot: Box<dyn Any>, cleanup: Option<SlotCleanup>) {
		assert_eq!(
			idx,
			self.slots.len(),
			"Slot initializers must not allocate slots on their own hook"
		);

		self.slots.push(slot);
		self.cleanups.extend(cleanup);
	}

	/// Runs all cleanups, in allocation order, and drops all slots
	pub(crate) fn cleanup(self) {
		tracing::debug!(
			hook = self.hook_id,
			slots = self.slots.len(),
			cleanups = self.cleanups.len(),
			"Cleaning up hook values"
		);

		for cleanup in self.cleanups {
			cleanup();
		}
	}
}

impl fmt::Debug for HookValues {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookValues")
			.field("slots", &self.slots.len())
			.field("cleanups", &self.cleanups.len())
			.field("count", &self.count)
			.field("invocations", &self.invocations)
			.field("mismatches", &self.mismatches)
			.finish_non_exhaustive()
	}
}
