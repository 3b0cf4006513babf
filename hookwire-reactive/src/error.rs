//! Errors

// Imports
use {crate::loc::Loc, futures::task::SpawnError};

/// Reactive error
#[derive(Debug)]
#[derive(thiserror::Error)]
pub enum Error {
	/// A hook operation was used while no hook was executing
	#[error("Hook state was requested while no hook is executing (at {loc})")]
	NoCurrentHook {
		/// Where the operation was called
		loc: Loc,
	},

	/// A slot was previously allocated with a different type.
	///
	/// This happens when a hook doesn't call its state operations
	/// in the same order on every invocation.
	#[error("Slot {idx} was not allocated as a `{expected}`, hook call order must be stable across invocations")]
	SlotTypeMismatch {
		/// Slot index
		idx: usize,

		/// Type that was requested
		expected: &'static str,
	},

	/// An effect was given a different number of dependencies than before
	#[error("Effect dependency count changed from {previous:?} to {current:?}")]
	DepsLengthChanged {
		/// Previous dependency count, `None` if the effect always runs
		previous: Option<usize>,

		/// New dependency count, `None` if the effect always runs
		current: Option<usize>,
	},

	/// Unable to spawn a task on the provider's spawner
	#[error("Unable to spawn task")]
	Spawn(#[source] SpawnError),
}
