//! Hook-based reactivity for `hookwire`
//!
//! Hosts implement [`Hook`] for their units of state (e.g. components),
//! make them current on a [`Provider`] while running their logic, and
//! get triggered whenever a [`Value`] they read changes.
//!
//! Notifications are debounced: writes only mark their dependents for
//! notification, which happens once the host ends the turn with
//! [`Provider::flush`] (or [`Provider::run_until_idle`]).
//!
//! # Call order
//! State slots are addressed by the order in which a hook requests them.
//! A hook must request the same slots, in the same order, every time
//! it's invoked. This can't be verified, so breaking it results in
//! unrelated slots being returned, or [`Error::SlotTypeMismatch`].

// Modules
pub mod collection;
pub mod dep;
pub mod effect;
pub mod error;
pub mod hook;
pub mod hook_values;
pub mod loc;
pub mod provider;
pub mod run_queue;
pub mod value;
#[cfg(test)]
mod test_util;

// Exports
pub use self::{
	collection::Collection,
	dep::{Dep, Deps, IntoDep, Nullable, Snapshot},
	effect::{Callback, Cleanup},
	error::Error,
	hook::{Hook, HookRef, WeakHookRef},
	hook_values::HookValues,
	loc::Loc,
	provider::{Provider, ProviderConfig, WeakProvider},
	run_queue::{Debounced, RunQueue},
	value::Value,
};
