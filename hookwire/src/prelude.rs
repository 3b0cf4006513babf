//! Prelude

// Exports
pub use {
	crate::{deps, FnHook},
	hookwire_reactive::{Collection, Deps, Hook, HookRef, Provider, ProviderConfig, Value},
	hookwire_reactive_async::{AsyncContext, ProviderAsyncContext},
};
