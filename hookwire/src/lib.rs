//! Framework-agnostic hook state
//!
//! Re-exports the reactive core, its async layer and the logging helper,
//! along with [`FnHook`], a hook built from closures for hosts that don't
//! have a type of their own to implement [`Hook`](hookwire_reactive::Hook) on.

// Modules
pub mod fn_hook;
pub mod prelude;

// Exports
pub use {
	self::fn_hook::FnHook,
	hookwire_logger as logger,
	hookwire_reactive::{self as reactive, deps},
	hookwire_reactive_async as reactive_async,
};
