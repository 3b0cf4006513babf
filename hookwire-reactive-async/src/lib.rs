//! Asynchronous reactivity for `hookwire`

// Modules
pub mod async_context;
pub mod deferred;

// Exports
pub use self::{
	async_context::{AsyncContext, AsyncContextAccessor, Initializer, ProviderAsyncContext},
	deferred::{Deferred, DeferredError},
};
