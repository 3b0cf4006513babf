//! Async context
//!
//! Adapts an asynchronous initializer into the reactive model.
//!
//! A context starts idle and only starts loading when first read,
//! through [`AsyncContext::get`] or [`AsyncContext::load`]. Once
//! loading, it either loads successfully, notifying every hook that
//! read it, or fails, keeping the error until loaded again.

// Imports
use {
	crate::deferred::{Deferred, DeferredError},
	core::{cell::RefCell, fmt, future::Future, pin::pin},
	hookwire_reactive::{Loc, Provider, Value, WeakProvider},
	std::rc::Rc,
	tokio::sync::Notify,
};

/// Initializer
pub trait Initializer: 'static {
	/// Output
	type Output: 'static;

	/// Error
	type Error: 'static;

	/// Future
	type Fut: Future<Output = Result<Self::Output, Self::Error>> + 'static;

	/// Starts initializing
	fn init(&self) -> Self::Fut;
}

impl<F, Fut, T, E> Initializer for F
where
	F: Fn() -> Fut + 'static,
	Fut: Future<Output = Result<T, E>> + 'static,
	T: 'static,
	E: 'static,
{
	type Error = E;
	type Fut = Fut;
	type Output = T;

	fn init(&self) -> Self::Fut {
		self()
	}
}

/// Loading state
struct State<T, E> {
	/// Whether the value was loaded
	has_loaded: bool,

	/// Whether currently loading
	is_loading: bool,

	/// Error of the last load
	error: Option<E>,

	/// Value
	value: Option<T>,
}

/// Inner
struct Inner<F: Initializer> {
	/// State
	state: RefCell<State<F::Output, F::Error>>,

	/// Initializer
	initializer: F,

	/// Completion of the first load
	completion: Deferred<F::Output, F::Error>,

	/// Channel to notify dependents through
	channel: Value<()>,

	/// Notify, for waiters
	notify: Notify,

	/// Provider
	provider: WeakProvider,

	/// Where this context was defined
	defined_loc: Loc,
}

/// Async context
pub struct AsyncContext<F: Initializer> {
	/// Inner
	inner: Rc<Inner<F>>,
}

impl<F> AsyncContext<F>
where
	F: Initializer,
	F::Output: Clone,
	F::Error: Clone,
{
	/// Creates a new, idle, async context
	#[track_caller]
	pub fn new(provider: &Provider, initializer: F) -> Self {
		let inner = Inner {
			state: RefCell::new(State {
				has_loaded: false,
				is_loading: false,
				error:      None,
				value:      None,
			}),
			initializer,
			completion: Deferred::new(),
			channel: provider.use_value(()),
			notify: Notify::new(),
			provider: provider.downgrade(),
			defined_loc: Loc::caller(),
		};
		Self { inner: Rc::new(inner) }
	}

	/// Starts loading the value.
	///
	/// Does nothing if already loaded or loading.
	///
	/// Returns whether this started loading.
	#[expect(clippy::must_use_candidate, reason = "It's fine to ignore")]
	pub fn load(&self) -> bool {
		{
			let mut state = self.inner.state.borrow_mut();
			if state.has_loaded || state.is_loading {
				return false;
			}
			state.is_loading = true;
			state.error = None;
		}

		let Some(provider) = self.inner.provider.upgrade() else {
			tracing::warn!(context=%self.inner.defined_loc, "Async context was loaded after its provider was dropped");
			self.stop_loading();
			return false;
		};

		let fut = self.inner.initializer.init();
		let this = self.clone();
		let res = provider.spawn_local(async move {
			let res = fut.await;
			this.settle(res);
		});
		if let Err(err) = res {
			tracing::error!(context=%self.inner.defined_loc, %err, "Unable to spawn async context initializer");
			self.stop_loading();
			return false;
		}

		tracing::trace!(context=%self.inner.defined_loc, "Loading async context");
		true
	}

	/// Stops loading after failing to start
	fn stop_loading(&self) {
		self.inner.state.borrow_mut().is_loading = false;
		self.inner.notify.notify_waiters();
	}

	/// Settles the context with the output of the initializer
	fn settle(&self, res: Result<F::Output, F::Error>) {
		match res {
			Ok(value) => {
				{
					let mut state = self.inner.state.borrow_mut();
					state.value = Some(value.clone());
					state.has_loaded = true;
					state.is_loading = false;
				}
				tracing::trace!(context=%self.inner.defined_loc, "Loaded async context");

				self.inner.channel.trigger();
				self.inner.completion.resolve(value);
			},
			Err(err) => {
				{
					let mut state = self.inner.state.borrow_mut();
					state.error = Some(err.clone());
					state.is_loading = false;
				}
				tracing::debug!(context=%self.inner.defined_loc, "Async context initializer failed");

				self.inner.completion.reject(err);
			},
		}

		self.inner.notify.notify_waiters();
	}

	/// Starts loading, if idle, and registers the current hook as a dependent.
	///
	/// Returns this context, so its state may be inspected.
	#[track_caller]
	pub fn get(&self) -> &Self {
		self.load();
		self.inner.channel.get();

		self
	}

	/// Sets the value, bypassing the initializer.
	///
	/// Settles the completion, if not yet settled.
	pub fn set(&self, value: F::Output) {
		{
			let mut state = self.inner.state.borrow_mut();
			state.value = Some(value.clone());
			state.has_loaded = true;
			state.error = None;
		}

		self.inner.completion.resolve(value);
		self.inner.channel.trigger();
		self.inner.notify.notify_waiters();
	}

	/// Loads the value again.
	///
	/// Does nothing while loading.
	///
	/// Returns whether this started loading.
	#[expect(clippy::must_use_candidate, reason = "It's fine to ignore")]
	pub fn refresh(&self) -> bool {
		{
			let mut state = self.inner.state.borrow_mut();
			if state.is_loading {
				return false;
			}
			state.has_loaded = false;
		}

		self.load()
	}

	/// Returns the settled state, if not loading
	fn settled(&self) -> Option<Result<F::Output, DeferredError<F::Error>>> {
		let state = self.inner.state.borrow();
		if state.has_loaded {
			let value = state.value.clone().expect("Loaded context should have a value");
			return Some(Ok(value));
		}

		match (state.is_loading, &state.error) {
			(true, _) => None,
			(false, Some(err)) => Some(Err(DeferredError::Rejected(err.clone()))),
			(false, None) => Some(Err(DeferredError::Dropped)),
		}
	}

	/// Waits until the value is loaded, starting loading if idle.
	///
	/// Unlike [`completion`](Self::completion), this waits for the
	/// latest load, so it may be used again after refreshing.
	///
	/// If loading couldn't start, returns [`DeferredError::Dropped`].
	pub async fn when_loaded(&self) -> Result<F::Output, DeferredError<F::Error>> {
		self.get();

		loop {
			// Note: We must register before checking, or we'd miss any
			//       notification between the check and the await.
			let mut notified = pin!(self.inner.notify.notified());
			notified.as_mut().enable();

			if let Some(res) = self.settled() {
				return res;
			}
			notified.await;
		}
	}

	/// Returns a future resolving once the first load settles
	pub fn completion(&self) -> impl Future<Output = Result<F::Output, DeferredError<F::Error>>> + use<F> {
		self.inner.completion.wait()
	}

	/// Returns whether the value was loaded
	#[must_use]
	pub fn has_loaded(&self) -> bool {
		self.inner.state.borrow().has_loaded
	}

	/// Returns whether currently loading
	#[must_use]
	pub fn is_loading(&self) -> bool {
		self.inner.state.borrow().is_loading
	}

	/// Returns the error of the last load, if it failed
	#[must_use]
	pub fn error(&self) -> Option<F::Error> {
		self.inner.state.borrow().error.clone()
	}

	/// Returns the value, if any.
	///
	/// After refreshing, this is the previous value until loaded again.
	#[must_use]
	pub fn value(&self) -> Option<F::Output> {
		self.inner.state.borrow().value.clone()
	}
}

impl<F: Initializer> Clone for AsyncContext<F> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<F> fmt::Debug for AsyncContext<F>
where
	F: Initializer,
	F::Output: fmt::Debug,
	F::Error: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.borrow();
		f.debug_struct("AsyncContext")
			.field("has_loaded", &state.has_loaded)
			.field("is_loading", &state.is_loading)
			.field("error", &state.error)
			.field("value", &state.value)
			.field("defined_loc", &self.inner.defined_loc)
			.finish_non_exhaustive()
	}
}

/// Accessor returned by [`ProviderAsyncContext::use_async_context`]
pub type AsyncContextAccessor<F> = Rc<dyn Fn() -> AsyncContext<F>>;

/// Extension trait to create async contexts on a provider
#[extend::ext(name = ProviderAsyncContext)]
pub impl Provider {
	/// Creates a new async context.
	///
	/// The context isn't kept between invocations of the current hook,
	/// wrap it in a state slot to do so.
	///
	/// The returned accessor starts loading the context, if idle, and
	/// registers the current hook as its dependent.
	fn use_async_context<F>(&self, initializer: F) -> AsyncContextAccessor<F>
	where
		F: Initializer,
		F::Output: Clone,
		F::Error: Clone,
	{
		let context = AsyncContext::new(self, initializer);
		Rc::new(move || context.get().clone())
	}
}
