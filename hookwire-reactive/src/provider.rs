//! Provider
//!
//! The provider keeps track of which hook is currently executing,
//! owns the state slots of every mounted hook and hands out the
//! primitive hook operations.
//!
//! A host makes a hook current before running its logic, either
//! with [`Provider::set_hook`] or, preferably, the scoped
//! [`Provider::with_hook`]:
//!
//! ```rust
//! use hookwire_reactive::{Hook, HookRef, Provider};
//!
//! struct Component;
//! impl Hook for Component {
//! 	fn trigger(&self) {}
//! }
//!
//! let provider = Provider::new();
//! let hook = HookRef::new(Component);
//! let count = provider.with_hook(&hook, || provider.use_state(0_usize)).expect("Hook is current");
//! count.set(count.get() + 1);
//! provider.flush();
//! ```

// Imports
use {
	crate::{
		collection::Collection,
		error::Error,
		hook::HookRef,
		hook_values::{HookValues, SlotCleanup},
		loc::Loc,
		run_queue::RunQueue,
		value::Value,
	},
	core::{any, cell::RefCell, fmt, future::Future},
	futures::{
		executor::LocalPool,
		task::{LocalSpawn, LocalSpawnExt},
	},
	std::{
		collections::HashMap,
		rc::{Rc, Weak},
	},
};

/// Provider configuration
#[derive(Clone, Debug)]
pub struct ProviderConfig {
	/// Whether to log hooks that use a different number of slots
	/// than in their previous invocation.
	pub detect_slot_mismatch: bool,

	/// Whether to log reads of values while no hook is executing
	pub warn_untracked_reads: bool,
}

impl Default for ProviderConfig {
	fn default() -> Self {
		Self {
			detect_slot_mismatch: cfg!(debug_assertions),
			warn_untracked_reads: false,
		}
	}
}

/// Inner
struct Inner {
	/// Current hook
	hook: RefCell<Option<HookRef>>,

	/// Values of all mounted hooks
	hooks: RefCell<HashMap<HookRef, HookValues>>,

	/// Run queue for debounced notifications
	queue: RunQueue,

	/// Local pool, for async tasks
	pool: RefCell<LocalPool>,

	/// Spawner
	spawner: Rc<dyn LocalSpawn>,

	/// Configuration
	config: ProviderConfig,
}

/// Provider
#[derive(Clone)]
pub struct Provider {
	/// Inner
	inner: Rc<Inner>,
}

impl Provider {
	/// Creates a new provider with the default configuration
	#[must_use]
	pub fn new() -> Self {
		Self::with_config(ProviderConfig::default())
	}

	/// Creates a new provider.
	///
	/// Async tasks are spawned on a pool owned by the provider,
	/// driven by [`Provider::run_until_idle`].
	#[must_use]
	pub fn with_config(config: ProviderConfig) -> Self {
		let pool = LocalPool::new();
		let spawner = Rc::new(pool.spawner());
		Self::new_inner(config, pool, spawner)
	}

	/// Creates a new provider that spawns async tasks on `spawner`
	#[must_use]
	pub fn with_spawner<S>(config: ProviderConfig, spawner: S) -> Self
	where
		S: LocalSpawn + 'static,
	{
		Self::new_inner(config, LocalPool::new(), Rc::new(spawner))
	}

	/// Inner constructor
	fn new_inner(config: ProviderConfig, pool: LocalPool, spawner: Rc<dyn LocalSpawn>) -> Self {
		let inner = Inner {
			hook: RefCell::new(None),
			hooks: RefCell::new(HashMap::new()),
			queue: RunQueue::new(),
			pool: RefCell::new(pool),
			spawner,
			config,
		};
		Self { inner: Rc::new(inner) }
	}

	/// Downgrades this provider
	#[must_use]
	pub fn downgrade(&self) -> WeakProvider {
		WeakProvider {
			inner: Rc::downgrade(&self.inner),
		}
	}

	/// Returns the configuration
	#[must_use]
	pub fn config(&self) -> &ProviderConfig {
		&self.inner.config
	}

	/// Returns the run queue of this provider
	#[must_use]
	pub fn queue(&self) -> &RunQueue {
		&self.inner.queue
	}

	/// Returns the current hook
	#[must_use]
	pub fn hook(&self) -> Option<HookRef> {
		self.inner.hook.borrow().clone()
	}

	/// Sets the current hook.
	///
	/// If `Some`, the hook is initialized, resetting its slot cursor.
	pub fn set_hook(&self, hook: Option<HookRef>) {
		if let Some(hook) = &hook {
			self.init_hook(hook);
		}
		self.inner.hook.replace(hook);
	}

	/// Runs `f` with `hook` as the current hook.
	///
	/// The previous hook is restored afterwards, even if `f` panics.
	pub fn with_hook<F, O>(&self, hook: &HookRef, f: F) -> O
	where
		F: FnOnce() -> O,
	{
		self.init_hook(hook);
		let prev_hook = self.inner.hook.replace(Some(hook.clone()));
		let _restore = scopeguard::guard(prev_hook, |prev_hook| {
			self.inner.hook.replace(prev_hook);
		});

		f()
	}

	/// Initializes a hook.
	///
	/// If the hook is unseen, allocates its values and mounts it.
	/// Either way, resets its slot cursor, so that the next state
	/// operations start from its first slot.
	pub fn init_hook(&self, hook: &HookRef) {
		let detect_mismatch = self.inner.config.detect_slot_mismatch;
		let is_new = {
			let mut hooks = self.inner.hooks.borrow_mut();
			let mut is_new = false;
			hooks
				.entry(hook.clone())
				.or_insert_with(|| {
					is_new = true;
					HookValues::new(hook.id())
				})
				.reset(detect_mismatch);
			is_new
		};

		if is_new {
			tracing::debug!(hook = hook.id(), "Mounted hook");
			hook.on_mount();
		}
	}

	/// Marks the current invocation of a hook as having used all of its slots.
	///
	/// Used when a hook was made current, but skipped its logic.
	pub(crate) fn skip_invocation(&self, hook: &HookRef) {
		if let Some(values) = self.inner.hooks.borrow_mut().get_mut(hook) {
			values.skip();
		}
	}

	/// Runs `f` with the values of a mounted hook.
	///
	/// Returns `None` if the hook isn't mounted.
	pub fn with_hook_values<F, O>(&self, hook: &HookRef, f: F) -> Option<O>
	where
		F: FnOnce(&HookValues) -> O,
	{
		self.inner.hooks.borrow().get(hook).map(f)
	}

	/// Returns if a hook is mounted
	#[must_use]
	pub fn is_mounted(&self, hook: &HookRef) -> bool {
		self.inner.hooks.borrow().contains_key(hook)
	}

	/// Unmounts a hook.
	///
	/// Runs all of the hook's slot cleanups once, drops its slots and
	/// then lets the hook know through [`Hook::on_unmount`](crate::Hook::on_unmount).
	///
	/// Returns whether the hook was mounted.
	pub fn unmount(&self, hook: &HookRef) -> bool {
		let Some(values) = self.inner.hooks.borrow_mut().remove(hook) else {
			return false;
		};

		values.cleanup();
		tracing::debug!(hook = hook.id(), "Unmounted hook");
		hook.on_unmount();

		true
	}

	/// Creates a standalone value, not bound to any slot
	pub fn use_value<T>(&self, initial: T) -> Value<T> {
		Value::new(self, initial)
	}

	/// Uses the next state slot of the current hook.
	///
	/// On the first invocation, the slot is created with `initial`,
	/// afterwards the same value is returned.
	#[track_caller]
	pub fn use_state<T>(&self, initial: T) -> Result<Value<T>, Error>
	where
		T: 'static,
	{
		self.use_state_with(|| initial)
	}

	/// Uses the next state slot of the current hook, creating it with `init`.
	#[track_caller]
	pub fn use_state_with<T, F>(&self, init: F) -> Result<Value<T>, Error>
	where
		T: 'static,
		F: FnOnce() -> T,
	{
		self.use_state_inner(init, None::<fn(&Value<T>)>, Loc::caller())
			.map(|(value, _)| value)
	}

	/// Uses the next state slot of the current hook, creating it with `init`.
	///
	/// `cleanup` is ran once the hook is unmounted.
	#[track_caller]
	pub fn use_state_with_cleanup<T, F, C>(&self, init: F, cleanup: C) -> Result<Value<T>, Error>
	where
		T: 'static,
		F: FnOnce() -> T,
		C: FnOnce(&Value<T>) + 'static,
	{
		self.use_state_inner(init, Some(cleanup), Loc::caller())
			.map(|(value, _)| value)
	}

	/// Inner function for all `use_state*` functions.
	///
	/// Returns the value and whether it was just created.
	pub(crate) fn use_state_inner<T, F, C>(&self, init: F, cleanup: Option<C>, loc: Loc) -> Result<(Value<T>, bool), Error>
	where
		T: 'static,
		F: FnOnce() -> T,
		C: FnOnce(&Value<T>) + 'static,
	{
		let hook = self.hook().ok_or(Error::NoCurrentHook { loc })?;
		if !self.is_mounted(&hook) {
			self.init_hook(&hook);
		}

		// If the slot already exists, return it
		let detect_mismatch = self.inner.config.detect_slot_mismatch;
		let idx = {
			let mut hooks = self.inner.hooks.borrow_mut();
			let values = hooks.get_mut(&hook).expect("Current hook should be mounted");
			let (idx, slot) = values.next_slot(detect_mismatch);
			if let Some(slot) = slot {
				let value = slot
					.downcast_ref::<Value<T>>()
					.ok_or(Error::SlotTypeMismatch {
						idx,
						expected: any::type_name::<Value<T>>(),
					})?
					.clone();
				return Ok((value, false));
			}

			idx
		};

		// Else create it.
		// Note: `init` might use the provider, so we can't keep the hooks borrowed.
		let value = self.use_value(init());
		let cleanup = cleanup.map(|cleanup| {
			let value = value.clone();
			Box::new(move || cleanup(&value)) as SlotCleanup
		});

		match self.inner.hooks.borrow_mut().get_mut(&hook) {
			Some(values) => values.push(idx, Box::new(value.clone()), cleanup),
			None => tracing::warn!(
				hook = hook.id(),
				location = %loc,
				"Hook was unmounted while initializing one of its slots"
			),
		}

		Ok((value, true))
	}

	/// Uses a ref slot of the current hook.
	///
	/// Starts as `None`, see [`Value::current`] and [`Value::set_current`].
	#[track_caller]
	pub fn use_ref<T>(&self) -> Result<Value<Option<T>>, Error>
	where
		T: 'static,
	{
		self.use_state_inner(|| None, None::<fn(&Value<Option<T>>)>, Loc::caller())
			.map(|(value, _)| value)
	}

	/// Uses a collection slot of the current hook.
	///
	/// `creator` is only used on the first invocation.
	#[track_caller]
	pub fn use_collection<T, V, F>(&self, creator: F) -> Result<Collection<T, V>, Error>
	where
		T: 'static,
		V: 'static,
		F: Fn(&str, Option<V>, Option<&T>) -> T + 'static,
	{
		let (collection, _) = self.use_state_inner(
			|| Collection::new(creator),
			None::<fn(&Value<Collection<T, V>>)>,
			Loc::caller(),
		)?;

		Ok(collection.get())
	}

	/// Spawns a task on this provider's spawner
	pub fn spawn_local<F>(&self, fut: F) -> Result<(), Error>
	where
		F: Future<Output = ()> + 'static,
	{
		self.inner.spawner.spawn_local(fut).map_err(Error::Spawn)
	}

	/// Ends the current turn, running all pending notifications.
	///
	/// Returns the number of notifications ran.
	pub fn flush(&self) -> usize {
		self.inner.queue.flush()
	}

	/// Runs all async tasks on the provider's pool and all pending notifications
	/// until neither have any more work.
	///
	/// Must not be called from within another executor.
	pub fn run_until_idle(&self) {
		loop {
			match self.inner.pool.try_borrow_mut() {
				Ok(mut pool) => pool.run_until_stalled(),
				Err(_) => tracing::warn!("Provider pool is already running, only flushing notifications"),
			}

			if self.flush() == 0 {
				break;
			}
		}
	}
}

impl Default for Provider {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Provider")
			.field("hook", &*self.inner.hook.borrow())
			.field("hooks", &self.inner.hooks.borrow().len())
			.field("queue", &self.inner.queue)
			.field("config", &self.inner.config)
			.finish_non_exhaustive()
	}
}

/// Weak provider
///
/// Held by values so they never keep the provider alive.
#[derive(Clone)]
pub struct WeakProvider {
	/// Inner
	inner: Weak<Inner>,
}

impl WeakProvider {
	/// Upgrades this provider
	#[must_use]
	pub fn upgrade(&self) -> Option<Provider> {
		let inner = self.inner.upgrade()?;
		Some(Provider { inner })
	}
}

impl fmt::Debug for WeakProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakProvider").finish_non_exhaustive()
	}
}
