//! Effect
//!
//! An effect is a function that is re-run whenever its dependencies
//! change.
//!
//! Each effect is a synthetic hook stored in a state slot of the hook
//! that declared it, so it keeps its identity across invocations of
//! that hook. Whenever it's triggered, it reads all of its dependencies
//! while being the current hook, and runs its body only if none of
//! them are null and at least one of them changed since the last run.
//! An effect without dependencies runs on every trigger instead, and
//! is triggered by anything its body reads.

// Imports
use {
	crate::{
		dep::{Deps, Snapshot},
		error::Error,
		hook::{Hook, HookRef},
		loc::Loc,
		provider::{Provider, WeakProvider},
		value::Value,
	},
	core::{
		cell::{Cell, RefCell},
		fmt,
	},
	std::rc::{Rc, Weak},
};

/// Effect cleanup
pub type Cleanup = Box<dyn FnOnce()>;

/// Effect body
type Body = Box<dyn FnMut() -> Option<Cleanup>>;

/// Callback returned by [`Provider::use_callback`]
pub type Callback<A, R> = Rc<dyn Fn(A) -> R>;

/// Effect state
#[derive(Default)]
struct State {
	/// Dependency snapshot of the last run
	snapshot: Vec<Snapshot>,

	/// Number of dependencies of the last run.
	///
	/// Unset until the body first runs with dependencies.
	total: Option<usize>,

	/// Cleanup returned by the last run
	cleanup: Option<Cleanup>,
}

/// Effect
pub(crate) struct Effect {
	/// Ourselves
	this: Weak<Self>,

	/// Provider
	provider: WeakProvider,

	/// Body
	body: RefCell<Body>,

	/// Dependencies
	deps: RefCell<Deps>,

	/// State
	state: RefCell<State>,

	/// Whether this effect was disposed
	disposed: Cell<bool>,

	/// Where this effect was defined
	defined_loc: Loc,
}

impl Effect {
	/// Creates a new effect.
	///
	/// Doesn't run it.
	fn new(provider: &Provider, body: Body, deps: Deps, defined_loc: Loc) -> Rc<Self> {
		Rc::new_cyclic(|this| Self {
			this: Weak::clone(this),
			provider: provider.downgrade(),
			body: RefCell::new(body),
			deps: RefCell::new(deps),
			state: RefCell::new(State::default()),
			disposed: Cell::new(false),
			defined_loc,
		})
	}

	/// Replaces the body and dependencies of this effect, without running it.
	fn replace(&self, body: Body, deps: Deps) -> Result<(), Error> {
		let mut cur_deps = self.deps.borrow_mut();
		if cur_deps.count() != deps.count() {
			return Err(Error::DepsLengthChanged {
				previous: cur_deps.count(),
				current:  deps.count(),
			});
		}
		*cur_deps = deps;
		drop(cur_deps);

		match self.body.try_borrow_mut() {
			Ok(mut cur_body) => *cur_body = body,
			Err(_) => tracing::warn!(
				effect=%self.defined_loc,
				"Effect was re-declared while running, keeping the running body"
			),
		}

		Ok(())
	}

	/// Evaluates this effect, running it if its dependencies changed.
	fn evaluate(&self) {
		if self.disposed.get() {
			return;
		}
		let Some(provider) = self.provider.upgrade() else {
			return;
		};
		let Some(this) = self.this.upgrade() else {
			return;
		};

		// Note: Dependencies must be read while we're the current hook,
		//       so that we get notified when they change instead of the caller.
		let hook = HookRef::from(this);
		provider.with_hook(&hook, || match self.should_run() {
			true => self.run(),
			// Note: The body didn't run, so it didn't use any of its slots.
			false => provider.skip_invocation(&hook),
		});
	}

	/// Checks all dependencies, returning whether the body should run
	fn should_run(&self) -> bool {
		let deps = match &*self.deps.borrow() {
			Deps::Always => return true,
			Deps::On(deps) => deps.clone(),
		};

		let mut satisfied = true;
		let snapshot = deps
			.iter()
			.map(|dep| {
				let value = dep.observe();
				satisfied &= !value.is_null();
				value
			})
			.collect::<Vec<_>>();

		let mut state = self.state.borrow_mut();
		let equal = match state.total {
			Some(_) => snapshot
				.iter()
				.zip(&state.snapshot)
				.filter(|(cur, prev)| cur == prev)
				.count(),
			None => 0,
		};

		let should_run = satisfied && state.total != Some(equal);
		if should_run {
			state.total = Some(snapshot.len());
			state.snapshot = snapshot;
		}

		should_run
	}

	/// Runs the body, after running the previous cleanup
	fn run(&self) {
		let Ok(mut body) = self.body.try_borrow_mut() else {
			tracing::warn!(effect=%self.defined_loc, "Effect was triggered while running, ignoring");
			return;
		};

		let prev_cleanup = self.state.borrow_mut().cleanup.take();
		if let Some(cleanup) = prev_cleanup {
			cleanup();
		}

		tracing::trace!(effect=%self.defined_loc, "Running effect");
		let cleanup = body();
		drop(body);

		// Note: If the body unmounted our owner, we were disposed while running,
		//       so nobody else will run this cleanup.
		if self.disposed.get() {
			if let Some(cleanup) = cleanup {
				cleanup();
			}
			return;
		}

		// Note: The previous cleanup was taken, so we can't be replacing
		//       one unless the body re-entered, which `body` guards against.
		self.state.borrow_mut().cleanup = cleanup;
	}

	/// Disposes of this effect.
	///
	/// Runs the latest cleanup and unmounts any state the body used.
	fn dispose(&self) {
		if self.disposed.replace(true) {
			return;
		}

		let cleanup = self.state.borrow_mut().cleanup.take();
		if let Some(cleanup) = cleanup {
			cleanup();
		}

		if let (Some(provider), Some(this)) = (self.provider.upgrade(), self.this.upgrade()) {
			provider.unmount(&HookRef::from(this));
		}
	}
}

impl Hook for Effect {
	fn trigger(&self) {
		self.evaluate();
	}
}

impl fmt::Debug for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("Effect")
			.field("deps", &*self.deps.borrow())
			.field("total", &state.total)
			.field("has_cleanup", &state.cleanup.is_some())
			.field("disposed", &self.disposed.get())
			.field("defined_loc", &self.defined_loc)
			.finish_non_exhaustive()
	}
}

impl Provider {
	/// Declares an effect on the current hook.
	///
	/// On the first invocation, the effect is installed and ran immediately,
	/// if its dependencies allow it. On later invocations, the body and
	/// dependencies replace the previous ones without running.
	///
	/// The number of dependencies must be the same on every invocation.
	#[track_caller]
	pub fn use_effect<F>(&self, mut f: F, deps: Deps) -> Result<(), Error>
	where
		F: FnMut() + 'static,
	{
		let body = Box::new(move || -> Option<Cleanup> {
			f();
			None
		});
		self.use_effect_inner(body, deps, Loc::caller())
	}

	/// Declares an effect on the current hook, which returns a cleanup.
	///
	/// The cleanup is ran before the next run of the effect, or when the
	/// hook that declared the effect is unmounted.
	///
	/// See [`Provider::use_effect`] for details.
	#[track_caller]
	pub fn use_effect_with_cleanup<F, C>(&self, mut f: F, deps: Deps) -> Result<(), Error>
	where
		F: FnMut() -> C + 'static,
		C: FnOnce() + 'static,
	{
		let body = Box::new(move || Some(Box::new(f()) as Cleanup));
		self.use_effect_inner(body, deps, Loc::caller())
	}

	/// Inner function for [`Self::use_effect`] and [`Self::use_effect_with_cleanup`]
	fn use_effect_inner(&self, body: Body, deps: Deps, loc: Loc) -> Result<(), Error> {
		let mut pending = Some((body, deps));
		let (effect, created) = self.use_state_inner(
			|| {
				let (body, deps) = pending.take().expect("Effect should only be created once");
				Effect::new(self, body, deps, loc)
			},
			Some(|effect: &Value<Rc<Effect>>| effect.with_raw(|effect| effect.dispose())),
			loc,
		)?;
		let effect = effect.get_raw();

		match created {
			true => effect.evaluate(),
			false => {
				let (body, deps) = pending.take().expect("Effect body should be unused");
				effect.replace(body, deps)?;
			},
		}

		Ok(())
	}

	/// Declares a callback on the current hook.
	///
	/// The returned callback keeps its identity until any of `deps`
	/// change, after which the latest declared `f` is returned.
	#[track_caller]
	pub fn use_callback<A, R, F>(&self, f: F, deps: Deps) -> Result<Callback<A, R>, Error>
	where
		A: 'static,
		R: 'static,
		F: Fn(A) -> R + 'static,
	{
		let f = Rc::new(f) as Callback<A, R>;
		let loc = Loc::caller();
		let (callback, _) = self.use_state_inner(|| Rc::clone(&f), None::<fn(&Value<Callback<A, R>>)>, loc)?;

		self.use_effect_inner(
			Box::new({
				let callback = callback.clone();
				move || -> Option<Cleanup> {
					let is_current = callback.with_raw(|callback| Rc::ptr_eq(callback, &f));
					if !is_current {
						callback.set(Rc::clone(&f));
					}
					None
				}
			}),
			deps,
			loc,
		)?;

		Ok(callback.get())
	}
}

#[cfg(test)]
mod tests;
