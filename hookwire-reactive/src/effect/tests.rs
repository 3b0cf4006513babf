//! Tests

// Imports
use {
	super::*,
	crate::{HookValues, ProviderConfig, deps, test_util::CountingHook},
	core::cell::Cell,
};

/// Returns a counter along with a function that increments it
fn counter() -> (Rc<Cell<usize>>, impl Fn() + Clone + 'static) {
	let count = Rc::new(Cell::new(0_usize));
	let inc = {
		let count = Rc::clone(&count);
		move || count.set(count.get() + 1)
	};

	(count, inc)
}

#[test]
fn without_deps_runs_on_install() {
	let provider = Provider::new();
	let (_, hook) = CountingHook::new();
	let (runs, inc) = counter();

	let invoke = || provider.with_hook(&hook, || provider.use_effect(inc.clone(), Deps::Always));
	invoke().expect("Hook is current");
	assert_eq!(runs.get(), 1, "Effect didn't run on install");

	invoke().expect("Hook is current");
	provider.flush();
	assert_eq!(runs.get(), 1, "Effect ran when re-declared");
}

#[test]
fn without_deps_tracks_reads() {
	let provider = Provider::new();
	let (owner, hook) = CountingHook::new();
	let (runs, inc) = counter();

	let value = provider.use_value(0_i32);
	provider
		.with_hook(&hook, || {
			let value = value.clone();
			provider.use_effect(
				move || {
					value.get();
					inc();
				},
				Deps::Always,
			)
		})
		.expect("Hook is current");
	assert_eq!(runs.get(), 1);

	value.set(1);
	provider.flush();
	assert_eq!(runs.get(), 2, "Effect didn't re-run after a read value changed");
	assert_eq!(owner.triggers.get(), 0, "Effect reads were attributed to its owner");
}

#[test]
fn null_deps_block_run() {
	let provider = Provider::new();
	let (_, hook) = CountingHook::new();
	let (runs, inc) = counter();

	let (a, b) = provider
		.with_hook(&hook, || {
			let a = provider.use_state(None::<i32>)?;
			let b = provider.use_state(Some(1_i32))?;
			provider.use_effect(inc.clone(), deps![&a, &b])?;
			Ok::<_, Error>((a, b))
		})
		.expect("Hook is current");
	assert_eq!(runs.get(), 0, "Effect ran with a null dependency");

	a.set(Some(5));
	provider.flush();
	assert_eq!(runs.get(), 1, "Effect didn't run once all dependencies were set");

	b.set(None);
	provider.flush();
	assert_eq!(runs.get(), 1, "Effect ran with a null dependency");

	b.set(Some(1));
	provider.flush();
	assert_eq!(runs.get(), 1, "Effect ran with unchanged dependencies");

	b.set(Some(2));
	provider.flush();
	assert_eq!(runs.get(), 2);
}

#[test]
fn equal_deps_skip_run() {
	let provider = Provider::new();
	let (_, hook) = CountingHook::new();
	let (runs, inc) = counter();

	let a = provider
		.with_hook(&hook, || {
			let a = provider.use_state(1_i32)?;
			provider.use_effect(inc.clone(), deps![&a])?;
			Ok::<_, Error>(a)
		})
		.expect("Hook is current");
	assert_eq!(runs.get(), 1);

	a.set(1);
	provider.flush();
	assert_eq!(runs.get(), 1, "Effect ran after setting an equal value");

	a.set(2);
	a.set(3);
	provider.flush();
	assert_eq!(runs.get(), 2, "Effect didn't run exactly once per turn");
}

#[test]
fn empty_deps_run_once() {
	let provider = Provider::new();
	let (_, hook) = CountingHook::new();
	let (runs, inc) = counter();

	let value = provider.use_value(0_i32);
	let invoke = || {
		provider.with_hook(&hook, || {
			let value = value.clone();
			let inc = inc.clone();
			provider.use_effect(
				move || {
					value.get();
					inc();
				},
				deps![],
			)
		})
	};

	invoke().expect("Hook is current");
	value.set(1);
	provider.flush();
	invoke().expect("Hook is current");
	provider.flush();
	assert_eq!(runs.get(), 1, "Effect with empty dependencies ran more than once");
}

#[test]
fn cleanup_before_rerun_and_on_unmount() {
	let provider = Provider::new();
	let (_, hook) = CountingHook::new();
	let (runs, inc_runs) = counter();
	let (cleanups, inc_cleanups) = counter();

	let a = provider
		.with_hook(&hook, || {
			let a = provider.use_state(0_i32)?;
			let runs = Rc::clone(&runs);
			let cleanups = Rc::clone(&cleanups);
			provider.use_effect_with_cleanup(
				move || {
					assert_eq!(cleanups.get(), runs.get(), "Previous cleanup wasn't ran before the effect");
					inc_runs();
					inc_cleanups.clone()
				},
				deps![&a],
			)?;
			Ok::<_, Error>(a)
		})
		.expect("Hook is current");
	assert_eq!((runs.get(), cleanups.get()), (1, 0));

	a.set(1);
	provider.flush();
	assert_eq!((runs.get(), cleanups.get()), (2, 1));

	assert!(provider.unmount(&hook));
	assert_eq!(cleanups.get(), 2, "Latest cleanup wasn't ran on unmount");

	a.set(2);
	provider.flush();
	assert_eq!((runs.get(), cleanups.get()), (2, 2), "Effect ran after being unmounted");
	assert!(!provider.unmount(&hook));
	assert_eq!(cleanups.get(), 2);
}

#[test]
fn effect_state_unmounted_with_owner() {
	let provider = Provider::new();
	let (_, hook) = CountingHook::new();
	let (cleanups, inc_cleanups) = counter();

	provider
		.with_hook(&hook, || {
			let weak_provider = provider.downgrade();
			provider.use_effect(
				move || {
					let Some(provider) = weak_provider.upgrade() else {
						return;
					};
					let inc_cleanups = inc_cleanups.clone();
					provider
						.use_state_with_cleanup(|| 0_i32, move |_| inc_cleanups())
						.expect("Effect should be the current hook");
				},
				deps![],
			)
		})
		.expect("Hook is current");

	assert_eq!(cleanups.get(), 0);
	provider.unmount(&hook);
	assert_eq!(cleanups.get(), 1, "State used by the effect wasn't cleaned up");
}

#[test]
fn cleanup_of_run_that_unmounts_owner() {
	let provider = Provider::new();
	let (owner, hook) = CountingHook::new();
	let (cleanups, inc_cleanups) = counter();

	let a = provider.use_value(0_i32);
	provider
		.with_hook(&hook, || {
			let weak_provider = provider.downgrade();
			let weak_hook = hook.downgrade();
			let cur_a = a.clone();
			provider.use_effect_with_cleanup(
				move || {
					if cur_a.get_raw() == 1 {
						if let (Some(provider), Some(hook)) = (weak_provider.upgrade(), weak_hook.upgrade()) {
							provider.unmount(&hook);
						}
					}
					inc_cleanups.clone()
				},
				deps![&a],
			)
		})
		.expect("Hook is current");
	assert_eq!(cleanups.get(), 0);

	a.set(1);
	provider.flush();
	assert!(!provider.is_mounted(&hook), "Owner wasn't unmounted");
	assert_eq!(owner.unmounts.get(), 1);
	assert_eq!(cleanups.get(), 2, "Cleanup of the run that unmounted its owner wasn't ran");

	a.set(2);
	provider.flush();
	assert_eq!(cleanups.get(), 2, "Effect ran after its owner was unmounted");
}

#[test]
fn skipped_run_isnt_a_slot_mismatch() {
	let provider = Provider::with_config(ProviderConfig {
		detect_slot_mismatch: true,
		..ProviderConfig::default()
	});
	let (_, hook) = CountingHook::new();
	let (runs, inc) = counter();
	let effect_hook = Rc::new(RefCell::new(None::<HookRef>));

	let a = provider.use_value(0_i32);
	provider
		.with_hook(&hook, || {
			let weak_provider = provider.downgrade();
			let effect_hook = Rc::clone(&effect_hook);
			provider.use_effect(
				move || {
					let Some(provider) = weak_provider.upgrade() else {
						return;
					};
					provider.use_state(0_i32).expect("Effect should be the current hook");
					*effect_hook.borrow_mut() = provider.hook();
					inc();
				},
				deps![&a],
			)
		})
		.expect("Hook is current");

	// Equal value, so the body is skipped
	a.set(0);
	provider.flush();
	a.set(1);
	provider.flush();
	assert_eq!(runs.get(), 2);

	let effect_hook = effect_hook.borrow().clone().expect("Effect should have ran");
	assert_eq!(
		provider.with_hook_values(&effect_hook, HookValues::mismatches),
		Some(0),
		"Skipped effect run was reported as a slot mismatch"
	);
}

#[test]
fn deps_length_change() {
	let provider = Provider::new();
	let (_, hook) = CountingHook::new();

	let a = provider.use_value(1_i32);
	let b = provider.use_value(2_i32);
	provider
		.with_hook(&hook, || provider.use_effect(|| (), deps![&a]))
		.expect("Hook is current");

	let res = provider.with_hook(&hook, || provider.use_effect(|| (), deps![&a, &b]));
	assert!(
		matches!(res, Err(Error::DepsLengthChanged {
			previous: Some(1),
			current:  Some(2),
		})),
		"Dependency length change was accepted: {res:?}"
	);

	let res = provider.with_hook(&hook, || provider.use_effect(|| (), Deps::Always));
	assert!(
		matches!(res, Err(Error::DepsLengthChanged {
			previous: Some(1),
			current:  None,
		})),
		"Dependency length change was accepted: {res:?}"
	);
}

#[test]
fn redeclared_body_used_next_run() {
	let provider = Provider::new();
	let (_, hook) = CountingHook::new();
	let seen = Rc::new(RefCell::new(vec![]));

	let a = provider.use_value(0_i32);
	let invoke = |name: &'static str| {
		provider.with_hook(&hook, || {
			let seen = Rc::clone(&seen);
			provider.use_effect(move || seen.borrow_mut().push(name), deps![&a])
		})
	};

	invoke("first").expect("Hook is current");
	invoke("second").expect("Hook is current");
	assert_eq!(*seen.borrow(), ["first"], "Effect ran when re-declared");

	a.set(1);
	provider.flush();
	assert_eq!(*seen.borrow(), ["first", "second"]);
}

#[test]
fn restores_current_hook() {
	let provider = Provider::new();
	let (_, hook) = CountingHook::new();

	provider.with_hook(&hook, || {
		provider.use_effect(|| (), Deps::Always).expect("Hook is current");
		assert_eq!(provider.hook(), Some(hook.clone()), "Owner wasn't restored after the effect ran");
	});
	assert_eq!(provider.hook(), None);
}

#[test]
fn callback_identity() {
	let provider = Provider::new();
	let (owner, hook) = CountingHook::new();

	let factor = provider.use_value(1_i32);
	let invoke = |offset: i32| {
		provider.with_hook(&hook, || {
			let cur_factor = factor.clone();
			provider.use_callback(move |x: i32| x * cur_factor.get_raw() + offset, deps![&factor])
		})
	};

	let first = invoke(0).expect("Hook is current");
	let second = invoke(10).expect("Hook is current");
	assert!(Rc::ptr_eq(&first, &second), "Callback changed without its dependencies changing");
	assert_eq!(second(2), 2, "Callback was replaced without its dependencies changing");

	factor.set(3);
	provider.flush();
	assert_eq!(owner.triggers.get(), 1, "Owner wasn't notified of the new callback");

	let third = invoke(20).expect("Hook is current");
	assert!(!Rc::ptr_eq(&first, &third), "Callback didn't change after its dependencies changed");
	assert_eq!(third(2), 16, "Callback wasn't the latest declared");
}
