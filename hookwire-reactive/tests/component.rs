//! Component tests
//!
//! Drives hooks the way a host would, re-rendering a component
//! whenever it's triggered.

// Imports
use {
	core::cell::{Cell, RefCell},
	futures::channel::oneshot,
	hookwire_reactive::{deps, Collection, Hook, HookRef, Provider, Value, WeakProvider},
	std::rc::{Rc, Weak},
};

/// Render function
type Render = Box<dyn Fn(&Provider)>;

/// Component that re-renders whenever triggered
struct Component {
	/// Ourselves
	this: Weak<Self>,

	/// Provider
	provider: WeakProvider,

	/// Render function
	render: Render,

	/// Whether we're mounted
	mounted: Cell<bool>,

	/// Number of renders
	renders: Cell<usize>,
}

impl Component {
	/// Creates and renders a new component
	fn mount<F>(provider: &Provider, render: F) -> Rc<Self>
	where
		F: Fn(&Provider) + 'static,
	{
		let component = Rc::new_cyclic(|this| Self {
			this:     Weak::clone(this),
			provider: provider.downgrade(),
			render:   Box::new(render),
			mounted:  Cell::new(false),
			renders:  Cell::new(0),
		});
		component.render();

		component
	}

	/// Returns a reference to this component as a hook
	fn hook(&self) -> HookRef {
		HookRef::from(self.this.upgrade().expect("Component is alive"))
	}

	/// Renders this component
	fn render(&self) {
		let Some(provider) = self.provider.upgrade() else {
			return;
		};

		provider.with_hook(&self.hook(), || (self.render)(&provider));
		self.renders.set(self.renders.get() + 1);
	}
}

impl Hook for Component {
	fn trigger(&self) {
		if self.mounted.get() {
			self.render();
		}
	}

	fn on_mount(&self) {
		self.mounted.set(true);
	}

	fn on_unmount(&self) {
		self.mounted.set(false);
	}
}

/// Slot to export a value out of a render
type Export<T> = Rc<RefCell<Option<T>>>;

/// Gets an exported value
fn exported<T: Clone>(export: &Export<T>) -> T {
	export.borrow().clone().expect("Value wasn't exported")
}

#[test]
fn rerenders_once_per_turn() {
	let provider = Provider::new();
	let log = Rc::new(RefCell::new(vec![]));
	let count_export = Export::<Value<i32>>::default();

	let component = Component::mount(&provider, {
		let log = Rc::clone(&log);
		let count_export = Rc::clone(&count_export);
		move |provider| {
			let count = provider.use_state(0_i32).expect("Component is rendering");
			log.borrow_mut().push(count.get());
			*count_export.borrow_mut() = Some(count);
		}
	});
	assert_eq!(*log.borrow(), [0]);

	let count = exported(&count_export);
	count.set(1);
	count.set(2);
	provider.flush();
	assert_eq!(*log.borrow(), [0, 2], "Component didn't re-render exactly once with the last value");
	assert_eq!(component.renders.get(), 2);

	assert_eq!(provider.flush(), 0, "Re-rendering left notifications pending");
}

#[test]
fn effects_follow_renders() {
	let provider = Provider::new();
	let log = Rc::new(RefCell::new(vec![]));
	let count_export = Export::<Value<i32>>::default();

	let component = Component::mount(&provider, {
		let log = Rc::clone(&log);
		let count_export = Rc::clone(&count_export);
		move |provider| {
			let count = provider.use_state(0_i32).expect("Component is rendering");
			log.borrow_mut().push(format!("render {}", count.get()));

			provider
				.use_effect_with_cleanup(
					{
						let log = Rc::clone(&log);
						let count = count.clone();
						move || {
							let cur = count.get_raw();
							log.borrow_mut().push(format!("effect {cur}"));

							let log = Rc::clone(&log);
							move || log.borrow_mut().push(format!("cleanup {cur}"))
						}
					},
					deps![&count],
				)
				.expect("Component is rendering");

			*count_export.borrow_mut() = Some(count);
		}
	});
	assert_eq!(*log.borrow(), ["render 0", "effect 0"]);

	// Note: Both the component and the effect depend on the count,
	//       in no particular order, but the cleanup must come before the effect.
	log.borrow_mut().clear();
	exported(&count_export).set(1);
	provider.flush();
	let mut entries = log.borrow().clone();
	let cleanup_pos = entries.iter().position(|entry| entry == "cleanup 0");
	let effect_pos = entries.iter().position(|entry| entry == "effect 1");
	assert!(cleanup_pos < effect_pos, "Cleanup didn't run before the effect: {entries:?}");
	entries.sort();
	assert_eq!(entries, ["cleanup 0", "effect 1", "render 1"]);

	log.borrow_mut().clear();
	assert!(provider.unmount(&component.hook()));
	assert_eq!(*log.borrow(), ["cleanup 1"]);

	exported(&count_export).set(2);
	provider.flush();
	assert_eq!(*log.borrow(), ["cleanup 1"], "Component was used after being unmounted");
}

#[test]
fn siblings_are_independent() {
	let provider = Provider::new();
	let exports = [Export::<Value<i32>>::default(), Export::<Value<i32>>::default()];

	let components = exports.clone().map(|export| {
		Component::mount(&provider, move |provider| {
			let value = provider.use_state(0_i32).expect("Component is rendering");
			value.get();
			*export.borrow_mut() = Some(value);
		})
	});

	exported(&exports[0]).set(1);
	provider.flush();
	assert_eq!(components[0].renders.get(), 2);
	assert_eq!(components[1].renders.get(), 1, "Sibling was re-rendered");
}

#[test]
fn shared_collection() {
	let provider = Provider::new();
	let items_export = Export::<Vec<i32>>::default();
	let collection_export = Export::<Collection<Value<i32>, i32>>::default();

	let _component = Component::mount(&provider, {
		let items_export = Rc::clone(&items_export);
		let collection_export = Rc::clone(&collection_export);
		move |provider| {
			let values = provider.downgrade();
			let collection = provider
				.use_collection(move |_id: &str, initial: Option<i32>, prev: Option<&Value<i32>>| {
					let values = values.upgrade().expect("Provider is alive");
					let value = values.use_value(initial.unwrap_or_default());
					if let Some(prev) = prev {
						value.update_raw(|value| *value += prev.get_raw());
					}
					value
				})
				.expect("Component is rendering");

			collection.get("a", Some(1));
			collection.get("b", Some(2));
			let items = collection.map(|item, _, _, _| item.get());
			*items_export.borrow_mut() = Some(items);
			*collection_export.borrow_mut() = Some(collection);
		}
	});
	assert_eq!(exported(&items_export), [1, 2]);

	let collection = exported(&collection_export);
	collection.get("a", None).set(5);
	provider.flush();
	assert_eq!(exported(&items_export), [5, 2], "Component didn't see the item change");

	// Note: The component read the previous item, not the new one
	let c = collection.upget("a", 10);
	assert_eq!(c.get_raw(), 15);
	c.set(20);
	provider.flush();
	assert_eq!(exported(&items_export), [5, 2], "Component was notified by an item it didn't read");
	assert_eq!(collection.keys(), ["a", "b"]);
}

#[test]
fn async_task_updates_state() {
	let provider = Provider::new();
	let (tx, rx) = oneshot::channel::<i32>();
	let rx = Rc::new(RefCell::new(Some(rx)));
	let log = Rc::new(RefCell::new(vec![]));

	let _component = Component::mount(&provider, {
		let log = Rc::clone(&log);
		move |provider| {
			let value = provider.use_state(None::<i32>).expect("Component is rendering");
			log.borrow_mut().push(value.get());

			if let Some(rx) = rx.borrow_mut().take() {
				provider
					.spawn_local(async move {
						if let Ok(new_value) = rx.await {
							value.set(Some(new_value));
						}
					})
					.expect("Unable to spawn task");
			}
		}
	});

	provider.run_until_idle();
	assert_eq!(*log.borrow(), [None]);

	tx.send(7).expect("Task should be waiting");
	provider.run_until_idle();
	assert_eq!(*log.borrow(), [None, Some(7)]);
}
