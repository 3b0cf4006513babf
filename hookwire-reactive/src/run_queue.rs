//! Run queue
//!
//! Defers debounced functions until the end of the current turn.
//!
//! A turn ends whenever [`RunQueue::flush`] is called, usually by
//! the host's event loop through [`Provider::flush`](crate::Provider::flush).

// Imports
use {
	core::{
		cell::RefCell,
		cmp::Reverse,
		fmt,
		hash::{Hash, Hasher},
	},
	priority_queue::PriorityQueue,
	std::rc::Rc,
};

/// A queued task
#[derive(Clone)]
struct Task {
	/// Function to run
	run: Rc<dyn Fn()>,
}

impl Task {
	/// Returns the id of this task
	fn id(&self) -> usize {
		Rc::as_ptr(&self.run).cast::<()>() as usize
	}
}

impl PartialEq for Task {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for Task {}

impl Hash for Task {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

/// Inner type for the queue
struct Inner {
	/// Queue
	queue: PriorityQueue<Task, Reverse<usize>>,

	/// Next index
	next: usize,

	/// Whether currently flushing the queue
	is_exec: bool,
}

/// Run queue
#[derive(Clone)]
pub struct RunQueue {
	/// Inner
	inner: Rc<RefCell<Inner>>,
}

impl RunQueue {
	/// Creates a new, empty, run queue
	#[must_use]
	pub fn new() -> Self {
		let inner = Inner {
			queue:   PriorityQueue::new(),
			next:    0,
			is_exec: false,
		};
		Self {
			inner: Rc::new(RefCell::new(inner)),
		}
	}

	/// Pushes a task to the queue.
	///
	/// If the task is already queued, it is moved to the back
	/// instead of being added twice.
	fn push(&self, task: Task) {
		let mut inner = self.inner.borrow_mut();

		let next = Reverse(inner.next);
		inner.queue.push_decrease(task, next);
		inner.next += 1;
	}

	/// Pops a task from the front of the queue
	fn pop(&self) -> Option<Task> {
		let (task, _) = self.inner.borrow_mut().queue.pop()?;
		Some(task)
	}

	/// Returns if a task is queued
	fn contains(&self, task: &Task) -> bool {
		self.inner.borrow().queue.get(task).is_some()
	}

	/// Returns the number of queued tasks
	#[must_use]
	pub fn len(&self) -> usize {
		self.inner.borrow().queue.len()
	}

	/// Returns if no tasks are queued
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Runs all queued tasks, until the queue is empty.
	///
	/// Tasks queued while flushing are run during this same flush.
	/// Calling this while already flushing does nothing.
	///
	/// Returns the number of tasks ran.
	pub fn flush(&self) -> usize {
		// If we're already flushing, the outer flush will pick up anything new
		{
			let mut inner = self.inner.borrow_mut();
			if inner.is_exec {
				tracing::trace!("Ignoring re-entrant run queue flush");
				return 0;
			}
			inner.is_exec = true;
		}
		let _exec_guard = scopeguard::guard((), |()| self.inner.borrow_mut().is_exec = false);

		let mut ran = 0;
		while let Some(task) = self.pop() {
			(task.run)();
			ran += 1;
		}

		if ran != 0 {
			tracing::trace!(ran, "Flushed run queue");
		}

		ran
	}
}

impl Default for RunQueue {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for RunQueue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let inner = self.inner.borrow();
		f.debug_struct("RunQueue")
			.field("len", &inner.queue.len())
			.field("is_exec", &inner.is_exec)
			.finish()
	}
}

/// Debounced function.
///
/// Calling it any number of times within a turn results in
/// exactly one call of the inner function once the queue is
/// flushed.
#[derive(Clone)]
pub struct Debounced {
	/// Task
	task: Task,

	/// Queue
	queue: RunQueue,
}

impl Debounced {
	/// Creates a new debounced function on a queue
	pub fn new<F>(queue: RunQueue, f: F) -> Self
	where
		F: Fn() + 'static,
	{
		Self {
			task: Task { run: Rc::new(f) },
			queue,
		}
	}

	/// Schedules the function to run at the end of the turn
	pub fn call(&self) {
		self.queue.push(self.task.clone());
	}

	/// Returns if a call is pending
	#[must_use]
	pub fn is_pending(&self) -> bool {
		self.queue.contains(&self.task)
	}
}

impl fmt::Debug for Debounced {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Debounced")
			.field("id", &self.task.id())
			.field("is_pending", &self.is_pending())
			.finish()
	}
}
