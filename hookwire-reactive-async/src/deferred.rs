//! Deferred
//!
//! A value that is settled at most once, either resolved or
//! rejected, and may be awaited by any number of waiters.

// Imports
use {
	core::{cell::RefCell, fmt, future::Future},
	futures::{
		channel::oneshot,
		future::{LocalBoxFuture, Shared},
		FutureExt,
	},
};

/// Deferred error
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum DeferredError<E> {
	/// Rejected
	#[error("Deferred value was rejected: {0}")]
	Rejected(E),

	/// Dropped before being settled
	#[error("Deferred value was dropped before being settled")]
	Dropped,
}

/// Future resolving to the settled value
type Settled<T, E> = Shared<LocalBoxFuture<'static, Result<T, DeferredError<E>>>>;

/// Deferred
pub struct Deferred<T, E> {
	/// Sender, until settled
	sender: RefCell<Option<oneshot::Sender<Result<T, E>>>>,

	/// Settled future
	settled: Settled<T, E>,
}

impl<T, E> Deferred<T, E>
where
	T: Clone + 'static,
	E: Clone + 'static,
{
	/// Creates a new, unsettled, deferred
	#[must_use]
	pub fn new() -> Self {
		let (sender, receiver) = oneshot::channel();
		let settled = receiver
			.map(|res| match res {
				Ok(Ok(value)) => Ok(value),
				Ok(Err(err)) => Err(DeferredError::Rejected(err)),
				Err(oneshot::Canceled) => Err(DeferredError::Dropped),
			})
			.boxed_local()
			.shared();

		Self {
			sender: RefCell::new(Some(sender)),
			settled,
		}
	}

	/// Resolves this deferred.
	///
	/// Returns whether this settled it.
	pub fn resolve(&self, value: T) -> bool {
		self.settle(Ok(value))
	}

	/// Rejects this deferred.
	///
	/// Returns whether this settled it.
	pub fn reject(&self, err: E) -> bool {
		self.settle(Err(err))
	}

	/// Settles this deferred, if not yet settled
	fn settle(&self, res: Result<T, E>) -> bool {
		let Some(sender) = self.sender.borrow_mut().take() else {
			return false;
		};

		sender.send(res).is_ok()
	}

	/// Returns if this deferred was settled
	#[must_use]
	pub fn is_settled(&self) -> bool {
		self.sender.borrow().is_none()
	}

	/// Waits for this deferred to be settled.
	///
	/// If this deferred is dropped before being settled, returns [`DeferredError::Dropped`].
	pub fn wait(&self) -> impl Future<Output = Result<T, DeferredError<E>>> + use<T, E> {
		self.settled.clone()
	}
}

impl<T, E> Default for Deferred<T, E>
where
	T: Clone + 'static,
	E: Clone + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<T, E> fmt::Debug for Deferred<T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Deferred")
			.field("is_settled", &self.sender.borrow().is_none())
			.finish_non_exhaustive()
	}
}
