//! Effect dependencies

// Imports
use {
	crate::value::Value,
	core::{any::Any, fmt},
	std::{rc::Rc, sync::Arc},
};

/// Types that may be null.
///
/// An effect only runs while none of its dependencies are null.
///
/// Only `Option`, the primitives, strings and a few containers implement
/// this, so a `Value<T>` of any other type can only be used as a dependency
/// once `T` implements it. Types without a null state just return `false`:
///
/// ```rust
/// use hookwire_reactive::Nullable;
///
/// #[derive(Clone, PartialEq)]
/// struct Point {
/// 	x: i32,
/// 	y: i32,
/// }
///
/// impl Nullable for Point {
/// 	fn is_null(&self) -> bool {
/// 		false
/// 	}
/// }
/// ```
pub trait Nullable {
	/// Returns if this value is null
	fn is_null(&self) -> bool;
}

impl<T> Nullable for Option<T> {
	fn is_null(&self) -> bool {
		self.is_none()
	}
}

#[duplicate::duplicate_item(
	Ty;
	[ bool ]; [ char ]; [ () ];
	[ u8 ]; [ u16 ]; [ u32 ]; [ u64 ]; [ u128 ]; [ usize ];
	[ i8 ]; [ i16 ]; [ i32 ]; [ i64 ]; [ i128 ]; [ isize ];
	[ f32 ]; [ f64 ];
	[ String ]; [ &'static str ];
)]
impl Nullable for Ty {
	fn is_null(&self) -> bool {
		false
	}
}

#[duplicate::duplicate_item(
	Ty;
	[ Vec<T> ]; [ Box<T> ]; [ Rc<T> ]; [ Arc<T> ];
)]
impl<T> Nullable for Ty {
	fn is_null(&self) -> bool {
		false
	}
}

/// Snapshot of a dependency's value
pub struct Snapshot {
	/// Value
	value: Box<dyn Any>,

	/// Whether the value was null
	is_null: bool,

	/// Equality function
	eq: fn(&dyn Any, &dyn Any) -> bool,
}

impl Snapshot {
	/// Creates a new snapshot
	pub fn new<T>(value: T) -> Self
	where
		T: PartialEq + Nullable + 'static,
	{
		Self {
			is_null: value.is_null(),
			value:   Box::new(value),
			eq:      self::dyn_eq::<T>,
		}
	}

	/// Returns if the value was null
	#[must_use]
	pub const fn is_null(&self) -> bool {
		self.is_null
	}
}

impl PartialEq for Snapshot {
	fn eq(&self, other: &Self) -> bool {
		(self.eq)(&*self.value, &*other.value)
	}
}

impl fmt::Debug for Snapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Snapshot")
			.field("is_null", &self.is_null)
			.finish_non_exhaustive()
	}
}

/// Compares two type-erased values of type `T`
fn dyn_eq<T: PartialEq + 'static>(lhs: &dyn Any, rhs: &dyn Any) -> bool {
	match (lhs.downcast_ref::<T>(), rhs.downcast_ref::<T>()) {
		(Some(lhs), Some(rhs)) => lhs == rhs,
		_ => false,
	}
}

/// Effect dependency
pub trait Dep {
	/// Reads this dependency, registering the current hook as a
	/// dependent, and returns a snapshot of its value.
	fn observe(&self) -> Snapshot;
}

impl<T> Dep for Value<T>
where
	T: Clone + PartialEq + Nullable + 'static,
{
	#[track_caller]
	fn observe(&self) -> Snapshot {
		self.with(|value| Snapshot::new(value.clone()))
	}
}

/// Types that may be converted into a dependency
pub trait IntoDep {
	/// Converts this type into a dependency
	fn into_dep(self) -> Rc<dyn Dep>;
}

#[duplicate::duplicate_item(
	Ty body;
	[ Value<T> ] [ Rc::new(self) ];
	[ &'_ Value<T> ] [ Rc::new(self.clone()) ];
)]
impl<T> IntoDep for Ty
where
	T: Clone + PartialEq + Nullable + 'static,
{
	fn into_dep(self) -> Rc<dyn Dep> {
		body
	}
}

impl IntoDep for Rc<dyn Dep> {
	fn into_dep(self) -> Rc<dyn Dep> {
		self
	}
}

/// Effect dependencies
#[derive(Clone, Default)]
pub enum Deps {
	/// No dependencies, the effect runs on every trigger
	#[default]
	Always,

	/// Run only when any of these dependencies change
	On(Vec<Rc<dyn Dep>>),
}

impl Deps {
	/// Returns the number of dependencies, or `None`, if always running
	#[must_use]
	pub fn count(&self) -> Option<usize> {
		match self {
			Self::Always => None,
			Self::On(deps) => Some(deps.len()),
		}
	}
}

impl fmt::Debug for Deps {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Always => f.pad("Always"),
			Self::On(deps) => f.debug_tuple("On").field(&deps.len()).finish(),
		}
	}
}

impl<D: IntoDep> FromIterator<D> for Deps {
	fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
		Self::On(iter.into_iter().map(IntoDep::into_dep).collect())
	}
}

/// Creates a list of effect dependencies.
///
/// `deps![]` never re-runs the effect after it first ran,
/// while `deps![a, b]` re-runs it whenever `a` or `b` change.
///
/// Each dependency must be a [`Value<T>`](crate::Value) (or a reference to one)
/// with `T: Clone + PartialEq + Nullable`, see [`Nullable`](crate::Nullable).
#[macro_export]
macro_rules! deps {
	() => {
		$crate::Deps::On(::std::vec::Vec::new())
	};

	($($dep:expr),+ $(,)?) => {
		$crate::Deps::On(::std::vec![ $( $crate::IntoDep::into_dep($dep) ),+ ])
	};
}
