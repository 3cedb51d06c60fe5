//! Non-atomic reference-counted handle.
//!
//! [`Shared`] is the handle through which several [`SocowVec`](crate::SocowVec)
//! values alias the same heap buffer. The count lives next to the value in a single
//! allocation and is a plain [`Cell`], so the handle is neither `Send` nor `Sync`.
use core::{
	cell::Cell,
	convert::Infallible,
	fmt,
	marker::PhantomData,
	ops::Deref,
	ptr::NonNull
};

struct SharedBox<T> {
	count: Cell<usize>,
	value: T
}

/// Shared ownership of a `T`, freed when the last handle is dropped.
///
/// Dereferencing gives shared access only. Mutable access requires the handle to be
/// the sole owner ([`get_mut`](Shared::get_mut)), or goes through a copy-on-write
/// step ([`make_mut_with`](Shared::make_mut_with)).
pub struct Shared<T> {
	ptr: NonNull<SharedBox<T>>,
	marker: PhantomData<SharedBox<T>>
}

static_assertions::assert_not_impl_any!(Shared<u8>: Send, Sync);
static_assertions::assert_eq_size!(Shared<u8>, usize);

impl<T> Shared<T> {
	/// Moves `value` into a new allocation with a count of 1.
	pub fn new(value: T) -> Self {
		let inner = Box::new(SharedBox {
			count: Cell::new(1),
			value
		});

		Shared {
			ptr: NonNull::from(Box::leak(inner)),
			marker: PhantomData
		}
	}

	#[inline]
	fn inner(&self) -> &SharedBox<T> {
		// SAFETY: the box stays alive as long as any handle does.
		unsafe { self.ptr.as_ref() }
	}

	/// Number of handles currently pointing at the value.
	#[inline]
	pub fn use_count(&self) -> usize {
		self.inner().count.get()
	}

	/// Returns `true` if this handle is the only owner.
	#[inline]
	pub fn is_unique(&self) -> bool {
		self.use_count() == 1
	}

	/// Returns `true` if both handles point at the same value.
	#[inline]
	pub fn ptr_eq(this: &Self, other: &Self) -> bool {
		this.ptr == other.ptr
	}

	/// Returns a mutable reference to the value if this handle is the only owner.
	#[inline]
	pub fn get_mut(this: &mut Self) -> Option<&mut T> {
		if this.is_unique() {
			// SAFETY: no other handle can observe the value.
			unsafe { Some(&mut this.ptr.as_mut().value) }
		} else {
			None
		}
	}

	/// Returns a mutable reference to the value, first detaching this handle
	/// onto `copy(&value)` if the value is shared.
	///
	/// The other owners keep the original value. If `copy` fails or panics, this
	/// handle is left untouched.
	pub fn try_make_mut_with<F, E>(this: &mut Self, copy: F) -> Result<&mut T, E> where F: FnOnce(&T) -> Result<T, E> {
		if !this.is_unique() {
			*this = Shared::new(copy(&**this)?);
		}

		// SAFETY: the handle is now the only owner.
		unsafe { Ok(&mut this.ptr.as_mut().value) }
	}

	/// Infallible version of [`try_make_mut_with`](Shared::try_make_mut_with).
	#[inline]
	pub fn make_mut_with<F>(this: &mut Self, copy: F) -> &mut T where F: FnOnce(&T) -> T {
		match Self::try_make_mut_with(this, |value| Ok::<T, Infallible>(copy(value))) {
			Ok(value) => value,
			Err(e) => match e {}
		}
	}

	/// Returns a mutable reference to the value, cloning it first if it is shared.
	#[inline]
	pub fn make_mut(this: &mut Self) -> &mut T where T: Clone {
		Self::make_mut_with(this, T::clone)
	}

	/// Returns the inner value if this handle is the only owner, or the handle otherwise.
	pub fn try_unwrap(this: Self) -> Result<T, Self> {
		if this.is_unique() {
			let ptr = this.ptr;
			core::mem::forget(this);
			// SAFETY: we were the last handle, the box is ours to reclaim.
			let inner = unsafe { Box::from_raw(ptr.as_ptr()) };
			Ok(inner.value)
		} else {
			Err(this)
		}
	}
}

impl<T> Clone for Shared<T> {
	/// Creates another handle to the same value. Never allocates.
	#[inline]
	fn clone(&self) -> Self {
		let count = &self.inner().count;
		match count.get().checked_add(1) {
			Some(n) => count.set(n),
			None => std::process::abort()
		}

		Shared {
			ptr: self.ptr,
			marker: PhantomData
		}
	}
}

impl<T> Drop for Shared<T> {
	fn drop(&mut self) {
		let count = &self.inner().count;
		let n = count.get() - 1;
		count.set(n);

		if n == 0 {
			// SAFETY: this was the last handle.
			unsafe { drop(Box::from_raw(self.ptr.as_ptr())) }
		}
	}
}

impl<T> Deref for Shared<T> {
	type Target = T;

	#[inline]
	fn deref(&self) -> &T {
		&self.inner().value
	}
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::rc::Rc;

	#[test]
	fn clone_and_drop_track_count() {
		let a = Shared::new(5);
		assert_eq!(a.use_count(), 1);

		let b = a.clone();
		let c = b.clone();
		assert_eq!(a.use_count(), 3);
		assert!(Shared::ptr_eq(&a, &c));

		drop(b);
		assert_eq!(c.use_count(), 2);
		drop(a);
		assert!(c.is_unique());
		assert_eq!(*c, 5);
	}

	#[test]
	fn last_handle_frees_value() {
		let witness = Rc::new(());
		let a = Shared::new(witness.clone());
		let b = a.clone();
		assert_eq!(Rc::strong_count(&witness), 2);

		drop(a);
		assert_eq!(Rc::strong_count(&witness), 2);
		drop(b);
		assert_eq!(Rc::strong_count(&witness), 1);
	}

	#[test]
	fn get_mut_requires_uniqueness() {
		let mut a = Shared::new(vec![1]);
		Shared::get_mut(&mut a).unwrap().push(2);

		let b = a.clone();
		assert!(Shared::get_mut(&mut a).is_none());
		drop(b);
		assert_eq!(Shared::get_mut(&mut a).unwrap(), &vec![1, 2]);
	}

	#[test]
	fn make_mut_detaches_shared_value() {
		let mut a = Shared::new(vec![1, 2, 3]);
		let b = a.clone();

		Shared::make_mut(&mut a)[0] = 10;
		assert!(!Shared::ptr_eq(&a, &b));
		assert!(a.is_unique());
		assert!(b.is_unique());
		assert_eq!(*a, vec![10, 2, 3]);
		assert_eq!(*b, vec![1, 2, 3]);

		let before = &*a as *const Vec<i32>;
		Shared::make_mut_with(&mut a, |_| unreachable!()).push(4);
		assert_eq!(&*a as *const Vec<i32>, before);
	}

	#[test]
	fn try_unwrap_only_when_unique() {
		let a = Shared::new(String::from("x"));
		let b = a.clone();

		let a = Shared::try_unwrap(a).unwrap_err();
		drop(b);
		assert_eq!(Shared::try_unwrap(a).unwrap(), "x");
	}
}
