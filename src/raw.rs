use core::{
	alloc::Layout,
	marker::PhantomData,
	mem,
	ptr::NonNull
};
use std::alloc::{
	alloc,
	dealloc,
	handle_alloc_error
};
use crate::ReserveError;

/// Owned, uninitialized heap block of `capacity` slots.
///
/// Dropping a `RawBuf` frees the block without touching its slots: whoever
/// initialized elements in it is responsible for dropping them first.
///
/// A `RawBuf` of capacity 0 holds a dangling pointer and owns no allocation.
pub struct RawBuf<T> {
	ptr: NonNull<T>,
	capacity: usize,
	marker: PhantomData<T>
}

impl<T> Drop for RawBuf<T> {
	fn drop(&mut self) {
		if let Some((ptr, layout)) = self.current_memory() {
			// SAFETY: `current_memory` only reports blocks we allocated with this layout.
			unsafe { dealloc(ptr.as_ptr(), layout) }
		}
	}
}

impl<T> RawBuf<T> {
	const IS_ZST: bool = mem::size_of::<T>() == 0;

	/// Creates an empty `RawBuf` without allocating.
	#[inline]
	pub const fn new() -> Self {
		RawBuf {
			ptr: NonNull::dangling(),
			capacity: 0,
			marker: PhantomData
		}
	}

	/// Allocates a block of exactly `capacity` slots.
	///
	/// # Panics
	///
	/// Panics if the requested size overflows. Aborts through
	/// [`handle_alloc_error`] if the allocator fails.
	#[inline]
	pub fn with_capacity(capacity: usize) -> Self {
		handle_reserve(Self::try_with_capacity(capacity))
	}

	/// The same as `with_capacity`, but returns on errors instead of panicking or aborting.
	pub fn try_with_capacity(capacity: usize) -> Result<Self, ReserveError> {
		if capacity == 0 || Self::IS_ZST {
			return Ok(Self::new())
		}

		let layout = layout_for::<T>(capacity)?;
		// SAFETY: `layout` has a non-zero size.
		let ptr = unsafe { alloc(layout) };
		match NonNull::new(ptr) {
			Some(ptr) => Ok(RawBuf {
				ptr: ptr.cast(),
				capacity,
				marker: PhantomData
			}),
			None => Err(ReserveError::AllocError { layout })
		}
	}

	/// Number of slots in the block.
	///
	/// Zero-sized types never allocate and report `usize::MAX`.
	#[inline]
	pub fn capacity(&self) -> usize {
		if Self::IS_ZST {
			usize::MAX
		} else {
			self.capacity
		}
	}

	/// Returns a raw pointer to the first slot.
	///
	/// The pointer is dangling if nothing is allocated.
	#[inline]
	pub fn as_ptr(&self) -> *mut T {
		self.ptr.as_ptr()
	}

	/// Returns the current allocated memory and layout.
	///
	/// Returns `None` if nothing is allocated or if the size of `T` is 0.
	fn current_memory(&self) -> Option<(NonNull<u8>, Layout)> {
		if Self::IS_ZST || self.capacity == 0 {
			None
		} else {
			// We have an allocated chunk of memory, so we can bypass runtime
			// checks to get our current layout.
			unsafe {
				let align = mem::align_of::<T>();
				let size = mem::size_of::<T>() * self.capacity;
				let layout = Layout::from_size_align_unchecked(size, align);
				Some((self.ptr.cast(), layout))
			}
		}
	}
}

impl<T> Default for RawBuf<T> {
	fn default() -> Self {
		Self::new()
	}
}

/// Layout of a block of `capacity` slots of `T`.
#[inline]
pub(crate) fn layout_for<T>(capacity: usize) -> Result<Layout, ReserveError> {
	let layout = Layout::array::<T>(capacity).map_err(|_| ReserveError::CapacityOverflow)?;
	alloc_guard(layout.size())?;
	Ok(layout)
}

// Central function for reserve error handling.
#[inline]
pub(crate) fn handle_reserve<T>(result: Result<T, ReserveError>) -> T {
	match result {
		Err(ReserveError::CapacityOverflow) => capacity_overflow(),
		Err(ReserveError::AllocError { layout }) => handle_alloc_error(layout),
		Ok(t) => t
	}
}

// Blocks never exceed `isize::MAX` bytes.
#[inline]
fn alloc_guard(alloc_size: usize) -> Result<(), ReserveError> {
	if usize::BITS < 64 && alloc_size > isize::MAX as usize {
		Err(ReserveError::CapacityOverflow)
	} else {
		Ok(())
	}
}

// Single panic site for every capacity overflow.
#[cold]
pub(crate) fn capacity_overflow() -> ! {
	panic!("capacity overflow");
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_does_not_allocate() {
		let raw = RawBuf::<u64>::new();
		assert_eq!(raw.capacity(), 0);
		assert!(raw.current_memory().is_none());

		let raw = RawBuf::<u64>::with_capacity(0);
		assert_eq!(raw.capacity(), 0);
	}

	#[test]
	fn allocates_exact_capacity() {
		let raw = RawBuf::<u64>::with_capacity(7);
		assert_eq!(raw.capacity(), 7);
		let (_, layout) = raw.current_memory().unwrap();
		assert_eq!(layout.size(), 7 * 8);
		assert_eq!(layout.align(), mem::align_of::<u64>());
	}

	#[test]
	fn zero_sized_types_never_allocate() {
		let raw = RawBuf::<()>::with_capacity(1000);
		assert_eq!(raw.capacity(), usize::MAX);
		assert!(raw.current_memory().is_none());
	}

	#[test]
	fn overflowing_capacity_is_reported() {
		assert_eq!(RawBuf::<u64>::try_with_capacity(usize::MAX).err(), Some(ReserveError::CapacityOverflow));
	}

	#[test]
	#[should_panic(expected = "capacity overflow")]
	fn overflowing_capacity_panics() {
		let _ = RawBuf::<u64>::with_capacity(usize::MAX);
	}
}
