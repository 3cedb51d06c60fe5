//! Owning, contiguous, growable array.
//!
//! [`Buffer`] is the heap storage a [`SocowVec`](crate::SocowVec) switches to once
//! it outgrows its inline slots. It grows geometrically (`2 * capacity + 1`),
//! only shrinks on request, and every reallocation is done in two phases:
//! the new block is allocated and filled first, the old one is released last.
//! A failed allocation or a panicking element clone leaves the buffer untouched.
use core::{
	cmp,
	fmt,
	ops::{
		Bound,
		Deref,
		DerefMut,
		Range,
		RangeBounds
	},
	ptr,
	slice
};
use crate::{
	raw::{
		handle_reserve,
		RawBuf
	},
	ReserveError
};

/// Contiguous growable array type with manual capacity control.
pub struct Buffer<T> {
	raw: RawBuf<T>,
	len: usize
}

impl<T> Drop for Buffer<T> {
	fn drop(&mut self) {
		unsafe {
			// drop every element, `raw` frees the memory.
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), self.len))
		}
	}
}

impl<T> Buffer<T> {
	/// Creates a new empty buffer. Does not allocate.
	#[inline]
	pub const fn new() -> Self {
		Buffer {
			raw: RawBuf::new(),
			len: 0
		}
	}

	/// Creates an empty buffer with room for exactly `capacity` elements.
	///
	/// # Panics
	///
	/// Panics if the new capacity overflows.
	#[inline]
	pub fn with_capacity(capacity: usize) -> Self {
		handle_reserve(Self::try_with_capacity(capacity))
	}

	/// The same as `with_capacity`, but returns on errors instead of panicking or aborting.
	#[inline]
	pub fn try_with_capacity(capacity: usize) -> Result<Self, ReserveError> {
		Ok(Buffer {
			raw: RawBuf::try_with_capacity(capacity)?,
			len: 0
		})
	}

	/// Moves `len` elements starting at `src` into a new buffer of the given capacity.
	///
	/// On error nothing is read from `src`.
	///
	/// ## Safety
	///
	/// `src` must point to `len` initialized elements. On success, they are owned by
	/// the returned buffer and the caller must treat the source slots as uninitialized.
	/// `capacity` must be at least `len`.
	pub unsafe fn from_raw_moved(src: *const T, len: usize, capacity: usize) -> Result<Self, ReserveError> {
		debug_assert!(capacity >= len);
		let raw = RawBuf::try_with_capacity(capacity)?;
		ptr::copy_nonoverlapping(src, raw.as_ptr(), len);
		Ok(Buffer { raw, len })
	}

	/// Returns the number of elements in the buffer.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the number of elements the buffer can hold without reallocating.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.raw.capacity()
	}

	/// Forces the length of the buffer to `len`.
	///
	/// ## Safety
	///
	/// `len` must not exceed the capacity and the first `len` slots must be initialized.
	/// Elements beyond `len` are not dropped.
	#[inline]
	pub unsafe fn set_len(&mut self, len: usize) {
		debug_assert!(len <= self.capacity());
		self.len = len
	}

	/// Returns a raw pointer to the buffer's storage.
	///
	/// The pointer is valid until the next reallocating operation.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.raw.as_ptr()
	}

	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.raw.as_ptr()
	}

	#[inline]
	pub fn as_slice(&self) -> &[T] {
		unsafe {
			slice::from_raw_parts(self.as_ptr(), self.len)
		}
	}

	#[inline]
	pub fn as_mut_slice(&mut self) -> &mut [T] {
		unsafe {
			slice::from_raw_parts_mut(self.as_mut_ptr(), self.len)
		}
	}

	/// Appends an element to the back of the buffer.
	///
	/// When the buffer is full, it is reallocated to `2 * capacity + 1` slots.
	///
	/// # Panics
	///
	/// Panics if the new capacity overflows.
	#[inline]
	pub fn push(&mut self, value: T) {
		if self.len == self.capacity() {
			handle_reserve(self.grow_one());
		}

		unsafe {
			ptr::write(self.as_mut_ptr().add(self.len), value);
		}
		self.len += 1;
	}

	/// Removes the last element and returns it, or [`None`] if the buffer is empty.
	#[inline]
	pub fn pop(&mut self) -> Option<T> {
		if self.len == 0 {
			None
		} else {
			self.len -= 1;
			unsafe {
				Some(ptr::read(self.as_ptr().add(self.len)))
			}
		}
	}

	/// Inserts an element at position `index`, shifting all elements after it to the right.
	///
	/// The element is pushed at the end first and then rotated into place,
	/// so a failed growth leaves the buffer unchanged.
	///
	/// # Panics
	///
	/// Panics if `index > len`.
	pub fn insert(&mut self, index: usize, element: T) {
		let len = self.len;
		if index > len {
			panic!("insertion index (is {}) should be <= len (which is {})", index, len);
		}

		self.push(element);
		self.as_mut_slice()[index..].rotate_right(1);
	}

	/// Removes and returns the element at position `index`, shifting all elements after it
	/// to the left.
	///
	/// # Panics
	///
	/// Panics if `index` is out of bounds.
	pub fn remove(&mut self, index: usize) -> T {
		let len = self.len;
		if index >= len {
			panic!("removal index (is {}) should be < len (is {})", index, len);
		}

		self.as_mut_slice()[index..].rotate_left(1);
		self.len -= 1;
		unsafe {
			ptr::read(self.as_ptr().add(self.len))
		}
	}

	/// Removes the elements in `range`, keeping the relative order of the others.
	///
	/// Returns the start of the range, which is now the index of the first element
	/// that followed it. An empty range is a no-op.
	///
	/// # Panics
	///
	/// Panics if the range is decreasing or out of bounds.
	pub fn erase<R: RangeBounds<usize>>(&mut self, range: R) -> usize {
		let Range { start, end } = range_of(range, self.len);
		if start != end {
			self.as_mut_slice()[start..].rotate_left(end - start);
			self.truncate(self.len - (end - start));
		}

		start
	}

	/// Shortens the buffer, keeping the first `len` elements and dropping the rest.
	///
	/// Has no effect if `len` is not smaller than the current length.
	pub fn truncate(&mut self, len: usize) {
		if len >= self.len {
			return
		}

		unsafe {
			let remaining_len = self.len - len;
			let s = ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(len), remaining_len);
			self.len = len;
			ptr::drop_in_place(s);
		}
	}

	/// Drops every element. The capacity is unchanged.
	#[inline]
	pub fn clear(&mut self) {
		self.truncate(0)
	}

	/// Makes sure the buffer can hold `new_capacity` elements in total.
	///
	/// Reallocates to exactly `new_capacity` if the current capacity is smaller,
	/// does nothing otherwise.
	///
	/// # Panics
	///
	/// Panics if the new capacity overflows.
	#[inline]
	pub fn reserve(&mut self, new_capacity: usize) {
		handle_reserve(self.try_reserve(new_capacity))
	}

	/// The same as `reserve`, but returns on errors instead of panicking or aborting.
	pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), ReserveError> {
		if new_capacity > self.capacity() {
			self.realloc(new_capacity)
		} else {
			Ok(())
		}
	}

	/// Reallocates the buffer so that its capacity is exactly its length.
	pub fn shrink_to_fit(&mut self) {
		if self.len < self.capacity() {
			handle_reserve(self.realloc(self.len))
		}
	}

	fn next_capacity(&self) -> Result<usize, ReserveError> {
		self.capacity()
			.checked_mul(2)
			.and_then(|capacity| capacity.checked_add(1))
			.ok_or(ReserveError::CapacityOverflow)
	}

	#[cold]
	fn grow_one(&mut self) -> Result<(), ReserveError> {
		let capacity = self.next_capacity()?;
		self.realloc(capacity)
	}

	/// Moves the elements into a new block of exactly `new_capacity` slots.
	fn realloc(&mut self, new_capacity: usize) -> Result<(), ReserveError> {
		debug_assert!(new_capacity >= self.len);
		let raw = RawBuf::try_with_capacity(new_capacity)?;
		unsafe {
			ptr::copy_nonoverlapping(self.raw.as_ptr(), raw.as_ptr(), self.len);
		}

		// the old block only holds moved-from slots now.
		self.raw = raw;
		Ok(())
	}
}

impl<T: Clone> Buffer<T> {
	/// Clones the slice into a new buffer with exactly `len` slots.
	#[inline]
	pub fn from_slice(s: &[T]) -> Self {
		handle_reserve(Self::try_from_slice_with_capacity(s, s.len()))
	}

	/// Clones the slice into a new buffer with room for at least `capacity` elements.
	///
	/// If cloning an element panics, the elements cloned so far are dropped and the
	/// new block is freed.
	pub fn try_from_slice_with_capacity(s: &[T], capacity: usize) -> Result<Self, ReserveError> {
		let capacity = cmp::max(capacity, s.len());
		let mut buffer: Buffer<T> = Buffer::try_with_capacity(capacity)?;

		// `buffer.len` only counts fully cloned elements, so unwinding drops exactly those.
		for item in s {
			unsafe {
				ptr::write(buffer.as_mut_ptr().add(buffer.len), item.clone());
			}
			buffer.len += 1;
		}

		Ok(buffer)
	}

	/// Clones the buffer into a new block of at least `capacity` slots.
	#[inline]
	pub fn clone_with_capacity(&self, capacity: usize) -> Self {
		handle_reserve(Self::try_from_slice_with_capacity(self.as_slice(), capacity))
	}
}

/// Resolves `range` against a sequence of length `len`.
pub(crate) fn range_of<R: RangeBounds<usize>>(range: R, len: usize) -> Range<usize> {
	let start = match range.start_bound() {
		Bound::Included(&start) => start,
		Bound::Excluded(&start) => start.checked_add(1).unwrap_or_else(|| panic!("attempted to index slice from after maximum usize")),
		Bound::Unbounded => 0
	};

	let end = match range.end_bound() {
		Bound::Included(&end) => end.checked_add(1).unwrap_or_else(|| panic!("attempted to index slice up to maximum usize")),
		Bound::Excluded(&end) => end,
		Bound::Unbounded => len
	};

	if start > end {
		panic!("slice index starts at {} but ends at {}", start, end);
	}
	if end > len {
		panic!("range end index {} out of range for slice of length {}", end, len);
	}

	start..end
}

impl<T: Clone> Clone for Buffer<T> {
	/// The clone's capacity is the source's length.
	fn clone(&self) -> Self {
		self.clone_with_capacity(self.len)
	}
}

impl<T> Default for Buffer<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Deref for Buffer<T> {
	type Target = [T];

	#[inline]
	fn deref(&self) -> &[T] {
		self.as_slice()
	}
}

impl<T> DerefMut for Buffer<T> {
	#[inline]
	fn deref_mut(&mut self) -> &mut [T] {
		self.as_mut_slice()
	}
}

impl<T: fmt::Debug> fmt::Debug for Buffer<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self.as_slice(), f)
	}
}
