use core::{
	borrow::{
		Borrow,
		BorrowMut
	},
	cmp::{
		self,
		Ordering
	},
	fmt,
	hash::{
		Hash,
		Hasher
	},
	iter::FusedIterator,
	mem::{
		ManuallyDrop,
		MaybeUninit
	},
	ops::{
		Deref,
		DerefMut,
		Range,
		RangeBounds
	},
	ptr,
	slice
};
use tracing::trace;
#[cfg(feature = "serde")]
use core::marker::PhantomData;
#[cfg(feature = "serde")]
use serde::{
	de::{
		Deserialize,
		Deserializer,
		SeqAccess,
		Visitor
	},
	ser::{
		Serialize,
		SerializeSeq,
		Serializer
	}
};
use crate::{
	buffer::{
		range_of,
		Buffer
	},
	raw::handle_reserve,
	shared::Shared,
	ReserveError
};

/// Value of `SocowVec::len` once the elements live in a shared buffer.
const SPILLED: usize = usize::MAX;

/// Inner data storage.
///
/// The active field is selected by `SocowVec::len`: `inline` until the vector
/// spills, `shared` afterwards.
union Data<T, const N: usize> {
	/// Elements stored in place.
	inline: ManuallyDrop<[MaybeUninit<T>; N]>,

	/// Handle to a heap buffer, possibly shared with other vectors.
	shared: ManuallyDrop<Shared<Buffer<T>>>
}

impl<T, const N: usize> Data<T, N> {
	#[inline]
	const fn uninit() -> Data<T, N> {
		Data {
			inline: ManuallyDrop::new(
				// SAFETY: An uninitialized `[MaybeUninit<_>; N]` is valid.
				unsafe { MaybeUninit::<[MaybeUninit<T>; N]>::uninit().assume_init() }
			)
		}
	}

	#[inline]
	fn shared(buffer: Shared<Buffer<T>>) -> Data<T, N> {
		Data {
			shared: ManuallyDrop::new(buffer)
		}
	}
}

/// Contiguous growable array type that is either stored inline or in a shared heap buffer.
///
/// This type behaves just like a `Vec<T>` but with two optimizations.
/// Just like [`SmallVec`](https://crates.io/crates/smallvec), up to `N` elements are
/// stored in place, without any heap allocation.
/// Past `N` elements, the data moves to a heap buffer that is reference counted:
/// cloning the vector then only clones the handle, and the elements are copied by the
/// first clone that mutates them (copy-on-write).
///
/// Moving to the heap is one-way. Removing elements never brings them back in place;
/// only replacing the whole value (assignment, [`core::mem::take`], ...) does.
///
/// Reading (`len`, `capacity`, `as_ptr`, indexing through `&self`, ...) never copies.
/// Every method taking `&mut self` that may touch the elements first makes sure this
/// vector is the sole owner of its buffer, which is why these methods require
/// `T: Clone`.
///
/// The reference count is not atomic: a `SocowVec` is neither `Send` nor `Sync`.
///
/// # Examples
///
/// ```
/// # use socow_vec::SocowVec;
/// let mut a: SocowVec<u32, 3> = SocowVec::new();
/// a.push(1);
/// a.push(2);
/// a.push(3);
/// assert!(!a.is_spilled()); // three elements fit in place.
///
/// a.push(4);
/// assert!(a.is_spilled()); // the fourth one moved everything to the heap.
///
/// let mut b = a.clone(); // only the handle is cloned.
/// assert_eq!(a.as_ptr(), b.as_ptr());
///
/// b[0] = 10; // because it is modified, the data is copied here.
/// assert_ne!(a.as_ptr(), b.as_ptr());
/// assert_eq!(a, [1, 2, 3, 4]);
/// assert_eq!(b, [10, 2, 3, 4]);
/// ```
pub struct SocowVec<T, const N: usize> {
	/// Number of elements stored inline, or `SPILLED`.
	len: usize,

	/// The actual data (or a handle to the actual data).
	data: Data<T, N>
}

static_assertions::assert_eq_size!(SocowVec<usize, 1>, [usize; 2]);
static_assertions::assert_not_impl_any!(SocowVec<u8, 4>: Send, Sync);

impl<T, const N: usize> Drop for SocowVec<T, N> {
	fn drop(&mut self) {
		unsafe {
			if self.is_spilled() {
				ManuallyDrop::drop(&mut self.data.shared)
			} else {
				ptr::drop_in_place(self.inline_slice_mut())
			}
		}
	}
}

impl<T, const N: usize> SocowVec<T, N> {
	/// Creates a new empty `SocowVec`.
	///
	/// The vector will not allocate until more than `N` elements are pushed onto it.
	#[inline]
	pub const fn new() -> Self {
		SocowVec {
			len: 0,
			data: Data::uninit()
		}
	}

	/// Number of elements that can be stored in place.
	#[inline]
	pub const fn inline_capacity() -> usize {
		N
	}

	/// Returns `true` if the data lives in a heap buffer,
	/// `false` if it is stored in place.
	#[inline]
	pub fn is_spilled(&self) -> bool {
		self.len == SPILLED
	}

	/// Returns the number of elements in the vector.
	#[inline]
	pub fn len(&self) -> usize {
		if self.is_spilled() {
			unsafe { self.shared().len() }
		} else {
			self.len
		}
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the number of elements the vector can hold without reallocating.
	///
	/// This is `N` while the data is stored in place.
	#[inline]
	pub fn capacity(&self) -> usize {
		if self.is_spilled() {
			unsafe { self.shared().capacity() }
		} else {
			N
		}
	}

	/// Number of vectors sharing this vector's heap buffer, including itself.
	///
	/// Always 1 while the data is stored in place.
	#[inline]
	pub fn use_count(&self) -> usize {
		if self.is_spilled() {
			unsafe { self.shared().use_count() }
		} else {
			1
		}
	}

	/// Returns a raw pointer to the vector's buffer.
	///
	/// The caller must ensure that the vector outlives the pointer this
	/// function returns, or else it will end up pointing to garbage.
	/// Modifying the vector may cause its buffer to be reallocated or unshared,
	/// which would also make any pointers to it invalid.
	///
	/// The memory may be shared with other vectors: it must never be written to
	/// through this pointer. Use [`as_mut_ptr`](SocowVec::as_mut_ptr) for that.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		if self.is_spilled() {
			unsafe { self.shared().as_ptr() }
		} else {
			self.inline_ptr()
		}
	}

	/// Extracts a slice containing the entire vector.
	///
	/// Equivalent to `&s[..]`. Never copies.
	#[inline]
	pub fn as_slice(&self) -> &[T] {
		unsafe {
			slice::from_raw_parts(self.as_ptr(), self.len())
		}
	}

	/// Clears the vector, removing all values.
	///
	/// A spilled vector stays spilled. If it is the sole owner of its buffer, it
	/// keeps its capacity. If the buffer is shared, this vector detaches onto a new
	/// buffer without any slot (nothing is allocated for elements) and the other
	/// owners keep the elements.
	pub fn clear(&mut self) {
		if self.is_spilled() {
			let shared = unsafe { &mut *self.data.shared };
			match Shared::get_mut(shared) {
				Some(buffer) => buffer.clear(),
				None => {
					trace!(owners = shared.use_count(), len = shared.len(), "detaching from a shared buffer to clear it");
					*shared = Shared::new(Buffer::new())
				}
			}
		} else {
			unsafe { self.truncate_inline(0) }
		}
	}

	/// ## Safety
	///
	/// The data must be spilled.
	#[inline]
	unsafe fn shared(&self) -> &Shared<Buffer<T>> {
		debug_assert!(self.is_spilled());
		&*self.data.shared
	}

	#[inline]
	fn inline_ptr(&self) -> *const T {
		unsafe { (*self.data.inline).as_ptr() as *const T }
	}

	#[inline]
	fn inline_mut_ptr(&mut self) -> *mut T {
		unsafe { (*self.data.inline).as_mut_ptr() as *mut T }
	}

	/// ## Safety
	///
	/// The data must be stored in place.
	#[inline]
	unsafe fn inline_slice_mut(&mut self) -> &mut [T] {
		debug_assert!(!self.is_spilled());
		slice::from_raw_parts_mut(self.inline_mut_ptr(), self.len)
	}

	/// Pointer to the elements for a caller that knows the storage is not shared.
	///
	/// ## Safety
	///
	/// The data must be stored in place, or the buffer must be unique.
	#[inline]
	unsafe fn unique_mut_ptr(&mut self) -> *mut T {
		if self.is_spilled() {
			debug_assert_eq!(self.use_count(), 1);
			self.shared().as_ptr() as *mut T
		} else {
			self.inline_mut_ptr()
		}
	}

	/// ## Safety
	///
	/// The data must be stored in place.
	unsafe fn truncate_inline(&mut self, len: usize) {
		if len < self.len {
			let remaining_len = self.len - len;
			let s = ptr::slice_from_raw_parts_mut(self.inline_mut_ptr().add(len), remaining_len);
			self.len = len;
			ptr::drop_in_place(s);
		}
	}

	/// Moves the inline elements into a new, unshared buffer of `capacity` slots.
	///
	/// On error the vector is left untouched.
	fn try_spill(&mut self, capacity: usize) -> Result<(), ReserveError> {
		debug_assert!(!self.is_spilled());
		let len = self.len;
		let buffer = unsafe { Buffer::from_raw_moved(self.inline_ptr(), len, capacity)? };
		trace!(len, capacity, "moved inline elements to the heap");

		// the inline slots were moved out and must not be dropped.
		self.data = Data::shared(Shared::new(buffer));
		self.len = SPILLED;
		Ok(())
	}

	/// Spills a full inline array, growing it like a full [`Buffer`] would.
	#[cold]
	fn try_spill_full(&mut self) -> Result<(), ReserveError> {
		let capacity = N.checked_mul(2)
			.and_then(|capacity| capacity.checked_add(1))
			.ok_or(ReserveError::CapacityOverflow)?;
		self.try_spill(capacity)
	}
}

impl<T, const N: usize> SocowVec<T, N> where T: Clone {
	/// Creates a `SocowVec` by cloning the elements of a slice.
	///
	/// The data is stored in place if `s.len() <= N`. Otherwise it is cloned into
	/// a heap buffer of exactly `s.len()` slots.
	#[inline]
	pub fn from_slice(s: &[T]) -> Self {
		let mut vec = Self::new();
		vec.extend_from_slice(s);
		vec
	}

	/// Makes this vector the sole owner of its heap buffer (unsharing it if needed),
	/// with at least `min_capacity` slots if a copy is made.
	///
	/// The copy keeps the shared buffer's capacity.
	fn try_unique_buffer(&mut self, min_capacity: usize) -> Result<&mut Buffer<T>, ReserveError> {
		debug_assert!(self.is_spilled());
		let shared = unsafe { &mut *self.data.shared };
		Shared::try_make_mut_with(shared, |buffer| {
			let capacity = cmp::max(buffer.capacity(), min_capacity);
			trace!(len = buffer.len(), capacity, "copying shared buffer before mutation");
			Buffer::try_from_slice_with_capacity(buffer, capacity)
		})
	}

	#[inline]
	fn unique_buffer(&mut self) -> &mut Buffer<T> {
		handle_reserve(self.try_unique_buffer(0))
	}

	/// Unique buffer with room for one more element.
	///
	/// A full shared buffer is copied straight into a grown block, so the copy is
	/// not reallocated again by the insertion that follows.
	fn unique_buffer_for_one_more(&mut self) -> &mut Buffer<T> {
		let len = self.len();
		let capacity = self.capacity();
		let min_capacity = if len < capacity {
			0
		} else {
			handle_reserve(
				capacity.checked_mul(2)
					.and_then(|capacity| capacity.checked_add(1))
					.ok_or(ReserveError::CapacityOverflow)
			)
		};

		handle_reserve(self.try_unique_buffer(min_capacity))
	}

	/// Returns an unsafe mutable pointer to the vector's buffer.
	///
	/// If the buffer is shared, it is copied first.
	///
	/// The caller must ensure that the vector outlives the pointer this
	/// function returns, or else it will end up pointing to garbage.
	/// Modifying the vector may cause its buffer to be reallocated,
	/// which would also make any pointers to it invalid.
	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		if self.is_spilled() {
			self.unique_buffer().as_mut_ptr()
		} else {
			self.inline_mut_ptr()
		}
	}

	/// Extracts a mutable slice of the entire vector.
	///
	/// Equivalent to `&mut s[..]`. If the buffer is shared, it is copied first.
	#[inline]
	pub fn as_mut_slice(&mut self) -> &mut [T] {
		if self.is_spilled() {
			self.unique_buffer().as_mut_slice()
		} else {
			unsafe { self.inline_slice_mut() }
		}
	}

	/// Appends an element to the back of a collection.
	///
	/// If the inline storage is full, the elements are moved to a new heap buffer
	/// of `2 * N + 1` slots first.
	///
	/// # Panics
	///
	/// Panics if the new capacity overflows.
	#[inline]
	pub fn push(&mut self, value: T) {
		if !self.is_spilled() {
			if self.len < N {
				unsafe {
					ptr::write(self.inline_mut_ptr().add(self.len), value);
				}
				self.len += 1;
				return
			}

			handle_reserve(self.try_spill_full())
		}

		self.unique_buffer_for_one_more().push(value)
	}

	/// Removes the last element from a vector and returns it, or [`None`] if it
	/// is empty.
	///
	/// A spilled vector stays spilled.
	#[inline]
	pub fn pop(&mut self) -> Option<T> {
		if self.is_empty() {
			None
		} else if self.is_spilled() {
			self.unique_buffer().pop()
		} else {
			self.len -= 1;
			unsafe {
				Some(ptr::read(self.inline_ptr().add(self.len)))
			}
		}
	}

	/// Inserts an element at position `index` within the vector, shifting all
	/// elements after it to the right.
	///
	/// # Panics
	///
	/// Panics if `index > len`.
	pub fn insert(&mut self, index: usize, element: T) {
		let len = self.len();
		if index > len {
			panic!("insertion index (is {}) should be <= len (which is {})", index, len);
		}

		if !self.is_spilled() {
			if len < N {
				unsafe {
					ptr::write(self.inline_mut_ptr().add(len), element);
					self.len += 1;
					self.inline_slice_mut()[index..].rotate_right(1);
				}
				return
			}

			handle_reserve(self.try_spill_full())
		}

		self.unique_buffer_for_one_more().insert(index, element)
	}

	/// Removes and returns the element at position `index` within the vector,
	/// shifting all elements after it to the left.
	///
	/// # Panics
	///
	/// Panics if `index` is out of bounds.
	pub fn remove(&mut self, index: usize) -> T {
		let len = self.len();
		if index >= len {
			panic!("removal index (is {}) should be < len (is {})", index, len);
		}

		if self.is_spilled() {
			self.unique_buffer().remove(index)
		} else {
			unsafe {
				self.inline_slice_mut()[index..].rotate_left(1);
				self.len -= 1;
				ptr::read(self.inline_ptr().add(self.len))
			}
		}
	}

	/// Removes the elements in `range`, keeping the relative order of the others.
	///
	/// Returns the start of the range, which is now the index of the first element
	/// that followed it. An empty range is a no-op and never copies a shared buffer.
	///
	/// # Panics
	///
	/// Panics if the range is decreasing or out of bounds.
	///
	/// # Example
	///
	/// ```
	/// # use socow_vec::SocowVec;
	/// let mut v: SocowVec<u8, 4> = SocowVec::from_slice(&[0, 1, 2, 3, 4, 5]);
	/// assert_eq!(v.erase(1..3), 1);
	/// assert_eq!(v, [0, 3, 4, 5]);
	/// assert!(v.is_spilled()); // no going back in place.
	/// ```
	pub fn erase<R: RangeBounds<usize>>(&mut self, range: R) -> usize {
		let Range { start, end } = range_of(range, self.len());
		if start == end {
			return start
		}

		if self.is_spilled() {
			self.unique_buffer().erase(start..end)
		} else {
			unsafe {
				self.inline_slice_mut()[start..].rotate_left(end - start);
				let len = self.len - (end - start);
				self.truncate_inline(len);
			}

			start
		}
	}

	/// Shortens the vector, keeping the first `len` elements and dropping
	/// the rest.
	///
	/// If `len` is greater than the vector's current length, this has no
	/// effect.
	///
	/// Note that this method has no effect on the allocated capacity
	/// of the vector.
	pub fn truncate(&mut self, len: usize) {
		if len >= self.len() {
			return
		}

		if self.is_spilled() {
			self.unique_buffer().truncate(len)
		} else {
			unsafe { self.truncate_inline(len) }
		}
	}

	/// Resizes the `SocowVec` in-place so that `len` is equal to `new_len`.
	///
	/// If `new_len` is greater than `len`, the `SocowVec` is extended by the
	/// difference, with each additional slot filled with `value`.
	/// If `new_len` is less than `len`, the `SocowVec` is simply truncated.
	pub fn resize(&mut self, new_len: usize, value: T) {
		let len = self.len();

		if new_len > len {
			self.reserve(new_len - len);
			for _ in len + 1..new_len {
				self.push(value.clone())
			}
			self.push(value)
		} else {
			self.truncate(new_len)
		}
	}

	/// Clones and appends all elements in a slice to the `SocowVec`.
	#[inline]
	pub fn extend_from_slice(&mut self, other: &[T]) {
		if other.is_empty() {
			return
		}

		self.reserve(other.len());
		for item in other {
			self.push(item.clone())
		}
	}

	/// The same as `reserve`, but returns on errors instead of panicking or aborting.
	///
	/// On error the vector is left untouched.
	pub fn try_reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
		let required = self.len().checked_add(additional).ok_or(ReserveError::CapacityOverflow)?;

		if required <= self.capacity() {
			Ok(())
		} else if self.is_spilled() {
			self.try_unique_buffer(required)?.try_reserve(required)
		} else {
			self.try_spill(required)
		}
	}

	/// Reserves capacity for at least `additional` more elements to be inserted
	/// in the given `SocowVec<T>`. After calling `reserve`, capacity will be
	/// greater than or equal to `self.len() + additional`, and the next
	/// `additional` pushes will not reallocate. Does nothing if capacity is
	/// already sufficient; in particular a shared buffer stays shared.
	///
	/// If the inline storage is too small, the data is moved to a heap buffer of
	/// exactly `self.len() + additional` slots.
	///
	/// # Panics
	///
	/// Panics if the new capacity overflows.
	///
	/// # Example
	///
	/// ```
	/// # use socow_vec::SocowVec;
	/// let mut v: SocowVec<u32, 3> = SocowVec::new();
	/// v.push(1);
	/// v.reserve(10);
	/// assert_eq!(v.capacity(), 11);
	/// ```
	#[inline]
	pub fn reserve(&mut self, additional: usize) {
		handle_reserve(self.try_reserve(additional))
	}

	/// Shrinks the heap buffer's capacity to the vector's length.
	///
	/// Does nothing while the data is stored in place. The data never moves back
	/// in place, even if it would fit.
	/// If the buffer is shared, this vector detaches onto a tight copy.
	pub fn shrink_to_fit(&mut self) {
		if !self.is_spilled() || self.len() == self.capacity() {
			return
		}

		let shared = unsafe { &mut *self.data.shared };
		match Shared::get_mut(shared) {
			Some(buffer) => buffer.shrink_to_fit(),
			None => {
				trace!(owners = shared.use_count(), len = shared.len(), "detaching from a shared buffer to shrink it");
				*shared = Shared::new(Buffer::from_slice(shared.as_slice()))
			}
		}
	}

	/// Converts this `SocowVec` into a `Vec`, moving or cloning its elements.
	#[inline]
	pub fn into_vec(self) -> Vec<T> {
		self.into_iter().collect()
	}
}

impl<T: Clone, const N: usize> Clone for SocowVec<T, N> {
	/// Inline elements are cloned one by one. A spilled vector only clones the
	/// handle to its buffer.
	fn clone(&self) -> Self {
		if self.is_spilled() {
			SocowVec {
				len: SPILLED,
				data: Data::shared(Shared::clone(unsafe { self.shared() }))
			}
		} else {
			let mut copy: SocowVec<T, N> = SocowVec::new();

			// `copy.len` only counts fully cloned elements, so unwinding drops exactly those.
			for item in self.as_slice() {
				unsafe {
					ptr::write(copy.inline_mut_ptr().add(copy.len), item.clone());
				}
				copy.len += 1;
			}

			copy
		}
	}
}

impl<T, const N: usize> Default for SocowVec<T, N> {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl<T, const N: usize> Deref for SocowVec<T, N> {
	type Target = [T];

	#[inline]
	fn deref(&self) -> &[T] {
		self.as_slice()
	}
}

impl<T, const N: usize> DerefMut for SocowVec<T, N> where T: Clone {
	#[inline]
	fn deref_mut(&mut self) -> &mut [T] {
		self.as_mut_slice()
	}
}

impl<T, const N: usize> AsRef<[T]> for SocowVec<T, N> {
	#[inline]
	fn as_ref(&self) -> &[T] {
		self
	}
}

impl<T, const N: usize> AsMut<[T]> for SocowVec<T, N> where T: Clone {
	#[inline]
	fn as_mut(&mut self) -> &mut [T] {
		self
	}
}

impl<T, const N: usize> Borrow<[T]> for SocowVec<T, N> {
	#[inline]
	fn borrow(&self) -> &[T] {
		self
	}
}

impl<T, const N: usize> BorrowMut<[T]> for SocowVec<T, N> where T: Clone {
	#[inline]
	fn borrow_mut(&mut self) -> &mut [T] {
		self
	}
}

impl<'v, T, const N: usize> IntoIterator for &'v SocowVec<T, N> {
	type Item = &'v T;
	type IntoIter = slice::Iter<'v, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.as_slice().iter()
	}
}

impl<'v, T, const N: usize> IntoIterator for &'v mut SocowVec<T, N> where T: Clone {
	type Item = &'v mut T;
	type IntoIter = slice::IterMut<'v, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.as_mut_slice().iter_mut()
	}
}

/// An iterator that moves out of a [`SocowVec`].
///
/// Created by its `into_iter` method. A shared buffer is copied first.
pub struct IntoIter<T, const N: usize> {
	/// Sole owner of its storage, with a length forced to 0.
	vec: SocowVec<T, N>,
	start: usize,
	end: usize
}

impl<T, const N: usize> IntoIter<T, N> {
	/// Returns the remaining items as a slice.
	#[inline]
	pub fn as_slice(&self) -> &[T] {
		unsafe {
			slice::from_raw_parts(self.vec.as_ptr().add(self.start), self.end - self.start)
		}
	}
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
	type Item = T;

	#[inline]
	fn next(&mut self) -> Option<T> {
		if self.start == self.end {
			None
		} else {
			let i = self.start;
			self.start += 1;
			unsafe { Some(ptr::read(self.vec.as_ptr().add(i))) }
		}
	}

	#[inline]
	fn size_hint(&self) -> (usize, Option<usize>) {
		let len = self.end - self.start;
		(len, Some(len))
	}
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
	#[inline]
	fn next_back(&mut self) -> Option<T> {
		if self.start == self.end {
			None
		} else {
			self.end -= 1;
			unsafe { Some(ptr::read(self.vec.as_ptr().add(self.end))) }
		}
	}
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

impl<T, const N: usize> Drop for IntoIter<T, N> {
	fn drop(&mut self) {
		unsafe {
			// only drop remaining elements, `vec` then frees its empty storage.
			let remaining = self.end - self.start;
			let ptr = self.vec.unique_mut_ptr().add(self.start);
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(ptr, remaining))
		}
	}
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for IntoIter<T, N> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
	}
}

impl<T, const N: usize> IntoIterator for SocowVec<T, N> where T: Clone {
	type Item = T;
	type IntoIter = IntoIter<T, N>;

	fn into_iter(mut self) -> Self::IntoIter {
		let end = self.len();
		unsafe {
			if self.is_spilled() {
				self.unique_buffer().set_len(0)
			} else {
				self.len = 0
			}
		}

		IntoIter {
			vec: self,
			start: 0,
			end
		}
	}
}

impl<T, const N: usize> Extend<T> for SocowVec<T, N> where T: Clone {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iterable: I) {
		let iterator = iterable.into_iter();
		let (lower, _) = iterator.size_hint();
		self.reserve(lower);

		for item in iterator {
			self.push(item)
		}
	}
}

impl<T, const N: usize> FromIterator<T> for SocowVec<T, N> where T: Clone {
	fn from_iter<I: IntoIterator<Item = T>>(iterable: I) -> Self {
		let mut vec = SocowVec::new();
		vec.extend(iterable);
		vec
	}
}

impl<T, const N: usize> From<Vec<T>> for SocowVec<T, N> {
	/// Moves the elements in place if they fit, into a tight heap buffer otherwise.
	fn from(mut vec: Vec<T>) -> SocowVec<T, N> {
		let len = vec.len();
		let mut result = SocowVec::new();

		unsafe {
			// the elements are moved out below, `vec` only frees its memory.
			vec.set_len(0);

			if len <= N {
				ptr::copy_nonoverlapping(vec.as_ptr(), result.inline_mut_ptr(), len);
				result.len = len;
			} else {
				let buffer = handle_reserve(Buffer::from_raw_moved(vec.as_ptr(), len, len));
				result.data = Data::shared(Shared::new(buffer));
				result.len = SPILLED;
			}
		}

		result
	}
}

impl<T, const N: usize, const M: usize> From<[T; M]> for SocowVec<T, N> {
	#[inline]
	fn from(array: [T; M]) -> SocowVec<T, N> {
		Vec::from(array).into()
	}
}

impl<'s, T, const N: usize> From<&'s [T]> for SocowVec<T, N> where T: Clone {
	#[inline]
	fn from(s: &'s [T]) -> SocowVec<T, N> {
		SocowVec::from_slice(s)
	}
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for SocowVec<T, N> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

impl<T: Hash, const N: usize> Hash for SocowVec<T, N> {
	#[inline]
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.as_slice().hash(state)
	}
}

macro_rules! impl_slice_eq1 {
	([$($vars:tt)*] $lhs:ty, $rhs:ty) => {
		impl<$($vars)*> PartialEq<$rhs> for $lhs where T: PartialEq<U> {
			#[inline]
			fn eq(&self, other: &$rhs) -> bool { self[..] == other[..] }
			#[inline]
			#[allow(clippy::partialeq_ne_impl)]
			fn ne(&self, other: &$rhs) -> bool { self[..] != other[..] }
		}
	}
}

impl_slice_eq1! { [T, U, const N: usize, const M: usize] SocowVec<T, N>, SocowVec<U, M> }
impl_slice_eq1! { [T, U, const N: usize] SocowVec<T, N>, Vec<U> }
impl_slice_eq1! { [T, U, const N: usize] Vec<T>, SocowVec<U, N> }
impl_slice_eq1! { [T, U, const N: usize] SocowVec<T, N>, &[U] }
impl_slice_eq1! { [T, U, const N: usize] SocowVec<T, N>, &mut [U] }
impl_slice_eq1! { [T, U, const N: usize] &[T], SocowVec<U, N> }
impl_slice_eq1! { [T, U, const N: usize, const O: usize] SocowVec<T, N>, [U; O] }
impl_slice_eq1! { [T, U, const N: usize, const O: usize] SocowVec<T, N>, &[U; O] }
impl_slice_eq1! { [T, U, const N: usize, const O: usize] [T; O], SocowVec<U, N> }

impl<T: Eq, const N: usize> Eq for SocowVec<T, N> {}

impl<T: PartialOrd, const N: usize> PartialOrd for SocowVec<T, N> {
	#[inline]
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		PartialOrd::partial_cmp(&**self, &**other)
	}
}

impl<T: Ord, const N: usize> Ord for SocowVec<T, N> {
	#[inline]
	fn cmp(&self, other: &Self) -> Ordering {
		Ord::cmp(&**self, &**other)
	}
}

#[cfg(feature = "serde")]
impl<T, const N: usize> Serialize for SocowVec<T, N> where T: Serialize {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut state = serializer.serialize_seq(Some(self.len()))?;
		for item in self {
			state.serialize_element(item)?;
		}
		state.end()
	}
}

#[cfg(feature = "serde")]
impl<'de, T, const N: usize> Deserialize<'de> for SocowVec<T, N> where T: Clone + Deserialize<'de> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_seq(SocowVecVisitor {
			marker: PhantomData
		})
	}
}

#[cfg(feature = "serde")]
struct SocowVecVisitor<T, const N: usize> {
	marker: PhantomData<T>
}

#[cfg(feature = "serde")]
impl<'de, T, const N: usize> Visitor<'de> for SocowVecVisitor<T, N> where T: Clone + Deserialize<'de> {
	type Value = SocowVec<T, N>;

	fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
		formatter.write_str("a sequence")
	}

	fn visit_seq<B>(self, mut seq: B) -> Result<Self::Value, B::Error> where B: SeqAccess<'de> {
		use serde::de::Error;
		// the hint comes from the input, only trust it up to a point.
		let len = cmp::min(seq.size_hint().unwrap_or(0), 4096);
		let mut values = SocowVec::new();
		values.try_reserve(len).map_err(B::Error::custom)?;

		while let Some(value) = seq.next_element()? {
			values.push(value);
		}

		Ok(values)
	}
}
