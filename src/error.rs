use core::alloc::Layout;

/// The error type for `try_reserve` methods.
///
/// A failed reservation leaves the container exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReserveError {
	/// The computed capacity exceeded the collection's maximum
	/// (usually `isize::MAX` bytes).
	#[error("capacity overflow")]
	CapacityOverflow,

	/// The memory allocator returned an error.
	#[error("memory allocation of {} bytes failed", .layout.size())]
	AllocError {
		/// The layout of the allocation request that failed.
		layout: Layout
	}
}
