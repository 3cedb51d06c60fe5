use std::{
	alloc::{
		GlobalAlloc,
		Layout,
		System
	},
	cell::Cell
};
use socow_vec::SocowVec;

/// Counts the allocations made by the current thread.
struct CountingAllocator;

thread_local! {
	static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for CountingAllocator {
	unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
		let _ = ALLOCATIONS.try_with(|count| count.set(count.get() + 1));
		System.alloc(layout)
	}

	unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
		System.dealloc(ptr, layout)
	}
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

/// Number of allocations made while running `f`.
fn allocations<R>(f: impl FnOnce() -> R) -> usize {
	let before = ALLOCATIONS.with(Cell::get);
	let result = f();
	let after = ALLOCATIONS.with(Cell::get);
	drop(result);
	after - before
}

#[test]
fn push_on_full_shared_buffer_allocates_once() {
	let a: SocowVec<u64, 3> = SocowVec::from_slice(&[1, 2, 3, 4]);
	let mut b = a.clone();

	// one block for the elements, one for the new handle.
	assert_eq!(allocations(|| b.push(5)), 2);
	assert_eq!(b.capacity(), 9);

	let mut c = a.clone();
	assert_eq!(allocations(|| c.insert(0, 0)), 2);
	assert_eq!(c, [0, 1, 2, 3, 4]);
}

#[test]
fn clear_on_shared_buffer_allocates_no_slots() {
	let a: SocowVec<u64, 3> = (0..1000).collect();
	let mut b = a.clone();

	// only the new handle.
	assert_eq!(allocations(|| b.clear()), 1);
	assert_eq!(b.capacity(), 0);
	assert_eq!(a.len(), 1000);
}

#[test]
fn empty_extend_allocates_nothing() {
	let a: SocowVec<u64, 3> = (0..10).collect();
	let mut b = a.clone();

	assert_eq!(allocations(|| {
		b.extend_from_slice(&[]);
		b.extend(std::iter::empty());
	}), 0);
	assert_eq!(a.as_ptr(), b.as_ptr());
}
