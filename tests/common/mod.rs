//! Helpers shared by the integration tests.
#![allow(dead_code)]
use std::{
	cell::{
		Cell,
		RefCell
	},
	collections::BTreeSet,
	fmt,
	mem
};
use socow_vec::SocowVec;

thread_local! {
	/// Ids of the elements alive on this thread.
	static INSTANCES: RefCell<BTreeSet<u64>> = RefCell::new(BTreeSet::new());

	static NEXT_ID: Cell<u64> = Cell::new(0);

	/// Number of clones since the thread started.
	static CLONES: Cell<usize> = Cell::new(0);

	/// Number of clones allowed before the next one panics.
	static CLONE_BUDGET: Cell<Option<usize>> = Cell::new(None);
}

/// Element type tracking its own lifetime.
///
/// Every instance gets a fresh id, registered while the instance is alive.
/// Dropping an unregistered instance or comparing a dead one fails the test.
pub struct Element {
	id: u64,
	value: i64
}

impl Element {
	pub fn new(value: i64) -> Self {
		let id = NEXT_ID.with(|next| {
			let id = next.get();
			next.set(id + 1);
			id
		});

		INSTANCES.with(|instances| {
			assert!(instances.borrow_mut().insert(id), "element {} created twice", id)
		});

		Element { id, value }
	}

	pub fn value(&self) -> i64 {
		self.assert_exists();
		self.value
	}

	pub fn set(&mut self, value: i64) {
		self.assert_exists();
		self.value = value
	}

	fn assert_exists(&self) {
		INSTANCES.with(|instances| {
			assert!(instances.borrow().contains(&self.id), "accessing dead element {}", self.id)
		})
	}

	/// Number of live elements on this thread.
	pub fn live() -> usize {
		INSTANCES.with(|instances| instances.borrow().len())
	}

	/// Number of clones made on this thread so far.
	pub fn clones() -> usize {
		CLONES.with(Cell::get)
	}

	/// Makes the clone after the next `n` ones panic.
	pub fn fail_after(n: usize) {
		CLONE_BUDGET.with(|budget| budget.set(Some(n)))
	}

	pub fn never_fail() {
		CLONE_BUDGET.with(|budget| budget.set(None))
	}
}

impl From<i64> for Element {
	fn from(value: i64) -> Self {
		Element::new(value)
	}
}

impl Clone for Element {
	fn clone(&self) -> Self {
		self.assert_exists();
		CLONE_BUDGET.with(|budget| match budget.get() {
			Some(0) => panic!("element clone failed"),
			Some(n) => budget.set(Some(n - 1)),
			None => ()
		});

		CLONES.with(|clones| clones.set(clones.get() + 1));
		Element::new(self.value)
	}
}

impl Drop for Element {
	fn drop(&mut self) {
		let removed = INSTANCES.with(|instances| instances.borrow_mut().remove(&self.id));
		if !removed && !std::thread::panicking() {
			panic!("dropping dead element {}", self.id)
		}
	}
}

impl PartialEq for Element {
	fn eq(&self, other: &Self) -> bool {
		self.value() == other.value()
	}
}

impl PartialEq<i64> for Element {
	fn eq(&self, other: &i64) -> bool {
		self.value() == *other
	}
}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&self.value, f)
	}
}

/// Checks that no element outlives its scope.
///
/// On drop, fails unless the number of live elements is back to what it was
/// when the guard was created.
pub struct NoNewInstancesGuard {
	live: usize
}

impl NoNewInstancesGuard {
	pub fn new() -> Self {
		Element::never_fail();
		NoNewInstancesGuard {
			live: Element::live()
		}
	}

	pub fn check(&self) -> bool {
		Element::live() == self.live
	}
}

impl Drop for NoNewInstancesGuard {
	fn drop(&mut self) {
		Element::never_fail();
		if !std::thread::panicking() {
			assert_eq!(Element::live(), self.live, "elements leaked")
		}
	}
}

/// State of a vector at some point, to compare it against later.
pub struct Snapshot {
	pub capacity: usize,
	pub data: *const Element,
	pub values: Vec<i64>
}

impl Snapshot {
	pub fn new<const N: usize>(v: &SocowVec<Element, N>) -> Self {
		Snapshot {
			capacity: v.capacity(),
			data: v.as_ptr(),
			values: values(v)
		}
	}

	/// Same elements.
	pub fn verify<const N: usize>(&self, v: &SocowVec<Element, N>) {
		pretty_assertions::assert_eq!(values(v), self.values)
	}

	/// Same elements, in the same storage.
	pub fn full_verify<const N: usize>(&self, v: &SocowVec<Element, N>) {
		assert_eq!(v.capacity(), self.capacity);
		assert_eq!(v.as_ptr(), self.data);
		self.verify(v)
	}
}

pub fn values<const N: usize>(v: &SocowVec<Element, N>) -> Vec<i64> {
	v.iter().map(Element::value).collect()
}

/// Returns `true` if the elements of `v` are stored inside `v` itself.
pub fn is_inline_storage<T, const N: usize>(v: &SocowVec<T, N>) -> bool {
	let start = v as *const SocowVec<T, N> as usize;
	let end = start + mem::size_of::<SocowVec<T, N>>();
	let data = v.as_ptr() as usize;
	v.capacity() == N && !v.is_spilled() && start <= data && data < end
}

pub fn assert_empty_storage<T, const N: usize>(v: &SocowVec<T, N>) {
	assert!(v.is_empty());
	assert_eq!(v.len(), 0);
	assert!(is_inline_storage(v));
}

/// Pushes the odd numbers `1, 3, 5, ...` until `n` more elements were added.
pub fn mass_push<const N: usize>(v: &mut SocowVec<Element, N>, n: usize) {
	for i in 0..n as i64 {
		v.push(Element::new(2 * i + 1))
	}
}

pub fn init_test_logging() {
	use tracing_subscriber::{
		fmt,
		EnvFilter
	};

	let _ = fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")))
		.with_test_writer()
		.try_init();
}
