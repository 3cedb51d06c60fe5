//! This crate provides the [`SocowVec`] data structure for small copy-on-write arrays.
//! As long as it holds few enough elements, the data is stored in place, without any
//! heap allocation.
//! Past that point, the data is moved to a heap buffer that is shared between clones,
//! and only copied when one of them is modified.
//! This is basically the intersection between
//! [`SmallVec`](https://crates.io/crates/smallvec) and
//! [`Rc`](https://doc.rust-lang.org/std/rc/struct.Rc.html)
//! (small-size optimization + shared copy-on-write = `socow`).
//!
//! ## Basic usage
//!
//! The second type parameter is the number of elements stored in place.
//! ```rust
//! use socow_vec::SocowVec;
//!
//! let mut small: SocowVec<u8, 4> = SocowVec::new();
//! small.extend_from_slice(&[1, 2, 3]);
//! assert!(!small.is_spilled()); // no allocation yet.
//!
//! small.push(4);
//! small.push(5); // <- here the data no longer fits in place.
//!                //    it is hence moved on the heap, transparently.
//! assert!(small.is_spilled());
//! ```
//!
//! Once on the heap, cloning is cheap:
//! ```rust
//! # use socow_vec::SocowVec;
//! let a: SocowVec<u8, 4> = SocowVec::from_slice(&[1, 2, 3, 4, 5]);
//! let mut b = a.clone(); // at this point, the data is shared.
//! assert_eq!(a.use_count(), 2);
//!
//! b[0] = 42; // because it is modified, the data is copied here.
//! assert_eq!(a.use_count(), 1);
//! assert_eq!(a, [1, 2, 3, 4, 5]);
//! assert_eq!(b, [42, 2, 3, 4, 5]);
//! ```
//!
//! ## Features
//!
//! ### `serde`
//!
//! When this optional dependency is enabled, `SocowVec` implements the `serde::Serialize` and
//! `serde::Deserialize` traits.
//!
//! ## Logging
//!
//! Storage transitions (moving to the heap, copying a shared buffer, detaching from one)
//! are reported as `trace` events through [`tracing`].
//! They are compiled out of release builds.
pub mod raw;
pub mod buffer;
pub mod shared;
mod error;
pub mod vec;


pub use error::ReserveError;
pub use vec::SocowVec;
