//! A lock-free array of cells supporting compare-and-set on one cell and on any two cells at once.
//!
//! [CasArray::compare_and_set2] is built from nothing but single-word CAS. A two-cell operation
//! announces itself by installing a descriptor in the lower-indexed cell, reserves the
//! higher-indexed cell with a double-compare single-swap, decides its outcome with one CAS, and
//! finally writes the decided values into both cells. Any thread which runs into a descriptor
//! finishes it before continuing, so a suspended thread never holds up anyone else.
//!
//! ```
//! # #[cfg(not(feature = "shuttle"))]
//! # fn main() {
//! use casn::CasArray;
//!
//! let array: CasArray<u32> = CasArray::new(4, 0);
//! assert!(array.compare_and_set2(0, 0, 1, 2, 0, 1));
//! assert!(!array.compare_and_set2(0, 0, 5, 2, 0, 5));
//! assert_eq!((array.read(0), array.read(2)), (1, 1));
//! # }
//! # #[cfg(feature = "shuttle")]
//! # fn main() {}
//! ```
//!
//! Replaced cell contents are reclaimed with [crossbeam_epoch].

pub use crate::array::CasArray;

mod array;
mod cell;
mod descriptor;
pub mod err;
mod sync;
mod types;
