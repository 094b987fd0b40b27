//! In-process foreign runtime
//!
//! A self-contained model of the embedded interpreter's heap, so the bridge
//! can be exercised without linking libR. It reproduces the parts of the
//! runtime the bridge depends on:
//!
//! - **Records**: tagged, attribute-carrying values in a slot arena
//! - **Singletons**: nil, `NA_STRING`, the unbound marker, `dim`/`names` symbols
//! - **Symbol table / CHARSXP cache**: interned names (symbols are never
//!   collected, cached CHARSXPs are dropped when unreachable)
//! - **Roots**: a LIFO protection stack and a counted precious set
//! - **Collector**: mark-sweep, optionally triggered on allocation
//!
//! Unlike the real runtime, a handle whose referent was collected is
//! detected: reading it fails with `BridgeError::StaleHandle`.
//!
//! # Example
//!
//! ```no_run
//! use rinspect_engine::heap::Heap;
//! use rinspect_engine::vector;
//!
//! let heap = Heap::new();
//! let v = heap.protect(heap.alloc_integer(&[1, 2, 3]));
//! heap.collect();
//! assert_eq!(vector::get_integer(&heap, v, 2).unwrap(), 3);
//! heap.unprotect(1);
//! ```

mod arena;
mod build;
mod collector;
mod header;
mod roots;
mod runtime;

pub use collector::GcStats;
pub use runtime::Heap;
