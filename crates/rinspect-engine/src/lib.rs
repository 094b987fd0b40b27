//! rinspect engine - checked access to R interpreter values
//!
//! This crate reads values owned by an embedded R runtime without copying
//! them:
//! - **Inspection**: type tags, attributes, `dim` (`inspect` module)
//! - **Vectors**: bounds- and tag-checked element reads, with NA decoding and
//!   column-major matrix addressing (`vector` module)
//! - **Structure**: symbol, pairlist, environment, closure and promise
//!   fields, plus chain iterators (`walk` module)
//! - **Rooting**: scoped registration with the foreign collector (`root`)
//! - **Sessions**: exclusive, configured access to one runtime (`session`)
//!
//! Backends: the in-process [`heap::Heap`] (always available) and libR
//! (`libr` feature).
//!
//! # Rooting
//!
//! **A `Sexp` does not keep its referent alive.** The foreign collector may
//! reclaim any value that is not reachable from its roots whenever the
//! runtime allocates. Hold every handle you keep across such a call in a
//! [`Protected`] guard. The in-process heap reports a reclaimed handle as
//! `BridgeError::StaleHandle`; with libR, reading it is undefined behavior
//! and typically crashes the process.
//!
//! # Example
//!
//! ```rust,ignore
//! use rinspect_engine::{vector, walk, Protected, Session, SessionOptions};
//!
//! let session = Session::in_process(SessionOptions::default());
//! let rt = session.enter();
//!
//! let m = Protected::new(&*rt, rt.alloc_integer(&[0, 1, 2, 3, 4, 5]));
//! rt.set_dim(m.get(), 3, 2)?;
//! assert_eq!(vector::get_integer_2d(&rt, m.get(), 1, 1)?, 4);
//!
//! for cell in rt.walk_pairlist(rt.attrib(m.get())?) {
//!     let (tag, value) = cell?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Default configuration constants
pub mod defaults;

/// In-process runtime backend
pub mod heap;

/// Tag and attribute inspection
pub mod inspect;

/// Checked vector element access
pub mod vector;

/// Structural field projections and chain iterators
pub mod walk;

/// Rooting guards
pub mod root;

/// Sessions and their configuration
pub mod session;

/// libR backend
#[cfg(feature = "libr")]
pub mod libr;

// ============================================================================
// Re-exports
// ============================================================================

pub use heap::{GcStats, Heap};
pub use root::{Protected, RootScope};
pub use session::{Session, SessionGuard, SessionOptions};

pub use rinspect_sdk::na;
pub use rinspect_sdk::{BridgeError, BridgeResult, Field, Sexp, SexpAccess, SexpType};

#[cfg(feature = "libr")]
pub use libr::RApi;
