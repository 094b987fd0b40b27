//! rinspect SDK - handle and capability types for reading R values
//!
//! This crate holds the backend-independent vocabulary of the bridge:
//!
//! - [`Sexp`]: opaque handle to a foreign value
//! - [`SexpType`]: the foreign type tag
//! - [`na`]: the per-kind NA sentinel codec
//! - [`SexpAccess`]: the capability trait every backend implements
//! - [`BridgeError`]: contract violations reported by the checked layer
//!
//! The checked accessors themselves live in `rinspect-engine`.

#![warn(missing_docs)]

pub mod access;
pub mod error;
pub mod na;
pub mod sexp;
pub mod sexptype;

pub use access::{Field, SexpAccess};
pub use error::{BridgeError, BridgeResult};
pub use sexp::Sexp;
pub use sexptype::SexpType;
