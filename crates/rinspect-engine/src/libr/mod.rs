//! libR backend
//!
//! Reads values owned by an embedded R interpreter. By default every read
//! goes through libR's exported accessor functions; with the `rinternals`
//! feature the record layout is read directly, falling back to the accessor
//! functions for ALTREP vectors.
//!
//! # Safety
//!
//! libR cannot tell a live record from a reclaimed one. Reading a handle whose
//! referent was collected is undefined behavior and will usually crash the
//! process. Root every handle you keep across an allocating call with
//! [`Protected`](crate::root::Protected).
//!
//! R must be initialized before [`attach`] is called, and all calls must come
//! from the thread that initialized it. The session lock serializes access but
//! does not move work onto that thread.

#[cfg_attr(feature = "rinternals", allow(dead_code))]
mod api;
#[cfg(feature = "rinternals")]
mod layout;
mod sys;

#[cfg(not(feature = "rinternals"))]
use api as raw;
#[cfg(feature = "rinternals")]
use layout as raw;

use crate::session::{Session, SessionOptions};
use once_cell::sync::OnceCell;
use rinspect_sdk::{BridgeError, BridgeResult, Field, Sexp, SexpAccess, SexpType};

static SESSION: OnceCell<Session<RApi>> = OnceCell::new();

/// Accessor over the process's R interpreter.
///
/// Zero-sized; the only instance lives inside the session returned by
/// [`attach`].
#[derive(Debug)]
pub struct RApi {
    _private: (),
}

/// Attach to the embedded interpreter, creating the process-wide session on
/// first call. Later calls return the same session and ignore `options`.
///
/// # Safety
/// R must already be initialized in this process (`Rf_initEmbeddedR` or
/// equivalent) and must stay initialized for the rest of the process.
pub unsafe fn attach(options: SessionOptions) -> &'static Session<RApi> {
    SESSION.get_or_init(|| {
        tracing::debug!(
            layout = cfg!(feature = "rinternals"),
            max_traversal_depth = options.max_traversal_depth,
            "attached to libR"
        );
        Session::new(RApi { _private: () }, options)
    })
}

/// The process-wide session, if [`attach`] has run
pub fn session() -> Option<&'static Session<RApi>> {
    SESSION.get()
}

impl SexpAccess for RApi {
    fn nil(&self) -> Sexp {
        // SAFETY: initialized before `attach` and never reassigned.
        Sexp::from_ptr(unsafe { sys::R_NilValue })
    }

    fn na_string(&self) -> Sexp {
        // SAFETY: as for `nil`.
        Sexp::from_ptr(unsafe { sys::R_NaString })
    }

    fn dim_symbol(&self) -> Sexp {
        // SAFETY: as for `nil`.
        Sexp::from_ptr(unsafe { sys::R_DimSymbol })
    }

    fn type_of(&self, x: Sexp) -> BridgeResult<SexpType> {
        // SAFETY: liveness of `x` is the caller's rooting obligation.
        let code = unsafe { raw::type_code(x) };
        SexpType::from_code(code).ok_or(BridgeError::UnknownType(code))
    }

    fn attrib(&self, x: Sexp) -> BridgeResult<Sexp> {
        // SAFETY: as for `type_of`.
        Ok(unsafe { raw::attrib(x) })
    }

    unsafe fn length(&self, x: Sexp) -> usize {
        raw::length(x)
    }

    unsafe fn logical_elt(&self, x: Sexp, offset: usize) -> i32 {
        raw::logical_elt(x, offset)
    }

    unsafe fn integer_elt(&self, x: Sexp, offset: usize) -> i32 {
        raw::integer_elt(x, offset)
    }

    unsafe fn real_elt(&self, x: Sexp, offset: usize) -> f64 {
        raw::real_elt(x, offset)
    }

    unsafe fn string_elt(&self, x: Sexp, offset: usize) -> Sexp {
        raw::string_elt(x, offset)
    }

    unsafe fn vector_elt(&self, x: Sexp, offset: usize) -> Sexp {
        raw::vector_elt(x, offset)
    }

    unsafe fn char_bytes(&self, x: Sexp) -> Vec<u8> {
        raw::char_bytes(x)
    }

    unsafe fn field(&self, x: Sexp, field: Field) -> Sexp {
        raw::field(x, field)
    }

    fn preserve(&self, x: Sexp) {
        // SAFETY: `x` came from this runtime.
        unsafe { sys::R_PreserveObject(x.as_ptr()) }
    }

    fn release(&self, x: Sexp) {
        // SAFETY: as for `preserve`.
        unsafe { sys::R_ReleaseObject(x.as_ptr()) }
    }
}
