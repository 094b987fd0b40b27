//! Raw declarations of the libR symbols the bridge uses

#![allow(non_snake_case, non_upper_case_globals)]

use libc::{c_char, c_int, ptrdiff_t};

/// Opaque foreign record
#[repr(C)]
pub struct SEXPREC {
    _private: [u8; 0],
}

/// Pointer to a foreign record
pub type SEXP = *mut SEXPREC;

/// Vector length type
pub type R_xlen_t = ptrdiff_t;

#[link(name = "R")]
extern "C" {
    // Singletons
    pub static R_NilValue: SEXP;
    pub static R_NaString: SEXP;
    pub static R_DimSymbol: SEXP;

    // Header
    pub fn TYPEOF(x: SEXP) -> c_int;
    pub fn ATTRIB(x: SEXP) -> SEXP;
    pub fn ALTREP(x: SEXP) -> c_int;

    // Vectors
    pub fn Rf_xlength(x: SEXP) -> R_xlen_t;
    pub fn LENGTH(x: SEXP) -> c_int;
    pub fn LOGICAL_ELT(x: SEXP, i: R_xlen_t) -> c_int;
    pub fn INTEGER_ELT(x: SEXP, i: R_xlen_t) -> c_int;
    pub fn REAL_ELT(x: SEXP, i: R_xlen_t) -> f64;
    pub fn STRING_ELT(x: SEXP, i: R_xlen_t) -> SEXP;
    pub fn VECTOR_ELT(x: SEXP, i: R_xlen_t) -> SEXP;
    pub fn R_CHAR(x: SEXP) -> *const c_char;

    // Pairlists
    pub fn CAR(x: SEXP) -> SEXP;
    pub fn CDR(x: SEXP) -> SEXP;
    pub fn TAG(x: SEXP) -> SEXP;

    // Environments
    pub fn FRAME(x: SEXP) -> SEXP;
    pub fn ENCLOS(x: SEXP) -> SEXP;
    pub fn HASHTAB(x: SEXP) -> SEXP;

    // Closures
    pub fn FORMALS(x: SEXP) -> SEXP;
    pub fn BODY(x: SEXP) -> SEXP;
    pub fn CLOENV(x: SEXP) -> SEXP;

    // Symbols
    pub fn PRINTNAME(x: SEXP) -> SEXP;
    pub fn SYMVALUE(x: SEXP) -> SEXP;
    pub fn INTERNAL(x: SEXP) -> SEXP;

    // Promises
    pub fn PRVALUE(x: SEXP) -> SEXP;
    pub fn PRCODE(x: SEXP) -> SEXP;
    pub fn PRENV(x: SEXP) -> SEXP;

    // Precious list
    pub fn R_PreserveObject(x: SEXP);
    pub fn R_ReleaseObject(x: SEXP);
}
