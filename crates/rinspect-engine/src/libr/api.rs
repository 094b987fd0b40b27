//! Reads through libR's exported accessor functions

use super::sys::{self, R_xlen_t, SEXP};
use rinspect_sdk::{Field, Sexp};

#[inline]
fn ptr(x: Sexp) -> SEXP {
    x.as_ptr()
}

#[inline]
fn idx(offset: usize) -> R_xlen_t {
    offset as R_xlen_t
}

pub(super) unsafe fn type_code(x: Sexp) -> u32 {
    sys::TYPEOF(ptr(x)) as u32
}

pub(super) unsafe fn attrib(x: Sexp) -> Sexp {
    Sexp::from_ptr(sys::ATTRIB(ptr(x)))
}

pub(super) unsafe fn length(x: Sexp) -> usize {
    sys::Rf_xlength(ptr(x)) as usize
}

pub(super) unsafe fn logical_elt(x: Sexp, offset: usize) -> i32 {
    sys::LOGICAL_ELT(ptr(x), idx(offset))
}

pub(super) unsafe fn integer_elt(x: Sexp, offset: usize) -> i32 {
    sys::INTEGER_ELT(ptr(x), idx(offset))
}

pub(super) unsafe fn real_elt(x: Sexp, offset: usize) -> f64 {
    sys::REAL_ELT(ptr(x), idx(offset))
}

pub(super) unsafe fn string_elt(x: Sexp, offset: usize) -> Sexp {
    Sexp::from_ptr(sys::STRING_ELT(ptr(x), idx(offset)))
}

pub(super) unsafe fn vector_elt(x: Sexp, offset: usize) -> Sexp {
    Sexp::from_ptr(sys::VECTOR_ELT(ptr(x), idx(offset)))
}

pub(super) unsafe fn char_bytes(x: Sexp) -> Vec<u8> {
    let len = sys::LENGTH(ptr(x)) as usize;
    let data = sys::R_CHAR(ptr(x)) as *const u8;
    std::slice::from_raw_parts(data, len).to_vec()
}

pub(super) unsafe fn field(x: Sexp, field: Field) -> Sexp {
    let x = ptr(x);
    let value = match field {
        Field::Car => sys::CAR(x),
        Field::Cdr => sys::CDR(x),
        Field::Tag => sys::TAG(x),
        Field::Frame => sys::FRAME(x),
        Field::Enclos => sys::ENCLOS(x),
        Field::HashTab => sys::HASHTAB(x),
        Field::Formals => sys::FORMALS(x),
        Field::Body => sys::BODY(x),
        Field::CloEnv => sys::CLOENV(x),
        Field::PrintName => sys::PRINTNAME(x),
        Field::SymValue => sys::SYMVALUE(x),
        Field::Internal => sys::INTERNAL(x),
        Field::PrValue => sys::PRVALUE(x),
        Field::PrCode => sys::PRCODE(x),
        Field::PrEnv => sys::PRENV(x),
    };
    Sexp::from_ptr(value)
}
