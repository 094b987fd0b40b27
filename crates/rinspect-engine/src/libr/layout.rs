//! Reads straight from `SEXPREC` memory
//!
//! Assumes the 64-bit layout of R 4.x:
//!
//! ```text
//! 0   sxpinfo   (type: bits 0..5, alt: bit 7)
//! 8   attrib
//! 16  gengc_next_node
//! 24  gengc_prev_node
//! 32  union { car, frame, formals, value, pname }  |  vector length
//! 40  union { cdr, enclos, body, expr, value }     |  vector truelength
//! 48  union { tag, hashtab, env, env, internal }   |  vector data
//! ```
//!
//! ALTREP vectors have no contiguous data at offset 48; their lengths and
//! elements go through the exported accessors instead.

use super::api;
use super::sys::SEXP;
use rinspect_sdk::{Field, Sexp};

const TYPE_MASK: u64 = 0x1f;
const ALT_BIT: u64 = 1 << 7;

const ATTRIB_OFFSET: usize = 8;
const SLOT0_OFFSET: usize = 32;
const SLOT1_OFFSET: usize = 40;
const SLOT2_OFFSET: usize = 48;
const VEC_LENGTH_OFFSET: usize = 32;
const VEC_DATA_OFFSET: usize = 48;

#[inline]
unsafe fn base(x: Sexp) -> *const u8 {
    x.as_ptr::<u8>() as *const u8
}

#[inline]
unsafe fn sxpinfo(x: Sexp) -> u64 {
    std::ptr::read(base(x) as *const u64)
}

#[inline]
unsafe fn read_sexp(x: Sexp, offset: usize) -> Sexp {
    Sexp::from_ptr(std::ptr::read(base(x).add(offset) as *const SEXP))
}

#[inline]
unsafe fn is_altrep(x: Sexp) -> bool {
    sxpinfo(x) & ALT_BIT != 0
}

#[inline]
unsafe fn data<T>(x: Sexp) -> *const T {
    base(x).add(VEC_DATA_OFFSET) as *const T
}

pub(super) unsafe fn type_code(x: Sexp) -> u32 {
    (sxpinfo(x) & TYPE_MASK) as u32
}

pub(super) unsafe fn attrib(x: Sexp) -> Sexp {
    read_sexp(x, ATTRIB_OFFSET)
}

pub(super) unsafe fn length(x: Sexp) -> usize {
    if is_altrep(x) {
        return api::length(x);
    }
    std::ptr::read(base(x).add(VEC_LENGTH_OFFSET) as *const isize) as usize
}

pub(super) unsafe fn logical_elt(x: Sexp, offset: usize) -> i32 {
    if is_altrep(x) {
        return api::logical_elt(x, offset);
    }
    *data::<i32>(x).add(offset)
}

pub(super) unsafe fn integer_elt(x: Sexp, offset: usize) -> i32 {
    if is_altrep(x) {
        return api::integer_elt(x, offset);
    }
    *data::<i32>(x).add(offset)
}

pub(super) unsafe fn real_elt(x: Sexp, offset: usize) -> f64 {
    if is_altrep(x) {
        return api::real_elt(x, offset);
    }
    *data::<f64>(x).add(offset)
}

pub(super) unsafe fn string_elt(x: Sexp, offset: usize) -> Sexp {
    if is_altrep(x) {
        return api::string_elt(x, offset);
    }
    Sexp::from_ptr(*data::<SEXP>(x).add(offset))
}

pub(super) unsafe fn vector_elt(x: Sexp, offset: usize) -> Sexp {
    if is_altrep(x) {
        return api::vector_elt(x, offset);
    }
    Sexp::from_ptr(*data::<SEXP>(x).add(offset))
}

pub(super) unsafe fn char_bytes(x: Sexp) -> Vec<u8> {
    let len = length(x);
    std::slice::from_raw_parts(data::<u8>(x), len).to_vec()
}

pub(super) unsafe fn field(x: Sexp, field: Field) -> Sexp {
    let offset = match field {
        Field::Car | Field::Frame | Field::Formals | Field::PrintName | Field::PrValue => {
            SLOT0_OFFSET
        }
        Field::Cdr | Field::Enclos | Field::Body | Field::SymValue | Field::PrCode => SLOT1_OFFSET,
        Field::Tag | Field::HashTab | Field::CloEnv | Field::Internal | Field::PrEnv => SLOT2_OFFSET,
    };
    read_sexp(x, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-built record with the same layout as a runtime INTSXP
    #[repr(C)]
    #[allow(dead_code)]
    struct FakeIntVector {
        sxpinfo: u64,
        attrib: usize,
        next: usize,
        prev: usize,
        length: isize,
        truelength: isize,
        data: [i32; 3],
    }

    #[test]
    fn test_reads_fake_vector() {
        let fake = FakeIntVector {
            sxpinfo: 13,
            attrib: 0xdead_beef,
            next: 0,
            prev: 0,
            length: 3,
            truelength: 0,
            data: [4, 5, 6],
        };
        let x = Sexp::from_ptr(&fake as *const FakeIntVector);
        unsafe {
            assert_eq!(type_code(x), 13);
            assert_eq!(attrib(x).to_bits(), 0xdead_beef);
            assert_eq!(length(x), 3);
            assert_eq!(integer_elt(x, 2), 6);
        }
    }

    /// Hand-built record with the same layout as a runtime LISTSXP
    #[repr(C)]
    #[allow(dead_code)]
    struct FakeCons {
        sxpinfo: u64,
        attrib: usize,
        next: usize,
        prev: usize,
        car: usize,
        cdr: usize,
        tag: usize,
    }

    #[test]
    fn test_reads_fake_cons() {
        let fake = FakeCons {
            sxpinfo: 2 | (1 << 5),
            attrib: 0,
            next: 0,
            prev: 0,
            car: 0x10,
            cdr: 0x20,
            tag: 0x30,
        };
        let x = Sexp::from_ptr(&fake as *const FakeCons);
        unsafe {
            assert_eq!(type_code(x), 2);
            assert_eq!(field(x, Field::Car).to_bits(), 0x10);
            assert_eq!(field(x, Field::Cdr).to_bits(), 0x20);
            assert_eq!(field(x, Field::Tag).to_bits(), 0x30);
        }
    }
}
