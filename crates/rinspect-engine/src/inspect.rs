//! Tag and attribute inspection
//!
//! Reads a value's declared shape (tag, length, attributes, `dim`) without
//! interpreting its contents. The vector accessors call into here before
//! every element read.

use crate::walk;
use rinspect_sdk::{BridgeError, BridgeResult, Sexp, SexpAccess, SexpType};

/// Declared type tag of `x`
#[inline]
pub fn type_of<A: SexpAccess + ?Sized>(rt: &A, x: Sexp) -> BridgeResult<SexpType> {
    rt.type_of(x)
}

/// Whether `x` is the empty-list terminator
#[inline]
pub fn is_nil<A: SexpAccess + ?Sized>(rt: &A, x: Sexp) -> bool {
    x == rt.nil()
}

/// Fail with `TypeMismatch` unless `x` has tag `expected`
pub fn expect_type<A: SexpAccess + ?Sized>(
    rt: &A,
    x: Sexp,
    expected: SexpType,
) -> BridgeResult<()> {
    let found = rt.type_of(x)?;
    if found == expected {
        Ok(())
    } else {
        Err(BridgeError::mismatch(expected.name(), found))
    }
}

/// Attribute pairlist of `x`; nil (never absent) when there are none
#[inline]
pub fn attributes_of<A: SexpAccess + ?Sized>(rt: &A, x: Sexp) -> BridgeResult<Sexp> {
    rt.attrib(x)
}

/// Element count of a vector-shaped value
pub fn vector_length<A: SexpAccess + ?Sized>(rt: &A, x: Sexp) -> BridgeResult<usize> {
    let ty = rt.type_of(x)?;
    if !ty.is_vector() {
        return Err(BridgeError::mismatch("vector", ty));
    }
    // SAFETY: `x` is live and vector-shaped.
    Ok(unsafe { rt.length(x) })
}

/// Bytes of a CHARSXP exactly as stored, whatever their encoding
pub fn char_bytes<A: SexpAccess + ?Sized>(rt: &A, charsxp: Sexp) -> BridgeResult<Vec<u8>> {
    expect_type(rt, charsxp, SexpType::Char)?;
    // SAFETY: `charsxp` is a live CHARSXP.
    Ok(unsafe { rt.char_bytes(charsxp) })
}

/// Contents of a CHARSXP as UTF-8; other encodings fail with `Encoding`
pub fn char_contents<A: SexpAccess + ?Sized>(rt: &A, charsxp: Sexp) -> BridgeResult<String> {
    String::from_utf8(char_bytes(rt, charsxp)?).map_err(|e| BridgeError::Encoding(e.to_string()))
}

/// Name of a symbol as a host string
pub fn symbol_str<A: SexpAccess + ?Sized>(rt: &A, sym: Sexp) -> BridgeResult<String> {
    char_contents(rt, walk::symbol_name(rt, sym)?)
}

/// Look up an attribute by symbol identity
pub fn attribute_by_symbol<A: SexpAccess + ?Sized>(
    rt: &A,
    x: Sexp,
    sym: Sexp,
) -> BridgeResult<Option<Sexp>> {
    for cell in walk::pairlist(rt, rt.attrib(x)?) {
        let (tag, value) = cell?;
        if tag == sym {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Look up an attribute by name
pub fn attribute<A: SexpAccess + ?Sized>(
    rt: &A,
    x: Sexp,
    name: &str,
) -> BridgeResult<Option<Sexp>> {
    for cell in walk::pairlist(rt, rt.attrib(x)?) {
        let (tag, value) = cell?;
        if tag != rt.nil() && symbol_str(rt, tag)? == name {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Raw `dim` attribute as extents, if present
fn dim_extents<A: SexpAccess + ?Sized>(rt: &A, x: Sexp) -> BridgeResult<Option<Vec<usize>>> {
    let Some(dim) = attribute_by_symbol(rt, x, rt.dim_symbol())? else {
        return Ok(None);
    };
    let ty = rt.type_of(dim)?;
    if ty != SexpType::Integer {
        return Err(BridgeError::InvalidDimensions(format!(
            "expected an integer vector, got {}",
            ty
        )));
    }
    // SAFETY: `dim` is a live integer vector; offsets are below its length.
    let extents = unsafe {
        (0..rt.length(dim))
            .map(|i| rt.integer_elt(dim, i))
            .collect::<Vec<i32>>()
    };
    extents
        .into_iter()
        .map(|d| {
            usize::try_from(d)
                .map_err(|_| BridgeError::InvalidDimensions(format!("negative or NA extent {}", d)))
        })
        .collect::<BridgeResult<Vec<_>>>()
        .map(Some)
}

/// `(nrow, ncol)` from the `dim` attribute; `None` for a plain vector
pub fn dimensions<A: SexpAccess + ?Sized>(
    rt: &A,
    x: Sexp,
) -> BridgeResult<Option<(usize, usize)>> {
    let length = vector_length(rt, x)?;
    let Some(extents) = dim_extents(rt, x)? else {
        return Ok(None);
    };
    let &[nrow, ncol] = extents.as_slice() else {
        return Err(BridgeError::InvalidDimensions(format!(
            "expected 2 extents, got {}",
            extents.len()
        )));
    };
    if nrow.checked_mul(ncol) != Some(length) {
        return Err(BridgeError::InvalidDimensions(format!(
            "{} x {} does not match length {}",
            nrow, ncol, length
        )));
    }
    Ok(Some((nrow, ncol)))
}

/// Row count as the runtime's `nrows` computes it: the first `dim` extent,
/// or the length for a vector without `dim`
pub fn nrows<A: SexpAccess + ?Sized>(rt: &A, x: Sexp) -> BridgeResult<usize> {
    let length = vector_length(rt, x)?;
    match dim_extents(rt, x)? {
        Some(extents) => extents
            .first()
            .copied()
            .ok_or_else(|| BridgeError::InvalidDimensions("empty dim attribute".to_string())),
        None => Ok(length),
    }
}
