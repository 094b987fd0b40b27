//! Vector accessor
//!
//! Bounds- and tag-checked element reads for the four primitive vector kinds
//! and for generic vectors. Three families per primitive kind:
//!
//! - `get_*`: the raw element, NA sentinel returned as-is (a logical NA reads
//!   as `true`, an integer NA as `i32::MIN`, a string NA as `"NA"`)
//! - `get_*_opt`: the element passed through the NA codec
//! - `get_*_2d`: `(row, column)` reduced to `column * nrow + row`
//!
//! Strings also come as `get_string_bytes*`, which hand back the stored bytes
//! in whatever encoding the runtime used. The `String` family rejects anything
//! that is not UTF-8.
//!
//! Matrices are vectors with a `dim` attribute over column-major storage, so
//! the 2-D family only computes an offset and reuses the linear path.
//! A vector without `dim` is addressed as a single column, as the runtime's
//! `nrows` does.

use crate::inspect;
use rinspect_sdk::na;
use rinspect_sdk::{BridgeError, BridgeResult, Sexp, SexpAccess, SexpType};

/// Check tag and bounds ahead of a raw read
#[inline]
fn check<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    accepts: fn(SexpType) -> bool,
    expected: &'static str,
    offset: usize,
) -> BridgeResult<()> {
    let ty = rt.type_of(v)?;
    if !accepts(ty) {
        return Err(BridgeError::mismatch(expected, ty));
    }
    // SAFETY: `v` is live and vector-shaped (every `accepts` is a vector tag).
    let length = unsafe { rt.length(v) };
    if offset >= length {
        return Err(BridgeError::IndexOutOfRange { offset, length });
    }
    Ok(())
}

fn is_logical(ty: SexpType) -> bool {
    ty == SexpType::Logical
}

fn is_integer(ty: SexpType) -> bool {
    ty == SexpType::Integer
}

fn is_real(ty: SexpType) -> bool {
    ty == SexpType::Real
}

fn is_string(ty: SexpType) -> bool {
    ty == SexpType::String
}

/// Linear offset of matrix cell `(row, column)`
pub fn matrix_offset<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<usize> {
    let length = inspect::vector_length(rt, v)?;
    let nrow = inspect::nrows(rt, v)?;
    let ncol = if nrow == 0 { 0 } else { length / nrow };
    if row >= nrow || column >= ncol {
        return Err(BridgeError::MatrixIndexOutOfRange { row, column, nrow, ncol });
    }
    Ok(column * nrow + row)
}

// ============================================================================
// Logical
// ============================================================================

/// Raw logical cell (`NA_LOGICAL` included)
pub fn get_logical_raw<A: SexpAccess + ?Sized>(rt: &A, v: Sexp, offset: usize) -> BridgeResult<i32> {
    check(rt, v, is_logical, "logical vector", offset)?;
    // SAFETY: checked above.
    Ok(unsafe { rt.logical_elt(v, offset) })
}

/// Logical element; NA reads as `true`
pub fn get_logical<A: SexpAccess + ?Sized>(rt: &A, v: Sexp, offset: usize) -> BridgeResult<bool> {
    get_logical_raw(rt, v, offset).map(|raw| raw != 0)
}

/// Logical element, `None` for NA
pub fn get_logical_opt<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    offset: usize,
) -> BridgeResult<Option<bool>> {
    get_logical_raw(rt, v, offset).map(na::decode_logical)
}

/// Raw logical matrix cell
pub fn get_logical_raw_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<i32> {
    get_logical_raw(rt, v, matrix_offset(rt, v, row, column)?)
}

/// Logical matrix cell; NA reads as `true`
pub fn get_logical_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<bool> {
    get_logical(rt, v, matrix_offset(rt, v, row, column)?)
}

/// Logical matrix cell, `None` for NA
pub fn get_logical_opt_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<Option<bool>> {
    get_logical_opt(rt, v, matrix_offset(rt, v, row, column)?)
}

// ============================================================================
// Integer
// ============================================================================

/// Integer element; NA reads as `i32::MIN`
pub fn get_integer<A: SexpAccess + ?Sized>(rt: &A, v: Sexp, offset: usize) -> BridgeResult<i32> {
    check(rt, v, is_integer, "integer vector", offset)?;
    // SAFETY: checked above.
    Ok(unsafe { rt.integer_elt(v, offset) })
}

/// Integer element, `None` for NA
pub fn get_integer_opt<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    offset: usize,
) -> BridgeResult<Option<i32>> {
    get_integer(rt, v, offset).map(na::decode_integer)
}

/// Integer matrix cell
pub fn get_integer_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<i32> {
    get_integer(rt, v, matrix_offset(rt, v, row, column)?)
}

/// Integer matrix cell, `None` for NA
pub fn get_integer_opt_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<Option<i32>> {
    get_integer_opt(rt, v, matrix_offset(rt, v, row, column)?)
}

// ============================================================================
// Real
// ============================================================================

/// Real element; NA reads as the NA NaN
pub fn get_real<A: SexpAccess + ?Sized>(rt: &A, v: Sexp, offset: usize) -> BridgeResult<f64> {
    check(rt, v, is_real, "double vector", offset)?;
    // SAFETY: checked above.
    Ok(unsafe { rt.real_elt(v, offset) })
}

/// Real element, `None` for NA (ordinary NaN stays `Some`)
pub fn get_real_opt<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    offset: usize,
) -> BridgeResult<Option<f64>> {
    get_real(rt, v, offset).map(na::decode_real)
}

/// Real matrix cell
pub fn get_real_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<f64> {
    get_real(rt, v, matrix_offset(rt, v, row, column)?)
}

/// Real matrix cell, `None` for NA
pub fn get_real_opt_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<Option<f64>> {
    get_real_opt(rt, v, matrix_offset(rt, v, row, column)?)
}

// ============================================================================
// String
// ============================================================================

/// CHARSXP element of a string vector
pub fn get_charsxp<A: SexpAccess + ?Sized>(rt: &A, v: Sexp, offset: usize) -> BridgeResult<Sexp> {
    check(rt, v, is_string, "character vector", offset)?;
    // SAFETY: checked above.
    Ok(unsafe { rt.string_elt(v, offset) })
}

/// String element copied out of its CHARSXP; NA reads as `"NA"`
pub fn get_string<A: SexpAccess + ?Sized>(rt: &A, v: Sexp, offset: usize) -> BridgeResult<String> {
    inspect::char_contents(rt, get_charsxp(rt, v, offset)?)
}

/// String element, `None` when it is the `NA_STRING` CHARSXP
pub fn get_string_opt<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    offset: usize,
) -> BridgeResult<Option<String>> {
    match na::decode_string(get_charsxp(rt, v, offset)?, rt.na_string()) {
        Some(charsxp) => inspect::char_contents(rt, charsxp).map(Some),
        None => Ok(None),
    }
}

/// String matrix cell
pub fn get_string_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<String> {
    get_string(rt, v, matrix_offset(rt, v, row, column)?)
}

/// String matrix cell, `None` for NA
pub fn get_string_opt_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<Option<String>> {
    get_string_opt(rt, v, matrix_offset(rt, v, row, column)?)
}

/// String element as raw bytes; NA reads as `b"NA"`
pub fn get_string_bytes<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    offset: usize,
) -> BridgeResult<Vec<u8>> {
    inspect::char_bytes(rt, get_charsxp(rt, v, offset)?)
}

/// String element as raw bytes, `None` when it is the `NA_STRING` CHARSXP
pub fn get_string_bytes_opt<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    offset: usize,
) -> BridgeResult<Option<Vec<u8>>> {
    match na::decode_string(get_charsxp(rt, v, offset)?, rt.na_string()) {
        Some(charsxp) => inspect::char_bytes(rt, charsxp).map(Some),
        None => Ok(None),
    }
}

/// String matrix cell as raw bytes
pub fn get_string_bytes_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<Vec<u8>> {
    get_string_bytes(rt, v, matrix_offset(rt, v, row, column)?)
}

/// String matrix cell as raw bytes, `None` for NA
pub fn get_string_bytes_opt_2d<A: SexpAccess + ?Sized>(
    rt: &A,
    v: Sexp,
    row: usize,
    column: usize,
) -> BridgeResult<Option<Vec<u8>>> {
    get_string_bytes_opt(rt, v, matrix_offset(rt, v, row, column)?)
}

// ============================================================================
// Generic vectors
// ============================================================================

/// Element of a list or expression vector
pub fn get_value<A: SexpAccess + ?Sized>(rt: &A, v: Sexp, offset: usize) -> BridgeResult<Sexp> {
    check(rt, v, SexpType::is_generic_vector, "list or expression vector", offset)?;
    // SAFETY: checked above.
    Ok(unsafe { rt.vector_elt(v, offset) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;

    #[test]
    fn test_plain_and_opt_agree_off_sentinel() {
        let heap = Heap::new();
        let v = heap.alloc_integer(&[10, na::NA_INTEGER, -3]);
        assert_eq!(get_integer(&heap, v, 0), Ok(10));
        assert_eq!(get_integer_opt(&heap, v, 0), Ok(Some(10)));
        assert_eq!(get_integer(&heap, v, 1), Ok(i32::MIN));
        assert_eq!(get_integer_opt(&heap, v, 1), Ok(None));
    }

    #[test]
    fn test_logical_na_reads_true_in_plain_access() {
        let heap = Heap::new();
        let v = heap.alloc_logical(&[Some(false), None, Some(true)]);
        assert_eq!(get_logical(&heap, v, 0), Ok(false));
        assert_eq!(get_logical(&heap, v, 1), Ok(true));
        assert_eq!(get_logical_raw(&heap, v, 1), Ok(na::NA_LOGICAL));
        assert_eq!(get_logical_opt(&heap, v, 1), Ok(None));
        assert_eq!(get_logical_opt(&heap, v, 2), Ok(Some(true)));
    }

    #[test]
    fn test_real_na_versus_nan() {
        let heap = Heap::new();
        let v = heap.alloc_real(&[na::na_real(), f64::NAN, 2.5]);
        assert_eq!(get_real_opt(&heap, v, 0), Ok(None));
        assert!(get_real_opt(&heap, v, 1).unwrap().unwrap().is_nan());
        assert_eq!(get_real_opt(&heap, v, 2), Ok(Some(2.5)));
        assert!(na::is_na_real(get_real(&heap, v, 0).unwrap()));
    }

    #[test]
    fn test_string_na_is_identity() {
        let heap = Heap::new();
        let v = heap.alloc_string(&[Some("NA"), None]);
        // A literal "NA" string is a different CHARSXP than NA_STRING
        assert_eq!(get_string_opt(&heap, v, 0), Ok(Some("NA".to_string())));
        assert_eq!(get_string_opt(&heap, v, 1), Ok(None));
        assert_eq!(get_string(&heap, v, 1), Ok("NA".to_string()));
    }

    #[test]
    fn test_one_past_end() {
        let heap = Heap::new();
        let v = heap.alloc_real(&[1.0, 2.0]);
        assert_eq!(
            get_real(&heap, v, 2),
            Err(BridgeError::IndexOutOfRange { offset: 2, length: 2 })
        );
        let empty = heap.alloc_string(&[]);
        assert_eq!(
            get_string_opt(&heap, empty, 0),
            Err(BridgeError::IndexOutOfRange { offset: 0, length: 0 })
        );
    }

    #[test]
    fn test_wrong_kind() {
        let heap = Heap::new();
        let v = heap.alloc_real(&[1.0]);
        assert_eq!(
            get_integer(&heap, v, 0),
            Err(BridgeError::mismatch("integer vector", SexpType::Real))
        );
        let sym = heap.install("x");
        assert_eq!(
            get_value(&heap, sym, 0),
            Err(BridgeError::mismatch("list or expression vector", SexpType::Symbol))
        );
    }

    #[test]
    fn test_matrix_column_major() {
        let heap = Heap::new();
        let m = heap.alloc_integer(&[0, 1, 2, 3, 4, 5]);
        heap.set_dim(m, 3, 2).unwrap();

        assert_eq!(matrix_offset(&heap, m, 1, 1), Ok(4));
        assert_eq!(get_integer_2d(&heap, m, 1, 1), get_integer(&heap, m, 4));
        assert_eq!(get_integer_2d(&heap, m, 2, 0), Ok(2));
        assert_eq!(
            get_integer_2d(&heap, m, 3, 0),
            Err(BridgeError::MatrixIndexOutOfRange { row: 3, column: 0, nrow: 3, ncol: 2 })
        );
        assert_eq!(
            get_integer_2d(&heap, m, 0, 2),
            Err(BridgeError::MatrixIndexOutOfRange { row: 0, column: 2, nrow: 3, ncol: 2 })
        );
    }

    #[test]
    fn test_plain_vector_is_one_column() {
        let heap = Heap::new();
        let v = heap.alloc_real(&[1.0, 2.0, 3.0]);
        assert_eq!(get_real_2d(&heap, v, 2, 0), Ok(3.0));
        assert!(get_real_2d(&heap, v, 0, 1).is_err());
    }

    #[test]
    fn test_generic_vector() {
        let heap = Heap::new();
        let a = heap.alloc_integer(&[1]);
        let b = heap.alloc_string(&[Some("b")]);
        let list = heap.alloc_list(&[a, b]);
        let expr = heap.alloc_expression(&[b]);

        assert_eq!(get_value(&heap, list, 1), Ok(b));
        assert_eq!(get_value(&heap, expr, 0), Ok(b));
        assert_eq!(get_string(&heap, get_value(&heap, list, 1).unwrap(), 0), Ok("b".to_string()));
    }

    #[test]
    fn test_non_utf8_string_reads_as_bytes() {
        let heap = Heap::new();
        let s = heap.alloc_string(&[Some("tea"), None, Some("x")]);
        // "café" in Latin-1
        let latin1 = heap.mk_char_bytes(&[0x63, 0x61, 0x66, 0xe9]);
        heap.set_string_elt(s, 2, latin1).unwrap();

        assert_eq!(get_string_bytes_opt(&heap, s, 2), Ok(Some(vec![0x63, 0x61, 0x66, 0xe9])));
        assert_eq!(get_string_bytes(&heap, s, 2), Ok(vec![0x63, 0x61, 0x66, 0xe9]));
        assert!(matches!(get_string_opt(&heap, s, 2), Err(BridgeError::Encoding(_))));
        assert!(matches!(get_string(&heap, s, 2), Err(BridgeError::Encoding(_))));

        assert_eq!(get_string_bytes_opt(&heap, s, 0), Ok(Some(b"tea".to_vec())));
        assert_eq!(get_string_bytes_opt(&heap, s, 1), Ok(None));
        assert_eq!(get_string_bytes(&heap, s, 1), Ok(b"NA".to_vec()));
        assert_eq!(
            get_string_bytes(&heap, s, 3),
            Err(BridgeError::IndexOutOfRange { offset: 3, length: 3 })
        );
    }

    #[test]
    fn test_string_bytes_matrix_cell() {
        let heap = Heap::new();
        let m = heap.alloc_string(&[Some("a"), None, Some("c"), Some("d")]);
        heap.set_dim(m, 2, 2).unwrap();
        heap.set_string_elt(m, 3, heap.mk_char_bytes(&[0xff])).unwrap();

        assert_eq!(get_string_bytes_2d(&heap, m, 0, 1), Ok(b"c".to_vec()));
        assert_eq!(get_string_bytes_opt_2d(&heap, m, 1, 0), Ok(None));
        assert_eq!(get_string_bytes_opt_2d(&heap, m, 1, 1), Ok(Some(vec![0xff])));
        assert!(matches!(
            get_string_bytes_2d(&heap, m, 2, 0),
            Err(BridgeError::MatrixIndexOutOfRange { .. })
        ));
    }
}
