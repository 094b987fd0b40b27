//! NA sentinel codec
//!
//! The runtime marks missing elements in-band, with a reserved value per
//! element kind. These functions turn a raw element into `Option<T>`:
//! `None` exactly when the raw element is the kind's sentinel.
//!
//! ```text
//! logical: i32::MIN (neither 0 nor 1)
//! integer: i32::MIN
//! real:    NaN whose low 32-bit word is 1954  (bits 0x7FF00000_000007A2)
//! string:  pointer identity with the runtime's NA_STRING CHARSXP
//! ```
//!
//! A NaN produced by arithmetic is *not* NA: only the reserved payload counts.

use crate::sexp::Sexp;

/// Raw logical NA
pub const NA_LOGICAL: i32 = i32::MIN;

/// Raw integer NA
pub const NA_INTEGER: i32 = i32::MIN;

/// Low word the runtime stores in its NA NaN
pub const NA_REAL_PAYLOAD: u32 = 1954;

/// Bit pattern of the runtime's `NA_real_`
pub const NA_REAL_BITS: u64 = 0x7FF0_0000_0000_0000 | NA_REAL_PAYLOAD as u64;

/// The runtime's `NA_real_`
#[inline]
pub fn na_real() -> f64 {
    f64::from_bits(NA_REAL_BITS)
}

/// True if `x` is the NA NaN (not just any NaN)
#[inline]
pub fn is_na_real(x: f64) -> bool {
    x.is_nan() && (x.to_bits() as u32) == NA_REAL_PAYLOAD
}

/// Decode a raw logical element
#[inline]
pub fn decode_logical(raw: i32) -> Option<bool> {
    if raw == NA_LOGICAL {
        None
    } else {
        Some(raw != 0)
    }
}

/// Decode a raw integer element
#[inline]
pub fn decode_integer(raw: i32) -> Option<i32> {
    if raw == NA_INTEGER {
        None
    } else {
        Some(raw)
    }
}

/// Decode a raw real element
#[inline]
pub fn decode_real(raw: f64) -> Option<f64> {
    if is_na_real(raw) {
        None
    } else {
        Some(raw)
    }
}

/// Decode a raw string element against the runtime's canonical NA CHARSXP
#[inline]
pub fn decode_string(raw: Sexp, na_string: Sexp) -> Option<Sexp> {
    if raw == na_string {
        None
    } else {
        Some(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sentinels_decode_to_none() {
        assert_eq!(decode_logical(NA_LOGICAL), None);
        assert_eq!(decode_integer(NA_INTEGER), None);
        assert_eq!(decode_real(na_real()), None);
        let na = Sexp::from_bits(0x40);
        assert_eq!(decode_string(na, na), None);
    }

    #[test]
    fn test_arithmetic_nan_is_not_na() {
        let nan = f64::NAN;
        assert!(!is_na_real(nan));
        assert!(decode_real(nan).unwrap().is_nan());
        let nan_from_zero_div = 0.0f64 / 0.0;
        assert!(decode_real(nan_from_zero_div).is_some());
    }

    #[test]
    fn test_logical_truthiness() {
        assert_eq!(decode_logical(0), Some(false));
        assert_eq!(decode_logical(1), Some(true));
        assert_eq!(decode_logical(-7), Some(true));
    }

    #[test]
    fn test_string_identity_not_contents() {
        let na = Sexp::from_bits(0x40);
        let other = Sexp::from_bits(0x48);
        assert_eq!(decode_string(other, na), Some(other));
    }

    proptest! {
        #[test]
        fn prop_integer_roundtrip(x in any::<i32>().prop_filter("not NA", |x| *x != NA_INTEGER)) {
            prop_assert_eq!(decode_integer(x), Some(x));
        }

        #[test]
        fn prop_real_roundtrip(x in any::<f64>().prop_filter("not NA", |x| !is_na_real(*x))) {
            let decoded = decode_real(x).unwrap();
            prop_assert_eq!(decoded.to_bits(), x.to_bits());
        }

        #[test]
        fn prop_logical_roundtrip(x in any::<i32>().prop_filter("not NA", |x| *x != NA_LOGICAL)) {
            prop_assert_eq!(decode_logical(x), Some(x != 0));
        }
    }
}
