//! Error types for the accessor bridge

use crate::sexptype::SexpType;

/// Result type for bridge calls
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Contract violations detected before touching foreign memory
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    /// Linear offset outside `0..length`
    #[error("Index out of range: offset {offset} for vector of length {length}")]
    IndexOutOfRange {
        /// Requested offset
        offset: usize,
        /// Vector length
        length: usize,
    },

    /// Matrix cell outside the `dim` attribute
    #[error("Index out of range: cell [{row}, {column}] for {nrow}x{ncol} matrix")]
    MatrixIndexOutOfRange {
        /// Requested row (0-indexed)
        row: usize,
        /// Requested column (0-indexed)
        column: usize,
        /// Row count
        nrow: usize,
        /// Column count
        ncol: usize,
    },

    /// Tag not valid for the requested operation
    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        /// What the operation accepts
        expected: &'static str,
        /// Tag actually found
        found: SexpType,
    },

    /// Header carries a tag code outside the known set
    #[error("Unknown SEXPTYPE code {0}")]
    UnknownType(u32),

    /// Referent was reclaimed by a foreign collection
    #[error("Stale handle {0:#x}: value was reclaimed by the collector")]
    StaleHandle(u64),

    /// Iterator walked more links than the configured depth guard
    #[error("Traversal exceeded {limit} links (cyclic or malformed chain?)")]
    TraversalLimit {
        /// Configured limit
        limit: usize,
    },

    /// `dim` attribute is present but not a usable (nrow, ncol) pair
    #[error("Invalid dim attribute: {0}")]
    InvalidDimensions(String),

    /// CHARSXP contents are not valid UTF-8
    #[error("CHARSXP is not valid UTF-8: {0}")]
    Encoding(String),
}

impl BridgeError {
    /// Shorthand for a [`BridgeError::TypeMismatch`]
    pub fn mismatch(expected: &'static str, found: SexpType) -> Self {
        BridgeError::TypeMismatch { expected, found }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = BridgeError::IndexOutOfRange { offset: 6, length: 6 };
        assert_eq!(
            err.to_string(),
            "Index out of range: offset 6 for vector of length 6"
        );

        let err = BridgeError::mismatch("integer vector", SexpType::Real);
        assert_eq!(err.to_string(), "Type mismatch: expected integer vector, got double");
    }
}
