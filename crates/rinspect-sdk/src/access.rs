//! SexpAccess trait: the capability interface over foreign memory
//!
//! Every read of a foreign record goes through this trait. Backends implement
//! it either on top of the runtime's public accessor functions, by reading the
//! record layout directly, or (for the in-process heap) by indexing their own
//! arena. Callers never mix backends: one session, one implementation.
//!
//! Header reads (`type_of`, `attrib`) are safe and total for live handles.
//! Payload reads are `unsafe`: they trust that the tag and bounds were already
//! checked, which is exactly what the checked layer in `rinspect-engine` does
//! before calling them.

use crate::error::BridgeResult;
use crate::sexp::Sexp;
use crate::sexptype::SexpType;

/// Named pointer fields of the non-vector record layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Pairlist head (`CAR`)
    Car,
    /// Pairlist tail (`CDR`)
    Cdr,
    /// Pairlist tag (`TAG`)
    Tag,
    /// Environment frame (`FRAME`)
    Frame,
    /// Enclosing environment (`ENCLOS`)
    Enclos,
    /// Environment hash table (`HASHTAB`)
    HashTab,
    /// Closure formals (`FORMALS`)
    Formals,
    /// Closure body (`BODY`)
    Body,
    /// Closure environment (`CLOENV`)
    CloEnv,
    /// Symbol print name (`PRINTNAME`)
    PrintName,
    /// Symbol value (`SYMVALUE`)
    SymValue,
    /// Symbol internal binding (`INTERNAL`)
    Internal,
    /// Promise value (`PRVALUE`)
    PrValue,
    /// Promise expression (`PRCODE`)
    PrCode,
    /// Promise environment (`PRENV`)
    PrEnv,
}

impl Field {
    /// Tags whose layout contains this field
    pub fn accepts(self, ty: SexpType) -> bool {
        match self {
            Field::Car | Field::Cdr | Field::Tag => ty.is_pairlist_like(),
            Field::Frame | Field::Enclos | Field::HashTab => ty == SexpType::Environment,
            Field::Formals | Field::Body | Field::CloEnv => ty == SexpType::Closure,
            Field::PrintName | Field::SymValue | Field::Internal => ty == SexpType::Symbol,
            Field::PrValue | Field::PrCode | Field::PrEnv => ty == SexpType::Promise,
        }
    }

    /// Description of the accepted layout, for error messages
    pub fn layout_name(self) -> &'static str {
        match self {
            Field::Car | Field::Cdr | Field::Tag => "pairlist",
            Field::Frame | Field::Enclos | Field::HashTab => "environment",
            Field::Formals | Field::Body | Field::CloEnv => "closure",
            Field::PrintName | Field::SymValue | Field::Internal => "symbol",
            Field::PrValue | Field::PrCode | Field::PrEnv => "promise",
        }
    }
}

/// Abstract read access to one foreign runtime's heap.
///
/// # Rooting
///
/// `preserve`/`release` register a value with the foreign collector's
/// precious list. They nest: a value preserved twice stays rooted until it
/// has been released twice. Use `rinspect_engine::root::Protected` rather
/// than calling them directly.
pub trait SexpAccess {
    // ========================================================================
    // Canonical values
    // ========================================================================

    /// The empty-list terminator (`R_NilValue`)
    fn nil(&self) -> Sexp;

    /// The canonical missing-string CHARSXP (`NA_STRING`)
    fn na_string(&self) -> Sexp;

    /// The `dim` symbol (`R_DimSymbol`)
    fn dim_symbol(&self) -> Sexp;

    // ========================================================================
    // Header reads
    // ========================================================================

    /// Read the type tag.
    ///
    /// Backends that can detect a reclaimed referent fail with
    /// `BridgeError::StaleHandle`; others cannot and return whatever the
    /// memory holds.
    fn type_of(&self, x: Sexp) -> BridgeResult<SexpType>;

    /// Read the attribute pairlist (nil when there are none)
    fn attrib(&self, x: Sexp) -> BridgeResult<Sexp>;

    // ========================================================================
    // Payload reads
    // ========================================================================

    /// Element count of a vector-shaped value.
    ///
    /// # Safety
    /// `x` must be live and `type_of(x)` must satisfy `is_vector()`.
    unsafe fn length(&self, x: Sexp) -> usize;

    /// Raw element of a logical vector.
    ///
    /// # Safety
    /// `x` must be a live `Logical` vector and `offset < length(x)`.
    unsafe fn logical_elt(&self, x: Sexp, offset: usize) -> i32;

    /// Raw element of an integer vector.
    ///
    /// # Safety
    /// `x` must be a live `Integer` vector and `offset < length(x)`.
    unsafe fn integer_elt(&self, x: Sexp, offset: usize) -> i32;

    /// Raw element of a real vector.
    ///
    /// # Safety
    /// `x` must be a live `Real` vector and `offset < length(x)`.
    unsafe fn real_elt(&self, x: Sexp, offset: usize) -> f64;

    /// CHARSXP element of a string vector.
    ///
    /// # Safety
    /// `x` must be a live `String` vector and `offset < length(x)`.
    unsafe fn string_elt(&self, x: Sexp, offset: usize) -> Sexp;

    /// Element of a generic (`List`/`Expression`) vector.
    ///
    /// # Safety
    /// `x` must be a live generic vector and `offset < length(x)`.
    unsafe fn vector_elt(&self, x: Sexp, offset: usize) -> Sexp;

    /// Copy of a CHARSXP's bytes (without terminator).
    ///
    /// # Safety
    /// `x` must be a live `Char` value.
    unsafe fn char_bytes(&self, x: Sexp) -> Vec<u8>;

    /// Pointer field of a non-vector record.
    ///
    /// # Safety
    /// `x` must be live and `field.accepts(type_of(x))` must hold.
    unsafe fn field(&self, x: Sexp, field: Field) -> Sexp;

    // ========================================================================
    // Rooting
    // ========================================================================

    /// Register `x` with the foreign collector
    fn preserve(&self, x: Sexp);

    /// Undo one `preserve(x)`
    fn release(&self, x: Sexp);
}
