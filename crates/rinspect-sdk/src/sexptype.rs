//! SexpType: the foreign runtime's type tag
//!
//! Discriminants are the runtime's own `SEXPTYPE` codes so that a tag read
//! straight out of a header (or returned by `TYPEOF`) converts without a table.

/// Declared type tag of a foreign value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SexpType {
    /// `NILSXP`: the empty-list terminator
    Nil = 0,
    /// `SYMSXP`
    Symbol = 1,
    /// `LISTSXP`: pairlist cell
    Pairlist = 2,
    /// `CLOSXP`
    Closure = 3,
    /// `ENVSXP`
    Environment = 4,
    /// `PROMSXP`
    Promise = 5,
    /// `LANGSXP`: call, pairlist-shaped
    Language = 6,
    /// `SPECIALSXP`
    Special = 7,
    /// `BUILTINSXP`
    Builtin = 8,
    /// `CHARSXP`: internal string scalar
    Char = 9,
    /// `LGLSXP`
    Logical = 10,
    /// `INTSXP`
    Integer = 13,
    /// `REALSXP`
    Real = 14,
    /// `CPLXSXP`
    Complex = 15,
    /// `STRSXP`: vector of CHARSXPs
    String = 16,
    /// `DOTSXP`: `...` pairlist
    Dots = 17,
    /// `ANYSXP`
    Any = 18,
    /// `VECSXP`: generic vector (list)
    List = 19,
    /// `EXPRSXP`: expression vector
    Expression = 20,
    /// `BCODESXP`
    Bytecode = 21,
    /// `EXTPTRSXP`
    ExternalPtr = 22,
    /// `WEAKREFSXP`
    WeakRef = 23,
    /// `RAWSXP`
    Raw = 24,
    /// `S4SXP`
    S4 = 25,
}

impl SexpType {
    /// Convert a raw `SEXPTYPE` code
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Self::Nil,
            1 => Self::Symbol,
            2 => Self::Pairlist,
            3 => Self::Closure,
            4 => Self::Environment,
            5 => Self::Promise,
            6 => Self::Language,
            7 => Self::Special,
            8 => Self::Builtin,
            9 => Self::Char,
            10 => Self::Logical,
            13 => Self::Integer,
            14 => Self::Real,
            15 => Self::Complex,
            16 => Self::String,
            17 => Self::Dots,
            18 => Self::Any,
            19 => Self::List,
            20 => Self::Expression,
            21 => Self::Bytecode,
            22 => Self::ExternalPtr,
            23 => Self::WeakRef,
            24 => Self::Raw,
            25 => Self::S4,
            _ => return None,
        })
    }

    /// Raw `SEXPTYPE` code
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// True for tags whose record carries a length and a contiguous payload
    pub const fn is_vector(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Logical
                | Self::Integer
                | Self::Real
                | Self::Complex
                | Self::String
                | Self::List
                | Self::Expression
                | Self::Raw
        )
    }

    /// True for the three-field cons-cell layouts (`CAR`/`CDR`/`TAG`)
    pub const fn is_pairlist_like(self) -> bool {
        matches!(self, Self::Pairlist | Self::Language | Self::Dots)
    }

    /// True for vectors whose elements are themselves foreign values
    pub const fn is_generic_vector(self) -> bool {
        matches!(self, Self::List | Self::Expression)
    }

    /// Runtime's name for the tag, as printed by `typeof()`
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nil => "NULL",
            Self::Symbol => "symbol",
            Self::Pairlist => "pairlist",
            Self::Closure => "closure",
            Self::Environment => "environment",
            Self::Promise => "promise",
            Self::Language => "language",
            Self::Special => "special",
            Self::Builtin => "builtin",
            Self::Char => "char",
            Self::Logical => "logical",
            Self::Integer => "integer",
            Self::Real => "double",
            Self::Complex => "complex",
            Self::String => "character",
            Self::Dots => "...",
            Self::Any => "any",
            Self::List => "list",
            Self::Expression => "expression",
            Self::Bytecode => "bytecode",
            Self::ExternalPtr => "externalptr",
            Self::WeakRef => "weakref",
            Self::Raw => "raw",
            Self::S4 => "S4",
        }
    }
}

impl std::fmt::Display for SexpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
