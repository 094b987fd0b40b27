//! Record header and payload layouts
//!
//! Every slot of the in-process heap holds one [`Record`]: a header with the
//! type tag and mark bit, the attribute pairlist, and a payload whose shape
//! follows the tag.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ RecordHeader                 │
//! │  - ty: SexpType              │
//! │  - marked: bool              │
//! ├──────────────────────────────┤
//! │ attrib: Sexp (pairlist/nil)  │
//! ├──────────────────────────────┤
//! │ Payload (per tag)            │
//! └──────────────────────────────┘
//! ```

use rinspect_sdk::{Field, Sexp, SexpType};

/// Header stored at the front of each record
#[derive(Debug, Clone, Copy)]
pub struct RecordHeader {
    ty: SexpType,
    marked: bool,
}

impl RecordHeader {
    /// Create an unmarked header
    pub fn new(ty: SexpType) -> Self {
        Self { ty, marked: false }
    }

    /// Declared tag
    #[inline]
    pub fn ty(&self) -> SexpType {
        self.ty
    }

    /// Check the mark bit
    #[inline]
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Set the mark bit
    #[inline]
    pub fn mark(&mut self) {
        self.marked = true;
    }

    /// Clear the mark bit (for the next cycle)
    #[inline]
    pub fn unmark(&mut self) {
        self.marked = false;
    }
}

/// Tag-specific contents of a record
#[derive(Debug, Clone)]
pub enum Payload {
    /// `NILSXP`
    Nil,
    /// `SYMSXP`
    Symbol {
        /// CHARSXP print name
        pname: Sexp,
        /// Global binding
        value: Sexp,
        /// Primitive bound via `.Internal`
        internal: Sexp,
    },
    /// `LISTSXP`, `LANGSXP`, `DOTSXP`
    Cons {
        /// Head
        car: Sexp,
        /// Tail
        cdr: Sexp,
        /// Name (symbol or nil)
        tag: Sexp,
    },
    /// `CLOSXP`
    Closure {
        /// Formal argument pairlist
        formals: Sexp,
        /// Body expression
        body: Sexp,
        /// Defining environment
        env: Sexp,
    },
    /// `ENVSXP`
    Environment {
        /// Binding pairlist
        frame: Sexp,
        /// Parent environment
        enclos: Sexp,
        /// Bucket vector (nil for unhashed environments)
        hashtab: Sexp,
    },
    /// `PROMSXP`
    Promise {
        /// Forced value (unbound marker until forced)
        value: Sexp,
        /// Unevaluated expression
        expr: Sexp,
        /// Evaluation environment (nil once forced)
        env: Sexp,
    },
    /// `SPECIALSXP` / `BUILTINSXP`: offset into the primitive table
    Primitive(u32),
    /// `CHARSXP`
    Char(Box<[u8]>),
    /// `LGLSXP`
    Logical(Vec<i32>),
    /// `INTSXP`
    Integer(Vec<i32>),
    /// `REALSXP`
    Real(Vec<f64>),
    /// `STRSXP`: CHARSXP elements
    Strings(Vec<Sexp>),
    /// `VECSXP` / `EXPRSXP`
    Values(Vec<Sexp>),
}

impl Payload {
    /// Element count for vector payloads
    pub fn len(&self) -> Option<usize> {
        match self {
            Payload::Char(bytes) => Some(bytes.len()),
            Payload::Logical(v) | Payload::Integer(v) => Some(v.len()),
            Payload::Real(v) => Some(v.len()),
            Payload::Strings(v) | Payload::Values(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Read a named pointer field
    pub fn field(&self, field: Field) -> Option<Sexp> {
        match (self, field) {
            (Payload::Cons { car, .. }, Field::Car) => Some(*car),
            (Payload::Cons { cdr, .. }, Field::Cdr) => Some(*cdr),
            (Payload::Cons { tag, .. }, Field::Tag) => Some(*tag),
            (Payload::Environment { frame, .. }, Field::Frame) => Some(*frame),
            (Payload::Environment { enclos, .. }, Field::Enclos) => Some(*enclos),
            (Payload::Environment { hashtab, .. }, Field::HashTab) => Some(*hashtab),
            (Payload::Closure { formals, .. }, Field::Formals) => Some(*formals),
            (Payload::Closure { body, .. }, Field::Body) => Some(*body),
            (Payload::Closure { env, .. }, Field::CloEnv) => Some(*env),
            (Payload::Symbol { pname, .. }, Field::PrintName) => Some(*pname),
            (Payload::Symbol { value, .. }, Field::SymValue) => Some(*value),
            (Payload::Symbol { internal, .. }, Field::Internal) => Some(*internal),
            (Payload::Promise { value, .. }, Field::PrValue) => Some(*value),
            (Payload::Promise { expr, .. }, Field::PrCode) => Some(*expr),
            (Payload::Promise { env, .. }, Field::PrEnv) => Some(*env),
            _ => None,
        }
    }

    /// Mutable access to a named pointer field
    pub fn field_mut(&mut self, field: Field) -> Option<&mut Sexp> {
        match (self, field) {
            (Payload::Cons { car, .. }, Field::Car) => Some(car),
            (Payload::Cons { cdr, .. }, Field::Cdr) => Some(cdr),
            (Payload::Cons { tag, .. }, Field::Tag) => Some(tag),
            (Payload::Environment { frame, .. }, Field::Frame) => Some(frame),
            (Payload::Environment { enclos, .. }, Field::Enclos) => Some(enclos),
            (Payload::Environment { hashtab, .. }, Field::HashTab) => Some(hashtab),
            (Payload::Closure { formals, .. }, Field::Formals) => Some(formals),
            (Payload::Closure { body, .. }, Field::Body) => Some(body),
            (Payload::Closure { env, .. }, Field::CloEnv) => Some(env),
            (Payload::Symbol { pname, .. }, Field::PrintName) => Some(pname),
            (Payload::Symbol { value, .. }, Field::SymValue) => Some(value),
            (Payload::Symbol { internal, .. }, Field::Internal) => Some(internal),
            (Payload::Promise { value, .. }, Field::PrValue) => Some(value),
            (Payload::Promise { expr, .. }, Field::PrCode) => Some(expr),
            (Payload::Promise { env, .. }, Field::PrEnv) => Some(env),
            _ => None,
        }
    }

    /// Visit every handle this payload references
    pub fn for_each_child(&self, mut f: impl FnMut(Sexp)) {
        match self {
            Payload::Symbol { pname, value, internal } => {
                f(*pname);
                f(*value);
                f(*internal);
            }
            Payload::Cons { car, cdr, tag } => {
                f(*car);
                f(*cdr);
                f(*tag);
            }
            Payload::Closure { formals, body, env } => {
                f(*formals);
                f(*body);
                f(*env);
            }
            Payload::Environment { frame, enclos, hashtab } => {
                f(*frame);
                f(*enclos);
                f(*hashtab);
            }
            Payload::Promise { value, expr, env } => {
                f(*value);
                f(*expr);
                f(*env);
            }
            Payload::Strings(items) | Payload::Values(items) => items.iter().copied().for_each(f),
            Payload::Nil
            | Payload::Primitive(_)
            | Payload::Char(_)
            | Payload::Logical(_)
            | Payload::Integer(_)
            | Payload::Real(_) => {}
        }
    }
}

/// One heap record
#[derive(Debug, Clone)]
pub struct Record {
    /// Tag and mark bit
    pub header: RecordHeader,
    /// Attribute pairlist
    pub attrib: Sexp,
    /// Contents
    pub payload: Payload,
}

impl Record {
    /// Create a record with no attributes
    pub fn new(ty: SexpType, nil: Sexp, payload: Payload) -> Self {
        Self {
            header: RecordHeader::new(ty),
            attrib: nil,
            payload,
        }
    }
}
