//! Construction API of the in-process runtime
//!
//! This is the runtime's own allocation surface, the counterpart of the
//! foreign runtime's `allocVector`/`cons`/`install`/`setAttrib`. The bridge
//! never calls it; tests, benches, and embedders use it to create values.
//!
//! Every builder that allocates more than once protects its intermediate
//! results, so an automatic collection in the middle cannot free them.

use super::header::Payload;
use super::runtime::Heap;
use rinspect_sdk::na::NA_LOGICAL;
use rinspect_sdk::{BridgeError, BridgeResult, Field, Sexp, SexpType};

/// `R_Newhashpjw`, the runtime's symbol-name hash for environment buckets
fn hashpjw(name: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for &c in name {
        h = (h << 4).wrapping_add(c as u32);
        let g = h & 0xf000_0000;
        if g != 0 {
            h ^= g >> 24;
            h ^= g;
        }
    }
    h
}

impl Heap {
    // ========================================================================
    // Protection stack
    // ========================================================================

    /// Push `x` onto the protection stack and return it
    pub fn protect(&self, x: Sexp) -> Sexp {
        self.roots.borrow_mut().protect(x);
        x
    }

    /// Pop `n` entries off the protection stack
    pub fn unprotect(&self, n: usize) {
        if !self.roots.borrow_mut().unprotect(n) {
            tracing::warn!(n, "unprotect: protection stack imbalance");
        }
    }

    /// Remove the topmost protection of `x`
    pub fn unprotect_ptr(&self, x: Sexp) {
        if !self.roots.borrow_mut().unprotect_ptr(x) {
            tracing::warn!(handle = ?x, "unprotect_ptr: handle not on protection stack");
        }
    }

    /// Current protection stack depth
    pub fn protect_depth(&self) -> usize {
        self.roots.borrow().stack_depth()
    }

    // ========================================================================
    // Strings and symbols
    // ========================================================================

    /// Cached CHARSXP for `s`
    pub fn mk_char(&self, s: &str) -> Sexp {
        self.mk_char_bytes(s.as_bytes())
    }

    /// Cached CHARSXP for raw bytes (no encoding check)
    pub fn mk_char_bytes(&self, bytes: &[u8]) -> Sexp {
        if let Some(&cached) = self.chars.borrow().get(bytes) {
            if self.is_live(cached) {
                return cached;
            }
        }
        let x = self.alloc(SexpType::Char, Payload::Char(bytes.into()));
        self.chars.borrow_mut().insert(bytes.into(), x);
        x
    }

    /// Interned symbol for `name` (`install`)
    pub fn install(&self, name: &str) -> Sexp {
        if let Some(&sym) = self.symbols.borrow().get(name) {
            return sym;
        }
        let pname = self.protect(self.mk_char(name));
        let sym = self.alloc(
            SexpType::Symbol,
            Payload::Symbol {
                pname,
                value: self.unbound,
                internal: self.nil,
            },
        );
        self.unprotect(1);
        self.symbols.borrow_mut().insert(name.to_string(), sym);
        sym
    }

    // ========================================================================
    // Vectors
    // ========================================================================

    /// Logical vector; `None` becomes NA
    pub fn alloc_logical(&self, values: &[Option<bool>]) -> Sexp {
        let raw: Vec<i32> = values
            .iter()
            .map(|v| v.map_or(NA_LOGICAL, i32::from))
            .collect();
        self.alloc(SexpType::Logical, Payload::Logical(raw))
    }

    /// Logical vector from raw cells (sentinel included)
    pub fn alloc_logical_raw(&self, raw: &[i32]) -> Sexp {
        self.alloc(SexpType::Logical, Payload::Logical(raw.to_vec()))
    }

    /// Integer vector from raw cells (`i32::MIN` is NA)
    pub fn alloc_integer(&self, values: &[i32]) -> Sexp {
        self.alloc(SexpType::Integer, Payload::Integer(values.to_vec()))
    }

    /// Real vector from raw cells
    pub fn alloc_real(&self, values: &[f64]) -> Sexp {
        self.alloc(SexpType::Real, Payload::Real(values.to_vec()))
    }

    /// String vector; `None` becomes `NA_STRING`
    pub fn alloc_string(&self, values: &[Option<&str>]) -> Sexp {
        let mut elements = Vec::with_capacity(values.len());
        for value in values {
            let charsxp = match value {
                Some(s) => self.protect(self.mk_char(s)),
                None => self.protect(self.na_string),
            };
            elements.push(charsxp);
        }
        let x = self.alloc(SexpType::String, Payload::Strings(elements));
        self.unprotect(values.len());
        x
    }

    /// `SET_STRING_ELT`: store any CHARSXP, including ones not valid UTF-8
    pub fn set_string_elt(&self, x: Sexp, offset: usize, charsxp: Sexp) -> BridgeResult<()> {
        let mut arena = self.arena.borrow_mut();
        let value_ty = arena
            .get(charsxp)
            .ok_or(BridgeError::StaleHandle(charsxp.to_bits()))?
            .header
            .ty();
        if value_ty != SexpType::Char {
            return Err(BridgeError::mismatch("char", value_ty));
        }
        let record = arena.get_mut(x).ok_or(BridgeError::StaleHandle(x.to_bits()))?;
        let ty = record.header.ty();
        let Payload::Strings(elements) = &mut record.payload else {
            return Err(BridgeError::mismatch("character vector", ty));
        };
        let length = elements.len();
        let slot = elements
            .get_mut(offset)
            .ok_or(BridgeError::IndexOutOfRange { offset, length })?;
        *slot = charsxp;
        Ok(())
    }

    /// Generic vector (`VECSXP`)
    pub fn alloc_list(&self, items: &[Sexp]) -> Sexp {
        self.alloc(SexpType::List, Payload::Values(items.to_vec()))
    }

    /// Expression vector (`EXPRSXP`)
    pub fn alloc_expression(&self, items: &[Sexp]) -> Sexp {
        self.alloc(SexpType::Expression, Payload::Values(items.to_vec()))
    }

    // ========================================================================
    // Pairlists
    // ========================================================================

    /// Pairlist cell with a nil tag
    pub fn cons(&self, car: Sexp, cdr: Sexp) -> Sexp {
        self.alloc(
            SexpType::Pairlist,
            Payload::Cons { car, cdr, tag: self.nil },
        )
    }

    /// Call cell (`LANGSXP`) with a nil tag
    pub fn lcons(&self, car: Sexp, cdr: Sexp) -> Sexp {
        self.alloc(
            SexpType::Language,
            Payload::Cons { car, cdr, tag: self.nil },
        )
    }

    /// Build a nil-terminated pairlist from `(name, value)` pairs
    pub fn pairlist(&self, items: &[(Option<&str>, Sexp)]) -> Sexp {
        for (_, value) in items {
            self.protect(*value);
        }
        let mut list = self.nil;
        let mut protected = items.len();
        for (name, value) in items.iter().rev() {
            let tag = match name {
                Some(name) => self.install(name),
                None => self.nil,
            };
            list = self.alloc(
                SexpType::Pairlist,
                Payload::Cons { car: *value, cdr: list, tag },
            );
            self.protect(list);
            protected += 1;
        }
        self.unprotect(protected);
        list
    }

    /// Overwrite a pointer field (`SETCAR`, `SETCDR`, `SET_TAG`, ...)
    pub fn set_field(&self, x: Sexp, field: Field, value: Sexp) -> BridgeResult<()> {
        let mut arena = self.arena.borrow_mut();
        let record = arena
            .get_mut(x)
            .ok_or(BridgeError::StaleHandle(x.to_bits()))?;
        let ty = record.header.ty();
        if !field.accepts(ty) {
            return Err(BridgeError::mismatch(field.layout_name(), ty));
        }
        match record.payload.field_mut(field) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(BridgeError::mismatch(field.layout_name(), ty)),
        }
    }

    /// `SETCDR`
    pub fn set_cdr(&self, cell: Sexp, cdr: Sexp) -> BridgeResult<()> {
        self.set_field(cell, Field::Cdr, cdr)
    }

    /// `SET_TAG`
    pub fn set_tag(&self, cell: Sexp, tag: Sexp) -> BridgeResult<()> {
        self.set_field(cell, Field::Tag, tag)
    }

    // ========================================================================
    // Closures, environments, promises, primitives
    // ========================================================================

    /// Closure record
    pub fn closure(&self, formals: Sexp, body: Sexp, env: Sexp) -> Sexp {
        self.alloc(SexpType::Closure, Payload::Closure { formals, body, env })
    }

    /// Unhashed environment with an empty frame
    pub fn new_env(&self, enclos: Sexp) -> Sexp {
        self.alloc(
            SexpType::Environment,
            Payload::Environment {
                frame: self.nil,
                enclos,
                hashtab: self.nil,
            },
        )
    }

    /// Hashed environment with `buckets` empty chains
    pub fn new_hashed_env(&self, enclos: Sexp, buckets: usize) -> Sexp {
        self.protect(enclos);
        let table = self.protect(self.alloc_list(&vec![self.nil; buckets.max(1)]));
        let env = self.alloc(
            SexpType::Environment,
            Payload::Environment {
                frame: self.nil,
                enclos,
                hashtab: table,
            },
        );
        self.unprotect(2);
        env
    }

    /// Bind `name` to `value` in `env` (frame or hash bucket)
    pub fn define(&self, env: Sexp, name: &str, value: Sexp) -> BridgeResult<()> {
        self.protect(env);
        self.protect(value);
        let result = self.define_protected(env, name, value);
        self.unprotect(2);
        result
    }

    fn define_protected(&self, env: Sexp, name: &str, value: Sexp) -> BridgeResult<()> {
        let sym = self.install(name);
        let (frame, hashtab) = {
            let arena = self.arena.borrow();
            let record = arena.get(env).ok_or(BridgeError::StaleHandle(env.to_bits()))?;
            match record.payload {
                Payload::Environment { frame, hashtab, .. } => (frame, hashtab),
                _ => return Err(BridgeError::mismatch("environment", record.header.ty())),
            }
        };

        if hashtab == self.nil {
            let cell = self.alloc(SexpType::Pairlist, Payload::Cons { car: value, cdr: frame, tag: sym });
            return self.set_field(env, Field::Frame, cell);
        }

        let bucket = {
            let arena = self.arena.borrow();
            match arena.get(hashtab).map(|r| &r.payload) {
                Some(Payload::Values(buckets)) => {
                    let index = hashpjw(name.as_bytes()) as usize % buckets.len();
                    (index, buckets[index])
                }
                _ => return Err(BridgeError::StaleHandle(hashtab.to_bits())),
            }
        };
        let cell = self.alloc(
            SexpType::Pairlist,
            Payload::Cons { car: value, cdr: bucket.1, tag: sym },
        );
        let mut arena = self.arena.borrow_mut();
        if let Some(Payload::Values(buckets)) = arena.get_mut(hashtab).map(|r| &mut r.payload) {
            buckets[bucket.0] = cell;
        }
        Ok(())
    }

    /// Unforced promise over `expr`
    pub fn promise(&self, expr: Sexp, env: Sexp) -> Sexp {
        self.alloc(
            SexpType::Promise,
            Payload::Promise {
                value: self.unbound,
                expr,
                env,
            },
        )
    }

    /// Record a promise's value and drop its environment, as forcing does
    pub fn force_promise(&self, promise: Sexp, value: Sexp) -> BridgeResult<()> {
        self.set_field(promise, Field::PrValue, value)?;
        self.set_field(promise, Field::PrEnv, self.nil)
    }

    /// `SPECIALSXP` or `BUILTINSXP` for primitive table entry `offset`
    pub fn primitive(&self, ty: SexpType, offset: u32) -> BridgeResult<Sexp> {
        match ty {
            SexpType::Special | SexpType::Builtin => Ok(self.alloc(ty, Payload::Primitive(offset))),
            other => Err(BridgeError::mismatch("special or builtin", other)),
        }
    }

    /// Primitive table offset of a `SPECIALSXP` / `BUILTINSXP`
    pub fn primitive_offset(&self, x: Sexp) -> BridgeResult<u32> {
        let arena = self.arena.borrow();
        let record = arena.get(x).ok_or(BridgeError::StaleHandle(x.to_bits()))?;
        match record.payload {
            Payload::Primitive(offset) => Ok(offset),
            _ => Err(BridgeError::mismatch("special or builtin", record.header.ty())),
        }
    }

    /// `SET_SYMVALUE`
    pub fn set_symbol_value(&self, sym: Sexp, value: Sexp) -> BridgeResult<()> {
        self.set_field(sym, Field::SymValue, value)
    }

    /// `SET_INTERNAL`
    pub fn set_internal(&self, sym: Sexp, primitive: Sexp) -> BridgeResult<()> {
        self.set_field(sym, Field::Internal, primitive)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Replace the whole attribute pairlist
    pub fn set_attrib(&self, x: Sexp, attrib: Sexp) -> BridgeResult<()> {
        let mut arena = self.arena.borrow_mut();
        let record = arena.get_mut(x).ok_or(BridgeError::StaleHandle(x.to_bits()))?;
        record.attrib = attrib;
        Ok(())
    }

    /// Set one attribute, replacing an existing binding of the same name
    pub fn set_attr(&self, x: Sexp, name: Sexp, value: Sexp) -> BridgeResult<()> {
        self.protect(x);
        self.protect(value);
        let result = self.set_attr_protected(x, name, value);
        self.unprotect(2);
        result
    }

    fn set_attr_protected(&self, x: Sexp, name: Sexp, value: Sexp) -> BridgeResult<()> {
        let attrib = {
            let arena = self.arena.borrow();
            arena.get(x).ok_or(BridgeError::StaleHandle(x.to_bits()))?.attrib
        };

        // Replace in place if the name is already bound
        let mut cell = attrib;
        let mut last = self.nil;
        while cell != self.nil {
            let (tag, cdr) = {
                let arena = self.arena.borrow();
                match arena.get(cell).map(|r| &r.payload) {
                    Some(Payload::Cons { tag, cdr, .. }) => (*tag, *cdr),
                    _ => return Err(BridgeError::StaleHandle(cell.to_bits())),
                }
            };
            if tag == name {
                return self.set_field(cell, Field::Car, value);
            }
            last = cell;
            cell = cdr;
        }

        let fresh = self.alloc(
            SexpType::Pairlist,
            Payload::Cons { car: value, cdr: self.nil, tag: name },
        );
        if last == self.nil {
            self.set_attrib(x, fresh)
        } else {
            self.set_cdr(last, fresh)
        }
    }

    /// Attach a `dim` attribute; `nrow * ncol` must equal the length
    pub fn set_dim(&self, x: Sexp, nrow: usize, ncol: usize) -> BridgeResult<()> {
        let length = {
            let arena = self.arena.borrow();
            let record = arena.get(x).ok_or(BridgeError::StaleHandle(x.to_bits()))?;
            record
                .payload
                .len()
                .ok_or_else(|| BridgeError::mismatch("vector", record.header.ty()))?
        };
        if nrow.checked_mul(ncol) != Some(length) {
            return Err(BridgeError::InvalidDimensions(format!(
                "dims [product {}] do not match the length of object [{}]",
                nrow.saturating_mul(ncol),
                length
            )));
        }
        let to_i32 = |n: usize| {
            i32::try_from(n).map_err(|_| BridgeError::InvalidDimensions(format!("{} exceeds INT_MAX", n)))
        };
        let dim = self.protect(self.alloc_integer(&[to_i32(nrow)?, to_i32(ncol)?]));
        let result = self.set_attr(x, self.dim_symbol, dim);
        self.unprotect(1);
        result
    }

    /// Attach a `names` attribute
    pub fn set_names(&self, x: Sexp, names: &[&str]) -> BridgeResult<()> {
        let values: Vec<Option<&str>> = names.iter().copied().map(Some).collect();
        let names_vec = self.protect(self.alloc_string(&values));
        let result = self.set_attr(x, self.names_symbol, names_vec);
        self.unprotect(1);
        result
    }
}
