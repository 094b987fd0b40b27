//! Structural walker
//!
//! Single-step field projections for the non-vector layouts: symbols,
//! pairlist cells, environments, closures and promises. Every projection
//! reads the tag first and fails with `TypeMismatch` instead of
//! reinterpreting a record of the wrong shape.
//!
//! Whole-structure traversal is built from these projections by the caller.
//! [`PairlistIter`] and [`EnclosingIter`] do that for the two common chains
//! and carry a depth guard: a cyclic `CDR` or `ENCLOS` chain ends the
//! iteration with `TraversalLimit` rather than looping forever.

use crate::defaults::DEFAULT_MAX_TRAVERSAL_DEPTH;
use rinspect_sdk::{BridgeError, BridgeResult, Field, Sexp, SexpAccess};

/// Read `field` of `x` after checking that `x` has a layout containing it
#[inline]
pub fn project<A: SexpAccess + ?Sized>(rt: &A, x: Sexp, field: Field) -> BridgeResult<Sexp> {
    let ty = rt.type_of(x)?;
    if !field.accepts(ty) {
        return Err(BridgeError::mismatch(field.layout_name(), ty));
    }
    // SAFETY: `x` is live (type_of succeeded) and its tag has this field.
    Ok(unsafe { rt.field(x, field) })
}

// ============================================================================
// Symbols
// ============================================================================

/// Print name (CHARSXP) of a symbol
pub fn symbol_name<A: SexpAccess + ?Sized>(rt: &A, sym: Sexp) -> BridgeResult<Sexp> {
    project(rt, sym, Field::PrintName)
}

/// Global value bound to a symbol
pub fn symbol_value<A: SexpAccess + ?Sized>(rt: &A, sym: Sexp) -> BridgeResult<Sexp> {
    project(rt, sym, Field::SymValue)
}

/// Internal (primitive) binding of a symbol
pub fn symbol_internal<A: SexpAccess + ?Sized>(rt: &A, sym: Sexp) -> BridgeResult<Sexp> {
    project(rt, sym, Field::Internal)
}

// ============================================================================
// Pairlists
// ============================================================================

/// Head element of a pairlist cell
pub fn head<A: SexpAccess + ?Sized>(rt: &A, cell: Sexp) -> BridgeResult<Sexp> {
    project(rt, cell, Field::Car)
}

/// Tail of a pairlist cell (another cell, or nil)
pub fn tail<A: SexpAccess + ?Sized>(rt: &A, cell: Sexp) -> BridgeResult<Sexp> {
    project(rt, cell, Field::Cdr)
}

/// Tag (name) of a pairlist cell; nil when unnamed
pub fn tag<A: SexpAccess + ?Sized>(rt: &A, cell: Sexp) -> BridgeResult<Sexp> {
    project(rt, cell, Field::Tag)
}

// ============================================================================
// Environments
// ============================================================================

/// Binding frame of an environment
pub fn env_frame<A: SexpAccess + ?Sized>(rt: &A, env: Sexp) -> BridgeResult<Sexp> {
    project(rt, env, Field::Frame)
}

/// Enclosing environment
pub fn env_enclosing<A: SexpAccess + ?Sized>(rt: &A, env: Sexp) -> BridgeResult<Sexp> {
    project(rt, env, Field::Enclos)
}

/// Hash table of an environment (nil for unhashed environments)
pub fn env_hashtab<A: SexpAccess + ?Sized>(rt: &A, env: Sexp) -> BridgeResult<Sexp> {
    project(rt, env, Field::HashTab)
}

// ============================================================================
// Closures
// ============================================================================

/// Formal argument pairlist of a closure
pub fn closure_formals<A: SexpAccess + ?Sized>(rt: &A, clo: Sexp) -> BridgeResult<Sexp> {
    project(rt, clo, Field::Formals)
}

/// Body expression of a closure
pub fn closure_body<A: SexpAccess + ?Sized>(rt: &A, clo: Sexp) -> BridgeResult<Sexp> {
    project(rt, clo, Field::Body)
}

/// Defining environment of a closure
pub fn closure_env<A: SexpAccess + ?Sized>(rt: &A, clo: Sexp) -> BridgeResult<Sexp> {
    project(rt, clo, Field::CloEnv)
}

// ============================================================================
// Promises
// ============================================================================

/// Forced value of a promise (the unbound marker until forced)
pub fn promise_value<A: SexpAccess + ?Sized>(rt: &A, prom: Sexp) -> BridgeResult<Sexp> {
    project(rt, prom, Field::PrValue)
}

/// Unevaluated expression of a promise
pub fn promise_expr<A: SexpAccess + ?Sized>(rt: &A, prom: Sexp) -> BridgeResult<Sexp> {
    project(rt, prom, Field::PrCode)
}

/// Evaluation environment of a promise (nil once forced)
pub fn promise_env<A: SexpAccess + ?Sized>(rt: &A, prom: Sexp) -> BridgeResult<Sexp> {
    project(rt, prom, Field::PrEnv)
}

// ============================================================================
// Chain iterators
// ============================================================================

/// Iterate `(tag, head)` over a nil-terminated pairlist
pub fn pairlist<A: SexpAccess + ?Sized>(rt: &A, list: Sexp) -> PairlistIter<'_, A> {
    PairlistIter {
        rt,
        cursor: list,
        walked: 0,
        limit: DEFAULT_MAX_TRAVERSAL_DEPTH,
        done: false,
    }
}

/// Iterate the enclosing-environment chain above `env` (exclusive)
pub fn enclosing<A: SexpAccess + ?Sized>(rt: &A, env: Sexp) -> EnclosingIter<'_, A> {
    EnclosingIter {
        rt,
        cursor: env,
        walked: 0,
        limit: DEFAULT_MAX_TRAVERSAL_DEPTH,
        done: false,
    }
}

/// Iterator over the cells of a pairlist.
///
/// Yields `Ok((tag, head))` per cell. A tail that is neither a cell nor nil
/// yields one `TypeMismatch`; exceeding the depth guard yields one
/// `TraversalLimit`. Either ends the iteration.
pub struct PairlistIter<'a, A: SexpAccess + ?Sized> {
    rt: &'a A,
    cursor: Sexp,
    walked: usize,
    limit: usize,
    done: bool,
}

impl<A: SexpAccess + ?Sized> PairlistIter<'_, A> {
    /// Replace the depth guard
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn fail(&mut self, err: BridgeError) -> Option<BridgeResult<(Sexp, Sexp)>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<A: SexpAccess + ?Sized> Iterator for PairlistIter<'_, A> {
    type Item = BridgeResult<(Sexp, Sexp)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.cursor == self.rt.nil() {
            self.done = true;
            return None;
        }
        if self.walked >= self.limit {
            tracing::debug!(limit = self.limit, "pairlist traversal limit reached");
            return self.fail(BridgeError::TraversalLimit { limit: self.limit });
        }

        let cell = self.cursor;
        let ty = match self.rt.type_of(cell) {
            Ok(ty) => ty,
            Err(err) => return self.fail(err),
        };
        if !ty.is_pairlist_like() {
            return self.fail(BridgeError::mismatch("pairlist", ty));
        }

        // SAFETY: `cell` is live and pairlist-shaped.
        let (tag, car, cdr) = unsafe {
            (
                self.rt.field(cell, Field::Tag),
                self.rt.field(cell, Field::Car),
                self.rt.field(cell, Field::Cdr),
            )
        };
        self.cursor = cdr;
        self.walked += 1;
        Some(Ok((tag, car)))
    }
}

/// Iterator over enclosing environments, nearest first.
///
/// Stops after the environment whose `ENCLOS` is nil (the empty
/// environment), or with one error as [`PairlistIter`] does.
pub struct EnclosingIter<'a, A: SexpAccess + ?Sized> {
    rt: &'a A,
    cursor: Sexp,
    walked: usize,
    limit: usize,
    done: bool,
}

impl<A: SexpAccess + ?Sized> EnclosingIter<'_, A> {
    /// Replace the depth guard
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl<A: SexpAccess + ?Sized> Iterator for EnclosingIter<'_, A> {
    type Item = BridgeResult<Sexp>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let parent = match env_enclosing(self.rt, self.cursor) {
            Ok(parent) => parent,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        if parent == self.rt.nil() {
            self.done = true;
            return None;
        }
        if self.walked >= self.limit {
            tracing::debug!(limit = self.limit, "environment chain limit reached");
            self.done = true;
            return Some(Err(BridgeError::TraversalLimit { limit: self.limit }));
        }
        self.walked += 1;
        self.cursor = parent;
        Some(Ok(parent))
    }
}
