//! Root tracking for the in-process heap
//!
//! Two kinds of roots keep a record alive across a collection:
//! - the protection stack (`protect`/`unprotect`), strictly LIFO
//! - the precious set (`preserve`/`release`), counted per handle
//!
//! Runtime singletons and the symbol table are marked by the collector
//! directly and never appear here.

use rinspect_sdk::Sexp;
use rustc_hash::FxHashMap;

/// Root set for the in-process collector
#[derive(Debug, Default)]
pub struct RootSet {
    /// Protection stack
    stack: Vec<Sexp>,

    /// Preserved handles with their nesting count
    precious: FxHashMap<Sexp, usize>,
}

impl RootSet {
    /// Create an empty root set
    pub fn new() -> Self {
        Self::default()
    }

    /// Push onto the protection stack
    pub fn protect(&mut self, x: Sexp) {
        self.stack.push(x);
    }

    /// Pop `n` entries off the protection stack.
    ///
    /// Returns false (and pops nothing) if fewer than `n` are on the stack.
    pub fn unprotect(&mut self, n: usize) -> bool {
        if n > self.stack.len() {
            return false;
        }
        self.stack.truncate(self.stack.len() - n);
        true
    }

    /// Remove the topmost stack entry equal to `x`
    pub fn unprotect_ptr(&mut self, x: Sexp) -> bool {
        match self.stack.iter().rposition(|s| *s == x) {
            Some(pos) => {
                self.stack.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Add one precious reference
    pub fn preserve(&mut self, x: Sexp) {
        *self.precious.entry(x).or_insert(0) += 1;
    }

    /// Drop one precious reference; false if `x` was not preserved
    pub fn release(&mut self, x: Sexp) -> bool {
        match self.precious.get_mut(&x) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.precious.remove(&x);
                true
            }
            None => false,
        }
    }

    /// Whether `x` is currently preserved
    pub fn is_preserved(&self, x: Sexp) -> bool {
        self.precious.contains_key(&x)
    }

    /// Current protection stack depth
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Iterate over all roots
    pub fn iter(&self) -> impl Iterator<Item = Sexp> + '_ {
        self.stack.iter().chain(self.precious.keys()).copied()
    }

    /// Total number of root entries
    pub fn len(&self) -> usize {
        self.stack.len() + self.precious.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
