//! The in-process runtime: state, collection, and the `SexpAccess` backend

use super::arena::Arena;
use super::collector::{self, GcStats};
use super::header::{Payload, Record};
use super::roots::RootSet;
use crate::defaults::DEFAULT_GC_THRESHOLD;
use rinspect_sdk::{BridgeError, BridgeResult, Field, Sexp, SexpAccess, SexpType};
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};

/// Pure-Rust model of the foreign runtime's heap.
///
/// All methods take `&self`: handles stay usable while a [`Protected`]
/// guard borrows the heap, and a collection can run in between. The heap is
/// `Send` but not `Sync`; share it through a [`Session`].
///
/// Handles belong to the heap that issued them. Reading one through another
/// heap fails with `StaleHandle`.
///
/// [`Protected`]: crate::root::Protected
/// [`Session`]: crate::session::Session
pub struct Heap {
    /// Record storage
    pub(super) arena: RefCell<Arena>,

    /// Protection stack and precious set
    pub(super) roots: RefCell<RootSet>,

    /// Installed symbols (never collected)
    pub(super) symbols: RefCell<FxHashMap<String, Sexp>>,

    /// CHARSXP cache (weak: pruned after each collection)
    pub(super) chars: RefCell<FxHashMap<Box<[u8]>, Sexp>>,

    /// Collector statistics
    stats: RefCell<GcStats>,

    /// Allocations between automatic collections (0 = never)
    threshold: Cell<usize>,

    /// Allocations since the last collection
    allocated_since_gc: Cell<usize>,

    pub(super) nil: Sexp,
    pub(super) na_string: Sexp,
    pub(super) unbound: Sexp,
    pub(super) dim_symbol: Sexp,
    pub(super) names_symbol: Sexp,
}

impl Heap {
    /// Create a heap with the default collection threshold
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_GC_THRESHOLD)
    }

    /// Create a heap that collects after every `threshold` allocations
    pub fn with_threshold(threshold: usize) -> Self {
        let mut arena = Arena::new();

        // Nil refers to itself through its attribute slot, like the runtime's
        // own R_NilValue.
        let nil = arena.first_handle();
        let inserted = arena.insert(Record::new(SexpType::Nil, nil, Payload::Nil));
        debug_assert_eq!(inserted, nil);

        let na_string = arena.insert(Record::new(
            SexpType::Char,
            nil,
            Payload::Char(b"NA".to_vec().into_boxed_slice()),
        ));

        let heap = Self {
            arena: RefCell::new(arena),
            roots: RefCell::new(RootSet::new()),
            symbols: RefCell::new(FxHashMap::default()),
            chars: RefCell::new(FxHashMap::default()),
            stats: RefCell::new(GcStats::default()),
            threshold: Cell::new(0),
            allocated_since_gc: Cell::new(0),
            nil,
            na_string,
            unbound: nil,
            dim_symbol: nil,
            names_symbol: nil,
        };

        // The unbound marker is a symbol whose value is itself
        let unbound_name = heap.mk_char("");
        let unbound = heap.alloc(
            SexpType::Symbol,
            Payload::Symbol { pname: unbound_name, value: nil, internal: nil },
        );
        if let Some(record) = heap.arena.borrow_mut().get_mut(unbound) {
            record.payload = Payload::Symbol { pname: unbound_name, value: unbound, internal: nil };
        }

        let mut heap = Self { unbound, ..heap };
        heap.dim_symbol = heap.install("dim");
        heap.names_symbol = heap.install("names");
        heap.threshold.set(threshold);
        heap
    }

    /// The unbound-value marker (`R_UnboundValue`)
    pub fn unbound_value(&self) -> Sexp {
        self.unbound
    }

    /// The `names` symbol
    pub fn names_symbol(&self) -> Sexp {
        self.names_symbol
    }

    /// Change the automatic collection threshold (0 disables it)
    pub fn set_threshold(&self, threshold: usize) {
        self.threshold.set(threshold);
    }

    /// Snapshot of the collector statistics
    pub fn stats(&self) -> GcStats {
        self.stats.borrow().clone()
    }

    /// Number of live records
    pub fn live_count(&self) -> usize {
        self.arena.borrow().live()
    }

    /// Whether `x` still refers to a live record
    pub fn is_live(&self, x: Sexp) -> bool {
        self.arena.borrow().contains(x)
    }

    /// Run a full collection; returns the number of records freed
    pub fn collect(&self) -> usize {
        self.collect_with(&[])
    }

    fn collect_with(&self, pending: &[Sexp]) -> usize {
        let mut roots: Vec<Sexp> = vec![self.nil, self.na_string, self.unbound];
        roots.extend(self.symbols.borrow().values().copied());
        roots.extend(self.roots.borrow().iter());
        roots.extend_from_slice(pending);

        let freed = {
            let mut arena = self.arena.borrow_mut();
            let freed = collector::collect(&mut arena, roots.into_iter(), &mut self.stats.borrow_mut());
            self.chars.borrow_mut().retain(|_, s| arena.contains(*s));
            freed
        };
        self.allocated_since_gc.set(0);
        freed
    }

    /// Allocate a record, collecting first if the threshold was reached.
    ///
    /// Handles referenced by `payload` are treated as roots for that
    /// collection, so the value being built never links to a freed slot.
    pub(super) fn alloc(&self, ty: SexpType, payload: Payload) -> Sexp {
        let threshold = self.threshold.get();
        if threshold > 0 && self.allocated_since_gc.get() >= threshold {
            let mut pending = Vec::new();
            payload.for_each_child(|child| pending.push(child));
            self.collect_with(&pending);
        }
        self.allocated_since_gc.set(self.allocated_since_gc.get() + 1);
        self.arena.borrow_mut().insert(Record::new(ty, self.nil, payload))
    }

    /// Run `f` on a live record
    fn with_record<T>(&self, x: Sexp, f: impl FnOnce(&Record) -> T) -> BridgeResult<T> {
        let arena = self.arena.borrow();
        arena.get(x).map(f).ok_or(BridgeError::StaleHandle(x.to_bits()))
    }

    /// Run `f` on a live record whose payload the caller has vouched for.
    ///
    /// A miss here means an `unsafe` read was called with its contract
    /// broken; the heap panics instead of fabricating a value.
    fn read<T>(&self, x: Sexp, what: &str, f: impl FnOnce(&Payload) -> Option<T>) -> T {
        let arena = self.arena.borrow();
        match arena.get(x).and_then(|record| f(&record.payload)) {
            Some(value) => value,
            None => panic!("heap read contract violated: {} on {:?}", what, x),
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Heap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heap")
            .field("live", &self.live_count())
            .field("roots", &self.roots.borrow().len())
            .field("symbols", &self.symbols.borrow().len())
            .field("threshold", &self.threshold.get())
            .finish()
    }
}

impl SexpAccess for Heap {
    fn nil(&self) -> Sexp {
        self.nil
    }

    fn na_string(&self) -> Sexp {
        self.na_string
    }

    fn dim_symbol(&self) -> Sexp {
        self.dim_symbol
    }

    fn type_of(&self, x: Sexp) -> BridgeResult<SexpType> {
        self.with_record(x, |record| record.header.ty())
    }

    fn attrib(&self, x: Sexp) -> BridgeResult<Sexp> {
        self.with_record(x, |record| record.attrib)
    }

    unsafe fn length(&self, x: Sexp) -> usize {
        self.read(x, "length", Payload::len)
    }

    unsafe fn logical_elt(&self, x: Sexp, offset: usize) -> i32 {
        self.read(x, "logical_elt", |p| match p {
            Payload::Logical(v) => v.get(offset).copied(),
            _ => None,
        })
    }

    unsafe fn integer_elt(&self, x: Sexp, offset: usize) -> i32 {
        self.read(x, "integer_elt", |p| match p {
            Payload::Integer(v) => v.get(offset).copied(),
            _ => None,
        })
    }

    unsafe fn real_elt(&self, x: Sexp, offset: usize) -> f64 {
        self.read(x, "real_elt", |p| match p {
            Payload::Real(v) => v.get(offset).copied(),
            _ => None,
        })
    }

    unsafe fn string_elt(&self, x: Sexp, offset: usize) -> Sexp {
        self.read(x, "string_elt", |p| match p {
            Payload::Strings(v) => v.get(offset).copied(),
            _ => None,
        })
    }

    unsafe fn vector_elt(&self, x: Sexp, offset: usize) -> Sexp {
        self.read(x, "vector_elt", |p| match p {
            Payload::Values(v) => v.get(offset).copied(),
            _ => None,
        })
    }

    unsafe fn char_bytes(&self, x: Sexp) -> Vec<u8> {
        self.read(x, "char_bytes", |p| match p {
            Payload::Char(bytes) => Some(bytes.to_vec()),
            _ => None,
        })
    }

    unsafe fn field(&self, x: Sexp, field: Field) -> Sexp {
        self.read(x, "field", |p| p.field(field))
    }

    fn preserve(&self, x: Sexp) {
        self.roots.borrow_mut().preserve(x);
    }

    fn release(&self, x: Sexp) {
        if !self.roots.borrow_mut().release(x) {
            tracing::warn!(handle = ?x, "release of a handle that was not preserved");
        }
    }
}
