//! Session: exclusive access to one foreign runtime
//!
//! The embedded interpreter is single-threaded and not reentrant. A
//! [`Session`] owns its backend behind a lock, and every bridge call is made
//! through the [`SessionGuard`] returned by [`Session::enter`]. Threads that
//! need the runtime take turns.

use crate::defaults::{DEFAULT_GC_THRESHOLD, DEFAULT_MAX_TRAVERSAL_DEPTH};
use crate::heap::Heap;
use crate::walk::{self, EnclosingIter, PairlistIter};
use parking_lot::{Mutex, MutexGuard};
use rinspect_sdk::{BridgeResult, Field, Sexp, SexpAccess, SexpType};
use std::ops::Deref;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Allocations between automatic collections of the in-process heap
    /// (0 disables automatic collection; ignored by libR backends)
    pub gc_threshold: usize,

    /// Links a chain iterator follows before failing with `TraversalLimit`
    pub max_traversal_depth: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            gc_threshold: DEFAULT_GC_THRESHOLD,
            max_traversal_depth: DEFAULT_MAX_TRAVERSAL_DEPTH,
        }
    }
}

/// A foreign runtime plus the lock serializing access to it
pub struct Session<B> {
    backend: Mutex<B>,
    options: SessionOptions,
}

impl<B: SexpAccess> Session<B> {
    /// Wrap an already-initialized backend
    pub fn new(backend: B, options: SessionOptions) -> Self {
        Self {
            backend: Mutex::new(backend),
            options,
        }
    }

    /// Block until the runtime is free, then take it
    pub fn enter(&self) -> SessionGuard<'_, B> {
        let backend = self.backend.lock();
        tracing::trace!("session entered");
        SessionGuard {
            backend,
            options: &self.options,
        }
    }

    /// Take the runtime if no other thread holds it
    pub fn try_enter(&self) -> Option<SessionGuard<'_, B>> {
        let backend = self.backend.try_lock()?;
        tracing::trace!("session entered");
        Some(SessionGuard {
            backend,
            options: &self.options,
        })
    }

    /// Configuration this session was created with
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Tear down the session, returning the backend
    pub fn into_inner(self) -> B {
        self.backend.into_inner()
    }
}

impl Session<Heap> {
    /// Session over a fresh in-process heap
    pub fn in_process(options: SessionOptions) -> Self {
        let heap = Heap::with_threshold(options.gc_threshold);
        Self::new(heap, options)
    }
}

impl<B> std::fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("options", &self.options)
            .field("locked", &self.backend.is_locked())
            .finish()
    }
}

/// Exclusive access to a session's runtime, held until dropped.
///
/// The guard is itself a [`SexpAccess`], so every checked accessor takes it
/// directly. Backend-specific methods (such as the in-process heap's
/// constructors) are reachable through `Deref`.
pub struct SessionGuard<'a, B: SexpAccess> {
    backend: MutexGuard<'a, B>,
    options: &'a SessionOptions,
}

impl<B: SexpAccess> SessionGuard<'_, B> {
    /// Configuration of the owning session
    pub fn options(&self) -> &SessionOptions {
        self.options
    }

    /// Pairlist iterator bounded by the session's traversal depth
    pub fn walk_pairlist(&self, list: Sexp) -> PairlistIter<'_, Self> {
        walk::pairlist(self, list).with_limit(self.options.max_traversal_depth)
    }

    /// Enclosing-environment iterator bounded by the session's traversal depth
    pub fn walk_enclosing(&self, env: Sexp) -> EnclosingIter<'_, Self> {
        walk::enclosing(self, env).with_limit(self.options.max_traversal_depth)
    }
}

impl<B: SexpAccess> Deref for SessionGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        &self.backend
    }
}

impl<B: SexpAccess> Drop for SessionGuard<'_, B> {
    fn drop(&mut self) {
        tracing::trace!("session left");
    }
}

impl<B: SexpAccess> SexpAccess for SessionGuard<'_, B> {
    #[inline]
    fn nil(&self) -> Sexp {
        self.backend.nil()
    }

    #[inline]
    fn na_string(&self) -> Sexp {
        self.backend.na_string()
    }

    #[inline]
    fn dim_symbol(&self) -> Sexp {
        self.backend.dim_symbol()
    }

    #[inline]
    fn type_of(&self, x: Sexp) -> BridgeResult<SexpType> {
        self.backend.type_of(x)
    }

    #[inline]
    fn attrib(&self, x: Sexp) -> BridgeResult<Sexp> {
        self.backend.attrib(x)
    }

    #[inline]
    unsafe fn length(&self, x: Sexp) -> usize {
        self.backend.length(x)
    }

    #[inline]
    unsafe fn logical_elt(&self, x: Sexp, offset: usize) -> i32 {
        self.backend.logical_elt(x, offset)
    }

    #[inline]
    unsafe fn integer_elt(&self, x: Sexp, offset: usize) -> i32 {
        self.backend.integer_elt(x, offset)
    }

    #[inline]
    unsafe fn real_elt(&self, x: Sexp, offset: usize) -> f64 {
        self.backend.real_elt(x, offset)
    }

    #[inline]
    unsafe fn string_elt(&self, x: Sexp, offset: usize) -> Sexp {
        self.backend.string_elt(x, offset)
    }

    #[inline]
    unsafe fn vector_elt(&self, x: Sexp, offset: usize) -> Sexp {
        self.backend.vector_elt(x, offset)
    }

    #[inline]
    unsafe fn char_bytes(&self, x: Sexp) -> Vec<u8> {
        self.backend.char_bytes(x)
    }

    #[inline]
    unsafe fn field(&self, x: Sexp, field: Field) -> Sexp {
        self.backend.field(x, field)
    }

    fn preserve(&self, x: Sexp) {
        self.backend.preserve(x)
    }

    fn release(&self, x: Sexp) {
        self.backend.release(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::root::Protected;
    use crate::vector;
    use rinspect_sdk::BridgeError;
    use std::sync::Arc;

    #[test]
    fn test_options_default() {
        let options = SessionOptions::default();
        assert_eq!(options.gc_threshold, 4096);
        assert_eq!(options.max_traversal_depth, 1_000_000);
    }

    #[test]
    fn test_guard_is_an_accessor() {
        let session = Session::in_process(SessionOptions::default());
        let rt = session.enter();
        let v = Protected::new(&*rt, rt.alloc_real(&[0.5, 1.5]));
        assert_eq!(vector::get_real(&*rt, v.get(), 1), Ok(1.5));
        assert_eq!(vector::get_real(&rt, v.get(), 0), Ok(0.5));
    }

    #[test]
    fn test_try_enter_while_held() {
        let session = Session::in_process(SessionOptions::default());
        let guard = session.enter();
        assert!(session.try_enter().is_none());
        drop(guard);
        assert!(session.try_enter().is_some());
    }

    #[test]
    fn test_configured_traversal_limit() {
        let session = Session::in_process(SessionOptions {
            max_traversal_depth: 2,
            ..SessionOptions::default()
        });
        let rt = session.enter();
        let one = rt.alloc_integer(&[1]);
        let list = rt.protect(rt.pairlist(&[(None, one), (None, one), (None, one)]));

        let walked: Vec<_> = rt.walk_pairlist(list).collect();
        assert_eq!(walked.len(), 3);
        assert_eq!(walked[2], Err(BridgeError::TraversalLimit { limit: 2 }));
        rt.unprotect(1);
    }

    #[test]
    fn test_threads_take_turns() {
        let session = Arc::new(Session::in_process(SessionOptions::default()));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || {
                    let rt = session.enter();
                    let v = rt.alloc_integer(&[i; 16]);
                    let rooted = Protected::new(&*rt, v);
                    rt.collect();
                    vector::get_integer(&*rt, rooted.get(), 15)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Ok(i as i32));
        }
        assert!(session.try_enter().is_some());
    }
}
