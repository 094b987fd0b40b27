//! Rooting
//!
//! A handle is only valid while its referent is reachable from the foreign
//! collector's roots. Values freshly returned by the runtime are not; hold
//! them in a [`Protected`] (or a [`RootScope`]) before any call that may
//! allocate.
//!
//! Both guards register values on the runtime's precious list and release
//! them on drop, so they can be moved and dropped in any order.

use rinspect_sdk::{Sexp, SexpAccess};

/// A handle rooted for the lifetime of the guard
pub struct Protected<'a, A: SexpAccess + ?Sized> {
    rt: &'a A,
    value: Sexp,
}

impl<'a, A: SexpAccess + ?Sized> Protected<'a, A> {
    /// Root `value` until the guard is dropped
    pub fn new(rt: &'a A, value: Sexp) -> Self {
        rt.preserve(value);
        tracing::trace!(handle = ?value, "preserved");
        Self { rt, value }
    }

    /// The rooted handle
    #[inline]
    pub fn get(&self) -> Sexp {
        self.value
    }
}

impl<A: SexpAccess + ?Sized> Drop for Protected<'_, A> {
    fn drop(&mut self) {
        self.rt.release(self.value);
        tracing::trace!(handle = ?self.value, "released");
    }
}

impl<A: SexpAccess + ?Sized> std::fmt::Debug for Protected<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Protected").field(&self.value).finish()
    }
}

/// A group of rooted handles released together
pub struct RootScope<'a, A: SexpAccess + ?Sized> {
    rt: &'a A,
    held: Vec<Sexp>,
}

impl<'a, A: SexpAccess + ?Sized> RootScope<'a, A> {
    /// Create an empty scope
    pub fn new(rt: &'a A) -> Self {
        Self { rt, held: Vec::new() }
    }

    /// Root `value` until the scope ends, passing it through
    pub fn protect(&mut self, value: Sexp) -> Sexp {
        self.rt.preserve(value);
        tracing::trace!(handle = ?value, "preserved");
        self.held.push(value);
        value
    }

    /// Number of handles held
    pub fn len(&self) -> usize {
        self.held.len()
    }

    /// Whether the scope holds nothing
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl<A: SexpAccess + ?Sized> Drop for RootScope<'_, A> {
    fn drop(&mut self) {
        for value in self.held.drain(..).rev() {
            self.rt.release(value);
            tracing::trace!(handle = ?value, "released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use crate::vector;

    #[test]
    fn test_protected_survives_collection() {
        let heap = Heap::new();
        let v = Protected::new(&heap, heap.alloc_integer(&[7, 8]));
        heap.collect();
        assert_eq!(vector::get_integer(&heap, v.get(), 1), Ok(8));

        let raw = v.get();
        drop(v);
        heap.collect();
        assert!(!heap.is_live(raw));
    }

    #[test]
    fn test_guards_drop_out_of_order() {
        let heap = Heap::new();
        let a = Protected::new(&heap, heap.alloc_real(&[1.0]));
        let b = Protected::new(&heap, heap.alloc_real(&[2.0]));
        let (ra, rb) = (a.get(), b.get());

        drop(a);
        heap.collect();
        assert!(!heap.is_live(ra));
        assert!(heap.is_live(rb));
        drop(b);
    }

    #[test]
    fn test_nested_preserve_of_same_value() {
        let heap = Heap::new();
        let x = heap.alloc_integer(&[1]);
        let outer = Protected::new(&heap, x);
        {
            let _inner = Protected::new(&heap, x);
        }
        heap.collect();
        assert!(heap.is_live(outer.get()));
    }

    #[test]
    fn test_root_scope() {
        let heap = Heap::new();
        let (a, b) = {
            let mut scope = RootScope::new(&heap);
            let a = scope.protect(heap.alloc_integer(&[1]));
            let b = scope.protect(heap.alloc_string(&[Some("b")]));
            assert_eq!(scope.len(), 2);
            heap.collect();
            assert!(heap.is_live(a) && heap.is_live(b));
            (a, b)
        };
        heap.collect();
        assert!(!heap.is_live(a));
        assert!(!heap.is_live(b));
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_root_scope_traces_acquire_and_release() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let heap = Heap::new();
            let mut scope = RootScope::new(&heap);
            scope.protect(heap.alloc_integer(&[1]));
            scope.protect(heap.alloc_integer(&[2]));
        });

        let log = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert_eq!(log.matches("preserved").count(), 2);
        assert_eq!(log.matches("released").count(), 2);
    }
}
