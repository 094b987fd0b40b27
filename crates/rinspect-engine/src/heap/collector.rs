//! Mark-sweep collector for the in-process heap
//!
//! Marking starts from the root iterator handed in by the heap (singletons,
//! symbol table, protection stack, precious set, plus any values an
//! allocation is about to link) and follows attributes and payload handles.

use super::arena::Arena;
use rinspect_sdk::Sexp;
use std::time::{Duration, Instant};

/// Collector statistics
#[derive(Debug, Clone, Default)]
pub struct GcStats {
    /// Total number of collections
    pub collections: usize,

    /// Total records freed
    pub objects_freed: usize,

    /// Records marked in the last collection
    pub last_marked_count: usize,

    /// Records freed in the last collection
    pub last_freed_count: usize,

    /// Live records after the last collection
    pub live_objects: usize,

    /// Duration of the last collection
    pub last_pause_time: Duration,

    /// Total pause time across all collections
    pub total_pause_time: Duration,
}

impl GcStats {
    fn update(&mut self, pause: Duration, marked: usize, freed: usize, live: usize) {
        self.collections += 1;
        self.objects_freed += freed;
        self.last_marked_count = marked;
        self.last_freed_count = freed;
        self.live_objects = live;
        self.last_pause_time = pause;
        self.total_pause_time += pause;
    }
}

/// Mark everything reachable from `roots`; returns the number marked
fn mark(arena: &mut Arena, roots: impl Iterator<Item = Sexp>) -> usize {
    let mut worklist: Vec<Sexp> = roots.collect();
    let mut marked = 0;

    while let Some(x) = worklist.pop() {
        let Some(record) = arena.get_mut(x) else {
            continue;
        };
        if record.header.is_marked() {
            continue;
        }
        record.header.mark();
        marked += 1;

        worklist.push(record.attrib);
        record.payload.for_each_child(|child| worklist.push(child));
    }

    marked
}

/// Run one full collection and record it in `stats`
pub fn collect(arena: &mut Arena, roots: impl Iterator<Item = Sexp>, stats: &mut GcStats) -> usize {
    let start = Instant::now();

    let marked = mark(arena, roots);
    let freed = arena.sweep();

    stats.update(start.elapsed(), marked, freed, arena.live());
    tracing::debug!(
        collection = stats.collections,
        marked,
        freed,
        live = arena.live(),
        "heap collection finished"
    );
    freed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::header::{Payload, Record};
    use rinspect_sdk::SexpType;

    #[test]
    fn test_collect_follows_children() {
        let mut arena = Arena::new();
        let nil = arena.insert(Record::new(SexpType::Nil, arena.first_handle(), Payload::Nil));
        let leaf = arena.insert(Record::new(SexpType::Integer, nil, Payload::Integer(vec![1])));
        let list = arena.insert(Record::new(SexpType::List, nil, Payload::Values(vec![leaf])));
        let garbage = arena.insert(Record::new(SexpType::Real, nil, Payload::Real(vec![0.5])));

        let mut stats = GcStats::default();
        let freed = collect(&mut arena, [nil, list].into_iter(), &mut stats);

        assert_eq!(freed, 1);
        assert!(arena.contains(leaf));
        assert!(arena.contains(list));
        assert!(!arena.contains(garbage));
        assert_eq!(stats.collections, 1);
        assert_eq!(stats.last_marked_count, 3);
        assert_eq!(stats.live_objects, 3);
    }

    #[test]
    fn test_collect_follows_attributes() {
        let mut arena = Arena::new();
        let nil = arena.insert(Record::new(SexpType::Nil, arena.first_handle(), Payload::Nil));
        let dim = arena.insert(Record::new(SexpType::Integer, nil, Payload::Integer(vec![2, 2])));
        let cell = arena.insert(Record::new(
            SexpType::Pairlist,
            nil,
            Payload::Cons { car: dim, cdr: nil, tag: nil },
        ));
        let mut matrix = Record::new(SexpType::Real, nil, Payload::Real(vec![0.0; 4]));
        matrix.attrib = cell;
        let matrix = arena.insert(matrix);

        let mut stats = GcStats::default();
        collect(&mut arena, [nil, matrix].into_iter(), &mut stats);
        assert!(arena.contains(dim));
        assert!(arena.contains(cell));
    }

    #[test]
    fn test_collect_handles_cycles() {
        let mut arena = Arena::new();
        let nil = arena.insert(Record::new(SexpType::Nil, arena.first_handle(), Payload::Nil));
        let cell = arena.insert(Record::new(
            SexpType::Pairlist,
            nil,
            Payload::Cons { car: nil, cdr: nil, tag: nil },
        ));
        if let Some(Payload::Cons { cdr, .. }) = arena.get_mut(cell).map(|r| &mut r.payload) {
            *cdr = cell;
        }

        let mut stats = GcStats::default();
        assert_eq!(collect(&mut arena, [nil, cell].into_iter(), &mut stats), 0);
        assert_eq!(collect(&mut arena, [nil].into_iter(), &mut stats), 1);
    }
}
