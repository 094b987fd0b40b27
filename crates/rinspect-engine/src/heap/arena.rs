//! Slot arena backing the in-process heap
//!
//! Handles are `(slot, generation)` pairs. Freeing a slot bumps its
//! generation, so a handle that outlived its referent no longer resolves
//! even after the slot is reused.
//!
//! Each arena starts its generations at its own seed, so a handle issued by
//! another arena fails the generation check instead of aliasing a record.

use super::header::Record;
use rinspect_sdk::Sexp;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ARENA: AtomicU32 = AtomicU32::new(0);

/// Spread consecutive arena ids across the generation space
fn next_seed() -> u32 {
    NEXT_ARENA.fetch_add(1, Ordering::Relaxed).wrapping_mul(0x9E37_79B9)
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    record: Option<Record>,
}

/// Generation-checked record storage
#[derive(Debug)]
pub struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    seed: u32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Create an empty arena with a fresh generation seed
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            seed: next_seed(),
        }
    }

    /// Handle the next insert into an empty arena will return
    pub fn first_handle(&self) -> Sexp {
        Sexp::from_slot(0, self.seed)
    }

    /// Store a record, reusing a freed slot when one is available
    pub fn insert(&mut self, record: Record) -> Sexp {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.record = Some(record);
            return Sexp::from_slot(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: self.seed,
            record: Some(record),
        });
        Sexp::from_slot(index, self.seed)
    }

    /// Resolve a handle; `None` if it is stale or was never issued
    #[inline]
    pub fn get(&self, x: Sexp) -> Option<&Record> {
        let slot = self.slots.get(x.slot() as usize)?;
        if slot.generation != x.generation() {
            return None;
        }
        slot.record.as_ref()
    }

    /// Resolve a handle mutably
    #[inline]
    pub fn get_mut(&mut self, x: Sexp) -> Option<&mut Record> {
        let slot = self.slots.get_mut(x.slot() as usize)?;
        if slot.generation != x.generation() {
            return None;
        }
        slot.record.as_mut()
    }

    /// Whether `x` still resolves
    pub fn contains(&self, x: Sexp) -> bool {
        self.get(x).is_some()
    }

    /// Number of live records
    pub fn live(&self) -> usize {
        self.live
    }

    /// Free every unmarked record and clear the mark on survivors.
    ///
    /// Returns the number of records freed.
    pub fn sweep(&mut self) -> usize {
        let mut freed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(record) = slot.record.as_mut() else {
                continue;
            };
            if record.header.is_marked() {
                record.header.unmark();
            } else {
                slot.record = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                freed += 1;
            }
        }
        self.live -= freed;
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::header::Payload;
    use rinspect_sdk::SexpType;

    fn int_record(nil: Sexp) -> Record {
        Record::new(SexpType::Integer, nil, Payload::Integer(vec![1]))
    }

    #[test]
    fn test_insert_and_get() {
        let mut arena = Arena::new();
        let nil = Sexp::from_slot(u32::MAX, 0);
        let x = arena.insert(int_record(nil));
        assert!(arena.contains(x));
        assert_eq!(arena.live(), 1);
        assert_eq!(arena.get(x).map(|r| r.header.ty()), Some(SexpType::Integer));
    }

    #[test]
    fn test_sweep_bumps_generation() {
        let mut arena = Arena::new();
        let nil = Sexp::from_slot(u32::MAX, 0);
        let x = arena.insert(int_record(nil));

        assert_eq!(arena.sweep(), 1);
        assert!(!arena.contains(x));
        assert_eq!(arena.live(), 0);

        // Slot is reused under a new generation
        let y = arena.insert(int_record(nil));
        assert_eq!(y.slot(), x.slot());
        assert_ne!(y.generation(), x.generation());
        assert!(!arena.contains(x));
        assert!(arena.contains(y));
    }

    #[test]
    fn test_sweep_keeps_marked() {
        let mut arena = Arena::new();
        let nil = Sexp::from_slot(u32::MAX, 0);
        let x = arena.insert(int_record(nil));
        let y = arena.insert(int_record(nil));

        if let Some(record) = arena.get_mut(x) {
            record.header.mark();
        }
        assert_eq!(arena.sweep(), 1);
        assert!(arena.contains(x));
        assert!(!arena.contains(y));
        assert!(!arena.get(x).map_or(true, |r| r.header.is_marked()));
    }

    #[test]
    fn test_handle_from_another_arena_does_not_resolve() {
        let mut a = Arena::new();
        let mut b = Arena::new();
        let nil = Sexp::from_slot(u32::MAX, 0);
        let x = a.insert(int_record(nil));
        let y = b.insert(int_record(nil));

        assert_eq!(x.slot(), y.slot());
        assert!(!b.contains(x));
        assert!(!a.contains(y));
    }
}
