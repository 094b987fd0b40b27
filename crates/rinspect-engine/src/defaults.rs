//! Default constants for session configuration.

/// Default number of allocations between automatic collections of the
/// in-process heap.
pub const DEFAULT_GC_THRESHOLD: usize = 4096;

/// Default maximum number of links a pairlist or environment-chain iterator
/// follows before giving up.
pub const DEFAULT_MAX_TRAVERSAL_DEPTH: usize = 1_000_000;
