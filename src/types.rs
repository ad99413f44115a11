pub type LayerId = u32;
pub type HitId   = u64;
pub type EventId = u64;

/// Result of looking up a coordinate on an axis. Signed and unbounded: values
/// outside the axis give negative indices or indices beyond the last bin, and
/// must be checked by the caller.
pub type BinIndex = i64;
