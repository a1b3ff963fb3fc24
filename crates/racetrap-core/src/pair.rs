//! Per-pair shared state, padded so nothing shares a cache line.
//!
//! Each contending pair owns one [`SharedPair`] and nothing else. The
//! four logical fields are laid out so that each one sits alone on a
//! [`CACHE_PAD`]-byte block:
//!
//! ```text
//! offset 0x0000  ┌──────────────────────────────┐
//!                │ interested[A]   (4 bytes)    │
//!                │ padding to CACHE_PAD         │
//! offset 0x1000  ├──────────────────────────────┤
//!                │ interested[B]   (4 bytes)    │
//!                │ padding to CACHE_PAD         │
//! offset 0x2000  ├──────────────────────────────┤
//!                │ turn            (4 bytes)    │
//!                │ padding to CACHE_PAD         │
//! offset 0x3000  ├──────────────────────────────┤
//!                │ value           (4 bytes)    │
//!                │ padding to CACHE_PAD         │
//! offset 0x4000  └──────────────────────────────┘
//! ```
//!
//! The pad is a full page, which also keeps the fields out of reach of
//! adjacent-line hardware prefetching. With this layout every cache
//! line that bounces between the two cores is bouncing because the
//! protocol touched it, not because two unrelated fields happened to
//! be neighbours.

use crate::peterson::Role;
use crate::semantics::Flag;
use std::sync::atomic::AtomicI32;

/// Bytes reserved per shared field. One page.
pub const CACHE_PAD: usize = 4096;

/// One shared field alone on its own [`CACHE_PAD`]-byte block.
///
/// `align(4096)` must stay in sync with [`CACHE_PAD`]; the attribute
/// only accepts a literal.
#[repr(C, align(4096))]
#[derive(Debug, Default)]
struct Padded<T>(T);

/// Shared state for one contending pair.
///
/// `interested` and `turn` are the protocol's control variables and
/// are accessed only through the [`Flag`] storage-semantics strategy.
/// `value` is the contended cell probed by the fault-injecting
/// critical sections; it is always an atomic, independent of which
/// flag variant is under test, because the probe itself must never be
/// optimizable away.
#[repr(C)]
#[derive(Debug, Default)]
pub struct SharedPair {
    interested_a: Padded<Flag>,
    interested_b: Padded<Flag>,
    turn: Padded<Flag>,
    value: Padded<AtomicI32>,
}

impl SharedPair {
    /// New zero-initialized pair state: nobody interested, turn 0,
    /// value 0.
    pub const fn new() -> Self {
        Self {
            interested_a: Padded(Flag::new()),
            interested_b: Padded(Flag::new()),
            turn: Padded(Flag::new()),
            value: Padded(AtomicI32::new(0)),
        }
    }

    /// The interest flag owned by `role`.
    #[inline(always)]
    pub fn interested(&self, role: Role) -> &Flag {
        match role {
            Role::A => &self.interested_a.0,
            Role::B => &self.interested_b.0,
        }
    }

    /// The shared turn variable.
    #[inline(always)]
    pub fn turn(&self) -> &Flag {
        &self.turn.0
    }

    /// The contended value cell.
    #[inline(always)]
    pub fn value(&self) -> &AtomicI32 {
        &self.value.0
    }
}
