//! Flag storage semantics: the controlled variable of the experiment.
//!
//! The protocol's interest flags and turn variable are accessed only
//! through [`Flag`], which is compiled in one of two interchangeable
//! variants:
//!
//! - **`strict-atomics`** (default feature): every load and store is a
//!   sequentially-consistent atomic operation, so all flag accesses
//!   form a single total order visible to both roles.
//! - **feature off**: loads and stores are plain volatile accesses.
//!   Volatility stops the compiler from caching or eliding the access,
//!   but nothing orders the accesses across threads, which is exactly
//!   the hazard Peterson's algorithm cannot tolerate.
//!
//! The protocol code in [`crate::peterson`] is textually identical
//! under both variants; only this module changes.

// ═══════════════════════════════════════════════════════════════════════
//  Ordered variant: SeqCst atomics
// ═══════════════════════════════════════════════════════════════════════

#[cfg(feature = "strict-atomics")]
mod imp {
    use std::sync::atomic::{AtomicI32, Ordering};

    /// A shared flag cell with sequentially-consistent access.
    #[derive(Debug)]
    pub struct Flag(AtomicI32);

    impl Flag {
        /// New flag holding zero.
        pub const fn new() -> Self {
            Self(AtomicI32::new(0))
        }

        #[inline(always)]
        pub fn load(&self) -> i32 {
            self.0.load(Ordering::SeqCst)
        }

        #[inline(always)]
        pub fn store(&self, v: i32) {
            self.0.store(v, Ordering::SeqCst);
        }
    }

    pub const VARIANT: &str = "STRICT ATOMICS";
}

// ═══════════════════════════════════════════════════════════════════════
//  Unordered variant: plain volatile accesses
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(feature = "strict-atomics"))]
mod imp {
    use std::cell::UnsafeCell;

    /// A shared flag cell with plain volatile access and no
    /// cross-thread ordering guarantee.
    #[derive(Debug)]
    pub struct Flag(UnsafeCell<i32>);

    // Safety: not actually race-free. Both roles read and write these
    // cells concurrently with no ordering; demonstrating what that
    // does to the protocol is the purpose of this build variant.
    unsafe impl Sync for Flag {}

    impl Flag {
        /// New flag holding zero.
        pub const fn new() -> Self {
            Self(UnsafeCell::new(0))
        }

        #[inline(always)]
        pub fn load(&self) -> i32 {
            unsafe { self.0.get().read_volatile() }
        }

        #[inline(always)]
        pub fn store(&self, v: i32) {
            unsafe { self.0.get().write_volatile(v) }
        }
    }

    pub const VARIANT: &str = "volatile flags";
}

pub use imp::Flag;

impl Default for Flag {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable name of the active storage-semantics variant, for
/// the startup banner.
pub fn variant_name() -> &'static str {
    imp::VARIANT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(Flag::new().load(), 0);
    }

    #[test]
    fn store_then_load_round_trips() {
        let f = Flag::new();
        f.store(1);
        assert_eq!(f.load(), 1);
        f.store(0);
        assert_eq!(f.load(), 0);
    }

    #[test]
    fn variant_name_matches_build() {
        #[cfg(feature = "strict-atomics")]
        assert_eq!(variant_name(), "STRICT ATOMICS");
        #[cfg(not(feature = "strict-atomics"))]
        assert_eq!(variant_name(), "volatile flags");
    }

    #[cfg(feature = "strict-atomics")]
    #[test]
    fn ordered_flag_is_visible_across_threads() {
        use std::sync::Arc;

        let f = Arc::new(Flag::new());
        let writer = {
            let f = Arc::clone(&f);
            std::thread::spawn(move || f.store(1))
        };
        writer.join().unwrap();
        assert_eq!(f.load(), 1);
    }
}
