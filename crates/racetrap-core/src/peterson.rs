//! Peterson's two-thread mutual-exclusion protocol.
//!
//! Each role runs the classic entry/exit sequence over the shared
//! pair state, with every control-variable access routed through the
//! [`Flag`](crate::semantics::Flag) storage-semantics strategy:
//!
//! 1. store own interest flag = 1
//! 2. store `turn` = own token (yielding priority to the other role)
//! 3. spin while the other role is interested and `turn` still holds
//!    own token
//! 4. run the critical-section body, then store own interest flag = 0
//!
//! The spin is a pure busy-wait. That is deliberate: the protocol is
//! the synchronization mechanism under test, so nothing here may fall
//! back to a lock, a condvar, or any other kernel primitive.

use crate::pair::SharedPair;

/// The two contending roles of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    A,
    B,
}

impl Role {
    /// The opposing role.
    #[inline(always)]
    pub fn other(self) -> Role {
        match self {
            Role::A => Role::B,
            Role::B => Role::A,
        }
    }

    /// The value this role writes into `turn` on entry. Writing your
    /// own token yields priority: you wait for as long as `turn`
    /// still holds it.
    #[inline(always)]
    fn turn_token(self) -> i32 {
        match self {
            Role::A => 1,
            Role::B => 0,
        }
    }
}

/// Entry protocol: request the critical section and spin until it is
/// safe to enter.
#[inline]
pub fn enter(pair: &SharedPair, role: Role) {
    pair.interested(role).store(1);
    pair.turn().store(role.turn_token());
    while pair.interested(role.other()).load() != 0 && pair.turn().load() == role.turn_token() {
        std::hint::spin_loop();
    }
}

/// Exit protocol: drop the claim on the critical section.
#[inline]
pub fn exit(pair: &SharedPair, role: Role) {
    pair.interested(role).store(0);
}

/// Run `role`'s state machine for `iterations` rounds, invoking
/// `body` inside the critical section each round.
///
/// The iteration count is the only termination criterion; there is no
/// way to abort a round in flight. A violation detected by the fault
/// oracle tears the whole process down out-of-band instead.
pub fn run(pair: &SharedPair, role: Role, iterations: u64, mut body: impl FnMut(&SharedPair)) {
    for _ in 0..iterations {
        enter(pair, role);
        body(pair);
        exit(pair, role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn other_is_an_involution() {
        assert_eq!(Role::A.other(), Role::B);
        assert_eq!(Role::B.other(), Role::A);
        assert_eq!(Role::A.other().other(), Role::A);
    }

    #[test]
    fn roles_write_distinct_turn_tokens() {
        assert_ne!(Role::A.turn_token(), Role::B.turn_token());
    }

    #[test]
    fn uncontended_entry_proceeds_immediately() {
        let pair = SharedPair::new();
        enter(&pair, Role::A);
        assert_eq!(pair.interested(Role::A).load(), 1);
        assert_eq!(pair.turn().load(), 1);
        exit(&pair, Role::A);
        assert_eq!(pair.interested(Role::A).load(), 0);
    }

    #[test]
    fn sequential_handoff_between_roles() {
        let pair = SharedPair::new();
        enter(&pair, Role::B);
        exit(&pair, Role::B);
        // B no longer interested, so A's entry must not spin.
        enter(&pair, Role::A);
        exit(&pair, Role::A);
        assert_eq!(pair.interested(Role::A).load(), 0);
        assert_eq!(pair.interested(Role::B).load(), 0);
    }

    #[test]
    fn run_invokes_body_once_per_iteration() {
        let pair = SharedPair::new();
        let mut calls = 0u64;
        run(&pair, Role::B, 17, |_| calls += 1);
        assert_eq!(calls, 17);
    }

    // The safety property itself. A plain read-modify-write on the
    // shared cell loses updates unless the protocol really does
    // exclude the roles from the critical section, so two threads
    // hammering the same pair must land on exactly the sum of their
    // iteration counts. Only meaningful when the flags carry ordering
    // guarantees.
    #[cfg(feature = "strict-atomics")]
    #[test]
    fn counting_body_loses_no_updates_under_contention() {
        use std::sync::Arc;

        const ITERS: u64 = 20_000;

        let pair = Arc::new(SharedPair::new());
        let spawn_role = |role: Role| {
            let pair = Arc::clone(&pair);
            std::thread::spawn(move || {
                run(&pair, role, ITERS, |p| {
                    let v = p.value().load(Ordering::Relaxed);
                    p.value().store(v + 1, Ordering::Relaxed);
                });
            })
        };

        let a = spawn_role(Role::A);
        let b = spawn_role(Role::B);
        a.join().unwrap();
        b.join().unwrap();

        assert_eq!(pair.value().load(Ordering::SeqCst) as u64, 2 * ITERS);
    }
}
