//! The fault-injecting critical-section bodies.
//!
//! The contended cell is the observable proxy for mutual exclusion:
//! role A's body leaves 0 in it, role B's body stores 1 and then
//! divides by whatever the cell holds a moment later. B's divisor can
//! only differ from 1 if A's body ran concurrently, so a divide trap
//! is a proof of violation that no compiler pass or lucky reordering
//! can mask.
//!
//! On x86_64 both bodies are inline assembly so there is no room for
//! compiler shenanigans: `xchg reg, [mem]` is an implicitly-locked
//! full-barrier store, `lock xadd` with an addend of 0 is a
//! non-destructive atomic read, and `idiv` raises `#DE` if the
//! divisor is zero. Other architectures get an atomic-RMW fallback
//! with an explicit checked-division error path, because a zero
//! divisor does not reliably trap there (AArch64 defines the quotient
//! as 0).

use std::sync::atomic::AtomicI32;

// ═══════════════════════════════════════════════════════════════════════
//  x86_64: hardware divide trap
// ═══════════════════════════════════════════════════════════════════════

/// Role A's body: full-barrier atomic store of 0 into the cell.
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn critical_section_a(cell: &AtomicI32) {
    unsafe {
        // xchg reg, [mem] is implicitly locked; the old cell value is
        // discarded.
        core::arch::asm!(
            "xchg dword ptr [{cell}], {val:e}",
            cell = in(reg) cell.as_ptr(),
            val = inout(reg) 0i32 => _,
            options(nostack, preserves_flags),
        );
    }
}

/// Role B's body: store 1, widen the race window, then divide 1 by
/// the current cell value.
///
/// The yield between the store and the read-back is a scheduling
/// heuristic, nothing more: it gives a violating role-A execution a
/// larger window to stomp the cell. Whether it helps depends on the
/// host's scheduler and core count.
#[cfg(target_arch = "x86_64")]
#[inline]
pub fn critical_section_b(cell: &AtomicI32) {
    unsafe {
        core::arch::asm!(
            "xchg dword ptr [{cell}], {val:e}",
            cell = in(reg) cell.as_ptr(),
            val = inout(reg) 1i32 => _,
            options(nostack, preserves_flags),
        );
    }

    std::thread::yield_now();

    // Atomic read + divide in one block. After `lock xadd` with an
    // addend of 0 the register holds the cell value and the cell is
    // unchanged; `idiv` then raises #DE if that value is zero.
    unsafe {
        core::arch::asm!(
            "lock xadd dword ptr [{cell}], {div:e}",
            "mov eax, 1",
            "xor edx, edx",
            "idiv {div:e}",
            cell = in(reg) cell.as_ptr(),
            div = inout(reg) 0i32 => _,
            out("eax") _,
            out("edx") _,
            options(nostack),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Portable fallback: checked division
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "x86_64"))]
use std::sync::atomic::Ordering;

/// Role A's body: full-barrier atomic store of 0 into the cell.
#[cfg(not(target_arch = "x86_64"))]
#[inline]
pub fn critical_section_a(cell: &AtomicI32) {
    cell.swap(0, Ordering::SeqCst);
}

/// Role B's body: store 1, widen the race window, read the cell back
/// and check the divisor explicitly.
///
/// Preserves the x86_64 variant's observable contract without a
/// hardware trap: a zero divisor produces the same diagnosis on
/// stderr and the same exit status 1.
#[cfg(not(target_arch = "x86_64"))]
#[inline]
pub fn critical_section_b(cell: &AtomicI32) {
    cell.swap(1, Ordering::SeqCst);

    std::thread::yield_now();

    let divisor = cell.fetch_add(0, Ordering::SeqCst);
    if divisor == 0 {
        crate::oracle::divide_by_zero_abort();
    }
    let _quotient = 1 / divisor;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn role_a_leaves_zero() {
        let cell = AtomicI32::new(7);
        critical_section_a(&cell);
        assert_eq!(cell.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn role_b_leaves_one_and_does_not_trap_uncontended() {
        let cell = AtomicI32::new(0);
        critical_section_b(&cell);
        assert_eq!(cell.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn alternating_bodies_never_trap_in_sequence() {
        // Sequential execution is trivially mutually exclusive, so no
        // interleaving of the two bodies may fault.
        let cell = AtomicI32::new(0);
        for _ in 0..1_000 {
            critical_section_a(&cell);
            critical_section_b(&cell);
            assert_eq!(cell.load(Ordering::SeqCst), 1);
        }
    }
}
