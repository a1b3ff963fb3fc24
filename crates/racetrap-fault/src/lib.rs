//! Fault injection and violation detection for racetrap.
//!
//! This crate turns a mutual-exclusion violation into a hardware
//! fault, and intercepts that fault with a definitive diagnosis:
//!
//! - [`probe`] - the two critical-section bodies. Role A atomically
//!   stores 0 into the contended cell; role B atomically stores 1,
//!   yields, then atomically reads the cell back and divides by it.
//!   If mutual exclusion held, the divisor is exactly 1; if it did
//!   not, the divisor can be 0 and the division traps.
//! - [`oracle`] - a process-wide SIGFPE handler that classifies the
//!   trap (integer divide-by-zero versus anything else) and aborts
//!   the run with exit status 1.
//!
//! The probe is built from atomic read-modify-write instructions on
//! purpose: a race on ordinary variables is undefined behaviour, and
//! a compiler may legally assume it never happens and delete the
//! probe. The detection channel must itself be immune to the hazard
//! class it measures.

pub mod oracle;
pub mod probe;
