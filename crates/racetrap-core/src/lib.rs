//! Core protocol state for racetrap, a memory-ordering stress harness.
//!
//! Each contending pair of threads runs Peterson's two-thread
//! mutual-exclusion protocol over a small block of shared state. The
//! harness exists to show, empirically, that the protocol is only
//! correct when its flag variables carry sequential-consistency
//! guarantees: the flag access semantics are the single controlled
//! variable of the experiment, switched at build time.
//!
//! # Architecture
//!
//! - [`pair`] - per-pair shared state, each field padded onto its own
//!   page so cross-core traffic comes only from the protocol itself
//! - [`semantics`] - the flag load/store strategy (SeqCst atomics when
//!   the `strict-atomics` feature is on, plain volatile accesses when
//!   it is off)
//! - [`peterson`] - the role state machines built on the two above
//!
//! This crate has no dependencies and no I/O; the driver and the
//! fault-injecting critical sections live in their own crates.

pub mod pair;
pub mod peterson;
pub mod semantics;
