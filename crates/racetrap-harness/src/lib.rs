//! Driver for the racetrap harness.
//!
//! Validates the configuration, allocates one [`SharedPair`] per
//! contending pair, installs the violation oracle, and runs two OS
//! threads per pair until every thread has completed its iteration
//! budget. There is no per-pair result reporting: either the fault
//! oracle tears the process down with a diagnosis, or every thread
//! finishes and the run succeeded.

use racetrap_core::pair::SharedPair;
use racetrap_core::peterson::{self, Role};
use racetrap_core::semantics;
use racetrap_fault::{oracle, probe};
use std::sync::Arc;
use std::thread;
use thiserror::Error;

/// Default number of contending pairs.
pub const DEFAULT_PAIRS: i64 = 32;

/// Default protocol iterations per thread.
pub const DEFAULT_ITERATIONS: u64 = 1_000_000;

/// Rejected harness configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("need >0 pairs")]
    NonPositivePairs,
}

/// Setup failure after configuration was accepted.
///
/// Runtime correctness violations never surface here; those arrive
/// through the fault channel and terminate the process out-of-band.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to install the violation oracle: {0}")]
    Oracle(#[from] oracle::InstallError),

    #[error("failed to spawn protocol thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("protocol thread panicked")]
    ThreadPanicked,
}

/// Validated harness configuration.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Number of contending pairs.
    pub pairs: usize,
    /// Protocol iterations per thread.
    pub iterations: u64,
}

impl HarnessConfig {
    /// Validate a raw pair count and iteration budget.
    pub fn new(pairs: i64, iterations: u64) -> Result<Self, ConfigError> {
        if pairs <= 0 {
            return Err(ConfigError::NonPositivePairs);
        }
        Ok(Self {
            pairs: pairs as usize,
            iterations,
        })
    }

    /// Total protocol threads this configuration will spawn.
    pub fn thread_count(&self) -> usize {
        self.pairs * 2
    }
}

/// The startup banner printed to stderr before the threads launch.
pub fn banner(config: &HarnessConfig, cpus: usize) -> String {
    format!(
        "Launching {} pairs ({} threads) on {} CPUs [{}]",
        config.pairs,
        config.thread_count(),
        cpus,
        semantics::variant_name(),
    )
}

/// Logical processors available to this process. Informational only;
/// correctness never depends on it.
pub fn available_cpus() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Install the oracle, run every pair to completion.
///
/// Returns `Ok(())` only if all `2 * pairs` threads finished their
/// full iteration budget without the oracle intercepting a fault.
pub fn run(config: &HarnessConfig) -> Result<(), HarnessError> {
    // The oracle must be live before the first probe can execute.
    oracle::install()?;

    let pairs: Vec<Arc<SharedPair>> = (0..config.pairs)
        .map(|_| Arc::new(SharedPair::new()))
        .collect();
    log::debug!(
        "allocated {} pair states, {} bytes each",
        pairs.len(),
        std::mem::size_of::<SharedPair>(),
    );

    let mut handles = Vec::with_capacity(config.thread_count());
    for (id, pair) in pairs.iter().enumerate() {
        handles.push(spawn_role(id, pair, Role::A, config.iterations)?);
        handles.push(spawn_role(id, pair, Role::B, config.iterations)?);
    }
    log::debug!("spawned {} protocol threads", handles.len());

    for handle in handles {
        handle.join().map_err(|_| HarnessError::ThreadPanicked)?;
    }
    Ok(())
}

fn spawn_role(
    id: usize,
    pair: &Arc<SharedPair>,
    role: Role,
    iterations: u64,
) -> Result<thread::JoinHandle<()>, HarnessError> {
    let pair = Arc::clone(pair);
    let name = format!(
        "pair{}-{}",
        id,
        match role {
            Role::A => 'a',
            Role::B => 'b',
        }
    );
    thread::Builder::new()
        .name(name)
        .spawn(move || match role {
            Role::A => peterson::run(&pair, role, iterations, |p| {
                probe::critical_section_a(p.value())
            }),
            Role::B => peterson::run(&pair, role, iterations, |p| {
                probe::critical_section_b(p.value())
            }),
        })
        .map_err(HarnessError::Spawn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_accepts_positive_pair_counts() {
        let config = HarnessConfig::new(1, 100).unwrap();
        assert_eq!(config.pairs, 1);
        assert_eq!(config.iterations, 100);
        assert_eq!(config.thread_count(), 2);
    }

    #[test]
    fn config_rejects_zero_pairs() {
        assert_eq!(
            HarnessConfig::new(0, 100).unwrap_err(),
            ConfigError::NonPositivePairs
        );
    }

    #[test]
    fn config_rejects_negative_pairs() {
        assert_eq!(
            HarnessConfig::new(-3, 100).unwrap_err(),
            ConfigError::NonPositivePairs
        );
    }

    #[test]
    fn rejection_message_names_the_constraint() {
        assert_eq!(
            HarnessConfig::new(-3, 100).unwrap_err().to_string(),
            "need >0 pairs"
        );
    }

    #[test]
    fn banner_reports_counts_and_variant() {
        let config = HarnessConfig::new(4, 100).unwrap();
        let line = banner(&config, 8);
        assert!(line.starts_with("Launching 4 pairs (8 threads) on 8 CPUs ["));
        assert!(line.ends_with(&format!("[{}]", semantics::variant_name())));
    }

    // End-to-end: a short ordered-variant run must complete cleanly.
    // The safety property is deterministic there, not probabilistic,
    // so this is a strict assertion.
    #[cfg(feature = "strict-atomics")]
    #[test]
    fn short_ordered_run_completes_without_violation() {
        let config = HarnessConfig::new(2, 2_000).unwrap();
        run(&config).unwrap();
    }
}
