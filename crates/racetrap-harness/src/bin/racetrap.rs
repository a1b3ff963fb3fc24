//! CLI binary for the racetrap mutual-exclusion stress harness.
//!
//! Runs N independent pairs of threads through Peterson's protocol
//! with a fault-injecting critical section. Which flag-storage
//! variant is under test is fixed at build time:
//!
//! ```bash
//! # Ordered flags (SeqCst atomics): must always finish cleanly
//! cargo run --release -- 32
//!
//! # Racy flags (plain volatile accesses): expected to trip the
//! # divide-by-zero oracle on a multi-core machine, given enough
//! # contention
//! cargo run --release --no-default-features -- 64
//! ```
//!
//! Exit status is 0 on a clean run and 1 on a configuration error,
//! setup failure, or detected violation.

use clap::Parser;
use racetrap_harness::{
    available_cpus, banner, HarnessConfig, DEFAULT_ITERATIONS, DEFAULT_PAIRS,
};

#[derive(Parser)]
#[command(name = "racetrap")]
#[command(about = "Peterson mutual-exclusion stress harness with a hardware fault oracle")]
#[command(version)]
struct Cli {
    /// Number of contending pairs (two threads each).
    #[arg(default_value_t = DEFAULT_PAIRS, allow_negative_numbers = true)]
    pairs: i64,

    /// Protocol iterations per thread.
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: u64,
}

fn main() {
    env_logger::init();

    // clap's own exit path uses status 2; every configuration failure
    // here must exit 1. Help and version stay on 0.
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let code = if err.use_stderr() { 1 } else { 0 };
        let _ = err.print();
        std::process::exit(code);
    });

    let config = match HarnessConfig::new(cli.pairs, cli.iterations) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    eprintln!("{}", banner(&config, available_cpus()));

    if let Err(err) = racetrap_harness::run(&config) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    println!("Finished without detecting a violation.");
}
