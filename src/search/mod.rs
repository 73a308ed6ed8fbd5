//! Distributed brute-force key search
//!
//! The search core splits a key window into disjoint per-worker partitions,
//! sweeps them in parallel, and terminates the whole session as soon as any
//! worker's candidate satisfies the verification predicate:
//! - Partition: contiguous, gapless split of the key window
//! - Oracle: decrypt-and-verify for one candidate key
//! - Coordinator: one-shot result resolution and stop propagation
//! - Session: orchestration, final decrypt, and timing

pub mod coordinator;
pub mod oracle;
pub mod partition;
pub mod predicate;
pub mod session;
pub mod worker;

pub use predicate::MatchPredicate;
pub use session::{SearchConfig, SearchSession, SessionResult};
