//! Per-partition worker search loop.

use crate::search::coordinator::{SearchOutcome, WorkerChannels, WorkerMessage};
use crate::search::oracle::CandidateOracle;
use crate::search::partition::KeyRange;

/// Terminal state of a worker's search loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// The worker's own candidate satisfied the predicate.
    FoundLocal,
    /// Another worker resolved the session; remaining range abandoned.
    StoppedExternal,
    /// The full range was searched without a match.
    Exhausted,
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerStatus::FoundLocal => write!(f, "found"),
            WorkerStatus::StoppedExternal => write!(f, "stopped"),
            WorkerStatus::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Sweep `range` in increasing key order until a match, an external stop, or
/// exhaustion.
///
/// The termination signal is polled every `poll_interval` candidate tests,
/// including before the very first test, so wasted work after a remote
/// success is bounded by the interval and a worker whose range was already
/// resolved before it started exits on its first poll. On a local match the
/// worker announces and exits immediately; it never keeps searching for a
/// "better" key.
pub fn run_worker(
    worker_id: usize,
    range: KeyRange,
    oracle: &CandidateOracle,
    channels: &WorkerChannels,
    poll_interval: u64,
) -> WorkerStatus {
    let poll_interval = poll_interval.max(1);
    let mut keys_tested = 0;

    for key in range.start..range.end {
        if keys_tested % poll_interval == 0 && channels.signal.stop_requested() {
            let _ = channels.to_coordinator.send(WorkerMessage::Finished {
                worker_id,
                status: WorkerStatus::StoppedExternal,
                keys_tested,
            });
            return WorkerStatus::StoppedExternal;
        }

        keys_tested += 1;
        if oracle.test(key) {
            let outcome = SearchOutcome {
                key,
                worker_id,
                sequence: keys_tested,
            };
            let accepted = channels.signal.announce(outcome);
            let _ = channels
                .to_coordinator
                .send(WorkerMessage::Found { outcome, accepted });
            let _ = channels.to_coordinator.send(WorkerMessage::Finished {
                worker_id,
                status: WorkerStatus::FoundLocal,
                keys_tested,
            });
            return WorkerStatus::FoundLocal;
        }
    }

    let _ = channels.to_coordinator.send(WorkerMessage::Finished {
        worker_id,
        status: WorkerStatus::Exhausted,
        keys_tested,
    });
    WorkerStatus::Exhausted
}
