//! Termination coordination: one-shot result resolution and stop propagation.
//!
//! The resolved outcome is the only mutable state shared across the system.
//! It lives in a write-once cell with at-most-once-write, many-readers
//! semantics; everything else flows over worker-to-coordinator bookkeeping
//! messages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::search::worker::WorkerStatus;

/// A worker's claim that `key` satisfies the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// The candidate key that matched.
    pub key: u64,
    /// The worker that found it.
    pub worker_id: usize,
    /// The worker's candidates-tested count at the moment of the claim.
    pub sequence: u64,
}

/// One-shot, many-reader termination signal.
///
/// `announce` is first-writer-wins and linearizable; the winning announce
/// also raises the stop flag so the result propagates to every worker,
/// including workers that start polling only after resolution already
/// happened.
#[derive(Debug, Default)]
pub struct ResolvedSignal {
    outcome: OnceLock<SearchOutcome>,
    stop: AtomicBool,
}

impl ResolvedSignal {
    /// Claim the session-wide result. Returns true if this outcome won the
    /// race; a losing claim leaves the resolved result untouched.
    pub fn announce(&self, outcome: SearchOutcome) -> bool {
        let won = self.outcome.set(outcome).is_ok();
        if won {
            self.stop.store(true, Ordering::SeqCst);
        }
        won
    }

    /// Non-blocking read of the resolved outcome. Lock-free after
    /// resolution; safe to call at high frequency from every worker.
    pub fn poll(&self) -> Option<&SearchOutcome> {
        self.outcome.get()
    }

    /// Cooperative cancellation, independent of a resolved result.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Whether workers should stop at their next poll point.
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Message sent from workers to the coordinator.
#[derive(Debug, Clone, Copy)]
pub enum WorkerMessage {
    /// Worker announced a local match; `accepted` records whether it won the
    /// resolution race.
    Found {
        outcome: SearchOutcome,
        accepted: bool,
    },
    /// Worker reached a terminal state.
    Finished {
        worker_id: usize,
        status: WorkerStatus,
        keys_tested: u64,
    },
}

/// Channel endpoints for a worker.
pub struct WorkerChannels {
    /// Send bookkeeping messages to the coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
    /// Shared termination signal.
    pub signal: Arc<ResolvedSignal>,
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels {
    /// Receive messages from all workers.
    pub from_workers: Receiver<WorkerMessage>,
    /// Shared termination signal.
    pub signal: Arc<ResolvedSignal>,
}

/// Create the signal and channels for a session with `num_workers` workers.
pub fn create_channels(num_workers: usize) -> (CoordinatorChannels, Vec<WorkerChannels>) {
    let signal = Arc::new(ResolvedSignal::default());

    // Unbounded so workers never block while reporting.
    let (worker_tx, coordinator_rx) = unbounded();

    let worker_channels = (0..num_workers)
        .map(|_| WorkerChannels {
            to_coordinator: worker_tx.clone(),
            signal: Arc::clone(&signal),
        })
        .collect();

    let coordinator = CoordinatorChannels {
        from_workers: coordinator_rx,
        signal,
    };

    (coordinator, worker_channels)
}

/// Per-partition accounting gathered by the coordinator loop.
#[derive(Debug)]
pub struct CoordinatorReport {
    /// The session-wide resolved outcome, if any worker found a key.
    pub resolved: Option<SearchOutcome>,
    /// Terminal status and candidates tested, indexed by worker id. `None`
    /// means the worker never reported a terminal state (it crashed), so its
    /// partition is permanently unsearched.
    pub worker_reports: Vec<Option<(WorkerStatus, u64)>>,
    /// Number of conflicting-candidate events: losing announces that carried
    /// a different key than the resolved one.
    pub conflicts: u64,
}

impl CoordinatorReport {
    /// Whether every partition reached a terminal state. Exhaustion may only
    /// be claimed when this holds.
    pub fn coverage_complete(&self) -> bool {
        self.worker_reports.iter().all(|report| report.is_some())
    }
}

/// Drive the coordinator until every worker reaches a terminal state or all
/// worker senders are gone. Never blocks past that point: workers always
/// either report `Finished` or drop their sender on the way out.
pub fn run_coordinator(
    channels: &CoordinatorChannels,
    num_workers: usize,
    verbose: bool,
) -> CoordinatorReport {
    let mut worker_reports: Vec<Option<(WorkerStatus, u64)>> = vec![None; num_workers];
    let mut conflicts = 0;
    let mut finished = 0;

    while finished < num_workers {
        match channels.from_workers.recv() {
            Ok(WorkerMessage::Found { outcome, accepted }) => {
                if accepted {
                    if verbose {
                        println!(
                            "Worker {} found key {:#018x} after {} candidates",
                            outcome.worker_id, outcome.key, outcome.sequence
                        );
                    }
                } else if channels.signal.poll().map(|resolved| resolved.key) != Some(outcome.key) {
                    // A different key also satisfied the predicate. First
                    // announced wins; record the loser as a diagnostic.
                    conflicts += 1;
                    eprintln!(
                        "Conflicting candidate: worker {} claimed key {:#018x}, keeping first-announced result",
                        outcome.worker_id, outcome.key
                    );
                }
            }
            Ok(WorkerMessage::Finished {
                worker_id,
                status,
                keys_tested,
            }) => {
                if let Some(report) = worker_reports.get_mut(worker_id) {
                    if report.is_none() {
                        finished += 1;
                    }
                    *report = Some((status, keys_tested));
                }
            }
            // All senders dropped. Any worker still unaccounted for died
            // without reaching a terminal state.
            Err(_) => break,
        }
    }

    CoordinatorReport {
        resolved: channels.signal.poll().copied(),
        worker_reports,
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_announce_first_writer_wins() {
        let signal = ResolvedSignal::default();
        let first = SearchOutcome {
            key: 6789,
            worker_id: 0,
            sequence: 10,
        };
        let second = SearchOutcome {
            key: 4321,
            worker_id: 1,
            sequence: 20,
        };

        assert!(signal.announce(first));
        assert!(!signal.announce(second));
        assert_eq!(signal.poll(), Some(&first));
        assert!(signal.stop_requested());
    }

    #[test]
    fn test_late_poll_sees_resolved_outcome() {
        let signal = Arc::new(ResolvedSignal::default());
        let outcome = SearchOutcome {
            key: 42,
            worker_id: 3,
            sequence: 1,
        };
        signal.announce(outcome);

        // A poller that starts after resolution observes the result on its
        // very first poll.
        let late = Arc::clone(&signal);
        let seen = thread::spawn(move || late.poll().copied())
            .join()
            .expect("poller thread panicked");
        assert_eq!(seen, Some(outcome));
    }

    #[test]
    fn test_concurrent_announces_resolve_to_exactly_one() {
        let signal = Arc::new(ResolvedSignal::default());
        let handles: Vec<_> = (0..8)
            .map(|worker_id| {
                let signal = Arc::clone(&signal);
                thread::spawn(move || {
                    signal.announce(SearchOutcome {
                        key: 1000 + worker_id as u64,
                        worker_id,
                        sequence: 1,
                    })
                })
            })
            .collect();

        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().expect("announcer panicked") as usize)
            .sum();
        assert_eq!(wins, 1);

        let resolved = signal.poll().expect("no outcome resolved");
        assert!((1000..1008).contains(&resolved.key));
        assert_eq!(resolved.key, 1000 + resolved.worker_id as u64);
    }

    #[test]
    fn test_request_stop_without_resolution() {
        let signal = ResolvedSignal::default();
        assert!(!signal.stop_requested());
        signal.request_stop();
        assert!(signal.stop_requested());
        assert_eq!(signal.poll(), None);
    }

    #[test]
    fn test_coordinator_counts_conflicts() {
        let (coordinator, workers) = create_channels(2);

        let winner = SearchOutcome {
            key: 7,
            worker_id: 0,
            sequence: 3,
        };
        let loser = SearchOutcome {
            key: 9,
            worker_id: 1,
            sequence: 5,
        };
        assert!(coordinator.signal.announce(winner));
        assert!(!coordinator.signal.announce(loser));

        workers[0]
            .to_coordinator
            .send(WorkerMessage::Found {
                outcome: winner,
                accepted: true,
            })
            .unwrap();
        workers[1]
            .to_coordinator
            .send(WorkerMessage::Found {
                outcome: loser,
                accepted: false,
            })
            .unwrap();
        for (worker_id, worker) in workers.iter().enumerate() {
            worker
                .to_coordinator
                .send(WorkerMessage::Finished {
                    worker_id,
                    status: WorkerStatus::FoundLocal,
                    keys_tested: 10,
                })
                .unwrap();
        }
        drop(workers);

        let report = run_coordinator(&coordinator, 2, false);
        assert_eq!(report.conflicts, 1);
        assert_eq!(report.resolved, Some(winner));
        assert!(report.coverage_complete());
    }

    #[test]
    fn test_coordinator_detects_crashed_worker() {
        let (coordinator, workers) = create_channels(2);

        workers[0]
            .to_coordinator
            .send(WorkerMessage::Finished {
                worker_id: 0,
                status: WorkerStatus::Exhausted,
                keys_tested: 100,
            })
            .unwrap();
        // Worker 1 drops its sender without ever reporting.
        drop(workers);

        let report = run_coordinator(&coordinator, 2, false);
        assert!(report.resolved.is_none());
        assert!(!report.coverage_complete());
        assert_eq!(
            report.worker_reports[0],
            Some((WorkerStatus::Exhausted, 100))
        );
        assert_eq!(report.worker_reports[1], None);
    }
}
