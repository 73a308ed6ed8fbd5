//! End-to-end search session: partition, spawn, resolve, report.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::cipher::CipherOracle;
use crate::search::coordinator::{create_channels, run_coordinator, CoordinatorReport};
use crate::search::oracle::CandidateOracle;
use crate::search::partition::{partition, KeyRange};
use crate::search::predicate::MatchPredicate;
use crate::search::worker::{run_worker, WorkerStatus};

/// Configuration for one search session.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Size of the key window to sweep.
    pub total_keys: u64,
    /// First key of the window (the window is `[start_key, start_key + total_keys)`).
    pub start_key: u64,
    /// Number of worker threads, one partition each.
    pub workers: usize,
    /// Candidate tests between termination-signal polls.
    pub poll_interval: u64,
    /// Whether the message was padded before encryption.
    pub padded: bool,
    /// Verification predicate for decrypted candidates.
    pub predicate: MatchPredicate,
}

impl SearchConfig {
    pub fn new(total_keys: u64, predicate: MatchPredicate) -> Self {
        Self {
            total_keys,
            start_key: 0,
            workers: num_cpus::get().max(1),
            poll_interval: 1024,
            padded: true,
            predicate,
        }
    }

    pub fn with_start_key(mut self, start_key: u64) -> Self {
        self.start_key = start_key;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: u64) -> Self {
        self.poll_interval = poll_interval.max(1);
        self
    }

    pub fn with_padding(mut self, padded: bool) -> Self {
        self.padded = padded;
        self
    }
}

/// Final result of a session. Immutable after creation.
#[derive(Debug)]
pub struct SessionResult {
    /// Whether any worker's candidate was accepted as the session result.
    pub resolved: bool,
    /// The resolved key.
    pub key: Option<u64>,
    /// Plaintext recovered with the resolved key.
    pub plaintext: Option<Vec<u8>>,
    /// Wall-clock search duration.
    pub elapsed: Duration,
    /// Aggregated accounting from all workers.
    pub statistics: SearchStatistics,
}

/// Statistics aggregated across the session's workers.
#[derive(Debug)]
pub struct SearchStatistics {
    /// Total candidates tested across all workers.
    pub keys_tested: u64,
    /// Terminal status and candidates tested per worker; `None` status for a
    /// worker that crashed before reporting.
    pub worker_reports: Vec<(usize, Option<WorkerStatus>, u64)>,
    /// Conflicting-candidate events (losing announces with a different key).
    pub conflicts: u64,
    /// Whether every partition reached a terminal state. Exhaustion is only
    /// honest when this holds.
    pub coverage_complete: bool,
}

impl SearchStatistics {
    fn from_report(report: &CoordinatorReport) -> Self {
        let worker_reports: Vec<(usize, Option<WorkerStatus>, u64)> = report
            .worker_reports
            .iter()
            .enumerate()
            .map(|(worker_id, entry)| match entry {
                Some((status, keys_tested)) => (worker_id, Some(*status), *keys_tested),
                None => (worker_id, None, 0),
            })
            .collect();

        SearchStatistics {
            keys_tested: worker_reports.iter().map(|(_, _, tested)| tested).sum(),
            worker_reports,
            conflicts: report.conflicts,
            coverage_complete: report.coverage_complete(),
        }
    }

    /// Candidates tested per second over the given wall-clock duration.
    pub fn throughput(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.keys_tested as f64 / secs
        }
    }

    /// Format statistics as a human-readable string.
    pub fn format_summary(&self, elapsed: Duration) -> String {
        let mut s = String::new();
        s.push_str(&format!("Keys tested: {}\n", self.keys_tested));
        s.push_str(&format!(
            "Throughput: {:.0} keys/sec\n",
            self.throughput(elapsed)
        ));
        for (worker_id, status, keys_tested) in &self.worker_reports {
            match status {
                Some(status) => s.push_str(&format!(
                    "  worker {}: {} after {} keys\n",
                    worker_id, status, keys_tested
                )),
                None => s.push_str(&format!(
                    "  worker {}: crashed, partition unsearched\n",
                    worker_id
                )),
            }
        }
        if self.conflicts > 0 {
            s.push_str(&format!("Conflicting candidates: {}\n", self.conflicts));
        }
        if !self.coverage_complete {
            s.push_str("Coverage incomplete: at least one partition was not fully searched\n");
        }
        s
    }
}

/// Orchestrates one end-to-end run over a fixed ciphertext.
pub struct SearchSession {
    cipher: Arc<dyn CipherOracle>,
    ciphertext: Arc<[u8]>,
    config: SearchConfig,
}

impl SearchSession {
    /// Validate the configuration and build a session. Misaligned ciphertext
    /// and an overflowing key window are configuration errors, reported
    /// before any worker starts.
    pub fn new(
        cipher: Arc<dyn CipherOracle>,
        ciphertext: Vec<u8>,
        config: SearchConfig,
    ) -> Result<Self, String> {
        if ciphertext.is_empty() {
            return Err("ciphertext is empty".into());
        }
        let block_size = cipher.block_size();
        if ciphertext.len() % block_size != 0 {
            return Err(format!(
                "ciphertext length {} is not a multiple of the cipher block size {}",
                ciphertext.len(),
                block_size
            ));
        }
        if config.start_key.checked_add(config.total_keys).is_none() {
            return Err(format!(
                "key window [{}, {} + {}) overflows the key type",
                config.start_key, config.start_key, config.total_keys
            ));
        }
        Ok(Self {
            cipher,
            ciphertext: ciphertext.into(),
            config,
        })
    }

    /// Run the search to completion and report the session result.
    ///
    /// Blocks until either a key is resolved or every worker reaches a
    /// terminal state; all worker threads are joined before returning, so
    /// nothing is leaked even when stragglers are cut short by the stop
    /// signal.
    pub fn run(&self, verbose: bool) -> SessionResult {
        let start_time = Instant::now();
        let workers = self.config.workers.max(1);

        let ranges: Vec<KeyRange> = partition(self.config.total_keys, workers)
            .into_iter()
            .map(|range| range.offset(self.config.start_key))
            .collect();

        if verbose {
            for (worker_id, range) in ranges.iter().enumerate() {
                println!(
                    "Worker {} searching keys in range [{:#x}, {:#x})",
                    worker_id, range.start, range.end
                );
            }
        }

        let oracle = Arc::new(CandidateOracle::new(
            Arc::clone(&self.cipher),
            Arc::clone(&self.ciphertext),
            self.config.predicate.clone(),
            self.config.padded,
        ));

        let (coordinator_channels, worker_channels) = create_channels(workers);
        let poll_interval = self.config.poll_interval;

        let handles: Vec<_> = worker_channels
            .into_iter()
            .zip(ranges)
            .enumerate()
            .map(|(worker_id, (channels, range))| {
                let oracle = Arc::clone(&oracle);
                thread::spawn(move || {
                    run_worker(worker_id, range, &oracle, &channels, poll_interval)
                })
            })
            .collect();

        let report = run_coordinator(&coordinator_channels, workers, verbose);

        // Stop signal is already raised on resolution; raise it here too so
        // a teardown after a crashed-worker disconnect cannot strand anyone.
        coordinator_channels.signal.request_stop();
        for handle in handles {
            let _ = handle.join();
        }

        let statistics = SearchStatistics::from_report(&report);
        let (key, plaintext) = match report.resolved {
            Some(outcome) => (Some(outcome.key), Some(oracle.recover(outcome.key))),
            None => (None, None),
        };

        SessionResult {
            resolved: key.is_some(),
            key,
            plaintext,
            elapsed: start_time.elapsed(),
            statistics,
        }
    }
}
