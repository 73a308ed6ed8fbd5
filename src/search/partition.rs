//! Key-space partitioning across workers.

/// A contiguous, half-open sub-range of the key space assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRange {
    /// First key in the range.
    pub start: u64,
    /// One past the last key in the range.
    pub end: u64,
}

impl KeyRange {
    /// Number of candidate keys in the range.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the range contains no keys. Empty-range workers terminate
    /// immediately without error.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Shift the range by `base`, for key windows that do not start at zero.
    pub fn offset(self, base: u64) -> KeyRange {
        KeyRange {
            start: self.start + base,
            end: self.end + base,
        }
    }
}

/// Split `[0, total_keys)` into `worker_count` contiguous, disjoint ranges.
///
/// Worker `i` gets `[i*base, (i+1)*base)` with `base = total_keys /
/// worker_count`; the last worker absorbs the integer-division remainder so
/// the union is exactly `[0, total_keys)` with no gap and no overlap. When
/// `total_keys < worker_count` the leading workers receive empty ranges.
/// Pure and deterministic.
pub fn partition(total_keys: u64, worker_count: usize) -> Vec<KeyRange> {
    let worker_count = worker_count.max(1);
    let base = total_keys / worker_count as u64;

    (0..worker_count)
        .map(|i| {
            let start = i as u64 * base;
            let end = if i == worker_count - 1 {
                total_keys
            } else {
                (i as u64 + 1) * base
            };
            KeyRange { start, end }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(total_keys: u64, worker_count: usize) {
        let ranges = partition(total_keys, worker_count);
        assert_eq!(ranges.len(), worker_count);

        // Contiguous and gapless: each range starts where the previous ended.
        let mut expected_start = 0;
        for range in &ranges {
            assert_eq!(range.start, expected_start);
            assert!(range.start <= range.end);
            expected_start = range.end;
        }
        assert_eq!(expected_start, total_keys);
    }

    #[test]
    fn test_partition_coverage() {
        for total_keys in [0, 1, 7, 1000, 65_536, 100_000_000] {
            for worker_count in 1..=9 {
                assert_covers(total_keys, worker_count);
            }
        }
    }

    #[test]
    fn test_last_worker_absorbs_remainder() {
        let ranges = partition(1000, 7);
        assert_eq!(ranges[0], KeyRange { start: 0, end: 142 });
        assert_eq!(
            ranges[6],
            KeyRange {
                start: 852,
                end: 1000
            }
        );
    }

    #[test]
    fn test_even_split_has_no_remainder() {
        let ranges = partition(65_536, 4);
        for range in &ranges {
            assert_eq!(range.len(), 16_384);
        }
    }

    #[test]
    fn test_fewer_keys_than_workers() {
        let ranges = partition(5, 8);
        for range in &ranges[..7] {
            assert!(range.is_empty());
        }
        assert_eq!(ranges[7], KeyRange { start: 0, end: 5 });
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(partition(123_457, 6), partition(123_457, 6));
    }

    #[test]
    fn test_offset() {
        let range = KeyRange { start: 10, end: 20 };
        assert_eq!(
            range.offset(100),
            KeyRange {
                start: 110,
                end: 120
            }
        );
        assert_eq!(range.offset(100).len(), range.len());
    }
}
