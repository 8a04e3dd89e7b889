//! Bounded rolling window of usage samples
//!
//! This module provides the sample history backing the dashboard:
//! - Fixed-capacity FIFO buffer with oldest-first eviction
//! - Read-only projections for chart and stat rendering

use crate::models::Sample;
use serde::Serialize;
use std::collections::VecDeque;

/// Fixed window size; not configurable from outside the core.
pub const HISTORY_CAPACITY: usize = 60;

/// Insertion-ordered buffer of the most recent samples
#[derive(Debug, Default)]
pub struct HistoryBuffer {
    samples: VecDeque<Sample>,
}

/// Latest scalar readings for the stat cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestStats {
    pub user_cpu_seconds: f64,
    pub sys_cpu_seconds: f64,
    pub max_rss_kb: i64,
}

/// One point of the CPU-time series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuPoint {
    pub ts: f64,
    pub user: f64,
    pub system: f64,
}

/// One point of the resident-set series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RssPoint {
    pub ts: f64,
    pub rss_kb: i64,
}

/// One point of the page-fault series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultPoint {
    pub ts: f64,
    pub minor: i64,
    pub major: i64,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append a sample at the tail, evicting from the head past capacity.
    pub fn append(&mut self, sample: Sample) {
        while self.samples.len() >= HISTORY_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }

    /// Owned, insertion-ordered copy of the current window.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    /// Current scalar values for the stat cards, if any sample exists.
    pub fn latest_stats(&self) -> Option<LatestStats> {
        self.samples.back().map(|s| LatestStats {
            user_cpu_seconds: s.user_cpu_seconds(),
            sys_cpu_seconds: s.sys_cpu_seconds(),
            max_rss_kb: s.max_rss_kb,
        })
    }

    /// Time series of user/system CPU seconds.
    pub fn cpu_series(&self) -> Vec<CpuPoint> {
        self.samples
            .iter()
            .map(|s| CpuPoint {
                ts: s.timestamp,
                user: s.user_cpu_seconds(),
                system: s.sys_cpu_seconds(),
            })
            .collect()
    }

    /// Time series of max RSS in kilobytes.
    pub fn rss_series(&self) -> Vec<RssPoint> {
        self.samples
            .iter()
            .map(|s| RssPoint {
                ts: s.timestamp,
                rss_kb: s.max_rss_kb,
            })
            .collect()
    }

    /// Time series of minor/major page faults.
    pub fn fault_series(&self) -> Vec<FaultPoint> {
        self.samples
            .iter()
            .map(|s| FaultPoint {
                ts: s.timestamp,
                minor: s.minor_faults,
                major: s.major_faults,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_sample(n: i64) -> Sample {
        Sample {
            user_cpu_sec: n,
            user_cpu_usec: 0,
            sys_cpu_sec: 0,
            sys_cpu_usec: 0,
            max_rss_kb: 1000 + n,
            minor_faults: 10 * n,
            major_faults: n,
            timestamp: 1000.0 + n as f64,
        }
    }

    #[test]
    fn test_append_and_latest() {
        let mut history = HistoryBuffer::new();
        assert!(history.latest().is_none());

        history.append(create_test_sample(1));
        history.append(create_test_sample(2));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().user_cpu_sec, 2);
    }

    #[test]
    fn test_eviction_keeps_last_sixty_in_order() {
        let mut history = HistoryBuffer::new();
        for n in 0..100 {
            history.append(create_test_sample(n));
        }

        assert_eq!(history.len(), HISTORY_CAPACITY);

        let snapshot = history.snapshot();
        assert_eq!(snapshot.first().unwrap().user_cpu_sec, 40);
        assert_eq!(snapshot.last().unwrap().user_cpu_sec, 99);
        for (i, sample) in snapshot.iter().enumerate() {
            assert_eq!(sample.user_cpu_sec, 40 + i as i64);
        }
    }

    #[test]
    fn test_snapshot_is_read_only_projection() {
        let mut history = HistoryBuffer::new();
        history.append(create_test_sample(1));

        let mut snapshot = history.snapshot();
        snapshot.clear();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_latest_stats() {
        let mut history = HistoryBuffer::new();
        assert!(history.latest_stats().is_none());

        history.append(Sample {
            user_cpu_sec: 1,
            user_cpu_usec: 500_000,
            sys_cpu_sec: 0,
            sys_cpu_usec: 250_000,
            max_rss_kb: 2048,
            minor_faults: 10,
            major_faults: 1,
            timestamp: 1000.0,
        });

        let stats = history.latest_stats().unwrap();
        assert!((stats.user_cpu_seconds - 1.5).abs() < 1e-9);
        assert!((stats.sys_cpu_seconds - 0.25).abs() < 1e-9);
        assert_eq!(stats.max_rss_kb, 2048);
    }

    #[test]
    fn test_series_projections() {
        let mut history = HistoryBuffer::new();
        for n in 1..=3 {
            history.append(create_test_sample(n));
        }

        let cpu = history.cpu_series();
        assert_eq!(cpu.len(), 3);
        assert_eq!(cpu[0].ts, 1001.0);
        assert!((cpu[2].user - 3.0).abs() < 1e-9);

        let rss = history.rss_series();
        assert_eq!(rss[1].rss_kb, 1002);

        let faults = history.fault_series();
        assert_eq!(faults[2].minor, 30);
        assert_eq!(faults[2].major, 3);
    }
}
