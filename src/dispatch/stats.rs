//! Traffic statistics for a connection
//!
//! Thread-safe counters shared by the reader task and caller tasks.
//! Uses lock-free atomics for all operations.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Connection counters (fully lock-free)
#[derive(Debug, Default)]
pub struct Stats {
    /// Verified frames received
    frames_in: AtomicU64,
    /// Frames written to the transport
    frames_out: AtomicU64,
    /// Raw bytes received from the transport
    bytes_in: AtomicU64,
    /// Raw bytes written to the transport (escaping included)
    bytes_out: AtomicU64,
    /// Frames dropped by the envelope codec
    malformed: AtomicU64,
    /// Verified payloads no codec could decode
    decode_errors: AtomicU64,
    /// Packets published to subscribers
    unsolicited: AtomicU64,
    /// Packets that resolved a pending request
    correlated: AtomicU64,
    /// Requests that timed out
    timeouts: AtomicU64,
}

/// Point-in-time copy of [`Stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub frames_in: u64,
    pub frames_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub malformed: u64,
    pub decode_errors: u64,
    pub unsolicited: u64,
    pub correlated: u64,
    pub timeouts: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_rx_bytes(&self, bytes: usize) {
        self.bytes_in.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Count one outgoing frame of `bytes` wire bytes
    #[inline]
    pub fn add_tx_frame(&self, bytes: usize) {
        self.frames_out.fetch_add(1, Ordering::Relaxed);
        self.bytes_out.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_frames_in(&self) {
        self.frames_in.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_decode_errors(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_unsolicited(&self) {
        self.unsolicited.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_correlated(&self) {
        self.correlated.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_timeouts(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_in: self.frames_in.load(Ordering::Relaxed),
            frames_out: self.frames_out.load(Ordering::Relaxed),
            bytes_in: self.bytes_in.load(Ordering::Relaxed),
            bytes_out: self.bytes_out.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            unsolicited: self.unsolicited.load(Ordering::Relaxed),
            correlated: self.correlated.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_stats_new() {
        let stats = Stats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_counters() {
        let stats = Stats::new();
        stats.add_rx_bytes(6);
        stats.add_rx_bytes(4);
        stats.add_tx_frame(8);
        stats.inc_frames_in();
        stats.inc_malformed();
        stats.inc_timeouts();

        let snap = stats.snapshot();
        assert_eq!(snap.bytes_in, 10);
        assert_eq!(snap.bytes_out, 8);
        assert_eq!(snap.frames_out, 1);
        assert_eq!(snap.frames_in, 1);
        assert_eq!(snap.malformed, 1);
        assert_eq!(snap.timeouts, 1);
        assert_eq!(snap.correlated, 0);
    }

    #[test]
    fn test_stats_thread_safety() {
        let stats = Arc::new(Stats::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let stats_clone = stats.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    stats_clone.add_rx_bytes(1);
                    stats_clone.inc_unsolicited();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snap = stats.snapshot();
        assert_eq!(snap.bytes_in, 1000);
        assert_eq!(snap.unsolicited, 1000);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snap = StatsSnapshot {
            frames_in: 3,
            ..StatsSnapshot::default()
        };
        let text = toml::to_string(&snap).unwrap();
        assert!(text.contains("frames_in = 3"));
    }
}
