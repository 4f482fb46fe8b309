//! End-of-output marker generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const MARKER_PREFIX: &str = "__MARK_";
const MARKER_SUFFIX: &str = "__";

/// Generates delimiter strings that terminate a command's output.
///
/// A marker is `__MARK_<micros>_<seq>__`, where `micros` is a monotonic
/// microsecond reading anchored to wall-clock time at construction and
/// `seq` is a per-generator counter. The counter alone guarantees that
/// no two markers from one generator are equal.
#[derive(Debug)]
pub struct MarkerGenerator {
    anchor_micros: u64,
    origin: Instant,
    counter: AtomicU64,
}

impl MarkerGenerator {
    /// Create a new generator with its counter at zero.
    pub fn new() -> Self {
        let anchor_micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        Self {
            anchor_micros,
            origin: Instant::now(),
            counter: AtomicU64::new(0),
        }
    }

    /// Produce the next marker.
    pub fn next_marker(&self) -> String {
        let micros = self.anchor_micros + self.origin.elapsed().as_micros() as u64;
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{MARKER_PREFIX}{micros}_{seq}{MARKER_SUFFIX}")
    }

    /// Number of markers handed out so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for MarkerGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uniqueness() {
        let generator = MarkerGenerator::new();
        let mut markers = HashSet::new();
        for _ in 0..10_000 {
            let marker = generator.next_marker();
            assert!(markers.insert(marker.clone()), "Duplicate marker: {}", marker);
        }
        assert_eq!(markers.len(), 10_000);
        assert_eq!(generator.issued(), 10_000);
    }

    #[test]
    fn test_format() {
        let generator = MarkerGenerator::new();
        let marker = generator.next_marker();
        assert!(marker.starts_with("__MARK_"));
        assert!(marker.ends_with("_0__"));

        let body = &marker["__MARK_".len()..marker.len() - "__".len()];
        let (micros, seq) = body.split_once('_').unwrap();
        assert!(micros.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(seq, "0");
    }

    #[test]
    fn test_independent_generators_restart_sequence() {
        let a = MarkerGenerator::new();
        let b = MarkerGenerator::new();
        assert!(a.next_marker().ends_with("_0__"));
        assert!(b.next_marker().ends_with("_0__"));
    }
}
