//! Opt-in timing hooks for the kinematics and tendon pipeline.
//!
//! Timing is only collected when the `engine_metrics` feature is enabled and the
//! target is not WASM (`std::time::Instant` is unavailable there). Otherwise every
//! call compiles down to a plain closure invocation.
//!
//! ```ignore
//! let mut metrics = EngineMetrics::default();
//! metrics.begin();
//! let shape = metrics.time(TimingBucket::ChainBuild, || build_chain(&params, &mut cache));
//! if let Some(report) = metrics.end() {
//!     println!("chain build: {} ns", report.chain_build_ns);
//! }
//! ```

use serde::Serialize;

/// Pipeline phases that accumulate time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Shape computation, including the cache lookup.
    ChainBuild,
    /// Coupling pose reconstruction or inference.
    CouplingFrames,
    /// Eyelet placement on every coupling element.
    Eyelets,
    /// Segment, cumulative and reference tendon lengths.
    TendonLengths,
    /// Actuation command derivation.
    Actuation,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TimingReport {
    pub chain_build_ns: u64,
    pub coupling_frames_ns: u64,
    pub eyelets_ns: u64,
    pub tendon_lengths_ns: u64,
    pub actuation_ns: u64,
}

impl TimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.chain_build_ns
            .saturating_add(self.coupling_frames_ns)
            .saturating_add(self.eyelets_ns)
            .saturating_add(self.tendon_lengths_ns)
            .saturating_add(self.actuation_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing pipeline phases.
///
/// Call [`begin`](Self::begin) to reset, wrap work in [`time`](Self::time) and read
/// the report with [`end`](Self::end), which is `None` when metrics are disabled.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
    report: TimingReport,
}

impl EngineMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = TimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<TimingReport> {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times the execution of `f` and accumulates the elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            // Cap at u64::MAX to prevent overflow
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::ChainBuild => &mut self.report.chain_build_ns,
            TimingBucket::CouplingFrames => &mut self.report.coupling_frames_ns,
            TimingBucket::Eyelets => &mut self.report.eyelets_ns,
            TimingBucket::TendonLengths => &mut self.report.tendon_lengths_ns,
            TimingBucket::Actuation => &mut self.report.actuation_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_report_total() {
        let report = TimingReport {
            chain_build_ns: 1000,
            eyelets_ns: 2000,
            tendon_lengths_ns: 3000,
            ..TimingReport::default()
        };
        assert_eq!(report.total_ns(), 6000);
        assert!((report.total_ms() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn test_time_returns_closure_result() {
        let mut metrics = EngineMetrics::default();
        metrics.begin();
        let result = metrics.time(TimingBucket::ChainBuild, || 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_end_matches_feature_state() {
        let mut metrics = EngineMetrics::default();
        metrics.begin();
        let _ = metrics.time(TimingBucket::Actuation, || ());
        let report = metrics.end();
        if cfg!(all(feature = "engine_metrics", not(target_arch = "wasm32"))) {
            assert!(report.is_some());
        } else {
            assert!(report.is_none());
        }
    }
}
