//! Strategy ranking
//!
//! Strategies are ordered by available targets (descending), ties broken by
//! baseline latency (ascending, failed baselines last). The sort is stable so
//! full ties keep test order.

use crate::orchestrator::StrategyResult;
use std::fmt;

/// Rank results best first
pub fn rank(results: &[StrategyResult]) -> Vec<&StrategyResult> {
    let mut ranked: Vec<&StrategyResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        b.available
            .cmp(&a.available)
            .then_with(|| a.baseline.cmp_fastest_first(&b.baseline))
    });
    ranked
}

/// Qualitative label shown in the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    /// Rank 1
    Best,
    /// Above 80%
    Excellent,
    /// Above 60%
    Good,
    /// Above 40%
    Fair,
    /// Everything else
    Poor,
}

impl Rating {
    /// Rating for a 1-based `rank` with the given success rate in percent
    pub fn classify(rank: usize, success_rate: f64) -> Self {
        if rank == 1 {
            Self::Best
        } else if success_rate > 80.0 {
            Self::Excellent
        } else if success_rate > 60.0 {
            Self::Good
        } else if success_rate > 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Upper-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Best => "BEST",
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Poor => "POOR",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
