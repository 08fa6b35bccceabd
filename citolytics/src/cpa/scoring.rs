//! Strategies to turn the accumulated statistics of a pair into a score.

#[cfg(test)]
use mockall::automock;

use crate::data::scored::PairStats;

/// Computes the score of a pair for one alpha from its accumulated statistics.
#[cfg_attr(test, automock)]
pub trait ScoringStrategy {
    /// The score of the pair for the alpha at `alpha_index` of the configured alphas.
    fn score(&self, stats: &PairStats, alpha_index: usize, alpha: f64) -> f64;

    /// Whether the strategy needs the retained distance samples.
    fn requires_samples(&self) -> bool;
}

/// Co-citation proximity `Σ 1 / distance^alpha` over all co-citations of a pair.
///
/// This is additive over co-citations, hence the scores of partial results may be summed.
#[derive(Clone, Copy, Debug, Default)]
pub struct InverseDistance;

impl ScoringStrategy for InverseDistance {
    fn score(&self, stats: &PairStats, alpha_index: usize, _alpha: f64) -> f64 {
        stats.proximity()[alpha_index]
    }

    fn requires_samples(&self) -> bool {
        false
    }
}

/// Co-citation count damped by the median distance, `count / median^alpha`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MedianDistance;

impl ScoringStrategy for MedianDistance {
    fn score(&self, stats: &PairStats, _alpha_index: usize, alpha: f64) -> f64 {
        let median = stats
            .median_distance()
            .unwrap_or_else(|| stats.mean_distance());
        stats.count() as f64 / median.powf(alpha)
    }

    fn requires_samples(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use test_utils::assert_approx_eq;

    use super::*;

    fn stats(distances: &[u32], alphas: &[f64]) -> PairStats {
        distances
            .iter()
            .map(|&distance| PairStats::observe(distance, alphas, true))
            .reduce(PairStats::merge)
            .unwrap()
    }

    #[test]
    fn test_inverse_distance() {
        let stats = stats(&[1, 2, 4], &[1., 0.]);
        assert_approx_eq!(f64, InverseDistance.score(&stats, 0, 1.), 1.75);
        // alpha 0 degrades to the co-citation count
        assert_approx_eq!(f64, InverseDistance.score(&stats, 1, 0.), 3.);
    }

    #[test]
    fn test_median_distance() {
        let stats = stats(&[1, 4, 4], &[2.]);
        assert_approx_eq!(f64, MedianDistance.score(&stats, 0, 2.), 3. / 16.);
        assert!(MedianDistance.requires_samples());
    }
}
