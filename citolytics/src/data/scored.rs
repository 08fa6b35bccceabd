use smallvec::SmallVec;

use crate::{
    data::{document::PageId, pair::PairKey},
    recommend::Recommendation,
};

/// Partial co-citation statistics of a pair.
///
/// Every component merges associatively and commutatively, the result of
/// combining the partial statistics of a pair is independent of the grouping
/// and order of the partials.
#[derive(Clone, Debug, PartialEq)]
pub struct PairStats {
    count: u64,
    distance_sum: u64,
    distance_squared_sum: u64,
    min_distance: u32,
    max_distance: u32,
    /// `Σ distance^-alpha` per alpha.
    proximity: SmallVec<[f64; 4]>,
    /// The distance multiset, only retained for the median.
    samples: Option<SmallVec<[u32; 4]>>,
}

impl PairStats {
    /// Statistics of a single co-citation.
    pub fn observe(distance: u32, alphas: &[f64], keep_samples: bool) -> Self {
        let distance = distance.max(1);
        let proximity = alphas
            .iter()
            .map(|&alpha| f64::from(distance).powf(-alpha))
            .collect();

        Self {
            count: 1,
            distance_sum: u64::from(distance),
            distance_squared_sum: u64::from(distance).pow(2),
            min_distance: distance,
            max_distance: distance,
            proximity,
            samples: keep_samples.then(|| SmallVec::from_elem(distance, 1)),
        }
    }

    /// Merges two partial statistics of the same pair.
    pub fn merge(mut self, other: Self) -> Self {
        self.absorb(other);
        self
    }

    /// Merges the other partial statistics into these.
    pub(crate) fn absorb(&mut self, other: Self) {
        debug_assert_eq!(self.proximity.len(), other.proximity.len());

        self.count += other.count;
        self.distance_sum += other.distance_sum;
        self.distance_squared_sum += other.distance_squared_sum;
        self.min_distance = self.min_distance.min(other.min_distance);
        self.max_distance = self.max_distance.max(other.max_distance);
        self.proximity
            .iter_mut()
            .zip(other.proximity)
            .for_each(|(this, other)| *this += other);
        self.samples = match (self.samples.take(), other.samples) {
            (Some(mut this), Some(other)) => {
                this.extend(other);
                Some(this)
            }
            _ => None,
        };
    }

    /// The number of co-citations.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn distance_sum(&self) -> u64 {
        self.distance_sum
    }

    pub fn distance_squared_sum(&self) -> u64 {
        self.distance_squared_sum
    }

    pub fn min_distance(&self) -> u32 {
        self.min_distance
    }

    pub fn max_distance(&self) -> u32 {
        self.max_distance
    }

    pub fn mean_distance(&self) -> f64 {
        self.distance_sum as f64 / self.count as f64
    }

    /// The median distance, if the distances were retained.
    pub fn median_distance(&self) -> Option<f64> {
        let mut samples = self.samples.clone()?;
        samples.sort_unstable();

        let mid = samples.len() / 2;
        let median = if samples.len() % 2 == 0 {
            (f64::from(samples[mid - 1]) + f64::from(samples[mid])) / 2.
        } else {
            f64::from(samples[mid])
        };
        Some(median)
    }

    /// The proximity sums `Σ distance^-alpha`, one per alpha.
    pub fn proximity(&self) -> &[f64] {
        &self.proximity
    }
}

/// The final co-citation result of a pair.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredPair {
    pub key: PairKey,
    pub id_a: Option<PageId>,
    pub id_b: Option<PageId>,
    pub stats: PairStats,
    /// One score per configured alpha, in the order of the alphas.
    pub scores: Vec<f64>,
}

impl ScoredPair {
    pub fn title_a(&self) -> &str {
        self.key.first()
    }

    pub fn title_b(&self) -> &str {
        self.key.second()
    }

    pub fn co_citation_count(&self) -> u64 {
        self.stats.count()
    }

    /// The scores keyed by their alpha.
    pub fn scores_by_alpha<'a>(&'a self, alphas: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
        alphas.iter().copied().zip(self.scores.iter().copied())
    }

    /// Both directional recommendations `a -> b` and `b -> a`, scored by the given alpha.
    ///
    /// Returns `None` if there is no score for the alpha.
    pub fn recommendations(&self, alpha_index: usize) -> Option<[Recommendation; 2]> {
        let score = *self.scores.get(alpha_index)?;
        Some([
            Recommendation {
                source: self.title_a().to_string(),
                target: self.title_b().to_string(),
                score,
                source_id: self.id_a,
                target_id: self.id_b,
            },
            Recommendation {
                source: self.title_b().to_string(),
                target: self.title_a().to_string(),
                score,
                source_id: self.id_b,
                target_id: self.id_a,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use test_utils::assert_approx_eq;

    use super::*;

    const ALPHAS: [f64; 2] = [1., 2.];

    fn stats(distances: &[u32]) -> PairStats {
        distances
            .iter()
            .map(|&distance| PairStats::observe(distance, &ALPHAS, true))
            .reduce(PairStats::merge)
            .unwrap()
    }

    #[test]
    fn test_observe() {
        let stats = PairStats::observe(4, &ALPHAS, false);
        assert_eq!(stats.count(), 1);
        assert_eq!(stats.distance_sum(), 4);
        assert_eq!(stats.distance_squared_sum(), 16);
        assert_approx_eq!(f64, stats.proximity(), [0.25, 0.0625]);
        assert_eq!(stats.median_distance(), None);
    }

    #[test]
    fn test_observe_clamps_distance() {
        let stats = PairStats::observe(0, &ALPHAS, false);
        assert_eq!(stats.min_distance(), 1);
        assert_approx_eq!(f64, stats.proximity(), [1., 1.]);
    }

    #[test]
    fn test_merge() {
        let stats = stats(&[1, 4, 2]);
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.distance_sum(), 7);
        assert_eq!(stats.distance_squared_sum(), 21);
        assert_eq!(stats.min_distance(), 1);
        assert_eq!(stats.max_distance(), 4);
        assert_approx_eq!(f64, stats.mean_distance(), 7. / 3.);
        assert_approx_eq!(f64, stats.proximity(), [1.75, 1.3125]);
    }

    #[test]
    fn test_merge_associative() {
        let (a, b, c) = (stats(&[1, 3]), stats(&[7]), stats(&[2, 2, 9]));
        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));

        assert_eq!(left.count(), right.count());
        assert_eq!(left.distance_sum(), right.distance_sum());
        assert_eq!(left.median_distance(), right.median_distance());
        assert_approx_eq!(f64, left.proximity(), right.proximity());
    }

    #[test]
    fn test_median() {
        assert_eq!(stats(&[5, 1, 3]).median_distance(), Some(3.));
        assert_eq!(stats(&[5, 1, 3, 8]).median_distance(), Some(4.));
    }

    #[test]
    fn test_merge_without_samples_drops_median() {
        let stats = stats(&[1]).merge(PairStats::observe(2, &ALPHAS, false));
        assert_eq!(stats.median_distance(), None);
    }

    #[test]
    fn test_recommendations_both_directions() {
        let pair = ScoredPair {
            key: PairKey::new("B", "A"),
            id_a: Some(PageId(1)),
            id_b: None,
            stats: stats(&[1]),
            scores: vec![0.5, 0.25],
        };

        let [ab, ba] = pair.recommendations(1).unwrap();
        assert_eq!((ab.source.as_str(), ab.target.as_str()), ("A", "B"));
        assert_eq!((ba.source.as_str(), ba.target.as_str()), ("B", "A"));
        assert_eq!(ab.source_id, Some(PageId(1)));
        assert_eq!(ba.target_id, Some(PageId(1)));
        assert_approx_eq!(f64, ab.score, 0.25);
        assert!(pair.recommendations(2).is_none());
    }
}
