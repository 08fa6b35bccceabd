//! Rank based metrics of a ranked list against a list of correct targets.

use fnv::FnvHashSet;

/// The reciprocal of the 1-based rank of the target in the ranked list, 0 if absent.
pub fn reciprocal_rank(ranked: &[&str], target: &str) -> f64 {
    ranked
        .iter()
        .position(|&title| title == target)
        .map_or(0., |index| 1. / (index + 1) as f64)
}

/// The mean of the reciprocal ranks of all correct targets, 0 if there are none.
pub fn mean_reciprocal_rank(ranked: &[&str], correct: &[&str]) -> f64 {
    if correct.is_empty() {
        return 0.;
    }

    correct
        .iter()
        .map(|target| reciprocal_rank(ranked, target))
        .sum::<f64>()
        / correct.len() as f64
}

/// The number of correct targets within the first `k` ranked titles, for every cutoff `k`.
///
/// The cutoffs must be in descending order and are clamped to the length of the ranked
/// list. The counts are non-increasing over descending cutoffs, once a count is 0 the
/// remaining counts are 0 without intersecting again.
pub fn match_counts(ranked: &[&str], correct: &FnvHashSet<&str>, cutoffs: &[usize]) -> Vec<usize> {
    debug_assert!(cutoffs.windows(2).all(|window| window[0] >= window[1]));

    let mut last = None;
    cutoffs
        .iter()
        .map(|&cutoff| {
            let count = match last {
                Some(0) => 0,
                _ => {
                    let cutoff = cutoff.min(ranked.len());
                    ranked[..cutoff]
                        .iter()
                        .filter(|title| correct.contains(*title))
                        .count()
                }
            };
            last = Some(count);
            count
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
    use rstest::rstest;
    use test_utils::assert_approx_eq;

    use super::*;

    fn set<'a>(titles: &[&'a str]) -> FnvHashSet<&'a str> {
        titles.iter().copied().collect()
    }

    #[test]
    fn test_single_correct_target() {
        let ranked = ["X", "Y", "Z"];
        assert_approx_eq!(f64, mean_reciprocal_rank(&ranked, &["Y"]), 0.5);
        assert_eq!(match_counts(&ranked, &set(&["Y"]), &[5, 1]), [1, 0]);
    }

    #[test]
    fn test_mean_reciprocal_rank() {
        let ranked = ["A", "B", "C", "D"];
        assert_approx_eq!(f64, mean_reciprocal_rank(&ranked, &["A", "D", "E"]), 1.25 / 3.);
        assert_approx_eq!(f64, mean_reciprocal_rank(&ranked, &["A"]), 1.);
        assert_approx_eq!(f64, mean_reciprocal_rank(&ranked, &[]), 0.);
        assert_approx_eq!(f64, mean_reciprocal_rank(&[], &["A"]), 0.);
    }

    #[test]
    fn test_match_counts_short_circuit() {
        let ranked = ["A", "B", "C", "D", "E", "F"];
        let correct = set(&["E", "B"]);
        assert_eq!(match_counts(&ranked, &correct, &[10, 5, 3, 1]), [2, 2, 1, 0]);
        assert_eq!(match_counts(&ranked, &set(&["F"]), &[10, 5, 3, 1]), [1, 0, 0, 0]);
    }

    #[test]
    fn test_match_counts_empty() {
        assert_eq!(match_counts(&[], &set(&["A"]), &[10, 5, 1]), [0, 0, 0]);
        assert_eq!(match_counts(&["A"], &set(&[]), &[10, 5, 1]), [0, 0, 0]);
    }

    #[rstest(seed, case(0), case(1), case(2), case(3))]
    fn test_metrics_bounded_and_monotone(seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut titles = vec!["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"];
        titles.shuffle(&mut rng);
        let ranked = titles[..8].to_vec();
        titles.shuffle(&mut rng);
        let correct = &titles[..5];

        let mrr = mean_reciprocal_rank(&ranked, correct);
        assert!((0. ..=1.).contains(&mrr));

        let counts = match_counts(&ranked, &set(correct), &[10, 8, 5, 3, 2, 1]);
        assert!(counts.windows(2).all(|window| window[0] >= window[1]));
    }
}
