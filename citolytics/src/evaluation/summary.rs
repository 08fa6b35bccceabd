//! Corpus wide aggregates of evaluation results.

use fnv::{FnvHashMap, FnvHashSet};

use crate::evaluation::EvaluationResult;

/// The sums of the metrics of all evaluated articles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationSummary {
    pub articles: usize,
    pub impressions: u64,
    pub total_clicks: u64,
    /// Per configured cutoff.
    pub clicks: Vec<u64>,
    /// Per configured cutoff.
    pub match_counts: Vec<usize>,
    pub recommendations_count: usize,
    pub optimal_clicks: u64,
    mrr_sum: f64,
}

impl EvaluationSummary {
    /// Adds the metrics of one article.
    pub fn add(&mut self, result: &EvaluationResult) {
        self.articles += 1;
        self.impressions += result.impressions;
        self.total_clicks += result.total_clicks;
        add_elementwise(&mut self.clicks, &result.clicks);
        add_elementwise(&mut self.match_counts, &result.match_counts);
        self.recommendations_count += result.recommendations_count;
        self.optimal_clicks += result.optimal_clicks;
        self.mrr_sum += result.mrr;
    }

    /// Merges two summaries of disjoint sets of articles.
    pub fn merge(mut self, other: Self) -> Self {
        self.articles += other.articles;
        self.impressions += other.impressions;
        self.total_clicks += other.total_clicks;
        add_elementwise(&mut self.clicks, &other.clicks);
        add_elementwise(&mut self.match_counts, &other.match_counts);
        self.recommendations_count += other.recommendations_count;
        self.optimal_clicks += other.optimal_clicks;
        self.mrr_sum += other.mrr_sum;
        self
    }

    /// The mean reciprocal rank over all articles, 0 without articles.
    pub fn mean_mrr(&self) -> f64 {
        if self.articles == 0 {
            0.
        } else {
            self.mrr_sum / self.articles as f64
        }
    }
}

impl<'a> std::iter::FromIterator<&'a EvaluationResult> for EvaluationSummary {
    fn from_iter<I: IntoIterator<Item = &'a EvaluationResult>>(iter: I) -> Self {
        let mut summary = Self::default();
        for result in iter {
            summary.add(result);
        }
        summary
    }
}

fn add_elementwise<T>(sums: &mut Vec<T>, values: &[T])
where
    T: Copy + std::ops::AddAssign + Default,
{
    if sums.len() < values.len() {
        sums.resize(values.len(), T::default());
    }
    for (sum, &value) in sums.iter_mut().zip(values) {
        *sum += value;
    }
}

/// Which articles are recommended how often.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TopRecommendations {
    /// The article most often recommended at the first rank and how often it is.
    pub top: Option<(String, usize)>,
    /// The number of distinct recommended articles.
    pub distinct: usize,
    /// The number of evaluated articles.
    pub articles: usize,
}

impl TopRecommendations {
    pub fn from_results(results: &[EvaluationResult]) -> Self {
        let mut firsts = FnvHashMap::<&str, usize>::default();
        let mut distinct = FnvHashSet::<&str>::default();
        for result in results {
            if let Some(first) = result.recommendations.first() {
                *firsts.entry(first).or_default() += 1;
            }
            distinct.extend(result.recommendations.iter().map(String::as_str));
        }

        // most recommended first, the smaller title wins ties
        let top = firsts
            .into_iter()
            .max_by(|(a, a_count), (b, b_count)| a_count.cmp(b_count).then_with(|| b.cmp(a)))
            .map(|(title, count)| (title.to_string(), count));

        Self {
            top,
            distinct: distinct.len(),
            articles: results.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_utils::assert_approx_eq;

    use super::*;

    fn result(article: &str, recommendations: &[&str], mrr: f64) -> EvaluationResult {
        EvaluationResult {
            article: article.into(),
            recommendations: recommendations.iter().map(|title| title.to_string()).collect(),
            match_counts: vec![2, 1, 0],
            mrr,
            recommendations_count: recommendations.len(),
            impressions: 10,
            total_clicks: 5,
            clicks: vec![3, 1, 0],
            optimal_clicks: 4,
        }
    }

    #[test]
    fn test_summary() {
        let results = vec![result("A", &["B", "C"], 1.), result("B", &["A"], 0.5)];
        let summary = results.iter().collect::<EvaluationSummary>();

        assert_eq!(summary.articles, 2);
        assert_eq!(summary.impressions, 20);
        assert_eq!(summary.total_clicks, 10);
        assert_eq!(summary.clicks, [6, 2, 0]);
        assert_eq!(summary.match_counts, [4, 2, 0]);
        assert_eq!(summary.recommendations_count, 3);
        assert_eq!(summary.optimal_clicks, 8);
        assert_approx_eq!(f64, summary.mean_mrr(), 0.75);
    }

    #[test]
    fn test_summary_merge() {
        let results = vec![
            result("A", &["B"], 1.),
            result("B", &["A"], 0.),
            result("C", &["A"], 0.5),
        ];
        let all = results.iter().collect::<EvaluationSummary>();
        let merged = results[..1]
            .iter()
            .collect::<EvaluationSummary>()
            .merge(results[1..].iter().collect());

        assert_eq!(merged.articles, all.articles);
        assert_eq!(merged.clicks, all.clicks);
        assert_approx_eq!(f64, merged.mean_mrr(), all.mean_mrr());
    }

    #[test]
    fn test_summary_empty() {
        let summary = EvaluationSummary::default();
        assert_eq!(summary.articles, 0);
        assert_approx_eq!(f64, summary.mean_mrr(), 0.);
    }

    #[test]
    fn test_top_recommendations() {
        let results = vec![
            result("A", &["C", "B"], 1.),
            result("B", &["C"], 1.),
            result("C", &["A", "B"], 1.),
            result("D", &[], 0.),
        ];

        let top = TopRecommendations::from_results(&results);
        assert_eq!(top.top, Some(("C".to_string(), 2)));
        assert_eq!(top.distinct, 3);
        assert_eq!(top.articles, 4);
    }

    #[test]
    fn test_top_recommendations_tie() {
        let results = vec![result("A", &["Z"], 1.), result("B", &["M"], 1.)];
        let top = TopRecommendations::from_results(&results);
        assert_eq!(top.top, Some(("M".to_string(), 1)));
    }
}
