//! Evaluation of recommendation sets against gold standards.

pub mod gold;
pub mod matches;
pub mod summary;

use fnv::{FnvHashMap, FnvHashSet};
use log::info;

#[cfg(feature = "multithreaded")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    config::EvaluationConfig,
    evaluation::{
        gold::GoldRecord,
        matches::{match_counts, mean_reciprocal_rank},
    },
    recommend::RecommendationSet,
};

/// The metrics of the recommendations of one article.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationResult {
    pub article: String,
    /// The recommended titles in rank order.
    pub recommendations: Vec<String>,
    /// The matches within each cutoff, in the order of the configured cutoffs.
    pub match_counts: Vec<usize>,
    pub mrr: f64,
    pub recommendations_count: usize,
    pub impressions: u64,
    pub total_clicks: u64,
    /// The clicks on recommended targets within each cutoff, in the order of the
    /// configured cutoffs.
    pub clicks: Vec<u64>,
    /// The clicks on the best gold targets within the largest cutoff.
    pub optimal_clicks: u64,
}

/// Joins recommendation sets with gold records by article and scores them.
#[derive(Clone, Debug, Default)]
pub struct EvaluationEngine {
    config: EvaluationConfig,
}

impl EvaluationEngine {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluates every recommendation set which has a gold record, ordered by article.
    ///
    /// Sets without gold record are dropped. Gold records of the same article are merged.
    pub fn evaluate(
        &self,
        sets: impl IntoIterator<Item = RecommendationSet>,
        gold: impl IntoIterator<Item = GoldRecord>,
    ) -> Vec<EvaluationResult> {
        let mut records = FnvHashMap::<String, GoldRecord>::default();
        for record in gold {
            let record = match records.remove(&record.article) {
                Some(existing) => existing.merge(record),
                None => record,
            };
            records.insert(record.article.clone(), record);
        }

        let sets = sets.into_iter().collect::<Vec<_>>();
        let sets = sets.as_slice();
        let total = sets.len();

        #[cfg(not(feature = "multithreaded"))]
        let sets = sets.iter();
        #[cfg(feature = "multithreaded")]
        let sets = sets.into_par_iter();

        let mut results = sets
            .filter_map(|set| {
                records
                    .get(&set.source)
                    .map(|record| self.evaluate_set(set, record))
            })
            .collect::<Vec<_>>();
        results.sort_unstable_by(|a, b| a.article.cmp(&b.article));
        info!(
            "Evaluated {} of {} recommendation sets against {} gold records",
            results.len(),
            total,
            records.len(),
        );

        results
    }

    /// Evaluates the recommendation set against the gold record of its article.
    pub fn evaluate_set(&self, set: &RecommendationSet, record: &GoldRecord) -> EvaluationResult {
        let ranked = set.targets().collect::<Vec<_>>();
        let correct = record.correct_list();
        let cutoffs = self.config.cutoffs();

        let target_clicks = record
            .targets
            .iter()
            .map(|target| (target.title.as_str(), target.clicks))
            .collect::<FnvHashMap<_, _>>();
        let clicks = cutoffs
            .iter()
            .map(|&cutoff| {
                ranked
                    .iter()
                    .take(cutoff)
                    .filter_map(|title| target_clicks.get(title))
                    .sum::<u64>()
            })
            .collect();
        let optimal_clicks = record
            .targets
            .iter()
            .take(self.config.max_cutoff())
            .map(|target| target.clicks)
            .sum::<u64>();

        EvaluationResult {
            article: set.source.clone(),
            recommendations: ranked.iter().map(|title| title.to_string()).collect(),
            match_counts: match_counts(
                &ranked,
                &correct.iter().copied().collect::<FnvHashSet<_>>(),
                cutoffs,
            ),
            mrr: mean_reciprocal_rank(&ranked, &correct),
            recommendations_count: ranked.len(),
            impressions: record.impressions,
            total_clicks: record.total_clicks(),
            clicks,
            optimal_clicks,
        }
    }
}
