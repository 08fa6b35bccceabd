//! Two phase aggregation of co-citation observations.
//!
//! Observations are first combined locally within a partition, then the partial
//! results of all partitions are combined globally per pair. Both phases use the same
//! associative and commutative merge of [`PairStats`], the final scores do not depend
//! on how the observations were partitioned or in which order partials are merged.

use fnv::FnvHashMap;
use log::debug;

use crate::{
    config::{CpaConfig, Error},
    cpa::scoring::ScoringStrategy,
    data::{
        pair::{CooccurrenceObservation, PairKey},
        scored::{PairStats, ScoredPair},
    },
};

/// Partial statistics of the pairs of one partition.
pub type Partial = FnvHashMap<PairKey, PairStats>;

/// Aggregates co-citation observations into scored pairs.
pub struct Aggregator<S> {
    config: CpaConfig,
    scoring: S,
}

impl<S> Aggregator<S>
where
    S: ScoringStrategy,
{
    /// Creates an aggregator.
    ///
    /// # Errors
    /// Fails if the scoring strategy needs distance samples which the configuration
    /// doesn't retain.
    pub fn new(config: CpaConfig, scoring: S) -> Result<Self, Error> {
        if scoring.requires_samples() && !config.median() {
            return Err(Error::MedianRequired);
        }
        debug!("Aggregating co-citations with {:?}", config);

        Ok(Self { config, scoring })
    }

    pub fn config(&self) -> &CpaConfig {
        &self.config
    }

    /// Adds a single observation to the partial statistics.
    pub fn observe(&self, partial: &mut Partial, observation: CooccurrenceObservation) {
        let stats = PairStats::observe(
            observation.distance,
            self.config.alphas(),
            self.config.median(),
        );
        add(partial, observation.key, stats);
    }

    /// Combines the observations of one partition.
    ///
    /// Pairs below the combiner threshold are discarded from the partial result.
    pub fn combine_local(
        &self,
        observations: impl IntoIterator<Item = CooccurrenceObservation>,
    ) -> Partial {
        let mut partial = Partial::default();
        for observation in observations {
            self.observe(&mut partial, observation);
        }

        let threshold = self.config.combiner_threshold();
        if threshold > 1 {
            partial.retain(|_, stats| stats.count() >= threshold);
        }
        partial
    }

    /// Merges two partial results.
    pub fn merge(&self, mut left: Partial, mut right: Partial) -> Partial {
        if left.len() < right.len() {
            std::mem::swap(&mut left, &mut right);
        }
        for (key, stats) in right {
            add(&mut left, key, stats);
        }
        left
    }

    /// Combines the partial statistics of all partitions and finalizes the pairs.
    pub fn combine_global(
        &self,
        partials: impl IntoIterator<Item = (PairKey, PairStats)>,
    ) -> Vec<ScoredPair> {
        let mut combined = Partial::default();
        for (key, stats) in partials {
            add(&mut combined, key, stats);
        }
        self.finalize(combined)
    }

    /// Scores all pairs which reach the reducer threshold, ordered by their key.
    pub fn finalize(&self, partial: Partial) -> Vec<ScoredPair> {
        let threshold = self.config.reducer_threshold();
        let mut pairs = partial
            .into_iter()
            .filter(|(_, stats)| stats.count() >= threshold)
            .map(|(key, stats)| self.score(key, stats))
            .collect::<Vec<_>>();
        pairs.sort_unstable_by(|a, b| a.key.cmp(&b.key));
        pairs
    }

    /// Scores the pair for every configured alpha.
    pub fn score(&self, key: PairKey, stats: PairStats) -> ScoredPair {
        let scores = self
            .config
            .alphas()
            .iter()
            .enumerate()
            .map(|(alpha_index, &alpha)| self.scoring.score(&stats, alpha_index, alpha))
            .collect();

        ScoredPair {
            key,
            id_a: None,
            id_b: None,
            stats,
            scores,
        }
    }
}

fn add(partial: &mut Partial, key: PairKey, stats: PairStats) {
    match partial.get_mut(&key) {
        Some(existing) => existing.absorb(stats),
        None => {
            partial.insert(key, stats);
        }
    }
}
