//! Immutable configurations of the pipeline stages.
//!
//! Every stage receives its configuration at construction. The `with_*` methods validate
//! the new value and fail without touching the configuration otherwise.

use displaydoc::Display;
use thiserror::Error;

/// Potential errors of the configurations.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum Error {
    /// Invalid alpha values, expected a non-empty list of finite values: {0:?}
    Alpha(Vec<f64>),
    /// Invalid reducer threshold, expected a positive value
    ReducerThreshold,
    /// Invalid combiner threshold, expected a positive value
    CombinerThreshold,
    /// Invalid top-k, expected a positive value
    TopK,
    /// Invalid alpha index {alpha_index}, expected less than {scores} scores per pair
    AlphaIndex { alpha_index: usize, scores: usize },
    /// Invalid top-k cutoffs, expected a non-empty list of positive values: {0:?}
    Cutoffs(Vec<usize>),
    /// The scoring strategy requires the median distance, but median samples are disabled
    MedianRequired,
}

/// The configuration of the co-citation computation.
#[derive(Clone, Debug)]
pub struct CpaConfig {
    alphas: Vec<f64>,
    reducer_threshold: u64,
    combiner_threshold: u64,
    median: bool,
}

impl CpaConfig {
    /// The decay exponents, one score is computed per value.
    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    /// Sets the alphas.
    ///
    /// # Errors
    /// Fails if the alphas are empty or contain non-finite values.
    pub fn with_alphas(self, alphas: &[f64]) -> Result<Self, Error> {
        if !alphas.is_empty() && alphas.iter().copied().all(f64::is_finite) {
            Ok(Self {
                alphas: alphas.to_vec(),
                ..self
            })
        } else {
            Err(Error::Alpha(alphas.to_vec()))
        }
    }

    /// The minimum number of co-citations a pair needs to be part of the result.
    pub fn reducer_threshold(&self) -> u64 {
        self.reducer_threshold
    }

    /// Sets the reducer threshold.
    ///
    /// # Errors
    /// Fails if the threshold is zero.
    pub fn with_reducer_threshold(self, reducer_threshold: u64) -> Result<Self, Error> {
        if reducer_threshold > 0 {
            Ok(Self {
                reducer_threshold,
                ..self
            })
        } else {
            Err(Error::ReducerThreshold)
        }
    }

    /// The minimum number of co-citations a pair needs within a single partition to survive
    /// the local combine.
    pub fn combiner_threshold(&self) -> u64 {
        self.combiner_threshold
    }

    /// Sets the combiner threshold.
    ///
    /// # Errors
    /// Fails if the threshold is zero.
    pub fn with_combiner_threshold(self, combiner_threshold: u64) -> Result<Self, Error> {
        if combiner_threshold > 0 {
            Ok(Self {
                combiner_threshold,
                ..self
            })
        } else {
            Err(Error::CombinerThreshold)
        }
    }

    /// Whether the individual distances are retained to compute the median distance.
    pub fn median(&self) -> bool {
        self.median
    }

    /// Sets the median flag.
    pub fn with_median(self, median: bool) -> Self {
        Self { median, ..self }
    }
}

impl Default for CpaConfig {
    fn default() -> Self {
        Self {
            alphas: vec![1.5],
            reducer_threshold: 1,
            combiner_threshold: 1,
            median: false,
        }
    }
}

/// The configuration of the recommendation set builder.
#[derive(Clone, Debug)]
pub struct RecommendationConfig {
    top_k: usize,
    alpha_index: usize,
}

impl RecommendationConfig {
    /// The maximum number of recommendations per article.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Sets the top-k.
    ///
    /// # Errors
    /// Fails if the top-k is zero.
    pub fn with_top_k(self, top_k: usize) -> Result<Self, Error> {
        if top_k > 0 {
            Ok(Self { top_k, ..self })
        } else {
            Err(Error::TopK)
        }
    }

    /// The index of the alpha whose score ranks the recommendations.
    pub fn alpha_index(&self) -> usize {
        self.alpha_index
    }

    /// Sets the alpha index.
    pub fn with_alpha_index(self, alpha_index: usize) -> Self {
        Self {
            alpha_index,
            ..self
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            alpha_index: 0,
        }
    }
}

/// The configuration of the evaluation engine.
#[derive(Clone, Debug)]
pub struct EvaluationConfig {
    cutoffs: Vec<usize>,
}

impl EvaluationConfig {
    /// The top-k cutoffs, strictly descending.
    pub fn cutoffs(&self) -> &[usize] {
        &self.cutoffs
    }

    /// The largest cutoff.
    pub fn max_cutoff(&self) -> usize {
        self.cutoffs[0]
    }

    /// Sets the cutoffs, they are sorted descending and deduplicated.
    ///
    /// # Errors
    /// Fails if the cutoffs are empty or contain zero.
    pub fn with_cutoffs(self, cutoffs: &[usize]) -> Result<Self, Error> {
        if cutoffs.is_empty() || cutoffs.contains(&0) {
            return Err(Error::Cutoffs(cutoffs.to_vec()));
        }

        let mut cutoffs = cutoffs.to_vec();
        cutoffs.sort_unstable_by(|a, b| b.cmp(a));
        cutoffs.dedup();
        Ok(Self { cutoffs })
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            cutoffs: vec![10, 5, 1],
        }
    }
}
