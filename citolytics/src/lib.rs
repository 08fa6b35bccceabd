//! Co-citation proximity analysis over the Wikipedia link graph.
//!
//! The crate turns parsed articles into corpus wide co-citation scores, resolves
//! redirects, builds top-k recommendation sets from the scores and evaluates them
//! against click-stream or "see also" gold standards.

pub mod config;
pub mod cpa;
pub mod data;
mod error;
pub mod evaluation;
pub mod io;
pub mod pipeline;
pub mod recommend;
pub mod redirects;
mod utils;

#[cfg(test)]
mod tests;

pub use crate::{
    config::{CpaConfig, EvaluationConfig, RecommendationConfig},
    cpa::{
        aggregate::Aggregator,
        scoring::{InverseDistance, MedianDistance, ScoringStrategy},
    },
    data::{
        document::{Document, Link, PageId},
        pair::{CooccurrenceObservation, PairKey},
        scored::{PairStats, ScoredPair},
    },
    error::Error,
    evaluation::{
        gold::GoldRecord,
        summary::{EvaluationSummary, TopRecommendations},
        EvaluationEngine,
        EvaluationResult,
    },
    recommend::{Recommendation, RecommendationSet, RecommendationSetBuilder},
    redirects::Redirects,
};
