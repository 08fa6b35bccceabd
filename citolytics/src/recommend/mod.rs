//! Ranked recommendation sets per source article.

pub mod cpi;

use fnv::FnvHashMap;
use log::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::{
    config::{Error, RecommendationConfig},
    cpa::stats::ArticleStatsTable,
    data::{document::PageId, scored::ScoredPair},
    recommend::cpi::{Expression, Variables},
    utils::nan_safe_f64_cmp_desc,
};

/// A directional recommendation of the target article for readers of the source article.
#[derive(Clone, Debug, PartialEq)]
pub struct Recommendation {
    pub source: String,
    pub target: String,
    pub score: f64,
    pub source_id: Option<PageId>,
    pub target_id: Option<PageId>,
}

/// The top ranked recommendations of one source article, best first.
#[derive(Clone, Debug, PartialEq)]
pub struct RecommendationSet {
    pub source: String,
    pub source_id: Option<PageId>,
    pub ranked: Vec<Recommendation>,
}

impl RecommendationSet {
    /// The titles of the recommended articles in rank order.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.ranked.iter().map(|recommendation| recommendation.target.as_str())
    }
}

/// Recomputes the score of a recommendation before it is ranked.
#[cfg_attr(test, automock)]
pub trait Rescoring {
    fn rescore(&self, recommendation: &Recommendation) -> f64;
}

/// Rescores recommendations with a popularity index expression over the statistics
/// of the recommended article.
///
/// Recommendations of articles without statistics keep their score.
pub struct CpiRescoring {
    expression: Expression,
    stats: ArticleStatsTable,
}

impl CpiRescoring {
    pub fn new(expression: Expression, stats: ArticleStatsTable) -> Self {
        Self { expression, stats }
    }
}

impl Rescoring for CpiRescoring {
    fn rescore(&self, recommendation: &Recommendation) -> f64 {
        match self.stats.get(&recommendation.target) {
            Some(stats) => self.expression.evaluate(&Variables::new(
                recommendation.score,
                stats,
                self.stats.article_count(),
            )),
            None => recommendation.score,
        }
    }
}

/// Groups directional recommendations by their source and ranks them.
pub struct RecommendationSetBuilder {
    config: RecommendationConfig,
    rescoring: Option<Box<dyn Rescoring>>,
}

impl RecommendationSetBuilder {
    pub fn new(config: RecommendationConfig) -> Self {
        Self {
            config,
            rescoring: None,
        }
    }

    /// Rescores every recommendation before ranking.
    pub fn with_rescoring(self, rescoring: impl Rescoring + 'static) -> Self {
        Self {
            rescoring: Some(Box::new(rescoring)),
            ..self
        }
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Builds the recommendation sets, ordered by source title.
    ///
    /// Every set is ranked by descending score with ties broken by ascending target title
    /// and truncated to the top-k. Sources without recommendations get no set.
    pub fn build(&self, recommendations: impl IntoIterator<Item = Recommendation>) -> Vec<RecommendationSet> {
        let mut grouped = FnvHashMap::<String, Vec<Recommendation>>::default();
        for mut recommendation in recommendations {
            if let Some(rescoring) = &self.rescoring {
                recommendation.score = rescoring.rescore(&recommendation);
            }
            grouped
                .entry(recommendation.source.clone())
                .or_default()
                .push(recommendation);
        }
        debug!("Ranking recommendations of {} sources", grouped.len());

        let top_k = self.config.top_k();
        let mut sets = grouped
            .into_iter()
            .filter(|(_, ranked)| !ranked.is_empty())
            .map(|(source, mut ranked)| {
                ranked.sort_unstable_by(|a, b| {
                    nan_safe_f64_cmp_desc(&a.score, &b.score).then_with(|| a.target.cmp(&b.target))
                });
                ranked.truncate(top_k);
                let source_id = ranked.iter().find_map(|recommendation| recommendation.source_id);
                RecommendationSet {
                    source,
                    source_id,
                    ranked,
                }
            })
            .collect::<Vec<_>>();
        sets.sort_unstable_by(|a, b| a.source.cmp(&b.source));
        info!("Built {} recommendation sets", sets.len());

        sets
    }

    /// Builds the recommendation sets of the scored pairs.
    ///
    /// Fails if a pair has no score at the configured alpha index.
    pub fn build_from_pairs<'a>(
        &self,
        pairs: impl IntoIterator<Item = &'a ScoredPair>,
    ) -> Result<Vec<RecommendationSet>, Error> {
        let alpha_index = self.config.alpha_index();
        let recommendations = pairs
            .into_iter()
            .map(|pair| {
                pair.recommendations(alpha_index).ok_or(Error::AlphaIndex {
                    alpha_index,
                    scores: pair.scores.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.build(recommendations.into_iter().flat_map(IntoIterator::into_iter)))
    }
}
