use std::path::PathBuf;

use anyhow::{Context, Error};
use log::info;
use structopt::StructOpt;

use citolytics::{
    cpa::stats::ArticleStatsTable,
    io::{read_article_stats, read_recommendations, write_recommendation_sets, ScoredPairFields},
    recommend::{cpi::Expression, CpiRescoring},
    RecommendationConfig,
    RecommendationSet,
    RecommendationSetBuilder,
};

use crate::{
    exit_code::NO_ERROR,
    utils::{create, progress_spin_until_done, read_all},
};

/// The options to build recommendation sets from scored pairs.
#[derive(StructOpt, Debug)]
pub struct RecommendationArgs {
    /// Scored pairs as written by the `cpa` command.
    #[structopt(long)]
    pairs: PathBuf,

    /// The maximum number of recommendations per article.
    #[structopt(long, default_value = "10")]
    topk: usize,

    /// The field of the score to rank by, defaults to the score of the first alpha.
    #[structopt(long, default_value = "5")]
    score: usize,

    /// The field of the first title.
    #[structopt(long, default_value = "0")]
    page_a: usize,

    /// The field of the second title.
    #[structopt(long, default_value = "1")]
    page_b: usize,

    /// The field of the id of the first title.
    #[structopt(long, default_value = "2")]
    page_id_a: usize,

    /// The field of the id of the second title.
    #[structopt(long, default_value = "3")]
    page_id_b: usize,

    /// A popularity index expression to rescore the recommendations, e.g. `x * log(z / (y + 1))`.
    ///
    /// `x` is the co-citation score, `y` the out-links, `w` the words, `h` the headlines
    /// and `d` the average link distance of the recommended article, `z` the number of
    /// articles.
    #[structopt(long, requires = "article-stats")]
    cpi: Option<String>,

    /// Article statistics as written by the `article-stats` command.
    #[structopt(long)]
    article_stats: Option<PathBuf>,
}

impl RecommendationArgs {
    fn fields(&self) -> ScoredPairFields {
        ScoredPairFields {
            title_a: self.page_a,
            title_b: self.page_b,
            id_a: self.page_id_a,
            id_b: self.page_id_b,
            score: self.score,
        }
    }

    /// Reads the scored pairs and builds the ranked recommendation sets.
    pub fn recommendation_sets(&self) -> Result<Vec<RecommendationSet>, Error> {
        let config = RecommendationConfig::default()
            .with_top_k(self.topk)
            .context("Invalid recommendation configuration.")?;
        let mut builder = RecommendationSetBuilder::new(config);

        if let Some(cpi) = &self.cpi {
            let expression = cpi
                .parse::<Expression>()
                .with_context(|| format!("Invalid popularity index {:?}.", cpi))?;
            let stats = match &self.article_stats {
                Some(path) => read_all(path, |input| {
                    read_article_stats(input).collect::<Result<ArticleStatsTable, _>>()
                })?,
                None => ArticleStatsTable::default(),
            };
            info!("Rescoring by {:?} with the statistics of {} articles", cpi, stats.article_count());
            builder = builder.with_rescoring(CpiRescoring::new(expression, stats));
        }

        let fields = self.fields();
        let recommendations = read_all(&self.pairs, |input| {
            read_recommendations(input, fields).collect::<Result<Vec<_>, _>>()
        })?;

        Ok(progress_spin_until_done("Building recommendation sets", || {
            builder.build(recommendations.into_iter().flat_map(IntoIterator::into_iter))
        }))
    }
}

/// Builds the top-k recommendations of every article from scored pairs.
///
/// Writes `(source, rank, target, score)` records.
#[derive(StructOpt, Debug)]
pub struct RecommendCmd {
    #[structopt(flatten)]
    recommendations: RecommendationArgs,

    /// File in which the recommendations are stored.
    #[structopt(short, long)]
    output: PathBuf,
}

impl RecommendCmd {
    pub fn run(self) -> Result<i32, Error> {
        let sets = self.recommendations.recommendation_sets()?;

        let written = write_recommendation_sets(create(&self.output)?, &sets)
            .context("Writing the recommendations failed.")?;
        info!("Wrote {} recommendations of {} articles to {:?}", written, sets.len(), self.output);

        Ok(NO_ERROR)
    }
}
