use std::path::PathBuf;

use anyhow::{Context, Error};
use log::{info, warn};
use structopt::StructOpt;

use citolytics::{
    evaluation::gold::{gold_from_click_stream, LangLinks},
    io::{
        read_click_stream,
        read_lang_links,
        read_see_also,
        write_evaluation_results,
        write_summary,
        write_top_recommendations,
    },
    EvaluationConfig,
    EvaluationEngine,
    EvaluationSummary,
    GoldRecord,
    TopRecommendations,
};

use crate::{
    exit_code::{NON_FATAL_ERROR, NO_ERROR},
    recommend::RecommendationArgs,
    utils::{create, progress_spin_until_done, read_all},
};

/// Evaluates the recommendations of scored pairs against a gold standard.
///
/// Writes `(article, match_count..., mrr, recommendations, impressions, total_clicks,
/// clicks..., optimal_clicks)` records with one match and click count per cutoff.
#[derive(StructOpt, Debug)]
pub struct EvaluateCmd {
    #[structopt(flatten)]
    recommendations: RecommendationArgs,

    /// A Wikipedia click stream `(prev_id, curr_id, n, prev_title, curr_title, type)`
    /// as gold standard.
    #[structopt(long, required_unless = "see-also", conflicts_with = "see-also")]
    click_stream: Option<PathBuf>,

    /// "See also" lists `(article, target|target|...)` as gold standard.
    #[structopt(long)]
    see_also: Option<PathBuf>,

    /// Language links `(page_id, lang, title)` to translate the click stream.
    #[structopt(long, requires = "lang", requires = "click-stream")]
    langlinks: Option<PathBuf>,

    /// The language to translate the click stream to.
    #[structopt(long)]
    lang: Option<String>,

    /// The top-k cutoffs of the match and click counts, e.g. `10,5,1`.
    #[structopt(long, use_delimiter = true, default_value = "10,5,1")]
    cutoffs: Vec<usize>,

    /// File in which the evaluation results are stored.
    #[structopt(short, long)]
    output: PathBuf,

    /// File in which the summary of all articles is stored.
    #[structopt(long)]
    summary: Option<PathBuf>,

    /// File in which the most recommended articles are stored.
    #[structopt(long)]
    top_recommendations: Option<PathBuf>,
}

impl EvaluateCmd {
    pub fn run(self) -> Result<i32, Error> {
        let config = EvaluationConfig::default()
            .with_cutoffs(&self.cutoffs)
            .context("Invalid evaluation configuration.")?;
        let engine = EvaluationEngine::new(config);

        let gold = self.gold()?;
        let sets = self.recommendations.recommendation_sets()?;
        let results = progress_spin_until_done("Evaluating", || engine.evaluate(sets, gold));

        write_evaluation_results(create(&self.output)?, &results)
            .context("Writing the evaluation results failed.")?;

        if let Some(path) = &self.summary {
            let summary = results.iter().collect::<EvaluationSummary>();
            info!(
                "Mean reciprocal rank {} over {} articles",
                summary.mean_mrr(),
                summary.articles,
            );
            write_summary(create(path)?, &summary).context("Writing the summary failed.")?;
        }

        if let Some(path) = &self.top_recommendations {
            write_top_recommendations(create(path)?, &TopRecommendations::from_results(&results))
                .context("Writing the top recommendations failed.")?;
        }

        if results.is_empty() {
            warn!("No recommendations matched an article of the gold standard");
            Ok(NON_FATAL_ERROR)
        } else {
            Ok(NO_ERROR)
        }
    }

    fn gold(&self) -> Result<Vec<GoldRecord>, Error> {
        if let Some(path) = &self.see_also {
            return read_all(path, |input| read_see_also(input).collect());
        }

        let path = self
            .click_stream
            .as_ref()
            .context("Missing gold standard.")?;
        let rows = read_all(path, |input| read_click_stream(input).collect::<Result<Vec<_>, _>>())?;

        match (&self.langlinks, &self.lang) {
            (Some(langlinks), Some(lang)) => {
                let langlinks = LangLinks::new(
                    read_all(langlinks, |input| read_lang_links(input).collect::<Result<Vec<_>, _>>())?,
                    lang,
                );
                info!("Translating the click stream by {} language links", langlinks.len());
                Ok(gold_from_click_stream(langlinks.translate(rows)))
            }
            _ => Ok(gold_from_click_stream(rows)),
        }
    }
}
