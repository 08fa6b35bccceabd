use std::path::PathBuf;

use anyhow::{Context, Error};
use log::info;
use structopt::StructOpt;

use citolytics::{
    data::document::PageIds,
    io::{read_id_titles, read_redirects, write_scored_pairs},
    pipeline::CoCitationJob,
    Aggregator,
    CpaConfig,
    InverseDistance,
    MedianDistance,
    Redirects,
    ScoringStrategy,
};

use crate::{
    exit_code::NO_ERROR,
    utils::{create, progress_spin_until_done, read_all, read_documents_lazily},
};

/// Computes the co-citation proximity scores of all pairs of linked articles.
///
/// Writes `(title_a, title_b, id_a, id_b, count, score...)` records with one
/// score per alpha.
#[derive(StructOpt, Debug)]
pub struct CpaCmd {
    /// Parsed articles as JSON lines.
    #[structopt(long)]
    documents: PathBuf,

    /// File in which the scored pairs are stored.
    #[structopt(short, long)]
    output: PathBuf,

    /// The decay exponents of the link distance, e.g. `0.5,1.5`.
    #[structopt(long, use_delimiter = true, default_value = "1.5")]
    alpha: Vec<f64>,

    /// Pairs with fewer co-citations are dropped from the output.
    #[structopt(long, default_value = "1")]
    reducer_threshold: u64,

    /// Pairs with fewer co-citations within a partition are dropped before the global
    /// combine.
    #[structopt(long, default_value = "1")]
    combiner_threshold: u64,

    /// Scores by the median link distance instead of the sum of inverse distances.
    #[structopt(long)]
    median: bool,

    /// Redirects `(alias, target)` to resolve in the scored pairs.
    #[structopt(long)]
    redirects: Option<PathBuf>,

    /// Page ids `(id, title)` of the scored pairs.
    ///
    /// Defaults to the ids of the documents.
    #[structopt(long)]
    id_title_mapping: Option<PathBuf>,
}

impl CpaCmd {
    pub fn run(self) -> Result<i32, Error> {
        let config = CpaConfig::default()
            .with_alphas(&self.alpha)
            .and_then(|config| config.with_reducer_threshold(self.reducer_threshold))
            .and_then(|config| config.with_combiner_threshold(self.combiner_threshold))
            .map(|config| config.with_median(self.median))
            .context("Invalid co-citation configuration.")?;

        if config.median() {
            self.run_with(Aggregator::new(config, MedianDistance)?)
        } else {
            self.run_with(Aggregator::new(config, InverseDistance)?)
        }
    }

    fn run_with<S>(self, aggregator: Aggregator<S>) -> Result<i32, Error>
    where
        S: ScoringStrategy + Sync,
    {
        let mut job = CoCitationJob::new(aggregator);
        if let Some(redirects) = &self.redirects {
            let redirects = read_all(redirects, |input| {
                read_redirects(input).collect::<Result<Redirects, _>>()
            })?;
            info!("Loaded {} redirects", redirects.len());
            job = job.with_redirects(redirects);
        }
        if let Some(mapping) = &self.id_title_mapping {
            let ids = read_all(mapping, |input| {
                read_id_titles(input).collect::<Result<PageIds, _>>()
            })?;
            info!("Loaded {} page ids", ids.len());
            job = job.with_page_ids(ids);
        }

        let mut documents = read_documents_lazily(&self.documents)?;
        let pairs = progress_spin_until_done("Computing co-citations", || job.run(&mut documents));
        documents.finish()?;

        let written = write_scored_pairs(create(&self.output)?, &pairs)
            .context("Writing the scored pairs failed.")?;
        info!("Wrote {} scored pairs to {:?}", written, self.output);

        Ok(NO_ERROR)
    }
}
