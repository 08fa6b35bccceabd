use std::path::PathBuf;

use anyhow::{Context, Error};
use log::info;
use structopt::StructOpt;

use citolytics::{io::write_article_stats, pipeline::article_stats};

use crate::{
    exit_code::NO_ERROR,
    utils::{create, progress_spin_until_done, read_documents_lazily},
};

/// Computes the structural statistics of all articles.
///
/// Writes `(title, words, headlines, out_links, avg_link_distance, out_links_per_word)`
/// records, the input of the popularity index of the `recommend` command.
#[derive(StructOpt, Debug)]
pub struct ArticleStatsCmd {
    /// Parsed articles as JSON lines.
    #[structopt(long)]
    documents: PathBuf,

    /// File in which the statistics are stored.
    #[structopt(short, long)]
    output: PathBuf,
}

impl ArticleStatsCmd {
    pub fn run(self) -> Result<i32, Error> {
        let mut documents = read_documents_lazily(&self.documents)?;
        let stats =
            progress_spin_until_done("Computing statistics", || article_stats(&mut documents));
        documents.finish()?;

        let written = write_article_stats(create(&self.output)?, &stats)
            .context("Writing the article statistics failed.")?;
        info!("Wrote the statistics of {} articles to {:?}", written, self.output);

        Ok(NO_ERROR)
    }
}
