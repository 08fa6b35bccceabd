use std::path::PathBuf;

use anyhow::{Context, Error};
use log::info;
use structopt::StructOpt;

use citolytics::{
    cpa::link_graph::LinkGraph,
    io::{read_link_pairs, read_redirects, write_link_graph},
    pipeline::link_graph,
    Redirects,
};

use crate::{
    exit_code::NO_ERROR,
    utils::{create, progress_spin_until_done, read_all, read_documents_lazily},
};

/// Finds the articles in which the given pairs of links are co-cited.
///
/// Writes `(article, first, second, distance)` records.
#[derive(StructOpt, Debug)]
pub struct LinkGraphCmd {
    /// Parsed articles as JSON lines.
    #[structopt(long)]
    documents: PathBuf,

    /// The pairs of links `(title, title)` to look up.
    #[structopt(long)]
    pairs: PathBuf,

    /// Redirects `(alias, target)` to resolve the links with.
    #[structopt(long)]
    redirects: Option<PathBuf>,

    /// File in which the co-citations are stored.
    #[structopt(short, long)]
    output: PathBuf,
}

impl LinkGraphCmd {
    pub fn run(self) -> Result<i32, Error> {
        let graph = read_all(&self.pairs, |input| {
            read_link_pairs(input).collect::<Result<LinkGraph, _>>()
        })?;
        let redirects = self
            .redirects
            .as_ref()
            .map(|path| read_all(path, |input| read_redirects(input).collect::<Result<Redirects, _>>()))
            .transpose()?;

        let mut documents = read_documents_lazily(&self.documents)?;
        let entries = progress_spin_until_done("Looking up co-citations", || {
            link_graph(&mut documents, &graph, redirects.as_ref())
        });
        documents.finish()?;

        let written = write_link_graph(create(&self.output)?, &entries)
            .context("Writing the link graph failed.")?;
        info!("Wrote {} co-citations to {:?}", written, self.output);

        Ok(NO_ERROR)
    }
}
