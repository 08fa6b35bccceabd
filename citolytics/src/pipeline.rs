//! Batch jobs over a corpus of parsed documents.
//!
//! The co-citation job partitions the documents and combines the observations of each
//! partition locally. The partial results are then shuffled into shards by the hash of
//! their pair key, such that all partials of a pair meet in the same shard, and every
//! shard is combined globally. With the `multithreaded` feature the partitions and
//! shards are processed in parallel.

use log::{info, trace};

#[cfg(feature = "multithreaded")]
use rayon::iter::{IntoParallelIterator, ParallelBridge, ParallelIterator};

use crate::{
    cpa::{
        aggregate::{Aggregator, Partial},
        emitter::emit_pairs,
        link_graph::{LinkGraph, LinkGraphEntry},
        scoring::ScoringStrategy,
        stats::ArticleStats,
    },
    data::{
        document::{Document, PageId, PageIds},
        pair::PairKey,
        scored::{PairStats, ScoredPair},
    },
    redirects::{assign_ids, resolve_redirects, Redirects},
};

/// The number of shards of the global combine.
pub const SHUFFLE_PARTITIONS: usize = 64;

/// The default number of documents per partition of the local combine.
pub const DEFAULT_PARTITION_SIZE: usize = 1024;

/// Streams the articles among the documents in partitions of a fixed size.
///
/// Other namespaces are dropped. Only a single partition is held at a time.
struct Partitions<I> {
    documents: I,
    size: usize,
    documents_seen: usize,
    articles_seen: usize,
    ids: Option<Vec<(PageId, String)>>,
}

impl<I> Partitions<I>
where
    I: Iterator<Item = Document>,
{
    fn new(documents: impl IntoIterator<IntoIter = I>, size: usize) -> Self {
        Self {
            documents: documents.into_iter(),
            size: size.max(1),
            documents_seen: 0,
            articles_seen: 0,
            ids: None,
        }
    }

    /// Keeps the page ids of all documents, including other namespaces.
    fn collecting_ids(self) -> Self {
        Self {
            ids: Some(Vec::new()),
            ..self
        }
    }
}

impl<I> Iterator for Partitions<I>
where
    I: Iterator<Item = Document>,
{
    type Item = Vec<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut partition = Vec::new();
        for document in &mut self.documents {
            self.documents_seen += 1;
            if let (Some(ids), Some(id)) = (&mut self.ids, document.id) {
                ids.push((id, document.title.clone()));
            }

            if document.is_article() {
                partition.push(document);
                if partition.len() == self.size {
                    break;
                }
            } else {
                trace!(
                    "Dropped {} of namespace {}",
                    document.title,
                    document.namespace,
                );
            }
        }
        self.articles_seen += partition.len();

        (!partition.is_empty()).then(|| partition)
    }
}

/// Computes the co-citation scores of all pairs of the corpus.
pub struct CoCitationJob<S> {
    aggregator: Aggregator<S>,
    redirects: Option<Redirects>,
    ids: Option<PageIds>,
    partition_size: usize,
}

impl<S> CoCitationJob<S>
where
    S: ScoringStrategy + Sync,
{
    pub fn new(aggregator: Aggregator<S>) -> Self {
        Self {
            aggregator,
            redirects: None,
            ids: None,
            partition_size: DEFAULT_PARTITION_SIZE,
        }
    }

    /// Resolves the redirects of the scored pairs.
    pub fn with_redirects(self, redirects: Redirects) -> Self {
        Self {
            redirects: Some(redirects),
            ..self
        }
    }

    /// Assigns page ids from the mapping instead of the ids of the documents.
    pub fn with_page_ids(self, ids: PageIds) -> Self {
        Self {
            ids: Some(ids),
            ..self
        }
    }

    /// Sets the number of documents per partition, at least 1.
    pub fn with_partition_size(self, partition_size: usize) -> Self {
        Self {
            partition_size: partition_size.max(1),
            ..self
        }
    }

    pub fn aggregator(&self) -> &Aggregator<S> {
        &self.aggregator
    }

    /// Runs the job, the scored pairs are ordered by key.
    ///
    /// The documents are consumed one partition at a time, so the corpus is never held
    /// in memory as a whole.
    pub fn run<D>(&self, documents: D) -> Vec<ScoredPair>
    where
        D: IntoIterator<Item = Document>,
        D::IntoIter: Send,
    {
        let mut partitions = Partitions::new(documents, self.partition_size);
        if self.ids.is_none() {
            partitions = partitions.collecting_ids();
        }

        let partials = self.combine_partitions(&mut partitions);
        info!(
            "Computed co-citations of {} articles out of {} documents",
            partitions.articles_seen,
            partitions.documents_seen,
        );

        let shards = shuffle(partials);
        let mut pairs = self.combine_shards(shards);
        info!("Aggregated {} pairs", pairs.len());

        if let Some(redirects) = &self.redirects {
            pairs = resolve_redirects(pairs, redirects, &self.aggregator);
        }

        match (&self.ids, partitions.ids) {
            (Some(ids), _) => assign_ids(&mut pairs, ids),
            (None, Some(ids)) if !ids.is_empty() => {
                assign_ids(&mut pairs, &ids.into_iter().collect::<PageIds>())
            }
            (None, _) => {}
        }

        pairs
    }

    fn combine_partitions<I>(&self, partitions: &mut Partitions<I>) -> Vec<Partial>
    where
        I: Iterator<Item = Document> + Send,
    {
        #[cfg(feature = "multithreaded")]
        let partitions = partitions.par_bridge();

        partitions
            .map(|partition| {
                self.aggregator
                    .combine_local(partition.iter().flat_map(emit_pairs))
            })
            .collect()
    }

    fn combine_shards(&self, shards: Vec<Vec<(PairKey, PairStats)>>) -> Vec<ScoredPair> {
        #[cfg(not(feature = "multithreaded"))]
        let shards = shards.into_iter();
        #[cfg(feature = "multithreaded")]
        let shards = shards.into_par_iter();

        let mut pairs = shards
            .flat_map(|shard| self.aggregator.combine_global(shard))
            .collect::<Vec<_>>();
        pairs.sort_unstable_by(|a, b| a.key.cmp(&b.key));
        pairs
    }
}

/// Moves the partial statistics into the shard of their pair key.
fn shuffle(partials: Vec<Partial>) -> Vec<Vec<(PairKey, PairStats)>> {
    let mut shards = (0..SHUFFLE_PARTITIONS)
        .map(|_| Vec::new())
        .collect::<Vec<_>>();
    for partial in partials {
        for (key, stats) in partial {
            shards[key.partition(SHUFFLE_PARTITIONS)].push((key, stats));
        }
    }
    shards
}

/// Maps the articles of every partition in order, one partition at a time.
fn map_articles<T, F>(documents: impl IntoIterator<Item = Document>, map: F) -> Vec<T>
where
    T: Send,
    F: Fn(&Document) -> Vec<T> + Sync,
{
    let mut mapped = Vec::new();
    for partition in Partitions::new(documents, DEFAULT_PARTITION_SIZE) {
        #[cfg(not(feature = "multithreaded"))]
        let partition = partition.into_iter();
        #[cfg(feature = "multithreaded")]
        let partition = partition.into_par_iter();

        let partition = partition
            .flat_map(|document| map(&document))
            .collect::<Vec<_>>();
        mapped.extend(partition);
    }

    mapped
}

/// Computes the statistics of all articles.
pub fn article_stats(documents: impl IntoIterator<Item = Document>) -> Vec<ArticleStats> {
    let stats = map_articles(documents, |document| {
        vec![ArticleStats::from_document(document)]
    });
    info!("Computed statistics of {} articles", stats.len());

    stats
}

/// Finds the co-citations of the selected pairs in all articles.
pub fn link_graph(
    documents: impl IntoIterator<Item = Document>,
    graph: &LinkGraph,
    redirects: Option<&Redirects>,
) -> Vec<LinkGraphEntry> {
    let entries = map_articles(documents, |document| graph.entries(document, redirects));
    info!("Found {} co-citations of the selected pairs", entries.len());

    entries
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rstest::rstest;
    use test_utils::assert_approx_eq;

    use super::*;
    use crate::{
        config::CpaConfig,
        cpa::scoring::InverseDistance,
        data::document::PageId,
        tests::document,
    };

    fn job(reducer_threshold: u64) -> CoCitationJob<InverseDistance> {
        let config = CpaConfig::default()
            .with_alphas(&[1., 2.])
            .unwrap()
            .with_reducer_threshold(reducer_threshold)
            .unwrap();
        CoCitationJob::new(Aggregator::new(config, InverseDistance).unwrap())
    }

    fn documents() -> Vec<Document> {
        vec![
            document("A", &[("B", 1), ("C", 5), ("D", 5)]),
            document("E", &[("C", 0), ("B", 4)]),
            document("F", &[("D", 2), ("B", 3)]),
            document("G", &[("B", 0)]),
        ]
    }

    #[test]
    fn test_run() {
        let pairs = job(2).run(documents());

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].key, PairKey::new("B", "C"));
        assert_eq!(pairs[0].co_citation_count(), 2);
        assert_approx_eq!(f64, &pairs[0].scores, [0.5, 0.125]);
        assert_eq!(pairs[1].key, PairKey::new("B", "D"));
        assert_approx_eq!(f64, &pairs[1].scores, [1.25, 1.0625]);
    }

    #[test]
    fn test_run_drops_other_namespaces() {
        let mut talk = document("Talk:A", &[("B", 1), ("C", 5)]);
        talk.namespace = 1;
        let mut documents = documents();
        documents.push(talk);

        let pairs = job(3).run(documents);
        assert!(pairs.is_empty());
    }

    #[rstest(partition_size, case(1), case(2), case(3), case(100))]
    fn test_run_independent_of_partition_size(partition_size: usize) {
        let expected = job(1).run(documents());
        let actual = job(1).with_partition_size(partition_size).run(documents());

        assert_eq!(actual.len(), expected.len());
        for (actual, expected) in actual.iter().zip(&expected) {
            assert_eq!(actual.key, expected.key);
            assert_eq!(actual.stats.count(), expected.stats.count());
            assert_approx_eq!(f64, &actual.scores, &expected.scores, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_run_with_redirects_and_ids() {
        let redirects = vec![("D".to_string(), "C".to_string())]
            .into_iter()
            .collect::<Redirects>();
        let ids = vec![(PageId(2), "B".to_string()), (PageId(3), "C".to_string())]
            .into_iter()
            .collect::<PageIds>();

        let pairs = job(1)
            .with_redirects(redirects)
            .with_page_ids(ids)
            .run(documents());

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].key, PairKey::new("B", "C"));
        assert_eq!(pairs[0].co_citation_count(), 4);
        assert_eq!(pairs[0].id_a, Some(PageId(2)));
        assert_eq!(pairs[0].id_b, Some(PageId(3)));
    }

    #[test]
    fn test_run_ids_of_documents() {
        let mut documents = documents();
        documents.push(Document {
            id: Some(PageId(9)),
            ..Document::new("B")
        });

        let pairs = job(2).run(documents);
        assert_eq!(pairs[0].id_a, Some(PageId(9)));
        assert_eq!(pairs[0].id_b, None);
    }

    #[test]
    fn test_partitions_pull_documents_lazily() {
        let mut talk = document("Talk:A", &[("B", 1)]);
        talk.namespace = 1;
        talk.id = Some(PageId(5));
        let mut documents = documents();
        documents.insert(1, talk);

        let pulled = Cell::new(0);
        let mut partitions = Partitions::new(
            documents.into_iter().inspect(|_| pulled.set(pulled.get() + 1)),
            2,
        )
        .collecting_ids();

        let titles = |partition: Vec<Document>| {
            partition
                .into_iter()
                .map(|document| document.title)
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(partitions.next().unwrap()), ["A", "E"]);
        assert_eq!(pulled.get(), 3);
        assert_eq!(titles(partitions.next().unwrap()), ["F", "G"]);
        assert_eq!(pulled.get(), 5);
        assert!(partitions.next().is_none());
        assert_eq!(partitions.documents_seen, 5);
        assert_eq!(partitions.articles_seen, 4);
        assert_eq!(partitions.ids, Some(vec![(PageId(5), "Talk:A".to_string())]));
    }

    #[test]
    fn test_run_streamed_corpus() {
        let corpus = (0..1000).map(|index| {
            let hub = format!("Hub {}", index % 10);
            document(&format!("Article {}", index), &[("Core", 0), (hub.as_str(), 1)])
        });
        let pairs = job(1).with_partition_size(16).run(corpus);

        assert_eq!(pairs.len(), 10);
        for pair in &pairs {
            assert_eq!(pair.title_a(), "Core");
            assert_eq!(pair.co_citation_count(), 100);
            assert_approx_eq!(f64, &pair.scores, [100., 100.], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_article_stats() {
        let stats = article_stats(documents());
        assert_eq!(stats.len(), 4);
        assert_eq!(stats[0].title, "A");
        assert_eq!(stats[3].out_links, 1);
    }

    #[test]
    fn test_link_graph() {
        let graph = LinkGraph::new(vec![PairKey::new("B", "C")]);
        let entries = link_graph(documents(), &graph, None);

        let articles = entries
            .iter()
            .map(|entry| entry.article.as_str())
            .collect::<Vec<_>>();
        assert_eq!(articles, ["A", "E"]);
    }
}
