use std::iter::FromIterator;

use fnv::FnvHashMap;

use crate::{cpa::emitter::link_pairs, data::document::Document};

/// Structural statistics of an article.
#[derive(Clone, Debug, PartialEq)]
pub struct ArticleStats {
    pub title: String,
    pub words: usize,
    pub headlines: usize,
    pub out_links: usize,
    /// Mean word distance over all pairs of distinct outbound links.
    pub avg_link_distance: f64,
}

impl ArticleStats {
    pub fn from_document(document: &Document) -> Self {
        let pairs = link_pairs(document);
        let avg_link_distance = if pairs.is_empty() {
            0.
        } else {
            pairs.iter().map(|pair| f64::from(pair.distance)).sum::<f64>() / pairs.len() as f64
        };

        Self {
            title: document.title.clone(),
            words: document.word_count(),
            headlines: document.headline_count(),
            out_links: document.out_links().len(),
            avg_link_distance,
        }
    }

    /// The ratio of outbound links to words, 0 for articles without words.
    pub fn out_links_per_word(&self) -> f64 {
        if self.words == 0 {
            0.
        } else {
            self.out_links as f64 / self.words as f64
        }
    }
}

/// Read-only lookup of article statistics by title.
#[derive(Clone, Debug, Default)]
pub struct ArticleStatsTable(FnvHashMap<String, ArticleStats>);

impl ArticleStatsTable {
    pub fn get(&self, title: &str) -> Option<&ArticleStats> {
        self.0.get(title)
    }

    /// The number of articles in the corpus.
    pub fn article_count(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<ArticleStats> for ArticleStatsTable {
    fn from_iter<I: IntoIterator<Item = ArticleStats>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|stats| (stats.title.clone(), stats))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use test_utils::assert_approx_eq;

    use super::*;
    use crate::tests::document;

    #[test]
    fn test_from_document() {
        let mut doc = document("A", &[("B", 1), ("C", 5), ("D", 5), ("B", 7)]);
        doc.headlines = vec!["History".into(), "See also".into()];

        let stats = ArticleStats::from_document(&doc);
        assert_eq!(stats.title, "A");
        assert_eq!(stats.words, 8);
        assert_eq!(stats.headlines, 2);
        assert_eq!(stats.out_links, 3);
        assert_approx_eq!(f64, stats.avg_link_distance, 3.);
        assert_approx_eq!(f64, stats.out_links_per_word(), 3. / 8.);
    }

    #[test]
    fn test_from_document_without_links() {
        let stats = ArticleStats::from_document(&Document::new("A"));
        assert_approx_eq!(f64, stats.avg_link_distance, 0.);
        assert_approx_eq!(f64, stats.out_links_per_word(), 0.);
    }

    #[test]
    fn test_table() {
        let table = vec![
            ArticleStats::from_document(&Document::new("A")),
            ArticleStats::from_document(&Document::new("B")),
        ]
        .into_iter()
        .collect::<ArticleStatsTable>();

        assert_eq!(table.article_count(), 2);
        assert!(table.get("A").is_some());
        assert!(table.get("C").is_none());
    }
}
