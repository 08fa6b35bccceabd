use std::iter::FromIterator;

use fnv::FnvHashSet;

use crate::{
    cpa::emitter::link_pairs,
    data::{document::Document, pair::PairKey},
    redirects::Redirects,
};

/// A co-citation of a selected pair within one article.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkGraphEntry {
    pub article: String,
    pub first: String,
    pub second: String,
    pub distance: u32,
}

/// Finds the articles in which selected link pairs are co-cited.
#[derive(Clone, Debug, Default)]
pub struct LinkGraph {
    pairs: FnvHashSet<PairKey>,
}

impl LinkGraph {
    pub fn new(pairs: impl IntoIterator<Item = PairKey>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// The co-citations of the selected pairs in the document.
    ///
    /// If redirects are given, link targets are resolved before they are matched
    /// against the selected pairs.
    pub fn entries(&self, document: &Document, redirects: Option<&Redirects>) -> Vec<LinkGraphEntry> {
        let resolve = |title| redirects.map_or(title, |redirects| redirects.resolve(title));

        link_pairs(document)
            .into_iter()
            .filter_map(|pair| {
                let key = PairKey::new(resolve(pair.first), resolve(pair.second));
                self.pairs.contains(&key).then(|| LinkGraphEntry {
                    article: document.title.clone(),
                    first: key.first().to_string(),
                    second: key.second().to_string(),
                    distance: pair.distance,
                })
            })
            .collect()
    }
}

impl FromIterator<PairKey> for LinkGraph {
    fn from_iter<I: IntoIterator<Item = PairKey>>(iter: I) -> Self {
        Self::new(iter)
    }
}
