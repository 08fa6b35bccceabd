use itertools::Itertools;

use crate::data::{
    document::Document,
    pair::{CooccurrenceObservation, PairKey},
};

/// A pair of distinct outbound links of a document and their word distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LinkPair<'a> {
    pub(crate) first: &'a str,
    pub(crate) second: &'a str,
    pub(crate) distance: u32,
}

/// Enumerates every unordered pair of distinct outbound links of the document once.
///
/// The titles of a pair are in lexicographic order and the distance is the absolute
/// difference of the word positions of both links, clamped to at least 1.
pub(crate) fn link_pairs(document: &Document) -> Vec<LinkPair<'_>> {
    let links = document
        .out_links()
        .into_iter()
        .map(|link| (link.target.as_str(), document.word_position(link.offset)))
        .collect_vec();

    links
        .iter()
        .cartesian_product(links.iter())
        .filter(|((title1, _), (title2, _))| title1 < title2)
        .map(|(&(first, position1), &(second, position2))| {
            let distance = (position1 as i64 - position2 as i64).unsigned_abs().max(1);
            LinkPair {
                first,
                second,
                distance: distance.min(u64::from(u32::MAX)) as u32,
            }
        })
        .collect()
}

/// Emits one co-citation observation per distinct unordered pair of outbound links.
///
/// Documents with less than two distinct outbound links emit nothing. The caller is
/// expected to drop non-article documents beforehand.
pub fn emit_pairs(document: &Document) -> impl Iterator<Item = CooccurrenceObservation> + '_ {
    link_pairs(document).into_iter().map(|pair| {
        CooccurrenceObservation::new(PairKey::new(pair.first, pair.second), pair.distance)
    })
}
