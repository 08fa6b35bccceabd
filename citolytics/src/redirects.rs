//! Resolution of redirect aliases to their canonical article titles.

use std::iter::FromIterator;

use fnv::{FnvHashMap, FnvHashSet};
use log::{debug, info};

use crate::{
    cpa::{aggregate::Aggregator, scoring::ScoringStrategy},
    data::{
        document::{PageId, PageIds},
        pair::PairKey,
        scored::{PairStats, ScoredPair},
    },
};

/// Read-only mapping of redirect aliases to their canonical titles.
///
/// Chains are resolved once on creation, a lookup is a single map access.
#[derive(Clone, Debug, Default)]
pub struct Redirects(FnvHashMap<String, String>);

impl Redirects {
    /// Resolves the title to its canonical title.
    ///
    /// Chains of redirects are followed to their end. Titles without a redirect are
    /// canonical, as are titles whose chain runs into a redirect cycle.
    pub fn resolve<'a>(&'a self, title: &'a str) -> &'a str {
        self.0.get(title).map_or(title, String::as_str)
    }

    /// The number of aliases which resolve to another title.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolves every alias to the end of its chain, `None` if the chain runs into a cycle.
///
/// Each alias is visited once, chains share their already resolved tails.
fn resolve_chains(targets: &FnvHashMap<String, String>) -> FnvHashMap<&str, Option<&str>> {
    let mut ends = FnvHashMap::<&str, Option<&str>>::default();
    for alias in targets.keys() {
        let mut chain = Vec::new();
        let mut visited = FnvHashSet::default();
        let mut current = alias.as_str();
        let end = loop {
            if let Some(&end) = ends.get(current) {
                break end;
            }
            match targets.get(current) {
                Some(target) => {
                    if !visited.insert(current) {
                        break None;
                    }
                    chain.push(current);
                    current = target.as_str();
                }
                None => break Some(current),
            }
        };
        ends.extend(chain.into_iter().map(|alias| (alias, end)));
    }

    ends
}

impl FromIterator<(String, String)> for Redirects {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let targets = iter
            .into_iter()
            .filter(|(alias, target)| alias != target)
            .collect::<FnvHashMap<_, _>>();

        let resolved = resolve_chains(&targets)
            .into_iter()
            .filter_map(|(alias, end)| end.map(|end| (alias.to_string(), end.to_string())))
            .collect::<FnvHashMap<_, _>>();
        if resolved.len() < targets.len() {
            debug!(
                "Dropped {} redirects which run into cycles",
                targets.len() - resolved.len(),
            );
        }

        Self(resolved)
    }
}

struct Resolved {
    stats: PairStats,
    id_a: Option<PageId>,
    id_b: Option<PageId>,
}

/// Rewrites the titles of the pairs to their canonical titles.
///
/// Pairs which resolve to the same canonical pair are merged and rescored from their
/// combined statistics, pairs which resolve to a self pair are dropped. The page id of
/// a title is kept iff the title didn't change. The result is ordered by key.
pub fn resolve_redirects<S>(
    pairs: impl IntoIterator<Item = ScoredPair>,
    redirects: &Redirects,
    aggregator: &Aggregator<S>,
) -> Vec<ScoredPair>
where
    S: ScoringStrategy,
{
    let mut unresolved = 0;
    let mut resolved = FnvHashMap::<PairKey, Resolved>::default();
    for pair in pairs {
        unresolved += 1;

        let title_a = redirects.resolve(pair.title_a());
        let title_b = redirects.resolve(pair.title_b());
        let id_a = pair.id_a.filter(|_| title_a == pair.title_a());
        let id_b = pair.id_b.filter(|_| title_b == pair.title_b());
        let key = PairKey::new(title_a, title_b);
        if key.is_self_pair() {
            continue;
        }
        let (id_a, id_b) = if key.first() == title_a {
            (id_a, id_b)
        } else {
            (id_b, id_a)
        };

        match resolved.get_mut(&key) {
            Some(existing) => {
                existing.stats.absorb(pair.stats);
                existing.id_a = existing.id_a.or(id_a);
                existing.id_b = existing.id_b.or(id_b);
            }
            None => {
                let stats = pair.stats;
                resolved.insert(key, Resolved { stats, id_a, id_b });
            }
        }
    }

    let mut pairs = resolved
        .into_iter()
        .map(|(key, Resolved { stats, id_a, id_b })| ScoredPair {
            id_a,
            id_b,
            ..aggregator.score(key, stats)
        })
        .collect::<Vec<_>>();
    pairs.sort_unstable_by(|a, b| a.key.cmp(&b.key));
    info!(
        "Resolved redirects of {} pairs into {} pairs",
        unresolved,
        pairs.len(),
    );

    pairs
}

/// Assigns the page ids of both titles to every pair, unknown titles get no id.
pub fn assign_ids(pairs: &mut [ScoredPair], ids: &PageIds) {
    for pair in pairs {
        pair.id_a = ids.get(pair.title_a());
        pair.id_b = ids.get(pair.title_b());
    }
}

#[cfg(test)]
mod tests {
    use test_utils::assert_approx_eq;

    use super::*;
    use crate::{config::CpaConfig, cpa::scoring::InverseDistance};

    fn redirects(redirects: &[(&str, &str)]) -> Redirects {
        redirects
            .iter()
            .map(|&(alias, target)| (alias.to_string(), target.to_string()))
            .collect()
    }

    fn aggregator() -> Aggregator<InverseDistance> {
        let config = CpaConfig::default().with_alphas(&[1.]).unwrap();
        Aggregator::new(config, InverseDistance).unwrap()
    }

    fn pair(x: &str, y: &str, distances: &[u32]) -> ScoredPair {
        let aggregator = aggregator();
        let stats = distances
            .iter()
            .map(|&distance| PairStats::observe(distance, aggregator.config().alphas(), false))
            .reduce(PairStats::merge)
            .unwrap();
        aggregator.score(PairKey::new(x, y), stats)
    }

    fn titles(pairs: &[ScoredPair]) -> Vec<(&str, &str)> {
        pairs
            .iter()
            .map(|pair| (pair.title_a(), pair.title_b()))
            .collect()
    }

    #[test]
    fn test_resolve() {
        let redirects = redirects(&[("Colour", "Color"), ("Colours", "Colour")]);
        assert_eq!(redirects.resolve("Colour"), "Color");
        assert_eq!(redirects.resolve("Colours"), "Color");
        assert_eq!(redirects.resolve("Color"), "Color");
        assert_eq!(redirects.resolve("Shape"), "Shape");
    }

    #[test]
    fn test_resolve_cycle() {
        let redirects = redirects(&[("A", "B"), ("B", "C"), ("C", "B"), ("D", "D")]);
        assert_eq!(redirects.resolve("A"), "A");
        assert_eq!(redirects.resolve("B"), "B");
        assert_eq!(redirects.resolve("C"), "C");
        assert_eq!(redirects.resolve("D"), "D");
        assert!(redirects.is_empty());
    }

    #[test]
    fn test_resolve_long_chain_into_cycle() {
        let mut chain = (0..10_000)
            .map(|i| (format!("Alias {}", i), format!("Alias {}", i + 1)))
            .collect::<Vec<_>>();
        chain.push(("Alias 10000".to_string(), "Title".to_string()));
        chain.push(("Entry".to_string(), "Loop A".to_string()));
        chain.push(("Loop A".to_string(), "Loop B".to_string()));
        chain.push(("Loop B".to_string(), "Loop A".to_string()));
        let redirects = chain.into_iter().collect::<Redirects>();

        assert_eq!(redirects.len(), 10_001);
        assert_eq!(redirects.resolve("Alias 0"), "Title");
        assert_eq!(redirects.resolve("Alias 5000"), "Title");
        assert_eq!(redirects.resolve("Entry"), "Entry");
        assert_eq!(redirects.resolve("Loop B"), "Loop B");
    }

    #[test]
    fn test_resolve_redirects_merges_duplicates() {
        let redirects = redirects(&[("Colour", "Color"), ("Colr", "Color")]);
        let pairs = vec![
            pair("Color", "Red", &[2]),
            pair("Colour", "Red", &[1, 4]),
            pair("Colr", "Red", &[4]),
            pair("Blue", "Red", &[1]),
        ];

        let resolved = resolve_redirects(pairs, &redirects, &aggregator());
        assert_eq!(titles(&resolved), [("Blue", "Red"), ("Color", "Red")]);
        assert_eq!(resolved[1].co_citation_count(), 4);
        assert_approx_eq!(f64, &resolved[1].scores, [2.], epsilon = 1e-12);
    }

    #[test]
    fn test_resolve_redirects_drops_self_pairs() {
        let redirects = redirects(&[("Colour", "Color")]);
        let pairs = vec![pair("Color", "Colour", &[1])];
        assert!(resolve_redirects(pairs, &redirects, &aggregator()).is_empty());
    }

    #[test]
    fn test_resolve_redirects_keeps_ids_of_unchanged_titles() {
        let redirects = redirects(&[("Zed", "Alpha")]);
        let mut pair = pair("Mid", "Zed", &[1]);
        pair.id_a = Some(PageId(1));
        pair.id_b = Some(PageId(2));

        let resolved = resolve_redirects(vec![pair], &redirects, &aggregator());
        assert_eq!(titles(&resolved), [("Alpha", "Mid")]);
        assert_eq!(resolved[0].id_a, None);
        assert_eq!(resolved[0].id_b, Some(PageId(1)));
    }

    #[test]
    fn test_resolve_redirects_idempotent() {
        let redirects = redirects(&[("Colour", "Color"), ("Crimson", "Red"), ("Rot", "Crimson")]);
        let pairs = vec![
            pair("Color", "Red", &[2, 3]),
            pair("Colour", "Rot", &[1]),
            pair("Crimson", "Red", &[1]),
            pair("Blue", "Crimson", &[5]),
        ];

        let once = resolve_redirects(pairs, &redirects, &aggregator());
        let twice = resolve_redirects(once.clone(), &redirects, &aggregator());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_assign_ids() {
        let ids = vec![(PageId(7), "Blue".to_string())]
            .into_iter()
            .collect::<PageIds>();
        let mut pairs = vec![pair("Blue", "Red", &[1])];

        assign_ids(&mut pairs, &ids);
        assert_eq!(pairs[0].id_a, Some(PageId(7)));
        assert_eq!(pairs[0].id_b, None);
    }
}
