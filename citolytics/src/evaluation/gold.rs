//! Gold standards derived from click streams or "see also" sections.

use std::cmp::Reverse;

use fnv::FnvHashMap;
use itertools::Itertools;
use log::debug;

use crate::data::document::{Document, PageId};

/// The click stream row type of clicks on internal links.
pub const LINK_TYPE: &str = "link";

/// A correct target of an article and the number of clicks it received from the article.
#[derive(Clone, Debug, PartialEq)]
pub struct GoldTarget {
    pub title: String,
    pub clicks: u64,
}

/// The correct targets of an article.
#[derive(Clone, Debug, PartialEq)]
pub struct GoldRecord {
    pub article: String,
    /// The number of visits of the article.
    pub impressions: u64,
    /// The correct targets, best first.
    pub targets: Vec<GoldTarget>,
}

impl GoldRecord {
    /// Creates a gold record from click counts, ordering the targets by descending clicks
    /// and ascending title.
    pub fn from_clicks(
        article: impl Into<String>,
        impressions: u64,
        clicks: impl IntoIterator<Item = (String, u64)>,
    ) -> Self {
        let mut targets = clicks
            .into_iter()
            .map(|(title, clicks)| GoldTarget { title, clicks })
            .collect::<Vec<_>>();
        targets.sort_unstable_by(|a, b| {
            Reverse(a.clicks)
                .cmp(&Reverse(b.clicks))
                .then_with(|| a.title.cmp(&b.title))
        });

        Self {
            article: article.into(),
            impressions,
            targets,
        }
    }

    /// Creates a gold record from an unweighted list of targets, keeping their order.
    pub fn from_targets(article: impl Into<String>, targets: impl IntoIterator<Item = String>) -> Self {
        Self {
            article: article.into(),
            impressions: 0,
            targets: targets
                .into_iter()
                .unique()
                .map(|title| GoldTarget { title, clicks: 0 })
                .collect(),
        }
    }

    /// The titles of the correct targets, best first.
    pub fn correct_list(&self) -> Vec<&str> {
        self.targets.iter().map(|target| target.title.as_str()).collect()
    }

    /// All clicks out of the article.
    pub fn total_clicks(&self) -> u64 {
        self.targets.iter().map(|target| target.clicks).sum()
    }

    /// Merges two records of the same article, summing impressions and clicks.
    pub fn merge(self, other: Self) -> Self {
        debug_assert_eq!(self.article, other.article);

        let mut clicks = FnvHashMap::<String, u64>::default();
        for target in self.targets.into_iter().chain(other.targets) {
            *clicks.entry(target.title).or_default() += target.clicks;
        }
        Self::from_clicks(self.article, self.impressions + other.impressions, clicks)
    }
}

/// A row of the Wikipedia click stream.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickStreamRow {
    /// The id of the referrer, external referrers have none.
    pub prev_id: Option<PageId>,
    pub curr_id: Option<PageId>,
    /// The number of clicks.
    pub clicks: u64,
    pub prev_title: String,
    pub curr_title: String,
    /// The referrer type, e.g. `link`, `external` or `other`.
    pub kind: String,
}

#[derive(Default)]
struct Clicks {
    impressions: u64,
    targets: FnvHashMap<String, u64>,
}

/// Builds the gold records of all articles of the click stream, ordered by article.
///
/// Every row counts as impressions of its current article, only rows of internal links
/// count as clicks from the referrer to the current article.
pub fn gold_from_click_stream(rows: impl IntoIterator<Item = ClickStreamRow>) -> Vec<GoldRecord> {
    let mut articles = FnvHashMap::<String, Clicks>::default();
    for row in rows {
        articles.entry(row.curr_title.clone()).or_default().impressions += row.clicks;
        if row.kind == LINK_TYPE {
            *articles
                .entry(row.prev_title)
                .or_default()
                .targets
                .entry(row.curr_title)
                .or_default() += row.clicks;
        }
    }

    let mut records = articles
        .into_iter()
        .map(|(article, clicks)| GoldRecord::from_clicks(article, clicks.impressions, clicks.targets))
        .collect::<Vec<_>>();
    records.sort_unstable_by(|a, b| a.article.cmp(&b.article));
    debug!("Read click stream gold standard of {} articles", records.len());

    records
}

/// A language link of a page to its title in another language.
#[derive(Clone, Debug, PartialEq)]
pub struct LangLinkRow {
    pub page_id: PageId,
    pub lang: String,
    pub title: String,
}

/// Translation of page ids to the titles of one language.
#[derive(Clone, Debug, Default)]
pub struct LangLinks(FnvHashMap<PageId, String>);

impl LangLinks {
    /// Keeps the links into the given language.
    pub fn new(rows: impl IntoIterator<Item = LangLinkRow>, lang: &str) -> Self {
        Self(
            rows.into_iter()
                .filter(|row| row.lang == lang)
                .map(|row| (row.page_id, row.title))
                .collect(),
        )
    }

    pub fn get(&self, id: PageId) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Translates the titles of the click stream rows by their ids.
    ///
    /// Rows whose referrer or current article has no translation are dropped.
    pub fn translate<'a>(
        &'a self,
        rows: impl IntoIterator<Item = ClickStreamRow> + 'a,
    ) -> impl Iterator<Item = ClickStreamRow> + 'a {
        rows.into_iter().filter_map(move |row| {
            let prev_title = self.get(row.prev_id?)?.to_string();
            let curr_title = self.get(row.curr_id?)?.to_string();
            Some(ClickStreamRow {
                prev_title,
                curr_title,
                ..row
            })
        })
    }
}

/// Builds the gold records from the "see also" sections of the documents.
///
/// Documents without a "see also" section get no record.
pub fn gold_from_see_also<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Vec<GoldRecord> {
    documents
        .into_iter()
        .filter(|document| !document.see_also.is_empty())
        .map(|document| GoldRecord::from_targets(&document.title, document.see_also.iter().cloned()))
        .collect()
}
