//! Parsed Wikipedia articles as handed over by the document parser.

use std::iter::FromIterator;

use derive_more::{Display, From};
use fnv::{FnvHashMap, FnvHashSet};
use serde::{Deserialize, Serialize};

/// The namespace of regular articles.
pub const ARTICLE_NAMESPACE: i32 = 0;

/// Numeric Wikipedia page id.
#[derive(Clone, Copy, Debug, Display, From, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u32);

/// An outbound link and the character offset it was found at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, usize)", into = "(String, usize)")]
pub struct Link {
    pub target: String,
    pub offset: usize,
}

impl Link {
    pub fn new(target: impl Into<String>, offset: usize) -> Self {
        Self {
            target: target.into(),
            offset,
        }
    }
}

impl From<(String, usize)> for Link {
    fn from((target, offset): (String, usize)) -> Self {
        Self { target, offset }
    }
}

impl From<Link> for (String, usize) {
    fn from(link: Link) -> Self {
        (link.target, link.offset)
    }
}

/// A parsed article.
///
/// Documents are immutable once parsed and only read by the pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    /// The page id, if the parser knows it.
    #[serde(default)]
    pub id: Option<PageId>,

    /// The article title.
    pub title: String,

    /// The namespace id, see [`ARTICLE_NAMESPACE`].
    #[serde(rename = "ns", default)]
    pub namespace: i32,

    /// The outbound links in order of appearance.
    #[serde(default)]
    pub links: Vec<Link>,

    /// The character offsets at which the words of the article start, ascending.
    #[serde(default)]
    pub word_offsets: Vec<usize>,

    /// The headlines of the article.
    #[serde(default)]
    pub headlines: Vec<String>,

    /// The targets of the "see also" section.
    #[serde(default)]
    pub see_also: Vec<String>,
}

impl Document {
    /// Creates an article without any links or words.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            namespace: ARTICLE_NAMESPACE,
            links: Vec::new(),
            word_offsets: Vec::new(),
            headlines: Vec::new(),
            see_also: Vec::new(),
        }
    }

    /// True iff the document belongs to the article namespace.
    pub fn is_article(&self) -> bool {
        self.namespace == ARTICLE_NAMESPACE
    }

    pub fn word_count(&self) -> usize {
        self.word_offsets.len()
    }

    pub fn headline_count(&self) -> usize {
        self.headlines.len()
    }

    /// The index of the last word starting at or before the given character offset.
    ///
    /// Offsets in front of the first word map to the first word.
    pub fn word_position(&self, offset: usize) -> usize {
        self.word_offsets
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// The distinct outbound links, keeping the first occurrence of each target.
    ///
    /// Links back to the article itself are skipped.
    pub fn out_links(&self) -> Vec<&Link> {
        let mut seen = FnvHashSet::default();
        self.links
            .iter()
            .filter(|link| link.target != self.title && seen.insert(link.target.as_str()))
            .collect()
    }
}

/// Lookup of page ids by title.
#[derive(Clone, Debug, Default)]
pub struct PageIds(FnvHashMap<String, PageId>);

impl PageIds {
    pub fn get(&self, title: &str) -> Option<PageId> {
        self.0.get(title).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(PageId, String)> for PageIds {
    fn from_iter<I: IntoIterator<Item = (PageId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(id, title)| (title, id)).collect())
    }
}
