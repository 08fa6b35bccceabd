//! Reading and writing of delimited records.
//!
//! All records are tab separated, one per line, without header and without quoting.
//! Documents are read from JSON lines instead.
//!
//! Readers are fallible iterators, the first malformed record is reported with its
//! line and raw content and aborts the stage which consumes the reader.

use std::{
    io::{BufRead, Read, Write},
    str::FromStr,
};

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use displaydoc::Display;
use thiserror::Error;

use crate::{
    cpa::{link_graph::LinkGraphEntry, stats::ArticleStats},
    data::{
        document::{Document, PageId},
        pair::PairKey,
        scored::ScoredPair,
    },
    evaluation::{
        gold::{ClickStreamRow, GoldRecord, LangLinkRow},
        summary::{EvaluationSummary, TopRecommendations},
        EvaluationResult,
    },
    recommend::{Recommendation, RecommendationSet},
};

/// The delimiter of the fields of a record.
pub const FIELD_DELIMITER: u8 = b'\t';

/// The delimiter of records.
pub const ROW_DELIMITER: u8 = b'\n';

/// The delimiter of the elements of a list field.
pub const LIST_DELIMITER: char = '|';

/// The page id written for titles without a known id.
pub const NO_ID: i64 = -1;

/// Potential errors of reading and writing records.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// Malformed record in line {line}, expected at least {expected} fields but found {found}: {raw}
    Malformed {
        line: u64,
        expected: usize,
        found: usize,
        raw: String,
    },
    /// Invalid field {field} of the record in line {line}: {raw}
    InvalidField { line: u64, field: usize, raw: String },
    /// Invalid document in line {line}: {source}
    Json {
        line: u64,
        source: serde_json::Error,
    },
    /// Failed to read or write a delimited record: {0}
    Csv(#[from] csv::Error),
    /// Failed to read or write: {0}
    Io(#[from] std::io::Error),
}

/// A delimited reader of records with the field delimiter of this crate.
///
/// Rows may end with `\n` or `\r\n`.
pub fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .terminator(Terminator::CRLF)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(input)
}

/// A delimited writer of records with the field and row delimiters of this crate.
pub fn writer<W: Write>(output: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .terminator(Terminator::Any(ROW_DELIMITER))
        .has_headers(false)
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .from_writer(output)
}

/// A record with at least the expected number of fields.
struct Row {
    line: u64,
    record: StringRecord,
}

impl Row {
    fn field(&self, field: usize) -> &str {
        // the number of fields is checked on creation
        self.record.get(field).unwrap_or_default()
    }

    fn raw(&self) -> String {
        let delimiter = char::from(FIELD_DELIMITER).to_string();
        self.record
            .iter()
            .collect::<Vec<_>>()
            .join(delimiter.as_str())
    }

    fn parse<T: FromStr>(&self, field: usize) -> Result<T, Error> {
        self.field(field).trim().parse().map_err(|_| Error::InvalidField {
            line: self.line,
            field,
            raw: self.raw(),
        })
    }

    /// Parses an optional page id, empty fields and [`NO_ID`] are no id.
    fn id(&self, field: usize) -> Result<Option<PageId>, Error> {
        let value = self.field(field).trim();
        if value.is_empty() || value == NO_ID.to_string() {
            Ok(None)
        } else {
            self.parse(field).map(|id| Some(PageId(id)))
        }
    }
}

fn rows<R: Read>(input: R, expected: usize) -> impl Iterator<Item = Result<Row, Error>> {
    reader(input)
        .into_records()
        .enumerate()
        .map(move |(index, record)| {
            let record = record?;
            let line = record
                .position()
                .map_or(index as u64 + 1, |position| position.line());
            let row = Row { line, record };

            if row.record.len() < expected {
                Err(Error::Malformed {
                    line,
                    expected,
                    found: row.record.len(),
                    raw: row.raw(),
                })
            } else {
                Ok(row)
            }
        })
}

/// Reads documents from JSON lines, blank lines are skipped.
pub fn read_documents<R: BufRead>(input: R) -> impl Iterator<Item = Result<Document, Error>> {
    input
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(serde_json::from_str(&line).map_err(|source| Error::Json {
                line: index as u64 + 1,
                source,
            })),
            Err(error) => Some(Err(error.into())),
        })
}

/// Reads `(alias, target)` redirects.
pub fn read_redirects<R: Read>(input: R) -> impl Iterator<Item = Result<(String, String), Error>> {
    rows(input, 2).map(|row| {
        let row = row?;
        Ok((row.field(0).to_string(), row.field(1).to_string()))
    })
}

/// Reads `(id, title)` mappings.
pub fn read_id_titles<R: Read>(input: R) -> impl Iterator<Item = Result<(PageId, String), Error>> {
    rows(input, 2).map(|row| {
        let row = row?;
        Ok((PageId(row.parse(0)?), row.field(1).to_string()))
    })
}

/// Reads unordered link pairs `(title, title)`.
pub fn read_link_pairs<R: Read>(input: R) -> impl Iterator<Item = Result<PairKey, Error>> {
    rows(input, 2).map(|row| {
        let row = row?;
        Ok(PairKey::new(row.field(0), row.field(1)))
    })
}

/// The positions of the fields of scored pair records.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredPairFields {
    pub title_a: usize,
    pub title_b: usize,
    pub id_a: usize,
    pub id_b: usize,
    pub score: usize,
}

impl ScoredPairFields {
    /// The fields of the score of the alpha at `alpha_index`, as written by
    /// [`write_scored_pairs`].
    pub fn with_alpha_index(alpha_index: usize) -> Self {
        Self {
            score: 5 + alpha_index,
            ..Self::default()
        }
    }

    fn expected(&self) -> usize {
        [self.title_a, self.title_b, self.id_a, self.id_b, self.score]
            .iter()
            .max()
            .map_or(0, |field| field + 1)
    }
}

impl Default for ScoredPairFields {
    fn default() -> Self {
        Self {
            title_a: 0,
            title_b: 1,
            id_a: 2,
            id_b: 3,
            score: 5,
        }
    }
}

/// Reads scored pairs as both directional recommendations `a -> b` and `b -> a`.
pub fn read_recommendations<R: Read>(
    input: R,
    fields: ScoredPairFields,
) -> impl Iterator<Item = Result<[Recommendation; 2], Error>> {
    rows(input, fields.expected()).map(move |row| {
        let row = row?;
        let title_a = row.field(fields.title_a).to_string();
        let title_b = row.field(fields.title_b).to_string();
        let id_a = row.id(fields.id_a)?;
        let id_b = row.id(fields.id_b)?;
        let score = row.parse(fields.score)?;

        Ok([
            Recommendation {
                source: title_a.clone(),
                target: title_b.clone(),
                score,
                source_id: id_a,
                target_id: id_b,
            },
            Recommendation {
                source: title_b,
                target: title_a,
                score,
                source_id: id_b,
                target_id: id_a,
            },
        ])
    })
}

/// Reads article statistics, the trailing out-links per word are ignored.
pub fn read_article_stats<R: Read>(input: R) -> impl Iterator<Item = Result<ArticleStats, Error>> {
    rows(input, 5).map(|row| {
        let row = row?;
        Ok(ArticleStats {
            title: row.field(0).to_string(),
            words: row.parse(1)?,
            headlines: row.parse(2)?,
            out_links: row.parse(3)?,
            avg_link_distance: row.parse(4)?,
        })
    })
}

/// Reads click stream rows `(prev_id, curr_id, n, prev_title, curr_title, type)`.
pub fn read_click_stream<R: Read>(input: R) -> impl Iterator<Item = Result<ClickStreamRow, Error>> {
    rows(input, 6).map(|row| {
        let row = row?;
        Ok(ClickStreamRow {
            prev_id: row.id(0)?,
            curr_id: row.id(1)?,
            clicks: row.parse(2)?,
            prev_title: row.field(3).to_string(),
            curr_title: row.field(4).to_string(),
            kind: row.field(5).to_string(),
        })
    })
}

/// Reads language links `(page_id, lang, title)`.
pub fn read_lang_links<R: Read>(input: R) -> impl Iterator<Item = Result<LangLinkRow, Error>> {
    rows(input, 3).map(|row| {
        let row = row?;
        Ok(LangLinkRow {
            page_id: PageId(row.parse(0)?),
            lang: row.field(1).to_string(),
            title: row.field(2).to_string(),
        })
    })
}

/// Reads "see also" gold records `(article, target|target|...)`.
pub fn read_see_also<R: Read>(input: R) -> impl Iterator<Item = Result<GoldRecord, Error>> {
    rows(input, 2).map(|row| {
        let row = row?;
        let targets = row
            .field(1)
            .split(LIST_DELIMITER)
            .filter(|target| !target.is_empty())
            .map(str::to_string);
        Ok(GoldRecord::from_targets(row.field(0), targets))
    })
}

fn format_id(id: Option<PageId>) -> String {
    id.map_or_else(|| NO_ID.to_string(), |id| id.to_string())
}

/// Writes scored pairs `(title_a, title_b, id_a, id_b, count, score...)` and returns the
/// number of written records.
pub fn write_scored_pairs<'a, W: Write>(
    output: W,
    pairs: impl IntoIterator<Item = &'a ScoredPair>,
) -> Result<usize, Error> {
    let mut writer = writer(output);
    let mut written = 0;
    for pair in pairs {
        let mut record = vec![
            pair.title_a().to_string(),
            pair.title_b().to_string(),
            format_id(pair.id_a),
            format_id(pair.id_b),
            pair.co_citation_count().to_string(),
        ];
        record.extend(pair.scores.iter().map(f64::to_string));
        writer.write_record(&record)?;
        written += 1;
    }
    writer.flush()?;

    Ok(written)
}

/// Writes recommendation sets as `(source, rank, target, score)`, ranks start at 1.
pub fn write_recommendation_sets<'a, W: Write>(
    output: W,
    sets: impl IntoIterator<Item = &'a RecommendationSet>,
) -> Result<usize, Error> {
    let mut writer = writer(output);
    let mut written = 0;
    for set in sets {
        for (rank, recommendation) in set.ranked.iter().enumerate() {
            writer.write_record(&[
                set.source.clone(),
                (rank + 1).to_string(),
                recommendation.target.clone(),
                recommendation.score.to_string(),
            ])?;
            written += 1;
        }
    }
    writer.flush()?;

    Ok(written)
}

/// Writes evaluation results as `(article, match_count..., mrr, recommendations_count,
/// impressions, total_clicks, clicks..., optimal_clicks)` with one match and click count
/// per cutoff.
pub fn write_evaluation_results<'a, W: Write>(
    output: W,
    results: impl IntoIterator<Item = &'a EvaluationResult>,
) -> Result<usize, Error> {
    let mut writer = writer(output);
    let mut written = 0;
    for result in results {
        let mut record = vec![result.article.clone()];
        record.extend(result.match_counts.iter().map(usize::to_string));
        record.push(result.mrr.to_string());
        record.push(result.recommendations_count.to_string());
        record.push(result.impressions.to_string());
        record.push(result.total_clicks.to_string());
        record.extend(result.clicks.iter().map(u64::to_string));
        record.push(result.optimal_clicks.to_string());
        writer.write_record(&record)?;
        written += 1;
    }
    writer.flush()?;

    Ok(written)
}

/// Writes the summary as one record `(articles, match_count..., mean_mrr,
/// recommendations_count, impressions, total_clicks, clicks..., optimal_clicks)`.
pub fn write_summary<W: Write>(output: W, summary: &EvaluationSummary) -> Result<(), Error> {
    let mut writer = writer(output);
    let mut record = vec![summary.articles.to_string()];
    record.extend(summary.match_counts.iter().map(usize::to_string));
    record.push(summary.mean_mrr().to_string());
    record.push(summary.recommendations_count.to_string());
    record.push(summary.impressions.to_string());
    record.push(summary.total_clicks.to_string());
    record.extend(summary.clicks.iter().map(u64::to_string));
    record.push(summary.optimal_clicks.to_string());
    writer.write_record(&record)?;
    writer.flush()?;

    Ok(())
}

/// Writes the top recommendations report as `(label, value)` records.
pub fn write_top_recommendations<W: Write>(output: W, top: &TopRecommendations) -> Result<(), Error> {
    let mut writer = writer(output);
    if let Some((title, count)) = &top.top {
        writer.write_record(&[title.clone(), count.to_string()])?;
    }
    writer.write_record(&["Distinct recommendations".to_string(), top.distinct.to_string()])?;
    writer.write_record(&["Article count".to_string(), top.articles.to_string()])?;
    writer.flush()?;

    Ok(())
}

/// Writes article statistics `(title, words, headlines, out_links, avg_link_distance,
/// out_links_per_word)`.
pub fn write_article_stats<'a, W: Write>(
    output: W,
    stats: impl IntoIterator<Item = &'a ArticleStats>,
) -> Result<usize, Error> {
    let mut writer = writer(output);
    let mut written = 0;
    for stats in stats {
        writer.write_record(&[
            stats.title.clone(),
            stats.words.to_string(),
            stats.headlines.to_string(),
            stats.out_links.to_string(),
            stats.avg_link_distance.to_string(),
            stats.out_links_per_word().to_string(),
        ])?;
        written += 1;
    }
    writer.flush()?;

    Ok(written)
}

/// Writes link graph entries `(article, first, second, distance)`.
pub fn write_link_graph<'a, W: Write>(
    output: W,
    entries: impl IntoIterator<Item = &'a LinkGraphEntry>,
) -> Result<usize, Error> {
    let mut writer = writer(output);
    let mut written = 0;
    for entry in entries {
        writer.write_record(&[
            entry.article.clone(),
            entry.first.clone(),
            entry.second.clone(),
            entry.distance.to_string(),
        ])?;
        written += 1;
    }
    writer.flush()?;

    Ok(written)
}
