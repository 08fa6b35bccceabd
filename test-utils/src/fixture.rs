//! The single source of truth for all test data paths.

use std::{
    env::var_os,
    io::{Error, ErrorKind, Result},
    path::{Path, PathBuf},
};

pub const DATA_DIR: &str = "data";
pub const FIXTURES_DIR: &str = "fixtures";

/// Resolves the path to the requested data relative to the workspace directory.
pub fn resolve_path(path: &[impl AsRef<Path>]) -> Result<PathBuf> {
    let manifest = var_os("CARGO_MANIFEST_DIR")
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "missing CARGO_MANIFEST_DIR"))?;
    let workspace = PathBuf::from(manifest)
        .parent()
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "missing cargo workspace dir"))?
        .to_path_buf();

    path.iter()
        .fold(workspace, |path, component| path.join(component))
        .canonicalize()
}

/// Resolves the path to the requested fixture relative to the workspace directory.
pub fn resolve_fixture(name: &str) -> Result<PathBuf> {
    resolve_path(&[DATA_DIR, FIXTURES_DIR, name])
}

/// A small corpus of parsed articles as json lines.
pub fn documents() -> Result<PathBuf> {
    resolve_fixture("documents.jsonl")
}

/// Redirects of the corpus as `alias\ttarget` rows.
pub fn redirects() -> Result<PathBuf> {
    resolve_fixture("redirects.tsv")
}

/// A click stream of the corpus.
pub fn click_stream() -> Result<PathBuf> {
    resolve_fixture("clickstream.tsv")
}

/// "See also" lists of the corpus.
pub fn see_also() -> Result<PathBuf> {
    resolve_fixture("see_also.tsv")
}

pub fn article_stats() -> Result<PathBuf> {
    resolve_fixture("article_stats.tsv")
}

pub fn lang_links() -> Result<PathBuf> {
    resolve_fixture("langlinks.tsv")
}

pub fn id_titles() -> Result<PathBuf> {
    resolve_fixture("id_titles.tsv")
}
