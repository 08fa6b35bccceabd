use std::{fs::File, io::BufReader, path::PathBuf};

use crate::data::document::{Document, Link};

/// Creates an article whose words start at every character offset up to the last link.
///
/// The word position of a link is hence its offset.
pub(crate) fn document(title: &str, links: &[(&str, usize)]) -> Document {
    let words = links.iter().map(|&(_, offset)| offset).max().map_or(0, |max| max + 1);

    Document {
        links: links
            .iter()
            .map(|&(target, offset)| Link::new(target, offset))
            .collect(),
        word_offsets: (0..words).collect(),
        ..Document::new(title)
    }
}

/// Opens a fixture for reading.
pub(crate) fn read_fixture(path: std::io::Result<PathBuf>) -> BufReader<File> {
    BufReader::new(File::open(path.unwrap()).unwrap())
}
