use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use indicatif::{ProgressBar, ProgressStyle};

use citolytics::{
    io::{self, read_documents},
    Document,
};

pub(crate) fn progress_spin_until_done<R>(msg: &'static str, func: impl FnOnce() -> R) -> R {
    let progress_bar = ProgressBar::new_spinner()
        .with_style(ProgressStyle::default_bar().template("{msg}: {elapsed:>10} {spinner:.green}"));
    progress_bar.set_message(msg);
    progress_bar.enable_steady_tick(100);
    let res = func();
    progress_bar.finish();
    res
}

pub(crate) fn open(path: &Path) -> Result<BufReader<File>, Error> {
    File::open(path)
        .map(BufReader::new)
        .with_context(|| format!("Opening {:?} failed.", path))
}

pub(crate) fn create(path: &Path) -> Result<BufWriter<File>, Error> {
    File::create(path)
        .map(BufWriter::new)
        .with_context(|| format!("Creating {:?} failed.", path))
}

/// Reads all records of a fallible reader, the first invalid record aborts.
pub(crate) fn read_all<T, E>(
    path: &Path,
    read: impl FnOnce(BufReader<File>) -> Result<T, E>,
) -> Result<T, Error>
where
    E: std::error::Error + Send + Sync + 'static,
{
    read(open(path)?).with_context(|| format!("Reading {:?} failed.", path))
}

/// Documents read lazily from a file.
///
/// Reading stops at the first invalid document, which is reported by [`Self::finish()`].
pub(crate) struct Documents<I> {
    path: PathBuf,
    documents: I,
    error: Option<io::Error>,
}

pub(crate) fn read_documents_lazily(
    path: &Path,
) -> Result<Documents<impl Iterator<Item = Result<Document, io::Error>> + Send>, Error> {
    Ok(Documents {
        path: path.to_path_buf(),
        documents: read_documents(open(path)?),
        error: None,
    })
}

impl<I> Iterator for Documents<I>
where
    I: Iterator<Item = Result<Document, io::Error>>,
{
    type Item = Document;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error.is_some() {
            return None;
        }
        match self.documents.next()? {
            Ok(document) => Some(document),
            Err(error) => {
                self.error = Some(error);
                None
            }
        }
    }
}

impl<I> Documents<I> {
    /// Fails if reading stopped early at an invalid document.
    pub(crate) fn finish(self) -> Result<(), Error> {
        match self.error {
            Some(error) => {
                Err(Error::new(error).context(format!("Reading {:?} failed.", self.path)))
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{env::temp_dir, fs};

    use super::*;

    /// Reads all rows of a delimited output file.
    pub(crate) fn read_rows(path: &Path) -> Vec<Vec<String>> {
        io::reader(File::open(path).unwrap())
            .records()
            .map(|record| record.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_documents_stop_at_invalid_line() {
        let path = temp_dir().join("citolytics_invalid_documents.jsonl");
        fs::write(
            &path,
            "{\"title\":\"A\",\"links\":[]}\nnot json\n{\"title\":\"B\",\"links\":[]}\n",
        )
        .unwrap();

        let mut documents = read_documents_lazily(&path).unwrap();
        let titles = (&mut documents)
            .map(|document| document.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, ["A"]);
        assert!(documents.finish().is_err());
    }
}
