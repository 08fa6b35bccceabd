use displaydoc::Display;
use thiserror::Error;

use crate::{config, io, recommend::cpi};

#[derive(Error, Debug, Display)]
pub enum Error {
    /// Invalid configuration: {0}
    Config(#[from] config::Error),
    /// Reading or writing records failed: {0}
    Io(#[from] io::Error),
    /// Invalid popularity index expression: {0}
    Cpi(#[from] cpi::Error),
}
