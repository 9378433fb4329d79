use std::{io, str::Utf8Error};

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The source document could not be parsed. Fatal for the whole run.
    #[error("malformed document: {message}")]
    MalformedDocument { message: String },

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("could not write output: {message}")]
    Output { message: String },
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedDocument {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        Error::Output {
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(value: quick_xml::Error) -> Self {
        match value {
            quick_xml::Error::Io(err) => Error::Io(io::Error::new(err.kind(), err.to_string())),
            other => Error::malformed(other.to_string()),
        }
    }
}

impl From<AttrError> for Error {
    fn from(value: AttrError) -> Self {
        Error::malformed(value.to_string())
    }
}

impl From<Utf8Error> for Error {
    fn from(value: Utf8Error) -> Self {
        Error::malformed(value.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::output(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::output(value.to_string())
    }
}

/// A primary-element attribute that was absent or could not be parsed.
///
/// Not an error of the run: the extractor recovers from it according to the
/// configured [`MissingAttributePolicy`](crate::config::MissingAttributePolicy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAttribute {
    pub attribute: &'static str,
    pub raw: Option<String>,
}

pub type Result<T> = std::result::Result<T, Error>;
