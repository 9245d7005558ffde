use std::io;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Crate-wide error type.
///
/// Fatal parse failures come in two distinguishable kinds: [`Error::Xml`] and
/// [`Error::Attr`] for malformed input the XML reader could not process, and
/// [`Error::Structure`] / [`Error::MissingAttribute`] / [`Error::InvalidAttribute`]
/// for well-formed documents that break the OSM or GPX element rules.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML attribute: {0}")]
    Attr(#[from] AttrError),

    #[error("{0}")]
    Structure(String),

    #[error("missing attribute `{name}` on <{element}>")]
    MissingAttribute {
        element: &'static str,
        name: &'static str,
    },

    #[error("invalid value {value:?} for attribute `{name}` on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        name: &'static str,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP request failed: {0}")]
    Http(Box<ureq::Error>),

    #[error("could not read config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("could not serialize GPX: {0}")]
    Serialize(#[from] quick_xml::DeError),
}

impl Error {
    /// True for the syntax-level kinds, i.e. input the XML reader itself
    /// rejected. Structural violations of the element rules return false.
    pub fn is_malformed_xml(&self) -> bool {
        matches!(self, Error::Xml(_) | Error::Attr(_))
    }
}

impl From<ureq::Error> for Error {
    fn from(value: ureq::Error) -> Self {
        Error::Http(Box::new(value))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
