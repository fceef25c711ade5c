use super::Document;
use camino::Utf8Path;
use core::fmt::{Display, Formatter};
use serde::Deserialize;
use std::fs;
use std::io;

const LOG_TARGET: &str = " documents";

/// Why a document source could not be loaded.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io(io::Error),

    /// The content is not well-formed YAML.
    Parse(serde_yaml::Error),

    /// The content is well-formed but is not usable as a document.
    Shape(String),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "could not read file: {e}"),
            Self::Parse(e) => write!(f, "malformed YAML: {e}"),
            Self::Shape(msg) => write!(f, "unusable document: {msg}"),
        }
    }
}

impl core::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Shape(_) => None,
        }
    }
}

/// Decode every document in a YAML stream.
///
/// A stream of only blank lines and comments holds no documents. Otherwise every document counts,
/// and an empty one (such as the one after a trailing `---`) becomes an empty document. The batch
/// is all-or-nothing: the first malformed document fails the whole call.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] for malformed YAML and [`LoadError::Shape`] for documents that are not mappings.
pub fn load_multi_document(bytes: &[u8]) -> Result<Vec<Document>, LoadError> {
    if !has_content(bytes) {
        return Ok(Vec::new());
    }

    serde_yaml::Deserializer::from_slice(bytes)
        .map(|deserializer| {
            let value = serde_yaml::Value::deserialize(deserializer).map_err(LoadError::Parse)?;
            if value.is_null() {
                Ok(Document::empty())
            } else {
                Document::from_yaml(value)
            }
        })
        .collect()
}

/// Decode only the first document in a YAML stream.
///
/// Whatever follows the first document is never decoded, so it cannot cause an error.
///
/// # Errors
///
/// Returns [`LoadError::Shape`] if the stream holds no document at all or the first document is not a mapping,
/// and [`LoadError::Parse`] if the first document is malformed.
pub fn load_single_document(bytes: &[u8]) -> Result<Document, LoadError> {
    let no_document = || LoadError::Shape("the stream contains no document".to_string());
    if !has_content(bytes) {
        return Err(no_document());
    }

    let deserializer = serde_yaml::Deserializer::from_slice(bytes).next().ok_or_else(no_document)?;

    let value = serde_yaml::Value::deserialize(deserializer).map_err(LoadError::Parse)?;
    if value.is_null() {
        return Ok(Document::empty());
    }

    Document::from_yaml(value)
}

/// Read a file and decode every document in it.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, otherwise as [`load_multi_document`].
pub fn read_multi_document(path: &Utf8Path) -> Result<Vec<Document>, LoadError> {
    let bytes = read_file(path)?;
    let documents = load_multi_document(&bytes)?;
    log::debug!(target: LOG_TARGET, "Loaded {} document(s) from '{path}'", documents.len());
    Ok(documents)
}

/// Read a file and decode its first document.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, otherwise as [`load_single_document`].
pub fn read_single_document(path: &Utf8Path) -> Result<Document, LoadError> {
    let bytes = read_file(path)?;
    let document = load_single_document(&bytes)?;
    log::debug!(target: LOG_TARGET, "Loaded a document with {} field(s) from '{path}'", document.len());
    Ok(document)
}

fn read_file(path: &Utf8Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(LoadError::Io)
}

/// Whether a stream has anything besides blank lines and comments.
///
/// The YAML parser reports a single null document for such a stream, which would be
/// indistinguishable from an explicit empty document.
fn has_content(bytes: &[u8]) -> bool {
    bytes.split(|b| *b == b'\n').any(|line| {
        let line = line.trim_ascii();
        !line.is_empty() && !line.starts_with(b"#")
    })
}
