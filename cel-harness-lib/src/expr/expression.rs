//! Expression sources and the expression file format

use crate::Result;
use camino::Utf8Path;
use ohno::IntoAppError;
use serde::Serialize;
use std::fs;

/// Separator between expressions in an expression file.
pub const DEFAULT_DELIMITER: &str = "---";

/// One expression source string and its 1-based position in the expression file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expression {
    ordinal: usize,

    #[serde(rename = "expression")]
    source: String,
}

impl Expression {
    #[must_use]
    pub const fn new(ordinal: usize, source: String) -> Self {
        Self { ordinal, source }
    }

    /// Position in the raw expression file, counting empty entries.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether this entry was blank after trimming; blank entries are never compiled.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// The first `max_chars` characters of the source, with an ellipsis appended.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.source.chars().take(max_chars).collect();
        preview.push_str("...");
        preview
    }
}

/// The ordered contents of an expression file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionSet {
    expressions: Vec<Expression>,
}

impl ExpressionSet {
    /// Split text into expressions, keeping blank entries so that ordinals match the file.
    #[must_use]
    pub fn parse(text: &str, delimiter: &str) -> Self {
        let expressions = split_expressions(text, delimiter)
            .into_iter()
            .enumerate()
            .map(|(index, source)| Expression::new(index + 1, source))
            .collect();

        Self { expressions }
    }

    /// Read and split an expression file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    pub fn read(path: &Utf8Path, delimiter: &str) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading expression file '{path}'"))?;
        Ok(Self::parse(&text, delimiter))
    }

    /// The entries that will actually be compiled.
    pub fn non_empty(&self) -> impl Iterator<Item = &Expression> {
        self.expressions.iter().filter(|expr| !expr.is_empty())
    }

    /// Number of entries, blank ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    #[must_use]
    pub fn non_empty_count(&self) -> usize {
        self.non_empty().count()
    }
}

/// Trim the text, split it on `delimiter`, and trim each piece.
///
/// Blank pieces are returned as empty strings rather than dropped. An empty delimiter leaves the
/// trimmed text as a single piece.
#[must_use]
pub fn split_expressions(text: &str, delimiter: &str) -> Vec<String> {
    let text = text.trim();
    if delimiter.is_empty() {
        return vec![text.to_string()];
    }

    text.split(delimiter).map(|piece| piece.trim().to_string()).collect()
}
