//! VARCHAR2 values

use crate::{Result, Error, err::codes};

/// A length-limited string buffer.
///
/// Mirrors the sizing discipline of VARCHAR2 host buffers: the declared
/// size is a hard ceiling and overflowing it is a numeric-or-value error,
/// not a silent truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varchar {
    text: String,
    size: usize,
}

impl Varchar {
    /// Creates a `Varchar` sized to its initial content.
    pub fn from(text: &str) -> Self {
        Self { text: text.to_string(), size: text.len() }
    }

    /// Creates an empty `Varchar` with the specified maximum byte size.
    pub fn with_capacity(size: usize) -> Self {
        Self { text: String::new(), size }
    }

    /// Replaces the content. The new text must fit into the declared size.
    pub fn set(&mut self, text: &str) -> Result<()> {
        if text.len() > self.size {
            return Err( Error::db(codes::VALUE_ERROR, "numeric or value error: character string buffer too small") );
        }
        self.text.clear();
        self.text.push_str(text);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl std::fmt::Display for Varchar {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_is_value_error() {
        let mut txt = Varchar::with_capacity(2);
        txt.set("OK").expect("fits exactly");
        let err = txt.set("three").unwrap_err();
        assert_eq!(err.code(), Some(6502));
        // content survives the failed set
        assert_eq!(txt.as_str(), "OK");
    }
}
