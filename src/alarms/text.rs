//! # Bounded alarm message text.
//!
//! [`AlarmText`] holds at most [`AlarmText::MAX_BYTES`] bytes of UTF-8. Longer
//! input is truncated at the last character boundary that fits, so the same
//! input always yields the same stored text.

use std::fmt;

/// Message carried by a create request (≤ 64 bytes).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct AlarmText(String);

impl AlarmText {
    /// Maximum stored length in bytes.
    pub const MAX_BYTES: usize = 64;

    /// Builds a text value, truncating to [`Self::MAX_BYTES`].
    pub fn new(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        let mut end = text.len().min(Self::MAX_BYTES);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        Self(text[..end].to_string())
    }

    /// Returns the stored text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stored length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AlarmText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AlarmText {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AlarmText {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
