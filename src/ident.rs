//! Bounded text identifiers stored in fixed-width, NUL-terminated header fields.

use std::fmt;

use serde::Serialize;

use crate::error::{RawAccelError, Result};

/// A text identifier that fits an `N`-byte on-disk field.
///
/// At most `N - 1` bytes of text are kept so the field always ends with a NUL
/// byte. Use [`Identifier::try_new`] to reject oversized values or
/// [`Identifier::truncating`] to cut them at the last char boundary that fits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Identifier<const N: usize> {
    value: String,
}

impl<const N: usize> Identifier<N> {
    /// Largest number of text bytes the field can hold.
    pub const MAX_LEN: usize = N - 1;

    /// Creates an identifier, failing if `value` does not fit.
    pub fn try_new(value: &str) -> Result<Self> {
        if value.len() > Self::MAX_LEN {
            return Err(RawAccelError::IdentifierTooLong {
                max: Self::MAX_LEN,
                actual: value.len(),
            });
        }
        Ok(Self {
            value: value.to_string(),
        })
    }

    /// Creates an identifier, dropping trailing characters that do not fit.
    pub fn truncating(value: &str) -> Self {
        let mut end = value.len().min(Self::MAX_LEN);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        Self {
            value: value[..end].to_string(),
        }
    }

    /// Decodes a field, stopping at the first NUL. Invalid UTF-8 is replaced.
    ///
    /// A field with no NUL keeps only its first `N - 1` bytes, so encoding the
    /// result again yields a terminated field rather than the original bytes.
    pub fn from_field(field: &[u8; N]) -> Self {
        let end = field.iter().position(|&b| b == 0).unwrap_or(N);
        Self::truncating(&String::from_utf8_lossy(&field[..end]))
    }

    /// Encodes the identifier into a zero-padded field.
    pub fn to_field(&self) -> [u8; N] {
        let mut field = [0u8; N];
        field[..self.value.len()].copy_from_slice(self.value.as_bytes());
        field
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<const N: usize> fmt::Display for Identifier<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.value)
    }
}
