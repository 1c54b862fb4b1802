//! Persisted slot names.

use core::fmt;
use core::str::FromStr;

/// Errors that can occur when parsing a [`SlotName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// The input string is empty.
    #[error("slot name cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slot name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9_-]`.
    #[error("slot name contains invalid character {0:?}")]
    InvalidChar(char),
}

/// Name of the key-value slot holding a serialized cart.
///
/// Slot names double as file stems for [`FileStorage`](crate::FileStorage),
/// so they are restricted to ASCII letters, digits, `-`, and `_`.
///
/// ```
/// use boutique_cart::SlotName;
///
/// assert!(SlotName::parse("cart").is_ok());
/// assert!(SlotName::parse("guest-cart_2").is_ok());
/// assert!(SlotName::parse("").is_err());
/// assert!(SlotName::parse("../etc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotName(String);

impl SlotName {
    /// Maximum length of a slot name.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `SlotName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than
    /// [`MAX_LENGTH`](Self::MAX_LENGTH), or contains a character other than an
    /// ASCII letter, digit, `-`, or `_`.
    pub fn parse(s: &str) -> Result<Self, SlotError> {
        if s.is_empty() {
            return Err(SlotError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlotError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(SlotError::InvalidChar(c));
        }

        Ok(Self(s.to_string()))
    }

    /// Returns the slot name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SlotName {
    fn default() -> Self {
        Self(crate::DEFAULT_SLOT.to_string())
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SlotName {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for SlotName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
