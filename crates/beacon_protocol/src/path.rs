//! Structured configuration paths.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of segments in a well-formed config path.
const SEGMENT_COUNT: usize = 5;

/// Fixed trailing literal required by the wire format.
const TRAILING_LITERAL: &str = "config";

/// Errors produced when parsing a [`ConfigPath`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The path does not split into exactly five segments.
    #[error("invalid config path '{raw}': expected <scope>/<org_id>/<product>/<config_id>/config")]
    SegmentCount {
        /// The offending path string.
        raw: String,
    },

    /// The trailing literal is not `config`.
    #[error("invalid config path '{raw}': missing trailing 'config' literal")]
    TrailingLiteral {
        /// The offending path string.
        raw: String,
    },

    /// A segment is empty.
    #[error("invalid config path '{raw}': empty segment")]
    EmptySegment {
        /// The offending path string.
        raw: String,
    },

    /// A segment contains a character outside the allowed set.
    #[error("invalid config path '{raw}': segment '{segment}' contains invalid characters")]
    InvalidSegment {
        /// The offending path string.
        raw: String,
        /// The segment that failed validation.
        segment: String,
    },

    /// The organization id segment is not a decimal number.
    #[error("invalid config path '{raw}': organization id '{segment}' is not numeric")]
    InvalidOrgId {
        /// The offending path string.
        raw: String,
        /// The segment that failed validation.
        segment: String,
    },
}

/// The structured key identifying one configuration artifact.
///
/// Wire shape: `<scope>/<org_id>/<product>/<config_id>/config`. Parsing is
/// strict: segment count, the trailing literal, the numeric organization id
/// and the per-segment character set are all validated up front, and no
/// normalization is applied beyond that. Equal input strings parse to equal
/// values, so `ConfigPath` is usable as a map key throughout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigPath {
    scope: String,
    org_id: String,
    product: String,
    config_id: String,
}

impl ConfigPath {
    /// Parses a config path from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] naming the offending string when the input
    /// deviates from the wire shape in any way. Input is never partially
    /// accepted.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let segments: Vec<&str> = raw.split('/').collect();
        if segments.len() != SEGMENT_COUNT {
            return Err(ParseError::SegmentCount { raw: raw.into() });
        }

        for segment in &segments {
            if segment.is_empty() {
                return Err(ParseError::EmptySegment { raw: raw.into() });
            }
            if !segment
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
            {
                return Err(ParseError::InvalidSegment {
                    raw: raw.into(),
                    segment: (*segment).into(),
                });
            }
        }

        if segments[4] != TRAILING_LITERAL {
            return Err(ParseError::TrailingLiteral { raw: raw.into() });
        }

        if !segments[1].bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidOrgId {
                raw: raw.into(),
                segment: segments[1].into(),
            });
        }

        Ok(Self {
            scope: segments[0].into(),
            org_id: segments[1].into(),
            product: segments[2].into(),
            config_id: segments[3].into(),
        })
    }

    /// Returns the scope segment.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns the organization id segment, verbatim as parsed.
    #[must_use]
    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// Returns the product segment.
    #[must_use]
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Returns the config id segment.
    #[must_use]
    pub fn config_id(&self) -> &str {
        &self.config_id
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.scope, self.org_id, self.product, self.config_id, TRAILING_LITERAL
        )
    }
}

impl FromStr for ConfigPath {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}
