use crate::period::Scale;
use thiserror::Error as ThisError;

/// Crate specific Errors implementation.
///
/// Every variant is a schedule parsing failure. [`Error::InvalidHourValue`] is the narrower
/// "range value" kind: the hour token was well-formed but its number doesn't fit its qualifier.
#[derive(Debug, ThisError, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Error {
    /// Unparsable text remains in the schedule expression.
    #[error("malformed schedule (at {position}: {rest:?})")]
    MalformedSchedule {
        /// Offset of the unparsed text inside the sub-expression.
        position: usize,
        /// Unparsed rest of the sub-expression.
        rest: String,
    },
    /// Value isn't a number or is outside of the scale's domain.
    #[error("invalid {scale} value: {value:?}")]
    InvalidValue {
        /// Scale of the value.
        scale: Scale,
        /// Offending value.
        value: String,
    },
    /// Unknown symbolic name of a weekday or a month.
    #[error("invalid {scale} value: {value:?} (expected one of: {expected})")]
    InvalidMnemonicValue {
        /// Scale of the value.
        scale: Scale,
        /// Offending value.
        value: String,
        /// Accepted names and numeric range.
        expected: String,
    },
    /// Hour value doesn't look like `digits[am|pm|noon]`.
    #[error("invalid hour range: {0:?}")]
    InvalidHourRange(String),
    /// Hour number is out of range for its qualifier.
    #[error("invalid hour value: {0:?}")]
    InvalidHourValue(String),
    /// Year ranges can't wrap around.
    #[error("no support for wrapped year ranges: {0:?}")]
    WrappedYearRange(String),
    /// Timestamp text can't be parsed.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

impl Error {
    /// Returns `true` for the range value error kind, i.e. a semantically invalid hour like `14pm` or `28`.
    pub fn is_range_value_error(&self) -> bool {
        matches!(self, Self::InvalidHourValue(_))
    }
}
