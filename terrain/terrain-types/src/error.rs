//! Error types for request validation.

use thiserror::Error;

/// Result type for request validation.
pub type RequestResult<T> = Result<T, RequestError>;

/// Errors raised while validating a generation request.
///
/// These are always reported before any network activity starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// A coordinate is NaN or infinite.
    #[error("bounds must be finite: {field} = {value}")]
    NonFiniteBound {
        /// Name of the offending bound.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// North is not strictly greater than south.
    #[error("north ({north}) must be greater than south ({south})")]
    LatitudeOrder {
        /// Northern bound.
        north: f64,
        /// Southern bound.
        south: f64,
    },

    /// East is not strictly greater than west.
    #[error("east ({east}) must be greater than west ({west})")]
    LongitudeOrder {
        /// Eastern bound.
        east: f64,
        /// Western bound.
        west: f64,
    },

    /// A bound lies outside the valid geographic range.
    #[error("{field} = {value} is outside [{min}, {max}]")]
    BoundOutOfRange {
        /// Name of the offending bound.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Lowest accepted value.
        min: f64,
        /// Highest accepted value.
        max: f64,
    },

    /// A numeric parameter lies outside its accepted range.
    #[error("{field} = {value} is outside [{min}, {max}]")]
    ParameterOutOfRange {
        /// Name of the offending parameter.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Lowest accepted value.
        min: f64,
        /// Highest accepted value.
        max: f64,
    },

    /// An enumerated parameter has an unknown value.
    #[error("unknown {field}: {value:?}")]
    UnknownVariant {
        /// Name of the offending parameter.
        field: &'static str,
        /// The rejected text.
        value: String,
    },
}

impl RequestError {
    pub(crate) fn parameter(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::ParameterOutOfRange {
            field,
            value,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_field() {
        let err = RequestError::parameter("exaggeration", 9.0, 0.5, 5.0);
        assert!(format!("{err}").contains("exaggeration"));

        let err = RequestError::LatitudeOrder {
            north: 1.0,
            south: 2.0,
        };
        assert!(format!("{err}").contains("north"));
    }
}
