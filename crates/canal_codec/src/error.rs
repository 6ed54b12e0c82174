//! Error types for the encoder crate.

use thiserror::Error;

/// Result type for encoder operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while turning change events into Canal packets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The entry builder could not interpret the event.
    #[error("conversion failed: {message}")]
    ConversionFailed {
        /// Description of the conversion error.
        message: String,
    },

    /// A valid structure could not be serialized.
    #[error("canal encode failed: {message}")]
    EncodeFailed {
        /// Description of the serialization error.
        message: String,
    },

    /// Wire schema error.
    #[error("proto error: {0}")]
    Proto(#[from] canal_proto::ProtoError),
}

impl CodecError {
    /// Creates a conversion failed error.
    pub fn conversion_failed(message: impl Into<String>) -> Self {
        Self::ConversionFailed {
            message: message.into(),
        }
    }

    /// Creates an encode failed error.
    pub fn encode_failed(message: impl Into<String>) -> Self {
        Self::EncodeFailed {
            message: message.into(),
        }
    }

    /// Returns true if the event itself was at fault.
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::ConversionFailed { .. })
    }
}

impl From<prost::EncodeError> for CodecError {
    fn from(e: prost::EncodeError) -> Self {
        Self::encode_failed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CodecError::conversion_failed("unsupported column");
        assert_eq!(err.to_string(), "conversion failed: unsupported column");
        assert!(err.is_conversion());

        let err = CodecError::encode_failed("buffer too small");
        assert_eq!(err.to_string(), "canal encode failed: buffer too small");
        assert!(!err.is_conversion());
    }

    #[test]
    fn wraps_proto_errors() {
        let err: CodecError = canal_proto::ProtoError::decoding_failed("eof").into();
        assert_eq!(err.to_string(), "proto error: decoding failed: eof");
    }
}
