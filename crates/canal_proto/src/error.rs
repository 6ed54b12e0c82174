//! Error types for the wire schema crate.

use thiserror::Error;

/// Result type for wire schema operations.
pub type ProtoResult<T> = Result<T, ProtoError>;

/// Errors that can occur while encoding or decoding Canal messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// Failed to encode a message.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode protobuf bytes.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// The packet carries something other than a message collection.
    #[error("unexpected packet type: expected {expected}, got {actual}")]
    UnexpectedPacketType {
        /// Expected packet type code.
        expected: i32,
        /// Actual packet type code.
        actual: i32,
    },

    /// The packet version is not one this crate understands.
    #[error("unsupported packet version: {version}")]
    UnsupportedVersion {
        /// Version found on the packet.
        version: i32,
    },
}

impl ProtoError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }
}

impl From<prost::DecodeError> for ProtoError {
    fn from(e: prost::DecodeError) -> Self {
        Self::decoding_failed(e.to_string())
    }
}

impl From<prost::EncodeError> for ProtoError {
    fn from(e: prost::EncodeError) -> Self {
        Self::encoding_failed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn error_display() {
        let err = ProtoError::encoding_failed("buffer too small");
        assert_eq!(err.to_string(), "encoding failed: buffer too small");

        let err = ProtoError::UnexpectedPacketType {
            expected: 7,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "unexpected packet type: expected 7, got 1"
        );

        let err = ProtoError::UnsupportedVersion { version: 9 };
        assert_eq!(err.to_string(), "unsupported packet version: 9");
    }

    #[test]
    fn from_prost_decode_error() {
        // A length-delimited field whose length runs past the end of input.
        let err = crate::Messages::decode(&[0x12, 0x05, 0x01][..]).unwrap_err();
        let err = ProtoError::from(err);
        assert!(matches!(err, ProtoError::DecodingFailed { .. }));
    }

    #[test]
    fn from_prost_encode_error() {
        let messages = crate::Messages {
            batch_id: 0,
            messages: vec![vec![1, 2, 3]],
        };
        let mut storage = [0u8; 2];
        let mut buf: &mut [u8] = &mut storage;
        let err = ProtoError::from(messages.encode(&mut buf).unwrap_err());
        assert!(matches!(err, ProtoError::EncodingFailed { .. }));
    }
}
