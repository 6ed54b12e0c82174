//! Encoder configuration.

/// Default number of rows per batch before [`is_full`] reports true.
///
/// [`is_full`]: crate::EventBatchEncoder::is_full
pub const DEFAULT_MAX_BATCH_SIZE: usize = 16;

/// Default character encoding announced in entry headers.
pub const DEFAULT_SERVER_ENCODING: &str = "UTF-8";

/// Configuration shared by every encoder an [`EncoderBuilder`] produces.
///
/// [`EncoderBuilder`]: crate::EncoderBuilder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Row count at which a batch is considered full.
    pub max_batch_size: usize,

    /// Initial capacity of the retained packet body buffer.
    pub body_capacity: usize,

    /// Encoding written to `Header.serverenCode`.
    pub server_encoding: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            body_capacity: 0,
            server_encoding: DEFAULT_SERVER_ENCODING.to_string(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size hint. Zero is clamped to one.
    #[must_use]
    pub const fn max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = if size == 0 { 1 } else { size };
        self
    }

    /// Sets the initial body buffer capacity.
    #[must_use]
    pub const fn body_capacity(mut self, capacity: usize) -> Self {
        self.body_capacity = capacity;
        self
    }

    /// Sets the server encoding announced in headers.
    #[must_use]
    pub fn server_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.server_encoding = encoding.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.max_batch_size, 16);
        assert_eq!(config.body_capacity, 0);
        assert_eq!(config.server_encoding, "UTF-8");
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .max_batch_size(128)
            .body_capacity(4096)
            .server_encoding("GBK");

        assert_eq!(config.max_batch_size, 128);
        assert_eq!(config.body_capacity, 4096);
        assert_eq!(config.server_encoding, "GBK");
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        assert_eq!(Config::new().max_batch_size(0).max_batch_size, 1);
    }
}
