//! Configuration structures and constants for the mediascan-core library.
//!
//! `CoreConfig` carries everything the readers and the hardware probe need
//! from the host: where ffmpeg lives, how long a single tool run may take, and
//! the narrowly scoped retry policy for encoder families that are known to
//! fail their first trial encode.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

// Default constants

/// Executable name looked up on `PATH` when no explicit ffmpeg path is given.
pub const DEFAULT_TOOL_NAME: &str = "ffmpeg";

/// Delay before the single retry of a flagged encoder family.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Trial-parameter substrings identifying encoder families that report a
/// false negative on a cold first invocation (AMD AMF).
pub const DEFAULT_TRANSIENT_FAMILY_TAGS: &[&str] = &["amf"];

/// Main configuration structure for the mediascan-core library.
///
/// # Examples
///
/// ```rust
/// use mediascan_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
/// use std::time::Duration;
///
/// let config = CoreConfigBuilder::new()
///     .ffmpeg_path(PathBuf::from("/usr/bin/ffmpeg"))
///     .tool_timeout(Duration::from_secs(30))
///     .retry_delay(Duration::from_millis(500))
///     .build();
/// assert_eq!(config.transient_family_tags, vec!["amf".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Explicit ffmpeg executable. `None` means look up `ffmpeg` on `PATH`.
    pub ffmpeg_path: Option<PathBuf>,

    /// Upper bound for a single tool invocation. `None` waits indefinitely.
    pub tool_timeout: Option<Duration>,

    /// Blocking wait between the first and second trial encode of a flagged family.
    pub retry_delay: Duration,

    /// Substrings of trial parameters that mark an encoder as retry-once.
    pub transient_family_tags: Vec<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            tool_timeout: None,
            retry_delay: DEFAULT_RETRY_DELAY,
            transient_family_tags: DEFAULT_TRANSIENT_FAMILY_TAGS
                .iter()
                .map(|tag| (*tag).to_string())
                .collect(),
        }
    }
}

impl CoreConfig {
    /// Validates the configuration.
    ///
    /// An empty family tag would match every trial parameter and turn the
    /// one-family retry into a universal one, so it is rejected.
    pub fn validate(&self) -> CoreResult<()> {
        if self.transient_family_tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(CoreError::Config(
                "transient family tags must not be empty".to_string(),
            ));
        }
        if let Some(timeout) = self.tool_timeout {
            if timeout.is_zero() {
                return Err(CoreError::Config("tool timeout must be non-zero".to_string()));
            }
        }
        Ok(())
    }
}

/// Builder for creating [`CoreConfig`] instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a builder populated with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.config.ffmpeg_path = Some(path);
        self
    }

    #[must_use]
    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.config.tool_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Replaces the transient family tags.
    #[must_use]
    pub fn transient_family_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.transient_family_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
