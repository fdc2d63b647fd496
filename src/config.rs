//! Run configuration supplied by the CLI.

use std::path::PathBuf;
use std::time::Duration;

/// Default pause between sibling entries and between retries.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Settings shared by the tree walker and the transfer engine.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use mailru_dl::MirrorConfig;
///
/// let config = MirrorConfig {
///     work_dir: "downloads".into(),
///     delay: Duration::from_secs(2),
///     ..MirrorConfig::default()
/// };
/// assert!(config.retry);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Local root the remote tree is recreated under.
    pub work_dir: PathBuf,
    /// Pause after every processed child and before every retry.
    pub delay: Duration,
    /// Root each link under `<work_dir>/<owner>/<resource>`.
    pub prefix: bool,
    /// Re-download files whose written size differs from the listed size.
    pub retry: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            delay: DEFAULT_WAIT,
            prefix: false,
            retry: true,
        }
    }
}
