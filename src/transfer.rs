//! Per-file download with size verification and retry.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use tokio::fs::{self, File};
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::{MirrorError, Result};

/// How a single file ended up on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The body was written and matched the listed size.
    Downloaded { bytes: u64 },
    /// A local copy with the remote length was already present.
    AlreadyPresent { bytes: u64 },
    /// The written size differs from the listed size and retry is disabled.
    Mismatched { written: u64, declared: u64 },
}

/// Outcome of a transfer plus the number of restarts it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    pub outcome: TransferOutcome,
    pub retries: u32,
}

/// States of a single file transfer.
///
/// Any error leaves the machine immediately through `?`; there is no
/// recoverable failure state.
#[derive(Debug)]
enum TransferState {
    /// HEAD the remote file to learn its current length.
    Probing,
    /// Compare an existing local copy against the remote length.
    Resolving { remote_len: Option<u64> },
    /// Create the destination and stream the body into it.
    Transferring,
    /// Check the written size against the size the listing declared.
    Verifying { written: u64 },
    Done(TransferOutcome),
}

/// Downloads single files from a dispatcher-provided base URL.
pub struct TransferEngine<'a> {
    client: &'a ApiClient,
    delay: Duration,
    retry: bool,
}

impl<'a> TransferEngine<'a> {
    /// Create a new TransferEngine.
    ///
    /// # Arguments
    /// * `client` - Client used for the HEAD probe and the body stream
    /// * `delay` - Pause before each retry
    /// * `retry` - Restart the transfer when the written size is wrong
    pub fn new(client: &'a ApiClient, delay: Duration, retry: bool) -> Self {
        Self {
            client,
            delay,
            retry,
        }
    }

    /// Download `<base_url>/<weblink>` to `destination`.
    ///
    /// Only `declared_size` (the size reported by the folder listing) decides
    /// whether a transfer succeeded. With retry enabled, a mismatch restarts
    /// from the HEAD probe with no upper bound on attempts.
    pub async fn download(
        &self,
        destination: &Path,
        base_url: &str,
        weblink: &str,
        declared_size: u64,
    ) -> Result<TransferReport> {
        let url = format!("{}/{}", base_url, weblink);
        let mut retries = 0u32;
        let mut state = TransferState::Probing;

        loop {
            state = match state {
                TransferState::Probing => {
                    debug!(weblink, destination = ?destination, "probing");
                    let remote_len = self.client.content_length(&url).await?;
                    TransferState::Resolving { remote_len }
                }

                TransferState::Resolving { remote_len } => {
                    match fs::metadata(destination).await {
                        Ok(local) => {
                            let local_len = local.len();
                            debug!(
                                "loc: {} | rem: {} | con: {:?}",
                                local_len, declared_size, remote_len
                            );
                            if Some(local_len) == remote_len {
                                info!(
                                    "File {:?} already downloaded. Local: {} Remote: {}",
                                    destination, local_len, declared_size
                                );
                                TransferState::Done(TransferOutcome::AlreadyPresent {
                                    bytes: local_len,
                                })
                            } else {
                                fs::remove_file(destination).await?;
                                TransferState::Transferring
                            }
                        }
                        Err(e) if e.kind() == ErrorKind::NotFound => {
                            debug!("{:?} not present locally", destination);
                            TransferState::Transferring
                        }
                        Err(e) => return Err(e.into()),
                    }
                }

                TransferState::Transferring => {
                    let mut file = File::create(destination).await.map_err(|source| {
                        MirrorError::CreateFileError {
                            path: destination.to_path_buf(),
                            source,
                        }
                    })?;
                    let written = self.client.download_to(&url, &mut file).await?;
                    TransferState::Verifying { written }
                }

                TransferState::Verifying { written } => {
                    if written == declared_size {
                        info!(
                            "File {:?} downloaded successfully with size {}",
                            destination, written
                        );
                        TransferState::Done(TransferOutcome::Downloaded { bytes: written })
                    } else {
                        warn!(
                            "Mismatch! Local: {} Remote: {} Difference: {}",
                            written,
                            declared_size,
                            written.abs_diff(declared_size)
                        );
                        if self.retry {
                            retries += 1;
                            info!(
                                "Retrying {:?} in {:?} (attempt {})...",
                                destination,
                                self.delay,
                                retries + 1
                            );
                            tokio::time::sleep(self.delay).await;
                            TransferState::Probing
                        } else {
                            TransferState::Done(TransferOutcome::Mismatched {
                                written,
                                declared: declared_size,
                            })
                        }
                    }
                }

                TransferState::Done(outcome) => return Ok(TransferReport { outcome, retries }),
            };
        }
    }
}
