//! Recursive folder traversal mirroring a shared tree onto local storage.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tokio::fs::DirBuilder;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::{MirrorError, Result};
use crate::models::{format_size, Entry};
use crate::transfer::{TransferEngine, TransferOutcome, TransferReport};

/// Counters collected while walking one or more share links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub folders: u64,
    pub downloaded: u64,
    pub skipped: u64,
    pub mismatched: u64,
    pub retries: u64,
    pub ignored: u64,
    pub bytes: u64,
}

impl WalkStats {
    /// Add another run's counters to this one.
    pub fn merge(&mut self, other: &WalkStats) {
        self.folders += other.folders;
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.mismatched += other.mismatched;
        self.retries += other.retries;
        self.ignored += other.ignored;
        self.bytes += other.bytes;
    }

    fn record(&mut self, report: TransferReport) {
        self.retries += u64::from(report.retries);
        match report.outcome {
            TransferOutcome::Downloaded { bytes } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            TransferOutcome::AlreadyPresent { .. } => self.skipped += 1,
            TransferOutcome::Mismatched { written, .. } => {
                self.mismatched += 1;
                self.bytes += written;
            }
        }
    }
}

impl std::fmt::Display for WalkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} folders, {} downloaded ({}), {} already present, {} mismatched, {} retries, {} ignored",
            self.folders,
            self.downloaded,
            format_size(self.bytes),
            self.skipped,
            self.mismatched,
            self.retries,
            self.ignored
        )
    }
}

/// Walks a shared folder depth-first, creating directories and downloading files.
pub struct TreeWalker<'a> {
    client: &'a ApiClient,
    engine: TransferEngine<'a>,
    delay: Duration,
    stats: WalkStats,
}

impl<'a> TreeWalker<'a> {
    /// Create a new TreeWalker.
    ///
    /// # Arguments
    /// * `client` - Client for listing and dispatcher requests
    /// * `engine` - Transfer engine used for every discovered file
    /// * `delay` - Pause after each processed child
    pub fn new(client: &'a ApiClient, engine: TransferEngine<'a>, delay: Duration) -> Self {
        Self {
            client,
            engine,
            delay,
            stats: WalkStats::default(),
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    /// Mirror the folder at `weblink` into `parent/<folder name>`.
    ///
    /// # Arguments
    /// * `weblink` - The folder's weblink
    /// * `parent` - Local directory the folder is created in
    /// * `known_children` - Child count from the parent listing, or `0` to
    ///   probe for it first
    pub async fn walk(&mut self, weblink: &str, parent: &Path, known_children: u64) -> Result<()> {
        debug!(weblink, "walking");

        let mut limit = known_children;
        if limit == 0 {
            let probe = self.client.list_folder(weblink, 0).await?;
            limit = probe.body.count.total();
        }

        let listing = self.client.list_folder(weblink, limit).await?.body;
        if listing.list.len() as u64 != limit {
            warn!(
                "Folder {} reported {} children but listed {}",
                weblink,
                limit,
                listing.list.len()
            );
        }

        let path = join_name(parent, &listing.name)?;
        create_dir(&path).await?;
        self.stats.folders += 1;

        for entry in &listing.list {
            debug!("{}", entry);
            match entry {
                Entry::File {
                    name,
                    weblink,
                    size,
                } => match join_name(&path, name) {
                    Ok(destination) => {
                        let base_url = self.client.dispatch().await?;
                        let report = self
                            .engine
                            .download(&destination, &base_url, weblink, *size)
                            .await?;
                        self.stats.record(report);
                    }
                    Err(e) => {
                        warn!("Skipping file in {}: {}", listing.name, e);
                        self.stats.ignored += 1;
                    }
                },
                Entry::Folder {
                    name,
                    weblink,
                    count,
                } => {
                    if is_single_component(name) {
                        Box::pin(self.walk(weblink, &path, count.total())).await?;
                    } else {
                        warn!("Skipping folder in {}: unsafe name {:?}", listing.name, name);
                        self.stats.ignored += 1;
                    }
                }
                Entry::Unknown => {
                    debug!("Ignoring entry of unknown type in {}", listing.name);
                    self.stats.ignored += 1;
                }
            }

            info!("Sleeping for {:?}", self.delay);
            tokio::time::sleep(self.delay).await;
        }

        Ok(())
    }
}

/// Whether `name` is exactly one normal path component.
fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Join a remote display name onto `base`, refusing names that would leave it.
fn join_name(base: &Path, name: &str) -> Result<PathBuf> {
    if !is_single_component(name) {
        return Err(MirrorError::UnsafeName(name.to_string()));
    }
    Ok(base.join(name))
}

/// Create `path` and any missing ancestors.
async fn create_dir(path: &Path) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o777);

    builder
        .create(path)
        .await
        .map_err(|source| MirrorError::CreateDirError {
            path: path.to_path_buf(),
            source,
        })
}
