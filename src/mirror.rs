//! Run context tying the client, configuration and walker together.

use std::path::PathBuf;

use tracing::info;

use crate::client::ApiClient;
use crate::config::MirrorConfig;
use crate::error::Result;
use crate::share_link::ShareLink;
use crate::transfer::TransferEngine;
use crate::walker::{TreeWalker, WalkStats};

/// Mirrors share links onto local storage.
///
/// Built once per run; every link walked through it shares the same HTTP
/// client (and therefore the same connection pool and cookie jar).
pub struct Mirror {
    client: ApiClient,
    config: MirrorConfig,
}

impl Mirror {
    /// Create a Mirror talking to the public cloud API.
    pub fn new(config: MirrorConfig) -> Result<Self> {
        Ok(Self::with_client(ApiClient::new()?, config))
    }

    /// Create a Mirror with an existing client.
    pub fn with_client(client: ApiClient, config: MirrorConfig) -> Self {
        Self { client, config }
    }

    /// Local directory the given link's root folder is created in.
    pub fn destination_root(&self, link: &ShareLink) -> PathBuf {
        if self.config.prefix {
            let (owner, resource) = link.prefix();
            self.config.work_dir.join(owner).join(resource)
        } else {
            self.config.work_dir.clone()
        }
    }

    /// Mirror a single share link from its root.
    pub async fn mirror_link(&self, link: &ShareLink) -> Result<WalkStats> {
        let root = self.destination_root(link);
        info!("Mirroring {} into {:?}", link, root);

        let engine = TransferEngine::new(&self.client, self.config.delay, self.config.retry);
        let mut walker = TreeWalker::new(&self.client, engine, self.config.delay);
        walker.walk(link.weblink(), &root, 0).await?;

        let stats = *walker.stats();
        info!("Finished {}: {}", link, stats);
        Ok(stats)
    }

    /// Mirror every link in order. The first fatal error stops the run.
    pub async fn run(&self, links: &[ShareLink]) -> Result<WalkStats> {
        let mut total = WalkStats::default();
        for link in links {
            let stats = self.mirror_link(link).await?;
            total.merge(&stats);
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirror(prefix: bool) -> Mirror {
        let config = MirrorConfig {
            work_dir: PathBuf::from("/tmp/mirror"),
            prefix,
            ..MirrorConfig::default()
        };
        Mirror::with_client(ApiClient::new().unwrap(), config)
    }

    #[test]
    fn test_destination_root_with_prefix() {
        let link = ShareLink::parse("https://cloud.mail.ru/public/RgA6/8FEhtCsn6/alpine").unwrap();
        assert_eq!(
            mirror(true).destination_root(&link),
            PathBuf::from("/tmp/mirror/RgA6/8FEhtCsn6")
        );
    }

    #[test]
    fn test_destination_root_without_prefix() {
        let link = ShareLink::parse("https://cloud.mail.ru/public/RgA6/8FEhtCsn6").unwrap();
        assert_eq!(
            mirror(false).destination_root(&link),
            PathBuf::from("/tmp/mirror")
        );
    }
}
