//! mailru_dl - Mirror publicly shared cloud folders to local storage.
//!
//! This library provides functionality to:
//! - Parse public share links into weblinks
//! - List shared folders through the public cloud API
//! - Recreate the folder tree locally and download every file, skipping
//!   files that are already complete and retrying ones that come out short
//!
//! # Example
//!
//! ```no_run
//! use mailru_dl::{Mirror, MirrorConfig, ShareLink};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mirror = Mirror::new(MirrorConfig::default())?;
//!     let link = ShareLink::parse("https://cloud.mail.ru/public/RgA6/8FEhtCsn6")?;
//!
//!     let stats = mirror.mirror_link(&link).await?;
//!     println!("{}", stats);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod mirror;
pub mod models;
pub mod share_link;
pub mod transfer;
pub mod walker;

// Re-exports for convenience
pub use client::ApiClient;
pub use config::MirrorConfig;
pub use error::{MirrorError, Result};
pub use mirror::Mirror;
pub use share_link::ShareLink;
pub use transfer::{TransferEngine, TransferOutcome, TransferReport};
pub use walker::{TreeWalker, WalkStats};
