//! mailru_dl CLI - Mirror public cloud folders to local storage.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use mailru_dl::{Mirror, MirrorConfig, ShareLink};

/// Download shared folders from cloud.mail.ru.
#[derive(Parser)]
#[command(name = "mailru_dl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Public share links (https://cloud.mail.ru/public/<owner>/<resource>[/<path>]).
    #[arg(required = true)]
    links: Vec<String>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, short = 'l', default_value = "info")]
    log_level: LevelFilter,

    /// Download path.
    #[arg(long, short = 'w', env = "MAILRU_DL_WORKDIR", default_value = ".")]
    workdir: PathBuf,

    /// Wait time between requests and before retries (e.g. 5s, 500ms, 1m).
    #[arg(long, short = 'd', env = "MAILRU_DL_WAIT", default_value = "5s", value_parser = humantime::parse_duration)]
    wait: Duration,

    /// Add a unique <owner>/<resource> prefix path to avoid file collisions.
    #[arg(long)]
    prefix: bool,

    /// Automatically retry downloads whose size does not match.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    retry: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("mailru_dl={}", cli.log_level)))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Log level set to '{}'", cli.log_level);

    let links: Vec<ShareLink> = cli
        .links
        .iter()
        .filter_map(|link| match ShareLink::parse(link) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                error!("{}", e);
                None
            }
        })
        .collect();

    let config = MirrorConfig {
        work_dir: cli.workdir,
        delay: cli.wait,
        prefix: cli.prefix,
        retry: cli.retry,
    };

    let mirror = Mirror::new(config).context("Failed to build HTTP client")?;
    let stats = mirror.run(&links).await.context("Mirror run aborted")?;

    info!("Done: {}", stats);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["mailru_dl", "https://cloud.mail.ru/public/RgA6/8FEhtCsn6"])
            .unwrap();
        assert_eq!(cli.links.len(), 1);
        assert_eq!(cli.wait, Duration::from_secs(5));
        assert_eq!(cli.workdir, PathBuf::from("."));
        assert_eq!(cli.log_level, LevelFilter::INFO);
        assert!(!cli.prefix);
        assert!(cli.retry);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "mailru_dl",
            "-w",
            "/data",
            "-d",
            "250ms",
            "-l",
            "debug",
            "--prefix",
            "--retry",
            "false",
            "a/b",
            "c/d",
        ])
        .unwrap();
        assert_eq!(cli.links, vec!["a/b", "c/d"]);
        assert_eq!(cli.wait, Duration::from_millis(250));
        assert_eq!(cli.workdir, PathBuf::from("/data"));
        assert_eq!(cli.log_level, LevelFilter::DEBUG);
        assert!(cli.prefix);
        assert!(!cli.retry);
    }

    #[test]
    fn test_cli_requires_link() {
        assert!(Cli::try_parse_from(["mailru_dl"]).is_err());
    }

    #[test]
    fn test_cli_rejects_bad_level() {
        assert!(Cli::try_parse_from(["mailru_dl", "-l", "loud", "a/b"]).is_err());
    }
}
