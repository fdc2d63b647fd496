//! Parser for public share links.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{MirrorError, Result};

/// Public share URL, scheme optional: everything after `public/` is the traversal root.
static PUBLIC_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?[^/]+\.[^/]+/public/(.+)$").expect("Invalid public URL regex")
});

/// Bare `<owner>/<resource>[/<subpath>]` weblink.
static WEBLINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]+/[a-zA-Z0-9_-]+(?:/.+)?$").expect("Invalid weblink regex")
});

/// The weblink of a shared resource, as extracted from a public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    weblink: String,
}

impl ShareLink {
    /// Parse a public share URL or a bare weblink.
    ///
    /// Supports the following formats:
    /// - `https://<host>/public/<owner>/<resource>`
    /// - `https://<host>/public/<owner>/<resource>/<subpath>`
    /// - `<host>/public/<owner>/<resource>[/<subpath>]`
    /// - `<owner>/<resource>[/<subpath>]`
    ///
    /// A single trailing slash is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use mailru_dl::ShareLink;
    ///
    /// let link = ShareLink::parse("https://cloud.mail.ru/public/RgA6/8FEhtCsn6/").unwrap();
    /// assert_eq!(link.weblink(), "RgA6/8FEhtCsn6");
    /// assert_eq!(link.prefix(), ("RgA6", "8FEhtCsn6"));
    /// ```
    pub fn parse(link: &str) -> Result<Self> {
        let trimmed = link.trim();
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        let weblink = match PUBLIC_URL_REGEX.captures(trimmed) {
            Some(captures) => captures[1].to_string(),
            None => trimmed.to_string(),
        };

        if !WEBLINK_REGEX.is_match(&weblink) {
            return Err(MirrorError::InvalidShareLink(link.to_string()));
        }

        Ok(Self { weblink })
    }

    /// The weblink used as the traversal root.
    pub fn weblink(&self) -> &str {
        &self.weblink
    }

    /// The owner and resource tokens, used as a collision-avoiding path prefix.
    pub fn prefix(&self) -> (&str, &str) {
        let mut segments = self.weblink.splitn(3, '/');
        let owner = segments.next().unwrap_or_default();
        let resource = segments.next().unwrap_or_default();
        (owner, resource)
    }
}

impl std::fmt::Display for ShareLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.weblink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_public_url() {
        let link = ShareLink::parse("https://cloud.mail.ru/public/RgA6/8FEhtCsn6").unwrap();
        assert_eq!(link.weblink(), "RgA6/8FEhtCsn6");
    }

    #[test]
    fn test_parse_strips_trailing_slash() {
        let link =
            ShareLink::parse("https://cloud.mail.ru/public/RgA6/8FEhtCsn6/alpine/standard/")
                .unwrap();
        assert_eq!(link.weblink(), "RgA6/8FEhtCsn6/alpine/standard");
        assert_eq!(link.prefix(), ("RgA6", "8FEhtCsn6"));
    }

    #[test]
    fn test_parse_without_scheme() {
        let link = ShareLink::parse("cloud.mail.ru/public/RgA6/8FEhtCsn6/alpine/").unwrap();
        assert_eq!(link.weblink(), "RgA6/8FEhtCsn6/alpine");
        assert_eq!(link.prefix(), ("RgA6", "8FEhtCsn6"));
    }

    #[test]
    fn test_parse_bare_weblink() {
        let link = ShareLink::parse("RgA6/8FEhtCsn6").unwrap();
        assert_eq!(link.weblink(), "RgA6/8FEhtCsn6");
    }

    #[test]
    fn test_invalid_links() {
        assert!(ShareLink::parse("").is_err());
        assert!(ShareLink::parse("https://cloud.mail.ru/home/folder").is_err());
        assert!(ShareLink::parse("https://cloud.mail.ru/public/RgA6").is_err());
        assert!(ShareLink::parse("single-token").is_err());
    }
}
