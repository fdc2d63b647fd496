//! Data models for the cloud API responses.
//!
//! Only the fields the mirror actually consumes are modelled; everything else
//! in the payloads is ignored during deserialization.

use serde::Deserialize;

/// Child counts reported for a folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Count {
    #[serde(default)]
    pub folders: u64,
    #[serde(default)]
    pub files: u64,
}

impl Count {
    /// Total number of children (folders + files).
    pub fn total(&self) -> u64 {
        self.folders + self.files
    }
}

/// One child of a listed folder, keyed on the `type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entry {
    File {
        name: String,
        weblink: String,
        #[serde(default)]
        size: u64,
    },
    Folder {
        name: String,
        weblink: String,
        #[serde(default)]
        count: Count,
    },
    /// Any other discriminator value. Never downloaded or recursed into.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::File {
                name,
                weblink,
                size,
            } => write!(f, "file\t{}\t{}\t{}", weblink, format_size(*size), name),
            Entry::Folder {
                name,
                weblink,
                count,
            } => write!(
                f,
                "folder\t{}\t{} folders, {} files\t{}",
                weblink, count.folders, count.files, name
            ),
            Entry::Unknown => write!(f, "unknown"),
        }
    }
}

/// Response from the `folder` endpoint.
#[derive(Debug, Deserialize)]
pub struct FolderResponse {
    pub body: FolderBody,
}

/// The listed folder itself.
#[derive(Debug, Deserialize)]
pub struct FolderBody {
    pub name: String,
    #[serde(default)]
    pub count: Count,
    #[serde(default)]
    pub list: Vec<Entry>,
}

/// Response from the `dispatcher` endpoint.
#[derive(Debug, Deserialize)]
pub struct DispatchResponse {
    pub body: DispatchBody,
}

#[derive(Debug, Deserialize)]
pub struct DispatchBody {
    #[serde(default)]
    pub weblink_get: Vec<DispatchUrl>,
}

/// A candidate base URL for direct downloads.
#[derive(Debug, Deserialize)]
pub struct DispatchUrl {
    pub url: String,
}

impl DispatchResponse {
    /// First candidate download base URL, if the dispatcher returned any.
    pub fn download_url(&self) -> Option<&str> {
        self.body.weblink_get.first().map(|u| u.url.as_str())
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_folder_response_deserialize() {
        let json = r#"{
            "status": 200,
            "time": 1620000000000,
            "body": {
                "name": "alpine",
                "weblink": "RgA6/8FEhtCsn6/alpine",
                "kind": "folder",
                "count": {"folders": 1, "files": 1},
                "list": [
                    {"type": "folder", "name": "extended", "weblink": "RgA6/8FEhtCsn6/alpine/extended",
                     "count": {"folders": 0, "files": 2}, "grev": 3},
                    {"type": "file", "name": "readme.txt", "weblink": "RgA6/8FEhtCsn6/alpine/readme.txt",
                     "size": 1024, "kind": "file", "hash": "abc"}
                ]
            }
        }"#;

        let response: FolderResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.body.name, "alpine");
        assert_eq!(response.body.count.total(), 2);
        assert_eq!(response.body.list.len(), 2);
        assert_eq!(
            response.body.list[0],
            Entry::Folder {
                name: "extended".to_string(),
                weblink: "RgA6/8FEhtCsn6/alpine/extended".to_string(),
                count: Count { folders: 0, files: 2 },
            }
        );
        assert_eq!(
            response.body.list[1],
            Entry::File {
                name: "readme.txt".to_string(),
                weblink: "RgA6/8FEhtCsn6/alpine/readme.txt".to_string(),
                size: 1024,
            }
        );
    }

    #[test]
    fn test_unknown_entry_type() {
        let json = r#"{"type": "shared", "name": "x", "weblink": "a/b"}"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry, Entry::Unknown);
    }

    #[test]
    fn test_probe_response_without_list() {
        let json = r#"{"body": {"name": "root", "count": {"folders": 1, "files": 2}}}"#;
        let response: FolderResponse = serde_json::from_str(json).unwrap();
        assert!(response.body.list.is_empty());
        assert_eq!(response.body.count.total(), 3);
    }

    #[test]
    fn test_empty_payload_fails_to_decode() {
        assert!(serde_json::from_slice::<FolderResponse>(&[]).is_err());
    }

    #[test]
    fn test_dispatch_first_url() {
        let json = r#"{"body": {"weblink_get": [
            {"count": 1, "url": "https://cloclo1.datacloudmail.ru/weblink/get"},
            {"count": 1, "url": "https://cloclo2.datacloudmail.ru/weblink/get"}
        ]}}"#;
        let response: DispatchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.download_url(),
            Some("https://cloclo1.datacloudmail.ru/weblink/get")
        );
    }

    #[test]
    fn test_dispatch_without_urls() {
        let response: DispatchResponse = serde_json::from_str(r#"{"body": {}}"#).unwrap();
        assert_eq!(response.download_url(), None);
    }

    #[test]
    fn test_entry_display() {
        let entry = Entry::File {
            name: "test.iso".to_string(),
            weblink: "a/b/test.iso".to_string(),
            size: 1048576,
        };
        let display = format!("{}", entry);
        assert!(display.contains("a/b/test.iso"));
        assert!(display.contains("1.00 MB"));
    }
}
