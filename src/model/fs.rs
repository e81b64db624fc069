use std::time::SystemTime;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FSError {
    /// The key is absent from the store. Existence and metadata queries absorb
    /// this into a default return; read operations surface it.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Any other storage-service failure, carried to the caller unmodified.
    #[error("{0}")]
    Storage(String),
}

pub type FSResult<T> = Result<T, FSError>;

/// Identity of the bucket the adapter is confined to. Immutable once built;
/// `new` normalizes the prefix and host so every later concatenation is
/// delimiter-exact.
#[derive(Clone, Debug)]
pub struct BucketConfig {
    pub bucket: String,
    pub host: String,
    pub prefix: String,
}

impl BucketConfig {
    pub fn new(bucket: &str, host: &str, prefix: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            host: normalize_host(host),
            prefix: normalize_prefix(prefix),
        }
    }
}

/// A single object summary as reported by the store.
#[derive(Clone, Debug)]
pub struct FSObject {
    pub key: String,
    pub size: i64,
    pub modified_time: SystemTime,
}

/// One listing request. The pager owns the continuation token between pages;
/// everything else stays fixed for the lifetime of a traversal.
#[derive(Clone, Debug, Default)]
pub struct ListRequest {
    pub prefix: String,
    pub delimiter: Option<String>,
    pub max_keys: Option<i32>,
    pub continuation_token: Option<String>,
}

/// One page of a listing: object summaries in store order plus, for delimited
/// requests, the synthesized subdirectory prefixes.
#[derive(Clone, Debug, Default)]
pub struct ListPage {
    pub objects: Vec<FSObject>,
    pub common_prefixes: Vec<String>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

fn normalize_prefix(prefix: &str) -> String {
    let normalized = prefix.replace('\\', "/");
    let trimmed = normalized.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

fn normalize_host(host: &str) -> String {
    let trimmed = host.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_normalization() {
        let cases = vec![
            ("media", "media/"),
            ("media/", "media/"),
            ("/media/", "media/"),
            ("media\\", "media/"),
            ("a/b", "a/b/"),
            ("", ""),
            ("/", ""),
        ];

        for (prefix, expected) in cases {
            let config = BucketConfig::new("bucket", "https://cdn.example.com", prefix);
            assert_eq!(config.prefix, expected, "failed for case: {}", prefix);
        }
    }

    #[test]
    fn test_host_normalization() {
        let cases = vec![
            ("https://cdn.example.com", "https://cdn.example.com/"),
            ("https://cdn.example.com/", "https://cdn.example.com/"),
            ("https://cdn.example.com//", "https://cdn.example.com/"),
            ("", ""),
        ];

        for (host, expected) in cases {
            let config = BucketConfig::new("bucket", host, "media");
            assert_eq!(config.host, expected, "failed for case: {}", host);
        }
    }
}
