use crate::model::fs::BucketConfig;

/// The only separator the store understands.
pub const DELIMITER: &str = "/";

/// Bidirectional mapping between the host's virtual paths and object keys.
/// The only component that prepends or strips the bucket prefix.
#[derive(Clone, Debug)]
pub struct PathResolver {
    host: String,
    prefix: String,
}

impl PathResolver {
    pub fn new(config: &BucketConfig) -> Self {
        Self {
            host: config.host.clone(),
            prefix: config.prefix.clone(),
        }
    }

    /// Normalizes a virtual path into a canonical object key under the bucket
    /// prefix. Directory keys carry exactly one trailing delimiter; a host URL
    /// or redundant prefix is stripped once, ASCII case-insensitively.
    pub fn resolve(&self, path: &str, is_directory: bool) -> String {
        if path.is_empty() || path == "/" || path == "\\" {
            return self.prefix.clone();
        }

        let stripped = strip_ignore_case(path, &self.host).unwrap_or(path);
        let normalized = stripped.replace('\\', "/");
        let trimmed = normalized.strip_prefix('/').unwrap_or(&normalized);
        let relative = strip_ignore_case(trimmed, &self.prefix).unwrap_or(trimmed);

        // an empty remainder is the root; the prefix already carries the
        // trailing delimiter
        let mut key = relative.to_string();
        if is_directory && !key.is_empty() && !key.ends_with(DELIMITER) {
            key.push_str(DELIMITER);
        }

        format!("{}{}", self.prefix, key)
    }

    /// Inverse of `resolve`: drops the bucket prefix if present and exactly
    /// one trailing delimiter if present.
    pub fn strip_prefix(&self, key: &str) -> String {
        let rest = strip_ignore_case(key, &self.prefix).unwrap_or(key);
        let rest = rest.strip_suffix(DELIMITER).unwrap_or(rest);
        rest.to_string()
    }

    /// Recovers a relative virtual path: drops one leading delimiter, then
    /// the host URL if present, otherwise the bucket prefix if present.
    pub fn relative_path(&self, input: &str) -> String {
        let input = input.strip_prefix(DELIMITER).unwrap_or(input);
        if let Some(rest) = strip_ignore_case(input, &self.host) {
            return rest.to_string();
        }
        if let Some(rest) = strip_ignore_case(input, &self.prefix) {
            return rest.to_string();
        }
        input.to_string()
    }
}

fn strip_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}
