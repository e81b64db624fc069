use std::io::Cursor;
use std::time::SystemTime;

use async_trait::async_trait;
use tracing::debug;

use crate::adapters;
use crate::delete::BatchDeleter;
use crate::model::fs::{BucketConfig, FSError, FSResult, ListRequest};
use crate::pages::ObjectPages;
use crate::paths::{PathResolver, DELIMITER};
use crate::util;

/// The file-system contract the content-management host consumes. Paths are
/// virtual; directories are synthesized from key prefixes and have no entity
/// of their own in the store.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Stores `data` under the resolved key. The put is unconditional;
    /// `overwrite` is accepted for contract compatibility only.
    async fn add_file(&self, path: &str, data: Vec<u8>, overwrite: bool) -> FSResult<()>;

    async fn delete_file(&self, path: &str) -> FSResult<()>;

    /// Removes every object under the directory prefix. `recursive` is
    /// accepted for contract compatibility; deletion is always prefix-wide.
    async fn delete_directory(&self, path: &str, recursive: bool) -> FSResult<()>;

    /// `false` when the key is absent; other failures propagate.
    async fn file_exists(&self, path: &str) -> FSResult<bool>;

    /// A directory exists when at least one object lives under its prefix.
    async fn directory_exists(&self, path: &str) -> FSResult<bool>;

    /// Direct children of the directory matching `filter` (a name/extension
    /// glob such as `*.*` or `report*.csv`), as virtual paths.
    async fn get_files(&self, path: &str, filter: &str) -> FSResult<Vec<String>>;

    /// Synthesized subdirectories of the directory, as virtual paths.
    async fn get_directories(&self, path: &str) -> FSResult<Vec<String>>;

    /// Modification time of the object, `UNIX_EPOCH` when absent.
    async fn get_last_modified(&self, path: &str) -> FSResult<SystemTime>;

    /// The store keeps no separate creation time; identical to
    /// `get_last_modified`.
    async fn get_created(&self, path: &str) -> FSResult<SystemTime>;

    /// Fully qualified URL for the path, whether or not the object exists.
    fn get_url(&self, path: &str) -> String;

    fn get_relative_path(&self, input: &str) -> String;

    fn get_full_path(&self, path: &str) -> String;

    /// The full object content as a rewound, seekable buffer. Absence is an
    /// error here, unlike the existence and metadata queries.
    async fn open_file(&self, path: &str) -> FSResult<Cursor<Vec<u8>>>;
}

/// Stateless adapter from the host contract to a flat object store. Holds
/// only the bucket identity; every operation hits the live store.
pub struct BucketFS {
    client: Box<dyn adapters::ObjectClient>,
    config: BucketConfig,
    paths: PathResolver,
}

impl BucketFS {
    pub fn new(client: Box<dyn adapters::ObjectClient>, config: BucketConfig) -> Self {
        let paths = PathResolver::new(&config);

        Self {
            client,
            config,
            paths,
        }
    }

    fn pages(&self, request: ListRequest) -> ObjectPages<'_> {
        ObjectPages::new(self.client.as_ref(), &self.config.bucket, request)
    }

    fn deleter(&self) -> BatchDeleter<'_> {
        BatchDeleter::new(self.client.as_ref(), &self.config.bucket)
    }
}

#[async_trait]
impl FileSystem for BucketFS {
    async fn add_file(&self, path: &str, data: Vec<u8>, _overwrite: bool) -> FSResult<()> {
        let key = self.paths.resolve(path, false);
        debug!(key = %key, size = data.len(), "add_file");

        self.client
            .fs_put_object(&self.config.bucket, &key, data)
            .await
    }

    async fn delete_file(&self, path: &str) -> FSResult<()> {
        let key = self.paths.resolve(path, false);
        debug!(key = %key, "delete_file");

        self.deleter().delete_keys(&[key]).await
    }

    async fn delete_directory(&self, path: &str, _recursive: bool) -> FSResult<()> {
        let prefix = self.paths.resolve(path, true);

        let request = ListRequest {
            prefix: prefix.clone(),
            ..Default::default()
        };
        let objects = self.pages(request).collect_objects().await?;
        let keys: Vec<String> = objects.into_iter().map(|o| o.key).collect();
        debug!(prefix = %prefix, count = keys.len(), "delete_directory");

        self.deleter().delete_keys(&keys).await
    }

    async fn file_exists(&self, path: &str) -> FSResult<bool> {
        let key = self.paths.resolve(path, false);

        let head = self.client.fs_head_object(&self.config.bucket, &key).await?;

        Ok(head.is_some())
    }

    async fn directory_exists(&self, path: &str) -> FSResult<bool> {
        let prefix = self.paths.resolve(path, true);

        let request = ListRequest {
            prefix,
            max_keys: Some(1),
            ..Default::default()
        };
        let page = self.client.fs_list_page(&self.config.bucket, &request).await?;

        Ok(!page.objects.is_empty())
    }

    async fn get_files(&self, path: &str, filter: &str) -> FSResult<Vec<String>> {
        let dir = self.paths.resolve(path, true);
        let (name_prefix, suffix) = util::filter::split_filter(filter);

        let request = ListRequest {
            prefix: format!("{}{}", dir, name_prefix),
            delimiter: Some(DELIMITER.to_string()),
            ..Default::default()
        };
        let objects = self.pages(request).collect_objects().await?;

        let files = objects
            .into_iter()
            .map(|o| self.paths.strip_prefix(&o.key))
            .filter(|name| !name.is_empty() && name.ends_with(&suffix))
            .collect();

        Ok(files)
    }

    async fn get_directories(&self, path: &str) -> FSResult<Vec<String>> {
        let dir = self.paths.resolve(path, true);

        let request = ListRequest {
            prefix: dir,
            delimiter: Some(DELIMITER.to_string()),
            ..Default::default()
        };
        let prefixes = self.pages(request).collect_common_prefixes().await?;

        Ok(prefixes
            .into_iter()
            .map(|p| self.paths.strip_prefix(&p))
            .collect())
    }

    async fn get_last_modified(&self, path: &str) -> FSResult<SystemTime> {
        let key = self.paths.resolve(path, false);

        let head = self.client.fs_head_object(&self.config.bucket, &key).await?;

        Ok(head
            .map(|o| o.modified_time)
            .unwrap_or(SystemTime::UNIX_EPOCH))
    }

    async fn get_created(&self, path: &str) -> FSResult<SystemTime> {
        self.get_last_modified(path).await
    }

    fn get_url(&self, path: &str) -> String {
        format!("{}{}", self.config.host, self.paths.resolve(path, false))
    }

    fn get_relative_path(&self, input: &str) -> String {
        self.paths.relative_path(input)
    }

    fn get_full_path(&self, path: &str) -> String {
        path.to_string()
    }

    async fn open_file(&self, path: &str) -> FSResult<Cursor<Vec<u8>>> {
        let key = self.paths.resolve(path, false);
        debug!(key = %key, "open_file");

        let body = self.client.fs_get_object(&self.config.bucket, &key).await?;
        match body {
            Some(body) => Ok(Cursor::new(body)),
            None => Err(FSError::NotFound(key)),
        }
    }
}
