use async_trait::async_trait;

use crate::model;

pub mod mock;
pub mod s3;

/// Capability interface the adapter requires of an object store. Implemented
/// directly on the AWS SDK client and by the in-memory mock; the `fs_` prefix
/// keeps the methods clear of the SDK's inherent request builders.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    async fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> model::fs::FSResult<()>;

    /// `None` when the key is absent.
    async fn fs_get_object(&self, bucket: &str, key: &str) -> model::fs::FSResult<Option<Vec<u8>>>;

    /// `None` when the key is absent.
    async fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> model::fs::FSResult<Option<model::fs::FSObject>>;

    /// Exactly one page per call; following continuation tokens is the
    /// caller's job.
    async fn fs_list_page(
        &self,
        bucket: &str,
        request: &model::fs::ListRequest,
    ) -> model::fs::FSResult<model::fs::ListPage>;

    /// One batched call. A response reporting per-key errors is a failure of
    /// the whole call.
    async fn fs_delete_objects(&self, bucket: &str, keys: &[String]) -> model::fs::FSResult<()>;
}
