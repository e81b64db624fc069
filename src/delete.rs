use crate::adapters;
use crate::model::fs::FSResult;

/// Most keys the store accepts in a single delete-objects call.
pub const DELETE_BATCH_LIMIT: usize = 1000;

/// Splits deletions into store-sized batches. Batches run sequentially and
/// the first failure aborts the remainder.
pub struct BatchDeleter<'a> {
    client: &'a dyn adapters::ObjectClient,
    bucket: &'a str,
}

impl<'a> BatchDeleter<'a> {
    pub fn new(client: &'a dyn adapters::ObjectClient, bucket: &'a str) -> Self {
        Self { client, bucket }
    }

    /// Deletes every key, at most `DELETE_BATCH_LIMIT` per call. An empty
    /// set issues no call and succeeds.
    pub async fn delete_keys(&self, keys: &[String]) -> FSResult<()> {
        for batch in keys.chunks(DELETE_BATCH_LIMIT) {
            self.client.fs_delete_objects(self.bucket, batch).await?;
        }

        Ok(())
    }
}
