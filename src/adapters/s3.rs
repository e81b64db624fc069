use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_sdk_s3::primitives::{ByteStream, DateTime};
use aws_sdk_s3::types::{Delete, ObjectIdentifier};

use crate::{adapters, model};

#[async_trait]
impl adapters::ObjectClient for aws_sdk_s3::Client {
    async fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> model::fs::FSResult<()> {
        let req = self
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));

        req.send().await.map_err(|err| {
            model::fs::FSError::Storage(format!("failed to put_object at: {}, {}", key, err))
        })?;

        Ok(())
    }

    async fn fs_get_object(&self, bucket: &str, key: &str) -> model::fs::FSResult<Option<Vec<u8>>> {
        let req = self.get_object().bucket(bucket).key(key);

        let o = match req.send().await {
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_no_such_key() {
                        return Ok(None);
                    }
                }

                return Err(model::fs::FSError::Storage(format!(
                    "failed to get_object at: {}, {}",
                    key, err
                )));
            }
            Ok(o) => o,
        };

        let bytes = o.body.collect().await.map_err(|err| {
            model::fs::FSError::Storage(format!("failed to collect body at: {}, {}", key, err))
        })?;

        Ok(Some(bytes.into_bytes().to_vec()))
    }

    async fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> model::fs::FSResult<Option<model::fs::FSObject>> {
        let req = self.head_object().bucket(bucket).key(key);

        let ho = match req.send().await {
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_not_found() {
                        return Ok(None);
                    }
                }

                return Err(model::fs::FSError::Storage(format!(
                    "failed to head_object at: {}, {}",
                    key, err
                )));
            }
            Ok(ho) => ho,
        };

        Ok(Some(model::fs::FSObject {
            key: key.to_string(),
            size: ho.content_length().unwrap_or(0),
            modified_time: to_system_time(ho.last_modified()),
        }))
    }

    async fn fs_list_page(
        &self,
        bucket: &str,
        request: &model::fs::ListRequest,
    ) -> model::fs::FSResult<model::fs::ListPage> {
        let mut req = self
            .list_objects_v2()
            .bucket(bucket)
            .prefix(&request.prefix);

        if let Some(delimiter) = &request.delimiter {
            req = req.delimiter(delimiter);
        }
        if let Some(max_keys) = request.max_keys {
            req = req.max_keys(max_keys);
        }
        if let Some(token) = &request.continuation_token {
            req = req.continuation_token(token);
        }

        let lo = req.send().await.map_err(|err| {
            model::fs::FSError::Storage(format!(
                "failed to list_objects at: {}, {}",
                request.prefix, err
            ))
        })?;

        let mut objects = Vec::new();
        for o in lo.contents() {
            objects.push(model::fs::FSObject {
                key: o.key().unwrap_or("").to_string(),
                size: o.size().unwrap_or(0),
                modified_time: to_system_time(o.last_modified()),
            });
        }

        let common_prefixes = lo
            .common_prefixes()
            .iter()
            .filter_map(|cp| cp.prefix())
            .map(|p| p.to_string())
            .collect();

        Ok(model::fs::ListPage {
            objects,
            common_prefixes,
            is_truncated: lo.is_truncated().unwrap_or(false),
            next_continuation_token: lo.next_continuation_token().map(|tok| tok.to_string()),
        })
    }

    async fn fs_delete_objects(&self, bucket: &str, keys: &[String]) -> model::fs::FSResult<()> {
        let mut identifiers = Vec::new();
        for key in keys {
            let id = ObjectIdentifier::builder().key(key).build().map_err(|err| {
                model::fs::FSError::Storage(format!(
                    "failed to build delete identifier at: {}, {}",
                    key, err
                ))
            })?;

            identifiers.push(id);
        }

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .build()
            .map_err(|err| {
                model::fs::FSError::Storage(format!("failed to build delete request, {}", err))
            })?;

        let out = self
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|err| {
                model::fs::FSError::Storage(format!("failed to delete_objects, {}", err))
            })?;

        if let Some(err) = out.errors().first() {
            return Err(model::fs::FSError::Storage(format!(
                "failed to delete_objects at: {}, {}",
                err.key().unwrap_or(""),
                err.message().unwrap_or("unknown")
            )));
        }

        Ok(())
    }
}

fn to_system_time(timestamp: Option<&DateTime>) -> SystemTime {
    match timestamp {
        Some(ts) => SystemTime::UNIX_EPOCH + Duration::new(ts.secs() as u64, ts.subsec_nanos()),
        None => SystemTime::UNIX_EPOCH,
    }
}
