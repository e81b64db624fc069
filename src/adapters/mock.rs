use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use async_trait::async_trait;

use crate::{adapters, delete, model};

struct MockObject {
    body: Vec<u8>,
    modified_time: SystemTime,
}

struct MockState {
    objects: Mutex<BTreeMap<String, MockObject>>,
    fail_keys: Mutex<HashSet<String>>,
    list_calls: Mutex<usize>,
    delete_batches: Mutex<Vec<usize>>,
    page_size: i32,
}

/// In-memory object store with lexicographic listing, delimiter grouping and
/// continuation-token pagination. Clones share state.
#[derive(Clone)]
pub struct MockClient {
    state: Arc<MockState>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::with_page_size(1000)
    }

    pub fn with_page_size(page_size: i32) -> Self {
        Self {
            state: Arc::new(MockState {
                objects: Mutex::new(BTreeMap::new()),
                fail_keys: Mutex::new(HashSet::new()),
                list_calls: Mutex::new(0),
                delete_batches: Mutex::new(Vec::new()),
                page_size,
            }),
        }
    }

    pub fn insert(&self, key: &str, body: &[u8]) {
        self.insert_at(key, body, SystemTime::now());
    }

    pub fn insert_at(&self, key: &str, body: &[u8], modified_time: SystemTime) {
        self.state
            .objects
            .lock()
            .expect("failed to acquire `objects` guard")
            .insert(
                key.to_string(),
                MockObject {
                    body: body.to_vec(),
                    modified_time,
                },
            );
    }

    pub fn fail_on(&self, key: &str) {
        self.state
            .fail_keys
            .lock()
            .expect("failed to acquire `fail_keys` guard")
            .insert(key.to_string());
    }

    pub fn keys(&self) -> Vec<String> {
        self.state
            .objects
            .lock()
            .expect("failed to acquire `objects` guard")
            .keys()
            .cloned()
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state
            .objects
            .lock()
            .expect("failed to acquire `objects` guard")
            .contains_key(key)
    }

    pub fn list_calls(&self) -> usize {
        *self
            .state
            .list_calls
            .lock()
            .expect("failed to acquire `list_calls` guard")
    }

    /// Batch sizes in call order.
    pub fn delete_batches(&self) -> Vec<usize> {
        self.state
            .delete_batches
            .lock()
            .expect("failed to acquire `delete_batches` guard")
            .clone()
    }

    fn check_key(&self, key: &str) -> model::fs::FSResult<()> {
        let failing = self
            .state
            .fail_keys
            .lock()
            .expect("failed to acquire `fail_keys` guard");

        if failing.contains(key) {
            return Err(model::fs::FSError::Storage(format!(
                "injected failure at: {}",
                key
            )));
        }

        Ok(())
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl adapters::ObjectClient for MockClient {
    async fn fs_put_object(
        &self,
        _bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> model::fs::FSResult<()> {
        self.check_key(key)?;
        self.insert(key, &body);

        Ok(())
    }

    async fn fs_get_object(
        &self,
        _bucket: &str,
        key: &str,
    ) -> model::fs::FSResult<Option<Vec<u8>>> {
        self.check_key(key)?;

        let objects = self
            .state
            .objects
            .lock()
            .expect("failed to acquire `objects` guard");

        Ok(objects.get(key).map(|o| o.body.clone()))
    }

    async fn fs_head_object(
        &self,
        _bucket: &str,
        key: &str,
    ) -> model::fs::FSResult<Option<model::fs::FSObject>> {
        self.check_key(key)?;

        let objects = self
            .state
            .objects
            .lock()
            .expect("failed to acquire `objects` guard");

        Ok(objects.get(key).map(|o| model::fs::FSObject {
            key: key.to_string(),
            size: o.body.len() as i64,
            modified_time: o.modified_time,
        }))
    }

    async fn fs_list_page(
        &self,
        _bucket: &str,
        request: &model::fs::ListRequest,
    ) -> model::fs::FSResult<model::fs::ListPage> {
        *self
            .state
            .list_calls
            .lock()
            .expect("failed to acquire `list_calls` guard") += 1;

        let objects = self
            .state
            .objects
            .lock()
            .expect("failed to acquire `objects` guard");

        let limit = request.max_keys.unwrap_or(self.state.page_size).max(1) as usize;

        let mut summaries = Vec::new();
        let mut common_prefixes: Vec<String> = Vec::new();
        let mut last_consumed: Option<String> = None;
        let mut truncated = false;

        for (key, object) in objects.iter() {
            if !key.starts_with(&request.prefix) {
                continue;
            }
            if let Some(token) = &request.continuation_token {
                if key.as_str() <= token.as_str() {
                    continue;
                }
            }

            // A delimiter in the remainder folds the key into a common-prefix
            // group; members after the first consume no entry slot, so a group
            // never straddles a page boundary.
            if let Some(delimiter) = &request.delimiter {
                let rest = &key[request.prefix.len()..];
                if let Some(pos) = rest.find(delimiter.as_str()) {
                    let group = key[..request.prefix.len() + pos + delimiter.len()].to_string();
                    if common_prefixes.last() == Some(&group) {
                        last_consumed = Some(key.clone());
                        continue;
                    }
                    if summaries.len() + common_prefixes.len() == limit {
                        truncated = true;
                        break;
                    }

                    common_prefixes.push(group);
                    last_consumed = Some(key.clone());
                    continue;
                }
            }

            if summaries.len() + common_prefixes.len() == limit {
                truncated = true;
                break;
            }

            summaries.push(model::fs::FSObject {
                key: key.clone(),
                size: object.body.len() as i64,
                modified_time: object.modified_time,
            });
            last_consumed = Some(key.clone());
        }

        Ok(model::fs::ListPage {
            objects: summaries,
            common_prefixes,
            is_truncated: truncated,
            next_continuation_token: if truncated { last_consumed } else { None },
        })
    }

    async fn fs_delete_objects(&self, _bucket: &str, keys: &[String]) -> model::fs::FSResult<()> {
        self.state
            .delete_batches
            .lock()
            .expect("failed to acquire `delete_batches` guard")
            .push(keys.len());

        if keys.len() > delete::DELETE_BATCH_LIMIT {
            return Err(model::fs::FSError::Storage(format!(
                "batch of {} exceeds the delete limit",
                keys.len()
            )));
        }
        for key in keys {
            self.check_key(key)?;
        }

        let mut objects = self
            .state
            .objects
            .lock()
            .expect("failed to acquire `objects` guard");

        for key in keys {
            objects.remove(key);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ObjectClient;
    use crate::model::fs::ListRequest;

    #[tokio::test]
    async fn test_list_page_delimiter_grouping() {
        let mock = MockClient::new();
        mock.insert("media/docs/a.txt", b"a");
        mock.insert("media/docs/b.csv", b"b");
        mock.insert("media/docs/sub/c.txt", b"c");
        mock.insert("media/other/d.txt", b"d");

        let request = ListRequest {
            prefix: "media/docs/".to_string(),
            delimiter: Some("/".to_string()),
            ..Default::default()
        };
        let page = mock.fs_list_page("dummy-bucket", &request).await.unwrap();

        let keys: Vec<&str> = page.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["media/docs/a.txt", "media/docs/b.csv"]);
        assert_eq!(page.common_prefixes, vec!["media/docs/sub/"]);
        assert!(!page.is_truncated);
        assert!(page.next_continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_list_page_pagination() {
        let mock = MockClient::with_page_size(2);
        for name in ["a", "b", "c", "d", "e"] {
            mock.insert(&format!("media/{}.txt", name), b"x");
        }

        let mut request = ListRequest {
            prefix: "media/".to_string(),
            ..Default::default()
        };

        let mut collected = Vec::new();
        let mut pages = 0;
        loop {
            let page = mock.fs_list_page("dummy-bucket", &request).await.unwrap();
            pages += 1;
            collected.extend(page.objects.iter().map(|o| o.key.clone()));

            match page.next_continuation_token {
                Some(token) => request.continuation_token = Some(token),
                None => break,
            }
        }

        assert_eq!(pages, 3);
        assert_eq!(
            collected,
            vec![
                "media/a.txt",
                "media/b.txt",
                "media/c.txt",
                "media/d.txt",
                "media/e.txt"
            ]
        );
    }

    #[tokio::test]
    async fn test_list_page_group_never_splits() {
        let mock = MockClient::with_page_size(2);
        mock.insert("media/a/1", b"x");
        mock.insert("media/a/2", b"x");
        mock.insert("media/a/3", b"x");
        mock.insert("media/b/1", b"x");
        mock.insert("media/x.txt", b"x");

        let mut request = ListRequest {
            prefix: "media/".to_string(),
            delimiter: Some("/".to_string()),
            ..Default::default()
        };

        let mut prefixes = Vec::new();
        let mut keys = Vec::new();
        loop {
            let page = mock.fs_list_page("dummy-bucket", &request).await.unwrap();
            prefixes.extend(page.common_prefixes.clone());
            keys.extend(page.objects.iter().map(|o| o.key.clone()));

            match page.next_continuation_token {
                Some(token) => request.continuation_token = Some(token),
                None => break,
            }
        }

        assert_eq!(prefixes, vec!["media/a/", "media/b/"]);
        assert_eq!(keys, vec!["media/x.txt"]);
    }

    #[tokio::test]
    async fn test_get_and_head_absent() {
        let mock = MockClient::new();

        let body = mock.fs_get_object("dummy-bucket", "media/missing").await;
        assert!(matches!(body, Ok(None)));

        let head = mock.fs_head_object("dummy-bucket", "media/missing").await;
        assert!(matches!(head, Ok(None)));
    }

    #[tokio::test]
    async fn test_delete_objects() {
        let mock = MockClient::new();
        mock.insert("media/a.txt", b"a");
        mock.insert("media/b.txt", b"b");

        let keys = vec!["media/a.txt".to_string()];
        mock.fs_delete_objects("dummy-bucket", &keys).await.unwrap();

        assert!(!mock.contains("media/a.txt"));
        assert!(mock.contains("media/b.txt"));
        assert_eq!(mock.delete_batches(), vec![1]);
    }

    #[tokio::test]
    async fn test_delete_objects_oversized_batch() {
        let mock = MockClient::new();
        let keys: Vec<String> = (0..1001).map(|i| format!("media/{}.txt", i)).collect();

        let result = mock.fs_delete_objects("dummy-bucket", &keys).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_objects_injected_failure() {
        let mock = MockClient::new();
        mock.insert("media/a.txt", b"a");
        mock.insert("media/b.txt", b"b");
        mock.fail_on("media/b.txt");

        let keys = vec!["media/a.txt".to_string(), "media/b.txt".to_string()];
        let result = mock.fs_delete_objects("dummy-bucket", &keys).await;

        assert!(result.is_err());
        assert!(mock.contains("media/a.txt"), "failed batch must not remove");
    }
}
