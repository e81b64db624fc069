use futures::Stream;

use crate::adapters;
use crate::model::fs::{FSObject, FSResult, ListPage, ListRequest};

/// Pull-based traversal of a paginated listing. Nothing is requested until
/// `next_page` is called, and each call issues at most one listing request;
/// a traversal cannot be restarted, construct a new one to re-list.
pub struct ObjectPages<'a> {
    client: &'a dyn adapters::ObjectClient,
    bucket: &'a str,
    request: ListRequest,
    done: bool,
}

impl<'a> ObjectPages<'a> {
    pub fn new(
        client: &'a dyn adapters::ObjectClient,
        bucket: &'a str,
        request: ListRequest,
    ) -> Self {
        Self {
            client,
            bucket,
            request,
            done: false,
        }
    }

    /// The next page, or `None` once the final page has been handed out.
    pub async fn next_page(&mut self) -> FSResult<Option<ListPage>> {
        if self.done {
            return Ok(None);
        }

        let page = self.client.fs_list_page(self.bucket, &self.request).await?;

        match (page.is_truncated, &page.next_continuation_token) {
            (true, Some(token)) => self.request.continuation_token = Some(token.clone()),
            _ => self.done = true,
        }

        Ok(Some(page))
    }

    /// The same traversal as a `Stream` of pages; lazy and single-use like
    /// `next_page`.
    pub fn into_stream(self) -> impl Stream<Item = FSResult<ListPage>> + 'a {
        futures::stream::try_unfold(self, |mut pages| async move {
            let page = pages.next_page().await?;
            Ok(page.map(|page| (page, pages)))
        })
    }

    /// Drains every remaining page and returns the flattened object
    /// summaries in page order.
    pub async fn collect_objects(mut self) -> FSResult<Vec<FSObject>> {
        let mut objects = Vec::new();
        while let Some(page) = self.next_page().await? {
            objects.extend(page.objects);
        }

        Ok(objects)
    }

    /// Drains every remaining page and returns the flattened common
    /// prefixes in page order.
    pub async fn collect_common_prefixes(mut self) -> FSResult<Vec<String>> {
        let mut prefixes = Vec::new();
        while let Some(page) = self.next_page().await? {
            prefixes.extend(page.common_prefixes);
        }

        Ok(prefixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockClient;
    use futures::TryStreamExt;

    fn seeded(page_size: i32, count: usize) -> MockClient {
        let mock = MockClient::with_page_size(page_size);
        for i in 0..count {
            mock.insert(&format!("media/{:02}.txt", i), b"x");
        }

        mock
    }

    #[tokio::test]
    async fn test_no_request_until_pulled() {
        let mock = seeded(2, 5);
        let mut pages = ObjectPages::new(
            &mock,
            "dummy-bucket",
            ListRequest {
                prefix: "media/".to_string(),
                ..Default::default()
            },
        );

        assert_eq!(mock.list_calls(), 0);

        pages.next_page().await.unwrap();
        assert_eq!(mock.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_pages_cover_listing_exactly_once() {
        let mock = seeded(2, 5);
        let mut pages = ObjectPages::new(
            &mock,
            "dummy-bucket",
            ListRequest {
                prefix: "media/".to_string(),
                ..Default::default()
            },
        );

        let mut sizes = Vec::new();
        let mut keys = Vec::new();
        while let Some(page) = pages.next_page().await.unwrap() {
            sizes.push(page.objects.len());
            keys.extend(page.objects.into_iter().map(|o| o.key));
        }

        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(
            keys,
            vec![
                "media/00.txt",
                "media/01.txt",
                "media/02.txt",
                "media/03.txt",
                "media/04.txt"
            ]
        );

        // exhausted traversals stay exhausted without another request
        assert!(pages.next_page().await.unwrap().is_none());
        assert_eq!(mock.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_single_page_listing() {
        let mock = seeded(1000, 3);
        let mut pages = ObjectPages::new(
            &mock,
            "dummy-bucket",
            ListRequest {
                prefix: "media/".to_string(),
                ..Default::default()
            },
        );

        let page = pages.next_page().await.unwrap().unwrap();
        assert_eq!(page.objects.len(), 3);
        assert!(!page.is_truncated);

        assert!(pages.next_page().await.unwrap().is_none());
        assert_eq!(mock.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let mock = MockClient::new();
        let mut pages = ObjectPages::new(
            &mock,
            "dummy-bucket",
            ListRequest {
                prefix: "media/".to_string(),
                ..Default::default()
            },
        );

        let page = pages.next_page().await.unwrap().unwrap();
        assert!(page.objects.is_empty());
        assert!(!page.is_truncated);
        assert!(pages.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stream_view() {
        let mock = seeded(2, 5);
        let pages = ObjectPages::new(
            &mock,
            "dummy-bucket",
            ListRequest {
                prefix: "media/".to_string(),
                ..Default::default()
            },
        );

        let collected: Vec<ListPage> = pages.into_stream().try_collect().await.unwrap();

        assert_eq!(collected.len(), 3);
        let total: usize = collected.iter().map(|p| p.objects.len()).sum();
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_collect_objects() {
        let mock = seeded(2, 5);
        let pages = ObjectPages::new(
            &mock,
            "dummy-bucket",
            ListRequest {
                prefix: "media/".to_string(),
                ..Default::default()
            },
        );

        let objects = pages.collect_objects().await.unwrap();
        assert_eq!(objects.len(), 5);
    }

    #[tokio::test]
    async fn test_collect_common_prefixes() {
        let mock = MockClient::with_page_size(1);
        mock.insert("media/a/1.txt", b"x");
        mock.insert("media/b/2.txt", b"x");
        mock.insert("media/c.txt", b"x");

        let pages = ObjectPages::new(
            &mock,
            "dummy-bucket",
            ListRequest {
                prefix: "media/".to_string(),
                delimiter: Some("/".to_string()),
                ..Default::default()
            },
        );

        let prefixes = pages.collect_common_prefixes().await.unwrap();
        assert_eq!(prefixes, vec!["media/a/", "media/b/"]);
    }
}
