use std::time::Instant;

use tracing::{debug, info};
use url::Url;

use crate::error::{ContactsError, FetchError};
use crate::observability::metrics::get_metrics;
use crate::transport::{ensure_success, RequestKind, Transport};

/// Consumes one fetched page and returns the page's `next` link, if any.
pub trait PageHandler {
    fn handle_page(&mut self, body: &[u8]) -> Result<Option<String>, ContactsError>;
}

/// Follows a feed's `next` links until a page comes without one.
///
/// Termination depends on the feed; `max_pages` bounds a feed that never
/// stops linking onwards.
pub struct PageWalker<'a, T: Transport> {
    transport: &'a T,
    authorization: String,
    max_pages: Option<u32>,
}

impl<'a, T: Transport> PageWalker<'a, T> {
    pub fn new(transport: &'a T, authorization: String) -> Self {
        Self {
            transport,
            authorization,
            max_pages: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Walks the feed from `start_url`, returning the number of pages handled.
    pub async fn walk<H: PageHandler>(&self, start_url: Url, handler: &mut H) -> Result<u32, ContactsError> {
        let mut url = start_url;
        let mut pages: u32 = 0;

        loop {
            if let Some(limit) = self.max_pages {
                if pages >= limit {
                    return Err(FetchError::PageLimitExceeded(limit).into());
                }
            }

            let body = self.fetch_page(&url).await?;
            pages += 1;

            match handler.handle_page(&body)? {
                Some(next) => {
                    url = resolve_next(&url, &next)?;
                    debug!("page {} links next page {}", pages, url);
                }
                None => {
                    info!("feed walk finished after {} pages", pages);
                    return Ok(pages);
                }
            }
        }
    }

    async fn fetch_page(&self, url: &Url) -> Result<Vec<u8>, ContactsError> {
        let metrics = get_metrics();
        let start = Instant::now();

        let result = match self.transport.get(url.as_str(), &self.authorization).await {
            Ok(response) => ensure_success(RequestKind::Resource, url.as_str(), response),
            Err(err) => Err(err.into()),
        };
        metrics.page_fetch_duration.observe(start.elapsed().as_secs_f64());

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics.page_fetches.with_label_values(&[outcome]).inc();
        Ok(result?.body)
    }
}

/// `next` links are normally absolute; relative ones resolve against the page they came from.
fn resolve_next(current: &Url, next: &str) -> Result<Url, FetchError> {
    current.join(next).map_err(|e| FetchError::InvalidUrl {
        url: next.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use http::StatusCode;

    use super::*;
    use crate::transport::recording::RecordingTransport;

    /// Returns scripted next links and keeps the bodies it saw.
    struct Script {
        next_links: VecDeque<Option<String>>,
        bodies: Vec<String>,
    }

    impl Script {
        fn new(next_links: &[Option<&str>]) -> Self {
            Self {
                next_links: next_links.iter().map(|n| n.map(str::to_owned)).collect(),
                bodies: Vec::new(),
            }
        }
    }

    impl PageHandler for Script {
        fn handle_page(&mut self, body: &[u8]) -> Result<Option<String>, ContactsError> {
            self.bodies.push(String::from_utf8_lossy(body).into_owned());
            Ok(self.next_links.pop_front().flatten())
        }
    }

    fn start() -> Url {
        Url::parse("http://feeds.example/m8/feeds/contacts/a%40b.c/full").unwrap()
    }

    #[tokio::test]
    async fn follows_next_links_in_order() {
        let transport = RecordingTransport::new().ok("one").ok("two").ok("three");
        let mut script = Script::new(&[
            Some("http://feeds.example/m8/feeds/contacts/a%40b.c/full?start-index=26"),
            Some("http://feeds.example/m8/feeds/contacts/a%40b.c/full?start-index=51"),
            None,
        ]);

        let pages = PageWalker::new(&transport, "AuthSub token=\"t\"".into())
            .walk(start(), &mut script)
            .await
            .unwrap();

        assert_eq!(pages, 3);
        assert_eq!(script.bodies, ["one", "two", "three"]);
        assert_eq!(
            transport.urls(),
            [
                "http://feeds.example/m8/feeds/contacts/a%40b.c/full",
                "http://feeds.example/m8/feeds/contacts/a%40b.c/full?start-index=26",
                "http://feeds.example/m8/feeds/contacts/a%40b.c/full?start-index=51",
            ]
        );
        assert!(transport.requests().iter().all(|r| r.authorization == "AuthSub token=\"t\""));
    }

    #[tokio::test]
    async fn relative_next_link_resolves_against_current_page() {
        let transport = RecordingTransport::new().ok("one").ok("two");
        let mut script = Script::new(&[Some("full?start-index=3&max-results=2"), None]);

        PageWalker::new(&transport, String::new())
            .walk(start(), &mut script)
            .await
            .unwrap();

        assert_eq!(
            transport.urls()[1],
            "http://feeds.example/m8/feeds/contacts/a%40b.c/full?start-index=3&max-results=2"
        );
    }

    #[tokio::test]
    async fn failure_status_stops_the_walk() {
        let transport = RecordingTransport::new()
            .ok("one")
            .respond(StatusCode::NOT_FOUND, "gone");
        let mut script = Script::new(&[Some("http://feeds.example/page2"), Some("http://feeds.example/page3")]);

        let err = PageWalker::new(&transport, String::new())
            .walk(start(), &mut script)
            .await
            .unwrap_err();

        match err {
            ContactsError::Fetch(FetchError::Status { url, status, .. }) => {
                assert_eq!(url, "http://feeds.example/page2");
                assert_eq!(status, StatusCode::NOT_FOUND);
            }
            e => panic!("Expected FetchError::Status, got {:?}", e),
        }
        assert_eq!(script.bodies, ["one"]);
    }

    #[tokio::test]
    async fn page_limit_stops_endless_feed() {
        let transport = RecordingTransport::new().ok("a").ok("b").ok("c");
        let mut script = Script::new(&[
            Some("http://feeds.example/2"),
            Some("http://feeds.example/3"),
            Some("http://feeds.example/4"),
        ]);

        let err = PageWalker::new(&transport, String::new())
            .with_max_pages(Some(2))
            .walk(start(), &mut script)
            .await
            .unwrap_err();

        assert!(matches!(err, ContactsError::Fetch(FetchError::PageLimitExceeded(2))));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn page_limit_allows_feed_that_ends_in_time() {
        let transport = RecordingTransport::new().ok("a").ok("b");
        let mut script = Script::new(&[Some("http://feeds.example/2"), None]);

        let pages = PageWalker::new(&transport, String::new())
            .with_max_pages(Some(2))
            .walk(start(), &mut script)
            .await
            .unwrap();
        assert_eq!(pages, 2);
    }
}
