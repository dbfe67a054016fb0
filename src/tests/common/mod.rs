// tests/common/mod.rs
use std::time::Duration;

use httpmock::MockServer;

use crate::config::endpoints::Endpoints;
use crate::transport::HttpTransport;

pub const PAGE1: &str = include_str!("../fixtures/contacts_page1.xml");
pub const PAGE2: &str = include_str!("../fixtures/contacts_page2.xml");

/// `next` link of the first fixture page, as written in the xml.
pub const FIXTURE_NEXT_HREF: &str =
    "http://www.google.com/m8/feeds/contacts/eric%40example.com/full?start-index=4&amp;max-results=3";

/// First fixture page with its `next` link pointed at `path` on the mock server.
pub fn page1_linking_to(server: &MockServer, path: &str) -> String {
    PAGE1.replace(FIXTURE_NEXT_HREF, &server.url(path))
}

/// Both AuthSub and feed endpoints served by the mock server.
pub fn endpoints_for(server: &MockServer) -> Endpoints {
    Endpoints::new(server.base_url(), server.base_url())
}

pub fn http_transport() -> HttpTransport {
    http_transport_with_timeout(Duration::from_secs(5))
}

pub fn http_transport_with_timeout(timeout: Duration) -> HttpTransport {
    HttpTransport::new(timeout).expect("reqwest client")
}

pub fn authsub(token: &str) -> String {
    format!("AuthSub token=\"{}\"", token)
}
