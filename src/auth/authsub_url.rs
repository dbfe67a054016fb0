use url::form_urlencoded::byte_serialize;

use crate::config::endpoints::Endpoints;

/// Scope of the contacts feed, already url-encoded.
pub const CONTACTS_SCOPE: &str = "http%3A%2F%2Fwww.google.com%2Fm8%2Ffeeds%2F";

/// Builds the AuthSubRequest url a user visits to grant contact access.
///
/// `next_url` is where the service sends the user back with a token.
/// Parameters are rendered `key=value` and sorted before joining, so equal
/// inputs always give byte-identical urls. `hd` is left out entirely when no
/// hosted domain is given.
pub fn build_authorization_url(
    endpoints: &Endpoints,
    next_url: &str,
    secure: bool,
    session: bool,
    domain: Option<&str>,
) -> String {
    let mut query: Vec<(&str, String)> = vec![
        ("next", encode(next_url)),
        ("scope", CONTACTS_SCOPE.to_owned()),
        ("secure", flag(secure).to_owned()),
        ("session", flag(session).to_owned()),
    ];
    if let Some(domain) = domain {
        query.push(("hd", encode(domain)));
    }
    query.sort_by(|a, b| a.0.cmp(b.0));

    let query = query
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", endpoints.auth_request_url(), query)
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
