use tracing::debug;

use crate::contacts::{Contact, ContactList, InstantMessage, PhoneNumber, PostalAddress};
use crate::error::{ContactsError, ParseError};
use crate::feed::document::{parse_document, Element, Ns};
use crate::feed::walker::PageHandler;
use crate::observability::metrics::get_metrics;

pub const PHOTO_REL: &str = "http://schemas.google.com/contacts/2008/rel#photo";
pub const NEXT_REL: &str = "next";

/// Outcome of parsing one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub appended: usize,
    /// entries dropped for lacking a primary email
    pub skipped: usize,
    /// href of the feed's `next` link
    pub next: Option<String>,
}

/// Parses feed pages into a borrowed [`ContactList`], appending as it goes.
#[derive(Debug)]
pub struct FeedParser<'a> {
    contacts: &'a mut ContactList,
    appended: usize,
    skipped: usize,
}

impl<'a> FeedParser<'a> {
    pub fn new(contacts: &'a mut ContactList) -> Self {
        Self { contacts, appended: 0, skipped: 0 }
    }

    /// Contacts appended over every page handled so far.
    pub fn appended(&self) -> usize {
        self.appended
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn parse(&mut self, body: &[u8]) -> Result<PageSummary, ParseError> {
        let result = parse_page(body, self.contacts);
        let metrics = get_metrics();
        match &result {
            Ok(summary) => {
                self.appended += summary.appended;
                self.skipped += summary.skipped;
                metrics.contacts_parsed.inc_by(summary.appended as u64);
                metrics.entries_skipped.inc_by(summary.skipped as u64);
            }
            Err(e) => debug!("page parse failed: {}", e),
        }
        result
    }
}

impl PageHandler for FeedParser<'_> {
    fn handle_page(&mut self, body: &[u8]) -> Result<Option<String>, ContactsError> {
        Ok(self.parse(body)?.next)
    }
}

/// Parses one page: feed metadata overwrites what `contacts` holds, entries
/// with a primary email are appended in document order.
///
/// A parse error stops the page; contacts appended from earlier entries stay.
pub fn parse_page(body: &[u8], contacts: &mut ContactList) -> Result<PageSummary, ParseError> {
    let feed = parse_document(body)?;
    if !feed.is(Ns::Atom, "feed") {
        return Err(ParseError::UnexpectedRoot(feed.name.clone()));
    }

    // all four fields or none: a bad envelope leaves the previous page's metadata
    let id = required_text(&feed, Ns::Atom, "id")?;
    let title = required_text(&feed, Ns::Atom, "title")?;
    let author = feed
        .child(Ns::Atom, "author")
        .ok_or(ParseError::MissingFeedField("author"))?;
    let author_name = required_text(author, Ns::Atom, "name").map_err(|_| ParseError::MissingFeedField("author/name"))?;
    let author_email = required_text(author, Ns::Atom, "email").map_err(|_| ParseError::MissingFeedField("author/email"))?;

    contacts.id = Some(id);
    contacts.title = Some(title);
    contacts.author_name = Some(author_name);
    contacts.author_email = Some(author_email);

    let mut summary = PageSummary::default();
    for (index, entry) in feed.children(Ns::Atom, "entry").enumerate() {
        match parse_entry(index, entry)? {
            Some(contact) => {
                contacts.push(contact);
                summary.appended += 1;
            }
            None => summary.skipped += 1,
        }
    }

    summary.next = match feed
        .children(Ns::Atom, "link")
        .find(|link| link.attr("rel") == Some(NEXT_REL))
    {
        Some(link) => Some(
            link.attr("href")
                .ok_or(ParseError::MissingFeedField("link[rel=next]/href"))?
                .to_owned(),
        ),
        None => None,
    };

    debug!(
        appended = summary.appended,
        skipped = summary.skipped,
        has_next = summary.next.is_some(),
        "feed page parsed"
    );
    Ok(summary)
}

/// `None` when the entry has no primary email.
fn parse_entry(index: usize, entry: &Element) -> Result<Option<Contact>, ParseError> {
    let title = entry
        .descendants(Ns::Atom, "title")
        .first()
        .map(|t| t.text().to_owned())
        .ok_or(ParseError::MissingEntryField { index, field: "title" })?;

    let emails = entry.descendants(Ns::GData, "email");
    let Some(primary) = emails.iter().find(|e| e.has_attr("primary")) else {
        debug!(index, title = %title, "entry without primary email skipped");
        return Ok(None);
    };

    let mut addresses = vec![attr_or_empty(primary, "address")];
    addresses.extend(
        emails
            .iter()
            .filter(|e| !e.has_attr("primary"))
            .map(|e| attr_or_empty(e, "address")),
    );

    let instant_messages = entry
        .descendants(Ns::GData, "im")
        .into_iter()
        .map(|im| InstantMessage {
            address: attr_or_empty(im, "address"),
            protocol: attr_or_empty(im, "protocol"),
        })
        .collect();

    let phone_numbers = entry
        .descendants(Ns::GData, "phoneNumber")
        .into_iter()
        .map(|phone| PhoneNumber {
            number: phone.text().to_owned(),
            kind: attr_or_empty(phone, "rel"),
        })
        .collect();

    let postal_addresses = entry
        .descendants(Ns::GData, "postalAddress")
        .into_iter()
        .map(|address| PostalAddress {
            text: address.text().to_owned(),
            kind: attr_or_empty(address, "rel"),
        })
        .collect();

    let photo_url = entry
        .descendants(Ns::Atom, "link")
        .into_iter()
        .find(|link| link.attr("rel") == Some(PHOTO_REL))
        .and_then(|link| link.attr("href"))
        .map(str::to_owned);

    Ok(Some(Contact {
        title,
        emails: addresses,
        instant_messages,
        phone_numbers,
        addresses: postal_addresses,
        photo_url,
    }))
}

fn required_text(parent: &Element, ns: Ns, name: &'static str) -> Result<String, ParseError> {
    parent
        .child(ns, name)
        .map(|e| e.text().to_owned())
        .ok_or(ParseError::MissingFeedField(name))
}

fn attr_or_empty(element: &Element, name: &str) -> String {
    element.attr(name).unwrap_or_default().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE1: &str = include_str!("../tests/fixtures/contacts_page1.xml");
    const PAGE2: &str = include_str!("../tests/fixtures/contacts_page2.xml");

    fn eric() -> Contact {
        Contact {
            title: "Eric".into(),
            emails: vec!["eric@example.com".into(), "eric@example.net".into()],
            instant_messages: vec![InstantMessage {
                address: "example".into(),
                protocol: "http://schemas.google.com/g/2005#AIM".into(),
            }],
            phone_numbers: vec![PhoneNumber {
                number: "999 555 1212".into(),
                kind: "http://schemas.google.com/g/2005#mobile".into(),
            }],
            addresses: vec![PostalAddress {
                text: "123 Any Street\nAnyTown, ZZ 99999".into(),
                kind: "http://schemas.google.com/g/2005#home".into(),
            }],
            photo_url: Some("http://www.google.com/m8/feeds/photos/media/eric%40example.com/18".into()),
        }
    }

    fn simple(title: &str, email: &str, photo: &str) -> Contact {
        Contact {
            title: title.into(),
            emails: vec![email.into()],
            instant_messages: vec![],
            phone_numbers: vec![],
            addresses: vec![],
            photo_url: Some(photo.into()),
        }
    }

    #[test]
    fn parses_first_page() {
        let mut list = ContactList::new();
        let summary = parse_page(PAGE1.as_bytes(), &mut list).unwrap();

        assert_eq!(list.id.as_deref(), Some("eric@example.com"));
        assert_eq!(list.title.as_deref(), Some("drbrain's Contacts"));
        assert_eq!(list.author_name.as_deref(), Some("drbrain"));
        assert_eq!(list.author_email.as_deref(), Some("eric@example.com"));

        let sean = simple("Sean", "sean@example.com", "http://www.google.com/m8/feeds/photos/media/eric%40example.com/0");
        assert_eq!(list.contacts, vec![sean, eric()]);
        assert_eq!(summary.appended, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            summary.next.as_deref(),
            Some("http://www.google.com/m8/feeds/contacts/eric%40example.com/full?start-index=4&max-results=3")
        );
    }

    #[test]
    fn second_page_appends_and_overwrites_metadata() {
        let mut list = ContactList::new();
        parse_page(PAGE1.as_bytes(), &mut list).unwrap();
        let summary = parse_page(PAGE2.as_bytes(), &mut list).unwrap();

        assert_eq!(summary.next, None);
        assert_eq!(list.title.as_deref(), Some("Eric's Contacts"));
        assert_eq!(list.author_name.as_deref(), Some("Eric Hodel"));

        let titles: Vec<&str> = list.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Sean", "Eric", "Coby"]);
        assert_eq!(
            list.contacts[2].photo_url.as_deref(),
            Some("http://www.google.com/m8/feeds/photos/media/eric%40example.com/5834fb5d0b47bfd7")
        );
    }

    #[test]
    fn primary_email_comes_first_even_when_listed_last() {
        let page = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:gd="http://schemas.google.com/g/2005">
  <id>x</id><title>t</title><author><name>n</name><email>e</email></author>
  <entry>
    <title>Dana</title>
    <gd:email address="dana@work.example"/>
    <gd:email address="dana@home.example"/>
    <gd:email address="dana@example.com" primary="true"/>
  </entry>
</feed>"#;
        let mut list = ContactList::new();
        parse_page(page.as_bytes(), &mut list).unwrap();

        let dana = &list.contacts[0];
        assert_eq!(dana.primary_email(), "dana@example.com");
        assert_eq!(dana.alternate_emails(), ["dana@work.example".to_string(), "dana@home.example".to_string()]);
        assert_eq!(dana.photo_url, None);
        assert!(dana.phone_numbers.is_empty());
    }

    #[test]
    fn entry_without_title_is_an_error() {
        let page = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:gd="http://schemas.google.com/g/2005">
  <id>x</id><title>t</title><author><name>n</name><email>e</email></author>
  <entry><title>First</title><gd:email address="a@example.com" primary="true"/></entry>
  <entry><gd:email address="b@example.com" primary="true"/></entry>
</feed>"#;
        let mut list = ContactList::new();
        let err = parse_page(page.as_bytes(), &mut list).unwrap_err();

        assert!(matches!(err, ParseError::MissingEntryField { index: 1, field: "title" }));
        // the entry before the broken one stays
        assert_eq!(list.len(), 1);
        assert_eq!(list.contacts[0].title, "First");
    }

    #[test]
    fn feed_without_author_is_an_error() {
        let page = r#"<feed xmlns="http://www.w3.org/2005/Atom"><id>x</id><title>t</title></feed>"#;
        let err = parse_page(page.as_bytes(), &mut ContactList::new()).unwrap_err();
        assert!(matches!(err, ParseError::MissingFeedField("author")));
    }

    #[test]
    fn broken_envelope_keeps_previous_metadata() {
        let mut list = ContactList::new();
        parse_page(PAGE1.as_bytes(), &mut list).unwrap();

        let page = r#"<feed xmlns="http://www.w3.org/2005/Atom"><id>other</id><title>Other</title><author><name>n</name></author></feed>"#;
        let err = parse_page(page.as_bytes(), &mut list).unwrap_err();

        assert!(matches!(err, ParseError::MissingFeedField("author/email")));
        assert_eq!(list.id.as_deref(), Some("eric@example.com"));
        assert_eq!(list.title.as_deref(), Some("drbrain's Contacts"));
        assert_eq!(list.author_name.as_deref(), Some("drbrain"));
        assert_eq!(list.author_email.as_deref(), Some("eric@example.com"));
    }

    #[test]
    fn feed_without_id_is_an_error() {
        let page = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>t</title><author><name>n</name><email>e</email></author></feed>"#;
        let err = parse_page(page.as_bytes(), &mut ContactList::new()).unwrap_err();
        assert!(matches!(err, ParseError::MissingFeedField("id")));
    }

    #[test]
    fn non_atom_root_is_rejected() {
        let err = parse_page(b"<rss version=\"2.0\"><channel/></rss>", &mut ContactList::new()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedRoot(ref name) if name == "rss"));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = parse_page(b"<feed xmlns=\"http://www.w3.org/2005/Atom\"><id>x</title></feed>", &mut ContactList::new()).unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));
    }

    #[test]
    fn feed_parser_tracks_totals_across_pages() {
        let mut list = ContactList::new();
        let mut parser = FeedParser::new(&mut list);

        assert!(parser.handle_page(PAGE1.as_bytes()).unwrap().is_some());
        assert!(parser.handle_page(PAGE2.as_bytes()).unwrap().is_none());
        assert_eq!(parser.appended(), 3);
        assert_eq!(parser.skipped(), 1);
        assert_eq!(list.len(), 3);
    }
}
