use crate::contacts::Contact;
use crate::error::FetchError;

/// What `fetch_photo` downloads: an explicit photo url or a contact's photo link.
#[derive(Debug, Clone, Copy)]
pub enum PhotoRef<'a> {
    Url(&'a str),
    OfContact(&'a Contact),
}

impl<'a> PhotoRef<'a> {
    /// Resolves to the url to GET, failing when a contact has no photo link.
    pub fn resolve(&self) -> Result<&'a str, FetchError> {
        match *self {
            PhotoRef::Url(url) => Ok(url),
            PhotoRef::OfContact(contact) => contact.photo_url.as_deref().ok_or(FetchError::NoPhoto),
        }
    }
}

impl<'a> From<&'a str> for PhotoRef<'a> {
    fn from(url: &'a str) -> Self {
        PhotoRef::Url(url)
    }
}

impl<'a> From<&'a Contact> for PhotoRef<'a> {
    fn from(contact: &'a Contact) -> Self {
        PhotoRef::OfContact(contact)
    }
}
