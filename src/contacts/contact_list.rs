use serde::Serialize;

use crate::contacts::Contact;

/// Accumulated result of one or more fetches.
///
/// Feed metadata is overwritten by every parsed page, contacts are only
/// ever appended. Fetching twice into the same list appends a second copy;
/// start from a fresh list for a fresh result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactList {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub contacts: Vec<Contact>,
}

impl ContactList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contact> {
        self.contacts.iter()
    }

    pub fn primary_emails(&self) -> impl Iterator<Item = &str> {
        self.contacts.iter().map(Contact::primary_email)
    }

    pub(crate) fn push(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }
}

impl<'a> IntoIterator for &'a ContactList {
    type Item = &'a Contact;
    type IntoIter = std::slice::Iter<'a, Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.contacts.iter()
    }
}
