use serde::Serialize;

/// One address book entry.
///
/// Invariant: `emails` is never empty, the first element is the primary
/// email and the rest are alternates in feed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub title: String,
    pub emails: Vec<String>,
    pub instant_messages: Vec<InstantMessage>,
    pub phone_numbers: Vec<PhoneNumber>,
    pub addresses: Vec<PostalAddress>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstantMessage {
    pub address: String,
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneNumber {
    pub number: String,
    /// relation uri, e.g. `http://schemas.google.com/g/2005#mobile`
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostalAddress {
    /// may span several lines
    pub text: String,
    pub kind: String,
}

impl Contact {
    /// First email. Empty only for a hand-built contact without emails,
    /// which the parser never produces.
    pub fn primary_email(&self) -> &str {
        self.emails.first().map(String::as_str).unwrap_or_default()
    }

    pub fn alternate_emails(&self) -> &[String] {
        self.emails.get(1..).unwrap_or_default()
    }
}
