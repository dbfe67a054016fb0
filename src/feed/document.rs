use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::ParseError;

pub const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";
pub const GDATA_NS: &[u8] = b"http://schemas.google.com/g/2005";

/// Feeds nest a handful of levels; anything deeper is not a contacts feed.
const MAX_DEPTH: usize = 64;

/// Namespaces the parser cares about, resolved from the document's own prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ns {
    Atom,
    GData,
    Other,
}

impl Ns {
    fn from_resolved(resolved: &ResolveResult) -> Self {
        match resolved {
            ResolveResult::Bound(Namespace(ns)) if *ns == ATOM_NS => Ns::Atom,
            ResolveResult::Bound(Namespace(ns)) if *ns == GDATA_NS => Ns::GData,
            _ => Ns::Other,
        }
    }
}

/// One element with its attributes, direct text and child elements.
#[derive(Debug, Clone)]
pub struct Element {
    pub ns: Ns,
    pub name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn open(ns: Ns, start: &BytesStart<'_>) -> Result<Self, ParseError> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ParseError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            ns,
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    pub fn is(&self, ns: Ns, name: &str) -> bool {
        self.ns == ns && self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Text directly inside this element, untrimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn child(&self, ns: Ns, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(ns, name))
    }

    pub fn children<'a>(&'a self, ns: Ns, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(ns, name))
    }

    /// All matching elements below this one, in document order.
    pub fn descendants<'a>(&'a self, ns: Ns, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(ns, name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, ns: Ns, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.is(ns, name) {
                found.push(child);
            }
            child.collect_descendants(ns, name, found);
        }
    }
}

/// Reads a whole document into its root [`Element`].
pub fn parse_document(body: &[u8]) -> Result<Element, ParseError> {
    let mut reader = NsReader::from_reader(body);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf).map_err(xml_error)?;
        let ns = Ns::from_resolved(&resolved);
        match event {
            Event::Start(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(ParseError::Xml(format!(
                        "nesting depth exceeds maximum of {} levels",
                        MAX_DEPTH
                    )));
                }
                stack.push(Element::open(ns, &start)?);
            }
            Event::Empty(start) => {
                let element = Element::open(ns, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::Xml("unbalanced closing tag".to_owned()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(data) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ParseError::Xml("document ended inside an open element".to_owned()));
    }
    root.ok_or_else(|| ParseError::Xml("document has no root element".to_owned()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ParseError::Xml("more than one root element".to_owned())),
    }
    Ok(())
}

fn xml_error<E: std::fmt::Display>(err: E) -> ParseError {
    ParseError::Xml(err.to_string())
}
