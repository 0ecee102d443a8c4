//! Minimal element tree over `quick-xml` events.
//!
//! Only elements and their attributes are kept; text, comments and
//! processing instructions are dropped. The tree gives the report parser
//! child/descendant queries without hand-tracking reader state.

use crate::error::ScanwiseError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Deepest element nesting accepted in a document.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ScanwiseError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All descendants (not including `self`) with the given name, in
    /// document order.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        let mut pending: Vec<&'a Element> = self.children.iter().rev().collect();

        while let Some(element) = pending.pop() {
            if element.name == name {
                found.push(element);
            }
            pending.extend(element.children.iter().rev());
        }

        found
    }
}

/// Parse a complete document and return its root element.
///
/// Fails on mismatched or unclosed tags, a missing root, more than one
/// root element, or nesting deeper than [`MAX_DEPTH`].
pub fn parse_document(bytes: &[u8]) -> Result<Element, ScanwiseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                check_depth(stack.len() + 1)?;
                stack.push(Element::from_start(&start)?);
            }
            Event::Empty(start) => {
                check_depth(stack.len() + 1)?;
                let element = Element::from_start(&start)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ScanwiseError::malformed("closing tag without opening tag"))?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ScanwiseError::malformed(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| ScanwiseError::malformed("document has no root element"))
}

fn check_depth(depth: usize) -> Result<(), ScanwiseError> {
    if depth > MAX_DEPTH {
        return Err(ScanwiseError::malformed(format!(
            "nesting too deep: more than {} levels",
            MAX_DEPTH
        )));
    }
    Ok(())
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), ScanwiseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ScanwiseError::malformed(format!(
            "extra content after root element: <{}>",
            element.name
        ))),
    }
}
