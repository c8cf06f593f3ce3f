//! Minimal XML element tree
//!
//! SOAP payloads are small and fully buffered, so the whole document is read
//! into a tree of [`XmlElement`]s. Element names keep only their local part.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One XML element with its attributes, children and text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Local name (prefix stripped)
    pub name: String,
    /// Attributes by qualified name, in document order
    pub attributes: Vec<(String, String)>,
    /// Child elements, in document order
    pub children: Vec<XmlElement>,
    /// Concatenated text content (unescaped, untrimmed)
    pub text: String,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::xml(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    /// Attribute value by qualified name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given local name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child with the given local name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Depth-first search over this element and its descendants
    pub fn descendants<'a>(&'a self, name: &'a str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            found.push(self);
        }
        for child in &self.children {
            child.collect_named(name, found);
        }
    }
}

/// Parse a complete document into its root element
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::xml(format!("at byte {}: {e}", reader.buffer_position()))
        })?;
        match event {
            Event::Start(start) => stack.push(XmlElement::from_start(&start)?),
            Event::Empty(start) => {
                let element = XmlElement::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::xml("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| Error::xml(e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| Error::xml("document has no root element"))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::xml("multiple root elements")),
    }
    Ok(())
}

/// Whether `name` can be used as an unprefixed element name
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
