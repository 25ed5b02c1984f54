//! A small namespace-aware element tree built with `quick-xml`.
//!
//! Providers only need two kinds of lookup: "every element with this
//! namespace and local name, in document order" and "the first child with
//! this name". This module builds an owned tree once and answers both.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::{GeocodeError, Result};

/// An element with its resolved namespace, attributes and text content.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Element {
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<Element> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (ns, event) = reader.read_resolved_event()?;
            match event {
                Event::Start(start) => {
                    stack.push(Element::open(ns, &start)?);
                }
                Event::Empty(start) => {
                    let element = Element::open(ns, &start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element)?;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(GeocodeError::MalformedResponse {
                reason: format!("unclosed element <{}>", open.name),
            });
        }

        root.ok_or_else(|| GeocodeError::MalformedResponse {
            reason: "document has no root element".to_string(),
        })
    }

    fn open(ns: ResolveResult, start: &BytesStart) -> Result<Element> {
        let namespace = match ns {
            ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
            _ => None,
        };

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            attributes.push((key, attr.unescape_value()?.into_owned()));
        }

        Ok(Element {
            namespace,
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    /// All elements (including `self`) with the given namespace and local
    /// name, in document order.
    pub fn descendants<'a>(&'a self, namespace: &str, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(namespace, name, &mut found);
        found
    }

    fn collect<'a>(&'a self, namespace: &str, name: &str, found: &mut Vec<&'a Element>) {
        if self.name == name && self.namespace.as_deref() == Some(namespace) {
            found.push(self);
        }
        for child in &self.children {
            child.collect(namespace, name, found);
        }
    }

    /// Text of every matching descendant, in document order.
    pub fn texts(&self, namespace: &str, name: &str) -> Vec<&str> {
        self.descendants(namespace, name)
            .into_iter()
            .map(|e| e.text.as_str())
            .collect()
    }

    /// First direct child with the given local name, any namespace.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Value of the attribute with the given local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Attach a finished element to its parent, or make it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(GeocodeError::MalformedResponse {
                reason: format!("second root element <{}>", element.name),
            })
        }
    }
    Ok(())
}
