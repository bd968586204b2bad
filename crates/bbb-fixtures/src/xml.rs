//! Owned XML trees for mock server replies.
//!
//! Replies are parsed with `sxd_document` and copied into [`XmlNode`]s so
//! they can outlive the parser's arena. CDATA sections arrive as plain text
//! and whitespace-only text nodes are dropped, so
//! `<recordID><![CDATA[abc]]></recordID>` and `<recordID>abc</recordID>`
//! read the same.

use crate::errors::FixtureError;
use serde_json::{Map, Value};
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};
use sxd_document::parser;

/// An XML element with its attributes, text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated non-blank text content; `None` when there is none.
    pub text: Option<String>,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Parse an XML document and return its root element.
    ///
    /// # Errors
    ///
    /// `Transport` when the body is not well-formed XML or has no root
    /// element.
    pub fn parse(xml: &str) -> Result<Self, FixtureError> {
        let package = parser::parse(xml).map_err(|e| {
            FixtureError::Transport(format!("Mock server reply is not valid XML: {:?}", e))
        })?;
        let document = package.as_document();

        document
            .root()
            .children()
            .into_iter()
            .find_map(|child| match child {
                ChildOfRoot::Element(element) => Some(Self::from_element(element)),
                _ => None,
            })
            .ok_or_else(|| {
                FixtureError::Transport("Mock server reply has no root element".to_string())
            })
    }

    fn from_element(element: Element<'_>) -> Self {
        let attributes = element
            .attributes()
            .into_iter()
            .map(|a| (a.name().local_part().to_string(), a.value().to_string()))
            .collect();

        let mut text = String::new();
        let mut children = Vec::new();

        for child in element.children() {
            match child {
                ChildOfElement::Element(e) => children.push(Self::from_element(e)),
                ChildOfElement::Text(t) => {
                    if !t.text().trim().is_empty() {
                        text.push_str(t.text());
                    }
                }
                _ => {}
            }
        }

        Self {
            name: element.name().local_part().to_string(),
            attributes,
            text: (!text.is_empty()).then_some(text),
            children,
        }
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first child element named `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.text.as_deref())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// JSON rendering of this element's content.
    ///
    /// Leaf elements become their text. Elements with children or attributes
    /// become objects keyed by child name, with repeated names collapsed
    /// into arrays. Attributes sit under `@attributes` and the element's own
    /// text, if any, under `#text`.
    pub fn to_json(&self) -> Value {
        if self.children.is_empty() && self.attributes.is_empty() {
            return Value::String(self.text.clone().unwrap_or_default());
        }

        let mut object = Map::new();

        if !self.attributes.is_empty() {
            let attributes = self
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            object.insert("@attributes".to_string(), Value::Object(attributes));
        }

        if let Some(text) = &self.text {
            object.insert("#text".to_string(), Value::String(text.clone()));
        }

        for child in &self.children {
            let value = child.to_json();
            match object.get_mut(&child.name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    object.insert(child.name.clone(), value);
                }
            }
        }

        Value::Object(object)
    }
}
