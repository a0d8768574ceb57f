//! Owned HTML content tree.
//!
//! The primary entry is parsed with `scraper` and copied into plain owned
//! nodes for the converter to walk. The decoded source is kept alongside so
//! the HTML fallback can reparse it into a mutable DOM.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::Html;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    Element(ElementNode),
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    pub name: String,
    /// Attributes in document order.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<ContentNode>,
}

impl ElementNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child_element(&self, name: &str) -> Option<&ElementNode> {
        self.children.iter().find_map(|child| match child {
            ContentNode::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }
}

fn collect_text(nodes: &[ContentNode], out: &mut String) {
    for node in nodes {
        match node {
            ContentNode::Text(text) => out.push_str(text),
            ContentNode::Element(element) => collect_text(&element.children, out),
            ContentNode::Comment(_) | ContentNode::Doctype(_) => {}
        }
    }
}

/// A parsed document: the top-level nodes below the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDocument {
    pub nodes: Vec<ContentNode>,
    source: String,
}

impl ContentDocument {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let nodes = document
            .tree
            .root()
            .children()
            .filter_map(owned_node)
            .collect();
        Self {
            nodes,
            source: html.to_string(),
        }
    }

    /// The decoded HTML this document was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root_element(&self) -> Option<&ElementNode> {
        self.nodes.iter().find_map(|node| match node {
            ContentNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn body(&self) -> Option<&ElementNode> {
        self.root_element()?.child_element("body")
    }
}

fn owned_node(node: NodeRef<'_, Node>) -> Option<ContentNode> {
    match node.value() {
        Node::Element(element) => Some(ContentNode::Element(ElementNode {
            name: element.name().to_string(),
            attrs: element
                .attrs()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            children: node.children().filter_map(owned_node).collect(),
        })),
        Node::Text(text) => Some(ContentNode::Text(String::from(&**text))),
        Node::Comment(comment) => Some(ContentNode::Comment(String::from(&**comment))),
        Node::Doctype(doctype) => Some(ContentNode::Doctype(doctype.name().to_string())),
        _ => None,
    }
}
