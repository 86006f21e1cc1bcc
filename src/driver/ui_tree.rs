//! Rendered UI hierarchy
//!
//! A screen is described as a tree of [`UiNode`]s and flattened into a
//! [`UiTree`] arena (document order) for locator evaluation.

use super::locator::{Locator, Strategy};
use super::xpath;
use crate::markup::escape_markup;
use crate::Error;

/// One widget in a rendered screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiNode {
    /// Stable identity across re-renders; derived from the tree path when empty
    pub key: String,
    pub class: String,
    pub resource_id: Option<String>,
    pub text: String,
    pub content_desc: Option<String>,
    pub displayed: bool,
    pub enabled: bool,
    pub children: Vec<UiNode>,
}

impl UiNode {
    pub fn new<S: Into<String>>(class: S) -> Self {
        Self {
            class: class.into(),
            displayed: true,
            enabled: true,
            ..Default::default()
        }
    }

    pub fn key<S: Into<String>>(mut self, key: S) -> Self {
        self.key = key.into();
        self
    }

    pub fn id<S: Into<String>>(mut self, resource_id: S) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn desc<S: Into<String>>(mut self, desc: S) -> Self {
        self.content_desc = Some(desc.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn displayed(mut self, displayed: bool) -> Self {
        self.displayed = displayed;
        self
    }

    pub fn child(mut self, child: UiNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I: IntoIterator<Item = UiNode>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }
}

/// Node of the flattened arena
#[derive(Debug, Clone)]
pub struct FlatNode {
    pub key: String,
    pub class: String,
    pub resource_id: Option<String>,
    pub text: String,
    pub content_desc: Option<String>,
    pub displayed: bool,
    pub enabled: bool,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl FlatNode {
    /// Attribute value as an automation server reports it
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "class" | "className" => Some(self.class.clone()),
            "resource-id" | "resourceId" => self.resource_id.clone(),
            "text" => Some(self.text.clone()),
            "content-desc" | "contentDescription" => self.content_desc.clone(),
            "name" => self
                .content_desc
                .clone()
                .or_else(|| Some(self.text.clone()).filter(|t| !t.is_empty())),
            "displayed" => Some(self.displayed.to_string()),
            "enabled" => Some(self.enabled.to_string()),
            _ => None,
        }
    }

    fn matches_id(&self, value: &str) -> bool {
        match &self.resource_id {
            Some(id) => id == value || id.rsplit_once(":id/").map(|(_, short)| short) == Some(value),
            None => false,
        }
    }
}

/// Flattened screen, root at index 0, nodes in document order
#[derive(Debug, Clone)]
pub struct UiTree {
    nodes: Vec<FlatNode>,
}

impl UiTree {
    /// Flatten `root`; nodes without a key get their tree path as key
    pub fn build(root: &UiNode) -> Self {
        let mut nodes = Vec::new();
        Self::flatten(root, None, "0".to_string(), &mut nodes);
        Self { nodes }
    }

    fn flatten(node: &UiNode, parent: Option<usize>, path: String, out: &mut Vec<FlatNode>) -> usize {
        let index = out.len();
        let key = if node.key.is_empty() { path.clone() } else { node.key.clone() };
        out.push(FlatNode {
            key,
            class: node.class.clone(),
            resource_id: node.resource_id.clone(),
            text: node.text.clone(),
            content_desc: node.content_desc.clone(),
            displayed: node.displayed,
            enabled: node.enabled,
            parent,
            children: Vec::new(),
        });

        for (i, child) in node.children.iter().enumerate() {
            let child_index = Self::flatten(child, Some(index), format!("{}/{}", path, i), out);
            out[index].children.push(child_index);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &FlatNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    /// Index of the node with `key`
    pub fn position(&self, key: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.key == key)
    }

    /// Indices of every node under `index`, in document order
    pub fn descendants(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[index].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }

    /// Evaluate a locator; matches come back in document order
    pub fn find_all(&self, locator: &Locator) -> Result<Vec<usize>, Error> {
        let value = locator.value();
        let matches = match locator.strategy() {
            Strategy::Id => self.filter(|n| n.matches_id(value)),
            Strategy::AccessibilityId => self.filter(|n| n.content_desc.as_deref() == Some(value)),
            Strategy::ClassName => self.filter(|n| n.class == value),
            Strategy::XPath => xpath::evaluate(self, &xpath::parse(value)?),
        };
        Ok(matches)
    }

    fn filter<F: Fn(&FlatNode) -> bool>(&self, predicate: F) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| predicate(n))
            .map(|(i, _)| i)
            .collect()
    }

    /// XML page source, one element per node, tagged with its class
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        if !self.nodes.is_empty() {
            self.write_xml(0, &mut xml);
        }
        xml
    }

    fn write_xml(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        out.push('<');
        out.push_str(&node.class);
        push_attr(out, "class", &node.class);
        if let Some(id) = &node.resource_id {
            push_attr(out, "resource-id", id);
        }
        push_attr(out, "text", &node.text);
        if let Some(desc) = &node.content_desc {
            push_attr(out, "content-desc", desc);
        }
        push_attr(out, "displayed", if node.displayed { "true" } else { "false" });
        push_attr(out, "enabled", if node.enabled { "true" } else { "false" });

        if node.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for &child in &node.children {
            self.write_xml(child, out);
        }
        out.push_str("</");
        out.push_str(&node.class);
        out.push('>');
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_markup(value));
    out.push('"');
}
