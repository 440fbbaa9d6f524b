use crate::dom::element::{ElementNode, Node};
use crate::error::{ExportError, Result};
use headless_chrome::Tab;
use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::sync::Arc;

/// An owned snapshot of a page's body plus where it came from
#[derive(Debug, Clone)]
pub struct DomTree {
    /// The `<body>` element of the page
    pub root: ElementNode,

    /// Location the page was captured from
    pub location: String,
}

impl DomTree {
    pub fn new(root: ElementNode) -> Self {
        Self {
            root,
            location: String::new(),
        }
    }

    /// Builder method: set the originating location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Build DOM tree from a browser tab
    ///
    /// The page is only read: the extraction script serializes `document.body`
    /// into a flat JSON node list, resolving image sources and snapshotting
    /// canvases on the way.
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        let js_code = include_str!("extract_dom.js");

        let result = tab.evaluate(js_code, false).map_err(|e| {
            ExportError::DomParseFailed(format!("Failed to execute DOM extraction script: {}", e))
        })?;

        let json_value = result
            .value
            .ok_or_else(|| ExportError::DomParseFailed("No value returned from DOM extraction".to_string()))?;

        // The script returns a JSON string rather than an object
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| ExportError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

        let root = relink(&json_str)?;

        let tree = Self::new(root).with_location(tab.get_url());
        log::debug!("Extracted {} elements from {}", tree.count_elements(), tree.location);

        Ok(tree)
    }

    /// Build DOM tree from saved page markup
    pub fn from_html(markup: &str) -> Result<Self> {
        let document = Html::parse_document(markup);
        let body_selector = Selector::parse("body")
            .map_err(|e| ExportError::DomParseFailed(format!("Invalid body selector: {}", e)))?;

        let body = document
            .select(&body_selector)
            .next()
            .unwrap_or_else(|| document.root_element());

        Ok(Self::new(lower_element(body)))
    }

    /// Convert the DOM tree to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.root)
            .map_err(|e| ExportError::DomParseFailed(format!("Failed to serialize DOM to JSON: {}", e)))
    }

    /// Count total elements in the tree
    pub fn count_elements(&self) -> usize {
        1 + self.root.descendants().len()
    }
}

/// One record of the extraction script's flat capture
#[derive(Debug, Deserialize)]
struct CapturedNode {
    /// Position of the parent element; `None` only for the body
    parent: Option<usize>,
    tag_name: Option<String>,
    #[serde(default)]
    attributes: IndexMap<String, String>,
    text: Option<String>,
}

/// Rebuild the element tree from the flat pre-order capture
///
/// The capture is flat so page depth never turns into JSON nesting depth.
/// Every record follows its parent, so walking backwards finishes each
/// element's children before the element itself is attached.
fn relink(json: &str) -> Result<ElementNode> {
    let records: Vec<CapturedNode> = serde_json::from_str(json)
        .map_err(|e| ExportError::DomParseFailed(format!("Failed to parse DOM JSON: {}", e)))?;

    let mut children: Vec<Vec<Node>> = (0..records.len()).map(|_| Vec::new()).collect();
    let mut root = None;

    for (index, record) in records.into_iter().enumerate().rev() {
        let node = match record.tag_name {
            Some(tag) => {
                let mut element = ElementNode::new(tag).with_attributes(record.attributes);
                let mut kids = std::mem::take(&mut children[index]);
                kids.reverse();
                element.children = kids;
                Node::Element(element)
            }
            None => Node::text(record.text.unwrap_or_default()),
        };

        match record.parent {
            Some(parent) if parent < index => children[parent].push(node),
            Some(parent) => {
                return Err(ExportError::DomParseFailed(format!(
                    "Node {} refers to parent {} that does not precede it",
                    index, parent
                )));
            }
            None => root = Some(node),
        }
    }

    match root {
        Some(Node::Element(element)) => Ok(element),
        _ => Err(ExportError::DomParseFailed("Capture has no root element".to_string())),
    }
}

fn lower_element(element: ElementRef<'_>) -> ElementNode {
    let value = element.value();
    let mut node = ElementNode::new(value.name());
    for (key, val) in value.attrs() {
        node.add_attribute(key, val);
    }

    for child in element.children() {
        match child.value() {
            scraper::Node::Text(text) => node.add_text(text.text.to_string()),
            scraper::Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    if !matches!(el.value().name(), "script" | "style" | "noscript" | "template") {
                        node.add_child(lower_element(el));
                    }
                }
            }
            _ => {}
        }
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_html_keeps_body_structure() {
        let tree = DomTree::from_html(
            "<html><head><title>t</title></head><body><main><p class=\"x\">Hi <b>there</b></p></main></body></html>",
        )
        .unwrap();

        assert_eq!(tree.root.tag_name, "body");
        let p = tree.root.find_first(|el| el.is_tag("p")).unwrap();
        assert!(p.has_class("x"));
        assert_eq!(p.inner_text(), "Hi there");
        assert_eq!(tree.count_elements(), 4);
    }

    #[test]
    fn test_from_html_drops_scripts() {
        let tree = DomTree::from_html("<body><div>ok<script>alert(1)</script></div></body>").unwrap();
        assert!(tree.root.find_first(|el| el.is_tag("script")).is_none());
        assert_eq!(tree.root.inner_text(), "ok");
    }

    #[test]
    fn test_relink_capture() {
        // Same shape extract_dom.js emits
        let json = r#"[
            {"parent": null, "tag_name": "body", "attributes": {}},
            {"parent": 0, "text": "lead "},
            {"parent": 0, "tag_name": "p", "attributes": {"class": "x"}},
            {"parent": 2, "text": "one"},
            {"parent": 2, "text": " two"},
            {"parent": 0, "tag_name": "canvas", "attributes": {"data-snapshot": "data:image/png;base64,AAAA"}}
        ]"#;
        let tree = DomTree::new(relink(json).unwrap()).with_location("https://chatgpt.com/c/1");

        assert_eq!(tree.location, "https://chatgpt.com/c/1");
        assert_eq!(tree.count_elements(), 3);
        assert_eq!(tree.root.outer_html(), "<body>lead <p class=\"x\">one two</p><canvas data-snapshot=\"data:image/png;base64,AAAA\"></canvas></body>");
        assert!(tree.to_json().unwrap().contains("data-snapshot"));
    }

    #[test]
    fn test_relink_deeply_nested_capture() {
        let depth = 300;
        let mut records = vec![serde_json::json!({"parent": null, "tag_name": "body", "attributes": {}})];
        for i in 0..depth {
            records.push(serde_json::json!({"parent": i, "tag_name": "div", "attributes": {}}));
        }
        records.push(serde_json::json!({"parent": depth, "text": "deep"}));
        let json = serde_json::to_string(&records).unwrap();

        let root = relink(&json).unwrap();

        assert_eq!(root.descendants().len(), depth);
        assert_eq!(root.inner_text(), "deep");
    }

    #[test]
    fn test_relink_rejects_malformed_capture() {
        assert!(relink(r#"[{"parent": 1, "tag_name": "body"}]"#).is_err());
        assert!(relink(r#"[{"parent": null, "text": "x"}]"#).is_err());
        assert!(relink("[]").is_err());
    }
}
