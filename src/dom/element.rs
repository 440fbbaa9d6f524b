use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tags serialized without a closing tag
const VOID_ELEMENTS: [&str; 9] = [
    "img", "br", "hr", "input", "meta", "link", "source", "wbr", "area",
];

/// Tags whose rendered text starts and ends on its own line
const BLOCK_ELEMENTS: [&str; 20] = [
    "p", "div", "li", "pre", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "blockquote", "ul", "ol",
    "table", "section", "article", "figure", "header", "footer",
];

/// A child of an element: another element, a run of text, or markup that is
/// already escaped and must be emitted verbatim
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Node {
    Text { text: String },
    Markup { html: String },
    Element(ElementNode),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn markup(html: impl Into<String>) -> Self {
        Node::Markup { html: html.into() }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

impl From<ElementNode> for Node {
    fn from(el: ElementNode) -> Self {
        Node::Element(el)
    }
}

/// Represents a DOM element node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "img", "pre")
    pub tag_name: String,

    /// Element attributes in source order
    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder method: set attributes
    pub fn with_attributes(mut self, attributes: IndexMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: add one attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: append a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.add_text(text);
        self
    }

    /// Builder method: append an element child
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.add_child(child);
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(Node::Element(child));
    }

    pub fn add_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::text(text));
    }

    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        self.get_attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.iter().any(|tag| self.is_tag(tag))
    }

    pub fn is_block(&self) -> bool {
        BLOCK_ELEMENTS.iter().any(|tag| self.is_tag(tag))
    }

    /// Element children only, skipping text and markup
    pub fn element_children(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Remove script-like children and inline event handlers, recursively
    pub fn simplify(&mut self) {
        self.children.retain(|child| match child {
            Node::Element(el) => !matches!(el.tag_name.as_str(), "script" | "style" | "noscript"),
            _ => true,
        });
        self.attributes.retain(|key, _| !key.starts_with("on"));

        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.simplify();
            }
        }
    }

    /// Visit every descendant element in document order with its child-index path
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&[usize], &'a ElementNode),
    {
        let mut path = Vec::new();
        self.walk_inner(&mut path, visit);
    }

    fn walk_inner<'a, F>(&'a self, path: &mut Vec<usize>, visit: &mut F)
    where
        F: FnMut(&[usize], &'a ElementNode),
    {
        for (i, child) in self.children.iter().enumerate() {
            if let Node::Element(el) = child {
                path.push(i);
                visit(path, el);
                el.walk_inner(path, visit);
                path.pop();
            }
        }
    }

    /// All descendant elements in document order (self excluded)
    pub fn descendants(&self) -> Vec<&ElementNode> {
        let mut out = Vec::new();
        self.walk(&mut |_, el| out.push(el));
        out
    }

    /// First descendant element matching `pred`, in document order
    pub fn find_first<P>(&self, pred: P) -> Option<&ElementNode>
    where
        P: Fn(&ElementNode) -> bool,
    {
        self.find_first_dyn(&pred)
    }

    fn find_first_dyn(&self, pred: &dyn Fn(&ElementNode) -> bool) -> Option<&ElementNode> {
        for child in self.element_children() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_first_dyn(pred) {
                return Some(found);
            }
        }
        None
    }

    /// All descendant elements matching `pred`, in document order
    pub fn find_all<P>(&self, pred: P) -> Vec<&ElementNode>
    where
        P: Fn(&ElementNode) -> bool,
    {
        self.descendants().into_iter().filter(|el| pred(el)).collect()
    }

    /// Apply `f` to every descendant element, parents before children
    pub fn for_each_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut ElementNode),
    {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                f(el);
                el.for_each_mut(f);
            }
        }
    }

    /// Remove the node at `path` (child indices from this element)
    pub fn remove_at_path(&mut self, path: &[usize]) -> Option<Node> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for &i in parents {
            current = current.children.get_mut(i)?.as_element_mut()?;
        }
        if *last < current.children.len() {
            Some(current.children.remove(*last))
        } else {
            None
        }
    }

    /// Serialize children as markup
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(child, &mut out);
        }
        out
    }

    /// Serialize this element and its children as markup
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    /// Rendered plain text, with line breaks where the viewer would put them
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text { text } => out.push_str(text),
                Node::Markup { html } => out.push_str(&decode_markup(html)),
                Node::Element(el) if el.is_tag("br") => out.push('\n'),
                Node::Element(el) => {
                    let block = el.is_block();
                    if block && !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    el.collect_text(out);
                    if block && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text { text } => out.push_str(&escape_text(text)),
        Node::Markup { html } => out.push_str(html),
        Node::Element(el) => write_element(el, out),
    }
}

fn write_element(el: &ElementNode, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag_name);
    for (key, value) in &el.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
    out.push('>');

    if el.is_void() {
        return;
    }

    for child in &el.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&el.tag_name);
    out.push('>');
}

/// Escape a text run for inclusion as element content
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a value for inclusion inside a double-quoted attribute
pub fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Plain text of pre-escaped markup produced by the code-block rewrite
fn decode_markup(html: &str) -> String {
    html.replace("<br>", "\n")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
