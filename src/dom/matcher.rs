use crate::dom::element::ElementNode;
use serde::{Deserialize, Serialize};

/// A structural predicate over a single element
///
/// Matchers stand in for the handful of CSS selector shapes a host UI needs
/// (`.class`, `tag.class`, `tag[attr="v"]`, `tag[attr^="v"]`) so extraction
/// works against any tree that can be lowered to [`ElementNode`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeMatcher {
    /// Any element with this tag
    Tag { tag: String },

    /// Any element carrying this class
    Class { class: String },

    /// `tag.class`
    ClassedTag { tag: String, class: String },

    /// `[attr="value"]`, optionally restricted to a tag
    AttrEquals {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
        attr: String,
        value: String,
    },

    /// `[attr^="prefix"]`, optionally restricted to a tag
    AttrPrefix {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
        attr: String,
        prefix: String,
    },
}

impl NodeMatcher {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag { tag: tag.into() }
    }

    pub fn class(class: impl Into<String>) -> Self {
        Self::Class { class: class.into() }
    }

    pub fn classed_tag(tag: impl Into<String>, class: impl Into<String>) -> Self {
        Self::ClassedTag {
            tag: tag.into(),
            class: class.into(),
        }
    }

    pub fn attr_equals(
        tag: Option<&str>,
        attr: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::AttrEquals {
            tag: tag.map(str::to_string),
            attr: attr.into(),
            value: value.into(),
        }
    }

    pub fn attr_prefix(
        tag: Option<&str>,
        attr: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self::AttrPrefix {
            tag: tag.map(str::to_string),
            attr: attr.into(),
            prefix: prefix.into(),
        }
    }

    /// Check whether `node` satisfies this predicate
    pub fn matches(&self, node: &ElementNode) -> bool {
        match self {
            Self::Tag { tag } => node.is_tag(tag),
            Self::Class { class } => node.has_class(class),
            Self::ClassedTag { tag, class } => node.is_tag(tag) && node.has_class(class),
            Self::AttrEquals { tag, attr, value } => {
                tag_allows(tag.as_deref(), node) && node.get_attribute(attr) == Some(value.as_str())
            }
            Self::AttrPrefix { tag, attr, prefix } => {
                tag_allows(tag.as_deref(), node)
                    && node
                        .get_attribute(attr)
                        .is_some_and(|v| v.starts_with(prefix.as_str()))
            }
        }
    }
}

fn tag_allows(tag: Option<&str>, node: &ElementNode) -> bool {
    tag.is_none_or(|t| node.is_tag(t))
}

/// An ordered list of alternatives, matching when any member does
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MatcherSet(Vec<NodeMatcher>);

impl MatcherSet {
    pub fn new(matchers: Vec<NodeMatcher>) -> Self {
        Self(matchers)
    }

    pub fn matches(&self, node: &ElementNode) -> bool {
        self.0.iter().any(|m| m.matches(node))
    }

    /// First descendant of `root` (in document order) matched by any member
    pub fn find_first<'a>(&self, root: &'a ElementNode) -> Option<&'a ElementNode> {
        root.find_first(|el| self.matches(el))
    }

    /// All descendants of `root` matched by any member, in document order
    pub fn find_all<'a>(&self, root: &'a ElementNode) -> Vec<&'a ElementNode> {
        root.find_all(|el| self.matches(el))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeMatcher> {
        self.0.iter()
    }
}

impl From<Vec<NodeMatcher>> for MatcherSet {
    fn from(matchers: Vec<NodeMatcher>) -> Self {
        Self(matchers)
    }
}
