//! Generic tree abstraction the export pipeline runs against
//!
//! - ElementNode / Node: owned, detached representation of page elements
//! - NodeMatcher / MatcherSet: structural predicates replacing CSS selectors
//! - DomTree: a captured page body, from a live tab or saved markup

pub mod element;
pub mod matcher;
pub mod tree;

pub use element::{ElementNode, Node};
pub use matcher::{MatcherSet, NodeMatcher};
pub use tree::DomTree;

use crate::error::Result;
use headless_chrome::Tab;
use std::sync::Arc;

/// Extract the DOM tree from a browser tab
pub fn extract_dom(tab: &Arc<Tab>) -> Result<DomTree> {
    DomTree::from_tab(tab)
}

/// Parse saved page markup into a DOM tree tagged with `location`
pub fn parse_saved_page(markup: &str, location: &str) -> Result<DomTree> {
    Ok(DomTree::from_html(markup)?.with_location(location))
}
