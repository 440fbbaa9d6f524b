//! Turns a resolved content block into detached, export-safe markup.
//!
//! Everything operates on a deep copy; the captured tree is never touched.

use crate::dom::{ElementNode, Node};
use crate::error::{ExportError, Result};
use crate::export::dedup::{ImageRef, dedupe_images};
use crate::export::profile::{HostProfile, Sender};
use crate::export::walker::RawTurn;

/// Attribute the extraction script stores a canvas raster in
pub const SNAPSHOT_ATTR: &str = "data-snapshot";

/// Attribute the extraction script stores a snapshot failure in
pub const SNAPSHOT_ERROR_ATTR: &str = "data-snapshot-error";

/// Turns a drawable surface into an embeddable image source
pub trait SurfaceSnapshotter {
    fn snapshot(&self, surface: &ElementNode) -> Result<String>;
}

/// Uses the raster captured alongside the tree by the extraction script
#[derive(Debug, Default, Clone, Copy)]
pub struct CapturedSnapshots;

impl SurfaceSnapshotter for CapturedSnapshots {
    fn snapshot(&self, surface: &ElementNode) -> Result<String> {
        if let Some(reason) = surface.get_attribute(SNAPSHOT_ERROR_ATTR) {
            return Err(ExportError::SnapshotFailed(reason.to_string()));
        }
        surface
            .get_attribute(SNAPSHOT_ATTR)
            .filter(|src| !src.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ExportError::SnapshotFailed("no raster captured for surface".to_string()))
    }
}

/// A turn after normalization, ready for deduplication
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTurn {
    pub index: usize,
    pub sender: Sender,
    /// Rewritten copy of the content block
    pub fragment: ElementNode,
    /// Inner markup of `fragment`
    pub markup: String,
    /// Rendered text of `fragment`, used only for repeat detection
    pub plain_text: String,
    /// First image in `fragment`
    pub lead_image: Option<ImageRef>,
}

pub struct Normalizer<'a> {
    profile: &'a HostProfile,
    placeholder_src: &'a str,
    snapshotter: &'a dyn SurfaceSnapshotter,
}

impl<'a> Normalizer<'a> {
    pub fn new(
        profile: &'a HostProfile,
        placeholder_src: &'a str,
        snapshotter: &'a dyn SurfaceSnapshotter,
    ) -> Self {
        Self {
            profile,
            placeholder_src,
            snapshotter,
        }
    }

    pub fn normalize(&self, raw: &RawTurn<'_>) -> NormalizedTurn {
        let mut fragment = raw.content.clone();
        fragment.simplify();

        rewrite_code_blocks(&mut fragment);
        self.rewrite_surfaces(&mut fragment, raw.index);
        self.rewrite_images(&mut fragment);

        let removed = dedupe_images(&mut fragment, self.profile);
        if removed > 0 {
            log::debug!("Turn {}: removed {} repeated image containers", raw.index, removed);
        }

        trim_edges(&mut fragment);
        if raw.sender == Sender::User {
            break_lines(&mut fragment);
        }

        NormalizedTurn {
            index: raw.index,
            sender: raw.sender,
            markup: fragment.inner_html(),
            plain_text: fragment.inner_text(),
            lead_image: ImageRef::first_in(&fragment, self.profile),
            fragment,
        }
    }

    /// Replace each canvas with a static image; failures leave the canvas as is
    fn rewrite_surfaces(&self, node: &mut ElementNode, turn: usize) {
        for child in &mut node.children {
            let Node::Element(el) = child else { continue };
            if !el.is_tag("canvas") {
                self.rewrite_surfaces(el, turn);
                continue;
            }
            match self.snapshotter.snapshot(el) {
                Ok(src) => *el = ElementNode::new("img").with_attribute("src", src),
                Err(e) => log::warn!("Turn {}: error converting canvas to image: {}", turn, e),
            }
        }
    }

    /// Strip live-page loading hints and register the placeholder fallback
    fn rewrite_images(&self, fragment: &mut ElementNode) {
        let fallback = format!("this.onerror=null;this.src='{}';", self.placeholder_src);
        fragment.for_each_mut(&mut |el| {
            if el.is_tag("img") {
                el.remove_attribute("srcset");
                el.remove_attribute("loading");
                el.add_attribute("onerror", fallback.as_str());
            }
        });
    }
}

/// Escape code text just enough that it cannot be read as markup
pub fn escape_code(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Replace every preformatted block with a canonical `<pre><code>` holding its text
fn rewrite_code_blocks(node: &mut ElementNode) {
    for child in &mut node.children {
        let Node::Element(el) = child else { continue };
        if el.is_tag("pre") {
            let code = ElementNode::new("code").with_children(vec![Node::markup(escape_code(&el.inner_text()))]);
            *el = ElementNode::new("pre").with_child(code);
        } else {
            rewrite_code_blocks(el);
        }
    }
}

/// Drop leading and trailing whitespace at the fragment's outer edges
fn trim_edges(fragment: &mut ElementNode) {
    while let Some(Node::Text { text }) = fragment.children.first_mut() {
        let trimmed = text.trim_start();
        if trimmed.is_empty() {
            fragment.children.remove(0);
        } else {
            *text = trimmed.to_string();
            break;
        }
    }
    while let Some(Node::Text { text }) = fragment.children.last_mut() {
        let trimmed = text.trim_end();
        if trimmed.is_empty() {
            fragment.children.pop();
        } else {
            *text = trimmed.to_string();
            break;
        }
    }
}

/// Turn literal newlines into explicit `<br>` elements
fn break_lines(node: &mut ElementNode) {
    let children = std::mem::take(&mut node.children);
    for child in children {
        match child {
            Node::Text { text } if text.contains('\n') => {
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        node.add_child(ElementNode::new("br"));
                    }
                    if !line.is_empty() {
                        node.add_text(line);
                    }
                }
            }
            Node::Markup { html } => node.children.push(Node::markup(html.replace('\n', "<br>"))),
            Node::Element(mut el) => {
                break_lines(&mut el);
                node.children.push(Node::Element(el));
            }
            other => node.children.push(other),
        }
    }
}
