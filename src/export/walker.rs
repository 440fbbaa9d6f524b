//! Locates conversation turns in a captured page and classifies their sender.

use crate::dom::ElementNode;
use crate::export::profile::{HostProfile, Sender};

/// A turn as found in the captured tree, borrowed and unmodified
#[derive(Debug, Clone, Copy)]
pub struct RawTurn<'a> {
    /// Position among message nodes, counting dropped ones
    pub index: usize,
    pub sender: Sender,
    /// The whole conversation-turn container
    pub message: &'a ElementNode,
    /// The sub-tree holding the renderable payload
    pub content: &'a ElementNode,
}

/// Classify the sender of a message node from its hidden labels
pub fn classify_sender(message: &ElementNode, profile: &HostProfile) -> Sender {
    if profile.user_label.present_in(message) {
        Sender::User
    } else if profile.assistant_label.present_in(message) {
        Sender::Assistant
    } else {
        Sender::Unknown
    }
}

/// Resolve the content block of a message node
///
/// A bare upload image is widened to the whole message so the sender label
/// and any text next to it survive.
pub fn resolve_content<'a>(message: &'a ElementNode, profile: &HostProfile) -> Option<&'a ElementNode> {
    let found = profile.content.find_first(message)?;
    if found.is_tag("img") && profile.is_upload(found) {
        Some(message)
    } else {
        Some(found)
    }
}

/// Every turn under `root` that has renderable content, in document order
pub fn walk<'a>(root: &'a ElementNode, profile: &HostProfile) -> Vec<RawTurn<'a>> {
    let messages = root.find_all(|el| profile.message.matches(el));

    messages
        .into_iter()
        .enumerate()
        .filter_map(|(index, message)| {
            let Some(content) = resolve_content(message, profile) else {
                log::debug!("Turn {} has no content block, dropping it", index);
                return None;
            };
            Some(RawTurn {
                index,
                sender: classify_sender(message, profile),
                message,
                content,
            })
        })
        .collect()
}
