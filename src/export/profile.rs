use crate::dom::{ElementNode, MatcherSet, NodeMatcher};
use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
    Unknown,
}

/// A visually hidden heading whose text identifies the sender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SenderLabel {
    pub matcher: NodeMatcher,
    pub contains: String,
}

impl SenderLabel {
    pub fn new(matcher: NodeMatcher, contains: impl Into<String>) -> Self {
        Self {
            matcher,
            contains: contains.into(),
        }
    }

    /// The first element matching `matcher` must contain the marker text
    pub fn present_in(&self, message: &ElementNode) -> bool {
        message
            .find_first(|el| self.matcher.matches(el))
            .is_some_and(|label| label.inner_text().contains(&self.contains))
    }
}

/// Display names used in the export for each sender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SenderNames {
    pub user: String,
    pub assistant: String,
    pub unknown: String,
}

impl Default for SenderNames {
    fn default() -> Self {
        Self {
            user: "You".to_string(),
            assistant: "ChatGPT".to_string(),
            unknown: "Unknown".to_string(),
        }
    }
}

impl SenderNames {
    pub fn name_for(&self, sender: Sender) -> &str {
        match sender {
            Sender::User => &self.user,
            Sender::Assistant => &self.assistant,
            Sender::Unknown => &self.unknown,
        }
    }
}

/// How one host UI renders a conversation
///
/// The default describes the ChatGPT web app. Overrides can be loaded from
/// JSON when the host renames its containers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostProfile {
    /// Conversation-turn container
    pub message: NodeMatcher,

    /// Label marking a user turn
    pub user_label: SenderLabel,

    /// Label marking an assistant turn
    pub assistant_label: SenderLabel,

    /// Candidates for a turn's content block
    pub content: MatcherSet,

    /// Accessibility text identifying a user upload
    pub upload_alt: String,

    pub sender_names: SenderNames,
}

impl Default for HostProfile {
    fn default() -> Self {
        Self {
            message: NodeMatcher::attr_prefix(Some("article"), "data-testid", "conversation-turn"),
            user_label: SenderLabel::new(NodeMatcher::classed_tag("h5", "sr-only"), "You said:"),
            assistant_label: SenderLabel::new(
                NodeMatcher::classed_tag("h6", "sr-only"),
                "ChatGPT said:",
            ),
            content: MatcherSet::new(vec![
                NodeMatcher::class("text-base"),
                NodeMatcher::class("whitespace-pre-wrap"),
                NodeMatcher::class("markdown"),
                NodeMatcher::class("group/dalle-image"),
                NodeMatcher::class("prose"),
                NodeMatcher::class("group/imagegen-image"),
                NodeMatcher::attr_equals(Some("img"), "alt", "Uploaded image"),
            ]),
            upload_alt: "Uploaded image".to_string(),
            sender_names: SenderNames::default(),
        }
    }
}

impl HostProfile {
    /// Load a profile override from a JSON file; missing fields keep defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ExportError::ProfileLoadFailed(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| ExportError::ProfileLoadFailed(e.to_string()))
    }

    /// Whether `img` is an image the user attached
    pub fn is_upload(&self, img: &ElementNode) -> bool {
        img.get_attribute("alt") == Some(self.upload_alt.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_label_requires_marker_text() {
        let label = SenderLabel::new(NodeMatcher::classed_tag("h5", "sr-only"), "You said:");

        let user = ElementNode::new("article")
            .with_child(ElementNode::new("h5").with_attribute("class", "sr-only").with_text("You said:"));
        let wrong_text = ElementNode::new("article")
            .with_child(ElementNode::new("h5").with_attribute("class", "sr-only").with_text("Someone said:"));

        assert!(label.present_in(&user));
        assert!(!label.present_in(&wrong_text));
        assert!(!label.present_in(&ElementNode::new("article")));
    }

    #[test]
    fn test_partial_json_override_keeps_defaults() {
        let profile = HostProfile::from_json(r#"{"upload_alt": "Attached image"}"#).unwrap();
        assert_eq!(profile.upload_alt, "Attached image");
        assert_eq!(profile.sender_names.name_for(Sender::Assistant), "ChatGPT");
        assert_eq!(profile.content.len(), 7);
    }

    #[test]
    fn test_invalid_json_is_profile_error() {
        let err = HostProfile::from_json("{not json").unwrap_err();
        assert!(matches!(err, ExportError::ProfileLoadFailed(_)));
    }

    #[test]
    fn test_missing_file_is_profile_error() {
        let err = HostProfile::from_json_file("/nonexistent/profile.json").unwrap_err();
        assert!(matches!(err, ExportError::ProfileLoadFailed(_)));
    }

    #[test]
    fn test_is_upload() {
        let profile = HostProfile::default();
        assert!(profile.is_upload(&ElementNode::new("img").with_attribute("alt", "Uploaded image")));
        assert!(!profile.is_upload(&ElementNode::new("img").with_attribute("alt", "Generated image")));
        assert!(!profile.is_upload(&ElementNode::new("img")));
    }
}
