//! Suppression of content the host UI renders more than once.
//!
//! Two independent passes:
//! - within a turn, later containers repeating a generated image are removed
//!   ([`dedupe_images`])
//! - across turns, a turn is skipped when its text repeats the last kept turn
//!   or its leading generated image repeats the last kept one
//!   ([`PipelineState::decide`])
//!
//! Upload images never take part in either pass.

use crate::dom::ElementNode;
use crate::export::normalizer::NormalizedTurn;
use crate::export::profile::HostProfile;
use std::collections::HashSet;

/// An image embedded in a normalized fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// `src` of the image; `None` when missing or empty
    pub source: Option<String>,
    pub is_user_upload: bool,
}

impl ImageRef {
    pub fn from_element(img: &ElementNode, profile: &HostProfile) -> Self {
        Self {
            source: img
                .get_attribute("src")
                .filter(|src| !src.is_empty())
                .map(str::to_string),
            is_user_upload: profile.is_upload(img),
        }
    }

    /// First image in `fragment`, in document order
    pub fn first_in(fragment: &ElementNode, profile: &HostProfile) -> Option<Self> {
        fragment
            .find_first(|el| el.is_tag("img"))
            .map(|img| Self::from_element(img, profile))
    }
}

/// Remove every later container of a repeated generated image
///
/// The container is the image's parent element. A container is kept when it
/// is the fragment root or when it encloses a first occurrence. Returns how
/// many containers were removed; running it again on the result removes none.
pub fn dedupe_images(fragment: &mut ElementNode, profile: &HostProfile) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    let mut protected: Vec<Vec<usize>> = Vec::new();
    let mut doomed: Vec<Vec<usize>> = Vec::new();

    fragment.walk(&mut |path, el| {
        if !el.is_tag("img") || profile.is_upload(el) {
            return;
        }
        let Some(src) = el.get_attribute("src").filter(|s| !s.is_empty()) else {
            return;
        };
        let container = path[..path.len() - 1].to_vec();
        if seen.insert(src.to_string()) {
            protected.push(container);
        } else if !container.is_empty() {
            doomed.push(container);
        }
    });

    doomed.retain(|container| !protected.iter().any(|p| p.starts_with(container)));
    doomed.sort();
    doomed.dedup();

    // Later siblings first so earlier paths stay valid
    let mut removed = 0;
    for path in doomed.iter().rev() {
        if fragment.remove_at_path(path).is_some() {
            removed += 1;
        }
    }
    removed
}

/// Why a turn was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    /// Plain text equals the last kept turn's
    RepeatedText,
    /// Leading generated image equals the last kept one
    RepeatedImage,
}

/// Memory carried left to right across one export
///
/// Only ever updated by a kept turn, so each decision compares against the
/// nearest surviving neighbour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineState {
    pub last_plain_text: Option<String>,
    pub last_generated_image: Option<String>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `turn` survives, without touching state
    pub fn decide(&self, turn: &NormalizedTurn) -> Decision {
        if !turn.plain_text.is_empty() && self.last_plain_text.as_deref() == Some(turn.plain_text.as_str())
        {
            return Decision::RepeatedText;
        }

        match &turn.lead_image {
            Some(ImageRef {
                source: Some(src),
                is_user_upload: false,
            }) if self.last_generated_image.as_deref() == Some(src.as_str()) => Decision::RepeatedImage,
            _ => Decision::Keep,
        }
    }

    /// Record a kept turn
    pub fn record(&mut self, turn: &NormalizedTurn) {
        self.last_plain_text = Some(turn.plain_text.clone());
        self.last_generated_image = match &turn.lead_image {
            Some(img) if !img.is_user_upload => img.source.clone(),
            _ => None,
        };
    }
}

/// A dropped turn and the rule that dropped it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTurn {
    pub index: usize,
    pub reason: Decision,
}

/// Result of filtering a sequence of turns
#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub kept: Vec<NormalizedTurn>,
    pub skipped: Vec<SkippedTurn>,
    pub state: PipelineState,
}

/// Filter `turns` in order, starting from `state`
pub fn filter_turns(turns: Vec<NormalizedTurn>, mut state: PipelineState) -> DedupOutcome {
    let mut kept = Vec::with_capacity(turns.len());
    let mut skipped = Vec::new();

    for turn in turns {
        match state.decide(&turn) {
            Decision::Keep => {
                state.record(&turn);
                kept.push(turn);
            }
            reason => {
                log::debug!("Skipping turn {}: {:?}", turn.index, reason);
                skipped.push(SkippedTurn {
                    index: turn.index,
                    reason,
                });
            }
        }
    }

    DedupOutcome { kept, skipped, state }
}
