//! Conversation export pipeline
//!
//! Single pass, left to right over document order:
//!
//! 1. [`walker`] finds conversation turns and classifies their sender
//! 2. [`normalizer`] rewrites a detached copy of each turn's content block
//! 3. [`dedup`] drops turns that repeat the nearest kept neighbour
//! 4. [`assembler`] folds the kept turns into one standalone document
//!
//! All carried state lives in a [`PipelineState`] created fresh for every
//! call, so one [`Exporter`] can serve any number of exports.

pub mod assembler;
pub mod dedup;
pub mod normalizer;
pub mod options;
pub mod profile;
pub mod walker;

pub use assembler::DocumentMeta;
pub use dedup::{Decision, DedupOutcome, ImageRef, PipelineState, SkippedTurn};
pub use normalizer::{CapturedSnapshots, NormalizedTurn, Normalizer, SurfaceSnapshotter};
pub use options::{ExportFormat, ExportOptions};
pub use profile::{HostProfile, Sender, SenderLabel, SenderNames};

use crate::dom::DomTree;
use chrono::NaiveDate;

/// A finished export
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub format: ExportFormat,
    /// The rendered document
    pub content: String,
    pub date: NaiveDate,
    /// Number of turns in the document
    pub kept: usize,
    /// Number of turns dropped as repeats
    pub skipped: usize,
}

/// Produces export documents from captured pages
pub struct Exporter {
    profile: HostProfile,
    options: ExportOptions,
    snapshotter: Box<dyn SurfaceSnapshotter + Send + Sync>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(HostProfile::default(), ExportOptions::default())
    }
}

impl Exporter {
    pub fn new(profile: HostProfile, options: ExportOptions) -> Self {
        Self {
            profile,
            options,
            snapshotter: Box::new(CapturedSnapshots),
        }
    }

    /// Builder method: replace how drawable surfaces are rasterized
    pub fn with_snapshotter<S>(mut self, snapshotter: S) -> Self
    where
        S: SurfaceSnapshotter + Send + Sync + 'static,
    {
        self.snapshotter = Box::new(snapshotter);
        self
    }

    pub fn profile(&self) -> &HostProfile {
        &self.profile
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ExportOptions {
        &mut self.options
    }

    /// Walk, normalize and filter the turns of `tree`
    pub fn collect(&self, tree: &DomTree) -> DedupOutcome {
        let normalizer = Normalizer::new(
            &self.profile,
            &self.options.placeholder_image,
            self.snapshotter.as_ref(),
        );

        let turns = walker::walk(&tree.root, &self.profile)
            .iter()
            .map(|raw| normalizer.normalize(raw))
            .collect();

        dedup::filter_turns(turns, PipelineState::new())
    }

    /// Produce the export document for `tree` in `format`
    pub fn export(&self, tree: &DomTree, format: ExportFormat) -> ExportDocument {
        self.export_with(tree, format, &self.options)
    }

    /// HTML export without the auto-print script, for printing over CDP
    pub fn export_for_print(&self, tree: &DomTree) -> ExportDocument {
        let options = self.options.clone().auto_print(false);
        self.export_with(tree, ExportFormat::Html, &options)
    }

    fn export_with(&self, tree: &DomTree, format: ExportFormat, options: &ExportOptions) -> ExportDocument {
        let outcome = self.collect(tree);
        let date = options.capture_date();
        let meta = DocumentMeta {
            title: &options.title,
            heading: &options.heading,
            date,
            source: &tree.location,
            auto_print: options.auto_print,
        };

        let names = &self.profile.sender_names;
        let content = match format {
            ExportFormat::Html => assembler::assemble_html(&outcome.kept, names, &meta),
            ExportFormat::Markdown => assembler::assemble_markdown(&outcome.kept, names, &meta),
        };

        log::info!(
            "Exported {} turns ({} skipped as repeats) from {}",
            outcome.kept.len(),
            outcome.skipped.len(),
            tree.location
        );

        ExportDocument {
            format,
            content,
            date,
            kept: outcome.kept.len(),
            skipped: outcome.skipped.len(),
        }
    }

    /// Produce the standalone HTML export document for `tree`
    pub fn export_html(&self, tree: &DomTree) -> String {
        self.export(tree, ExportFormat::Html).content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementNode;

    fn assistant_image_turn(n: usize, src: &str) -> ElementNode {
        ElementNode::new("article")
            .with_attribute("data-testid", format!("conversation-turn-{}", n))
            .with_child(
                ElementNode::new("h6")
                    .with_attribute("class", "sr-only")
                    .with_text("ChatGPT said:"),
            )
            .with_child(
                ElementNode::new("div")
                    .with_attribute("class", "group/imagegen-image")
                    .with_child(ElementNode::new("div").with_child(ElementNode::new("img").with_attribute("src", src))),
            )
    }

    #[test]
    fn test_state_is_fresh_per_export() {
        let tree = DomTree::new(ElementNode::new("body").with_child(assistant_image_turn(1, "g.png")))
            .with_location("https://chatgpt.com/c/x");
        let exporter = Exporter::new(
            HostProfile::default(),
            ExportOptions::new().date(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()),
        );

        let first = exporter.export(&tree, ExportFormat::Html);
        let second = exporter.export(&tree, ExportFormat::Html);

        assert_eq!(first.kept, 1);
        assert_eq!(second.kept, 1);
        assert_eq!(first.content, second.content);
        assert!(first.content.contains("window.print()"));
        assert!(!exporter.export_for_print(&tree).content.contains("window.print()"));
    }

    #[test]
    fn test_repeated_generated_image_turns_collapse() {
        let tree = DomTree::new(
            ElementNode::new("body")
                .with_child(assistant_image_turn(1, "g.png"))
                .with_child(assistant_image_turn(2, "g.png")),
        );

        let outcome = Exporter::default().collect(&tree);
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.kept[0].index, 0);
        assert_eq!(outcome.skipped[0].reason, Decision::RepeatedImage);
    }
}
