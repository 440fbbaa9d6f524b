use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Grey "Image" box shown when an exported image fails to load
const PLACEHOLDER_SVG: &str = concat!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="150">"##,
    r##"<rect width="100%" height="100%" fill="#ccc"/>"##,
    r##"<text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle" fill="#666" font-size="20">Image</text>"##,
    "</svg>"
);

/// Output format of an export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    /// Standalone printable document
    #[default]
    Html,
    /// Markdown rendition of the same turns
    Markdown,
}

/// Options for the assembled export document
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Prefix of the document `<title>`; the capture date is appended
    pub title: String,

    /// Top-level heading of the document
    pub heading: String,

    /// Embed a script that opens the viewer's print dialog once loaded
    pub auto_print: bool,

    /// Image source substituted for images that fail to load
    pub placeholder_image: String,

    /// Capture date; `None` means today in local time
    pub date: Option<NaiveDate>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "Conversation with ChatGPT".to_string(),
            heading: "ChatGPT Conversation".to_string(),
            auto_print: true,
            placeholder_image: default_placeholder(),
            date: None,
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = heading.into();
        self
    }

    pub fn auto_print(mut self, auto_print: bool) -> Self {
        self.auto_print = auto_print;
        self
    }

    pub fn placeholder_image(mut self, src: impl Into<String>) -> Self {
        self.placeholder_image = src.into();
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// The capture date, resolved against the local clock if unset
    pub fn capture_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// The default placeholder as an embedded data URL
pub fn default_placeholder() -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(PLACEHOLDER_SVG))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_placeholder_decodes_to_svg() {
        let url = default_placeholder();
        let payload = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(STANDARD.decode(payload).unwrap()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(">Image</text>"));
    }

    #[test]
    fn test_builder() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let opts = ExportOptions::new()
            .title("Chat")
            .heading("Log")
            .auto_print(false)
            .date(date);

        assert_eq!(opts.title, "Chat");
        assert_eq!(opts.heading, "Log");
        assert!(!opts.auto_print);
        assert_eq!(opts.capture_date(), date);
    }

    #[test]
    fn test_format_deserialization() {
        let format: ExportFormat = serde_json::from_str("\"markdown\"").unwrap();
        assert_eq!(format, ExportFormat::Markdown);
        assert_eq!(ExportFormat::default(), ExportFormat::Html);
    }
}
