//! Folds kept turns into one standalone document.
//!
//! Pure functions of their input: no filtering happens here.

use crate::dom::element::{escape_attribute, escape_text};
use crate::export::normalizer::NormalizedTurn;
use crate::export::profile::SenderNames;
use chrono::NaiveDate;

const STYLE: &str = r#"
        body {
            font-family: 'Segoe UI', sans-serif;
            max-width: 800px;
            margin: auto;
            padding: 2rem;
            background: #fff;
            color: #333;
        }
        h1 { text-align: center; }
        .meta {
            font-size: 0.9rem;
            color: #555;
            margin-bottom: 2rem;
            text-align: center;
        }
        .message {
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid #ddd;
        }
        .sender {
            font-weight: bold;
            font-size: 1.1rem;
            margin-bottom: 0.5rem;
        }
        pre {
            background: #f4f4f4;
            padding: 1rem;
            overflow-x: auto;
            border-radius: 5px;
            font-family: monospace;
            font-size: 0.9rem;
        }
        code { white-space: pre-wrap; }
        .content { line-height: 1.5; }
        img { max-width: 100%; height: auto; }
"#;

const PRINT_SCRIPT: &str = r#"    <script>
        window.onload = () => {
            window.print();
        };
    </script>
"#;

/// Document-level metadata
#[derive(Debug, Clone)]
pub struct DocumentMeta<'a> {
    pub title: &'a str,
    pub heading: &'a str,
    pub date: NaiveDate,
    pub source: &'a str,
    pub auto_print: bool,
}

impl DocumentMeta<'_> {
    /// Capture date as yyyy-mm-dd
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// One labelled message block
pub fn render_message(turn: &NormalizedTurn, names: &SenderNames) -> String {
    format!(
        "    <div class=\"message\">\n        <div class=\"sender\">{}</div>\n        <div class=\"content\">{}</div>\n    </div>\n",
        escape_text(names.name_for(turn.sender)),
        turn.markup
    )
}

/// Assemble the standalone HTML export document
pub fn assemble_html(turns: &[NormalizedTurn], names: &SenderNames, meta: &DocumentMeta<'_>) -> String {
    let date = meta.date_string();
    let mut html = String::with_capacity(4096 + turns.iter().map(|t| t.markup.len()).sum::<usize>());

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "    <title>{} - {}</title>\n",
        escape_text(meta.title),
        date
    ));
    html.push_str("    <style>");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n");

    html.push_str(&format!("    <h1>{}</h1>\n", escape_text(meta.heading)));
    html.push_str("    <div class=\"meta\">\n");
    html.push_str(&format!("        <div><strong>Date:</strong> {}</div>\n", date));
    html.push_str(&format!(
        "        <div><strong>Source:</strong> <a href=\"{}\">{}</a></div>\n",
        escape_attribute(meta.source),
        escape_text(meta.source)
    ));
    html.push_str("    </div>\n");

    for turn in turns {
        html.push_str(&render_message(turn, names));
    }

    if meta.auto_print {
        html.push_str(PRINT_SCRIPT);
    }
    html.push_str("</body>\n</html>\n");

    html
}

/// Assemble a Markdown rendition of the same turns
pub fn assemble_markdown(turns: &[NormalizedTurn], names: &SenderNames, meta: &DocumentMeta<'_>) -> String {
    let mut md = format!(
        "# {}\n\n**Date:** {}  \n**Source:** <{}>\n",
        meta.heading,
        meta.date_string(),
        meta.source
    );

    for turn in turns {
        md.push_str(&format!("\n## {}\n\n", names.name_for(turn.sender)));
        md.push_str(html2md::parse_html(&turn.markup).trim());
        md.push('\n');
    }

    md
}
