use chat_export::{BrowserSession, ExportFormat, Exporter, LaunchOptions};

const CONVERSATION: &str = concat!(
    "<html><body><main>",
    r#"<article data-testid="conversation-turn-1"><h5 class="sr-only">You said:</h5>"#,
    r#"<div class="whitespace-pre-wrap">Draw a square</div></article>"#,
    r#"<article data-testid="conversation-turn-2"><h6 class="sr-only">ChatGPT said:</h6>"#,
    r#"<div class="markdown"><p>Here it is</p><canvas id="c" width="8" height="8"></canvas></div></article>"#,
    "<script>document.getElementById('c').getContext('2d').fillRect(0, 0, 8, 8);</script>",
    "</main></body></html>"
);

fn open_conversation() -> BrowserSession {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");

    let url = format!("data:text/html,{}", urlencoding::encode(CONVERSATION));
    session.navigate(&url).expect("Failed to navigate");
    session.wait_for_navigation().expect("Navigation did not complete");

    session
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_live_dom_capture() {
    let session = open_conversation();

    let dom = session.extract_dom().expect("Failed to extract DOM");
    assert_eq!(dom.root.tag_name, "body");
    assert!(dom.location.starts_with("data:text/html"));

    let json = dom.to_json().expect("Failed to convert to JSON");
    assert!(json.contains("conversation-turn-1"));
    assert!(!json.contains("fillRect"));
    assert!(json.contains("data-snapshot"));
}

#[test]
#[ignore]
fn test_live_export_rasterizes_canvas() {
    let session = open_conversation();

    let document = session
        .export_conversation(&Exporter::default(), ExportFormat::Html)
        .expect("Failed to export");

    assert_eq!(document.kept, 2);
    assert!(document.content.contains("Draw a square"));
    assert!(document.content.contains("src=\"data:image/png;base64,"));
    assert!(!document.content.contains("<canvas"));
}

#[test]
#[ignore]
fn test_live_export_to_pdf() {
    let session = open_conversation();
    let exporter = Exporter::default();

    let tree = session.extract_dom().expect("Failed to extract DOM");
    let printable = exporter.export_for_print(&tree);
    let pdf = session.render_pdf(&printable.content).expect("Failed to render PDF");

    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
#[ignore]
fn test_save_pdf_tool() {
    let session = open_conversation();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("conversation.pdf");

    let result = session
        .execute_tool("save_pdf", serde_json::json!({"path": path.to_string_lossy()}))
        .expect("Tool failed");

    assert!(result.success);
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
}
