use chat_export::export::{Decision, ExportFormat, ExportOptions, Exporter, HostProfile};
use chat_export::DomTree;
use chrono::NaiveDate;

const SOURCE: &str = "https://chatgpt.com/c/6650f2a1";

fn user(n: usize, body: &str) -> String {
    format!(r#"<article data-testid="conversation-turn-{n}"><h5 class="sr-only">You said:</h5>{body}</article>"#)
}

fn assistant(n: usize, body: &str) -> String {
    format!(r#"<article data-testid="conversation-turn-{n}"><h6 class="sr-only">ChatGPT said:</h6>{body}</article>"#)
}

fn page(turns: &[String]) -> DomTree {
    let markup = format!(
        "<!DOCTYPE html><html><head><title>ChatGPT</title><script>window.x = 1;</script></head>\
         <body><main><h1>Conversation</h1>{}</main></body></html>",
        turns.join("\n")
    );
    DomTree::from_html(&markup)
        .expect("Failed to parse page")
        .with_location(SOURCE)
}

fn exporter() -> Exporter {
    Exporter::new(
        HostProfile::default(),
        ExportOptions::new().date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
    )
}

fn generated_image(src: &str) -> String {
    format!(r#"<div class="group/imagegen-image relative"><div class="frame"><img alt="Generated image" src="{src}" loading="lazy"></div></div>"#)
}

#[test]
fn test_turns_keep_document_order_and_labels() {
    let tree = page(&[
        user(1, r#"<div class="whitespace-pre-wrap">What is Rust?</div>"#),
        assistant(2, r#"<div class="markdown prose"><p>A systems language.</p></div>"#),
        user(3, r#"<div class="whitespace-pre-wrap">Thanks</div>"#),
    ]);

    let document = exporter().export(&tree, ExportFormat::Html);
    let html = &document.content;

    assert_eq!(document.kept, 3);
    assert_eq!(document.skipped, 0);

    let first = html.find("What is Rust?").unwrap();
    let second = html.find("<p>A systems language.</p>").unwrap();
    let third = html.find("Thanks").unwrap();
    assert!(first < second && second < third);

    assert_eq!(html.matches("<div class=\"sender\">You</div>").count(), 2);
    assert_eq!(html.matches("<div class=\"sender\">ChatGPT</div>").count(), 1);
    assert!(html.contains("<title>Conversation with ChatGPT - 2025-03-14</title>"));
    assert!(html.contains(&format!("<a href=\"{SOURCE}\">{SOURCE}</a>")));
}

#[test]
fn test_user_newlines_become_breaks() {
    let tree = page(&[user(1, "<div class=\"whitespace-pre-wrap\">line one\nline two</div>")]);

    let html = exporter().export_html(&tree);
    assert!(html.contains("<div class=\"content\">line one<br>line two</div>"));
}

#[test]
fn test_assistant_newlines_are_left_alone() {
    let tree = page(&[assistant(1, "<div class=\"markdown\"><p>a</p>\n<p>b</p></div>")]);

    let html = exporter().export_html(&tree);
    assert!(html.contains("<p>a</p>\n<p>b</p>"));
}

#[test]
fn test_repeated_image_in_one_turn_keeps_first_container() {
    let body = concat!(
        r#"<div class="group/imagegen-image">"#,
        r#"<div class="a"><img src="https://files/g1.png"></div>"#,
        r#"<div class="b"><img src="https://files/g1.png"></div>"#,
        r#"<div class="c"><img src="https://files/g2.png"></div>"#,
        "</div>"
    );
    let tree = page(&[assistant(1, body)]);

    let outcome = exporter().collect(&tree);
    let markup = &outcome.kept[0].markup;

    assert_eq!(markup.matches("<img").count(), 2);
    assert_eq!(markup.matches("src=\"https://files/g1.png\"").count(), 1);
    assert!(markup.contains("class=\"a\""));
    assert!(!markup.contains("class=\"b\""));
    assert!(markup.contains("class=\"c\""));
}

#[test]
fn test_turn_without_content_block_is_dropped() {
    let tree = page(&[
        user(1, r#"<div class="whitespace-pre-wrap">Hi</div>"#),
        assistant(2, r#"<div class="tool-call">searching...</div>"#),
        assistant(3, r#"<div class="markdown"><p>Hello</p></div>"#),
    ]);

    let outcome = exporter().collect(&tree);
    let indices: Vec<_> = outcome.kept.iter().map(|t| t.index).collect();

    assert_eq!(indices, vec![0, 2]);
    assert!(outcome.skipped.is_empty());
    assert!(!exporter().export_html(&tree).contains("searching..."));
}

#[test]
fn test_message_text_is_escaped() {
    let tree = page(&[user(
        1,
        r#"<div class="whitespace-pre-wrap">&lt;script&gt;alert(1)&lt;/script&gt;</div>"#,
    )]);

    let html = exporter().export_html(&tree);
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert_eq!(html.matches("<script>").count(), 1);
    assert!(!html.contains("window.x"));
}

#[test]
fn test_code_blocks_are_canonical() {
    let body = concat!(
        r#"<div class="markdown"><pre><div class="header">python</div>"#,
        r#"<div><code class="language-python">if a &lt; b:"#,
        "\n    pass</code></div></pre></div>"
    );
    let tree = page(&[assistant(1, body)]);

    let markup = &exporter().collect(&tree).kept[0].markup;
    assert!(markup.starts_with("<pre><code>"));
    assert!(markup.contains("if a &lt; b:\n    pass"));
    assert!(!markup.contains("language-python"));
}

#[test]
fn test_identical_generated_image_turns_collapse() {
    let tree = page(&[
        assistant(1, &generated_image("https://files/cat.png")),
        assistant(2, &generated_image("https://files/cat.png")),
    ]);

    let document = exporter().export(&tree, ExportFormat::Html);
    assert_eq!(document.kept, 1);
    assert_eq!(document.skipped, 1);

    let outcome = exporter().collect(&tree);
    assert_eq!(outcome.skipped[0].index, 1);
    assert_eq!(outcome.skipped[0].reason, Decision::RepeatedImage);
}

#[test]
fn test_repeated_text_compares_with_last_kept_turn() {
    let tree = page(&[
        assistant(1, r#"<div class="markdown"><p>Same answer</p></div>"#),
        assistant(2, r#"<div class="markdown"><p>Same answer</p></div>"#),
        user(3, r#"<div class="whitespace-pre-wrap">Again?</div>"#),
        assistant(4, r#"<div class="markdown"><p>Same answer</p></div>"#),
    ]);

    let outcome = exporter().collect(&tree);
    let kept: Vec<_> = outcome.kept.iter().map(|t| t.index).collect();

    assert_eq!(kept, vec![0, 2, 3]);
    assert_eq!(outcome.skipped[0].reason, Decision::RepeatedText);
    assert_eq!(outcome.state.last_plain_text.as_deref(), Some("Same answer"));
}

#[test]
fn test_uploads_are_never_deduplicated() {
    let upload = r#"<div><img alt="Uploaded image" src="https://files/u.png"></div>"#;
    let tree = page(&[
        user(
            1,
            &format!(r#"{upload}{upload}<div class="whitespace-pre-wrap">first</div>"#),
        ),
        user(2, &format!(r#"{upload}<div class="whitespace-pre-wrap">second</div>"#)),
    ]);

    let outcome = exporter().collect(&tree);
    assert_eq!(outcome.kept.len(), 2);
    assert_eq!(outcome.kept[0].markup.matches("src=\"https://files/u.png\"").count(), 2);
    assert_eq!(outcome.kept[1].markup.matches("src=\"https://files/u.png\"").count(), 1);
    assert!(outcome.kept[0].markup.contains("first"));
    assert_eq!(outcome.state.last_generated_image, None);
}

#[test]
fn test_images_get_placeholder_fallback() {
    let tree = page(&[assistant(1, &generated_image("https://files/dog.png"))]);

    let markup = &exporter().collect(&tree).kept[0].markup;
    assert!(markup.contains("onerror=\"this.onerror=null;this.src='data:image/svg+xml;base64,"));
    assert!(!markup.contains("loading="));
}

#[test]
fn test_canvas_without_raster_is_left_in_place() {
    let tree = page(&[
        assistant(1, r#"<div class="markdown"><canvas width="10"></canvas></div>"#),
        assistant(
            2,
            r#"<div class="markdown"><p>chart</p><canvas data-snapshot="data:image/png;base64,iVBORw0KGgo="></canvas></div>"#,
        ),
    ]);

    let outcome = exporter().collect(&tree);
    assert_eq!(outcome.kept.len(), 2);
    assert!(outcome.kept[0].markup.contains("<canvas"));
    assert!(!outcome.kept[1].markup.contains("<canvas"));
    assert!(outcome.kept[1].markup.contains("<img src=\"data:image/png;base64,iVBORw0KGgo=\""));
}

#[test]
fn test_markdown_export() {
    let tree = page(&[
        user(1, r#"<div class="whitespace-pre-wrap">Explain ownership</div>"#),
        assistant(2, r#"<div class="markdown"><p>Every value has <strong>one</strong> owner.</p></div>"#),
    ]);

    let document = exporter().export(&tree, ExportFormat::Markdown);
    let md = &document.content;

    assert!(md.starts_with("# ChatGPT Conversation"));
    assert!(md.contains("**Date:** 2025-03-14"));
    assert!(md.contains("## You\n\nExplain ownership"));
    assert!(md.find("## You").unwrap() < md.find("## ChatGPT").unwrap());
    assert!(md.contains("**one**"));
}

#[test]
fn test_custom_profile_labels() {
    let profile = HostProfile::from_json(r#"{"sender_names": {"user": "Me", "assistant": "Bot", "unknown": "?"}}"#)
        .expect("Failed to parse profile");
    let exporter = Exporter::new(profile, ExportOptions::new().auto_print(false));
    let tree = page(&[user(1, r#"<div class="whitespace-pre-wrap">hey</div>"#)]);

    let html = exporter.export_html(&tree);
    assert!(html.contains("<div class=\"sender\">Me</div>"));
    assert!(!html.contains("window.print()"));
}
