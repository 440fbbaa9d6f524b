/// Normalize an incomplete URL by adding a missing protocol
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("file://")
        || trimmed.starts_with("data:")
        || trimmed.starts_with("about:")
        || trimmed.starts_with("chrome://")
    {
        return trimmed.to_string();
    }

    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    // Conversation paths like "/c/<id>" belong to the ChatGPT web app
    if trimmed.starts_with('/') {
        return format!("https://chatgpt.com{}", trimmed);
    }

    format!("https://{}", trimmed)
}

/// Sanitize a page title into a file stem, e.g. for default output names
pub fn file_stem_for(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();

    let mut collapsed = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        "conversation".to_string()
    } else {
        trimmed.to_string()
    }
}
