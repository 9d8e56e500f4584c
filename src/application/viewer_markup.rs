//! Rewriting of the spec viewer's bootstrap page
//!
//! The viewer page is served relative to its own directory, so the generated
//! local copy needs a `<base href>` back to the server. Style overrides and
//! the content hand-off are injected right after the opening `<head>` tag.

/// Directory part of a URL, including the trailing slash.
pub fn base_href(page_url: &str) -> String {
    let without_query = page_url.split(['?', '#']).next().unwrap_or(page_url);
    match without_query.rfind('/') {
        Some(pos) => without_query[..=pos].to_string(),
        None => String::new(),
    }
}

/// Inject base href, style block and storage hand-off into `markup`.
///
/// `handoff` entries are seeded into the viewer's `localStorage` before its
/// own scripts run. Markup without a `<head>` gets the injection prepended.
pub fn rewrite_bootstrap(
    markup: &str,
    base_href: &str,
    style: &str,
    handoff: &[(&str, &str)],
) -> String {
    let mut injected = format!("<base href=\"{}\">", escape_attr(base_href));
    if !style.trim().is_empty() {
        injected.push_str("<style>");
        injected.push_str(style);
        injected.push_str("</style>");
    }
    if !handoff.is_empty() {
        injected.push_str("<script>");
        for (key, value) in handoff {
            injected.push_str(&format!(
                "localStorage.setItem({}, {});",
                js_string(key),
                js_string(value)
            ));
        }
        injected.push_str("</script>");
    }

    match head_insert_position(markup) {
        Some(pos) => {
            let mut out = String::with_capacity(markup.len() + injected.len());
            out.push_str(&markup[..pos]);
            out.push_str(&injected);
            out.push_str(&markup[pos..]);
            out
        }
        None => format!("{injected}{markup}"),
    }
}

/// Byte offset just past the opening `<head ...>` tag.
fn head_insert_position(markup: &str) -> Option<usize> {
    let lower = markup.to_ascii_lowercase();
    let mut from = 0;
    while let Some(rel) = lower[from..].find("<head") {
        let start = from + rel;
        let after = lower.as_bytes().get(start + 5).copied();
        // Skip <header> and friends
        if matches!(after, Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')) {
            return lower[start..].find('>').map(|end| start + end + 1);
        }
        from = start + 5;
    }
    None
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// JSON string literal that cannot close the surrounding script element.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}
