//! Plain-text extraction from editor HTML.
//!
//! The admin editor stores content as HTML, which may embed base64 images.
//! Before templating content into an AI prompt we strip it down to text,
//! keeping block-level line breaks; before persisting to the legacy Notion
//! store we only neutralise inline base64 images (Notion rejects oversized
//! property payloads).

const BLOCK_TAGS: [&str; 10] = [
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr",
];

/// Strip all HTML markup from `html`, preserving block-level structure as
/// newlines and decoding the common entities. Base64 image payloads vanish
/// together with their `<img>` tags.
pub fn clean_html_content(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        match after_open.find('>') {
            Some(close) => {
                let tag = &after_open[..close];
                if tag_breaks_line(tag) {
                    text.push('\n');
                }
                rest = &after_open[close + 1..];
            }
            None => {
                // Unterminated tag: keep the raw text, nothing left to scan.
                text.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    text.push_str(rest);

    let text = decode_entities(&text);
    collapse_blank_lines(&text)
}

/// Replace inline base64 `<img>` tags with a visible placeholder. Used when
/// writing content back to the legacy Notion store, which cannot absorb
/// megabyte-scale property values.
pub fn sanitize_for_store(content: &str) -> String {
    if !content.contains("data:image") {
        return content.to_string();
    }

    tracing::warn!("base64 images detected in content, replacing before store write");

    const PLACEHOLDER: &str =
        "<p><em>[Image removed: base64 images are too large to store. Use external image URLs.]</em></p>";

    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        match after_open.find('>') {
            Some(close) => {
                let tag = &after_open[..close];
                if is_base64_img(tag) {
                    out.push_str(PLACEHOLDER);
                } else {
                    out.push('<');
                    out.push_str(tag);
                    out.push('>');
                }
                rest = &after_open[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn tag_breaks_line(tag: &str) -> bool {
    let inner = tag.trim();
    if let Some(name) = inner.strip_prefix('/') {
        let name = name.trim().to_ascii_lowercase();
        return BLOCK_TAGS.contains(&name.as_str());
    }
    // <br>, <br/>, <br />
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    name == "br"
}

fn is_base64_img(tag: &str) -> bool {
    let inner = tag.trim_start();
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    name == "img" && (tag.contains("\"data:image/") || tag.contains("'data:image/"))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Collapse whitespace runs that contain more than one newline down to a
/// single newline, dropping whitespace-only lines.
fn collapse_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();
    lines.join("\n").trim().to_string()
}
