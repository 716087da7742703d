use regex::{Captures, Regex};
use std::sync::OnceLock;

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render the overlay that sits under the transparent editor textarea.
///
/// Mindmap branches come from headings and list nesting, so those get the
/// strongest treatment; inline emphasis and code are marked lightly. Output
/// must keep every character of the input in place or the caret drifts.
pub fn highlight_mindmap_markdown(text: &str) -> String {
    static RE_HEADING: OnceLock<Regex> = OnceLock::new();
    static RE_BRANCH: OnceLock<Regex> = OnceLock::new();
    static RE_BOLD: OnceLock<Regex> = OnceLock::new();
    static RE_CODE: OnceLock<Regex> = OnceLock::new();

    let re_heading =
        RE_HEADING.get_or_init(|| Regex::new(r"(?m)^(#{1,6})([^\S\n]+.*)$").unwrap());
    let re_branch =
        RE_BRANCH.get_or_init(|| Regex::new(r"(?m)^([^\S\n]*)([-*+]|\d+\.)([^\S\n])").unwrap());
    let re_bold = RE_BOLD.get_or_init(|| Regex::new(r"\*\*([^*\n]+)\*\*").unwrap());
    let re_code = RE_CODE.get_or_init(|| Regex::new(r"`([^`\n]+)`").unwrap());

    let mut html = escape_html(text);

    html = re_heading
        .replace_all(&html, |caps: &Captures| {
            let level = caps[1].len();
            format!("<span class=\"hl-h{level}\">{}{}</span>", &caps[1], &caps[2])
        })
        .into_owned();
    html = re_branch
        .replace_all(&html, "$1<span class=\"hl-branch\">$2</span>$3")
        .into_owned();
    html = re_bold
        .replace_all(&html, "<span class=\"hl-bold\">**$1**</span>")
        .into_owned();
    html = re_code
        .replace_all(&html, "<span class=\"hl-code\">`$1`</span>")
        .into_owned();

    // Keeps the overlay as tall as the textarea when the text ends in a newline.
    html.push_str("\n ");
    html
}
