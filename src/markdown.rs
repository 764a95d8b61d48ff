//! Lightweight Markdown to HTML conversion for model output.
//!
//! Handles the subset Gemini actually emits: links, bold, italics, `#`-`###`
//! headings, numbered section titles, rules, bulleted lists and paragraphs.
//! Rewrites are applied blindly; unbalanced markers are not repaired and
//! nothing is HTML-escaped.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINK: Regex = Regex::new(r"\[(.*?)\]\((.*?)\)").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref H3: Regex = Regex::new(r"(?m)^### (.*)$").unwrap();
    static ref H2: Regex = Regex::new(r"(?m)^## (.*)$").unwrap();
    static ref H1: Regex = Regex::new(r"(?m)^# (.*)$").unwrap();
    // ASCII capitals only
    static ref NUMBERED_TITLE: Regex = Regex::new(r"(?m)^(\d+\.\s+[A-Z].*)$").unwrap();
    static ref RULE: Regex = Regex::new(r"(?m)^---$").unwrap();
    static ref LIST_ITEM: Regex = Regex::new(r"^[-*]\s+(.*)$").unwrap();
}

/// Prefixes of lines that already carry block markup and must not be wrapped.
const BLOCK_PREFIXES: [&str; 3] = ["<h", "<ul", "<li"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    InList,
}

/// Render Markdown to HTML. Never fails; anything unrecognised becomes a paragraph.
pub fn render(text: &str) -> String {
    // line anchors below only know `\n`
    let text = text.replace("\r\n", "\n");
    let text = rewrite_inline(&text);
    let text = rewrite_blocks(&text);
    assemble(&text)
}

fn rewrite_inline(text: &str) -> String {
    // Links before bold so labels survive, bold before italics so `**` is not split.
    let text = LINK.replace_all(text, r#"<a href="${2}" target="_blank">${1}</a>"#);
    let text = BOLD.replace_all(&text, "<strong>${1}</strong>");
    ITALIC.replace_all(&text, "<em>${1}</em>").into_owned()
}

fn rewrite_blocks(text: &str) -> String {
    let text = H3.replace_all(text, "<h3>${1}</h3>");
    let text = H2.replace_all(&text, "<h2>${1}</h2>");
    let text = H1.replace_all(&text, "<h1>${1}</h1>");
    let text = NUMBERED_TITLE.replace_all(&text, "<h3>${1}</h3>");
    RULE.replace_all(&text, "<hr>").into_owned()
}

fn assemble(text: &str) -> String {
    let mut html = String::with_capacity(text.len() + 64);
    let mut mode = Mode::Normal;

    for line in text.split('\n') {
        let trimmed = line.trim();

        if let Some(item) = LIST_ITEM.captures(trimmed).and_then(|c| c.get(1)) {
            if mode == Mode::Normal {
                html.push_str("<ul>");
                mode = Mode::InList;
            }
            html.push_str("<li>");
            html.push_str(item.as_str());
            html.push_str("</li>");
            continue;
        }

        if mode == Mode::InList {
            html.push_str("</ul>");
            mode = Mode::Normal;
        }

        if trimmed.is_empty() {
            continue;
        }

        if BLOCK_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
            html.push_str(trimmed);
        } else {
            html.push_str("<p>");
            html.push_str(trimmed);
            html.push_str("</p>");
        }
    }

    if mode == Mode::InList {
        html.push_str("</ul>");
    }

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_paragraph() {
        assert_eq!(render("hello"), "<p>hello</p>");
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render(""), "");
        assert_eq!(render("\n\n  \n"), "");
    }

    #[test]
    fn blank_line_closes_list() {
        assert_eq!(
            render("- a\n- b\n\nc"),
            "<ul><li>a</li><li>b</li></ul><p>c</p>"
        );
    }

    #[test]
    fn list_closes_at_end_of_input() {
        assert_eq!(render("intro\n* one\n- two"), "<p>intro</p><ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn list_closes_on_non_item_line() {
        assert_eq!(
            render("- a\nafter\n- b"),
            "<ul><li>a</li></ul><p>after</p><ul><li>b</li></ul>"
        );
    }

    #[test]
    fn numbered_titles_become_headings() {
        assert_eq!(render("2. Background"), "<h3>2. Background</h3>");
        assert_eq!(render("10.  Next Steps"), "<h3>10.  Next Steps</h3>");
        // lowercase start is left as a paragraph
        assert_eq!(render("3. lowercase"), "<p>3. lowercase</p>");
    }

    #[test]
    fn headings_by_level() {
        assert_eq!(render("# One\n## Two\n### Three"), "<h1>One</h1><h2>Two</h2><h3>Three</h3>");
    }

    #[test]
    fn heading_is_not_promoted_twice() {
        assert_eq!(render("### 1. Intro"), "<h3>1. Intro</h3>");
    }

    #[test]
    fn rule_line() {
        assert_eq!(render("above\n---\nbelow"), "<p>above</p><hr><p>below</p>");
    }

    #[test]
    fn crlf_line_endings() {
        assert_eq!(
            render("# Title\r\nabove\r\n---\r\nbelow"),
            "<h1>Title</h1><p>above</p><hr><p>below</p>"
        );
        assert_eq!(
            render("- a\r\n- b\r\n\r\n2. Next Steps\r\n"),
            "<ul><li>a</li><li>b</li></ul><h3>2. Next Steps</h3>"
        );
    }

    #[test]
    fn bold_wraps_link() {
        assert_eq!(
            render("**[x](http://y)**"),
            r#"<p><strong><a href="http://y" target="_blank">x</a></strong></p>"#
        );
    }

    #[test]
    fn bold_then_italic() {
        assert_eq!(
            render("**strong** and *soft*"),
            "<p><strong>strong</strong> and <em>soft</em></p>"
        );
    }

    #[test]
    fn inline_markup_inside_list_items() {
        assert_eq!(
            render("- **Key:** value"),
            "<ul><li><strong>Key:</strong> value</li></ul>"
        );
    }

    #[test]
    fn unmatched_bold_degrades_without_panicking() {
        let html = render("**dangling");
        assert!(html.starts_with("<p>"));
        assert!(html.ends_with("</p>"));
    }

    #[test]
    fn labeled_header_renders() {
        let md = "# Title\n[Video Link](https://y.t/w) | **Detail Level:** Short\n**Summarized with:** m\n\n---\n\nBody";
        assert_eq!(
            render(md),
            concat!(
                "<h1>Title</h1>",
                r#"<p><a href="https://y.t/w" target="_blank">Video Link</a> | <strong>Detail Level:</strong> Short</p>"#,
                "<p><strong>Summarized with:</strong> m</p>",
                "<hr>",
                "<p>Body</p>"
            )
        );
    }
}
