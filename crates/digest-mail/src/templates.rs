use chrono::{DateTime, Utc};
use digest_core::NewsRecord;
use std::fmt::Write as _;

const CRLF: &str = "\r\n";

/// A rendered digest ready to hand to a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Renders both bodies of the digest email.
pub fn render_digest(
    items: &[NewsRecord],
    to: &str,
    subject: &str,
    generated: DateTime<Utc>,
) -> DigestEmail {
    DigestEmail {
        to: to.to_string(),
        subject: subject.to_string(),
        text: render_text(items),
        html: render_html(items, generated),
    }
}

/// Plain text part: a greeting followed by `* title - url` lines.
pub fn render_text(items: &[NewsRecord]) -> String {
    let mut body = format!("Hi!{CRLF}{CRLF}");
    for item in items {
        let _ = write!(body, "* {} - {}{CRLF}", item.title, item.url);
    }
    body
}

/// HTML part: an unordered list of links plus the generation time.
pub fn render_html(items: &[NewsRecord], generated: DateTime<Utc>) -> String {
    let mut list = String::new();
    for item in items {
        let _ = write!(
            list,
            "<li><a href=\"{}\">{}</a></li>{CRLF}",
            escape_html(&item.url),
            escape_html(&item.title)
        );
    }

    format!(
        "<html>\n<head><title>HackerNews Digest</title></head>\n<body>\n  <p>Hi!</p>\n  <div>\n  <ul>\n  {list}  </ul>\n  </div>\n  <p>Generated: {}</p>\n</body>\n</html>\n",
        generated.to_rfc2822()
    )
}

/// Escapes the characters that are significant in HTML text and attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
