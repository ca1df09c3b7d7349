//! Plain-text fallback derived from an HTML body.

/// Removes markup tags from `html`, keeping the text between them.
///
/// This is a tag remover, not an HTML-to-text converter: entities are left
/// as-is and no line breaks are inserted for block elements. Comments are
/// removed whole, and `>` inside quoted attribute values does not end a
/// tag. Any `<` not followed by whitespace opens a tag, so `3<4` becomes
/// `3` and a trailing `<` is dropped; `1 < 2` is kept as text.
#[must_use]
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        if !starts_tag(&tail[1..]) {
            out.push('<');
            rest = &tail[1..];
            continue;
        }

        rest = skip_tag(&tail[1..]);
    }

    out.push_str(rest);
    out
}

/// Returns true if the text after `<` opens a tag.
fn starts_tag(after_lt: &str) -> bool {
    !after_lt.starts_with(char::is_whitespace)
}

/// Skips past the closing `>` of a tag, honouring quoted attribute values.
/// An unterminated tag swallows the rest of the input.
fn skip_tag(inside: &str) -> &str {
    let mut quote: Option<char> = None;

    for (i, c) in inside.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return &inside[i + 1..],
            (None, _) => {}
        }
    }

    ""
}
