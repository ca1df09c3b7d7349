//! MIME header handling.

use crate::encoding::encode_word;
use std::fmt;

/// Ordered collection of email headers.
///
/// Headers render in insertion order with the name spelled as added;
/// lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Gets all values for a header.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns an iterator over all headers in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of header lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Renders each header as a `Name: value` line, without terminators.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect()
    }

    /// Parses headers from raw text, stopping at the first empty line.
    ///
    /// Continuation lines (starting with space or tab) are folded into the
    /// previous header. Lines without a colon are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value);
            }

            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, value);
        }

        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

/// Formats a mailbox for an address header.
///
/// With a display name the result is `=?UTF-8?B?<name>?= <address>`;
/// without one (or with an empty one) it is the bare address.
#[must_use]
pub fn format_mailbox(address: &str, display_name: Option<&str>) -> String {
    match display_name.filter(|name| !name.is_empty()) {
        Some(name) => format!("{} <{address}>", encode_word(name)),
        None => address.to_string(),
    }
}

/// Joins addresses into a header value (`a, b, c`).
#[must_use]
pub fn join_addresses<S: AsRef<str>>(addresses: &[S]) -> String {
    addresses
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_keep_insertion_order() {
        let mut headers = Headers::new();
        headers.add("MIME-Version", "1.0");
        headers.add("Subject", "x");
        headers.add("From", "a@example.com");

        assert_eq!(
            headers.lines(),
            vec!["MIME-Version: 1.0", "Subject: x", "From: a@example.com"]
        );
        assert_eq!(
            headers.to_string(),
            "MIME-Version: 1.0\r\nSubject: x\r\nFrom: a@example.com\r\n"
        );
    }

    #[test]
    fn test_headers_get_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("X-Missing"), None);
    }

    #[test]
    fn test_headers_get_all() {
        let mut headers = Headers::new();
        headers.add("To", "alice@example.com");
        headers.add("to", "bob@example.com");
        assert_eq!(headers.get_all("TO"), vec!["alice@example.com", "bob@example.com"]);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_headers_parse() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "To: recipient@example.com\r\n",
            "Subject: Test Message\r\n",
            "Content-Type: text/plain;\r\n",
            " charset=utf-8\r\n",
            "\r\n",
            "Body: not a header\r\n"
        );

        let headers = Headers::parse(text);
        assert_eq!(headers.get("From"), Some("sender@example.com"));
        assert_eq!(headers.get("Subject"), Some("Test Message"));
        assert_eq!(
            headers.get("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(headers.get("Body"), None);
    }

    #[test]
    fn test_format_mailbox() {
        assert_eq!(
            format_mailbox("me@x.com", Some("Me")),
            "=?UTF-8?B?TWU=?= <me@x.com>"
        );
        assert_eq!(format_mailbox("me@x.com", None), "me@x.com");
        assert_eq!(format_mailbox("me@x.com", Some("")), "me@x.com");
    }

    #[test]
    fn test_join_addresses() {
        assert_eq!(join_addresses(&["a@x.com", "b@x.com"]), "a@x.com, b@x.com");
        assert_eq!(join_addresses::<&str>(&[]), "");
    }
}
