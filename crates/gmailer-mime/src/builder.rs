//! Composition of two-part `multipart/alternative` messages.

use crate::content_type::ContentType;
use crate::encoding::encode_base64;
use crate::header::Headers;
use crate::text::strip_tags;
use rand::Rng;

/// Prefix of every generated boundary.
pub const BOUNDARY_PREFIX: &str = "boundary_";

/// Generates a fresh boundary: `boundary_` followed by 32 lowercase hex
/// digits.
///
/// The underscore is outside the Base64 alphabet, so the boundary can never
/// occur inside an encoded part body.
#[must_use]
pub fn generate_boundary() -> String {
    let value: u128 = rand::thread_rng().r#gen();
    format!("{BOUNDARY_PREFIX}{value:032x}")
}

/// Builder for an HTML message with a derived plain-text alternative.
///
/// The rendered message always starts with `MIME-Version` and the
/// multipart `Content-Type`, followed by the caller's headers in the order
/// they were added. The body holds a `text/plain` part (the HTML with tags
/// stripped) and then a `text/html` part, both Base64 encoded on a single
/// line.
///
/// # Example
///
/// ```
/// use gmailer_mime::AlternativeBuilder;
///
/// let raw = AlternativeBuilder::with_boundary("b1")
///     .header("Subject", "=?UTF-8?B?SGk=?=")
///     .header("To", "alice@example.com")
///     .html_body("<b>hi</b>")
///     .build();
///
/// assert!(raw.starts_with("MIME-Version: 1.0\r\n"));
/// assert!(raw.ends_with("--b1--"));
/// ```
#[derive(Debug, Clone)]
pub struct AlternativeBuilder {
    boundary: String,
    headers: Headers,
    html: String,
}

impl AlternativeBuilder {
    /// Creates a builder with a freshly generated boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// Creates a builder with a fixed boundary.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            headers: Headers::new(),
            html: String::new(),
        }
    }

    /// Appends a header after the MIME headers.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    /// Returns the boundary this builder will use.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Renders the raw message with CRLF line endings.
    #[must_use]
    pub fn build(self) -> String {
        let boundary = &self.boundary;
        let plain = strip_tags(&self.html);

        let mut head = vec![
            "MIME-Version: 1.0".to_string(),
            format!(
                "Content-Type: {}",
                ContentType::multipart_alternative(boundary.as_str())
            ),
        ];
        head.extend(self.headers.lines());

        let mut body = Vec::new();
        for (content_type, content) in [
            (ContentType::text_plain(), plain.as_str()),
            (ContentType::text_html(), self.html.as_str()),
        ] {
            body.push(format!("--{boundary}"));
            body.push(format!("Content-Type: {content_type}"));
            body.push("Content-Transfer-Encoding: base64".to_string());
            body.push(String::new());
            body.push(encode_base64(content.as_bytes()));
            body.push(String::new());
        }
        body.push(format!("--{boundary}--"));

        format!("{}\r\n\r\n{}", head.join("\r\n"), body.join("\r\n"))
    }
}

impl Default for AlternativeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
