//! Reading composed messages back.
//!
//! This is not a general MIME parser. It understands the layout
//! [`crate::AlternativeBuilder`] writes (one `multipart/alternative` level
//! with base64 parts) and exists so callers and tests can inspect what was
//! composed.

use crate::content_type::ContentType;
use crate::encoding::decode_base64;
use crate::error::{Error, Result};
use crate::header::Headers;

/// One part of a multipart message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body, still transfer-encoded.
    pub body: Vec<u8>,
}

impl Part {
    /// Builds a part from the lines between two boundary delimiters.
    fn from_lines(lines: &[&str]) -> Self {
        let split = lines.iter().position(|line| line.is_empty());
        let (head, body) = split.map_or((lines, &[][..]), |i| (&lines[..i], &lines[i + 1..]));

        let body = body.join("\r\n");
        Self {
            headers: Headers::parse(&head.join("\r\n")),
            body: body.trim_end_matches(['\r', '\n']).as_bytes().to_vec(),
        }
    }

    /// Content type of the part (`text/plain` when absent).
    ///
    /// # Errors
    ///
    /// Returns an error if the header is malformed.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers
            .get("content-type")
            .map_or_else(|| Ok(ContentType::text_plain()), ContentType::parse)
    }

    /// Body text, base64-decoded when the part says so.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or UTF-8 conversion fails.
    pub fn body_text(&self) -> Result<String> {
        let is_base64 = self
            .headers
            .get("content-transfer-encoding")
            .is_some_and(|enc| enc.trim().eq_ignore_ascii_case("base64"));

        let bytes = if is_base64 {
            let cleaned: String = String::from_utf8_lossy(&self.body)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            decode_base64(&cleaned)?
        } else {
            self.body.clone()
        };
        String::from_utf8(bytes).map_err(Into::into)
    }
}

/// A parsed multipart message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Top-level headers.
    pub headers: Headers,
    /// Parts in order.
    pub parts: Vec<Part>,
}

impl Message {
    /// Parses a raw multipart message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is not multipart, the boundary is
    /// missing, or the closing delimiter never appears.
    pub fn parse(raw: &str) -> Result<Self> {
        let (head, body) = split_head_body(raw);
        let headers = Headers::parse(head);

        let content_type = headers
            .get("content-type")
            .ok_or_else(|| Error::Parse("no Content-Type header".to_string()))
            .and_then(ContentType::parse)?;
        if !content_type.is_multipart() {
            return Err(Error::Parse(format!("not a multipart message: {content_type}")));
        }

        let boundary = content_type.boundary().ok_or(Error::MissingBoundary)?;
        let parts = split_multipart(body, boundary)?;

        Ok(Self { headers, parts })
    }

    /// Content type of the message.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is malformed.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers
            .get("content-type")
            .map_or_else(|| Ok(ContentType::text_plain()), ContentType::parse)
    }

    /// Subject header as written (possibly an encoded-word).
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// Decoded text of the first text/plain part.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such part or decoding fails.
    pub fn text_part(&self) -> Result<String> {
        self.part_text("plain")
    }

    /// Decoded text of the first text/html part.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such part or decoding fails.
    pub fn html_part(&self) -> Result<String> {
        self.part_text("html")
    }

    fn part_text(&self, sub_type: &str) -> Result<String> {
        self.parts
            .iter()
            .find(|part| part.content_type().is_ok_and(|ct| ct.is("text", sub_type)))
            .ok_or_else(|| Error::Parse(format!("no text/{sub_type} part found")))?
            .body_text()
    }
}

/// Splits at the first blank line (CRLF or bare LF).
fn split_head_body(raw: &str) -> (&str, &str) {
    raw.find("\r\n\r\n")
        .map(|i| (&raw[..i], &raw[i + 4..]))
        .or_else(|| raw.find("\n\n").map(|i| (&raw[..i], &raw[i + 2..])))
        .unwrap_or((raw, ""))
}

fn split_multipart(body: &str, boundary: &str) -> Result<Vec<Part>> {
    let delimiter = format!("--{boundary}");
    let terminator = format!("--{boundary}--");

    let mut parts = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in body.lines() {
        let is_terminator = line == terminator;
        if is_terminator || line == delimiter {
            if let Some(lines) = current.take() {
                parts.push(Part::from_lines(&lines));
            }
            if is_terminator {
                return Ok(parts);
            }
            current = Some(Vec::new());
        } else if let Some(lines) = current.as_mut() {
            lines.push(line);
        }
    }

    Err(Error::InvalidMultipart(format!(
        "closing delimiter {terminator} not found"
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RAW: &str = concat!(
        "MIME-Version: 1.0\r\n",
        "Content-Type: multipart/alternative; boundary=\"b1\"\r\n",
        "Subject: =?UTF-8?B?SGk=?=\r\n",
        "\r\n",
        "--b1\r\n",
        "Content-Type: text/plain; charset=UTF-8\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "\r\n",
        "aGk=\r\n",
        "\r\n",
        "--b1\r\n",
        "Content-Type: text/html; charset=UTF-8\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "\r\n",
        "PGI+aGk8L2I+\r\n",
        "\r\n",
        "--b1--"
    );

    #[test]
    fn test_parse_alternative() {
        let message = Message::parse(RAW).unwrap();
        assert_eq!(message.subject(), Some("=?UTF-8?B?SGk=?="));
        assert_eq!(message.parts.len(), 2);
        assert_eq!(message.text_part().unwrap(), "hi");
        assert_eq!(message.html_part().unwrap(), "<b>hi</b>");
        assert_eq!(message.parts[0].body, b"aGk=");
    }

    #[test]
    fn test_single_part_is_rejected() {
        assert!(matches!(
            Message::parse("Content-Type: text/plain\r\n\r\nHello"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            Message::parse("Subject: x\r\n\r\nHello"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_parse_missing_boundary() {
        let raw = "Content-Type: multipart/alternative\r\n\r\n--x--";
        assert!(matches!(Message::parse(raw), Err(Error::MissingBoundary)));
    }

    #[test]
    fn test_parse_unterminated_multipart() {
        let raw = RAW.trim_end_matches("--b1--");
        assert!(matches!(
            Message::parse(raw),
            Err(Error::InvalidMultipart(_))
        ));
    }

    #[test]
    fn test_unencoded_part_body() {
        let raw = "Content-Type: multipart/mixed; boundary=x\r\n\r\n--x\r\n\r\nplain words\r\n--x--";
        let message = Message::parse(raw).unwrap();
        assert_eq!(message.text_part().unwrap(), "plain words");
    }
}
