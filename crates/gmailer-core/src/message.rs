//! Outbound message model and composition.

use crate::error::{Error, Result};
use crate::validation::{ME, validate_address, validate_sender};
use gmailer_mime::encoding::{encode_base64url, encode_word};
use gmailer_mime::text::strip_tags;
use gmailer_mime::{AlternativeBuilder, format_mailbox, join_addresses};
use serde::{Deserialize, Serialize};

/// One recipient or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    /// A single address.
    One(String),
    /// A list of addresses.
    Many(Vec<String>),
}

impl Recipients {
    /// Flattens into a list, preserving order.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(address) => vec![address],
            Self::Many(addresses) => addresses,
        }
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Self::One(address.to_string())
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Self::One(address)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        Self::Many(addresses)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(addresses: Vec<&str>) -> Self {
        Self::Many(addresses.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Recipients {
    fn from(addresses: &[&str]) -> Self {
        Self::Many(addresses.iter().map(|a| (*a).to_string()).collect())
    }
}

/// Optional fields for [`crate::MailSender::send_email`].
///
/// Empty strings for `from_name` and `reply_to` count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Sender address (or `me`); the configured default when absent.
    pub from: Option<String>,
    /// Sender display name.
    pub from_name: Option<String>,
    /// Reply-To address.
    pub reply_to: Option<String>,
    /// Carbon-copy recipients.
    pub cc: Vec<String>,
    /// Blind carbon-copy recipients.
    pub bcc: Vec<String>,
}

impl SendOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender address.
    #[must_use]
    pub fn from_address(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Sets the sender display name.
    #[must_use]
    pub fn from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = Some(name.into());
        self
    }

    /// Sets the Reply-To address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Adds a BCC recipient.
    #[must_use]
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }
}

/// A message ready for composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Recipients; must not be empty.
    pub to: Vec<String>,
    /// Subject line (any Unicode).
    pub subject: String,
    /// HTML body.
    pub body_html: String,
    /// Sender address or `me`.
    pub from: String,
    /// Sender display name.
    pub from_name: Option<String>,
    /// Reply-To address.
    pub reply_to: Option<String>,
    /// Carbon-copy recipients.
    pub cc: Vec<String>,
    /// Blind carbon-copy recipients.
    pub bcc: Vec<String>,
}

impl OutboundMessage {
    /// Creates a message sent as `me`.
    #[must_use]
    pub fn new(
        to: impl Into<Recipients>,
        subject: impl Into<String>,
        body_html: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into().into_vec(),
            subject: subject.into(),
            body_html: body_html.into(),
            from: ME.to_string(),
            from_name: None,
            reply_to: None,
            cc: Vec::new(),
            bcc: Vec::new(),
        }
    }

    /// Applies send options on top of the current values.
    #[must_use]
    pub fn with_options(mut self, options: SendOptions) -> Self {
        if let Some(from) = options.from {
            self.from = from;
        }
        if let Some(name) = options.from_name {
            self.from_name = Some(name);
        }
        if let Some(reply_to) = options.reply_to {
            self.reply_to = Some(reply_to);
        }
        self.cc.extend(options.cc);
        self.bcc.extend(options.bcc);
        self.normalize()
    }

    /// Sets the sender address and display name.
    #[must_use]
    pub fn from_address(mut self, address: impl Into<String>, name: Option<String>) -> Self {
        self.from = address.into();
        self.from_name = name;
        self.normalize()
    }

    /// Sets the Reply-To address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self.normalize()
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Adds a BCC recipient.
    #[must_use]
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    fn normalize(mut self) -> Self {
        self.from_name = self.from_name.filter(|n| !n.is_empty());
        self.reply_to = self.reply_to.filter(|r| !r.is_empty());
        self
    }

    /// Plain-text fallback: the HTML body with tags stripped.
    #[must_use]
    pub fn body_plain(&self) -> String {
        strip_tags(&self.body_html)
    }

    /// Checks every address before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoRecipients` for an empty `to` list and
    /// `Error::InvalidAddress` for the first address that fails the check.
    pub fn validate(&self) -> Result<()> {
        if self.to.is_empty() {
            return Err(Error::NoRecipients);
        }

        validate_sender(&self.from)?;
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .chain(self.reply_to.iter())
            .try_for_each(|address| validate_address(address))
    }

    /// The Reply-To header value, if any.
    ///
    /// An explicit reply-to wins. Otherwise the sender address is used,
    /// except when the sender is `me`.
    #[must_use]
    pub fn effective_reply_to(&self) -> Option<&str> {
        match self.reply_to.as_deref() {
            Some(reply_to) if !reply_to.is_empty() => Some(reply_to),
            _ if self.from != ME => Some(self.from.as_str()),
            _ => None,
        }
    }

    /// Renders the raw RFC 5322 message with a fresh boundary.
    #[must_use]
    pub fn compose(&self) -> String {
        self.builder(AlternativeBuilder::new()).build()
    }

    /// Renders the raw RFC 5322 message with a fixed boundary.
    #[must_use]
    pub fn compose_with_boundary(&self, boundary: &str) -> String {
        self.builder(AlternativeBuilder::with_boundary(boundary)).build()
    }

    /// Composes and encodes the message for the send call.
    #[must_use]
    pub fn encode(&self) -> EncodedPayload {
        EncodedPayload::from_raw(&self.compose())
    }

    fn builder(&self, builder: AlternativeBuilder) -> AlternativeBuilder {
        let mut builder = builder
            .header("Subject", encode_word(&self.subject))
            .header("From", format_mailbox(&self.from, self.from_name.as_deref()));

        if let Some(reply_to) = self.effective_reply_to() {
            builder = builder.header("Reply-To", reply_to);
        }

        builder = builder.header("To", join_addresses(&self.to));

        if !self.cc.is_empty() {
            builder = builder.header("Cc", join_addresses(&self.cc));
        }
        if !self.bcc.is_empty() {
            builder = builder.header("Bcc", join_addresses(&self.bcc));
        }

        builder.html_body(self.body_html.as_str())
    }
}

/// Request body of the send call: `{"raw": "<base64url message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPayload {
    /// Base64url (unpadded) encoding of the raw message.
    pub raw: String,
}

impl EncodedPayload {
    /// Encodes a raw message.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        Self {
            raw: encode_base64url(raw.as_bytes()),
        }
    }

    /// Decodes the payload back into the raw message.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64url or UTF-8.
    pub fn decode(&self) -> gmailer_mime::Result<String> {
        let bytes = gmailer_mime::encoding::decode_base64url(&self.raw)?;
        String::from_utf8(bytes).map_err(Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gmailer_mime::Message;

    fn header_names(raw: &str) -> Vec<String> {
        let (head, _) = raw.split_once("\r\n\r\n").unwrap();
        head.split("\r\n")
            .map(|line| line.split_once(':').unwrap().0.to_string())
            .collect()
    }

    #[test]
    fn test_recipients_conversions() {
        assert_eq!(Recipients::from("a@x.com").into_vec(), vec!["a@x.com"]);
        assert_eq!(
            Recipients::from(vec!["a@x.com", "b@x.com"]).into_vec(),
            vec!["a@x.com", "b@x.com"]
        );
        assert!(Recipients::from(Vec::<String>::new()).into_vec().is_empty());
    }

    #[test]
    fn test_from_with_display_name() {
        let message = OutboundMessage::new(vec!["a@x.com"], "Hi", "<b>hi</b>")
            .with_options(SendOptions::new().from_address("me@x.com").from_name("Me"));

        let raw = message.compose_with_boundary("b1");
        assert!(raw.contains("\r\nFrom: =?UTF-8?B?TWU=?= <me@x.com>\r\n"));
        assert!(raw.contains("\r\nSubject: =?UTF-8?B?SGk=?=\r\n"));

        let parsed = Message::parse(&raw).unwrap();
        assert_eq!(parsed.parts[0].body, b"aGk=");
        assert_eq!(parsed.text_part().unwrap(), "hi");
    }

    #[test]
    fn test_header_order() {
        let message = OutboundMessage::new("a@x.com", "s", "b")
            .with_options(SendOptions::new().from_address("me@x.com").cc("c@x.com").bcc("d@x.com"));

        assert_eq!(
            header_names(&message.compose_with_boundary("b")),
            vec![
                "MIME-Version",
                "Content-Type",
                "Subject",
                "From",
                "Reply-To",
                "To",
                "Cc",
                "Bcc"
            ]
        );
    }

    #[test]
    fn test_reply_to_defaults_to_sender_unless_me() {
        let from_me = OutboundMessage::new("a@x.com", "s", "b");
        assert_eq!(from_me.effective_reply_to(), None);
        assert!(!from_me.compose_with_boundary("b").contains("Reply-To:"));

        let from_addr = OutboundMessage::new("a@x.com", "s", "b").from_address("ops@x.com", None);
        assert!(
            from_addr
                .compose_with_boundary("b")
                .contains("\r\nReply-To: ops@x.com\r\n")
        );
    }

    #[test]
    fn test_explicit_reply_to_wins_and_appears_once() {
        let message = OutboundMessage::new("a@x.com", "s", "b")
            .from_address("ops@x.com", None)
            .reply_to("help@x.com");

        let raw = message.compose_with_boundary("b");
        assert_eq!(raw.matches("Reply-To:").count(), 1);
        assert!(raw.contains("\r\nReply-To: help@x.com\r\n"));
    }

    #[test]
    fn test_empty_options_count_as_absent() {
        let message = OutboundMessage::new("a@x.com", "s", "b")
            .with_options(SendOptions::new().from_name("").reply_to(""));
        assert_eq!(message.from_name, None);
        assert_eq!(message.reply_to, None);

        let raw = message.compose_with_boundary("b");
        assert!(raw.contains("\r\nFrom: me\r\n"));
        assert!(!raw.contains("Reply-To:"));
    }

    #[test]
    fn test_cc_bcc_only_when_present() {
        let raw = OutboundMessage::new(vec!["a@x.com", "b@x.com"], "s", "b").compose_with_boundary("b");
        assert!(raw.contains("\r\nTo: a@x.com, b@x.com\r\n"));
        assert!(!raw.contains("Cc:"));
        assert!(!raw.contains("Bcc:"));
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            OutboundMessage::new(Vec::<String>::new(), "s", "b").validate(),
            Err(Error::NoRecipients)
        ));
        assert!(matches!(
            OutboundMessage::new("not-an-address", "s", "b").validate(),
            Err(Error::InvalidAddress(addr)) if addr == "not-an-address"
        ));
        assert!(matches!(
            OutboundMessage::new("a@x.com", "s", "b").cc("bad").validate(),
            Err(Error::InvalidAddress(addr)) if addr == "bad"
        ));
        assert!(matches!(
            OutboundMessage::new("a@x.com", "s", "b").reply_to("nope").validate(),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            OutboundMessage::new("a@x.com", "s", "b").from_address("Someone", None).validate(),
            Err(Error::InvalidAddress(_))
        ));
        assert!(OutboundMessage::new("a@x.com", "s", "b").validate().is_ok());
    }

    #[test]
    fn test_encoded_payload_round_trip() {
        let message = OutboundMessage::new("a@x.com", "Grüße ✓", "<p>Olá</p>");
        let payload = message.encode();
        assert!(!payload.raw.contains(['+', '/', '=']));

        let raw = payload.decode().unwrap();
        let parsed = Message::parse(&raw).unwrap();
        assert_eq!(parsed.html_part().unwrap(), "<p>Olá</p>");
        assert_eq!(
            gmailer_mime::encoding::decode_word(parsed.subject().unwrap()).unwrap(),
            "Grüße ✓"
        );
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({ "raw": payload.raw })
        );
    }

    #[test]
    fn test_compose_differs_only_in_boundary() {
        let message = OutboundMessage::new(vec!["a@x.com", "b@x.com"], "Grüße", "<p>Olá <b>mundo</b></p>")
            .with_options(
                SendOptions::new()
                    .from_address("ops@x.com")
                    .from_name("Ops")
                    .cc("c@x.com")
                    .bcc("d@x.com"),
            );

        let first = Message::parse(&message.compose_with_boundary("b1")).unwrap();
        let second = Message::parse(&message.compose_with_boundary("b2")).unwrap();

        let without_content_type = |m: &Message| -> Vec<(String, String)> {
            m.headers
                .iter()
                .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        };
        assert_eq!(without_content_type(&first), without_content_type(&second));

        let (ct1, ct2) = (first.content_type().unwrap(), second.content_type().unwrap());
        assert!(ct1.is("multipart", "alternative") && ct2.is("multipart", "alternative"));
        assert_eq!(ct1.boundary(), Some("b1"));
        assert_eq!(ct2.boundary(), Some("b2"));

        assert_eq!(first.parts, second.parts);
        assert_eq!(first.text_part().unwrap(), "Olá mundo");

        let fresh = Message::parse(&message.compose()).unwrap();
        assert_eq!(without_content_type(&fresh), without_content_type(&first));
        assert_eq!(fresh.parts, first.parts);
    }

    #[test]
    fn test_body_plain() {
        let message = OutboundMessage::new("a@x.com", "s", "<h1>Title</h1><p>Body</p>");
        assert_eq!(message.body_plain(), "TitleBody");
    }
}
