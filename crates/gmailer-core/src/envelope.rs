//! Adapter from a generic mail-framework message.
//!
//! Applications that already model email with named mailboxes hand an
//! [`Envelope`] to the sender, which flattens it into an
//! [`OutboundMessage`].

use crate::message::OutboundMessage;

/// An address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Email address.
    pub address: String,
    /// Display name.
    pub name: Option<String>,
}

impl Mailbox {
    /// Creates a mailbox without a display name.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl From<&str> for Mailbox {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Message fields as a host mail framework exposes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Sender mailboxes; only the first is used.
    pub from: Vec<Mailbox>,
    /// Recipients.
    pub to: Vec<Mailbox>,
    /// Carbon-copy recipients.
    pub cc: Vec<Mailbox>,
    /// Blind carbon-copy recipients.
    pub bcc: Vec<Mailbox>,
    /// Reply-To mailboxes; only the first is used.
    pub reply_to: Vec<Mailbox>,
    /// Subject line.
    pub subject: Option<String>,
    /// HTML body.
    pub html_body: Option<String>,
    /// Plain-text body, used when there is no HTML body.
    pub text_body: Option<String>,
}

impl Envelope {
    /// Creates an empty envelope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sender.
    #[must_use]
    pub fn sender(mut self, mailbox: impl Into<Mailbox>) -> Self {
        self.from.push(mailbox.into());
        self
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, mailbox: impl Into<Mailbox>) -> Self {
        self.to.push(mailbox.into());
        self
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, mailbox: impl Into<Mailbox>) -> Self {
        self.cc.push(mailbox.into());
        self
    }

    /// Adds a BCC recipient.
    #[must_use]
    pub fn bcc(mut self, mailbox: impl Into<Mailbox>) -> Self {
        self.bcc.push(mailbox.into());
        self
    }

    /// Adds a Reply-To mailbox.
    #[must_use]
    pub fn reply_to(mut self, mailbox: impl Into<Mailbox>) -> Self {
        self.reply_to.push(mailbox.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html_body(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    /// Flattens into an outbound message.
    ///
    /// The first sender supplies address and display name; when there is
    /// none, or its address is empty, the given defaults apply. Recipient
    /// lists lose their display names.
    #[must_use]
    pub fn into_message(
        self,
        default_from: &str,
        default_from_name: Option<&str>,
    ) -> OutboundMessage {
        let addresses = |mailboxes: Vec<Mailbox>| -> Vec<String> {
            mailboxes.into_iter().map(|m| m.address).collect()
        };

        let first_sender = self.from.into_iter().next().filter(|m| !m.address.is_empty());
        let (from, from_name) = match first_sender {
            Some(mailbox) => (mailbox.address, mailbox.name),
            None => (
                default_from.to_string(),
                default_from_name.map(str::to_string),
            ),
        };

        let body = self.html_body.or(self.text_body).unwrap_or_default();
        let mut message = OutboundMessage::new(
            addresses(self.to),
            self.subject.unwrap_or_default(),
            body,
        )
        .from_address(from, from_name);

        if let Some(reply_to) = self.reply_to.into_iter().next() {
            message = message.reply_to(reply_to.address);
        }
        message.cc = addresses(self.cc);
        message.bcc = addresses(self.bcc);
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sender_wins() {
        let message = Envelope::new()
            .sender(Mailbox::new("ops@x.com").with_name("Ops"))
            .sender("other@x.com")
            .to("a@x.com")
            .into_message("me", Some("Default"));

        assert_eq!(message.from, "ops@x.com");
        assert_eq!(message.from_name.as_deref(), Some("Ops"));
    }

    #[test]
    fn test_defaults_without_sender() {
        let message = Envelope::new()
            .to("a@x.com")
            .into_message("noreply@x.com", Some("Robot"));

        assert_eq!(message.from, "noreply@x.com");
        assert_eq!(message.from_name.as_deref(), Some("Robot"));
        assert_eq!(message.subject, "");
        assert_eq!(message.body_html, "");
    }

    #[test]
    fn test_lists_and_reply_to() {
        let message = Envelope::new()
            .to(Mailbox::new("a@x.com").with_name("A"))
            .to("b@x.com")
            .cc("c@x.com")
            .bcc("d@x.com")
            .reply_to("r1@x.com")
            .reply_to("r2@x.com")
            .subject("Hello")
            .into_message("me", None);

        assert_eq!(message.to, vec!["a@x.com", "b@x.com"]);
        assert_eq!(message.cc, vec!["c@x.com"]);
        assert_eq!(message.bcc, vec!["d@x.com"]);
        assert_eq!(message.reply_to.as_deref(), Some("r1@x.com"));
        assert_eq!(message.subject, "Hello");
    }

    #[test]
    fn test_body_preference() {
        let both = Envelope::new()
            .to("a@x.com")
            .text_body("plain")
            .html_body("<b>html</b>")
            .into_message("me", None);
        assert_eq!(both.body_html, "<b>html</b>");

        let text_only = Envelope::new()
            .to("a@x.com")
            .text_body("plain")
            .into_message("me", None);
        assert_eq!(text_only.body_html, "plain");
    }
}
