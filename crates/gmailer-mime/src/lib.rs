//! # gmailer-mime
//!
//! MIME composition for messages handed to the Gmail send API.
//!
//! ## Features
//!
//! - **Composition**: Two-part `multipart/alternative` messages with a
//!   plain-text part derived from the HTML body
//! - **Headers**: Ordered header rendering and RFC 2047 display names
//! - **Encoding**: Base64 for part bodies, Base64url for the API payload
//! - **Inspection**: Reads a composed message back (not a general parser)
//!
//! ## Quick Start
//!
//! ### Composing a Message
//!
//! ```ignore
//! use gmailer_mime::{AlternativeBuilder, encoding::{encode_base64url, encode_word}};
//!
//! let raw = AlternativeBuilder::new()
//!     .header("Subject", encode_word("Hello"))
//!     .header("From", "me")
//!     .header("To", "alice@example.com")
//!     .html_body("<p>Hello, <b>Alice</b></p>")
//!     .build();
//!
//! let payload = encode_base64url(raw.as_bytes());
//! ```
//!
//! ### Reading It Back
//!
//! ```ignore
//! use gmailer_mime::Message;
//!
//! let message = Message::parse(&raw)?;
//! println!("{}", message.text_part()?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod builder;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;
pub mod text;

pub use builder::{AlternativeBuilder, BOUNDARY_PREFIX, generate_boundary};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::{Headers, format_mailbox, join_addresses};
pub use message::{Message, Part};
