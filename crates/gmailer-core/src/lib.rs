//! # gmailer-core
//!
//! Sends email through the Gmail REST API with a delegated OAuth2 grant.
//!
//! This crate provides:
//! - Configuration with validated defaults
//! - Client credentials loading
//! - Token lifecycle: load, expiry check, refresh, atomic persistence
//! - Outbound message model, address validation and MIME composition
//! - An adapter for mail-framework envelopes
//! - The send pipeline and authenticated-identity lookup
//!
//! ## Example
//!
//! ```ignore
//! use gmailer_core::{MailSender, MailerConfig, SendOptions};
//!
//! let mut sender = MailSender::from_config(MailerConfig::default()).await?;
//! let sent = sender
//!     .send_email("alice@example.com", "Hello", "<p>Hi Alice</p>", SendOptions::new())
//!     .await?;
//! println!("sent {}", sent.id);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod credentials;
pub mod envelope;
mod error;
pub mod message;
pub mod sender;
pub mod token_store;
pub mod validation;

pub use config::{DEFAULT_API_BASE_URL, MailerConfig, default_config_dir};
pub use credentials::load_credentials;
pub use envelope::{Envelope, Mailbox};
pub use error::{Error, Result};
pub use message::{EncodedPayload, OutboundMessage, Recipients, SendOptions};
pub use sender::{MailSender, SentMessage};
pub use token_store::TokenStore;
pub use validation::{ME, is_valid_email};
