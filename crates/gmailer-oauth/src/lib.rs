//! # gmailer-oauth
//!
//! `OAuth2` building blocks for sending mail through the Gmail API with a
//! delegated user grant.
//!
//! ## Features
//!
//! - **Tokens**: exact-boundary expiry checks, on-disk format compatible
//!   with Google client libraries, secrets masked in `Debug`
//! - **Exchanges**: refresh-token grant and the one-time authorization-code grant
//! - **Client secrets**: parses the JSON downloaded from the Google Cloud console
//!
//! ## Quick Start
//!
//! ### Initial authorization
//!
//! ```ignore
//! use gmailer_oauth::{AuthorizationCodeFlow, ClientSecrets, OAuthClient, extract_code};
//!
//! let secrets = ClientSecrets::from_json(&std::fs::read_to_string("credentials.json")?)?;
//! let flow = AuthorizationCodeFlow::new(OAuthClient::from_secrets(&secrets)?);
//!
//! println!("Visit: {}", flow.authorization_url(None)?);
//! let code = extract_code(&read_line()?).ok_or("code required")?;
//! let token = flow.exchange_code(&code).await?;
//! ```
//!
//! ### Token Refresh
//!
//! ```ignore
//! if token.is_expired() {
//!     token = client.refresh_token(&token).await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
pub mod secrets;
pub mod token;

pub use error::{Error, Result};
pub use flow::{AuthorizationCodeFlow, OAuthClient, extract_code};
pub use provider::{GMAIL_SEND_SCOPE, Provider};
pub use secrets::ClientSecrets;
pub use token::Token;
