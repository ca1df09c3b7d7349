//! Address validation.

use crate::error::{Error, Result};

/// The Gmail API's identifier for the authenticated account.
///
/// Accepted as a `From` value; never valid as a recipient.
pub const ME: &str = "me";

/// Characters that never appear unquoted in the addresses we accept.
const FORBIDDEN: &[char] = &['<', '>', '(', ')', '[', ']', ',', ';', ':', '\\', '"'];

/// Syntactic email address check.
///
/// Accepts `local@domain.tld` where the local part is non-empty without
/// leading, trailing or doubled dots, and the domain has at least two
/// labels of letters, digits and inner hyphens. Whitespace, control
/// characters and mailbox punctuation are rejected. No DNS lookup is made.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty()
        || email
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || FORBIDDEN.contains(&c))
    {
        return false;
    }

    // Must contain exactly one @
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    if local.is_empty()
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return false;
    }

    // Domain must contain at least one dot and every label must be usable
    if !domain.contains('.') {
        return false;
    }
    domain.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_alphanumeric() || c == '-')
}

/// Validates a recipient or reply-to address.
///
/// # Errors
///
/// Returns `Error::InvalidAddress` carrying the rejected address.
pub fn validate_address(address: &str) -> Result<()> {
    if is_valid_email(address) {
        Ok(())
    } else {
        Err(Error::InvalidAddress(address.to_string()))
    }
}

/// Validates a sender: either [`ME`] or a valid address.
///
/// # Errors
///
/// Returns `Error::InvalidAddress` carrying the rejected sender.
pub fn validate_sender(from: &str) -> Result<()> {
    if from == ME {
        Ok(())
    } else {
        validate_address(from)
    }
}
