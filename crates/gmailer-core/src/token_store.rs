//! Persistent OAuth token lifecycle.
//!
//! The store owns one token file and the OAuth client that can renew it.
//! [`TokenStore::ensure_valid`] is the only way the send path obtains a
//! bearer token: it loads the file, refreshes at most once when the token
//! has expired, and persists the refreshed token before handing it out.
//!
//! There is no lock on the token file. Two processes refreshing at the same
//! time both succeed and the last rename wins.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use gmailer_oauth::{AuthorizationCodeFlow, OAuthClient, Token};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Token file permissions: owner read/write only.
#[cfg(unix)]
const TOKEN_FILE_MODE: u32 = 0o600;

/// Permissions for directories created to hold the token file.
#[cfg(unix)]
const TOKEN_DIR_MODE: u32 = 0o700;

/// File-backed store for the single user token.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    client: OAuthClient,
    current: Option<Token>,
}

impl TokenStore {
    /// Creates a store for the token file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, client: OAuthClient) -> Self {
        Self {
            path: path.into(),
            client,
            current: None,
        }
    }

    /// Token file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// OAuth client used for refresh and code exchange.
    #[must_use]
    pub const fn client(&self) -> &OAuthClient {
        &self.client
    }

    /// The last token this store loaded, refreshed or saved.
    #[must_use]
    pub const fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Reads the token file.
    ///
    /// # Errors
    ///
    /// Returns `Error::TokenNotFound` if the file does not exist and
    /// `Error::InvalidToken` if it cannot be read or parsed.
    pub async fn load(&mut self) -> Result<Token> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::TokenNotFound(self.path.clone()));
            }
            Err(e) => return Err(self.invalid_token(e)),
        };

        let token: Token = serde_json::from_str(&json).map_err(|e| self.invalid_token(e))?;
        if token.access_token.is_empty() {
            return Err(self.invalid_token("access_token is empty"));
        }

        debug!(
            "Loaded token from {} (expires {})",
            self.path.display(),
            token.expiry
        );
        self.current = Some(token.clone());
        Ok(token)
    }

    /// Returns true if `token` is expired at `now` (`now >= expiry`).
    #[must_use]
    pub fn is_expired(token: &Token, now: DateTime<Utc>) -> bool {
        token.is_expired_at(now)
    }

    /// Exchanges the refresh token of `token` for a new access token.
    ///
    /// Makes no network call when `token` has no refresh token. The result
    /// keeps the old refresh token unless the server rotated it. Nothing is
    /// written to disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::TokenExpiredNoRefresh` without a refresh token and
    /// `Error::RefreshFailed` if the token endpoint fails.
    pub async fn refresh(&self, token: &Token) -> Result<Token> {
        if !token.is_refreshable() {
            return Err(Error::TokenExpiredNoRefresh);
        }

        let refreshed = self
            .client
            .refresh_token(token)
            .await
            .map_err(Error::RefreshFailed)?;

        info!(
            "Gmail OAuth token refreshed successfully (expires {})",
            refreshed.expiry
        );
        Ok(refreshed)
    }

    /// Writes `token` to the token file, replacing it atomically.
    ///
    /// The token is written to a sibling temporary file created with mode
    /// 0600, synced, and renamed over the target. Missing parent directories
    /// are created with mode 0700.
    ///
    /// # Errors
    ///
    /// Returns `Error::PersistFailed` if any step fails. The previous file,
    /// if any, is left untouched in that case.
    pub async fn save(&mut self, token: &Token) -> Result<()> {
        let json = serde_json::to_string_pretty(token).map_err(|e| self.persist_failed(e))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_private_dir(dir)
                .await
                .map_err(|e| self.persist_failed(e))?;
        }

        let tmp = self.temp_path();
        if let Err(e) = write_private_file(&tmp, json.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.persist_failed(e));
        }

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.persist_failed(e));
        }

        debug!("Saved token to {}", self.path.display());
        self.current = Some(token.clone());
        Ok(())
    }

    /// Returns a token that is valid right now.
    ///
    /// # Errors
    ///
    /// Propagates `TokenNotFound`, `InvalidToken`, `TokenExpiredNoRefresh`,
    /// `RefreshFailed` and `PersistFailed` unchanged.
    pub async fn ensure_valid(&mut self) -> Result<Token> {
        self.ensure_valid_at(Utc::now()).await
    }

    /// Returns a token that is valid at `now`.
    ///
    /// A token that has not expired is returned as loaded, with no network
    /// call and no write. An expired one is refreshed once, saved, and the
    /// refreshed token returned. There is no retry.
    ///
    /// # Errors
    ///
    /// Same as [`TokenStore::ensure_valid`].
    pub async fn ensure_valid_at(&mut self, now: DateTime<Utc>) -> Result<Token> {
        let token = self.load().await?;
        if !Self::is_expired(&token, now) {
            return Ok(token);
        }

        info!("Access token expired at {}, refreshing", token.expiry);
        let refreshed = self.refresh(&token).await?;
        self.save(&refreshed).await?;
        Ok(refreshed)
    }

    /// Returns true if a stored token exists and is unexpired. Never refreshes.
    pub async fn is_valid(&mut self) -> bool {
        self.is_valid_at(Utc::now()).await
    }

    /// Returns true if a stored token exists and is unexpired at `now`.
    ///
    /// Uses the current token if one is held, otherwise loads the file.
    pub async fn is_valid_at(&mut self, now: DateTime<Utc>) -> bool {
        let token = match self.current.clone() {
            Some(token) => token,
            None => match self.load().await {
                Ok(token) => token,
                Err(e) => {
                    debug!("No usable token: {e}");
                    return false;
                }
            },
        };
        !Self::is_expired(&token, now)
    }

    /// Authorization flow for the interactive first-time setup.
    #[must_use]
    pub fn authorization_flow(&self) -> AuthorizationCodeFlow {
        AuthorizationCodeFlow::new(self.client.clone())
    }

    /// Exchanges a user-supplied authorization code and stores the token.
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthenticationFailed` if the exchange fails and
    /// `Error::PersistFailed` if the token cannot be saved.
    pub async fn authorize_with_code(&mut self, code: &str) -> Result<Token> {
        let token = self
            .authorization_flow()
            .exchange_code(code)
            .await
            .map_err(Error::AuthenticationFailed)?;

        if !token.is_refreshable() {
            warn!("Authorization returned no refresh token; setup will be needed again after expiry");
        }

        self.save(&token).await?;
        info!("Stored new Gmail OAuth token at {}", self.path.display());
        Ok(token)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "token".into(), |n| n.to_string_lossy().into_owned());
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    fn invalid_token(&self, reason: impl ToString) -> Error {
        Error::InvalidToken {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    fn persist_failed(&self, reason: impl ToString) -> Error {
        Error::PersistFailed {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

async fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    if tokio::fs::try_exists(dir).await? {
        return Ok(());
    }

    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(TOKEN_DIR_MODE);
    builder.create(dir).await
}

async fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    // A stale temp file would keep its old permissions.
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(TOKEN_FILE_MODE);

    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    Ok(())
}
