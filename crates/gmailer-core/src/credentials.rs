//! Loading the OAuth client credentials file.
//!
//! The file is the JSON downloaded from the Google Cloud console. It is
//! read once at startup and never written.

use crate::error::{Error, Result};
use gmailer_oauth::ClientSecrets;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Reads and parses the credentials file at `path`.
///
/// # Errors
///
/// Returns `Error::CredentialsNotFound` if the file does not exist and
/// `Error::InvalidCredentials` if it cannot be read or parsed.
pub async fn load_credentials(path: &Path) -> Result<ClientSecrets> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::CredentialsNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(Error::InvalidCredentials {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    let secrets = ClientSecrets::from_json(&json).map_err(|e| Error::InvalidCredentials {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // Endpoint overrides must parse before any exchange is attempted.
    secrets.provider().map_err(|e| Error::InvalidCredentials {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!("Loaded OAuth client {} from {}", secrets.client_id, path.display());
    Ok(secrets)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_installed_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{"installed":{"client_id":"id.apps.googleusercontent.com","client_secret":"s3cret","redirect_uris":["urn:ietf:wg:oauth:2.0:oob"]}}"#,
        )
        .unwrap();

        let secrets = load_credentials(&path).await.unwrap();
        assert_eq!(secrets.client_id, "id.apps.googleusercontent.com");
        assert_eq!(secrets.redirect_uris.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_credentials(&path).await.unwrap_err();
        assert!(matches!(err, Error::CredentialsNotFound(p) if p == path));
    }

    #[tokio::test]
    async fn test_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_credentials(&path).await,
            Err(Error::InvalidCredentials { .. })
        ));
    }

    #[tokio::test]
    async fn test_bad_token_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{"web":{"client_id":"id","client_secret":"s","token_uri":"::nope"}}"#,
        )
        .unwrap();
        assert!(matches!(
            load_credentials(&path).await,
            Err(Error::InvalidCredentials { .. })
        ));
    }
}
