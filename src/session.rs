//! Persisted session storage.
//!
//! Single owner of the on-disk session state: the access/refresh token
//! pair issued at login. Every read goes to disk so the API client
//! always sees the latest pair, and clearing the file logs the user
//! out everywhere.
//!
//! Key properties:
//! - Exactly two values, stored under fixed keys in one JSON file
//! - Read at call time by the API client
//! - Written only by the auth flows, the refresh path, and logout

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Fixed storage keys for the token pair.
const ACCESS_TOKEN_KEY: &str = "access";
const REFRESH_TOKEN_KEY: &str = "refresh";

/// Access + refresh token pair as issued by the login endpoint.
///
/// Claims are never decoded locally; the role always comes from the
/// role-lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Errors from session store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// File-backed session store.
///
/// `tokens()` re-reads the file on every call; a missing or unreadable
/// file simply means "not logged in". Writes replace the whole file.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store backed by the default session file under the app data dir.
    pub fn open_default() -> Self {
        Self::at_path(crate::config::session_file())
    }

    /// Store backed by an explicit file path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the persisted token pair, if both values are present.
    pub fn tokens(&self) -> Option<TokenPair> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let map: BTreeMap<String, String> = serde_json::from_str(&raw).ok()?;
        let access = map.get(ACCESS_TOKEN_KEY)?;
        let refresh = map.get(REFRESH_TOKEN_KEY)?;
        if access.is_empty() || refresh.is_empty() {
            return None;
        }
        Some(TokenPair {
            access: access.clone(),
            refresh: refresh.clone(),
        })
    }

    /// Read only the access token.
    pub fn access_token(&self) -> Option<String> {
        self.tokens().map(|pair| pair.access)
    }

    /// Whether a complete token pair is on disk.
    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_some()
    }

    /// Persist a full token pair (login).
    pub fn store(&self, pair: &TokenPair) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut map = BTreeMap::new();
        map.insert(ACCESS_TOKEN_KEY, pair.access.as_str());
        map.insert(REFRESH_TOKEN_KEY, pair.refresh.as_str());
        let json = serde_json::to_string_pretty(&map)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Replace only the access token, keeping the stored refresh token.
    /// Used by the API client after a refresh exchange.
    pub fn set_access(&self, access: &str) -> Result<(), SessionError> {
        let refresh = self
            .tokens()
            .map(|pair| pair.refresh)
            .unwrap_or_default();
        self.store(&TokenPair {
            access: access.to_string(),
            refresh,
        })
    }

    /// Remove all persisted session state (logout / pre-registration).
    /// Missing file is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
